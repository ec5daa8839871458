use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use url::form_urlencoded;

use harvest_client::{ReqwestFetcher, ScraperSelector};
use harvest_core::HarvestService;
use harvest_server::routes;
use harvest_server::state::AppState;

pub const ONE_TABLE_PAGE: &str = r#"<html><body>
    <h1>Report</h1>
    <table>
      <tr><th>A</th><th>B</th></tr>
      <tr><td>1</td><td>2</td></tr>
      <tr><td>3</td><td>4</td></tr>
    </table>
</body></html>"#;

pub const TWO_TABLE_PAGE: &str = r#"<html><body>
    <table><tr><th>City</th></tr><tr><td>Lima</td></tr></table>
    <p>between</p>
    <table><thead><tr><th>Year</th><th>Total</th></tr></thead>
           <tbody><tr><td>2024</td><td>10</td></tr></tbody></table>
</body></html>"#;

pub const PARAGRAPH_PAGE: &str = "<html><body><p>a</p><p> b </p><p>c</p></body></html>";

pub const NO_TABLE_PAGE: &str = "<html><body><p>nothing tabular here</p></body></html>";

/// Latin-1 bytes whose charset is declared only in markup.
pub const LATIN1_PAGE: &[u8] =
    b"<html><head><meta charset=\"iso-8859-1\"></head><body><p>caf\xe9</p></body></html>";

/// Router under test plus the address of a local site serving fixture pages.
pub struct TestApp {
    pub router: Router,
    pub site: SocketAddr,
}

impl TestApp {
    pub fn page_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.site)
    }
}

/// Start the fixture site and build the app router against it.
///
/// Private addresses are allowed since the fixture site listens on loopback.
pub async fn setup_test_app() -> TestApp {
    let site = spawn_fixture_site().await;

    let fetcher = ReqwestFetcher::new()
        .and_then(ReqwestFetcher::allow_private_urls)
        .expect("Failed to build HTTP client");
    let service = HarvestService::new(fetcher, ScraperSelector::new());
    let state = Arc::new(AppState { service });

    TestApp {
        router: routes::router(state),
        site,
    }
}

async fn spawn_fixture_site() -> SocketAddr {
    let site = Router::new()
        .route("/one-table", get(|| async { Html(ONE_TABLE_PAGE) }))
        .route("/two-tables", get(|| async { Html(TWO_TABLE_PAGE) }))
        .route("/paragraphs", get(|| async { Html(PARAGRAPH_PAGE) }))
        .route("/no-tables", get(|| async { Html(NO_TABLE_PAGE) }))
        .route(
            "/latin1",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], LATIN1_PAGE) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture site");
    let addr = listener.local_addr().expect("Failed to read fixture address");
    tokio::spawn(async move {
        axum::serve(listener, site).await.ok();
    });
    addr
}

/// URL on loopback where nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve a port");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{addr}/")
}

/// Build a form POST to `/`.
pub fn form_request(fields: &[(&str, &str)]) -> Request<Body> {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();

    Request::post("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}
