use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::integration::common::{form_request, setup_test_app, unreachable_url};

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn header_value(response: &axum::response::Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn index_serves_the_form() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"name="url""#));
    assert!(html.contains(r#"name="tag""#));
    assert!(html.contains(r#"name="output_format""#));
}

#[tokio::test]
async fn only_the_form_route_is_served() {
    for path in ["/health", "/swagger-ui", "/api-docs/openapi.json", "/download"] {
        let app = setup_test_app().await;

        let response = app
            .router
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn single_table_as_csv_download() {
    let app = setup_test_app().await;
    let url = app.page_url("/one-table");

    let response = app
        .router
        .oneshot(form_request(&[
            ("url", url.as_str()),
            ("tag", "table"),
            ("output_format", "csv"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), "text/csv");
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        r#"attachment; filename="tables_separate.csv""#
    );
    let csv = body_text(response).await;
    assert!(csv.starts_with("Table 1\nA,B\n1,2\n3,4\n"));
}

#[tokio::test]
async fn two_tables_as_excel_download() {
    let app = setup_test_app().await;
    let url = app.page_url("/two-tables");

    let response = app
        .router
        .oneshot(form_request(&[
            ("url", url.as_str()),
            ("tag", "table"),
            ("output_format", "excel"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        r#"attachment; filename="tables_separate.xlsx""#
    );

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut workbook = String::new();
    archive
        .by_name("xl/workbook.xml")
        .unwrap()
        .read_to_string(&mut workbook)
        .unwrap();
    let first = workbook.find(r#"name="Table_1""#).unwrap();
    let second = workbook.find(r#"name="Table_2""#).unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn tables_as_pdf_download() {
    let app = setup_test_app().await;
    let url = app.page_url("/two-tables");

    let response = app
        .router
        .oneshot(form_request(&[
            ("url", url.as_str()),
            ("tag", "table"),
            ("output_format", "pdf"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_TYPE),
        "application/pdf"
    );
    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn paragraphs_return_joined_text() {
    let app = setup_test_app().await;
    let url = app.page_url("/paragraphs");

    let response = app
        .router
        .oneshot(form_request(&[("url", url.as_str()), ("tag", "p"), ("output_format", "csv")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/plain"));
    assert_eq!(body_text(response).await, "a\n\nb\n\nc");
}

#[tokio::test]
async fn meta_charset_is_honoured() {
    let app = setup_test_app().await;
    let url = app.page_url("/latin1");

    let response = app
        .router
        .oneshot(form_request(&[("url", url.as_str()), ("tag", "p")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "caf\u{e9}");
}

#[tokio::test]
async fn unreachable_url_returns_message() {
    let app = setup_test_app().await;
    let url = unreachable_url().await;

    let response = app
        .router
        .oneshot(form_request(&[("url", url.as_str()), ("tag", "p")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_text(response).await,
        "No internet connection or URL not reachable"
    );
}

#[tokio::test]
async fn page_without_tables_returns_message() {
    let app = setup_test_app().await;
    let url = app.page_url("/no-tables");

    let response = app
        .router
        .oneshot(form_request(&[
            ("url", url.as_str()),
            ("tag", "table"),
            ("output_format", "csv"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        "No matching tags found on this page"
    );
}

#[tokio::test]
async fn unsupported_format_is_rejected() {
    let app = setup_test_app().await;
    let url = app.page_url("/one-table");

    let response = app
        .router
        .oneshot(form_request(&[
            ("url", url.as_str()),
            ("tag", "table"),
            ("output_format", "docx"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = body_text(response).await;
    assert!(text.contains("Unsupported output format"));
    assert!(text.contains("docx"));
}

#[tokio::test]
async fn missing_url_is_unreachable() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(form_request(&[("tag", "p")]))
        .await
        .unwrap();

    assert_eq!(
        body_text(response).await,
        "No internet connection or URL not reachable"
    );
}
