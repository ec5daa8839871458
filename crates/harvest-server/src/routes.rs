use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use tower_http::limit::RequestBodyLimitLayer;

use harvest_core::{ExportArtifact, HarvestOutcome};

use crate::dto::HarvestForm;
use crate::error::ApiError;
use crate::state::AppState;

/// Largest accepted form submission.
const FORM_BODY_LIMIT: usize = 64 * 1024;

const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Build the router: the form page and its submission on `/`, nothing else.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(harvest))
        .layer(RequestBodyLimitLayer::new(FORM_BODY_LIMIT))
        .with_state(state)
}

/// `GET /`: the submission form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /`: joined text for ordinary tags, a `tables_separate.*` download
/// for `table`.
pub async fn harvest(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HarvestForm>,
) -> Result<Response, ApiError> {
    let request = form.into_request()?;

    let outcome = state.service.harvest(&request).await?;

    let response = match outcome {
        HarvestOutcome::Text(text) => text.into_response(),
        HarvestOutcome::Export(artifact) => attachment(artifact),
    };

    Ok(response)
}

/// Serve an export as a file download.
fn attachment(artifact: ExportArtifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}
