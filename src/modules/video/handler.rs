use super::dto::HealthResponse;
use super::error::{GenerateError, ValidationError};
use super::service::VideoService;
use crate::common::flash::{self, Flash};
use crate::common::response::{ApiError, ApiResponse};
use crate::common::upload::read_upload_form;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::path::Path;
use tokio_util::io::ReaderStream;
use tower_cookies::Cookies;
use tracing::{error, warn};

const INDEX_TEMPLATE: &str = include_str!("../../../templates/index.html");
const DOWNLOAD_NAME: &str = "video.mp4";

/// Upload form, showing the message left by the last failed generate request.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Upload form", body = String, content_type = "text/html")
    ),
    tag = "Video"
)]
pub async fn index(cookies: Cookies) -> Html<String> {
    let banner = flash::take(&cookies)
        .map(|f| {
            format!(
                "<div class=\"flash {}\">{}</div>",
                escape_html(&f.level),
                escape_html(&f.message)
            )
        })
        .unwrap_or_default();

    Html(INDEX_TEMPLATE.replace("{{ flash }}", &banner))
}

/// Combine an image and an audio track into an MP4
/// The still image is looped for the length of the audio
#[utoipa::path(
    post,
    path = "/generate",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Generated video", body = String, content_type = "video/mp4"),
        (status = 303, description = "Redirect to the form with a flash message")
    ),
    tag = "Video"
)]
pub async fn generate(
    State(state): State<AppState>,
    cookies: Cookies,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            warn!("Rejected non-multipart generate request: {}", e);
            return fail(&state, &cookies, ValidationError::MissingParts.into());
        }
    };

    let form = match read_upload_form(multipart, state.config.max_upload_bytes).await {
        Ok(form) => form,
        Err(e) => return fail(&state, &cookies, e.into()),
    };

    let artifacts = match VideoService::generate(&state, form).await {
        Ok(artifacts) => artifacts,
        Err(e) => return fail(&state, &cookies, e),
    };

    match stream_attachment(&artifacts.output).await {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to open {}: {}", artifacts.output.display(), e);
            fail(&state, &cookies, GenerateError::Internal(e.to_string()))
        }
    }
}

/// Liveness plus the effective upload directory and encoder binary
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>),
        (status = 503, description = "Upload directory unavailable")
    ),
    tag = "System"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let root = state.store.root();

    if !tokio::fs::metadata(root).await.map(|m| m.is_dir()).unwrap_or(false) {
        return ApiError::unavailable(format!("Upload directory {} is missing", root.display()))
            .into_response();
    }

    let data = HealthResponse {
        upload_dir: root.display().to_string(),
        encoder: state.encoder.bin().to_string(),
    };

    ApiResponse::ok(data, "ok").into_response()
}

fn fail(state: &AppState, cookies: &Cookies, err: GenerateError) -> Response {
    let message = err.user_message(state.config.error_message_limit);
    warn!("Generate request failed: {}", err);

    flash::redirect_with(cookies, Flash::error(message)).into_response()
}

async fn stream_attachment(path: &Path) -> std::io::Result<Response> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();

    let body = Body::from_stream(ReaderStream::new(file));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
        )
        .body(body)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
