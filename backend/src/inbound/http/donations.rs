//! Donation page handler.
//!
//! ```text
//! GET /donations/{content_id}
//! ```
//!
//! Serves the self-contained HTML page for a stored donation descriptor.
//! This endpoint sits outside the `/api/v1` scope: its URLs are shared
//! directly with browsers.

use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::domain::ports::ContentId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Serve the donation page bound to a content id.
#[utoipa::path(
    get,
    path = "/donations/{content_id}",
    params(
        ("content_id" = String, Path, description = "Content id issued when the page was created")
    ),
    responses(
        (status = 200, description = "Donation page", content_type = "text/html"),
        (status = 400, description = "Malformed content id", body = Error),
        (status = 404, description = "No page for that id", body = Error),
        (status = 503, description = "Content store unavailable", body = Error)
    ),
    tags = ["donations"],
    operation_id = "donationPage"
)]
#[get("/donations/{content_id}")]
pub async fn donation_page(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = ContentId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(format!("malformed content id: {err}")))?;
    let page = state.donations.render(&id).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page))
}
