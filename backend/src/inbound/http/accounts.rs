//! Account provisioning API handler.
//!
//! ```text
//! POST /api/v1/accounts {"handle":"alice"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Handle};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/accounts`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    /// Handle to provision, with or without a leading `@`.
    pub handle: String,
}

/// Public account view. The stored credential is deliberately absent: it
/// never crosses the HTTP boundary.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Stable account identifier.
    pub id: Uuid,
    /// Ledger address funds can be sent to.
    pub address: String,
}

/// Provision (or look up) the account bound to a handle.
///
/// Repeated calls for the same handle return the same account; 201 marks the
/// call that created it, 200 every subsequent one.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Account already existed", body = AccountResponse),
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid handle", body = Error),
        (status = 503, description = "Account registry unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "provisionAccount"
)]
#[post("/accounts")]
pub async fn provision_account(
    state: web::Data<HttpState>,
    payload: web::Json<AccountRequest>,
) -> ApiResult<HttpResponse> {
    let handle = Handle::new(&payload.handle)
        .map_err(|err| Error::invalid_request(format!("invalid handle: {err}")))?;
    let provisioned = state.accounts.get_or_create(handle).await?;
    let body = AccountResponse {
        id: *provisioned.id.as_uuid(),
        address: provisioned.address.to_string(),
    };
    let mut response = if provisioned.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(body))
}
