//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: all HTTP endpoints from the inbound layer (commands,
//!   accounts, donations, health)
//! - **Schemas**: request and response bodies plus the shared error payload
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{DonationDescriptor, Error, ErrorCode};
use crate::inbound::http::accounts::{AccountRequest, AccountResponse};
use crate::inbound::http::commands::{CommandContextRequest, CommandRequest, CommandResponseBody};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger command backend API",
        description = "Turns free-text commands into balance checks, token transfers, \
            price lookups, and durable donation pages."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::commands::process_command,
        crate::inbound::http::accounts::provision_account,
        crate::inbound::http::donations::donation_page,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CommandRequest,
        CommandContextRequest,
        CommandResponseBody,
        AccountRequest,
        AccountResponse,
        DonationDescriptor,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "commands", description = "Free-text command processing"),
        (name = "accounts", description = "Handle-to-account provisioning"),
        (name = "donations", description = "Shared donation pages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
