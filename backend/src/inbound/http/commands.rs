//! Command API handler.
//!
//! ```text
//! POST /api/v1/commands {"handle":"alice","command":"send 0.5 APT to @bob"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::intent::CommandContext;
use crate::domain::ports::ProcessCommandRequest;
use crate::domain::{Error, Handle};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/commands`.
///
/// Example JSON:
/// `{"handle":"alice","command":"check my balance"}`
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Sender's handle, with or without a leading `@`.
    pub handle: String,
    /// Free-text command.
    pub command: String,
    /// Optional page context around the command.
    #[serde(default)]
    pub context: Option<CommandContextRequest>,
}

/// Page context accompanying a command.
#[derive(Deserialize, Serialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandContextRequest {
    /// Text the sender was quoting or replying to, if any.
    pub quoted_text: Option<String>,
}

/// Response body carrying the rendered reply text.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponseBody {
    /// Text to render back into the host page.
    pub response_text: String,
}

impl TryFrom<CommandRequest> for ProcessCommandRequest {
    type Error = Error;

    fn try_from(value: CommandRequest) -> Result<Self, Self::Error> {
        let handle = Handle::new(&value.handle)
            .map_err(|err| Error::invalid_request(format!("invalid handle: {err}")))?;
        if value.command.trim().is_empty() {
            return Err(Error::invalid_request("command must not be blank"));
        }
        let context = CommandContext {
            quoted_text: value.context.and_then(|c| c.quoted_text),
        };
        Ok(Self {
            handle,
            command: value.command,
            context,
        })
    }
}

/// Process one free-text command for a registered handle.
///
/// Ledger and store failures inside a recognised command are reported in the
/// response text with status 200; only an unregistered handle or a malformed
/// request produces an error status.
#[utoipa::path(
    post,
    path = "/api/v1/commands",
    request_body = CommandRequest,
    responses(
        (status = 200, description = "Command processed", body = CommandResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown handle", body = Error),
        (status = 503, description = "A collaborating service is unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["commands"],
    operation_id = "processCommand"
)]
#[post("/commands")]
pub async fn process_command(
    state: web::Data<HttpState>,
    payload: web::Json<CommandRequest>,
) -> ApiResult<HttpResponse> {
    let request = ProcessCommandRequest::try_from(payload.into_inner())?;
    let response = state.commands.process(request).await?;
    Ok(HttpResponse::Ok().json(CommandResponseBody {
        response_text: response.response_text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        CommandResponse, MockAccountProvisioning, MockCommandProcessor, MockDonationPageQuery,
    };
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state_with(commands: MockCommandProcessor) -> HttpState {
        HttpState::new(
            Arc::new(commands),
            Arc::new(MockAccountProvisioning::new()),
            Arc::new(MockDonationPageQuery::new()),
        )
    }

    async fn post_command(state: HttpState, body: Value) -> (u16, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(process_command)),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/commands")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status().as_u16();
        let bytes = actix_test::read_body(response).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn a_recognised_command_returns_the_response_text() {
        let mut commands = MockCommandProcessor::new();
        commands
            .expect_process()
            .withf(|request| request.handle.as_ref() == "alice")
            .returning(|_| {
                Ok(CommandResponse {
                    response_text: "\u{1f4b0} Your balance is 2.5 APT".to_owned(),
                })
            });

        let (status, body) = post_command(
            state_with(commands),
            json!({"handle": "@Alice", "command": "check my balance"}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["responseText"], "\u{1f4b0} Your balance is 2.5 APT");
    }

    #[tokio::test]
    async fn an_unknown_handle_maps_to_404() {
        let mut commands = MockCommandProcessor::new();
        commands
            .expect_process()
            .returning(|_| Err(Error::not_found("no account registered for @ghost")));

        let (status, body) = post_command(
            state_with(commands),
            json!({"handle": "ghost", "command": "check my balance"}),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "not_found");
    }

    #[rstest]
    #[case(json!({"handle": "", "command": "check my balance"}))]
    #[case(json!({"handle": "alice", "command": "   "}))]
    #[case(json!({"handle": "not a handle!", "command": "check my balance"}))]
    #[tokio::test]
    async fn malformed_requests_are_rejected_before_processing(#[case] body: Value) {
        let mut commands = MockCommandProcessor::new();
        commands.expect_process().times(0);

        let (status, _) = post_command(state_with(commands), body).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn quoted_context_is_passed_through() {
        let mut commands = MockCommandProcessor::new();
        commands
            .expect_process()
            .withf(|request| request.context.quoted_text.as_deref() == Some("$APT to the moon"))
            .returning(|_| {
                Ok(CommandResponse {
                    response_text: "ok".to_owned(),
                })
            });

        let (status, _) = post_command(
            state_with(commands),
            json!({
                "handle": "alice",
                "command": "what's the price?",
                "context": {"quotedText": "$APT to the moon"}
            }),
        )
        .await;
        assert_eq!(status, 200);
    }
}
