//! HTTP surface tests over in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, test as actix_test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use backend::Trace;
use backend::domain::ports::{
    AccountProvisioning, AccountRegistry, ConfirmedTransaction, ContentStore, LedgerClient,
    LedgerClientError, PendingTransaction, SignedTransfer, StaticPriceFeed, UnsignedTransfer,
};
use backend::domain::{
    AccountAddress, AccountService, CommandService, DonationTemplateService, TransactionExecutor,
};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::{accounts, commands, donations};
use backend::outbound::memory::{InMemoryAccountRegistry, InMemoryContentStore};

/// Ledger stub that always confirms.
struct AlwaysConfirm;

#[async_trait]
impl LedgerClient for AlwaysConfirm {
    async fn account_balance(&self, _address: &AccountAddress) -> Result<u64, LedgerClientError> {
        Ok(100_000_000)
    }

    async fn build_transfer(
        &self,
        sender: &AccountAddress,
        recipient: &AccountAddress,
        amount_base_units: u64,
    ) -> Result<UnsignedTransfer, LedgerClientError> {
        Ok(UnsignedTransfer {
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount_base_units,
            sequence_number: 0,
            max_gas_amount: 2_000,
            gas_unit_price: 100,
            expiration_timestamp_secs: 1_700_000_600,
            signing_message: b"stub".to_vec(),
        })
    }

    async fn submit(
        &self,
        _transfer: &SignedTransfer,
    ) -> Result<PendingTransaction, LedgerClientError> {
        Ok(PendingTransaction {
            hash: "0xstub".to_owned(),
        })
    }

    async fn wait_for_confirmation(
        &self,
        hash: &str,
        _timeout: Duration,
    ) -> Result<ConfirmedTransaction, LedgerClientError> {
        Ok(ConfirmedTransaction {
            hash: hash.to_owned(),
            gas_used: None,
        })
    }
}

fn http_state() -> (HttpState, Arc<dyn AccountProvisioning>) {
    let registry: Arc<dyn AccountRegistry> = Arc::new(InMemoryAccountRegistry::new());
    let store: Arc<dyn ContentStore> = Arc::new(InMemoryContentStore::new());
    let executor = TransactionExecutor::new(Arc::new(AlwaysConfirm), Arc::clone(&registry));
    let donations_service = Arc::new(DonationTemplateService::new(store));
    let command_service = Arc::new(CommandService::new(
        Arc::clone(&registry),
        executor,
        Arc::new(StaticPriceFeed),
        Arc::clone(&donations_service),
        "testnet",
    ));
    let account_service: Arc<dyn AccountProvisioning> =
        Arc::new(AccountService::new(registry));
    let state = HttpState::new(
        command_service,
        Arc::clone(&account_service),
        donations_service,
    );
    (state, account_service)
}

macro_rules! test_app {
    ($state:expr) => {
        actix_test::init_service(
            App::new()
                .wrap(Trace)
                .app_data(web::Data::new($state))
                .service(
                    web::scope("/api/v1")
                        .service(commands::process_command)
                        .service(accounts::provision_account),
                )
                .service(donations::donation_page),
        )
        .await
    };
}

async fn read_json(response: actix_web::dev::ServiceResponse) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn provisioning_is_idempotent_per_handle() {
    let (state, _) = http_state();
    let app = test_app!(state);

    let first = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(json!({"handle": "alice"}))
            .to_request(),
    )
    .await;
    let (first_status, first_body) = read_json(first).await;

    let second = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(json!({"handle": "@ALICE"}))
            .to_request(),
    )
    .await;
    let (second_status, second_body) = read_json(second).await;

    assert_eq!(first_status, 201);
    assert_eq!(second_status, 200);
    assert_eq!(first_body["address"], second_body["address"]);
    assert_eq!(first_body["id"], second_body["id"]);
}

#[tokio::test]
async fn concurrent_first_time_requests_agree_on_one_account() {
    let (_, account_service) = http_state();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&account_service);
        tasks.push(tokio::spawn(async move {
            service
                .get_or_create(backend::domain::Handle::new("race").expect("valid handle"))
                .await
                .expect("provision")
        }));
    }

    let mut addresses = Vec::new();
    let mut created_count = 0;
    for task in tasks {
        let provisioned = task.await.expect("join");
        if provisioned.created {
            created_count += 1;
        }
        addresses.push(provisioned.address.to_string());
    }

    assert_eq!(created_count, 1, "exactly one call creates the account");
    addresses.dedup();
    assert_eq!(addresses.len(), 1, "every caller sees the same address");
}

#[tokio::test]
async fn account_responses_never_leak_the_credential() {
    let (state, _) = http_state();
    let app = test_app!(state);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/accounts")
            .set_json(json!({"handle": "alice"}))
            .to_request(),
    )
    .await;
    let (_, body) = read_json(response).await;
    let raw = body.to_string().to_lowercase();
    assert!(!raw.contains("credential"));
    assert!(!raw.contains("privatekey"));
    assert!(!raw.contains("private_key"));
}

#[tokio::test]
async fn commands_for_unregistered_handles_are_404() {
    let (state, _) = http_state();
    let app = test_app!(state);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/commands")
            .set_json(json!({"handle": "ghost", "command": "check my balance"}))
            .to_request(),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn a_registered_handle_gets_a_command_response() {
    let (state, account_service) = http_state();
    account_service
        .get_or_create(backend::domain::Handle::new("alice").expect("valid handle"))
        .await
        .expect("provision");
    let app = test_app!(state);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/commands")
            .set_json(json!({"handle": "alice", "command": "what's my balance?"}))
            .to_request(),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, 200);
    assert_eq!(body["responseText"], "\u{1f4b0} Your balance is 1 APT");
}

#[tokio::test]
async fn blank_commands_are_rejected() {
    let (state, _) = http_state();
    let app = test_app!(state);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/commands")
            .set_json(json!({"handle": "alice", "command": "  "}))
            .to_request(),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn unknown_donation_pages_are_404() {
    let (state, _) = http_state();
    let app = test_app!(state);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/donations/Qmmissing")
            .to_request(),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn error_responses_carry_a_trace_id() {
    let (state, _) = http_state();
    let app = test_app!(state);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/commands")
            .set_json(json!({"handle": "ghost", "command": "check my balance"}))
            .to_request(),
    )
    .await;
    assert!(response.headers().contains_key("trace-id"));
    let (_, body) = read_json(response).await;
    assert!(body["traceId"].as_str().is_some_and(|id| !id.is_empty()));
}
