//! Backend entry-point: wires adapters to services and serves the REST API.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::ports::{
    AccountRegistry, CommandProcessor, ContentStore, LedgerClient, StaticPriceFeed,
};
use backend::domain::{
    AccountService, CommandService, DonationTemplateService, TransactionExecutor,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::{accounts, commands, donations, state::HttpState};
use backend::outbound::content_store::HttpContentStore;
use backend::outbound::ledger::HttpLedgerClient;
use backend::outbound::memory::{InMemoryAccountRegistry, InMemoryContentStore};
use backend::outbound::persistence::{DbPool, DieselAccountRegistry, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LEDGER_NODE_URL: &str = "https://fullnode.testnet.aptoslabs.com/";
const DEFAULT_LEDGER_NETWORK: &str = "testnet";
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 30;

fn io_error(message: String) -> std::io::Error {
    std::io::Error::other(message)
}

async fn account_registry() -> std::io::Result<Arc<dyn AccountRegistry>> {
    match env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|err| io_error(format!("database pool: {err}")))?;
            Ok(Arc::new(DieselAccountRegistry::new(pool)))
        }
        Err(_) => {
            warn!("DATABASE_URL not set; using in-memory account registry");
            Ok(Arc::new(InMemoryAccountRegistry::new()))
        }
    }
}

fn content_store() -> std::io::Result<Arc<dyn ContentStore>> {
    match env::var("CONTENT_STORE_URL") {
        Ok(raw) => {
            let url = Url::parse(&raw).map_err(|err| io_error(format!("content store url: {err}")))?;
            let mut store = HttpContentStore::new(url)
                .map_err(|err| io_error(format!("content store client: {err}")))?;
            if let Ok(token) = env::var("CONTENT_STORE_TOKEN") {
                store = store.with_bearer_token(token);
            }
            Ok(Arc::new(store))
        }
        Err(_) => {
            warn!("CONTENT_STORE_URL not set; using in-memory content store");
            Ok(Arc::new(InMemoryContentStore::new()))
        }
    }
}

fn ledger_client() -> std::io::Result<Arc<dyn LedgerClient>> {
    let raw = env::var("LEDGER_NODE_URL").unwrap_or_else(|_| DEFAULT_LEDGER_NODE_URL.to_owned());
    let url = Url::parse(&raw).map_err(|err| io_error(format!("ledger node url: {err}")))?;
    let client =
        HttpLedgerClient::new(url).map_err(|err| io_error(format!("ledger client: {err}")))?;
    Ok(Arc::new(client))
}

fn confirm_timeout() -> Duration {
    let seconds = env::var("CONFIRM_TIMEOUT_SECS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_CONFIRM_TIMEOUT_SECS);
    Duration::from_secs(seconds)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let registry = account_registry().await?;
    let store = content_store()?;
    let ledger = ledger_client()?;
    let network_label =
        env::var("LEDGER_NETWORK").unwrap_or_else(|_| DEFAULT_LEDGER_NETWORK.to_owned());

    let executor = TransactionExecutor::new(Arc::clone(&ledger), Arc::clone(&registry))
        .with_confirm_timeout(confirm_timeout());
    let donations = Arc::new(DonationTemplateService::new(Arc::clone(&store)));
    let command_service: Arc<dyn CommandProcessor> = Arc::new(CommandService::new(
        Arc::clone(&registry),
        executor,
        Arc::new(StaticPriceFeed),
        Arc::clone(&donations),
        network_label,
    ));
    let account_service = Arc::new(AccountService::new(Arc::clone(&registry)));

    let http_state = web::Data::new(HttpState::new(
        command_service,
        account_service,
        donations,
    ));
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    let server_health_state = health_state.clone();

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
    info!(%bind_addr, "starting server");

    let server = HttpServer::new(move || {
        let app = App::new()
            .wrap(Trace)
            .app_data(http_state.clone())
            .app_data(server_health_state.clone())
            .service(
                web::scope("/api/v1")
                    .service(commands::process_command)
                    .service(accounts::provision_account),
            )
            .service(donations::donation_page)
            .service(ready)
            .service(live);
        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
        app
    })
    .bind(&bind_addr)?;

    server.run().await
}
