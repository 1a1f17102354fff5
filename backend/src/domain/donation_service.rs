//! Donation collectors.
//!
//! Creating a collector writes an immutable [`DonationDescriptor`] to the
//! content-addressed store and returns the issued content id wrapped in the
//! `<emb … emb>` marker the host page substitutes for a share link. Serving
//! a collector reads the descriptor back and embeds it in a self-contained
//! HTML page that talks to an injected browser wallet; no credential ever
//! reaches the page.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::donation::{DonationDefaults, DonationDescriptor};
use crate::domain::error::Error;
use crate::domain::ports::{ContentId, ContentStore, ContentStoreError, DonationPageQuery};

/// Page skeleton; `__DESCRIPTOR_JSON__` is replaced with the escaped
/// descriptor at render time.
const PAGE_TEMPLATE: &str = include_str!("donation_page.html");

/// Creates and serves donation collectors.
pub struct DonationTemplateService {
    store: Arc<dyn ContentStore>,
    defaults: DonationDefaults,
}

impl DonationTemplateService {
    /// Create a service over the given content store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            defaults: DonationDefaults::default(),
        }
    }

    /// Override the default collector parameters.
    pub fn with_defaults(mut self, defaults: DonationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Create a collector for `creator`, store it, and return the marker
    /// text for the host page.
    pub async fn create(&self, cause: Option<&str>, creator: &Account) -> Result<String, Error> {
        let title = match cause {
            Some(cause) => format!("Donation for {}", cause.trim()),
            None => "Donation".to_owned(),
        };
        let descriptor = DonationDescriptor {
            id: Uuid::new_v4(),
            title,
            description: format!("Collected by @{}", creator.handle()),
            recipient_handle: creator.handle().to_string(),
            recipient_address: creator.address().clone(),
            suggested_amounts: self.defaults.suggested_amounts.clone(),
            minimum_amount: self.defaults.minimum_amount,
            currency_symbol: self.defaults.currency_symbol.clone(),
            created_at: Utc::now(),
        };

        let bytes = serde_json::to_vec(&descriptor)
            .map_err(|err| Error::internal(format!("descriptor serialisation failed: {err}")))?;
        let content_id = self.store.put(&bytes).await.map_err(store_error)?;
        info!(handle = %creator.handle(), content_id = %content_id, "donation collector created");
        Ok(format!(
            "\u{2705} Your donation page is ready! Share it here: <emb {content_id} emb>"
        ))
    }
}

#[async_trait]
impl DonationPageQuery for DonationTemplateService {
    async fn render(&self, id: &ContentId) -> Result<String, Error> {
        let bytes = self.store.get(id).await.map_err(store_error)?;
        let descriptor: DonationDescriptor = serde_json::from_slice(&bytes)
            .map_err(|err| Error::internal(format!("stored descriptor is malformed: {err}")))?;
        Ok(render_page(&descriptor))
    }
}

fn render_page(descriptor: &DonationDescriptor) -> String {
    // `<` must not appear inside the inline <script> block.
    let json = serde_json::to_string(descriptor)
        .unwrap_or_default()
        .replace('<', "\\u003c");
    PAGE_TEMPLATE.replace("__DESCRIPTOR_JSON__", &json)
}

fn store_error(err: ContentStoreError) -> Error {
    match err {
        ContentStoreError::NotFound { id } => {
            Error::not_found(format!("no donation page for {id}"))
        }
        ContentStoreError::Unreachable { .. } => {
            Error::service_unavailable("content store is unavailable")
        }
        ContentStoreError::Decode { .. } => Error::internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountAddress, AccountId, Handle};
    use crate::domain::credential::CredentialValue;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::MockContentStore;
    use rust_decimal_macros::dec;

    fn creator() -> Account {
        Account::new(
            AccountId::random(),
            Handle::new("alice").expect("valid handle"),
            AccountAddress::new(format!("0x{}", "ab".repeat(32))).expect("valid address"),
            CredentialValue::from_hex("0xff"),
        )
    }

    fn stored_id() -> ContentId {
        ContentId::new("Qm123abc").expect("valid content id")
    }

    #[tokio::test]
    async fn create_stores_the_descriptor_and_returns_a_marker() {
        let mut store = MockContentStore::new();
        store
            .expect_put()
            .withf(|bytes| {
                let descriptor: DonationDescriptor =
                    serde_json::from_slice(bytes).expect("stored bytes are a descriptor");
                descriptor.title == "Donation for clean water"
                    && descriptor.recipient_handle == "alice"
            })
            .returning(|_| Ok(stored_id()));

        let service = DonationTemplateService::new(Arc::new(store));
        let text = service
            .create(Some("clean water"), &creator())
            .await
            .expect("create");
        assert!(text.contains("<emb Qm123abc emb>"));
    }

    #[tokio::test]
    async fn create_without_a_cause_uses_the_plain_title() {
        let mut store = MockContentStore::new();
        store
            .expect_put()
            .withf(|bytes| {
                let descriptor: DonationDescriptor =
                    serde_json::from_slice(bytes).expect("stored bytes are a descriptor");
                descriptor.title == "Donation"
            })
            .returning(|_| Ok(stored_id()));

        let service = DonationTemplateService::new(Arc::new(store));
        service.create(None, &creator()).await.expect("create");
    }

    #[tokio::test]
    async fn overridden_defaults_flow_into_new_descriptors() {
        let mut store = MockContentStore::new();
        store
            .expect_put()
            .withf(|bytes| {
                let descriptor: DonationDescriptor =
                    serde_json::from_slice(bytes).expect("stored bytes are a descriptor");
                descriptor.suggested_amounts == vec![dec!(2), dec!(20)]
                    && descriptor.minimum_amount == dec!(0.5)
                    && descriptor.currency_symbol == "TST"
            })
            .returning(|_| Ok(stored_id()));

        let service =
            DonationTemplateService::new(Arc::new(store)).with_defaults(DonationDefaults {
                suggested_amounts: vec![dec!(2), dec!(20)],
                minimum_amount: dec!(0.5),
                currency_symbol: "TST".to_owned(),
            });
        service.create(None, &creator()).await.expect("create");
    }

    #[test]
    fn the_page_script_rounds_amounts_to_whole_base_units() {
        // Flooring would lose a unit to float dust on amounts like 0.29.
        assert!(PAGE_TEMPLATE.contains("Math.round(amount * BASE_UNITS_PER_TOKEN)"));
        assert!(!PAGE_TEMPLATE.contains("Math.floor"));
    }

    #[tokio::test]
    async fn render_embeds_the_stored_descriptor() {
        let account = creator();
        let descriptor = DonationDescriptor {
            id: Uuid::nil(),
            title: "Donation for trees".to_owned(),
            description: "Collected by @alice".to_owned(),
            recipient_handle: "alice".to_owned(),
            recipient_address: account.address().clone(),
            suggested_amounts: DonationDefaults::default().suggested_amounts,
            minimum_amount: DonationDefaults::default().minimum_amount,
            currency_symbol: "APT".to_owned(),
            created_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&descriptor).expect("serialise");

        let mut store = MockContentStore::new();
        store.expect_get().returning(move |_| Ok(bytes.clone()));

        let service = DonationTemplateService::new(Arc::new(store));
        let page = service.render(&stored_id()).await.expect("render");
        assert!(page.contains("Donation for trees"));
        assert!(page.contains("recipientAddress"));
        assert!(page.contains(account.address().as_ref()));
        // The template token must be fully substituted.
        assert!(!page.contains("__DESCRIPTOR_JSON__"));
    }

    #[tokio::test]
    async fn render_escapes_angle_brackets_in_descriptor_fields() {
        let account = creator();
        let descriptor = DonationDescriptor {
            id: Uuid::nil(),
            title: "Donation for </script><script>alert(1)".to_owned(),
            description: "Collected by @alice".to_owned(),
            recipient_handle: "alice".to_owned(),
            recipient_address: account.address().clone(),
            suggested_amounts: DonationDefaults::default().suggested_amounts,
            minimum_amount: DonationDefaults::default().minimum_amount,
            currency_symbol: "APT".to_owned(),
            created_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&descriptor).expect("serialise");

        let mut store = MockContentStore::new();
        store.expect_get().returning(move |_| Ok(bytes.clone()));

        let service = DonationTemplateService::new(Arc::new(store));
        let page = service.render(&stored_id()).await.expect("render");
        assert!(!page.contains("</script><script>alert(1)"));
        assert!(page.contains("\\u003c/script"));
    }

    #[tokio::test]
    async fn a_missing_descriptor_maps_to_not_found() {
        let mut store = MockContentStore::new();
        store
            .expect_get()
            .returning(|id| Err(ContentStoreError::not_found(id.to_string())));

        let service = DonationTemplateService::new(Arc::new(store));
        let err = service.render(&stored_id()).await.expect_err("should fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn an_unreachable_store_maps_to_service_unavailable() {
        let mut store = MockContentStore::new();
        store
            .expect_get()
            .returning(|_| Err(ContentStoreError::unreachable("connection refused")));

        let service = DonationTemplateService::new(Arc::new(store));
        let err = service.render(&stored_id()).await.expect_err("should fail");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn the_page_never_contains_credential_material() {
        let account = creator();
        let descriptor = DonationDescriptor {
            id: Uuid::nil(),
            title: "Donation".to_owned(),
            description: "Collected by @alice".to_owned(),
            recipient_handle: "alice".to_owned(),
            recipient_address: account.address().clone(),
            suggested_amounts: DonationDefaults::default().suggested_amounts,
            minimum_amount: DonationDefaults::default().minimum_amount,
            currency_symbol: "APT".to_owned(),
            created_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&descriptor).expect("serialise");

        let mut store = MockContentStore::new();
        store.expect_get().returning(move |_| Ok(bytes.clone()));

        let service = DonationTemplateService::new(Arc::new(store));
        let page = service.render(&stored_id()).await.expect("render");
        assert!(!page.to_lowercase().contains("privatekey"));
        assert!(!page.to_lowercase().contains("credential"));
    }
}
