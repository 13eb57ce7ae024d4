use cucumber::World;
use log::*;
use serde_json::{json, Value};
use storefront_engine::{
    events::EventProducers,
    AuthContext,
    CatalogApi,
    CommerceError,
    PaymentFlowApi,
    PublishApi,
    SqliteDatabase,
};

use crate::support::{
    fake_processor::FakeProcessor,
    prepare_env::{prepare_test_env, random_db_path},
};

#[derive(Default, Debug, World)]
pub struct StorefrontWorld {
    pub system: Option<StorefrontSystem>,
    /// The response body of the last operation, in `{result}` / `{error}` form
    pub response: Option<Value>,
}

#[derive(Debug)]
pub struct StorefrontSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub processor: FakeProcessor,
    pub payments: PaymentFlowApi<SqliteDatabase, FakeProcessor>,
    pub publish: PublishApi<SqliteDatabase>,
    pub catalog: CatalogApi<SqliteDatabase>,
}

impl StorefrontWorld {
    pub fn system(&self) -> &StorefrontSystem {
        self.system.as_ref().expect("The storefront has not been set up")
    }

    pub fn response(&self) -> &Value {
        self.response.as_ref().expect("No operation has been run yet")
    }

    pub fn record<T: serde::Serialize>(&mut self, result: Result<T, CommerceError>) {
        let response = match result {
            Ok(v) => json!({ "result": v }),
            Err(e) => match e.envelope() {
                Some(envelope) => json!({ "error": envelope }),
                None => json!({ "error": e.to_string() }),
            },
        };
        debug!("🚀️ Response: {response}");
        self.response = Some(response);
    }
}

impl StorefrontSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        prepare_test_env(&db_path).await;
        let db = SqliteDatabase::new_with_url(&db_path, 5).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {db_path}");
        let processor = FakeProcessor::default();
        let payments = PaymentFlowApi::new(db.clone(), processor.clone(), EventProducers::default());
        let publish = PublishApi::new(db.clone(), EventProducers::default());
        let catalog = CatalogApi::new(db.clone(), EventProducers::default());
        Self { db_path, db, processor, payments, publish, catalog }
    }
}

/// A seller working for `provider_id`. When `actor_id` equals `provider_id` they are the provider's owner.
pub fn seller(actor_id: &str, provider_id: &str) -> AuthContext {
    AuthContext::new(actor_id.into()).with_provider(provider_id.into())
}
