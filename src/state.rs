use std::sync::Arc;

use crate::carrito::Cart;
use crate::config::{ApiConfig, AppConfig};
use crate::http::ApiClient;
use crate::session::Session;
use crate::storage::{MemoryStore, SqliteStore, Store};
use crate::ventas::Checkout;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: ApiClient,
    pub store: Arc<dyn Store>,
    pub session: Session,
    pub cart: Cart,
    pub checkout: Checkout,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(SqliteStore::connect(&config.store_url).await?) as Arc<dyn Store>;
        Self::from_parts(config, store).await
    }

    pub async fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let session = Session::load(store.clone(), api.clone()).await;
        let cart = Cart::new(store.clone(), api.clone(), session.clone());
        let checkout = Checkout::new(api.clone(), session.clone(), cart.clone());
        Ok(Self {
            config,
            api,
            store,
            session,
            cart,
            checkout,
        })
    }

    /// In-memory store and a backend address nothing listens on.
    pub async fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store_url: "sqlite::memory:".into(),
            api: ApiConfig {
                base_url: "http://127.0.0.1:9/api".into(),
                asset_base_url: "http://127.0.0.1:9".into(),
                timeout_secs: 1,
            },
            codigo_vendedor: "MILA2025".into(),
        });
        let store = Arc::new(MemoryStore::new()) as Arc<dyn Store>;
        Self::from_parts(config, store)
            .await
            .expect("fake state")
    }
}
