mod nav;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

pub use nav::{Navegacion, Vista};

use crate::error::Result;
use crate::http::ApiClient;
use crate::storage::{Store, SESSION_KEY};
use crate::usuarios::{self, Usuario};

/// What is persisted under `SESSION_KEY`: the user record as the backend
/// returned it, plus the bearer token when one was issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistroSesion {
    #[serde(flatten)]
    pub usuario: Usuario,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// The logged-in user, if any. Changes are published on a watch channel so
/// dependent views re-evaluate without a reload.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn Store>,
    api: ApiClient,
    tx: watch::Sender<Option<RegistroSesion>>,
}

impl Session {
    /// Reads the persisted record; absent or unreadable means logged out.
    pub async fn load(store: Arc<dyn Store>, api: ApiClient) -> Self {
        let registro = match store.get(SESSION_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<RegistroSesion>(&raw) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(error = %e, "stored session is unreadable; logged out");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "could not read stored session; logged out");
                None
            }
        };
        api.set_bearer(registro.as_ref().and_then(|r| r.token.clone()));
        let (tx, _) = watch::channel(registro);
        Self {
            inner: Arc::new(Inner { store, api, tx }),
        }
    }

    pub fn usuario(&self) -> Option<Usuario> {
        self.inner.tx.borrow().as_ref().map(|r| r.usuario.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tx.borrow().is_some()
    }

    pub fn is_privileged(&self) -> bool {
        self.inner
            .tx
            .borrow()
            .as_ref()
            .is_some_and(|r| r.usuario.rol.es_privilegiado())
    }

    pub fn navegacion(&self) -> Navegacion {
        Navegacion::para(self.usuario().as_ref())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<RegistroSesion>> {
        self.inner.tx.subscribe()
    }

    /// Persists `registro`, installs its token and notifies subscribers.
    pub async fn start(&self, registro: RegistroSesion) -> Result<()> {
        let json = serde_json::to_string(&registro)?;
        self.inner.store.set(SESSION_KEY, &json).await?;
        self.inner.api.set_bearer(registro.token.clone());
        self.inner.tx.send_replace(Some(registro));
        Ok(())
    }

    /// Logs in against the backend and returns the view to land on.
    #[instrument(skip(self, contrasena))]
    pub async fn login(&self, email: &str, contrasena: &str) -> Result<Vista> {
        let usuario = usuarios::login(&self.inner.api, email, contrasena).await?;

        let token = match usuarios::obtener_token(&self.inner.api, &usuario.email, contrasena).await
        {
            Ok(auth) => Some(auth.token),
            Err(e) => {
                warn!(error = %e, "no bearer token issued; continuing without it");
                None
            }
        };

        let destino = Vista::tras_login(&usuario);
        info!(user_id = usuario.id, ?destino, "session started");
        self.start(RegistroSesion { usuario, token }).await?;
        Ok(destino)
    }

    /// Drops the persisted record and returns to the home view.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<Vista> {
        self.inner.store.delete(SESSION_KEY).await?;
        self.inner.api.set_bearer(None);
        self.inner.tx.send_replace(None);
        info!("session closed");
        Ok(Vista::Inicio)
    }
}
