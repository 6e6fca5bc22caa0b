//! Shopping cart with one API for both modes: a local cart for anonymous
//! visitors and the server-backed cart once a user is logged in. The mode
//! is picked on every call from the current session.

pub mod dto;
mod events;
mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{instrument, warn};

pub use dto::{normalizar, CarritoActualizado, ItemCarrito, Modo};
pub use events::CartEvents;
pub use local::LocalCart;
pub use remote::RemoteCart;

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::productos::Producto;
use crate::session::Session;
use crate::storage::Store;

/// Capability set shared by the local and remote carts.
#[async_trait]
pub trait CartBackend: Send + Sync {
    async fn items(&self) -> Result<Vec<ItemCarrito>>;
    async fn add(&self, producto: &Producto, cantidad: u32) -> Result<()>;
    async fn remove(&self, producto_id: i64) -> Result<()>;
    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<u32> {
        Ok(dto::contar(&self.items().await?))
    }
}

/// Rejects quantities below 1 or above the product's stock snapshot.
pub fn validar_cantidad(producto: &Producto, cantidad: u32) -> Result<()> {
    if cantidad < 1 {
        return Err(Error::CantidadInvalida);
    }
    if cantidad > producto.stock {
        return Err(Error::StockInsuficiente {
            disponible: producto.stock,
        });
    }
    Ok(())
}

/// Rejects an add whose merged line would exceed the stock snapshot.
pub(crate) fn validar_fusion(
    items: &[ItemCarrito],
    producto: &Producto,
    cantidad: u32,
) -> Result<()> {
    let existente = items
        .iter()
        .find(|i| i.producto.id == producto.id)
        .map_or(0, |i| i.cantidad);
    if existente.saturating_add(cantidad) > producto.stock {
        return Err(Error::StockInsuficiente {
            disponible: producto.stock.saturating_sub(existente),
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct Cart {
    local: Arc<dyn CartBackend>,
    remote: Arc<dyn CartBackend>,
    session: Session,
    events: CartEvents,
}

impl Cart {
    pub fn new(store: Arc<dyn Store>, api: ApiClient, session: Session) -> Self {
        Self::with_backends(
            Arc::new(LocalCart::new(store)),
            Arc::new(RemoteCart::new(api)),
            session,
        )
    }

    /// Builds a cart over arbitrary strategies, e.g. test doubles.
    pub fn with_backends(
        local: Arc<dyn CartBackend>,
        remote: Arc<dyn CartBackend>,
        session: Session,
    ) -> Self {
        Self {
            local,
            remote,
            session,
            events: CartEvents::new(),
        }
    }

    pub fn modo(&self) -> Modo {
        if self.session.is_authenticated() {
            Modo::Remoto
        } else {
            Modo::Local
        }
    }

    fn backend(&self) -> (&dyn CartBackend, Modo) {
        match self.modo() {
            Modo::Remoto => (self.remote.as_ref(), Modo::Remoto),
            Modo::Local => (self.local.as_ref(), Modo::Local),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CarritoActualizado> {
        self.events.subscribe()
    }

    /// Current items. Read failures degrade to an empty cart.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Vec<ItemCarrito> {
        let (backend, modo) = self.backend();
        match backend.items().await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, ?modo, "cart read failed; showing empty cart");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, producto), fields(producto_id = producto.id))]
    pub async fn add_item(&self, producto: &Producto, cantidad: u32) -> Result<()> {
        validar_cantidad(producto, cantidad)?;
        let (backend, modo) = self.backend();
        backend.add(producto, cantidad).await?;
        self.events.notify(modo);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, producto_id: i64) -> Result<()> {
        let (backend, modo) = self.backend();
        backend.remove(producto_id).await?;
        self.events.notify(modo);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let (backend, modo) = self.backend();
        backend.clear().await?;
        self.events.notify(modo);
        Ok(())
    }

    /// Sum of quantities, not number of lines.
    pub async fn count(&self) -> u32 {
        dto::contar(&self.get_cart().await)
    }

    pub async fn total(&self) -> i64 {
        dto::total(&self.get_cart().await)
    }
}
