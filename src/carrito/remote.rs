use async_trait::async_trait;
use tracing::{error, info, instrument};

use super::dto::{normalizar, AgregarItem, CarritoRemoto, ItemCarrito};
use super::{validar_fusion, CartBackend};
use crate::error::Result;
use crate::http::ApiClient;
use crate::productos::Producto;

const CARRITO: &str = "carrito";

/// Server-backed cart for logged-in users; the backend identifies the
/// owner from the bearer token.
#[derive(Clone)]
pub struct RemoteCart {
    api: ApiClient,
}

impl RemoteCart {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CartBackend for RemoteCart {
    #[instrument(skip(self))]
    async fn items(&self) -> Result<Vec<ItemCarrito>> {
        let carrito: CarritoRemoto = self.api.get(CARRITO).await?;
        Ok(normalizar(carrito))
    }

    #[instrument(skip(self, producto), fields(producto_id = producto.id))]
    async fn add(&self, producto: &Producto, cantidad: u32) -> Result<()> {
        // the server merges without checking stock
        validar_fusion(&self.items().await?, producto, cantidad)?;
        let body = AgregarItem {
            producto_id: producto.id,
            cantidad,
        };
        self.api
            .post_empty(&format!("{CARRITO}/agregar"), &body)
            .await
            .map_err(|e| {
                error!(error = %e, producto_id = producto.id, "remote cart add failed");
                e
            })?;
        info!(producto_id = producto.id, cantidad, "remote cart add");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, producto_id: i64) -> Result<()> {
        self.api
            .delete(&format!("{CARRITO}/eliminar/{producto_id}"))
            .await
            .map_err(|e| {
                error!(error = %e, producto_id, "remote cart remove failed");
                e.into()
            })
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.api
            .delete(&format!("{CARRITO}/vaciar"))
            .await
            .map_err(|e| {
                error!(error = %e, "remote cart clear failed");
                e.into()
            })
    }
}
