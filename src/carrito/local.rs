use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::dto::ItemCarrito;
use super::{validar_fusion, CartBackend};
use crate::error::Result;
use crate::productos::Producto;
use crate::storage::{Store, CART_KEY};

/// Anonymous cart kept in the local store under `CART_KEY`.
#[derive(Clone)]
pub struct LocalCart {
    store: Arc<dyn Store>,
}

impl LocalCart {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn save(&self, items: &[ItemCarrito]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.store.set(CART_KEY, &json).await?;
        Ok(())
    }
}

#[async_trait]
impl CartBackend for LocalCart {
    async fn items(&self) -> Result<Vec<ItemCarrito>> {
        let Some(raw) = self.store.get(CART_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<ItemCarrito>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(error = %e, "stored cart is unreadable; starting empty");
                Ok(Vec::new())
            }
        }
    }

    async fn add(&self, producto: &Producto, cantidad: u32) -> Result<()> {
        let mut items = self.items().await?;
        validar_fusion(&items, producto, cantidad)?;
        match items.iter_mut().find(|i| i.producto.id == producto.id) {
            Some(item) => {
                item.cantidad += cantidad;
                item.producto = producto.clone();
            }
            None => items.push(ItemCarrito {
                producto: producto.clone(),
                cantidad,
            }),
        }
        self.save(&items).await?;
        debug!(producto_id = producto.id, cantidad, "local cart add");
        Ok(())
    }

    async fn remove(&self, producto_id: i64) -> Result<()> {
        let mut items = self.items().await?;
        items.retain(|i| i.producto.id != producto_id);
        self.save(&items).await
    }

    async fn clear(&self) -> Result<()> {
        self.store.delete(CART_KEY).await?;
        Ok(())
    }
}
