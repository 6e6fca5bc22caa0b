use serde::{Deserialize, Serialize};

use crate::productos::Producto;

/// One cart line. Stored locally as the product's own fields plus
/// `cantidad`, the same flat shape the web shop kept in local storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemCarrito {
    #[serde(flatten)]
    pub producto: Producto,
    pub cantidad: u32,
}

impl ItemCarrito {
    pub fn subtotal(&self) -> i64 {
        self.producto.precio * i64::from(self.cantidad)
    }
}

/// Server-side cart as returned by `GET /carrito`.
#[derive(Debug, Clone, Deserialize)]
pub struct CarritoRemoto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub items: Vec<ItemCarritoRemoto>,
    #[serde(default)]
    pub total: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemCarritoRemoto {
    #[serde(default)]
    pub id: Option<i64>,
    pub producto: Producto,
    pub cantidad: u32,
}

/// Body for `POST /carrito/agregar`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgregarItem {
    pub producto_id: i64,
    pub cantidad: u32,
}

/// Notification sent once per successful cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarritoActualizado {
    pub modo: Modo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modo {
    Local,
    Remoto,
}

/// The one place the nested server shape becomes the flat client shape.
/// Lines with a non-positive quantity are dropped.
pub fn normalizar(carrito: CarritoRemoto) -> Vec<ItemCarrito> {
    carrito
        .items
        .into_iter()
        .filter(|i| i.cantidad > 0)
        .map(|i| ItemCarrito {
            producto: i.producto,
            cantidad: i.cantidad,
        })
        .collect()
}

/// Σ precio × cantidad.
pub fn total(items: &[ItemCarrito]) -> i64 {
    items.iter().map(ItemCarrito::subtotal).sum()
}

/// Σ cantidad, the number shown on the cart badge. Saturates instead of
/// overflowing on absurd server quantities.
pub fn contar(items: &[ItemCarrito]) -> u32 {
    items
        .iter()
        .fold(0u32, |acc, i| acc.saturating_add(i.cantidad))
}
