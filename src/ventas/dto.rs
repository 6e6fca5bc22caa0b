use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::carrito::ItemCarrito;
use crate::productos::Producto;

/// IVA rate in percent. Catalogue prices already include it.
pub const IVA_PCT: i64 = 19;

/// A completed sale (the receipt), as returned by `POST /ventas`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venta {
    pub id: i64,
    #[serde(default, with = "crate::fecha::opcional")]
    pub fecha: Option<PrimitiveDateTime>,
    pub total: i64,
    #[serde(default)]
    pub monto_neto: i64,
    #[serde(default)]
    pub monto_iva: i64,
    #[serde(default)]
    pub detalles: Vec<DetalleVenta>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetalleVenta {
    #[serde(default)]
    pub id: Option<i64>,
    pub producto: Producto,
    pub cantidad: u32,
    /// Price at the time of the sale.
    #[serde(default)]
    pub precio_unitario: Option<i64>,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemCompra {
    pub producto_id: i64,
    pub cantidad: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompraRequest {
    pub items: Vec<ItemCompra>,
}

impl CompraRequest {
    pub fn desde_carrito(items: &[ItemCarrito]) -> Self {
        Self {
            items: items
                .iter()
                .map(|i| ItemCompra {
                    producto_id: i.producto.id,
                    cantidad: i.cantidad,
                })
                .collect(),
        }
    }
}

/// Net/IVA split of an IVA-inclusive total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Desglose {
    pub neto: i64,
    pub iva: i64,
    pub total: i64,
}

impl Desglose {
    /// neto = round(total / 1.19), half up; iva takes the remainder.
    pub fn desde_total(total: i64) -> Self {
        let divisor = 100 + IVA_PCT;
        let neto = (total * 200 + divisor).div_euclid(2 * divisor);
        Self {
            neto,
            iva: total - neto,
            total,
        }
    }
}
