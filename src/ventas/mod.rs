mod checkout;
pub mod dto;
mod services;

pub use checkout::Checkout;
pub use dto::{CompraRequest, DetalleVenta, Desglose, ItemCompra, Venta};
pub use services::{mis_compras, realizar_venta};
