pub mod admin;
pub mod carrito;
pub mod categorias;
pub mod config;
pub mod error;
pub mod fecha;
pub mod http;
pub mod productos;
pub mod session;
pub mod state;
pub mod storage;
pub mod usuarios;
pub mod ventas;

pub use error::{ApiError, Error, Result};
pub use state::AppState;
