use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::session::Session;
use crate::{productos, usuarios};

/// Dashboard counters for the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumenAdmin {
    pub total_usuarios: i64,
    pub total_productos: i64,
    pub stock_bajo: i64,
}

/// Fetches the three counters concurrently. Staff only.
#[instrument(skip(api, session))]
pub async fn resumen(api: &ApiClient, session: &Session) -> Result<ResumenAdmin> {
    if !session.is_privileged() {
        return Err(Error::AccesoDenegado);
    }
    let (total_usuarios, total_productos, stock_bajo) = tokio::try_join!(
        usuarios::contar(api),
        productos::contar(api),
        productos::contar_stock_bajo(api),
    )?;
    info!(total_usuarios, total_productos, stock_bajo, "admin summary");
    Ok(ResumenAdmin {
        total_usuarios,
        total_productos,
        stock_bajo,
    })
}
