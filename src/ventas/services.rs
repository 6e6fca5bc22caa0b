use tracing::{error, info, instrument};

use super::dto::{CompraRequest, Venta};
use crate::error::{ApiError, Result};
use crate::http::ApiClient;

const VENTAS: &str = "ventas";

/// Sends the purchase in a single request. The backend checks stock,
/// prices each line and computes the IVA split.
#[instrument(skip(api, compra), fields(lineas = compra.items.len()))]
pub async fn realizar_venta(api: &ApiClient, compra: &CompraRequest) -> Result<Venta, ApiError> {
    let venta: Venta = api.post(VENTAS, compra).await.map_err(|e| {
        error!(error = %e, "venta rejected");
        e
    })?;
    info!(venta_id = venta.id, total = venta.total, "venta registrada");
    Ok(venta)
}

/// Purchase history of the logged-in user, newest first.
#[instrument(skip(api))]
pub async fn mis_compras(api: &ApiClient) -> Result<Vec<Venta>> {
    let mut ventas: Vec<Venta> = api
        .get(&format!("{VENTAS}/mis-compras"))
        .await
        .map_err(|e| {
            error!(error = %e, "could not load purchase history");
            e
        })?;
    ventas.sort_by(|a, b| b.fecha.cmp(&a.fecha).then(b.id.cmp(&a.id)));
    Ok(ventas)
}
