use tracing::{error, info, instrument};

use super::dto::{BusquedaNombre, Producto, ProductoForm};
use crate::error::{ApiError, Error, ErroresCampo, Result};
use crate::http::{ApiClient, Conteo};

const PRODUCTOS: &str = "productos";

/// Same rules the backend enforces on `Producto`, plus the form's own
/// category check.
pub fn validar(form: &ProductoForm) -> ErroresCampo {
    let mut errores = ErroresCampo::new();
    if form.nombre.trim().is_empty() {
        errores.insert("nombre".into(), "El nombre no puede estar vacío".into());
    }
    if form.precio < 0 {
        errores.insert("precio".into(), "El precio debe ser 0 o mayor".into());
    }
    if form.stock < 0 {
        errores.insert("stock".into(), "El stock debe ser 0 o mayor".into());
    }
    if form.categoria.map_or(true, |c| c.id <= 0) {
        errores.insert("categoria".into(), "Debes seleccionar una categoría.".into());
    }
    errores
}

fn revisar(form: &ProductoForm) -> Result<()> {
    let errores = validar(form);
    if errores.is_empty() {
        Ok(())
    } else {
        Err(Error::Campos(errores))
    }
}

fn log_err(op: &'static str) -> impl Fn(ApiError) -> Error {
    move |e| {
        error!(error = %e, op, "producto service failed");
        Error::from(e)
    }
}

#[instrument(skip(api))]
pub async fn listar(api: &ApiClient) -> Result<Vec<Producto>> {
    api.get(PRODUCTOS).await.map_err(log_err("listar"))
}

#[instrument(skip(api))]
pub async fn obtener(api: &ApiClient, id: i64) -> Result<Producto> {
    api.get(&format!("{PRODUCTOS}/{id}"))
        .await
        .map_err(log_err("obtener"))
}

#[instrument(skip(api, form), fields(nombre = %form.nombre))]
pub async fn crear(api: &ApiClient, form: &ProductoForm) -> Result<Producto> {
    revisar(form)?;
    let creado: Producto = api.post(PRODUCTOS, form).await.map_err(log_err("crear"))?;
    info!(producto_id = creado.id, "producto creado");
    Ok(creado)
}

#[instrument(skip(api, form))]
pub async fn actualizar(api: &ApiClient, id: i64, form: &ProductoForm) -> Result<Producto> {
    revisar(form)?;
    api.put(&format!("{PRODUCTOS}/{id}"), form)
        .await
        .map_err(log_err("actualizar"))
}

#[instrument(skip(api))]
pub async fn eliminar(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("{PRODUCTOS}/{id}"))
        .await
        .map_err(log_err("eliminar"))
}

#[instrument(skip(api))]
pub async fn habilitar(api: &ApiClient, id: i64) -> Result<Producto> {
    api.patch(&format!("{PRODUCTOS}/habilitar/{id}"))
        .await
        .map_err(log_err("habilitar"))
}

#[instrument(skip(api))]
pub async fn inhabilitar(api: &ApiClient, id: i64) -> Result<Producto> {
    api.patch(&format!("{PRODUCTOS}/inhabilitar/{id}"))
        .await
        .map_err(log_err("inhabilitar"))
}

#[instrument(skip(api))]
pub async fn por_categoria(api: &ApiClient, categoria_id: i64) -> Result<Vec<Producto>> {
    api.get(&format!("{PRODUCTOS}/buscar/categoria/{categoria_id}"))
        .await
        .map_err(log_err("por_categoria"))
}

#[instrument(skip(api))]
pub async fn buscar_por_nombre(api: &ApiClient, nombre: &str) -> Result<Vec<Producto>> {
    api.get_query(
        &format!("{PRODUCTOS}/buscar/nombre"),
        &BusquedaNombre { nombre },
    )
    .await
    .map_err(log_err("buscar_por_nombre"))
}

#[instrument(skip(api))]
pub async fn contar(api: &ApiClient) -> Result<i64> {
    let c: Conteo = api
        .get(&format!("{PRODUCTOS}/stats/count"))
        .await
        .map_err(log_err("contar"))?;
    Ok(c.valor())
}

#[instrument(skip(api))]
pub async fn contar_stock_bajo(api: &ApiClient) -> Result<i64> {
    let c: Conteo = api
        .get(&format!("{PRODUCTOS}/stats/low-stock"))
        .await
        .map_err(log_err("contar_stock_bajo"))?;
    Ok(c.valor())
}

#[instrument(skip(api))]
pub async fn listar_stock_bajo(api: &ApiClient) -> Result<Vec<Producto>> {
    api.get(&format!("{PRODUCTOS}/stats/low-stock-list"))
        .await
        .map_err(log_err("listar_stock_bajo"))
}
