use tracing::{error, instrument};

use super::{Categoria, CategoriaForm};
use crate::error::{Error, ErroresCampo, Result};
use crate::http::ApiClient;

const CATEGORIAS: &str = "categorias";

fn validar(nombre: &str) -> Result<()> {
    if nombre.trim().is_empty() {
        let mut errores = ErroresCampo::new();
        errores.insert(
            "nombre".into(),
            "El nombre de la categoría no puede estar vacío".into(),
        );
        return Err(Error::Campos(errores));
    }
    Ok(())
}

#[instrument(skip(api))]
pub async fn listar(api: &ApiClient) -> Result<Vec<Categoria>> {
    api.get(CATEGORIAS).await.map_err(|e| {
        error!(error = %e, "listar categorias failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn obtener(api: &ApiClient, id: i64) -> Result<Categoria> {
    api.get(&format!("{CATEGORIAS}/{id}")).await.map_err(|e| {
        error!(error = %e, id, "obtener categoria failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn crear(api: &ApiClient, nombre: &str) -> Result<Categoria> {
    validar(nombre)?;
    let body = CategoriaForm {
        nombre: nombre.trim(),
    };
    api.post(CATEGORIAS, &body).await.map_err(|e| {
        error!(error = %e, "crear categoria failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn actualizar(api: &ApiClient, id: i64, nombre: &str) -> Result<Categoria> {
    validar(nombre)?;
    let body = CategoriaForm {
        nombre: nombre.trim(),
    };
    api.put(&format!("{CATEGORIAS}/{id}"), &body)
        .await
        .map_err(|e| {
            error!(error = %e, id, "actualizar categoria failed");
            e.into()
        })
}

#[instrument(skip(api))]
pub async fn eliminar(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("{CATEGORIAS}/{id}")).await.map_err(|e| {
        error!(error = %e, id, "eliminar categoria failed");
        e.into()
    })
}
