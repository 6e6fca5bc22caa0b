use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::categorias::Categoria;
use crate::usuarios::Estado;

/// Product record as returned by `/productos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Producto {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Whole pesos.
    pub precio: i64,
    pub stock: u32,
    #[serde(default)]
    pub categoria: Option<Categoria>,
    #[serde(default)]
    pub estado: Estado,
    #[serde(default)]
    pub imagen: Option<String>,
    #[serde(
        default,
        with = "crate::fecha::opcional",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_creacion: Option<PrimitiveDateTime>,
}

impl Producto {
    pub fn agotado(&self) -> bool {
        self.stock == 0
    }

    /// Absolute image url; the backend stores paths like `/uploads/x.jpg`.
    pub fn imagen_url(&self, asset_base_url: &str) -> Option<String> {
        let path = self.imagen.as_deref().filter(|p| !p.is_empty())?;
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        Some(format!(
            "{}/{}",
            asset_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoriaRef {
    pub id: i64,
}

/// Create/update body for `/productos`. Numbers stay signed so negative
/// input can be reported as a field error instead of failing to parse.
#[derive(Debug, Clone, Serialize)]
pub struct ProductoForm {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub precio: i64,
    pub stock: i64,
    pub categoria: Option<CategoriaRef>,
    pub estado: Estado,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen: Option<String>,
}

impl ProductoForm {
    /// Prefills an edit form from an existing product.
    pub fn desde(producto: &Producto) -> Self {
        Self {
            nombre: producto.nombre.clone(),
            descripcion: producto.descripcion.clone(),
            precio: producto.precio,
            stock: i64::from(producto.stock),
            categoria: producto.categoria.as_ref().map(|c| CategoriaRef { id: c.id }),
            estado: producto.estado,
            imagen: producto.imagen.clone(),
        }
    }
}

/// `{ "url": "/uploads/..." }` returned by the upload endpoint.
#[derive(Debug, Deserialize)]
pub struct UrlImagen {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BusquedaNombre<'a> {
    pub nombre: &'a str,
}
