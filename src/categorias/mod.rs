mod services;

use serde::{Deserialize, Serialize};

pub use services::{actualizar, crear, eliminar, listar, obtener};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Categoria {
    pub id: i64,
    pub nombre: String,
}

/// Body for create/update; the id travels in the path.
#[derive(Debug, Serialize)]
pub struct CategoriaForm<'a> {
    pub nombre: &'a str,
}
