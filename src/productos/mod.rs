pub mod dto;
mod images;
pub mod services;

pub use dto::{CategoriaRef, Producto, ProductoForm};
pub use images::{subir_imagen, UploadItem};
pub use services::{
    actualizar, buscar_por_nombre, contar, contar_stock_bajo, crear, eliminar, habilitar,
    inhabilitar, listar, listar_stock_bajo, obtener, por_categoria,
};
