pub mod dto;
pub mod services;

pub use dto::{Estado, FormRegistro, Rol, Usuario, UsuarioForm};
pub use services::{
    actualizar, contar, crear, eliminar, habilitar, inhabilitar, listar, listar_activos, login,
    obtener, obtener_token, registrar,
};
