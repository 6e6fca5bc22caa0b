use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → user-facing message, as returned by the backend on 400
/// and as produced by the client-side form checks.
pub type ErroresCampo = BTreeMap<String, String>;

/// Failures talking to the backend, normalized once in `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Error de red: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Por favor, corrige los errores.")]
    Validation(ErroresCampo),

    /// Carries the body's `message`/`error` text when there was one.
    #[error("Recurso no encontrado")]
    NotFound(Option<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Error del servidor: {status} {message}")]
    Status { status: u16, message: String },

    #[error("Respuesta inesperada del servidor: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Message to show the user for an action that failed, falling back to
    /// `fallback` when the backend gave nothing useful.
    pub fn mensaje_usuario(&self, fallback: &str) -> String {
        match self {
            ApiError::Network(_) => "Error de conexión.".to_string(),
            ApiError::Unauthorized(m) if !m.is_empty() => m.clone(),
            ApiError::NotFound(Some(m)) if !m.is_empty() => m.clone(),
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Error de almacenamiento local: {0}")]
    Store(#[from] StoreError),

    #[error("Error al serializar datos locales: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("La cantidad debe ser al menos 1.")]
    CantidadInvalida,

    #[error("No puedes agregar más de {disponible} (stock disponible).")]
    StockInsuficiente { disponible: u32 },

    #[error("El carrito está vacío.")]
    CarritoVacio,

    #[error("Debes iniciar sesión para realizar una compra.")]
    SesionRequerida,

    #[error("Ya hay una compra en proceso.")]
    CompraEnCurso,

    #[error("Acceso restringido a vendedores y administradores.")]
    AccesoDenegado,

    #[error("Por favor, corrige los errores.")]
    Campos(ErroresCampo),

    #[error("{0}")]
    Venta(String),
}

impl Error {
    /// Field errors to render inline, whether they came from the backend or
    /// from the local form checks.
    pub fn errores_campo(&self) -> Option<&ErroresCampo> {
        match self {
            Error::Campos(e) | Error::Api(ApiError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
