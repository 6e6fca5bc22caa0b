use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// Role stored on the backend as its uppercase name.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rol {
    Cliente,
    Vendedor,
    SuperAdmin,
}

impl Rol {
    /// VENDEDOR and SUPER_ADMIN can reach the admin views.
    pub fn es_privilegiado(self) -> bool {
        matches!(self, Rol::Vendedor | Rol::SuperAdmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rol::Cliente => "CLIENTE",
            Rol::Vendedor => "VENDEDOR",
            Rol::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

/// Soft-disable flag shared by users and products.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Estado {
    #[default]
    Activo,
    Inactivo,
}

impl Estado {
    pub fn es_activo(self) -> bool {
        self == Estado::Activo
    }
}

/// User record as returned by `/usuarios`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
    #[serde(default)]
    pub estado: Estado,
    #[serde(
        default,
        with = "crate::fecha::opcional",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_creacion: Option<PrimitiveDateTime>,
}

/// Body for `POST /usuarios/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    #[serde(rename = "contraseña")]
    pub contrasena: &'a str,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub email: String,
    pub nombre: String,
    pub rol: String,
}

/// Create/update body for `/usuarios`. The password is only sent when set,
/// so an edit leaves it untouched.
#[derive(Debug, Clone, Serialize)]
pub struct UsuarioForm {
    pub nombre: String,
    pub email: String,
    #[serde(rename = "contraseña", skip_serializing_if = "Option::is_none")]
    pub contrasena: Option<String>,
    pub rol: Rol,
    pub estado: Estado,
}

impl UsuarioForm {
    /// Prefills an edit form; the password stays unset.
    pub fn desde(usuario: &Usuario) -> Self {
        Self {
            nombre: usuario.nombre.clone(),
            email: usuario.email.clone(),
            contrasena: None,
            rol: usuario.rol,
            estado: usuario.estado,
        }
    }
}

/// Self-registration input, before the role is resolved.
#[derive(Debug, Clone, Default)]
pub struct FormRegistro {
    pub nombre: String,
    pub email: String,
    pub contrasena: String,
    pub codigo_vendedor: String,
}
