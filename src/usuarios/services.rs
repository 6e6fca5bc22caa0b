use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::error::{ApiError, Error, ErroresCampo, Result};
use crate::http::{ApiClient, Conteo};
use crate::usuarios::dto::{
    AuthResponse, Estado, FormRegistro, LoginRequest, Rol, TokenRequest, Usuario, UsuarioForm,
};

const USUARIOS: &str = "usuarios";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Same rules the backend enforces on `Usuario`, checked before sending.
pub fn validar(form: &UsuarioForm) -> ErroresCampo {
    let mut errores = ErroresCampo::new();
    if form.nombre.trim().is_empty() {
        errores.insert("nombre".into(), "El nombre no puede estar vacío".into());
    }
    if form.email.trim().is_empty() {
        errores.insert("email".into(), "El email no puede estar vacío".into());
    } else if !is_valid_email(form.email.trim()) {
        errores.insert("email".into(), "El formato del email no es válido".into());
    }
    if let Some(pass) = &form.contrasena {
        if pass.chars().count() < 8 {
            errores.insert(
                "contraseña".into(),
                "La contraseña debe tener al menos 8 caracteres".into(),
            );
        }
    }
    errores
}

/// Empty code → CLIENTE, matching code → VENDEDOR, anything else is rejected.
pub fn rol_para_registro(codigo: &str, codigo_vendedor: &str) -> std::result::Result<Rol, ErroresCampo> {
    let codigo = codigo.trim();
    if codigo.is_empty() {
        Ok(Rol::Cliente)
    } else if codigo == codigo_vendedor {
        Ok(Rol::Vendedor)
    } else {
        let mut errores = ErroresCampo::new();
        errores.insert(
            "codigoVendedor".into(),
            "El código de vendedor no es válido.".into(),
        );
        Err(errores)
    }
}

#[instrument(skip(api, contrasena))]
pub async fn login(api: &ApiClient, email: &str, contrasena: &str) -> Result<Usuario> {
    let email = email.trim().to_lowercase();
    let body = LoginRequest {
        email: &email,
        contrasena,
    };
    match api.post::<_, Usuario>(&format!("{USUARIOS}/login"), &body).await {
        Ok(u) => {
            info!(user_id = u.id, rol = u.rol.as_str(), "login ok");
            Ok(u)
        }
        Err(e) => {
            warn!(error = %e, %email, "login failed");
            Err(e.into())
        }
    }
}

/// Bearer token for the endpoints that identify the caller (`/carrito`,
/// `/ventas`).
#[instrument(skip(api, password))]
pub async fn obtener_token(api: &ApiClient, email: &str, password: &str) -> Result<AuthResponse> {
    let body = TokenRequest { email, password };
    Ok(api.post("auth/login", &body).await?)
}

#[instrument(skip(api))]
pub async fn listar(api: &ApiClient) -> Result<Vec<Usuario>> {
    api.get(USUARIOS).await.map_err(|e| {
        error!(error = %e, "listar usuarios failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn listar_activos(api: &ApiClient) -> Result<Vec<Usuario>> {
    api.get(&format!("{USUARIOS}/activos")).await.map_err(|e| {
        error!(error = %e, "listar usuarios activos failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn obtener(api: &ApiClient, id: i64) -> Result<Usuario> {
    api.get(&format!("{USUARIOS}/{id}")).await.map_err(|e| {
        error!(error = %e, id, "obtener usuario failed");
        e.into()
    })
}

#[instrument(skip(api, form), fields(email = %form.email))]
pub async fn crear(api: &ApiClient, form: &UsuarioForm) -> Result<Usuario> {
    let errores = validar(form);
    if form.contrasena.is_none() {
        let mut errores = errores;
        errores.insert(
            "contraseña".into(),
            "La contraseña no puede estar vacía".into(),
        );
        return Err(Error::Campos(errores));
    }
    if !errores.is_empty() {
        return Err(Error::Campos(errores));
    }
    let creado: Usuario = api.post(USUARIOS, form).await.map_err(|e| {
        error!(error = %e, "crear usuario failed");
        Error::from(e)
    })?;
    info!(user_id = creado.id, "usuario creado");
    Ok(creado)
}

#[instrument(skip(api, form))]
pub async fn actualizar(api: &ApiClient, id: i64, form: &UsuarioForm) -> Result<Usuario> {
    let errores = validar(form);
    if !errores.is_empty() {
        return Err(Error::Campos(errores));
    }
    api.put(&format!("{USUARIOS}/{id}"), form).await.map_err(|e| {
        error!(error = %e, id, "actualizar usuario failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn habilitar(api: &ApiClient, id: i64) -> Result<Usuario> {
    api.patch(&format!("{USUARIOS}/habilitar/{id}"))
        .await
        .map_err(|e| {
            error!(error = %e, id, "habilitar usuario failed");
            e.into()
        })
}

#[instrument(skip(api))]
pub async fn inhabilitar(api: &ApiClient, id: i64) -> Result<Usuario> {
    api.patch(&format!("{USUARIOS}/inhabilitar/{id}"))
        .await
        .map_err(|e| {
            error!(error = %e, id, "inhabilitar usuario failed");
            e.into()
        })
}

#[instrument(skip(api))]
pub async fn eliminar(api: &ApiClient, id: i64) -> Result<()> {
    api.delete(&format!("{USUARIOS}/{id}")).await.map_err(|e| {
        error!(error = %e, id, "eliminar usuario failed");
        e.into()
    })
}

#[instrument(skip(api))]
pub async fn contar(api: &ApiClient) -> Result<i64> {
    let conteo: Conteo = api
        .get(&format!("{USUARIOS}/stats/count"))
        .await
        .map_err(|e: ApiError| {
            error!(error = %e, "contar usuarios failed");
            Error::from(e)
        })?;
    Ok(conteo.valor())
}

/// Self-registration: resolves the role from the vendor code, checks the
/// form locally and creates an ACTIVO user.
#[instrument(skip(api, form, codigo_vendedor), fields(email = %form.email))]
pub async fn registrar(
    api: &ApiClient,
    form: &FormRegistro,
    codigo_vendedor: &str,
) -> Result<Usuario> {
    let rol = rol_para_registro(&form.codigo_vendedor, codigo_vendedor).map_err(Error::Campos)?;
    let datos = UsuarioForm {
        nombre: form.nombre.trim().to_string(),
        email: form.email.trim().to_lowercase(),
        contrasena: Some(form.contrasena.clone()),
        rol,
        estado: Estado::Activo,
    };
    crear(api, &datos).await
}
