use crate::usuarios::Usuario;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vista {
    Inicio,
    Administrador,
}

impl Vista {
    /// Privileged roles land on the admin panel, everyone else on home.
    pub fn tras_login(usuario: &Usuario) -> Self {
        if usuario.rol.es_privilegiado() {
            Vista::Administrador
        } else {
            Vista::Inicio
        }
    }

    pub fn ruta(self) -> &'static str {
        match self {
            Vista::Inicio => "/",
            Vista::Administrador => "/administrador",
        }
    }
}

/// Which navigation entries to show for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navegacion {
    pub mostrar_admin: bool,
    /// Staff manage the shop; only customers and visitors get a cart.
    pub mostrar_carrito: bool,
    pub mostrar_acceso: bool,
    pub saludo: Option<String>,
}

impl Navegacion {
    pub fn para(usuario: Option<&Usuario>) -> Self {
        let admin = usuario.is_some_and(|u| u.rol.es_privilegiado());
        Self {
            mostrar_admin: admin,
            mostrar_carrito: !admin,
            mostrar_acceso: usuario.is_none(),
            saludo: usuario.map(|u| format!("Hola, {}", u.nombre)),
        }
    }
}
