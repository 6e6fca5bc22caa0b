//! Dulces Mila storefront client.
//!
//! ```bash
//! dulces-mila catalogo --categoria 2
//! dulces-mila agregar 7 --cantidad 2
//! dulces-mila login cliente@correo.cl secreto123
//! dulces-mila pagar
//! dulces-mila admin
//! ```

use std::path::PathBuf;

use anyhow::Result;
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use dulces_mila::carrito::ItemCarrito;
use dulces_mila::productos::{self, CategoriaRef, Producto, ProductoForm, UploadItem};
use dulces_mila::usuarios::{self, Estado, FormRegistro, Rol, Usuario, UsuarioForm};
use dulces_mila::ventas::{self, Desglose, Venta};
use dulces_mila::{admin, categorias, fecha, AppState, Error};

#[derive(Parser)]
#[command(name = "dulces-mila")]
#[command(author, version, about = "Cliente de la tienda Dulces Mila", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Catalogo {
        /// Only products of this category id
        #[arg(long, conflicts_with = "buscar")]
        categoria: Option<i64>,
        /// Search by name
        #[arg(long)]
        buscar: Option<String>,
    },

    /// List categories, or manage them (staff only)
    Categorias {
        #[command(subcommand)]
        action: Option<CategoriaAction>,
    },

    /// Show the cart and its total
    Carrito,

    /// Add a product to the cart
    Agregar {
        producto_id: i64,
        #[arg(long, short, default_value_t = 1)]
        cantidad: u32,
    },

    /// Remove a product from the cart
    Quitar { producto_id: i64 },

    /// Empty the cart
    Vaciar,

    /// Buy everything in the cart
    Pagar,

    /// Start a session
    Login { email: String, contrasena: String },

    /// End the session
    Logout,

    /// Show who is logged in and what the navigation offers
    Sesion,

    /// Create an account
    Registro {
        nombre: String,
        email: String,
        contrasena: String,
        /// Vendor code; grants the VENDEDOR role
        #[arg(long, default_value = "")]
        codigo: String,
    },

    /// Purchase history
    Compras,

    /// Admin dashboard counters
    Admin,

    /// User administration (staff only)
    Usuarios {
        #[command(subcommand)]
        action: UsuarioAction,
    },

    /// Product administration (staff only)
    Productos {
        #[command(subcommand)]
        action: ProductoAction,
    },
}

#[derive(Subcommand)]
enum CategoriaAction {
    Ver { id: i64 },
    Crear { nombre: String },
    Editar { id: i64, nombre: String },
    Eliminar { id: i64 },
}

#[derive(Subcommand)]
enum UsuarioAction {
    Listar {
        /// Only ACTIVO users
        #[arg(long)]
        activos: bool,
    },
    Ver { id: i64 },
    Crear {
        nombre: String,
        email: String,
        contrasena: String,
        #[arg(long, value_enum, default_value = "cliente")]
        rol: RolArg,
    },
    /// Change the given fields; the rest keep their current value
    Editar {
        id: i64,
        #[arg(long)]
        nombre: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        contrasena: Option<String>,
        #[arg(long, value_enum)]
        rol: Option<RolArg>,
    },
    Habilitar { id: i64 },
    Inhabilitar { id: i64 },
    Eliminar { id: i64 },
}

#[derive(Subcommand)]
enum ProductoAction {
    /// Products with low stock
    StockBajo,
    Ver { id: i64 },
    Crear {
        nombre: String,
        #[arg(long)]
        precio: i64,
        #[arg(long)]
        stock: i64,
        /// Category id
        #[arg(long)]
        categoria: i64,
        #[arg(long)]
        descripcion: Option<String>,
        /// Image path as returned by `productos subir`
        #[arg(long)]
        imagen: Option<String>,
    },
    /// Change the given fields; the rest keep their current value
    Editar {
        id: i64,
        #[command(flatten)]
        cambios: CambiosProducto,
    },
    Habilitar { id: i64 },
    Inhabilitar { id: i64 },
    Eliminar { id: i64 },
    /// Upload a product image and print its url
    Subir {
        archivo: PathBuf,
        #[arg(long, default_value = "image/jpeg")]
        content_type: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RolArg {
    Cliente,
    Vendedor,
    SuperAdmin,
}

impl RolArg {
    fn to_rol(self) -> Rol {
        match self {
            RolArg::Cliente => Rol::Cliente,
            RolArg::Vendedor => Rol::Vendedor,
            RolArg::SuperAdmin => Rol::SuperAdmin,
        }
    }
}

#[derive(clap::Args, Default)]
struct CambiosProducto {
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    precio: Option<i64>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    categoria: Option<i64>,
    #[arg(long)]
    descripcion: Option<String>,
    #[arg(long)]
    imagen: Option<String>,
}

impl CambiosProducto {
    fn aplicar(self, form: &mut ProductoForm) {
        if let Some(nombre) = self.nombre {
            form.nombre = nombre;
        }
        if let Some(precio) = self.precio {
            form.precio = precio;
        }
        if let Some(stock) = self.stock {
            form.stock = stock;
        }
        if let Some(id) = self.categoria {
            form.categoria = Some(CategoriaRef { id });
        }
        if self.descripcion.is_some() {
            form.descripcion = self.descripcion;
        }
        if self.imagen.is_some() {
            form.imagen = self.imagen;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "dulces_mila=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let state = AppState::init().await?;

    if let Err(e) = run(&state, cli.command).await {
        match e.downcast_ref::<Error>().and_then(Error::errores_campo) {
            Some(campos) => {
                eprintln!("{e}");
                for (campo, msg) in campos {
                    eprintln!("  {campo}: {msg}");
                }
            }
            None => eprintln!("{e}"),
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(state: &AppState, command: Commands) -> Result<()> {
    let api = &state.api;
    match command {
        Commands::Catalogo { categoria, buscar } => {
            let lista = match (categoria, buscar) {
                (Some(id), _) => productos::por_categoria(api, id).await?,
                (None, Some(nombre)) => productos::buscar_por_nombre(api, &nombre).await?,
                (None, None) => productos::listar(api).await?,
            };
            for p in lista.iter().filter(|p| p.estado.es_activo()) {
                print_producto(state, p);
            }
        }
        Commands::Categorias { action: None } => {
            for c in categorias::listar(api).await? {
                println!("{:>4}  {}", c.id, c.nombre);
            }
        }
        Commands::Categorias {
            action: Some(action),
        } => {
            require_staff(state)?;
            match action {
                CategoriaAction::Ver { id } => {
                    let c = categorias::obtener(api, id).await?;
                    println!("{:>4}  {}", c.id, c.nombre);
                }
                CategoriaAction::Crear { nombre } => {
                    let c = categorias::crear(api, &nombre).await?;
                    println!("Categoría {} creada: {}", c.id, c.nombre);
                }
                CategoriaAction::Editar { id, nombre } => {
                    let c = categorias::actualizar(api, id, &nombre).await?;
                    println!("Categoría {} actualizada: {}", c.id, c.nombre);
                }
                CategoriaAction::Eliminar { id } => {
                    categorias::eliminar(api, id).await?;
                    println!("Categoría {id} eliminada.");
                }
            }
        }
        Commands::Carrito => {
            let items = state.cart.get_cart().await;
            if items.is_empty() {
                println!("Tu carrito está vacío.");
            } else {
                print_carrito(&items);
            }
        }
        Commands::Agregar {
            producto_id,
            cantidad,
        } => {
            let producto = productos::obtener(api, producto_id).await?;
            let mut eventos = state.cart.subscribe();
            state.cart.add_item(&producto, cantidad).await?;
            println!("{} x{} agregado al carrito.", producto.nombre, cantidad);
            if eventos.try_recv().is_ok() {
                print_badge(state).await;
            }
        }
        Commands::Quitar { producto_id } => {
            let mut eventos = state.cart.subscribe();
            state.cart.remove_item(producto_id).await?;
            if eventos.try_recv().is_ok() {
                print_badge(state).await;
            }
        }
        Commands::Vaciar => {
            state.cart.clear().await?;
            println!("Carrito vaciado.");
        }
        Commands::Pagar => {
            let venta = state.checkout.submit().await?;
            println!("¡Compra realizada con éxito! Boleta #{}", venta.id);
            print_venta(&venta);
        }
        Commands::Login { email, contrasena } => {
            let vista = state.session.login(&email, &contrasena).await?;
            if let Some(u) = state.session.usuario() {
                println!("Bienvenido, {} ({})", u.nombre, u.rol.as_str());
            }
            println!("→ {}", vista.ruta());
        }
        Commands::Logout => {
            let vista = state.session.logout().await?;
            println!("Sesión cerrada. → {}", vista.ruta());
        }
        Commands::Sesion => {
            let nav = state.session.navegacion();
            match &nav.saludo {
                Some(s) => println!("{s}"),
                None => println!("Sin sesión. Opciones: login, registro"),
            }
            if nav.mostrar_admin {
                println!("Panel: admin, usuarios, productos");
            }
            if nav.mostrar_carrito {
                print_badge(state).await;
            }
        }
        Commands::Registro {
            nombre,
            email,
            contrasena,
            codigo,
        } => {
            let form = FormRegistro {
                nombre,
                email,
                contrasena,
                codigo_vendedor: codigo,
            };
            let u = usuarios::registrar(api, &form, &state.config.codigo_vendedor).await?;
            println!("¡Registro exitoso! Cuenta {} creada como {}.", u.email, u.rol.as_str());
        }
        Commands::Compras => {
            let compras = ventas::mis_compras(api).await?;
            if compras.is_empty() {
                println!("No has realizado compras aún.");
            }
            for v in &compras {
                print_venta(v);
            }
        }
        Commands::Admin => {
            let r = admin::resumen(api, &state.session).await?;
            println!("Usuarios:    {}", r.total_usuarios);
            println!("Productos:   {}", r.total_productos);
            println!("Stock bajo:  {}", r.stock_bajo);
        }
        Commands::Usuarios { action } => {
            require_staff(state)?;
            match action {
                UsuarioAction::Listar { activos } => {
                    let lista = if activos {
                        usuarios::listar_activos(api).await?
                    } else {
                        usuarios::listar(api).await?
                    };
                    lista.iter().for_each(print_usuario);
                }
                UsuarioAction::Ver { id } => print_usuario(&usuarios::obtener(api, id).await?),
                UsuarioAction::Crear {
                    nombre,
                    email,
                    contrasena,
                    rol,
                } => {
                    let form = UsuarioForm {
                        nombre: nombre.trim().to_string(),
                        email: email.trim().to_lowercase(),
                        contrasena: Some(contrasena),
                        rol: rol.to_rol(),
                        estado: Estado::Activo,
                    };
                    let u = usuarios::crear(api, &form).await?;
                    println!("Usuario {} creado.", u.id);
                    print_usuario(&u);
                }
                UsuarioAction::Editar {
                    id,
                    nombre,
                    email,
                    contrasena,
                    rol,
                } => {
                    let mut form = UsuarioForm::desde(&usuarios::obtener(api, id).await?);
                    if let Some(nombre) = nombre {
                        form.nombre = nombre.trim().to_string();
                    }
                    if let Some(email) = email {
                        form.email = email.trim().to_lowercase();
                    }
                    if let Some(rol) = rol {
                        form.rol = rol.to_rol();
                    }
                    form.contrasena = contrasena;
                    print_usuario(&usuarios::actualizar(api, id, &form).await?);
                }
                UsuarioAction::Habilitar { id } => print_usuario(&usuarios::habilitar(api, id).await?),
                UsuarioAction::Inhabilitar { id } => {
                    print_usuario(&usuarios::inhabilitar(api, id).await?)
                }
                UsuarioAction::Eliminar { id } => {
                    usuarios::eliminar(api, id).await?;
                    println!("Usuario {id} eliminado.");
                }
            }
        }
        Commands::Productos { action } => {
            require_staff(state)?;
            match action {
                ProductoAction::StockBajo => {
                    for p in productos::listar_stock_bajo(api).await? {
                        print_producto(state, &p);
                    }
                }
                ProductoAction::Ver { id } => print_producto(state, &productos::obtener(api, id).await?),
                ProductoAction::Crear {
                    nombre,
                    precio,
                    stock,
                    categoria,
                    descripcion,
                    imagen,
                } => {
                    let form = ProductoForm {
                        nombre: nombre.trim().to_string(),
                        descripcion,
                        precio,
                        stock,
                        categoria: Some(CategoriaRef { id: categoria }),
                        estado: Estado::Activo,
                        imagen,
                    };
                    let p = productos::crear(api, &form).await?;
                    println!("Producto {} creado.", p.id);
                    print_producto(state, &p);
                }
                ProductoAction::Editar { id, cambios } => {
                    let mut form = ProductoForm::desde(&productos::obtener(api, id).await?);
                    cambios.aplicar(&mut form);
                    print_producto(state, &productos::actualizar(api, id, &form).await?);
                }
                ProductoAction::Habilitar { id } => {
                    print_producto(state, &productos::habilitar(api, id).await?)
                }
                ProductoAction::Inhabilitar { id } => {
                    print_producto(state, &productos::inhabilitar(api, id).await?)
                }
                ProductoAction::Eliminar { id } => {
                    productos::eliminar(api, id).await?;
                    println!("Producto {id} eliminado.");
                }
                ProductoAction::Subir {
                    archivo,
                    content_type,
                } => {
                    let body = Bytes::from(tokio::fs::read(&archivo).await?);
                    let nombre = archivo
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("imagen");
                    let url = productos::subir_imagen(
                        api,
                        UploadItem {
                            body,
                            content_type: &content_type,
                            nombre,
                        },
                    )
                    .await?;
                    info!(%url, "image uploaded");
                    println!("{url}");
                }
            }
        }
    }
    Ok(())
}

fn require_staff(state: &AppState) -> Result<(), Error> {
    if state.session.is_privileged() {
        Ok(())
    } else {
        warn!("staff command refused");
        Err(Error::AccesoDenegado)
    }
}

async fn print_badge(state: &AppState) {
    println!("🛒 {}", state.cart.count().await);
}

fn print_producto(state: &AppState, p: &Producto) {
    let categoria = p.categoria.as_ref().map_or("-", |c| c.nombre.as_str());
    let stock = if p.agotado() {
        "Agotado".to_string()
    } else {
        format!("stock {}", p.stock)
    };
    println!("{:>4}  {:<32} ${:>8}  {:<12} {}", p.id, p.nombre, p.precio, stock, categoria);
    if let Some(url) = p.imagen_url(&state.config.api.asset_base_url) {
        println!("      {url}");
    }
}

fn print_carrito(items: &[ItemCarrito]) {
    for i in items {
        println!(
            "{:>4}  {:<32} {:>3} x ${:>8} = ${:>9}",
            i.producto.id,
            i.producto.nombre,
            i.cantidad,
            i.producto.precio,
            i.subtotal()
        );
    }
    let total = dulces_mila::carrito::dto::total(items);
    let d = Desglose::desde_total(total);
    println!("Neto: ${} | IVA (19%): ${}", d.neto, d.iva);
    println!("Total: ${total}");
}

fn print_venta(v: &Venta) {
    let fecha = v.fecha.as_ref().map(fecha::fecha_corta).unwrap_or_default();
    println!("Boleta #{}  {}  ${}", v.id, fecha, v.total);
    for d in &v.detalles {
        println!("    {} x{}  ${}", d.producto.nombre, d.cantidad, d.subtotal);
    }
    println!("    Neto: ${} | IVA (19%): ${}", v.monto_neto, v.monto_iva);
}

fn print_usuario(u: &Usuario) {
    println!(
        "{:>4}  {:<24} {:<28} {:<12} {:?}",
        u.id,
        u.nombre,
        u.email,
        u.rol.as_str(),
        u.estado
    );
}
