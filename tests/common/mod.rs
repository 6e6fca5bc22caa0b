//! In-process stand-in for the Dulces Mila REST backend.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use dulces_mila::config::{ApiConfig, AppConfig};
use dulces_mila::storage::{MemoryStore, Store};
use dulces_mila::AppState;

pub const PASSWORD: &str = "secreto123";

pub struct Db {
    pub productos: Vec<Value>,
    pub categorias: Vec<Value>,
    pub usuarios: Vec<Value>,
    /// (producto_id, cantidad) of the server cart.
    pub carrito: Vec<(i64, u32)>,
    pub ventas: Vec<Value>,
    /// Products `POST /ventas` no longer finds.
    pub descontinuados: Vec<i64>,
    /// Authorization header seen on the last cart request.
    pub ultimo_auth: Option<String>,
    pub subidas: Vec<(String, String, usize)>,
    /// When set, `POST /auth/login` fails.
    pub sin_token: bool,
    /// Body of the last create/update request, as received.
    pub ultimo_cuerpo: Option<Value>,
}

impl Default for Db {
    fn default() -> Self {
        Self {
            productos: catalogo(),
            categorias: vec![
                json!({"id": 1, "nombre": "Galletas"}),
                json!({"id": 2, "nombre": "Tortas"}),
            ],
            usuarios: Vec::new(),
            carrito: Vec::new(),
            ventas: Vec::new(),
            descontinuados: Vec::new(),
            ultimo_auth: None,
            subidas: Vec::new(),
            sin_token: false,
            ultimo_cuerpo: None,
        }
    }
}

impl Db {
    pub fn producto(&self, id: i64) -> Option<Value> {
        self.productos.iter().find(|p| p["id"] == id).cloned()
    }

    pub fn usuario(&self, id: i64) -> Option<Value> {
        self.usuarios.iter().find(|u| u["id"] == id).cloned()
    }
}

pub type Shared = Arc<Mutex<Db>>;

pub struct Backend {
    pub addr: SocketAddr,
    pub db: Shared,
}

impl Backend {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            store_url: "sqlite::memory:".into(),
            api: ApiConfig {
                base_url: format!("http://{}/api", self.addr),
                asset_base_url: format!("http://{}", self.addr),
                timeout_secs: 5,
            },
            codigo_vendedor: "MILA2025".into(),
        }
    }

    pub async fn state(&self) -> AppState {
        self.state_with(Arc::new(MemoryStore::new())).await
    }

    pub async fn state_with(&self, store: Arc<dyn Store>) -> AppState {
        AppState::from_parts(Arc::new(self.config()), store)
            .await
            .unwrap()
    }
}

pub async fn spawn() -> Backend {
    let db: Shared = Arc::default();
    let app = Router::new()
        .route("/api/usuarios/login", post(login))
        .route("/api/auth/login", post(token))
        .route("/api/usuarios", get(usuarios).post(crear_usuario))
        .route("/api/usuarios/activos", get(usuarios_activos))
        .route(
            "/api/usuarios/:id",
            get(usuario).put(actualizar_usuario).delete(eliminar_usuario),
        )
        .route("/api/usuarios/habilitar/:id", patch(habilitar_usuario))
        .route("/api/usuarios/inhabilitar/:id", patch(inhabilitar_usuario))
        .route("/api/usuarios/stats/count", get(|| async { Json(json!({"count": 12})) }))
        .route("/api/productos", get(productos).post(crear_producto))
        .route(
            "/api/productos/:id",
            get(producto)
                .put(actualizar_producto)
                .delete(eliminar_producto),
        )
        .route("/api/productos/habilitar/:id", patch(habilitar_producto))
        .route("/api/productos/inhabilitar/:id", patch(inhabilitar_producto))
        .route("/api/productos/buscar/nombre", get(buscar))
        .route("/api/productos/buscar/categoria/:id", get(por_categoria))
        .route("/api/productos/stats/low-stock-list", get(stock_bajo))
        .route("/api/productos/stats/count", get(|| async { Json(json!({"count": 3})) }))
        .route(
            "/api/productos/stats/low-stock",
            get(|| async { Json(json!({"count": 1})) }),
        )
        .route("/api/productos/upload", post(upload))
        .route("/api/categorias", get(categorias).post(crear_categoria))
        .route(
            "/api/categorias/:id",
            get(categoria)
                .put(actualizar_categoria)
                .delete(eliminar_categoria),
        )
        .route("/api/carrito", get(carrito))
        .route("/api/carrito/agregar", post(agregar))
        .route("/api/carrito/eliminar/:id", delete(eliminar))
        .route("/api/carrito/vaciar", delete(vaciar))
        .route("/api/ventas", post(venta))
        .route("/api/ventas/mis-compras", get(mis_compras))
        .with_state(db.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Backend { addr, db }
}

pub fn catalogo() -> Vec<Value> {
    vec![
        json!({"id": 1, "nombre": "Alfajor", "precio": 1000, "stock": 10, "estado": "ACTIVO",
               "categoria": {"id": 1, "nombre": "Galletas"}, "imagen": "/uploads/alfajor.jpg"}),
        json!({"id": 2, "nombre": "Brownie", "precio": 500, "stock": 4, "estado": "ACTIVO",
               "categoria": {"id": 1, "nombre": "Galletas"}}),
        json!({"id": 99, "nombre": "Torta", "precio": 15000, "stock": 1, "estado": "ACTIVO",
               "categoria": {"id": 2, "nombre": "Tortas"}}),
    ]
}

fn rol_para(email: &str) -> &'static str {
    if email.starts_with("admin") {
        "SUPER_ADMIN"
    } else if email.starts_with("vendedor") {
        "VENDEDOR"
    } else {
        "CLIENTE"
    }
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn no_encontrado(que: &str, id: i64) -> Response {
    error(
        StatusCode::NOT_FOUND,
        json!({"message": format!("{que} no encontrado ID: {id}")}),
    )
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if body["contraseña"] != PASSWORD {
        return error(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Credenciales incorrectas o usuario inactivo"}),
        );
    }
    Json(json!({
        "id": 3,
        "nombre": "Pedro",
        "email": email,
        "contraseña": "$2a$10$hash",
        "rol": rol_para(email),
        "estado": "ACTIVO",
        "fechaCreacion": "2025-10-01T09:00:00.5"
    }))
    .into_response()
}

async fn token(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    if db.lock().unwrap().sin_token {
        return error(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "no disponible"}));
    }
    let email = body["email"].as_str().unwrap_or_default();
    Json(json!({
        "token": format!("tok-{email}"),
        "refreshToken": "refresh",
        "email": email,
        "nombre": "Pedro",
        "rol": rol_para(email)
    }))
    .into_response()
}

// --- usuarios ---

async fn usuarios(State(db): State<Shared>) -> Json<Vec<Value>> {
    Json(db.lock().unwrap().usuarios.clone())
}

async fn usuarios_activos(State(db): State<Shared>) -> Json<Vec<Value>> {
    let db = db.lock().unwrap();
    Json(
        db.usuarios
            .iter()
            .filter(|u| u["estado"] == "ACTIVO")
            .cloned()
            .collect(),
    )
}

async fn usuario(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    match db.lock().unwrap().usuario(id) {
        Some(u) => Json(u).into_response(),
        None => no_encontrado("Usuario", id),
    }
}

fn email_duplicado(db: &Db, email: &Value, excepto: Option<i64>) -> Option<Response> {
    db.usuarios
        .iter()
        .any(|u| u["email"] == *email && excepto.map_or(true, |id| u["id"] != id))
        .then(|| {
            error(
                StatusCode::BAD_REQUEST,
                json!({"email": "El email ya está registrado"}),
            )
        })
}

async fn crear_usuario(State(db): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.ultimo_cuerpo = Some(body.clone());
    if let Some(resp) = email_duplicado(&db, &body["email"], None) {
        return resp;
    }
    if let Some(obj) = body.as_object_mut() {
        obj.remove("contraseña");
        obj.insert("id".into(), json!(db.usuarios.len() as i64 + 10));
    }
    db.usuarios.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn actualizar_usuario(
    State(db): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    db.ultimo_cuerpo = Some(body.clone());
    if db.usuario(id).is_none() {
        return no_encontrado("Usuario", id);
    }
    if let Some(resp) = email_duplicado(&db, &body["email"], Some(id)) {
        return resp;
    }
    if let Some(obj) = body.as_object_mut() {
        obj.remove("contraseña");
        obj.insert("id".into(), json!(id));
    }
    for u in db.usuarios.iter_mut().filter(|u| u["id"] == id) {
        *u = body.clone();
    }
    Json(body).into_response()
}

fn cambiar_estado(lista: &mut [Value], id: i64, estado: &str) -> Option<Value> {
    let item = lista.iter_mut().find(|v| v["id"] == id)?;
    item["estado"] = json!(estado);
    Some(item.clone())
}

async fn habilitar_usuario(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    match cambiar_estado(&mut db.lock().unwrap().usuarios, id, "ACTIVO") {
        Some(u) => Json(u).into_response(),
        None => no_encontrado("Usuario", id),
    }
}

async fn inhabilitar_usuario(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    match cambiar_estado(&mut db.lock().unwrap().usuarios, id, "INACTIVO") {
        Some(u) => Json(u).into_response(),
        None => no_encontrado("Usuario", id),
    }
}

async fn eliminar_usuario(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut db = db.lock().unwrap();
    let antes = db.usuarios.len();
    db.usuarios.retain(|u| u["id"] != id);
    if db.usuarios.len() == antes {
        return no_encontrado("Usuario", id);
    }
    StatusCode::NO_CONTENT.into_response()
}

// --- productos ---

async fn productos(State(db): State<Shared>) -> Json<Vec<Value>> {
    Json(db.lock().unwrap().productos.clone())
}

async fn producto(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    match db.lock().unwrap().producto(id) {
        Some(p) => Json(p).into_response(),
        None => no_encontrado("Producto", id),
    }
}

/// Resolves `categoria: {id}` into the full category and rejects a name
/// already used by another product.
fn preparar_producto(db: &Db, body: &mut Value, id: i64) -> Result<(), Response> {
    if db
        .productos
        .iter()
        .any(|p| p["nombre"] == body["nombre"] && p["id"] != id)
    {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({"nombre": "Ya existe un producto con ese nombre"}),
        ));
    }
    let cat_id = body["categoria"]["id"].as_i64().unwrap_or_default();
    let Some(cat) = db.categorias.iter().find(|c| c["id"] == cat_id).cloned() else {
        return Err(error(
            StatusCode::BAD_REQUEST,
            json!({"categoria": "Categoría no encontrada"}),
        ));
    };
    body["categoria"] = cat;
    body["id"] = json!(id);
    Ok(())
}

async fn crear_producto(State(db): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.ultimo_cuerpo = Some(body.clone());
    let id = db
        .productos
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .max()
        .unwrap_or(0)
        + 1;
    if let Err(resp) = preparar_producto(&db, &mut body, id) {
        return resp;
    }
    db.productos.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn actualizar_producto(
    State(db): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    db.ultimo_cuerpo = Some(body.clone());
    if db.producto(id).is_none() {
        return no_encontrado("Producto", id);
    }
    if let Err(resp) = preparar_producto(&db, &mut body, id) {
        return resp;
    }
    for p in db.productos.iter_mut().filter(|p| p["id"] == id) {
        *p = body.clone();
    }
    Json(body).into_response()
}

async fn habilitar_producto(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    match cambiar_estado(&mut db.lock().unwrap().productos, id, "ACTIVO") {
        Some(p) => Json(p).into_response(),
        None => no_encontrado("Producto", id),
    }
}

async fn inhabilitar_producto(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    match cambiar_estado(&mut db.lock().unwrap().productos, id, "INACTIVO") {
        Some(p) => Json(p).into_response(),
        None => no_encontrado("Producto", id),
    }
}

async fn eliminar_producto(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut db = db.lock().unwrap();
    let antes = db.productos.len();
    db.productos.retain(|p| p["id"] != id);
    if db.productos.len() == antes {
        return no_encontrado("Producto", id);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn buscar(
    State(db): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let needle = q.get("nombre").cloned().unwrap_or_default().to_lowercase();
    let db = db.lock().unwrap();
    Json(
        db.productos
            .iter()
            .filter(|p| {
                p["nombre"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect(),
    )
}

async fn por_categoria(State(db): State<Shared>, Path(id): Path<i64>) -> Json<Vec<Value>> {
    let db = db.lock().unwrap();
    Json(
        db.productos
            .iter()
            .filter(|p| p["categoria"]["id"] == id)
            .cloned()
            .collect(),
    )
}

async fn stock_bajo(State(db): State<Shared>) -> Json<Vec<Value>> {
    let db = db.lock().unwrap();
    Json(
        db.productos
            .iter()
            .filter(|p| p["stock"].as_i64().is_some_and(|s| s < 5))
            .cloned()
            .collect(),
    )
}

async fn upload(State(db): State<Shared>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap_or_default();
        db.lock()
            .unwrap()
            .subidas
            .push((file_name.clone(), content_type, data.len()));
        return Json(json!({"url": format!("/uploads/{file_name}")})).into_response();
    }
    error(StatusCode::BAD_REQUEST, json!({"error": "Archivo vacío"}))
}

// --- categorias ---

async fn categorias(State(db): State<Shared>) -> Json<Vec<Value>> {
    Json(db.lock().unwrap().categorias.clone())
}

async fn categoria(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    let db = db.lock().unwrap();
    match db.categorias.iter().find(|c| c["id"] == id) {
        Some(c) => Json(c.clone()).into_response(),
        None => no_encontrado("Categoría", id),
    }
}

async fn crear_categoria(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    db.ultimo_cuerpo = Some(body.clone());
    let id = db
        .categorias
        .iter()
        .filter_map(|c| c["id"].as_i64())
        .max()
        .unwrap_or(0)
        + 1;
    let nueva = json!({"id": id, "nombre": body["nombre"]});
    db.categorias.push(nueva.clone());
    (StatusCode::CREATED, Json(nueva)).into_response()
}

async fn actualizar_categoria(
    State(db): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    db.ultimo_cuerpo = Some(body.clone());
    match db.categorias.iter_mut().find(|c| c["id"] == id) {
        Some(c) => {
            c["nombre"] = body["nombre"].clone();
            Json(c.clone()).into_response()
        }
        None => no_encontrado("Categoría", id),
    }
}

async fn eliminar_categoria(State(db): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut db = db.lock().unwrap();
    if db.productos.iter().any(|p| p["categoria"]["id"] == id) {
        return error(
            StatusCode::CONFLICT,
            json!({"error": "La categoría tiene productos asociados"}),
        );
    }
    let antes = db.categorias.len();
    db.categorias.retain(|c| c["id"] != id);
    if db.categorias.len() == antes {
        return no_encontrado("Categoría", id);
    }
    StatusCode::NO_CONTENT.into_response()
}

// --- carrito ---

fn autorizado(db: &Shared, headers: &HeaderMap) -> bool {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ok = auth.as_deref().is_some_and(|a| a.starts_with("Bearer "));
    db.lock().unwrap().ultimo_auth = auth;
    ok
}

fn carrito_json(db: &Db) -> Value {
    let items: Vec<Value> = db
        .carrito
        .iter()
        .enumerate()
        .filter_map(|(i, (id, cantidad))| {
            db.producto(*id)
                .map(|p| json!({"id": i as i64 + 100, "producto": p, "cantidad": cantidad}))
        })
        .collect();
    let total: i64 = items
        .iter()
        .map(|i| i["producto"]["precio"].as_i64().unwrap_or(0) * i["cantidad"].as_i64().unwrap_or(0))
        .sum();
    json!({"id": 7, "usuario": {"id": 3}, "items": items, "total": total})
}

async fn carrito(State(db): State<Shared>, headers: HeaderMap) -> Response {
    if !autorizado(&db, &headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let db = db.lock().unwrap();
    Json(carrito_json(&db)).into_response()
}

async fn agregar(State(db): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !autorizado(&db, &headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let id = body["productoId"].as_i64().unwrap_or_default();
    let cantidad = body["cantidad"].as_u64().unwrap_or_default() as u32;
    let mut db = db.lock().unwrap();
    // like the real backend: merges without looking at stock
    match db.carrito.iter_mut().find(|(p, _)| *p == id) {
        Some((_, q)) => *q += cantidad,
        None => db.carrito.push((id, cantidad)),
    }
    Json(carrito_json(&db)).into_response()
}

async fn eliminar(State(db): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !autorizado(&db, &headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let mut db = db.lock().unwrap();
    db.carrito.retain(|(p, _)| *p != id);
    Json(carrito_json(&db)).into_response()
}

async fn vaciar(State(db): State<Shared>, headers: HeaderMap) -> Response {
    if !autorizado(&db, &headers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    db.lock().unwrap().carrito.clear();
    StatusCode::NO_CONTENT.into_response()
}

// --- ventas ---

async fn venta(State(db): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut db = db.lock().unwrap();
    let items = body["items"].as_array().cloned().unwrap_or_default();
    let mut detalles = Vec::new();
    let mut total = 0;
    for (n, item) in items.iter().enumerate() {
        let id = item["productoId"].as_i64().unwrap_or_default();
        let cantidad = item["cantidad"].as_i64().unwrap_or_default();
        let encontrado = db
            .producto(id)
            .filter(|_| !db.descontinuados.contains(&id));
        let Some(p) = encontrado else {
            return no_encontrado("Producto", id);
        };
        if cantidad > p["stock"].as_i64().unwrap_or(0) {
            return error(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": format!("Stock insuficiente para el producto: {}", p["nombre"].as_str().unwrap_or_default())}),
            );
        }
        let precio = p["precio"].as_i64().unwrap_or(0);
        total += precio * cantidad;
        detalles.push(json!({
            "id": n as i64 + 1,
            "producto": p,
            "cantidad": cantidad,
            "precioUnitario": precio,
            "subtotal": precio * cantidad
        }));
    }
    let neto = (total as f64 / 1.19).round() as i64;
    let venta = json!({
        "id": db.ventas.len() as i64 + 1,
        "fecha": "2025-11-20T18:30:05.123",
        "montoNeto": neto,
        "montoIva": total - neto,
        "total": total,
        "detalles": detalles
    });
    db.ventas.push(venta.clone());
    Json(venta).into_response()
}

async fn mis_compras(State(db): State<Shared>) -> Json<Vec<Value>> {
    Json(db.lock().unwrap().ventas.clone())
}
