use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::dto::{CompraRequest, Desglose, Venta};
use super::services;
use crate::carrito::{self, Cart};
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::session::Session;

const FALLBACK: &str = "Error al procesar la venta.";

/// Turns the current cart into a sale.
#[derive(Clone)]
pub struct Checkout {
    api: ApiClient,
    session: Session,
    cart: Cart,
    in_flight: Arc<AtomicBool>,
}

/// Releases the in-flight flag however `submit` returns.
struct EnCurso<'a>(&'a AtomicBool);

impl Drop for EnCurso<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Checkout {
    pub fn new(api: ApiClient, session: Session, cart: Cart) -> Self {
        Self {
            api,
            session,
            cart,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn en_curso(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Neto/IVA preview for the current cart.
    pub async fn resumen(&self) -> Desglose {
        Desglose::desde_total(self.cart.total().await)
    }

    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<Venta> {
        if !self.session.is_authenticated() {
            return Err(Error::SesionRequerida);
        }

        let items = self.cart.get_cart().await;
        if items.is_empty() {
            return Err(Error::CarritoVacio);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("checkout already in progress");
            return Err(Error::CompraEnCurso);
        }
        let _guard = EnCurso(&self.in_flight);

        let compra = CompraRequest::desde_carrito(&items);
        let venta = services::realizar_venta(&self.api, &compra)
            .await
            .map_err(|e| Error::Venta(e.mensaje_usuario(FALLBACK)))?;

        if let Err(e) = self.cart.clear().await {
            error!(error = %e, venta_id = venta.id, "sale registered but cart was not cleared");
        }
        info!(
            venta_id = venta.id,
            total = venta.total,
            unidades = carrito::dto::contar(&items),
            "checkout complete"
        );
        Ok(venta)
    }
}
