use tokio::sync::broadcast;
use tracing::trace;

use super::dto::{CarritoActualizado, Modo};

/// Process-wide "cart changed" channel. Observers such as the navigation
/// badge subscribe and re-read the cart on each event.
#[derive(Clone)]
pub struct CartEvents {
    tx: broadcast::Sender<CarritoActualizado>,
}

impl CartEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CarritoActualizado> {
        self.tx.subscribe()
    }

    pub(crate) fn notify(&self, modo: Modo) {
        // no subscribers is fine
        let receivers = self.tx.send(CarritoActualizado { modo }).unwrap_or(0);
        trace!(?modo, receivers, "cart changed");
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}
