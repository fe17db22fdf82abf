use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::gateway::{PixGateway, RetryingGateway};
use crate::settings::Settings;

pub mod checkout;
pub mod pix;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Pix error: {0}")]
    Pix(#[from] pix::PixError),
    #[error("Gateway error: {0} -> {1}")]
    Gateway(String, String),
    #[error("Invalid expiry: {0} seconds")]
    InvalidExpiry(u64),
    #[error("Charge not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

/// Spawns the checkout service on the current runtime and returns its request channel.
///
/// The gateway is wrapped in a [`RetryingGateway`] configured from `settings.checkout`.
pub fn start_checkout_service<G: PixGateway>(
    gateway: G,
    settings: &Settings,
) -> mpsc::Sender<checkout::CheckoutRequest> {
    let (checkout_tx, mut checkout_rx) = mpsc::channel(512);

    let gateway: Arc<dyn PixGateway> = Arc::new(RetryingGateway::new(
        gateway,
        settings.checkout.retry_attempts,
        Duration::from_millis(settings.checkout.retry_delay_ms),
    ));
    let handler = checkout::CheckoutRequestHandler::new(
        gateway,
        settings.merchant.clone(),
        settings.checkout.expires_in,
        settings.checkout.retention_secs,
    );
    let mut checkout_service = checkout::CheckoutService::new();

    log::info!("Starting checkout service.");
    tokio::spawn(async move {
        checkout_service.run(handler, &mut checkout_rx).await;
        log::info!("Checkout service stopped.");
    });

    checkout_tx
}
