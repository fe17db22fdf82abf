use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::charge::{ChargeRequest, PixCharge};

/// Remote PIX provider. Implementations own their transport and credentials.
#[async_trait]
pub trait PixGateway: Send + Sync + 'static {
    async fn generate(&self, request: &ChargeRequest) -> Result<PixCharge, anyhow::Error>;

    async fn check_status(&self, transaction_id: &str) -> Result<PixCharge, anyhow::Error>;

    async fn cancel(&self, transaction_id: &str) -> Result<(), anyhow::Error>;
}

#[async_trait]
impl<G: PixGateway + ?Sized> PixGateway for Arc<G> {
    async fn generate(&self, request: &ChargeRequest) -> Result<PixCharge, anyhow::Error> {
        (**self).generate(request).await
    }

    async fn check_status(&self, transaction_id: &str) -> Result<PixCharge, anyhow::Error> {
        (**self).check_status(transaction_id).await
    }

    async fn cancel(&self, transaction_id: &str) -> Result<(), anyhow::Error> {
        (**self).cancel(transaction_id).await
    }
}

/// Retries every call a fixed number of times with a constant pause in between.
pub struct RetryingGateway<G> {
    inner: G,
    attempts: u32,
    delay: Duration,
}

impl<G: PixGateway> RetryingGateway<G> {
    pub fn new(inner: G, attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            delay,
        }
    }

    async fn backoff(&self, operation: &str, attempt: u32, e: &anyhow::Error) {
        log::warn!(
            "Gateway {} failed (attempt {}/{}): {}",
            operation,
            attempt,
            self.attempts,
            e
        );

        if attempt < self.attempts {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl<G: PixGateway> PixGateway for RetryingGateway<G> {
    async fn generate(&self, request: &ChargeRequest) -> Result<PixCharge, anyhow::Error> {
        let mut attempt = 1;
        loop {
            match self.inner.generate(request).await {
                Ok(charge) => return Ok(charge),
                Err(e) if attempt >= self.attempts => return Err(e),
                Err(e) => self.backoff("generate", attempt, &e).await,
            }
            attempt += 1;
        }
    }

    async fn check_status(&self, transaction_id: &str) -> Result<PixCharge, anyhow::Error> {
        let mut attempt = 1;
        loop {
            match self.inner.check_status(transaction_id).await {
                Ok(charge) => return Ok(charge),
                Err(e) if attempt >= self.attempts => return Err(e),
                Err(e) => self.backoff("check_status", attempt, &e).await,
            }
            attempt += 1;
        }
    }

    async fn cancel(&self, transaction_id: &str) -> Result<(), anyhow::Error> {
        let mut attempt = 1;
        loop {
            match self.inner.cancel(transaction_id).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.attempts => return Err(e),
                Err(e) => self.backoff("cancel", attempt, &e).await,
            }
            attempt += 1;
        }
    }
}

/// Sends each call to `primary`, then to `secondary` if the primary fails.
pub struct FallbackGateway<P, S> {
    primary: P,
    secondary: S,
}

impl<P: PixGateway, S: PixGateway> FallbackGateway<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: PixGateway, S: PixGateway> PixGateway for FallbackGateway<P, S> {
    async fn generate(&self, request: &ChargeRequest) -> Result<PixCharge, anyhow::Error> {
        match self.primary.generate(request).await {
            Ok(charge) => Ok(charge),
            Err(e) => {
                log::warn!("Primary gateway failed to generate charge: {}", e);
                self.secondary.generate(request).await
            }
        }
    }

    async fn check_status(&self, transaction_id: &str) -> Result<PixCharge, anyhow::Error> {
        match self.primary.check_status(transaction_id).await {
            Ok(charge) => Ok(charge),
            Err(e) => {
                log::warn!("Primary gateway failed status check for {}: {}", transaction_id, e);
                self.secondary.check_status(transaction_id).await
            }
        }
    }

    async fn cancel(&self, transaction_id: &str) -> Result<(), anyhow::Error> {
        match self.primary.cancel(transaction_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("Primary gateway failed to cancel {}: {}", transaction_id, e);
                self.secondary.cancel(transaction_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::charge::ChargeStatus;
    use anyhow::bail;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyGateway {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyGateway {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn tick(&self) -> Result<(), anyhow::Error> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                bail!("gateway unavailable (call {})", call);
            }
            Ok(())
        }
    }

    fn charge(id: &str) -> PixCharge {
        PixCharge {
            transaction_id: id.to_string(),
            amount: 10.0,
            status: ChargeStatus::Pending,
            copy_paste_code: None,
            qr_code_url: None,
            expires_at: chrono::Utc::now(),
        }
    }

    #[async_trait]
    impl PixGateway for FlakyGateway {
        async fn generate(&self, _request: &ChargeRequest) -> Result<PixCharge, anyhow::Error> {
            self.tick()?;
            Ok(charge("remote"))
        }

        async fn check_status(&self, transaction_id: &str) -> Result<PixCharge, anyhow::Error> {
            self.tick()?;
            Ok(charge(transaction_id))
        }

        async fn cancel(&self, _transaction_id: &str) -> Result<(), anyhow::Error> {
            self.tick()
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let inner = Arc::new(FlakyGateway::new(2));
        let gateway = RetryingGateway::new(inner.clone(), 3, Duration::from_millis(1));

        let charge = gateway.generate(&ChargeRequest::default()).await.unwrap();
        assert_eq!(charge.transaction_id, "remote");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let inner = Arc::new(FlakyGateway::new(10));
        let gateway = RetryingGateway::new(inner.clone(), 3, Duration::from_millis(1));

        assert!(gateway.cancel("abc").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let inner = Arc::new(FlakyGateway::new(0));
        let gateway = RetryingGateway::new(inner.clone(), 0, Duration::from_millis(1));

        assert!(gateway.check_status("abc").await.is_ok());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_uses_secondary() {
        let primary = Arc::new(FlakyGateway::new(1));
        let secondary = Arc::new(FlakyGateway::new(0));
        let gateway = FallbackGateway::new(primary.clone(), secondary.clone());

        let charge = gateway.check_status("tx-1").await.unwrap();
        assert_eq!(charge.transaction_id, "tx-1");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);

        gateway.check_status("tx-2").await.unwrap();
        assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }
}
