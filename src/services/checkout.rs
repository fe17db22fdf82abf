use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{oneshot, RwLock};
use uuid::Uuid;

use super::{pix, RequestHandler, Service, ServiceError};
use crate::models::charge::{ChargeRequest, ChargeStatus, PixCharge};
use crate::repositories::gateway::PixGateway;
use crate::settings::Merchant;

pub const LOCAL_CHARGE_PREFIX: &str = "local_";

pub enum CheckoutRequest {
    Generate {
        request: ChargeRequest,
        response: oneshot::Sender<Result<PixCharge, ServiceError>>,
    },
    CheckStatus {
        transaction_id: String,
        response: oneshot::Sender<Result<PixCharge, ServiceError>>,
    },
    Cancel {
        transaction_id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct CheckoutRequestHandler {
    gateway: Arc<dyn PixGateway>,
    merchant: Arc<Merchant>,
    expires_in: u64,
    /// How long a local charge is kept after it expires; `None` keeps it forever.
    retention: Option<TimeDelta>,
    local_charges: Arc<RwLock<HashMap<String, PixCharge>>>,
}

impl CheckoutRequestHandler {
    pub fn new(
        gateway: Arc<dyn PixGateway>,
        merchant: Merchant,
        expires_in: u64,
        retention_secs: u64,
    ) -> Self {
        let retention = i64::try_from(retention_secs)
            .ok()
            .and_then(TimeDelta::try_seconds);

        Self {
            gateway,
            merchant: Arc::new(merchant),
            expires_in,
            retention,
            local_charges: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn expires_at(&self, request: &ChargeRequest) -> Result<DateTime<Utc>, ServiceError> {
        let expires_in = request.expires_in.unwrap_or(self.expires_in);

        i64::try_from(expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .ok_or(ServiceError::InvalidExpiry(expires_in))
    }

    /// Asks the gateway for a charge and fills in a locally encoded payload
    /// when the gateway returns none or fails outright.
    pub async fn generate(&self, request: ChargeRequest) -> Result<PixCharge, ServiceError> {
        let spec = self
            .merchant
            .charge_spec(request.amount, request.reference.clone());
        let payload = pix::encode(&spec)?;
        let expires_at = self.expires_at(&request)?;

        match self.gateway.generate(&request).await {
            Ok(mut charge) => {
                if !charge.has_copy_paste_code() {
                    log::info!(
                        "Gateway charge {} has no copy-paste code, using local payload.",
                        charge.transaction_id
                    );
                    charge.copy_paste_code = Some(payload.payload);
                }
                Ok(charge)
            }
            Err(e) => {
                log::warn!(
                    "Gateway failed to generate charge, falling back to local payload: {}",
                    e
                );
                Ok(self
                    .new_local_charge(&request, payload.payload, expires_at)
                    .await)
            }
        }
    }

    async fn new_local_charge(
        &self,
        request: &ChargeRequest,
        payload: String,
        expires_at: DateTime<Utc>,
    ) -> PixCharge {
        let transaction_id = format!("{}{}", LOCAL_CHARGE_PREFIX, Uuid::new_v4().hyphenated());

        let charge = PixCharge {
            transaction_id: transaction_id.clone(),
            amount: request.amount,
            status: ChargeStatus::Pending,
            copy_paste_code: Some(payload),
            qr_code_url: None,
            expires_at,
        };

        let mut charges = self.local_charges.write().await;
        self.prune(&mut charges);
        charges.insert(transaction_id, charge.clone());
        drop(charges);
        log::info!("Created local charge {}", charge.transaction_id);

        charge
    }

    /// Drops local charges whose expiry lies further back than the retention window.
    fn prune(&self, charges: &mut HashMap<String, PixCharge>) {
        let Some(retention) = self.retention else {
            return;
        };
        let now = Utc::now();
        let before = charges.len();

        charges.retain(|_, charge| match charge.expires_at.checked_add_signed(retention) {
            Some(evict_at) => evict_at > now,
            None => true,
        });

        let pruned = before - charges.len();
        if pruned > 0 {
            log::debug!("Pruned {} stale local charges", pruned);
        }
    }

    pub async fn check_status(&self, transaction_id: &str) -> Result<PixCharge, ServiceError> {
        if !transaction_id.starts_with(LOCAL_CHARGE_PREFIX) {
            return self
                .gateway
                .check_status(transaction_id)
                .await
                .map_err(|e| ServiceError::Gateway("check_status".to_string(), e.to_string()));
        }

        let mut charges = self.local_charges.write().await;
        let charge = charges
            .get_mut(transaction_id)
            .ok_or_else(|| ServiceError::NotFound(transaction_id.to_string()))?;

        if charge.status == ChargeStatus::Pending && charge.expires_at <= Utc::now() {
            charge.status = ChargeStatus::Expired;
        }

        Ok(charge.clone())
    }

    pub async fn cancel(&self, transaction_id: &str) -> Result<(), ServiceError> {
        if !transaction_id.starts_with(LOCAL_CHARGE_PREFIX) {
            return self
                .gateway
                .cancel(transaction_id)
                .await
                .map_err(|e| ServiceError::Gateway("cancel".to_string(), e.to_string()));
        }

        let mut charges = self.local_charges.write().await;
        match charges.get_mut(transaction_id) {
            Some(charge) => {
                charge.status = ChargeStatus::Cancelled;
                Ok(())
            }
            None => Err(ServiceError::NotFound(transaction_id.to_string())),
        }
    }
}

#[async_trait]
impl RequestHandler<CheckoutRequest> for CheckoutRequestHandler {
    async fn handle_request(&self, request: CheckoutRequest) {
        match request {
            CheckoutRequest::Generate { request, response } => {
                let charge = self.generate(request).await;
                let _ = response.send(charge);
            }
            CheckoutRequest::CheckStatus {
                transaction_id,
                response,
            } => {
                let charge = self.check_status(&transaction_id).await;
                let _ = response.send(charge);
            }
            CheckoutRequest::Cancel {
                transaction_id,
                response,
            } => {
                let result = self.cancel(&transaction_id).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct CheckoutService;

impl CheckoutService {
    pub fn new() -> Self {
        CheckoutService {}
    }
}

#[async_trait]
impl Service<CheckoutRequest, CheckoutRequestHandler> for CheckoutService {}
