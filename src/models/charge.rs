use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Pending,
    Paid,
    Expired,
    Cancelled,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChargeRequest {
    pub amount: f64,
    pub description: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_comment: Option<String>,
    pub reference: Option<String>,
    /// Seconds until the charge expires.
    pub expires_in: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PixCharge {
    pub transaction_id: String,
    pub amount: f64,
    pub status: ChargeStatus,
    pub copy_paste_code: Option<String>,
    pub qr_code_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl PixCharge {
    pub fn has_copy_paste_code(&self) -> bool {
        self.copy_paste_code
            .as_deref()
            .is_some_and(|code| !code.is_empty())
    }
}
