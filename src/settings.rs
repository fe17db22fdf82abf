use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

use crate::models::pix::{PixChargeSpec, PixKeyType};

#[derive(Clone, Debug, Deserialize)]
pub struct Merchant {
    pub key: String,
    #[serde(default)]
    pub key_type: PixKeyType,
    pub name: String,
    pub city: String,
}

impl Merchant {
    pub fn charge_spec(&self, amount: f64, reference: Option<String>) -> PixChargeSpec {
        PixChargeSpec {
            receiving_key: self.key.clone(),
            receiving_key_type: self.key_type,
            merchant_name: self.name.clone(),
            merchant_city: self.city.clone(),
            amount,
            transaction_reference: reference,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Checkout {
    /// Seconds a locally generated charge stays payable.
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Seconds an expired local charge is kept before it is pruned.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_expires_in() -> u64 {
    1800
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_retention_secs() -> u64 {
    3600
}

impl Default for Checkout {
    fn default() -> Self {
        Self {
            expires_in: default_expires_in(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retention_secs: default_retention_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub merchant: Merchant,
    #[serde(default)]
    pub checkout: Checkout,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        config.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;

        config.try_deserialize()
    }
}
