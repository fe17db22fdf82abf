//! BR Code payload encoding for static PIX charges, plus the checkout
//! plumbing that falls back to it when a gateway returns no payload.

pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;

pub use models::pix::{DecodedPayload, EncodedPayload, Field, PixChargeSpec, PixKeyType};
pub use services::pix::{checksum_hex, crc16, decode, encode, PixError};
