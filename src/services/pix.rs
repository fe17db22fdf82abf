use crate::models::pix::{DecodedPayload, EncodedPayload, PixChargeSpec};

mod crc;
mod tlv;

pub use self::crc::{checksum_hex, crc16};
use self::tlv::MAX_FIELD_LEN;

pub const PAYLOAD_FORMAT_INDICATOR: &str = "01";
/// Reusable code; the charge may be paid more than once.
pub const STATIC_INITIATION_METHOD: &str = "12";
pub const PIX_GUI: &str = "br.gov.bcb.pix";
pub const MERCHANT_CATEGORY_CODE: &str = "0000";
/// ISO 4217 numeric code for BRL.
pub const CURRENCY_BRL: &str = "986";
pub const COUNTRY_CODE: &str = "BR";
pub const MAX_MERCHANT_NAME_LEN: usize = 25;
pub const MAX_MERCHANT_CITY_LEN: usize = 15;
pub const DEFAULT_REFERENCE: &str = "***";
pub const MIN_AMOUNT: f64 = 0.01;

const CRC_MARKER: &str = "6304";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PixError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("Invalid PIX key: key must not be empty")]
    InvalidKey,
    #[error("Field {tag} is {len} characters long, at most {max} fit", max = MAX_FIELD_LEN)]
    FieldTooLong { tag: String, len: usize },
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("Checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: String, found: String },
}

/// Serializes a static charge into a BR Code payload terminated by its CRC16.
///
/// Merchant name and city are cut to 25 and 15 characters without error.
pub fn encode(spec: &PixChargeSpec) -> Result<EncodedPayload, PixError> {
    let amount = format_amount(spec.amount)?;
    if spec.receiving_key.is_empty() {
        return Err(PixError::InvalidKey);
    }

    let merchant_account = [
        tlv::field("00", PIX_GUI)?,
        tlv::field("01", &spec.receiving_key)?,
    ]
    .concat();

    let reference = match spec.transaction_reference.as_deref() {
        Some(reference) if !reference.is_empty() => reference,
        _ => DEFAULT_REFERENCE,
    };
    let additional_data = tlv::field("05", reference)?;

    let mut payload = [
        tlv::field("00", PAYLOAD_FORMAT_INDICATOR)?,
        tlv::field("01", STATIC_INITIATION_METHOD)?,
        tlv::field("26", &merchant_account)?,
        tlv::field("52", MERCHANT_CATEGORY_CODE)?,
        tlv::field("53", CURRENCY_BRL)?,
        tlv::field("54", &amount)?,
        tlv::field("58", COUNTRY_CODE)?,
        tlv::field("59", truncate(&spec.merchant_name, MAX_MERCHANT_NAME_LEN))?,
        tlv::field("60", truncate(&spec.merchant_city, MAX_MERCHANT_CITY_LEN))?,
        tlv::field("62", &additional_data)?,
    ]
    .concat();
    payload.push_str(CRC_MARKER);

    let checksum = checksum_hex(&payload);
    payload.push_str(&checksum);

    Ok(EncodedPayload { payload })
}

/// Splits a payload into its fields after checking the trailing CRC16.
pub fn decode(payload: &str) -> Result<DecodedPayload, PixError> {
    let len = payload.len();
    if len < 8 || !payload.is_char_boundary(len - 4) {
        return Err(PixError::Malformed("payload too short".to_string()));
    }

    let (body, found) = payload.split_at(len - 4);
    if !body.ends_with(CRC_MARKER) {
        return Err(PixError::Malformed(
            "missing CRC field 6304 before checksum".to_string(),
        ));
    }
    if !found.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PixError::Malformed(format!("checksum '{}' is not hex", found)));
    }

    let expected = checksum_hex(body);
    if !expected.eq_ignore_ascii_case(found) {
        return Err(PixError::ChecksumMismatch {
            expected,
            found: found.to_string(),
        });
    }

    let fields = tlv::parse_fields(payload)?;
    match fields.last() {
        Some(last) if last.tag == "63" => Ok(DecodedPayload { fields }),
        _ => Err(PixError::Malformed(
            "CRC field is not the last field".to_string(),
        )),
    }
}

/// Fixed-point, two fractional digits, `.` separator.
///
/// Amounts below one cent, or carrying a fraction of a cent, are refused
/// rather than rounded.
pub fn format_amount(amount: f64) -> Result<String, PixError> {
    if !amount.is_finite() || amount < MIN_AMOUNT {
        return Err(PixError::InvalidAmount(amount));
    }

    let cents = amount * 100.0;
    let tolerance = cents.abs().max(1.0) * 8.0 * f64::EPSILON;
    if (cents - cents.round()).abs() > tolerance {
        return Err(PixError::InvalidAmount(amount));
    }

    Ok(format!("{:.2}", amount))
}

fn truncate(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
