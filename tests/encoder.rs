use pix_payload::{checksum_hex, decode, encode, PixChargeSpec, PixError, PixKeyType};

const CAMPAIGN_KEY: &str = "19998353715";

fn campaign_spec(amount: f64) -> PixChargeSpec {
    PixChargeSpec::new(CAMPAIGN_KEY, "Juntos Pelo Bem", "SAO PAULO", amount)
        .with_key_type(PixKeyType::Phone)
}

#[test]
fn encodes_campaign_payload() {
    let encoded = encode(&campaign_spec(10.0)).expect("encoding should succeed");

    assert_eq!(
        encoded.payload,
        "00020101021226330014br.gov.bcb.pix011119998353715520400005303986540510.005802BR5915Juntos Pelo Bem6009SAO PAULO62070503***63044800"
    );
    assert!(encoded.payload.starts_with("000201010212"));
    assert!(encoded.payload.contains("0014br.gov.bcb.pix011119998353715"));
    assert!(encoded.payload.contains("540510.00"));
    assert!(encoded.payload.contains("5915Juntos Pelo Bem"));
    assert!(encoded.payload.contains("6009SAO PAULO"));
    assert!(encoded.payload.contains("62070503***"));
    assert_eq!(encoded.checksum(), "4800");
}

#[test]
fn encodes_reference_and_non_ascii_city() {
    let spec = PixChargeSpec::new(
        "doacoes@juntospelobem.org",
        "Juntos Pelo Bem",
        "São Paulo",
        12.5,
    )
    .with_key_type(PixKeyType::Email)
    .with_reference("DOACAO42");

    let encoded = encode(&spec).unwrap();
    assert_eq!(
        encoded.payload,
        "00020101021226470014br.gov.bcb.pix0125doacoes@juntospelobem.org520400005303986540512.505802BR5915Juntos Pelo Bem6009São Paulo62120508DOACAO42630422E3"
    );
}

#[test]
fn trailing_checksum_validates_prefix() {
    let amounts = [0.01, 1.0, 7.0, 12.5, 99.99, 1500.0, 250000.75];

    for amount in amounts {
        let encoded = encode(&campaign_spec(amount)).unwrap();
        let (body, checksum) = encoded.payload.split_at(encoded.payload.len() - 4);

        assert!(body.ends_with("6304"));
        assert!(checksum
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_eq!(checksum_hex(body), checksum);
    }
}

#[test]
fn encoding_is_deterministic() {
    let spec = campaign_spec(42.0).with_reference("ORDER7");
    assert_eq!(encode(&spec).unwrap(), encode(&spec).unwrap());
}

#[test]
fn fields_follow_fixed_order() {
    let encoded = encode(&campaign_spec(10.0)).unwrap();
    let decoded = decode(&encoded.payload).expect("payload should decode");

    assert_eq!(
        decoded.flat_tags(),
        vec![
            "00", "01", "26", "26.00", "26.01", "52", "53", "54", "58", "59", "60", "62",
            "62.05", "63"
        ]
    );
}

#[test]
fn decoded_fields_match_input() {
    let spec = PixChargeSpec::new("123e4567-e89b-12d3-a456-426614174000", "Instituto", "Recife", 33.3)
        .with_reference("REF01");
    let decoded = decode(&encode(&spec).unwrap().payload).unwrap();

    assert_eq!(decoded.receiving_key(), Some("123e4567-e89b-12d3-a456-426614174000"));
    assert_eq!(decoded.amount(), Some("33.30"));
    assert_eq!(decoded.merchant_name(), Some("Instituto"));
    assert_eq!(decoded.merchant_city(), Some("Recife"));
    assert_eq!(decoded.reference(), Some("REF01"));
    assert_eq!(decoded.field("53").map(|f| f.value.as_str()), Some("986"));
}

#[test]
fn truncates_merchant_name_and_city() {
    let name = "Associacao Beneficente Juntos Pelo Bem Br";
    let city = "SAO JOSE DOS CAMPOS ";
    assert_eq!(name.chars().count(), 41);
    assert_eq!(city.chars().count(), 20);

    let spec = PixChargeSpec::new(CAMPAIGN_KEY, &name[..40], city, 5.0);
    let encoded = encode(&spec).unwrap();
    let decoded = decode(&encoded.payload).unwrap();

    assert_eq!(decoded.merchant_name(), Some("Associacao Beneficente Ju"));
    assert_eq!(decoded.merchant_city(), Some("SAO JOSE DOS CA"));
    assert!(encoded.payload.contains("5925Associacao Beneficente Ju6015SAO JOSE DOS CA62"));
}

#[test]
fn formats_amounts_with_two_digits() {
    let seven = encode(&campaign_spec(7.0)).unwrap();
    assert!(seven.payload.contains("54047.00"));

    let twelve = encode(&campaign_spec(12.5)).unwrap();
    assert!(twelve.payload.contains("540512.50"));
}

#[test]
fn rejects_invalid_amounts() {
    for amount in [0.0, -5.0, f64::NAN, f64::NEG_INFINITY, 0.005, 0.009, 12.345] {
        assert!(
            matches!(encode(&campaign_spec(amount)), Err(PixError::InvalidAmount(_))),
            "amount {} should be rejected",
            amount
        );
    }
}

#[test]
fn rejects_empty_key() {
    let spec = PixChargeSpec::new("", "Juntos Pelo Bem", "SAO PAULO", 10.0);
    assert_eq!(encode(&spec), Err(PixError::InvalidKey));
}
