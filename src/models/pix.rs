use serde::{Deserialize, Serialize};

/// Kind of PIX key. Carried for display only, the key itself is embedded raw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyType {
    Phone,
    Email,
    Cpf,
    Cnpj,
    #[default]
    Random,
}

/// Input of the encoder: a static charge with a fixed amount.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PixChargeSpec {
    pub receiving_key: String,
    #[serde(default)]
    pub receiving_key_type: PixKeyType,
    pub merchant_name: String,
    pub merchant_city: String,
    pub amount: f64,
    #[serde(default)]
    pub transaction_reference: Option<String>,
}

impl PixChargeSpec {
    pub fn new(
        receiving_key: impl Into<String>,
        merchant_name: impl Into<String>,
        merchant_city: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            receiving_key: receiving_key.into(),
            receiving_key_type: PixKeyType::default(),
            merchant_name: merchant_name.into(),
            merchant_city: merchant_city.into(),
            amount,
            transaction_reference: None,
        }
    }

    pub fn with_key_type(mut self, key_type: PixKeyType) -> Self {
        self.receiving_key_type = key_type;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction_reference = Some(reference.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EncodedPayload {
    pub payload: String,
}

impl EncodedPayload {
    /// Trailing four hex digits of the payload, empty if the tail is not ASCII.
    pub fn checksum(&self) -> &str {
        let split = self.payload.len().saturating_sub(4);
        self.payload.get(split..).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.payload
    }
}

impl std::fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.payload)
    }
}

/// One decoded TLV field. Template fields carry their nested entries in `children`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    pub tag: String,
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecodedPayload {
    pub fields: Vec<Field>,
}

impl DecodedPayload {
    pub fn field(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    fn nested(&self, tag: &str, child: &str) -> Option<&str> {
        self.field(tag)?
            .children
            .iter()
            .find(|f| f.tag == child)
            .map(|f| f.value.as_str())
    }

    pub fn receiving_key(&self) -> Option<&str> {
        self.nested("26", "01")
    }

    pub fn amount(&self) -> Option<&str> {
        self.field("54").map(|f| f.value.as_str())
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.field("59").map(|f| f.value.as_str())
    }

    pub fn merchant_city(&self) -> Option<&str> {
        self.field("60").map(|f| f.value.as_str())
    }

    pub fn reference(&self) -> Option<&str> {
        self.nested("62", "05")
    }

    /// Tags in payload order with template children expanded in place.
    pub fn flat_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for field in &self.fields {
            tags.push(field.tag.clone());
            for child in &field.children {
                tags.push(format!("{}.{}", field.tag, child.tag));
            }
        }
        tags
    }
}
