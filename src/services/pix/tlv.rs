use super::PixError;
use crate::models::pix::Field;

/// Largest value a two-digit length prefix can describe.
pub const MAX_FIELD_LEN: usize = 99;

/// Renders `TT LL VALUE`, the length counted in characters.
pub fn field(tag: &str, value: &str) -> Result<String, PixError> {
    let len = value.chars().count();
    if len > MAX_FIELD_LEN {
        return Err(PixError::FieldTooLong {
            tag: tag.to_string(),
            len,
        });
    }

    Ok(format!("{}{:02}{}", tag, len, value))
}

/// Templates whose value is itself a TLV list.
fn is_template(tag: &str) -> bool {
    match tag.parse::<u8>() {
        Ok(n) => (26..=51).contains(&n) || n == 62,
        Err(_) => false,
    }
}

pub fn parse_fields(input: &str) -> Result<Vec<Field>, PixError> {
    parse_level(input, true)
}

fn parse_level(input: &str, expand: bool) -> Result<Vec<Field>, PixError> {
    let chars: Vec<char> = input.chars().collect();
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars.len() - pos < 4 {
            return Err(PixError::Malformed(format!(
                "truncated field header at offset {}",
                pos
            )));
        }

        let tag: String = chars[pos..pos + 2].iter().collect();
        let len_text: String = chars[pos + 2..pos + 4].iter().collect();
        if !tag.chars().all(|c| c.is_ascii_digit()) {
            return Err(PixError::Malformed(format!("invalid tag '{}'", tag)));
        }
        let len: usize = len_text
            .parse()
            .ok()
            .filter(|_| len_text.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| {
                PixError::Malformed(format!("invalid length '{}' for tag {}", len_text, tag))
            })?;

        let start = pos + 4;
        let end = start + len;
        if end > chars.len() {
            return Err(PixError::Malformed(format!(
                "tag {} declares {} characters, {} left",
                tag,
                len,
                chars.len() - start
            )));
        }

        let value: String = chars[start..end].iter().collect();
        let children = if expand && is_template(&tag) {
            parse_level(&value, false)?
        } else {
            Vec::new()
        };

        fields.push(Field {
            tag,
            value,
            children,
        });
        pos = end;
    }

    Ok(fields)
}
