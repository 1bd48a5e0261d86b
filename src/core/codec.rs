//! Byte-per-character codec for characteristic payloads

use std::fmt;
use std::str::FromStr;

use super::error::FormatError;

/// Requested representation for a characteristic read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueFormat {
    /// Raw byte buffer as delivered by the peripheral
    #[default]
    Raw,
    /// Text decoded one byte per character
    Text,
    /// Element-wise byte array
    Bytes,
}

/// A characteristic value in its requested representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Raw(Vec<u8>),
    Text(String),
    Bytes(Vec<u8>),
}

/// Decode a payload into the requested representation.
pub fn decode(raw: Vec<u8>, format: ValueFormat) -> Value {
    match format {
        ValueFormat::Raw => Value::Raw(raw),
        ValueFormat::Text => Value::Text(text_from_bytes(&raw)),
        ValueFormat::Bytes => Value::Bytes(raw),
    }
}

/// Decode each byte as the character with that code, one byte per element.
pub fn text_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode each character's code as one byte, truncating wider characters.
pub fn bytes_from_text(text: &str) -> Vec<u8> {
    text.chars().map(|c| (c as u32 & 0xff) as u8).collect()
}

impl FromStr for ValueFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(ValueFormat::Raw),
            "text" => Ok(ValueFormat::Text),
            "bytes" => Ok(ValueFormat::Bytes),
            other => Err(FormatError(other.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Raw(bytes) | Value::Bytes(bytes) => f.write_str(&hex::encode(bytes)),
            Value::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bytes_representation_element_wise() {
        let raw = vec![0x02, 0x02, 0x4A, 0xD0, 0x07];
        let value = decode(raw, ValueFormat::Bytes);
        assert_eq!(value, Value::Bytes(vec![2, 2, 74, 208, 7]));
    }

    #[test]
    fn test_raw_representation_keeps_buffer() {
        let raw = vec![0x01, 0xff];
        assert_eq!(decode(raw.clone(), ValueFormat::Raw), Value::Raw(raw));
    }

    #[test]
    fn test_text_round_trip() {
        let raw = vec![0x47, 0x41, 0x54, 0x54, 0xAC];
        let text = text_from_bytes(&raw);
        assert_eq!(bytes_from_text(&text), raw);
    }

    #[test]
    fn test_text_is_one_byte_per_element() {
        assert_eq!(text_from_bytes(&[0x48, 0x69]), "Hi");
        assert_eq!(text_from_bytes(&[]), "");
    }

    #[test]
    fn test_wide_characters_truncate_to_one_byte() {
        // U+20AC keeps only its low byte.
        assert_eq!(bytes_from_text("\u{20AC}"), vec![0xAC]);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("raw".parse::<ValueFormat>().unwrap(), ValueFormat::Raw);
        assert_eq!("Text".parse::<ValueFormat>().unwrap(), ValueFormat::Text);
        assert_eq!("bytes".parse::<ValueFormat>().unwrap(), ValueFormat::Bytes);
        assert!("utf8".parse::<ValueFormat>().is_err());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(decode(vec![0x0a, 0xd0], ValueFormat::Raw).to_string(), "0ad0");
        assert_eq!(
            decode(vec![0x68, 0x69], ValueFormat::Text).to_string(),
            "hi"
        );
    }
}
