//! Identifier normalization for services and characteristics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use uuid::Uuid;

use super::error::IdentError;

/// Bluetooth Base UUID, combined with a shifted alias to expand short identifiers
const BASE_UUID: u128 = 0x0000_0000_0000_1000_8000_00805f9b34fb;

/// Canonical identifier for a service or characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ident {
    /// Long-form 128-bit UUID
    Uuid(Uuid),
    /// Short hexadecimal alias, e.g. `0x180f`
    Alias(u32),
}

impl Ident {
    /// Expand to a full UUID, mapping aliases through the Bluetooth Base UUID.
    pub fn to_uuid(self) -> Uuid {
        match self {
            Ident::Uuid(uuid) => uuid,
            Ident::Alias(alias) => Uuid::from_u128(((alias as u128) << 96) | BASE_UUID),
        }
    }
}

// True only for the hyphenated 8-4-4-4-12 hex form.
fn is_long_form(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => *b == b'-',
        _ => b.is_ascii_hexdigit(),
    })
}

impl FromStr for Ident {
    type Err = IdentError;

    /// Normalize a user-supplied identifier: the long UUID form is kept as a
    /// UUID, anything else is read as a hexadecimal alias with an optional
    /// `0x` prefix. Empty input normalizes to alias 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_long_form(s) {
            let uuid = Uuid::parse_str(s).map_err(|_| IdentError::Malformed(s.to_string()))?;
            return Ok(Ident::Uuid(uuid));
        }
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Ok(Ident::Alias(0));
        }
        u32::from_str_radix(digits, 16)
            .map(Ident::Alias)
            .map_err(|_| IdentError::Malformed(s.to_string()))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Uuid(uuid) => write!(f, "{uuid}"),
            Ident::Alias(alias) => write!(f, "{alias:#06x}"),
        }
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdentVisitor)
    }
}

struct IdentVisitor;

impl<'de> de::Visitor<'de> for IdentVisitor {
    type Value = Ident;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a UUID string, a hexadecimal alias string or an integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(de::Error::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u32::try_from(value)
            .map(Ident::Alias)
            .map_err(|_| de::Error::custom("alias does not fit in 32 bits"))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        u32::try_from(value)
            .map(Ident::Alias)
            .map_err(|_| de::Error::custom("alias does not fit in 32 bits"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_with_prefix() {
        assert_eq!("0xffe9".parse::<Ident>().unwrap(), Ident::Alias(0xffe9));
    }

    #[test]
    fn test_alias_without_prefix_matches_prefixed() {
        let bare: Ident = "ffe9".parse().unwrap();
        let prefixed: Ident = "0xffe9".parse().unwrap();
        assert_eq!(bare, prefixed);
        assert_eq!(bare, Ident::Alias(65513));
    }

    #[test]
    fn test_short_service_alias() {
        assert_eq!("180a".parse::<Ident>().unwrap(), Ident::Alias(6154));
    }

    #[test]
    fn test_long_form_uuid_preserved() {
        let id: Ident = "4dc591b0-857c-41de-b5f1-15abda665b0c".parse().unwrap();
        assert!(matches!(id, Ident::Uuid(_)));
        assert_eq!(id.to_string(), "4dc591b0-857c-41de-b5f1-15abda665b0c");
    }

    #[test]
    fn test_empty_input_is_alias_zero() {
        assert_eq!("".parse::<Ident>().unwrap(), Ident::Alias(0));
        assert_eq!("0x".parse::<Ident>().unwrap(), Ident::Alias(0));
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert_eq!(
            "gatt".parse::<Ident>(),
            Err(IdentError::Malformed("gatt".to_string()))
        );
        // Partial UUIDs are neither the long form nor valid hex.
        assert!("4dc591b0-857c".parse::<Ident>().is_err());
    }

    #[test]
    fn test_alias_display_round_trip() {
        let id = Ident::Alias(0x180f);
        assert_eq!(id.to_string(), "0x180f");
        assert_eq!(id.to_string().parse::<Ident>().unwrap(), id);
    }

    #[test]
    fn test_alias_expands_through_base_uuid() {
        let uuid = Ident::Alias(0x180f).to_uuid();
        assert_eq!(uuid.to_string(), "0000180f-0000-1000-8000-00805f9b34fb");
    }

    #[test]
    fn test_uuid_expansion_is_identity() {
        let id: Ident = "4dc591b0-857c-41de-b5f1-15abda665b0c".parse().unwrap();
        assert_eq!(Ident::Uuid(id.to_uuid()), id);
    }

    #[test]
    fn test_serde_string_forms() {
        let id: Ident = serde_json::from_str("\"0xffe9\"").unwrap();
        assert_eq!(id, Ident::Alias(0xffe9));
        let id: Ident = serde_json::from_str("\"180a\"").unwrap();
        assert_eq!(id, Ident::Alias(0x180a));
        let json = serde_json::to_string(&Ident::Alias(0xffe9)).unwrap();
        assert_eq!(json, "\"0xffe9\"");
    }

    #[test]
    fn test_serde_integer_form() {
        let id: Ident = serde_json::from_str("6154").unwrap();
        assert_eq!(id, Ident::Alias(0x180a));
    }
}
