//! Shared types for device selection and characteristic access

use serde::{Deserialize, Serialize};

use super::ident::Ident;

/// Device-selection constraints for `connect`
///
/// Profiles loaded from JSON use the same field names as the wire-level
/// options object this follows, e.g. `namePrefix` and `optionalServices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionOptions {
    /// Services the device must offer; resolved eagerly once the link is up
    pub services: Vec<Ident>,

    /// Exact advertised name the device must carry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Prefix the advertised name must start with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,

    /// Services usable after connecting without being part of the filter
    pub optional_services: Vec<Ident>,
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a service on the device.
    pub fn with_service(mut self, id: Ident) -> Self {
        self.services.push(id);
        self
    }

    /// Filter on the exact advertised name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter on an advertised name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Allow a service to be resolved later without filtering on it.
    pub fn with_optional_service(mut self, id: Ident) -> Self {
        self.optional_services.push(id);
        self
    }

    /// True when no filter is present and any device may be offered.
    pub fn accept_all(&self) -> bool {
        self.services.is_empty() && self.name.is_none() && self.name_prefix.is_none()
    }
}

/// Capability flags advertised by a characteristic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacteristicProps {
    pub read: bool,
    pub write: bool,
    pub notify: bool,
}

/// Target of a read or write
///
/// Either an already-resolved characteristic handle, or a
/// service/characteristic identifier pair resolved through the session's
/// discovery cache.
#[derive(Debug, Clone)]
pub enum CharacteristicRef<C> {
    Resolved(C),
    Lookup { service: Ident, characteristic: Ident },
}

impl<C> CharacteristicRef<C> {
    /// Target a characteristic by identifier pair.
    pub fn lookup(service: Ident, characteristic: Ident) -> Self {
        CharacteristicRef::Lookup {
            service,
            characteristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all_without_filters() {
        assert!(ConnectionOptions::new().accept_all());
        // Optional services are not a filter.
        let options = ConnectionOptions::new().with_optional_service(Ident::Alias(0x180f));
        assert!(options.accept_all());
    }

    #[test]
    fn test_any_filter_disables_accept_all() {
        assert!(!ConnectionOptions::new().with_name("Gear VR Controller").accept_all());
        assert!(!ConnectionOptions::new().with_name_prefix("Gear").accept_all());
        assert!(!ConnectionOptions::new().with_service(Ident::Alias(0xffe9)).accept_all());
    }

    #[test]
    fn test_profile_json_field_names() {
        let json = r#"{
            "services": ["4dc591b0-857c-41de-b5f1-15abda665b0c"],
            "namePrefix": "Gear",
            "optionalServices": ["180f"]
        }"#;
        let options: ConnectionOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.services.len(), 1);
        assert_eq!(options.name_prefix.as_deref(), Some("Gear"));
        assert_eq!(options.optional_services, vec![Ident::Alias(0x180f)]);
        assert!(options.name.is_none());
    }

    #[test]
    fn test_empty_profile_accepts_all() {
        let options: ConnectionOptions = serde_json::from_str("{}").unwrap();
        assert!(options.accept_all());
        assert!(options.services.is_empty());
    }
}
