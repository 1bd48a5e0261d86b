//! Two-level lookup cache for discovered GATT handles

use std::collections::HashMap;

use super::ident::Ident;

/// Resolved service and characteristic handles for one connection.
///
/// Entries are added after successful discovery and only ever removed
/// wholesale via [`clear`](DiscoveryCache::clear) when the session resets.
/// Characteristics are keyed by their owning service as well as their own
/// identifier, so the same characteristic identifier under two services
/// never collides.
#[derive(Debug)]
pub struct DiscoveryCache<S, C> {
    services: HashMap<Ident, S>,
    characteristics: HashMap<(Ident, Ident), C>,
}

impl<S, C> DiscoveryCache<S, C> {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            characteristics: HashMap::new(),
        }
    }

    /// Cached service handle, if previously resolved.
    pub fn service(&self, id: Ident) -> Option<&S> {
        self.services.get(&id)
    }

    /// Store a resolved service handle.
    pub fn put_service(&mut self, id: Ident, handle: S) {
        self.services.insert(id, handle);
    }

    /// Cached characteristic handle under its owning service, if previously resolved.
    pub fn characteristic(&self, service: Ident, id: Ident) -> Option<&C> {
        self.characteristics.get(&(service, id))
    }

    /// Store a resolved characteristic handle under its owning service.
    pub fn put_characteristic(&mut self, service: Ident, id: Ident, handle: C) {
        self.characteristics.insert((service, id), handle);
    }

    /// Drop every cached handle.
    pub fn clear(&mut self) {
        self.services.clear();
        self.characteristics.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.characteristics.is_empty()
    }
}

impl<S, C> Default for DiscoveryCache<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Ident {
        s.parse().unwrap()
    }

    #[test]
    fn test_service_lookup() {
        let mut cache: DiscoveryCache<&str, &str> = DiscoveryCache::new();
        assert_eq!(cache.service(id("180f")), None);
        cache.put_service(id("180f"), "battery");
        assert_eq!(cache.service(id("180f")), Some(&"battery"));
    }

    #[test]
    fn test_characteristic_key_includes_service() {
        let mut cache: DiscoveryCache<&str, &str> = DiscoveryCache::new();
        cache.put_characteristic(id("180a"), id("2a00"), "generic");
        cache.put_characteristic(id("180f"), id("2a00"), "battery");
        assert_eq!(cache.characteristic(id("180a"), id("2a00")), Some(&"generic"));
        assert_eq!(cache.characteristic(id("180f"), id("2a00")), Some(&"battery"));
    }

    #[test]
    fn test_clear_empties_both_levels() {
        let mut cache: DiscoveryCache<&str, &str> = DiscoveryCache::new();
        cache.put_service(id("180f"), "battery");
        cache.put_characteristic(id("180f"), id("2a19"), "level");
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.service(id("180f")), None);
        assert_eq!(cache.characteristic(id("180f"), id("2a19")), None);
    }

    #[test]
    fn test_uuid_and_alias_keys_are_distinct() {
        // An alias is not silently equated with its expanded UUID form.
        let mut cache: DiscoveryCache<&str, &str> = DiscoveryCache::new();
        cache.put_service(id("180f"), "alias");
        assert_eq!(cache.service(id("0000180f-0000-1000-8000-00805f9b34fb")), None);
    }
}
