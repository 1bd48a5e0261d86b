//! Mock GATT backend for testing

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::GattBackend;
use crate::core::error::{BackendError, BackendResult};
use crate::core::ident::Ident;
use crate::core::types::{CharacteristicProps, ConnectionOptions};

/// Device identifier reported by the mock backend
pub const MOCK_DEVICE_ID: &str = "aa:bb:cc:dd:ee:ff";

/// Device handle produced by the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockDevice {
    pub id: String,
    pub name: Option<String>,
}

/// Link handle for an established mock connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockLink {
    pub device_id: String,
}

/// Service handle resolved by the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockService {
    pub uuid: Uuid,
}

/// Characteristic handle resolved by the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCharacteristic {
    pub service: Uuid,
    pub uuid: Uuid,
    pub props: CharacteristicProps,
}

/// One declared service and its characteristics
#[derive(Debug, Clone)]
struct ServiceSpec {
    uuid: Uuid,
    characteristics: Vec<MockCharacteristic>,
}

/// Internal state for the mock backend
#[derive(Debug)]
struct MockState {
    device_name: Option<String>,
    services: Vec<ServiceSpec>,
    // Advertised service UUIDs override; defaults to the declared services.
    advertised: Option<Vec<Uuid>>,
    read_values: HashMap<Uuid, Vec<u8>>,
    writes: Vec<(Uuid, Vec<u8>)>,
    should_fail_selection: bool,
    should_fail_link: bool,
    should_fail_close: bool,
    should_fail_read: bool,
    should_fail_write: bool,
    service_discoveries: usize,
    characteristic_discoveries: usize,
    links_opened: usize,
    links_closed: usize,
}

impl MockState {
    fn has_service(&self, uuid: Uuid) -> bool {
        self.services.iter().any(|s| s.uuid == uuid)
    }

    fn advertises(&self, uuid: Uuid) -> bool {
        match &self.advertised {
            Some(advertised) => advertised.contains(&uuid),
            None => self.has_service(uuid),
        }
    }

    fn ensure_service(&mut self, uuid: Uuid) -> &mut ServiceSpec {
        let index = match self.services.iter().position(|s| s.uuid == uuid) {
            Some(index) => index,
            None => {
                self.services.push(ServiceSpec {
                    uuid,
                    characteristics: vec![],
                });
                self.services.len() - 1
            }
        };
        &mut self.services[index]
    }
}

/// Mock GATT backend for testing
///
/// Allows declaring a peripheral's service tree and injecting failures
/// without requiring actual hardware.
#[derive(Debug, Clone)]
pub struct MockGattBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockGattBackend {
    /// Create a new mock backend with default state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                device_name: Some("Mock Peripheral".into()),
                services: vec![],
                advertised: None,
                read_values: HashMap::new(),
                writes: vec![],
                should_fail_selection: false,
                should_fail_link: false,
                should_fail_close: false,
                should_fail_read: false,
                should_fail_write: false,
                service_discoveries: 0,
                characteristic_discoveries: 0,
                links_opened: 0,
                links_closed: 0,
            })),
        }
    }

    /// Configure the advertised device name
    pub async fn set_device_name(&self, name: Option<&str>) {
        self.inner.lock().await.device_name = name.map(Into::into);
    }

    /// Declare a service on the mock peripheral
    pub async fn add_service(&self, id: Ident) {
        self.inner.lock().await.ensure_service(id.to_uuid());
    }

    /// Declare a characteristic within a service, creating the service if needed
    pub async fn add_characteristic(&self, service: Ident, id: Ident, props: CharacteristicProps) {
        let mut state = self.inner.lock().await;
        let service_uuid = service.to_uuid();
        let spec = state.ensure_service(service_uuid);
        spec.characteristics.push(MockCharacteristic {
            service: service_uuid,
            uuid: id.to_uuid(),
            props,
        });
    }

    /// Override the advertised service list seen during selection
    ///
    /// Lets the advertisement claim services the peripheral does not
    /// actually expose, as stale adverts do.
    pub async fn set_advertised_services(&self, ids: &[Ident]) {
        let uuids = ids.iter().map(|id| id.to_uuid()).collect();
        self.inner.lock().await.advertised = Some(uuids);
    }

    /// Configure the value returned by reads of a characteristic
    pub async fn set_read_value(&self, id: Ident, value: Vec<u8>) {
        self.inner.lock().await.read_values.insert(id.to_uuid(), value);
    }

    /// Configure mock to fail device selection
    pub async fn set_selection_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_selection = should_fail;
    }

    /// Configure mock to fail link establishment
    pub async fn set_link_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_link = should_fail;
    }

    /// Configure mock to fail link teardown
    pub async fn set_close_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_close = should_fail;
    }

    /// Configure mock to fail characteristic reads
    pub async fn set_read_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_read = should_fail;
    }

    /// Configure mock to fail characteristic writes
    pub async fn set_write_failure(&self, should_fail: bool) {
        self.inner.lock().await.should_fail_write = should_fail;
    }

    /// Writes observed so far, as (characteristic, payload) pairs
    pub async fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.inner.lock().await.writes.clone()
    }

    /// Number of service discovery calls issued so far
    pub async fn service_discoveries(&self) -> usize {
        self.inner.lock().await.service_discoveries
    }

    /// Number of characteristic discovery calls issued so far
    pub async fn characteristic_discoveries(&self) -> usize {
        self.inner.lock().await.characteristic_discoveries
    }

    /// Number of links opened so far
    pub async fn links_opened(&self) -> usize {
        self.inner.lock().await.links_opened
    }

    /// Number of links closed so far
    pub async fn links_closed(&self) -> usize {
        self.inner.lock().await.links_closed
    }
}

impl Default for MockGattBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GattBackend for MockGattBackend {
    type Device = MockDevice;
    type Link = MockLink;
    type Service = MockService;
    type Characteristic = MockCharacteristic;

    async fn select_device(&self, options: &ConnectionOptions) -> BackendResult<MockDevice> {
        let state = self.inner.lock().await;
        if state.should_fail_selection {
            return Err(BackendError::DeviceUnavailable(
                "Mock selection failure".into(),
            ));
        }
        if !options.accept_all() {
            let name = state.device_name.clone().unwrap_or_default();
            if let Some(want) = &options.name {
                if &name != want {
                    return Err(BackendError::DeviceUnavailable(format!(
                        "No device named {want:?}"
                    )));
                }
            }
            if let Some(prefix) = &options.name_prefix {
                if !name.starts_with(prefix.as_str()) {
                    return Err(BackendError::DeviceUnavailable(format!(
                        "No device name starting with {prefix:?}"
                    )));
                }
            }
            if !options.services.iter().all(|id| state.advertises(id.to_uuid())) {
                return Err(BackendError::DeviceUnavailable(
                    "Required service not advertised".into(),
                ));
            }
        }
        Ok(MockDevice {
            id: MOCK_DEVICE_ID.to_string(),
            name: state.device_name.clone(),
        })
    }

    async fn establish_link(&self, device: &MockDevice) -> BackendResult<MockLink> {
        let mut state = self.inner.lock().await;
        if state.should_fail_link {
            return Err(BackendError::LinkFailed("Mock link failure".into()));
        }
        state.links_opened += 1;
        Ok(MockLink {
            device_id: device.id.clone(),
        })
    }

    async fn close_link(&self, _link: &MockLink) -> BackendResult<()> {
        let mut state = self.inner.lock().await;
        if state.should_fail_close {
            return Err(BackendError::Bluetooth("Mock close failure".into()));
        }
        state.links_closed += 1;
        Ok(())
    }

    async fn discover_service(&self, _link: &MockLink, id: Ident) -> BackendResult<MockService> {
        let mut state = self.inner.lock().await;
        state.service_discoveries += 1;
        let uuid = id.to_uuid();
        if state.has_service(uuid) {
            Ok(MockService { uuid })
        } else {
            Err(BackendError::ServiceNotFound(id))
        }
    }

    async fn discover_characteristic(
        &self,
        service: &MockService,
        id: Ident,
    ) -> BackendResult<MockCharacteristic> {
        let mut state = self.inner.lock().await;
        state.characteristic_discoveries += 1;
        let uuid = id.to_uuid();
        state
            .services
            .iter()
            .find(|s| s.uuid == service.uuid)
            .and_then(|s| s.characteristics.iter().find(|c| c.uuid == uuid))
            .cloned()
            .ok_or(BackendError::CharacteristicNotFound(id))
    }

    async fn characteristic_props(
        &self,
        characteristic: &MockCharacteristic,
    ) -> BackendResult<CharacteristicProps> {
        Ok(characteristic.props)
    }

    async fn read_characteristic(
        &self,
        characteristic: &MockCharacteristic,
    ) -> BackendResult<Vec<u8>> {
        let state = self.inner.lock().await;
        if state.should_fail_read {
            return Err(BackendError::ReadFailed("Mock read failure".into()));
        }
        Ok(state
            .read_values
            .get(&characteristic.uuid)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_characteristic(
        &self,
        characteristic: &MockCharacteristic,
        value: &[u8],
    ) -> BackendResult<()> {
        let mut state = self.inner.lock().await;
        if state.should_fail_write {
            return Err(BackendError::WriteFailed("Mock write failure".into()));
        }
        state.writes.push((characteristic.uuid, value.to_vec()));
        Ok(())
    }

    async fn device_id(&self, device: &MockDevice) -> BackendResult<String> {
        Ok(device.id.clone())
    }

    async fn device_name(&self, device: &MockDevice) -> BackendResult<Option<String>> {
        Ok(device.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Ident {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_mock_backend_selection_filters() {
        let backend = MockGattBackend::new();
        backend.set_device_name(Some("Gear VR Controller(017B)")).await;
        backend.add_service(id("0xffe9")).await;

        // Accept-all matches regardless of declared services
        let device = backend
            .select_device(&ConnectionOptions::new())
            .await
            .unwrap();
        assert_eq!(device.id, MOCK_DEVICE_ID);

        // Prefix and required-service filters match
        let options = ConnectionOptions::new()
            .with_name_prefix("Gear")
            .with_service(id("0xffe9"));
        assert!(backend.select_device(&options).await.is_ok());

        // Exact-name mismatch is rejected
        let options = ConnectionOptions::new().with_name("Other Device");
        assert!(backend.select_device(&options).await.is_err());

        // Missing required service is rejected
        let options = ConnectionOptions::new().with_service(id("180f"));
        assert!(backend.select_device(&options).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_backend_selection_failure() {
        let backend = MockGattBackend::new();
        backend.set_selection_failure(true).await;

        let result = backend.select_device(&ConnectionOptions::new()).await;
        assert!(matches!(result, Err(BackendError::DeviceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_mock_backend_discovery() {
        let backend = MockGattBackend::new();
        backend
            .add_characteristic(id("0xffe9"), id("0xffe4"), CharacteristicProps::default())
            .await;

        let device = backend
            .select_device(&ConnectionOptions::new())
            .await
            .unwrap();
        let link = backend.establish_link(&device).await.unwrap();

        let service = backend.discover_service(&link, id("0xffe9")).await.unwrap();
        assert_eq!(service.uuid, id("0xffe9").to_uuid());

        let characteristic = backend
            .discover_characteristic(&service, id("0xffe4"))
            .await
            .unwrap();
        assert_eq!(characteristic.uuid, id("0xffe4").to_uuid());

        assert_eq!(backend.service_discoveries().await, 1);
        assert_eq!(backend.characteristic_discoveries().await, 1);

        // Unknown identifiers are misses, not panics
        assert!(matches!(
            backend.discover_service(&link, id("180f")).await,
            Err(BackendError::ServiceNotFound(_))
        ));
        assert!(matches!(
            backend.discover_characteristic(&service, id("2a19")).await,
            Err(BackendError::CharacteristicNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_backend_read_write() {
        let backend = MockGattBackend::new();
        let props = CharacteristicProps {
            read: true,
            write: true,
            notify: false,
        };
        backend.add_characteristic(id("0xffe9"), id("0xffe4"), props).await;
        backend.set_read_value(id("0xffe4"), vec![0x01, 0x02]).await;

        let device = backend
            .select_device(&ConnectionOptions::new())
            .await
            .unwrap();
        let link = backend.establish_link(&device).await.unwrap();
        let service = backend.discover_service(&link, id("0xffe9")).await.unwrap();
        let characteristic = backend
            .discover_characteristic(&service, id("0xffe4"))
            .await
            .unwrap();

        let value = backend.read_characteristic(&characteristic).await.unwrap();
        assert_eq!(value, vec![0x01, 0x02]);

        backend
            .write_characteristic(&characteristic, &[0x0a])
            .await
            .unwrap();
        let writes = backend.writes().await;
        assert_eq!(writes, vec![(id("0xffe4").to_uuid(), vec![0x0a])]);

        backend.set_read_failure(true).await;
        assert!(backend.read_characteristic(&characteristic).await.is_err());
        backend.set_write_failure(true).await;
        assert!(backend
            .write_characteristic(&characteristic, &[0x0b])
            .await
            .is_err());
    }
}
