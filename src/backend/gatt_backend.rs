//! GATT backend trait definition

use trait_variant::make;

use crate::core::error::BackendResult;
use crate::core::ident::Ident;
use crate::core::types::{CharacteristicProps, ConnectionOptions};

/// Abstraction over the platform GATT client primitives (typically BlueZ)
///
/// This trait enables testing by allowing mock implementations
/// while providing a standard interface for peripheral access.
#[make(Send)]
pub trait GattBackend: Sync + 'static {
    /// Opaque handle for a selected but not necessarily connected device
    type Device: Clone + Send + Sync + 'static;
    /// Opaque handle for an established link
    type Link: Clone + Send + Sync + 'static;
    /// Opaque handle for a discovered service
    type Service: Clone + Send + Sync + 'static;
    /// Opaque handle for a discovered characteristic
    type Characteristic: Clone + Send + Sync + 'static;

    /// Select a single device matching the given constraints
    ///
    /// Resolves to the first matching device. When the options carry no
    /// filter (`accept_all`), any device may be offered. May suspend
    /// indefinitely when nothing matches.
    async fn select_device(&self, options: &ConnectionOptions) -> BackendResult<Self::Device>;

    /// Establish a link to a previously selected device
    async fn establish_link(&self, device: &Self::Device) -> BackendResult<Self::Link>;

    /// Terminate an established link
    async fn close_link(&self, link: &Self::Link) -> BackendResult<()>;

    /// Resolve a service by identifier on an established link
    async fn discover_service(&self, link: &Self::Link, id: Ident) -> BackendResult<Self::Service>;

    /// Resolve a characteristic by identifier within a service
    async fn discover_characteristic(
        &self,
        service: &Self::Service,
        id: Ident,
    ) -> BackendResult<Self::Characteristic>;

    /// Capability flags of a discovered characteristic
    async fn characteristic_props(
        &self,
        characteristic: &Self::Characteristic,
    ) -> BackendResult<CharacteristicProps>;

    /// Read the current value of a characteristic
    async fn read_characteristic(
        &self,
        characteristic: &Self::Characteristic,
    ) -> BackendResult<Vec<u8>>;

    /// Write a value to a characteristic
    async fn write_characteristic(
        &self,
        characteristic: &Self::Characteristic,
        value: &[u8],
    ) -> BackendResult<()>;

    /// Stable identifier of a device, e.g. its address
    async fn device_id(&self, device: &Self::Device) -> BackendResult<String>;

    /// Advertised display name of a device, when it carries one
    async fn device_name(&self, device: &Self::Device) -> BackendResult<Option<String>>;
}
