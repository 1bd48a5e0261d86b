//! BlueZ GATT backend

use bluer::gatt::CharacteristicFlags;
use bluer::gatt::remote::{Characteristic, Service};
use bluer::{Adapter, AdapterEvent, Device, Session};
use futures::{StreamExt, pin_mut};
use tracing::{debug, info};

use crate::backend::GattBackend;
use crate::core::error::{BackendError, BackendResult};
use crate::core::ident::Ident;
use crate::core::types::{CharacteristicProps, ConnectionOptions};

impl From<bluer::Error> for BackendError {
    fn from(err: bluer::Error) -> Self {
        BackendError::Bluetooth(err.to_string())
    }
}

impl From<CharacteristicFlags> for CharacteristicProps {
    fn from(flags: CharacteristicFlags) -> Self {
        CharacteristicProps {
            read: flags.read,
            write: flags.write || flags.write_without_response,
            notify: flags.notify,
        }
    }
}

/// GATT backend running against the system BlueZ daemon
pub struct BluerBackend {
    adapter: Adapter,
}

impl BluerBackend {
    /// Open the default Bluetooth adapter and power it on
    pub async fn new() -> Result<Self, bluer::Error> {
        let session = Session::new().await?;
        let adapter = session.default_adapter().await?;

        info!("Using BLE adapter: {}", adapter.name());

        adapter.set_powered(true).await?;

        Ok(Self { adapter })
    }

    /// Check a discovered device against the selection constraints
    async fn matches(&self, device: &Device, options: &ConnectionOptions) -> bluer::Result<bool> {
        if options.accept_all() {
            return Ok(true);
        }
        let name = device.name().await?.unwrap_or_default();
        if let Some(want) = &options.name {
            if &name != want {
                return Ok(false);
            }
        }
        if let Some(prefix) = &options.name_prefix {
            if !name.starts_with(prefix.as_str()) {
                return Ok(false);
            }
        }
        if !options.services.is_empty() {
            let advertised = device.uuids().await?.unwrap_or_default();
            if !options
                .services
                .iter()
                .all(|id| advertised.contains(&id.to_uuid()))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl GattBackend for BluerBackend {
    type Device = Device;
    type Link = Device;
    type Service = Service;
    type Characteristic = Characteristic;

    async fn select_device(&self, options: &ConnectionOptions) -> BackendResult<Device> {
        debug!("Scanning for a device matching {:?}", options);

        let discovery = self.adapter.discover_devices().await?;
        pin_mut!(discovery);

        while let Some(event) = discovery.next().await {
            let AdapterEvent::DeviceAdded(addr) = event else {
                continue;
            };
            let device = self.adapter.device(addr)?;
            match self.matches(&device, options).await {
                Ok(true) => {
                    info!("Device matched: {}", addr);
                    return Ok(device);
                }
                Ok(false) => debug!("Device skipped: {}", addr),
                // Devices can disappear while being inspected.
                Err(err) => debug!("Device {} not inspectable: {}", addr, err),
            }
        }

        Err(BackendError::DeviceUnavailable(
            "Discovery ended with no matching device".into(),
        ))
    }

    async fn establish_link(&self, device: &Device) -> BackendResult<Device> {
        if !device.is_connected().await? {
            device
                .connect()
                .await
                .map_err(|err| BackendError::LinkFailed(err.to_string()))?;
        }
        Ok(device.clone())
    }

    async fn close_link(&self, link: &Device) -> BackendResult<()> {
        link.disconnect().await?;
        Ok(())
    }

    async fn discover_service(&self, link: &Device, id: Ident) -> BackendResult<Service> {
        let wanted = id.to_uuid();
        for service in link.services().await? {
            if service.uuid().await? == wanted {
                return Ok(service);
            }
        }
        Err(BackendError::ServiceNotFound(id))
    }

    async fn discover_characteristic(
        &self,
        service: &Service,
        id: Ident,
    ) -> BackendResult<Characteristic> {
        let wanted = id.to_uuid();
        for characteristic in service.characteristics().await? {
            if characteristic.uuid().await? == wanted {
                return Ok(characteristic);
            }
        }
        Err(BackendError::CharacteristicNotFound(id))
    }

    async fn characteristic_props(
        &self,
        characteristic: &Characteristic,
    ) -> BackendResult<CharacteristicProps> {
        Ok(characteristic.flags().await?.into())
    }

    async fn read_characteristic(&self, characteristic: &Characteristic) -> BackendResult<Vec<u8>> {
        characteristic
            .read()
            .await
            .map_err(|err| BackendError::ReadFailed(err.to_string()))
    }

    async fn write_characteristic(
        &self,
        characteristic: &Characteristic,
        value: &[u8],
    ) -> BackendResult<()> {
        characteristic
            .write(value)
            .await
            .map_err(|err| BackendError::WriteFailed(err.to_string()))
    }

    async fn device_id(&self, device: &Device) -> BackendResult<String> {
        Ok(device.address().to_string())
    }

    async fn device_name(&self, device: &Device) -> BackendResult<Option<String>> {
        Ok(device.name().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_mapping() {
        let flags = CharacteristicFlags {
            read: true,
            write_without_response: true,
            ..Default::default()
        };
        let props = CharacteristicProps::from(flags);
        assert!(props.read);
        assert!(props.write);
        assert!(!props.notify);

        let flags = CharacteristicFlags {
            notify: true,
            ..Default::default()
        };
        let props = CharacteristicProps::from(flags);
        assert!(!props.read);
        assert!(!props.write);
        assert!(props.notify);
    }
}
