//! GATT device session with cached discovery

use std::fmt;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use crate::{
    backend::GattBackend,
    core::{
        cache::DiscoveryCache,
        codec::{self, Value, ValueFormat},
        error::{BackendError, SessionError, SessionResult},
        ident::Ident,
        types::{CharacteristicRef, ConnectionOptions},
    },
};

/// State carried while a link is established
struct LinkState<B: GattBackend> {
    device: B::Device,
    link: B::Link,
    device_id: String,
    device_name: Option<String>,
}

/// Session with a single GATT peripheral
///
/// Wraps a backend's device-selection, link and discovery primitives behind
/// a connect/disconnect lifecycle and caches every resolved service and
/// characteristic handle until the next reset. All mutating operations take
/// `&mut self`; the session is not meant to be shared between tasks.
pub struct DeviceSession<B: GattBackend> {
    backend: Arc<B>,
    state: Option<LinkState<B>>,
    cache: DiscoveryCache<B::Service, B::Characteristic>,
    debug: bool,
}

impl<B: GattBackend> DeviceSession<B> {
    /// Create a disconnected session over a backend
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: None,
            cache: DiscoveryCache::new(),
            debug: false,
        }
    }

    /// Include underlying error detail in failure logs
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// True while a link is established
    pub fn is_connected(&self) -> bool {
        self.state.is_some()
    }

    /// Identifier of the connected device
    pub fn device_id(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.device_id.as_str())
    }

    /// Advertised name of the connected device
    pub fn device_name(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.device_name.as_deref())
    }

    /// Handle of the connected device
    pub fn device(&self) -> Option<&B::Device> {
        self.state.as_ref().map(|s| &s.device)
    }

    /// Handle of the established link
    pub fn link(&self) -> Option<&B::Link> {
        self.state.as_ref().map(|s| &s.link)
    }

    // Drop the link handle and every cached discovery result. Does not
    // terminate an established link; `disconnect` is the teardown path.
    fn reset(&mut self) {
        self.state = None;
        self.cache.clear();
    }

    // Failure logs carry a fixed message; detail only with the debug flag.
    fn log_failure(&self, message: &str, err: &dyn fmt::Display) {
        if self.debug {
            error!("{}: {}", message, err);
        } else {
            error!("{}", message);
        }
    }

    /// Connect to a device matching the given options
    ///
    /// Resets the session, selects a device, establishes the link and
    /// eagerly resolves every service listed in `options.services`. Returns
    /// `true` only when all of that succeeded; on any failure the session is
    /// left disconnected with an empty cache and no live link. Errors are
    /// logged, never propagated.
    pub async fn connect(&mut self, options: &ConnectionOptions) -> bool {
        match self.try_connect(options).await {
            Ok(()) => true,
            Err(err) => {
                self.log_failure("Connect failed", &err);
                false
            }
        }
    }

    async fn try_connect(&mut self, options: &ConnectionOptions) -> SessionResult<()> {
        self.reset();

        let device = self
            .backend
            .select_device(options)
            .await
            .map_err(SessionError::SelectionFailed)?;
        let device_id = self
            .backend
            .device_id(&device)
            .await
            .map_err(SessionError::SelectionFailed)?;
        let device_name = self
            .backend
            .device_name(&device)
            .await
            .map_err(SessionError::SelectionFailed)?;
        debug!("Selected device {}", device_id);

        let link = self
            .backend
            .establish_link(&device)
            .await
            .map_err(SessionError::LinkFailed)?;

        // Resolve all declared services up front; one miss fails the batch.
        let backend = &self.backend;
        let link_ref = &link;
        let resolutions = options.services.iter().map(|&id| async move {
            let service = backend.discover_service(link_ref, id).await?;
            Ok::<_, BackendError>((id, service))
        });
        let resolved = match try_join_all(resolutions).await {
            Ok(resolved) => resolved,
            Err(err) => {
                // A failed connect must not leave a live link behind.
                if let Err(close_err) = self.backend.close_link(&link).await {
                    self.log_failure("Link teardown after failed connect", &close_err);
                }
                return Err(SessionError::DiscoveryFailed(err));
            }
        };

        for (id, service) in resolved {
            self.cache.put_service(id, service);
        }
        info!(
            "Connected to {} ({} services resolved)",
            device_id,
            options.services.len()
        );
        self.state = Some(LinkState {
            device,
            link,
            device_id,
            device_name,
        });
        Ok(())
    }

    /// Tear down the current link and reset the session
    ///
    /// Safe to call at any time; without an established link this is a
    /// warning-level no-op. Teardown failures are logged, not surfaced.
    pub async fn disconnect(&mut self) {
        let Some(state) = self.state.take() else {
            warn!("Disconnect requested but no link is established");
            return;
        };
        if let Err(err) = self.backend.close_link(&state.link).await {
            self.log_failure("Link teardown failed", &err);
        }
        self.reset();
        info!("Disconnected from {}", state.device_id);
    }

    /// Resolve a service by identifier, consulting the cache first
    pub async fn get_service(&mut self, id: Ident) -> SessionResult<B::Service> {
        let state = self.state.as_ref().ok_or(SessionError::NotConnected)?;
        if let Some(service) = self.cache.service(id) {
            debug!("Service {} served from cache", id);
            return Ok(service.clone());
        }
        match self.backend.discover_service(&state.link, id).await {
            Ok(service) => {
                self.cache.put_service(id, service.clone());
                Ok(service)
            }
            Err(err) => {
                self.log_failure("Service discovery failed", &err);
                Err(SessionError::DiscoveryFailed(err))
            }
        }
    }

    /// Resolve a characteristic by identifier pair, consulting the cache first
    ///
    /// A cache miss resolves the owning service (possibly populating the
    /// service cache along the way) and then the characteristic within it.
    pub async fn get_characteristic(
        &mut self,
        service_id: Ident,
        characteristic_id: Ident,
    ) -> SessionResult<B::Characteristic> {
        if self.state.is_none() {
            return Err(SessionError::NotConnected);
        }
        if let Some(characteristic) = self.cache.characteristic(service_id, characteristic_id) {
            debug!("Characteristic {} served from cache", characteristic_id);
            return Ok(characteristic.clone());
        }
        let service = self.get_service(service_id).await?;
        match self
            .backend
            .discover_characteristic(&service, characteristic_id)
            .await
        {
            Ok(characteristic) => {
                self.cache
                    .put_characteristic(service_id, characteristic_id, characteristic.clone());
                Ok(characteristic)
            }
            Err(err) => {
                self.log_failure("Characteristic discovery failed", &err);
                Err(SessionError::DiscoveryFailed(err))
            }
        }
    }

    async fn resolve_target(
        &mut self,
        target: &CharacteristicRef<B::Characteristic>,
    ) -> SessionResult<B::Characteristic> {
        match target {
            CharacteristicRef::Resolved(characteristic) => Ok(characteristic.clone()),
            CharacteristicRef::Lookup {
                service,
                characteristic,
            } => self.get_characteristic(*service, *characteristic).await,
        }
    }

    async fn try_write_value(
        &mut self,
        target: &CharacteristicRef<B::Characteristic>,
        value: &[u8],
    ) -> SessionResult<()> {
        let characteristic = self.resolve_target(target).await?;
        self.backend
            .write_characteristic(&characteristic, value)
            .await
            .map_err(SessionError::WriteFailed)
    }

    /// Write a payload to a characteristic
    ///
    /// The target is either a pre-resolved handle or an identifier pair
    /// resolved through the cache. Failures are logged and swallowed;
    /// `Some(())` signals an acknowledged write.
    pub async fn write_value(
        &mut self,
        target: &CharacteristicRef<B::Characteristic>,
        value: &[u8],
    ) -> Option<()> {
        match self.try_write_value(target, value).await {
            Ok(()) => {
                debug!("Wrote {} bytes", value.len());
                Some(())
            }
            Err(err) => {
                self.log_failure("Write failed", &err);
                None
            }
        }
    }

    async fn try_read_value(
        &mut self,
        target: &CharacteristicRef<B::Characteristic>,
        format: ValueFormat,
    ) -> SessionResult<Value> {
        let characteristic = self.resolve_target(target).await?;
        let props = self
            .backend
            .characteristic_props(&characteristic)
            .await
            .map_err(SessionError::DiscoveryFailed)?;
        if !props.read {
            return Err(SessionError::ReadUnsupported);
        }
        let raw = self
            .backend
            .read_characteristic(&characteristic)
            .await
            .map_err(SessionError::ReadFailed)?;
        Ok(codec::decode(raw, format))
    }

    /// Read a characteristic value in the requested representation
    ///
    /// Characteristics without read support yield a warning and `None`
    /// instead of a platform error. All other failures are logged and
    /// swallowed.
    pub async fn read_value(
        &mut self,
        target: &CharacteristicRef<B::Characteristic>,
        format: ValueFormat,
    ) -> Option<Value> {
        match self.try_read_value(target, format).await {
            Ok(value) => Some(value),
            Err(SessionError::ReadUnsupported) => {
                warn!("Characteristic does not support reads");
                None
            }
            Err(err) => {
                self.log_failure("Read failed", &err);
                None
            }
        }
    }
}
