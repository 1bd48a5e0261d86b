//! GATT backend abstraction layer

pub mod bluer_backend;
pub mod gatt_backend;
pub mod mock_backend;

pub use bluer_backend::BluerBackend;
pub use gatt_backend::GattBackend;

#[cfg(test)]
pub use mock_backend::MockGattBackend;
