//! GATT Session
//!
//! A client-side session for a single Bluetooth Low Energy peripheral:
//! device selection, GATT service and characteristic discovery with
//! caching, and characteristic value access.

pub mod backend;
pub mod config;
pub mod core;

pub use crate::core::{
    codec::{Value, ValueFormat},
    error::{BackendError, IdentError, SessionError},
    ident::Ident,
    session::DeviceSession,
    types::{CharacteristicProps, CharacteristicRef, ConnectionOptions},
};
