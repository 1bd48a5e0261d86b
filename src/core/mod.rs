//! Core session logic module

pub mod cache;
pub mod codec;
pub mod error;
pub mod ident;
pub mod session;
pub mod types;
