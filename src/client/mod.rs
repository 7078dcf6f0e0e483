//! unirpc - Client Library
//!
//! High-level API for calling a unirpc server: [`UniClient`] plus the
//! reconnection machinery it is built on.

mod backoff;
#[allow(clippy::module_inception)]
mod client;
#[cfg(test)]
mod mock;
mod reconnect;

pub use backoff::*;
pub use client::*;
pub use reconnect::*;
