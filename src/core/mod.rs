//! unirpc - Core traits, types, and constants.
//!
//! This module provides the foundational pieces shared by every layer: the
//! caller's [`CallContext`], the pluggable [`Logger`], protocol constants and
//! the layer-independent error types.

mod constants;
mod context;
mod error;
mod traits;

pub use constants::*;
pub use context::*;
pub use error::*;
pub use traits::*;
