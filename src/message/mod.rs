//! unirpc - Wire envelopes and the serialization boundary.
//!
//! Every frame on the transport is one encoded [`Message`]. The encoding is
//! chosen by a [`MessageCodec`]; [`JsonCodec`] is the default.

mod codec;
mod envelope;

pub use codec::*;
pub use envelope::*;
