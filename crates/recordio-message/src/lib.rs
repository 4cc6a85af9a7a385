//! Structured messages on top of recordio record streams.
//!
//! The record layer moves opaque bytes. This crate adds the payload side:
//! a [`MessageCodec`] turns values into record bytes and back, and the
//! [`ReadMessageExt`] / [`WriteMessageExt`] traits read and write one
//! message per record.
//!
//! Built-in codecs:
//! - [`JsonCodec`] for any serde type
//! - [`HeaderCodec`] for recordio headers themselves
//! - [`ProstCodec`] for Protocol Buffers messages (behind the `prost` feature)
//! - [`fn_codec`] for a pair of closures

pub mod codec;
pub mod error;
pub mod ext;
pub mod json;
#[cfg(feature = "prost")]
pub mod protobuf;

pub use codec::{fn_codec, FnCodec, HeaderCodec, MessageCodec};
pub use error::{MessageError, Result};
pub use ext::{ReadMessageExt, WriteMessageExt};
pub use json::JsonCodec;
#[cfg(feature = "prost")]
pub use protobuf::ProstCodec;
