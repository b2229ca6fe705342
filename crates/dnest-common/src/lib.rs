//! Common utilities for dnest.
//!
//! This crate provides the foundation shared by the DNT and PAK decoders:
//!
//! - [`BinaryReader`] - little-endian cursor with the format's primitive decoders
//! - [`text`] - EUC-KR (CP949) decoding for names and paths

mod error;
mod reader;

pub mod text;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};
