//! Binary encoding/decoding of snapshot bundles.
//!
//! A [`Bundle`](crate::snapshot::Bundle) encoded with this module can be
//! written to disk or handed to a host and restored after the process
//! restarts.

pub mod bundle;
pub mod primitives;

pub use bundle::{
    decode_bundle, decompress, encode_bundle, encode_bundle_compressed, encode_bundle_with_options,
    EncodeOptions, SlotTag,
};
pub use primitives::{Reader, Writer, zigzag_decode, zigzag_encode};
