//! Wire-format constants and decoder limits for snapshot bundles.

/// Magic bytes of an uncompressed bundle.
pub const MAGIC_UNCOMPRESSED: &[u8; 4] = b"SBND";

/// Magic bytes of a zstd-compressed bundle.
pub const MAGIC_COMPRESSED: &[u8; 5] = b"SBNDZ";

/// Current bundle format version.
pub const FORMAT_VERSION: u8 = 1;

/// Oldest bundle format version the decoder accepts.
pub const MIN_FORMAT_VERSION: u8 = 1;

/// Maximum size of an encoded (or decompressed) bundle.
pub const MAX_BUNDLE_SIZE: usize = 64 * 1024 * 1024;

/// Maximum number of slots in a bundle.
pub const MAX_SLOTS: usize = 1_000_000;

/// Maximum byte length of a string (slot name, string value, locator).
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Maximum byte length of a bytes value.
pub const MAX_BYTES_LEN: usize = 32 * 1024 * 1024;

/// Maximum element count of an array slot.
pub const MAX_ARRAY_LEN: usize = 4 * 1024 * 1024;

/// Maximum bytes in an LEB128 varint encoding a u64.
pub const MAX_VARINT_BYTES: usize = 10;
