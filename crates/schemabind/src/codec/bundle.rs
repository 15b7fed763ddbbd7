//! Bundle encoding/decoding.
//!
//! Layout of an uncompressed bundle:
//!
//! ```text
//! "SBND" | version: u8 | slot_count: varint | slot*
//! slot = name: string | tag: u8 | payload
//! ```
//!
//! Integers are zigzag varints, floats little-endian, strings and byte
//! arrays length-prefixed, arrays a varint count followed by elements.
//! The compressed form is `"SBNDZ" | uncompressed_size: varint | zstd frame`.

use std::io::Read;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::codec::primitives::{Reader, Writer};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{
    FORMAT_VERSION, MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED, MAX_ARRAY_LEN, MAX_BUNDLE_SIZE,
    MAX_BYTES_LEN, MAX_SLOTS, MAX_STRING_LEN, MIN_FORMAT_VERSION,
};
use crate::locator::ResourceLocator;
use crate::snapshot::{Bundle, SlotValue, SnapshotContainer};

/// Wire tag of a slot payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotTag {
    Boolean = 1,
    Int = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    String = 6,
    Bytes = 7,
    BooleanArray = 8,
    IntArray = 9,
    LongArray = 10,
    FloatArray = 11,
    DoubleArray = 12,
    StringArray = 13,
    BytesArray = 14,
    Locator = 15,
}

impl SlotTag {
    /// Creates a SlotTag from its wire representation.
    pub fn from_u8(v: u8) -> Option<SlotTag> {
        match v {
            1 => Some(SlotTag::Boolean),
            2 => Some(SlotTag::Int),
            3 => Some(SlotTag::Long),
            4 => Some(SlotTag::Float),
            5 => Some(SlotTag::Double),
            6 => Some(SlotTag::String),
            7 => Some(SlotTag::Bytes),
            8 => Some(SlotTag::BooleanArray),
            9 => Some(SlotTag::IntArray),
            10 => Some(SlotTag::LongArray),
            11 => Some(SlotTag::FloatArray),
            12 => Some(SlotTag::DoubleArray),
            13 => Some(SlotTag::StringArray),
            14 => Some(SlotTag::BytesArray),
            15 => Some(SlotTag::Locator),
            _ => None,
        }
    }

    pub fn of(value: &SlotValue) -> SlotTag {
        match value {
            SlotValue::Boolean(_) => SlotTag::Boolean,
            SlotValue::Int(_) => SlotTag::Int,
            SlotValue::Long(_) => SlotTag::Long,
            SlotValue::Float(_) => SlotTag::Float,
            SlotValue::Double(_) => SlotTag::Double,
            SlotValue::String(_) => SlotTag::String,
            SlotValue::Bytes(_) => SlotTag::Bytes,
            SlotValue::BooleanArray(_) => SlotTag::BooleanArray,
            SlotValue::IntArray(_) => SlotTag::IntArray,
            SlotValue::LongArray(_) => SlotTag::LongArray,
            SlotValue::FloatArray(_) => SlotTag::FloatArray,
            SlotValue::DoubleArray(_) => SlotTag::DoubleArray,
            SlotValue::StringArray(_) => SlotTag::StringArray,
            SlotValue::BytesArray(_) => SlotTag::BytesArray,
            SlotValue::Locator(_) => SlotTag::Locator,
        }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decompresses an SBNDZ bundle, returning the uncompressed SBND bytes.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if input.len() < 5 {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }
    if &input[0..5] != MAGIC_COMPRESSED {
        let mut found = [0u8; 4];
        found.copy_from_slice(&input[0..4]);
        return Err(DecodeError::InvalidMagic { found });
    }
    decompress_zstd(&input[5..])
}

/// Decodes a bundle, accepting both the compressed and uncompressed forms.
pub fn decode_bundle(input: &[u8]) -> Result<Bundle, DecodeError> {
    if input.len() < 4 {
        return Err(DecodeError::UnexpectedEof { context: "magic" });
    }

    if input.len() >= 5 && &input[0..5] == MAGIC_COMPRESSED {
        let decompressed = decompress_zstd(&input[5..])?;
        decode_uncompressed(&decompressed)
    } else if &input[0..4] == MAGIC_UNCOMPRESSED {
        if input.len() > MAX_BUNDLE_SIZE {
            return Err(DecodeError::LengthExceedsLimit {
                field: "bundle",
                len: input.len(),
                max: MAX_BUNDLE_SIZE,
            });
        }
        decode_uncompressed(input)
    } else {
        let mut found = [0u8; 4];
        found.copy_from_slice(&input[0..4]);
        Err(DecodeError::InvalidMagic { found })
    }
}

fn decode_uncompressed(input: &[u8]) -> Result<Bundle, DecodeError> {
    let mut reader = Reader::new(input);
    reader.read_bytes(4, "magic")?;

    let version = reader.read_byte("version")?;
    if !(MIN_FORMAT_VERSION..=FORMAT_VERSION).contains(&version) {
        return Err(DecodeError::UnsupportedVersion { version });
    }

    let count = reader.read_len(MAX_SLOTS, "slot_count")?;
    // Cap the preallocation: every slot needs at least two bytes.
    let mut bundle = Bundle::with_capacity(count.min(reader.remaining_len() / 2));
    let mut seen = FxHashSet::with_capacity_and_hasher(count.min(1024), Default::default());

    for _ in 0..count {
        let name = reader.read_string(MAX_STRING_LEN, "slot_name")?;
        if !seen.insert(name.clone()) {
            return Err(DecodeError::DuplicateSlot { name });
        }
        let value = decode_slot(&mut reader)?;
        bundle.put_slot(&name, value);
    }

    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes(reader.remaining_len()));
    }

    debug!(bytes = input.len(), slots = bundle.len(), "decoded bundle");
    Ok(bundle)
}

fn decode_slot(reader: &mut Reader<'_>) -> Result<SlotValue, DecodeError> {
    let tag_byte = reader.read_byte("slot_tag")?;
    let tag = SlotTag::from_u8(tag_byte).ok_or(DecodeError::InvalidSlotTag { tag: tag_byte })?;

    Ok(match tag {
        SlotTag::Boolean => SlotValue::Boolean(reader.read_bool("boolean")?),
        SlotTag::Int => SlotValue::Int(read_int(reader)?),
        SlotTag::Long => SlotValue::Long(reader.read_signed_varint("long")?),
        SlotTag::Float => SlotValue::Float(reader.read_f32("float")?),
        SlotTag::Double => SlotValue::Double(reader.read_f64("double")?),
        SlotTag::String => SlotValue::String(reader.read_string(MAX_STRING_LEN, "string")?),
        SlotTag::Bytes => SlotValue::Bytes(reader.read_bytes_prefixed(MAX_BYTES_LEN, "bytes")?),
        SlotTag::BooleanArray => {
            SlotValue::BooleanArray(read_vec(reader, |r| r.read_bool("boolean[]"))?)
        }
        SlotTag::IntArray => SlotValue::IntArray(read_vec(reader, read_int)?),
        SlotTag::LongArray => {
            SlotValue::LongArray(read_vec(reader, |r| r.read_signed_varint("long[]"))?)
        }
        SlotTag::FloatArray => SlotValue::FloatArray(read_vec(reader, |r| r.read_f32("float[]"))?),
        SlotTag::DoubleArray => {
            SlotValue::DoubleArray(read_vec(reader, |r| r.read_f64("double[]"))?)
        }
        SlotTag::StringArray => {
            SlotValue::StringArray(read_vec(reader, |r| r.read_string(MAX_STRING_LEN, "string[]"))?)
        }
        SlotTag::BytesArray => {
            SlotValue::BytesArray(read_vec(reader, |r| {
                r.read_bytes_prefixed(MAX_BYTES_LEN, "bytes[]")
            })?)
        }
        SlotTag::Locator => SlotValue::Locator(ResourceLocator::new(
            reader.read_string(MAX_STRING_LEN, "locator")?,
        )),
    })
}

fn read_int(reader: &mut Reader<'_>) -> Result<i32, DecodeError> {
    let value = reader.read_signed_varint("int")?;
    i32::try_from(value).map_err(|_| DecodeError::IntOutOfRange { value })
}

fn read_vec<'a, T>(
    reader: &mut Reader<'a>,
    mut read: impl FnMut(&mut Reader<'a>) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let len = reader.read_len(MAX_ARRAY_LEN, "array_len")?;
    let mut out = Vec::with_capacity(len.min(reader.remaining_len()));
    for _ in 0..len {
        out.push(read(reader)?);
    }
    Ok(out)
}

fn decompress_zstd(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut reader = Reader::new(compressed);
    let declared_size = reader.read_len(MAX_BUNDLE_SIZE, "uncompressed_size")?;

    let decoder = zstd::Decoder::new(reader.remaining())
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    // One byte past the declared size is enough to detect a lying header.
    let mut decompressed = Vec::with_capacity(declared_size);
    decoder
        .take(declared_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() != declared_size {
        return Err(DecodeError::UncompressedSizeMismatch {
            declared: declared_size,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Options for encoding bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Enable canonical encoding mode.
    ///
    /// When enabled, slots are written sorted by name, so equal bundles
    /// always produce identical bytes.
    pub canonical: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canonical() -> Self {
        Self { canonical: true }
    }
}

/// Encodes a bundle to the uncompressed format.
pub fn encode_bundle(bundle: &Bundle) -> Result<Vec<u8>, EncodeError> {
    encode_bundle_with_options(bundle, EncodeOptions::default())
}

/// Encodes a bundle to the uncompressed format with options.
pub fn encode_bundle_with_options(
    bundle: &Bundle,
    options: EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    check_len("slot_count", bundle.len(), MAX_SLOTS)?;

    let mut writer = Writer::with_capacity(16 + bundle.len() * 24);
    writer.write_bytes(MAGIC_UNCOMPRESSED);
    writer.write_byte(FORMAT_VERSION);
    writer.write_varint(bundle.len() as u64);

    if options.canonical {
        let mut slots: Vec<(&str, &SlotValue)> = bundle.iter().collect();
        slots.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (name, value) in slots {
            encode_slot(&mut writer, name, value)?;
        }
    } else {
        for (name, value) in bundle.iter() {
            encode_slot(&mut writer, name, value)?;
        }
    }

    check_len("bundle", writer.len(), MAX_BUNDLE_SIZE)?;
    debug!(bytes = writer.len(), slots = bundle.len(), "encoded bundle");
    Ok(writer.into_bytes())
}

/// Encodes a bundle and compresses it with zstd at the given level.
pub fn encode_bundle_compressed(bundle: &Bundle, level: i32) -> Result<Vec<u8>, EncodeError> {
    let uncompressed = encode_bundle(bundle)?;

    let compressed = zstd::encode_all(uncompressed.as_slice(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;

    let mut writer = Writer::with_capacity(5 + 10 + compressed.len());
    writer.write_bytes(MAGIC_COMPRESSED);
    writer.write_varint(uncompressed.len() as u64);
    writer.write_bytes(&compressed);

    debug!(
        uncompressed = uncompressed.len(),
        compressed = writer.len(),
        "compressed bundle"
    );
    Ok(writer.into_bytes())
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), EncodeError> {
    if len > max {
        return Err(EncodeError::LengthExceedsLimit { field, len, max });
    }
    Ok(())
}

fn write_str(writer: &mut Writer, field: &'static str, s: &str) -> Result<(), EncodeError> {
    check_len(field, s.len(), MAX_STRING_LEN)?;
    writer.write_string(s);
    Ok(())
}

fn write_blob(writer: &mut Writer, field: &'static str, b: &[u8]) -> Result<(), EncodeError> {
    check_len(field, b.len(), MAX_BYTES_LEN)?;
    writer.write_bytes_prefixed(b);
    Ok(())
}

fn write_vec<T>(
    writer: &mut Writer,
    items: &[T],
    mut write: impl FnMut(&mut Writer, &T) -> Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    check_len("array_len", items.len(), MAX_ARRAY_LEN)?;
    writer.write_varint(items.len() as u64);
    for item in items {
        write(writer, item)?;
    }
    Ok(())
}

fn encode_slot(writer: &mut Writer, name: &str, value: &SlotValue) -> Result<(), EncodeError> {
    write_str(writer, "slot_name", name)?;
    writer.write_byte(SlotTag::of(value) as u8);

    match value {
        SlotValue::Boolean(b) => writer.write_bool(*b),
        SlotValue::Int(i) => writer.write_signed_varint(*i as i64),
        SlotValue::Long(l) => writer.write_signed_varint(*l),
        SlotValue::Float(f) => writer.write_f32(*f),
        SlotValue::Double(d) => writer.write_f64(*d),
        SlotValue::String(s) => write_str(writer, "string", s)?,
        SlotValue::Bytes(b) => write_blob(writer, "bytes", b)?,
        SlotValue::BooleanArray(v) => write_vec(writer, v, |w, b| {
            w.write_bool(*b);
            Ok(())
        })?,
        SlotValue::IntArray(v) => write_vec(writer, v, |w, i| {
            w.write_signed_varint(*i as i64);
            Ok(())
        })?,
        SlotValue::LongArray(v) => write_vec(writer, v, |w, l| {
            w.write_signed_varint(*l);
            Ok(())
        })?,
        SlotValue::FloatArray(v) => write_vec(writer, v, |w, f| {
            w.write_f32(*f);
            Ok(())
        })?,
        SlotValue::DoubleArray(v) => write_vec(writer, v, |w, d| {
            w.write_f64(*d);
            Ok(())
        })?,
        SlotValue::StringArray(v) => write_vec(writer, v, |w, s| write_str(w, "string[]", s))?,
        SlotValue::BytesArray(v) => write_vec(writer, v, |w, b| write_blob(w, "bytes[]", b))?,
        SlotValue::Locator(l) => write_str(writer, "locator", l.as_str())?,
    }
    Ok(())
}
