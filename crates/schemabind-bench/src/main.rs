//! Round-trip benchmark over a synthetic library catalog.
//!
//! Builds `N` nested records (default 2000), then times saving and loading
//! them through the in-memory row store, and snapshotting them through the
//! bundle format, plain and compressed.

use std::error::Error;
use std::time::Instant;

use schemabind::{
    decode_bundle, encode_bundle, encode_bundle_compressed, encode_bundle_with_options, ArrayValue,
    BoundValue, Bundle, EncodeOptions, MapValue, MemoryStore, RecordValue, ResourceLocator, Row,
    RowStore, SchemaType, Value,
};
use serde_json::json;

const DEFAULT_COUNT: usize = 2000;
const LOAD_ITERS: u32 = 5;

// =============================================================================
// SCHEMA
// =============================================================================

fn catalog_schema() -> Result<SchemaType, Box<dyn Error>> {
    let descriptor = json!({
        "type": "record",
        "name": "Book",
        "fields": [
            {"name": "isbn", "type": "string"},
            {"name": "title", "type": "string"},
            {"name": "pages", "type": "int"},
            {"name": "rating", "type": "double"},
            {"name": "format", "type": {
                "type": "enum",
                "name": "Format",
                "symbols": ["HARDCOVER", "PAPERBACK", "EBOOK"]
            }},
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "chapters", "type": {"type": "array", "items": {
                "type": "record",
                "name": "Chapter",
                "fields": [
                    {"name": "title", "type": "string"},
                    {"name": "words", "type": "long"}
                ]
            }}},
            {"name": "stock", "type": {"type": "map", "values": "int"}},
            {"name": "publisher", "type": {
                "type": "record",
                "name": "Publisher",
                "fields": [
                    {"name": "name", "type": "string"},
                    {"name": "founded", "type": "int"}
                ]
            }}
        ]
    });
    Ok(SchemaType::from_json_value(&descriptor)?)
}

// =============================================================================
// DATASET
// =============================================================================

const FORMATS: [&str; 3] = ["HARDCOVER", "PAPERBACK", "EBOOK"];
const BRANCHES: [&str; 4] = ["north", "south", "east", "west"];

fn build_book(schema: &SchemaType, i: usize) -> Result<RecordValue, Box<dyn Error>> {
    let field_schema = |name: &str| {
        schema
            .as_record()
            .and_then(|r| r.field(name))
            .map(|f| f.schema.clone())
            .ok_or_else(|| format!("schema has no field {name}"))
    };

    let mut tags = ArrayValue::of(SchemaType::STRING);
    for t in 0..(i % 4) {
        tags.push(format!("tag-{}", (i + t) % 17))?;
    }

    let chapter_schema = field_schema("chapters")?
        .element_type()
        .cloned()
        .ok_or("chapters is not an array")?;
    let mut chapters = ArrayValue::of(chapter_schema.clone());
    for c in 0..(3 + i % 5) {
        let chapter = RecordValue::for_schema(&chapter_schema)?
            .with("title", format!("Chapter {}", c + 1))?
            .with("words", (1000 + c * 250 + i) as i64)?;
        chapters.push(chapter)?;
    }

    let mut stock = MapValue::of(SchemaType::INT);
    for (b, branch) in BRANCHES.iter().enumerate() {
        if (i + b) % 3 != 0 {
            stock.insert(*branch, ((i * 7 + b) % 50) as i32)?;
        }
    }

    let publisher = RecordValue::for_schema(&field_schema("publisher")?)?
        .with("name", format!("Press {}", i % 40))?
        .with("founded", 1900 + (i % 120) as i32)?;

    Ok(RecordValue::for_schema(schema)?
        .with("isbn", format!("978-{:09}", i))?
        .with("title", format!("Book number {}", i))?
        .with("pages", 100 + (i % 900) as i32)?
        .with("rating", (i % 50) as f64 / 10.0)?
        .with("format", Value::Enum(FORMATS[i % FORMATS.len()].to_string()))?
        .with("tags", tags)?
        .with("chapters", chapters)?
        .with("stock", stock)?
        .with("publisher", publisher)?)
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> Result<(), Box<dyn Error>> {
    let count = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_COUNT,
    };

    let schema = catalog_schema()?;

    let build_start = Instant::now();
    let mut books = (0..count)
        .map(|i| build_book(&schema, i))
        .collect::<Result<Vec<_>, _>>()?;
    println!("Built {} books in {:?}", books.len(), build_start.elapsed());

    // Row store: insert, save
    let mut store = MemoryStore::new();
    let collection = ResourceLocator::new("books");
    let save_start = Instant::now();
    for book in &mut books {
        let at = store.insert(&collection, Row::new())?;
        book.set_locator(at);
        book.save(&mut store, "")?;
    }
    let save_time = save_start.elapsed();
    println!("\n=== Row Store ===");
    println!("Saved {} books ({} rows) in {:?}", books.len(), store.len(), save_time);
    println!(
        "  Throughput: {:.0} books/s",
        books.len() as f64 / save_time.as_secs_f64()
    );

    // Row store: load
    let load_start = Instant::now();
    let mut loaded = Vec::with_capacity(books.len());
    for _ in 0..LOAD_ITERS {
        loaded.clear();
        for book in &books {
            let mut fresh = RecordValue::for_schema(&schema)?;
            if let Some(at) = book.locator() {
                fresh.set_locator(at.clone());
            }
            fresh.load(&mut store, "")?;
            loaded.push(fresh);
        }
    }
    let load_time = load_start.elapsed() / LOAD_ITERS;
    println!("Loaded {} books in {:?} (avg of {} iterations)", loaded.len(), load_time, LOAD_ITERS);
    assert_eq!(loaded, books, "store round trip changed the data");

    // Snapshot
    let snapshot_start = Instant::now();
    let mut bundle = Bundle::new();
    for (i, book) in books.iter().enumerate() {
        book.save_state(&mut bundle, &format!("book{}", i))?;
    }
    let snapshot_time = snapshot_start.elapsed();
    println!("\n=== Snapshot ===");
    println!("Wrote {} slots in {:?}", bundle.len(), snapshot_time);

    let encode_start = Instant::now();
    let encoded = encode_bundle(&bundle)?;
    let encode_time = encode_start.elapsed();
    println!("\nUncompressed: {} bytes in {:?}", encoded.len(), encode_time);
    println!(
        "  Throughput: {:.2} MB/s",
        (encoded.len() as f64 / 1_000_000.0) / encode_time.as_secs_f64()
    );

    let canonical = encode_bundle_with_options(&bundle, EncodeOptions::canonical())?;
    let canonical_again = encode_bundle_with_options(&bundle, EncodeOptions::canonical())?;
    assert_eq!(canonical, canonical_again, "canonical encoding should be deterministic");

    let compress_start = Instant::now();
    let compressed = encode_bundle_compressed(&bundle, 3)?;
    let compress_time = compress_start.elapsed();
    println!("\nCompressed (level 3): {} bytes in {:?}", compressed.len(), compress_time);
    println!(
        "  Compression ratio: {:.1}x",
        encoded.len() as f64 / compressed.len() as f64
    );

    let decode_start = Instant::now();
    let decoded = decode_bundle(&compressed)?;
    let decode_time = decode_start.elapsed();
    println!("\nDecode (compressed): {:?}", decode_time);

    let restore_start = Instant::now();
    for (i, book) in books.iter().enumerate() {
        let mut restored = RecordValue::for_schema(&schema)?;
        restored.load_state(&decoded, &format!("book{}", i))?;
        assert_eq!(&restored, book, "snapshot round trip changed book {}", i);
    }
    println!("Restored {} books in {:?}", books.len(), restore_start.elapsed());

    println!("\n=== Summary ===");
    println!("Books: {}", books.len());
    println!("Store rows: {}", store.len());
    println!("Bundle slots: {}", bundle.len());
    println!(
        "Bundle: {} bytes uncompressed, {} bytes compressed ({:.1}%)",
        encoded.len(),
        compressed.len(),
        100.0 * compressed.len() as f64 / encoded.len() as f64
    );
    Ok(())
}
