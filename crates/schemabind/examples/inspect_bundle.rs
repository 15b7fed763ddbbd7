//! Prints every slot of an encoded snapshot bundle, sorted by name.

use std::fs;

use schemabind::{decode_bundle, SlotValue, SnapshotContainer};

fn preview<T: std::fmt::Debug>(items: &[T]) -> String {
    if items.len() > 8 {
        format!("{:?} ... ({} items)", &items[..8], items.len())
    } else {
        format!("{:?}", items)
    }
}

fn format_slot(v: &SlotValue) -> String {
    match v {
        SlotValue::Boolean(b) => format!("{}", b),
        SlotValue::Int(n) => format!("{}", n),
        SlotValue::Long(n) => format!("{}", n),
        SlotValue::Float(f) => format!("{}", f),
        SlotValue::Double(f) => format!("{:.6}", f),
        SlotValue::String(s) => {
            let text: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                format!("\"{}...\"", text)
            } else {
                format!("\"{}\"", text)
            }
        }
        SlotValue::Bytes(b) => format!("BYTES[{}]", b.len()),
        SlotValue::BooleanArray(v) => preview(v),
        SlotValue::IntArray(v) => preview(v),
        SlotValue::LongArray(v) => preview(v),
        SlotValue::FloatArray(v) => preview(v),
        SlotValue::DoubleArray(v) => preview(v),
        SlotValue::StringArray(v) => preview(v),
        SlotValue::BytesArray(v) => format!("BYTES[{}][]", v.len()),
        SlotValue::Locator(l) => format!("@{}", l),
    }
}

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: inspect_bundle <bundle-file>");
        std::process::exit(2);
    };

    println!("Reading: {}", path);
    let data = fs::read(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let bundle = decode_bundle(&data).expect("Failed to decode");

    println!("\n=== Slots ({}) ===", bundle.len());
    for name in bundle.sorted_names() {
        if let Some(value) = bundle.slot(name) {
            println!("  {:<40} {:<10} {}", name, value.type_name(), format_slot(value));
        }
    }
}
