//! Loading schema descriptors from Avro-style JSON.
//!
//! Supported forms:
//! - a primitive name: `"int"`, `{"type": "int"}`
//! - `{"type": "record", "name": .., "fields": [{"name": .., "type": ..}]}`
//! - `{"type": "enum", "name": .., "symbols": [..]}`
//! - `{"type": "fixed", "name": .., "size": ..}`
//! - `{"type": "array", "items": ..}` and `{"type": "map", "values": ..}`
//! - a JSON array of branches for unions
//! - the name of a previously defined record, enum or fixed type

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value as Json, json};

use crate::error::SchemaError;
use crate::schema::types::check_identifier;
use crate::schema::{Field, Primitive, RecordSchema, SchemaType};

impl SchemaType {
    /// Parses a descriptor from JSON text.
    pub fn parse_json(text: &str) -> Result<SchemaType, SchemaError> {
        let json: Json = serde_json::from_str(text)?;
        SchemaType::from_json_value(&json)
    }

    /// Builds a descriptor from an already parsed JSON document.
    pub fn from_json_value(json: &Json) -> Result<SchemaType, SchemaError> {
        Parser::default().parse(json)
    }

    /// Renders the descriptor back to JSON. Named types are written in full
    /// on first use and by name afterwards.
    pub fn to_json_value(&self) -> Json {
        let mut seen = FxHashSet::default();
        render(self, &mut seen)
    }
}

#[derive(Default)]
struct Parser {
    named: FxHashMap<String, SchemaType>,
    in_progress: FxHashSet<String>,
}

impl Parser {
    fn parse(&mut self, json: &Json) -> Result<SchemaType, SchemaError> {
        match json {
            Json::String(name) => self.resolve_name(name),
            Json::Array(branches) => {
                let branches = branches
                    .iter()
                    .map(|b| self.parse(b))
                    .collect::<Result<Vec<_>, _>>()?;
                SchemaType::union(branches)
            }
            Json::Object(obj) => self.parse_object(obj),
            _ => Err(SchemaError::InvalidAttribute {
                context: "schema",
                attribute: "type",
            }),
        }
    }

    fn resolve_name(&self, name: &str) -> Result<SchemaType, SchemaError> {
        if let Some(p) = Primitive::from_name(name) {
            return Ok(SchemaType::Primitive(p));
        }
        if self.in_progress.contains(name) {
            return Err(SchemaError::RecursiveType {
                name: name.to_string(),
            });
        }
        self.named
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType {
                name: name.to_string(),
            })
    }

    fn parse_object(&mut self, obj: &Map<String, Json>) -> Result<SchemaType, SchemaError> {
        let ty = obj.get("type").ok_or(SchemaError::MissingAttribute {
            context: "schema",
            attribute: "type",
        })?;

        let type_name = match ty {
            Json::String(s) => s.as_str(),
            // {"type": {...}} or {"type": [...]} wraps another schema
            other => return self.parse(other),
        };

        match type_name {
            "record" => self.parse_record(obj),
            "enum" => self.parse_enum(obj),
            "fixed" => self.parse_fixed(obj),
            "array" => {
                let items = obj.get("items").ok_or(SchemaError::MissingAttribute {
                    context: "array",
                    attribute: "items",
                })?;
                Ok(SchemaType::array(self.parse(items)?))
            }
            "map" => {
                let values = obj.get("values").ok_or(SchemaError::MissingAttribute {
                    context: "map",
                    attribute: "values",
                })?;
                Ok(SchemaType::map(self.parse(values)?))
            }
            other => self.resolve_name(other),
        }
    }

    fn parse_record(&mut self, obj: &Map<String, Json>) -> Result<SchemaType, SchemaError> {
        let name = required_str(obj, "record", "name")?.to_string();
        self.begin_named("record", &name)?;

        let fields_json = obj
            .get("fields")
            .ok_or(SchemaError::MissingAttribute {
                context: "record",
                attribute: "fields",
            })?
            .as_array()
            .ok_or(SchemaError::InvalidAttribute {
                context: "record",
                attribute: "fields",
            })?;

        let mut fields = Vec::with_capacity(fields_json.len());
        for field_json in fields_json {
            let field_obj = field_json.as_object().ok_or(SchemaError::InvalidAttribute {
                context: "record",
                attribute: "fields",
            })?;
            let field_name = required_str(field_obj, "field", "name")?;
            let field_type = field_obj.get("type").ok_or(SchemaError::MissingAttribute {
                context: "field",
                attribute: "type",
            })?;
            fields.push(Field::new(field_name, self.parse(field_type)?));
        }

        let schema = SchemaType::record(RecordSchema::new(name.clone(), fields)?);
        self.finish_named(name, schema.clone());
        Ok(schema)
    }

    fn parse_enum(&mut self, obj: &Map<String, Json>) -> Result<SchemaType, SchemaError> {
        let name = required_str(obj, "enum", "name")?.to_string();
        self.begin_named("enum", &name)?;

        let symbols = obj
            .get("symbols")
            .ok_or(SchemaError::MissingAttribute {
                context: "enum",
                attribute: "symbols",
            })?
            .as_array()
            .and_then(|arr| {
                arr.iter()
                    .map(|s| s.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or(SchemaError::InvalidAttribute {
                context: "enum",
                attribute: "symbols",
            })?;

        let schema = SchemaType::enumeration(name.clone(), symbols);
        self.finish_named(name, schema.clone());
        Ok(schema)
    }

    fn parse_fixed(&mut self, obj: &Map<String, Json>) -> Result<SchemaType, SchemaError> {
        let name = required_str(obj, "fixed", "name")?.to_string();
        self.begin_named("fixed", &name)?;

        let size = obj
            .get("size")
            .ok_or(SchemaError::MissingAttribute {
                context: "fixed",
                attribute: "size",
            })?
            .as_u64()
            .ok_or(SchemaError::InvalidAttribute {
                context: "fixed",
                attribute: "size",
            })? as usize;

        let schema = SchemaType::fixed(name.clone(), size);
        self.finish_named(name, schema.clone());
        Ok(schema)
    }

    fn begin_named(&mut self, context: &'static str, name: &str) -> Result<(), SchemaError> {
        check_identifier(context, name)?;
        if self.named.contains_key(name) || self.in_progress.contains(name) {
            return Err(SchemaError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.in_progress.insert(name.to_string());
        Ok(())
    }

    fn finish_named(&mut self, name: String, schema: SchemaType) {
        self.in_progress.remove(&name);
        self.named.insert(name, schema);
    }
}

fn required_str<'a>(
    obj: &'a Map<String, Json>,
    context: &'static str,
    attribute: &'static str,
) -> Result<&'a str, SchemaError> {
    obj.get(attribute)
        .ok_or(SchemaError::MissingAttribute { context, attribute })?
        .as_str()
        .ok_or(SchemaError::InvalidAttribute { context, attribute })
}

fn render(schema: &SchemaType, seen: &mut FxHashSet<String>) -> Json {
    match schema {
        SchemaType::Primitive(p) => Json::String(p.name().to_string()),
        SchemaType::Enum(e) => {
            if !seen.insert(e.name.clone()) {
                return Json::String(e.name.clone());
            }
            json!({ "type": "enum", "name": e.name, "symbols": e.symbols })
        }
        SchemaType::Fixed(f) => {
            if !seen.insert(f.name.clone()) {
                return Json::String(f.name.clone());
            }
            json!({ "type": "fixed", "name": f.name, "size": f.size })
        }
        SchemaType::Record(r) => {
            if !seen.insert(r.name().to_string()) {
                return Json::String(r.name().to_string());
            }
            let fields: Vec<Json> = r
                .fields()
                .iter()
                .map(|f| json!({ "name": f.name, "type": render(&f.schema, seen) }))
                .collect();
            json!({ "type": "record", "name": r.name(), "fields": fields })
        }
        SchemaType::Array(e) => json!({ "type": "array", "items": render(e, seen) }),
        SchemaType::Map(v) => json!({ "type": "map", "values": render(v, seen) }),
        SchemaType::Union(u) => Json::Array(u.branches().iter().map(|b| render(b, seen)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    const PERSON: &str = r#"{
        "type": "record",
        "name": "Person",
        "fields": [
            {"name": "age", "type": "int"},
            {"name": "tags", "type": {"type": "array", "items": "string"}},
            {"name": "mood", "type": {"type": "enum", "name": "Mood", "symbols": ["HAPPY", "SAD"]}},
            {"name": "previous", "type": ["null", "Mood"]},
            {"name": "scores", "type": {"type": "map", "values": "double"}}
        ]
    }"#;

    #[test]
    fn test_parse_record() {
        let schema = SchemaType::parse_json(PERSON).unwrap();
        let record = schema.as_record().unwrap();
        assert_eq!(record.name(), "Person");
        assert_eq!(record.fields().len(), 5);
        assert_eq!(record.fields()[0].schema, SchemaType::INT);
        assert_eq!(
            record.fields()[1].schema.element_type(),
            Some(&SchemaType::STRING)
        );
        assert_eq!(record.fields()[2].schema.kind(), Kind::Enum);
        assert_eq!(record.fields()[4].schema.value_type(), Some(&SchemaType::DOUBLE));
    }

    #[test]
    fn test_named_reference_resolves_to_same_descriptor() {
        let schema = SchemaType::parse_json(PERSON).unwrap();
        let fields = schema.fields().unwrap();
        let branches = fields[3].schema.branches().unwrap();
        assert_eq!(branches[1], fields[2].schema);
    }

    #[test]
    fn test_unknown_type() {
        let result = SchemaType::parse_json(r#"{"type": "array", "items": "Missing"}"#);
        assert!(matches!(result, Err(SchemaError::UnknownType { .. })));
    }

    #[test]
    fn test_recursive_type_rejected() {
        let result = SchemaType::parse_json(
            r#"{"type": "record", "name": "Node",
                "fields": [{"name": "next", "type": ["null", "Node"]}]}"#,
        );
        assert!(matches!(result, Err(SchemaError::RecursiveType { .. })));
    }

    #[test]
    fn test_missing_attribute() {
        let result = SchemaType::parse_json(r#"{"type": "map"}"#);
        assert!(matches!(
            result,
            Err(SchemaError::MissingAttribute { attribute: "values", .. })
        ));
    }

    #[test]
    fn test_non_identifier_names_rejected() {
        let field = SchemaType::parse_json(
            r#"{"type": "record", "name": "R", "fields": [{"name": "a/b", "type": "int"}]}"#,
        );
        assert_eq!(
            field,
            Err(SchemaError::InvalidName {
                context: "field",
                name: "a/b".to_string(),
            })
        );

        let symbols = r#"{"type": "enum", "name": "Mo.od", "symbols": ["HAPPY"]}"#;
        assert!(matches!(
            SchemaType::parse_json(symbols),
            Err(SchemaError::InvalidName { context: "enum", .. })
        ));

        let fixed = r#"{"type": "fixed", "name": "md5 hash", "size": 16}"#;
        assert!(matches!(
            SchemaType::parse_json(fixed),
            Err(SchemaError::InvalidName { context: "fixed", .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SchemaType::parse_json("{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_render_then_parse_is_identity() {
        let schema = SchemaType::parse_json(PERSON).unwrap();
        let reparsed = SchemaType::from_json_value(&schema.to_json_value()).unwrap();
        assert_eq!(schema, reparsed);
    }
}
