//! Runtime type descriptors.
//!
//! A [`SchemaType`] is an immutable tree. Composite nodes are reference
//! counted so that values can hold their own descriptor cheaply.

use std::sync::Arc;

use crate::error::SchemaError;

/// Primitive schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
}

impl Primitive {
    /// Returns the descriptor name of the primitive (e.g., "long").
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Bytes => "bytes",
        }
    }

    /// Looks up a primitive by its descriptor name.
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "null" => Some(Primitive::Null),
            "boolean" => Some(Primitive::Boolean),
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            "string" => Some(Primitive::String),
            "bytes" => Some(Primitive::Bytes),
            _ => None,
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            Primitive::Null => Kind::Null,
            Primitive::Boolean => Kind::Boolean,
            Primitive::Int => Kind::Int,
            Primitive::Long => Kind::Long,
            Primitive::Float => Kind::Float,
            Primitive::Double => Kind::Double,
            Primitive::String => Kind::String,
            Primitive::Bytes => Kind::Bytes,
        }
    }
}

/// Flattened kind of a schema node, used for dispatch and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    Enum,
    Fixed,
    Record,
    Array,
    Map,
    Union,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Int => "int",
            Kind::Long => "long",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::Enum => "enum",
            Kind::Fixed => "fixed",
            Kind::Record => "record",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Union => "union",
        }
    }

    /// Returns true for kinds persisted through their own save/load/delete.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Record | Kind::Array | Kind::Map | Kind::Union)
    }
}

/// A named, typed member of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: SchemaType,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: SchemaType) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Type and field names must match `[A-Za-z_][A-Za-z0-9_]*`. Stored names
/// are built by joining them with `.`, `/` and `[`, so anything else could
/// make two siblings share a column or slot.
pub(crate) fn check_identifier(context: &'static str, name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName {
            context,
            name: name.to_string(),
        })
    }
}

/// Record descriptor: a name and an ordered list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
}

impl RecordSchema {
    /// Creates a record descriptor, rejecting duplicate field names and
    /// names that are not identifiers.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, SchemaError> {
        let name = name.into();
        check_identifier("record", &name)?;
        for (i, field) in fields.iter().enumerate() {
            check_identifier("field", &field.name)?;
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    record: name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Enum descriptor: a name and its ordered symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub name: String,
    pub symbols: Vec<String>,
}

impl EnumSchema {
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

/// Fixed-length byte string descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSchema {
    pub name: String,
    pub size: usize,
}

/// Union descriptor: an ordered list of alternative branches.
///
/// Branches are unique by `(kind, type_name)` and never unions themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    branches: Vec<SchemaType>,
}

impl UnionSchema {
    pub fn new(branches: Vec<SchemaType>) -> Result<Self, SchemaError> {
        for (i, branch) in branches.iter().enumerate() {
            if branch.kind() == Kind::Union {
                return Err(SchemaError::NestedUnion);
            }
            let duplicate = branches[..i]
                .iter()
                .any(|b| b.kind() == branch.kind() && b.type_name() == branch.type_name());
            if duplicate {
                return Err(SchemaError::DuplicateName {
                    name: branch.type_name().to_string(),
                });
            }
        }
        Ok(Self { branches })
    }

    pub fn branches(&self) -> &[SchemaType] {
        &self.branches
    }

    /// Finds the branch declared with exactly this kind and type name.
    pub fn find_branch(&self, kind: Kind, name: &str) -> Option<&SchemaType> {
        self.branches
            .iter()
            .find(|b| b.kind() == kind && b.type_name() == name)
    }
}

/// A runtime type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Primitive(Primitive),
    Enum(Arc<EnumSchema>),
    Fixed(Arc<FixedSchema>),
    Record(Arc<RecordSchema>),
    Array(Arc<SchemaType>),
    Map(Arc<SchemaType>),
    Union(Arc<UnionSchema>),
}

impl SchemaType {
    pub const NULL: SchemaType = SchemaType::Primitive(Primitive::Null);
    pub const BOOLEAN: SchemaType = SchemaType::Primitive(Primitive::Boolean);
    pub const INT: SchemaType = SchemaType::Primitive(Primitive::Int);
    pub const LONG: SchemaType = SchemaType::Primitive(Primitive::Long);
    pub const FLOAT: SchemaType = SchemaType::Primitive(Primitive::Float);
    pub const DOUBLE: SchemaType = SchemaType::Primitive(Primitive::Double);
    pub const STRING: SchemaType = SchemaType::Primitive(Primitive::String);
    pub const BYTES: SchemaType = SchemaType::Primitive(Primitive::Bytes);

    pub fn record(schema: RecordSchema) -> Self {
        SchemaType::Record(Arc::new(schema))
    }

    pub fn array(element: SchemaType) -> Self {
        SchemaType::Array(Arc::new(element))
    }

    pub fn map(value: SchemaType) -> Self {
        SchemaType::Map(Arc::new(value))
    }

    pub fn union(branches: Vec<SchemaType>) -> Result<Self, SchemaError> {
        Ok(SchemaType::Union(Arc::new(UnionSchema::new(branches)?)))
    }

    pub fn enumeration(name: impl Into<String>, symbols: Vec<String>) -> Self {
        SchemaType::Enum(Arc::new(EnumSchema {
            name: name.into(),
            symbols,
        }))
    }

    pub fn fixed(name: impl Into<String>, size: usize) -> Self {
        SchemaType::Fixed(Arc::new(FixedSchema {
            name: name.into(),
            size,
        }))
    }

    pub fn kind(&self) -> Kind {
        match self {
            SchemaType::Primitive(p) => p.kind(),
            SchemaType::Enum(_) => Kind::Enum,
            SchemaType::Fixed(_) => Kind::Fixed,
            SchemaType::Record(_) => Kind::Record,
            SchemaType::Array(_) => Kind::Array,
            SchemaType::Map(_) => Kind::Map,
            SchemaType::Union(_) => Kind::Union,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.kind().is_composite()
    }

    /// Returns the name distinguishing this type among union branches:
    /// the declared name for named types, the kind name otherwise.
    pub fn type_name(&self) -> &str {
        match self {
            SchemaType::Record(r) => r.name(),
            SchemaType::Enum(e) => &e.name,
            SchemaType::Fixed(f) => &f.name,
            other => other.kind().name(),
        }
    }

    pub fn as_record(&self) -> Option<&Arc<RecordSchema>> {
        match self {
            SchemaType::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&Arc<UnionSchema>> {
        match self {
            SchemaType::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Field list of a record descriptor.
    pub fn fields(&self) -> Option<&[Field]> {
        self.as_record().map(|r| r.fields())
    }

    /// Element type of an array descriptor.
    pub fn element_type(&self) -> Option<&SchemaType> {
        match self {
            SchemaType::Array(e) => Some(e),
            _ => None,
        }
    }

    /// Value type of a map descriptor. Map keys are always strings.
    pub fn value_type(&self) -> Option<&SchemaType> {
        match self {
            SchemaType::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn branches(&self) -> Option<&[SchemaType]> {
        self.as_union().map(|u| u.branches())
    }

    pub fn symbols(&self) -> Option<&[String]> {
        match self {
            SchemaType::Enum(e) => Some(&e.symbols),
            _ => None,
        }
    }

    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            SchemaType::Fixed(f) => Some(f.size),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_record(name: &str) -> SchemaType {
        SchemaType::record(RecordSchema::new(name, vec![Field::new("x", SchemaType::INT)]).unwrap())
    }

    #[test]
    fn test_kind_of_primitives() {
        assert_eq!(SchemaType::LONG.kind(), Kind::Long);
        assert_eq!(SchemaType::BYTES.type_name(), "bytes");
        assert!(!SchemaType::STRING.is_composite());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = RecordSchema::new(
            "Dup",
            vec![Field::new("a", SchemaType::INT), Field::new("a", SchemaType::LONG)],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn test_names_must_be_identifiers() {
        for bad in ["", "x.count", "a/b", "1st", "tags[0]", "caf\u{e9}"] {
            let result = RecordSchema::new("Rec", vec![Field::new(bad, SchemaType::INT)]);
            assert_eq!(
                result,
                Err(SchemaError::InvalidName {
                    context: "field",
                    name: bad.to_string(),
                })
            );
        }
        assert!(matches!(
            RecordSchema::new("my.Rec", vec![]),
            Err(SchemaError::InvalidName { context: "record", .. })
        ));
        assert!(RecordSchema::new("_Rec2", vec![Field::new("_x9", SchemaType::INT)]).is_ok());
    }

    #[test]
    fn test_union_rejects_nested_union() {
        let inner = SchemaType::union(vec![SchemaType::NULL, SchemaType::INT]).unwrap();
        let result = SchemaType::union(vec![SchemaType::STRING, inner]);
        assert!(matches!(result, Err(SchemaError::NestedUnion)));
    }

    #[test]
    fn test_union_allows_same_kind_with_different_names() {
        let union = SchemaType::union(vec![named_record("A"), named_record("B")]).unwrap();
        let branches = union.branches().unwrap();
        assert_eq!(branches.len(), 2);

        let dup = SchemaType::union(vec![named_record("A"), named_record("A")]);
        assert!(matches!(dup, Err(SchemaError::DuplicateName { .. })));
    }

    #[test]
    fn test_find_branch_by_kind_and_name() {
        let branches = vec![SchemaType::NULL, named_record("A"), named_record("B")];
        let union = SchemaType::union(branches).unwrap();
        let u = union.as_union().unwrap();
        assert_eq!(u.find_branch(Kind::Record, "B").unwrap().type_name(), "B");
        assert!(u.find_branch(Kind::Record, "C").is_none());
        assert!(u.find_branch(Kind::Null, "null").is_some());
    }

    #[test]
    fn test_accessors() {
        let arr = SchemaType::array(SchemaType::STRING);
        assert_eq!(arr.element_type(), Some(&SchemaType::STRING));
        assert!(arr.value_type().is_none());

        let e = SchemaType::enumeration("Color", vec!["RED".into(), "GREEN".into()]);
        assert_eq!(e.symbols().unwrap().len(), 2);
        assert_eq!(SchemaType::fixed("Md5", 16).fixed_size(), Some(16));
    }
}
