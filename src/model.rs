//! The docsonnet object model
//!
//! A [`Package`] owns its documented [`Fields`] and any subpackages. Each [`Field`] is one of
//! a [`Function`], an [`Object`] (which nests further fields) or a plain [`Value`].
//!
//! The model serializes to the docsonnet JSON shape: member names are the map keys and are
//! not repeated inside the members, `api` and `sub` are left out when empty.

use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// One documented package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub name: String,
    pub import: String,
    pub help: String,

    #[serde(skip_serializing_if = "Fields::is_empty")]
    pub api: Fields,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sub: BTreeMap<String, Package>,
}

impl Package {
    pub fn new(name: impl Into<String>, import: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: import.into(),
            help: help.into(),
            api: Fields::new(),
            sub: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.api.get(name)
    }

    pub fn subpackage(&self, name: &str) -> Option<&Package> {
        self.sub.get(name)
    }
}

/// Documented members keyed by name, kept in name order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Field>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field) -> Option<Field> {
        self.0.insert(field.name().to_string(), field)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Field> {
        self.0.values()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = btree_map::Values<'a, String, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for field in iter {
            fields.insert(field);
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Function,
    Object,
    Value,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Function => "function",
            FieldKind::Object => "object",
            FieldKind::Value => "value",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Function(Function),
    Object(Object),
    Value(Value),
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Function(f) => &f.name,
            Field::Object(o) => &o.name,
            Field::Value(v) => &v.name,
        }
    }

    pub fn help(&self) -> &str {
        match self {
            Field::Function(f) => &f.help,
            Field::Object(o) => &o.help,
            Field::Value(v) => &v.help,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Function(_) => FieldKind::Function,
            Field::Object(_) => FieldKind::Object,
            Field::Value(_) => FieldKind::Value,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Field::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Field::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    #[serde(skip)]
    pub name: String,
    pub help: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<Type>,
    pub default: Option<serde_json::Value>,
    pub enums: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    #[serde(skip)]
    pub name: String,
    pub help: String,
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    #[serde(skip)]
    pub name: String,
    pub help: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub default: Option<serde_json::Value>,
}

/// Type names as written by doc-util's `T`
///
/// Unknown names are kept in [`Type::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Type {
    Any,
    Array,
    Bool,
    Function,
    Null,
    Number,
    Object,
    String,
    Other(String),
}

impl Type {
    pub fn as_str(&self) -> &str {
        match self {
            Type::Any => "any",
            Type::Array => "array",
            Type::Bool => "bool",
            Type::Function => "function",
            Type::Null => "null",
            Type::Number => "number",
            Type::Object => "object",
            Type::String => "string",
            Type::Other(name) => name,
        }
    }
}

impl From<&str> for Type {
    fn from(name: &str) -> Self {
        match name {
            "any" => Type::Any,
            "array" => Type::Array,
            "bool" | "boolean" => Type::Bool,
            "function" => Type::Function,
            "null" => Type::Null,
            "number" => Type::Number,
            "object" => Type::Object,
            "string" => Type::String,
            other => Type::Other(other.to_string()),
        }
    }
}

impl From<Type> for String {
    fn from(ty: Type) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
