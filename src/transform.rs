//! Rebuilds the typed model from extracted JSON
//!
//! The bootstrap program emits a pruned copy of the inspected value: `#`-prefixed keys hold
//! doc-util annotations, other keys hold nested objects that contain annotations somewhere
//! below. [`transform`] walks that tree once and either produces a complete [`Package`] or
//! fails on the first node that doesn't fit, naming it by JSON Pointer.
//!
//! Shape rules:
//!
//! - a package node has `#` set to `{name, import, help}`
//! - `#k` documents member `k` and holds one of `function`, `object` or `value`
//! - `k` holding its own `#` is a subpackage, filed under its declared name
//! - any other `k` is an undocumented object whose members are documented further down
//! - a documented `#k` object takes its members from the sibling `k`
//!
//! When both `#k` and `k` describe member `k`, the annotation wins.

use crate::error::{Error, StructureError};
use crate::model::{Argument, Field, Fields, Function, Object, Package, Type, Value};
use serde_json::{Map, Value as Json};

/// The untyped tree as extracted. Only meaningful as input to this module.
type Ds = Map<String, Json>;

const ROOT: &str = "(root)";

/// Converts the raw output of [`extract`](crate::extract::extract) into a [`Package`].
pub fn transform(data: &[u8]) -> Result<Package, Error> {
    let root: Json = serde_json::from_slice(data).map_err(StructureError::from)?;
    let pkg = load_package(&root, "")?;
    tracing::debug!(
        package = %pkg.name,
        fields = pkg.api.len(),
        subpackages = pkg.sub.len(),
        "transformed docsonnet data"
    );
    Ok(pkg)
}

fn load_package(node: &Json, location: &str) -> Result<Package, StructureError> {
    let d = as_object(node, location)?;

    let decl_location = child(location, "#");
    let decl = d.get("#").ok_or_else(|| missing(location, "#"))?;
    let decl = as_object(decl, &decl_location)?;

    let mut pkg = Package::new(
        required_str(decl, "name", &decl_location)?,
        required_str(decl, "import", &decl_location)?,
        required_str(decl, "help", &decl_location)?,
    );

    for (key, value) in d {
        let Some(name) = key.strip_prefix('#') else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let field_location = child(location, key);
        let node = as_object(value, &field_location)?;
        pkg.api
            .insert(load_field(name, node, &field_location, d, location)?);
    }

    for (key, value) in d {
        if key.starts_with('#') {
            continue;
        }
        let key_location = child(location, key);
        let node = as_object(value, &key_location)?;

        if node.contains_key("#") {
            let sub = load_package(value, &key_location)?;
            if pkg.sub.contains_key(&sub.name) {
                return Err(StructureError::DuplicatePackage {
                    location: key_location,
                    name: sub.name,
                });
            }
            pkg.sub.insert(sub.name.clone(), sub);
            continue;
        }

        if let Some(nested) = load_nested(key, node, &key_location)? {
            if !pkg.api.contains(key) {
                pkg.api.insert(Field::Object(nested));
            }
        }
    }

    Ok(pkg)
}

/// Builds the member documented by the `#name` node.
fn load_field(
    name: &str,
    node: &Ds,
    location: &str,
    parent: &Ds,
    parent_location: &str,
) -> Result<Field, StructureError> {
    if let Some(function) = node.get("function") {
        let function_location = child(location, "function");
        let function = as_object(function, &function_location)?;
        return load_function(name, function, &function_location).map(Field::Function);
    }
    if let Some(object) = node.get("object") {
        let object_location = child(location, "object");
        let object = as_object(object, &object_location)?;
        return load_object(name, object, &object_location, parent, parent_location)
            .map(Field::Object);
    }
    if let Some(value) = node.get("value") {
        let value_location = child(location, "value");
        let value = as_object(value, &value_location)?;
        return load_value(name, value, &value_location).map(Field::Value);
    }

    Err(StructureError::MissingKind {
        location: display(location),
    })
}

fn load_function(name: &str, node: &Ds, location: &str) -> Result<Function, StructureError> {
    let help = optional_str(node, "help", location)?;

    let args_location = child(location, "args");
    let args = match node.get("args") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let arg_location = child(&args_location, &i.to_string());
                load_argument(as_object(item, &arg_location)?, &arg_location)
            })
            .collect::<Result<_, _>>()?,
        Some(other) => return Err(wrong_type(&args_location, "array", other)),
    };

    Ok(Function {
        name: name.to_string(),
        help,
        args,
    })
}

fn load_argument(node: &Ds, location: &str) -> Result<Argument, StructureError> {
    let ty = match node.get("type") {
        None | Some(Json::Null) => None,
        Some(Json::String(ty)) => Some(Type::from(ty.as_str())),
        Some(other) => return Err(wrong_type(&child(location, "type"), "string", other)),
    };
    let enums = match node.get("enums") {
        None | Some(Json::Null) => None,
        Some(Json::Array(items)) => Some(items.clone()),
        Some(other) => return Err(wrong_type(&child(location, "enums"), "array", other)),
    };

    Ok(Argument {
        name: required_str(node, "name", location)?,
        ty,
        default: default_of(node),
        enums,
    })
}

fn load_value(name: &str, node: &Ds, location: &str) -> Result<Value, StructureError> {
    Ok(Value {
        name: name.to_string(),
        help: optional_str(node, "help", location)?,
        ty: Type::from(required_str(node, "type", location)?.as_str()),
        default: default_of(node),
    })
}

fn load_object(
    name: &str,
    node: &Ds,
    location: &str,
    parent: &Ds,
    parent_location: &str,
) -> Result<Object, StructureError> {
    let help = required_str(node, "help", location)?;

    let children_location = child(parent_location, name);
    let fields = match parent.get(name) {
        Some(children) => load_members(as_object(children, &children_location)?, &children_location)?,
        None => {
            tracing::warn!(
                object = name,
                location = %display(&children_location),
                "documented object has no members next to it"
            );
            Fields::new()
        }
    };

    Ok(Object {
        name: name.to_string(),
        help,
        fields,
    })
}

/// An undocumented object, kept only if something below it is documented.
fn load_nested(name: &str, node: &Ds, location: &str) -> Result<Option<Object>, StructureError> {
    let fields = load_members(node, location)?;
    if fields.is_empty() {
        return Ok(None);
    }
    Ok(Some(Object {
        name: name.to_string(),
        help: String::new(),
        fields,
    }))
}

fn load_members(node: &Ds, location: &str) -> Result<Fields, StructureError> {
    let mut fields = Fields::new();

    for (key, value) in node {
        let Some(name) = key.strip_prefix('#') else {
            continue;
        };
        let field_location = child(location, key);
        let field = as_object(value, &field_location)?;
        fields.insert(load_field(name, field, &field_location, node, location)?);
    }

    for (key, value) in node {
        if key.starts_with('#') {
            continue;
        }
        let key_location = child(location, key);
        let nested = as_object(value, &key_location)?;
        if let Some(nested) = load_nested(key, nested, &key_location)? {
            if !fields.contains(key) {
                fields.insert(Field::Object(nested));
            }
        }
    }

    Ok(fields)
}

fn as_object<'a>(node: &'a Json, location: &str) -> Result<&'a Ds, StructureError> {
    node.as_object()
        .ok_or_else(|| wrong_type(location, "object", node))
}

fn required_str(node: &Ds, key: &'static str, location: &str) -> Result<String, StructureError> {
    match node.get(key) {
        Some(Json::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(&child(location, key), "string", other)),
        None => Err(missing(location, key)),
    }
}

/// Like [`required_str`], but absent and `null` mean empty.
fn optional_str(node: &Ds, key: &'static str, location: &str) -> Result<String, StructureError> {
    match node.get(key) {
        None | Some(Json::Null) => Ok(String::new()),
        Some(Json::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(&child(location, key), "string", other)),
    }
}

fn default_of(node: &Ds) -> Option<Json> {
    node.get("default").filter(|v| !v.is_null()).cloned()
}

/// JSON Pointer of `key` below `location`.
fn child(location: &str, key: &str) -> String {
    format!("{}/{}", location, key.replace('~', "~0").replace('/', "~1"))
}

fn display(location: &str) -> String {
    if location.is_empty() {
        ROOT.to_string()
    } else {
        location.to_string()
    }
}

fn missing(location: &str, field: &'static str) -> StructureError {
    StructureError::Missing {
        location: display(location),
        field,
    }
}

fn wrong_type(location: &str, expected: &'static str, found: &Json) -> StructureError {
    StructureError::WrongType {
        location: display(location),
        expected,
        found: json_kind(found),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;
    use crate::testing::assert_package;
    use proptest::prelude::*;
    use serde_json::json;

    fn transform_json(value: Json) -> Result<Package, Error> {
        transform(value.to_string().as_bytes())
    }

    fn decl(name: &str) -> Json {
        json!({"name": name, "import": format!("example.com/{}", name), "help": format!("{} help", name)})
    }

    fn structure_error(value: Json) -> String {
        let err = transform_json(value).unwrap_err();
        assert!(err.is_structure(), "expected a structure error, got {:?}", err);
        err.to_string()
    }

    #[test]
    fn test_package_without_members() {
        let pkg = transform_json(json!({"#": decl("empty")})).unwrap();

        assert_package(&pkg)
            .name("empty")
            .import("example.com/empty")
            .help("empty help")
            .field_count(0)
            .subpackage_count(0);
    }

    #[test]
    fn test_functions_values_and_objects() {
        let pkg = transform_json(json!({
            "#": decl("k"),
            "#new": {"function": {
                "help": "new creates a thing",
                "args": [
                    {"name": "name", "type": "string", "default": null, "enums": null},
                    {"name": "mode", "type": "string", "default": "fast", "enums": ["fast", "slow"]},
                ],
            }},
            "#replicas": {"value": {"help": "how many", "type": "number", "default": 1}},
            "#spec": {"object": {"help": "the spec", "fields": {}}},
            "spec": {
                "#withPort": {"function": {"help": "sets the port", "args": []}},
                "template": {"#image": {"value": {"type": "string"}}},
            },
        }))
        .unwrap();

        assert_package(&pkg)
            .field_count(3)
            .function("new", |f| {
                f.help("new creates a thing")
                    .arg_count(2)
                    .arg(0, "name", Some(Type::String))
                    .arg(1, "mode", Some(Type::String));
            })
            .value("replicas", |v| {
                v.ty(Type::Number).default(Some(json!(1)));
            })
            .object("spec", |o| {
                o.help("the spec")
                    .field_count(2)
                    .function("withPort", |f| {
                        f.arg_count(0);
                    })
                    .object("template", |t| {
                        t.help("").value("image", |v| {
                            v.ty(Type::String).help("").default(None);
                        });
                    });
            });

        let mode = &pkg.field("new").unwrap().as_function().unwrap().args[1];
        assert_eq!(mode.enums, Some(vec![json!("fast"), json!("slow")]));
    }

    #[test]
    fn test_subpackages_are_keyed_by_declared_name() {
        let pkg = transform_json(json!({
            "#": decl("root"),
            "apps": {
                "#": decl("appsV1"),
                "#deployment": {"value": {"type": "object"}},
            },
        }))
        .unwrap();

        assert_package(&pkg).field_count(0).subpackage("appsV1", |sub| {
            sub.import("example.com/appsV1").field_count(1);
        });
        assert!(pkg.subpackage("apps").is_none());
    }

    #[test]
    fn test_annotation_wins_over_nested_object() {
        let pkg = transform_json(json!({
            "#": decl("root"),
            "#util": {"value": {"help": "annotated", "type": "object"}},
            "util": {"#helper": {"function": {"help": "nested"}}},
        }))
        .unwrap();

        assert_eq!(pkg.field("util").unwrap().kind(), FieldKind::Value);
        assert_eq!(pkg.field("util").unwrap().help(), "annotated");
    }

    #[test]
    fn test_deeply_nested_documentation_is_kept() {
        let pkg = transform_json(json!({
            "#": decl("root"),
            "a": {"b": {"#c": {"value": {"type": "string"}}}},
        }))
        .unwrap();

        assert_package(&pkg).object("a", |a| {
            a.object("b", |b| {
                b.value("c", |_| {});
            });
        });
    }

    #[test]
    fn test_object_without_members_has_no_fields() {
        let pkg = transform_json(json!({
            "#": decl("root"),
            "#lonely": {"object": {"help": "nothing below"}},
        }))
        .unwrap();

        assert_package(&pkg).object("lonely", |o| {
            o.help("nothing below").field_count(0);
        });
    }

    #[test]
    fn test_truncated_json_is_a_syntax_error() {
        let err = transform(br##"{"#": {"name": "x", "##).unwrap_err();
        assert!(matches!(err, Error::Structure(StructureError::Syntax(_))));
    }

    #[test]
    fn test_missing_package_declaration() {
        insta::assert_snapshot!(
            structure_error(json!({"#fn": {"function": {}}})),
            @"unexpected docsonnet data: (root): missing required field `#`"
        );
    }

    #[test]
    fn test_missing_package_name() {
        insta::assert_snapshot!(
            structure_error(json!({"#": {"import": "x", "help": ""}})),
            @"unexpected docsonnet data: /#: missing required field `name`"
        );
    }

    #[test]
    fn test_wrong_field_type() {
        insta::assert_snapshot!(
            structure_error(json!({"#": {"name": 7, "import": "x", "help": ""}})),
            @"unexpected docsonnet data: /#/name: expected string, found number"
        );
    }

    #[test]
    fn test_root_must_be_an_object() {
        insta::assert_snapshot!(
            structure_error(json!([1, 2])),
            @"unexpected docsonnet data: (root): expected object, found array"
        );
    }

    #[test]
    fn test_value_requires_a_type() {
        insta::assert_snapshot!(
            structure_error(json!({
                "#": decl("root"),
                "#size": {"value": {"help": "untyped"}},
            })),
            @"unexpected docsonnet data: /#size/value: missing required field `type`"
        );
    }

    #[test]
    fn test_field_without_kind() {
        insta::assert_snapshot!(
            structure_error(json!({
                "#": decl("root"),
                "nested": {"#odd": {"help": "what am I"}},
            })),
            @"unexpected docsonnet data: /nested/#odd: field lacks one of `function`, `object` or `value`"
        );
    }

    #[test]
    fn test_argument_locations_use_indices() {
        insta::assert_snapshot!(
            structure_error(json!({
                "#": decl("root"),
                "#f": {"function": {"args": [{"name": "ok"}, {"type": "string"}]}},
            })),
            @"unexpected docsonnet data: /#f/function/args/1: missing required field `name`"
        );
    }

    #[test]
    fn test_pointer_escaping() {
        insta::assert_snapshot!(
            structure_error(json!({
                "#": decl("root"),
                "a/b": {"#c~d": {"value": {"type": 1}}},
            })),
            @"unexpected docsonnet data: /a~1b/#c~0d/value/type: expected string, found number"
        );
    }

    #[test]
    fn test_duplicate_subpackage_names() {
        let message = structure_error(json!({
            "#": decl("root"),
            "one": {"#": decl("same")},
            "two": {"#": decl("same")},
        }));
        assert!(message.contains("another subpackage is already named \"same\""));
    }

    fn package_json() -> impl Strategy<Value = Json> {
        let name = "[a-z][a-zA-Z0-9]{0,8}";
        (
            name,
            "[ -~]{0,20}",
            prop::collection::btree_map(name, (any::<bool>(), "[ -~]{0,20}"), 0..6),
        )
            .prop_map(|(pkg, help, members)| {
                let mut root = Map::new();
                root.insert(
                    "#".into(),
                    json!({"name": pkg, "import": format!("example.com/{}", pkg), "help": help}),
                );
                for (member, (is_fn, help)) in members {
                    let doc = if is_fn {
                        json!({"function": {"help": help, "args": [{"name": "x", "type": "any"}]}})
                    } else {
                        json!({"value": {"help": help, "type": "string", "default": help}})
                    };
                    root.insert(format!("#{}", member), doc);
                }
                Json::Object(root)
            })
    }

    proptest! {
        #[test]
        fn prop_transform_is_pure(doc in package_json()) {
            let bytes = doc.to_string();
            let first = transform(bytes.as_bytes()).unwrap();
            let second = transform(bytes.as_bytes()).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.api.len(), doc.as_object().unwrap().len() - 1);
        }

        #[test]
        fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            match (transform(&bytes), transform(&bytes)) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(a), Err(b)) => {
                    prop_assert!(a.is_structure());
                    prop_assert_eq!(a.to_string(), b.to_string());
                }
                _ => prop_assert!(false, "results differ between runs"),
            }
        }
    }
}
