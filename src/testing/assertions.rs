//! Fluent assertion API for the docsonnet model

use crate::model::{Argument, Field, FieldKind, Fields, Function, Object, Package, Type, Value};

/// Create an assertion builder for a package
pub fn assert_package(pkg: &Package) -> PackageAssertion<'_> {
    PackageAssertion {
        pkg,
        context: format!("package '{}'", pkg.name),
    }
}

fn summarize(fields: &Fields) -> String {
    fields
        .iter()
        .map(|f| format!("{} ({})", f.name(), f.kind()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Package
// ============================================================================

pub struct PackageAssertion<'a> {
    pub(crate) pkg: &'a Package,
    pub(crate) context: String,
}

impl<'a> PackageAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.pkg.name, expected,
            "{}: Expected name '{}', found '{}'",
            self.context, expected, self.pkg.name
        );
        self
    }

    pub fn import(self, expected: &str) -> Self {
        assert_eq!(
            self.pkg.import, expected,
            "{}: Expected import '{}', found '{}'",
            self.context, expected, self.pkg.import
        );
        self
    }

    pub fn help(self, expected: &str) -> Self {
        assert_eq!(
            self.pkg.help, expected,
            "{}: Expected help '{}', found '{}'",
            self.context, expected, self.pkg.help
        );
        self
    }

    pub fn help_contains(self, substring: &str) -> Self {
        assert!(
            self.pkg.help.contains(substring),
            "{}: Expected help to contain '{}', found '{}'",
            self.context,
            substring,
            self.pkg.help
        );
        self
    }

    pub fn field_count(self, expected: usize) -> Self {
        self.members().count(expected);
        self
    }

    pub fn subpackage_count(self, expected: usize) -> Self {
        let actual = self.pkg.sub.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} subpackages, found {}: [{}]",
            self.context,
            expected,
            actual,
            self.pkg.sub.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        self
    }

    pub fn fields<F>(self, assertion: F) -> Self
    where
        F: FnOnce(FieldsAssertion<'a>),
    {
        assertion(self.members());
        self
    }

    pub fn function<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(FunctionAssertion<'a>),
    {
        self.members().function(name, assertion);
        self
    }

    pub fn object<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ObjectAssertion<'a>),
    {
        self.members().object(name, assertion);
        self
    }

    pub fn value<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        self.members().value(name, assertion);
        self
    }

    pub fn subpackage<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(PackageAssertion<'a>),
    {
        let sub = self.pkg.sub.get(name).unwrap_or_else(|| {
            panic!(
                "{}: No subpackage '{}', found: [{}]",
                self.context,
                name,
                self.pkg.sub.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        });
        assertion(PackageAssertion {
            pkg: sub,
            context: format!("{}.sub[{}]", self.context, name),
        });
        self
    }

    fn members(&self) -> FieldsAssertion<'a> {
        FieldsAssertion {
            fields: &self.pkg.api,
            context: format!("{}.api", self.context),
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

pub struct FieldsAssertion<'a> {
    pub(crate) fields: &'a Fields,
    pub(crate) context: String,
}

impl<'a> FieldsAssertion<'a> {
    pub fn count(self, expected: usize) -> Self {
        let actual = self.fields.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} fields, found {}: [{}]",
            self.context,
            expected,
            actual,
            summarize(self.fields)
        );
        self
    }

    /// Assert the exact set of field names, in name order
    pub fn names(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.fields.names().collect();
        assert_eq!(
            actual, expected,
            "{}: Expected fields {:?}, found {:?}",
            self.context, expected, actual
        );
        self
    }

    pub fn function<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(FunctionAssertion<'a>),
    {
        match self.lookup(name, FieldKind::Function) {
            Field::Function(function) => assertion(FunctionAssertion {
                function,
                context: format!("{}.{}", self.context, name),
            }),
            _ => unreachable!(),
        }
        self
    }

    pub fn object<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ObjectAssertion<'a>),
    {
        match self.lookup(name, FieldKind::Object) {
            Field::Object(object) => assertion(ObjectAssertion {
                object,
                context: format!("{}.{}", self.context, name),
            }),
            _ => unreachable!(),
        }
        self
    }

    pub fn value<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        match self.lookup(name, FieldKind::Value) {
            Field::Value(value) => assertion(ValueAssertion {
                value,
                context: format!("{}.{}", self.context, name),
            }),
            _ => unreachable!(),
        }
        self
    }

    fn lookup(&self, name: &str, kind: FieldKind) -> &'a Field {
        let field = self.fields.get(name).unwrap_or_else(|| {
            panic!(
                "{}: No field '{}', found: [{}]",
                self.context,
                name,
                summarize(self.fields)
            )
        });
        assert_eq!(
            field.kind(),
            kind,
            "{}: Expected '{}' to be a {}, found a {}",
            self.context,
            name,
            kind,
            field.kind()
        );
        field
    }
}

// ============================================================================
// Members
// ============================================================================

pub struct ObjectAssertion<'a> {
    pub(crate) object: &'a Object,
    pub(crate) context: String,
}

impl<'a> ObjectAssertion<'a> {
    pub fn help(self, expected: &str) -> Self {
        assert_eq!(
            self.object.help, expected,
            "{}: Expected help '{}', found '{}'",
            self.context, expected, self.object.help
        );
        self
    }

    pub fn field_count(self, expected: usize) -> Self {
        self.members().count(expected);
        self
    }

    pub fn fields<F>(self, assertion: F) -> Self
    where
        F: FnOnce(FieldsAssertion<'a>),
    {
        assertion(self.members());
        self
    }

    pub fn function<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(FunctionAssertion<'a>),
    {
        self.members().function(name, assertion);
        self
    }

    pub fn object<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ObjectAssertion<'a>),
    {
        self.members().object(name, assertion);
        self
    }

    pub fn value<F>(self, name: &str, assertion: F) -> Self
    where
        F: FnOnce(ValueAssertion<'a>),
    {
        self.members().value(name, assertion);
        self
    }

    fn members(&self) -> FieldsAssertion<'a> {
        FieldsAssertion {
            fields: &self.object.fields,
            context: format!("{}.fields", self.context),
        }
    }
}

pub struct FunctionAssertion<'a> {
    pub(crate) function: &'a Function,
    pub(crate) context: String,
}

impl<'a> FunctionAssertion<'a> {
    pub fn help(self, expected: &str) -> Self {
        assert_eq!(
            self.function.help, expected,
            "{}: Expected help '{}', found '{}'",
            self.context, expected, self.function.help
        );
        self
    }

    pub fn arg_count(self, expected: usize) -> Self {
        let actual = self.function.args.len();
        assert_eq!(
            actual,
            expected,
            "{}: Expected {} arguments, found {}: [{}]",
            self.context,
            expected,
            actual,
            self.function
                .args
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self
    }

    /// Shorthand for the name and type of argument `index`
    pub fn arg(self, index: usize, name: &str, ty: Option<Type>) -> Self {
        self.argument(index, |arg| {
            arg.name(name).ty(ty);
        })
    }

    pub fn argument<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ArgumentAssertion<'a>),
    {
        assert!(
            index < self.function.args.len(),
            "{}: Argument index {} out of bounds (function has {} arguments)",
            self.context,
            index,
            self.function.args.len()
        );
        assertion(ArgumentAssertion {
            arg: &self.function.args[index],
            context: format!("{}.args[{}]", self.context, index),
        });
        self
    }
}

pub struct ArgumentAssertion<'a> {
    pub(crate) arg: &'a Argument,
    pub(crate) context: String,
}

impl<'a> ArgumentAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.arg.name, expected,
            "{}: Expected argument name '{}', found '{}'",
            self.context, expected, self.arg.name
        );
        self
    }

    pub fn ty(self, expected: Option<Type>) -> Self {
        assert_eq!(
            self.arg.ty, expected,
            "{}: Expected argument type {:?}, found {:?}",
            self.context, expected, self.arg.ty
        );
        self
    }

    pub fn default(self, expected: Option<serde_json::Value>) -> Self {
        assert_eq!(
            self.arg.default, expected,
            "{}: Expected default {:?}, found {:?}",
            self.context, expected, self.arg.default
        );
        self
    }

    pub fn enums(self, expected: Option<Vec<serde_json::Value>>) -> Self {
        assert_eq!(
            self.arg.enums, expected,
            "{}: Expected enums {:?}, found {:?}",
            self.context, expected, self.arg.enums
        );
        self
    }
}

pub struct ValueAssertion<'a> {
    pub(crate) value: &'a Value,
    pub(crate) context: String,
}

impl<'a> ValueAssertion<'a> {
    pub fn help(self, expected: &str) -> Self {
        assert_eq!(
            self.value.help, expected,
            "{}: Expected help '{}', found '{}'",
            self.context, expected, self.value.help
        );
        self
    }

    pub fn ty(self, expected: Type) -> Self {
        assert_eq!(
            self.value.ty, expected,
            "{}: Expected type '{}', found '{}'",
            self.context, expected, self.value.ty
        );
        self
    }

    pub fn default(self, expected: Option<serde_json::Value>) -> Self {
        assert_eq!(
            self.value.default, expected,
            "{}: Expected default {:?}, found {:?}",
            self.context, expected, self.value.default
        );
        self
    }
}
