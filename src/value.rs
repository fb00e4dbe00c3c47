use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Helper supertrait that lets an [`Object`] be downcast to its concrete type.
///
/// A blanket implementation covers every `'static` type, so implementors of
/// [`Object`] never write it by hand.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An opaque host value that can travel through the console.
///
/// Objects are produced by operations and can be stored in variables or
/// passed as arguments to parameters declared with [`ParamType::Object`].
/// They are never parsed from text.
pub trait Object: AsAny + fmt::Display + 'static {
    /// Name used to match the object against a declared parameter type.
    fn type_name(&self) -> &'static str;
}

/// Static description of an enumerated parameter type.
///
/// Literal arguments are matched against `members` case-insensitively and
/// normalized to the declared spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumType {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl EnumType {
    pub const fn new(name: &'static str, members: &'static [&'static str]) -> Self {
        Self { name, members }
    }

    /// Find the member spelled `text`, ignoring case.
    pub fn parse(&self, text: &str) -> Option<&'static str> {
        let text = text.trim();
        self.members
            .iter()
            .copied()
            .find(|member| eq_ignore_case(member, text))
    }
}

/// Case-insensitive comparison that also folds non-ASCII letters.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

/// Like `str::starts_with`, ignoring case the same way as [`eq_ignore_case`].
pub(crate) fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text = text.chars().flat_map(char::to_lowercase);
    prefix
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| text.next() == Some(p))
}

/// Declared type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Accepts any value unchanged, including raw literal strings.
    Any,
    Int,
    Float,
    Double,
    Bool,
    Str,
    Enum(EnumType),
    /// An opaque [`Object`] with the given type name.
    Object(&'static str),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => f.write_str("any"),
            ParamType::Int => f.write_str("int"),
            ParamType::Float => f.write_str("float"),
            ParamType::Double => f.write_str("double"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Str => f.write_str("string"),
            ParamType::Enum(ty) => f.write_str(ty.name),
            ParamType::Object(name) => f.write_str(name),
        }
    }
}

/// A value produced by an operation or coerced from a literal argument.
#[derive(Clone)]
pub enum Value {
    Int(i32),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
    Enum {
        type_name: &'static str,
        member: &'static str,
    },
    Object(Rc<dyn Object>),
}

impl Value {
    /// Wrap a host object.
    pub fn object<O: Object>(object: O) -> Self {
        Value::Object(Rc::new(object))
    }

    /// Name of the value's runtime type, in the same vocabulary as [`ParamType`].
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Enum { type_name, .. } => *type_name,
            Value::Object(object) => object.type_name(),
        }
    }

    /// Returns true if the value already is of the declared type, so no
    /// coercion is needed.
    pub fn is_exactly(&self, ty: &ParamType) -> bool {
        match (self, ty) {
            (_, ParamType::Any) => true,
            (Value::Int(_), ParamType::Int)
            | (Value::Float(_), ParamType::Float)
            | (Value::Double(_), ParamType::Double)
            | (Value::Bool(_), ParamType::Bool)
            | (Value::Str(_), ParamType::Str) => true,
            (Value::Enum { type_name, .. }, ParamType::Enum(ty)) => *type_name == ty.name,
            (Value::Object(object), ParamType::Object(name)) => object.type_name() == *name,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
            Value::Enum { member, .. } => f.write_str(member),
            Value::Object(object) => write!(f, "{object}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Enum { type_name, member } => write!(f, "Enum({type_name}::{member})"),
            Value::Object(object) => write!(f, "Object({}: {object})", object.type_name()),
            other => write!(f, "{}({other})", other.type_name()),
        }
    }
}

/// Structural equality; objects compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (
                Value::Enum { type_name: ta, member: ma },
                Value::Enum { type_name: tb, member: mb },
            ) => ta == tb && ma == mb,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: EnumType = EnumType::new("Color", &["Red", "Green", "Blue"]);
    const WEATHER: EnumType = EnumType::new("Weather", &["Sonnig", "Übel"]);

    struct Point(i32, i32);

    impl fmt::Display for Point {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {})", self.0, self.1)
        }
    }

    impl Object for Point {
        fn type_name(&self) -> &'static str {
            "Point"
        }
    }

    #[test]
    fn test_enum_parse_ignores_case() {
        assert_eq!(COLOR.parse("green"), Some("Green"));
        assert_eq!(COLOR.parse(" BLUE "), Some("Blue"));
        assert_eq!(COLOR.parse("purple"), None);
    }

    #[test]
    fn test_enum_parse_folds_non_ascii_letters() {
        assert_eq!(WEATHER.parse("übel"), Some("Übel"));
        assert_eq!(WEATHER.parse("ÜBEL"), Some("Übel"));
    }

    #[test]
    fn test_case_insensitive_helpers() {
        assert!(eq_ignore_case("Öffnen", "öFFNEN"));
        assert!(!eq_ignore_case("Öffnen", "Öffne"));
        assert!(starts_with_ignore_case("Öffnen", "öf"));
        assert!(starts_with_ignore_case("Turn", ""));
        assert!(!starts_with_ignore_case("Tu", "Turn"));
    }

    #[test]
    fn test_exact_type_matching() {
        assert!(Value::Int(1).is_exactly(&ParamType::Int));
        assert!(!Value::Int(1).is_exactly(&ParamType::Float));
        assert!(Value::from("x").is_exactly(&ParamType::Any));
        assert!(
            Value::Enum { type_name: "Color", member: "Red" }.is_exactly(&ParamType::Enum(COLOR))
        );

        let point = Value::object(Point(1, 2));
        assert!(point.is_exactly(&ParamType::Object("Point")));
        assert!(!point.is_exactly(&ParamType::Object("Vector")));
    }

    #[test]
    fn test_object_identity_and_display() {
        let point = Value::object(Point(3, 4));
        let copy = point.clone();
        assert_eq!(point, copy);
        assert_ne!(point, Value::object(Point(3, 4)));
        assert_eq!(point.to_string(), "(3, 4)");
        assert_eq!(point.type_name(), "Point");
    }

    #[test]
    fn test_param_type_display() {
        assert_eq!(ParamType::Float.to_string(), "float");
        assert_eq!(ParamType::Str.to_string(), "string");
        assert_eq!(ParamType::Enum(COLOR).to_string(), "Color");
    }
}
