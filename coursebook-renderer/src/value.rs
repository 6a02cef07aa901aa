//! Template values and the attribute resolver.
//!
//! A [`Value`] is either a scalar, a list, or a [`Record`]: anything that can
//! answer "give me your field called `x`". Domain types implement [`Record`]
//! through small view structs (see [`crate::context`]); the interpreter never
//! knows their concrete shape.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;

/// Named-field capability.
///
/// `'a` is the lifetime of the data the record views; fields it hands out
/// may borrow from that data but never from the record itself.
pub trait Record<'a> {
    /// Type name used in error messages and as the record's text form.
    fn kind(&self) -> &str;

    /// Look up a field by name. `None` means the record has no such field.
    fn field(&self, name: &str) -> Option<Value<'a>>;

    /// Elements when the record is itself iterable (e.g. a group of courses).
    fn items(&self) -> Option<Vec<Value<'a>>> {
        None
    }
}

/// A value bound in a template environment.
#[derive(Clone)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
    Date(NaiveDate),
    List(Rc<[Value<'a>]>),
    Record(Rc<dyn Record<'a> + 'a>),
}

impl<'a> Value<'a> {
    /// Wrap a record view.
    pub fn record(record: impl Record<'a> + 'a) -> Self {
        Value::Record(Rc::new(record))
    }

    /// Collect values into a list.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value<'a>>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Human-readable kind, used in error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "a boolean".to_string(),
            Value::Int(_) => "an integer".to_string(),
            Value::Float(_) => "a number".to_string(),
            Value::Str(_) => "a string".to_string(),
            Value::Date(_) => "a date".to_string(),
            Value::List(_) => "a list".to_string(),
            Value::Record(r) => r.kind().to_string(),
        }
    }

    /// Elements of a list, the characters of a string, or the elements of
    /// an iterable record.
    pub fn items(&self) -> Option<Vec<Value<'a>>> {
        match self {
            Value::List(items) => Some(items.to_vec()),
            Value::Str(s) => Some(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Record(r) => r.items(),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Record(r) => f.write_str(r.kind()),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Date(d) => f.debug_tuple("Date").field(d).finish(),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Record(r) => write!(f, "Record({})", r.kind()),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value<'_> {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<usize> for Value<'_> {
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

impl From<NaiveDate> for Value<'_> {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<'a> From<&'a serde_json::Value> for Value<'a> {
    fn from(v: &'a serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(Cow::Borrowed(s)),
            Json::Array(items) => Value::list(items.iter()),
            Json::Object(map) => Value::record(JsonObject(map)),
        }
    }
}

/// A JSON object exposed through the named-field capability.
struct JsonObject<'a>(&'a serde_json::Map<String, serde_json::Value>);

impl<'a> Record<'a> for JsonObject<'a> {
    fn kind(&self) -> &str {
        "object"
    }

    fn field(&self, name: &str) -> Option<Value<'a>> {
        self.0.get(name).map(Value::from)
    }
}

// ---------------------------------------------------------------------------
// Attribute resolver
// ---------------------------------------------------------------------------

/// Failed `.field` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeError {
    pub field: String,
    pub kind: String,
}

/// Resolve a dotted field path against `value`.
///
/// An empty path returns `value` unchanged. Each step must land on a
/// [`Record`] that provides the named field.
pub fn resolve<'a>(value: &Value<'a>, path: &str) -> Result<Value<'a>, AttributeError> {
    let mut current = value.clone();
    if path.is_empty() {
        return Ok(current);
    }
    for field in path.split('.') {
        let next = match &current {
            Value::Record(record) => record.field(field),
            _ => None,
        };
        current = next.ok_or_else(|| AttributeError {
            field: field.to_string(),
            kind: current.kind_name(),
        })?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Point {
        x: i64,
        y: i64,
    }

    impl<'a> Record<'a> for Point {
        fn kind(&self) -> &str {
            "Point"
        }

        fn field(&self, name: &str) -> Option<Value<'a>> {
            match name {
                "x" => Some(self.x.into()),
                "y" => Some(self.y.into()),
                _ => None,
            }
        }
    }

    #[test]
    fn empty_path_returns_value_unchanged() {
        let v = Value::from("hello");
        assert_eq!(resolve(&v, "").unwrap().to_string(), "hello");
    }

    #[test]
    fn record_field_lookup() {
        let v = Value::record(Point { x: 3, y: 4 });
        assert_eq!(resolve(&v, "y").unwrap().to_string(), "4");
    }

    #[test]
    fn unknown_field_names_field_and_kind() {
        let v = Value::record(Point { x: 3, y: 4 });
        let err = resolve(&v, "z").unwrap_err();
        assert_eq!(err, AttributeError { field: "z".into(), kind: "Point".into() });
    }

    #[test]
    fn field_on_scalar_is_unknown() {
        let err = resolve(&Value::Int(1), "x").unwrap_err();
        assert_eq!(err.kind, "an integer");
    }

    #[test]
    fn chained_path_through_json() {
        let data = json!({ "user": { "address": { "city": "Oslo" } } });
        let v = Value::from(&data);
        assert_eq!(resolve(&v, "user.address.city").unwrap().to_string(), "Oslo");
        let err = resolve(&v, "user.phone").unwrap_err();
        assert_eq!(err.field, "phone");
        assert_eq!(err.kind, "object");
    }

    #[test]
    fn text_forms() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::from(NaiveDate::from_ymd_opt(2014, 2, 3).unwrap()).to_string(), "2014-02-03");
        assert_eq!(Value::list(["a", "b"]).to_string(), "a, b");
        assert_eq!(Value::record(Point { x: 0, y: 0 }).to_string(), "Point");
        assert_eq!(Value::from(None::<String>).to_string(), "");
    }

    #[test]
    fn items_of_list_string_and_scalar() {
        assert_eq!(Value::list([1i64, 2, 3]).items().map(|v| v.len()), Some(3));
        let chars: Vec<String> = Value::from("ab").items().unwrap().iter().map(|v| v.to_string()).collect();
        assert_eq!(chars, vec!["a", "b"]);
        assert!(Value::Int(3).items().is_none());
        assert!(Value::Null.items().is_none());
    }
}
