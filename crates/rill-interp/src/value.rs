//! Runtime values.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A runtime value in the interpreter.
///
/// Lists and records are shared by reference; the language has no mutation
/// operators on them, so sharing is unobservable.
#[derive(Debug, Clone)]
pub enum Value {
    /// Unit value
    Unit,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// String
    Str(Rc<str>),
    /// List
    List(Rc<Vec<Value>>),
    /// Record; field order is irrelevant, the map keeps names sorted
    Record(Rc<BTreeMap<String, Value>>),
    /// Enum variant; `enum_name` is the qualified `module.Enum` name
    Enum {
        enum_name: Rc<str>,
        variant: Rc<str>,
        fields: Rc<Vec<Value>>,
    },
    /// A named function living in a module namespace
    Function { module: usize, name: Rc<str> },
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "a boolean",
            Value::Int(_) => "an integer",
            Value::Str(_) => "a string",
            Value::List(_) => "a list",
            Value::Record(_) => "a record",
            Value::Enum { .. } => "an enum value",
            Value::Function { .. } => "a function",
        }
    }
}

/// The display form: what `print` and string coercion produce.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Enum {
                enum_name,
                variant,
                fields,
            } => {
                // Display drops the module qualifier: `Color.G`, not
                // `palette.Color.G`.
                let short = enum_name.rsplit('.').next().unwrap_or(enum_name);
                write!(f, "{}.{}", short, variant)?;
                if !fields.is_empty() {
                    write!(f, "(")?;
                    for (i, v) in fields.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", v)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Value::Function { name, .. } => write!(f, "fn {}", name),
        }
    }
}
