//! Structural value model for quickprop
//!
//! Any value that implements [`ToData`] can be turned into a [`Data`] tree:
//! primitives become leaves, collections become sequences and structs become
//! records. Trees render in a stable, human readable form and can be
//! compared with [`diff`], which reports where two values diverge.
//!
//! # Example
//!
//! ```rust
//! use quickprop_data::{diff, impl_to_data, show};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl_to_data!(Point { x, y });
//!
//! let a = Point { x: 1, y: 2 };
//! let b = Point { x: 1, y: 3 };
//!
//! assert_eq!(show(&a), "Point { x = 1, y = 2 }");
//! assert_eq!(diff(&a, &b).to_string(), "Point { y: 2 != 3 }");
//! assert!(diff(&a, &a).is_empty());
//! ```

pub mod diff;
pub mod to_data;

pub use diff::DataDiff;
pub use smol_str::SmolStr;
pub use to_data::ToData;

use std::fmt;

// ============================================================================
// Data Tree
// ============================================================================

/// A leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Unit,
    Bool(bool),
    /// Any signed integer, widened
    Int(i64),
    /// Any unsigned integer, widened
    UInt(u64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
}

/// The canonical structural representation of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// An absent value (`None`)
    Null,

    /// A primitive leaf
    Value(Primitive),

    /// Ordered elements of a collection or tuple
    Sequence(Vec<Data>),

    /// A named type with ordered, named fields
    Record {
        type_name: SmolStr,
        fields: Vec<(SmolStr, Data)>,
    },
}

impl Data {
    /// Create a record from a type name and its fields
    pub fn record<N, I, F>(type_name: N, fields: I) -> Self
    where
        N: Into<SmolStr>,
        I: IntoIterator<Item = (F, Data)>,
        F: Into<SmolStr>,
    {
        Data::Record {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(name, data)| (name.into(), data)).collect(),
        }
    }

    /// Create a sequence by converting every element
    pub fn sequence<'a, T, I>(items: I) -> Self
    where
        T: ToData + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Data::Sequence(items.into_iter().map(ToData::to_data).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// Look up a record field by name
    pub fn field(&self, name: &str) -> Option<&Data> {
        match self {
            Data::Record { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, data)| data),
            _ => None,
        }
    }

    /// Compare this tree with another
    pub fn diff(&self, other: &Data) -> DataDiff {
        diff::diff_data(self, other)
    }
}

impl From<Primitive> for Data {
    fn from(primitive: Primitive) -> Self {
        Data::Value(primitive)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Unit => write!(f, "()"),
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Int(n) => write!(f, "{}", n),
            Primitive::UInt(n) => write!(f, "{}", n),
            // Debug keeps the decimal point on whole numbers
            Primitive::Float(n) => write!(f, "{:?}", n),
            Primitive::Double(n) => write!(f, "{:?}", n),
            Primitive::Char(c) => write!(f, "{:?}", c),
            Primitive::Str(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Null => write!(f, "null"),
            Data::Value(primitive) => write!(f, "{}", primitive),
            Data::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Data::Record { type_name, fields } => {
                write!(f, "{}", type_name)?;
                if fields.is_empty() {
                    return Ok(());
                }
                write!(f, " {{ ")?;
                for (i, (name, data)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, data)?;
                }
                write!(f, " }}")
            }
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Render a value through its data tree
pub fn show<T: ToData + ?Sized>(value: &T) -> String {
    value.to_data().to_string()
}

/// Structurally compare two values
pub fn diff<A, B>(left: &A, right: &B) -> DataDiff
where
    A: ToData + ?Sized,
    B: ToData + ?Sized,
{
    left.to_data().diff(&right.to_data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitive_rendering() {
        assert_eq!(Primitive::Unit.to_string(), "()");
        assert_eq!(Primitive::Int(-3).to_string(), "-3");
        assert_eq!(Primitive::Double(2.0).to_string(), "2.0");
        assert_eq!(Primitive::Float(f32::NAN).to_string(), "NaN");
        assert_eq!(Primitive::Char('\n').to_string(), "'\\n'");
        assert_eq!(Primitive::Str("say \"hi\"".into()).to_string(), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_record_rendering() {
        let empty = Data::record("Marker", Vec::<(&str, Data)>::new());
        assert_eq!(empty.to_string(), "Marker");

        let point = Data::record(
            "Point",
            [
                ("x", Data::Value(Primitive::Int(1))),
                ("tags", Data::Sequence(vec![Data::Null, Primitive::Bool(true).into()])),
            ],
        );
        assert_eq!(point.to_string(), "Point { x = 1, tags = [null, true] }");
    }

    #[test]
    fn test_field_lookup() {
        let data = Data::record("Pair", [("a", Data::Null), ("b", Primitive::UInt(2).into())]);
        assert_eq!(data.field("b"), Some(&Data::Value(Primitive::UInt(2))));
        assert_eq!(data.field("c"), None);
        assert_eq!(Data::Null.field("a"), None);
    }

    #[test]
    fn test_show_and_diff_entry_points() {
        assert_eq!(show(&vec![1u8, 2, 3]), "[1, 2, 3]");
        assert!(diff(&vec![1i32, 2], &[1i32, 2][..]).is_empty());
        assert!(!diff("a", "b").is_empty());
    }
}
