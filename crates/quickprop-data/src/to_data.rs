//! Conversion of Rust values into data trees.

use crate::{Data, Primitive};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

/// Values that can describe themselves as a [`Data`] tree
///
/// Structs usually implement this with [`impl_to_data!`](crate::impl_to_data).
pub trait ToData {
    fn to_data(&self) -> Data;
}

/// Implement [`ToData`] for a struct by listing its fields
///
/// `impl_to_data!(Type { a, b })` produces `Type { a = .., b = .. }`.
/// A trailing `..field` names an embedded base struct whose record fields are
/// spliced in after the type's own fields:
///
/// ```rust
/// use quickprop_data::{impl_to_data, show};
///
/// struct Shape {
///     id: u32,
/// }
///
/// struct Circle {
///     radius: f64,
///     shape: Shape,
/// }
///
/// impl_to_data!(Shape { id });
/// impl_to_data!(Circle { radius, ..shape });
///
/// let circle = Circle { radius: 1.5, shape: Shape { id: 7 } };
/// assert_eq!(show(&circle), "Circle { radius = 1.5, id = 7 }");
/// ```
#[macro_export]
macro_rules! impl_to_data {
    ($ty:ident { $($field:ident,)* ..$base:ident $(,)? }) => {
        impl $crate::ToData for $ty {
            fn to_data(&self) -> $crate::Data {
                let mut fields: ::std::vec::Vec<($crate::SmolStr, $crate::Data)> = vec![
                    $(($crate::SmolStr::new(stringify!($field)), $crate::ToData::to_data(&self.$field)),)*
                ];
                match $crate::ToData::to_data(&self.$base) {
                    $crate::Data::Record { fields: inherited, .. } => fields.extend(inherited),
                    other => fields.push(($crate::SmolStr::new(stringify!($base)), other)),
                }
                $crate::Data::Record {
                    type_name: $crate::SmolStr::new(stringify!($ty)),
                    fields,
                }
            }
        }
    };
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::ToData for $ty {
            fn to_data(&self) -> $crate::Data {
                $crate::Data::Record {
                    type_name: $crate::SmolStr::new(stringify!($ty)),
                    fields: vec![
                        $(($crate::SmolStr::new(stringify!($field)), $crate::ToData::to_data(&self.$field)),)*
                    ],
                }
            }
        }
    };
}

// ============================================================================
// Primitives
// ============================================================================

macro_rules! primitive_to_data {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl ToData for $t {
                fn to_data(&self) -> Data {
                    Data::Value(Primitive::$variant(*self as $wide))
                }
            }
        )*
    };
}

primitive_to_data!(Int as i64: i8, i16, i32, i64, isize);
primitive_to_data!(UInt as u64: u8, u16, u32, u64, usize);
primitive_to_data!(Float as f32: f32);
primitive_to_data!(Double as f64: f64);

impl ToData for bool {
    fn to_data(&self) -> Data {
        Data::Value(Primitive::Bool(*self))
    }
}

impl ToData for char {
    fn to_data(&self) -> Data {
        Data::Value(Primitive::Char(*self))
    }
}

impl ToData for () {
    fn to_data(&self) -> Data {
        Data::Value(Primitive::Unit)
    }
}

impl ToData for str {
    fn to_data(&self) -> Data {
        Data::Value(Primitive::Str(self.to_owned()))
    }
}

impl ToData for String {
    fn to_data(&self) -> Data {
        self.as_str().to_data()
    }
}

impl ToData for Cow<'_, str> {
    fn to_data(&self) -> Data {
        self.as_ref().to_data()
    }
}

impl ToData for Data {
    fn to_data(&self) -> Data {
        self.clone()
    }
}

// ============================================================================
// Pointers and Options
// ============================================================================

impl<T: ToData + ?Sized> ToData for &T {
    fn to_data(&self) -> Data {
        (**self).to_data()
    }
}

impl<T: ToData + ?Sized> ToData for Box<T> {
    fn to_data(&self) -> Data {
        (**self).to_data()
    }
}

impl<T: ToData + ?Sized> ToData for Rc<T> {
    fn to_data(&self) -> Data {
        (**self).to_data()
    }
}

impl<T: ToData + ?Sized> ToData for Arc<T> {
    fn to_data(&self) -> Data {
        (**self).to_data()
    }
}

impl<T: ToData> ToData for Option<T> {
    fn to_data(&self) -> Data {
        match self {
            Some(value) => value.to_data(),
            None => Data::Null,
        }
    }
}

// ============================================================================
// Collections
// ============================================================================

impl<T: ToData> ToData for [T] {
    fn to_data(&self) -> Data {
        Data::sequence(self)
    }
}

impl<T: ToData, const N: usize> ToData for [T; N] {
    fn to_data(&self) -> Data {
        Data::sequence(self)
    }
}

impl<T: ToData> ToData for Vec<T> {
    fn to_data(&self) -> Data {
        Data::sequence(self)
    }
}

impl<T: ToData> ToData for VecDeque<T> {
    fn to_data(&self) -> Data {
        Data::sequence(self)
    }
}

impl<T: ToData> ToData for BTreeSet<T> {
    fn to_data(&self) -> Data {
        Data::sequence(self)
    }
}

impl<K: ToData, V: ToData> ToData for BTreeMap<K, V> {
    fn to_data(&self) -> Data {
        Data::Sequence(self.iter().map(entry).collect())
    }
}

impl<T: ToData, S: BuildHasher> ToData for HashSet<T, S> {
    fn to_data(&self) -> Data {
        canonical(self.iter().map(ToData::to_data).collect())
    }
}

impl<K: ToData, V: ToData, S: BuildHasher> ToData for HashMap<K, V, S> {
    fn to_data(&self) -> Data {
        canonical(self.iter().map(entry).collect())
    }
}

fn entry<K: ToData, V: ToData>((key, value): (&K, &V)) -> Data {
    Data::Sequence(vec![key.to_data(), value.to_data()])
}

/// Order hash-based collections by their rendered form
fn canonical(mut items: Vec<Data>) -> Data {
    items.sort_by_cached_key(|item| item.to_string());
    Data::Sequence(items)
}

// ============================================================================
// Tuples
// ============================================================================

macro_rules! tuple_to_data {
    ($($name:ident),+) => {
        impl<$($name: ToData),+> ToData for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_data(&self) -> Data {
                let ($($name,)+) = self;
                Data::Sequence(vec![$($name.to_data()),+])
            }
        }
    };
}

tuple_to_data!(A, B);
tuple_to_data!(A, B, C);
tuple_to_data!(A, B, C, D);
