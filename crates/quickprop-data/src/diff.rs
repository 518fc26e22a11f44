//! Structural diffs between data trees.

use crate::{Data, Primitive};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt;

/// Where and how two data trees diverge
///
/// Only the diverging parts are kept: sequence and record diffs never hold
/// empty child diffs, and a tree compared with itself yields [`DataDiff::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataDiff {
    /// The trees are equal
    Empty,

    /// The trees have different shapes (or records of different types)
    Incompatible { left: Data, right: Data },

    /// Two different leaves
    Value { left: Primitive, right: Primitive },

    /// Two different `f32` leaves, subject to [`DataDiff::with_epsilon`]
    Float { left: f32, right: f32 },

    /// Two different `f64` leaves, subject to [`DataDiff::with_epsilon`]
    Double { left: f64, right: f64 },

    /// Index-aligned element diffs; elements past the shorter sequence are
    /// reported as removed (only on the left) or added (only on the right)
    Sequence {
        modified: Vec<(usize, DataDiff)>,
        removed: Vec<(usize, Data)>,
        added: Vec<(usize, Data)>,
    },

    /// Field diffs of two records of the same type, matched by name
    Record {
        type_name: SmolStr,
        modified: Vec<(SmolStr, DataDiff)>,
        removed: Vec<(SmolStr, Data)>,
        added: Vec<(SmolStr, Data)>,
    },
}

impl DataDiff {
    /// True if the compared trees were equal
    pub fn is_empty(&self) -> bool {
        matches!(self, DataDiff::Empty)
    }

    /// Treat floating point leaves closer than `epsilon` as equal
    ///
    /// Non-numeric differences are unaffected.
    pub fn with_epsilon(&self, epsilon: f64) -> DataDiff {
        match self {
            DataDiff::Float { left, right } if (*left as f64 - *right as f64).abs() < epsilon => {
                DataDiff::Empty
            }
            DataDiff::Double { left, right } if (left - right).abs() < epsilon => DataDiff::Empty,
            DataDiff::Sequence {
                modified,
                removed,
                added,
            } => sequence(
                prune(modified.iter().map(|(i, d)| (*i, d.with_epsilon(epsilon)))),
                removed.clone(),
                added.clone(),
            ),
            DataDiff::Record {
                type_name,
                modified,
                removed,
                added,
            } => record(
                type_name.clone(),
                prune(modified.iter().map(|(name, d)| (name.clone(), d.with_epsilon(epsilon)))),
                removed.clone(),
                added.clone(),
            ),
            other => other.clone(),
        }
    }
}

fn prune<K>(diffs: impl Iterator<Item = (K, DataDiff)>) -> Vec<(K, DataDiff)> {
    diffs.filter(|(_, d)| !d.is_empty()).collect()
}

fn sequence(
    modified: Vec<(usize, DataDiff)>,
    removed: Vec<(usize, Data)>,
    added: Vec<(usize, Data)>,
) -> DataDiff {
    if modified.is_empty() && removed.is_empty() && added.is_empty() {
        DataDiff::Empty
    } else {
        DataDiff::Sequence {
            modified,
            removed,
            added,
        }
    }
}

fn record(
    type_name: SmolStr,
    modified: Vec<(SmolStr, DataDiff)>,
    removed: Vec<(SmolStr, Data)>,
    added: Vec<(SmolStr, Data)>,
) -> DataDiff {
    if modified.is_empty() && removed.is_empty() && added.is_empty() {
        DataDiff::Empty
    } else {
        DataDiff::Record {
            type_name,
            modified,
            removed,
            added,
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

pub(crate) fn diff_data(left: &Data, right: &Data) -> DataDiff {
    match (left, right) {
        (Data::Null, Data::Null) => DataDiff::Empty,
        (Data::Value(a), Data::Value(b)) => diff_primitive(a, b),
        (Data::Sequence(xs), Data::Sequence(ys)) => {
            let common = xs.len().min(ys.len());
            let modified = prune(
                xs.iter()
                    .zip(ys)
                    .enumerate()
                    .map(|(i, (x, y))| (i, diff_data(x, y))),
            );
            let tail = |items: &[Data]| -> Vec<(usize, Data)> {
                items[common..]
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(i, d)| (common + i, d))
                    .collect()
            };
            sequence(modified, tail(xs.as_slice()), tail(ys.as_slice()))
        }
        (
            Data::Record {
                type_name,
                fields: left_fields,
            },
            Data::Record {
                type_name: right_name,
                fields: right_fields,
            },
        ) if type_name == right_name => {
            let mut unmatched: IndexMap<&SmolStr, &Data> =
                right_fields.iter().map(|(name, data)| (name, data)).collect();

            let mut modified = Vec::new();
            let mut removed = Vec::new();
            for (name, data) in left_fields {
                match unmatched.shift_remove(name) {
                    Some(other) => {
                        let d = diff_data(data, other);
                        if !d.is_empty() {
                            modified.push((name.clone(), d));
                        }
                    }
                    None => removed.push((name.clone(), data.clone())),
                }
            }

            let added = unmatched
                .into_iter()
                .map(|(name, data)| (name.clone(), data.clone()))
                .collect();
            record(type_name.clone(), modified, removed, added)
        }
        _ => DataDiff::Incompatible {
            left: left.clone(),
            right: right.clone(),
        },
    }
}

fn diff_primitive(left: &Primitive, right: &Primitive) -> DataDiff {
    match (left, right) {
        (Primitive::Float(a), Primitive::Float(b)) => {
            if a == b || (a.is_nan() && b.is_nan()) {
                DataDiff::Empty
            } else {
                DataDiff::Float {
                    left: *a,
                    right: *b,
                }
            }
        }
        (Primitive::Double(a), Primitive::Double(b)) => {
            if a == b || (a.is_nan() && b.is_nan()) {
                DataDiff::Empty
            } else {
                DataDiff::Double {
                    left: *a,
                    right: *b,
                }
            }
        }
        (a, b) if a == b => DataDiff::Empty,
        (a, b) => DataDiff::Value {
            left: a.clone(),
            right: b.clone(),
        },
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl fmt::Display for DataDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataDiff::Empty => write!(f, "no differences"),
            DataDiff::Incompatible { left, right } => write!(f, "{} != {}", left, right),
            DataDiff::Value { left, right } => write!(f, "{} != {}", left, right),
            DataDiff::Float { left, right } => write!(f, "{:?} != {:?}", left, right),
            DataDiff::Double { left, right } => write!(f, "{:?} != {:?}", left, right),
            DataDiff::Sequence {
                modified,
                removed,
                added,
            } => {
                write!(f, "[")?;
                write_changes(f, modified, removed, added)?;
                write!(f, "]")
            }
            DataDiff::Record {
                type_name,
                modified,
                removed,
                added,
            } => {
                write!(f, "{} {{ ", type_name)?;
                write_changes(f, modified, removed, added)?;
                write!(f, " }}")
            }
        }
    }
}

/// Write `key: diff` entries followed by `-key = value` and `+key = value`
fn write_changes<K: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    modified: &[(K, DataDiff)],
    removed: &[(K, Data)],
    added: &[(K, Data)],
) -> fmt::Result {
    let entries = modified
        .iter()
        .map(|(key, d)| format!("{}: {}", key, d))
        .chain(removed.iter().map(|(key, d)| format!("-{} = {}", key, d)))
        .chain(added.iter().map(|(key, d)| format!("+{} = {}", key, d)));

    for (i, entry) in entries.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", entry)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diff, ToData};
    use pretty_assertions::assert_eq;

    fn point(x: f64, y: f64) -> Data {
        Data::record("Point", [("x", x.to_data()), ("y", y.to_data())])
    }

    #[test]
    fn test_equal_trees_have_empty_diff() {
        let values = [
            Data::Null,
            point(1.0, f64::NAN),
            vec![Some("a"), None].to_data(),
            (1u8, 'c', f32::NAN).to_data(),
        ];
        for value in &values {
            assert_eq!(value.diff(value), DataDiff::Empty, "{}", value);
        }
    }

    #[test]
    fn test_emptiness_is_symmetric() {
        let pairs = [
            (1i32.to_data(), 2i32.to_data()),
            (vec![1i32, 2].to_data(), vec![1i32].to_data()),
            (point(0.0, 0.0), point(0.0, -1.0)),
            (Data::Null, 0i32.to_data()),
        ];
        for (a, b) in &pairs {
            assert_eq!(a.diff(b).is_empty(), b.diff(a).is_empty());
            assert!(!a.diff(b).is_empty());
        }
    }

    #[test]
    fn test_epsilon_collapses_close_numbers() {
        let d = diff(&1.0f64, &(1.0 + 1e-9));
        assert!(!d.is_empty());
        assert!(d.with_epsilon(1e-6).is_empty());
        assert!(!d.with_epsilon(1e-12).is_empty());

        let d = diff(&vec![1.0f32, 2.0], &vec![1.0f32, 2.0001]);
        assert!(d.with_epsilon(1e-3).is_empty());
    }

    #[test]
    fn test_epsilon_leaves_other_differences() {
        let d = point(1.0, 1.0).diff(&Data::record(
            "Point",
            [("x", 1.0000001f64.to_data()), ("y", "one".to_data())],
        ));
        let relaxed = d.with_epsilon(1e-3);
        assert_eq!(relaxed.to_string(), "Point { y: 1.0 != \"one\" }");
    }

    #[test]
    fn test_record_field_changes() {
        let left = Data::record("User", [("id", 1i32.to_data()), ("name", "a".to_data())]);
        let right = Data::record("User", [("id", 2i32.to_data()), ("email", "e".to_data())]);
        assert_eq!(
            left.diff(&right),
            DataDiff::Record {
                type_name: "User".into(),
                modified: vec![(
                    "id".into(),
                    DataDiff::Value {
                        left: Primitive::Int(1),
                        right: Primitive::Int(2),
                    }
                )],
                removed: vec![("name".into(), "a".to_data())],
                added: vec![("email".into(), "e".to_data())],
            }
        );
        assert_eq!(
            left.diff(&right).to_string(),
            "User { id: 1 != 2, -name = \"a\", +email = \"e\" }"
        );
    }

    #[test]
    fn test_sequence_length_mismatch() {
        let d = diff(&vec![1i32, 5, 3, 4], &vec![1i32, 2]);
        assert_eq!(d.to_string(), "[1: 5 != 2, -2 = 3, -3 = 4]");

        let d = diff(&Vec::<i32>::new(), &vec![7i32]);
        assert_eq!(d.to_string(), "[+0 = 7]");
    }

    #[test]
    fn test_incompatible_shapes() {
        let d = point(0.0, 0.0).diff(&vec![0.0f64, 0.0].to_data());
        assert!(matches!(d, DataDiff::Incompatible { .. }));
        assert_eq!(d.to_string(), "Point { x = 0.0, y = 0.0 } != [0.0, 0.0]");

        let other = Data::record("Vector", [("x", 0.0f64.to_data()), ("y", 0.0f64.to_data())]);
        assert!(matches!(point(0.0, 0.0).diff(&other), DataDiff::Incompatible { .. }));
        assert!(matches!(Data::Null.diff(&1i32.to_data()), DataDiff::Incompatible { .. }));
    }

    #[test]
    fn test_mixed_leaf_kinds_differ() {
        let d = diff(&1u32, &1i32);
        assert_eq!(
            d,
            DataDiff::Value {
                left: Primitive::UInt(1),
                right: Primitive::Int(1),
            }
        );
    }
}
