//! Query descriptor handed to record sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction.
///
/// Parsing is ASCII case-insensitive and accepts only `asc` and `desc`;
/// [`SortDirection::normalize`] maps anything else to ascending.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// Normalize a raw wire value. Missing or unrecognized input is ascending.
    ///
    /// ```
    /// use datatable_core::SortDirection;
    ///
    /// assert_eq!(SortDirection::normalize(Some("DESC")), SortDirection::Desc);
    /// assert_eq!(SortDirection::normalize(Some("sideways")), SortDirection::Asc);
    /// assert_eq!(SortDirection::normalize(None), SortDirection::Asc);
    /// ```
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse().ok()).unwrap_or_default()
    }
}

/// One `ORDER BY` entry.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_new::new,
)]
pub struct OrderTerm {
    /// Column identity
    field: String,
    /// Direction
    direction: SortDirection,
}

/// Comparison operator for [`Predicate::Compare`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equal
    #[strum(to_string = "=")]
    Eq,
    /// Not equal
    #[strum(to_string = "<>")]
    NotEq,
    /// Less than
    #[strum(to_string = "<")]
    Lt,
    /// Less than or equal
    #[strum(to_string = "<=")]
    Lte,
    /// Greater than
    #[strum(to_string = ">")]
    Gt,
    /// Greater than or equal
    #[strum(to_string = ">=")]
    Gte,
}

/// Composable filter tree.
///
/// Fields are column identities, qualified (`Article.title`) or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Field contains the term (`LIKE '%term%'`)
    Contains {
        /// Column identity
        field: String,
        /// Literal substring
        term: String,
    },
    /// Field compared against a scalar
    Compare {
        /// Column identity
        field: String,
        /// Operator
        op: CompareOp,
        /// Scalar value
        value: Value,
    },
    /// Field equals one of the values
    In {
        /// Column identity
        field: String,
        /// Candidate values
        values: Vec<Value>,
    },
    /// Field is null
    IsNull {
        /// Column identity
        field: String,
    },
    /// All children hold
    And(Vec<Predicate>),
    /// At least one child holds
    Or(Vec<Predicate>),
    /// Child does not hold
    Not(Box<Predicate>),
}

impl Predicate {
    /// `field CONTAINS term`.
    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            term: term.into(),
        }
    }

    /// `field <op> value`.
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Conjunction with nested conjunctions flattened.
    ///
    /// A single child is returned as is.
    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Predicate::And(nested) => flat.extend(nested),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Predicate::And(flat)
        }
    }

    /// Disjunction. A single child is returned as is.
    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Self {
        let mut children: Vec<_> = children.into_iter().collect();
        if children.len() == 1 {
            children.remove(0)
        } else {
            Predicate::Or(children)
        }
    }

    /// AND `extra` onto an optional existing predicate.
    ///
    /// ```
    /// use datatable_core::Predicate;
    ///
    /// let scope = Predicate::equals("Article.published", "Y");
    /// let search = Predicate::contains("Article.title", "rust");
    /// let combined = Predicate::conjoin(Some(scope.clone()), search.clone());
    /// assert_eq!(combined, Predicate::And(vec![scope, search]));
    /// ```
    pub fn conjoin(existing: Option<Predicate>, extra: Predicate) -> Self {
        match existing {
            Some(existing) => Self::and([existing, extra]),
            None => extra,
        }
    }
}

/// The accumulator built by the sort, search and paginate passes.
///
/// An empty predicate, order or limit means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Bound column identities to select, in column order
    pub fields: Vec<String>,
    /// Filter tree
    pub predicate: Option<Predicate>,
    /// Sort terms, highest precedence first
    pub order: Vec<OrderTerm>,
    /// Maximum rows to return
    pub limit: Option<u64>,
    /// Rows to skip
    pub offset: Option<u64>,
}

impl QueryDescriptor {
    /// Descriptor selecting `fields` under the caller's base scope.
    pub fn scoped(fields: Vec<String>, scope: Option<Predicate>) -> Self {
        Self {
            fields,
            predicate: scope,
            ..Self::default()
        }
    }

    /// AND a condition onto the current predicate.
    pub fn add_condition(&mut self, condition: Predicate) {
        self.predicate = Some(Predicate::conjoin(self.predicate.take(), condition));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_case_insensitive() {
        assert_eq!(SortDirection::normalize(Some("Desc")), SortDirection::Desc);
        assert_eq!(SortDirection::normalize(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::normalize(Some("")), SortDirection::Asc);
        assert_eq!(SortDirection::normalize(Some(" desc")), SortDirection::Asc);
    }

    #[test]
    fn test_and_flattens_nested_conjunctions() {
        let a = Predicate::equals("a", 1);
        let b = Predicate::equals("b", 2);
        let c = Predicate::equals("c", 3);
        let nested = Predicate::and([Predicate::And(vec![a.clone(), b.clone()]), c.clone()]);
        assert_eq!(nested, Predicate::And(vec![a, b, c]));
    }

    #[test]
    fn test_add_condition_without_scope() {
        let mut descriptor = QueryDescriptor::default();
        let search = Predicate::contains("Article.title", "x");
        descriptor.add_condition(search.clone());
        assert_eq!(descriptor.predicate, Some(search));
    }

    #[test]
    fn test_compare_op_display() {
        assert_eq!(CompareOp::Gte.to_string(), ">=");
        assert_eq!(CompareOp::NotEq.to_string(), "<>");
    }
}
