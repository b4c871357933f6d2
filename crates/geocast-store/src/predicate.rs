//! Query predicates: equality, range, set membership and conjunction.

use std::cmp::Ordering;

use crate::document::Document;
use crate::value::Value;

/// A filter over the indexed fields `F` of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<F> {
    /// Matches every document.
    All,
    Eq(F, Value),
    Ne(F, Value),
    Gte(F, Value),
    Lte(F, Value),
    In(F, Vec<Value>),
    And(Vec<Predicate<F>>),
}

impl<F: Copy> Predicate<F> {
    pub fn eq(field: F, value: impl Into<Value>) -> Self {
        Predicate::Eq(field, value.into())
    }

    pub fn ne(field: F, value: impl Into<Value>) -> Self {
        Predicate::Ne(field, value.into())
    }

    pub fn gte(field: F, value: impl Into<Value>) -> Self {
        Predicate::Gte(field, value.into())
    }

    pub fn lte(field: F, value: impl Into<Value>) -> Self {
        Predicate::Lte(field, value.into())
    }

    pub fn is_in<V: Into<Value>>(field: F, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In(field, values.into_iter().map(Into::into).collect())
    }

    /// Inclusive range `low <= field <= high`.
    pub fn between(field: F, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Predicate::And(vec![Self::gte(field, low), Self::lte(field, high)])
    }

    /// Conjoins `other`, flattening nested `And`s.
    pub fn and(self, other: Predicate<F>) -> Self {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    /// Evaluates the predicate against `doc`.
    pub fn matches<D: Document<Field = F>>(&self, doc: &D) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq(field, value) => doc.field(*field) == *value,
            Predicate::Ne(field, value) => doc.field(*field) != *value,
            Predicate::Gte(field, value) => matches!(
                doc.field(*field).partial_cmp(value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Lte(field, value) => matches!(
                doc.field(*field).partial_cmp(value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::In(field, values) => {
                let actual = doc.field(*field);
                values.iter().any(|v| *v == actual)
            }
            Predicate::And(parts) => parts.iter().all(|p| p.matches(doc)),
        }
    }
}
