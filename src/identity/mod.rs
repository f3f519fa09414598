//! Node identity: strict vs. structural equality and the index built on it.
//!
//! Every membership test in the crate goes through [`Equality`], so the
//! choice between native `Eq`/`Hash` and a caller-supplied comparator is made
//! once, at construction, and never re-decided at call sites.

mod index;

pub use index::IdentityIndex;

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Deep-equality predicate used by structural mode.
///
/// Implementations must form an equivalence relation (reflexive, symmetric,
/// transitive). This is a caller precondition and is never checked.
pub trait Comparator<T> {
    /// Returns whether `a` and `b` denote the same node.
    fn equals(&self, a: &T, b: &T) -> bool;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Structural comparator that compares the `serde_json::Value` trees of two
/// nodes. Values that fail to serialize never compare equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComparator;

impl<T: Serialize> Comparator<T> for JsonComparator {
    fn equals(&self, a: &T, b: &T) -> bool {
        match (serde_json::to_value(a), serde_json::to_value(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Shared handle to a structural comparator.
pub type SharedComparator<T> = Arc<dyn Comparator<T> + Send + Sync>;

/// Key-comparison strategy, fixed for the lifetime of a graph or index.
pub enum Equality<T> {
    /// Native `Eq`/`Hash` identity; lookups are hashed.
    Strict,
    /// Caller-supplied deep equality; lookups scan linearly.
    Structural(SharedComparator<T>),
}

impl<T> Equality<T> {
    pub fn strict() -> Self {
        Equality::Strict
    }

    pub fn structural<C>(comparator: C) -> Self
    where
        C: Comparator<T> + Send + Sync + 'static,
    {
        Equality::Structural(Arc::new(comparator))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Equality::Structural(_))
    }
}

impl<T: Serialize> Equality<T> {
    /// Structural equality over the JSON form of each node.
    pub fn json() -> Self {
        Equality::structural(JsonComparator)
    }
}

impl<T: PartialEq> Equality<T> {
    /// Returns whether `a` and `b` are the same node under this strategy.
    pub fn equals(&self, a: &T, b: &T) -> bool {
        match self {
            Equality::Strict => a == b,
            Equality::Structural(cmp) => cmp.equals(a, b),
        }
    }

    /// Index of the first element of `items` equal to `node`.
    pub fn position(&self, items: &[T], node: &T) -> Option<usize> {
        items.iter().position(|item| self.equals(node, item))
    }

    pub fn contains(&self, items: &[T], node: &T) -> bool {
        self.position(items, node).is_some()
    }

    /// Appends `node` unless an equal node is already present.
    /// Returns true if the node was appended.
    pub fn push_unique(&self, items: &mut Vec<T>, node: T) -> bool {
        if self.contains(items, &node) {
            return false;
        }
        items.push(node);
        true
    }

    pub fn extend_unique<I>(&self, items: &mut Vec<T>, nodes: I)
    where
        I: IntoIterator<Item = T>,
    {
        for node in nodes {
            self.push_unique(items, node);
        }
    }

    /// Removes the first element equal to `node`. Returns true if one was removed.
    pub fn remove(&self, items: &mut Vec<T>, node: &T) -> bool {
        match self.position(items, node) {
            Some(i) => {
                items.remove(i);
                true
            }
            None => false,
        }
    }
}

impl<T> Clone for Equality<T> {
    fn clone(&self) -> Self {
        match self {
            Equality::Strict => Equality::Strict,
            Equality::Structural(cmp) => Equality::Structural(Arc::clone(cmp)),
        }
    }
}

impl<T> Default for Equality<T> {
    fn default() -> Self {
        Equality::Strict
    }
}

impl<T> fmt::Debug for Equality<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equality::Strict => f.write_str("Strict"),
            Equality::Structural(_) => f.write_str("Structural"),
        }
    }
}
