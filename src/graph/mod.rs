//! Relationship graph: directed adjacency lists over caller-supplied nodes.
//!
//! Mutations (`to`, `both`, `all`, `unlink_*`, `drop_nodes`, `merge`) work in
//! place and return `&mut Self` for chaining. Views (`subgraph`,
//! `subgraph_where`, `reverse`, `clone`) build new graphs that share the
//! equality strategy and never touch the original.

mod dataset;
mod metrics;
mod traversal;

pub use dataset::{combine, from_json, load_dataset, save_dataset, to_json, Dataset};
pub use metrics::MetricOptions;

use std::collections::HashSet;
use std::hash::Hash;

use crate::identity::{Comparator, Equality, IdentityIndex};

/// Directed graph of `T` nodes keyed by source, with insertion-ordered,
/// deduplicated target lists.
#[derive(Debug, Clone)]
pub struct RelationGraph<T> {
    relations: IdentityIndex<T, Vec<T>>,
}

impl<T> RelationGraph<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new(equality: Equality<T>) -> Self {
        Self {
            relations: IdentityIndex::new(equality),
        }
    }

    /// Empty graph using native `Eq`/`Hash` identity.
    pub fn strict() -> Self {
        Self::new(Equality::strict())
    }

    /// Empty graph comparing nodes with `comparator`.
    pub fn structural<C>(comparator: C) -> Self
    where
        C: Comparator<T> + Send + Sync + 'static,
    {
        Self::new(Equality::structural(comparator))
    }

    /// Build a graph from an exported dataset. Repeated sources are folded
    /// together by unioning their target lists.
    pub fn with_dataset(dataset: Dataset<T>, equality: Equality<T>) -> Self {
        let mut graph = Self::new(equality);
        for (source, targets) in dataset {
            graph.ensure_relation(source, targets);
        }
        graph
    }

    pub fn equality(&self) -> &Equality<T> {
        self.relations.equality()
    }

    pub fn is_structural(&self) -> bool {
        self.equality().is_structural()
    }

    /// Target list for `source`, created if missing, with `targets` appended
    /// where not already present.
    fn ensure_relation<I>(&mut self, source: T, targets: I) -> &mut Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let equality = self.equality().clone();
        let relation = self.relations.get_or_insert_with(source, Vec::new);
        equality.extend_unique(relation, targets);
        relation
    }

    /// Removes `targets` from the list of `source`, collecting the source if
    /// its list ends up empty.
    fn unlink_from_source(&mut self, source: &T, targets: &[T]) {
        let equality = self.equality().clone();
        let Some(relation) = self.relations.get_mut(source) else {
            return;
        };
        for target in targets {
            equality.remove(relation, target);
        }
        if relation.is_empty() {
            self.relations.delete(source);
        }
    }

    /// One-directional links `source -> target` for every target.
    pub fn to<I>(&mut self, source: T, targets: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        self.ensure_relation(source, targets);
        self
    }

    /// Links `a <-> b` for every `b`.
    pub fn both<I>(&mut self, a: T, bs: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        let bs: Vec<T> = bs.into_iter().collect();
        self.ensure_relation(a.clone(), bs.iter().cloned());
        for b in bs {
            self.ensure_relation(b, [a.clone()]);
        }
        self
    }

    /// Links every node to every other node in `nodes`. No self loops are added.
    pub fn all<I>(&mut self, nodes: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        let nodes: Vec<T> = nodes.into_iter().collect();
        let equality = self.equality().clone();
        for node in &nodes {
            let others = nodes
                .iter()
                .filter(|other| !equality.equals(node, other))
                .cloned();
            self.ensure_relation(node.clone(), others);
        }
        self
    }

    /// Removes the one-directional links `source -> target`.
    pub fn unlink_to(&mut self, source: &T, targets: &[T]) -> &mut Self {
        self.unlink_from_source(source, targets);
        self
    }

    /// Removes the links `a <-> b` for every `b`.
    pub fn unlink_both(&mut self, a: &T, bs: &[T]) -> &mut Self {
        self.unlink_from_source(a, bs);
        for b in bs {
            self.unlink_from_source(b, std::slice::from_ref(a));
        }
        self
    }

    /// Erases each node: its own list goes, it leaves every other list, and any
    /// source left without targets is collected.
    pub fn drop_nodes(&mut self, nodes: &[T]) -> &mut Self {
        let equality = self.equality().clone();
        for node in nodes {
            self.relations.delete(node);
            self.relations.retain(|_, relation| {
                let removed = equality.remove(relation, node);
                !(removed && relation.is_empty())
            });
        }
        self
    }

    /// Removes every node and edge.
    pub fn clear(&mut self) -> &mut Self {
        self.relations.clear();
        self
    }

    /// Whether `node` is a source or appears in any target list.
    pub fn has(&self, node: &T) -> bool {
        if self.relations.has(node) {
            return true;
        }
        let equality = self.equality();
        self.relations
            .values()
            .any(|relation| equality.contains(relation, node))
    }

    pub fn has_all(&self, nodes: &[T]) -> bool {
        nodes.iter().all(|node| self.has(node))
    }

    /// Whether the directed edge `source -> target` exists.
    pub fn has_edge(&self, source: &T, target: &T) -> bool {
        self.relations
            .get(source)
            .map(|relation| self.equality().contains(relation, target))
            .unwrap_or(false)
    }

    /// Direct targets of `source`; empty for unknown nodes.
    pub fn targets(&self, source: &T) -> &[T] {
        self.relations
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every node, sources and targets, in first-seen order.
    pub fn nodes(&self) -> Vec<T> {
        let equality = self.equality();
        let mut nodes = Vec::new();
        for (source, targets) in self.relations.iter() {
            equality.push_unique(&mut nodes, source.clone());
            equality.extend_unique(&mut nodes, targets.iter().cloned());
        }
        nodes
    }

    /// Every node that is the target of some edge, in first-seen order.
    pub fn children(&self) -> Vec<T> {
        let equality = self.equality();
        let mut children = Vec::new();
        for targets in self.relations.values() {
            equality.extend_unique(&mut children, targets.iter().cloned());
        }
        children
    }

    /// Every node as a set. Uses native `Eq`/`Hash` regardless of mode.
    pub fn nodeset(&self) -> HashSet<T> {
        let mut set = HashSet::new();
        for (source, targets) in self.relations.iter() {
            set.insert(source.clone());
            set.extend(targets.iter().cloned());
        }
        set
    }

    /// `nodes()` minus `excluded`.
    pub fn without(&self, excluded: &[T]) -> Vec<T> {
        let equality = self.equality();
        let mut nodes = self.nodes();
        for node in excluded {
            equality.remove(&mut nodes, node);
        }
        nodes
    }

    /// New graph with every edge `s -> t` turned into `t -> s`.
    pub fn reverse(&self) -> RelationGraph<T> {
        let mut reversed = Self::new(self.equality().clone());
        for (source, targets) in self.relations.iter() {
            for target in targets {
                reversed.ensure_relation(target.clone(), [source.clone()]);
            }
        }
        reversed
    }

    /// The adjacency map as ordered `(source, targets)` pairs.
    pub fn dataset(&self) -> Dataset<T> {
        self.relations
            .iter()
            .map(|(source, targets)| (source.clone(), targets.clone()))
            .collect()
    }

    /// Unions each dataset into this graph. Existing lists keep their order and
    /// gain the new targets at the end; merging the same dataset twice is a no-op.
    pub fn merge<I>(&mut self, datasets: I) -> &mut Self
    where
        I: IntoIterator<Item = Dataset<T>>,
    {
        let mut acc = self.dataset();
        for dataset in datasets {
            acc = combine(acc, dataset, self.equality());
        }
        for (source, targets) in acc {
            self.ensure_relation(source, targets);
        }
        self
    }

    /// The stored instance equal to `node` under the active equality.
    ///
    /// Maps returned by `weights`, `entries`, `one_hot`, `label` and
    /// `nodeset` hash the stored instances, so structural graphs should look
    /// them up with `raw(node)` rather than a caller-built copy.
    pub fn raw(&self, node: &T) -> Option<&T> {
        let equality = self.equality();
        for (source, targets) in self.relations.iter() {
            if equality.equals(node, source) {
                return Some(source);
            }
            if let Some(target) = targets.iter().find(|t| equality.equals(node, t)) {
                return Some(target);
            }
        }
        None
    }

    /// Number of source keys.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.relations.values().map(Vec::len).sum()
    }
}

impl<T> Default for RelationGraph<T>
where
    T: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::strict()
    }
}
