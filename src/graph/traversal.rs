//! Breadth-first traversal over the relationship graph.
//!
//! Every walk keeps a visited index under the graph's equality strategy, so
//! cycles terminate and each node is expanded at its shortest hop distance.

use std::collections::VecDeque;
use std::hash::Hash;

use super::{combine, Dataset, RelationGraph};
use crate::identity::IdentityIndex;

impl<T> RelationGraph<T>
where
    T: Clone + Eq + Hash,
{
    /// Collects the relations reachable from `source` within `depth` hops.
    ///
    /// Nodes closer than `depth` hops become keys carrying their full edge
    /// list (empty for leaves); nodes exactly `depth` hops away show up only as
    /// targets. `None` walks everything reachable.
    fn search_dataset(&self, source: &T, depth: Option<usize>) -> Dataset<T> {
        let source = self.raw(source).unwrap_or(source).clone();
        if depth == Some(0) {
            return vec![(source, Vec::new())];
        }

        let mut result = Vec::new();
        let mut visited: IdentityIndex<T, usize> = IdentityIndex::new(self.equality().clone());
        let mut queue = VecDeque::new();

        visited.set(source.clone(), 0);
        queue.push_back((source, 0usize));

        while let Some((node, hops)) = queue.pop_front() {
            let targets = self.targets(&node).to_vec();
            let expand = depth.map_or(true, |limit| hops + 1 < limit);
            if expand {
                for target in &targets {
                    if !visited.has(target) {
                        visited.set(target.clone(), hops + 1);
                        queue.push_back((target.clone(), hops + 1));
                    }
                }
            }
            result.push((node, targets));
        }

        log::debug!(
            "search_dataset: {} sources within depth {:?}",
            result.len(),
            depth
        );
        result
    }

    /// New graph holding only what is reachable from `source` within `depth`
    /// hops (`None` for unbounded).
    ///
    /// `subgraph(s, Some(1))` holds `s` and its direct targets. An unknown
    /// source yields a graph containing just that isolated node.
    pub fn subgraph(&self, source: &T, depth: Option<usize>) -> RelationGraph<T> {
        let dataset = self.search_dataset(source, depth);
        RelationGraph::with_dataset(dataset, self.equality().clone())
    }

    /// Union of `subgraph(node, depth)` for every node accepted by `predicate`.
    ///
    /// The predicate sees each node with its position in `nodes()` and the full
    /// node list.
    pub fn subgraph_where<F>(&self, mut predicate: F, depth: Option<usize>) -> RelationGraph<T>
    where
        F: FnMut(&T, usize, &[T]) -> bool,
    {
        let nodes = self.nodes();
        let mut acc = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            if predicate(node, i, &nodes) {
                acc = combine(acc, self.search_dataset(node, depth), self.equality());
            }
        }
        RelationGraph::with_dataset(acc, self.equality().clone())
    }

    /// Minimum number of hops from `source` to `target`, or infinity when
    /// `target` cannot be reached. `log` applies `ln(depth + 1)`.
    pub fn depth(&self, source: &T, target: &T, log: bool) -> f64 {
        let hops = self.shortest_hops(source, target).map_or(f64::INFINITY, |h| h as f64);
        if log {
            (hops + 1.0).ln()
        } else {
            hops
        }
    }

    fn shortest_hops(&self, source: &T, target: &T) -> Option<usize> {
        let equality = self.equality();
        if equality.equals(source, target) {
            return Some(0);
        }

        let mut visited: IdentityIndex<T, ()> = IdentityIndex::new(equality.clone());
        let mut queue = VecDeque::new();
        visited.set(source.clone(), ());
        queue.push_back((source.clone(), 0usize));

        while let Some((node, hops)) = queue.pop_front() {
            for next in self.targets(&node) {
                if equality.equals(next, target) {
                    return Some(hops + 1);
                }
                if !visited.has(next) {
                    visited.set(next.clone(), ());
                    queue.push_back((next.clone(), hops + 1));
                }
            }
        }
        None
    }

    /// `min(depth(a, b), depth(b, a))`.
    pub fn distance(&self, a: &T, b: &T, log: bool) -> f64 {
        self.depth(a, b, log).min(self.depth(b, a, log))
    }

    /// Weakly connected groups of nodes.
    ///
    /// Clusters are seeded in `nodes()` order and list their members in
    /// `nodes()` order; every node lands in exactly one cluster.
    pub fn clusters(&self) -> Vec<Vec<T>> {
        let nodes = self.nodes();
        let reversed = self.reverse();
        let mut assigned: IdentityIndex<T, usize> = IdentityIndex::new(self.equality().clone());
        let mut count = 0;

        for seed in &nodes {
            if assigned.has(seed) {
                continue;
            }
            let id = count;
            count += 1;
            assigned.set(seed.clone(), id);
            let mut queue = VecDeque::from([seed.clone()]);
            while let Some(node) = queue.pop_front() {
                let neighbours = self.targets(&node).iter().chain(reversed.targets(&node));
                for next in neighbours {
                    if !assigned.has(next) {
                        assigned.set(next.clone(), id);
                        queue.push_back(next.clone());
                    }
                }
            }
        }

        let mut clusters = vec![Vec::new(); count];
        for node in nodes {
            if let Some(&id) = assigned.get(&node) {
                clusters[id].push(node);
            }
        }
        log::debug!("clusters: {} groups", clusters.len());
        clusters
    }
}
