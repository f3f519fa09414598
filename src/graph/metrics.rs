//! Node metrics and vector encodings: weight (in-degree), entry (reachable
//! children), one-hot vectors and labels.

use std::collections::HashMap;
use std::hash::Hash;

use super::RelationGraph;

/// Post-processing applied by `weights` and `entries`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricOptions {
    /// Apply `ln(value + 1)` to each value.
    pub log: bool,
    /// Divide every value by the maximum (or the sum, with `to_scale`).
    pub normalize: bool,
    /// With `normalize`, scale so that all values sum to 1.
    pub to_scale: bool,
}

fn log_scale(value: f64, log: bool) -> f64 {
    if log {
        (value + 1.0).ln()
    } else {
        value
    }
}

/// Applies `normalize`/`to_scale` to `values`. A zero divisor leaves every
/// value untouched (they are all zero in that case).
fn normalized<T>(values: Vec<(T, f64)>, options: MetricOptions) -> HashMap<T, f64>
where
    T: Eq + Hash,
{
    if !options.normalize {
        return values.into_iter().collect();
    }
    let divisor = if options.to_scale {
        values.iter().map(|(_, v)| v).sum::<f64>()
    } else {
        values.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    };
    if divisor <= 0.0 {
        return values.into_iter().collect();
    }
    values
        .into_iter()
        .map(|(node, value)| (node, value / divisor))
        .collect()
}

impl<T> RelationGraph<T>
where
    T: Clone + Eq + Hash,
{
    /// Number of distinct sources that link to `node`.
    pub fn weight(&self, node: &T, log: bool) -> f64 {
        let equality = self.equality();
        let referrers = self
            .relations
            .values()
            .filter(|targets| equality.contains(targets, node))
            .count();
        log_scale(referrers as f64, log)
    }

    /// `weight` of every node, keyed by the stored node instance.
    pub fn weights(&self, options: MetricOptions) -> HashMap<T, f64> {
        let values = self
            .nodes()
            .into_iter()
            .map(|node| {
                let weight = self.weight(&node, options.log);
                (node, weight)
            })
            .collect();
        normalized(values, options)
    }

    /// Number of distinct targets reachable from `node`.
    pub fn entry(&self, node: &T, log: bool) -> f64 {
        let children = self.subgraph(node, None).children().len();
        log_scale(children as f64, log)
    }

    /// `entry` of every node, keyed by the stored node instance.
    pub fn entries(&self, options: MetricOptions) -> HashMap<T, f64> {
        let values = self
            .nodes()
            .into_iter()
            .map(|node| {
                let entry = self.entry(&node, options.log);
                (node, entry)
            })
            .collect();
        normalized(values, options)
    }

    /// Unit basis vector per node, indexed by `nodes()` order.
    pub fn one_hot(&self) -> HashMap<T, Vec<f32>> {
        let nodes = self.nodes();
        let len = nodes.len();
        nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| {
                let mut vector = vec![0.0f32; len];
                vector[i] = 1.0;
                (node, vector)
            })
            .collect()
    }

    /// All-zero vector as long as `nodes()`, for "belongs to nothing".
    pub fn zero_vector(&self) -> Vec<f32> {
        vec![0.0; self.nodes().len()]
    }

    /// 1-based sequential label per node in `nodes()` order.
    pub fn label(&self) -> HashMap<T, usize> {
        self.nodes()
            .into_iter()
            .enumerate()
            .map(|(i, node)| (node, i + 1))
            .collect()
    }
}
