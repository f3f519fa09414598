//! Exported dataset form of a graph: combine logic and JSON interop.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::hash::Hash;
use std::path::Path;

use super::RelationGraph;
use crate::error::Result;
use crate::identity::{Equality, IdentityIndex};

/// Ordered `(source, targets)` pairs. Serializes as `[[source, [targets...]], ...]`.
pub type Dataset<T> = Vec<(T, Vec<T>)>;

/// Key-wise union of two datasets. Sources keep first-seen order; target
/// lists are concatenated and deduplicated under `equality`.
pub fn combine<T>(a: Dataset<T>, b: Dataset<T>, equality: &Equality<T>) -> Dataset<T>
where
    T: Clone + Eq + Hash,
{
    let (len_a, len_b) = (a.len(), b.len());
    let mut index: IdentityIndex<T, Vec<T>> = IdentityIndex::new(equality.clone());
    for (source, targets) in a.into_iter().chain(b) {
        let relation = index.get_or_insert_with(source, Vec::new);
        equality.extend_unique(relation, targets);
    }
    log::trace!("combine: {} + {} -> {} sources", len_a, len_b, index.len());
    index.into_entries()
}

pub fn to_json<T: Serialize>(dataset: &Dataset<T>) -> Result<String> {
    Ok(serde_json::to_string(dataset)?)
}

pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<Dataset<T>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a dataset from a JSON file.
pub fn load_dataset<T, P>(path: P) -> Result<Dataset<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let content = std::fs::read_to_string(path.as_ref())?;
    let dataset: Dataset<T> = from_json(&content)?;
    log::debug!(
        "Loaded dataset with {} sources from {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Write a dataset to a JSON file (pretty printed).
pub fn save_dataset<T, P>(path: P, dataset: &Dataset<T>) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let content = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path.as_ref(), content)?;
    log::debug!(
        "Saved dataset with {} sources to {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(())
}

impl<T> RelationGraph<T>
where
    T: Clone + Eq + Hash,
{
    pub fn to_json(&self) -> Result<String>
    where
        T: Serialize,
    {
        to_json(&self.dataset())
    }

    pub fn from_json(json: &str, equality: Equality<T>) -> Result<Self>
    where
        T: DeserializeOwned,
    {
        Ok(Self::with_dataset(from_json(json)?, equality))
    }
}
