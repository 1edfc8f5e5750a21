use std::collections::HashSet;
use std::hash::Hash;

pub mod auth;
pub mod classes;
pub mod levels;
pub mod students;
pub mod subjects;
pub mod teachers;

/// Keeps the first occurrence of every id.
pub(crate) fn dedup_ids<T: Copy + Eq + Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
