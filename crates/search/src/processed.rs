//! Set of every movie id touched during one search run.

use std::collections::HashSet;

use catalog::MovieId;

/// Insertion-ordered set of touched movie ids.
///
/// Only grows. Discovery order is kept so paginated reads of the explored
/// set are stable between calls.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    order: Vec<MovieId>,
    seen: HashSet<MovieId>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not present yet
    pub fn insert(&mut self, id: MovieId) -> bool {
        if self.seen.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[MovieId] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<MovieId> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_insertion_order() {
        let mut set = ProcessedSet::new();
        assert!(set.insert(5));
        assert!(set.insert(1));
        assert!(!set.insert(5));

        assert_eq!(set.as_slice(), &[5, 1]);
        assert!(set.contains(1));
        assert_eq!(set.len(), 2);
    }
}
