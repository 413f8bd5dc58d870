//! Per-run place id deduplication.

use leadgrid_store::Record;
use std::collections::HashSet;

/// Classification of a place id offered to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting and not yet stored
    Accept,
    /// Already seen earlier in this run
    DuplicateInRun,
    /// First sighting in this run, but the list already holds it
    DuplicateInStore,
}

/// Tracks which place ids a run has seen and which the target list holds.
///
/// `known` is fixed when the run starts; `seen` grows with every first
/// sighting, whether or not that sighting is accepted.
#[derive(Debug, Default)]
pub struct DeduplicationLedger {
    known: HashSet<String>,
    seen: HashSet<String>,
    accepted: usize,
    duplicates_in_run: usize,
    duplicates_in_store: usize,
}

impl DeduplicationLedger {
    /// Ledger seeded with ids already present in the list.
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: known.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Ledger seeded from stored records.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        Self::new(records.iter().map(|r| r.place_id.as_str()))
    }

    /// Classify `place_id`, recording it as seen.
    pub fn admit(&mut self, place_id: &str) -> Admission {
        if !self.seen.insert(place_id.to_string()) {
            self.duplicates_in_run += 1;
            return Admission::DuplicateInRun;
        }
        if self.known.contains(place_id) {
            self.duplicates_in_store += 1;
            return Admission::DuplicateInStore;
        }
        self.accepted += 1;
        Admission::Accept
    }

    /// Number of ids the list held when the run started.
    #[must_use]
    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Ids accepted so far.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Repeat sightings within this run.
    #[must_use]
    pub fn duplicates_in_run(&self) -> usize {
        self.duplicates_in_run
    }

    /// First sightings rejected because the list already holds them.
    #[must_use]
    pub fn duplicates_in_store(&self) -> usize {
        self.duplicates_in_store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_classes() {
        let mut ledger = DeduplicationLedger::new(["stored"]);

        assert_eq!(ledger.admit("fresh"), Admission::Accept);
        assert_eq!(ledger.admit("fresh"), Admission::DuplicateInRun);
        assert_eq!(ledger.admit("stored"), Admission::DuplicateInStore);
        // A second sighting of a stored id counts as a run duplicate.
        assert_eq!(ledger.admit("stored"), Admission::DuplicateInRun);

        assert_eq!(ledger.accepted(), 1);
        assert_eq!(ledger.duplicates_in_run(), 2);
        assert_eq!(ledger.duplicates_in_store(), 1);
        assert_eq!(ledger.known_len(), 1);
    }

    #[test]
    fn test_from_records() {
        use leadgrid_core::PlaceId;

        let records = vec![
            Record::new(PlaceId::new("a").expect("valid id"), "A"),
            Record::new(PlaceId::new("b").expect("valid id"), "B"),
        ];
        let mut ledger = DeduplicationLedger::from_records(&records);
        assert_eq!(ledger.known_len(), 2);
        assert_eq!(ledger.admit("b"), Admission::DuplicateInStore);
        assert_eq!(ledger.admit("c"), Admission::Accept);
    }

    #[test]
    fn test_empty_ledger_accepts_everything_once() {
        let mut ledger = DeduplicationLedger::default();
        for id in ["x", "y", "z"] {
            assert_eq!(ledger.admit(id), Admission::Accept);
        }
        assert_eq!(ledger.accepted(), 3);
        assert_eq!(ledger.duplicates_in_run(), 0);
    }
}
