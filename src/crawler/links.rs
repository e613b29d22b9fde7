//! Link graph recording
//!
//! Edges are checked and inserted one by one. A failed insert is counted and
//! logged; the rest of the batch still goes through.

use crate::storage::Storage;
use chrono::{DateTime, Utc};

/// Outcome of one [`save_link_relations`] batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSaveOutcome {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl LinkSaveOutcome {
    pub fn total(&self) -> usize {
        self.created + self.existing + self.failed
    }
}

/// Records edges from `source_id` to every id in `target_ids`
pub fn save_link_relations(
    storage: &mut dyn Storage,
    source_id: i64,
    target_ids: &[i64],
    now: DateTime<Utc>,
) -> LinkSaveOutcome {
    let mut outcome = LinkSaveOutcome::default();

    for &target_id in target_ids {
        let result = storage.link_exists(source_id, target_id).and_then(|exists| {
            if exists {
                Ok(false)
            } else {
                storage.insert_link(source_id, target_id, now).map(|_| true)
            }
        });

        match result {
            Ok(true) => outcome.created += 1,
            Ok(false) => outcome.existing += 1,
            Err(e) => {
                tracing::warn!(
                    "Failed to save link {} -> {}: {}",
                    source_id,
                    target_id,
                    e
                );
                outcome.failed += 1;
            }
        }
    }

    if outcome.total() > 0 {
        tracing::info!(
            "Link relations for document {}: {} created, {} existing, {} failed",
            source_id,
            outcome.created,
            outcome.existing,
            outcome.failed
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn documents(storage: &mut SqliteStorage, n: usize) -> Vec<i64> {
        (0..n)
            .map(|i| {
                storage
                    .insert_placeholder_document(&format!("https://example.com/{}", i), now())
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_saving_twice_yields_one_edge() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let ids = documents(&mut storage, 2);

        let first = save_link_relations(&mut storage, ids[0], &[ids[1]], now());
        assert_eq!(first.created, 1);

        let second = save_link_relations(&mut storage, ids[0], &[ids[1]], now());
        assert_eq!(second.created, 0);
        assert_eq!(second.existing, 1);
        assert_eq!(storage.count_links().unwrap(), 1);
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let ids = documents(&mut storage, 3);

        // 9999 violates the foreign key
        let outcome = save_link_relations(&mut storage, ids[0], &[ids[1], 9999, ids[2]], now());
        assert_eq!(
            outcome,
            LinkSaveOutcome {
                created: 2,
                existing: 0,
                failed: 1
            }
        );
        assert_eq!(storage.get_outgoing_links(ids[0]).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_targets_in_one_batch() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let ids = documents(&mut storage, 2);

        let outcome = save_link_relations(&mut storage, ids[0], &[ids[1], ids[1]], now());
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.existing, 1);
    }

    #[test]
    fn test_empty_batch() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let outcome = save_link_relations(&mut storage, 1, &[], now());
        assert_eq!(outcome.total(), 0);
    }
}
