// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, insertion-ordered set of message ids already handled.

use std::collections::{HashSet, VecDeque};

use kidfax_core::MessageId;

/// The Seen-Set: ids that were printed or deliberately skipped.
///
/// Holds at most `max_entries` ids. Appending past the bound evicts the
/// oldest ids first, and the membership index is updated in the same call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenLedger {
    order: VecDeque<MessageId>,
    index: HashSet<MessageId>,
    max_entries: usize,
}

impl SeenLedger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            order: VecDeque::new(),
            index: HashSet::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Builds a ledger from ids listed oldest first, keeping the newest
    /// `max_entries` of them. Duplicates keep their first position.
    pub fn from_ids<I>(ids: I, max_entries: usize) -> Self
    where
        I: IntoIterator<Item = MessageId>,
    {
        let mut ledger = Self::new(max_entries);
        for id in ids {
            ledger.append(id);
        }
        ledger
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.index.contains(id)
    }

    /// Records `id` and returns whatever was evicted to stay within bounds.
    ///
    /// Appending an id that is already present does nothing.
    pub fn append(&mut self, id: MessageId) -> Vec<MessageId> {
        if self.index.contains(&id) {
            return Vec::new();
        }
        self.index.insert(id.clone());
        self.order.push_back(id);

        let mut evicted = Vec::new();
        while self.order.len() > self.max_entries {
            if let Some(oldest) = self.order.pop_front() {
                self.index.remove(&oldest);
                evicted.push(oldest);
            }
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Ids oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MessageId> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(ledger: &SeenLedger) -> Vec<&str> {
        ledger.iter().map(MessageId::as_str).collect()
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut ledger = SeenLedger::from_ids(["a", "b", "c"].map(MessageId::from), 3);
        let evicted = ledger.append(MessageId::from("d"));
        assert_eq!(evicted, vec![MessageId::from("a")]);
        assert_eq!(ids(&ledger), vec!["b", "c", "d"]);
        assert!(!ledger.contains(&MessageId::from("a")));
        assert!(ledger.contains(&MessageId::from("d")));
    }

    #[test]
    fn duplicate_append_is_ignored() {
        let mut ledger = SeenLedger::new(3);
        ledger.append(MessageId::from("a"));
        ledger.append(MessageId::from("b"));
        assert!(ledger.append(MessageId::from("a")).is_empty());
        assert_eq!(ids(&ledger), vec!["a", "b"]);
    }

    #[test]
    fn from_ids_keeps_newest() {
        let ledger = SeenLedger::from_ids(
            ["1", "2", "3", "4", "5"].map(MessageId::from),
            2,
        );
        assert_eq!(ids(&ledger), vec!["4", "5"]);
    }

    #[test]
    fn zero_bound_is_clamped() {
        let mut ledger = SeenLedger::new(0);
        ledger.append(MessageId::from("x"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.max_entries(), 1);
    }

    proptest! {
        #[test]
        fn bound_and_index_hold(
            max in 1usize..20,
            appends in proptest::collection::vec("[a-z]{1,2}", 0..80),
        ) {
            let mut ledger = SeenLedger::new(max);
            let mut model: Vec<String> = Vec::new();

            for raw in appends {
                let before = ledger.len();
                let evicted = ledger.append(MessageId(raw.clone()));

                if model.contains(&raw) {
                    prop_assert!(evicted.is_empty());
                    prop_assert_eq!(ledger.len(), before);
                } else {
                    model.push(raw);
                    let surplus = model.len().saturating_sub(max);
                    let expected: Vec<String> = model.drain(..surplus).collect();
                    let got: Vec<String> = evicted.into_iter().map(|id| id.0).collect();
                    prop_assert_eq!(got, expected);
                }

                prop_assert!(ledger.len() <= max);
                prop_assert_eq!(ledger.index.len(), ledger.order.len());
                let seq: Vec<String> = ledger.iter().map(|id| id.0.clone()).collect();
                prop_assert_eq!(&seq, &model);
                for id in ledger.iter() {
                    prop_assert!(ledger.contains(id));
                }
            }
        }
    }
}
