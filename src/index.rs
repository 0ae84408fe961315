use bitvec::prelude::*;

use crate::types::{ItemId, Transaction, TransactionId};

/// Inverted index over one transaction corpus: item -> ordered posting list
/// of the transaction positions containing it. Built once per mining run and
/// read-only afterwards; support queries intersect posting lists instead of
/// rescanning transactions.
#[derive(Debug)]
pub(crate) struct TransactionIndex {
    postings: Vec<Vec<TransactionId>>,
    num_transactions: usize,
}

impl TransactionIndex {
    /// Transactions are already interned and sorted; positions are their
    /// indices in encounter order, so posting lists come out sorted.
    pub fn new(transactions: &[Transaction], num_items: usize) -> Self {
        let mut postings = vec![Vec::new(); num_items];
        for (tid, transaction) in transactions.iter().enumerate() {
            for &item in transaction {
                postings[item].push(tid);
            }
        }
        TransactionIndex {
            postings,
            num_transactions: transactions.len(),
        }
    }

    pub fn num_transactions(&self) -> usize {
        self.num_transactions
    }

    pub fn item_count(&self, item: ItemId) -> usize {
        self.postings.get(item).map_or(0, Vec::len)
    }

    pub fn item_positions(&self, item: ItemId) -> &[TransactionId] {
        self.postings.get(item).map_or(&[], Vec::as_slice)
    }

    /// The exact set of transaction positions containing every item of the
    /// itemset, by full posting-list intersection. Empty if any item is
    /// unknown to the index.
    pub fn positions(&self, itemset: &[ItemId]) -> Vec<TransactionId> {
        let mut items = itemset.to_vec();
        items.sort_unstable_by_key(|&item| self.item_count(item));

        let mut running = match items.split_first() {
            Some((&first, _)) => self.item_positions(first).to_vec(),
            None => return Vec::new(),
        };
        for &item in &items[1..] {
            running = intersect_sorted(&running, self.item_positions(item));
            if running.is_empty() {
                break;
            }
        }
        running
    }

    /// Threshold query with short-circuit abort. Items are intersected
    /// smallest posting list first (the intersection only shrinks, so this
    /// order minimizes wasted work); after every step the running support
    /// |intersection| / N is checked against `min_support` and the query
    /// aborts as soon as the threshold can no longer be met. `active` masks
    /// out transaction positions the miner has already ruled out.
    ///
    /// Returns the full position set when the threshold is met, `None`
    /// otherwise. An empty index never meets the threshold.
    pub fn positions_above_threshold(
        &self,
        itemset: &[ItemId],
        min_support: f64,
        active: &BitSlice,
    ) -> Option<Vec<TransactionId>> {
        if self.num_transactions == 0 {
            return None;
        }
        let n = self.num_transactions as f64;

        let mut items = itemset.to_vec();
        items.sort_unstable_by_key(|&item| self.item_count(item));

        let (&first, rest) = items.split_first()?;
        let mut running: Vec<TransactionId> = self
            .item_positions(first)
            .iter()
            .copied()
            .filter(|&tid| active[tid])
            .collect();

        if (running.len() as f64 / n) < min_support {
            return None;
        }
        for &item in rest {
            running = intersect_sorted(&running, self.item_positions(item));
            if (running.len() as f64 / n) < min_support {
                return None;
            }
        }
        Some(running)
    }
}

fn intersect_sorted(a: &[TransactionId], b: &[TransactionId]) -> Vec<TransactionId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            i += 1;
        } else if b[j] < a[i] {
            j += 1;
        } else {
            out.push(a[i]);
            i += 1;
            j += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> TransactionIndex {
        // Interned form of the Agrawal et al. example corpus
        // (1, 3, 4), (2, 3, 5), (1, 2, 3, 5), (2, 5) with items 1..=5
        // mapped to ids 0..=4.
        let transactions: Vec<Transaction> = vec![
            vec![0, 2, 3],
            vec![1, 2, 4],
            vec![0, 1, 2, 4],
            vec![1, 4],
        ];
        TransactionIndex::new(&transactions, 5)
    }

    #[test]
    fn posting_lists_are_sorted_positions() {
        let index = sample_index();
        assert_eq!(index.num_transactions(), 4);
        assert_eq!(index.item_positions(0), &[0, 2]);
        assert_eq!(index.item_positions(1), &[1, 2, 3]);
        assert_eq!(index.item_positions(2), &[0, 1, 2]);
        assert_eq!(index.item_positions(3), &[0]);
        assert_eq!(index.item_positions(4), &[1, 2, 3]);
    }

    #[test]
    fn positions_intersects_all_items() {
        let index = sample_index();
        assert_eq!(index.positions(&[1, 4]), vec![1, 2, 3]);
        assert_eq!(index.positions(&[1, 2, 4]), vec![1, 2]);
        assert_eq!(index.positions(&[0, 3]), vec![0]);
        assert_eq!(index.positions(&[3, 4]), Vec::<TransactionId>::new());
    }

    #[test]
    fn positions_of_unknown_item_is_empty() {
        let index = sample_index();
        assert!(index.positions(&[7]).is_empty());
        assert!(index.positions(&[0, 7]).is_empty());
    }

    #[test]
    fn threshold_query_returns_full_positions_when_met() {
        let index = sample_index();
        let active = bitvec![1; 4];
        assert_eq!(
            index.positions_above_threshold(&[1, 4], 3.0 / 4.0, &active),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            index.positions_above_threshold(&[1, 2, 4], 2.0 / 4.0, &active),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn threshold_query_short_circuits_below_threshold() {
        let index = sample_index();
        let active = bitvec![1; 4];
        // Item 3 occurs once, so the very first posting list already rules
        // the candidate out.
        assert_eq!(index.positions_above_threshold(&[2, 3], 0.5, &active), None);
        assert_eq!(index.positions_above_threshold(&[0, 1], 0.5, &active), None);
    }

    #[test]
    fn threshold_query_respects_active_mask() {
        let index = sample_index();
        let mut active = bitvec![1; 4];
        active.set(3, false);
        assert_eq!(
            index.positions_above_threshold(&[1, 4], 0.5, &active),
            Some(vec![1, 2])
        );
        assert_eq!(
            index.positions_above_threshold(&[1, 4], 3.0 / 4.0, &active),
            None
        );
    }

    #[test]
    fn empty_index_never_meets_threshold() {
        let index = TransactionIndex::new(&[], 0);
        let active = bitvec![1; 0];
        assert_eq!(index.positions_above_threshold(&[0], 0.0, &active), None);
        assert_eq!(index.num_transactions(), 0);
    }
}
