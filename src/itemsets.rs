use std::collections::{BTreeSet, HashMap};

use bitvec::prelude::*;
use log::debug;
use rayon::prelude::*;

use crate::combi::apriori_gen;
use crate::error::{validate_min_support, Error};
use crate::index::TransactionIndex;
use crate::types::{
    FrequentItemsets, IdItemset, Inventory, Item, ItemsetCount, ItemsetLength, ReverseLookup,
    Transaction, TransactionId,
};

/// How support is recorded per itemset: a plain count, or the count plus the
/// exact member transaction positions. Selected once per run so the
/// level-wise loop is not duplicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountStrategy {
    Plain,
    TrackIds,
}

impl CountStrategy {
    fn record(self, positions: Vec<TransactionId>) -> ItemsetCount {
        match self {
            CountStrategy::Plain => ItemsetCount::new(positions.len() as u32),
            CountStrategy::TrackIds => ItemsetCount::with_members(positions),
        }
    }

    fn record_posting(self, posting: &[TransactionId]) -> ItemsetCount {
        match self {
            CountStrategy::Plain => ItemsetCount::new(posting.len() as u32),
            CountStrategy::TrackIds => ItemsetCount::with_members(posting.to_vec()),
        }
    }
}

/// Compute frequent itemsets level-wise, building itemsets of increasing
/// size by join/prune candidate generation and counting their support
/// against an inverted index over the transactions.
///
/// Returns the mapping from itemset size to frequent itemsets of that size
/// with their counts, plus the number of transactions scanned. Duplicate
/// items within a transaction count once. Empty input is not an error: it
/// yields an empty mapping and a transaction count of 0. When
/// `output_transaction_ids` is set, every itemset additionally carries the
/// exact set of transaction positions containing it.
pub fn itemsets_from_transactions<I, T, R>(
    transactions: T,
    min_support: f64,
    max_length: usize,
    output_transaction_ids: bool,
) -> Result<(FrequentItemsets<I>, usize), Error>
where
    I: Item,
    T: IntoIterator<Item = R>,
    R: IntoIterator<Item = I>,
{
    validate_min_support(min_support)?;
    if max_length < 1 {
        return Err(Error::MaxLengthZero);
    }
    let strategy = if output_transaction_ids {
        CountStrategy::TrackIds
    } else {
        CountStrategy::Plain
    };

    let (rows, inventory) = normalize(transactions);
    if rows.is_empty() {
        return Ok((HashMap::new(), 0));
    }

    let index = TransactionIndex::new(&rows, inventory.len());
    drop(rows);
    let num_transactions = index.num_transactions();
    let n = num_transactions as f64;

    // Level 1: singleton support is just the posting-list length.
    debug!("counting itemsets of length 1");
    let level_1: HashMap<IdItemset, ItemsetCount> = (0..inventory.len())
        .filter(|&item| (index.item_count(item) as f64 / n) >= min_support)
        .map(|item| (vec![item], strategy.record_posting(index.item_positions(item))))
        .collect();
    debug!("found {} large itemsets of length 1", level_1.len());

    if level_1.is_empty() {
        return Ok((HashMap::new(), num_transactions));
    }

    let mut levels: HashMap<ItemsetLength, HashMap<IdItemset, ItemsetCount>> = HashMap::new();
    levels.insert(1, level_1);

    // Row-activity mask, scoped to this run: a transaction that contained no
    // frequent itemset of the previous size cannot contain a larger one, so
    // its position is dropped from future posting intersections.
    let mut active = bitvec![1; num_transactions];

    for size in 2..=max_length {
        debug!("counting itemsets of length {}", size);

        // The previous level must be sorted to maintain the join/prune
        // invariant.
        let mut previous: Vec<IdItemset> = levels[&(size - 1)].keys().cloned().collect();
        previous.sort_unstable();

        let candidates = apriori_gen(&previous);
        debug!(
            "found {} candidate itemsets of length {}",
            candidates.len(),
            size
        );
        if candidates.is_empty() {
            break;
        }

        // Candidate counting is independent per candidate. The collect
        // preserves candidate order, so the outcome is deterministic.
        let counted: Vec<(IdItemset, Vec<TransactionId>)> = candidates
            .into_par_iter()
            .filter_map(|candidate| {
                let positions =
                    index.positions_above_threshold(&candidate, min_support, &active)?;
                // Member positions must be the full set, so transaction-id
                // mode takes them from the exact intersection.
                let positions = match strategy {
                    CountStrategy::Plain => positions,
                    CountStrategy::TrackIds => index.positions(&candidate),
                };
                Some((candidate, positions))
            })
            .collect();
        if counted.is_empty() {
            break;
        }

        let mut next_active = bitvec![0; num_transactions];
        let level: HashMap<IdItemset, ItemsetCount> = counted
            .into_iter()
            .map(|(candidate, positions)| {
                for &tid in &positions {
                    next_active.set(tid, true);
                }
                (candidate, strategy.record(positions))
            })
            .collect();
        active = next_active;

        debug!("found {} large itemsets of length {}", level.len(), size);
        levels.insert(size, level);
    }

    Ok((externalize(levels, &inventory), num_transactions))
}

/// Normalize any nested-iterable transaction source into interned, sorted,
/// duplicate-free rows plus the inventory translating ids back to items.
/// Ids are handed out in ascending item order, so itemsets sorted by id are
/// also sorted by item.
fn normalize<I, T, R>(transactions: T) -> (Vec<Transaction>, Inventory<I>)
where
    I: Item,
    T: IntoIterator<Item = R>,
    R: IntoIterator<Item = I>,
{
    let rows: Vec<BTreeSet<I>> = transactions
        .into_iter()
        .map(|transaction| transaction.into_iter().collect())
        .collect();

    let unique: BTreeSet<&I> = rows.iter().flatten().collect();
    let inventory: Inventory<I> = unique.into_iter().cloned().collect();
    let reverse: ReverseLookup<I> = inventory
        .iter()
        .enumerate()
        .map(|(id, item)| (item.clone(), id))
        .collect();

    let interned = rows
        .iter()
        .map(|row| row.iter().map(|item| reverse[item]).collect())
        .collect();

    (interned, inventory)
}

fn externalize<I: Item>(
    levels: HashMap<ItemsetLength, HashMap<IdItemset, ItemsetCount>>,
    inventory: &[I],
) -> FrequentItemsets<I> {
    levels
        .into_iter()
        .map(|(size, itemset_counts)| {
            let translated = itemset_counts
                .into_iter()
                .map(|(itemset, count)| {
                    let itemset: Vec<I> =
                        itemset.into_iter().map(|id| inventory[id].clone()).collect();
                    (itemset, count)
                })
                .collect();
            (size, translated)
        })
        .collect()
}

/// Brute-force reference miner: enumerate every combination of unique items
/// up to `max_length` and count it by scanning all transactions. Kept only
/// as a correctness oracle for the level-wise miner.
#[cfg(test)]
pub(crate) fn itemsets_from_transactions_naive<I: Item>(
    transactions: &[Vec<I>],
    min_support: f64,
    max_length: usize,
) -> FrequentItemsets<I> {
    use itertools::Itertools;

    let n = transactions.len() as f64;
    let rows: Vec<BTreeSet<&I>> = transactions
        .iter()
        .map(|transaction| transaction.iter().collect())
        .collect();
    let unique: BTreeSet<&I> = rows.iter().flatten().copied().collect();

    let mut out: FrequentItemsets<I> = HashMap::new();
    for size in 1..=max_length.min(unique.len()) {
        let mut level = HashMap::new();
        for combi in unique.iter().combinations(size) {
            let count = rows
                .iter()
                .filter(|row| combi.iter().all(|item| row.contains(*item)))
                .count();
            if n > 0.0 && (count as f64 / n) >= min_support {
                let itemset: Vec<I> = combi.into_iter().map(|item| (*item).clone()).collect();
                level.insert(itemset, ItemsetCount::new(count as u32));
            }
        }
        if level.is_empty() {
            break;
        }
        out.insert(size, level);
    }
    out
}
