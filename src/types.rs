use std::collections::HashMap;
use std::hash::Hash;

/// Bound alias for anything usable as an item: a hashable token with a
/// strict total order. The order is what canonicalizes itemsets, so it must
/// be consistent for the duration of a mining run.
pub trait Item: Clone + Ord + Hash {}
impl<T: Clone + Ord + Hash> Item for T {}

/// 0-based position of a transaction in the input, in encounter order.
pub type TransactionId = usize;

/// A duplicate-free sequence of items, always kept in ascending order.
pub type Itemset<I> = Vec<I>;

pub type ItemsetLength = usize;

pub type ItemsetCounts<I> = HashMap<Itemset<I>, ItemsetCount>;

/// Itemset size -> itemset -> occurrence count. Every itemset present at
/// size k > 1 has all of its (k-1)-subsets present at size k - 1 with a
/// count at least as large (downward closure).
pub type FrequentItemsets<I> = HashMap<ItemsetLength, ItemsetCounts<I>>;

// Items are interned to dense ids before mining. Ids are assigned in
// ascending item order, so id order and item order agree and sorted
// id-itemsets stay sorted after translation back.
pub(crate) type ItemId = usize;
pub(crate) type IdItemset = Vec<ItemId>;
pub(crate) type Transaction = Vec<ItemId>;
pub(crate) type ReverseLookup<I> = HashMap<I, ItemId>;
pub(crate) type Inventory<I> = Vec<I>;

/// Occurrence count of one itemset, optionally paired with the exact set of
/// transaction positions containing it (present only when transaction-id
/// tracking was requested for the run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsetCount {
    pub count: u32,
    pub members: Option<Vec<TransactionId>>,
}

impl ItemsetCount {
    pub fn new(count: u32) -> Self {
        ItemsetCount {
            count,
            members: None,
        }
    }

    /// `members` must be the full, sorted set of positions containing the
    /// itemset; the count is its length.
    pub fn with_members(members: Vec<TransactionId>) -> Self {
        ItemsetCount {
            count: members.len() as u32,
            members: Some(members),
        }
    }
}

impl From<u32> for ItemsetCount {
    fn from(count: u32) -> Self {
        ItemsetCount::new(count)
    }
}
