//! Frequent itemset mining and association rule generation over collections
//! of transactions, for market-basket-style pattern discovery.
//!
//! Items can be any hashable, totally ordered tokens. Transactions are
//! indexed once into per-item posting lists; frequent itemsets are then
//! mined level-wise with join/prune candidate generation and short-circuit
//! support counting, and implication rules are derived from them with
//! confidence-monotonicity pruning.
//!
//! ```
//! use basketmine::apriori;
//!
//! let transactions = vec![
//!     vec!["eggs", "bacon", "soup"],
//!     vec!["eggs", "bacon", "apple"],
//!     vec!["soup", "bacon", "banana"],
//! ];
//! let (itemsets, rules, _) = apriori(transactions, 0.5, 1.0, 8, false).unwrap();
//!
//! assert_eq!(itemsets[&2].len(), 2);
//! let formatted: Vec<String> = rules.iter().map(|rule| rule.to_string()).collect();
//! assert_eq!(
//!     formatted,
//!     vec![
//!         "{eggs} -> {bacon} (conf: 1.000, supp: 0.667, lift: 1.000)",
//!         "{soup} -> {bacon} (conf: 1.000, supp: 0.667, lift: 1.000)",
//!     ]
//! );
//! ```

mod combi;
mod error;
mod index;
mod itemsets;
mod rules;
mod types;

pub use crate::error::Error;
pub use crate::itemsets::itemsets_from_transactions;
pub use crate::rules::{generate_rules_apriori, Rule};
pub use crate::types::{
    FrequentItemsets, Item, Itemset, ItemsetCount, ItemsetCounts, ItemsetLength, TransactionId,
};

use crate::error::{validate_min_confidence, validate_min_support};

/// The classic apriori algorithm: mine frequent itemsets, then derive the
/// rules between them.
///
/// `min_support` and `min_confidence` are fractions in `[0, 1]`;
/// `max_length` bounds the itemset size considered. Both parameters are
/// validated before any transaction is scanned. With
/// `output_transaction_ids` set, every frequent itemset also carries the
/// positions of the transactions containing it.
///
/// Returns the frequent itemsets, the rules derived from them, and the
/// number of transactions scanned.
pub fn apriori<I, T, R>(
    transactions: T,
    min_support: f64,
    min_confidence: f64,
    max_length: usize,
    output_transaction_ids: bool,
) -> Result<(FrequentItemsets<I>, Vec<Rule<I>>, usize), Error>
where
    I: Item,
    T: IntoIterator<Item = R>,
    R: IntoIterator<Item = I>,
{
    validate_min_support(min_support)?;
    validate_min_confidence(min_confidence)?;

    let (itemsets, num_transactions) =
        itemsets_from_transactions(transactions, min_support, max_length, output_transaction_ids)?;
    let rules = generate_rules_apriori(&itemsets, min_confidence, num_transactions)?;
    Ok((itemsets, rules, num_transactions))
}
