use std::fmt;
use std::hash::{Hash, Hasher};

use log::debug;

use crate::combi::apriori_gen;
use crate::error::{validate_min_confidence, Error};
use crate::types::{FrequentItemsets, Item, Itemset};

/// An implication rule `lhs -> rhs` between two disjoint itemsets, carrying
/// the counts needed to derive its statistics.
///
/// Identity is the (lhs, rhs) pair only; the count fields do not take part
/// in equality or hashing.
#[derive(Debug, Clone)]
pub struct Rule<I> {
    pub lhs: Itemset<I>,
    pub rhs: Itemset<I>,
    pub count_full: u32,
    pub count_lhs: u32,
    pub count_rhs: u32,
    pub num_transactions: usize,
}

impl<I> Rule<I> {
    pub fn new(
        lhs: Itemset<I>,
        rhs: Itemset<I>,
        count_full: u32,
        count_lhs: u32,
        count_rhs: u32,
        num_transactions: usize,
    ) -> Self {
        Rule {
            lhs,
            rhs,
            count_full,
            count_lhs,
            count_rhs,
            num_transactions,
        }
    }

    /// P(rhs | lhs). `None` when the antecedent count is zero.
    pub fn confidence(&self) -> Option<f64> {
        if self.count_lhs == 0 {
            return None;
        }
        Some(f64::from(self.count_full) / f64::from(self.count_lhs))
    }

    /// P(lhs and rhs). `None` when the corpus is empty.
    pub fn support(&self) -> Option<f64> {
        if self.num_transactions == 0 {
            return None;
        }
        Some(f64::from(self.count_full) / self.num_transactions as f64)
    }

    /// Ratio of the observed support to the support expected if lhs and rhs
    /// were independent. `None` when the expected support is zero.
    pub fn lift(&self) -> Option<f64> {
        let observed = self.support()?;
        let n = self.num_transactions as f64;
        let expected = (f64::from(self.count_lhs) / n) * (f64::from(self.count_rhs) / n);
        if expected == 0.0 {
            return None;
        }
        Some(observed / expected)
    }

    /// Ratio of the expected to the observed frequency of the rule being
    /// violated. `None` when confidence is 1 (the rule is never violated).
    pub fn conviction(&self) -> Option<f64> {
        let confidence = self.confidence()?;
        if confidence == 1.0 || self.num_transactions == 0 {
            return None;
        }
        let support_rhs = f64::from(self.count_rhs) / self.num_transactions as f64;
        Some((1.0 - support_rhs) / (1.0 - confidence))
    }
}

impl<I: PartialEq> PartialEq for Rule<I> {
    fn eq(&self, other: &Self) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl<I: Eq> Eq for Rule<I> {}

impl<I: Hash> Hash for Rule<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lhs.hash(state);
        self.rhs.hash(state);
    }
}

impl<I: fmt::Display> fmt::Display for Rule<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_items(f, &self.lhs)?;
        write!(f, " -> ")?;
        fmt_items(f, &self.rhs)?;
        let nan = f64::NAN;
        write!(
            f,
            " (conf: {:.3}, supp: {:.3}, lift: {:.3})",
            self.confidence().unwrap_or(nan),
            self.support().unwrap_or(nan),
            self.lift().unwrap_or(nan),
        )
    }
}

fn fmt_items<I: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[I]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "}}")
}

/// Generate every rule with confidence at or above `min_confidence` from the
/// frequent itemsets, without duplicates.
///
/// For each itemset the consequents are grown bottom-up, one item at a time,
/// reusing the miner's join/prune candidate generation on the consequent
/// fragments. A fragment whose rule fails the confidence bar is dropped from
/// further growth: confidence against any superset consequent is bounded
/// above by it, so nothing is lost.
///
/// Output order is deterministic: itemset size ascending, itemsets in sorted
/// order within a size, then traversal order.
///
/// `itemsets` must be downward closed (as produced by
/// [`itemsets_from_transactions`](crate::itemsets_from_transactions)): the
/// counts of all subsets of an itemset are looked up directly.
pub fn generate_rules_apriori<I: Item>(
    itemsets: &FrequentItemsets<I>,
    min_confidence: f64,
    num_transactions: usize,
) -> Result<Vec<Rule<I>>, Error> {
    validate_min_confidence(min_confidence)?;

    let count_of = |itemset: &[I]| itemsets[&itemset.len()][itemset].count;

    let mut sizes: Vec<usize> = itemsets.keys().copied().filter(|&size| size > 1).collect();
    sizes.sort_unstable();

    let mut rules: Vec<Rule<I>> = Vec::new();
    for size in sizes {
        let mut level: Vec<&Itemset<I>> = itemsets[&size].keys().collect();
        level.sort_unstable();

        for itemset in level {
            let count_full = count_of(itemset);

            // Single-item consequents.
            for i in 0..itemset.len() {
                let mut lhs = itemset.clone();
                let rhs = vec![lhs.remove(i)];
                let count_lhs = count_of(&lhs);
                if count_lhs == 0 {
                    continue;
                }
                if f64::from(count_full) / f64::from(count_lhs) >= min_confidence {
                    let count_rhs = count_of(&rhs);
                    rules.push(Rule::new(
                        lhs,
                        rhs,
                        count_full,
                        count_lhs,
                        count_rhs,
                        num_transactions,
                    ));
                }
            }

            // Grow consequents one item at a time. Every single item seeds
            // the working set, whether or not its one-item rule passed.
            // The recursion of the textbook formulation becomes an explicit
            // work list so deep itemsets cannot exhaust the call stack.
            let seeds: Vec<Itemset<I>> = itemset.iter().map(|item| vec![item.clone()]).collect();
            let mut pending: Vec<Vec<Itemset<I>>> = vec![seeds];

            while let Some(fragments) = pending.pop() {
                // The next consequent would leave no antecedent.
                if itemset.len() <= fragments[0].len() + 1 {
                    continue;
                }

                let mut kept: Vec<Itemset<I>> = Vec::new();
                for rhs in apriori_gen(&fragments) {
                    let lhs = sorted_difference(itemset, &rhs);
                    let count_lhs = count_of(&lhs);
                    if count_lhs == 0 {
                        continue;
                    }
                    if f64::from(count_full) / f64::from(count_lhs) >= min_confidence {
                        let count_rhs = count_of(&rhs);
                        rules.push(Rule::new(
                            lhs,
                            rhs.clone(),
                            count_full,
                            count_lhs,
                            count_rhs,
                            num_transactions,
                        ));
                        kept.push(rhs);
                    }
                }
                if !kept.is_empty() {
                    pending.push(kept);
                }
            }
        }
    }

    debug!("generated {} rules", rules.len());
    Ok(rules)
}

/// Elements of the sorted `itemset` not present in the sorted `remove`.
fn sorted_difference<I: Item>(itemset: &[I], remove: &[I]) -> Itemset<I> {
    let mut out = Vec::with_capacity(itemset.len() - remove.len());
    let mut j = 0;
    for item in itemset {
        if j < remove.len() && item == &remove[j] {
            j += 1;
        } else {
            out.push(item.clone());
        }
    }
    out
}

/// Naive top-down reference generator: starting from the full itemset as
/// antecedent, recursively remove one item at a time and test every split.
/// Distinct recursion paths revisit the same split, so results are
/// deduplicated through an explicit seen-set. Slower than the bottom-up
/// generator; kept only to cross-check it.
#[cfg(test)]
pub(crate) fn generate_rules_naive<I: Item>(
    itemsets: &FrequentItemsets<I>,
    min_confidence: f64,
    num_transactions: usize,
) -> Vec<Rule<I>> {
    use std::collections::HashSet;

    let mut seen: HashSet<(Itemset<I>, Itemset<I>)> = HashSet::new();
    let mut rules: Vec<Rule<I>> = Vec::new();

    let mut sizes: Vec<usize> = itemsets.keys().copied().filter(|&size| size > 1).collect();
    sizes.sort_unstable();

    for size in sizes {
        let mut level: Vec<&Itemset<I>> = itemsets[&size].keys().collect();
        level.sort_unstable();
        for itemset in level {
            genrules_naive(
                itemset,
                itemset,
                itemsets,
                min_confidence,
                num_transactions,
                &mut seen,
                &mut rules,
            );
        }
    }

    rules
}

#[cfg(test)]
fn genrules_naive<I: Item>(
    itemset: &[I],
    antecedent: &[I],
    itemsets: &FrequentItemsets<I>,
    min_confidence: f64,
    num_transactions: usize,
    seen: &mut std::collections::HashSet<(Itemset<I>, Itemset<I>)>,
    rules: &mut Vec<Rule<I>>,
) {
    use itertools::Itertools;

    let count_of = |s: &[I]| itemsets[&s.len()][s].count;
    let count_full = count_of(itemset);

    for combi in antecedent.iter().combinations(antecedent.len() - 1) {
        let lhs: Itemset<I> = combi.into_iter().cloned().collect();
        let count_lhs = count_of(&lhs);
        if count_lhs == 0 {
            continue;
        }
        if f64::from(count_full) / f64::from(count_lhs) >= min_confidence {
            let rhs = sorted_difference(itemset, &lhs);
            let count_rhs = count_of(&rhs);
            if seen.insert((lhs.clone(), rhs.clone())) {
                rules.push(Rule::new(
                    lhs.clone(),
                    rhs,
                    count_full,
                    count_lhs,
                    count_rhs,
                    num_transactions,
                ));
            }
            if lhs.len() > 1 {
                genrules_naive(
                    itemset,
                    &lhs,
                    itemsets,
                    min_confidence,
                    num_transactions,
                    seen,
                    rules,
                );
            }
        }
    }
}
