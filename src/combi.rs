use std::collections::HashSet;
use std::hash::Hash;

use itertools::Itertools;

/// Join k-length itemsets into (k + 1)-length candidate itemsets.
///
/// The input list and the itemsets themselves must be sorted. Itemsets
/// sharing the same first k - 1 items are contiguous in the sorted list, so
/// instead of comparing all n^2 pairs the scan only pairs tail items within
/// each same-prefix block, skipping past a block once it has been consumed.
pub(crate) fn join_step<T>(itemsets: &[Vec<T>]) -> Vec<Vec<T>>
where
    T: Ord + Clone,
{
    let mut candidates: Vec<Vec<T>> = Vec::new();

    let mut i = 0;
    while i < itemsets.len() {
        // The number of rows to skip past once this prefix block is done.
        let mut skip = 1;

        let (first, last) = itemsets[i].split_at(itemsets[i].len() - 1);

        // Collect the tail item of every subsequent itemset with the same
        // first k - 1 items.
        let mut tail_items: Vec<&T> = vec![&last[0]];

        for itemset_n in &itemsets[i + 1..] {
            let (first_n, last_n) = itemset_n.split_at(itemset_n.len() - 1);

            if first == first_n {
                tail_items.push(&last_n[0]);
                skip += 1;
            } else {
                break;
            }
        }

        // Every 2-combination of tail items yields a sorted candidate.
        for combi in tail_items.iter().combinations(2).sorted() {
            let mut candidate: Vec<T> = Vec::with_capacity(first.len() + 2);
            candidate.extend_from_slice(first);
            candidate.push((*combi[0]).clone());
            candidate.push((*combi[1]).clone());
            candidates.push(candidate);
        }

        i += skip;
    }

    candidates
}

/// Prune candidates that have an infrequent (k - 1)-subset.
///
/// Removing either of the last two items is skipped: those subsets are
/// present by construction of `join_step`. If any other single-item removal
/// is not among the frequent itemsets, the candidate cannot be frequent
/// (downward closure) and is dropped.
pub(crate) fn prune_step<T>(itemsets: &[Vec<T>], candidates: Vec<Vec<T>>) -> Vec<Vec<T>>
where
    T: Ord + Clone + Hash,
{
    let frequent: HashSet<&[T]> = itemsets.iter().map(|itemset| itemset.as_slice()).collect();

    candidates
        .into_iter()
        .filter(|candidate| {
            (0..candidate.len().saturating_sub(2)).all(|i| {
                let mut reduced = candidate.clone();
                reduced.remove(i);
                frequent.contains(reduced.as_slice())
            })
        })
        .collect()
}

/// Compute all (k + 1)-length candidate supersets of the given k-length
/// frequent itemsets: join, then prune by downward closure.
pub(crate) fn apriori_gen<T>(itemsets: &[Vec<T>]) -> Vec<Vec<T>>
where
    T: Ord + Clone + Hash,
{
    let possible_extensions = join_step(itemsets);
    prune_step(itemsets, possible_extensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_step() {
        // The example from the 1994 paper by Agrawal et al.
        let itemsets: Vec<Vec<u32>> = vec![
            vec![1, 2, 3],
            vec![1, 2, 4],
            vec![1, 3, 4],
            vec![1, 3, 5],
            vec![2, 3, 4],
        ];
        let joined = join_step(&itemsets);
        assert_eq!(joined, vec![vec![1, 2, 3, 4], vec![1, 3, 4, 5]]);
    }

    #[test]
    fn test_join_step_singletons() {
        let itemsets: Vec<Vec<u32>> = vec![vec![1], vec![2], vec![4]];
        let joined = join_step(&itemsets);
        assert_eq!(joined, vec![vec![1, 2], vec![1, 4], vec![2, 4]]);
    }

    #[test]
    fn test_join_step_empty() {
        let itemsets: Vec<Vec<u32>> = vec![];
        assert!(join_step(&itemsets).is_empty());
    }

    #[test]
    fn test_prune_step() {
        let itemsets: Vec<Vec<&str>> = vec![
            vec!["a", "b", "c"],
            vec!["a", "b", "d"],
            vec!["a", "c", "d"],
            vec!["b", "c", "d"],
        ];
        let possible = join_step(&itemsets);
        let pruned = prune_step(&itemsets, possible);
        assert_eq!(pruned, vec![vec!["a", "b", "c", "d"]]);
    }

    #[test]
    fn test_apriori_gen() {
        // Same input as test_join_step: (1, 3, 4, 5) survives the join but
        // is pruned because (1, 4, 5) is not frequent.
        let itemsets: Vec<Vec<u32>> = vec![
            vec![1, 2, 3],
            vec![1, 2, 4],
            vec![1, 3, 4],
            vec![1, 3, 5],
            vec![2, 3, 4],
        ];
        let candidates = apriori_gen(&itemsets);
        assert_eq!(candidates, vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn test_apriori_gen_pairs() {
        let itemsets: Vec<Vec<u32>> = vec![vec![1, 2], vec![1, 3], vec![1, 4], vec![3, 4]];
        let candidates = apriori_gen(&itemsets);
        // (1, 2, 3) and (1, 2, 4) are pruned: (2, 3) and (2, 4) are not
        // frequent.
        assert_eq!(candidates, vec![vec![1, 3, 4]]);
    }
}
