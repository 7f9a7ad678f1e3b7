//! Nucleotide diversity (π) from haplotype frequencies.
//!
//! π is the expected number of pairwise nucleotide differences between two
//! randomly drawn samples, corrected for finite sample size. The pairwise
//! distance between two haplotypes is the size of the symmetric difference
//! of their divergence sets:
//!
//! ```text
//! d(g1, g2) = |g1| + |g2| - 2·|g1 ∩ g2|
//! ```
//!
//! i.e. the number of positions at which the two derived genomes disagree.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::AnalysisError;
use crate::divergence::count_haplotypes;
use crate::tree::MutationTree;

/// Number of mutation strings shared by two sorted haplotype keys.
///
/// Keys come out of the aggregator sorted, so a linear merge (O(m+n)) finds
/// the intersection size without hashing.
fn shared_mutations(a: &[String], b: &[String]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

/// Symmetric-difference distance between two sorted haplotype keys.
fn pairwise_distance(a: &[String], b: &[String]) -> usize {
    a.len() + b.len() - 2 * shared_mutations(a, b)
}

/// Unbiased nucleotide diversity over a haplotype table.
///
/// # Algorithm
/// With N the total leaf count, every ordered pair of distinct haplotypes
/// `(g1, g2)` contributes `d(g1, g2) · f1 · f2` where `f` is the
/// haplotype's relative frequency, so each unordered pair is counted twice,
/// the standard π convention. The sum is scaled by `N/(N-1)`
/// for the finite-sample correction.
///
/// Self-pairs are skipped; they contribute zero distance, so the skip only
/// saves the merge, it does not change the result.
///
/// # Complexity
/// O(H²) in the number of distinct haplotypes H. H is at most the leaf
/// count and in practice far below it for low-diversity trees.
///
/// # Errors
/// `DegenerateSampleSize` when N ≤ 1: the correction denominator is zero.
pub fn nucleotide_diversity(
    table: &HashMap<Vec<String>, usize>,
) -> Result<f64, AnalysisError> {
    let n: usize = table.values().sum();
    if n <= 1 {
        return Err(AnalysisError::DegenerateSampleSize { n });
    }
    let n = n as f64;

    let mut pi = 0.0;
    for (g1, &c1) in table {
        for (g2, &c2) in table {
            if g1 == g2 {
                continue;
            }
            let f1 = c1 as f64 / n;
            let f2 = c2 as f64 / n;
            pi += pairwise_distance(g1, g2) as f64 * f1 * f2;
        }
    }

    Ok(pi * n / (n - 1.0))
}

/// π straight from a tree: aggregate haplotypes, then estimate.
pub fn nucleotide_diversity_of_tree(tree: &MutationTree) -> Result<f64, AnalysisError> {
    nucleotide_diversity(&count_haplotypes(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn key(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn distance_is_symmetric_difference_size() {
        let g1 = key(&["A1T", "C5G"]);
        let g2 = key(&["C5G", "G9C"]);
        // Disagree at positions 1 and 9, agree at 5.
        assert_eq!(pairwise_distance(&g1, &g2), 2);
        assert_eq!(pairwise_distance(&g1, &g1), 0);
        assert_eq!(pairwise_distance(&g1, &[]), 2);
    }

    #[test]
    fn distance_is_symmetric_over_all_pairs() {
        let keys = [
            key(&[]),
            key(&["A1T"]),
            key(&["A1T", "C5G"]),
            key(&["C5G", "G9C", "T11A"]),
        ];
        for pair in keys.iter().combinations(2) {
            assert_eq!(
                pairwise_distance(pair[0], pair[1]),
                pairwise_distance(pair[1], pair[0])
            );
        }
    }

    /// Two leaves whose divergence sets differ at exactly one position:
    /// π = 1 · 0.5 · 0.5 · 2 · (2/1) = 1.0.
    #[test]
    fn two_samples_one_difference_give_exactly_one() {
        let table = HashMap::from([(key(&[]), 1), (key(&["A1T"]), 1)]);
        assert_eq!(nucleotide_diversity(&table).unwrap(), 1.0);
    }

    #[test]
    fn single_sample_is_degenerate() {
        let table = HashMap::from([(key(&["A1T"]), 1)]);
        assert_eq!(
            nucleotide_diversity(&table).unwrap_err(),
            AnalysisError::DegenerateSampleSize { n: 1 }
        );
    }

    #[test]
    fn empty_table_is_degenerate() {
        let table = HashMap::new();
        assert_eq!(
            nucleotide_diversity(&table).unwrap_err(),
            AnalysisError::DegenerateSampleSize { n: 0 }
        );
    }

    #[test]
    fn monomorphic_population_has_zero_diversity() {
        // One haplotype, many samples: no pair disagrees anywhere.
        let table = HashMap::from([(key(&["A1T", "C5G"]), 40)]);
        assert_eq!(nucleotide_diversity(&table).unwrap(), 0.0);
    }

    #[test]
    fn unequal_frequencies_weight_the_sum() {
        // 3 reference samples, 1 sample one mutation away: N = 4,
        // Σ over ordered pairs = 2 · (1 · 3/4 · 1/4) = 0.375,
        // corrected by 4/3 → 0.5.
        let table = HashMap::from([(key(&[]), 3), (key(&["A1T"]), 1)]);
        assert_eq!(nucleotide_diversity(&table).unwrap(), 0.5);
    }

    #[test]
    fn tree_level_wrapper_matches_manual_table() {
        let mut tree = MutationTree::new("root");
        let inner = tree.add_child(tree.root(), "inner", vec!["A1T".parse().unwrap()]);
        tree.add_child(inner, "s1", vec![]);
        tree.add_child(tree.root(), "s2", vec![]);

        // s1 diverges by {A1T}, s2 by {}: the literal boundary case.
        assert_eq!(nucleotide_diversity_of_tree(&tree).unwrap(), 1.0);
    }
}
