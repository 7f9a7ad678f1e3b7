//! Root-to-sample mutation accumulation and haplotype counting.
//!
//! # Overview
//! A sample's *divergence set* is the minimal set of mutations separating
//! its genome from the root genome. Walking the root→sample path, a
//! mutation whose reciprocal is already accumulated cancels it (the genome
//! reverted to reference at that position); anything else is added. The
//! result never contains a mutation together with its reciprocal.
//!
//! Haplotype counting groups every leaf by its divergence set: leaves with
//! identical sets carry identical derived genomes.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use rayon::prelude::*;
use tracing::debug;

use crate::AnalysisError;
use crate::tree::{MutationTree, NodeId};

/// Reduce a root-to-sample path to the sample's divergence set.
///
/// # Algorithm
/// `rootward_path` is the sample→root sequence the tree's rootward search
/// yields; the sweep consumes it in reverse so mutations are applied in the
/// order evolution accumulated them. For each edge mutation, if the running
/// set holds the reciprocal string, the two cancel and the reciprocal is
/// removed; otherwise the mutation's own canonical string is inserted.
///
/// An empty path yields an empty set: the sample genome equals the root
/// genome. There are no failure modes.
///
/// # Example
/// ```
/// # use mutation_tree_stats::{MutationTree, accumulate_mutations};
/// let mut tree = MutationTree::new("root");
/// let inner = tree.add_child(tree.root(), "inner", vec!["A123T".parse().unwrap()]);
/// tree.add_child(inner, "sample", vec!["T123A".parse().unwrap()]);
///
/// let path = tree.rootward_path("sample").unwrap();
/// // A123T and T123A cancel: the sample is back at reference.
/// assert!(accumulate_mutations(&tree, &path).is_empty());
/// ```
pub fn accumulate_mutations(tree: &MutationTree, rootward_path: &[NodeId]) -> HashSet<String> {
    let mut divergence = HashSet::new();
    for &id in rootward_path.iter().rev() {
        for mutation in tree.node(id).mutations() {
            if !divergence.remove(&mutation.reciprocal()) {
                divergence.insert(mutation.canonical());
            }
        }
    }
    divergence
}

/// Divergence set of a single named sample.
///
/// Convenience over [`MutationTree::rootward_path`] +
/// [`accumulate_mutations`]; fails only if the identifier resolves to no
/// node.
pub fn divergence_set(
    tree: &MutationTree,
    sample: &str,
) -> Result<HashSet<String>, AnalysisError> {
    let path = tree.rootward_path(sample)?;
    Ok(accumulate_mutations(tree, &path))
}

/// Count how many leaves share each distinct divergence set.
///
/// # Keying
/// Each leaf's divergence set is sorted into a canonical, order-independent
/// key before counting, so set-equal divergence sets always land on the
/// same table entry regardless of construction order.
///
/// # Parallelism
/// Every leaf's computation re-walks only its own root path and reads the
/// tree immutably, so leaves fan out across the rayon pool; the partial
/// results are merged in a single sequential pass at the end.
///
/// The table is built fresh on every call and returned; nothing is cached.
pub fn count_haplotypes(tree: &MutationTree) -> HashMap<Vec<String>, usize> {
    let leaves = tree.leaf_ids();
    debug!(leaves = leaves.len(), "aggregating haplotypes");

    let keys: Vec<Vec<String>> = leaves
        .par_iter()
        .map(|&leaf| {
            let path = tree.rootward_path_of(leaf);
            accumulate_mutations(tree, &path)
                .into_iter()
                .sorted()
                .collect()
        })
        .collect();

    let mut table: HashMap<Vec<String>, usize> = HashMap::new();
    for key in keys {
        *table.entry(key).or_insert(0) += 1;
    }
    debug!(haplotypes = table.len(), "haplotype table built");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::Mutation;

    fn m(token: &str) -> Mutation {
        token.parse().unwrap()
    }

    #[test]
    fn empty_path_yields_empty_set() {
        let tree = MutationTree::new("root");
        assert!(accumulate_mutations(&tree, &[]).is_empty());
    }

    #[test]
    fn root_only_sample_diverges_nowhere() {
        let tree = MutationTree::new("root");
        assert!(divergence_set(&tree, "root").unwrap().is_empty());
    }

    #[test]
    fn mutations_accumulate_along_the_path() {
        let mut tree = MutationTree::new("root");
        let inner = tree.add_child(tree.root(), "inner", vec![m("A1T"), m("C5G")]);
        tree.add_child(inner, "sample", vec![m("G10A")]);

        let set = divergence_set(&tree, "sample").unwrap();
        assert_eq!(
            set,
            HashSet::from(["A1T".to_string(), "C5G".to_string(), "G10A".to_string()])
        );
    }

    #[test]
    fn back_mutation_cancels() {
        let mut tree = MutationTree::new("root");
        let inner = tree.add_child(tree.root(), "inner", vec![m("A123T"), m("C5G")]);
        tree.add_child(inner, "sample", vec![m("T123A")]);

        let set = divergence_set(&tree, "sample").unwrap();
        // Position 123 reverted; only the C5G divergence remains.
        assert_eq!(set, HashSet::from(["C5G".to_string()]));
        assert!(!set.contains("A123T"));
        assert!(!set.contains("T123A"));
    }

    #[test]
    fn divergence_never_holds_a_reciprocal_pair() {
        let mut tree = MutationTree::new("root");
        let a = tree.add_child(tree.root(), "a", vec![m("A7G")]);
        let b = tree.add_child(a, "b", vec![m("G7A")]);
        tree.add_child(b, "sample", vec![m("A7G")]);

        // Apply, revert, apply again: the net divergence is one mutation.
        let set = divergence_set(&tree, "sample").unwrap();
        assert_eq!(set, HashSet::from(["A7G".to_string()]));
    }

    /// ```text
    ///          root
    ///         /    \
    ///       n1      n2
    ///      /  \    /  \
    ///    s1   s2  s3   s4
    /// ```
    /// s1 and s3 end up with the same divergence set built through
    /// different paths; s2 and s4 each get their own.
    #[test]
    fn set_equal_leaves_share_a_table_entry() {
        let mut tree = MutationTree::new("root");
        let n1 = tree.add_child(tree.root(), "n1", vec![m("A1T")]);
        let n2 = tree.add_child(tree.root(), "n2", vec![m("C5G")]);
        // s1 accumulates A1T then C5G; s3 accumulates C5G then A1T.
        tree.add_child(n1, "s1", vec![m("C5G")]);
        tree.add_child(n1, "s2", vec![]);
        tree.add_child(n2, "s3", vec![m("A1T")]);
        tree.add_child(n2, "s4", vec![m("G9C")]);

        let table = count_haplotypes(&tree);
        assert_eq!(table.len(), 3);
        // Same elements, different construction order, one sorted key.
        assert_eq!(
            table[&vec!["A1T".to_string(), "C5G".to_string()]],
            2,
            "{table:?}"
        );
        assert_eq!(table[&vec!["A1T".to_string()]], 1);
        assert_eq!(table[&vec!["C5G".to_string(), "G9C".to_string()]], 1);
    }

    #[test]
    fn identical_leaves_collapse_to_one_haplotype() {
        let mut tree = MutationTree::new("root");
        let inner = tree.add_child(tree.root(), "inner", vec![m("A1T")]);
        tree.add_child(inner, "s1", vec![]);
        tree.add_child(inner, "s2", vec![]);
        tree.add_child(inner, "s3", vec![]);

        let table = count_haplotypes(&tree);
        assert_eq!(table.len(), 1);
        assert_eq!(table[&vec!["A1T".to_string()]], 3);
    }
}
