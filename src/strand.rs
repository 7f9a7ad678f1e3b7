//! Reverse-strand relabeling of mutation annotations.
//!
//! Flips the whole tree's mutation frame to the complementary strand:
//! every mutation has its three bases complemented and its position
//! reflected through the genome. The transform is node-local, touches no
//! topology, and undoes itself when applied twice with the same length.

use tracing::debug;

use crate::AnalysisError;
use crate::mutation::Mutation;
use crate::tree::MutationTree;

/// Length of the SARS-CoV-2 reference genome, the default coordinate frame
/// for strand reversal.
pub const DEFAULT_GENOME_LENGTH: u32 = 29_903;

/// Relabel every mutation in the tree to the reverse strand, in place.
///
/// Each node's mutation list is replaced by its per-mutation
/// [`Mutation::to_reverse_strand`] image, preserving list order. Tree
/// topology, leaf count, and anything derived from them (a previously
/// computed parsimony score included) are unaffected.
///
/// # Errors
/// `InvalidGenomeLength` when `genome_length` is zero or smaller than the
/// largest annotated position: the reflection would leave the coordinate
/// space. Validation runs in a read-only pass first, so a rejected call
/// leaves no partially rewritten mutation lists behind.
pub fn reverse_strand(tree: &mut MutationTree, genome_length: u32) -> Result<(), AnalysisError> {
    let order = tree.preorder();

    let max_position = order
        .iter()
        .flat_map(|&id| tree.node(id).mutations())
        .map(|m| m.position)
        .max()
        .unwrap_or(0);
    if genome_length == 0 || genome_length < max_position {
        return Err(AnalysisError::InvalidGenomeLength {
            genome_length,
            max_position,
        });
    }

    for &id in &order {
        let flipped: Vec<Mutation> = tree
            .node(id)
            .mutations()
            .iter()
            .map(|m| m.to_reverse_strand(genome_length))
            .collect();
        tree.set_mutations(id, flipped);
    }
    debug!(nodes = order.len(), genome_length, "mutation frame flipped to the reverse strand");
    Ok(())
}
