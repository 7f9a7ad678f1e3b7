//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `mutation`: mutation records, one-hot base codes, strand transforms.
//! - `tree`: arena-backed mutation-annotated tree with traversal accessors.
//! - `divergence`: root-to-sample mutation accumulation + haplotype counting.
//! - `diversity`: nucleotide diversity (π) over haplotype frequencies.
//! - `parsimony`: bottom-up Fitch character-state inference.
//! - `strand`: reverse-strand relabeling of every mutation in the tree.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).
//!
//! Public API kept stable by re-exporting key items from the modules.

pub mod mutation;
pub mod tree;
pub mod divergence;
pub mod diversity;
pub mod parsimony;
pub mod strand;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use mutation::{Base, Mutation, reverse_position};
pub use tree::{MutationTree, Node, NodeId};
pub use divergence::{accumulate_mutations, count_haplotypes, divergence_set};
pub use diversity::{nucleotide_diversity, nucleotide_diversity_of_tree};
pub use parsimony::{FitchResult, simple_parsimony};
pub use strand::{DEFAULT_GENOME_LENGTH, reverse_strand};

use thiserror::Error;

/// Errors surfaced by the analysis layer.
///
/// Every failure is detected eagerly at the start of the responsible
/// operation and reported to the immediate caller; the computations are
/// deterministic, so nothing here is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Fitch inference requires a strictly bifurcating tree.
    #[error("node '{node}' has {arity} children; Fitch inference requires a strictly bifurcating tree")]
    NotBifurcating {
        /// Identifier of the offending internal node.
        node: String,
        /// Number of children actually found.
        arity: usize,
    },

    /// A reachable leaf was absent from the character-state assignment.
    #[error("leaf '{node}' has no character state in the input assignment")]
    MissingLeafState {
        /// Identifier of the unassigned leaf.
        node: String,
    },

    /// The π estimator's `N/(N-1)` correction is undefined for N ≤ 1.
    #[error("nucleotide diversity is undefined for {n} sample(s); at least 2 are required")]
    DegenerateSampleSize {
        /// Total number of samples in the haplotype table.
        n: usize,
    },

    /// Strand reversal was asked to reflect positions a genome of this
    /// length cannot hold. Rejected before any mutation list is rewritten.
    #[error("genome length {genome_length} cannot host mutations up to position {max_position}")]
    InvalidGenomeLength {
        /// The rejected genome length.
        genome_length: u32,
        /// Largest 1-based mutation position found in the tree.
        max_position: u32,
    },

    /// A sample identifier with no corresponding node in the tree.
    #[error("no node named '{id}' in the tree")]
    UnknownSample {
        /// The identifier that failed to resolve.
        id: String,
    },

    /// A mutation string that does not decode as `<ref><position><alt>`.
    #[error("'{token}' is not a valid mutation string")]
    InvalidMutation {
        /// The rejected token.
        token: String,
    },
}
