//! Python binding layer for mutation-tree statistics.
//!
//! Provides Python functions for haplotype counting, nucleotide diversity,
//! Fitch parsimony and strand reversal over trees handed across the
//! boundary as flat parent-index arrays.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::divergence::count_haplotypes;
use crate::mutation::Mutation;
use crate::parsimony::simple_parsimony;
use crate::strand::{DEFAULT_GENOME_LENGTH, reverse_strand};
use crate::tree::{MutationTree, NodeId};
use crate::{diversity, AnalysisError};

/// Build an arena tree from the flat-array form Python hands over.
///
/// `parents[i]` is the array index of node i's parent, or -1 for the root.
/// Exactly one root is expected and parents must precede their children in
/// the arrays. Mutations come as canonical strings (`"A123T"`).
fn tree_from_arrays(
    parents: &[i64],
    identifiers: &[String],
    mutations: &[Vec<String>],
) -> PyResult<MutationTree> {
    if parents.len() != identifiers.len() || parents.len() != mutations.len() {
        return Err(PyValueError::new_err(format!(
            "parents, identifiers and mutations must have equal lengths (got {}, {}, {})",
            parents.len(),
            identifiers.len(),
            mutations.len()
        )));
    }
    if parents.is_empty() {
        return Err(PyValueError::new_err("cannot build a tree from zero nodes"));
    }

    let parse_list = |tokens: &[String]| -> PyResult<Vec<Mutation>> {
        tokens
            .iter()
            .map(|t| {
                t.parse::<Mutation>()
                    .map_err(|e: AnalysisError| PyValueError::new_err(e.to_string()))
            })
            .collect()
    };

    let mut tree: Option<MutationTree> = None;
    // input index → arena slot
    let mut slots: HashMap<usize, NodeId> = HashMap::new();

    for (i, &parent) in parents.iter().enumerate() {
        if parent == -1 {
            if tree.is_some() {
                return Err(PyValueError::new_err(
                    "more than one root (parent index -1) in the input",
                ));
            }
            let mut t = MutationTree::new(identifiers[i].clone());
            let root = t.root();
            t.set_mutations(root, parse_list(&mutations[i])?);
            slots.insert(i, root);
            tree = Some(t);
            continue;
        }

        let parent = usize::try_from(parent).map_err(|_| {
            PyValueError::new_err(format!("invalid parent index {parent} for node {i}"))
        })?;
        let Some(tree) = tree.as_mut() else {
            return Err(PyValueError::new_err(
                "the root (parent index -1) must precede every other node",
            ));
        };
        let &parent_slot = slots.get(&parent).ok_or_else(|| {
            PyValueError::new_err(format!(
                "node {i} references parent {parent}, which does not precede it"
            ))
        })?;
        if tree.find(&identifiers[i]).is_some() {
            return Err(PyValueError::new_err(format!(
                "duplicate node identifier '{}'",
                identifiers[i]
            )));
        }
        let slot = tree.add_child(parent_slot, identifiers[i].clone(), parse_list(&mutations[i])?);
        slots.insert(i, slot);
    }

    tree.ok_or_else(|| PyValueError::new_err("no root (parent index -1) in the input"))
}

/// Count leaves per haplotype in a mutation-annotated tree.
///
/// Args:
///     parents: Parent array index per node, -1 for the root
///     identifiers: Node identifier per node
///     mutations: Canonical mutation strings per node ("A123T", ...)
///
/// Returns:
///     A list of (haplotype, count) pairs, where each haplotype is the
///     sorted list of mutation strings separating those leaves from the
///     root genome.
///
/// Raises:
///     ValueError: If the arrays are inconsistent or a mutation string is malformed
#[pyfunction]
fn haplotype_counts(
    parents: Vec<i64>,
    identifiers: Vec<String>,
    mutations: Vec<Vec<String>>,
) -> PyResult<Vec<(Vec<String>, usize)>> {
    let tree = tree_from_arrays(&parents, &identifiers, &mutations)?;
    let mut pairs: Vec<(Vec<String>, usize)> = count_haplotypes(&tree).into_iter().collect();
    pairs.sort();
    Ok(pairs)
}

/// Unbiased nucleotide diversity (π) over the tree's leaves.
///
/// Args:
///     parents: Parent array index per node, -1 for the root
///     identifiers: Node identifier per node
///     mutations: Canonical mutation strings per node
///
/// Returns:
///     π as a float.
///
/// Raises:
///     ValueError: If the tree has fewer than 2 leaves, the arrays are
///     inconsistent, or a mutation string is malformed
#[pyfunction]
fn nucleotide_diversity(
    parents: Vec<i64>,
    identifiers: Vec<String>,
    mutations: Vec<Vec<String>>,
) -> PyResult<f64> {
    let tree = tree_from_arrays(&parents, &identifiers, &mutations)?;
    diversity::nucleotide_diversity_of_tree(&tree)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Fitch character-state inference over a strictly bifurcating tree.
///
/// Args:
///     parents: Parent array index per node, -1 for the root
///     identifiers: Node identifier per node
///     leaf_states: Mapping from leaf identifier to its observed state
///
/// Returns:
///     A tuple of (states, score) where states maps every node identifier
///     to its sorted list of inferred states and score is the number of
///     state changes.
///
/// Raises:
///     ValueError: If an internal node is not binary or a leaf is missing
///     from leaf_states
#[pyfunction]
fn fitch_parsimony(
    parents: Vec<i64>,
    identifiers: Vec<String>,
    leaf_states: HashMap<String, String>,
) -> PyResult<(HashMap<String, Vec<String>>, usize)> {
    let mutations = vec![Vec::new(); parents.len()];
    let tree = tree_from_arrays(&parents, &identifiers, &mutations)?;
    let result = simple_parsimony(&tree, &leaf_states)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let states = result
        .states
        .into_iter()
        .map(|(node, set)| {
            let mut states: Vec<String> = set.into_iter().collect();
            states.sort();
            (node, states)
        })
        .collect();
    Ok((states, result.score))
}

/// Relabel every mutation to the reverse strand.
///
/// Args:
///     parents: Parent array index per node, -1 for the root
///     identifiers: Node identifier per node
///     mutations: Canonical mutation strings per node
///     genome_length: Coordinate frame to reflect through (default: 29903,
///         the SARS-CoV-2 reference length)
///
/// Returns:
///     The per-node mutation strings in the reverse-strand frame, same
///     node order and same within-node order as the input.
///
/// Raises:
///     ValueError: If genome_length is zero or smaller than the largest
///     annotated position
#[pyfunction]
#[pyo3(signature = (parents, identifiers, mutations, genome_length=DEFAULT_GENOME_LENGTH))]
fn reverse_strand_annotations(
    parents: Vec<i64>,
    identifiers: Vec<String>,
    mutations: Vec<Vec<String>>,
    genome_length: u32,
) -> PyResult<Vec<Vec<String>>> {
    let mut tree = tree_from_arrays(&parents, &identifiers, &mutations)?;
    reverse_strand(&mut tree, genome_length).map_err(|e| PyValueError::new_err(e.to_string()))?;

    identifiers
        .iter()
        .map(|id| {
            let slot = tree
                .find(id)
                .ok_or_else(|| PyValueError::new_err(format!("node '{id}' vanished")))?;
            Ok(tree
                .node(slot)
                .mutations()
                .iter()
                .map(|m| m.canonical())
                .collect())
        })
        .collect()
}

/// Python module definition
#[pymodule]
fn mutation_tree_stats(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(haplotype_counts, m)?)?;
    m.add_function(wrap_pyfunction!(nucleotide_diversity, m)?)?;
    m.add_function(wrap_pyfunction!(fitch_parsimony, m)?)?;
    m.add_function(wrap_pyfunction!(reverse_strand_annotations, m)?)?;
    Ok(())
}
