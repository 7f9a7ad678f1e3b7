//! Bottom-up Fitch character-state inference.
//!
//! # Overview
//! Small parsimony over a strictly bifurcating tree: leaves are seeded with
//! observed single states, and each internal node receives the intersection
//! of its children's state sets, or their union when the intersection is
//! empty (Fitch's tie-break, preserving ambiguity instead of resolving it
//! arbitrarily). Every union event costs one state change, so counting them
//! yields the parsimony score.
//!
//! Only the bottom-up pass is implemented; the top-down refinement pass of
//! Fitch's two-pass algorithm is out of scope, so multi-valued sets in the
//! output represent unresolved ambiguity.
//!
//! The alphabet is caller-defined: any finite set of `Clone + Eq + Hash`
//! symbols works, nucleotides being just one instance.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::AnalysisError;
use crate::tree::MutationTree;

/// Outcome of the bottom-up Fitch pass.
#[derive(Debug, Clone)]
pub struct FitchResult<S> {
    /// Inferred state set for every node reachable from the root, keyed by
    /// node identifier. Sets with several states encode ambiguity.
    pub states: HashMap<String, HashSet<S>>,
    /// Number of union events, i.e. the parsimony score of the assignment.
    pub score: usize,
}

/// Infer ancestral character-state sets for the whole tree.
///
/// # Algorithm
/// The tree's pre-order traversal is processed in reverse. Reversing a
/// pre-order sequence of a tree is a valid post-order: both children are
/// settled before their parent comes up, which is all the bottom-up pass
/// needs.
///
/// # Preconditions
/// - The tree is strictly bifurcating: every internal node has exactly two
///   children. Polytomies must be resolved before calling; a node with any
///   other arity aborts with [`AnalysisError::NotBifurcating`].
/// - Every reachable leaf appears in `leaf_states`. A missing leaf would
///   silently corrupt every ancestor above it, so it aborts with
///   [`AnalysisError::MissingLeafState`] instead.
///
/// # Example
/// ```
/// # use std::collections::HashMap;
/// # use mutation_tree_stats::{MutationTree, simple_parsimony};
/// let mut tree = MutationTree::new("root");
/// tree.add_child(tree.root(), "left", vec![]);
/// tree.add_child(tree.root(), "right", vec![]);
///
/// let states = HashMap::from([("left".to_string(), 'X'), ("right".to_string(), 'Y')]);
/// let result = simple_parsimony(&tree, &states).unwrap();
/// // Disjoint children: the root keeps both states and one change is paid.
/// assert_eq!(result.states["root"], ['X', 'Y'].into_iter().collect());
/// assert_eq!(result.score, 1);
/// ```
pub fn simple_parsimony<S>(
    tree: &MutationTree,
    leaf_states: &HashMap<String, S>,
) -> Result<FitchResult<S>, AnalysisError>
where
    S: Clone + Eq + Hash,
{
    let preorder = tree.preorder();
    let mut states: HashMap<String, HashSet<S>> = HashMap::with_capacity(preorder.len());
    let mut score = 0;

    for &id in preorder.iter().rev() {
        let node = tree.node(id);

        if node.is_leaf() {
            let state = leaf_states.get(node.identifier()).ok_or_else(|| {
                AnalysisError::MissingLeafState {
                    node: node.identifier().to_string(),
                }
            })?;
            states.insert(
                node.identifier().to_string(),
                HashSet::from([state.clone()]),
            );
            continue;
        }

        let children = node.children();
        if children.len() != 2 {
            return Err(AnalysisError::NotBifurcating {
                node: node.identifier().to_string(),
                arity: children.len(),
            });
        }

        // Both children are already solved: reverse pre-order guarantees it.
        let left = &states[tree.node(children[0]).identifier()];
        let right = &states[tree.node(children[1]).identifier()];
        let intersection: HashSet<S> = left.intersection(right).cloned().collect();
        let set = if intersection.is_empty() {
            score += 1;
            left.union(right).cloned().collect()
        } else {
            intersection
        };
        states.insert(node.identifier().to_string(), set);
    }

    Ok(FitchResult { states, score })
}
