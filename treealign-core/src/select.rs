//! Rooted-tree genome subset selection.
//!
//! Traversals over the alignment graph only need the lineages that can
//! actually contribute to a query. Given a selection root and an input set
//! of genomes of interest, the selector returns the union of root-to-genome
//! paths: the minimal connected subtree, rooted at `root`, spanning the
//! input set.

use std::collections::HashSet;
use thiserror::Error;

use crate::graph::AlignmentGraph;
use crate::types::GenomeId;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("genome {0} is not a descendant of the selection root")]
    NotUnderRoot(String),
}

pub type SelectResult<T> = Result<T, SelectError>;

/// Union of root-to-genome paths over `input_set`, endpoints included.
///
/// An empty input set yields an empty output set (the root is only ever
/// reached along a path). A genome whose parent chain does not pass through
/// `root` is a hard error; silently skipping it would hide mistyped target
/// names. Enlarging the input set never shrinks the output, and the caller
/// can use `len()` of the result for traversal-bound sizing.
pub fn genomes_in_spanning_tree(
    graph: &AlignmentGraph,
    root: GenomeId,
    input_set: &HashSet<GenomeId>,
) -> SelectResult<HashSet<GenomeId>> {
    let mut output = HashSet::new();
    for &start in input_set {
        let mut current = start;
        loop {
            if !output.insert(current) {
                // the rest of this path was collected by an earlier walk
                break;
            }
            if current == root {
                break;
            }
            match graph.genome(current).parent {
                Some(parent) => current = parent,
                None => {
                    return Err(SelectError::NotUnderRoot(
                        graph.genome(start).name.clone(),
                    ))
                }
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AlignmentGraph;

    //        root
    //       /    \
    //     anc     c
    //    /   \
    //   a     b
    fn tree() -> (AlignmentGraph, [GenomeId; 5]) {
        let mut graph = AlignmentGraph::new();
        let root = graph.insert_genome("root", None);
        let anc = graph.insert_genome("anc", Some(root));
        let a = graph.insert_genome("a", Some(anc));
        let b = graph.insert_genome("b", Some(anc));
        let c = graph.insert_genome("c", Some(root));
        (graph, [root, anc, a, b, c])
    }

    #[test]
    fn test_empty_input() {
        let (graph, [root, ..]) = tree();
        let out = genomes_in_spanning_tree(&graph, root, &HashSet::new()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_root_only() {
        let (graph, [root, ..]) = tree();
        let input: HashSet<_> = [root].into_iter().collect();
        let out = genomes_in_spanning_tree(&graph, root, &input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_leaf_paths() {
        let (graph, [root, anc, a, _b, c]) = tree();
        let input: HashSet<_> = [a, c].into_iter().collect();
        let out = genomes_in_spanning_tree(&graph, root, &input).unwrap();
        let expected: HashSet<_> = [root, anc, a, c].into_iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_all_leaves_is_full_tree() {
        let (graph, [root, anc, a, b, c]) = tree();
        let input: HashSet<_> = [a, b, c].into_iter().collect();
        let out = genomes_in_spanning_tree(&graph, root, &input).unwrap();
        let expected: HashSet<_> = [root, anc, a, b, c].into_iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_monotonicity() {
        let (graph, [root, _anc, a, b, _c]) = tree();
        let small: HashSet<_> = [a].into_iter().collect();
        let large: HashSet<_> = [a, b].into_iter().collect();
        let out_small = genomes_in_spanning_tree(&graph, root, &small).unwrap();
        let out_large = genomes_in_spanning_tree(&graph, root, &large).unwrap();
        assert!(out_small.is_subset(&out_large));
    }

    #[test]
    fn test_subtree_root() {
        let (graph, [_root, anc, a, _b, _c]) = tree();
        let input: HashSet<_> = [a].into_iter().collect();
        let out = genomes_in_spanning_tree(&graph, anc, &input).unwrap();
        let expected: HashSet<_> = [anc, a].into_iter().collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_genome_outside_root() {
        let (graph, [_root, anc, _a, _b, c]) = tree();
        let input: HashSet<_> = [c].into_iter().collect();
        let err = genomes_in_spanning_tree(&graph, anc, &input);
        assert!(matches!(err, Err(SelectError::NotUnderRoot(name)) if name == "c"));
    }
}
