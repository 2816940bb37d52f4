use super::Move;

use petgraph::graph::{DiGraph, NodeIndex};

/// One unit of data migration.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Step {
    Move(Move),

    /// Moves whose columns form a cycle. They can only be applied together,
    /// as a single statement.
    Cycle(Vec<Move>),
}

/// Orders the moves of one class so that no move overwrites a column
/// before the data in it was moved out.
///
/// Move `a` depends on move `b` when `a` writes the column `b` reads.
/// `tarjan_scc` yields the strongly connected components in postorder,
/// dependencies first, which is the order they have to be applied in.
pub(super) fn sort(moves: &[Move]) -> Vec<Step> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(moves.len(), moves.len());
    let nodes: Vec<NodeIndex> = (0..moves.len()).map(|i| graph.add_node(i)).collect();

    for (i, a) in moves.iter().enumerate() {
        for (j, b) in moves.iter().enumerate() {
            if a.to == b.from {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }

    petgraph::algo::tarjan_scc(&graph)
        .into_iter()
        .map(|component| {
            let mut component: Vec<usize> = component.into_iter().map(|node| graph[node]).collect();

            if component.len() == 1 {
                Step::Move(moves[component[0]].clone())
            } else {
                component.sort_unstable();
                Step::Cycle(component.into_iter().map(|i| moves[i].clone()).collect())
            }
        })
        .collect()
}
