//! Dependency graph for derived fields and reactions.
//!
//! Every derived field and reaction declares the fields it reads (`inputs`)
//! and, for reactions, the fields it writes (`outputs`). `Schedule::build`
//! sorts the nodes once, so that a node always runs after everything it
//! reads has settled. Ties are broken by declaration order, which is how
//! reactions declared early (e.g. the cache change reaction) run before
//! derived fields reading the same inputs.
//!
//! A cycle is rejected when the schedule is built, never at propagation
//! time.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

/// Role of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Written from outside (signals, renderer calls, reactions).
    Source,
    /// Pure function of its inputs.
    Derived,
    /// Side-effecting hook run when an input changed.
    Reaction,
}

/// Declaration of one node.
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec<F: 'static> {
    pub field: F,
    pub kind: NodeKind,
    pub inputs: &'static [F],
    /// Fields written by a reaction. Empty for sources and derived fields.
    pub outputs: &'static [F],
}

impl<F: 'static> NodeSpec<F> {
    pub const fn source(field: F) -> Self {
        Self {
            field,
            kind: NodeKind::Source,
            inputs: &[],
            outputs: &[],
        }
    }

    pub const fn derived(field: F, inputs: &'static [F]) -> Self {
        Self {
            field,
            kind: NodeKind::Derived,
            inputs,
            outputs: &[],
        }
    }

    pub const fn reaction(field: F, inputs: &'static [F], outputs: &'static [F]) -> Self {
        Self {
            field,
            kind: NodeKind::Reaction,
            inputs,
            outputs,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("field {0} is declared twice")]
    Duplicate(String),
    #[error("field {0} is referenced but never declared")]
    Unknown(String),
    #[error("dependency cycle between {0:?}")]
    Cycle(Vec<String>),
}

/// Topologically sorted nodes.
#[derive(Debug, Clone)]
pub struct Schedule<F: 'static> {
    nodes: Vec<NodeSpec<F>>,
    /// Indices into `nodes`, in evaluation order.
    order: Vec<usize>,
}

impl<F> Schedule<F>
where
    F: Copy + Eq + Hash + Debug + 'static,
{
    /// Validates the declarations and sorts them.
    pub fn build(decls: &[NodeSpec<F>]) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(decls.len());
        for (i, decl) in decls.iter().enumerate() {
            if index.insert(decl.field, i).is_some() {
                return Err(GraphError::Duplicate(format!("{:?}", decl.field)));
            }
        }

        // Edges: input -> node, node -> output.
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); decls.len()];
        let mut in_degree = vec![0usize; decls.len()];
        for (i, decl) in decls.iter().enumerate() {
            for input in decl.inputs {
                let from = *index
                    .get(input)
                    .ok_or_else(|| GraphError::Unknown(format!("{input:?}")))?;
                edges[from].push(i);
                in_degree[i] += 1;
            }
            for output in decl.outputs {
                let to = *index
                    .get(output)
                    .ok_or_else(|| GraphError::Unknown(format!("{output:?}")))?;
                edges[i].push(to);
                in_degree[to] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();
        let mut order = Vec::with_capacity(decls.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for &next in &edges[i] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() != decls.len() {
            let placed: HashSet<usize> = order.iter().copied().collect();
            let stuck = (0..decls.len())
                .filter(|i| !placed.contains(i))
                .map(|i| format!("{:?}", decls[i].field))
                .collect();
            return Err(GraphError::Cycle(stuck));
        }

        Ok(Self {
            nodes: decls.to_vec(),
            order,
        })
    }

    /// Nodes in evaluation order.
    pub fn ordered(&self) -> impl Iterator<Item = &NodeSpec<F>> {
        self.order.iter().map(|&i| &self.nodes[i])
    }

    /// Runs one propagation pass.
    ///
    /// `changed` holds the source fields written by the committed batch.
    /// `evaluate` is called for each derived field or reaction with at least
    /// one changed input, in schedule order, and returns the fields whose
    /// value it actually changed.
    pub fn propagate<E>(&self, changed: impl IntoIterator<Item = F>, mut evaluate: E) -> Vec<F>
    where
        E: FnMut(&NodeSpec<F>) -> Vec<F>,
    {
        let mut dirty: HashSet<F> = changed.into_iter().collect();
        let mut evaluated = Vec::new();
        for node in self.ordered() {
            if node.kind == NodeKind::Source {
                continue;
            }
            if !node.inputs.iter().any(|input| dirty.contains(input)) {
                continue;
            }
            evaluated.push(node.field);
            dirty.extend(evaluate(node));
        }
        evaluated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum F {
        A,
        B,
        C,
        OnA,
        D,
    }

    const ACYCLIC: &[NodeSpec<F>] = &[
        NodeSpec::source(F::A),
        NodeSpec::source(F::B),
        NodeSpec::reaction(F::OnA, &[F::A], &[F::B]),
        NodeSpec::derived(F::C, &[F::A, F::B]),
        NodeSpec::derived(F::D, &[F::C]),
    ];

    fn order(schedule: &Schedule<F>) -> Vec<F> {
        schedule.ordered().map(|n| n.field).collect()
    }

    #[test]
    fn test_reaction_output_sorts_before_readers() {
        let schedule = Schedule::build(ACYCLIC).unwrap();
        assert_eq!(order(&schedule), vec![F::A, F::OnA, F::B, F::C, F::D]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        const CYCLIC: &[NodeSpec<F>] = &[
            NodeSpec::source(F::A),
            NodeSpec::derived(F::C, &[F::A, F::D]),
            NodeSpec::derived(F::D, &[F::C]),
        ];
        let err = Schedule::build(CYCLIC).unwrap_err();
        assert_eq!(err, GraphError::Cycle(vec!["C".into(), "D".into()]));
    }

    #[test]
    fn test_unknown_and_duplicate_fields_are_rejected() {
        const UNKNOWN: &[NodeSpec<F>] = &[NodeSpec::derived(F::C, &[F::A])];
        assert_eq!(
            Schedule::build(UNKNOWN).unwrap_err(),
            GraphError::Unknown("A".into())
        );

        const DUPLICATE: &[NodeSpec<F>] = &[NodeSpec::source(F::A), NodeSpec::source(F::A)];
        assert_eq!(
            Schedule::build(DUPLICATE).unwrap_err(),
            GraphError::Duplicate("A".into())
        );
    }

    #[test]
    fn test_propagate_skips_unchanged_dependents() {
        let schedule = Schedule::build(ACYCLIC).unwrap();
        // C recomputes but reports no change, so D stays untouched.
        let evaluated = schedule.propagate([F::B], |_| Vec::new());
        assert_eq!(evaluated, vec![F::C]);
    }

    #[test]
    fn test_propagate_follows_reaction_writes() {
        let schedule = Schedule::build(ACYCLIC).unwrap();
        let evaluated = schedule.propagate([F::A], |node| match node.field {
            F::OnA => vec![F::B],
            F::C => vec![F::C],
            _ => Vec::new(),
        });
        assert_eq!(evaluated, vec![F::OnA, F::C, F::D]);
    }
}
