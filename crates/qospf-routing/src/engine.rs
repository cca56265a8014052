//! Extended breadth-first search for a single QoS-feasible path.
//!
//! The search proceeds in rounds. Each round finalizes every frontier
//! vertex whose descriptor meets the constraint, then extends the newly
//! finalized vertices to their neighbors to form the next frontier. A vertex
//! is therefore finalized along the fewest-hop feasible path found so far,
//! and each vertex is finalized at most once, which bounds the number of
//! rounds by the vertex count even on cyclic graphs.

use qospf_core::{QosConstraint, QueueSelector};
use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorSet, PathMetric, Predecessor};
use crate::error::RoutingError;
use crate::topology::VertexId;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// The destination was finalized after this many rounds.
    Reached { rounds: usize },
    /// The frontier emptied first.
    Exhausted { rounds: usize },
}

impl SearchOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, SearchOutcome::Reached { .. })
    }

    pub fn rounds(&self) -> usize {
        match self {
            SearchOutcome::Reached { rounds } | SearchOutcome::Exhausted { rounds } => *rounds,
        }
    }
}

/// The path engine. Holds only the queue selector; all per-run state lives
/// in the [`DescriptorSet`] it is given.
pub struct ExtendedBfs<'a> {
    selector: &'a dyn QueueSelector,
}

impl<'a> ExtendedBfs<'a> {
    pub fn new(selector: &'a dyn QueueSelector) -> Self {
        Self { selector }
    }

    /// Search from `source` to `destination`, leaving the result in the
    /// descriptors' metrics and predecessors.
    pub fn run(
        &self,
        descriptors: &mut DescriptorSet,
        source: VertexId,
        destination: VertexId,
        constraint: &QosConstraint,
    ) -> Result<SearchOutcome, RoutingError> {
        descriptors.require(source)?;
        descriptors.require(destination)?;

        if source == destination {
            return Ok(SearchOutcome::Reached { rounds: 0 });
        }

        if let Some(d) = descriptors.get_mut(source) {
            d.metric = PathMetric::SOURCE;
            d.predecessor = None;
        }

        // The source is final from the start so no path re-enters it.
        let mut projected = vec![false; descriptors.len()];
        projected[source.index()] = true;

        // Seed from every outgoing link of the source, resolved or not; a
        // path over an unresolved link is rejected at extraction.
        let seeds: Vec<VertexId> = descriptors
            .require(source)?
            .links
            .iter()
            .map(|l| l.to_vertex)
            .collect();
        let mut frontier: Vec<VertexId> = Vec::new();
        self.extend_to(descriptors, &projected, source, &seeds, constraint, &mut frontier)?;

        let mut rounds = 0;
        while !projected[destination.index()] && !frontier.is_empty() {
            rounds += 1;

            let mut finalized: Vec<VertexId> = Vec::new();
            for &v in &frontier {
                let d = descriptors.require(v)?;
                if d.metric.satisfies(constraint) && !projected[v.index()] {
                    projected[v.index()] = true;
                    finalized.push(v);
                }
            }

            tracing::trace!(
                round = rounds,
                frontier = frontier.len(),
                finalized = finalized.len(),
                "search round"
            );

            frontier.clear();
            for v in finalized {
                let neighbors = descriptors.require(v)?.neighbors.clone();
                self.extend_to(descriptors, &projected, v, &neighbors, constraint, &mut frontier)?;
            }
        }

        let outcome = if projected[destination.index()] {
            SearchOutcome::Reached { rounds }
        } else {
            SearchOutcome::Exhausted { rounds }
        };
        tracing::debug!(
            source = %source,
            destination = %destination,
            rounds,
            reached = outcome.is_reached(),
            "search finished"
        );
        Ok(outcome)
    }

    /// Extend `v`'s path to each of `targets` other than its own predecessor.
    ///
    /// Targets that are not yet final take the extended metric and `v`
    /// as predecessor. When several vertices reach the same neighbor in one
    /// round, the last one processed wins. Every target reached joins the
    /// next frontier.
    fn extend_to(
        &self,
        descriptors: &mut DescriptorSet,
        projected: &[bool],
        v: VertexId,
        targets: &[VertexId],
        constraint: &QosConstraint,
        frontier: &mut Vec<VertexId>,
    ) -> Result<(), RoutingError> {
        let current = descriptors.require(v)?;
        let metric = current.metric;
        let back = current.predecessor.map(|p| p.vertex);

        let mut updates: Vec<(VertexId, PathMetric, Predecessor)> = Vec::new();
        for &n in targets {
            if Some(n) == back {
                continue;
            }
            let Some(link) = current.link_to(n) else {
                tracing::trace!(vertex = %v, neighbor = %n, "neighbor without an outgoing link");
                continue;
            };
            let extended = match link.selected_queue(self.selector, constraint.priority) {
                Some(queue) => metric.concatenate(queue),
                None => metric,
            };
            updates.push((
                n,
                extended,
                Predecessor {
                    vertex: v,
                    interface_index: link.interface_index,
                    next_hop: link.next_hop,
                },
            ));
        }

        for (n, extended, predecessor) in updates {
            if !projected.get(n.index()).copied().unwrap_or(true) {
                if let Some(d) = descriptors.get_mut(n) {
                    d.metric = extended;
                    d.predecessor = Some(predecessor);
                }
            }
            if !frontier.contains(&n) {
                frontier.push(n);
            }
        }
        Ok(())
    }
}
