use std::collections::VecDeque;

use crate::descriptor::DescriptorSet;
use crate::error::RoutingError;
use crate::route::SourceRoute;
use crate::topology::VertexId;

/// Result of walking the predecessor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Complete(SourceRoute),
    /// The path reaches `vertex` over a link whose far-end address never
    /// resolved.
    Unresolved { vertex: VertexId },
}

/// Turns the predecessor chain left by the path engine into a hop list.
pub struct PathExtractor;

impl PathExtractor {
    /// Walk from `destination` back to `source`, prepending each next hop.
    ///
    /// A missing predecessor, or a chain longer than the vertex count, means
    /// the descriptors were not produced by a successful search and is an
    /// error.
    pub fn extract(
        descriptors: &DescriptorSet,
        source: VertexId,
        destination: VertexId,
    ) -> Result<Extraction, RoutingError> {
        descriptors.require(source)?;
        let metric = descriptors.require(destination)?.metric;

        let mut hops = VecDeque::new();
        let mut vertices = VecDeque::from([destination]);
        let mut current = destination;

        while current != source {
            if vertices.len() > descriptors.len() {
                return Err(RoutingError::BrokenPredecessorChain { vertex: current });
            }
            let predecessor = descriptors
                .require(current)?
                .predecessor
                .ok_or(RoutingError::BrokenPredecessorChain { vertex: current })?;

            match predecessor.next_hop {
                Some(address) => hops.push_front(address),
                None => {
                    tracing::warn!(
                        vertex = %current,
                        from = %predecessor.vertex,
                        "path uses a link with an unresolved neighbor"
                    );
                    return Ok(Extraction::Unresolved { vertex: current });
                }
            }
            current = predecessor.vertex;
            vertices.push_front(current);
        }

        Ok(Extraction::Complete(SourceRoute::new(
            hops.into(),
            vertices.into(),
            metric,
        )))
    }
}
