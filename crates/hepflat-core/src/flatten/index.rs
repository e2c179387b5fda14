//! Barcode → dense-index lookup.
//!
//! Barcodes are sparse, event-local identifiers; every cross-reference in
//! the flattened row uses dense `0..n` indices instead. This index is the
//! relational join between the two: built fresh at the start of each event
//! from a forward pass over the particle and vertex collections, so the
//! dense index of an entity is its position of first encounter. Lookup is
//! O(1); a linear scan per particle would degrade to O(P·V) on events
//! with thousands of particles.

use std::collections::HashMap;

use tracing::warn;

use crate::event::GenEvent;

/// Per-event mapping from particle/vertex barcode to dense index.
///
/// "Not present" is an ordinary `None`, not an error: particles routinely
/// have no production or decay vertex. Never shared across events.
#[derive(Debug, Default)]
pub struct BarcodeIndex {
    particles: HashMap<i32, usize>,
    vertices: HashMap<i32, usize>,
}

impl BarcodeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous event's mapping and index `event`.
    ///
    /// A duplicated barcode keeps its first dense index; later occurrences
    /// are logged and ignored, matching the forward-pass invariant.
    pub fn rebuild(&mut self, event: &GenEvent) {
        self.particles.clear();
        self.vertices.clear();
        self.particles.reserve(event.particles_size());
        self.vertices.reserve(event.vertices_size());

        for (index, particle) in event.particles.iter().enumerate() {
            if let Some(previous) = self.particles.insert(particle.barcode, index) {
                warn!(
                    event = event.number,
                    barcode = particle.barcode,
                    "duplicate particle barcode; keeping first index"
                );
                self.particles.insert(particle.barcode, previous);
            }
        }
        for (index, vertex) in event.vertices.iter().enumerate() {
            if let Some(previous) = self.vertices.insert(vertex.barcode, index) {
                warn!(
                    event = event.number,
                    barcode = vertex.barcode,
                    "duplicate vertex barcode; keeping first index"
                );
                self.vertices.insert(vertex.barcode, previous);
            }
        }
    }

    /// Dense index of the particle with `barcode`, if present.
    #[must_use]
    pub fn particle(&self, barcode: i32) -> Option<usize> {
        self.particles.get(&barcode).copied()
    }

    /// Dense index of the vertex with `barcode`, if present.
    #[must_use]
    pub fn vertex(&self, barcode: i32) -> Option<usize> {
        self.vertices.get(&barcode).copied()
    }

    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}
