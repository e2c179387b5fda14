//! Particle pruning.
//!
//! Removes particles from an event by |PDG id| keep/remove lists, then
//! drops vertices left with no attached particles. Keep takes precedence
//! over remove; a non-empty keep list removes everything not on it.

use std::collections::HashSet;

use tracing::debug;

use crate::event::GenEvent;

/// Counts from one [`PruneFilter::prune_event`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub particles_removed: usize,
    pub vertices_removed: usize,
}

/// Keep/remove particle filter over |PDG id|.
#[derive(Debug, Clone, Default)]
pub struct PruneFilter {
    keep: HashSet<i32>,
    remove: HashSet<i32>,
}

impl PruneFilter {
    /// Build a filter from keep and remove id lists. Signs are ignored:
    /// both lists operate on the absolute PDG id.
    pub fn new(
        keep: impl IntoIterator<Item = i32>,
        remove: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            keep: keep.into_iter().map(i32::abs).collect(),
            remove: remove.into_iter().map(i32::abs).collect(),
        }
    }

    /// Whether a particle with `pdg_id` should be removed.
    ///
    /// Removed when its |id| is on the remove list and not on the keep
    /// list, or when a keep list exists and its |id| is not on it.
    #[must_use]
    pub fn should_prune(&self, pdg_id: i32) -> bool {
        let abs_id = pdg_id.abs();
        let kept = self.keep.contains(&abs_id);
        (self.remove.contains(&abs_id) && !kept) || (!self.keep.is_empty() && !kept)
    }

    /// Remove matching particles from `event`, then drop vertices that no
    /// remaining particle is produced at or ends at.
    pub fn prune_event(&self, event: &mut GenEvent) -> PruneStats {
        let particles_before = event.particles.len();
        event.particles.retain(|p| !self.should_prune(p.pdg_id));
        let particles_removed = particles_before - event.particles.len();

        // A vertex survives only while some particle still references it.
        let referenced: HashSet<i32> = event
            .particles
            .iter()
            .flat_map(|p| [p.prod_vtx_barcode, p.end_vtx_barcode])
            .collect();

        let vertices_before = event.vertices.len();
        event.vertices.retain(|v| referenced.contains(&v.barcode));
        let vertices_removed = vertices_before - event.vertices.len();

        let stats = PruneStats {
            particles_removed,
            vertices_removed,
        };
        debug!(
            event = event.number,
            particles_removed, vertices_removed, "pruned event"
        );
        stats
    }
}
