//! Parent/child adjacency derivation.
//!
//! Runs after the flattening pass has completed every vertex's incoming
//! and outgoing index lists. A particle's children are the particles
//! produced at the vertex where it decays; its parents are the particles
//! ending at the vertex where it was produced. Deriving this in the same
//! pass that builds the vertex lists would read partial lists for
//! vertices visited early, so it is a separate second pass by design.

use super::columns::{EventRow, NO_INDEX};

/// Fill `row.children` and `row.parents` from the completed vertex
/// adjacency lists.
///
/// For particle `i`: `children[i] == vtx_part_out[decay_vtx[i]]` and
/// `parents[i] == vtx_part_in[prod_vtx[i]]`, with detached particles
/// (index [`NO_INDEX`]) getting empty lists.
pub fn derive_adjacency(row: &mut EventRow) {
    let n = row.pdg_id.len();
    debug_assert_eq!(row.prod_vtx.len(), n);
    debug_assert_eq!(row.decay_vtx.len(), n);

    let mut children = Vec::with_capacity(n);
    let mut parents = Vec::with_capacity(n);

    for i in 0..n {
        let decay = row.decay_vtx[i];
        children.push(if decay == NO_INDEX {
            Vec::new()
        } else {
            row.vtx_part_out[usize::try_from(decay).unwrap_or_default()].clone()
        });

        let prod = row.prod_vtx[i];
        parents.push(if prod == NO_INDEX {
            Vec::new()
        } else {
            row.vtx_part_in[usize::try_from(prod).unwrap_or_default()].clone()
        });
    }

    row.children = children;
    row.parents = parents;
}
