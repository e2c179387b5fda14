//! The per-event graph-flattening engine.
//!
//! Takes one parsed [`GenEvent`] — a decay graph keyed by sparse
//! barcodes — and populates an [`EventRow`] of densely-indexed columns.
//! One forward pass over the vertex collection assigns vertex indices and
//! positions; one forward pass over the particle collection assigns
//! particle indices, fills the kinematic columns, and joins each particle
//! to its production/decay vertex through the [`BarcodeIndex`], building
//! the vertex in/out lists as it goes. A second pass
//! ([`derive_adjacency`]) then copies the completed vertex lists into
//! per-particle parent/child columns.
//!
//! In `flat` mode the vertex and adjacency work is skipped entirely and
//! the row reduces to per-particle kinematics — a deliberate
//! reduced-schema mode, not a partial failure.

pub mod adjacency;
pub mod columns;
pub mod index;

pub use adjacency::derive_adjacency;
pub use columns::{EventRow, NO_INDEX};
pub use index::BarcodeIndex;

use std::fmt;

use tracing::trace;

use crate::event::{GenEvent, NO_VERTEX};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which end of a particle a vertex reference sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexRole {
    Production,
    Decay,
}

impl fmt::Display for VertexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Decay => write!(f, "decay"),
        }
    }
}

/// Errors raised while flattening one event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    /// A particle points at a vertex barcode absent from the event.
    ///
    /// Upstream data corruption: the event must not be emitted partially,
    /// and the run aborts rather than coercing the reference to "none".
    #[error(
        "event {event_number}: particle {particle_barcode} references \
         missing {role} vertex {vertex_barcode}"
    )]
    DanglingVertexReference {
        event_number: i32,
        particle_barcode: i32,
        vertex_barcode: i32,
        role: VertexRole,
    },
}

// ---------------------------------------------------------------------------
// Flattener
// ---------------------------------------------------------------------------

/// Configuration for the flattening pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenOptions {
    /// Emit only per-particle kinematic/identity columns; leave vertex and
    /// adjacency columns empty.
    pub flat: bool,
}

/// The event flattener. Owns the [`BarcodeIndex`] and reuses it across
/// events; the column buffers are passed in per call so callers control
/// their lifetime.
#[derive(Debug, Default)]
pub struct Flattener {
    options: FlattenOptions,
    index: BarcodeIndex,
}

impl Flattener {
    #[must_use]
    pub fn new(options: FlattenOptions) -> Self {
        Self {
            options,
            index: BarcodeIndex::new(),
        }
    }

    /// Flatten `event` into `row`.
    ///
    /// `row` is reset first, so any previous contents are discarded. The
    /// source event is never mutated. On error the row contents are
    /// unspecified and must not be emitted.
    ///
    /// # Errors
    ///
    /// [`FlattenError::DanglingVertexReference`] if a particle references
    /// a vertex barcode that does not exist in this event.
    pub fn flatten(&mut self, event: &GenEvent, row: &mut EventRow) -> Result<(), FlattenError> {
        row.reset();
        self.index.rebuild(event);

        self.fill_scalars(event, row);
        if !self.options.flat {
            Self::fill_vertices(event, row);
        }
        self.fill_particles(event, row)?;
        if !self.options.flat {
            derive_adjacency(row);
        }

        trace!(
            event = event.number,
            particles = event.particles_size(),
            vertices = event.vertices_size(),
            flat = self.options.flat,
            "flattened event"
        );
        Ok(())
    }

    /// Copy global scalars and the weight list verbatim.
    fn fill_scalars(&self, event: &GenEvent, row: &mut EventRow) {
        row.event_number = event.number;
        row.n_particles = i32::try_from(event.particles_size()).unwrap_or(i32::MAX);
        row.n_vertices = i32::try_from(event.vertices_size()).unwrap_or(i32::MAX);
        row.mpi = event.mpi;
        row.scale = event.scale;
        row.alpha_qcd = event.alpha_qcd;
        row.alpha_qed = event.alpha_qed;

        if let Some(pdf) = event.pdf_info {
            row.id1 = pdf.id1;
            row.id2 = pdf.id2;
            row.pdf_id1 = pdf.pdf_id1;
            row.pdf_id2 = pdf.pdf_id2;
            row.x1 = pdf.x1;
            row.x2 = pdf.x2;
            row.scale_pdf = pdf.scale_pdf;
            row.pdf1 = pdf.pdf1;
            row.pdf2 = pdf.pdf2;
        }

        row.weights.extend_from_slice(&event.weights);
    }

    /// Forward pass over the vertex collection: dense vertex index is the
    /// position of first encounter. Adjacency lists start empty and are
    /// filled by the particle pass.
    fn fill_vertices(event: &GenEvent, row: &mut EventRow) {
        for vertex in &event.vertices {
            row.vtx_barcode.push(vertex.barcode);
            row.vtx_x.push(vertex.x);
            row.vtx_y.push(vertex.y);
            row.vtx_z.push(vertex.z);
            row.vtx_t.push(vertex.t);
            row.vtx_part_in.push(Vec::new());
            row.vtx_part_out.push(Vec::new());
            row.vtx_part_in_barcode.push(Vec::new());
            row.vtx_part_out_barcode.push(Vec::new());
        }
    }

    /// Forward pass over the particle collection: dense particle index is
    /// the position of first encounter. Fills identity/kinematic columns
    /// and, unless `flat`, resolves both vertex references and appends
    /// this particle to the vertex adjacency lists.
    fn fill_particles(&self, event: &GenEvent, row: &mut EventRow) -> Result<(), FlattenError> {
        for (i, particle) in event.particles.iter().enumerate() {
            row.pdg_id.push(particle.pdg_id);
            row.barcode.push(particle.barcode);
            row.status.push(particle.status);
            row.is_final_state.push(particle.is_final_state());

            let momentum = &particle.momentum;
            row.pt.push(momentum.perp());
            row.e.push(momentum.e);
            row.m.push(momentum.m());
            row.eta.push(momentum.eta());
            row.phi.push(momentum.phi());

            if self.options.flat {
                continue;
            }

            let index = i32::try_from(i).unwrap_or(i32::MAX);

            row.prod_vtx_barcode.push(particle.prod_vtx_barcode);
            row.decay_vtx_barcode.push(particle.end_vtx_barcode);

            let prod = self.resolve_vertex(
                event,
                particle.barcode,
                particle.prod_vtx_barcode,
                VertexRole::Production,
            )?;
            let prod_index = match prod {
                Some(v) => {
                    row.vtx_part_out[v].push(index);
                    row.vtx_part_out_barcode[v].push(particle.barcode);
                    i32::try_from(v).unwrap_or(i32::MAX)
                }
                None => NO_INDEX,
            };
            row.prod_vtx.push(prod_index);

            let decay = self.resolve_vertex(
                event,
                particle.barcode,
                particle.end_vtx_barcode,
                VertexRole::Decay,
            )?;
            let decay_index = match decay {
                Some(v) => {
                    row.vtx_part_in[v].push(index);
                    row.vtx_part_in_barcode[v].push(particle.barcode);
                    i32::try_from(v).unwrap_or(i32::MAX)
                }
                None => NO_INDEX,
            };
            row.decay_vtx.push(decay_index);
        }
        Ok(())
    }

    /// Resolve a vertex barcode to its dense index. `NO_VERTEX` resolves
    /// to `None`; any other unknown barcode is a data-integrity fault.
    fn resolve_vertex(
        &self,
        event: &GenEvent,
        particle_barcode: i32,
        vertex_barcode: i32,
        role: VertexRole,
    ) -> Result<Option<usize>, FlattenError> {
        if vertex_barcode == NO_VERTEX {
            return Ok(None);
        }
        self.index.vertex(vertex_barcode).map(Some).ok_or(
            FlattenError::DanglingVertexReference {
                event_number: event.number,
                particle_barcode,
                vertex_barcode,
                role,
            },
        )
    }
}
