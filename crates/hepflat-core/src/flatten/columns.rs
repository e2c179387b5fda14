//! Per-event column buffers.
//!
//! One [`EventRow`] holds the complete flattened output for a single
//! event: global scalars plus one slot per particle and per vertex in
//! every column. The struct is created once per process and reused —
//! [`EventRow::reset`] clears it at each event boundary while keeping the
//! allocations.
//!
//! Serde field names follow the original branch naming of the columnar
//! output (`alphaQCD`, `scalePDF`, `vtx_part_in_barcode`, ...), so the
//! JSONL rows are drop-in for existing analysis code.

use serde::{Deserialize, Serialize};

/// Dense-index sentinel for "no vertex" in `prod_vtx` / `decay_vtx`.
pub const NO_INDEX: i32 = -1;

/// The flattened, column-oriented record for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    // -- global scalars ----------------------------------------------------
    pub event_number: i32,
    pub n_particles: i32,
    pub n_vertices: i32,
    /// Multiple-parton-interaction count.
    pub mpi: i32,
    pub scale: f64,
    #[serde(rename = "alphaQCD")]
    pub alpha_qcd: f64,
    #[serde(rename = "alphaQED")]
    pub alpha_qed: f64,

    // -- PDF metadata (zero when the event carried no F record) ------------
    pub id1: i32,
    pub id2: i32,
    pub pdf_id1: i32,
    pub pdf_id2: i32,
    pub x1: f64,
    pub x2: f64,
    #[serde(rename = "scalePDF")]
    pub scale_pdf: f64,
    pub pdf1: f64,
    pub pdf2: f64,

    /// Event weights, copied verbatim.
    pub weights: Vec<f64>,

    // -- particle columns, one slot per particle ---------------------------
    pub pdg_id: Vec<i32>,
    pub barcode: Vec<i32>,
    pub status: Vec<i32>,
    pub is_final_state: Vec<bool>,
    /// Dense production-vertex index, or [`NO_INDEX`].
    pub prod_vtx: Vec<i32>,
    /// Dense decay-vertex index, or [`NO_INDEX`].
    pub decay_vtx: Vec<i32>,
    /// Production-vertex barcode, `0` if none.
    pub prod_vtx_barcode: Vec<i32>,
    /// Decay-vertex barcode, `0` if none.
    pub decay_vtx_barcode: Vec<i32>,
    pub pt: Vec<f64>,
    pub e: Vec<f64>,
    pub m: Vec<f64>,
    pub eta: Vec<f64>,
    pub phi: Vec<f64>,
    /// Dense indices of each particle's decay products.
    pub children: Vec<Vec<i32>>,
    /// Dense indices of each particle's parents.
    pub parents: Vec<Vec<i32>>,

    // -- vertex columns, one slot per vertex -------------------------------
    pub vtx_barcode: Vec<i32>,
    pub vtx_x: Vec<f64>,
    pub vtx_y: Vec<f64>,
    pub vtx_z: Vec<f64>,
    pub vtx_t: Vec<f64>,
    /// Dense indices of particles ending at each vertex.
    pub vtx_part_in: Vec<Vec<i32>>,
    /// Dense indices of particles produced at each vertex.
    pub vtx_part_out: Vec<Vec<i32>>,
    pub vtx_part_in_barcode: Vec<Vec<i32>>,
    pub vtx_part_out_barcode: Vec<Vec<i32>>,
}

impl EventRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every column and zero every scalar, keeping allocations.
    ///
    /// Must be called at each event boundary; no state besides capacity
    /// survives across events.
    pub fn reset(&mut self) {
        self.event_number = 0;
        self.n_particles = 0;
        self.n_vertices = 0;
        self.mpi = 0;
        self.scale = 0.0;
        self.alpha_qcd = 0.0;
        self.alpha_qed = 0.0;

        self.id1 = 0;
        self.id2 = 0;
        self.pdf_id1 = 0;
        self.pdf_id2 = 0;
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.scale_pdf = 0.0;
        self.pdf1 = 0.0;
        self.pdf2 = 0.0;

        self.weights.clear();

        self.pdg_id.clear();
        self.barcode.clear();
        self.status.clear();
        self.is_final_state.clear();
        self.prod_vtx.clear();
        self.decay_vtx.clear();
        self.prod_vtx_barcode.clear();
        self.decay_vtx_barcode.clear();
        self.pt.clear();
        self.e.clear();
        self.m.clear();
        self.eta.clear();
        self.phi.clear();
        self.children.clear();
        self.parents.clear();

        self.vtx_barcode.clear();
        self.vtx_x.clear();
        self.vtx_y.clear();
        self.vtx_z.clear();
        self.vtx_t.clear();
        self.vtx_part_in.clear();
        self.vtx_part_out.clear();
        self.vtx_part_in_barcode.clear();
        self.vtx_part_out_barcode.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_default() {
        let mut row = EventRow::new();
        row.event_number = 17;
        row.scale_pdf = 91.2;
        row.weights.push(1.0);
        row.pdg_id.push(11);
        row.children.push(vec![1, 2]);
        row.vtx_barcode.push(-3);

        row.reset();
        assert_eq!(row, EventRow::default());
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut row = EventRow::new();
        row.pdg_id.extend(0..1000);
        let cap = row.pdg_id.capacity();
        row.reset();
        assert_eq!(row.pdg_id.capacity(), cap);
    }

    #[test]
    fn column_names_match_storage_layout() {
        let row = EventRow::default();
        let json = serde_json::to_value(&row).expect("serialize row");
        let obj = json.as_object().expect("row serializes to an object");

        for name in [
            "event_number",
            "alphaQCD",
            "alphaQED",
            "scalePDF",
            "pdg_id",
            "is_final_state",
            "prod_vtx_barcode",
            "vtx_part_in_barcode",
            "vtx_part_out",
            "children",
            "parents",
        ] {
            assert!(obj.contains_key(name), "missing column {name}");
        }
    }
}
