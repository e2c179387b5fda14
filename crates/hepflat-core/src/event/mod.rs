//! In-memory model of one HepMC2 generator event.
//!
//! A [`GenEvent`] is a directed graph: particles are edges, decay vertices
//! are nodes. The wire format keys everything by event-local integer
//! *barcodes* (positive for particles, conventionally negative for
//! vertices, `0` meaning "no vertex"). The model keeps those raw barcodes
//! rather than object links — the flattening engine resolves them to dense
//! indices, and the reader/writer round-trip them verbatim.

pub mod reader;
pub mod writer;

pub use reader::{HepMcReader, ReadError};
pub use writer::HepMcWriter;

/// Barcode value meaning "no vertex attached" on a particle record.
pub const NO_VERTEX: i32 = 0;

// ---------------------------------------------------------------------------
// FourVector
// ---------------------------------------------------------------------------

/// A momentum four-vector `(px, py, pz, E)` with the HepMC kinematic
/// conventions for derived quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FourVector {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourVector {
    #[must_use]
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Transverse momentum `sqrt(px² + py²)`.
    #[must_use]
    pub fn perp(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Invariant mass, signed: `sign(m²) · sqrt(|m²|)`.
    ///
    /// Spacelike vectors (numerical artifacts in generator output) yield a
    /// negative value instead of NaN, matching the HepMC convention.
    #[must_use]
    pub fn m(&self) -> f64 {
        let m2 = self.e * self.e
            - (self.px * self.px + self.py * self.py + self.pz * self.pz);
        if m2 < 0.0 { -(-m2).sqrt() } else { m2.sqrt() }
    }

    /// Pseudorapidity `-ln tan(θ/2)` with `θ = atan2(pt, pz)`.
    ///
    /// A vector exactly along the beam axis (`pt == 0`) yields ±infinity.
    #[must_use]
    pub fn eta(&self) -> f64 {
        let theta = self.perp().atan2(self.pz);
        -(theta / 2.0).tan().ln()
    }

    /// Azimuthal angle `atan2(py, px)` in `(-π, π]`.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }
}

// ---------------------------------------------------------------------------
// Particle / Vertex
// ---------------------------------------------------------------------------

/// One particle record (`P` line) as delivered by the reader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particle {
    /// Event-local barcode. Unique and positive, but not contiguous.
    pub barcode: i32,
    /// PDG particle species code.
    pub pdg_id: i32,
    pub momentum: FourVector,
    /// Generated mass from the event record (may differ from `momentum.m()`).
    pub generated_mass: f64,
    /// Generator status code. Status 1 means final state.
    pub status: i32,
    /// Polarization polar angle.
    pub theta_pol: f64,
    /// Polarization azimuthal angle.
    pub phi_pol: f64,
    /// Barcode of the vertex this particle was produced at, or [`NO_VERTEX`].
    pub prod_vtx_barcode: i32,
    /// Barcode of the vertex this particle decays at, or [`NO_VERTEX`].
    pub end_vtx_barcode: i32,
    /// Color-flow `(code_index, code)` pairs.
    pub flow: Vec<(i32, i32)>,
}

impl Particle {
    /// Whether this particle is final state (status 1).
    #[must_use]
    pub const fn is_final_state(&self) -> bool {
        self.status == 1
    }

    #[must_use]
    pub const fn has_production_vertex(&self) -> bool {
        self.prod_vtx_barcode != NO_VERTEX
    }

    #[must_use]
    pub const fn has_end_vertex(&self) -> bool {
        self.end_vtx_barcode != NO_VERTEX
    }
}

/// One decay vertex record (`V` line) as delivered by the reader.
///
/// Incoming and outgoing particle sets are not stored here: they are the
/// particles whose `end_vtx_barcode` / `prod_vtx_barcode` equal this
/// vertex's barcode, in particle record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertex {
    /// Event-local barcode. Unique, conventionally negative.
    pub barcode: i32,
    /// Vertex id (generator-specific).
    pub id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
    /// Vertex weights, rarely populated.
    pub weights: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Event-level metadata
// ---------------------------------------------------------------------------

/// Parton-distribution-function metadata (`F` line).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PdfInfo {
    pub id1: i32,
    pub id2: i32,
    pub x1: f64,
    pub x2: f64,
    pub scale_pdf: f64,
    pub pdf1: f64,
    pub pdf2: f64,
    pub pdf_id1: i32,
    pub pdf_id2: i32,
}

/// Generated cross-section and its statistical error (`C` line).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossSection {
    pub value: f64,
    pub error: f64,
}

/// One fully parsed generator event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenEvent {
    pub number: i32,
    /// Number of multiple-parton interactions.
    pub mpi: i32,
    /// Event (factorization) scale.
    pub scale: f64,
    pub alpha_qcd: f64,
    pub alpha_qed: f64,
    pub signal_process_id: i32,
    pub signal_vertex_barcode: i32,
    /// Barcodes of the two beam particles (`0` if unset).
    pub beam_barcodes: [i32; 2],
    pub random_states: Vec<i64>,
    pub weights: Vec<f64>,
    /// Names for `weights`, when the stream carried an `N` record.
    pub weight_names: Vec<String>,
    /// Momentum unit, e.g. `GEV`.
    pub momentum_unit: String,
    /// Length unit, e.g. `MM`.
    pub length_unit: String,
    pub cross_section: Option<CrossSection>,
    pub pdf_info: Option<PdfInfo>,
    /// Vertices in record order. Record order defines dense vertex indices.
    pub vertices: Vec<Vertex>,
    /// Particles in record order. Record order defines dense particle indices.
    pub particles: Vec<Particle>,
}

impl GenEvent {
    #[must_use]
    pub fn particles_size(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn vertices_size(&self) -> usize {
        self.vertices.len()
    }

    /// Particles produced at the vertex with `barcode`, in record order.
    pub fn outgoing_of(&self, barcode: i32) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(move |p| p.prod_vtx_barcode == barcode)
    }

    /// Particles ending at the vertex with `barcode`, in record order.
    pub fn incoming_of(&self, barcode: i32) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(move |p| p.end_vtx_barcode == barcode)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perp_is_transverse_momentum() {
        let p = FourVector::new(3.0, 4.0, 12.0, 13.0);
        assert!((p.perp() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn mass_of_timelike_vector() {
        // E=5, p=(3,0,4) → m² = 25 - 25 = 0
        let p = FourVector::new(3.0, 0.0, 4.0, 5.0);
        assert!(p.m().abs() < 1e-9);

        // E=10, p=(0,0,6) → m = 8
        let p = FourVector::new(0.0, 0.0, 6.0, 10.0);
        assert!((p.m() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn mass_of_spacelike_vector_is_negative() {
        let p = FourVector::new(2.0, 0.0, 0.0, 1.0);
        assert!(p.m() < 0.0);
        assert!((p.m() + 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn eta_sign_follows_pz() {
        let fwd = FourVector::new(1.0, 0.0, 10.0, 20.0);
        let bwd = FourVector::new(1.0, 0.0, -10.0, 20.0);
        assert!(fwd.eta() > 0.0);
        assert!((fwd.eta() + bwd.eta()).abs() < 1e-12, "eta is odd in pz");
    }

    #[test]
    fn eta_central_is_zero() {
        let p = FourVector::new(5.0, 0.0, 0.0, 5.0);
        assert!(p.eta().abs() < 1e-12);
    }

    #[test]
    fn phi_quadrants() {
        let p = FourVector::new(0.0, 1.0, 0.0, 1.0);
        assert!((p.phi() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let p = FourVector::new(-1.0, 0.0, 0.0, 1.0);
        assert!((p.phi() - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn final_state_is_status_one() {
        let p = Particle {
            status: 1,
            ..Particle::default()
        };
        assert!(p.is_final_state());
        let p = Particle {
            status: 2,
            ..Particle::default()
        };
        assert!(!p.is_final_state());
    }

    #[test]
    fn adjacency_iterators_follow_barcodes() {
        let event = GenEvent {
            vertices: vec![Vertex {
                barcode: -1,
                ..Vertex::default()
            }],
            particles: vec![
                Particle {
                    barcode: 1,
                    end_vtx_barcode: -1,
                    ..Particle::default()
                },
                Particle {
                    barcode: 2,
                    prod_vtx_barcode: -1,
                    ..Particle::default()
                },
                Particle {
                    barcode: 3,
                    prod_vtx_barcode: -1,
                    ..Particle::default()
                },
            ],
            ..GenEvent::default()
        };

        let incoming: Vec<i32> = event.incoming_of(-1).map(|p| p.barcode).collect();
        let outgoing: Vec<i32> = event.outgoing_of(-1).map(|p| p.barcode).collect();
        assert_eq!(incoming, vec![1]);
        assert_eq!(outgoing, vec![2, 3]);
    }
}
