//! Structural properties of the flattening engine over generated events.

use proptest::prelude::*;

use hepflat_core::event::{FourVector, GenEvent, Particle, Vertex};
use hepflat_core::flatten::{EventRow, FlattenOptions, Flattener, NO_INDEX};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// A consistent random event: unique sparse barcodes, every particle
/// vertex reference points at a vertex that exists.
fn arb_event() -> impl Strategy<Value = GenEvent> {
    (0usize..6, 0usize..12).prop_flat_map(|(n_vertices, n_particles)| {
        let vertex_ref = prop::option::of(0..n_vertices.max(1));
        let particle = (
            vertex_ref.clone(),
            vertex_ref,
            -25i32..25,
            1i32..4,
            (-50.0f64..50.0, -50.0f64..50.0, -50.0f64..50.0),
        );
        (
            prop::collection::vec(particle, n_particles),
            any::<i32>(),
            Just(n_vertices),
        )
            .prop_map(|(specs, number, n_vertices)| {
                let vertices: Vec<Vertex> = (0..n_vertices)
                    .map(|k| Vertex {
                        // Sparse, non-contiguous barcodes.
                        barcode: -(i32::try_from(k).unwrap_or(0) * 3 + 1),
                        z: f64::from(u32::try_from(k).unwrap_or(0)),
                        ..Vertex::default()
                    })
                    .collect();

                let vertex_barcode = |slot: Option<usize>| {
                    if n_vertices == 0 {
                        return 0;
                    }
                    slot.map_or(0, |k| vertices[k].barcode)
                };

                let particles: Vec<Particle> = specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (prod, end, pdg_id, status, (px, py, pz)))| {
                        let e = (px * px + py * py + pz * pz).sqrt() + 1.0;
                        Particle {
                            // Sparse barcodes here too.
                            barcode: i32::try_from(i).unwrap_or(0) * 7 + 2,
                            pdg_id,
                            status,
                            momentum: FourVector::new(px, py, pz, e),
                            prod_vtx_barcode: vertex_barcode(prod),
                            end_vtx_barcode: vertex_barcode(end),
                            ..Particle::default()
                        }
                    })
                    .collect();

                GenEvent {
                    number,
                    vertices,
                    particles,
                    ..GenEvent::default()
                }
            })
    })
}

fn flatten(event: &GenEvent, flat: bool) -> EventRow {
    let mut flattener = Flattener::new(FlattenOptions { flat });
    let mut row = EventRow::new();
    flattener
        .flatten(event, &mut row)
        .expect("generated events are consistent");
    row
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    /// Column lengths all equal the particle/vertex counts; dense indices
    /// cover 0..n without gaps because each forward pass pushes one slot.
    #[test]
    fn columns_are_densely_indexed(event in arb_event()) {
        let row = flatten(&event, false);
        let n = event.particles.len();
        let v = event.vertices.len();

        prop_assert_eq!(row.pdg_id.len(), n);
        prop_assert_eq!(row.barcode.len(), n);
        prop_assert_eq!(row.prod_vtx.len(), n);
        prop_assert_eq!(row.decay_vtx.len(), n);
        prop_assert_eq!(row.children.len(), n);
        prop_assert_eq!(row.parents.len(), n);
        prop_assert_eq!(row.pt.len(), n);
        prop_assert_eq!(row.vtx_barcode.len(), v);
        prop_assert_eq!(row.vtx_part_in.len(), v);
        prop_assert_eq!(row.vtx_part_out.len(), v);

        // Barcode columns are the source barcodes in dense-index order.
        for (i, particle) in event.particles.iter().enumerate() {
            prop_assert_eq!(row.barcode[i], particle.barcode);
        }
        for (k, vertex) in event.vertices.iter().enumerate() {
            prop_assert_eq!(row.vtx_barcode[k], vertex.barcode);
        }
    }

    /// A particle's vertex index always agrees with its vertex barcode.
    #[test]
    fn vertex_indices_agree_with_barcodes(event in arb_event()) {
        let row = flatten(&event, false);
        for i in 0..event.particles.len() {
            for (index_col, barcode_col) in [
                (&row.prod_vtx, &row.prod_vtx_barcode),
                (&row.decay_vtx, &row.decay_vtx_barcode),
            ] {
                let v = index_col[i];
                if v == NO_INDEX {
                    prop_assert_eq!(barcode_col[i], 0);
                } else {
                    let v = usize::try_from(v).expect("non-negative index");
                    prop_assert_eq!(row.vtx_barcode[v], barcode_col[i]);
                }
            }
        }
    }

    /// Bidirectional consistency: a vertex's outgoing list is exactly the
    /// particles whose production index is that vertex, and symmetrically
    /// for incoming/decay.
    #[test]
    fn vertex_particle_consistency(event in arb_event()) {
        let row = flatten(&event, false);
        for (v, _) in event.vertices.iter().enumerate() {
            let vi = i32::try_from(v).expect("small index");
            let expected_out: Vec<i32> = (0..event.particles.len())
                .filter(|&i| row.prod_vtx[i] == vi)
                .map(|i| i32::try_from(i).expect("small index"))
                .collect();
            let expected_in: Vec<i32> = (0..event.particles.len())
                .filter(|&i| row.decay_vtx[i] == vi)
                .map(|i| i32::try_from(i).expect("small index"))
                .collect();
            prop_assert_eq!(&row.vtx_part_out[v], &expected_out);
            prop_assert_eq!(&row.vtx_part_in[v], &expected_in);
        }
    }

    /// children(i) == outgoing(decay(i)); parents(i) == incoming(prod(i)).
    #[test]
    fn adjacency_matches_vertex_lists(event in arb_event()) {
        let row = flatten(&event, false);
        for i in 0..event.particles.len() {
            let decay = row.decay_vtx[i];
            if decay == NO_INDEX {
                prop_assert!(row.children[i].is_empty());
            } else {
                let v = usize::try_from(decay).expect("non-negative index");
                prop_assert_eq!(&row.children[i], &row.vtx_part_out[v]);
            }

            let prod = row.prod_vtx[i];
            if prod == NO_INDEX {
                prop_assert!(row.parents[i].is_empty());
            } else {
                let v = usize::try_from(prod).expect("non-negative index");
                prop_assert_eq!(&row.parents[i], &row.vtx_part_in[v]);
            }
        }
    }

    /// Re-flattening the same event into reused buffers is a no-op.
    #[test]
    fn flatten_is_idempotent(event in arb_event()) {
        let mut flattener = Flattener::new(FlattenOptions::default());
        let mut row = EventRow::new();
        flattener.flatten(&event, &mut row).expect("first pass");
        let first = row.clone();
        flattener.flatten(&event, &mut row).expect("second pass");
        prop_assert_eq!(first, row);
    }

    /// Flat mode: identical kinematics, empty graph columns.
    #[test]
    fn flat_mode_is_kinematics_only(event in arb_event()) {
        let full = flatten(&event, false);
        let flat = flatten(&event, true);

        prop_assert_eq!(&flat.pdg_id, &full.pdg_id);
        prop_assert_eq!(&flat.status, &full.status);
        prop_assert_eq!(&flat.pt, &full.pt);
        prop_assert_eq!(&flat.e, &full.e);
        prop_assert_eq!(&flat.eta, &full.eta);
        prop_assert_eq!(&flat.phi, &full.phi);

        prop_assert!(flat.prod_vtx.is_empty());
        prop_assert!(flat.vtx_barcode.is_empty());
        prop_assert!(flat.children.is_empty());
        prop_assert!(flat.parents.is_empty());
    }
}
