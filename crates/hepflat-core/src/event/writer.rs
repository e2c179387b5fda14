//! HepMC2 ASCII writer.
//!
//! Inverse of [`super::reader`]: serializes [`GenEvent`] structs back to
//! the `HepMC::IO_GenEvent` textual format, one `E` block per event. The
//! output parses back to an equal [`GenEvent`] and is readable by upstream
//! HepMC2 tooling. Used by the merge/split/prune stream filters.

use std::io::Write;

use tracing::warn;

use super::reader::{END_EVENT_LISTING, START_EVENT_LISTING};
use super::{GenEvent, Particle, Vertex};

/// Version banner emitted before the event listing.
const VERSION_BANNER: &str = "HepMC::Version 2.06.09";

/// Streaming writer producing one HepMC2 ASCII event listing.
///
/// The framing banner is written lazily on the first event; [`finish`]
/// closes the listing and flushes. Dropping without `finish` leaves the
/// listing unterminated, which the reader tolerates but other HepMC2
/// consumers may not.
///
/// [`finish`]: HepMcWriter::finish
#[derive(Debug)]
pub struct HepMcWriter<W: Write> {
    out: W,
    started: bool,
    events_written: u64,
}

impl<W: Write> HepMcWriter<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            started: false,
            events_written: 0,
        }
    }

    /// Number of events written so far.
    #[must_use]
    pub const fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Serialize one event.
    ///
    /// Every particle must reference at least one vertex of the event: the
    /// format attaches particles to `V` blocks, so a particle with neither
    /// a production nor an end vertex has no place in the output and is
    /// dropped with a warning. The reader never produces such particles.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures from the underlying writer.
    pub fn write_event(&mut self, event: &GenEvent) -> std::io::Result<()> {
        if !self.started {
            writeln!(self.out, "{VERSION_BANNER}")?;
            writeln!(self.out, "{START_EVENT_LISTING}")?;
            self.started = true;
        }

        self.write_header(event)?;
        self.write_metadata(event)?;
        for vertex in &event.vertices {
            self.write_vertex_block(event, vertex)?;
        }
        for particle in &event.particles {
            if !particle.has_production_vertex() && !particle.has_end_vertex() {
                warn!(
                    event = event.number,
                    barcode = particle.barcode,
                    "particle attached to no vertex; dropped from output"
                );
            }
        }

        self.events_written += 1;
        Ok(())
    }

    /// Close the event listing and flush.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures from the underlying writer.
    pub fn finish(mut self) -> std::io::Result<()> {
        if self.started {
            writeln!(self.out, "{END_EVENT_LISTING}")?;
        }
        self.out.flush()
    }

    fn write_header(&mut self, event: &GenEvent) -> std::io::Result<()> {
        write!(
            self.out,
            "E {} {} {} {} {} {} {} {} {} {} {}",
            event.number,
            event.mpi,
            event.scale,
            event.alpha_qcd,
            event.alpha_qed,
            event.signal_process_id,
            event.signal_vertex_barcode,
            event.vertices.len(),
            event.beam_barcodes[0],
            event.beam_barcodes[1],
            event.random_states.len(),
        )?;
        for state in &event.random_states {
            write!(self.out, " {state}")?;
        }
        write!(self.out, " {}", event.weights.len())?;
        for weight in &event.weights {
            write!(self.out, " {weight}")?;
        }
        writeln!(self.out)
    }

    fn write_metadata(&mut self, event: &GenEvent) -> std::io::Result<()> {
        if !event.weight_names.is_empty() {
            write!(self.out, "N {}", event.weight_names.len())?;
            for name in &event.weight_names {
                write!(self.out, " \"{name}\"")?;
            }
            writeln!(self.out)?;
        }

        if !event.momentum_unit.is_empty() || !event.length_unit.is_empty() {
            writeln!(
                self.out,
                "U {} {}",
                event.momentum_unit, event.length_unit
            )?;
        }

        if let Some(xs) = event.cross_section {
            writeln!(self.out, "C {} {}", xs.value, xs.error)?;
        }

        if let Some(pdf) = event.pdf_info {
            writeln!(
                self.out,
                "F {} {} {} {} {} {} {} {} {}",
                pdf.id1,
                pdf.id2,
                pdf.x1,
                pdf.x2,
                pdf.scale_pdf,
                pdf.pdf1,
                pdf.pdf2,
                pdf.pdf_id1,
                pdf.pdf_id2,
            )?;
        }

        Ok(())
    }

    /// Write one `V` record followed by its particles: orphan incoming
    /// first (no production vertex, ending here), then outgoing.
    fn write_vertex_block(
        &mut self,
        event: &GenEvent,
        vertex: &Vertex,
    ) -> std::io::Result<()> {
        let orphans: Vec<&Particle> = event
            .incoming_of(vertex.barcode)
            .filter(|p| !p.has_production_vertex())
            .collect();
        let outgoing: Vec<&Particle> = event.outgoing_of(vertex.barcode).collect();

        write!(
            self.out,
            "V {} {} {} {} {} {} {} {} {}",
            vertex.barcode,
            vertex.id,
            vertex.x,
            vertex.y,
            vertex.z,
            vertex.t,
            orphans.len(),
            outgoing.len(),
            vertex.weights.len(),
        )?;
        for weight in &vertex.weights {
            write!(self.out, " {weight}")?;
        }
        writeln!(self.out)?;

        for particle in orphans.into_iter().chain(outgoing) {
            self.write_particle(particle)?;
        }
        Ok(())
    }

    fn write_particle(&mut self, particle: &Particle) -> std::io::Result<()> {
        write!(
            self.out,
            "P {} {} {} {} {} {} {} {} {} {} {} {}",
            particle.barcode,
            particle.pdg_id,
            particle.momentum.px,
            particle.momentum.py,
            particle.momentum.pz,
            particle.momentum.e,
            particle.generated_mass,
            particle.status,
            particle.theta_pol,
            particle.phi_pol,
            particle.end_vtx_barcode,
            particle.flow.len(),
        )?;
        for (code_index, code) in &particle.flow {
            write!(self.out, " {code_index} {code}")?;
        }
        writeln!(self.out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
