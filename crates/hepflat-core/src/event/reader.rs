//! Line-oriented HepMC2 ASCII reader.
//!
//! Parses the `HepMC::IO_GenEvent` textual format into [`GenEvent`]
//! structs. One event is an `E` header record followed by metadata records
//! (`N`, `U`, `C`, `F`, `H`) and the vertex/particle listing (`V`, `P`).
//!
//! # Record grouping
//!
//! `P` records belong to the most recent `V` record. Each `V` record
//! declares how many of its following particles are *orphan incoming*
//! (they end at this vertex but have no production vertex); the rest are
//! outgoing, i.e. produced here. That grouping is the only place the
//! production-vertex barcode comes from — `P` records carry only the end
//! vertex explicitly.
//!
//! # Error policy
//!
//! A malformed record fails the *current event only*. The reader
//! resynchronizes on the next `E` line, so callers can count the failure
//! and keep going. I/O errors are not recoverable.

use std::io::BufRead;
use std::str::FromStr;

use tracing::{debug, warn};

use super::{CrossSection, FourVector, GenEvent, Particle, PdfInfo, Vertex};

/// Framing line that opens the event listing.
pub const START_EVENT_LISTING: &str = "HepMC::IO_GenEvent-START_EVENT_LISTING";

/// Framing line that closes the event listing.
pub const END_EVENT_LISTING: &str = "HepMC::IO_GenEvent-END_EVENT_LISTING";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while reading an event stream.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Underlying stream failure; not recoverable.
    #[error("I/O error reading event stream: {0}")]
    Io(#[from] std::io::Error),

    /// A record line did not match its expected shape.
    #[error("line {line}: malformed {record} record: {details}")]
    Malformed {
        /// 1-based line number in the input.
        line: u64,
        /// Record type character (`E`, `V`, `P`, ...).
        record: char,
        details: String,
    },
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Streaming reader over a HepMC2 ASCII source.
///
/// Also implements [`Iterator`] with `Item = Result<GenEvent, ReadError>`.
#[derive(Debug)]
pub struct HepMcReader<R> {
    input: R,
    line_no: u64,
    peeked: Option<String>,
}

impl<R: BufRead> HepMcReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line_no: 0,
            peeked: None,
        }
    }

    /// Read the next event.
    ///
    /// Returns `None` at end of stream. A `Some(Err(..))` with
    /// [`ReadError::Malformed`] leaves the reader positioned before the
    /// next `E` record, so the caller can skip the bad event and continue.
    pub fn next_event(&mut self) -> Option<Result<GenEvent, ReadError>> {
        loop {
            match self.next_line() {
                Err(err) => return Some(Err(err)),
                Ok(None) => return None,
                Ok(Some(line)) => {
                    let trimmed = line.trim_start();
                    if record_type(trimmed) == Some('E') {
                        return Some(self.read_event_body(trimmed));
                    }
                    // Framing lines, comments, and anything between
                    // listings are not part of an event.
                    debug!(line = self.line_no, "skipping line outside event");
                }
            }
        }
    }

    /// Parse the body of one event, starting from its `E` header line.
    fn read_event_body(&mut self, header: &str) -> Result<GenEvent, ReadError> {
        let mut event = self.parse_event_header(header)?;
        let declared_vertices = self.declared_vertex_count(header)?;

        // Grouping state for P records: the vertex they attach to, and how
        // many orphan incoming particles are still owed to it.
        let mut current_vertex: Option<i32> = None;
        let mut orphans_left: usize = 0;

        loop {
            let Some(line) = self.next_line()? else {
                break;
            };
            let trimmed = line.trim_start();

            match record_type(trimmed) {
                Some('E') => {
                    self.push_back(line);
                    break;
                }
                Some('N') => event.weight_names = self.parse_weight_names(trimmed)?,
                Some('U') => {
                    let f = Fields::split('U', self.line_no, trimmed);
                    event.momentum_unit = f.get::<String>(0)?;
                    event.length_unit = f.get::<String>(1)?;
                }
                Some('C') => {
                    let f = Fields::split('C', self.line_no, trimmed);
                    event.cross_section = Some(CrossSection {
                        value: f.get(0)?,
                        error: f.get(1)?,
                    });
                }
                Some('F') => event.pdf_info = Some(self.parse_pdf_info(trimmed)?),
                Some('H') => {
                    // Heavy-ion record; carried by some generators, not
                    // part of the flattened row.
                    debug!(line = self.line_no, "skipping heavy-ion record");
                }
                Some('V') => {
                    let (vertex, orphans) = self.parse_vertex(trimmed)?;
                    current_vertex = Some(vertex.barcode);
                    orphans_left = orphans;
                    event.vertices.push(vertex);
                }
                Some('P') => {
                    let prod_vtx_barcode = if orphans_left > 0 {
                        orphans_left -= 1;
                        super::NO_VERTEX
                    } else {
                        current_vertex.ok_or_else(|| ReadError::Malformed {
                            line: self.line_no,
                            record: 'P',
                            details: "particle record before any vertex".into(),
                        })?
                    };
                    let particle = self.parse_particle(trimmed, prod_vtx_barcode)?;
                    event.particles.push(particle);
                }
                _ => {
                    if trimmed == END_EVENT_LISTING {
                        break;
                    }
                    warn!(
                        line = self.line_no,
                        record = ?trimmed.chars().next(),
                        "skipping unknown record inside event"
                    );
                }
            }
        }

        if declared_vertices != event.vertices.len() {
            warn!(
                event = event.number,
                declared = declared_vertices,
                found = event.vertices.len(),
                "vertex count in E record disagrees with listing"
            );
        }

        Ok(event)
    }

    fn parse_event_header(&self, line: &str) -> Result<GenEvent, ReadError> {
        let f = Fields::split('E', self.line_no, line);

        let mut event = GenEvent {
            number: f.get(0)?,
            mpi: f.get(1)?,
            scale: f.get(2)?,
            alpha_qcd: f.get(3)?,
            alpha_qed: f.get(4)?,
            signal_process_id: f.get(5)?,
            signal_vertex_barcode: f.get(6)?,
            beam_barcodes: [f.get(8)?, f.get(9)?],
            ..GenEvent::default()
        };

        let n_random: usize = f.get(10)?;
        for k in 0..n_random {
            event.random_states.push(f.get(11 + k)?);
        }
        let n_weights: usize = f.get(11 + n_random)?;
        for k in 0..n_weights {
            event.weights.push(f.get(12 + n_random + k)?);
        }

        Ok(event)
    }

    fn declared_vertex_count(&self, header: &str) -> Result<usize, ReadError> {
        Fields::split('E', self.line_no, header).get(7)
    }

    /// Parse an `N` record. Names are double-quoted and may contain spaces.
    fn parse_weight_names(&self, line: &str) -> Result<Vec<String>, ReadError> {
        let malformed = |details: String| ReadError::Malformed {
            line: self.line_no,
            record: 'N',
            details,
        };

        let rest = line[1..].trim_start();
        let (count_str, names_part) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        let count: usize = count_str
            .parse()
            .map_err(|_| malformed(format!("bad name count '{count_str}'")))?;

        // Quoted segments are the odd-numbered chunks of a split on '"'.
        let names: Vec<String> = names_part
            .split('"')
            .enumerate()
            .filter(|(i, _)| i % 2 == 1)
            .map(|(_, name)| name.to_string())
            .collect();

        if names.len() != count {
            return Err(malformed(format!(
                "declared {count} names, found {}",
                names.len()
            )));
        }
        Ok(names)
    }

    fn parse_pdf_info(&self, line: &str) -> Result<PdfInfo, ReadError> {
        let f = Fields::split('F', self.line_no, line);
        Ok(PdfInfo {
            id1: f.get(0)?,
            id2: f.get(1)?,
            x1: f.get(2)?,
            x2: f.get(3)?,
            scale_pdf: f.get(4)?,
            pdf1: f.get(5)?,
            pdf2: f.get(6)?,
            pdf_id1: f.get(7)?,
            pdf_id2: f.get(8)?,
        })
    }

    /// Parse a `V` record. Returns the vertex plus its orphan-incoming count.
    fn parse_vertex(&self, line: &str) -> Result<(Vertex, usize), ReadError> {
        let f = Fields::split('V', self.line_no, line);

        let mut vertex = Vertex {
            barcode: f.get(0)?,
            id: f.get(1)?,
            x: f.get(2)?,
            y: f.get(3)?,
            z: f.get(4)?,
            t: f.get(5)?,
            weights: Vec::new(),
        };
        let orphans: usize = f.get(6)?;
        // Field 7 is the outgoing count; redundant with the P grouping.
        let n_weights: usize = f.get(8)?;
        for k in 0..n_weights {
            vertex.weights.push(f.get(9 + k)?);
        }

        Ok((vertex, orphans))
    }

    fn parse_particle(
        &self,
        line: &str,
        prod_vtx_barcode: i32,
    ) -> Result<Particle, ReadError> {
        let f = Fields::split('P', self.line_no, line);

        let mut particle = Particle {
            barcode: f.get(0)?,
            pdg_id: f.get(1)?,
            momentum: FourVector::new(f.get(2)?, f.get(3)?, f.get(4)?, f.get(5)?),
            generated_mass: f.get(6)?,
            status: f.get(7)?,
            theta_pol: f.get(8)?,
            phi_pol: f.get(9)?,
            prod_vtx_barcode,
            end_vtx_barcode: f.get(10)?,
            flow: Vec::new(),
        };
        let n_flow: usize = f.get(11)?;
        for k in 0..n_flow {
            particle
                .flow
                .push((f.get(12 + 2 * k)?, f.get(13 + 2 * k)?));
        }

        Ok(particle)
    }

    // -- line buffering ----------------------------------------------------

    fn next_line(&mut self) -> Result<Option<String>, ReadError> {
        if let Some(line) = self.peeked.take() {
            return Ok(Some(line));
        }
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn push_back(&mut self, line: String) {
        debug_assert!(self.peeked.is_none(), "single-line lookahead only");
        self.peeked = Some(line);
    }
}

impl<R: BufRead> Iterator for HepMcReader<R> {
    type Item = Result<GenEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Whitespace-tokenized record line with typed positional access.
struct Fields<'a> {
    record: char,
    line: u64,
    toks: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    /// Tokenize `line`, dropping the leading record-type token.
    fn split(record: char, line: u64, text: &'a str) -> Self {
        Self {
            record,
            line,
            toks: text.split_whitespace().skip(1).collect(),
        }
    }

    fn get<T: FromStr>(&self, index: usize) -> Result<T, ReadError> {
        let raw = self.toks.get(index).ok_or_else(|| ReadError::Malformed {
            line: self.line,
            record: self.record,
            details: format!("missing field {index}"),
        })?;
        raw.parse().map_err(|_| ReadError::Malformed {
            line: self.line,
            record: self.record,
            details: format!("field {index}: cannot parse '{raw}'"),
        })
    }
}

/// The record type of a line, if its first token is a single character.
fn record_type(trimmed: &str) -> Option<char> {
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    match chars.next() {
        Some(c) if !c.is_whitespace() => None,
        _ => Some(first),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
