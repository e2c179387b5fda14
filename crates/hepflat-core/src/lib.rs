//! hepflat-core: event model, HepMC2 ASCII reader/writer, and the
//! graph-flattening engine.
//!
//! The pipeline is: [`event::HepMcReader`] delivers one [`event::GenEvent`]
//! at a time → [`flatten::Flattener`] turns it into a densely-indexed
//! [`flatten::EventRow`] → a [`sink::RowSink`] commits the row. Events are
//! independent; buffers are reset at every event boundary.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at the library seams; callers attach
//!   context with `anyhow` at the binary boundary.
//! - **Logging**: `tracing` macros (`warn!`, `debug!`, `trace!`).

#![forbid(unsafe_code)]

pub mod event;
pub mod flatten;
pub mod prune;
pub mod sink;

pub use event::{GenEvent, HepMcReader, HepMcWriter, Particle, ReadError, Vertex};
pub use flatten::{EventRow, FlattenError, FlattenOptions, Flattener};
pub use prune::{PruneFilter, PruneStats};
pub use sink::{JsonlSink, MemorySink, RowSink, SinkError};
