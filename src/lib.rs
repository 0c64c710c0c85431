//! Flanking-sequence extraction for LTR retrotransposon insertion discovery.
//!
//! Motif-scan reports are parsed into per-read hits, each hit gets a
//! strand and terminus aware extraction window, the flank plus the motif
//! literal are cut out of the reads and assembled into a FASTA collection
//! for alignment. Alignment hits are then filtered against an index of
//! genomic repeat intervals.

mod error;
mod record;
mod window;

pub mod alignment;
pub mod assemble;
pub mod config;
pub mod dir;
pub mod extract;
pub mod index;
pub mod pipeline;
pub mod reader;
pub mod reads;
pub mod repeats;

pub use alignment::{filter_hits, AlignmentHit, FilterStats};
pub use assemble::Assembler;
pub use error::{Error, ErrorKind, Result};
pub use index::HitIndex;
pub use reader::{parse_report, Reader, Report};
pub use reads::ReadsCursor;
pub use record::{read_key, Hit, HitEntry, SequenceRecord, Strand, Terminus};
pub use repeats::{RepeatIndex, RepeatInterval};
pub use window::{ExtractionWindow, Side};
