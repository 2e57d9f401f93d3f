//! Per-position pileup statistics over aligned reads.
//!
//! Pick a statistic by name, point it at an [`AlignmentSource`] (and a
//! [`ReferenceSource`] for the reference-aware types), and pull one
//! [`StatRecord`] per genome position.

pub mod config;
pub mod error;
pub mod export;
pub mod load;
pub mod pileup;
pub mod reference;
pub mod stats;
pub mod types;
pub mod utils;

pub use error::{Result, StatsError};
pub use load::{load_pileup, Dtype, StatTable};
pub use pileup::{AlignmentSource, BamSource, MemoryAlignments, PositionIter};
pub use reference::{FastaReference, MemoryReference, ReferenceSource};
pub use stats::record::{ColumnKind, StatRecord, Value};
pub use stats::registry::{lookup, StatType};
pub use stats::{stat_pileup, GcWindow, PileupOptions};
pub use types::{Interval, Region};
