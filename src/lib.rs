//! # tob-reconstructor
//!
//! Top-of-book reconstruction from a stream of order events.
//!
//! The library rebuilds a two-sided limit order book from add / modify /
//! remove / clear events and reports, after every event, the best price
//! level on each side with its aggregate quantity and order count.
//!
//! ## Features
//!
//! - **Incremental best level**: cached aggregate for the best price, no
//!   full recomputation per event
//! - **Lazy-purge price ranking**: binary heap per side, arbitrary removals
//!   deferred until the stale price surfaces at the top
//! - **Binary decoding**: fixed 26-byte big-endian event records
//! - **Text output**: semicolon-delimited lines with a fixed header
//! - **Optional timing**: per-event and total apply latency
//!
//! ## Quick Start
//!
//! ```rust
//! use tob_reconstructor::{BestLevel, BookEvent, EventProcessor, Side};
//!
//! let mut processor = EventProcessor::new();
//!
//! processor.apply(&BookEvent::add(Side::Bid, 1, 100, 50));
//! processor.apply(&BookEvent::add(Side::Bid, 2, 100, 25));
//! let top = processor.apply(&BookEvent::add(Side::Ask, 3, 101, 10));
//!
//! assert_eq!(top.bid, Some(BestLevel::new(100, 75, 2)));
//! assert_eq!(top.ask, Some(BestLevel::new(101, 10, 1)));
//! ```
//!
//! ### Replaying a File
//!
//! ```ignore
//! use tob_reconstructor::{ReplayConfig, Replayer};
//!
//! let config = ReplayConfig::new("data/ticks.bin", "data/book.csv").with_timing(true);
//! let summary = Replayer::new(config)?.run()?;
//!
//! if let Some(timing) = summary.timing {
//!     println!("Avg time per tick: {:.3} us", timing.avg_us);
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | `BookEvent`, `Side`, `Action`, `BestLevel`, `TopOfBook`, `EventRecord` |
//! | [`lob`] | `SideBook`, `PriceRanking`, `OrderRegistry`, `EventProcessor`, `TimedProcessor` |
//! | [`codec`] | Binary record decoding/encoding |
//! | [`source`] | `EventSource` trait, `VecSource`, `FileSource` |
//! | [`format`] | Text line formatting, `CsvWriter` |
//! | [`replay`] | `ReplayConfig`, `Replayer`, `ReplaySummary` |
//! | [`statistics`] | `RunningStats`, `SessionStats` |

pub mod codec;
pub mod error;
pub mod format;
pub mod lob;
pub mod replay;
pub mod source;
pub mod statistics;
pub mod types;

// Re-exports - Core types
pub use error::{Result, TobError};
pub use types::{Action, BestLevel, BookEvent, EventRecord, Side, TopOfBook};

// Re-exports - Book
pub use lob::{
    ApplyEvent, AskBook, BidBook, EventProcessor, ModifyPolicy, ProcessorConfig, ProcessorStats,
    SideBook, TimedProcessor, TimingReport,
};

// Re-exports - I/O
pub use codec::{EventDecoder, RECORD_SIZE};
pub use format::{CsvWriter, HEADER};
pub use source::{EventSource, FileSource, SourceMetadata, VecSource};

// Re-exports - Replay
pub use replay::{ReplayConfig, ReplaySummary, Replayer};

// Re-exports - Statistics
pub use statistics::{RunningStats, SessionStats};
