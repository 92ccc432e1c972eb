//! Two-sided order book maintained from order events.
//!
//! Each side is a [`SideBook`] (registry + levels + ranking + cached best
//! level); [`EventProcessor`] drives both from a stream of events.

pub mod price_level;
pub mod processor;
pub mod ranking;
pub mod registry;
pub mod side_book;
pub mod timing;

pub use price_level::PriceLevel;
pub use processor::{EventProcessor, ProcessorConfig, ProcessorStats};
pub use ranking::{Ascending, Descending, PriceRanking, RankDirection};
pub use registry::OrderRegistry;
pub use side_book::{AskBook, BidBook, ModifyPolicy, SideBook};
pub use timing::{ApplyEvent, TimedProcessor, TimingReport};
