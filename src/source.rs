//! Event source abstraction.
//!
//! The replay pipeline consumes anything implementing [`EventSource`]:
//! an in-memory [`VecSource`] for tests and simulations, or a
//! [`FileSource`] reading the binary record format from disk.
//!
//! # Implementing Custom Sources
//!
//! ```
//! use tob_reconstructor::source::{EventSource, SourceMetadata};
//! use tob_reconstructor::{BookEvent, Result, Side};
//!
//! struct Generated {
//!     count: u64,
//!     metadata: SourceMetadata,
//! }
//!
//! impl EventSource for Generated {
//!     type EventIter = Box<dyn Iterator<Item = Result<BookEvent>>>;
//!
//!     fn events(self) -> Result<Self::EventIter> {
//!         Ok(Box::new((0..self.count).map(|id| -> Result<BookEvent> {
//!             Ok(BookEvent::add(Side::Bid, id, 100, 1))
//!         })))
//!     }
//!
//!     fn metadata(&self) -> &SourceMetadata {
//!         &self.metadata
//!     }
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::codec::{EventDecoder, IO_BUFFER_SIZE, RECORD_SIZE};
use crate::error::Result;
use crate::types::BookEvent;

// ============================================================================
// Source Metadata
// ============================================================================

/// Metadata about an event source, for logging and progress reporting.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    /// Original file path (if loaded from file)
    pub file_path: Option<PathBuf>,

    /// Source kind (e.g. "file", "memory")
    pub provider: Option<String>,

    /// Estimated event count
    pub estimated_events: Option<u64>,

    /// File size in bytes (if applicable)
    pub file_size: Option<u64>,
}

impl SourceMetadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file path.
    pub fn with_file_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the estimated event count.
    pub fn with_estimated_events(mut self, count: u64) -> Self {
        self.estimated_events = Some(count);
        self
    }

    /// Describe a binary event file. The event estimate is size / record size.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut metadata = Self::new().with_file_path(path).with_provider("file");

        if let Ok(meta) = std::fs::metadata(path) {
            metadata.file_size = Some(meta.len());
            metadata.estimated_events = Some(meta.len() / RECORD_SIZE as u64);
        }

        metadata
    }
}

// ============================================================================
// Event Source Trait
// ============================================================================

/// Trait for event sources.
///
/// - `events()` consumes `self`: sources are single-pass
/// - the iterator yields events in arrival order; an `Err` item reports a
///   decode or read failure
pub trait EventSource {
    /// The iterator type for events.
    type EventIter: Iterator<Item = Result<BookEvent>>;

    /// Consume the source and return an iterator over events.
    fn events(self) -> Result<Self::EventIter>;

    /// Get metadata about the source.
    fn metadata(&self) -> &SourceMetadata;
}

// ============================================================================
// Vector Source
// ============================================================================

/// A simple in-memory source.
///
/// # Example
///
/// ```
/// use tob_reconstructor::source::{EventSource, VecSource};
/// use tob_reconstructor::{BookEvent, Side};
///
/// let source = VecSource::new(vec![
///     BookEvent::add(Side::Bid, 1, 100, 10),
///     BookEvent::add(Side::Ask, 2, 101, 10),
/// ]);
/// assert_eq!(source.metadata().estimated_events, Some(2));
/// assert_eq!(source.events().unwrap().count(), 2);
/// ```
pub struct VecSource {
    events: Vec<BookEvent>,
    metadata: SourceMetadata,
}

impl VecSource {
    /// Create a new vector source.
    pub fn new(events: Vec<BookEvent>) -> Self {
        Self {
            metadata: SourceMetadata::new()
                .with_provider("memory")
                .with_estimated_events(events.len() as u64),
            events,
        }
    }

    /// Set custom metadata.
    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

type WrapEvent = fn(BookEvent) -> Result<BookEvent>;

fn wrap_event(event: BookEvent) -> Result<BookEvent> {
    Ok(event)
}

impl EventSource for VecSource {
    type EventIter = std::iter::Map<std::vec::IntoIter<BookEvent>, WrapEvent>;

    fn events(self) -> Result<Self::EventIter> {
        Ok(self.events.into_iter().map(wrap_event as WrapEvent))
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}

// ============================================================================
// File Source
// ============================================================================

/// Binary event file on disk.
///
/// The file is opened lazily by [`EventSource::events`].
pub struct FileSource {
    path: PathBuf,
    metadata: SourceMetadata,
}

impl FileSource {
    /// Create a source for `path`. Fails if the file does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("event file not found: {}", path.display()),
            )
            .into());
        }

        Ok(Self {
            path: path.to_path_buf(),
            metadata: SourceMetadata::from_path(path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for FileSource {
    type EventIter = EventDecoder<BufReader<File>>;

    fn events(self) -> Result<Self::EventIter> {
        let file = File::open(&self.path)?;
        log::info!(
            "Reading events from {} ({} bytes, ~{} events)",
            self.path.display(),
            self.metadata.file_size.unwrap_or(0),
            self.metadata.estimated_events.unwrap_or(0)
        );
        Ok(EventDecoder::new(BufReader::with_capacity(IO_BUFFER_SIZE, file)))
    }

    fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}
