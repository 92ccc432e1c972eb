//! Replay pipeline: event source → processor → text output.
//!
//! Paths and behaviour are passed in through [`ReplayConfig`]; nothing is
//! read from process-wide state.
//!
//! # Example
//!
//! ```ignore
//! use tob_reconstructor::{ModifyPolicy, ReplayConfig, Replayer};
//!
//! let config = ReplayConfig::new("ticks.bin", "book.csv")
//!     .with_modify_policy(ModifyPolicy::Retain)
//!     .with_timing(true);
//!
//! let summary = Replayer::new(config)?.run()?;
//! println!("{} events", summary.events);
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::codec::IO_BUFFER_SIZE;
use crate::error::{Result, TobError};
use crate::format::CsvWriter;
use crate::lob::{
    ApplyEvent, EventProcessor, ModifyPolicy, ProcessorConfig, ProcessorStats, TimedProcessor,
    TimingReport,
};
use crate::source::{EventSource, FileSource};
use crate::statistics::SessionStats;
use crate::types::EventRecord;

/// Configuration for one replay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Binary event file to read
    pub input: PathBuf,

    /// Text file to write
    pub output: PathBuf,

    /// What a Modify does with the order's previous price level
    pub modify_policy: ModifyPolicy,

    /// Time the apply step of every event
    pub report_timing: bool,

    /// Keep going past undecodable input instead of failing
    pub skip_invalid: bool,

    /// Where to write a JSON summary, if anywhere
    pub summary_path: Option<PathBuf>,
}

impl ReplayConfig {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            modify_policy: ModifyPolicy::default(),
            report_timing: false,
            skip_invalid: false,
            summary_path: None,
        }
    }

    /// Set modify handling policy.
    pub fn with_modify_policy(mut self, policy: ModifyPolicy) -> Self {
        self.modify_policy = policy;
        self
    }

    /// Enable/disable apply timing.
    pub fn with_timing(mut self, enabled: bool) -> Self {
        self.report_timing = enabled;
        self
    }

    /// Enable/disable skipping undecodable input.
    pub fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Write a JSON summary to `path` after the run.
    pub fn with_summary_path(mut self, path: impl AsRef<Path>) -> Self {
        self.summary_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Processor settings derived from this config.
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig::new().with_modify_policy(self.modify_policy)
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(TobError::InvalidConfig("input path is empty".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(TobError::InvalidConfig("output path is empty".into()));
        }
        if self.input == self.output {
            return Err(TobError::InvalidConfig(format!(
                "input and output are the same file: {}",
                self.input.display()
            )));
        }
        Ok(())
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySummary {
    /// Events applied
    pub events: u64,

    /// Lines written after the header
    pub records_written: u64,

    /// Input errors skipped (only with `skip_invalid`)
    pub skipped_errors: u64,

    pub processor: ProcessorStats,

    pub session: SessionStats,

    /// Present when timing was enabled
    pub timing: Option<TimingReport>,

    /// Whole run including I/O, milliseconds
    pub wall_time_ms: f64,
}

impl ReplaySummary {
    /// Save summary as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Counters from the inner replay loop.
#[derive(Debug, Clone, Copy, Default)]
struct LoopCounts {
    events: u64,
    skipped_errors: u64,
}

/// Drives one replay described by a [`ReplayConfig`].
pub struct Replayer {
    config: ReplayConfig,
}

impl Replayer {
    /// Create a replayer, validating the configuration.
    pub fn new(config: ReplayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Read the input file, write the output file, return the summary.
    pub fn run(&self) -> Result<ReplaySummary> {
        let source = FileSource::new(&self.config.input)?;
        let file = File::create(&self.config.output)?;
        let writer = BufWriter::with_capacity(IO_BUFFER_SIZE, file);

        let summary = self.run_with(source, writer)?;

        log::info!(
            "Replayed {} events from {} into {} ({:.1} ms)",
            summary.events,
            self.config.input.display(),
            self.config.output.display(),
            summary.wall_time_ms
        );

        if let Some(path) = &self.config.summary_path {
            summary.save_json(path)?;
            log::info!("Wrote summary to {}", path.display());
        }

        Ok(summary)
    }

    /// Replay any source into any writer.
    pub fn run_with<S: EventSource, W: Write>(&self, source: S, writer: W) -> Result<ReplaySummary> {
        let start = Instant::now();
        let mut csv = CsvWriter::new(writer)?;
        let mut session = SessionStats::new();
        let processor = EventProcessor::with_config(self.config.processor_config());

        let (counts, processor_stats, timing) = if self.config.report_timing {
            let mut timed = TimedProcessor::new(processor);
            let counts = self.replay_loop(source, &mut timed, &mut csv, &mut session)?;
            let report = timed.report();
            (counts, timed.into_inner().stats().clone(), Some(report))
        } else {
            let mut plain = processor;
            let counts = self.replay_loop(source, &mut plain, &mut csv, &mut session)?;
            (counts, plain.stats().clone(), None)
        };

        let records_written = csv.records_written();
        csv.finish()?;

        Ok(ReplaySummary {
            events: counts.events,
            records_written,
            skipped_errors: counts.skipped_errors,
            processor: processor_stats,
            session,
            timing,
            wall_time_ms: start.elapsed().as_secs_f64() * 1e3,
        })
    }

    fn replay_loop<S: EventSource, P: ApplyEvent, W: Write>(
        &self,
        source: S,
        processor: &mut P,
        csv: &mut CsvWriter<W>,
        session: &mut SessionStats,
    ) -> Result<LoopCounts> {
        let mut counts = LoopCounts::default();

        for item in source.events()? {
            let event = match item {
                Ok(event) => event,
                Err(e) if self.config.skip_invalid => {
                    log::warn!("Skipping unreadable input: {e}");
                    counts.skipped_errors += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let top = processor.apply_event(&event);
            let record = EventRecord { event, top };
            csv.write_record(&record)?;
            session.update(&record);
            counts.events += 1;
        }

        Ok(counts)
    }
}
