//! Write a small binary event file, replay it, and print the output lines.
//!
//! Run with: cargo run --example replay_file

use std::fs::{self, File};
use std::io::{BufWriter, Write};

use tob_reconstructor::codec::write_events;
use tob_reconstructor::{BookEvent, ModifyPolicy, ReplayConfig, Replayer, Result, Side};

fn main() -> Result<()> {
    println!("=================================================================");
    println!("Top-of-Book Reconstructor - File Replay Example");
    println!("=================================================================\n");

    let dir = std::env::temp_dir();
    let input = dir.join(format!("tob_demo_{}.bin", std::process::id()));
    let output = dir.join(format!("tob_demo_{}.csv", std::process::id()));

    let events = [
        BookEvent::add(Side::Bid, 1, 100, 50).with_source_time(1),
        BookEvent::add(Side::Bid, 2, 100, 25).with_source_time(2),
        BookEvent::add(Side::Ask, 3, 102, 40).with_source_time(3),
        BookEvent::add(Side::Bid, 4, 101, 10).with_source_time(4),
        BookEvent::modify(Side::Bid, 4, 99, 10).with_source_time(5),
        BookEvent::remove(Side::Ask, 3, 102).with_source_time(6),
        BookEvent::clear().with_source_time(7),
    ];

    let mut writer = BufWriter::new(File::create(&input)?);
    let written = write_events(&mut writer, events.iter())?;
    writer.flush()?;
    println!("✓ Wrote {written} events to {}\n", input.display());

    // Relocate so order 4 leaves 101 when it moves to 99
    let config = ReplayConfig::new(&input, &output)
        .with_modify_policy(ModifyPolicy::Relocate)
        .with_timing(true);
    let summary = Replayer::new(config)?.run()?;

    println!("Output ({} records):", summary.records_written);
    for line in fs::read_to_string(&output)?.lines() {
        println!("  {line}");
    }
    println!();

    if let Some(timing) = &summary.timing {
        println!("Total time of building OB: {:.0} us", timing.total_us);
        println!("Avg time per tick: {:.4} us", timing.avg_us);
    }
    println!(
        "Snapshots: {} two-sided, {} one-sided, {} empty",
        summary.session.two_sided_snapshots,
        summary.session.one_sided_snapshots,
        summary.session.empty_snapshots
    );

    fs::remove_file(&input)?;
    fs::remove_file(&output)?;
    Ok(())
}
