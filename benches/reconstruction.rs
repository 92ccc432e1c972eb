//! Benchmarks for top-of-book reconstruction.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tob_reconstructor::codec::{encode_event, EventDecoder};
use tob_reconstructor::format::format_record;
use tob_reconstructor::{BookEvent, EventProcessor, Side};

/// Adds on both sides, then every third order removed again.
fn create_test_events(count: usize) -> Vec<BookEvent> {
    let mut events = Vec::with_capacity(count + count / 3);
    let base_price: u32 = 10_000;

    for i in 0..count {
        let order_id = (i + 1) as u64;
        let is_bid = i % 2 == 0;
        let price_offset = (i % 10) as u32;

        let price = if is_bid {
            base_price - price_offset
        } else {
            base_price + 1 + price_offset
        };
        let side = if is_bid { Side::Bid } else { Side::Ask };

        events.push(BookEvent::add(side, order_id, price, ((i % 100) + 1) as u32));
        if i % 3 == 2 {
            events.push(BookEvent::remove(side, order_id, price));
        }
    }

    events
}

fn bench_reconstruction(c: &mut Criterion) {
    let events = create_test_events(10_000);

    let mut group = c.benchmark_group("reconstruction");
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("apply_events", |b| {
        b.iter(|| {
            let mut processor = EventProcessor::new();
            for event in &events {
                black_box(processor.apply(event));
            }
        })
    });

    group.finish();
}

fn bench_io(c: &mut Criterion) {
    let events = create_test_events(10_000);
    let bytes: Vec<u8> = events.iter().flat_map(|e| encode_event(e)).collect();

    let mut processor = EventProcessor::new();
    let records = processor.apply_all(events.iter());

    let mut group = c.benchmark_group("io");
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            for event in EventDecoder::new(black_box(bytes.as_slice())) {
                let _ = black_box(event);
            }
        })
    });

    group.bench_function("format", |b| {
        b.iter(|| {
            for record in &records {
                black_box(format_record(record));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_reconstruction, bench_io);
criterion_main!(benches);
