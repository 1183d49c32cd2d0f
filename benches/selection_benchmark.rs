//! Benchmark for event selection performance
//!
//! Target: select_new_event over a 1000-event corpus should stay well under 5ms

use chronoquiz_core::config::Event;
use chronoquiz_core::selection::{NoopHooks, SelectionRequest, Selector, UsedEvents};
use chronoquiz_core::timeline::DateCache;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const T0: i64 = 1_700_000_000_000;

/// Create a realistic corpus spread from antiquity to today
fn create_test_corpus(size: usize) -> Vec<Event> {
    (0..size)
        .map(|i| {
            let year = -500 + (i as i32 * 2531) % 2525;
            let date = if year < 0 {
                format!("-{:04}-03-01", -year)
            } else {
                format!("{:04}-{:02}-{:02}", year, i % 12 + 1, i % 28 + 1)
            };
            let mut event = Event::new(format!("evt-{}", i), date, format!("Event {}", i))
                .with_frequency((i % 17) as i32)
                .with_difficulty((i % 7) as i32 + 1);
            if i % 9 != 0 {
                event.notoriety = Some(((i * 37) % 101) as i32);
            }
            event
        })
        .collect()
}

fn benchmark_selection(c: &mut Criterion) {
    let corpus = create_test_corpus(1000);
    let reference = corpus[500].clone();

    for level in [1u32, 8, 15] {
        c.bench_function(&format!("select_new_event_level_{}", level), |b| {
            let mut selector = Selector::with_seed(42);
            let mut turn = 0i64;
            b.iter(|| {
                let mut used = UsedEvents::new();
                turn += 1;
                let request = SelectionRequest {
                    events: black_box(&corpus),
                    reference: Some(&reference),
                    level,
                    used: &mut used,
                    streak: 0,
                };
                let result = selector.select_new_event_at(T0 + turn * 1_000, request, &mut NoopHooks);
                black_box(result)
            })
        });
    }

    // A full game: the used set grows until the cascade starts recycling
    c.bench_function("select_200_turns", |b| {
        b.iter(|| {
            let mut selector = Selector::with_seed(7);
            let mut used = UsedEvents::new();
            let mut reference = corpus[0].clone();
            for turn in 0..200i64 {
                let request = SelectionRequest {
                    events: &corpus,
                    reference: Some(&reference),
                    level: (turn / 15) as u32 + 1,
                    used: &mut used,
                    streak: (turn % 6) as u32,
                };
                if let Ok(Some(selected)) =
                    selector.select_new_event_at(T0 + turn * 1_000, request, &mut NoopHooks)
                {
                    reference = selected.event;
                }
            }
            black_box(used.len())
        })
    });
}

fn benchmark_date_cache(c: &mut Criterion) {
    let corpus = create_test_corpus(1000);

    c.bench_function("date_cache_cold", |b| {
        b.iter(|| {
            let mut dates = DateCache::new();
            for event in &corpus {
                black_box(dates.event_year(event));
            }
        })
    });

    c.bench_function("date_cache_warm", |b| {
        let mut dates = DateCache::new();
        for event in &corpus {
            dates.event_year(event);
        }
        b.iter(|| {
            for event in &corpus {
                black_box(dates.event_year(event));
            }
        })
    });
}

criterion_group!(benches, benchmark_selection, benchmark_date_cache);
criterion_main!(benches);
