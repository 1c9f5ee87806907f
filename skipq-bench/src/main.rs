//! Benchmark driver: pre-fills a [`PriorityQueue`], runs N worker threads
//! against it for a fixed wall-clock interval, and reports throughput.
//!
//! Grounded on the original harness's `main`/`run` shape (barrier rendezvous,
//! fixed-duration run, per-thread op counters aggregated into sum/min/max) —
//! reimplemented with `std::sync::Barrier` and an `Arc<AtomicBool>` stop
//! flag instead of the original's busy-wait globals.

mod cli;
mod workload;

use clap::Parser;
use cli::Cli;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skipq_core::Key;
use skipq_skiplist::{PriorityQueue, SkipListConfig};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use workload::DesSchedule;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = SkipListConfig {
        max_offset: cli.offset,
        ..SkipListConfig::default()
    };
    let pq = match PriorityQueue::try_new(config) {
        Ok(pq) => Arc::new(pq),
        Err(err) => {
            log::error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut seed_rng = StdRng::from_entropy();

    log::info!(
        "pre-filling queue with {} elements ({} workload)",
        cli.size,
        if cli.exponential { "DES" } else { "uniform" }
    );

    let schedule = if cli.exponential {
        let schedule = Arc::new(DesSchedule::new(cli.size, cli.threads, cli.secs, &mut seed_rng));
        for _ in 0..cli.size {
            let key = schedule.advance();
            pq.insert(key, key);
        }
        Some(schedule)
    } else {
        for _ in 0..cli.size {
            let key: Key = seed_rng.gen_range(0..(1u64 << 48));
            pq.insert(key, key);
        }
        None
    };

    let barrier = Arc::new(Barrier::new(cli.threads + 1));
    let running = Arc::new(AtomicBool::new(false));
    let mut handles = Vec::with_capacity(cli.threads);

    for t in 0..cli.threads {
        let pq = Arc::clone(&pq);
        let barrier = Arc::clone(&barrier);
        let running = Arc::clone(&running);
        let schedule = schedule.clone();
        let mut rng = StdRng::seed_from_u64(seed_rng.gen::<u64>() ^ t as u64);

        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut count: u64 = 0;
            while running.load(Ordering::Acquire) {
                match &schedule {
                    Some(schedule) => workload::des_op(&pq, schedule),
                    None => workload::uniform_op(&pq, &mut rng),
                }
                count += 1;
            }
            count
        }));
    }

    log::info!("prefill complete, releasing {} workers", cli.threads);
    running.store(true, Ordering::Release);
    barrier.wait();
    let start = Instant::now();
    thread::sleep(Duration::from_secs(cli.secs));
    running.store(false, Ordering::Release);
    let elapsed = start.elapsed();
    log::info!("run complete after {:.3}s", elapsed.as_secs_f64());

    let counts: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let sum: u64 = counts.iter().sum();
    let min = counts.iter().copied().min().unwrap_or(0);
    let max = counts.iter().copied().max().unwrap_or(0);
    let dt = elapsed.as_secs_f64();
    let ops_per_sec = sum as f64 / dt;

    if cli.concise {
        println!("{}", ops_per_sec.round() as i64);
    } else {
        println!("Total time:\t{dt:.8} s");
        println!("Ops:\t\t{sum}");
        println!("Ops/s:\t\t{ops_per_sec:.0}");
        println!("Min ops/t:\t{min}");
        println!("Max ops/t:\t{max}");
    }

    ExitCode::SUCCESS
}
