//! Command-line surface for the benchmark driver.

use clap::Parser;

/// Throughput benchmark for the lock-free skip-list priority queue.
#[derive(Parser, Debug)]
#[command(name = "skipq-bench", about = "Throughput benchmark for skipq-skiplist")]
pub struct Cli {
    /// Number of worker threads.
    #[arg(short = 'n', long = "threads", default_value_t = 1)]
    pub threads: usize,

    /// Run duration, in seconds.
    #[arg(short = 't', long = "secs", default_value_t = 10)]
    pub secs: u64,

    /// `max_offset` reclamation threshold.
    #[arg(short = 'o', long = "offset", default_value_t = 32)]
    pub offset: usize,

    /// Number of elements to pre-fill the queue with before timing starts.
    #[arg(short = 's', long = "size", default_value_t = 1 << 15)]
    pub size: usize,

    /// Use the exponential-inter-arrival (DES) workload instead of the
    /// uniform 50/50 insert-or-delete workload.
    #[arg(short = 'e', long = "exponential", default_value_t = false)]
    pub exponential: bool,

    /// Concise output: print a single integer, ops/s, and nothing else.
    #[arg(short = 'x', long = "concise", default_value_t = false)]
    pub concise: bool,
}
