//! Dining philosophers CLI.
//!
//! Seats `PHILOSOPHERS` diners at a table and lets them eat until the stop key
//! is typed, stdin closes, or the process is asked to terminate.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use dinnervisor::{Config, ConfigError, Coordinator, LogWriter, RetryPolicy, TimingPolicy};

#[derive(Parser)]
#[command(name = "dinnervisor")]
#[command(version)]
#[command(about = "Dining philosophers with seats, chopsticks and randomized timeouts")]
struct Cli {
    /// Number of philosophers
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    philosophers: u32,

    /// Seats at the table
    #[arg(long, default_value_t = 5)]
    seats: usize,

    /// Chopsticks on the table (at least 2)
    #[arg(long, default_value_t = 5)]
    chopsticks: usize,

    /// Timing quantum in milliseconds; the stall timeout lies in [q, 2q)
    #[arg(long = "quantum-ms", default_value_t = 2000)]
    quantum_ms: u64,

    /// Give the seat back after this many consecutive timeouts (retry forever when absent)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Key that stops the dinner when typed on stdin
    #[arg(long, default_value_t = 'n')]
    stop_byte: char,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<Config, ConfigError> {
        if !self.stop_byte.is_ascii() {
            return Err(ConfigError::StopKeyNotAscii {
                key: self.stop_byte,
            });
        }
        let mut cfg = Config::with_philosophers(self.philosophers as usize);
        cfg.seats = self.seats;
        cfg.chopsticks = self.chopsticks;
        cfg.timing = TimingPolicy::random(Duration::from_millis(self.quantum_ms));
        cfg.retry = self
            .max_retries
            .map_or(RetryPolicy::Unbounded, RetryPolicy::StandAfter);
        cfg.stop_byte = self.stop_byte as u8;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cfg = cli.config()?;
    let coord = Coordinator::builder(cfg.clone())
        .with_subscriber(Arc::new(LogWriter::new()))
        .build()?;
    let ledger = coord.ledger();

    println!(
        "There are {} philosophers and {} seats at a table.",
        cfg.philosophers, cfg.seats
    );
    println!(
        "Seats have an associated chopstick. Philosophers must choose a seat and borrow from their neighbor to eat."
    );
    println!("Press '{}' then enter to stop the dinner.", cli.stop_byte);

    let reports = coord.run().await?;

    for report in &reports {
        println!("{} is done dining.", report.philosopher);
        info!(
            philosopher = %report.philosopher,
            meals = report.meals,
            timeouts = report.timeouts,
            seats_given_up = report.seats_given_up,
            "summary"
        );
    }
    info!(
        philosophers = reports.len(),
        meals = ledger.total_meals().await,
        "dinner over"
    );
    Ok(())
}
