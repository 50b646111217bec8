//! File logging example
//!
//! Demonstrates writing to a rotating log file and reading it back.
//!
//! Run with: cargo run --example file_logging

use service_logger::prelude::*;
use std::fs;

fn main() -> Result<()> {
    println!("=== Service Logger - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("service_logger_demo");
    let log_path = dir.join("app.log");

    // 1 MiB per file, 5 backups, 7 days
    let config = Config::new("payments", "staging")
        .with_file_output(&log_path)
        .with_rotation(1, 5, 7);

    let logger = Logger::new(config)?;
    println!("Writing to {}", log_path.display());

    for i in 0..10 {
        logger
            .with_request(&format!("req-{:04}", i))
            .info("payment authorized", [Field::int64("amount_cents", 1_000 + i)]);
    }

    logger.warn("card declined", [Field::string("reason", "insufficient_funds")]);
    logger.sync()?;

    println!("\nLast records:");
    let content = fs::read_to_string(&log_path)?;
    for line in content.lines().rev().take(3) {
        println!("  {}", line);
    }

    // An invalid config reports every problem at once
    let broken = Config {
        service: String::new(),
        env: "qa".to_string(),
        ..Config::new("", "")
    };
    if let Err(e) = Logger::new(broken) {
        println!("\nRejected config: {}", e);
        for violation in e.violations() {
            println!("  - {}", violation);
        }
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
