//! Basic logger usage example
//!
//! Demonstrates stdout logging, level filtering, child loggers and the
//! formatting macros.
//!
//! Run with: cargo run --example basic_usage

use service_logger::prelude::*;
use service_logger::{info, warn};

fn main() -> Result<()> {
    eprintln!("=== Service Logger - Basic Usage Example ===\n");

    // Records go to stdout as JSON lines
    let logger = Logger::new(
        Config::new("inventory", "dev")
            .with_level(Level::Debug)
            .with_caller(true),
    )?;

    eprintln!("1. Logging at different levels:");
    logger.debug("cache warmed", [Field::int("entries", 1_024)]);
    logger.info("service started", [Field::string("version", "1.4.2")]);
    logger.warn("slow dependency", [Field::float64("latency_ms", 812.4)]);

    let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    logger.error("upstream unavailable", [Field::error(&err)]);

    eprintln!("\n2. Child loggers carry bound fields:");
    let request_log = logger.with_request("req-8f2c");
    let item_log = request_log.with([Field::string("sku", "AB-1009")]);
    item_log.info("reservation created", [Field::bool("backordered", false)]);

    eprintln!("\n3. Structured values:");
    logger.info(
        "batch summary",
        [Field::any("warehouses", &["oslo", "bergen"]), Field::int64("items", 42)],
    );

    eprintln!("\n4. Formatting macros:");
    info!(logger, "processed {} of {} items", 40, 42);
    warn!(logger, [Field::int("retries", 2)], "retrying {}", "sku AB-1010");

    logger.sync()?;

    eprintln!("\n=== Example completed successfully! ===");
    Ok(())
}
