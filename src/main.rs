//! # Field Logger
//!
//! GPS-correlated inertial data logger with buffered append-only
//! persistence.
//!
//! Wires the hardware collaborators to the telemetry pipeline and runs
//! the main loop: session start blocks on the first GPS fix, then the
//! loop drains the sensor FIFO, emits periodic location records, and
//! flushes sample batches to the storage medium until shutdown.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use field_logger::config::{Config, LoggingConfig};
use field_logger::hw::imu::FifoReplay;
use field_logger::hw::indicator::TracingIndicator;
use field_logger::hw::storage::SdCardStorage;
use field_logger::hw::{gps::SerialGps, BlinkPattern, StatusIndicator};
use field_logger::pipeline::{LogPipeline, PipelineOptions};

/// Configuration file consulted when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)?;

    let _log_guard = init_tracing(&config.logging);
    info!("Field Logger v{} starting...", env!("CARGO_PKG_VERSION"));

    // Storage mount failure is fatal to persistence: signal and stop
    let storage = match SdCardStorage::mount(&config.storage.mount_dir) {
        Ok(storage) => storage,
        Err(e) => {
            error!("Storage mount failed: {}", e);
            let mut indicator = TracingIndicator::new();
            indicator.set_pattern(BlinkPattern::Fault);
            return Err(e.into());
        }
    };

    let device_paths: Vec<&str> = config.gps.device_paths.iter().map(String::as_str).collect();
    let gps = SerialGps::open(&device_paths, config.gps.baud_rate)?;

    // Sensor init failure disables the inertial path only; GPS logging
    // continues without it
    let imu = if config.imu.enabled {
        match FifoReplay::open(&config.imu.replay_path) {
            Ok(replay) => Some(replay),
            Err(e) => {
                error!("Inertial sensor init failed, continuing with GPS only: {}", e);
                None
            }
        }
    } else {
        info!("Inertial path disabled by configuration");
        None
    };
    let data_ready = imu.as_ref().map(FifoReplay::data_ready);

    let options = PipelineOptions {
        fix_poll_interval: config.fix_poll_interval(),
        fix_timeout: config.fix_timeout(),
        buffer_capacity: config.buffer.capacity,
    };

    info!("Waiting for GPS fix...");
    let mut pipeline =
        LogPipeline::start(gps, imu, storage, TracingIndicator::new(), &options).await?;
    info!(
        "Session files: {} / {}",
        pipeline.session().gps_file,
        pipeline.session().mpu_file
    );

    let mut gps_interval = interval(Duration::from_secs(config.gps.read_period_s));
    let mut drain_interval = interval(Duration::from_millis(config.imu.drain_interval_ms));

    // Main loop
    loop {
        tokio::select! {
            // Periodic GPS location record
            _ = gps_interval.tick() => {
                match pipeline.log_gps().await {
                    Ok(true) => debug!("GPS record written"),
                    Ok(false) => {}
                    Err(e) => warn!("GPS record failed: {}", e),
                }
            }

            // Drain the sensor FIFO when the data-ready flag is raised
            _ = drain_interval.tick() => {
                let ready = data_ready.as_ref().is_some_and(|flag| flag.take());
                if ready {
                    match pipeline.drain() {
                        Ok(n) if n > 0 => debug!("Drained {} samples", n),
                        Ok(_) => {}
                        Err(e) => warn!("Drain failed: {}", e),
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    match pipeline.shutdown() {
        Ok(n) if n > 0 => info!("Flushed {} buffered samples", n),
        Ok(_) => {}
        Err(e) => warn!("Shutdown flush failed: {}", e),
    }
    info!(
        "Session totals: {} samples drained, {} records written, {} flushes",
        pipeline.samples_drained(),
        pipeline.records_written(),
        pipeline.flush_count()
    );

    Ok(())
}

/// Initialize the tracing subscriber
///
/// With a log directory configured, diagnostics additionally roll into
/// daily files there; the returned guard must live until exit so the
/// non-blocking writer drains.
fn init_tracing(config: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if config.dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    } else {
        let appender = tracing_appender::rolling::daily(&config.dir, "field-logger.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    }
}
