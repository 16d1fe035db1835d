use cadence::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    debug!("bootstrap debug log, hidden");
    info!(session = "demo", "bootstrap info log");

    let config = LogConfig {
        filter: "cadence=trace,info".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!(target: "cadence::demo", "trace log after reload");
    debug!(target: "cadence::demo", expires_at = 0, "debug log after reload");
    warn!("token endpoint unreachable (demo)");

    Ok(())
}
