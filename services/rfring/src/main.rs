//! RF ring gateway (`rfring`)
//!
//! Builds the PV naming tables and supervises the serial link to the racks.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use rfring::{bootstrap, LinkManager, PvTables, RfRingConfig, TtyOpener};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (args, rejected) =
        bootstrap::parse_lenient(std::env::args_os()).unwrap_or_else(|e| e.exit());

    bootstrap::initialize_logging(&args).context("Failed to init logging")?;
    info!("Parameters {:?}", std::env::args_os().collect::<Vec<_>>());
    if let Some(e) = rejected {
        warn!(
            "Parameters could not be parsed ({}), using defaults with show debug info disabled",
            e.kind()
        );
    }

    let show_debug_info = args.show_debug_info();

    let config = match &args.config {
        Some(path) => RfRingConfig::load_with_file(path),
        None => RfRingConfig::load(),
    }
    .context("Failed to load configuration")?;
    debug!("Configuration: {:?}", config);

    let tables = PvTables::build(show_debug_info);
    info!(
        "PV tables ready: {} state, {} rack, {} alarm, {} offset",
        tables.states().len(),
        tables.racks().len(),
        tables.alarms().len(),
        tables.offsets().len()
    );

    if args.dump {
        println!("{}", tables.to_json_pretty()?);
        return Ok(());
    }

    let opener = TtyOpener::new(config.serial_settings());
    let manager = Arc::new(LinkManager::connect(opener));
    info!(
        "Serial link {} ({})",
        config.serial_port.display(),
        if manager.is_connected() {
            "connected"
        } else {
            "disconnected"
        }
    );

    if args.once {
        let connected = refresh(&manager).await;
        info!("Refresh result: {}", connected);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(config.reconnect_interval());
    let mut was_connected = manager.is_connected();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let connected = refresh(&manager).await;
                if connected != was_connected {
                    if connected {
                        info!("Serial link up");
                    } else {
                        warn!("Serial link down, pausing reads");
                    }
                    was_connected = connected;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

/// Run the refresh off the async workers; opening the port may block up to its timeout.
async fn refresh(manager: &Arc<LinkManager<TtyOpener>>) -> bool {
    let manager = Arc::clone(manager);
    match tokio::task::spawn_blocking(move || manager.refresh()).await {
        Ok(connected) => connected,
        Err(e) => {
            error!("Refresh task failed: {}", e);
            false
        },
    }
}
