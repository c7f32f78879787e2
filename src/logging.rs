use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

static TUI_MODE: AtomicBool = AtomicBool::new(false);

/// Level for the number of `-v` flags, unless RUST_LOG overrides it.
pub fn level_for(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Console level: RUST_LOG, when set, already filtered the record.
fn console_level(verbosity: u8, rust_log: Option<&str>) -> log::LevelFilter {
    match rust_log {
        Some(filter) if !filter.trim().is_empty() => log::LevelFilter::Trace,
        _ => level_for(verbosity),
    }
}

/// The browse log pane shows at least info, whatever the console shows.
fn tui_level(verbosity: u8) -> log::LevelFilter {
    level_for(verbosity).max(log::LevelFilter::Info)
}

pub fn init_logger(verbosity: u8) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let console = console_level(verbosity, rust_log.as_deref());

    // env_logger lets everything through so the Drain can feed tui-logger,
    // which applies its own level; the console level is applied on write
    let drain = tui_logger::Drain::new();
    tui_logger::set_default_level(tui_level(verbosity));
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Trace)
        .parse_default_env()
        .format(move |buf, record| {
            drain.log(record);

            if TUI_MODE.load(Ordering::Relaxed) || record.level() > console {
                return Ok(());
            }

            let timestamp = chrono::Local::now().format("%H:%M:%S");
            let level = record.level();
            let message = record.args();
            let target = record.target();
            if target != record.module_path().unwrap_or("unknown") {
                writeln!(buf, "[{timestamp}] {level} [{target}]: {message}")
            } else {
                writeln!(buf, "[{timestamp}] {level}: {message}")
            }
        })
        .try_init()
        .context("logger already initialized")?;

    log::debug!("logger initialized, console at {console}");
    Ok(())
}

pub fn switch_to_tui_logging() {
    TUI_MODE.store(true, Ordering::Relaxed);
    log::info!("switched to TUI logging");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), log::LevelFilter::Warn);
        assert_eq!(level_for(1), log::LevelFilter::Info);
        assert_eq!(level_for(2), log::LevelFilter::Debug);
        assert_eq!(level_for(7), log::LevelFilter::Trace);
    }

    #[test]
    fn console_follows_verbosity_unless_rust_log_is_set() {
        assert_eq!(console_level(0, None), log::LevelFilter::Warn);
        assert_eq!(console_level(0, Some("  ")), log::LevelFilter::Warn);
        assert_eq!(console_level(0, Some("navtree=debug")), log::LevelFilter::Trace);
    }

    #[test]
    fn log_pane_shows_info_at_default_verbosity() {
        assert_eq!(tui_level(0), log::LevelFilter::Info);
        assert_eq!(tui_level(2), log::LevelFilter::Debug);
    }
}
