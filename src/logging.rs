use tracing::{warn, Level};

fn parse_level(log_level: Option<&str>) -> Result<Level, String> {
    match log_level {
        None => Ok(Level::INFO),
        Some(name) => name.trim().parse::<Level>().map_err(|_| name.to_string()),
    }
}

/// Install the global fmt subscriber. Worker threads are named
/// `elevator-<id>`, so thread names stand in for the module target.
///
/// An unknown level name logs at INFO. A second call keeps the subscriber
/// that is already installed.
pub fn init_logging(log_level: Option<&str>) -> Level {
    let (level, rejected) = match parse_level(log_level) {
        Ok(level) => (level, None),
        Err(name) => (Level::INFO, Some(name)),
    };

    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_thread_names(true)
        .with_target(false)
        .try_init()
        .is_ok();

    if let Some(name) = rejected {
        warn!("unknown log level {:?}, using {}", name, level);
    }
    if !installed {
        warn!("logging was already initialized");
    }
    level
}
