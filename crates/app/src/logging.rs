//! tracing setup for the `portal` binary.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter level picked from the number of `-v` flags.
#[must_use]
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter used when `RUST_LOG` is unset. Covers the binary and the library crates.
#[must_use]
pub fn default_filter(level: Level) -> String {
    format!("portal={level},services={level},storage={level}")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging(verbose: u8) {
    let level = level_for(verbose);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false),
    );

    // already set in tests
    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(9), Level::TRACE);
    }

    #[test]
    fn default_filter_covers_binary_target() {
        let filter = default_filter(Level::DEBUG);
        let binary = module_path!().split("::").next().unwrap();
        assert_eq!(binary, "portal");
        assert!(filter.starts_with("portal=DEBUG,"));
        assert!(filter.contains("services=DEBUG"));
        assert!(filter.contains("storage=DEBUG"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging(0);
        init_logging(3);
    }
}
