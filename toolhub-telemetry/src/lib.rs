//! Observability utilities for the registry pipeline.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support {
    //! Structured tracing helpers.

    use toolhub_config::TelemetrySettings;
    use tracing_subscriber::EnvFilter;

    /// Installs a global `fmt` subscriber configured from `settings`.
    ///
    /// `RUST_LOG` takes precedence over [`TelemetrySettings::filter`]. Returns
    /// `false` when a global subscriber was already installed, which makes the
    /// call safe to repeat from tests and binaries alike.
    pub fn init_tracing(settings: &TelemetrySettings) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(settings.with_target)
            .with_ansi(settings.ansi)
            .try_init()
            .is_ok()
    }
}

pub mod timing {
    //! Phase timing used for build statistics.

    use std::time::{Duration, Instant};

    /// Measures elapsed wall-clock time for a pipeline phase.
    #[derive(Debug, Clone, Copy)]
    pub struct Stopwatch {
        started: Instant,
    }

    impl Stopwatch {
        /// Starts a new stopwatch.
        #[must_use]
        pub fn start() -> Self {
            Self {
                started: Instant::now(),
            }
        }

        /// Returns the elapsed duration.
        #[must_use]
        pub fn elapsed(&self) -> Duration {
            self.started.elapsed()
        }

        /// Returns the elapsed time in whole milliseconds, saturating at `u64::MAX`.
        #[must_use]
        pub fn elapsed_ms(&self) -> u64 {
            u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn elapsed_is_monotonic() {
            let watch = Stopwatch::start();
            let first = watch.elapsed();
            std::thread::sleep(Duration::from_millis(2));
            assert!(watch.elapsed() >= first);
            assert!(watch.elapsed_ms() >= 2);
        }
    }
}

pub use timing::Stopwatch;
pub use tracing_support::init_tracing;
