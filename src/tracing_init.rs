//! Wires up a `tracing-subscriber` so the `trace!`/`debug!` calls sprinkled
//! through [`crate::sync`] and [`crate::decoder`] actually go somewhere.
//!
//! Nothing in the codec itself depends on a subscriber being installed —
//! the calls are no-ops without one — so this module exists purely for
//! binaries and tests that want to watch a decode pass candidate by
//! candidate: `RUST_LOG=ftcodec::sync=trace` shows every candidate that
//! reached soft-symbol extraction; `RUST_LOG=ftcodec=debug` is coarser.

#[cfg(test)]
use once_cell::sync::Lazy;

/// `RUST_LOG` if set, else `default_directive`. Both entry points below
/// only differ in this fallback and in how the formatted output is routed,
/// so the filter resolution is factored out rather than duplicated.
fn resolve_filter(default_directive: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive))
}

/// Install a subscriber for use inside `#[test]` functions, defaulting to
/// `warn` so a test run stays quiet unless `RUST_LOG` asks for more.
/// Idempotent — every test in a binary can call this unconditionally.
#[cfg(test)]
pub fn init_test_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        use tracing_subscriber::fmt;
        fmt()
            .with_env_filter(resolve_filter("ftcodec=warn"))
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .init();
    });
    Lazy::force(&INIT);
}

/// Install a subscriber for a long-running binary, defaulting to `info`.
/// Unlike the test variant this records thread IDs: candidate decode runs
/// across `rayon` worker threads, and a `trace!` line without a thread ID
/// is ambiguous about which worker produced it.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    fmt()
        .with_env_filter(resolve_filter("ftcodec=info"))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();
}
