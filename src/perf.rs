//! Timing helper

use std::time::Instant;

use tracing::info;

/// Run `f` and log how long it took under `label`
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    info!(
        label = %label,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "{} finished",
        label
    );
    result
}
