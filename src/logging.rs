use std::fmt::Display;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_directive`. Calling this twice is harmless.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Run one pipeline stage, logging its start, its elapsed time and any failure
pub fn stage<T, E, F>(name: &str, video_id: &str, f: F) -> Result<T, E>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    let started = Instant::now();
    info!(stage = name, video_id, "start");

    let result = f();
    let elapsed_secs = started.elapsed().as_secs_f64();
    match &result {
        Ok(_) => info!(stage = name, video_id, elapsed_secs, "done"),
        Err(e) => error!(stage = name, video_id, elapsed_secs, error = %e, "failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_passes_result_through() {
        let ok: Result<u32, String> = stage("ok", "vid", || Ok(7));
        assert_eq!(ok, Ok(7));

        let err: Result<u32, String> = stage("err", "vid", || Err("boom".to_string()));
        assert_eq!(err, Err("boom".to_string()));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
