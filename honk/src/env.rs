use time::macros::format_description;
use tracing::debug;
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::UtcTime},
    EnvFilter,
};

/// Installs a console subscriber filtered by `RUST_LOG`, closing spans so
/// that key construction and commitment timings are printed.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case that subscriber is kept.
pub fn init_console_subscriber() -> bool {
    let timer = UtcTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));
    match tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(timer)
        .with_target(false)
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, "keeping the installed subscriber");
            false
        }
    }
}

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    init_console_subscriber();
}
