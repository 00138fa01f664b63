//! Shared harness for the integration tests: a `tracing-subscriber` +
//! `tracing-panic` + `color-backtrace` assembly, wired up here since this
//! crate has no binary of its own to install it in `main`.

use std::sync::Once;

use tracing_panic::panic_hook;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the tracing subscriber and panic hook once per test binary.
/// Safe to call at the top of every integration test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::Registry::default()
            .with(tracing_subscriber::fmt::Layer::default().with_test_writer())
            .with(EnvFilter::from_default_env());
        let _ = tracing::subscriber::set_global_default(subscriber);

        color_backtrace::install();
        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            panic_hook(panic_info);
            prev_hook(panic_info);
        }));
    });
}
