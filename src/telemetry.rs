use anyhow::{Context, Result};
use std::sync::Once;
use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

static INIT_SUBSCRIBER: Once = Once::new();

/// Compose multiple layers into a `tracing`'s subscriber.
///
/// `RUST_LOG` wins over `default_filter` when it is set.
pub fn get_subscriber<Sink>(
    name: String,
    default_filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Register a subscriber as global default to process span data.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<()> {
    LogTracer::init().with_context(|| {
        format!(
            "{}::telemetry::init_subscriber: Failed to redirect log records",
            env!("CARGO_PKG_NAME")
        )
    })?;
    set_global_default(subscriber).with_context(|| {
        format!(
            "{}::telemetry::init_subscriber: Failed to initialize tracing subscriber",
            env!("CARGO_PKG_NAME")
        )
    })
}

/// Like [`init_subscriber`], but later calls in the same process are no-ops.
/// Test binaries call this from every test.
pub fn init_subscriber_once<Sink>(name: &str, default_filter: &str, sink: Sink)
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    INIT_SUBSCRIBER.call_once(|| {
        let subscriber = get_subscriber(name.to_owned(), default_filter.to_owned(), sink);
        if let Err(error) = init_subscriber(subscriber) {
            eprintln!("{:#}", error);
        }
    });
}
