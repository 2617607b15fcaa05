//! gnort-meter adapts the OpenTelemetry metrics instrument API onto dogstatsd.
//! Application code asks a [MeterProvider] for a [Meter](meter::Meter), creates counters
//! and histograms from it, and every `add`/`record` turns into a single statsd call.
//! There is no aggregation, export pipeline or sampling here: each measurement is
//! forwarded straight to the [StatSender](client::StatSender) as it happens.
//!
//! ### Example
//!
//! ```no_run
//! use gnort_meter::*;
//!
//! let client = GnortClient::default().expect("Failed to instantiate client!");
//! let provider = MeterProvider::new(
//!     ProviderConfig::default()
//!         .with_client(client)
//!         .with_resource(Resource::new([("service.name", "checkout")])),
//! )
//! .expect("Failed to build meter provider!");
//!
//! let meter = provider.get_meter("checkout.http", Some("1.2.0"), None);
//! let requests = meter.create_counter("http.server.requests", "1", "Requests served");
//! let latency = meter.create_histogram("http.server.latency", "ms", "");
//!
//! requests.add(1, &[KeyValue::new("route", "/cart")]);
//! latency.record(42, &[]);
//! ```
//!
//! # Mapping
//!
//! | Instrument | statsd call |
//! |---|---|
//! | `Counter::add` | `count`, negative amounts are dropped with a warning |
//! | `UpDownCounter::add` | `count`, any sign |
//! | `Histogram::record` | `timing` |
//! | observable instruments | nothing |
//!
//! Tags are the provider's [Resource] attributes overlaid with the call-site attributes.
//! When both are empty no tags are sent at all.
//!
//! Observable instruments are accepted so code written against the full API keeps working,
//! but statsd is push-only and has no way to poll their callbacks. They never report.
//!
//! # Failure handling
//!
//! Nothing in here fails the caller. Bad input, empty meter names, unsupported
//! instruments and duplicate registrations are logged through `tracing` and otherwise
//! ignored. Errors from the statsd client are logged at `debug` and dropped.
//!
//! # Configuration
//!
//! [GnortClient] reads `STATSD_HOST`/`STATSD_PORT` (default `0.0.0.0:8125`) and picks up
//! `DD_ENV`, `DD_VERSION`, `DD_SERVICE` as default tags. When no resource is configured,
//! [Resource::from_env] reads `OTEL_RESOURCE_ATTRIBUTES` and `OTEL_SERVICE_NAME`.

/// [GnortClient] and the [StatSender](client::StatSender) trait the instruments send through.
pub mod client;
/// Counters, histograms and the unsupported observable instruments.
pub mod instrument;
pub mod macros;
/// [Meter](meter::Meter) creates instruments for one instrumentation scope.
pub mod meter;
/// [MeterProvider] keeps one meter per instrumentation scope.
pub mod provider;
pub mod resource;
pub mod scope;
pub mod tags;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{GnortClient, StatSender, TransportError};
pub use instrument::{
    Callback, Counter, Histogram, Instrument, InstrumentId, InstrumentKind, Measurement, ObservableCounter,
    ObservableGauge, ObservableUpDownCounter, Observation, UpDownCounter,
};
pub use meter::Meter;
pub use provider::*;
pub use resource::Resource;
pub use scope::InstrumentationScope;
pub use tags::{encode_tags, AttributeValue, KeyValue, Tags};
