use std::{fmt, sync::Arc};

use derive_more::Display;
use tracing::{debug, trace, warn};

use crate::{
    client::StatSender,
    resource::Resource,
    tags::{encode_tags, KeyValue},
};

#[derive(Clone, Copy, Debug, Display, Hash, PartialEq, Eq)]
pub enum InstrumentKind {
    #[display("Counter")]
    Counter,
    #[display("UpDownCounter")]
    UpDownCounter,
    #[display("Histogram")]
    Histogram,
    #[display("ObservableCounter")]
    ObservableCounter,
    #[display("ObservableGauge")]
    ObservableGauge,
    #[display("ObservableUpDownCounter")]
    ObservableUpDownCounter,
}

impl InstrumentKind {
    pub fn is_observable(&self) -> bool {
        matches!(
            self,
            InstrumentKind::ObservableCounter
                | InstrumentKind::ObservableGauge
                | InstrumentKind::ObservableUpDownCounter
        )
    }
}

/// Numbers an instrument accepts. Every amount travels as an `f64`.
pub trait Measurement: Copy {
    fn to_f64(self) -> f64;
}

macro_rules! impl_measurement {
    ($($t:ty),*) => {
        $(
            impl Measurement for $t {
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_measurement!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// What a meter compares when it checks for duplicate instruments.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct InstrumentId {
    pub name: String,
    pub kind: InstrumentKind,
    pub unit: String,
    pub description: String,
}

impl InstrumentId {
    pub fn new(name: &str, kind: InstrumentKind, unit: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            unit: unit.to_string(),
            description: description.to_string(),
        }
    }

    /// Key used for duplicate detection. Names compare trimmed and case-insensitively,
    /// the instrument itself keeps the name it was given.
    pub fn registration_key(&self) -> InstrumentId {
        InstrumentId {
            name: self.name.trim().to_lowercase(),
            ..self.clone()
        }
    }
}

/// A value produced by an observable callback.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub value: f64,
    pub attributes: Vec<KeyValue>,
}

/// Callbacks handed to observable instruments. They are kept but never polled:
/// statsd is push-only, so there is nothing to drive them.
pub type Callback = Arc<dyn Fn() -> Vec<Observation> + Send + Sync>;

/// The sender and resource shared by every live instrument of one provider.
#[derive(Clone)]
pub(crate) struct Emitter {
    sender: Arc<dyn StatSender>,
    resource: Arc<Resource>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl Emitter {
    pub(crate) fn new(sender: Arc<dyn StatSender>, resource: Arc<Resource>) -> Self {
        Self { sender, resource }
    }
    fn increment(&self, name: &str, value: f64, attributes: &[KeyValue]) {
        let tags = encode_tags(&self.resource, attributes);
        let _ = self
            .sender
            .increment(name, value, tags.as_ref())
            .map_err(|err| debug!("Got error sending increment for {name}, was: {err}"));
    }
    fn timing(&self, name: &str, value: f64, attributes: &[KeyValue]) {
        let tags = encode_tags(&self.resource, attributes);
        let _ = self
            .sender
            .timing(name, value, tags.as_ref())
            .map_err(|err| debug!("Got error sending timing for {name}, was: {err}"));
    }
}

/// Monotonic counter, sent as a statsd count. Negative amounts are dropped.
#[derive(Clone, Debug)]
pub struct Counter {
    id: Arc<InstrumentId>,
    emitter: Option<Emitter>,
}

impl Counter {
    pub(crate) fn new(id: InstrumentId, emitter: Option<Emitter>) -> Self {
        Self {
            id: Arc::new(id),
            emitter,
        }
    }
    pub fn id(&self) -> &InstrumentId {
        &self.id
    }
    pub fn add<N: Measurement>(&self, amount: N, attributes: &[KeyValue]) {
        let Some(emitter) = &self.emitter else {
            return;
        };
        let amount = amount.to_f64();
        if amount < 0.0 {
            warn!(
                "Add amount must be non-negative on Counter {}, dropping {amount}.",
                self.id.name
            );
            return;
        }
        emitter.increment(&self.id.name, amount, attributes);
    }
}

/// Counter that may go down. Every amount is forwarded as a statsd count.
#[derive(Clone, Debug)]
pub struct UpDownCounter {
    id: Arc<InstrumentId>,
    emitter: Option<Emitter>,
}

impl UpDownCounter {
    pub(crate) fn new(id: InstrumentId, emitter: Option<Emitter>) -> Self {
        Self {
            id: Arc::new(id),
            emitter,
        }
    }
    pub fn id(&self) -> &InstrumentId {
        &self.id
    }
    pub fn add<N: Measurement>(&self, amount: N, attributes: &[KeyValue]) {
        if let Some(emitter) = &self.emitter {
            emitter.increment(&self.id.name, amount.to_f64(), attributes);
        }
    }
}

/// Distribution of samples, sent as statsd timings.
#[derive(Clone, Debug)]
pub struct Histogram {
    id: Arc<InstrumentId>,
    emitter: Option<Emitter>,
}

impl Histogram {
    pub(crate) fn new(id: InstrumentId, emitter: Option<Emitter>) -> Self {
        Self {
            id: Arc::new(id),
            emitter,
        }
    }
    pub fn id(&self) -> &InstrumentId {
        &self.id
    }
    pub fn record<N: Measurement>(&self, amount: N, attributes: &[KeyValue]) {
        if let Some(emitter) = &self.emitter {
            emitter.timing(&self.id.name, amount.to_f64(), attributes);
        }
    }
}

// Observable instruments have no path to the sender at all.
macro_rules! observable_instrument {
    ($(#[$doc:meta])* $Name:ident) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $Name {
            id: Arc<InstrumentId>,
            callbacks: Arc<[Callback]>,
        }

        impl $Name {
            pub(crate) fn new(id: InstrumentId, callbacks: Vec<Callback>) -> Self {
                Self {
                    id: Arc::new(id),
                    callbacks: callbacks.into(),
                }
            }
            pub fn id(&self) -> &InstrumentId {
                &self.id
            }
            /// Number of callbacks held. They are never invoked.
            pub fn callback_count(&self) -> usize {
                self.callbacks.len()
            }
        }

        impl fmt::Debug for $Name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($Name))
                    .field("id", &self.id)
                    .field("callbacks", &self.callbacks.len())
                    .finish()
            }
        }
    };
}

observable_instrument!(
    /// Accepted for API compatibility, never reported.
    ObservableCounter
);
observable_instrument!(
    /// Accepted for API compatibility, never reported.
    ObservableGauge
);
observable_instrument!(
    /// Accepted for API compatibility, never reported.
    ObservableUpDownCounter
);

impl From<Counter> for Instrument {
    fn from(counter: Counter) -> Self {
        Self::Counter(counter)
    }
}

impl From<UpDownCounter> for Instrument {
    fn from(up_down_counter: UpDownCounter) -> Self {
        Self::UpDownCounter(up_down_counter)
    }
}

impl From<Histogram> for Instrument {
    fn from(histogram: Histogram) -> Self {
        Self::Histogram(histogram)
    }
}

impl From<ObservableCounter> for Instrument {
    fn from(observable: ObservableCounter) -> Self {
        Self::ObservableCounter(observable)
    }
}

impl From<ObservableGauge> for Instrument {
    fn from(observable: ObservableGauge) -> Self {
        Self::ObservableGauge(observable)
    }
}

impl From<ObservableUpDownCounter> for Instrument {
    fn from(observable: ObservableUpDownCounter) -> Self {
        Self::ObservableUpDownCounter(observable)
    }
}

/// Any instrument a [Meter](crate::meter::Meter) can create.
#[derive(Clone, Debug)]
pub enum Instrument {
    Counter(Counter),
    UpDownCounter(UpDownCounter),
    Histogram(Histogram),
    ObservableCounter(ObservableCounter),
    ObservableGauge(ObservableGauge),
    ObservableUpDownCounter(ObservableUpDownCounter),
}

impl Instrument {
    pub fn id(&self) -> &InstrumentId {
        match self {
            Instrument::Counter(i) => i.id(),
            Instrument::UpDownCounter(i) => i.id(),
            Instrument::Histogram(i) => i.id(),
            Instrument::ObservableCounter(i) => i.id(),
            Instrument::ObservableGauge(i) => i.id(),
            Instrument::ObservableUpDownCounter(i) => i.id(),
        }
    }
    pub fn kind(&self) -> InstrumentKind {
        self.id().kind
    }
    /// Adds to counters, records on histograms, and does nothing for observables.
    pub fn record<N: Measurement>(&self, amount: N, attributes: &[KeyValue]) {
        match self {
            Instrument::Counter(counter) => counter.add(amount, attributes),
            Instrument::UpDownCounter(counter) => counter.add(amount, attributes),
            Instrument::Histogram(histogram) => histogram.record(amount, attributes),
            Instrument::ObservableCounter(_)
            | Instrument::ObservableGauge(_)
            | Instrument::ObservableUpDownCounter(_) => {
                trace!("Dropping record on observable instrument {}", self.id().name);
            }
        }
    }
}
