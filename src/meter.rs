use dashmap::DashSet;
use tracing::warn;

use crate::{
    instrument::{
        Callback, Counter, Emitter, Histogram, InstrumentId, InstrumentKind, ObservableCounter,
        ObservableGauge, ObservableUpDownCounter, UpDownCounter,
    },
    scope::InstrumentationScope,
};

/// Creates instruments for one [InstrumentationScope].
/// Creating the same instrument twice is allowed; the second time only logs a warning.
#[derive(Debug)]
pub struct Meter {
    scope: InstrumentationScope,
    /// `None` makes every instrument from this meter a no-op.
    emitter: Option<Emitter>,
    created: DashSet<InstrumentId>,
}

impl Meter {
    pub(crate) fn new(scope: InstrumentationScope, emitter: Emitter) -> Self {
        Self {
            scope,
            emitter: Some(emitter),
            created: DashSet::new(),
        }
    }

    /// A meter whose instruments never reach a sender.
    pub(crate) fn noop(scope: InstrumentationScope) -> Self {
        Self {
            scope,
            emitter: None,
            created: DashSet::new(),
        }
    }

    pub fn scope(&self) -> &InstrumentationScope {
        &self.scope
    }

    pub fn is_noop(&self) -> bool {
        self.emitter.is_none()
    }

    /// Records `id` as created on this meter and reports whether it already was.
    /// Names differing only in case or surrounding whitespace count as the same instrument.
    pub fn is_instrument_registered(&self, id: &InstrumentId) -> bool {
        !self.created.insert(id.registration_key())
    }

    fn check_duplicate(&self, name: &str, kind: InstrumentKind, unit: &str, description: &str) -> InstrumentId {
        let id = InstrumentId::new(name, kind, unit, description);
        if self.is_instrument_registered(&id) {
            warn!(
                "An instrument with name {name}, type {kind}, unit {unit} and description {description} has been created already."
            );
        }
        id
    }

    fn warn_observable(&self, id: &InstrumentId) {
        if !self.is_noop() {
            warn!(
                "Observable instruments are not supported for statsd, {} {} will never report.",
                id.kind, id.name
            );
        }
    }

    pub fn create_counter(&self, name: &str, unit: &str, description: &str) -> Counter {
        let id = self.check_duplicate(name, InstrumentKind::Counter, unit, description);
        Counter::new(id, self.emitter.clone())
    }

    pub fn create_up_down_counter(&self, name: &str, unit: &str, description: &str) -> UpDownCounter {
        let id = self.check_duplicate(name, InstrumentKind::UpDownCounter, unit, description);
        UpDownCounter::new(id, self.emitter.clone())
    }

    pub fn create_histogram(&self, name: &str, unit: &str, description: &str) -> Histogram {
        let id = self.check_duplicate(name, InstrumentKind::Histogram, unit, description);
        Histogram::new(id, self.emitter.clone())
    }

    pub fn create_observable_counter(
        &self,
        name: &str,
        callbacks: Vec<Callback>,
        unit: &str,
        description: &str,
    ) -> ObservableCounter {
        let id = self.check_duplicate(name, InstrumentKind::ObservableCounter, unit, description);
        self.warn_observable(&id);
        ObservableCounter::new(id, callbacks)
    }

    pub fn create_observable_gauge(
        &self,
        name: &str,
        callbacks: Vec<Callback>,
        unit: &str,
        description: &str,
    ) -> ObservableGauge {
        let id = self.check_duplicate(name, InstrumentKind::ObservableGauge, unit, description);
        self.warn_observable(&id);
        ObservableGauge::new(id, callbacks)
    }

    pub fn create_observable_up_down_counter(
        &self,
        name: &str,
        callbacks: Vec<Callback>,
        unit: &str,
        description: &str,
    ) -> ObservableUpDownCounter {
        let id = self.check_duplicate(
            name,
            InstrumentKind::ObservableUpDownCounter,
            unit,
            description,
        );
        self.warn_observable(&id);
        ObservableUpDownCounter::new(id, callbacks)
    }
}
