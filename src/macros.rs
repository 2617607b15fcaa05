/// Declares a struct of synchronous instruments and a `create(&Meter)` constructor.
///
/// Each entry is `(field, "metric.name", Kind)` where `Kind` is `Counter`, `UpDownCounter`
/// or `Histogram`, optionally followed by a unit and then a description.
///
/// ```
/// use gnort_meter::*;
///
/// instruments_struct![
///     HttpMetrics,
///     (requests, "http.server.requests", Counter),
///     (in_flight, "http.server.in_flight", UpDownCounter, "1"),
///     (latency, "http.server.latency", Histogram, "ms", "Time to first byte")
/// ];
/// ```
#[macro_export]
macro_rules! instruments_struct {
    ($StructName:ident, $(($field_name:ident, $metric_name:literal, $kind:ident $(, $unit:literal $(, $description:literal)?)?)),* $(,)?) => {
        #[derive(Clone, Debug)]
        pub struct $StructName {
            $(
                pub $field_name: $crate::instrument::$kind,
            )*
        }

        impl $StructName {
            pub fn create(meter: &$crate::meter::Meter) -> Self {
                $(
                    let $field_name = $crate::__create_instrument!(
                        meter,
                        $kind,
                        $metric_name,
                        $crate::__or_empty!($($unit)?),
                        $crate::__or_empty!($($($description)?)?)
                    );
                )*
                Self {
                    $(
                        $field_name,
                    )*
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __create_instrument {
    ($meter:expr, Counter, $name:expr, $unit:expr, $description:expr) => {
        $meter.create_counter($name, $unit, $description)
    };
    ($meter:expr, UpDownCounter, $name:expr, $unit:expr, $description:expr) => {
        $meter.create_up_down_counter($name, $unit, $description)
    };
    ($meter:expr, Histogram, $name:expr, $unit:expr, $description:expr) => {
        $meter.create_histogram($name, $unit, $description)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __or_empty {
    () => {
        ""
    };
    ($value:literal) => {
        $value
    };
}
