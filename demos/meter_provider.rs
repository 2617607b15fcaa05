use gnort_meter::*;

instruments_struct![
    DemoMetrics,
    (requests, "gnort.demo.requests", Counter, "1", "Requests handled"),
    (in_flight, "gnort.demo.in_flight", UpDownCounter),
    (latency, "gnort.demo.latency", Histogram, "ms")
];

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
pub async fn main() {
    // Override for local testing
    std::env::set_var(gnort_meter::client::STATSD_HOST_ENV, "0.0.0.0");
    let client = GnortClient::default().expect("Failed to instantiate client!");
    let provider = MeterProvider::new(
        ProviderConfig::default()
            .with_client(client)
            .with_resource(Resource::from_env().merge(&Resource::new([("service.name", "gnort-demo")]))),
    )
    .expect("Failed to build meter provider!");
    let meter = provider.get_meter("gnort.demo", Some(env!("CARGO_PKG_VERSION")), None);
    let metrics = DemoMetrics::create(&meter);
    loop {
        metrics.in_flight.add(1, &[]);
        let start = std::time::Instant::now();
        tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
        metrics
            .latency
            .record(start.elapsed().as_millis(), &[KeyValue::new("route", "/demo")]);
        metrics.requests.add(1, &[KeyValue::new("route", "/demo")]);
        metrics.in_flight.add(-1, &[]);
        println!("Recorded a request!");
        tokio::time::sleep(tokio::time::Duration::from_millis(3000)).await;
    }
}
