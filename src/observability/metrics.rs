//! Metrics collection.
//!
//! # Metrics
//! - `db_balancer_server_up` (gauge): 1=up, 0=down
//! - `db_balancer_open_connections` (gauge): last observed Threads_connected
//! - `db_balancer_replication_lag_seconds` (gauge): only set while known
//! - `db_balancer_probes_total` (counter): probes by outcome
//!
//! # Design Decisions
//! - Uses the `metrics` facade; the embedding application installs a recorder
//! - Every metric is labelled by server name

use crate::health::HealthSnapshot;

/// Publish the outcome of one probe.
pub fn record_server_health(server: &str, snapshot: &HealthSnapshot) {
    let server = server.to_string();
    let outcome = if snapshot.up { "up" } else { "down" };

    metrics::counter!("db_balancer_probes_total", "server" => server.clone(), "outcome" => outcome)
        .increment(1);
    metrics::gauge!("db_balancer_server_up", "server" => server.clone())
        .set(if snapshot.up { 1.0 } else { 0.0 });

    if snapshot.up {
        metrics::gauge!("db_balancer_open_connections", "server" => server.clone())
            .set(snapshot.open_connections as f64);
    }
    if let Some(lag) = snapshot.seconds_behind_master {
        metrics::gauge!("db_balancer_replication_lag_seconds", "server" => server)
            .set(lag as f64);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use metrics::{
        Counter, CounterFn, Gauge, GaugeFn, Histogram, Key, KeyName, Metadata, Recorder,
        SharedString, Unit,
    };
    use parking_lot::Mutex;

    use super::*;

    type Values = Arc<Mutex<HashMap<String, f64>>>;

    /// Last value per `name{label=value,...}`.
    #[derive(Default)]
    struct CapturingRecorder {
        values: Values,
    }

    struct Slot {
        key: String,
        values: Values,
    }

    impl Slot {
        fn update(&self, f: impl FnOnce(f64) -> f64) {
            let mut values = self.values.lock();
            let entry = values.entry(self.key.clone()).or_insert(0.0);
            *entry = f(*entry);
        }
    }

    impl CounterFn for Slot {
        fn increment(&self, value: u64) {
            self.update(|v| v + value as f64);
        }

        fn absolute(&self, value: u64) {
            self.update(|_| value as f64);
        }
    }

    impl GaugeFn for Slot {
        fn increment(&self, value: f64) {
            self.update(|v| v + value);
        }

        fn decrement(&self, value: f64) {
            self.update(|v| v - value);
        }

        fn set(&self, value: f64) {
            self.update(|_| value);
        }
    }

    impl CapturingRecorder {
        fn slot(&self, key: &Key) -> Arc<Slot> {
            let labels: Vec<String> = key
                .labels()
                .map(|l| format!("{}={}", l.key(), l.value()))
                .collect();
            Arc::new(Slot {
                key: format!("{}{{{}}}", key.name(), labels.join(",")),
                values: self.values.clone(),
            })
        }

        fn get(&self, key: &str) -> Option<f64> {
            self.values.lock().get(key).copied()
        }
    }

    impl Recorder for CapturingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            Counter::from_arc(self.slot(key))
        }

        fn register_gauge(&self, key: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::from_arc(self.slot(key))
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    fn snapshot(up: bool, lag: Option<i64>, open_connections: i64) -> HealthSnapshot {
        HealthSnapshot {
            up,
            last_error: (!up).then(|| "connection refused".to_string()),
            seconds_behind_master: lag,
            open_connections,
        }
    }

    #[test]
    fn test_up_server_publishes_all_gauges() {
        let recorder = CapturingRecorder::default();

        metrics::with_local_recorder(&recorder, || {
            record_server_health("replica", &snapshot(true, Some(3), 42));
            record_server_health("replica", &snapshot(true, Some(3), 42));
        });

        assert_eq!(recorder.get("db_balancer_server_up{server=replica}"), Some(1.0));
        assert_eq!(recorder.get("db_balancer_open_connections{server=replica}"), Some(42.0));
        assert_eq!(
            recorder.get("db_balancer_replication_lag_seconds{server=replica}"),
            Some(3.0)
        );
        assert_eq!(
            recorder.get("db_balancer_probes_total{server=replica,outcome=up}"),
            Some(2.0)
        );
    }

    #[test]
    fn test_down_server_skips_connection_gauge() {
        let recorder = CapturingRecorder::default();

        metrics::with_local_recorder(&recorder, || {
            record_server_health("db1", &snapshot(false, None, 42));
        });

        assert_eq!(recorder.get("db_balancer_server_up{server=db1}"), Some(0.0));
        assert_eq!(recorder.get("db_balancer_probes_total{server=db1,outcome=down}"), Some(1.0));
        assert_eq!(recorder.get("db_balancer_open_connections{server=db1}"), None);
        assert_eq!(recorder.get("db_balancer_replication_lag_seconds{server=db1}"), None);
    }
}
