//! OpenTelemetry metric instruments for the progress engine

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter, MeterProvider},
};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use tracing::info;

use crate::errors::TahapError;

const METER_NAME: &str = "kegiatan-tahap";

/// Main observability interface providing metrics
#[derive(Clone)]
pub struct AppObservability {
    pub status_queries: Counter<u64>,
    pub subtask_status_updates: Counter<u64>,
    pub date_updates: Counter<u64>,
    pub rejected_requests: Counter<u64>,
    pub storage_failures: Counter<u64>,
    pub storage_duration: Histogram<f64>,
}

impl AppObservability {
    /// Install an SDK meter provider as the global provider and build instruments on it
    pub fn new() -> Self {
        let provider = SdkMeterProvider::builder().build();
        global::set_meter_provider(provider.clone());

        info!("OpenTelemetry configured: local metrics only");
        Self::build_with_instruments(provider.meter(METER_NAME))
    }

    /// Instruments on whatever global provider is installed (no-op by default)
    pub fn from_global() -> Self {
        Self::build_with_instruments(global::meter(METER_NAME))
    }

    fn build_with_instruments(meter: Meter) -> Self {
        let status_queries = meter
            .u64_counter("tahap_status_queries_total")
            .with_description("Read operations served by the progress engine")
            .build();
        let subtask_status_updates = meter
            .u64_counter("subtahap_status_updates_total")
            .with_description("Subtahap completion flag updates")
            .build();
        let date_updates = meter
            .u64_counter("subtahap_date_updates_total")
            .with_description("Planned/realized date updates")
            .build();
        let rejected_requests = meter
            .u64_counter("tahap_rejected_requests_total")
            .with_description("Requests rejected for an invalid tahap or subtahap")
            .build();
        let storage_failures = meter
            .u64_counter("tahap_storage_failures_total")
            .with_description("Storage errors and timeouts")
            .build();
        let storage_duration = meter
            .f64_histogram("tahap_storage_duration_seconds")
            .with_description("Duration of storage calls made by the engine")
            .build();

        Self {
            status_queries,
            subtask_status_updates,
            date_updates,
            rejected_requests,
            storage_failures,
            storage_duration,
        }
    }

    /// Count a failed engine call under the matching counter
    pub fn record_failure(&self, operation: &'static str, error: &TahapError) {
        let attributes = [KeyValue::new("operation", operation)];
        if error.is_client_error() {
            self.rejected_requests.add(1, &attributes);
        } else {
            self.storage_failures.add(1, &attributes);
        }
    }
}

impl Default for AppObservability {
    fn default() -> Self {
        Self::from_global()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_rejections_and_storage_failures_on_global_meter() {
        let observability = AppObservability::default();
        observability.record_failure("update_subtask_status", &TahapError::InvalidStage(9));
        observability.record_failure(
            "get_tahap_status",
            &TahapError::StorageTimeout {
                operation: "find_by_activity",
                after: std::time::Duration::from_secs(1),
            },
        );
        observability
            .status_queries
            .add(1, &[KeyValue::new("operation", "get_tahap_status")]);
    }
}
