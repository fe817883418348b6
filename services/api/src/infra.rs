use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use fieldops::dispatch::{DispatchService, MemoryStore};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the coordinator over the in-memory reference store. The store's
/// single transaction lock is the serialization point the scheduling and
/// payment sequences rely on.
pub(crate) fn build_dispatch_service() -> Arc<DispatchService<MemoryStore>> {
    Arc::new(DispatchService::new(Arc::new(MemoryStore::default())))
}
