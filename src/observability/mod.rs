pub mod error_tracking;

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters rendered in Prometheus text format at `/metrics`.
#[derive(Default)]
pub struct AppMetrics {
    request_count: AtomicU64,
    error_count: AtomicU64,
    auth_failure_count: AtomicU64,
    latency_total_ms: AtomicU64,
    latency_count: AtomicU64,
    conversations_started: AtomicU64,
    messages_sent: AtomicU64,
    order_requests: AtomicU64,
    orders_accepted: AtomicU64,
    orders_declined: AtomicU64,
}

impl AppMetrics {
    pub fn record_request(&self, status: u16, latency_ms: u64) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if status >= 500 {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if status == 401 {
            self.auth_failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.latency_total_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conversation_started(&self, created: bool) {
        if created {
            self.conversations_started.fetch_add(1, Ordering::Relaxed);
        }
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_order_request(&self) {
        self.order_requests.fetch_add(1, Ordering::Relaxed);
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_order_response(&self, accepted: bool) {
        if accepted {
            self.orders_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.orders_declined.fetch_add(1, Ordering::Relaxed);
        }
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self, db_size: u32, db_idle: usize) -> String {
        let count = self.latency_count.load(Ordering::Relaxed).max(1);
        let avg_latency = self.latency_total_ms.load(Ordering::Relaxed) as f64 / count as f64;

        format!(
            concat!(
                "# TYPE http_requests_total counter\n",
                "http_requests_total {}\n",
                "# TYPE http_error_total counter\n",
                "http_error_total {}\n",
                "# TYPE auth_failures_total counter\n",
                "auth_failures_total {}\n",
                "# TYPE http_latency_avg_ms gauge\n",
                "http_latency_avg_ms {:.2}\n",
                "# TYPE conversations_started_total counter\n",
                "conversations_started_total {}\n",
                "# TYPE messages_sent_total counter\n",
                "messages_sent_total {}\n",
                "# TYPE order_requests_total counter\n",
                "order_requests_total {}\n",
                "# TYPE order_responses_total counter\n",
                "order_responses_total{{outcome=\"accepted\"}} {}\n",
                "order_responses_total{{outcome=\"declined\"}} {}\n",
                "# TYPE db_pool_size gauge\n",
                "db_pool_size {}\n",
                "# TYPE db_pool_idle gauge\n",
                "db_pool_idle {}\n",
            ),
            self.request_count.load(Ordering::Relaxed),
            self.error_count.load(Ordering::Relaxed),
            self.auth_failure_count.load(Ordering::Relaxed),
            avg_latency,
            self.conversations_started.load(Ordering::Relaxed),
            self.messages_sent.load(Ordering::Relaxed),
            self.order_requests.load(Ordering::Relaxed),
            self.orders_accepted.load(Ordering::Relaxed),
            self.orders_declined.load(Ordering::Relaxed),
            db_size,
            db_idle,
        )
    }
}
