use tracing::error;
use uuid::Uuid;

/// Records a 5xx that escaped the handlers and returns the event id quoted in
/// the log line. Non-5xx statuses are ignored.
pub fn capture_unexpected_5xx(
    path: &str,
    method: &str,
    status: u16,
    request_id: &str,
) -> Option<Uuid> {
    if !(500..=599).contains(&status) {
        return None;
    }

    let event_id = Uuid::new_v4();
    error!(
        tracking_backend = "log",
        event_id = %event_id,
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status,
        "unexpected server error"
    );
    Some(event_id)
}
