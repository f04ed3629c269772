use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Allows one render at a time. A request arriving while another is in flight
/// is turned away instead of queued.
#[derive(Clone, Debug)]
pub struct RenderGate {
    permits: Arc<Semaphore>,
}

impl RenderGate {
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// The render slot, if free. It is released when the permit is dropped.
    pub fn try_enter(&self) -> Option<OwnedSemaphorePermit> {
        self.permits.clone().try_acquire_owned().ok()
    }

    pub fn is_busy(&self) -> bool {
        self.permits.available_permits() == 0
    }
}

impl Default for RenderGate {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn render_gate_middleware(
    State(gate): State<RenderGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(_permit) = gate.try_enter() else {
        tracing::debug!(path = %req.uri().path(), "Render already in progress");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "render_in_progress" })),
        )
            .into_response();
    };
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_reports_busy_while_permit_is_held() {
        let gate = RenderGate::new();
        assert!(!gate.is_busy());
        let permit = gate.try_enter().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_enter().is_none());
        drop(permit);
        assert!(!gate.is_busy());
    }
}
