//! Timing layer for allowed operations

use super::{DispatchError, GuardLayer, GuardedRequest, OperationHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;

/// Logs arguments, outcome, and elapsed wall-clock time of the wrapped call.
/// Results and failures pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingLayer;

impl TimingLayer {
    /// Create a timing layer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GuardLayer for TimingLayer {
    async fn process(
        &self,
        request: GuardedRequest,
        next: &dyn OperationHandler,
    ) -> Result<Value, DispatchError> {
        let operation = request.descriptor.qualified_name();
        let arguments = request.descriptor.arguments_display();
        tracing::debug!(%operation, %arguments, "Executing operation");

        let started = Instant::now();
        let result = next.handle(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(%operation, elapsed_ms, "Operation completed"),
            Err(err) => tracing::warn!(%operation, elapsed_ms, error = %err, "Operation failed"),
        }
        result
    }

    fn name(&self) -> &str {
        "timing"
    }
}
