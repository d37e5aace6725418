//! Guard stack implementation

use super::{DispatchError, GuardLayer, GuardedRequest, OperationHandler};
use async_trait::async_trait;
use aula_core::AulaError;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type ChainFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, DispatchError>> + Send + 'a>>;

/// Ordered guard layers around a final handler.
#[derive(Default)]
pub struct GuardStack {
    layers: Vec<Arc<dyn GuardLayer>>,
    handler: Option<Arc<dyn OperationHandler>>,
}

impl GuardStack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer; layers run in insertion order
    pub fn add_layer(&mut self, layer: Arc<dyn GuardLayer>) {
        self.layers.push(layer);
    }

    /// Set the wrapped operation handler
    pub fn set_handler(&mut self, handler: Arc<dyn OperationHandler>) {
        self.handler = Some(handler);
    }

    /// Run a request through every layer and then the handler
    pub async fn process(&self, request: GuardedRequest) -> Result<Value, DispatchError> {
        let Some(handler) = &self.handler else {
            return Err(AulaError::internal("No operation handler configured").into());
        };
        GuardChain {
            layers: &self.layers,
            handler,
        }
        .execute(request, 0)
        .await
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layers are installed
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names in execution order
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

/// Builder for guard stacks
#[derive(Default)]
pub struct GuardStackBuilder {
    stack: GuardStack,
}

impl GuardStackBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer
    pub fn with_layer(mut self, layer: Arc<dyn GuardLayer>) -> Self {
        self.stack.add_layer(layer);
        self
    }

    /// Append a layer when `enabled`
    pub fn with_optional_layer(self, enabled: bool, layer: Arc<dyn GuardLayer>) -> Self {
        if enabled {
            self.with_layer(layer)
        } else {
            self
        }
    }

    /// Set the wrapped operation handler
    pub fn with_handler(mut self, handler: Arc<dyn OperationHandler>) -> Self {
        self.stack.set_handler(handler);
        self
    }

    /// Build the stack
    pub fn build(self) -> GuardStack {
        self.stack
    }
}

struct GuardChain<'a> {
    layers: &'a [Arc<dyn GuardLayer>],
    handler: &'a Arc<dyn OperationHandler>,
}

impl<'a> GuardChain<'a> {
    fn execute<'s>(&'s self, request: GuardedRequest, index: usize) -> ChainFuture<'s> {
        Box::pin(async move {
            match self.layers.get(index) {
                Some(layer) => {
                    let next = NextHandler {
                        chain: self,
                        index: index + 1,
                    };
                    layer.process(request, &next).await
                }
                None => self.handler.handle(request).await,
            }
        })
    }
}

struct NextHandler<'a> {
    chain: &'a GuardChain<'a>,
    index: usize,
}

#[async_trait]
impl OperationHandler for NextHandler<'_> {
    async fn handle(&self, request: GuardedRequest) -> Result<Value, DispatchError> {
        self.chain.execute(request, self.index).await
    }
}
