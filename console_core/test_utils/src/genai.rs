use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared_clients::genai::{GenAiError, GenerativeModel, ModelTier};

#[derive(Debug, Clone)]
pub struct ModelCall {
    pub tier: ModelTier,
    pub prompt: String,
    pub schema: Option<Value>,
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Answers every request with a canned reply and records what was asked.
pub struct RecordingModel {
    reply: String,
    calls: Mutex<Vec<ModelCall>>,
    on_call: Option<Hook>,
}

impl RecordingModel {
    pub fn with_text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
            on_call: None,
        }
    }

    /// Runs `hook` inside every request, after it is recorded.
    pub fn on_call(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn with_json(reply: Value) -> Self {
        Self::with_text(reply.to_string())
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, tier: ModelTier, prompt: &str, schema: Option<Value>) {
        self.calls.lock().push(ModelCall {
            tier,
            prompt: prompt.to_string(),
            schema,
        });
        if let Some(hook) = &self.on_call {
            hook();
        }
    }
}

#[async_trait]
impl GenerativeModel for RecordingModel {
    async fn generate_text(&self, tier: ModelTier, prompt: &str) -> Result<String, GenAiError> {
        self.record(tier, prompt, None);
        Ok(self.reply.clone())
    }

    async fn generate_json(
        &self,
        tier: ModelTier,
        prompt: &str,
        schema: Value,
    ) -> Result<Value, GenAiError> {
        self.record(tier, prompt, Some(schema));
        serde_json::from_str(&self.reply)
            .map_err(|e| GenAiError::invalid_response(format!("canned reply is not JSON: {e}")))
    }
}

/// Every request fails as if the service were unreachable.
pub struct FailingModel;

#[async_trait]
impl GenerativeModel for FailingModel {
    async fn generate_text(&self, _tier: ModelTier, _prompt: &str) -> Result<String, GenAiError> {
        Err(GenAiError::invalid_response("model unavailable"))
    }

    async fn generate_json(
        &self,
        _tier: ModelTier,
        _prompt: &str,
        _schema: Value,
    ) -> Result<Value, GenAiError> {
        Err(GenAiError::invalid_response("model unavailable"))
    }
}
