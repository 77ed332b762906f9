use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{LlmClient, LlmError};

type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// In-process model that answers from a closure and records every prompt.
pub struct ScriptedLlm {
    respond: Box<Responder>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(respond: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers with `responses` in order, repeating the last one.
    pub fn sequence(responses: Vec<&'static str>) -> Self {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        Self::new(move |_| {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let idx = n.min(responses.len().saturating_sub(1));
            responses
                .get(idx)
                .map(|s| s.to_string())
                .ok_or(LlmError::EmptyResponse)
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt)
    }
}
