use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

/// `menu` is a JSON object for full-week prompts and a plain dish name for
/// alternative-dish prompts.
#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub menu: Value,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}
