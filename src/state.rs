use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::config::AppConfig;
use crate::llm::client::{GeminiClient, LlmClient};
use crate::storage::{MemoryStore, PgStore, PlanStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub llm: Arc<dyn LlmClient>,
    pub store: Arc<dyn PlanStore>,
}

impl AppState {
    /// Builds the state from the environment. Returns the pool too when
    /// Postgres is configured so the caller can run migrations.
    pub async fn init() -> anyhow::Result<(Self, Option<PgPool>)> {
        let config = Arc::new(AppConfig::from_env()?);

        let llm = Arc::new(GeminiClient::new(
            &config.gemini.base_url,
            &config.gemini.model,
            &config.gemini.api_key,
        )) as Arc<dyn LlmClient>;

        let (store, pool) = match &config.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await?;
                (
                    Arc::new(PgStore::new(db.clone())) as Arc<dyn PlanStore>,
                    Some(db),
                )
            }
            None => {
                info!("DATABASE_URL not set; using in-memory storage");
                (Arc::new(MemoryStore::new()) as Arc<dyn PlanStore>, None)
            }
        };

        Ok((Self::from_parts(config, llm, store), pool))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn PlanStore>,
    ) -> Self {
        Self { config, llm, store }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::llm::client::LlmError;
        use crate::llm::testing::ScriptedLlm;

        Self::with_llm(Arc::new(ScriptedLlm::new(|_| Err(LlmError::EmptyResponse))))
    }

    /// Fake state answering model calls with `llm`.
    #[cfg(test)]
    pub fn with_llm(llm: Arc<dyn LlmClient>) -> Self {
        use crate::config::{GeminiConfig, JwtConfig};

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                audience: "authenticated".into(),
                issuer: None,
            },
            gemini: GeminiConfig {
                api_key: "fake".into(),
                model: "fake".into(),
                base_url: "http://fake.local".into(),
            },
            menu_max_attempts: 3,
            ingredient_max_attempts: 3,
        });
        Self::from_parts(config, llm, Arc::new(MemoryStore::new()))
    }
}
