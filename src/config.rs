use serde::Deserialize;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub audience: String,
    /// Tokens are not checked for an issuer when unset.
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// In-memory storage is used when unset.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub gemini: GeminiConfig,
    pub menu_max_attempts: u32,
    pub ingredient_max_attempts: u32,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn attempts(key: &str) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(3)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            audience: env_or("JWT_AUDIENCE", "authenticated"),
            issuer: std::env::var("JWT_ISSUER").ok().filter(|v| !v.is_empty()),
        };
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY")?,
            model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
        };
        Ok(Self {
            database_url,
            jwt,
            gemini,
            menu_max_attempts: attempts("MENU_MAX_ATTEMPTS"),
            ingredient_max_attempts: attempts("INGREDIENT_MAX_ATTEMPTS"),
        })
    }
}
