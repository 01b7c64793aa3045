/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development, except the
/// secrets, which stay unset until provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public URL of the app, sent upstream as the referer.
    pub app_url: String,
    pub openrouter: OpenRouterSettings,
    pub firebase: FirebaseSettings,
}

/// Generation API settings.
#[derive(Clone)]
pub struct OpenRouterSettings {
    /// `None` disables caption generation.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

/// Identity provider and history store settings.
#[derive(Clone)]
pub struct FirebaseSettings {
    pub project_id: Option<String>,
    /// Base64 service-account JSON. `None` disables history.
    pub credentials_b64: Option<String>,
    pub firestore_database: Option<String>,
}

// Secrets are reported only as present or absent.
impl std::fmt::Debug for OpenRouterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl std::fmt::Debug for FirebaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseSettings")
            .field("project_id", &self.project_id)
            .field("credentials_b64", &self.credentials_b64.as_ref().map(|_| "<set>"))
            .field("firestore_database", &self.firestore_database)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                         |
    /// |----------------------------|---------------------------------|
    /// | `HOST`                     | `0.0.0.0`                       |
    /// | `PORT`                     | `3000`                          |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                            |
    /// | `APP_URL`                  | `http://localhost:3000`         |
    /// | `OPENROUTER_API_KEY`       | unset                           |
    /// | `OPENROUTER_MODEL`         | `openai/gpt-4o-mini`            |
    /// | `OPENROUTER_BASE_URL`      | `https://openrouter.ai/api/v1`  |
    /// | `FIREBASE_PROJECT_ID`      | from the service-account key    |
    /// | `FIREBASE_CREDENTIALS_B64` | unset                           |
    /// | `FIRESTORE_DATABASE`       | `(default)`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_url = non_empty_var("APP_URL").unwrap_or_else(|| "http://localhost:3000".into());

        let openrouter = OpenRouterSettings {
            api_key: non_empty_var("OPENROUTER_API_KEY"),
            model: non_empty_var("OPENROUTER_MODEL")
                .unwrap_or_else(|| scrollstop_openrouter::api::DEFAULT_MODEL.into()),
            base_url: non_empty_var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| scrollstop_openrouter::api::DEFAULT_BASE_URL.into()),
        };

        let firebase = FirebaseSettings {
            project_id: non_empty_var("FIREBASE_PROJECT_ID"),
            credentials_b64: non_empty_var("FIREBASE_CREDENTIALS_B64"),
            firestore_database: non_empty_var("FIRESTORE_DATABASE"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_url,
            openrouter,
            firebase,
        }
    }
}

/// Read an env var, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
