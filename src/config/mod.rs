use crate::cli::Args;

/// Immutable runtime configuration, built once at startup and shared by
/// reference. Endpoint url/key stay optional: their absence is a per-request
/// misconfiguration error, never a startup crash.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub static_dir: String,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            port: args.port,
            api_url: args.api_url.clone(),
            api_key: args.api_key.clone(),
            model: args.model.clone(),
            max_tokens: args.max_tokens,
            timeout_secs: args.timeout_secs,
            static_dir: args.static_dir.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            api_url: None,
            api_key: None,
            model: "gemini-default".into(),
            max_tokens: 2000,
            timeout_secs: 30,
            static_dir: "public".into(),
        }
    }
}
