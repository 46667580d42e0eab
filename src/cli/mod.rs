use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sitegen", version, about = "Prompt-to-website generator with live preview and zip download")]
pub struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Completion endpoint URL. Missing url/key does not abort startup;
    /// /api/generate answers 500 until both are set.
    #[arg(long, env = "COMPLETION_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for the completion endpoint.
    #[arg(long, env = "COMPLETION_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model identifier sent with every completion request.
    #[arg(long, env = "COMPLETION_MODEL", default_value = "gemini-default")]
    pub model: String,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Token budget passed to the completion endpoint.
    #[arg(long, default_value_t = 2000)]
    pub max_tokens: u32,

    /// Directory the front-end is served from.
    #[arg(long, default_value = "public")]
    pub static_dir: String,
}
