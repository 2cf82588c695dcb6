use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- API Args ---
    /// Base URL of the chat API. `/health` and `/api/...` are resolved against it.
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:3001")]
    pub api_base_url: String,

    /// Seconds to wait for any API call before reporting it as failed.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    // --- Session Args ---
    /// Wallet address to chat as (e.g., 0xABC...). Can also be set from the console.
    #[arg(long, env = "USER_ADDRESS")]
    pub user_address: Option<String>,

    /// Model id from the built-in catalog (0-3).
    #[arg(long, env = "MODEL_ID", default_value = "0")]
    pub model_id: u32,

    /// Seconds between background history refreshes. 0 disables them.
    #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value = "0")]
    pub refresh_interval_secs: u64,

    // --- General App Args ---
    /// Directory that exported chat transcripts are written to.
    #[arg(long, env = "EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        match self.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["wallet-chat"]).unwrap();
        assert_eq!(args.api_base_url, "http://localhost:3001");
        assert_eq!(args.request_timeout(), Duration::from_secs(10));
        assert_eq!(args.model_id, 0);
        assert_eq!(args.refresh_interval(), None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "wallet-chat",
            "--api-base-url",
            "http://api.test:8080",
            "--user-address",
            "0xABC",
            "--model-id",
            "2",
            "--refresh-interval-secs",
            "5",
            "--request-timeout-secs",
            "0",
        ]).unwrap();
        assert_eq!(args.api_base_url, "http://api.test:8080");
        assert_eq!(args.user_address.as_deref(), Some("0xABC"));
        assert_eq!(args.model_id, 2);
        assert_eq!(args.refresh_interval(), Some(Duration::from_secs(5)));
        assert_eq!(args.request_timeout(), Duration::from_secs(1));
    }
}
