use clap::Args;
use url::Url;

#[derive(Debug, Clone, Args)]
#[allow(clippy::struct_field_names)]
pub struct VoiceConfig {
    /// RetellAI API key. Assistant endpoints that talk to the vendor are disabled without it.
    #[arg(long, env = "VOICE_API_KEY", required = false)]
    pub voice_api_key: Option<String>,
    #[arg(long, default_value = "https://api.retellai.com/v1")]
    pub voice_api_url: Url,
    /// Public key handed to the browser when a call is started.
    #[arg(long, env = "VOICE_PUBLIC_KEY", required = false)]
    pub voice_public_key: Option<String>,
    /// Externally reachable base URL, used to build the webhook URLs registered with the vendor.
    #[arg(long, default_value = "http://localhost:3030")]
    pub public_base_url: Url,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        voice: VoiceConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["campus"]).unwrap();
        assert_eq!(cli.voice.voice_api_url.as_str(), "https://api.retellai.com/v1");
        assert_eq!(cli.voice.public_base_url.as_str(), "http://localhost:3030/");
        assert!(cli.voice.voice_public_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "campus",
            "--voice-api-key",
            "key",
            "--public-base-url",
            "https://lms.example.org",
        ])
        .unwrap();
        assert_eq!(cli.voice.voice_api_key.as_deref(), Some("key"));
        assert_eq!(cli.voice.public_base_url.host_str(), Some("lms.example.org"));
    }
}
