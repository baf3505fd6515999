use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Site URL used when neither `SITE_URL` nor `VERCEL_URL` is set.
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

/// Default base URL of the captioning pipeline API.
pub const DEFAULT_CAPTION_API_BASE: &str = "https://api.almostcrackd.ai";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Base URL of the hosted backend (identity provider and REST data store).
    #[arg(long, env)]
    supabase_url: Option<String>,

    /// Public (anon) API key sent as the `apikey` header to the hosted backend.
    #[arg(long, env)]
    supabase_anon_key: Option<String>,

    /// Public URL of this application, used to build OAuth callback and redirect targets.
    #[arg(long, env)]
    site_url: Option<String>,

    /// Deployment host name, used as the site URL when `SITE_URL` is not set.
    #[arg(long, env)]
    vercel_url: Option<String>,

    /// The external OAuth provider the identity provider should delegate to.
    #[arg(long, env, default_value = "google")]
    pub oauth_provider: String,

    /// Base URL of the captioning pipeline API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_CAPTION_API_BASE)]
    caption_api_base: String,

    /// Table listed on the home page.
    #[arg(long, env, default_value = "images")]
    pub supabase_table: String,

    /// Column selection for the home page listing.
    #[arg(long, env, default_value = "*")]
    pub supabase_select: String,

    /// Maximum number of rows listed on the home page.
    #[arg(long, env, default_value_t = 20)]
    pub supabase_limit: u32,

    /// Table holding generated captions.
    #[arg(long, env, default_value = "captions")]
    pub captions_table: String,

    #[arg(long, env, default_value = "id")]
    pub captions_id_column: String,

    #[arg(long, env, default_value = "content")]
    pub captions_text_column: String,

    /// Boolean column marking a caption as visible to the community feed.
    #[arg(long, env, default_value = "is_public")]
    pub captions_public_column: String,

    #[arg(long, env, default_value = "image_id")]
    pub captions_image_id_column: String,

    /// Optional column holding a direct image URL on the caption row itself.
    #[arg(long, env)]
    pub captions_image_url_column: Option<String>,

    /// Maximum number of captions fetched for the random caption feed.
    #[arg(long, env, default_value_t = 25)]
    pub captions_limit: u32,

    #[arg(long, env, default_value = "images")]
    pub images_table: String,

    #[arg(long, env, default_value = "id")]
    pub images_id_column: String,

    #[arg(long, env, default_value = "url")]
    pub images_url_column: String,

    /// Table receiving caption votes.
    #[arg(long, env, default_value = "caption_votes")]
    pub caption_votes_table: String,

    #[arg(long, env, default_value = "caption_id")]
    pub caption_votes_caption_id_column: String,

    #[arg(long, env, default_value = "vote")]
    pub caption_votes_score_column: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the hosted backend base URL, if configured and non-empty.
    pub fn supabase_url(&self) -> Option<String> {
        non_empty(&self.supabase_url)
    }

    pub fn set_supabase_url(mut self, supabase_url: String) -> Self {
        self.supabase_url = Some(supabase_url);
        self
    }

    /// Returns the anon API key, if configured and non-empty.
    pub fn supabase_anon_key(&self) -> Option<String> {
        non_empty(&self.supabase_anon_key)
    }

    pub fn set_supabase_anon_key(mut self, anon_key: String) -> Self {
        self.supabase_anon_key = Some(anon_key);
        self
    }

    /// Returns the captioning pipeline base URL without a trailing slash.
    pub fn caption_api_base(&self) -> &str {
        self.caption_api_base.trim_end_matches('/')
    }

    pub fn set_caption_api_base(mut self, base: String) -> Self {
        self.caption_api_base = base;
        self
    }

    /// Resolves the public URL of this application.
    ///
    /// `SITE_URL` wins, then `VERCEL_URL` (which is a bare host name unless it
    /// already carries a scheme), then the local development default. Trailing
    /// slashes are stripped.
    pub fn site_url(&self) -> String {
        if let Some(site_url) = non_empty(&self.site_url) {
            return site_url.trim_end_matches('/').to_string();
        }

        if let Some(vercel_url) = non_empty(&self.vercel_url) {
            let normalized = vercel_url.trim_end_matches('/');
            return if normalized.starts_with("http") {
                normalized.to_string()
            } else {
                format!("https://{normalized}")
            };
        }

        DEFAULT_SITE_URL.to_string()
    }

    pub fn set_site_url(mut self, site_url: String) -> Self {
        self.site_url = Some(site_url);
        self
    }

    pub fn set_vercel_url(mut self, vercel_url: String) -> Self {
        self.vercel_url = Some(vercel_url);
        self
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Parses from an explicit argument list so the test harness's own flags are ignored.
    fn bare_config() -> Config {
        Config::parse_from(["caption_vote"])
    }

    #[test]
    #[serial]
    fn test_site_url_prefers_site_url_and_strips_trailing_slash() {
        let config = bare_config()
            .set_site_url("https://captions.example.com/".to_string())
            .set_vercel_url("ignored.vercel.app".to_string());

        assert_eq!(config.site_url(), "https://captions.example.com");
    }

    #[test]
    #[serial]
    fn test_site_url_falls_back_to_vercel_host_with_https() {
        let config = Config {
            site_url: None,
            ..bare_config()
        }
        .set_vercel_url("my-app.vercel.app/".to_string());

        assert_eq!(config.site_url(), "https://my-app.vercel.app");
    }

    #[test]
    #[serial]
    fn test_site_url_keeps_vercel_scheme_when_present() {
        let config = Config {
            site_url: None,
            ..bare_config()
        }
        .set_vercel_url("http://preview.local".to_string());

        assert_eq!(config.site_url(), "http://preview.local");
    }

    #[test]
    #[serial]
    fn test_site_url_defaults_to_localhost() {
        let config = Config {
            site_url: None,
            vercel_url: None,
            ..bare_config()
        };

        assert_eq!(config.site_url(), DEFAULT_SITE_URL);
    }

    #[test]
    #[serial]
    fn test_empty_supabase_values_are_treated_as_missing() {
        let config = bare_config()
            .set_supabase_url("  ".to_string())
            .set_supabase_anon_key(String::new());

        assert!(config.supabase_url().is_none());
        assert!(config.supabase_anon_key().is_none());
    }

    #[test]
    fn test_rust_env_parsing_is_case_insensitive() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    #[serial]
    fn test_caption_api_base_strips_trailing_slash() {
        let config = bare_config().set_caption_api_base("http://127.0.0.1:1234/".to_string());
        assert_eq!(config.caption_api_base(), "http://127.0.0.1:1234");
    }
}
