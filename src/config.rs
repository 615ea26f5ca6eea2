// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

use crate::models::GenderDomain;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Directory containing pre-built frontend files to serve.
    /// When set, the backend serves static files from this path.
    pub static_dir: Option<PathBuf>,
    /// Gender tokens accepted on requests and shown in listings.
    pub gender_domain: GenderDomain,
    /// JSON snapshot imported at startup when the store is still empty.
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:paldex.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `STATIC_DIR` - Path to frontend dist directory for static file serving
    /// - `GENDER_TOKENS` - `short` (`m`/`f`, default) or `word` (`male`/`female`)
    /// - `SEED_FILE` - Path to a data snapshot to import into an empty store
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--seed <PATH>` - Override the seed file
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let database_url =
            env("DATABASE_URL").unwrap_or_else(|| "sqlite:paldex.db?mode=rwc".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(3000);

        let static_dir = env("STATIC_DIR").map(PathBuf::from);

        let gender_domain = match env("GENDER_TOKENS") {
            Some(v) => GenderDomain::from_setting(&v).unwrap_or_else(|| {
                tracing::warn!("Unknown GENDER_TOKENS value '{v}', using short codes");
                GenderDomain::Short
            }),
            None => GenderDomain::Short,
        };

        let seed_file = Self::parse_cli_value(args, "--seed")
            .or_else(|| env("SEED_FILE"))
            .map(PathBuf::from);

        Config {
            database_url,
            port,
            static_dir,
            gender_domain,
            seed_file,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
