use anyhow::{Context, Result};
use clap::Args;
use std::env;

/// Default base URL of the api host (listings, photos, matching, ads).
pub const DEFAULT_API_BASE: &str = "https://express-server-kflw7id5la-as.a.run.app";

/// Default base URL of the auth host (auth, pet CRUD, photo upload).
pub const DEFAULT_AUTH_BASE: &str = "https://express-app-kflw7id5la-as.a.run.app";

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/pawtrail.db";
const DEFAULT_PHOTO_DIR: &str = "./data/photos";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub auth_base_url: String,
    pub database_url: String,
    pub photo_dir: String,
    pub timeout_secs: u64,
}

/// Global flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Api host base URL (overrides PAWTRAIL_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Auth host base URL (overrides PAWTRAIL_AUTH_BASE_URL)
    #[arg(long, global = true)]
    pub auth_base_url: Option<String>,

    /// Database URL for the local mirror (overrides PAWTRAIL_DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Photo cache directory (overrides PAWTRAIL_PHOTO_DIR)
    #[arg(long, global = true)]
    pub photo_dir: Option<String>,

    /// Request timeout in seconds (overrides PAWTRAIL_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Merge CLI arguments over environment variables over defaults.
    pub fn from_env_and_args(args: &ConfigArgs) -> Result<Self> {
        let env_api =
            env::var("PAWTRAIL_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let env_auth =
            env::var("PAWTRAIL_AUTH_BASE_URL").unwrap_or_else(|_| DEFAULT_AUTH_BASE.into());
        let env_db =
            env::var("PAWTRAIL_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let env_photos =
            env::var("PAWTRAIL_PHOTO_DIR").unwrap_or_else(|_| DEFAULT_PHOTO_DIR.into());
        let env_timeout = match env::var("PAWTRAIL_TIMEOUT_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing PAWTRAIL_TIMEOUT_SECS value `{}`", value))?,
            Err(env::VarError::NotPresent) => DEFAULT_TIMEOUT_SECS,
            Err(err) => return Err(err).context("reading PAWTRAIL_TIMEOUT_SECS"),
        };

        Ok(Self {
            api_base_url: args.api_base_url.clone().unwrap_or(env_api),
            auth_base_url: args.auth_base_url.clone().unwrap_or(env_auth),
            database_url: args.database_url.clone().unwrap_or(env_db),
            photo_dir: args.photo_dir.clone().unwrap_or(env_photos),
            timeout_secs: args.timeout_secs.unwrap_or(env_timeout),
        })
    }
}
