// config.rs
use std::env;

use crate::errors::{AppError, Result};

const DEFAULT_SMTP_FROM: &str = "noreply@agromarket.com";
const MAX_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub smtp: SmtpConfig,
    pub fcm: FcmConfig,
    pub reset: ResetConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub secure: bool,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub service_account_path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct ResetConfig {
    pub code_ttl_minutes: i64,
    pub session_ttl_minutes: i64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: 15,
            session_ttl_minutes: 30,
        }
    }
}

impl SmtpConfig {
    /// A transport can only be built when host and credentials are all present.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.user.is_empty() && !self.pass.is_empty()
    }

    /// Sender address: SMTP_FROM, then the SMTP user, then the no-reply fallback.
    pub fn from_address(&self) -> &str {
        if !self.from.is_empty() {
            &self.from
        } else if !self.user.is_empty() {
            &self.user
        } else {
            DEFAULT_SMTP_FROM
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Values are trimmed and empty
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port = parse_number(&get_or("PORT", "10000"), "PORT")?;

        let smtp = SmtpConfig {
            host: get_or("SMTP_HOST", "smtp.gmail.com"),
            port: parse_number(&get_or("SMTP_PORT", "587"), "SMTP_PORT")?,
            user: get("SMTP_USER").unwrap_or_default(),
            pass: get("SMTP_PASS").unwrap_or_default(),
            secure: get_or("SMTP_SECURE", "false") == "true",
            from: get("SMTP_FROM").unwrap_or_default(),
        };

        let fcm = FcmConfig {
            project_id: get("FIREBASE_PROJECT_ID").unwrap_or_default(),
            service_account_path: get_or(
                "FIREBASE_SERVICE_ACCOUNT_PATH",
                "./firebase-service-account.json",
            ),
        };

        let defaults = ResetConfig::default();
        let reset = ResetConfig {
            code_ttl_minutes: match get("RESET_CODE_TTL_MINUTES") {
                Some(v) => parse_ttl(&v, "RESET_CODE_TTL_MINUTES")?,
                None => defaults.code_ttl_minutes,
            },
            session_ttl_minutes: match get("RESET_SESSION_TTL_MINUTES") {
                Some(v) => parse_ttl(&v, "RESET_SESSION_TTL_MINUTES")?,
                None => defaults.session_ttl_minutes,
            },
        };

        Ok(AppConfig {
            host: get_or("HOST", "0.0.0.0"),
            port,
            database_url: get("DATABASE_URL")
                .ok_or_else(|| AppError::configuration("DATABASE_URL must be set"))?,
            database_name: get_or("DATABASE_NAME", "agromarket"),
            smtp,
            fcm,
            reset,
        })
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "port": self.port,
            "database_name": self.database_name,
            "smtp_host": self.smtp.host,
            "smtp_port": self.smtp.port,
            "smtp_secure": self.smtp.secure,
            "smtp_user_set": !self.smtp.user.is_empty(),
            "smtp_pass_set": !self.smtp.pass.is_empty(),
            "fcm_project_id": self.fcm.project_id,
            "reset_code_ttl_minutes": self.reset.code_ttl_minutes,
            "reset_session_ttl_minutes": self.reset.session_ttl_minutes,
        })
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| AppError::configuration(format!("{} must be a number, got '{}'", key, value)))
}

// Reset TTLs must be positive and at most one day.
fn parse_ttl(value: &str, key: &str) -> Result<i64> {
    let minutes: i64 = parse_number(value, key)?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        return Err(AppError::configuration(format!(
            "{} must be between 1 and {} minutes, got {}",
            key, MAX_TTL_MINUTES, minutes
        )));
    }
    Ok(minutes)
}
