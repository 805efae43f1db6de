use std::env;
use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::Error;

/// Marker value of the unsync column that excludes a row from the pull
/// direction. Spreadsheet checkboxes render as the literal string TRUE.
pub const UNSYNC_TRUE: &str = "TRUE";

/// Settings for the health-check web service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub debug: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Error> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got {raw:?}")))?,
            Err(_) => 5000,
        };

        let debug = env::var("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false);

        Ok(AppConfig { port, debug })
    }
}

/// Settings for the sync drivers. Built from the environment once at
/// startup; the credential is materialized to a temp file here so the
/// process fails immediately when it is missing.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub sheet_url: String,
    pub credential_path: PathBuf,
    pub data_sheet_name: String,
    pub sync_sheet_name: String,
    pub meta_sheet_name: String,
    pub unsync_field: String,
    pub id_field: String,
    pub language_dir: PathBuf,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, Error> {
        let encoded = env::var("CREDENTIAL_BASE64").map_err(|_| {
            Error::Config(
                "CREDENTIAL_BASE64 must be set to a base64-encoded service credential".to_string(),
            )
        })?;

        let credential_path = materialize_credential(&encoded)?;

        Ok(SyncConfig {
            sheet_url: env_or("SHEET_URL", "https://sheets.example.com/spreadsheets/d/unset"),
            credential_path,
            data_sheet_name: env_or("DATA_SHEET_NAME", "origin"),
            sync_sheet_name: env_or("SYNC_SHEET_NAME", "data"),
            meta_sheet_name: env_or("META_SHEET_NAME", "meta"),
            unsync_field: env_or("UNSYNC_FIELD", "unsync"),
            id_field: env_or("ID_FIELD", "Translation ID"),
            language_dir: PathBuf::from(env_or("LANGUAGE_DIR", "language-pack")),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Decodes the base64 credential into `$TMPDIR/key.json` and returns the
/// path. The file outlives the process on purpose, matching the batch-job
/// lifecycle the drivers run under.
fn materialize_credential(encoded: &str) -> Result<PathBuf, Error> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Config(format!("CREDENTIAL_BASE64 is not valid base64: {e}")))?;

    let text = String::from_utf8(bytes)
        .map_err(|e| Error::Config(format!("decoded credential is not UTF-8: {e}")))?;

    let path = env::temp_dir().join("key.json");
    fs::write(&path, text)?;
    Ok(path)
}
