use std::path::PathBuf;

use directories::ProjectDirs;

use crate::db::Database;
use crate::error::AppError;

/// CRM ingestion endpoint. Relay routes wrap this URL, they never replace it.
pub const INGEST_URL: &str = "https://api.planetaformacion.com/captacion/v1/lead";

pub fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("", "lead-courier", "lead-courier")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

pub fn db_path() -> anyhow::Result<PathBuf> {
    let dirs = project_dirs()?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("lead-courier.db"))
}

/// Settings keys recognized by `config show` / `config set`, with their
/// defaults. The rate-limit window state lives in the same table but is
/// engine-owned and not listed here.
pub const SETTING_KEYS: &[(&str, &str)] = &[
    ("api_key", ""),
    ("environment", "pre"),
    ("institution", "UNIE"),
    ("brand", "unie"),
    ("origin", "4"),
    ("campaign", "I10002S0003"),
    ("campus", "1"),
    ("impartation", "1"),
    ("timing", "1"),
    ("postcode", "28000"),
    ("sex", "Man"),
    ("home_country", "ES"),
    (
        "consent_text",
        "Acepto la política de privacidad y el tratamiento de mis datos \
         con fines de información académica y comercial.",
    ),
];

/// Typed view of the settings table. Loaded once per command so the sync
/// engine and the payload mapper never touch ambient state.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub api_key: String,
    pub environment: String,
    pub institution: String,
    pub brand: String,
    pub origin: String,
    pub campaign: String,
    pub campus: String,
    pub impartation: String,
    pub timing: String,
    pub postcode: String,
    pub sex: String,
    pub home_country: String,
    pub consent_text: String,
}

impl SyncSettings {
    pub fn load(db: &Database) -> Result<Self, AppError> {
        let get = |key: &str| -> Result<String, AppError> {
            let default = SETTING_KEYS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, d)| *d)
                .unwrap_or("");
            Ok(db.get_setting(key)?.unwrap_or_else(|| default.to_string()))
        };

        Ok(Self {
            api_key: get("api_key")?,
            environment: get("environment")?,
            institution: get("institution")?,
            brand: get("brand")?,
            origin: get("origin")?,
            campaign: get("campaign")?,
            campus: get("campus")?,
            impartation: get("impartation")?,
            timing: get("timing")?,
            postcode: get("postcode")?,
            sex: get("sex")?,
            home_country: get("home_country")?,
            consent_text: get("consent_text")?,
        })
    }

    /// Fails before any network activity when the api key is unset.
    pub fn require_api_key(&self) -> Result<&str, AppError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(AppError::ConfigMissing(
                "api_key (set it with `lead-courier config set api_key <value>`)".into(),
            ));
        }
        Ok(key)
    }
}
