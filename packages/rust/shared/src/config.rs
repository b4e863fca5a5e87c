//! Application configuration for glossimport.
//!
//! User config lives at `~/.glossimport/glossimport.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GlossImportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "glossimport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".glossimport";

/// Three lower-case letters (ISO 639-2/3 style).
static LANG_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3}$").expect("language code regex"));

/// Glossary IDs become directory names, so keep them to one safe path segment.
static GLOSSARY_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("glossary id regex")
});

// ---------------------------------------------------------------------------
// Config structs (matching glossimport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults for the `import` command.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Register stakeholder details written to `register.yaml`.
    #[serde(default)]
    pub register: RegisterConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory the glossary repository is written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Language code of the imported terms.
    #[serde(default = "default_lang_code")]
    pub lang_code: String,

    /// Domain the register is published under.
    #[serde(default)]
    pub domain_name: Option<String>,

    /// Whether CSV files start with a header row.
    #[serde(default)]
    pub header_row: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            lang_code: default_lang_code(),
            domain_name: None,
            header_row: false,
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_lang_code() -> String {
    "eng".into()
}

/// `[register]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterConfig {
    /// Display name of the register manager.
    #[serde(default = "default_manager_name")]
    pub manager_name: String,

    /// Git server username of the register manager.
    #[serde(default = "default_git_server_username")]
    pub git_server_username: String,

    /// Contact email listed for the managing party.
    #[serde(default = "default_contact_email")]
    pub contact_email: String,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            manager_name: default_manager_name(),
            git_server_username: default_git_server_username(),
            contact_email: default_contact_email(),
        }
    }
}

fn default_manager_name() -> String {
    "Demo user".into()
}
fn default_git_server_username() -> String {
    "demouser".into()
}
fn default_contact_email() -> String {
    "test@example.com".into()
}

// ---------------------------------------------------------------------------
// Import settings (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime import settings, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// CSV export to import.
    pub input_csv: PathBuf,
    /// Repository root the dataset is created in.
    pub output_dir: PathBuf,
    /// Language code of the localized subregister.
    pub lang_code: String,
    /// Dataset / glossary identifier.
    pub glossary_id: String,
    /// Domain name the register is published under.
    pub domain_name: String,
    /// Whether the CSV starts with a header row.
    pub header_row: bool,
    /// Register stakeholder details.
    pub register: RegisterConfig,
}

impl ImportSettings {
    /// Settings for `input_csv` / `glossary_id`, everything else taken from
    /// the config file. Callers override fields from CLI flags afterwards.
    pub fn new(
        input_csv: impl Into<PathBuf>,
        glossary_id: impl Into<String>,
        config: &AppConfig,
    ) -> Self {
        Self {
            input_csv: input_csv.into(),
            output_dir: PathBuf::from(&config.defaults.output_dir),
            lang_code: config.defaults.lang_code.clone(),
            glossary_id: glossary_id.into(),
            domain_name: config.defaults.domain_name.clone().unwrap_or_default(),
            header_row: config.defaults.header_row,
            register: config.register.clone(),
        }
    }

    /// The register's `uniformResourceIdentifier`.
    pub fn register_uri(&self) -> String {
        format!("https://{}", self.domain_name.trim())
    }

    /// Check every field and report all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.input_csv.as_os_str().is_empty() {
            errors.push("input CSV path must not be empty".into());
        } else if !self.input_csv.exists() {
            errors.push(format!(
                "input CSV path {} must be an existing file",
                self.input_csv.display()
            ));
        } else if !self.input_csv.is_file() {
            errors.push(format!(
                "input CSV path {} must be a file",
                self.input_csv.display()
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            errors.push("output directory must not be empty".into());
        }

        if !LANG_CODE_RE.is_match(&self.lang_code) {
            errors.push(format!(
                "language code '{}' must be a three-letter language code",
                self.lang_code
            ));
        }

        if self.glossary_id.trim().is_empty() {
            errors.push("glossary ID must not be empty".into());
        } else if !GLOSSARY_ID_RE.is_match(&self.glossary_id) {
            errors.push(format!(
                "glossary ID '{}' may only contain letters, digits, '.', '_' and '-'",
                self.glossary_id
            ));
        }

        if self.domain_name.trim().is_empty() {
            errors.push("domain name must not be empty".into());
        } else {
            match Url::parse(&self.register_uri()) {
                Ok(url) if url.host_str().is_some() && url.path() == "/" => {}
                _ => errors.push(format!("domain name '{}' is not valid", self.domain_name)),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GlossImportError::config(errors.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.glossimport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GlossImportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.glossimport/glossimport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GlossImportError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        GlossImportError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GlossImportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config)
        .map_err(|e| GlossImportError::Serialization(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GlossImportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_csv() -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "gi-config-test-{}.csv",
            uuid::Uuid::now_v7()
        ));
        std::fs::write(&path, "").unwrap();
        path
    }

    fn valid_settings(csv: &Path) -> ImportSettings {
        let mut settings = ImportSettings::new(csv, "iso-80000", &AppConfig::default());
        settings.domain_name = "glossary.example.com".into();
        settings
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("lang_code"));
        assert!(toml_str.contains("Demo user"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.lang_code, "eng");
        assert_eq!(parsed.register.git_server_username, "demouser");
    }

    #[test]
    fn config_with_register_section() {
        let toml_str = r#"
[defaults]
domain_name = "terms.example.org"
header_row = true

[register]
manager_name = "Ada"
contact_email = "ada@example.org"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.domain_name.as_deref(), Some("terms.example.org"));
        assert!(config.defaults.header_row);
        assert_eq!(config.defaults.output_dir, ".");
        assert_eq!(config.register.manager_name, "Ada");
        assert_eq!(config.register.git_server_username, "demouser");
    }

    #[test]
    fn settings_take_defaults_from_config() {
        let mut config = AppConfig::default();
        config.defaults.lang_code = "fra".into();
        config.defaults.domain_name = Some("example.fr".into());

        let settings = ImportSettings::new("in.csv", "vocab", &config);
        assert_eq!(settings.lang_code, "fra");
        assert_eq!(settings.register_uri(), "https://example.fr");
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn valid_settings_pass() {
        let csv = temp_csv();
        assert!(valid_settings(&csv).validate().is_ok());
        let _ = std::fs::remove_file(&csv);
    }

    #[test]
    fn validation_reports_every_problem() {
        let csv = temp_csv();
        let mut settings = valid_settings(&csv);
        settings.lang_code = "en".into();
        settings.glossary_id = "../escape".into();
        settings.domain_name = String::new();

        let msg = settings.validate().unwrap_err().to_string();
        assert!(msg.contains("three-letter language code"));
        assert!(msg.contains("glossary ID"));
        assert!(msg.contains("domain name must not be empty"));

        let _ = std::fs::remove_file(&csv);
    }

    #[test]
    fn validation_requires_existing_file() {
        let mut settings = valid_settings(Path::new("/nonexistent/glossary.csv"));
        let msg = settings.validate().unwrap_err().to_string();
        assert!(msg.contains("must be an existing file"));

        settings.input_csv = std::env::temp_dir();
        let msg = settings.validate().unwrap_err().to_string();
        assert!(msg.contains("must be a file"));
    }
}
