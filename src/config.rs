use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_CANDIDATES: [&str; 4] = [
    "ado-report.toml",
    "ado-report.json",
    "ado-report.yaml",
    "ado-report.yml",
];

/// Configuration file structure for ado-report.
///
/// Lets users keep their organization, project and output preferences out of
/// the command line. Command-line flags take precedence over file values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureConfig {
    /// Azure DevOps organization name
    pub organization: Option<String>,

    /// Project within the organization
    pub project: Option<String>,

    /// Personal access token with Build (Read) scope
    pub token: Option<String>,

    /// Azure DevOps base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Only builds finished within this many hours are reported
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,

    /// Show timestamps in UTC instead of local time
    #[serde(default)]
    pub utc: bool,

    /// Write `ADO_Builds_Report.<ext>` instead of a dated file name
    #[serde(default)]
    pub undated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Html,
    Json,
    Summary,
}

impl OutputFormat {
    /// File extension of the written report, `None` for terminal-only output.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Pdf => Some("pdf"),
            Self::Html => Some("html"),
            Self::Json => Some("json"),
            Self::Summary => None,
        }
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            organization: None,
            project: None,
            token: None,
            base_url: default_base_url(),
            window_hours: default_window_hours(),
        }
    }
}

fn default_base_url() -> String {
    "https://dev.azure.com".to_string()
}

fn default_window_hours() -> u32 {
    24
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. `./ado-report.{toml,json,yaml,yml}`
    /// 3. `<user config dir>/ado-report/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let found = discover(Path::new(".")).or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join("ado-report").join("config.toml"))
                .filter(|p| p.exists())
        });

        match found {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load_from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

/// First config candidate present in `dir`.
fn discover(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}
