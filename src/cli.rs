use anyhow::{Context, Result};
use chrono::{DateTime, Local, Offset, Utc};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{Config, OutputFormat};
use crate::error::ReportError;
use crate::output::{export_report, print_summary, report_filename, PhaseProgress};
use crate::providers::AzureDevOpsProvider;
use crate::report::{assemble, ReportContext};

#[derive(Parser)]
#[command(name = "ado-report")]
#[command(author, version, about = "Azure DevOps Builds Report", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Azure DevOps organization
    #[arg(long, env = "ADO_ORGANIZATION")]
    organization: Option<String>,

    /// Project within the organization
    #[arg(short = 'P', long, env = "ADO_PROJECT")]
    project: Option<String>,

    /// Personal access token with Build (Read) scope
    #[arg(short, long, env = "ADO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long)]
    base_url: Option<String>,

    /// Report builds finished within this many hours
    #[arg(long)]
    hours: Option<u32>,

    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file, defaults to `ADO_Builds_Report_<date>.<ext>`
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// Show timestamps in UTC instead of local time
    #[arg(long, default_value_t = false)]
    utc: bool,

    /// Leave the date out of the default file name
    #[arg(long, default_value_t = false)]
    undated: bool,
}

/// Settings of one run after merging the config file with the flags.
#[derive(Debug)]
struct RunSettings {
    organization: String,
    project: String,
    token: Option<Token>,
    base_url: String,
    window_hours: u32,
    format: OutputFormat,
    pretty: bool,
    utc: bool,
    undated: bool,
}

impl Cli {
    fn settings(&self, config: Config) -> Result<RunSettings> {
        let Config { azure, output } = config;

        let organization = self.organization.clone().or(azure.organization).ok_or_else(|| {
            ReportError::Config(
                "organization is required (--organization, ADO_ORGANIZATION or config file)"
                    .to_string(),
            )
        })?;
        let project = self.project.clone().or(azure.project).ok_or_else(|| {
            ReportError::Config(
                "project is required (--project, ADO_PROJECT or config file)".to_string(),
            )
        })?;
        let window_hours = self.hours.unwrap_or(azure.window_hours);
        if window_hours == 0 {
            return Err(ReportError::Config("--hours must be at least 1".to_string()).into());
        }

        Ok(RunSettings {
            organization,
            project,
            token: self
                .token
                .clone()
                .or(azure.token)
                .map(|t| Token::from(t.as_str())),
            base_url: self.base_url.clone().unwrap_or(azure.base_url),
            window_hours,
            format: self.format.unwrap_or(output.format),
            pretty: self.pretty || output.pretty,
            utc: self.utc || output.utc,
            undated: self.undated || output.undated,
        })
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let settings = self.settings(config)?;

        if settings.token.is_none() {
            warn!("No personal access token given; only public projects can be read");
        }

        let provider = AzureDevOpsProvider::new(
            &settings.base_url,
            settings.organization.clone(),
            settings.project.clone(),
            settings.token.clone(),
        )?;

        let now = Utc::now();
        let progress = PhaseProgress::start_phase_1(settings.window_hours);
        let builds = match provider.fetch_recent_builds(settings.window_hours, now).await {
            Ok(builds) => builds,
            Err(e) => {
                progress.abandon();
                return Err(e).with_context(|| {
                    format!(
                        "Failed to fetch builds for {}/{}",
                        settings.organization, settings.project
                    )
                });
            }
        };
        if builds.is_empty() {
            warn!(
                "No builds finished in the last {} hours",
                settings.window_hours
            );
        }

        let progress = progress.finish_phase_1_start_phase_2(builds.len());
        let offset = if settings.utc {
            Utc.fix()
        } else {
            Local::now().offset().fix()
        };
        let ctx = ReportContext {
            generated_at: now,
            window_hours: settings.window_hours,
            offset,
        };
        let sections = assemble(&builds, &ctx);

        let progress = progress.finish_phase_2_start_phase_3(sections.len());
        let path = self
            .output
            .clone()
            .or_else(|| default_report_path(settings.format, settings.undated, now));

        match path {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                export_report(&sections, settings.format, settings.pretty, &mut writer)?;
                writer.flush()?;
                progress.finish_phase_3();
                info!("Report written to: {}", path.display());
            }
            None => {
                progress.finish_phase_3();
                print_summary(&sections);
            }
        }

        Ok(())
    }
}

/// File the report goes to when no `--output` is given. The date is the UTC
/// calendar date of `now`, whatever offset timestamps are displayed in.
fn default_report_path(
    format: OutputFormat,
    undated: bool,
    now: DateTime<Utc>,
) -> Option<PathBuf> {
    let date = (!undated).then(|| now.date_naive());
    report_filename(format, date).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AzureConfig, OutputConfig};
    use chrono::TimeZone;
    use std::path::Path;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ado-report").chain(args.iter().copied())).unwrap()
    }

    fn file_config() -> Config {
        Config {
            azure: AzureConfig {
                organization: Some("contoso".to_string()),
                project: Some("web".to_string()),
                token: Some("pat-from-file".to_string()),
                window_hours: 48,
                ..AzureConfig::default()
            },
            output: OutputConfig {
                format: OutputFormat::Html,
                ..OutputConfig::default()
            },
        }
    }

    #[test]
    fn test_file_values_fill_missing_flags() {
        let cli = parse(&["--organization", "fabrikam"]);
        let settings = cli.settings(file_config()).unwrap();

        assert_eq!(settings.organization, "fabrikam");
        assert_eq!(settings.project, "web");
        assert_eq!(settings.window_hours, 48);
        assert_eq!(settings.format, OutputFormat::Html);
        assert_eq!(settings.base_url, "https://dev.azure.com");
        assert_eq!(settings.token.as_ref().map(Token::as_str), Some("pat-from-file"));
    }

    #[test]
    fn test_flags_override_file_values() {
        let cli = parse(&["--hours", "6", "--format", "json", "--utc", "--undated"]);
        let settings = cli.settings(file_config()).unwrap();

        assert_eq!(settings.window_hours, 6);
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.utc);
        assert!(settings.undated);
    }

    #[test]
    fn test_missing_organization_is_a_config_error() {
        if std::env::var_os("ADO_ORGANIZATION").is_some() {
            return;
        }
        let cli = parse(&["--project", "web"]);

        let err = cli.settings(Config::default()).unwrap_err();
        assert!(err.to_string().contains("organization is required"));
    }

    #[test]
    fn test_zero_hour_window_is_rejected() {
        let cli = parse(&["--hours", "0"]);
        assert!(cli.settings(file_config()).is_err());
    }

    #[test]
    fn test_default_report_path_uses_utc_date() {
        // 8 PM on March 1st in UTC-5
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();

        let path = default_report_path(OutputFormat::Pdf, false, now).unwrap();
        assert_eq!(path, Path::new("ADO_Builds_Report_2024-03-02.pdf"));
    }

    #[test]
    fn test_default_report_path_undated_and_terminal() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();

        assert_eq!(
            default_report_path(OutputFormat::Html, true, now).unwrap(),
            Path::new("ADO_Builds_Report.html")
        );
        assert_eq!(default_report_path(OutputFormat::Summary, false, now), None);
    }
}
