use clap::{ArgAction, Parser, ValueEnum};
use daon_client::{License, Mode};
use daon_config::Config;
use daon_import::SourceKind;
use std::path::{Path, PathBuf};

/// Protect existing creative works in bulk with the DAON registry.
#[derive(Debug, Parser)]
#[command(name = "daon-bulk", version, after_help = EXAMPLES)]
pub struct Args {
    /// Export file (.json, .xml), URL list (.txt), text file, or directory of text files.
    #[arg(value_name = "SOURCE", required_unless_present = "source_flag", conflicts_with = "source_flag")]
    pub source: Option<PathBuf>,
    #[arg(long = "source", id = "source_flag", value_name = "SOURCE", hide_short_help = true)]
    pub source_flag: Option<PathBuf>,
    /// License to register the works under [default: from configuration, else liberation_v1]
    #[arg(long, value_enum)]
    pub license: Option<LicenseArg>,
    /// Registry API base URL.
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
    /// Compute hashes and simulate submission without contacting the registry.
    #[arg(long)]
    pub dry_run: bool,
    /// Skip source detection and parse the source as this kind.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Do not ask for confirmation before a live run.
    #[arg(short, long)]
    pub yes: bool,
    /// Additional configuration file (TOML, YAML or JSON).
    #[arg(long, value_name = "FILE", env = "DAON_CONFIG_FILE")]
    pub config: Option<PathBuf>,
    /// Minimum content length, in characters, for a work to be kept.
    #[arg(long, value_name = "CHARS")]
    pub min_length: Option<usize>,
    /// Do not write a results file.
    #[arg(long)]
    pub no_results: bool,
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

const EXAMPLES: &str = "Examples:
  daon-bulk my_ao3_export.json
  daon-bulk wordpress_export.xml --license cc_by_nc
  daon-bulk fanfics/ --dry-run
  daon-bulk urls.txt --api-url http://localhost:1317";

impl Args {
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref().or(self.source_flag.as_deref())
    }

    pub fn mode(&self) -> Mode {
        if self.dry_run { Mode::DryRun } else { Mode::Live }
    }

    /// Command-line values win over every configuration layer.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api.url = url.trim_end_matches('/').to_string();
        }
        if let Some(license) = self.license {
            config.license = license.into();
        }
        if let Some(min) = self.min_length {
            config.import.min_content_chars = min;
        }
        if self.no_results {
            config.results.enabled = false;
        }
    }
}

/// Licenses offered on the command line. Any other license can still be set
/// through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LicenseArg {
    #[value(name = "liberation_v1")]
    LiberationV1,
    #[value(name = "cc_by_nc")]
    CcByNc,
    #[value(name = "cc_by_nc_sa")]
    CcByNcSa,
    #[value(name = "all_rights_reserved")]
    AllRightsReserved,
}

impl From<LicenseArg> for License {
    fn from(arg: LicenseArg) -> Self {
        match arg {
            LicenseArg::LiberationV1 => License::LiberationV1,
            LicenseArg::CcByNc => License::CcByNc,
            LicenseArg::CcByNcSa => License::CcByNcSa,
            LicenseArg::AllRightsReserved => License::AllRightsReserved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JSON export of work records.
    Export,
    /// WordPress WXR export.
    Feed,
    /// Text file with one page URL per line.
    Urls,
    /// Directory of text files.
    Directory,
    /// A single text file.
    Text,
}

impl From<FormatArg> for SourceKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Export => SourceKind::StructuredExport,
            FormatArg::Feed => SourceKind::Syndication,
            FormatArg::Urls => SourceKind::UrlList,
            FormatArg::Directory => SourceKind::Directory,
            FormatArg::Text => SourceKind::TextFile,
        }
    }
}
