use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xfc", author, version, about = "Transformer equivalent-circuit conversion")]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every transformer of a raw-ends document
    Convert(ConvertArgs),
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Raw-ends input document (JSON)
    pub input: PathBuf,

    /// Output file for converted models and regulating controls
    #[arg(short, long)]
    pub output: PathBuf,

    /// Conversion policies (TOML, YAML or JSON); defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Worker threads (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Fail when any transformer fails or any condition is reported
    #[arg(long)]
    pub strict: bool,

    /// Write a run manifest to this path
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the default configuration
    Default {
        #[arg(long, value_enum, default_value_t = ConfigFormatArg::Toml)]
        format: ConfigFormatArg,
    },
    /// Load and validate a configuration file
    Check {
        /// Configuration file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<ConfigFormatArg> for xfc_io::ConfigFormat {
    fn from(value: ConfigFormatArg) -> Self {
        match value {
            ConfigFormatArg::Toml => xfc_io::ConfigFormat::Toml,
            ConfigFormatArg::Json => xfc_io::ConfigFormat::Json,
            ConfigFormatArg::Yaml => xfc_io::ConfigFormat::Yaml,
        }
    }
}
