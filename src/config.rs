// Output and palette configuration for the chartkit CLI
// Priority: CLI args > Environment variables > Config file > Defaults

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::MAX_GRADIENT_STEPS;
use crate::tokens::{Palette, TokenStore};

/// Smallest useful ramp: both endpoints.
pub const MIN_GRADIENT_STEPS: usize = 2;

/// Upper bound on the `pad` target length.
pub const MAX_PAD_LENGTH: usize = 65_536;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Invalid format '{s}'. Valid options: plain, json")),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// chartkit - colour and series utilities for chart components
///
/// Configuration priority: CLI args > Environment variables > Config file > Defaults
#[derive(Parser, Debug)]
#[command(name = "chartkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Colour interpolation, token resolution and series transforms", long_about = None)]
pub struct CliArgs {
    /// Output format: plain or json
    #[arg(short, long, global = true, env = "CHARTKIT_FORMAT", value_parser = clap::value_parser!(OutputFormat))]
    pub format: Option<OutputFormat>,

    /// Base palette: classic, high-contrast, monochrome
    #[arg(short, long, global = true, env = "CHARTKIT_PALETTE", value_parser = clap::value_parser!(Palette))]
    pub palette: Option<Palette>,

    /// TOML file with [tokens] overrides and optional [settings]
    #[arg(short, long, global = true, env = "CHARTKIT_TOKENS_FILE")]
    pub tokens: Option<PathBuf>,

    /// Default number of gradient steps (2-256)
    #[arg(long, global = true, env = "CHARTKIT_GRADIENT_STEPS")]
    pub gradient_steps: Option<usize>,

    /// Default fill value for `pad`
    #[arg(long, global = true, env = "CHARTKIT_PAD_VALUE", allow_negative_numbers = true)]
    pub pad_value: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Parse a hex colour (#rrggbb or #rgb) into RGB channels
    HexToRgb { hex: String },

    /// Format RGB channels as #rrggbb (out-of-range channels are clamped)
    #[command(allow_negative_numbers = true)]
    RgbToHex { r: i64, g: i64, b: i64 },

    /// Blend two colours (hex or token references) by a factor in 0..1
    #[command(allow_negative_numbers = true)]
    Interpolate {
        from: String,
        to: String,
        factor: f64,
    },

    /// Evenly spaced ramp between two colours
    Gradient {
        from: String,
        to: String,
        /// Number of stops, 2-256 (defaults to the configured gradient steps)
        #[arg(long)]
        steps: Option<usize>,
    },

    /// Resolve a colour reference such as var(--chart-1)
    Resolve { color_ref: String },

    /// List every token resolved against the active palette
    Tokens,

    /// WCAG contrast ratio between two colours
    Contrast { fg: String, bg: String },

    /// Parse a comma-separated list of numbers
    ///
    /// Unparsable entries print as NaN, or as null with --format json.
    ParseCsv { input: String },

    /// Parse a comma-separated list of category labels
    Categories { input: String },

    /// Clamp a value into [min, max]
    #[command(allow_negative_numbers = true)]
    Clamp { value: f64, min: f64, max: f64 },

    /// Pad a numeric list to a minimum length
    ///
    /// Unparsable entries print as NaN, or as null with --format json.
    Pad {
        input: String,
        /// Target length (at most 65536)
        length: usize,
        /// Fill value (defaults to the configured pad value)
        #[arg(long, allow_negative_numbers = true)]
        value: Option<f64>,
    },

    /// Trend and volatility of two series aligned to labels
    Analytics {
        labels: String,
        series_a: String,
        series_b: String,
    },

    /// Gauge colour for a value inside [min, max]
    #[command(allow_negative_numbers = true)]
    Gauge {
        value: f64,
        min: f64,
        max: f64,
        #[arg(long, default_value = "var(--gauge-start)")]
        start: String,
        #[arg(long, default_value = "var(--gauge-end)")]
        end: String,
    },

    /// Pie/donut slice percentages
    Shares { input: String },
}

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub format: Option<String>,
    pub palette: Option<String>,
    pub gradient_steps: Option<usize>,
    pub pad_value: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub format: OutputFormat,
    pub palette: Palette,
    pub tokens_file: Option<PathBuf>,
    pub gradient_steps: usize,
    pub pad_value: f64,
    /// Palette tokens with file overrides applied
    pub tokens: TokenStore,
}

/// Validate that a value is within a given range (inclusive)
pub(crate) fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Config file > Defaults
pub fn load() -> Result<(Config, Command)> {
    let args = CliArgs::parse();
    let command = args.command.clone();
    Ok((Config::from_args(args)?, command))
}

impl Config {
    /// Build from already-parsed arguments (CLI and env merged by clap).
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let (file, file_tokens) = match args.tokens {
            Some(ref path) => {
                log::info!("[config] loading {}", path.display());
                Self::load_from_file(path)?
            }
            None => (ConfigFile::default(), TokenStore::new()),
        };
        let settings = file.settings;

        let format = match args.format {
            Some(f) => f,
            None => settings
                .format
                .as_deref()
                .map(str::parse::<OutputFormat>)
                .transpose()
                .context("Invalid [settings].format")?
                .unwrap_or_default(),
        };

        let palette = match args.palette {
            Some(p) => p,
            None => settings
                .palette
                .as_deref()
                .map(str::parse::<Palette>)
                .transpose()
                .context("Invalid [settings].palette")?
                .unwrap_or_default(),
        };

        let gradient_steps = args
            .gradient_steps
            .or(settings.gradient_steps)
            .unwrap_or(5);
        let gradient_steps = validate_in_range(
            gradient_steps,
            MIN_GRADIENT_STEPS,
            MAX_GRADIENT_STEPS,
            "CHARTKIT_GRADIENT_STEPS",
        )?;

        let pad_value = args.pad_value.or(settings.pad_value).unwrap_or(0.0);
        if !pad_value.is_finite() {
            return Err(anyhow!("CHARTKIT_PAD_VALUE must be finite, got {pad_value}"));
        }

        let mut tokens = TokenStore::palette(palette);
        tokens.extend(file_tokens);

        Ok(Config {
            format,
            palette,
            tokens_file: args.tokens,
            gradient_steps,
            pad_value,
            tokens,
        })
    }

    /// Load settings and tokens from one TOML file
    fn load_from_file(path: &Path) -> Result<(ConfigFile, TokenStore)> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;
        let tokens = TokenStore::from_toml_str(&contents)
            .with_context(|| format!("Invalid [tokens] in {}", path.display()))?;
        Ok((file, tokens))
    }

    /// Log the effective configuration (visible with RUST_LOG=info)
    pub fn print_summary(&self) {
        log::info!("chartkit configuration:");
        log::info!("  format: {}", self.format);
        log::info!("  palette: {}", self.palette);
        if let Some(ref path) = self.tokens_file {
            log::info!("  tokens file: {}", path.display());
        }
        log::info!("  tokens: {}", self.tokens.len());
        log::info!("  gradient steps: {}", self.gradient_steps);
        log::info!("  pad value: {}", self.pad_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_KEYS: [&str; 5] = [
        "CHARTKIT_FORMAT",
        "CHARTKIT_PALETTE",
        "CHARTKIT_TOKENS_FILE",
        "CHARTKIT_GRADIENT_STEPS",
        "CHARTKIT_PAD_VALUE",
    ];

    /// Parse as the binary would, minus any CHARTKIT_* values exported in the
    /// shell running the tests (clap reads them as fallbacks).
    fn parse(args: &[&str]) -> CliArgs {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        CliArgs::try_parse_from(std::iter::once("chartkit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("PLAIN".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_validate_in_range() {
        assert_eq!(validate_in_range(5, 2, 256, "X").unwrap(), 5);
        assert!(validate_in_range(1, 2, 256, "X").is_err());
    }

    #[test]
    fn test_subcommand_with_negative_numbers() {
        let args = parse(&["rgb-to-hex", "300", "-5", "128"]);
        assert_eq!(args.command, Command::RgbToHex { r: 300, g: -5, b: 128 });

        let args = parse(&["clamp", "-1", "0", "10"]);
        assert_eq!(
            args.command,
            Command::Clamp {
                value: -1.0,
                min: 0.0,
                max: 10.0
            }
        );
    }

    #[test]
    fn test_cli_overrides_file_settings() {
        let dir = std::env::temp_dir().join(format!("chartkit-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tokens.toml");
        std::fs::write(
            &path,
            r##"
            [settings]
            format = "json"
            palette = "monochrome"
            gradient_steps = 9

            [tokens]
            brand = "#ff0000"
            "##,
        )
        .unwrap();
        let path_str = path.to_str().unwrap();

        let cfg = Config::from_args(parse(&["--tokens", path_str, "tokens"])).unwrap();
        assert_eq!(cfg.format, OutputFormat::Json);
        assert_eq!(cfg.palette, Palette::Monochrome);
        assert_eq!(cfg.gradient_steps, 9);
        assert_eq!(cfg.tokens.get("brand"), Some("#ff0000"));
        assert_eq!(cfg.tokens.get("chart-1"), Some("#222222"));

        let cfg = Config::from_args(parse(&[
            "--tokens",
            path_str,
            "--format",
            "plain",
            "--gradient-steps",
            "3",
            "tokens",
        ]))
        .unwrap();
        assert_eq!(cfg.format, OutputFormat::Plain);
        assert_eq!(cfg.gradient_steps, 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_out_of_range_steps_rejected() {
        let err = Config::from_args(parse(&["--gradient-steps", "1", "tokens"])).unwrap_err();
        assert!(err.to_string().contains("CHARTKIT_GRADIENT_STEPS"));
    }

    #[test]
    fn test_exported_env_does_not_leak_into_parse() {
        // No other test here asserts the pad value, so setting it cannot race them
        std::env::set_var("CHARTKIT_PAD_VALUE", "7");
        let cfg = Config::from_args(parse(&["tokens"])).unwrap();
        assert_eq!(cfg.pad_value, 0.0);
    }
}
