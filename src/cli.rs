//! Subcommand dispatch for the `chartkit` binary.
//!
//! Each [`Command`] produces an [`Output`] holding both renderings; the
//! binary picks one with the configured [`OutputFormat`]. JSON follows
//! `serde_json`, so NaN entries (unparsable CSV tokens) come out as `null`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::chart::{gauge_color, gauge_fill, percent_shares, ChartData};
use crate::color::{channels_to_hex, contrast_ratio, gradient, hex_to_rgb, lerp_rgb, Rgb, MAX_GRADIENT_STEPS};
use crate::config::{validate_in_range, Command, Config, OutputFormat, MAX_PAD_LENGTH, MIN_GRADIENT_STEPS};
use crate::data::{clamp, parse_categories, parse_csv};
use crate::tokens::resolve_css_color;

/// One command result, renderable as plain text or JSON.
#[derive(Debug, Clone)]
pub struct Output {
    plain: String,
    json: Value,
}

impl Output {
    fn new<T: Serialize>(plain: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self {
            plain: plain.into(),
            json: serde_json::to_value(value).context("Failed to serialize output")?,
        })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Plain => Ok(self.plain.clone()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&self.json).context("Failed to render JSON")
            }
        }
    }
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Hex literal or token reference -> RGB.
fn color_arg(cfg: &Config, s: &str) -> Result<Rgb> {
    let resolved = resolve_css_color(s, &cfg.tokens);
    hex_to_rgb(&resolved).with_context(|| format!("'{s}' is not a hex colour (resolved to '{resolved}')"))
}

/// Execute one subcommand against the effective configuration.
pub fn run(cfg: &Config, command: Command) -> Result<Output> {
    match command {
        Command::HexToRgb { hex } => {
            let rgb = hex_to_rgb(&hex).with_context(|| format!("Cannot parse '{hex}'"))?;
            Output::new(rgb.to_css(), &rgb)
        }
        Command::RgbToHex { r, g, b } => {
            let hex = channels_to_hex(r, g, b);
            Output::new(hex.to_string(), &hex)
        }
        Command::Interpolate { from, to, factor } => {
            let blended = lerp_rgb(color_arg(cfg, &from)?, color_arg(cfg, &to)?, factor);
            Output::new(
                blended.to_css(),
                &json!({ "css": blended.to_css(), "hex": blended.to_hex() }),
            )
        }
        Command::Gradient { from, to, steps } => {
            let steps = match steps {
                Some(n) => validate_in_range(n, MIN_GRADIENT_STEPS, MAX_GRADIENT_STEPS, "--steps")?,
                None => cfg.gradient_steps,
            };
            let ramp: Vec<_> = gradient(color_arg(cfg, &from)?, color_arg(cfg, &to)?, steps)
                .into_iter()
                .map(Rgb::to_hex)
                .collect();
            let plain = ramp.iter().map(|h| h.to_string()).collect::<Vec<_>>().join("\n");
            Output::new(plain, &ramp)
        }
        Command::Resolve { color_ref } => {
            let resolved = resolve_css_color(&color_ref, &cfg.tokens);
            Output::new(resolved.clone(), &resolved)
        }
        Command::Tokens => {
            cfg.tokens.audit_text_contrast();
            let resolved: BTreeMap<&str, String> = cfg
                .tokens
                .iter()
                .map(|(name, raw)| (name, cfg.tokens.resolve(name).unwrap_or_else(|| raw.to_string())))
                .collect();
            let plain = resolved
                .iter()
                .map(|(name, value)| format!("--{name}: {value}"))
                .collect::<Vec<_>>()
                .join("\n");
            Output::new(plain, &resolved)
        }
        Command::Contrast { fg, bg } => {
            let ratio = contrast_ratio(color_arg(cfg, &fg)?, color_arg(cfg, &bg)?);
            Output::new(
                format!("{ratio:.2}:1"),
                &json!({ "ratio": ratio, "aa": ratio >= 4.5, "aaa": ratio >= 7.0 }),
            )
        }
        Command::ParseCsv { input } => {
            let series = parse_csv(&input);
            Output::new(join(&series), &series)
        }
        Command::Categories { input } => {
            let labels = parse_categories(&input);
            Output::new(labels.join("\n"), &labels)
        }
        Command::Clamp { value, min, max } => {
            let clamped = clamp(value, min, max);
            Output::new(clamped.to_string(), &clamped)
        }
        Command::Pad {
            input,
            length,
            value,
        } => {
            let length = validate_in_range(length, 0, MAX_PAD_LENGTH, "length")?;
            let padded = parse_csv(&input).padded(length, value.unwrap_or(cfg.pad_value));
            Output::new(join(&padded), &padded)
        }
        Command::Analytics {
            labels,
            series_a,
            series_b,
        } => {
            let data = ChartData::from_config(&labels, &series_a, &series_b);
            let plain = data
                .labels
                .iter()
                .zip(data.analytics.trend.iter().zip(&data.analytics.volatility))
                .map(|(label, (t, v))| format!("{label}\t{t}\t{v}"))
                .collect::<Vec<_>>()
                .join("\n");
            Output::new(plain, &data)
        }
        Command::Gauge {
            value,
            min,
            max,
            start,
            end,
        } => {
            let color = gauge_color(value, min, max, &start, &end, &cfg.tokens)
                .context("Gauge endpoints must resolve to hex colours")?;
            let fill = gauge_fill(value, min, max);
            Output::new(color.clone(), &json!({ "fill": fill, "color": color }))
        }
        Command::Shares { input } => {
            let shares = percent_shares(&parse_csv(&input));
            Output::new(join(&shares), &shares)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{Palette, TokenStore};

    fn config() -> Config {
        Config {
            format: OutputFormat::Plain,
            palette: Palette::Classic,
            tokens_file: None,
            gradient_steps: 5,
            pad_value: 0.0,
            tokens: TokenStore::palette(Palette::Classic),
        }
    }

    fn both(command: Command) -> (String, Value) {
        let out = run(&config(), command).unwrap();
        let json: Value = serde_json::from_str(&out.render(OutputFormat::Json).unwrap()).unwrap();
        (out.render(OutputFormat::Plain).unwrap(), json)
    }

    fn gauge(value: f64, start: &str) -> Command {
        Command::Gauge {
            value,
            min: 0.0,
            max: 100.0,
            start: start.to_string(),
            end: "var(--gauge-end)".to_string(),
        }
    }

    #[test]
    fn test_gauge_output() {
        // gauge-start -> chart-5 #59a14f, gauge-end -> chart-3 #e15759
        let (plain, json) = both(gauge(50.0, "var(--gauge-start)"));
        assert_eq!(plain, "rgb(157, 124, 84)");
        assert_eq!(json, json!({ "fill": 0.5, "color": "rgb(157, 124, 84)" }));

        let (plain, _) = both(gauge(150.0, "var(--gauge-start)"));
        assert_eq!(plain, "rgb(225, 87, 89)", "overfull gauge stays on the end colour");
    }

    #[test]
    fn test_gauge_unresolvable_endpoint_is_an_error() {
        let err = run(&config(), gauge(50.0, "var(--missing)")).unwrap_err();
        assert!(format!("{err:#}").contains("Gauge endpoints"));
    }

    #[test]
    fn test_tokens_listing() {
        let (plain, json) = both(Command::Tokens);
        assert!(plain.lines().any(|l| l == "--chart-1: #4e79a7"));
        assert!(plain.lines().any(|l| l == "--gauge-start: #59a14f"), "references are resolved");
        assert_eq!(json["gauge-end"], "#e15759");
        assert_eq!(json["surface"], "#ffffff");
    }

    #[test]
    fn test_interpolate_output() {
        let (plain, json) = both(Command::Interpolate {
            from: "#000".to_string(),
            to: "#fff".to_string(),
            factor: 0.5,
        });
        assert_eq!(plain, "rgb(128, 128, 128)");
        assert_eq!(json, json!({ "css": "rgb(128, 128, 128)", "hex": "#808080" }));
    }

    #[test]
    fn test_interpolate_resolves_tokens() {
        let (plain, _) = both(Command::Interpolate {
            from: "var(--chart-1)".to_string(),
            to: "--chart-1".to_string(),
            factor: 0.3,
        });
        assert_eq!(plain, "rgb(78, 121, 167)");
    }

    #[test]
    fn test_unresolvable_colour_argument() {
        let err = run(
            &config(),
            Command::Interpolate {
                from: "var(--nope)".to_string(),
                to: "#fff".to_string(),
                factor: 0.5,
            },
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'var(--nope)' is not a hex colour"), "got: {msg}");
    }

    #[test]
    fn test_analytics_output() {
        let (plain, json) = both(Command::Analytics {
            labels: "a, b".to_string(),
            series_a: "10,20".to_string(),
            series_b: "5,25".to_string(),
        });
        assert_eq!(plain, "a\t5\t5\nb\t-5\t5");
        assert_eq!(json["labels"], json!(["a", "b"]));
        assert_eq!(json["analytics"]["trend"], json!([5.0, -5.0]));
        assert_eq!(json["analytics"]["volatility"], json!([5.0, 5.0]));
    }

    #[test]
    fn test_gradient_output() {
        let command = |steps| Command::Gradient {
            from: "#000".to_string(),
            to: "#fff".to_string(),
            steps,
        };
        let (plain, json) = both(command(Some(3)));
        assert_eq!(plain, "#000000\n#808080\n#ffffff");
        assert_eq!(json, json!(["#000000", "#808080", "#ffffff"]));

        let (plain, _) = both(command(None));
        assert_eq!(plain.lines().count(), 5, "falls back to the configured steps");
    }

    #[test]
    fn test_gradient_steps_out_of_range() {
        for steps in [0, 1, MAX_GRADIENT_STEPS + 1, usize::MAX] {
            let err = run(
                &config(),
                Command::Gradient {
                    from: "#000".to_string(),
                    to: "#fff".to_string(),
                    steps: Some(steps),
                },
            )
            .unwrap_err();
            assert!(err.to_string().contains("--steps"), "steps={steps}: {err}");
        }
    }

    #[test]
    fn test_pad_length_bounded() {
        let pad = |length| Command::Pad {
            input: "1".to_string(),
            length,
            value: None,
        };
        let err = run(&config(), pad(usize::MAX)).unwrap_err();
        assert!(err.to_string().contains("length"));
        assert!(run(&config(), pad(MAX_PAD_LENGTH + 1)).is_err());

        let (plain, _) = both(pad(3));
        assert_eq!(plain, "1, 0, 0");
    }

    #[test]
    fn test_nan_entries_render_as_null_in_json() {
        let (plain, json) = both(Command::ParseCsv {
            input: "1,x".to_string(),
        });
        assert_eq!(plain, "1, NaN");
        assert_eq!(json, json!([1.0, null]));

        let (_, json) = both(Command::Pad {
            input: "x".to_string(),
            length: 2,
            value: Some(9.0),
        });
        assert_eq!(json, json!([null, 9.0]));
    }
}
