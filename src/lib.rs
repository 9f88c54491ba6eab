//! chartkit - colour and series utilities for chart components
//!
//! This library provides the pure logic behind the design system's chart
//! widgets (gauge, donut, pie, bar, line and area charts). Rendering lives
//! elsewhere; everything here takes primitives in and hands primitives back.
//!
//! ## Architecture
//!
//! - **color**: hex/RGB conversion, interpolation, gradient ramps, contrast
//! - **tokens**: `var(--name)` resolution through an injected [`tokens::TokenResolver`]
//! - **data**: comma-separated config parsing, clamping, padding, analytics
//! - **chart**: gauge/donut helpers composed from the above
//!
//! ## Usage
//!
//! ```
//! use chartkit::color::{hex_to_rgb, interpolate_color};
//!
//! let start = hex_to_rgb("#000000").unwrap();
//! let end = hex_to_rgb("#ffffff").unwrap();
//! assert_eq!(interpolate_color(start, end, 0.5), "rgb(128, 128, 128)");
//! ```
//!
//! The `cli` feature (on by default) adds the `chartkit` binary:
//! ```bash
//! chartkit gauge 72 0 100 --format json
//! ```

// Core modules (no IO beyond reading token files)
pub mod chart;
pub mod color;
pub mod data;
pub mod error;
pub mod tokens;

// CLI configuration (clap + env + TOML) and subcommand dispatch
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod config;

// Re-export commonly used types
pub use color::{HexColor, Rgb};
pub use data::{Analytics, NumericSeries};
pub use error::ColorError;
pub use tokens::{resolve_css_color, TokenResolver, TokenStore};
