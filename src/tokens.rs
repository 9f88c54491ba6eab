//! Design tokens and CSS custom-property resolution.
//!
//! Chart components receive colours either as literals (`#4e79a7`) or as
//! references into the design system (`var(--chart-1)`). Resolution is
//! delegated to a [`TokenResolver`], so the colour math never needs a live
//! styling context.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use crate::color::{contrast_ratio, Rgb};

/// References nested deeper than this are treated as unresolvable.
pub const MAX_RESOLVE_DEPTH: usize = 8;

/// Source of custom-property values. `name` never carries the leading `--`.
pub trait TokenResolver {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<F> TokenResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl TokenResolver for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(normalize_name(name)).cloned()
    }
}

/// Strip the `--` custom-property prefix if present.
fn normalize_name(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("--").unwrap_or(name)
}

/// Built-in palettes, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Palette {
    /// Muted categorical colours on a light surface (default)
    #[default]
    Classic,
    /// Saturated colours on black, for projectors and low-vision users
    HighContrast,
    /// Greys only, for print
    Monochrome,
}

impl std::str::FromStr for Palette {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "default" => Ok(Palette::Classic),
            "high-contrast" | "highcontrast" | "hc" => Ok(Palette::HighContrast),
            "mono" | "monochrome" => Ok(Palette::Monochrome),
            _ => anyhow::bail!(
                "Unknown palette '{}'. Available: classic, high-contrast, monochrome",
                s
            ),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::Classic => write!(f, "classic"),
            Palette::HighContrast => write!(f, "high-contrast"),
            Palette::Monochrome => write!(f, "monochrome"),
        }
    }
}

impl Palette {
    fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Palette::Classic => &[
                ("chart-1", "#4e79a7"),
                ("chart-2", "#f28e2b"),
                ("chart-3", "#e15759"),
                ("chart-4", "#76b7b2"),
                ("chart-5", "#59a14f"),
                ("chart-6", "#edc948"),
                ("gauge-start", "var(--chart-5)"),
                ("gauge-end", "var(--chart-3)"),
                ("gauge-track", "#e6e8eb"),
                ("surface", "#ffffff"),
                ("text", "#1f2328"),
                ("positive", "#1a7f37"),
                ("negative", "#cf222e"),
            ],
            Palette::HighContrast => &[
                ("chart-1", "#00b4ff"),
                ("chart-2", "#ffb000"),
                ("chart-3", "#ff4d4d"),
                ("chart-4", "#00e0c0"),
                ("chart-5", "#7cff4d"),
                ("chart-6", "#ff66ff"),
                ("gauge-start", "var(--chart-5)"),
                ("gauge-end", "var(--chart-3)"),
                ("gauge-track", "#333333"),
                ("surface", "#000000"),
                ("text", "#ffffff"),
                ("positive", "#7cff4d"),
                ("negative", "#ff4d4d"),
            ],
            Palette::Monochrome => &[
                ("chart-1", "#222222"),
                ("chart-2", "#555555"),
                ("chart-3", "#777777"),
                ("chart-4", "#999999"),
                ("chart-5", "#bbbbbb"),
                ("chart-6", "#dddddd"),
                ("gauge-start", "#dddddd"),
                ("gauge-end", "#222222"),
                ("gauge-track", "#eeeeee"),
                ("surface", "#ffffff"),
                ("text", "#111111"),
                ("positive", "#222222"),
                ("negative", "#555555"),
            ],
        }
    }
}

/// Name -> value table of design tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStore {
    tokens: BTreeMap<String, String>,
}

/// Token file layout; unrelated tables (e.g. `[settings]`) are ignored.
#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    tokens: BTreeMap<String, String>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock chart palette ([`Palette::Classic`]).
    pub fn default_palette() -> Self {
        Self::palette(Palette::Classic)
    }

    pub fn palette(palette: Palette) -> Self {
        palette
            .entries()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.tokens
            .insert(normalize_name(name.as_ref()).to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens.get(normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` into `self`; entries from `other` win.
    pub fn extend(&mut self, other: TokenStore) {
        self.tokens.extend(other.tokens);
    }

    /// Parse the `[tokens]` table of a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: TokenFile = toml::from_str(contents).context("Failed to parse token TOML")?;
        Ok(file.tokens.into_iter().collect())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;
        let store = Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid token file: {}", path.display()))?;
        log::debug!("[tokens] loaded {} tokens from {}", store.len(), path.display());
        Ok(store)
    }

    /// Resolve `name` all the way down to a literal.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let reference = format!("var(--{})", normalize_name(name));
        let resolved = resolve_css_color(&reference, self);
        (resolved != reference).then_some(resolved)
    }

    /// Contrast of the `text` token over `surface`, logged like any audit.
    /// `None` if either token is missing or not a hex colour.
    pub fn audit_text_contrast(&self) -> Option<f64> {
        let fg = crate::color::hex_to_rgb(&self.resolve("text")?).ok()?;
        let bg = crate::color::hex_to_rgb(&self.resolve("surface")?).ok()?;
        Some(audit_contrast(fg, bg, "text/surface"))
    }
}

impl FromIterator<(String, String)> for TokenStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut store = TokenStore::new();
        for (k, v) in iter {
            store.insert(k, v);
        }
        store
    }
}

impl TokenResolver for TokenStore {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }
}

/// A parsed `var(--name[, fallback])` or bare `--name`.
#[derive(Debug, PartialEq, Eq)]
struct Reference<'a> {
    name: &'a str,
    fallback: Option<&'a str>,
}

fn parse_reference(s: &str) -> Option<Reference<'_>> {
    let s = s.trim();
    let is_var = s.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("var("));
    if is_var && s.len() > 4 && s.ends_with(')') {
        let inner = &s[4..s.len() - 1];
        let (name, fallback) = match inner.split_once(',') {
            Some((name, fallback)) => (name, Some(fallback.trim()).filter(|f| !f.is_empty())),
            None => (inner, None),
        };
        let name = name.trim().strip_prefix("--")?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        return Some(Reference { name, fallback });
    }

    let name = s.strip_prefix("--")?;
    if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        return None;
    }
    Some(Reference {
        name,
        fallback: None,
    })
}

fn resolve_inner<R>(value: &str, resolver: &R, depth: usize) -> Option<String>
where
    R: TokenResolver + ?Sized,
{
    let Some(reference) = parse_reference(value) else {
        return Some(value.trim().to_string());
    };
    if depth >= MAX_RESOLVE_DEPTH {
        log::debug!("[tokens] gave up on --{} (cycle or nesting too deep)", reference.name);
        return None;
    }

    resolver
        .lookup(reference.name)
        .and_then(|v| resolve_inner(&v, resolver, depth + 1))
        .or_else(|| {
            reference
                .fallback
                .and_then(|f| resolve_inner(f, resolver, depth + 1))
        })
}

/// Resolve a colour reference to a literal colour string.
///
/// Literals are returned unchanged. An unresolvable reference falls back to
/// its `var()` fallback when one is given, otherwise to the input itself.
pub fn resolve_css_color<R>(color_ref: &str, resolver: &R) -> String
where
    R: TokenResolver + ?Sized,
{
    if parse_reference(color_ref).is_none() {
        return color_ref.to_string();
    }
    match resolve_inner(color_ref, resolver, 0) {
        Some(resolved) => resolved,
        None => {
            log::debug!("[tokens] unresolved reference '{color_ref}', passing through");
            color_ref.to_string()
        }
    }
}

/// A11y audit (non-fatal): log whether `fg` on `bg` meets WCAG AA.
pub fn audit_contrast(fg: Rgb, bg: Rgb, label: &str) -> f64 {
    let ratio = contrast_ratio(fg, bg);
    if ratio < 4.5 {
        log::warn!("[tokens] {} contrast {:.2}:1 below WCAG AA 4.5:1", label, ratio);
    } else {
        log::debug!("[tokens] {} contrast {:.2}:1", label, ratio);
    }
    ratio
}
