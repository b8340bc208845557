//! Configuration for document generation.

use std::path::PathBuf;
use std::time::Duration;

use crate::layout::{LayoutConfig, PaginationPolicy};

/// Environment variable naming a TrueType font to embed.
pub const ENV_FONT: &str = "WMS_DOCGEN_FONT";
/// Environment variable selecting the pagination policy.
pub const ENV_PAGINATION: &str = "WMS_DOCGEN_PAGINATION";
/// Environment variable with the render deadline in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "WMS_DOCGEN_TIMEOUT_MS";
/// Environment variable toggling stream compression.
pub const ENV_COMPRESS: &str = "WMS_DOCGEN_COMPRESS";

/// Document engine configuration.
///
/// # Fonts
///
/// Without `font_path` all text is set in Base-14 Helvetica with WinAnsi
/// encoding, which only covers Latin-1 plus a few typographic characters.
/// Anything else, Thai product names for instance, prints as `?`. Point
/// `font_path` (or `WMS_DOCGEN_FONT`) at a TrueType font that covers the
/// script, such as Noto Sans Thai, to have it embedded and used for every
/// text run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Table overflow behaviour.
    pub pagination: PaginationPolicy,

    /// Deadline for one render, measured from the start of `generate`.
    pub timeout: Option<Duration>,

    /// Encode label symbols on the rayon pool.
    pub parallel_encoding: bool,

    /// Flate-compress content streams and images.
    pub compress: bool,

    /// TrueType font to embed instead of Base-14 Helvetica. Needed for any
    /// text outside WinAnsi.
    pub font_path: Option<PathBuf>,

    /// Page geometry.
    pub layout: LayoutConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            pagination: PaginationPolicy::Legacy,
            timeout: None,
            parallel_encoding: cfg!(feature = "parallel"),
            compress: true,
            font_path: None,
            layout: LayoutConfig::default(),
        }
    }

    /// Set the pagination policy.
    pub fn with_pagination(mut self, pagination: PaginationPolicy) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the render deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable parallel symbol encoding.
    pub fn with_parallel_encoding(mut self, enable: bool) -> Self {
        self.parallel_encoding = enable;
        self
    }

    /// Enable stream compression.
    pub fn with_compress(mut self, enable: bool) -> Self {
        self.compress = enable;
        self
    }

    /// Embed a TrueType font.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Replace the page geometry.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(path) = lookup(ENV_FONT).filter(|p| !p.trim().is_empty()) {
            config.font_path = Some(PathBuf::from(path.trim()));
        }

        if let Some(value) = lookup(ENV_PAGINATION) {
            match value.parse::<PaginationPolicy>() {
                Ok(policy) => config.pagination = policy,
                Err(e) => log::warn!("Ignoring {}: {}", ENV_PAGINATION, e),
            }
        }

        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            match value.trim().parse::<u64>() {
                Ok(ms) => config.timeout = Some(Duration::from_millis(ms)),
                Err(e) => log::warn!("Ignoring {}={:?}: {}", ENV_TIMEOUT_MS, value, e),
            }
        }

        if let Some(value) = lookup(ENV_COMPRESS) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.compress = true,
                "0" | "false" | "no" | "off" => config.compress = false,
                other => log::warn!("Ignoring {}={:?}: expected a boolean", ENV_COMPRESS, other),
            }
        }

        config
    }
}
