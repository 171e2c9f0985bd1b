use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RippleError;

/// Top-level configuration loaded from `.ripple.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use ripple_core::RippleConfig;
///
/// let config = RippleConfig::default();
/// assert_eq!(config.history.max_commits, 200);
/// assert_eq!(config.mining.min_support, 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RippleConfig {
    /// History traversal settings.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Rule-mining thresholds.
    #[serde(default)]
    pub mining: MiningConfig,
}

impl RippleConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::Io`] if the file cannot be read, or
    /// [`RippleError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ripple_core::RippleConfig;
    /// use std::path::Path;
    ///
    /// let config = RippleConfig::from_file(Path::new(".ripple.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, RippleError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`RippleError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ripple_core::RippleConfig;
    ///
    /// let toml = r#"
    /// [mining]
    /// min_support = 5
    /// "#;
    /// let config = RippleConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.mining.min_support, 5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, RippleError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Git history traversal settings.
///
/// # Examples
///
/// ```
/// use ripple_core::HistoryConfig;
///
/// let config = HistoryConfig::default();
/// assert_eq!(config.max_changed_files, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of transactions to mine before stopping (0 = unlimited).
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,
    /// Transactions touching more files than this are discarded as noise
    /// (bulk reformats, vendored imports).
    #[serde(default = "default_max_changed_files")]
    pub max_changed_files: usize,
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
}

fn default_max_commits() -> usize {
    200
}

fn default_max_changed_files() -> usize {
    30
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_commits: default_max_commits(),
            max_changed_files: default_max_changed_files(),
            branch: None,
        }
    }
}

/// Association-rule mining thresholds.
///
/// # Examples
///
/// ```
/// use ripple_core::MiningConfig;
///
/// let config = MiningConfig::default();
/// assert!((config.min_confidence - 0.7).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Minimum confidence (estimated co-change probability) in `[0, 1]`.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Minimum support (number of historical co-occurrences).
    #[serde(default = "default_min_support")]
    pub min_support: u64,
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_min_support() -> u64 {
    3
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            min_support: default_min_support(),
        }
    }
}
