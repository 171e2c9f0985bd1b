use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A predicted co-change candidate: a file expected to change alongside the
/// query, with the evidence behind the prediction.
///
/// This is the final, human-facing output unit — a mined rule with its
/// consequent resolved back to a repository-relative path.
///
/// # Examples
///
/// ```
/// use ripple_core::Prediction;
///
/// let p = Prediction {
///     path: "src/session.rs".into(),
///     confidence: 0.8,
///     support: 4,
/// };
/// assert!(p.confidence > 0.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Repository-relative path of the predicted file.
    pub path: String,
    /// Estimated probability of co-change, in `[0, 1]`.
    pub confidence: f64,
    /// Number of historical transactions exhibiting the co-change.
    pub support: u64,
}

/// Output format for CLI command results.
///
/// # Examples
///
/// ```
/// use ripple_core::OutputFormat;
///
/// let format: OutputFormat = "json".parse().unwrap();
/// assert_eq!(format, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
