//! Tool implementations for the Ripple MCP server.
//!
//! One tool is exposed: `impact_analysis`. It runs the full mining pipeline
//! over a fresh history snapshot per call and returns JSON via
//! `CallToolResult`.

use std::path::{Path, PathBuf};

use ripple_core::{Prediction, RippleConfig};
use ripple_gitlog::{GitHistory, HistoryOptions};
use ripple_rules::{AssociationRuleExtractor, Pipeline};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

/// MCP server exposing the impact-analysis tool.
///
/// # Examples
///
/// ```
/// use ripple_mcp::tools::RippleServer;
/// use std::path::PathBuf;
///
/// let server = RippleServer::new(PathBuf::from("."), ripple_core::RippleConfig::default());
/// ```
#[derive(Clone)]
pub struct RippleServer {
    pub(crate) repo_path: PathBuf,
    pub(crate) config: RippleConfig,
    pub(crate) tool_router: ToolRouter<Self>,
}

/// Parameters for the `impact_analysis` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImpactAnalysisParams {
    /// Files already modified in the working change, relative to the
    /// repository root.
    pub files: Vec<String>,
    /// Minimum confidence — estimated co-change probability, 0.0 to 1.0
    /// (default: configured threshold, 0.7 out of the box).
    pub min_confidence: Option<f64>,
    /// Minimum support — number of historical co-occurrences
    /// (default: configured threshold, 3 out of the box).
    pub min_support: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImpactAnalysisResponse {
    predictions: Vec<Prediction>,
    summary: String,
}

fn mcp_err(msg: impl Into<String>) -> McpError {
    McpError::internal_error(msg.into(), None)
}

/// Run one impact-analysis query against the repository at `repo_path`.
///
/// Shared by the tool handler and its tests; thresholds are already
/// range-checked by the caller.
pub(crate) fn analyze(
    repo_path: &Path,
    config: &RippleConfig,
    files: &[String],
    min_confidence: f64,
    min_support: u64,
) -> ripple_core::Result<Vec<Prediction>> {
    let source = GitHistory::new(
        repo_path,
        HistoryOptions {
            max_commits: config.history.max_commits,
            branch: config.history.branch.clone(),
        },
    );
    let pipeline = Pipeline::standard(
        config.history.max_changed_files,
        AssociationRuleExtractor::new(min_confidence, min_support),
    );
    pipeline.execute(&source, files)
}

#[tool_router]
impl RippleServer {
    /// Create a new server for the repository at `repo_path`.
    pub fn new(repo_path: PathBuf, config: RippleConfig) -> Self {
        Self {
            repo_path,
            config,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "impact_analysis",
        description = "Suggest files that are likely to change together with the files already modified in the current change, based on co-change patterns mined from git history. Use this before editing to find files that usually move together, or after editing to check for forgotten ripple effects."
    )]
    pub fn impact_analysis(
        &self,
        Parameters(params): Parameters<ImpactAnalysisParams>,
    ) -> Result<CallToolResult, McpError> {
        let min_confidence = params
            .min_confidence
            .unwrap_or(self.config.mining.min_confidence);
        let min_support = params.min_support.unwrap_or(self.config.mining.min_support);

        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(McpError::invalid_params(
                format!("min_confidence must be within [0, 1], got {min_confidence}"),
                None,
            ));
        }

        let predictions = analyze(
            &self.repo_path,
            &self.config,
            &params.files,
            min_confidence,
            min_support,
        )
        .map_err(|e| {
            mcp_err(format!(
                "impact analysis failed: {e}. Is {} a git repository?",
                self.repo_path.display()
            ))
        })?;

        let response = ImpactAnalysisResponse {
            summary: format!(
                "{} candidate file(s) with confidence >= {min_confidence} and support >= {min_support}.",
                predictions.len()
            ),
            predictions,
        };

        let json = serde_json::to_string_pretty(&response).map_err(|e| mcp_err(e.to_string()))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};

    fn commit(repo: &Repository, files: &[(&str, &str)]) {
        let workdir = repo.workdir().unwrap();
        for (path, content) in files {
            std::fs::write(workdir.join(path), content).unwrap();
        }

        let mut index = repo.index().unwrap();
        for (path, _) in files {
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("alice", "alice@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "change", &tree, &parents)
            .unwrap();
    }

    #[test]
    fn analyze_finds_cochanging_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit(&repo, &[("a.rs", "1"), ("b.rs", "1")]);
        commit(&repo, &[("a.rs", "2"), ("b.rs", "2")]);
        commit(&repo, &[("a.rs", "3"), ("b.rs", "3")]);

        let config = RippleConfig::default();
        let predictions = analyze(
            dir.path(),
            &config,
            &["a.rs".to_string()],
            0.5,
            2,
        )
        .unwrap();

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].path, "b.rs");
        assert_eq!(predictions[0].support, 3);
        assert_eq!(predictions[0].confidence, 1.0);
    }

    #[test]
    fn analyze_on_missing_repo_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = RippleConfig::default();
        let result = analyze(
            &dir.path().join("nope"),
            &config,
            &["a.rs".to_string()],
            0.5,
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected_as_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let server = RippleServer::new(dir.path().to_path_buf(), RippleConfig::default());
        let result = server.impact_analysis(Parameters(ImpactAnalysisParams {
            files: vec!["a.rs".into()],
            min_confidence: Some(1.5),
            min_support: None,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn params_deserialize_with_optional_thresholds() {
        let params: ImpactAnalysisParams =
            serde_json::from_str(r#"{"files": ["src/a.rs"]}"#).unwrap();
        assert_eq!(params.files, vec!["src/a.rs"]);
        assert!(params.min_confidence.is_none());
        assert!(params.min_support.is_none());
    }
}
