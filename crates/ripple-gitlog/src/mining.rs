//! Commit walking and transaction construction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::{Delta, DiffOptions, Repository, Sort};
use ripple_core::{Result, RippleError};
use ripple_rules::{FileIdGen, SemanticSet, Transaction, TransactionLog, TransactionSource};
use tracing::warn;

/// Options for history traversal.
///
/// # Examples
///
/// ```
/// use ripple_gitlog::HistoryOptions;
///
/// let opts = HistoryOptions::default();
/// assert_eq!(opts.max_commits, 200);
/// assert!(opts.branch.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Stop after this many transactions (0 = walk the full history).
    pub max_commits: usize,
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_commits: 200,
            branch: None,
        }
    }
}

/// A [`TransactionSource`] over a local git repository.
///
/// Each [`TransactionSource::transactions`] call takes a fresh snapshot:
/// commits are walked newest-first and diffed against their first parent
/// (the empty tree for root commits), with rename detection enabled. File
/// identifiers are assigned by a run-scoped generator; a renamed file keeps
/// its id, and the file map reports its newest path.
///
/// # Examples
///
/// ```no_run
/// use ripple_gitlog::{GitHistory, HistoryOptions};
/// use ripple_rules::TransactionSource;
///
/// let source = GitHistory::new(".", HistoryOptions::default());
/// let log = source.transactions().unwrap();
/// println!("{} transactions mined", log.transactions.len());
/// ```
#[derive(Debug)]
pub struct GitHistory {
    repo_path: PathBuf,
    options: HistoryOptions,
}

impl GitHistory {
    /// Create a source over the repository at `repo_path`.
    pub fn new(repo_path: impl Into<PathBuf>, options: HistoryOptions) -> Self {
        Self {
            repo_path: repo_path.into(),
            options,
        }
    }
}

impl TransactionSource for GitHistory {
    fn transactions(&self) -> Result<TransactionLog> {
        walk_history(&self.repo_path, &self.options)
    }
}

fn walk_history(repo_path: &Path, options: &HistoryOptions) -> Result<TransactionLog> {
    let repo = Repository::open(repo_path)
        .map_err(|e| RippleError::Git(format!("failed to open repository: {e}")))?;

    let mut revwalk = repo
        .revwalk()
        .map_err(|e| RippleError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk.set_sorting(Sort::TIME).ok();

    if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| RippleError::Git(format!("failed to resolve branch '{branch}': {e}")))?;
        let oid = reference
            .target()
            .ok_or_else(|| RippleError::Git("branch has no target".into()))?;
        revwalk
            .push(oid)
            .map_err(|e| RippleError::Git(format!("failed to push oid: {e}")))?;
    } else {
        revwalk
            .push_head()
            .map_err(|e| RippleError::Git(format!("failed to push HEAD: {e}")))?;
    }

    let mut ids = FileIdGen::new();
    // current name -> id, rebound on renames so older commits resolve
    let mut ids_by_path = HashMap::new();
    // id -> newest name, what the pipeline reports back to callers
    let mut paths = HashMap::new();
    let mut transactions = Vec::new();

    for oid_result in revwalk {
        let oid = match oid_result {
            Ok(oid) => oid,
            Err(e) => {
                warn!(error = %e, "revwalk error, skipping entry");
                continue;
            }
        };

        let commit = match repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(e) => {
                warn!(commit = %oid, error = %e, "failed to load commit, skipping");
                continue;
            }
        };

        let diff = match first_parent_diff(&repo, &commit) {
            Ok(diff) => diff,
            Err(e) => {
                warn!(commit = %oid, error = %e, "failed to diff commit, skipping");
                continue;
            }
        };

        let mut files = SemanticSet::new();
        for delta in diff.deltas() {
            // deletions leave nothing to predict
            if delta.status() == Delta::Deleted {
                continue;
            }

            let Some(path) = delta.new_file().path() else {
                continue;
            };
            let path = path.to_string_lossy().to_string();
            if path.is_empty() {
                continue;
            }

            let id = match ids_by_path.get(&path) {
                Some(&id) => id,
                None => {
                    let id = ids.next_id();
                    paths.insert(id, path.clone());
                    ids_by_path.insert(path.clone(), id);
                    id
                }
            };
            files.insert(id);

            // Walking newest-first: after a rename, older commits know the
            // file by its previous name, so rebind that name to the same id.
            if delta.status() == Delta::Renamed {
                if let Some(old_path) = delta.old_file().path() {
                    let old_path = old_path.to_string_lossy().to_string();
                    if old_path != path {
                        ids_by_path.remove(&path);
                        ids_by_path.insert(old_path, id);
                    }
                }
            }
        }

        if !files.is_empty() {
            transactions.push(Transaction::new(files));
            if options.max_commits != 0 && transactions.len() >= options.max_commits {
                break;
            }
        }
    }

    Ok(TransactionLog {
        transactions,
        paths,
    })
}

fn first_parent_diff<'repo>(
    repo: &'repo Repository,
    commit: &git2::Commit,
) -> std::result::Result<git2::Diff<'repo>, git2::Error> {
    let commit_tree = commit.tree()?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(commit.parent(0)?.tree()?)
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let mut diff = repo.diff_tree_to_tree(
        parent_tree.as_ref(),
        Some(&commit_tree),
        Some(&mut diff_opts),
    )?;

    let mut find_opts = git2::DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))?;

    Ok(diff)
}
