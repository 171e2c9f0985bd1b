//! Pipeline orchestration: from query paths to ranked predictions.
//!
//! One `execute` call is a synchronous batch computation — it takes a fresh
//! transaction snapshot from the source, runs the filter chain and the
//! extractor, resolves rule consequents back to paths, and ranks the result.
//! Nothing is cached or shared between calls.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ripple_core::{Prediction, Result};
use tracing::{debug, warn};

use crate::extract::AssociationRuleExtractor;
use crate::filter::{MaxOverlapFilter, MaxSizeFilter, TxFilter};
use crate::model::{FileId, Query, Rule, Transaction};
use crate::set::SemanticSet;

/// A history snapshot: the ordered transaction list plus the run-scoped
/// file map. Transactions arrive in history order (newest first for the git
/// source); the pipeline treats that as input order and never re-sorts.
#[derive(Debug)]
pub struct TransactionLog {
    /// Change events, one per mined commit.
    pub transactions: Vec<Transaction>,
    /// Authoritative `FileId -> path` mapping for this run.
    pub paths: HashMap<FileId, String>,
}

/// Where transactions come from. Implemented by the git history miner;
/// tests substitute in-memory sources.
pub trait TransactionSource {
    /// Retrieve a fresh transaction snapshot.
    ///
    /// # Errors
    ///
    /// Fails when history cannot be read at all; partial mining is never
    /// attempted.
    fn transactions(&self) -> Result<TransactionLog>;
}

/// Composes the filter chain and the extractor into one mining pipeline.
///
/// # Examples
///
/// ```
/// use ripple_rules::{AssociationRuleExtractor, Pipeline};
///
/// let pipeline = Pipeline::standard(30, AssociationRuleExtractor::new(0.7, 3));
/// # let _ = pipeline;
/// ```
pub struct Pipeline {
    filters: Vec<Box<dyn TxFilter>>,
    extractor: AssociationRuleExtractor,
}

impl Pipeline {
    /// Compose an explicit filter chain with an extractor. Filters run in
    /// the given order.
    pub fn new(filters: Vec<Box<dyn TxFilter>>, extractor: AssociationRuleExtractor) -> Self {
        Self { filters, extractor }
    }

    /// The standard chain: size cap first (noise suppression), then the
    /// max-overlap filter (relevance narrowing).
    pub fn standard(max_changed_files: usize, extractor: AssociationRuleExtractor) -> Self {
        Self::new(
            vec![
                Box::new(MaxSizeFilter::new(max_changed_files)),
                Box::new(MaxOverlapFilter),
            ],
            extractor,
        )
    }

    /// Run one query through the pipeline and return ranked predictions.
    ///
    /// Query paths unknown to the history are dropped with a warning — a
    /// path never seen in history has no mineable relationship. If no path
    /// resolves, the result is empty, not an error.
    ///
    /// # Errors
    ///
    /// Propagates the source's retrieval failure; everything else degrades
    /// to omitted data with diagnostic logging.
    pub fn execute(
        &self,
        source: &dyn TransactionSource,
        query_paths: &[String],
    ) -> Result<Vec<Prediction>> {
        let log = source.transactions()?;

        let ids_by_path: HashMap<&str, FileId> = log
            .paths
            .iter()
            .map(|(id, path)| (path.as_str(), *id))
            .collect();

        let mut files = SemanticSet::new();
        for path in query_paths {
            match ids_by_path.get(path.as_str()) {
                Some(id) => {
                    files.insert(*id);
                }
                None => warn!(path = %path, "query path not found in history, ignoring"),
            }
        }

        if files.is_empty() {
            debug!("no query path resolved to a known file");
            return Ok(Vec::new());
        }
        let query = Query::new(files);

        let mut transactions: Vec<&Transaction> = log.transactions.iter().collect();
        for filter in &self.filters {
            transactions = filter.filter(transactions, &query);
        }
        debug!(kept = transactions.len(), "filter chain applied");

        let rules = self.extractor.extract(&transactions, &query);

        Ok(rank(rules, &log.paths))
    }
}

/// Resolve rule consequents to paths, deduplicate per consequent, and sort.
///
/// When multiple rules target the same file, the highest-confidence rule
/// wins, breaking ties by higher support.
fn rank(rules: Vec<Rule>, paths: &HashMap<FileId, String>) -> Vec<Prediction> {
    let mut best: HashMap<FileId, Prediction> = HashMap::new();

    for rule in rules {
        let Some(path) = paths.get(&rule.right) else {
            warn!(file_id = %rule.right, "rule consequent missing from file map, dropping");
            continue;
        };
        if path.is_empty() {
            warn!(file_id = %rule.right, "rule consequent maps to an empty path, dropping");
            continue;
        }

        let candidate = Prediction {
            path: path.clone(),
            confidence: rule.confidence,
            support: rule.support,
        };

        match best.entry(rule.right) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if outranks(&candidate, slot.get()) {
                    slot.insert(candidate);
                }
            }
        }
    }

    let mut predictions: Vec<Prediction> = best.into_values().collect();
    predictions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then(b.support.cmp(&a.support))
    });
    predictions
}

fn outranks(candidate: &Prediction, incumbent: &Prediction) -> bool {
    match candidate.confidence.partial_cmp(&incumbent.confidence) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => candidate.support > incumbent.support,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::RippleError;

    /// In-memory source over `(transaction ids, id -> path)` fixtures.
    struct StubSource {
        transactions: Vec<Vec<u64>>,
        paths: Vec<(u64, &'static str)>,
    }

    impl TransactionSource for StubSource {
        fn transactions(&self) -> Result<TransactionLog> {
            Ok(TransactionLog {
                transactions: self
                    .transactions
                    .iter()
                    .map(|ids| Transaction::new(ids.iter().map(|&id| FileId(id)).collect()))
                    .collect(),
                paths: self
                    .paths
                    .iter()
                    .map(|&(id, path)| (FileId(id), path.to_string()))
                    .collect(),
            })
        }
    }

    struct FailingSource;

    impl TransactionSource for FailingSource {
        fn transactions(&self) -> Result<TransactionLog> {
            Err(RippleError::Git("history unreadable".into()))
        }
    }

    fn standard(min_confidence: f64, min_support: u64) -> Pipeline {
        Pipeline::standard(30, AssociationRuleExtractor::new(min_confidence, min_support))
    }

    fn owned(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn end_to_end_prediction_from_stub_history() {
        let source = StubSource {
            transactions: vec![vec![1, 2, 3], vec![1, 2, 4], vec![1, 3, 5], vec![2, 3, 6]],
            paths: vec![
                (1, "src/auth.rs"),
                (2, "src/session.rs"),
                (3, "src/token.rs"),
                (4, "src/db.rs"),
                (5, "src/cache.rs"),
                (6, "src/api.rs"),
            ],
        };

        let predictions = standard(0.5, 2)
            .execute(&source, &owned(&["src/auth.rs"]))
            .unwrap();

        let mut paths: Vec<&str> = predictions.iter().map(|p| p.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["src/session.rs", "src/token.rs"]);
        for p in &predictions {
            assert!((p.confidence - 2.0 / 3.0).abs() < 1e-9);
            assert_eq!(p.support, 2);
        }
    }

    #[test]
    fn strict_thresholds_give_empty_result_not_error() {
        let source = StubSource {
            transactions: vec![vec![1, 2, 3], vec![1, 2, 4], vec![1, 3, 5], vec![2, 3, 6]],
            paths: vec![(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e"), (6, "f")],
        };

        let predictions = standard(0.9, 3).execute(&source, &owned(&["a"])).unwrap();
        assert!(predictions.is_empty());
    }

    #[test]
    fn unresolvable_query_paths_are_dropped_not_fatal() {
        let source = StubSource {
            transactions: vec![vec![1, 2], vec![1, 2]],
            paths: vec![(1, "a"), (2, "b")],
        };

        let predictions = standard(0.5, 1)
            .execute(&source, &owned(&["a", "never/seen.rs"]))
            .unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].path, "b");
    }

    #[test]
    fn all_unresolvable_paths_yield_empty_result() {
        let source = StubSource {
            transactions: vec![vec![1, 2]],
            paths: vec![(1, "a"), (2, "b")],
        };

        let predictions = standard(0.0, 0)
            .execute(&source, &owned(&["ghost.rs"]))
            .unwrap();
        assert!(predictions.is_empty());
    }

    #[test]
    fn unmapped_consequent_is_dropped() {
        // id 3 appears in history but not in the file map.
        let source = StubSource {
            transactions: vec![vec![1, 2, 3], vec![1, 2, 3]],
            paths: vec![(1, "a"), (2, "b")],
        };

        let predictions = standard(0.5, 1).execute(&source, &owned(&["a"])).unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].path, "b");
    }

    #[test]
    fn empty_path_consequent_is_dropped() {
        let source = StubSource {
            transactions: vec![vec![1, 2, 3], vec![1, 2, 3]],
            paths: vec![(1, "a"), (2, "b"), (3, "")],
        };

        let predictions = standard(0.5, 1).execute(&source, &owned(&["a"])).unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].path, "b");
    }

    #[test]
    fn retrieval_failure_propagates() {
        let result = standard(0.5, 1).execute(&FailingSource, &owned(&["a"]));
        assert!(matches!(result, Err(RippleError::Git(_))));
    }

    #[test]
    fn ranking_sorts_by_confidence_then_support() {
        let mut paths = HashMap::new();
        paths.insert(FileId(10), "low-support".to_string());
        paths.insert(FileId(11), "high-support".to_string());
        paths.insert(FileId(12), "low-confidence".to_string());

        let left: SemanticSet<FileId> = [FileId(1)].into_iter().collect();
        let rules = vec![
            Rule {
                left: left.clone(),
                right: FileId(10),
                confidence: 0.9,
                support: 5,
            },
            Rule {
                left: left.clone(),
                right: FileId(11),
                confidence: 0.9,
                support: 10,
            },
            Rule {
                left,
                right: FileId(12),
                confidence: 0.4,
                support: 50,
            },
        ];

        let ranked = rank(rules, &paths);
        let order: Vec<&str> = ranked.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(order, vec!["high-support", "low-support", "low-confidence"]);
    }

    #[test]
    fn duplicate_consequents_keep_the_strongest_rule() {
        let mut paths = HashMap::new();
        paths.insert(FileId(10), "target".to_string());

        let small: SemanticSet<FileId> = [FileId(1)].into_iter().collect();
        let large: SemanticSet<FileId> = [FileId(1), FileId(2)].into_iter().collect();
        let rules = vec![
            Rule {
                left: small,
                right: FileId(10),
                confidence: 0.5,
                support: 8,
            },
            Rule {
                left: large,
                right: FileId(10),
                confidence: 1.0,
                support: 2,
            },
        ];

        let ranked = rank(rules, &paths);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].confidence, 1.0);
        assert_eq!(ranked[0].support, 2);
    }
}
