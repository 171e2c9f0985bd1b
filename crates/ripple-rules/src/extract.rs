//! Association-rule extraction from filtered transactions.
//!
//! Transactions are grouped by their antecedent — the intersection with the
//! query — in a hash-bucketed index keyed by the antecedent's stable hash.
//! Each group counts how often every candidate consequent co-occurred with
//! the antecedent; those counts become confidence and support.

use std::collections::HashMap;

use crate::model::{FileId, Query, Rule, Transaction};
use crate::set::SemanticSet;

/// Extracts association rules above configured thresholds.
///
/// Thresholds are fixed at construction, keeping the extractor stateless and
/// reusable across calls.
///
/// # Examples
///
/// ```
/// use ripple_rules::AssociationRuleExtractor;
///
/// let extractor = AssociationRuleExtractor::new(0.5, 2);
/// let rules = extractor.extract(&[], &ripple_rules::Query::new(Default::default()));
/// assert!(rules.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AssociationRuleExtractor {
    min_confidence: f64,
    min_support: u64,
}

impl AssociationRuleExtractor {
    /// Create an extractor emitting only rules with
    /// `confidence >= min_confidence` and `support >= min_support`.
    pub fn new(min_confidence: f64, min_support: u64) -> Self {
        Self {
            min_confidence,
            min_support,
        }
    }

    /// Mine rules from `transactions` against `query`.
    ///
    /// Transactions with an empty antecedent (no overlap with the query)
    /// contribute nothing. Emission order is unspecified; callers needing
    /// determinism must sort.
    pub fn extract(&self, transactions: &[&Transaction], query: &Query) -> Vec<Rule> {
        let mut index = SupportIndex::default();

        for tx in transactions {
            let (left, rest) = query.split(tx);
            if left.is_empty() {
                continue;
            }

            let group = index.group_mut(&left);
            group.total += 1;
            for right in &rest {
                *group.consequents.entry(*right).or_insert(0) += 1;
            }
        }

        let mut rules = Vec::new();
        for group in index.groups() {
            for (&right, &support) in &group.consequents {
                let confidence = support as f64 / group.total as f64;
                if confidence >= self.min_confidence && support >= self.min_support {
                    rules.push(Rule {
                        left: group.left.clone(),
                        right,
                        confidence,
                        support,
                    });
                }
            }
        }

        rules
    }
}

/// All transactions sharing one antecedent, with per-consequent counts.
/// Built and dropped within a single extraction call.
#[derive(Debug)]
struct SupportGroup {
    left: SemanticSet<FileId>,
    consequents: HashMap<FileId, u64>,
    total: u64,
}

/// Antecedent-keyed index of support groups.
///
/// Keyed by the antecedent's stable hash, with an explicit equality scan
/// inside each bucket — the hash accelerates lookup but never identifies a
/// group on its own, so colliding antecedents stay separate.
#[derive(Debug, Default)]
struct SupportIndex {
    buckets: HashMap<u64, Vec<SupportGroup>>,
}

impl SupportIndex {
    fn group_mut(&mut self, left: &SemanticSet<FileId>) -> &mut SupportGroup {
        let bucket = self.buckets.entry(left.stable_hash()).or_default();

        let slot = match bucket.iter().position(|group| group.left == *left) {
            Some(found) => found,
            None => {
                bucket.push(SupportGroup {
                    left: left.clone(),
                    consequents: HashMap::new(),
                    total: 0,
                });
                bucket.len() - 1
            }
        };

        &mut bucket[slot]
    }

    fn groups(&self) -> impl Iterator<Item = &SupportGroup> {
        self.buckets.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(ids: &[u64]) -> Transaction {
        Transaction::new(ids.iter().map(|&id| FileId(id)).collect())
    }

    fn query(ids: &[u64]) -> Query {
        Query::new(ids.iter().map(|&id| FileId(id)).collect())
    }

    fn extract(
        transactions: &[Transaction],
        q: &Query,
        min_confidence: f64,
        min_support: u64,
    ) -> Vec<Rule> {
        let refs: Vec<&Transaction> = transactions.iter().collect();
        AssociationRuleExtractor::new(min_confidence, min_support).extract(&refs, q)
    }

    #[test]
    fn mines_rules_above_thresholds() {
        let transactions = [tx(&[1, 2, 3]), tx(&[1, 2, 4]), tx(&[1, 3, 5]), tx(&[2, 3, 6])];

        // {1} appears in three transactions; 2 and 3 each co-occur twice.
        let mut rules = extract(&transactions, &query(&[1]), 0.5, 2);
        rules.sort_by_key(|r| r.right);

        assert_eq!(rules.len(), 2);

        assert_eq!(rules[0].right, FileId(2));
        assert_eq!(rules[0].support, 2);
        assert!((rules[0].confidence - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(rules[0].left, query(&[1]).files);

        assert_eq!(rules[1].right, FileId(3));
        assert_eq!(rules[1].support, 2);
        assert!((rules[1].confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn strict_thresholds_yield_no_rules() {
        let transactions = [tx(&[1, 2, 3]), tx(&[1, 2, 4]), tx(&[1, 3, 5]), tx(&[2, 3, 6])];

        let rules = extract(&transactions, &query(&[1]), 0.9, 3);
        assert!(rules.is_empty());
    }

    #[test]
    fn single_occurrence_yields_confidence_exactly_one() {
        let transactions = [tx(&[1, 2])];

        let rules = extract(&transactions, &query(&[1]), 1.0, 1);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].confidence, 1.0);
        assert_eq!(rules[0].support, 1);
    }

    #[test]
    fn transactions_without_overlap_are_ignored() {
        let transactions = [tx(&[5, 6]), tx(&[7])];

        let rules = extract(&transactions, &query(&[1]), 0.0, 0);
        assert!(rules.is_empty());
    }

    #[test]
    fn distinct_antecedents_group_separately() {
        // {1} and {1,2} are different antecedents with independent counts.
        let transactions = [tx(&[1, 9]), tx(&[1, 2, 9]), tx(&[1, 2, 9])];

        let rules = extract(&transactions, &query(&[1, 2]), 0.0, 1);
        let mut by_left_size: Vec<(usize, u64)> = rules
            .iter()
            .filter(|r| r.right == FileId(9))
            .map(|r| (r.left.len(), r.support))
            .collect();
        by_left_size.sort_unstable();

        assert_eq!(by_left_size, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn raising_thresholds_never_increases_rule_count() {
        let transactions = [
            tx(&[1, 2, 3]),
            tx(&[1, 2, 4]),
            tx(&[1, 3, 5]),
            tx(&[2, 3, 6]),
            tx(&[1, 2]),
        ];
        let q = query(&[1, 3]);

        let confidences = [0.0, 0.25, 0.5, 0.75, 1.0];
        let supports = [0, 1, 2, 3];

        let mut previous = usize::MAX;
        for &c in &confidences {
            let count = extract(&transactions, &q, c, 0).len();
            assert!(count <= previous, "confidence {c} grew the rule count");
            previous = count;
        }

        previous = usize::MAX;
        for &s in &supports {
            let count = extract(&transactions, &q, 0.0, s).len();
            assert!(count <= previous, "support {s} grew the rule count");
            previous = count;
        }
    }

    #[test]
    fn emitted_rules_apply_to_their_query() {
        let transactions = [tx(&[1, 2, 3]), tx(&[2, 3, 4]), tx(&[1, 4])];
        let q = query(&[1, 2]);

        for rule in extract(&transactions, &q, 0.0, 1) {
            assert!(rule.applies_to(&q));
        }
    }
}
