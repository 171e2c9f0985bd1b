//! Transaction filters: prune the candidate list before rule extraction.
//!
//! Filters are pure functions over the transaction list and the query. They
//! preserve the relative order of kept transactions and never reorder across
//! discarded elements. The size cap should run before the overlap filter so
//! that bulk-commit noise does not distort the overlap measurement.

use crate::model::{Query, Transaction};

/// Narrow a transaction list against a query.
pub trait TxFilter {
    /// Return the transactions worth keeping, in their original relative order.
    fn filter<'a>(
        &self,
        transactions: Vec<&'a Transaction>,
        query: &Query,
    ) -> Vec<&'a Transaction>;
}

/// Drops transactions touching more files than a configured cap.
///
/// Very large transactions (bulk reformats, vendored imports) are poor
/// evidence of a meaningful co-change relationship and would dominate the
/// statistics if retained.
///
/// # Examples
///
/// ```
/// use ripple_rules::{MaxSizeFilter, TxFilter, Query, SemanticSet};
///
/// let filter = MaxSizeFilter::new(30);
/// let query = Query::new(SemanticSet::new());
/// assert!(filter.filter(Vec::new(), &query).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MaxSizeFilter {
    max_files: usize,
}

impl MaxSizeFilter {
    /// Create a filter keeping only transactions with at most `max_files` files.
    pub fn new(max_files: usize) -> Self {
        Self { max_files }
    }
}

impl TxFilter for MaxSizeFilter {
    fn filter<'a>(
        &self,
        transactions: Vec<&'a Transaction>,
        _query: &Query,
    ) -> Vec<&'a Transaction> {
        transactions
            .into_iter()
            .filter(|tx| tx.files.len() <= self.max_files)
            .collect()
    }
}

/// Keeps exactly the transactions tied for the maximum non-zero overlap with
/// the query, in one forward pass.
///
/// Transactions with no overlap carry no evidence for the query; among the
/// rest, only the ones most similar to the current change are kept, which
/// sharply narrows the candidate set when the query is specific.
#[derive(Debug, Clone, Default)]
pub struct MaxOverlapFilter;

impl TxFilter for MaxOverlapFilter {
    fn filter<'a>(
        &self,
        transactions: Vec<&'a Transaction>,
        query: &Query,
    ) -> Vec<&'a Transaction> {
        let mut best = 0;
        let mut kept: Vec<&'a Transaction> = Vec::new();

        for tx in transactions {
            let overlap = query.files.overlap(&tx.files);
            match overlap {
                0 => {}
                c if c == best => kept.push(tx),
                c if c > best => {
                    kept.clear();
                    kept.push(tx);
                    best = c;
                }
                _ => {}
            }
        }

        kept
    }
}
