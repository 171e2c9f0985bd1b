//! Targeted association-rule mining over co-change history.
//!
//! Given a query — the set of files already touched in the working change —
//! this crate mines historical transactions (sets of files changed together)
//! for rules of the form "when these files change, that file tends to change
//! too", ranked by confidence and support.
//!
//! The pipeline: transaction source → size filter → max-overlap filter →
//! rule extractor → ranked predictions. See [`Pipeline::execute`].

pub mod engine;
pub mod extract;
pub mod filter;
pub mod model;
pub mod set;

pub use engine::{Pipeline, TransactionLog, TransactionSource};
pub use extract::AssociationRuleExtractor;
pub use filter::{MaxOverlapFilter, MaxSizeFilter, TxFilter};
pub use model::{FileId, FileIdGen, Query, Rule, Transaction};
pub use set::{SemanticSet, StableHash};
