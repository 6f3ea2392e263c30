//! # corefine
//!
//! Deterministic multi-pass coreference resolution.
//!
//! A document's mentions start as singleton clusters; a sequence of
//! rule-based passes ("sieves") then merges clusters, most precise pass
//! first. Each pass walks mentions in document order, searches candidate
//! antecedents nearest sentence first, and commits the first compatible
//! link it finds. Merges are never undone, so early high-precision
//! decisions feed richer cluster evidence to the later, looser passes.
//!
//! ## Quick start
//!
//! ```rust
//! use corefine::{
//!     CorefConfig, Dictionaries, Document, MentionCandidate, SentenceInput, SieveResolver,
//!     Span, Token,
//! };
//!
//! # fn main() -> corefine::Result<()> {
//! let dict = Dictionaries::default();
//! let sentences = vec![
//!     SentenceInput::new(
//!         vec![
//!             Token::new("Sarah", "NNP", "PERSON"),
//!             Token::new("arrived", "VBD", "O"),
//!         ],
//!         vec![MentionCandidate::new(1, Span::new(0, 1), 0)],
//!     ),
//!     SentenceInput::new(
//!         vec![
//!             Token::new("Sarah", "NNP", "PERSON"),
//!             Token::new("smiled", "VBD", "O"),
//!         ],
//!         vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
//!     ),
//! ];
//! let mut doc = Document::build(sentences, &dict, None)?;
//! let resolver = SieveResolver::new(&dict, CorefConfig::default())?;
//! let chains = resolver.resolve(&mut doc)?;
//! assert_eq!(chains.len(), 1);
//! assert_eq!(chains[0].mentions.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Structure
//!
//! - [`input`] / [`document`]: annotated sentences in, resolution state out
//! - [`dict`]: word lists and corpus statistics the rules consult
//! - [`rules`] / [`sieve`]: the pairwise checks and the passes built from them
//! - [`resolver`]: the pass loop and output chains
//! - [`metrics`]: MUC, B-cubed, and pairwise scorers
//! - [`optimize`]: greedy search over pass orderings
//!
//! Determinism is a design goal throughout: identical input and
//! configuration always produce identical chains.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod attributes;
pub mod cluster;
pub mod config;
pub mod dict;
pub mod document;
pub mod error;
pub mod input;
pub mod mention;
pub mod metrics;
pub mod optimize;
pub mod resolver;
pub mod rules;
pub mod semantics;
pub mod sieve;
pub mod singleton;

/// Everything most callers need.
pub mod prelude {
    pub use crate::config::CorefConfig;
    pub use crate::dict::Dictionaries;
    pub use crate::document::Document;
    pub use crate::error::{Error, Result};
    pub use crate::input::{DependencyGraph, MentionCandidate, SentenceInput};
    pub use crate::mention::{Mention, Span, Token};
    pub use crate::metrics::{BCubedScorer, MucScorer, PairwiseScorer, Scorer};
    pub use crate::resolver::{CorefChain, SieveResolver};
    pub use crate::sieve::SieveKind;
}

pub use cluster::CorefCluster;
pub use config::CorefConfig;
pub use dict::{Dictionaries, GenderCounts};
pub use document::{DocType, Document};
pub use error::{Error, Result};
pub use input::{DepEdge, DependencyGraph, MentionCandidate, SentenceInput};
pub use mention::{
    Animacy, ClusterId, Gender, Mention, MentionId, MentionType, Number, Person, Span, Token,
};
pub use metrics::{BCubedScorer, MucScorer, PairwiseScorer, ScoreCounts, Scorer};
pub use optimize::{CorpusScorer, OrderConstraint, OrderingScorer, SieveOrderOptimizer};
pub use resolver::{ChainMention, CorefChain, SieveResolver};
pub use semantics::{NoSemantics, Semantics, Synset};
pub use sieve::{Sieve, SieveFlags, SieveKind};
pub use singleton::{AlwaysReferring, SingletonClassifier};
