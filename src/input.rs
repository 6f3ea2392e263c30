//! Input types for building a [`crate::document::Document`].
//!
//! Tokenization, tagging, parsing, and mention-boundary detection happen
//! upstream; the engine consumes their output through these types. Mention
//! ids are assigned by the caller and must be unique within the document;
//! all syntactic relation links (appositions, predicate nominatives,
//! relative pronouns) refer to those ids.

use serde::{Deserialize, Serialize};

use crate::mention::{ClusterId, MentionId, Span, Token};

/// One labelled edge of a sentence's dependency graph, between
/// sentence-absolute token indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEdge {
    /// Governor token index.
    pub governor: usize,
    /// Dependent token index.
    pub dependent: usize,
    /// Relation label (`nsubj`, `obj`, `nmod:of`, ...).
    pub relation: String,
}

/// A sentence's dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Edges; at most one per dependent.
    pub edges: Vec<DepEdge>,
}

impl DependencyGraph {
    /// Graph with no edges.
    #[must_use]
    pub fn empty() -> Self {
        DependencyGraph::default()
    }

    /// Create a graph from `(governor, dependent, relation)` triples.
    #[must_use]
    pub fn from_edges<S: Into<String>>(edges: impl IntoIterator<Item = (usize, usize, S)>) -> Self {
        DependencyGraph {
            edges: edges
                .into_iter()
                .map(|(governor, dependent, relation)| DepEdge {
                    governor,
                    dependent,
                    relation: relation.into(),
                })
                .collect(),
        }
    }

    /// The edge whose dependent is `idx`, if any.
    #[must_use]
    pub fn incoming(&self, idx: usize) -> Option<&DepEdge> {
        self.edges.iter().find(|e| e.dependent == idx)
    }
}

/// One mention candidate produced by upstream mention detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionCandidate {
    /// Document-unique id, assigned by the caller.
    pub id: MentionId,
    /// Token span within the sentence.
    pub span: Span,
    /// Sentence-absolute head token index.
    pub head_index: usize,
    /// True for coordinated lists ("Alice, Bob and Carol").
    pub is_list: bool,
    /// Marked generic by upstream detection.
    pub generic: bool,
    /// Gold cluster id, when gold annotations exist.
    pub gold_cluster_id: Option<ClusterId>,
    /// Ids of mentions in apposition with this one.
    pub appositions: Vec<MentionId>,
    /// Ids of mentions that are predicate nominatives of this one.
    pub predicate_nominatives: Vec<MentionId>,
    /// Ids of relative pronouns whose antecedent is this mention.
    pub relative_pronouns: Vec<MentionId>,
    /// Speaker of the utterance containing this mention. A numeric speaker
    /// string naming another mention's id marks quoted speech attributed
    /// to that mention.
    pub speaker: Option<String>,
    /// Utterance number; 0 throughout for single-speaker articles.
    pub utterance: u32,
}

impl MentionCandidate {
    /// Candidate with the given id, span, and head; everything else unset.
    #[must_use]
    pub fn new(id: MentionId, span: Span, head_index: usize) -> Self {
        MentionCandidate {
            id,
            span,
            head_index,
            is_list: false,
            generic: false,
            gold_cluster_id: None,
            appositions: Vec::new(),
            predicate_nominatives: Vec::new(),
            relative_pronouns: Vec::new(),
            speaker: None,
            utterance: 0,
        }
    }

    /// Set the gold cluster id.
    #[must_use]
    pub fn with_gold(mut self, cluster: ClusterId) -> Self {
        self.gold_cluster_id = Some(cluster);
        self
    }

    /// Set the speaker and utterance number.
    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>, utterance: u32) -> Self {
        self.speaker = Some(speaker.into());
        self.utterance = utterance;
        self
    }
}

/// One annotated sentence with its mention candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceInput {
    /// Tokens.
    pub tokens: Vec<Token>,
    /// Mention candidates, in any order.
    pub mentions: Vec<MentionCandidate>,
    /// Dependency graph over the tokens.
    pub deps: DependencyGraph,
}

impl SentenceInput {
    /// Sentence with no dependency edges.
    #[must_use]
    pub fn new(tokens: Vec<Token>, mentions: Vec<MentionCandidate>) -> Self {
        SentenceInput { tokens, mentions, deps: DependencyGraph::empty() }
    }

    /// Attach a dependency graph.
    #[must_use]
    pub fn with_deps(mut self, deps: DependencyGraph) -> Self {
        self.deps = deps;
        self
    }
}
