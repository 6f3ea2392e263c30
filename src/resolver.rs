//! The multi-pass resolution loop.
//!
//! Passes run in configured order over a shared document; each pass walks
//! mentions in document order, searches antecedents nearest-sentence-first,
//! and commits the first compatible link it finds. Merges performed by an
//! earlier pass are visible to every later pass; nothing is undone.

use serde::{Deserialize, Serialize};

use crate::cluster::CorefCluster;
use crate::config::CorefConfig;
use crate::dict::Dictionaries;
use crate::document::Document;
use crate::mention::{ClusterId, MentionId, MentionType, Span};
use crate::metrics::{PairwiseScorer, Scorer};
use crate::semantics::{NoSemantics, Semantics};
use crate::sieve::Sieve;
use crate::Result;

static NO_SEMANTICS: NoSemantics = NoSemantics;

// ============================================================================
// Output chains
// ============================================================================

/// One resolved entity, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorefChain {
    /// Stable cluster id (the id of some member mention).
    pub cluster_id: ClusterId,
    /// Members, earliest first.
    pub mentions: Vec<ChainMention>,
}

/// One mention of a resolved chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMention {
    /// The mention's id.
    pub mention_id: MentionId,
    /// Sentence index.
    pub sent_idx: usize,
    /// Token span within the sentence.
    pub span: Span,
    /// Surface text.
    pub text: String,
    /// Whether this member is the chain's most representative mention.
    pub representative: bool,
}

// ============================================================================
// Resolver
// ============================================================================

/// Runs the configured passes over documents.
pub struct SieveResolver<'a> {
    dict: &'a Dictionaries,
    config: CorefConfig,
    sieves: Vec<Sieve>,
    semantics: &'a dyn Semantics,
}

impl<'a> SieveResolver<'a> {
    /// Resolver without external semantic knowledge.
    pub fn new(dict: &'a Dictionaries, config: CorefConfig) -> Result<Self> {
        Self::with_semantics(dict, config, &NO_SEMANTICS)
    }

    /// Resolver backed by an external semantics source (synsets, aliases).
    pub fn with_semantics(
        dict: &'a Dictionaries,
        config: CorefConfig,
        semantics: &'a dyn Semantics,
    ) -> Result<Self> {
        let sieves = config.sieves.iter().map(|&k| Sieve::new(k, &config)).collect();
        Ok(SieveResolver { dict, config, sieves, semantics })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CorefConfig {
        &self.config
    }

    /// Run every pass over the document and return the resolved chains.
    pub fn resolve(&self, doc: &mut Document) -> Result<Vec<CorefChain>> {
        for sieve in &self.sieves {
            let before = if self.config.score_passes {
                Some(pass_snapshot(doc))
            } else {
                None
            };
            self.run_pass(sieve, doc);
            if let Some(before) = before {
                self.log_pass(sieve, doc, &before);
            }
        }
        if self.config.post_process {
            post_process(doc);
        }
        Ok(self.chains(doc))
    }

    fn run_pass(&self, sieve: &Sieve, doc: &mut Document) {
        let sentence_count = doc.ordered_mentions.len();
        for sent_idx in 0..sentence_count {
            for m1_pos in 0..doc.ordered_mentions[sent_idx].len() {
                let m1 = doc.ordered_mentions[sent_idx][m1_pos];
                if sieve.is_role_skip() {
                    self.mark_roles(doc, sent_idx, m1, m1_pos);
                    continue;
                }
                if sieve.skip_mention(doc, m1, self.dict) {
                    continue;
                }
                self.resolve_mention(sieve, doc, sent_idx, m1, m1_pos);
            }
        }
    }

    /// Nearest-sentence-first antecedent search; first compatible candidate
    /// wins and ends the search for this mention.
    fn resolve_mention(
        &self,
        sieve: &Sieve,
        doc: &mut Document,
        sent_idx: usize,
        m1: MentionId,
        m1_pos: usize,
    ) {
        let floor = match self.config.max_sentence_distance {
            Some(d) => sent_idx.saturating_sub(d),
            None => 0,
        };
        for ant_sent in (floor..=sent_idx).rev() {
            let candidates =
                sieve.ordered_antecedents(doc, ant_sent, sent_idx, m1, m1_pos, self.dict);
            for ant in candidates {
                let c1 = doc.mention(m1).coref_cluster_id;
                let c2 = doc.mention(ant).coref_cluster_id;
                if c1 == c2 {
                    continue;
                }
                // Predicted singletons only link through a proper name.
                let m1_ref = doc.mention(m1);
                let ant_ref = doc.mention(ant);
                if m1_ref.is_singleton
                    && ant_ref.is_singleton
                    && m1_ref.mention_type != MentionType::Proper
                    && ant_ref.mention_type != MentionType::Proper
                {
                    continue;
                }
                if sieve.coreferent(doc, c1, c2, m1, ant, self.dict, self.semantics) {
                    log::debug!(
                        "{}: linked mention {m1} to antecedent {ant} (cluster {c2})",
                        sieve.kind.name()
                    );
                    doc.merge_clusters(c2, c1);
                    return;
                }
            }
        }
    }

    /// The role-marking pass: record role appositives for later exclusion,
    /// never merge.
    fn mark_roles(&self, doc: &mut Document, sent_idx: usize, m1: MentionId, m1_pos: usize) {
        let preceding: Vec<MentionId> = doc.ordered_mentions[sent_idx][..m1_pos].to_vec();
        let is_role = {
            let m = doc.mention(m1);
            preceding.iter().any(|&other| m.is_role_appositive(doc.mention(other), self.dict))
        };
        if is_role {
            doc.role_set.insert(m1);
        }
    }

    fn log_pass(&self, sieve: &Sieve, doc: &Document, before: &[(MentionId, ClusterId)]) {
        let after = pass_snapshot(doc);
        let moved = after
            .iter()
            .zip(before)
            .filter(|(now, then)| now.1 != then.1)
            .count();
        let score = PairwiseScorer::default().score(doc);
        log::info!(
            "{}: {moved} mentions re-clustered, pairwise F1 {:.4}",
            sieve.kind.name(),
            score.f1()
        );
    }

    /// Chains for every multi-mention cluster (singletons included when
    /// configured), members in document order.
    fn chains(&self, doc: &Document) -> Vec<CorefChain> {
        let mut out = Vec::new();
        for cluster in doc.clusters.values() {
            if self.config.remove_singletons && cluster.mentions.len() < 2 {
                continue;
            }
            out.push(chain_of(doc, cluster));
        }
        out
    }
}

fn pass_snapshot(doc: &Document) -> Vec<(MentionId, ClusterId)> {
    let mut snap: Vec<(MentionId, ClusterId)> =
        doc.mentions.values().map(|m| (m.id, m.coref_cluster_id)).collect();
    snap.sort_unstable();
    snap
}

fn chain_of(doc: &Document, cluster: &CorefCluster) -> CorefChain {
    let mut members: Vec<&MentionId> = cluster.mentions.iter().collect();
    members.sort_by_key(|id| {
        let m = doc.mention(**id);
        (m.sent_idx, m.span.start, m.span.end)
    });
    CorefChain {
        cluster_id: cluster.id,
        mentions: members
            .into_iter()
            .map(|&id| {
                let m = doc.mention(id);
                ChainMention {
                    mention_id: id,
                    sent_idx: m.sent_idx,
                    span: m.span,
                    text: m.span_string(),
                    representative: id == cluster.representative,
                }
            })
            .collect(),
    }
}

// ============================================================================
// Post-processing
// ============================================================================

/// Detach mentions that only entered a cluster as the dependent side of an
/// apposition, predicate nominative, or relative pronoun, returning each to
/// its own singleton cluster.
fn post_process(doc: &mut Document) {
    let mut detach: Vec<MentionId> = Vec::new();
    for m in doc.mentions.values() {
        for &linked in m
            .appositions
            .iter()
            .chain(&m.predicate_nominatives)
            .chain(&m.relative_pronouns)
        {
            if doc.mentions.get(&linked).map(|l| l.coref_cluster_id) == Some(m.coref_cluster_id)
            {
                detach.push(linked);
            }
        }
    }
    detach.sort_unstable();
    detach.dedup();
    for id in detach {
        let cluster_id = doc.mention(id).coref_cluster_id;
        if cluster_id == id || doc.clusters[&cluster_id].mentions.len() < 2 {
            continue;
        }
        if let Some(cluster) = doc.clusters.get_mut(&cluster_id) {
            cluster.remove_mention(id);
        }
        if let Some(mention) = doc.mentions.get_mut(&id) {
            mention.coref_cluster_id = id;
            let singleton = CorefCluster::singleton(mention);
            doc.clusters.insert(id, singleton);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MentionCandidate, SentenceInput};
    use crate::mention::Span;
    use crate::sieve::SieveKind;

    fn token(word: &str, pos: &str) -> crate::mention::Token {
        crate::mention::Token::new(word, pos, "O")
    }

    fn doc_two_johns() -> Document {
        let dict = Dictionaries::default();
        let s0 = SentenceInput::new(
            vec![token("John", "NNP"), token("slept", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 1), 0)],
        );
        let s1 = SentenceInput::new(
            vec![token("John", "NNP"), token("woke", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
        );
        Document::build(vec![s0, s1], &dict, None).unwrap()
    }

    #[test]
    fn exact_match_links_identical_proper_names() {
        let dict = Dictionaries::default();
        let config = CorefConfig {
            sieves: vec![SieveKind::ExactStringMatch],
            remove_singletons: true,
            ..CorefConfig::default()
        };
        let resolver = SieveResolver::new(&dict, config).unwrap();
        let mut doc = doc_two_johns();
        let chains = resolver.resolve(&mut doc).unwrap();
        assert_eq!(chains.len(), 1);
        let ids: Vec<MentionId> = chains[0].mentions.iter().map(|m| m.mention_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn singletons_survive_when_configured() {
        let dict = Dictionaries::default();
        let config = CorefConfig {
            sieves: vec![SieveKind::ExactStringMatch],
            remove_singletons: false,
            ..CorefConfig::default()
        };
        let resolver = SieveResolver::new(&dict, config).unwrap();
        let s0 = SentenceInput::new(
            vec![token("Mary", "NNP"), token("left", "VBD")],
            vec![MentionCandidate::new(7, Span::new(0, 1), 0)],
        );
        let mut doc = Document::build(vec![s0], &dict, None).unwrap();
        let chains = resolver.resolve(&mut doc).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].mentions.len(), 1);
    }

    #[test]
    fn merges_persist_across_passes() {
        let dict = Dictionaries::default();
        let config = CorefConfig {
            sieves: vec![SieveKind::ExactStringMatch, SieveKind::RelaxedStringMatch],
            ..CorefConfig::default()
        };
        let resolver = SieveResolver::new(&dict, config).unwrap();
        let mut doc = doc_two_johns();
        resolver.resolve(&mut doc).unwrap();
        assert_eq!(
            doc.mention(1).coref_cluster_id,
            doc.mention(2).coref_cluster_id
        );
        // The merged cluster survives under the antecedent's id.
        assert_eq!(doc.mention(2).coref_cluster_id, 1);
    }

    #[test]
    fn sentence_distance_bound_blocks_distant_links() {
        let dict = Dictionaries::default();
        let config = CorefConfig {
            sieves: vec![SieveKind::ExactStringMatch],
            max_sentence_distance: Some(0),
            ..CorefConfig::default()
        };
        let resolver = SieveResolver::new(&dict, config).unwrap();
        let mut doc = doc_two_johns();
        let chains = resolver.resolve(&mut doc).unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn post_process_detaches_appositives() {
        let dict = Dictionaries::default();
        let tokens = vec![
            token("Obama", "NNP"),
            token(",", ","),
            token("the", "DT"),
            token("president", "NN"),
            token(",", ","),
            token("spoke", "VBD"),
        ];
        let mut head = MentionCandidate::new(1, Span::new(0, 1), 0);
        head.appositions = vec![2];
        let appo = MentionCandidate::new(2, Span::new(2, 4), 1);
        let s0 = SentenceInput::new(tokens, vec![head, appo]);
        let config = CorefConfig {
            sieves: vec![SieveKind::PreciseConstructs],
            ..CorefConfig::default()
        };
        let resolver = SieveResolver::new(&dict, config).unwrap();
        let mut doc = Document::build(vec![s0], &dict, None).unwrap();
        let chains = resolver.resolve(&mut doc).unwrap();
        // The apposition links, then post-processing detaches the dependent
        // side and singleton removal drops both.
        assert!(chains.is_empty());
        assert_eq!(doc.mention(2).coref_cluster_id, 2);
    }

    #[test]
    fn resolution_is_deterministic() {
        let dict = Dictionaries::default();
        let config = CorefConfig::default();
        let run = || {
            let resolver = SieveResolver::new(&dict, config.clone()).unwrap();
            let mut doc = doc_two_johns();
            resolver.resolve(&mut doc).unwrap()
        };
        assert_eq!(run(), run());
    }
}
