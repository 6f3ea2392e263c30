//! Per-document state: mention and cluster tables plus the caches the
//! pass loop maintains.
//!
//! All cross-references are by id. Mentions live in one table, clusters in
//! another; sentences hold ordered id lists. Merging clusters re-points the
//! moved mentions' cluster ids and re-keys the incompatibility and acronym
//! caches, so every structure stays consistent across passes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::cluster::CorefCluster;
use crate::dict::Dictionaries;
use crate::error::{Error, Result};
use crate::input::{DependencyGraph, SentenceInput};
use crate::mention::{ClusterId, Mention, MentionId, Token};
use crate::singleton::SingletonClassifier;
use crate::{attributes, mention::Animacy, mention::Gender, mention::Number, mention::Person};

/// Kind of document, which gates the discourse constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    /// Single-speaker text.
    Article,
    /// Multi-speaker text with utterance numbers.
    Conversation,
}

/// One document's complete coreference state.
#[derive(Debug, Clone)]
pub struct Document {
    /// Article or conversation.
    pub doc_type: DocType,
    /// Tokens per sentence.
    pub sentence_tokens: Vec<Vec<Token>>,
    /// Dependency graph per sentence.
    pub deps: Vec<DependencyGraph>,
    /// Mention ids per sentence, in document order: by span start, and for
    /// mentions sharing a start and head, longer span first.
    pub ordered_mentions: Vec<Vec<MentionId>>,
    /// Mention table.
    pub mentions: HashMap<MentionId, Mention>,
    /// Cluster table, ordered for deterministic iteration.
    pub clusters: BTreeMap<ClusterId, CorefCluster>,
    /// Gold clusters, when gold annotations were supplied.
    pub gold_clusters: BTreeMap<ClusterId, BTreeSet<MentionId>>,
    /// Quoted-speech pairs: (mention, mention acting as its speaker).
    pub speaker_pairs: HashSet<(MentionId, MentionId)>,
    /// Speaker per utterance number.
    pub speakers: HashMap<u32, String>,
    /// Mentions consumed by a role-appositive pattern.
    pub role_set: HashSet<MentionId>,

    incompatible_clusters: HashSet<(ClusterId, ClusterId)>,
    acronym_cache: HashMap<(ClusterId, ClusterId), bool>,
}

impl Document {
    /// Build a document from annotated sentences: validates the candidates,
    /// resolves attributes, orders mentions, and seeds singleton clusters.
    pub fn build(
        sentences: Vec<SentenceInput>,
        dict: &Dictionaries,
        singleton: Option<&dyn SingletonClassifier>,
    ) -> Result<Document> {
        let mut mentions: HashMap<MentionId, Mention> = HashMap::new();
        let mut ordered: Vec<Vec<MentionId>> = Vec::with_capacity(sentences.len());
        let mut sentence_tokens = Vec::with_capacity(sentences.len());
        let mut deps = Vec::with_capacity(sentences.len());
        let mut gold: BTreeMap<ClusterId, BTreeSet<MentionId>> = BTreeMap::new();
        let mut conversation = false;

        for (sent_idx, sent) in sentences.into_iter().enumerate() {
            let mut ids = Vec::with_capacity(sent.mentions.len());
            for cand in sent.mentions {
                if cand.span.is_empty() || cand.span.end > sent.tokens.len() {
                    return Err(Error::invalid_input(format!(
                        "mention {}: span {} outside sentence {} of length {}",
                        cand.id, cand.span, sent_idx, sent.tokens.len()
                    )));
                }
                if mentions.contains_key(&cand.id) {
                    return Err(Error::invalid_input(format!("duplicate mention id {}", cand.id)));
                }
                if cand.utterance > 0 {
                    conversation = true;
                }
                let mut m = Mention {
                    id: cand.id,
                    sent_idx,
                    span: cand.span,
                    head_index: cand.head_index,
                    tokens: sent.tokens[cand.span.start..cand.span.end].to_vec(),
                    mention_type: crate::mention::MentionType::Nominal,
                    number: Number::Unknown,
                    gender: Gender::Unknown,
                    animacy: Animacy::Unknown,
                    person: Person::Unknown,
                    ner_string: String::new(),
                    head_string: String::new(),
                    is_subject: false,
                    is_direct_object: false,
                    is_indirect_object: false,
                    is_preposition_object: false,
                    governing_verb: None,
                    generic: cand.generic,
                    is_singleton: false,
                    coref_cluster_id: cand.id,
                    gold_cluster_id: cand.gold_cluster_id,
                    appositions: cand.appositions.into_iter().collect(),
                    predicate_nominatives: cand.predicate_nominatives.into_iter().collect(),
                    relative_pronouns: cand.relative_pronouns.into_iter().collect(),
                    speaker: cand.speaker,
                    utterance: cand.utterance,
                };
                attributes::resolve(&mut m, &sent.tokens, &sent.deps, dict, cand.is_list);
                if let Some(clf) = singleton {
                    m.is_singleton = clf.is_singleton(&m, dict);
                }
                if let Some(g) = m.gold_cluster_id {
                    gold.entry(g).or_default().insert(m.id);
                }
                ids.push(m.id);
                mentions.insert(m.id, m);
            }
            sort_document_order(&mut ids, &mentions);
            ordered.push(ids);
            sentence_tokens.push(sent.tokens);
            deps.push(sent.deps);
        }

        let mut clusters = BTreeMap::new();
        for m in mentions.values() {
            clusters.insert(m.id, CorefCluster::singleton(m));
        }

        // Quoted speech: a numeric speaker string naming another mention
        // links the quoted mention to its speaker mention.
        let mut speaker_pairs = HashSet::new();
        let mut speakers: HashMap<u32, String> = HashMap::new();
        for m in ordered.iter().flatten().map(|id| &mentions[id]) {
            if let Some(spk) = &m.speaker {
                speakers.entry(m.utterance).or_insert_with(|| spk.clone());
                if let Ok(spk_id) = spk.parse::<MentionId>() {
                    if spk_id != m.id && mentions.contains_key(&spk_id) {
                        speaker_pairs.insert((m.id, spk_id));
                    }
                }
            }
        }

        Ok(Document {
            doc_type: if conversation { DocType::Conversation } else { DocType::Article },
            sentence_tokens,
            deps,
            ordered_mentions: ordered,
            mentions,
            clusters,
            gold_clusters: gold,
            speaker_pairs,
            speakers,
            role_set: HashSet::new(),
            incompatible_clusters: HashSet::new(),
            acronym_cache: HashMap::new(),
        })
    }

    /// Mention by id.
    ///
    /// # Panics
    /// Panics on an unknown id; ids handed out by this document are
    /// always valid.
    #[must_use]
    pub fn mention(&self, id: MentionId) -> &Mention {
        &self.mentions[&id]
    }

    /// Cluster containing the given mention.
    #[must_use]
    pub fn cluster_of(&self, id: MentionId) -> &CorefCluster {
        &self.clusters[&self.mentions[&id].coref_cluster_id]
    }

    /// Record that two mentions can never corefer. Their current clusters
    /// become incompatible as well.
    pub fn add_incompatible(&mut self, m1: MentionId, m2: MentionId) {
        let c1 = self.mentions[&m1].coref_cluster_id;
        let c2 = self.mentions[&m2].coref_cluster_id;
        self.incompatible_clusters.insert(ordered_pair(c1, c2));
    }

    /// True when the two clusters were marked incompatible.
    #[must_use]
    pub fn is_incompatible(&self, c1: ClusterId, c2: ClusterId) -> bool {
        self.incompatible_clusters.contains(&ordered_pair(c1, c2))
    }

    /// Cached acronym verdict for a cluster pair.
    #[must_use]
    pub fn acronym_cached(&self, c1: ClusterId, c2: ClusterId) -> Option<bool> {
        self.acronym_cache.get(&ordered_pair(c1, c2)).copied()
    }

    /// Cache an acronym verdict for a cluster pair.
    pub fn cache_acronym(&mut self, c1: ClusterId, c2: ClusterId, value: bool) {
        self.acronym_cache.insert(ordered_pair(c1, c2), value);
    }

    /// True when one mention was attributed to the other as its speaker.
    #[must_use]
    pub fn is_speaker_pair(&self, a: MentionId, b: MentionId) -> bool {
        self.speaker_pairs.contains(&(a, b)) || self.speaker_pairs.contains(&(b, a))
    }

    /// Merge the cluster `from` into `to`: members move, aggregates union,
    /// and the incompatibility and acronym caches are re-keyed so verdicts
    /// against `from` now apply to `to`.
    pub fn merge_clusters(&mut self, to: ClusterId, from: ClusterId) {
        if to == from {
            return;
        }
        let Some(absorbed) = self.clusters.remove(&from) else { return };
        if let Some(target) = self.clusters.get_mut(&to) {
            target.absorb(&absorbed, &mut self.mentions);
        }

        let rekey = |id: ClusterId| if id == from { to } else { id };
        self.incompatible_clusters = self
            .incompatible_clusters
            .iter()
            .map(|&(a, b)| ordered_pair(rekey(a), rekey(b)))
            .filter(|&(a, b)| a != b)
            .collect();
        // A cached "true" survives the merge; conflicting verdicts resolve
        // in favor of the positive one.
        let mut cache = HashMap::new();
        for (&(a, b), &v) in &self.acronym_cache {
            let (a, b) = ordered_pair(rekey(a), rekey(b));
            if a == b {
                continue;
            }
            let slot = cache.entry((a, b)).or_insert(v);
            *slot = *slot || v;
        }
        self.acronym_cache = cache;
    }

}

fn ordered_pair<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Sort one sentence's mention ids into document order: by span start and
/// end, then swap adjacent mentions sharing a start and head so the longer
/// span comes first.
fn sort_document_order(ids: &mut [MentionId], mentions: &HashMap<MentionId, Mention>) {
    ids.sort_by_key(|id| {
        let m = &mentions[id];
        (m.span.start, m.span.end, m.head_index)
    });
    loop {
        let mut changed = false;
        for i in 0..ids.len().saturating_sub(1) {
            let a = &mentions[&ids[i]];
            let b = &mentions[&ids[i + 1]];
            if a.span.start == b.span.start
                && a.head_index == b.head_index
                && a.span.end < b.span.end
            {
                ids.swap(i, i + 1);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
