//! Coreference clusters.
//!
//! A [`CorefCluster`] is a set of mention ids plus aggregate attribute
//! sets. Aggregates are full unions over the members, `Unknown` included:
//! members may legitimately disagree, and a cluster holding an `Unknown`
//! member must stay a wildcard side in agreement checks.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::mention::{
    Animacy, ClusterId, Gender, Mention, MentionId, Number,
};

/// One cluster of mentions believed to corefer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefCluster {
    /// Cluster id. Seed clusters use their founding mention's id.
    pub id: ClusterId,
    /// Member mention ids, ordered for deterministic iteration.
    pub mentions: BTreeSet<MentionId>,
    /// Union of member numbers, `Unknown` included.
    pub numbers: HashSet<Number>,
    /// Union of member genders, `Unknown` included.
    pub genders: HashSet<Gender>,
    /// Union of member animacies, `Unknown` included.
    pub animacies: HashSet<Animacy>,
    /// Union of member NER labels, `O`/`MISC` included.
    pub ner_strings: HashSet<String>,
    /// The most representative member.
    pub representative: MentionId,
}

impl CorefCluster {
    /// Singleton cluster seeded from one mention; the cluster id is the
    /// mention id.
    #[must_use]
    pub fn singleton(mention: &Mention) -> Self {
        let mut cluster = CorefCluster {
            id: mention.id,
            mentions: BTreeSet::new(),
            numbers: HashSet::new(),
            genders: HashSet::new(),
            animacies: HashSet::new(),
            ner_strings: HashSet::new(),
            representative: mention.id,
        };
        cluster.mentions.insert(mention.id);
        cluster.absorb_attributes(mention);
        cluster
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// True when the cluster has exactly one member.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.mentions.len() == 1
    }

    /// True when the cluster has no members (only after post-processing
    /// detaches them).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// First member in document order, given the mention table.
    #[must_use]
    pub fn first_mention(&self, mentions: &HashMap<MentionId, Mention>) -> Option<MentionId> {
        let mut best: Option<&Mention> = None;
        for id in &self.mentions {
            let m = &mentions[id];
            if best.map_or(true, |b| m.appears_earlier_than(b)) {
                best = Some(m);
            }
        }
        best.map(|m| m.id)
    }

    /// Fold one mention's attributes into the aggregates. Wildcard values
    /// enter too: agreement checks must see that a member was `Unknown`.
    fn absorb_attributes(&mut self, mention: &Mention) {
        self.numbers.insert(mention.number);
        self.genders.insert(mention.gender);
        self.animacies.insert(mention.animacy);
        self.ner_strings.insert(mention.ner_string.clone());
    }

    /// Merge `absorbed` into `self`. Aggregates become unions; every moved
    /// mention's `coref_cluster_id` is repointed at `self`; the
    /// representative is upgraded if the absorbed cluster had a better one.
    /// The absorbed cluster's table entry must be removed by the caller.
    pub fn absorb(&mut self, absorbed: &CorefCluster, mentions: &mut HashMap<MentionId, Mention>) {
        for id in &absorbed.mentions {
            self.mentions.insert(*id);
            if let Some(m) = mentions.get_mut(id) {
                m.coref_cluster_id = self.id;
            }
        }
        self.numbers.extend(absorbed.numbers.iter().copied());
        self.genders.extend(absorbed.genders.iter().copied());
        self.animacies.extend(absorbed.animacies.iter().copied());
        self.ner_strings.extend(absorbed.ner_strings.iter().cloned());

        let current = &mentions[&self.representative];
        let challenger = &mentions[&absorbed.representative];
        if challenger.more_representative_than(current) {
            self.representative = absorbed.representative;
        }
    }

    /// Detach one mention (post-processing). Aggregates are left as-is;
    /// they are not consulted after the sieve passes.
    pub fn remove_mention(&mut self, id: MentionId) {
        self.mentions.remove(&id);
    }

    /// All distinct lowercased words across the members.
    #[must_use]
    pub fn words(&self, mentions: &HashMap<MentionId, Mention>) -> HashSet<String> {
        let mut out = HashSet::new();
        for id in &self.mentions {
            for tok in &mentions[id].tokens {
                out.insert(tok.word.to_lowercase());
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
