//! Coreference scorers: MUC, B-cubed, and pairwise links.
//!
//! Each scorer produces incremental [`ScoreCounts`] so corpus-level figures
//! are sums of per-document numerators and denominators, never averages of
//! per-document F1.

use crate::document::Document;
use crate::mention::{ClusterId, MentionId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ============================================================================
// Counts
// ============================================================================

/// Numerators and denominators for one scorer, addable across documents.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreCounts {
    /// Precision numerator.
    pub precision_num: f64,
    /// Precision denominator.
    pub precision_den: f64,
    /// Recall numerator.
    pub recall_num: f64,
    /// Recall denominator.
    pub recall_den: f64,
}

impl ScoreCounts {
    /// Accumulate another document's counts.
    pub fn add(&mut self, other: &ScoreCounts) {
        self.precision_num += other.precision_num;
        self.precision_den += other.precision_den;
        self.recall_num += other.recall_num;
        self.recall_den += other.recall_den;
    }

    /// Precision; 0 when nothing was predicted.
    #[must_use]
    pub fn precision(&self) -> f64 {
        self.check();
        if self.precision_den == 0.0 { 0.0 } else { self.precision_num / self.precision_den }
    }

    /// Recall; 0 when there is no gold.
    #[must_use]
    pub fn recall(&self) -> f64 {
        self.check();
        if self.recall_den == 0.0 { 0.0 } else { self.recall_num / self.recall_den }
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    fn check(&self) {
        if self.precision_num > self.precision_den || self.recall_num > self.recall_den {
            debug_assert!(false, "scorer numerator exceeds denominator: {self:?}");
            log::warn!("scorer numerator exceeds denominator: {self:?}");
        }
    }
}

/// A document-level scorer.
pub trait Scorer {
    /// Score the document's predicted clusters against its gold clusters.
    fn score(&self, doc: &Document) -> ScoreCounts;
}

/// `n * (n - 1) / 2`, with zero members yielding zero links.
#[must_use]
pub fn pairwise_links(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

// ============================================================================
// Cluster views
// ============================================================================

/// Scoring only considers gold-annotated mentions; predicted clusters are
/// restricted to those, and gold clusters come straight from the document.
fn aligned_clusters(
    doc: &Document,
) -> (Vec<BTreeSet<MentionId>>, Vec<BTreeSet<MentionId>>, HashMap<MentionId, usize>, HashMap<MentionId, usize>) {
    let annotated: BTreeSet<MentionId> = doc
        .gold_clusters
        .values()
        .flat_map(|c| c.iter().copied())
        .collect();

    let mut predicted_map: BTreeMap<ClusterId, BTreeSet<MentionId>> = BTreeMap::new();
    for &id in &annotated {
        let cluster = doc.mention(id).coref_cluster_id;
        predicted_map.entry(cluster).or_default().insert(id);
    }
    let predicted: Vec<BTreeSet<MentionId>> = predicted_map.into_values().collect();
    let gold: Vec<BTreeSet<MentionId>> = doc.gold_clusters.values().cloned().collect();

    let index = |clusters: &[BTreeSet<MentionId>]| {
        let mut idx = HashMap::new();
        for (i, c) in clusters.iter().enumerate() {
            for &m in c {
                idx.insert(m, i);
            }
        }
        idx
    };
    let predicted_idx = index(&predicted);
    let gold_idx = index(&gold);
    (predicted, gold, predicted_idx, gold_idx)
}

/// Number of distinct partitions a key cluster is split into by the
/// response side, counting unaligned mentions as singleton partitions.
fn partitions(key: &BTreeSet<MentionId>, response_idx: &HashMap<MentionId, usize>) -> usize {
    let mut seen = BTreeSet::new();
    let mut unaligned = 0usize;
    for m in key {
        match response_idx.get(m) {
            Some(i) => {
                seen.insert(*i);
            }
            None => unaligned += 1,
        }
    }
    seen.len() + unaligned
}

// ============================================================================
// MUC
// ============================================================================

/// Link-based MUC score.
#[derive(Debug, Clone, Copy, Default)]
pub struct MucScorer;

impl Scorer for MucScorer {
    fn score(&self, doc: &Document) -> ScoreCounts {
        let (predicted, gold, predicted_idx, gold_idx) = aligned_clusters(doc);
        let side = |key: &[BTreeSet<MentionId>], response_idx: &HashMap<MentionId, usize>| {
            let mut num = 0.0;
            let mut den = 0.0;
            for cluster in key {
                if cluster.len() < 2 {
                    continue;
                }
                num += (cluster.len() - partitions(cluster, response_idx)) as f64;
                den += (cluster.len() - 1) as f64;
            }
            (num, den)
        };
        let (recall_num, recall_den) = side(&gold, &predicted_idx);
        let (precision_num, precision_den) = side(&predicted, &gold_idx);
        ScoreCounts { precision_num, precision_den, recall_num, recall_den }
    }
}

// ============================================================================
// B-cubed
// ============================================================================

/// Mention-based B-cubed score.
#[derive(Debug, Clone, Copy, Default)]
pub struct BCubedScorer;

impl Scorer for BCubedScorer {
    fn score(&self, doc: &Document) -> ScoreCounts {
        let (predicted, gold, predicted_idx, gold_idx) = aligned_clusters(doc);
        let mut counts = ScoreCounts::default();
        for g in &gold {
            for m in g {
                counts.recall_den += 1.0;
                if let Some(&p_i) = predicted_idx.get(m) {
                    let overlap = predicted[p_i].intersection(g).count() as f64;
                    counts.recall_num += overlap / g.len() as f64;
                } else {
                    counts.recall_num += 1.0 / g.len() as f64;
                }
            }
        }
        for p in &predicted {
            for m in p {
                counts.precision_den += 1.0;
                if let Some(&g_i) = gold_idx.get(m) {
                    let overlap = p.intersection(&gold[g_i]).count() as f64;
                    counts.precision_num += overlap / p.len() as f64;
                } else {
                    counts.precision_num += 1.0 / p.len() as f64;
                }
            }
        }
        counts
    }
}

// ============================================================================
// Pairwise
// ============================================================================

/// Pairwise-link score: every within-cluster pair is one link.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseScorer;

impl Scorer for PairwiseScorer {
    fn score(&self, doc: &Document) -> ScoreCounts {
        let (predicted, gold, predicted_idx, _) = aligned_clusters(doc);
        let mut correct = 0usize;
        for g in &gold {
            let members: Vec<MentionId> = g.iter().copied().collect();
            for i in 0..members.len() {
                for j in i + 1..members.len() {
                    if let (Some(a), Some(b)) =
                        (predicted_idx.get(&members[i]), predicted_idx.get(&members[j]))
                    {
                        if a == b {
                            correct += 1;
                        }
                    }
                }
            }
        }
        let predicted_pairs: usize = predicted.iter().map(|c| pairwise_links(c.len())).sum();
        let gold_pairs: usize = gold.iter().map(|c| pairwise_links(c.len())).sum();
        ScoreCounts {
            precision_num: correct as f64,
            precision_den: predicted_pairs as f64,
            recall_num: correct as f64,
            recall_den: gold_pairs as f64,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
