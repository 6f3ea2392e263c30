//! Greedy search over pass orderings.
//!
//! Forward selection: grow the ordering one pass at a time, scoring every
//! admissible extension on a held-out corpus and keeping the best. Candidate
//! scoring fans out over worker threads; a candidate that fails to report
//! within the deadline aborts the search with [`Error::JobTimeout`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, RecvTimeoutError};

use crate::config::CorefConfig;
use crate::dict::Dictionaries;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::metrics::{PairwiseScorer, ScoreCounts, Scorer};
use crate::resolver::SieveResolver;
use crate::sieve::SieveKind;

const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(600);

/// `before` must precede `after` in any ordering the optimizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderConstraint {
    /// The earlier pass.
    pub before: SieveKind,
    /// The later pass.
    pub after: SieveKind,
}

/// Scores a complete or partial pass ordering. Implementations run from
/// worker threads.
pub trait OrderingScorer: Send + Sync {
    /// The ordering's quality; higher is better.
    fn score(&self, order: &[SieveKind]) -> Result<f64>;
}

/// Greedy forward-selection optimizer.
pub struct SieveOrderOptimizer {
    scorer: Arc<dyn OrderingScorer>,
    constraints: Vec<OrderConstraint>,
    firsts: Vec<SieveKind>,
    lasts: Vec<SieveKind>,
    timeout: Duration,
}

impl SieveOrderOptimizer {
    /// Optimizer with no constraints and the default deadline.
    #[must_use]
    pub fn new(scorer: Arc<dyn OrderingScorer>) -> Self {
        SieveOrderOptimizer {
            scorer,
            constraints: Vec::new(),
            firsts: Vec::new(),
            lasts: Vec::new(),
            timeout: DEFAULT_JOB_TIMEOUT,
        }
    }

    /// Require `before` to precede `after`.
    #[must_use]
    pub fn with_constraint(mut self, before: SieveKind, after: SieveKind) -> Self {
        self.constraints.push(OrderConstraint { before, after });
        self
    }

    /// Require `kind` to precede every other pass in the pool.
    #[must_use]
    pub fn with_first(mut self, kind: SieveKind) -> Self {
        self.firsts.push(kind);
        self
    }

    /// Require `kind` to follow every other pass in the pool.
    #[must_use]
    pub fn with_last(mut self, kind: SieveKind) -> Self {
        self.lasts.push(kind);
        self
    }

    /// Per-step deadline for all candidate scores to come back.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Find a good ordering of `pool`. Returns the ordering and its final
    /// score. Ties keep the candidate encountered first, so results are
    /// deterministic for a deterministic scorer.
    pub fn optimize(&self, pool: &[SieveKind]) -> Result<(Vec<SieveKind>, f64)> {
        if pool.is_empty() {
            return Err(Error::config("empty sieve pool"));
        }
        let constraints = self.expanded_constraints(pool);
        let mut prefix: Vec<SieveKind> = Vec::with_capacity(pool.len());
        let mut remaining: Vec<SieveKind> = pool.to_vec();
        let mut best_score = f64::NEG_INFINITY;

        while !remaining.is_empty() {
            let admissible: Vec<SieveKind> = remaining
                .iter()
                .copied()
                .filter(|&k| admissible(&constraints, &prefix, k))
                .collect();
            if admissible.is_empty() {
                return Err(Error::config(format!(
                    "ordering constraints form a cycle over {remaining:?}"
                )));
            }
            let scores = self.score_candidates(&prefix, &admissible)?;
            let (winner_idx, winner_score) = scores
                .iter()
                .enumerate()
                .fold((0usize, f64::NEG_INFINITY), |(bi, bs), (i, &s)| {
                    if s > bs { (i, s) } else { (bi, bs) }
                });
            let winner = admissible[winner_idx];
            log::debug!(
                "step {}: chose {} (score {winner_score:.4})",
                prefix.len() + 1,
                winner.name()
            );
            prefix.push(winner);
            remaining.retain(|&k| k != winner);
            best_score = winner_score;
        }
        Ok((prefix, best_score))
    }

    /// Pairwise constraints plus the first/last markers expanded against the
    /// pool. Passes marked first (or last) stay unordered among themselves.
    fn expanded_constraints(&self, pool: &[SieveKind]) -> Vec<OrderConstraint> {
        let mut out = self.constraints.clone();
        for &f in &self.firsts {
            for &k in pool {
                if k != f && !self.firsts.contains(&k) {
                    out.push(OrderConstraint { before: f, after: k });
                }
            }
        }
        for &l in &self.lasts {
            for &k in pool {
                if k != l && !self.lasts.contains(&k) {
                    out.push(OrderConstraint { before: k, after: l });
                }
            }
        }
        out
    }

    /// Score every extension of the prefix in parallel. Workers run
    /// detached so a stalled scorer cannot hold the search past the
    /// deadline: on timeout the caller returns at once and any straggler's
    /// send lands in a closed channel.
    fn score_candidates(&self, prefix: &[SieveKind], candidates: &[SieveKind]) -> Result<Vec<f64>> {
        let (tx, rx) = unbounded::<(usize, Result<f64>)>();
        let deadline = Instant::now() + self.timeout;
        for (i, &candidate) in candidates.iter().enumerate() {
            let tx = tx.clone();
            let scorer = Arc::clone(&self.scorer);
            let mut order = prefix.to_vec();
            order.push(candidate);
            std::thread::spawn(move || {
                let result = scorer.score(&order);
                let _ = tx.send((i, result));
            });
        }
        drop(tx);

        let mut scores = vec![f64::NAN; candidates.len()];
        for _ in 0..candidates.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((i, Ok(score))) => scores[i] = score,
                Ok((_, Err(e))) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(Error::JobTimeout(self.timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::job("scoring worker exited without reporting"));
                }
            }
        }
        Ok(scores)
    }
}

fn admissible(constraints: &[OrderConstraint], prefix: &[SieveKind], candidate: SieveKind) -> bool {
    constraints
        .iter()
        .filter(|c| c.after == candidate)
        .all(|c| prefix.contains(&c.before))
}

// ============================================================================
// Corpus scorer
// ============================================================================

/// Scores an ordering by resolving a fixed corpus with it and taking the
/// corpus-level pairwise F1.
pub struct CorpusScorer {
    dict: Dictionaries,
    base: CorefConfig,
    corpus: Vec<Document>,
}

impl CorpusScorer {
    /// A scorer over pre-built documents with gold annotations.
    #[must_use]
    pub fn new(dict: Dictionaries, base: CorefConfig, corpus: Vec<Document>) -> Self {
        CorpusScorer { dict, base, corpus }
    }
}

impl OrderingScorer for CorpusScorer {
    fn score(&self, order: &[SieveKind]) -> Result<f64> {
        if self.corpus.is_empty() {
            return Err(Error::scoring("empty tuning corpus"));
        }
        let config = CorefConfig { sieves: order.to_vec(), ..self.base.clone() };
        let resolver = SieveResolver::new(&self.dict, config)?;
        let mut total = ScoreCounts::default();
        for template in &self.corpus {
            let mut doc = template.clone();
            resolver.resolve(&mut doc)?;
            total.add(&PairwiseScorer.score(&doc));
        }
        Ok(total.f1())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores an ordering by how early the kinds in `prefer` appear.
    struct PositionScorer {
        prefer: Vec<SieveKind>,
    }

    impl OrderingScorer for PositionScorer {
        fn score(&self, order: &[SieveKind]) -> Result<f64> {
            let mut score = 0.0;
            for (pos, kind) in order.iter().enumerate() {
                if let Some(rank) = self.prefer.iter().position(|k| k == kind) {
                    score -= (pos as f64 - rank as f64).abs();
                }
            }
            Ok(score)
        }
    }

    struct FlatScorer;
    impl OrderingScorer for FlatScorer {
        fn score(&self, _order: &[SieveKind]) -> Result<f64> {
            Ok(0.0)
        }
    }

    struct StuckScorer;
    impl OrderingScorer for StuckScorer {
        fn score(&self, _order: &[SieveKind]) -> Result<f64> {
            std::thread::sleep(Duration::from_secs(2));
            Ok(0.0)
        }
    }

    const POOL: [SieveKind; 3] = [
        SieveKind::ExactStringMatch,
        SieveKind::RelaxedStringMatch,
        SieveKind::PronounMatch,
    ];

    fn preferring(prefer: &[SieveKind]) -> Arc<PositionScorer> {
        Arc::new(PositionScorer { prefer: prefer.to_vec() })
    }

    #[test]
    fn recovers_the_preferred_order() {
        let prefer = [
            SieveKind::PronounMatch,
            SieveKind::ExactStringMatch,
            SieveKind::RelaxedStringMatch,
        ];
        let optimizer = SieveOrderOptimizer::new(preferring(&prefer));
        let (order, _) = optimizer.optimize(&POOL).unwrap();
        assert_eq!(order, prefer.to_vec());
    }

    #[test]
    fn ties_keep_encounter_order() {
        let optimizer = SieveOrderOptimizer::new(Arc::new(FlatScorer));
        let (order, score) = optimizer.optimize(&POOL).unwrap();
        assert_eq!(order, POOL.to_vec());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn constraints_are_respected_even_against_the_scorer() {
        let prefer = [
            SieveKind::PronounMatch,
            SieveKind::ExactStringMatch,
            SieveKind::RelaxedStringMatch,
        ];
        let optimizer = SieveOrderOptimizer::new(preferring(&prefer))
            .with_constraint(SieveKind::ExactStringMatch, SieveKind::PronounMatch);
        let (order, _) = optimizer.optimize(&POOL).unwrap();
        let exact = order.iter().position(|&k| k == SieveKind::ExactStringMatch).unwrap();
        let pronoun = order.iter().position(|&k| k == SieveKind::PronounMatch).unwrap();
        assert!(exact < pronoun);
    }

    #[test]
    fn first_and_last_markers_pin_the_ends() {
        let prefer = [
            SieveKind::PronounMatch,
            SieveKind::ExactStringMatch,
            SieveKind::RelaxedStringMatch,
        ];
        let optimizer = SieveOrderOptimizer::new(preferring(&prefer))
            .with_first(SieveKind::ExactStringMatch)
            .with_last(SieveKind::PronounMatch);
        let (order, _) = optimizer.optimize(&POOL).unwrap();
        assert_eq!(order[0], SieveKind::ExactStringMatch);
        assert_eq!(order[2], SieveKind::PronounMatch);
    }

    #[test]
    fn contradictory_constraints_fail() {
        let optimizer = SieveOrderOptimizer::new(Arc::new(FlatScorer))
            .with_constraint(SieveKind::ExactStringMatch, SieveKind::PronounMatch)
            .with_constraint(SieveKind::PronounMatch, SieveKind::ExactStringMatch);
        assert!(optimizer.optimize(&POOL).is_err());
    }

    #[test]
    fn slow_candidates_time_out_promptly() {
        let timeout = Duration::from_millis(50);
        let optimizer = SieveOrderOptimizer::new(Arc::new(StuckScorer)).with_timeout(timeout);
        let started = Instant::now();
        match optimizer.optimize(&POOL) {
            Err(Error::JobTimeout(t)) => assert_eq!(t, timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
        // The stuck workers sleep two seconds; the caller must not wait
        // for them.
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn corpus_scorer_prefers_orders_that_link_gold_pairs() {
        use crate::input::{MentionCandidate, SentenceInput};
        use crate::mention::{Span, Token};

        let dict = Dictionaries::default();
        let sentences = vec![
            SentenceInput::new(
                vec![Token::new("Ada", "NNP", "PERSON")],
                vec![MentionCandidate::new(1, Span::new(0, 1), 0).with_gold(5)],
            ),
            SentenceInput::new(
                vec![Token::new("Ada", "NNP", "PERSON")],
                vec![MentionCandidate::new(2, Span::new(0, 1), 0).with_gold(5)],
            ),
        ];
        let doc = Document::build(sentences, &dict, None).unwrap();
        let scorer = CorpusScorer::new(dict, CorefConfig::default(), vec![doc]);

        let with_exact = scorer.score(&[SieveKind::ExactStringMatch]).unwrap();
        let without = scorer.score(&[SieveKind::PronounMatch]).unwrap();
        assert!((with_exact - 1.0).abs() < 1e-9);
        assert_eq!(without, 0.0);

        let optimizer = SieveOrderOptimizer::new(Arc::new(scorer));
        let (order, score) = optimizer
            .optimize(&[SieveKind::PronounMatch, SieveKind::ExactStringMatch])
            .unwrap();
        assert_eq!(order[0], SieveKind::ExactStringMatch);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_pool_is_a_config_error() {
        let optimizer = SieveOrderOptimizer::new(Arc::new(FlatScorer));
        assert!(matches!(optimizer.optimize(&[]), Err(Error::Config(_))));
    }
}
