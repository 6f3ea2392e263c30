//! Property tests for the resolution loop and the scorers.

use proptest::prelude::*;

use corefine::{
    BCubedScorer, CorefConfig, Dictionaries, Document, MentionCandidate, MucScorer,
    PairwiseScorer, Scorer, SentenceInput, SieveResolver, Span, Token,
};

/// A small pool of names so that generated documents actually contain
/// repeated mentions.
const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "Dave"];
const PRONOUNS: [&str; 3] = ["he", "she", "it"];

#[derive(Debug, Clone)]
enum Word {
    Name(usize),
    Pronoun(usize),
}

fn word_strategy() -> impl Strategy<Value = Word> {
    prop_oneof![
        (0..NAMES.len()).prop_map(Word::Name),
        (0..PRONOUNS.len()).prop_map(Word::Pronoun),
    ]
}

/// One single-mention sentence per generated word; gold cluster is the
/// name index (pronouns get no gold).
fn build_doc(words: &[Word], dict: &Dictionaries) -> Document {
    let sentences: Vec<SentenceInput> = words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let id = (i + 1) as u64;
            let (token, cand) = match w {
                Word::Name(n) => (
                    Token::new(NAMES[*n], "NNP", "PERSON"),
                    MentionCandidate::new(id, Span::new(0, 1), 0).with_gold(*n as u64),
                ),
                Word::Pronoun(p) => (
                    Token::new(PRONOUNS[*p], "PRP", "O"),
                    MentionCandidate::new(id, Span::new(0, 1), 0),
                ),
            };
            SentenceInput::new(vec![token, Token::new("paused", "VBD", "O")], vec![cand])
        })
        .collect();
    Document::build(sentences, dict, None).unwrap()
}

proptest! {
    #[test]
    fn clusters_always_partition_the_mentions(
        words in prop::collection::vec(word_strategy(), 1..12)
    ) {
        let dict = Dictionaries::default();
        let mut doc = build_doc(&words, &dict);
        let resolver = SieveResolver::new(&dict, CorefConfig::default()).unwrap();
        resolver.resolve(&mut doc).unwrap();

        let mut seen = std::collections::HashSet::new();
        for cluster in doc.clusters.values() {
            for &m in &cluster.mentions {
                prop_assert!(seen.insert(m), "mention {m} appears in two clusters");
                prop_assert_eq!(doc.mention(m).coref_cluster_id, cluster.id);
            }
        }
        prop_assert_eq!(seen.len(), doc.mentions.len());
    }

    #[test]
    fn resolution_never_increases_cluster_count(
        words in prop::collection::vec(word_strategy(), 1..12)
    ) {
        let dict = Dictionaries::default();
        let mut doc = build_doc(&words, &dict);
        let initial = doc.clusters.len();
        let config = CorefConfig { post_process: false, ..CorefConfig::default() };
        let resolver = SieveResolver::new(&dict, config).unwrap();
        resolver.resolve(&mut doc).unwrap();
        prop_assert!(doc.clusters.len() <= initial);
    }

    #[test]
    fn resolution_is_deterministic(
        words in prop::collection::vec(word_strategy(), 1..12)
    ) {
        let dict = Dictionaries::default();
        let run = || {
            let mut doc = build_doc(&words, &dict);
            let resolver = SieveResolver::new(&dict, CorefConfig::default()).unwrap();
            resolver.resolve(&mut doc).unwrap()
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn identical_names_end_up_clustered(
        words in prop::collection::vec(word_strategy(), 2..12)
    ) {
        let dict = Dictionaries::default();
        let mut doc = build_doc(&words, &dict);
        let resolver = SieveResolver::new(&dict, CorefConfig::default()).unwrap();
        resolver.resolve(&mut doc).unwrap();

        for (i, a) in words.iter().enumerate() {
            for (j, b) in words.iter().enumerate().skip(i + 1) {
                if let (Word::Name(x), Word::Name(y)) = (a, b) {
                    if x == y {
                        let ma = doc.mention((i + 1) as u64).coref_cluster_id;
                        let mb = doc.mention((j + 1) as u64).coref_cluster_id;
                        prop_assert_eq!(ma, mb, "repeated name not clustered");
                    }
                }
            }
        }
    }

    #[test]
    fn scorer_figures_stay_in_unit_range(
        words in prop::collection::vec(word_strategy(), 1..12)
    ) {
        let dict = Dictionaries::default();
        let mut doc = build_doc(&words, &dict);
        let resolver = SieveResolver::new(&dict, CorefConfig::default()).unwrap();
        resolver.resolve(&mut doc).unwrap();

        for scorer in [&MucScorer as &dyn Scorer, &BCubedScorer, &PairwiseScorer] {
            let s = scorer.score(&doc);
            for v in [s.precision(), s.recall(), s.f1()] {
                prop_assert!((0.0..=1.0).contains(&v), "score {v} out of range");
            }
        }
    }

    #[test]
    fn gold_equals_prediction_scores_perfectly(
        assignment in prop::collection::vec(0u64..3, 2..10)
    ) {
        // Build gold clusters, then merge predictions to match them exactly.
        let dict = Dictionaries::default();
        let sentences: Vec<SentenceInput> = assignment
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                SentenceInput::new(
                    vec![Token::new("thing", "NN", "O")],
                    vec![MentionCandidate::new((i + 1) as u64, Span::new(0, 1), 0).with_gold(g)],
                )
            })
            .collect();
        let mut doc = Document::build(sentences, &dict, None).unwrap();
        let mut first_of: std::collections::HashMap<u64, u64> = std::collections::HashMap::new();
        for (i, &g) in assignment.iter().enumerate() {
            let id = (i + 1) as u64;
            if let Some(&anchor) = first_of.get(&g) {
                let to = doc.mention(anchor).coref_cluster_id;
                let from = doc.mention(id).coref_cluster_id;
                doc.merge_clusters(to, from);
            } else {
                first_of.insert(g, id);
            }
        }

        for scorer in [&MucScorer as &dyn Scorer, &BCubedScorer, &PairwiseScorer] {
            let s = scorer.score(&doc);
            prop_assert!((s.precision() - 1.0).abs() < 1e-9 || s.precision_den == 0.0);
            prop_assert!((s.recall() - 1.0).abs() < 1e-9 || s.recall_den == 0.0);
        }
    }
}
