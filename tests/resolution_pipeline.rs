//! End-to-end resolution over small annotated documents.

use corefine::{
    CorefConfig, Dictionaries, DocType, Document, MentionCandidate, MucScorer, PairwiseScorer,
    Scorer, SentenceInput, SieveKind, SieveResolver, Span, Token,
};

fn tok(word: &str, pos: &str) -> Token {
    Token::new(word, pos, "O")
}

fn person(word: &str) -> Token {
    Token::new(word, "NNP", "PERSON")
}

#[test]
fn proper_name_and_pronoun_chain() {
    // "Sarah Connor arrived. Sarah Connor sat down. She smiled."
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![person("Sarah"), person("Connor"), tok("arrived", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 2), 1).with_gold(100)],
        ),
        SentenceInput::new(
            vec![person("Sarah"), person("Connor"), tok("sat", "VBD"), tok("down", "RP")],
            vec![MentionCandidate::new(2, Span::new(0, 2), 1).with_gold(100)],
        ),
        SentenceInput::new(
            vec![tok("She", "PRP"), tok("smiled", "VBD")],
            vec![MentionCandidate::new(3, Span::new(0, 1), 0).with_gold(100)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    let resolver = SieveResolver::new(&dict, CorefConfig::default()).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();

    assert_eq!(chains.len(), 1);
    let ids: Vec<u64> = chains[0].mentions.iter().map(|m| m.mention_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    // The proper name outranks the pronoun as representative.
    assert!(chains[0].mentions[0].representative);

    let muc = MucScorer.score(&doc);
    assert!((muc.f1() - 1.0).abs() < 1e-9);
    let pairwise = PairwiseScorer.score(&doc);
    assert!((pairwise.f1() - 1.0).abs() < 1e-9);
}

#[test]
fn pronoun_respects_gender_evidence() {
    // "Mrs. Lee arrived. He smiled." — counted gender data marks the name
    // female, so the male pronoun may not link.
    let dict =
        Dictionaries::default().with_gender_counts(vec![("lee", corefine::GenderCounts::new(0, 10, 0))]);
    let sentences = vec![
        SentenceInput::new(
            vec![person("Mrs."), person("Lee"), tok("arrived", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 2), 1)],
        ),
        SentenceInput::new(
            vec![tok("He", "PRP"), tok("smiled", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    let config = CorefConfig {
        sieves: vec![SieveKind::PronounMatch],
        remove_singletons: true,
        ..CorefConfig::default()
    };
    let resolver = SieveResolver::new(&dict, config).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();
    assert!(chains.is_empty());
}

#[test]
fn earlier_passes_feed_later_ones() {
    // Pass 1 links the two full names; the pronoun pass then sees a
    // two-mention cluster whose nearest member is in the previous sentence.
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![person("Marcus"), tok("spoke", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 1), 0)],
        ),
        SentenceInput::new(
            vec![person("Marcus"), tok("waited", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
        ),
        SentenceInput::new(
            vec![tok("He", "PRP"), tok("left", "VBD")],
            vec![MentionCandidate::new(3, Span::new(0, 1), 0)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    let config = CorefConfig {
        sieves: vec![SieveKind::ExactStringMatch, SieveKind::PronounMatch],
        ..CorefConfig::default()
    };
    let resolver = SieveResolver::new(&dict, config).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].mentions.len(), 3);
}

#[test]
fn speaker_pronouns_link_in_conversation() {
    // Utterance 1, spoken by mention 1 ("Anna"): "I agree."
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![person("Anna"), tok("said", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 1), 0)],
        ),
        SentenceInput::new(
            vec![tok("I", "PRP"), tok("agree", "VBP")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0).with_speaker("1", 1)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    assert_eq!(doc.doc_type, DocType::Conversation);
    assert!(doc.is_speaker_pair(2, 1));

    let config = CorefConfig {
        sieves: vec![SieveKind::DiscourseMatch],
        ..CorefConfig::default()
    };
    let resolver = SieveResolver::new(&dict, config).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();
    assert_eq!(chains.len(), 1);
    let ids: Vec<u64> = chains[0].mentions.iter().map(|m| m.mention_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn first_match_wins_over_a_farther_antecedent() {
    // Two candidate antecedents for the pronoun; the nearer sentence is
    // searched first, so the pronoun joins the later "Nadia".
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![person("Nadia"), tok("arrived", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 1), 0)],
        ),
        SentenceInput::new(
            vec![person("Priya"), tok("arrived", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
        ),
        SentenceInput::new(
            vec![tok("She", "PRP"), tok("waved", "VBD")],
            vec![MentionCandidate::new(3, Span::new(0, 1), 0)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    let config = CorefConfig {
        sieves: vec![SieveKind::PronounMatch],
        ..CorefConfig::default()
    };
    let resolver = SieveResolver::new(&dict, config).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();
    assert_eq!(chains.len(), 1);
    let ids: Vec<u64> = chains[0].mentions.iter().map(|m| m.mention_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn chains_serialize_to_json() {
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![person("Omar"), tok("spoke", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 1), 0)],
        ),
        SentenceInput::new(
            vec![person("Omar"), tok("left", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    let resolver = SieveResolver::new(&dict, CorefConfig::default()).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();
    let json = serde_json::to_string(&chains).unwrap();
    let back: Vec<corefine::CorefChain> = serde_json::from_str(&json).unwrap();
    assert_eq!(chains, back);
}

#[test]
fn acronyms_link_through_precise_constructs() {
    // "International Business Machines" / "IBM": capital-letter
    // subsequence, no verbatim containment.
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![
                Token::new("International", "NNP", "ORGANIZATION"),
                Token::new("Business", "NNP", "ORGANIZATION"),
                Token::new("Machines", "NNP", "ORGANIZATION"),
                tok("grew", "VBD"),
            ],
            vec![MentionCandidate::new(1, Span::new(0, 3), 2)],
        ),
        SentenceInput::new(
            vec![Token::new("IBM", "NNP", "ORGANIZATION"), tok("hired", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0)],
        ),
    ];
    let mut doc = Document::build(sentences, &dict, None).unwrap();
    let config = CorefConfig {
        sieves: vec![SieveKind::PreciseConstructs],
        ..CorefConfig::default()
    };
    let resolver = SieveResolver::new(&dict, config).unwrap();
    let chains = resolver.resolve(&mut doc).unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].mentions.len(), 2);
}

#[test]
fn all_singleton_prediction_scores_zero_without_crashing() {
    let dict = Dictionaries::default();
    let sentences = vec![
        SentenceInput::new(
            vec![person("Kim"), tok("ran", "VBD")],
            vec![MentionCandidate::new(1, Span::new(0, 1), 0).with_gold(9)],
        ),
        SentenceInput::new(
            vec![person("Lou"), tok("ran", "VBD")],
            vec![MentionCandidate::new(2, Span::new(0, 1), 0).with_gold(9)],
        ),
    ];
    // No passes run, so every mention stays a singleton.
    let doc = Document::build(sentences, &dict, None).unwrap();
    let s = PairwiseScorer.score(&doc);
    assert_eq!(s.recall(), 0.0);
    assert_eq!(s.precision(), 0.0);
    assert_eq!(s.f1(), 0.0);
}

#[test]
fn invalid_spans_are_rejected_up_front() {
    let dict = Dictionaries::default();
    let sentences = vec![SentenceInput::new(
        vec![tok("short", "JJ")],
        vec![MentionCandidate::new(1, Span::new(0, 5), 0)],
    )];
    assert!(Document::build(sentences, &dict, None).is_err());
}
