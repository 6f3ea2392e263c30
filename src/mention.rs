//! Mention data model.
//!
//! A [`Mention`] is one detected reference to an entity: a token span in a
//! sentence together with its head and the grammatical attributes the
//! attribute resolver fills in. Mentions live in per-document tables and
//! refer to each other by [`MentionId`]; there are no cross-references
//! between mention structs themselves.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dict::Dictionaries;

/// Identifier of a mention, unique within a document.
pub type MentionId = u64;

/// Identifier of a cluster, unique within a document.
///
/// Clusters are seeded one per mention with `cluster id == mention id`, so
/// the two id spaces coincide at the start of resolution.
pub type ClusterId = u64;

// ============================================================================
// Tokens and spans
// ============================================================================

/// One token of a sentence, with the annotations mentions consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form.
    pub word: String,
    /// Part-of-speech tag (Penn Treebank style: `NN`, `NNS`, `NNP`, `PRP`, ...).
    pub pos: String,
    /// Named-entity label (`PERSON`, `ORGANIZATION`, `LOCATION`, ..., `O` for none).
    pub ner: String,
    /// Lemma. Empty means "use the lowercased surface form".
    pub lemma: String,
}

impl Token {
    /// Create a token with the given word, POS tag, and NER label.
    #[must_use]
    pub fn new(word: impl Into<String>, pos: impl Into<String>, ner: impl Into<String>) -> Self {
        Token {
            word: word.into(),
            pos: pos.into(),
            ner: ner.into(),
            lemma: String::new(),
        }
    }

    /// Lemma if annotated, otherwise the lowercased surface form.
    #[must_use]
    pub fn lemma_or_lower(&self) -> String {
        if self.lemma.is_empty() {
            self.word.to_lowercase()
        } else {
            self.lemma.clone()
        }
    }
}

/// A half-open token-index range `[start, end)` within one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// First token index (inclusive).
    pub start: usize,
    /// One past the last token index (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a span. `start` must be strictly less than `end`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `self` lies entirely within `other`.
    #[must_use]
    pub fn contained_in(&self, other: &Span) -> bool {
        other.start <= self.start && self.end <= other.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Attribute enums
// ============================================================================

/// Syntactic category of a mention.
///
/// Ordered by representativeness: a PROPER mention is a better cluster
/// representative than a NOMINAL one, which beats LIST and PRONOMINAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentionType {
    /// Pronoun.
    Pronominal,
    /// Coordinated list of mentions ("Alice, Bob and Carol").
    List,
    /// Common-noun phrase.
    Nominal,
    /// Proper-noun phrase.
    Proper,
}

impl MentionType {
    fn representativeness(self) -> u8 {
        match self {
            MentionType::Proper => 4,
            MentionType::Nominal => 3,
            MentionType::List => 2,
            MentionType::Pronominal => 1,
        }
    }
}

/// Grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Number {
    /// Singular.
    Singular,
    /// Plural.
    Plural,
    /// Undetermined. Acts as a wildcard in agreement checks.
    Unknown,
}

/// Grammatical / natural gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Neutral.
    Neutral,
    /// Undetermined. Acts as a wildcard in agreement checks.
    Unknown,
}

/// Animacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animacy {
    /// Animate.
    Animate,
    /// Inanimate.
    Inanimate,
    /// Undetermined. Acts as a wildcard in agreement checks.
    Unknown,
}

/// Grammatical person, for pronouns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Person {
    /// First person singular.
    I,
    /// Second person.
    You,
    /// Third person masculine singular.
    He,
    /// Third person feminine singular.
    She,
    /// First person plural.
    We,
    /// Third person plural.
    They,
    /// Third person neuter singular.
    It,
    /// Not a pronoun, or undetermined.
    Unknown,
}

// ============================================================================
// Mention
// ============================================================================

/// One mention: an annotated token span plus resolved attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    /// Document-unique id.
    pub id: MentionId,
    /// Index of the sentence the mention occurs in.
    pub sent_idx: usize,
    /// Token span within the sentence.
    pub span: Span,
    /// Sentence-absolute index of the head token. Always within `span`
    /// after attribute resolution (out-of-span heads fall back to the
    /// span end).
    pub head_index: usize,
    /// The mention's own tokens, a copy of `sentence[span]`.
    pub tokens: Vec<Token>,

    /// Syntactic category.
    pub mention_type: MentionType,
    /// Grammatical number.
    pub number: Number,
    /// Gender.
    pub gender: Gender,
    /// Animacy.
    pub animacy: Animacy,
    /// Person (pronouns only; `Unknown` otherwise).
    pub person: Person,
    /// NER label of the head token (`O` for none).
    pub ner_string: String,
    /// Lowercased head word, with corporate suffixes stripped for
    /// NE-labelled heads.
    pub head_string: String,

    /// Grammatical role: subject of its governing verb.
    pub is_subject: bool,
    /// Grammatical role: direct object.
    pub is_direct_object: bool,
    /// Grammatical role: indirect object.
    pub is_indirect_object: bool,
    /// Grammatical role: object of a preposition.
    pub is_preposition_object: bool,
    /// Sentence-absolute token index of the governing verb, if any.
    pub governing_verb: Option<usize>,

    /// Marked generic ("you" as generic second person, bare plurals, ...).
    pub generic: bool,
    /// Predicted to remain a singleton by an external classifier.
    pub is_singleton: bool,

    /// Current cluster assignment. Starts equal to `id`.
    pub coref_cluster_id: ClusterId,
    /// Gold cluster id, when gold annotations are available.
    pub gold_cluster_id: Option<ClusterId>,

    /// Mentions in apposition with this one.
    pub appositions: HashSet<MentionId>,
    /// Mentions that are predicate nominatives of this one.
    pub predicate_nominatives: HashSet<MentionId>,
    /// Relative pronouns whose antecedent is this mention.
    pub relative_pronouns: HashSet<MentionId>,

    /// Speaker of the utterance containing this mention.
    pub speaker: Option<String>,
    /// Utterance number (0 for single-speaker articles).
    pub utterance: u32,
}

impl Mention {
    /// Head token of the mention.
    ///
    /// # Panics
    /// Panics if `head_index` lies outside the span; the document builder
    /// guarantees it does not.
    #[must_use]
    pub fn head_token(&self) -> &Token {
        &self.tokens[self.head_index - self.span.start]
    }

    /// Head word, as written.
    #[must_use]
    pub fn head_word(&self) -> &str {
        &self.head_token().word
    }

    /// The full span as a space-joined string.
    #[must_use]
    pub fn span_string(&self) -> String {
        let words: Vec<&str> = self.tokens.iter().map(|t| t.word.as_str()).collect();
        words.join(" ")
    }

    /// Lowercased span string.
    #[must_use]
    pub fn lowercase_span(&self) -> String {
        self.span_string().to_lowercase()
    }

    /// True for pronominal mentions.
    #[must_use]
    pub fn is_pronominal(&self) -> bool {
        self.mention_type == MentionType::Pronominal
    }

    /// The span truncated at the first comma or WH-word strictly after the
    /// head, space-joined. Used by relaxed string matching to drop relative
    /// clauses and parentheticals.
    #[must_use]
    pub fn remove_phrase_after_head(&self) -> String {
        let head_off = self.head_index - self.span.start;
        let mut cut = self.tokens.len();
        for (i, tok) in self.tokens.iter().enumerate().skip(head_off + 1) {
            if tok.pos == "," || tok.pos.starts_with('W') {
                cut = i;
                break;
            }
        }
        let words: Vec<&str> = self.tokens[..cut].iter().map(|t| t.word.as_str()).collect();
        words.join(" ")
    }

    /// True when `self` is nested inside `other` in the same sentence.
    /// A span does not count as inside itself.
    #[must_use]
    pub fn inside_in(&self, other: &Mention) -> bool {
        self.sent_idx == other.sent_idx
            && self.span != other.span
            && self.span.contained_in(&other.span)
    }

    /// True when `self` occurs strictly before `other` in document order
    /// (sentence, then span start, then span end, then head index).
    #[must_use]
    pub fn appears_earlier_than(&self, other: &Mention) -> bool {
        (self.sent_idx, self.span.start, self.span.end, self.head_index)
            < (other.sent_idx, other.span.start, other.span.end, other.head_index)
    }

    /// True when `self` is a better cluster representative than `other`:
    /// higher mention-type representativeness wins, then a real NE label
    /// beats `O`/`MISC`, then a longer start-to-head stretch, then the
    /// earlier sentence, then the earlier head, then the longer span.
    #[must_use]
    pub fn more_representative_than(&self, other: &Mention) -> bool {
        let a = self.mention_type.representativeness();
        let b = other.mention_type.representativeness();
        if a != b {
            return a > b;
        }
        let self_ne = self.ner_string != "O" && self.ner_string != "MISC";
        let other_ne = other.ner_string != "O" && other.ner_string != "MISC";
        if self_ne != other_ne {
            return self_ne;
        }
        let self_stretch = self.head_index - self.span.start;
        let other_stretch = other.head_index - other.span.start;
        if self_stretch != other_stretch {
            return self_stretch > other_stretch;
        }
        if self.sent_idx != other.sent_idx {
            return self.sent_idx < other.sent_idx;
        }
        if self.head_index != other.head_index {
            return self.head_index < other.head_index;
        }
        self.span.len() > other.span.len()
    }

    /// Head agreement: equal head strings, or — for mentions with the same
    /// non-`O` NE label — one proper head word includes the other (equality
    /// or a shared prefix longer than two characters on `NNP` tokens).
    #[must_use]
    pub fn heads_agree(&self, other: &Mention) -> bool {
        if self.head_string == other.head_string {
            return true;
        }
        if self.ner_string != "O"
            && other.ner_string != "O"
            && self.ner_string == other.ner_string
        {
            let (longer, shorter) = if self.tokens.len() > other.tokens.len() {
                (self, other)
            } else {
                (other, self)
            };
            return shorter
                .tokens
                .iter()
                .filter(|t| t.pos == "NNP")
                .all(|t| longer.tokens.iter().any(|l| proper_word_included(&t.word, &l.word)));
        }
        false
    }

    /// Distinct named-entity chunk strings of the sentence containing the
    /// mention, in order of first occurrence.
    #[must_use]
    pub fn ne_context(&self, sentence: &[Token]) -> Vec<String> {
        ne_chunks(sentence)
    }

    /// Named-entity chunk strings among the mention's premodifiers (tokens
    /// between the span start and the head).
    #[must_use]
    pub fn premodifier_ne_context(&self) -> Vec<String> {
        let head_off = self.head_index - self.span.start;
        ne_chunks(&self.tokens[..head_off])
    }

    /// Premodifier tokens: everything before the head, minus determiners,
    /// cardinal numbers, and punctuation.
    #[must_use]
    pub fn premodifiers(&self) -> Vec<&Token> {
        let head_off = self.head_index - self.span.start;
        self.tokens[..head_off]
            .iter()
            .filter(|t| t.pos != "DT" && t.pos != "CD" && t.pos.chars().any(|c| c.is_alphabetic()))
            .collect()
    }

    /// Role-appositive check: `self` names a role of `other`, as in
    /// "[[actress] Rebecca Schaeffer]". `self` must be nominal and animate,
    /// must not be a location, must prefix `other`'s span, and the two must
    /// not disagree in gender or number.
    #[must_use]
    pub fn is_role_appositive(&self, other: &Mention, dict: &Dictionaries) -> bool {
        if self.is_pronominal() || self.mention_type == MentionType::Proper {
            return false;
        }
        if other.ner_string != "PERSON" && !other.ner_string.starts_with("PER") {
            return false;
        }
        if self.animacy == Animacy::Inanimate {
            return false;
        }
        if self.ner_string == "LOCATION" || dict.demonyms.contains(&self.lowercase_span()) {
            return false;
        }
        if self.gender != Gender::Unknown
            && other.gender != Gender::Unknown
            && self.gender != other.gender
        {
            return false;
        }
        if self.number != Number::Unknown
            && other.number != Number::Unknown
            && self.number != other.number
        {
            return false;
        }
        // "[[actress] Rebecca]" : the role span starts the person span and
        // ends right before it continues.
        self.sent_idx == other.sent_idx
            && self.span.start == other.span.start
            && self.span.end < other.span.end
    }

    /// Demonym check: one mention names a place and the other its people
    /// ("Australia" / "Australian"). State abbreviations are canonicalized
    /// case-sensitively; demonym lookup is case-insensitive; a leading
    /// "the " is stripped first.
    #[must_use]
    pub fn is_demonym(&self, other: &Mention, dict: &Dictionaries) -> bool {
        let norm = |m: &Mention| -> String {
            let mut s = m.span_string();
            if let Some(rest) = s.strip_prefix("the ") {
                s = rest.to_string();
            } else if let Some(rest) = s.strip_prefix("The ") {
                s = rest.to_string();
            }
            if let Some(canon) = dict.states_abbreviation.get(&s) {
                s = canon.clone();
            }
            s.to_lowercase()
        };
        let a = norm(self);
        let b = norm(other);
        if a.is_empty() || b.is_empty() || a == b {
            return false;
        }
        dict.demonym_pairs
            .get(&a)
            .map_or(false, |set| set.contains(&b))
            || dict
                .demonym_pairs
                .get(&b)
                .map_or(false, |set| set.contains(&a))
    }

    /// Four string patterns of increasing specificity, used as keys into
    /// the coreference frequency tables: head lemma; last premodifier plus
    /// head; all premodifiers plus head; the full span with NE chunks
    /// collapsed into placeholders.
    #[must_use]
    pub fn split_patterns(&self) -> [String; 4] {
        let head = self.head_token().lemma_or_lower();
        let premods: Vec<String> =
            self.premodifiers().iter().map(|t| t.lemma_or_lower()).collect();
        let with_last = match premods.last() {
            Some(last) => format!("{last} {head}"),
            None => head.clone(),
        };
        let with_all = if premods.is_empty() {
            head.clone()
        } else {
            format!("{} {head}", premods.join(" "))
        };

        let mut full: Vec<String> = Vec::new();
        let mut last_ner = "O";
        for tok in &self.tokens {
            if tok.ner != "O" {
                if tok.ner != last_ner {
                    full.push(format!("<{}>", tok.ner));
                }
            } else {
                full.push(tok.lemma_or_lower());
            }
            last_ner = &tok.ner;
        }
        [head, with_last, with_all, full.join(" ")]
    }

}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" (s{} {})", self.span_string(), self.sent_idx, self.span)
    }
}

/// Proper-word inclusion: equality, or a shared prefix when the shorter
/// word has more than two characters.
fn proper_word_included(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    short.len() > 2 && long.starts_with(short)
}

/// Collapse a token slice into the distinct strings of its contiguous
/// non-`O` NE chunks, in order of first occurrence.
fn ne_chunks(tokens: &[Token]) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    for tok in tokens {
        match (&mut current, tok.ner.as_str()) {
            (Some((label, words)), ner) if ner == label => words.push(&tok.word),
            (cur, ner) => {
                if let Some((_, words)) = cur.take() {
                    let s = words.join(" ");
                    if !chunks.contains(&s) {
                        chunks.push(s);
                    }
                }
                if ner != "O" {
                    *cur = Some((ner.to_string(), vec![&tok.word]));
                }
            }
        }
    }
    if let Some((_, words)) = current {
        let s = words.join(" ");
        if !chunks.contains(&s) {
            chunks.push(s);
        }
    }
    chunks
}

// ============================================================================
// Tests
// ============================================================================
