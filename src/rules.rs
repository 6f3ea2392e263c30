//! Deterministic compatibility predicates over mentions and clusters.
//!
//! Every function here is a pure check (except the acronym check, which
//! consults the per-document cache): the sieves compose them, the pass loop
//! acts on them. Cluster-level predicates quantify over member pairs;
//! attribute agreement works on the cluster aggregates.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::cluster::CorefCluster;
use crate::dict::{Dictionaries, INCLUSION_STOP_WORDS, LOCATION_MODIFIERS};
use crate::document::Document;
use crate::mention::{
    Animacy, ClusterId, Gender, Mention, MentionId, MentionType, Number, Person, Token,
};
use crate::semantics::Semantics;

type MentionTable = HashMap<MentionId, Mention>;

// ============================================================================
// String matching
// ============================================================================

/// Exact string match between any non-pronominal member pair, allowing a
/// possessive `'s` on either side. Mentions consumed as role appositives
/// never match.
#[must_use]
pub fn exact_string_match(
    c1: &CorefCluster,
    c2: &CorefCluster,
    dict: &Dictionaries,
    role_set: &HashSet<MentionId>,
    mentions: &MentionTable,
) -> bool {
    let mut matched = false;
    for id in &c1.mentions {
        if role_set.contains(id) {
            return false;
        }
        let m = &mentions[id];
        if m.is_pronominal() {
            continue;
        }
        let m_span = m.lowercase_span();
        if dict.all_pronouns.contains(&m_span) {
            continue;
        }
        for ant_id in &c2.mentions {
            let ant = &mentions[ant_id];
            if ant.is_pronominal() {
                continue;
            }
            let a_span = ant.lowercase_span();
            if dict.all_pronouns.contains(&a_span) {
                continue;
            }
            if m_span == a_span
                || m_span == format!("{a_span} 's")
                || a_span == format!("{m_span} 's")
            {
                matched = true;
            }
        }
    }
    matched
}

/// Exact match after truncating both spans at the first comma or WH-word
/// following the head ("Mr. Bickford" vs "Mr. Bickford , a veteran").
#[must_use]
pub fn relaxed_string_match(
    mention: &Mention,
    ant: &Mention,
    dict: &Dictionaries,
    role_set: &HashSet<MentionId>,
) -> bool {
    if role_set.contains(&mention.id) {
        return false;
    }
    if mention.mention_type == MentionType::List || ant.mention_type == MentionType::List {
        return false;
    }
    if mention.is_pronominal()
        || ant.is_pronominal()
        || dict.all_pronouns.contains(&mention.lowercase_span())
        || dict.all_pronouns.contains(&ant.lowercase_span())
    {
        return false;
    }
    let m_span = mention.remove_phrase_after_head().to_lowercase();
    let a_span = ant.remove_phrase_after_head().to_lowercase();
    if m_span.is_empty() || a_span.is_empty() {
        return false;
    }
    m_span == a_span || m_span == format!("{a_span} 's") || a_span == format!("{m_span} 's")
}

// ============================================================================
// Head matching
// ============================================================================

/// The mention's head string matches some antecedent member's head string.
/// Pronouns never head-match.
#[must_use]
pub fn heads_agree(
    c2: &CorefCluster,
    m: &Mention,
    ant: &Mention,
    dict: &Dictionaries,
    mentions: &MentionTable,
) -> bool {
    if m.is_pronominal()
        || ant.is_pronominal()
        || dict.all_pronouns.contains(&m.lowercase_span())
        || dict.all_pronouns.contains(&ant.lowercase_span())
    {
        return false;
    }
    c2.mentions.iter().any(|id| mentions[id].head_string == m.head_string)
}

/// Relaxed head agreement between the two mentions only, with the NE-aware
/// inclusion check.
#[must_use]
pub fn relaxed_heads_agree(m: &Mention, ant: &Mention) -> bool {
    if m.is_pronominal() || ant.is_pronominal() {
        return false;
    }
    m.heads_agree(ant)
}

/// Word inclusion: every non-stop word of the mention's cluster (minus its
/// own head word) occurs somewhere in the antecedent cluster.
#[must_use]
pub fn words_included(
    c1: &CorefCluster,
    c2: &CorefCluster,
    mention: &Mention,
    mentions: &MentionTable,
) -> bool {
    let mut words = c1.words(mentions);
    words.retain(|w| !INCLUSION_STOP_WORDS.contains(w.as_str()));
    words.remove(&mention.head_string);
    let ant_words = c2.words(mentions);
    words.iter().all(|w| ant_words.contains(w))
}

/// Some member pair shares a head but the later mention carries modifiers
/// the antecedent lacks.
#[must_use]
pub fn incompatible_modifier_clusters(
    c1: &CorefCluster,
    c2: &CorefCluster,
    mentions: &MentionTable,
) -> bool {
    member_pairs(c1, c2, mentions, |m, ant| incompatible_modifier(m, ant))
}

/// Same-head mentions where the later one has an extra content modifier,
/// or the antecedent carries a location modifier the mention lacks.
#[must_use]
pub fn incompatible_modifier(m: &Mention, ant: &Mention) -> bool {
    if !ant.head_string.eq_ignore_ascii_case(&m.head_string) {
        return false;
    }
    let mut m_words = HashSet::new();
    for tok in &m.tokens {
        let w = tok.word.to_lowercase();
        let pos = &tok.pos;
        if !(pos.starts_with('N') || pos.starts_with("JJ") || pos == "CD" || pos.starts_with('V'))
            || w.eq_ignore_ascii_case(&m.head_string)
        {
            continue;
        }
        m_words.insert(w);
    }
    let ant_words: HashSet<String> =
        ant.tokens.iter().map(|t| t.word.to_lowercase()).collect();

    let extra = m_words.iter().any(|w| !ant_words.contains(w));
    let location = LOCATION_MODIFIERS
        .iter()
        .any(|l| ant_words.contains(*l) && !m_words.contains(*l));
    extra || location
}

/// Same proper head word for some member pair.
#[must_use]
pub fn same_proper_head_last_word_clusters(
    c1: &CorefCluster,
    c2: &CorefCluster,
    mentions: &MentionTable,
) -> bool {
    member_pairs(c1, c2, mentions, |m, a| same_proper_head_last_word(m, a))
}

/// Both mentions end (after truncation) in the same proper head word, and
/// their proper premodifiers do not each carry names the other lacks.
#[must_use]
pub fn same_proper_head_last_word(m: &Mention, a: &Mention) -> bool {
    if !m.head_string.eq_ignore_ascii_case(&a.head_string)
        || !m.head_token().pos.starts_with("NNP")
        || !a.head_token().pos.starts_with("NNP")
    {
        return false;
    }
    if !m.remove_phrase_after_head().to_lowercase().ends_with(&m.head_string)
        || !a.remove_phrase_after_head().to_lowercase().ends_with(&a.head_string)
    {
        return false;
    }
    let propers = |x: &Mention| -> HashSet<String> {
        let head_off = x.head_index - x.span.start;
        x.tokens[..head_off]
            .iter()
            .filter(|t| t.pos.starts_with("NNP"))
            .map(|t| t.word.clone())
            .collect()
    };
    let m_proper = propers(m);
    let a_proper = propers(a);
    let m_extra = m_proper.iter().any(|w| !a_proper.contains(w));
    let a_extra = a_proper.iter().any(|w| !m_proper.contains(w));
    !(m_extra && a_extra)
}

// ============================================================================
// Structure rules
// ============================================================================

/// Nesting check (i-within-i): one mention contains the other without a
/// licensing construction (apposition, predicate nominative, relative
/// pronoun, or role appositive).
#[must_use]
pub fn i_within_i(m1: &Mention, m2: &Mention, dict: &Dictionaries) -> bool {
    let licensed = linked(&m1.appositions, m2) || linked(&m2.appositions, m1)
        || linked(&m1.relative_pronouns, m2)
        || linked(&m2.relative_pronouns, m1)
        || m1.is_role_appositive(m2, dict)
        || m2.is_role_appositive(m1, dict);
    if licensed {
        return false;
    }
    m1.inside_in(m2) || m2.inside_in(m1)
}

fn linked(set: &HashSet<MentionId>, other: &Mention) -> bool {
    set.contains(&other.id)
}

/// Apposition between the two mentions, with agreeing clusters. Two proper
/// mentions side by side are separate entities, and locations are excluded
/// ("Portland, Oregon").
#[must_use]
pub fn is_apposition(
    c1: &CorefCluster,
    c2: &CorefCluster,
    m1: &Mention,
    m2: &Mention,
) -> bool {
    if !attributes_agree(c1, c2, false) {
        return false;
    }
    if m1.mention_type == MentionType::Proper && m2.mention_type == MentionType::Proper {
        return false;
    }
    if m1.ner_string == "LOCATION" {
        return false;
    }
    linked(&m1.appositions, m2) || linked(&m2.appositions, m1)
}

/// Predicate-nominative link between the two mentions, with agreeing
/// clusters and no nesting.
#[must_use]
pub fn is_predicate_nominative(
    c1: &CorefCluster,
    c2: &CorefCluster,
    m1: &Mention,
    m2: &Mention,
) -> bool {
    if !attributes_agree(c1, c2, false) {
        return false;
    }
    if m1.span.contained_in(&m2.span) || m2.span.contained_in(&m1.span) {
        return false;
    }
    linked(&m1.predicate_nominatives, m2) || linked(&m2.predicate_nominatives, m1)
}

/// Relative-pronoun link between the two mentions.
#[must_use]
pub fn is_relative_pronoun(m1: &Mention, m2: &Mention) -> bool {
    linked(&m1.relative_pronouns, m2) || linked(&m2.relative_pronouns, m1)
}

/// Role-appositive pattern between the two mentions, with agreeing
/// clusters.
#[must_use]
pub fn is_role_appositive(
    c1: &CorefCluster,
    c2: &CorefCluster,
    m1: &Mention,
    m2: &Mention,
    dict: &Dictionaries,
) -> bool {
    if !attributes_agree(c1, c2, false) {
        return false;
    }
    m1.is_role_appositive(m2, dict) || m2.is_role_appositive(m1, dict)
}

/// Demonym relation between the two mentions.
#[must_use]
pub fn is_demonym(m1: &Mention, m2: &Mention, dict: &Dictionaries) -> bool {
    m1.is_demonym(m2, dict)
}

// ============================================================================
// Acronyms
// ============================================================================

/// Acronym relation between any non-pronominal member pair, cached per
/// cluster pair.
#[must_use]
pub fn is_acronym_clusters(doc: &mut Document, c1: ClusterId, c2: ClusterId) -> bool {
    if let Some(cached) = doc.acronym_cached(c1, c2) {
        return cached;
    }
    let mut verdict = false;
    'outer: for m_id in &doc.clusters[&c1].mentions {
        let m = &doc.mentions[m_id];
        if m.is_pronominal() {
            continue;
        }
        for a_id in &doc.clusters[&c2].mentions {
            let a = &doc.mentions[a_id];
            if is_acronym(&m.tokens, &a.tokens) {
                verdict = true;
                break 'outer;
            }
        }
    }
    doc.cache_acronym(c1, c2, verdict);
    verdict
}

/// One side is a single all-capitals token whose letters are exactly the
/// capitals of the other side, in order, and the longer side never contains
/// the acronym verbatim. Two multiword spans are never acronyms of each
/// other.
#[must_use]
pub fn is_acronym(first: &[Token], second: &[Token]) -> bool {
    if first.len() > 1 && second.len() > 1 {
        return false;
    }
    if first.is_empty() || second.is_empty() {
        return false;
    }
    let (longer, shorter) = if first.len() == second.len() {
        if first[0].word.len() > second[0].word.len() {
            (first, second)
        } else {
            (second, first)
        }
    } else if first.len() > second.len() {
        (first, second)
    } else {
        (second, first)
    };

    let acronym = &shorter[0].word;
    if acronym.is_empty() || !acronym.chars().all(|c| c.is_ascii_uppercase()) {
        return false;
    }
    let acr: Vec<char> = acronym.chars().collect();
    let mut pos = 0;
    for tok in longer {
        for ch in tok.word.chars() {
            if ch.is_ascii_uppercase() {
                if pos >= acr.len() || acr[pos] != ch {
                    return false;
                }
                pos += 1;
            }
        }
    }
    if pos != acr.len() {
        return false;
    }
    !longer.iter().any(|t| t.word.contains(acronym.as_str()))
}

// ============================================================================
// Attribute agreement
// ============================================================================

/// Cluster-level attribute agreement over number, gender, animacy, and NER.
/// For each attribute, the clusters disagree only when BOTH sides carry
/// evidence the other lacks. A side whose aggregate contains the wildcard
/// value (`Unknown`, or `O`/`MISC` for NER) accepts anything, and wildcard
/// values never count as extra evidence.
#[must_use]
pub fn attributes_agree(c1: &CorefCluster, c2: &CorefCluster, ignore_gender: bool) -> bool {
    fn two_sided_extra<T: Eq + std::hash::Hash + Copy>(
        a: &HashSet<T>,
        b: &HashSet<T>,
        wildcard: T,
    ) -> bool {
        let extra = |side: &HashSet<T>, other: &HashSet<T>| {
            !other.contains(&wildcard)
                && side.iter().any(|x| *x != wildcard && !other.contains(x))
        };
        extra(a, b) && extra(b, a)
    }
    fn two_sided_ner_extra(a: &HashSet<String>, b: &HashSet<String>) -> bool {
        let wild = |s: &str| s == "O" || s == "MISC";
        let extra = |side: &HashSet<String>, other: &HashSet<String>| {
            !other.iter().any(|x| wild(x))
                && side.iter().any(|x| !wild(x) && !other.contains(x))
        };
        extra(a, b) && extra(b, a)
    }
    if two_sided_extra(&c1.numbers, &c2.numbers, Number::Unknown) {
        return false;
    }
    if !ignore_gender && two_sided_extra(&c1.genders, &c2.genders, Gender::Unknown) {
        return false;
    }
    if two_sided_extra(&c1.animacies, &c2.animacies, Animacy::Unknown) {
        return false;
    }
    !two_sided_ner_extra(&c1.ner_strings, &c2.ner_strings)
}

// ============================================================================
// Location, number, and proper-noun constraints
// ============================================================================

/// Two mentions name different places: location modifiers on either side,
/// or each side carries LOCATION tokens absent from the other, or a state
/// is matched against "country"/"nation".
#[must_use]
pub fn have_different_location(m: &Mention, a: &Mention, dict: &Dictionaries) -> bool {
    let a_span = a.span_string();
    if (dict.states_abbreviation.contains_key(&a_span)
        || dict.states_abbreviation.values().any(|v| *v == a_span))
        && (m.head_string.eq_ignore_ascii_case("country")
            || m.head_string.eq_ignore_ascii_case("nation"))
    {
        return true;
    }

    let mut loc_m = HashSet::new();
    let mut loc_a = HashSet::new();
    for (tokens, locs) in [(&m.tokens, &mut loc_m), (&a.tokens, &mut loc_a)] {
        for tok in tokens.iter() {
            let lower = tok.word.to_lowercase();
            if EXTENDED_LOCATION_MODIFIERS.contains(lower.as_str()) {
                return true;
            }
            if tok.ner == "LOCATION" {
                locs.insert(lower);
            }
        }
    }
    let m_string = m.lowercase_span();
    let a_string = a.lowercase_span();
    let m_extra = loc_m.iter().any(|s| !a_string.contains(s.as_str()));
    let a_extra = loc_a.iter().any(|s| !m_string.contains(s.as_str()));
    m_extra && a_extra
}

static EXTENDED_LOCATION_MODIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set: HashSet<&'static str> = LOCATION_MODIFIERS.iter().copied().collect();
    set.extend(["northwestern", "southwestern", "northeastern", "southeastern"]);
    set
});

static NUMBER_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "hundred",
     "thousand", "million", "billion"]
        .into_iter()
        .collect()
});

/// The later mention introduces a number absent from the antecedent
/// ("three jets" after "jets").
#[must_use]
pub fn number_in_later_mention(mention: &Mention, ant: &Mention) -> bool {
    let ant_words: HashSet<&str> = ant.tokens.iter().map(|t| t.word.as_str()).collect();
    for tok in &mention.tokens {
        let word = tok.word.as_str();
        if word.parse::<f64>().is_ok() {
            if !ant_words.contains(word) {
                return true;
            }
        } else if NUMBER_WORDS.contains(word.to_lowercase().as_str())
            && !ant_words.contains(word)
        {
            return true;
        }
    }
    false
}

/// Each side carries proper nouns the other's span lacks, ignoring the
/// given exception words.
#[must_use]
pub fn have_extra_proper_noun(m: &Mention, a: &Mention, except: &HashSet<String>) -> bool {
    let propers = |x: &Mention| -> HashSet<String> {
        x.tokens
            .iter()
            .filter(|t| t.pos.starts_with("NNP"))
            .map(|t| t.word.clone())
            .collect()
    };
    let m_string = m.span_string();
    let a_string = a.span_string();
    let m_extra = propers(m)
        .iter()
        .any(|s| !a_string.contains(s.as_str()) && !except.contains(&s.to_lowercase()));
    let a_extra = propers(a)
        .iter()
        .any(|s| !m_string.contains(s.as_str()) && !except.contains(&s.to_lowercase()));
    m_extra && a_extra
}

// ============================================================================
// Discourse rules
// ============================================================================

/// The antecedent is (or names) the speaker of the mention's utterance.
#[must_use]
pub fn antecedent_is_mention_speaker(doc: &Document, m: &Mention, ant: &Mention) -> bool {
    if doc.speaker_pairs.contains(&(m.id, ant.id)) {
        return true;
    }
    let Some(speaker) = &m.speaker else { return false };
    speaker
        .split_whitespace()
        .any(|s| ant.head_string.eq_ignore_ascii_case(s))
}

/// The two mentions share a speaker: equal speaker strings, or speaker
/// strings resolving to the same cluster.
#[must_use]
pub fn same_speaker(doc: &Document, m: &Mention, ant: &Mention) -> bool {
    let (Some(ms), Some(ants)) = (&m.speaker, &ant.speaker) else { return false };
    if ms == ants {
        return true;
    }
    match (speaker_cluster_id(doc, ms), speaker_cluster_id(doc, ants)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Cluster of the mention a numeric speaker string names.
#[must_use]
pub fn speaker_cluster_id(doc: &Document, speaker: &str) -> Option<ClusterId> {
    let id = speaker.parse::<MentionId>().ok()?;
    doc.mentions.get(&id).map(|m| m.coref_cluster_id)
}

/// Person disagreement for some member pair.
#[must_use]
pub fn person_disagree_clusters(doc: &Document, c1: &CorefCluster, c2: &CorefCluster) -> bool {
    for m_id in &c1.mentions {
        for a_id in &c2.mentions {
            if person_disagree(doc, &doc.mentions[m_id], &doc.mentions[a_id]) {
                return true;
            }
        }
    }
    false
}

/// Person disagreement between two mentions: conflicting persons under the
/// same speaker, a first/second-person pronoun against a non-pronoun by the
/// same speaker, or a "you" whose candidate antecedent is not the previous
/// utterance's speaker.
#[must_use]
pub fn person_disagree(doc: &Document, m: &Mention, ant: &Mention) -> bool {
    let same = same_speaker(doc, m, ant);
    if same && m.person != ant.person {
        let they_it = matches!(
            (m.person, ant.person),
            (Person::It, Person::They) | (Person::They, Person::It)
        );
        if !they_it && m.person != Person::Unknown && ant.person != Person::Unknown {
            return true;
        }
    }
    if same {
        if !ant.is_pronominal() {
            if matches!(m.person, Person::I | Person::We | Person::You) {
                return true;
            }
        } else if !m.is_pronominal()
            && matches!(ant.person, Person::I | Person::We | Person::You)
        {
            return true;
        }
    }
    // A second-person pronoun addresses the previous speaker.
    if m.person == Person::You && m.id != ant.id && ant.appears_earlier_than(m) {
        return you_addressee_mismatch(doc, m.utterance, ant);
    } else if ant.person == Person::You && m.id != ant.id && m.appears_earlier_than(ant) {
        return you_addressee_mismatch(doc, ant.utterance, m);
    }
    false
}

fn you_addressee_mismatch(doc: &Document, utterance: u32, other: &Mention) -> bool {
    let Some(prev) = utterance.checked_sub(1) else { return true };
    let Some(previous_speaker) = doc.speakers.get(&prev) else { return true };
    match speaker_cluster_id(doc, previous_speaker) {
        None => true,
        Some(cluster) => other.coref_cluster_id != cluster && other.person != Person::I,
    }
}

/// Subject and object of the same verb never corefer (outside reflexives,
/// which are handled before this check).
#[must_use]
pub fn subject_object(m1: &Mention, m2: &Mention) -> bool {
    if m1.sent_idx != m2.sent_idx {
        return false;
    }
    let (Some(v1), Some(v2)) = (m1.governing_verb, m2.governing_verb) else { return false };
    v1 == v2
        && ((m1.is_subject
            && (m2.is_direct_object || m2.is_indirect_object || m2.is_preposition_object))
            || (m2.is_subject
                && (m1.is_direct_object || m1.is_indirect_object || m1.is_preposition_object)))
}

/// The mentions sit fewer than six tokens apart in the same sentence.
#[must_use]
pub fn token_distance(m1: &Mention, m2: &Mention) -> bool {
    m1.sent_idx == m2.sent_idx && m1.span.start.saturating_sub(m2.span.start) < 6
}

// ============================================================================
// Coreference dictionary
// ============================================================================

/// Strict variant: every non-pronominal member pair with distinct head
/// lemmas must match in the given dictionary column.
#[must_use]
pub fn cluster_all_coref_dictionary(
    c1: &CorefCluster,
    c2: &CorefCluster,
    dict: &Dictionaries,
    column: usize,
    freq: f64,
    mentions: &MentionTable,
) -> bool {
    let mut any = false;
    for m_id in &c1.mentions {
        let m = &mentions[m_id];
        if m.is_pronominal() {
            continue;
        }
        for a_id in &c2.mentions {
            let a = &mentions[a_id];
            if a.is_pronominal()
                || m.head_token().lemma_or_lower() == a.head_token().lemma_or_lower()
            {
                continue;
            }
            if coref_dictionary(m, a, dict, column, freq) {
                any = true;
            } else {
                return false;
            }
        }
    }
    any
}

/// Pairwise dictionary match in column `column` (0-based): a very frequent
/// pair matches outright; a moderately frequent pair needs a PMI above
/// 0.18 or no PMI entry at all.
#[must_use]
pub fn coref_dictionary(
    m: &Mention,
    ant: &Mention,
    dict: &Dictionaries,
    column: usize,
    freq: f64,
) -> bool {
    let m_key = m.split_patterns()[column].to_lowercase();
    let a_key = ant.split_patterns()[column].to_lowercase();
    let high_freq = if column == 0 { 75.0 } else { 16.0 };

    let count = dict.coref_dict_count(column, &m_key, &a_key);
    if count > high_freq {
        return true;
    }
    if count > freq {
        match dict.coref_dict_pmi(&m_key, &a_key) {
            Some(pmi) => {
                if pmi > 0.18 {
                    return true;
                }
            }
            None => return true,
        }
    }
    false
}

// ============================================================================
// NE-signature context
// ============================================================================

const SIGNATURE_RANK_CUTOFF: usize = 10;

/// A proper antecedent in another sentence whose NE signature never ranks
/// the mention's context words in its top ten (in either direction) is
/// contextually incompatible.
#[must_use]
pub fn context_incompatible(doc: &Document, m: &Mention, ant: &Mention, dict: &Dictionaries) -> bool {
    let ant_head = ant.head_word().to_string();
    if ant.mention_type != MentionType::Proper
        || ant.sent_idx == m.sent_idx
        || context_overlapping(doc, m, ant)
        || !dict.has_signature(&ant_head)
    {
        return false;
    }
    let mut context = m.premodifier_ne_context();
    if context.is_empty() {
        context = m.ne_context(&doc.sentence_tokens[m.sent_idx]);
    }
    if context.is_empty() {
        return false;
    }
    let mut best = usize::MAX;
    for w in &context {
        if let Some(rank) = dict.signature_rank(&ant_head, w) {
            best = best.min(rank);
        }
        if let Some(rank) = dict.signature_rank(w, &ant_head) {
            best = best.min(rank);
        }
    }
    best > SIGNATURE_RANK_CUTOFF
}

/// Two non-proper mentions in different sentences with disjoint, mutually
/// low-ranking NE contexts are incompatible.
#[must_use]
pub fn sentence_context_incompatible(
    doc: &Document,
    m: &Mention,
    ant: &Mention,
    dict: &Dictionaries,
) -> bool {
    if ant.mention_type == MentionType::Proper
        || ant.sent_idx == m.sent_idx
        || m.mention_type == MentionType::Proper
        || context_overlapping(doc, m, ant)
    {
        return false;
    }
    let pick = |x: &Mention| {
        let pre = x.premodifier_ne_context();
        if pre.is_empty() {
            x.ne_context(&doc.sentence_tokens[x.sent_idx])
        } else {
            pre
        }
    };
    let context1 = pick(ant);
    let context2 = pick(m);
    if context1.is_empty() || context2.is_empty() {
        return false;
    }
    let mut best = usize::MAX;
    for w1 in &context1 {
        for w2 in &context2 {
            if let Some(rank) = dict.signature_rank(w1, w2) {
                best = best.min(rank);
            }
            if let Some(rank) = dict.signature_rank(w2, w1) {
                best = best.min(rank);
            }
        }
    }
    best > SIGNATURE_RANK_CUTOFF
}

fn context_overlapping(doc: &Document, m1: &Mention, m2: &Mention) -> bool {
    let c1: HashSet<String> =
        m1.ne_context(&doc.sentence_tokens[m1.sent_idx]).into_iter().collect();
    m2.ne_context(&doc.sentence_tokens[m2.sent_idx])
        .iter()
        .any(|w| c1.contains(w))
}

// ============================================================================
// Alias
// ============================================================================

/// Both representatives are proper and the semantic backend knows them as
/// aliases of one entity.
#[must_use]
pub fn alias(
    c1: &CorefCluster,
    c2: &CorefCluster,
    semantics: &dyn Semantics,
    mentions: &MentionTable,
) -> bool {
    let m = &mentions[&c1.representative];
    let ant = &mentions[&c2.representative];
    if m.mention_type != MentionType::Proper || ant.mention_type != MentionType::Proper {
        return false;
    }
    semantics.alias(m, ant)
}

fn member_pairs<F>(c1: &CorefCluster, c2: &CorefCluster, mentions: &MentionTable, mut f: F) -> bool
where
    F: FnMut(&Mention, &Mention) -> bool,
{
    for m_id in &c1.mentions {
        for a_id in &c2.mentions {
            if f(&mentions[m_id], &mentions[a_id]) {
                return true;
            }
        }
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::Span;

    fn tok(word: &str, pos: &str, ner: &str) -> Token {
        Token::new(word, pos, ner)
    }

    fn mention(id: MentionId, words: &[(&str, &str, &str)], head_off: usize) -> Mention {
        let tokens: Vec<Token> = words.iter().map(|(w, p, n)| tok(w, p, n)).collect();
        let ner = tokens[head_off].ner.clone();
        let head_string = tokens[head_off].word.to_lowercase();
        let mention_type = if tokens[head_off].pos == "PRP" {
            MentionType::Pronominal
        } else if tokens[head_off].pos.starts_with("NNP") {
            MentionType::Proper
        } else {
            MentionType::Nominal
        };
        Mention {
            id,
            sent_idx: 0,
            span: Span::new(0, tokens.len()),
            head_index: head_off,
            tokens,
            mention_type,
            number: Number::Unknown,
            gender: Gender::Unknown,
            animacy: Animacy::Unknown,
            person: Person::Unknown,
            ner_string: ner,
            head_string,
            is_subject: false,
            is_direct_object: false,
            is_indirect_object: false,
            is_preposition_object: false,
            governing_verb: None,
            generic: false,
            is_singleton: false,
            coref_cluster_id: id,
            gold_cluster_id: None,
            appositions: HashSet::new(),
            predicate_nominatives: HashSet::new(),
            relative_pronouns: HashSet::new(),
            speaker: None,
            utterance: 0,
        }
    }

    fn table(ms: &[&Mention]) -> MentionTable {
        ms.iter().map(|m| (m.id, (*m).clone())).collect()
    }

    #[test]
    fn exact_match_allows_possessive_variant() {
        let a = mention(1, &[("IBM", "NNP", "ORGANIZATION")], 0);
        let b = mention(2, &[("IBM", "NNP", "ORGANIZATION"), ("'s", "POS", "O")], 0);
        let t = table(&[&a, &b]);
        let ca = CorefCluster::singleton(&a);
        let cb = CorefCluster::singleton(&b);
        assert!(exact_string_match(&ca, &cb, &Dictionaries::new(), &HashSet::new(), &t));
    }

    #[test]
    fn exact_match_skips_role_set_members() {
        let a = mention(1, &[("chairman", "NN", "O")], 0);
        let b = mention(2, &[("chairman", "NN", "O")], 0);
        let t = table(&[&a, &b]);
        let ca = CorefCluster::singleton(&a);
        let cb = CorefCluster::singleton(&b);
        let role_set: HashSet<MentionId> = [1].into_iter().collect();
        assert!(!exact_string_match(&ca, &cb, &Dictionaries::new(), &role_set, &t));
        assert!(exact_string_match(&ca, &cb, &Dictionaries::new(), &HashSet::new(), &t));
    }

    #[test]
    fn relaxed_match_drops_appositive_tail() {
        let a = mention(
            1,
            &[
                ("Mr.", "NNP", "O"),
                ("Bickford", "NNP", "PERSON"),
                (",", ",", "O"),
                ("a", "DT", "O"),
                ("veteran", "NN", "O"),
            ],
            1,
        );
        let b = mention(2, &[("Mr.", "NNP", "O"), ("Bickford", "NNP", "PERSON")], 1);
        assert!(relaxed_string_match(&a, &b, &Dictionaries::new(), &HashSet::new()));
    }

    #[test]
    fn acronym_requires_ordered_capitals() {
        let long = [tok("International", "NNP", "ORGANIZATION"),
                    tok("Business", "NNP", "ORGANIZATION"),
                    tok("Machines", "NNP", "ORGANIZATION")];
        let short = [tok("IBM", "NNP", "ORGANIZATION")];
        assert!(is_acronym(&long, &short));
        let wrong = [tok("IMB", "NNP", "ORGANIZATION")];
        assert!(!is_acronym(&long, &wrong));
    }

    #[test]
    fn acronym_rejects_verbatim_containment_and_multiword_pairs() {
        let long = [tok("the", "DT", "O"), tok("IBM", "NNP", "ORGANIZATION"),
                    tok("Group", "NNP", "ORGANIZATION")];
        let short = [tok("IBM", "NNP", "ORGANIZATION")];
        assert!(!is_acronym(&long, &short));
        let two_a = [tok("Big", "NNP", "O"), tok("Blue", "NNP", "O")];
        let two_b = [tok("B", "NNP", "O"), tok("B", "NNP", "O")];
        assert!(!is_acronym(&two_a, &two_b));
    }

    #[test]
    fn attribute_agreement_is_wildcard_tolerant() {
        let mut a = mention(1, &[("company", "NN", "O")], 0);
        a.number = Number::Singular;
        let mut b = mention(2, &[("they", "PRP", "O")], 0);
        b.number = Number::Plural;
        let ca = CorefCluster::singleton(&a);
        let cb = CorefCluster::singleton(&b);
        // One-sided extras on gender/animacy/NER, two-sided on number.
        assert!(!attributes_agree(&ca, &cb, false));

        let mut c = mention(3, &[("it", "PRP", "O")], 0);
        c.number = Number::Unknown;
        let cc = CorefCluster::singleton(&c);
        // Wildcard side never vetoes.
        assert!(attributes_agree(&ca, &cc, false));
    }

    #[test]
    fn unknown_member_keeps_a_cluster_wildcard() {
        let mut a = mention(1, &[("committee", "NN", "O")], 0);
        a.number = Number::Singular;
        let mut unknown = mention(2, &[("which", "WDT", "O")], 0);
        unknown.number = Number::Unknown;
        let mut ca = CorefCluster::singleton(&a);
        let mut table: MentionTable =
            [(1, a.clone()), (2, unknown.clone())].into_iter().collect();
        ca.absorb(&CorefCluster::singleton(&unknown), &mut table);
        assert!(ca.numbers.contains(&Number::Unknown));

        let mut b = mention(3, &[("they", "PRP", "O")], 0);
        b.number = Number::Plural;
        let cb = CorefCluster::singleton(&b);
        // {Singular, Unknown} vs {Plural}: the Unknown member makes the
        // whole cluster accept either number.
        assert!(attributes_agree(&ca, &cb, false));
    }

    #[test]
    fn incompatible_modifier_catches_extra_content_word() {
        let flight = mention(1, &[("flight", "NN", "O")], 0);
        let double = mention(2, &[("second", "JJ", "O"), ("flight", "NN", "O")], 1);
        assert!(incompatible_modifier(&double, &flight));
        assert!(!incompatible_modifier(&flight, &double));
    }

    #[test]
    fn location_modifier_on_antecedent_blocks() {
        let plain = mention(1, &[("germany", "NNP", "LOCATION")], 0);
        let west = mention(2, &[("west", "JJ", "O"), ("germany", "NNP", "LOCATION")], 1);
        assert!(incompatible_modifier(&plain, &west));
    }

    #[test]
    fn different_location_vetoes_state_vs_country() {
        let dict = Dictionaries::new().with_state_abbreviations(vec![vec!["Maine", "ME"]]);
        let state = mention(1, &[("Maine", "NNP", "LOCATION")], 0);
        let country = mention(2, &[("the", "DT", "O"), ("country", "NN", "O")], 1);
        assert!(have_different_location(&country, &state, &dict));
    }

    #[test]
    fn number_in_later_mention_fires_on_new_numeral() {
        let jets = mention(1, &[("jets", "NNS", "O")], 0);
        let three = mention(2, &[("three", "CD", "O"), ("jets", "NNS", "O")], 1);
        assert!(number_in_later_mention(&three, &jets));
        assert!(!number_in_later_mention(&jets, &three));
    }

    #[test]
    fn subject_object_of_same_verb_blocks() {
        let mut subj = mention(1, &[("John", "NNP", "PERSON")], 0);
        subj.is_subject = true;
        subj.governing_verb = Some(1);
        let mut obj = mention(2, &[("him", "PRP", "O")], 0);
        obj.is_direct_object = true;
        obj.governing_verb = Some(1);
        assert!(subject_object(&subj, &obj));
        obj.governing_verb = Some(4);
        assert!(!subject_object(&subj, &obj));
    }

    #[test]
    fn coref_dictionary_thresholds() {
        let dict = Dictionaries::new()
            .with_coref_dict(0, vec![("company", "firm", 80.0), ("city", "town", 20.0),
                                     ("club", "team", 20.0)])
            .with_coref_dict_pmi(vec![("city", "town", 0.05), ("club", "team", 0.3)]);
        let company = mention(1, &[("company", "NN", "O")], 0);
        let firm = mention(2, &[("firm", "NN", "O")], 0);
        // Above the high-frequency cutoff: matches outright.
        assert!(coref_dictionary(&company, &firm, &dict, 0, 8.0));

        let city = mention(3, &[("city", "NN", "O")], 0);
        let town = mention(4, &[("town", "NN", "O")], 0);
        // Moderate frequency, low PMI: no match.
        assert!(!coref_dictionary(&city, &town, &dict, 0, 8.0));

        let club = mention(5, &[("club", "NN", "O")], 0);
        let team = mention(6, &[("team", "NN", "O")], 0);
        // Moderate frequency, high PMI: match.
        assert!(coref_dictionary(&club, &team, &dict, 0, 8.0));
    }

    #[test]
    fn words_included_ignores_stop_words_and_own_head() {
        let the_company = mention(1, &[("the", "DT", "O"), ("big", "JJ", "O"),
                                       ("company", "NN", "O")], 2);
        let big_company = mention(2, &[("big", "JJ", "O"), ("company", "NN", "O")], 1);
        let t = table(&[&the_company, &big_company]);
        let c1 = CorefCluster::singleton(&the_company);
        let c2 = CorefCluster::singleton(&big_company);
        assert!(words_included(&c1, &c2, &the_company, &t));

        let small_company = mention(3, &[("small", "JJ", "O"), ("company", "NN", "O")], 1);
        let c3 = CorefCluster::singleton(&small_company);
        let t = table(&[&the_company, &big_company, &small_company]);
        assert!(!words_included(&c1, &c3, &the_company, &t));
    }
}
