//! Sieve passes: a closed set of flag-driven compatibility policies.
//!
//! Every pass shares one decision procedure ([`Sieve::coreferent`]); a
//! [`SieveKind`] selects which checks participate via [`SieveFlags`]. The
//! kinds are a closed enum, so an unknown sieve name is a configuration
//! error at startup rather than a load failure mid-run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::CorefConfig;
use crate::dict::Dictionaries;
use crate::document::{DocType, Document};
use crate::error::{Error, Result};
use crate::mention::{ClusterId, MentionId, MentionType, Number, Person};
use crate::rules;
use crate::semantics::Semantics;

// ============================================================================
// Kinds and flags
// ============================================================================

/// The available passes, in no particular order. [`SieveKind::DEFAULT_ORDER`]
/// gives the standard high-to-low precision ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SieveKind {
    /// Marks role-appositive mentions for later exclusion; never merges.
    MarkRole,
    /// Speaker and discourse identity (I/you/speaker matches).
    DiscourseMatch,
    /// Exact span match.
    ExactStringMatch,
    /// Span match after truncating at the head.
    RelaxedStringMatch,
    /// Appositions, predicate nominatives, acronyms, relative pronouns,
    /// demonyms, role appositives.
    PreciseConstructs,
    /// Cluster head match + word inclusion + compatible modifiers.
    StrictHeadMatch1,
    /// Cluster head match + word inclusion.
    StrictHeadMatch2,
    /// Cluster head match + compatible modifiers.
    StrictHeadMatch3,
    /// Cluster head match + no new numbers.
    StrictHeadMatch4,
    /// Proper-head word match with location and number constraints.
    ProperHeadNounMatch,
    /// Relaxed head match with word inclusion.
    RelaxedHeadMatch,
    /// Pronoun resolution by attribute agreement.
    PronounMatch,
    /// Corpus coreference-dictionary match.
    CorefDictionaryMatch,
}

impl SieveKind {
    /// The standard pass ordering, most precise first.
    pub const DEFAULT_ORDER: [SieveKind; 12] = [
        SieveKind::MarkRole,
        SieveKind::DiscourseMatch,
        SieveKind::ExactStringMatch,
        SieveKind::RelaxedStringMatch,
        SieveKind::PreciseConstructs,
        SieveKind::StrictHeadMatch1,
        SieveKind::StrictHeadMatch2,
        SieveKind::StrictHeadMatch3,
        SieveKind::StrictHeadMatch4,
        SieveKind::ProperHeadNounMatch,
        SieveKind::RelaxedHeadMatch,
        SieveKind::PronounMatch,
    ];

    /// Stable name, also accepted by [`SieveKind::from_name`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SieveKind::MarkRole => "MarkRole",
            SieveKind::DiscourseMatch => "DiscourseMatch",
            SieveKind::ExactStringMatch => "ExactStringMatch",
            SieveKind::RelaxedStringMatch => "RelaxedStringMatch",
            SieveKind::PreciseConstructs => "PreciseConstructs",
            SieveKind::StrictHeadMatch1 => "StrictHeadMatch1",
            SieveKind::StrictHeadMatch2 => "StrictHeadMatch2",
            SieveKind::StrictHeadMatch3 => "StrictHeadMatch3",
            SieveKind::StrictHeadMatch4 => "StrictHeadMatch4",
            SieveKind::ProperHeadNounMatch => "ProperHeadNounMatch",
            SieveKind::RelaxedHeadMatch => "RelaxedHeadMatch",
            SieveKind::PronounMatch => "PronounMatch",
            SieveKind::CorefDictionaryMatch => "CorefDictionaryMatch",
        }
    }

    /// Parse a sieve name. Unknown names are configuration errors.
    pub fn from_name(name: &str) -> Result<SieveKind> {
        match name.trim() {
            "MarkRole" => Ok(SieveKind::MarkRole),
            "DiscourseMatch" => Ok(SieveKind::DiscourseMatch),
            "ExactStringMatch" => Ok(SieveKind::ExactStringMatch),
            "RelaxedStringMatch" => Ok(SieveKind::RelaxedStringMatch),
            "PreciseConstructs" => Ok(SieveKind::PreciseConstructs),
            "StrictHeadMatch1" => Ok(SieveKind::StrictHeadMatch1),
            "StrictHeadMatch2" => Ok(SieveKind::StrictHeadMatch2),
            "StrictHeadMatch3" => Ok(SieveKind::StrictHeadMatch3),
            "StrictHeadMatch4" => Ok(SieveKind::StrictHeadMatch4),
            "ProperHeadNounMatch" => Ok(SieveKind::ProperHeadNounMatch),
            "RelaxedHeadMatch" => Ok(SieveKind::RelaxedHeadMatch),
            "PronounMatch" => Ok(SieveKind::PronounMatch),
            "CorefDictionaryMatch" => Ok(SieveKind::CorefDictionaryMatch),
            other => Err(Error::config(format!("unknown sieve: {other:?}"))),
        }
    }

    /// The checks this pass runs.
    #[must_use]
    pub fn flags(self) -> SieveFlags {
        let mut f = SieveFlags::default();
        match self {
            SieveKind::MarkRole => {
                f.role_skip = true;
            }
            SieveKind::DiscourseMatch => {
                f.discourse_match = true;
            }
            SieveKind::ExactStringMatch => {
                f.exact_string_match = true;
            }
            SieveKind::RelaxedStringMatch => {
                f.relaxed_string_match = true;
            }
            SieveKind::PreciseConstructs => {
                f.apposition = true;
                f.predicate_nominatives = true;
                f.acronym = true;
                f.relative_pronoun = true;
                f.demonym = true;
                f.role_apposition = true;
                f.alias = true;
            }
            SieveKind::StrictHeadMatch1 => {
                f.inclusion_head_match = true;
                f.words_inclusion = true;
                f.incompatible_modifier = true;
                f.i_within_i = true;
                f.attributes_agree = true;
            }
            SieveKind::StrictHeadMatch2 => {
                f.inclusion_head_match = true;
                f.words_inclusion = true;
                f.i_within_i = true;
                f.attributes_agree = true;
            }
            SieveKind::StrictHeadMatch3 => {
                f.inclusion_head_match = true;
                f.incompatible_modifier = true;
                f.i_within_i = true;
                f.attributes_agree = true;
            }
            SieveKind::StrictHeadMatch4 => {
                f.inclusion_head_match = true;
                f.number_in_mention = true;
                f.i_within_i = true;
                f.attributes_agree = true;
            }
            SieveKind::ProperHeadNounMatch => {
                f.inclusion_head_match = true;
                f.proper_head_at_last = true;
                f.different_location = true;
                f.number_in_mention = true;
                f.i_within_i = true;
                f.attributes_agree = true;
            }
            SieveKind::RelaxedHeadMatch => {
                f.relaxed_head_match = true;
                f.words_inclusion = true;
                f.i_within_i = true;
                f.attributes_agree = true;
            }
            SieveKind::PronounMatch => {
                f.do_pronoun = true;
            }
            SieveKind::CorefDictionaryMatch => {
                f.coref_dict = true;
                f.distance = true;
            }
        }
        f
    }
}

/// Which checks a pass runs. All false by default; every pass honors the
/// incompatibility cache.
#[derive(Debug, Clone, Copy, Default)]
#[allow(missing_docs)]
pub struct SieveFlags {
    pub role_skip: bool,
    pub discourse_match: bool,
    pub exact_string_match: bool,
    pub relaxed_string_match: bool,
    pub apposition: bool,
    pub predicate_nominatives: bool,
    pub acronym: bool,
    pub relative_pronoun: bool,
    pub demonym: bool,
    pub role_apposition: bool,
    pub inclusion_head_match: bool,
    pub relaxed_head_match: bool,
    pub words_inclusion: bool,
    pub incompatible_modifier: bool,
    pub i_within_i: bool,
    pub proper_head_at_last: bool,
    pub attributes_agree: bool,
    pub different_location: bool,
    pub number_in_mention: bool,
    pub alias: bool,
    pub distance: bool,
    pub coref_dict: bool,
    pub do_pronoun: bool,
}

// ============================================================================
// Sieve
// ============================================================================

/// One configured pass.
#[derive(Debug, Clone)]
pub struct Sieve {
    /// Which pass this is.
    pub kind: SieveKind,
    /// Its checks.
    pub flags: SieveFlags,
    discourse_salience: bool,
    discourse_constraints: bool,
}

impl Sieve {
    /// Instantiate a pass under the given configuration.
    #[must_use]
    pub fn new(kind: SieveKind, config: &CorefConfig) -> Self {
        Sieve {
            kind,
            flags: kind.flags(),
            discourse_salience: config.discourse_salience,
            discourse_constraints: config.discourse_constraints,
        }
    }

    /// True for the pass that only marks role appositives.
    #[must_use]
    pub fn is_role_skip(&self) -> bool {
        self.flags.role_skip
    }

    /// Search pruning: skip mentions that are not the first of their
    /// cluster (string-match passes excepted), and — under discourse
    /// salience — discourse-new mentions (indefinite starts).
    #[must_use]
    pub fn skip_mention(&self, doc: &Document, m1: MentionId, dict: &Dictionaries) -> bool {
        let f = &self.flags;
        let mention = doc.mention(m1);
        if !f.exact_string_match
            && !f.role_apposition
            && !f.predicate_nominatives
            && !f.acronym
            && !f.apposition
            && !f.relative_pronoun
            && doc.cluster_of(m1).first_mention(&doc.mentions) != Some(m1)
        {
            return true;
        }
        if self.discourse_salience {
            let span = mention.lowercase_span();
            if mention.appositions.is_empty()
                && mention.predicate_nominatives.is_empty()
                && (span.starts_with("a ") || span.starts_with("an "))
                && !f.exact_string_match
            {
                return true;
            }
            if dict.indefinite_pronouns.contains(&span) {
                return true;
            }
            if dict
                .indefinite_pronouns
                .iter()
                .any(|indef| span.starts_with(&format!("{indef} ")))
            {
                return true;
            }
        }
        false
    }

    /// Candidate antecedents from sentence `ant_sent` for the mention at
    /// position `m1_pos` of sentence `my_sent`: preceding mentions of the
    /// same sentence (reversed when the mention is a relative pronoun), or
    /// all mentions of an earlier sentence in document order.
    #[must_use]
    pub fn ordered_antecedents(
        &self,
        doc: &Document,
        ant_sent: usize,
        my_sent: usize,
        m1: MentionId,
        m1_pos: usize,
        dict: &Dictionaries,
    ) -> Vec<MentionId> {
        if ant_sent == my_sent {
            let mut out: Vec<MentionId> =
                doc.ordered_mentions[my_sent][..m1_pos].to_vec();
            if dict.relative_pronouns.contains(&doc.mention(m1).lowercase_span()) {
                out.reverse();
            }
            out
        } else {
            doc.ordered_mentions[ant_sent].clone()
        }
    }

    /// The pass's full compatibility decision between the mention's cluster
    /// and a candidate antecedent's cluster. Mutates the document only to
    /// record discovered incompatibilities and acronym verdicts.
    #[allow(clippy::too_many_lines)]
    pub fn coreferent(
        &self,
        doc: &mut Document,
        c1_id: ClusterId,
        c2_id: ClusterId,
        m2_id: MentionId,
        ant_id: MentionId,
        dict: &Dictionaries,
        semantics: &dyn Semantics,
    ) -> bool {
        let f = self.flags;
        if doc.is_incompatible(c1_id, c2_id) {
            return false;
        }

        let rep_id = doc.clusters[&c1_id].representative;
        let mention = doc.mention(rep_id).clone();
        let mention2 = doc.mention(m2_id).clone();
        let ant = doc.mention(ant_id).clone();

        let sent_dist = mention2.sent_idx.abs_diff(ant.sent_idx);
        if f.do_pronoun
            && sent_dist > 3
            && mention2.person != Person::I
            && mention2.person != Person::You
        {
            return false;
        }
        if mention2.lowercase_span() == "this" && sent_dist > 3 {
            return false;
        }
        if mention2.person == Person::You
            && doc.doc_type == DocType::Article
            && mention2.speaker.as_deref() == Some("PER0")
        {
            return false;
        }
        if ant.generic && ant.person == Person::You {
            return false;
        }
        if mention2.generic {
            return false;
        }
        if mention2.inside_in(&ant) || ant.inside_in(&mention2) {
            return false;
        }

        if f.discourse_match {
            let m_span = mention.lowercase_span();
            let a_span = ant.lowercase_span();
            // I - I in one speaker's quotation.
            if mention.number == Number::Singular
                && dict.first_person_pronouns.contains(&m_span)
                && ant.number == Number::Singular
                && dict.first_person_pronouns.contains(&a_span)
                && rules::same_speaker(doc, &mention, &ant)
            {
                return true;
            }
            // speaker - I.
            if mention.number == Number::Singular
                && dict.first_person_pronouns.contains(&m_span)
                && rules::antecedent_is_mention_speaker(doc, &mention, &ant)
            {
                return true;
            }
            // I - speaker.
            if ant.number == Number::Singular
                && dict.first_person_pronouns.contains(&a_span)
                && rules::antecedent_is_mention_speaker(doc, &ant, &mention)
            {
                return true;
            }
            // you - you under one speaker.
            if dict.second_person_pronouns.contains(&m_span)
                && dict.second_person_pronouns.contains(&a_span)
                && rules::same_speaker(doc, &mention, &ant)
            {
                return true;
            }
            // I - you across adjacent utterances of a two-party conversation.
            if matches!(
                (mention.person, ant.person),
                (Person::I, Person::You) | (Person::You, Person::I)
            ) && doc.doc_type == DocType::Conversation
                && mention.utterance.abs_diff(ant.utterance) == 1
            {
                return true;
            }
            // Reflexives corefer with the subject of their verb.
            if dict.reflexive_pronouns.contains(&mention.head_string)
                && rules::subject_object(&mention, &ant)
            {
                return true;
            }
        }

        if self.discourse_constraints
            && !f.exact_string_match
            && !f.relaxed_string_match
            && !f.apposition
            && !f.words_inclusion
        {
            if let Some((m, a)) = self.discourse_veto(doc, c1_id, c2_id) {
                doc.add_incompatible(m, a);
                return false;
            }
        }

        if f.i_within_i && rules::i_within_i(&mention, &ant, dict) {
            doc.add_incompatible(mention.id, ant.id);
            return false;
        }

        let mut ret = false;
        {
            let c1 = &doc.clusters[&c1_id];
            let c2 = &doc.clusters[&c2_id];
            if f.exact_string_match
                && rules::exact_string_match(c1, c2, dict, &doc.role_set, &doc.mentions)
            {
                return true;
            }
            if f.relaxed_string_match
                && rules::relaxed_string_match(&mention, &ant, dict, &doc.role_set)
            {
                return true;
            }
            if f.apposition && rules::is_apposition(c1, c2, &mention, &ant) {
                return true;
            }
            if f.predicate_nominatives && rules::is_predicate_nominative(c1, c2, &mention, &ant)
            {
                return true;
            }
        }
        if f.acronym && rules::is_acronym_clusters(doc, c1_id, c2_id) {
            return true;
        }
        {
            let c1 = &doc.clusters[&c1_id];
            let c2 = &doc.clusters[&c2_id];
            if f.relative_pronoun && rules::is_relative_pronoun(&mention, &ant) {
                return true;
            }
            if f.demonym && rules::is_demonym(&mention, &ant, dict) {
                return true;
            }
            if f.role_apposition && rules::is_role_appositive(c1, c2, &mention, &ant, dict) {
                ret = true;
            }
            if f.inclusion_head_match
                && rules::heads_agree(c2, &mention, &ant, dict, &doc.mentions)
            {
                ret = true;
            }
            if f.relaxed_head_match
                && rules::relaxed_heads_agree(&mention, &ant)
                && !rules::have_extra_proper_noun(&mention, &ant, &HashSet::new())
            {
                ret = true;
            }
            if f.words_inclusion
                && ret
                && !rules::words_included(c1, c2, &mention, &doc.mentions)
            {
                return false;
            }
            if f.incompatible_modifier
                && ret
                && rules::incompatible_modifier_clusters(c1, c2, &doc.mentions)
            {
                return false;
            }
            if f.proper_head_at_last
                && ret
                && !rules::same_proper_head_last_word_clusters(c1, c2, &doc.mentions)
            {
                return false;
            }
            if f.attributes_agree && !rules::attributes_agree(c1, c2, false) {
                return false;
            }
            if f.different_location && rules::have_different_location(&mention, &ant, dict) {
                return false;
            }
            if f.number_in_mention && rules::number_in_later_mention(&mention, &ant) {
                return false;
            }
            if f.alias && rules::alias(c1, c2, semantics, &doc.mentions) {
                return true;
            }
            if f.distance && rules::token_distance(&mention2, &ant) {
                return false;
            }
            if f.coref_dict && self.coref_dict_match(doc, c1_id, c2_id, &mention, &mention2, &ant, dict)
            {
                return true;
            }
        }

        if f.do_pronoun {
            // A predicate nominative of the current mention resolves the
            // current mention itself, not the representative.
            let m = if mention.predicate_nominatives.contains(&mention2.id) {
                &mention2
            } else {
                &mention
            };
            let agree = {
                let c1 = &doc.clusters[&c1_id];
                let c2 = &doc.clusters[&c2_id];
                rules::attributes_agree(c1, c2, false)
            };
            if (m.is_pronominal() || dict.all_pronouns.contains(&m.lowercase_span())) && agree {
                if dict.demonyms.contains(&ant.lowercase_span())
                    && dict.not_organization_pronouns.contains(&m.head_string)
                {
                    let m_id = m.id;
                    doc.add_incompatible(m_id, ant.id);
                    return false;
                }
                if self.discourse_constraints {
                    let disagree = {
                        let c1 = &doc.clusters[&c1_id];
                        let c2 = &doc.clusters[&c2_id];
                        rules::person_disagree_clusters(doc, c1, c2)
                    };
                    if disagree {
                        let m_id = m.id;
                        doc.add_incompatible(m_id, ant.id);
                        return false;
                    }
                }
                return true;
            }
        }

        ret
    }

    /// Speaker and utterance incompatibilities over all member pairs.
    /// Returns the offending pair, which the caller records.
    fn discourse_veto(
        &self,
        doc: &Document,
        c1_id: ClusterId,
        c2_id: ClusterId,
    ) -> Option<(MentionId, MentionId)> {
        let members1: Vec<MentionId> = doc.clusters[&c1_id].mentions.iter().copied().collect();
        let members2: Vec<MentionId> = doc.clusters[&c2_id].mentions.iter().copied().collect();
        for &m_id in &members1 {
            let m = doc.mention(m_id);
            for &a_id in &members2 {
                let a = doc.mention(a_id);
                // A mention never corefers with its own speaker.
                if m.person != Person::I
                    && a.person != Person::I
                    && (rules::antecedent_is_mention_speaker(doc, m, a)
                        || rules::antecedent_is_mention_speaker(doc, a, m))
                {
                    return Some((m_id, a_id));
                }
                let utter_dist = m.utterance.abs_diff(a.utterance);
                if doc.doc_type != DocType::Article
                    && utter_dist == 1
                    && !rules::same_speaker(doc, m, a)
                    && matches!(
                        (m.person, a.person),
                        (Person::I, Person::I)
                            | (Person::You, Person::You)
                            | (Person::We, Person::We)
                    )
                {
                    return Some((m_id, a_id));
                }
            }
        }
        if doc.doc_type == DocType::Article {
            for &m_id in &members1 {
                for &a_id in &members2 {
                    if rules::subject_object(doc.mention(m_id), doc.mention(a_id)) {
                        return Some((m_id, a_id));
                    }
                }
            }
        }
        None
    }

    /// The coreference-dictionary decision with its guard constraints.
    #[allow(clippy::too_many_arguments)]
    fn coref_dict_match(
        &self,
        doc: &Document,
        c1_id: ClusterId,
        c2_id: ClusterId,
        mention: &crate::mention::Mention,
        mention2: &crate::mention::Mention,
        ant: &crate::mention::Mention,
        dict: &Dictionaries,
    ) -> bool {
        if ant.head_token().lemma_or_lower() == mention2.head_token().lemma_or_lower() {
            return false;
        }
        // Common noun against proper noun never dictionary-matches.
        let m2_head = mention2.head_word();
        let mixed_case = m2_head.chars().skip(1).any(char::is_uppercase);
        if ant.mention_type != MentionType::Proper
            && (mention2.head_token().pos.starts_with("NNP") || mixed_case)
        {
            return false;
        }
        if ant.head_token().pos == "NNS" && mention2.head_token().pos == "NNS" {
            return false;
        }
        let indefinite_start = |m: &crate::mention::Mention| {
            m.tokens
                .first()
                .map_or(false, |t| dict.indefinite_pronouns.contains(&t.lemma_or_lower()))
        };
        if indefinite_start(ant) || indefinite_start(mention2) {
            return false;
        }
        if ant.mention_type == MentionType::List || mention2.mention_type == MentionType::List {
            return false;
        }
        if rules::context_incompatible(doc, mention2, ant, dict) {
            return false;
        }
        if rules::sentence_context_incompatible(doc, mention2, ant, dict) {
            return false;
        }
        let c1 = &doc.clusters[&c1_id];
        let c2 = &doc.clusters[&c2_id];
        if rules::cluster_all_coref_dictionary(c1, c2, dict, 0, 8.0, &doc.mentions) {
            return true;
        }
        (1..4).any(|col| rules::coref_dictionary(mention, ant, dict, col, 2.0))
    }
}

/// Parse a comma-separated sieve list.
pub fn parse_sieves(spec: &str) -> Result<Vec<SieveKind>> {
    let sieves: Vec<SieveKind> = spec
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(SieveKind::from_name)
        .collect::<Result<_>>()?;
    if sieves.is_empty() {
        return Err(Error::config("empty sieve list"));
    }
    let mut seen = HashSet::new();
    for s in &sieves {
        if !seen.insert(*s) {
            return Err(Error::config(format!("duplicate sieve: {}", s.name())));
        }
    }
    Ok(sieves)
}

// ============================================================================
// Tests
// ============================================================================
