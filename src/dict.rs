//! Word lists and lexical resources for the sieve passes.
//!
//! [`Dictionaries`] bundles the closed-class word lists the sieves consult
//! (pronoun sets, stop words, determiners) with the loadable resources
//! (demonyms, state abbreviations, gender/number word lists, coreference
//! frequency tables, NE signatures). The built-in lists ship with the crate;
//! the loadable ones start empty and are filled through the builder methods,
//! so a `Dictionaries::default()` is always usable and every lookup is
//! total — a missing resource just means "unknown".

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::mention::Gender;

// ============================================================================
// Built-in lists
// ============================================================================

const FEMALE_PRONOUNS: &[&str] = &["her", "hers", "herself", "she"];
const MALE_PRONOUNS: &[&str] = &["he", "him", "himself", "his"];
const NEUTRAL_PRONOUNS: &[&str] = &["it", "its", "itself", "where", "here", "there", "which"];
const POSSESSIVE_PRONOUNS: &[&str] =
    &["my", "your", "his", "her", "its", "our", "their", "whose"];
const OTHER_PRONOUNS: &[&str] = &["who", "whom", "whose", "where", "when", "which"];
const THIRD_PERSON_PRONOUNS: &[&str] = &[
    "he", "him", "himself", "his", "she", "her", "herself", "hers", "it", "itself", "its", "one",
    "oneself", "one's", "they", "them", "themself", "themselves", "theirs", "their", "'em",
];
const SECOND_PERSON_PRONOUNS: &[&str] = &["you", "yourself", "yours", "your", "yourselves"];
const FIRST_PERSON_PRONOUNS: &[&str] = &[
    "i", "me", "myself", "mine", "my", "we", "us", "ourself", "ourselves", "ours", "our",
];
const MONEY_PERCENT_NUMBER_PRONOUNS: &[&str] = &["it", "its"];
const DATE_TIME_PRONOUNS: &[&str] = &["when"];
const ORGANIZATION_PRONOUNS: &[&str] = &["it", "its", "they", "their", "them", "which"];
const LOCATION_PRONOUNS: &[&str] = &["it", "its", "where", "here", "there"];
const INANIMATE_PRONOUNS: &[&str] = &["it", "itself", "its", "where", "when"];
const ANIMATE_PRONOUNS: &[&str] = &[
    "i", "me", "myself", "mine", "my", "we", "us", "ourself", "ourselves", "ours", "our", "you",
    "yourself", "yours", "your", "yourselves", "he", "him", "himself", "his", "she", "her",
    "herself", "hers", "one", "oneself", "one's", "they", "them", "themself", "themselves",
    "theirs", "their", "'em", "who", "whom", "whose",
];
const INDEFINITE_PRONOUNS: &[&str] = &[
    "another", "anybody", "anyone", "anything", "each", "either", "enough", "everybody",
    "everyone", "everything", "less", "little", "much", "neither", "no one", "nobody", "nothing",
    "one", "other", "plenty", "somebody", "someone", "something", "both", "few", "fewer", "many",
    "others", "several", "all", "any", "more", "most", "none", "some", "such",
];
const RELATIVE_PRONOUNS: &[&str] = &["that", "who", "which", "whom", "where", "whose"];
const GPE_PRONOUNS: &[&str] = &["it", "itself", "its", "they", "where"];
const PLURAL_PRONOUNS: &[&str] = &[
    "we", "us", "ourself", "ourselves", "ours", "our", "yourself", "yourselves", "they", "them",
    "themself", "themselves", "theirs", "their",
];
const SINGULAR_PRONOUNS: &[&str] = &[
    "i", "me", "myself", "mine", "my", "yourself", "he", "him", "himself", "his", "she", "her",
    "herself", "hers", "it", "itself", "its", "one", "oneself", "one's",
];
const FACILITY_VEHICLE_WEAPON_PRONOUNS: &[&str] = &["it", "itself", "its", "they", "where"];
const MISC_PRONOUNS: &[&str] = &["it", "itself", "its", "they", "where"];
const REFLEXIVE_PRONOUNS: &[&str] = &[
    "myself", "yourself", "yourselves", "himself", "herself", "itself", "ourselves", "themselves",
    "oneself",
];
const NOT_ORGANIZATION_PRONOUNS: &[&str] = &[
    "i", "me", "myself", "mine", "my", "yourself", "he", "him", "himself", "his", "she", "her",
    "herself", "hers", "here",
];
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "at", "on", "upon", "in", "to", "from", "out", "as", "so", "such",
    "or", "and", "those", "this", "these", "that", "for", ",", "is", "was", "am", "are", "'s",
    "been", "were",
];
const DETERMINERS: &[&str] =
    &["the", "this", "that", "these", "those", "his", "her", "my", "your", "their", "our"];
const QUANTIFIERS: &[&str] =
    &["not", "every", "any", "none", "everything", "anything", "nothing", "all", "enough"];
const PARTS: &[&str] = &[
    "half", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "hundred", "thousand", "million", "billion", "tens", "dozens", "hundreds", "thousands",
    "millions", "billions", "group", "groups", "bunch", "number", "numbers", "pinch", "amount",
    "total", "all", "mile", "miles", "pounds",
];
const TEMPORALS: &[&str] = &[
    "second", "minute", "hour", "day", "week", "month", "year", "decade", "century", "millennium",
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "now",
    "yesterday", "tomorrow", "age", "time", "era", "epoch", "morning", "evening", "night", "noon",
    "afternoon", "semester", "trimester", "quarter", "term", "winter", "spring", "summer", "fall",
    "autumn", "season", "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december",
];

/// Head-word stop list for word-inclusion checks: articles, titles, and
/// corporate designators carry no content.
pub(crate) static INCLUSION_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["the", "this", "mr.", "miss", "mrs.", "dr.", "ms.", "inc.", "ltd.", "corp.", "'s"]
        .into_iter()
        .collect()
});

/// Modifiers that place an entity: two mentions that differ in one of these
/// are different entities ("east Germany" vs "west Germany").
pub(crate) static LOCATION_MODIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["east", "west", "north", "south", "eastern", "western", "northern", "southern", "upper",
     "lower"]
        .into_iter()
        .collect()
});

/// Corporate suffixes stripped from NE-labelled head words.
pub(crate) static CORPORATE_SUFFIXES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["corp", "co", "inc", "ltd"].into_iter().collect());

fn set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

// ============================================================================
// Gender counts
// ============================================================================

/// Corpus counts of a phrase occurring with male, female, and neutral
/// pronouns, from a Bergsma-and-Lin style gender list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderCounts {
    /// Co-occurrences with male pronouns.
    pub male: u32,
    /// Co-occurrences with female pronouns.
    pub female: u32,
    /// Co-occurrences with neutral pronouns.
    pub neutral: u32,
}

impl GenderCounts {
    /// Create a count triple.
    #[must_use]
    pub fn new(male: u32, female: u32, neutral: u32) -> Self {
        GenderCounts { male, female, neutral }
    }

    /// Resolve the counts to a gender. A category wins only when its count
    /// exceeds half the combined count of the other two categories and also
    /// exceeds an absolute floor of 2; otherwise the evidence is too thin
    /// and the result is `Unknown`.
    #[must_use]
    pub fn resolve(&self) -> Gender {
        let (m, f, n) = (f64::from(self.male), f64::from(self.female), f64::from(self.neutral));
        if m > 0.5 * (f + n) && m > 2.0 {
            Gender::Male
        } else if f > 0.5 * (m + n) && f > 2.0 {
            Gender::Female
        } else if n > 0.5 * (m + f) && n > 2.0 {
            Gender::Neutral
        } else {
            Gender::Unknown
        }
    }
}

// ============================================================================
// Dictionaries
// ============================================================================

/// Lexical resources for the sieves. See the module docs.
#[derive(Debug, Clone)]
pub struct Dictionaries {
    /// Female pronouns.
    pub female_pronouns: HashSet<String>,
    /// Male pronouns.
    pub male_pronouns: HashSet<String>,
    /// Neutral pronouns.
    pub neutral_pronouns: HashSet<String>,
    /// Possessive pronouns.
    pub possessive_pronouns: HashSet<String>,
    /// WH-pronouns not covered by the person sets.
    pub other_pronouns: HashSet<String>,
    /// Third-person pronouns.
    pub third_person_pronouns: HashSet<String>,
    /// Second-person pronouns.
    pub second_person_pronouns: HashSet<String>,
    /// First-person pronouns.
    pub first_person_pronouns: HashSet<String>,
    /// Pronouns compatible with money, percent, and number entities.
    pub money_percent_number_pronouns: HashSet<String>,
    /// Pronouns compatible with date/time entities.
    pub date_time_pronouns: HashSet<String>,
    /// Pronouns compatible with organizations.
    pub organization_pronouns: HashSet<String>,
    /// Pronouns compatible with locations.
    pub location_pronouns: HashSet<String>,
    /// Inanimate pronouns.
    pub inanimate_pronouns: HashSet<String>,
    /// Animate pronouns.
    pub animate_pronouns: HashSet<String>,
    /// Indefinite pronouns; mentions starting with one are discourse-new.
    pub indefinite_pronouns: HashSet<String>,
    /// Relative pronouns.
    pub relative_pronouns: HashSet<String>,
    /// Pronouns compatible with geo-political entities.
    pub gpe_pronouns: HashSet<String>,
    /// Plural pronouns.
    pub plural_pronouns: HashSet<String>,
    /// Singular pronouns.
    pub singular_pronouns: HashSet<String>,
    /// Pronouns compatible with facilities, vehicles, and weapons.
    pub facility_vehicle_weapon_pronouns: HashSet<String>,
    /// Pronouns compatible with MISC entities.
    pub misc_pronouns: HashSet<String>,
    /// Reflexive pronouns.
    pub reflexive_pronouns: HashSet<String>,
    /// Pronouns that never corefer with an organization.
    pub not_organization_pronouns: HashSet<String>,
    /// Pronouns that refer to people (the animate set).
    pub person_pronouns: HashSet<String>,
    /// Union of the first-, second-, third-person, and WH-pronoun sets.
    pub all_pronouns: HashSet<String>,
    /// Stop words, including all pronouns.
    pub stop_words: HashSet<String>,
    /// Determiners.
    pub determiners: HashSet<String>,
    /// Quantifiers; a quantified mention is generic.
    pub quantifiers: HashSet<String>,
    /// Partitive nouns ("half", "group", "millions").
    pub parts: HashSet<String>,
    /// Temporal nouns.
    pub temporals: HashSet<String>,

    /// Cased map from state/province names and abbreviations to the
    /// canonical name.
    pub states_abbreviation: HashMap<String, String>,
    /// Lowercased map from a place name to its demonyms and back.
    pub demonym_pairs: HashMap<String, HashSet<String>>,
    /// Every place name and demonym, lowercased.
    pub demonyms: HashSet<String>,
    /// Words referring to males.
    pub male_words: HashSet<String>,
    /// Words referring to females.
    pub female_words: HashSet<String>,
    /// Words with neutral gender.
    pub neutral_words: HashSet<String>,
    /// Plural nouns.
    pub plural_words: HashSet<String>,
    /// Singular nouns.
    pub singular_words: HashSet<String>,
    /// Animate words.
    pub animate_words: HashSet<String>,
    /// Inanimate words.
    pub inanimate_words: HashSet<String>,
    /// Gender counts keyed by lowercased phrase or head word.
    pub gender_counts: HashMap<String, GenderCounts>,

    coref_dict: [HashMap<(String, String), f64>; 4],
    coref_dict_pmi: HashMap<(String, String), f64>,
    ne_signatures: HashMap<String, Vec<(String, f64)>>,
}

impl Default for Dictionaries {
    fn default() -> Self {
        let first = set(FIRST_PERSON_PRONOUNS);
        let second = set(SECOND_PERSON_PRONOUNS);
        let third = set(THIRD_PERSON_PRONOUNS);
        let other = set(OTHER_PRONOUNS);
        let mut all_pronouns: HashSet<String> = HashSet::new();
        all_pronouns.extend(first.iter().cloned());
        all_pronouns.extend(second.iter().cloned());
        all_pronouns.extend(third.iter().cloned());
        all_pronouns.extend(other.iter().cloned());
        let mut stop_words = set(STOP_WORDS);
        stop_words.extend(all_pronouns.iter().cloned());

        Dictionaries {
            female_pronouns: set(FEMALE_PRONOUNS),
            male_pronouns: set(MALE_PRONOUNS),
            neutral_pronouns: set(NEUTRAL_PRONOUNS),
            possessive_pronouns: set(POSSESSIVE_PRONOUNS),
            other_pronouns: other,
            third_person_pronouns: third,
            second_person_pronouns: second,
            first_person_pronouns: first,
            money_percent_number_pronouns: set(MONEY_PERCENT_NUMBER_PRONOUNS),
            date_time_pronouns: set(DATE_TIME_PRONOUNS),
            organization_pronouns: set(ORGANIZATION_PRONOUNS),
            location_pronouns: set(LOCATION_PRONOUNS),
            inanimate_pronouns: set(INANIMATE_PRONOUNS),
            animate_pronouns: set(ANIMATE_PRONOUNS),
            indefinite_pronouns: set(INDEFINITE_PRONOUNS),
            relative_pronouns: set(RELATIVE_PRONOUNS),
            gpe_pronouns: set(GPE_PRONOUNS),
            plural_pronouns: set(PLURAL_PRONOUNS),
            singular_pronouns: set(SINGULAR_PRONOUNS),
            facility_vehicle_weapon_pronouns: set(FACILITY_VEHICLE_WEAPON_PRONOUNS),
            misc_pronouns: set(MISC_PRONOUNS),
            reflexive_pronouns: set(REFLEXIVE_PRONOUNS),
            not_organization_pronouns: set(NOT_ORGANIZATION_PRONOUNS),
            person_pronouns: set(ANIMATE_PRONOUNS),
            all_pronouns,
            stop_words,
            determiners: set(DETERMINERS),
            quantifiers: set(QUANTIFIERS),
            parts: set(PARTS),
            temporals: set(TEMPORALS),
            states_abbreviation: HashMap::new(),
            demonym_pairs: HashMap::new(),
            demonyms: HashSet::new(),
            male_words: HashSet::new(),
            female_words: HashSet::new(),
            neutral_words: HashSet::new(),
            plural_words: HashSet::new(),
            singular_words: HashSet::new(),
            animate_words: HashSet::new(),
            inanimate_words: HashSet::new(),
            gender_counts: HashMap::new(),
            coref_dict: Default::default(),
            coref_dict_pmi: HashMap::new(),
            ne_signatures: HashMap::new(),
        }
    }
}

impl Dictionaries {
    /// Dictionaries with only the built-in lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Builder methods for the loadable resources
    // ------------------------------------------------------------------

    /// Load demonym rows: a place name followed by its demonyms. Stored
    /// lowercased, linked in both directions.
    #[must_use]
    pub fn with_demonyms<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        for row in rows {
            let words: Vec<String> = row.into_iter().map(|s| s.into().to_lowercase()).collect();
            let Some(place) = words.first().cloned() else { continue };
            for w in &words {
                self.demonyms.insert(w.clone());
            }
            self.demonym_pairs
                .entry(place)
                .or_default()
                .extend(words.into_iter());
        }
        self
    }

    /// Load state/province abbreviation rows: the canonical name followed
    /// by its abbreviations. Cased, and looked up cased.
    #[must_use]
    pub fn with_state_abbreviations<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        for row in rows {
            let words: Vec<String> = row.into_iter().map(Into::into).collect();
            let Some(canonical) = words.first().cloned() else { continue };
            for w in words {
                self.states_abbreviation.insert(w, canonical.clone());
            }
        }
        self
    }

    /// Load the gender word lists.
    #[must_use]
    pub fn with_gender_words<I, S>(mut self, male: I, female: I, neutral: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.male_words.extend(male.into_iter().map(Into::into));
        self.female_words.extend(female.into_iter().map(Into::into));
        self.neutral_words.extend(neutral.into_iter().map(Into::into));
        self
    }

    /// Load the number word lists.
    #[must_use]
    pub fn with_number_words<I, S>(mut self, plural: I, singular: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plural_words.extend(plural.into_iter().map(Into::into));
        self.singular_words.extend(singular.into_iter().map(Into::into));
        self
    }

    /// Load the animacy word lists.
    #[must_use]
    pub fn with_animacy_words<I, S>(mut self, animate: I, inanimate: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.animate_words.extend(animate.into_iter().map(Into::into));
        self.inanimate_words.extend(inanimate.into_iter().map(Into::into));
        self
    }

    /// Load gender counts keyed by lowercased phrase.
    #[must_use]
    pub fn with_gender_counts<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, GenderCounts)>,
        S: Into<String>,
    {
        for (phrase, counts) in rows {
            self.gender_counts.insert(phrase.into().to_lowercase(), counts);
        }
        self
    }

    /// Load one column (0..=3) of the coreference frequency table.
    /// Column 0 holds head-pair counts; columns 1..=3 hold the auxiliary
    /// pattern-pair counts.
    #[must_use]
    pub fn with_coref_dict<I, S>(mut self, column: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        if let Some(table) = self.coref_dict.get_mut(column) {
            for (a, b, count) in rows {
                table.insert((a.into(), b.into()), count);
            }
        }
        self
    }

    /// Load pointwise-mutual-information scores for head pairs.
    #[must_use]
    pub fn with_coref_dict_pmi<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        for (a, b, pmi) in rows {
            self.coref_dict_pmi.insert((a.into(), b.into()), pmi);
        }
        self
    }

    /// Load NE context signatures: for each word, its co-occurrence counts
    /// with named entities. Each signature is sorted by descending count at
    /// load time so that rank lookups are cheap.
    #[must_use]
    pub fn with_ne_signatures<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<(S, f64)>)>,
        S: Into<String>,
    {
        for (word, sig) in rows {
            let mut sig: Vec<(String, f64)> =
                sig.into_iter().map(|(w, c)| (w.into(), c)).collect();
            sig.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            self.ne_signatures.insert(word.into(), sig);
        }
        self
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Canonical name for a state/province name or abbreviation. Cased.
    #[must_use]
    pub fn canonical_state(&self, name: &str) -> Option<&str> {
        self.states_abbreviation.get(name).map(String::as_str)
    }

    /// Count for a word pair in one column of the coreference frequency
    /// table, in both orders. Zero when absent.
    #[must_use]
    pub fn coref_dict_count(&self, column: usize, a: &str, b: &str) -> f64 {
        let Some(table) = self.coref_dict.get(column) else { return 0.0 };
        let key = (a.to_string(), b.to_string());
        if let Some(c) = table.get(&key) {
            return *c;
        }
        table.get(&(key.1, key.0)).copied().unwrap_or(0.0)
    }

    /// PMI score for a head pair, in both orders.
    #[must_use]
    pub fn coref_dict_pmi(&self, a: &str, b: &str) -> Option<f64> {
        let key = (a.to_string(), b.to_string());
        self.coref_dict_pmi
            .get(&key)
            .or_else(|| self.coref_dict_pmi.get(&(key.1, key.0)))
            .copied()
    }

    /// 1-based rank of `word` in the NE signature of `key` (rank 1 is the
    /// strongest co-occurrence). `None` when either is unknown.
    #[must_use]
    pub fn signature_rank(&self, key: &str, word: &str) -> Option<usize> {
        let sig = self.ne_signatures.get(key)?;
        sig.iter().position(|(w, _)| w == word).map(|i| i + 1)
    }

    /// True when the word has a loaded NE signature.
    #[must_use]
    pub fn has_signature(&self, key: &str) -> bool {
        self.ne_signatures.contains_key(key)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_pronoun_sets_are_consistent() {
        let d = Dictionaries::new();
        assert!(d.all_pronouns.contains("i"));
        assert!(d.all_pronouns.contains("you"));
        assert!(d.all_pronouns.contains("themselves"));
        assert!(d.stop_words.contains("the"));
        // Pronouns fold into the stop list.
        assert!(d.stop_words.contains("himself"));
        assert!(d.person_pronouns.contains("who"));
        assert!(!d.person_pronouns.contains("it"));
    }

    #[test]
    fn gender_counts_need_majority_and_floor() {
        assert_eq!(GenderCounts::new(10, 1, 1).resolve(), Gender::Male);
        assert_eq!(GenderCounts::new(1, 10, 2).resolve(), Gender::Female);
        // Majority but below the absolute floor.
        assert_eq!(GenderCounts::new(2, 0, 0).resolve(), Gender::Unknown);
        // No clear majority.
        assert_eq!(GenderCounts::new(5, 5, 5).resolve(), Gender::Unknown);
    }

    #[test]
    fn demonyms_link_both_directions() {
        let d = Dictionaries::new().with_demonyms(vec![vec!["Australia", "Australian", "Aussie"]]);
        assert!(d.demonyms.contains("australia"));
        assert!(d.demonyms.contains("aussie"));
        assert!(d.demonym_pairs["australia"].contains("australian"));
    }

    #[test]
    fn state_abbreviations_are_cased() {
        let d = Dictionaries::new().with_state_abbreviations(vec![vec!["Maine", "ME", "Me."]]);
        assert_eq!(d.canonical_state("ME"), Some("Maine"));
        assert_eq!(d.canonical_state("me"), None);
    }

    #[test]
    fn coref_dict_lookup_is_symmetric() {
        let d = Dictionaries::new()
            .with_coref_dict(0, vec![("company", "firm", 80.0)])
            .with_coref_dict_pmi(vec![("company", "firm", 0.25)]);
        assert_eq!(d.coref_dict_count(0, "firm", "company"), 80.0);
        assert_eq!(d.coref_dict_pmi("firm", "company"), Some(0.25));
        assert_eq!(d.coref_dict_count(1, "company", "firm"), 0.0);
    }

    #[test]
    fn signature_rank_sorts_by_count() {
        let d = Dictionaries::new()
            .with_ne_signatures(vec![("spokesman", vec![("IBM", 3.0), ("Apple", 9.0)])]);
        assert_eq!(d.signature_rank("spokesman", "Apple"), Some(1));
        assert_eq!(d.signature_rank("spokesman", "IBM"), Some(2));
        assert_eq!(d.signature_rank("spokesman", "Nokia"), None);
    }
}
