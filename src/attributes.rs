//! Attribute resolution for mentions.
//!
//! [`resolve`] fills in a mention's derived attributes in a fixed order:
//! head string, mention type, NER string, number, gender, animacy, person,
//! then discourse role. The order matters — later steps read the results
//! of earlier ones (person reads number and gender, number reads the
//! mention type).

use log::warn;

use crate::dict::{Dictionaries, CORPORATE_SUFFIXES};
use crate::input::DependencyGraph;
use crate::mention::{Animacy, Gender, Mention, MentionType, Number, Person, Token};

/// Resolve all attributes of `mention` in place. `is_list` marks upstream
/// coordination detection. Never fails: a head index outside the span is
/// repaired with a warning, and missing lexical evidence yields `Unknown`.
pub fn resolve(
    mention: &mut Mention,
    sentence: &[Token],
    deps: &DependencyGraph,
    dict: &Dictionaries,
    is_list: bool,
) {
    set_head_string(mention);
    set_mention_type(mention, dict, is_list);
    set_ner_string(mention);
    set_number(mention, dict);
    set_gender(mention, dict);
    set_animacy(mention, dict);
    set_person(mention, dict);
    set_discourse(mention, sentence, deps);
}

// ============================================================================
// Individual steps
// ============================================================================

fn set_head_string(mention: &mut Mention) {
    if mention.head_index < mention.span.start || mention.head_index >= mention.span.end {
        warn!(
            "mention {}: head index {} outside span {}; using span end",
            mention.id, mention.head_index, mention.span
        );
        mention.head_index = mention.span.end - 1;
    }
    let mut off = mention.head_index - mention.span.start;
    if mention.tokens[off].ner != "O" {
        // "Nintendo Co." refers to Nintendo: walk left past corporate
        // designators to the content word.
        while off > 0 && is_corporate_suffix(&mention.tokens[off].word) {
            off -= 1;
        }
    }
    mention.head_string = mention.tokens[off].word.to_lowercase();
}

fn is_corporate_suffix(word: &str) -> bool {
    let w = word.trim_end_matches('.').to_lowercase();
    CORPORATE_SUFFIXES.contains(w.as_str())
}

fn set_mention_type(mention: &mut Mention, dict: &Dictionaries, is_list: bool) {
    let head = mention.head_token();
    mention.mention_type = if is_list {
        MentionType::List
    } else if head.pos == "PRP"
        || (mention.span.len() == 1
            && head.ner == "O"
            && dict.all_pronouns.contains(&mention.lowercase_span()))
    {
        MentionType::Pronominal
    } else if head.ner != "O" || head.pos.starts_with("NNP") {
        MentionType::Proper
    } else {
        MentionType::Nominal
    };
}

fn set_ner_string(mention: &mut Mention) {
    mention.ner_string = mention.head_token().ner.clone();
}

fn set_number(mention: &mut Mention, dict: &Dictionaries) {
    mention.number = if mention.is_pronominal() {
        if dict.plural_pronouns.contains(&mention.head_string) {
            Number::Plural
        } else if dict.singular_pronouns.contains(&mention.head_string) {
            Number::Singular
        } else {
            Number::Unknown
        }
    } else if mention.mention_type == MentionType::List {
        Number::Plural
    } else if mention.ner_string != "O" && mention.mention_type != MentionType::Nominal {
        if mention.ner_string == "ORGANIZATION" || mention.ner_string.starts_with("ORG") {
            // Organizations take both "it" and "they".
            Number::Unknown
        } else {
            Number::Singular
        }
    } else {
        let pos = &mention.head_token().pos;
        if pos.starts_with('N') && pos.ends_with('S') {
            Number::Plural
        } else if pos.starts_with('N') {
            Number::Singular
        } else {
            Number::Unknown
        }
    };
    if mention.number == Number::Unknown {
        if dict.plural_words.contains(&mention.head_string) {
            mention.number = Number::Plural;
        } else if dict.singular_words.contains(&mention.head_string) {
            mention.number = Number::Singular;
        }
    }
}

fn set_gender(mention: &mut Mention, dict: &Dictionaries) {
    mention.gender = Gender::Unknown;
    if mention.is_pronominal() {
        if dict.male_pronouns.contains(&mention.head_string) {
            mention.gender = Gender::Male;
        } else if dict.female_pronouns.contains(&mention.head_string) {
            mention.gender = Gender::Female;
        }
        return;
    }
    if let Some(g) = counted_gender(mention, dict) {
        mention.gender = g;
    }
    if mention.gender == Gender::Unknown {
        if mention.ner_string == "PERSON" || mention.ner_string.starts_with("PER") {
            for tok in &mention.tokens {
                let w = tok.word.to_lowercase();
                if dict.male_words.contains(&w) {
                    mention.gender = Gender::Male;
                    break;
                }
                if dict.female_words.contains(&w) {
                    mention.gender = Gender::Female;
                    break;
                }
            }
        } else if dict.neutral_words.contains(&mention.head_string) {
            mention.gender = Gender::Neutral;
        }
    }
}

/// Gender from the corpus count table. For person mentions, try every
/// suffix of the words up to the head (dropping titles and first names
/// one at a time); otherwise look up the head word alone.
fn counted_gender(mention: &Mention, dict: &Dictionaries) -> Option<Gender> {
    let head_off = mention.head_index - mention.span.start;
    let words: Vec<String> =
        mention.tokens[..=head_off].iter().map(|t| t.word.to_lowercase()).collect();
    if mention.ner_string == "PERSON" || mention.ner_string.starts_with("PER") {
        for i in 0..words.len() {
            let key = words[i..].join(" ");
            if let Some(counts) = dict.gender_counts.get(&key) {
                let g = counts.resolve();
                if g != Gender::Unknown {
                    return Some(g);
                }
            }
        }
    }
    let counts = dict.gender_counts.get(&mention.head_string)?;
    match counts.resolve() {
        Gender::Unknown => None,
        g => Some(g),
    }
}

fn set_animacy(mention: &mut Mention, dict: &Dictionaries) {
    mention.animacy = if mention.is_pronominal() {
        if dict.animate_pronouns.contains(&mention.head_string) {
            Animacy::Animate
        } else if dict.inanimate_pronouns.contains(&mention.head_string) {
            Animacy::Inanimate
        } else {
            Animacy::Unknown
        }
    } else {
        match mention.ner_string.as_str() {
            "PERSON" | "PER" => Animacy::Animate,
            "LOCATION" | "GPE" | "ORGANIZATION" | "ORG" | "MONEY" | "NUMBER" | "PERCENT"
            | "DATE" | "TIME" | "MISC" | "FAC" | "VEH" | "WEA" => Animacy::Inanimate,
            _ => Animacy::Unknown,
        }
    };
    if mention.animacy == Animacy::Unknown {
        if dict.animate_words.contains(&mention.head_string) {
            mention.animacy = Animacy::Animate;
        } else if dict.inanimate_words.contains(&mention.head_string) {
            mention.animacy = Animacy::Inanimate;
        }
    }
}

fn set_person(mention: &mut Mention, dict: &Dictionaries) {
    if !mention.is_pronominal() {
        mention.person = Person::Unknown;
        return;
    }
    let span = mention.lowercase_span();
    mention.person = if dict.first_person_pronouns.contains(&span) {
        match mention.number {
            Number::Singular => Person::I,
            Number::Plural => Person::We,
            Number::Unknown => Person::Unknown,
        }
    } else if dict.second_person_pronouns.contains(&span) {
        Person::You
    } else if dict.third_person_pronouns.contains(&span) {
        if mention.number == Number::Plural {
            Person::They
        } else if mention.gender == Gender::Male && mention.number == Number::Singular {
            Person::He
        } else if mention.gender == Gender::Female && mention.number == Number::Singular {
            Person::She
        } else if (mention.gender == Gender::Neutral || mention.animacy == Animacy::Inanimate)
            && mention.number == Number::Singular
        {
            Person::It
        } else {
            Person::Unknown
        }
    } else {
        Person::Unknown
    };
}

fn set_discourse(mention: &mut Mention, sentence: &[Token], deps: &DependencyGraph) {
    let Some(edge) = deps.incoming(mention.head_index) else { return };
    let relation = edge.relation.clone();

    // Nearest verbal governor, walking up the dependency chain.
    let mut gov = edge.governor;
    let mut verb = None;
    for _ in 0..sentence.len() {
        match sentence.get(gov) {
            Some(tok) if tok.pos.starts_with('V') => {
                verb = Some(gov);
                break;
            }
            _ => match deps.incoming(gov) {
                Some(up) => gov = up.governor,
                None => break,
            },
        }
    }
    let Some(verb) = verb else { return };

    let base = relation.split(':').next().unwrap_or(&relation);
    match base {
        "nsubj" | "csubj" => {
            if relation.ends_with("pass") {
                mention.is_direct_object = true;
            } else {
                mention.is_subject = true;
            }
        }
        "obj" | "dobj" | "nsubjpass" | "csubjpass" => mention.is_direct_object = true,
        "iobj" => mention.is_indirect_object = true,
        "nmod" | "pobj" => {
            if !matches!(
                relation.as_str(),
                "nmod:npmod" | "nmod:tmod" | "nmod:poss" | "nmod:agent"
            ) {
                mention.is_preposition_object = true;
            }
        }
        _ => return,
    }
    mention.governing_verb = Some(verb);
}

// ============================================================================
// Tests
// ============================================================================
