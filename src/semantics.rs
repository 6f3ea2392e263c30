//! Optional semantic knowledge behind a trait seam.
//!
//! WordNet-style similarity and alias detection stay outside the crate;
//! the sieves only see this trait. [`NoSemantics`] is the null
//! implementation and the default everywhere.

use crate::mention::Mention;

/// A synset handle: the lemmas of one sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synset(pub Vec<String>);

/// External semantic knowledge consulted by the pronoun and alias checks.
pub trait Semantics: Send + Sync {
    /// Most likely synset for a term sequence, if the backing resource
    /// knows one.
    fn find_synset(&self, terms: &[String]) -> Option<Synset>;

    /// True when two mentions are aliases of the same entity
    /// ("IBM" / "International Business Machines").
    fn alias(&self, a: &Mention, b: &Mention) -> bool;
}

/// No semantic knowledge: `find_synset` finds nothing, `alias` never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSemantics;

impl Semantics for NoSemantics {
    fn find_synset(&self, _terms: &[String]) -> Option<Synset> {
        None
    }

    fn alias(&self, _a: &Mention, _b: &Mention) -> bool {
        false
    }
}
