//! Singleton prediction behind a trait seam.
//!
//! An external classifier may mark mentions unlikely to corefer at all;
//! the pass loop then refuses to link two such mentions unless one is a
//! proper name. [`AlwaysReferring`] is the null implementation.

use crate::dict::Dictionaries;
use crate::mention::Mention;

/// Predicts whether a mention will remain a singleton.
pub trait SingletonClassifier: Send + Sync {
    /// True when the mention is predicted not to corefer with anything.
    fn is_singleton(&self, mention: &Mention, dict: &Dictionaries) -> bool;
}

/// Null classifier: nothing is predicted singleton.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReferring;

impl SingletonClassifier for AlwaysReferring {
    fn is_singleton(&self, _mention: &Mention, _dict: &Dictionaries) -> bool {
        false
    }
}
