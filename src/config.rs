//! Resolution configuration.
//!
//! Everything that varies between runs is explicit here; there are no
//! ambient property lookups. [`CorefConfig::default`] reproduces the
//! standard pipeline.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sieve::{self, SieveKind};

/// Tunable knobs for [`crate::resolver::SieveResolver`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorefConfig {
    /// The passes to run, in order.
    pub sieves: Vec<SieveKind>,
    /// Bound on how many sentences back the antecedent search reaches.
    /// `None` searches to the start of the document.
    pub max_sentence_distance: Option<usize>,
    /// Detach apposition, predicate-nominative, and relative-pronoun
    /// mentions from their clusters after resolution.
    pub post_process: bool,
    /// Drop singleton clusters from the output.
    pub remove_singletons: bool,
    /// Skip discourse-new mentions (indefinite starts) as resolution
    /// targets.
    pub discourse_salience: bool,
    /// Apply speaker and utterance incompatibility constraints.
    pub discourse_constraints: bool,
    /// Log per-pass link counts while resolving.
    pub score_passes: bool,
}

impl Default for CorefConfig {
    fn default() -> Self {
        CorefConfig {
            sieves: SieveKind::DEFAULT_ORDER.to_vec(),
            max_sentence_distance: None,
            post_process: true,
            remove_singletons: true,
            discourse_salience: true,
            discourse_constraints: true,
            score_passes: false,
        }
    }
}

impl CorefConfig {
    /// Default configuration with the pass ordering given as a
    /// comma-separated name list.
    pub fn with_sieve_spec(spec: &str) -> Result<Self> {
        Ok(CorefConfig { sieves: sieve::parse_sieves(spec)?, ..CorefConfig::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_the_standard_order() {
        let config = CorefConfig::default();
        assert_eq!(config.sieves, SieveKind::DEFAULT_ORDER.to_vec());
        assert!(config.post_process);
        assert!(config.remove_singletons);
    }

    #[test]
    fn sieve_spec_parses_or_fails_loudly() {
        let config = CorefConfig::with_sieve_spec("ExactStringMatch,PronounMatch").unwrap();
        assert_eq!(config.sieves.len(), 2);
        assert!(CorefConfig::with_sieve_spec("ExactStringMatch,Nope").is_err());
    }
}
