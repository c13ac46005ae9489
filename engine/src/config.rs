//! Engine configuration

/// Settings a [`crate::tree::Tree`] is evaluated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cache expectations, outcome distributions, and dominance verdicts per tree
    pub memoize: bool,
    /// Appended to an information set's name whenever the trust-based
    /// reduction removes one of its actions
    pub reduction_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            memoize: true,
            reduction_marker: "'".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn with_reduction_marker(mut self, marker: impl Into<String>) -> Self {
        self.reduction_marker = marker.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_setters() {
        let config = EngineConfig::default();
        assert!(config.memoize);
        assert_eq!(config.reduction_marker, "'");

        let config = config.with_memoize(false).with_reduction_marker("*");
        assert!(!config.memoize);
        assert_eq!(config.reduction_marker, "*");
    }
}
