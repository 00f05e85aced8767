//! Registry configuration
//!
//! Controls how much checking happens while modules are loaded and how parent chains that leave
//! a module are treated.

/// Configuration of an [`crate::InteropRegistry`]
///
/// Loading always validates the record format (sizes, stub kinds, shared dispatch selectors).
/// The options here control the additional cross-record checks and the behavior of template
/// chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Cross-check every in-module index, field window and template chain while loading, so
    /// corrupt tables fail at load rather than at first query
    pub validate_on_load: bool,

    /// Raise [`crate::Error::AmbiguousCrossModuleReference`] when a template chain names a
    /// cross-module parent that no loaded module has a template for, instead of ending the chain
    pub strict_cross_module: bool,

    /// Maximum number of parent links followed by a chain walk (default: 64)
    pub max_chain_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            validate_on_load: true,
            strict_cross_module: false,
            max_chain_depth: 64,
        }
    }
}

impl RegistryConfig {
    /// Creates a minimal configuration for maximum load performance
    ///
    /// Skips the cross-record checks; corrupt indices surface as errors on first query instead.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            validate_on_load: false,
            strict_cross_module: false,
            max_chain_depth: 64,
        }
    }

    /// Creates a configuration that treats every unresolved cross-module parent as an error
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_on_load: true,
            strict_cross_module: true,
            max_chain_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_presets() {
        let default = RegistryConfig::default();
        assert!(default.validate_on_load);
        assert!(!default.strict_cross_module);
        assert_eq!(default.max_chain_depth, 64);

        let minimal = RegistryConfig::minimal();
        assert!(!minimal.validate_on_load);
        assert!(!minimal.strict_cross_module);

        let strict = RegistryConfig::strict();
        assert!(strict.validate_on_load);
        assert!(strict.strict_cross_module);
        assert_ne!(strict, default);
    }
}
