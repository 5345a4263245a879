use std::sync::Arc;

use super::{Pattern, Phase, PhaseKind};
use crate::error::ConfigurationError;

/// Immutable registry of breathing patterns.
///
/// Built once (built-ins plus any user-authored patterns from the config
/// file) and only read afterwards. Patterns are handed out as `Arc` so a
/// running session can hold on to its pattern without borrowing the catalog.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<Arc<Pattern>>,
}

impl PatternCatalog {
    /// Catalog with the compiled-in patterns only.
    pub fn builtin() -> Self {
        Self {
            patterns: builtin_patterns().into_iter().map(Arc::new).collect(),
        }
    }

    /// Built-ins followed by `custom`, in the given order.
    ///
    /// Every custom pattern is validated and may not reuse an id that is
    /// already in the catalog.
    pub fn with_custom(custom: &[Pattern]) -> Result<Self, ConfigurationError> {
        let mut catalog = Self::builtin();
        for pattern in custom {
            pattern.validate()?;
            if catalog.contains(&pattern.id) {
                return Err(ConfigurationError::DuplicatePattern(pattern.id.clone()));
            }
            catalog.patterns.push(Arc::new(pattern.clone()));
        }
        Ok(catalog)
    }

    /// Find a pattern by id (case-insensitive).
    pub fn lookup(&self, id: &str) -> Result<&Arc<Pattern>, ConfigurationError> {
        let wanted = id.trim();
        self.patterns
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigurationError::UnknownPattern(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_ok()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().map(|p| p.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_patterns() -> Vec<Pattern> {
    vec![
        Pattern::new(
            "box",
            "Box Breathing",
            "Equal inhale, hold, exhale and hold. Steadies attention.",
            vec![
                Phase::inhale(4000),
                Phase::hold(4000),
                Phase::exhale(4000),
                Phase::hold(4000),
            ],
        ),
        Pattern::new(
            "4-7-8",
            "Relaxing Breath",
            "Long hold and slow exhale. Helps with sleep and anxiety.",
            vec![Phase::inhale(4000), Phase::hold(7000), Phase::exhale(8000)],
        ),
        Pattern::new(
            "calm",
            "Calm",
            "Exhale longer than the inhale to slow things down.",
            vec![Phase::inhale(4000), Phase::exhale(6000)],
        ),
        Pattern::new(
            "coherence",
            "Coherent Breathing",
            "Around five and a half breaths per minute.",
            vec![Phase::inhale(5500), Phase::exhale(5500)],
        ),
        Pattern::new(
            "deep-relax",
            "Deep Relaxation",
            "Short pause at the top, long release.",
            vec![Phase::inhale(4000), Phase::hold(2000), Phase::exhale(6000)],
        ),
        Pattern::new(
            "7-11",
            "7-11",
            "Very long exhale for acute stress.",
            vec![Phase::inhale(7000), Phase::exhale(11000)],
        ),
        Pattern::new(
            "triangle",
            "Triangle",
            "Three equal sides: inhale, hold, exhale.",
            vec![Phase::inhale(4000), Phase::hold(4000), Phase::exhale(4000)],
        ),
        Pattern::new(
            "awake",
            "Awake",
            "Long inhale with a short, sharp release to energize.",
            vec![
                Phase::inhale(6000),
                Phase::hold(2000),
                Phase::new(PhaseKind::Contract, "Release", 1000),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_valid() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(catalog.len(), 8);
        for p in catalog.patterns() {
            assert!(p.validate().is_ok(), "{} should be valid", p.id);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(catalog.lookup("BOX").unwrap().id, "box");
        assert_eq!(catalog.lookup(" 4-7-8 ").unwrap().cycle_duration_ms(), 19_000);
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(
            catalog.lookup("square").unwrap_err(),
            ConfigurationError::UnknownPattern("square".into())
        );
    }

    #[test]
    fn custom_patterns_are_appended() {
        let custom = Pattern::new(
            "sigh",
            "Physiological Sigh",
            "",
            vec![
                Phase::inhale(2000),
                Phase::new(PhaseKind::Expand, "Top-up", 1000),
                Phase::exhale(6000),
            ],
        );
        let catalog = PatternCatalog::with_custom(&[custom]).unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.ids().last(), Some(&"sigh"));
    }

    #[test]
    fn custom_pattern_cannot_shadow_builtin() {
        let custom = Pattern::new("Box", "Mine", "", vec![Phase::inhale(1000)]);
        assert_eq!(
            PatternCatalog::with_custom(&[custom]).unwrap_err(),
            ConfigurationError::DuplicatePattern("Box".into())
        );
    }

    #[test]
    fn custom_pattern_with_overflowing_cycle_is_rejected() {
        let half = u64::MAX / 2 + 1;
        let custom = Pattern::new(
            "overflow",
            "Overflow",
            "",
            vec![Phase::inhale(half), Phase::exhale(half)],
        );
        assert!(matches!(
            PatternCatalog::with_custom(&[custom]),
            Err(ConfigurationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn custom_pattern_must_validate() {
        let custom = Pattern::new("empty", "Empty", "", vec![]);
        assert!(PatternCatalog::with_custom(&[custom]).is_err());
    }
}
