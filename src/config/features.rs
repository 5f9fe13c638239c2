//! Feature flags for the plus tier.
//!
//! Flags are an explicit value handed to the operations that gate behavior on
//! them. Nothing here is global; the binary reads the flags from the
//! environment once and passes them down.

/// Entitlements the current installation has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Whether Packing Buddy Plus is unlocked
    pub plus_unlocked: bool,
}

impl FeatureFlags {
    /// Flags for an installation with plus unlocked.
    #[must_use]
    pub const fn plus() -> Self {
        Self {
            plus_unlocked: true,
        }
    }

    /// Flags for the free tier.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            plus_unlocked: false,
        }
    }

    /// Whether plus features (multiple packers, suggestions) are available.
    #[must_use]
    pub const fn has_unlocked_plus(&self) -> bool {
        self.plus_unlocked
    }
}

/// Reads flags from `PLUS_UNLOCKED` (`1`, `true`, `yes` enable plus).
///
/// A missing or unrecognized value means the free tier.
#[must_use]
pub fn load_from_env() -> FeatureFlags {
    std::env::var("PLUS_UNLOCKED")
        .map(|value| FeatureFlags {
            plus_unlocked: parse_flag(&value),
        })
        .unwrap_or_default()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_constructors() {
        assert!(FeatureFlags::plus().has_unlocked_plus());
        assert!(!FeatureFlags::free().has_unlocked_plus());
        assert_eq!(FeatureFlags::default(), FeatureFlags::free());
    }
}
