//! Layered per-package and per-group settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-package installation settings.
///
/// Settings combine in layers: group-level defaults first, package-level
/// overrides second. The combine is associative but not commutative; on
/// conflicting fields the override wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub framework_restriction: FrameworkRestriction,
    #[serde(default)]
    pub copy_local: Option<bool>,
    #[serde(default)]
    pub import_targets: Option<bool>,
    #[serde(default)]
    pub omit_content: Option<bool>,
    #[serde(default)]
    pub reference_condition: Option<String>,
}

/// Which target frameworks a package is restricted to.
///
/// `AutoDetect` means "derive from the project"; it acts as the unset value
/// when layering and when comparing group options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<BTreeSet<String>>", into = "Option<BTreeSet<String>>")]
pub enum FrameworkRestriction {
    #[default]
    AutoDetect,
    Within(BTreeSet<String>),
}

impl From<Option<BTreeSet<String>>> for FrameworkRestriction {
    fn from(value: Option<BTreeSet<String>>) -> Self {
        match value {
            None => Self::AutoDetect,
            Some(frameworks) => Self::Within(frameworks),
        }
    }
}

impl From<FrameworkRestriction> for Option<BTreeSet<String>> {
    fn from(value: FrameworkRestriction) -> Self {
        match value {
            FrameworkRestriction::AutoDetect => None,
            FrameworkRestriction::Within(frameworks) => Some(frameworks),
        }
    }
}

impl FrameworkRestriction {
    pub fn is_auto_detect(&self) -> bool {
        matches!(self, Self::AutoDetect)
    }

    /// Restrict to an explicit set of framework monikers.
    pub fn within<I, S>(frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Within(frameworks.into_iter().map(Into::into).collect())
    }
}

impl Settings {
    /// Combine group-level defaults with package-level overrides.
    ///
    /// Override fields win where present; `AutoDetect` counts as absent for
    /// the framework restriction.
    pub fn layered(defaults: &Self, overrides: &Self) -> Self {
        Self {
            framework_restriction: if overrides.framework_restriction.is_auto_detect() {
                defaults.framework_restriction.clone()
            } else {
                overrides.framework_restriction.clone()
            },
            copy_local: overrides.copy_local.or(defaults.copy_local),
            import_targets: overrides.import_targets.or(defaults.import_targets),
            omit_content: overrides.omit_content.or(defaults.omit_content),
            reference_condition: overrides
                .reference_condition
                .clone()
                .or_else(|| defaults.reference_condition.clone()),
        }
    }

    /// Copy of self with a different framework restriction, other fields kept.
    pub fn with_framework_restriction(&self, restriction: FrameworkRestriction) -> Self {
        Self {
            framework_restriction: restriction,
            ..self.clone()
        }
    }
}

/// Group-level options: default settings for every package in the group,
/// plus the requirement-check mode the group was declared with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupOptions {
    #[serde(default)]
    pub settings: Settings,
    /// In strict mode resolved prereleases must satisfy the declared
    /// requirement as-is; otherwise the requirement is widened first.
    #[serde(default)]
    pub strict: bool,
}
