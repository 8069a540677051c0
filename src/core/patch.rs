//! Version-scoped source patches.

use serde::Serialize;

use crate::core::condition::{Condition, Subject};

/// A patch file applied to the fetched sources before configuring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Patch file name, relative to the recipe's patch directory.
    pub file: String,
    /// Strip level passed to `patch -p`.
    pub level: u32,
    pub when: Condition,
}

impl Patch {
    pub fn new(file: impl Into<String>, when: Condition) -> Self {
        Patch {
            file: file.into(),
            level: 1,
            when,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn applies_to(&self, subject: &dyn Subject) -> bool {
        self.when.holds(subject)
    }
}

/// A patch selected for a concrete version, as handed to the patch stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedPatch {
    pub file: String,
    pub level: u32,
}

impl From<&Patch> for SelectedPatch {
    fn from(patch: &Patch) -> Self {
        SelectedPatch {
            file: patch.file.clone(),
            level: patch.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::RecipeVersion;

    #[test]
    fn test_patch_window() {
        let patch = Patch::new("fix.patch", Condition::at(RecipeVersion::release(2, 0, 0)));

        assert!(patch.applies_to(&RecipeVersion::release(2, 0, 0)));
        assert!(!patch.applies_to(&RecipeVersion::release(2, 0, 1)));
        assert_eq!(patch.level, 1);
        assert_eq!(patch.with_level(0).level, 0);
    }
}
