//! C++ language standard floors.
//!
//! A recipe often inherits its C++ standard from a dependency. When the
//! dependency tolerates an older standard than the recipe's own sources
//! compile with, the recipe declares a floor that raises exactly that value.

use serde::Serialize;

/// A one-way raise of an inherited C++ standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CxxFloor {
    /// Standard that the providing dependency may be built with.
    pub tolerated: &'static str,
    /// Standard this recipe requires instead.
    pub required: &'static str,
}

impl CxxFloor {
    pub const fn new(tolerated: &'static str, required: &'static str) -> Self {
        CxxFloor {
            tolerated,
            required,
        }
    }

    /// Apply the floor to an inherited standard. Values other than the
    /// tolerated one pass through unchanged.
    pub fn apply<'a>(&self, inherited: &'a str) -> &'a str {
        if inherited == self.tolerated {
            self.required
        } else {
            inherited
        }
    }
}
