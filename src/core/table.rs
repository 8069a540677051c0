//! Recipe table - the explicit set of recipes handed to a resolver.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::errors::RecipeError;
use crate::core::recipe::Recipe;

/// Recipes keyed by name.
///
/// The table is built once at startup and passed to whatever needs to look
/// recipes up; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct RecipeTable {
    recipes: BTreeMap<String, Arc<Recipe>>,
}

impl RecipeTable {
    pub fn new() -> Self {
        RecipeTable {
            recipes: BTreeMap::new(),
        }
    }

    /// Add a recipe. Names must be unique.
    pub fn insert(&mut self, recipe: Recipe) -> Result<(), RecipeError> {
        if self.recipes.contains_key(recipe.name()) {
            return Err(RecipeError::DuplicateRecipe {
                name: recipe.name().to_string(),
            });
        }

        tracing::debug!("Registered recipe {}", recipe.name());
        self.recipes.insert(recipe.name().to_string(), Arc::new(recipe));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Recipe>> {
        self.recipes.get(name)
    }

    /// Look up a recipe, suggesting close names when it is missing.
    pub fn require(&self, name: &str) -> Result<&Arc<Recipe>, RecipeError> {
        self.recipes.get(name).ok_or_else(|| RecipeError::UnknownRecipe {
            name: name.to_string(),
            suggestions: self.similar_names(name),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    /// Recipe names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.recipes.values()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    fn similar_names(&self, name: &str) -> Vec<String> {
        let needle = name.to_ascii_lowercase();
        self.recipes
            .keys()
            .filter(|k| {
                let k = k.to_ascii_lowercase();
                k.contains(&needle) || needle.contains(&k)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::VersionEntry;

    fn recipe(name: &str) -> Recipe {
        Recipe::builder(name)
            .git(url::Url::parse("https://example.org/x.git").unwrap())
            .version(VersionEntry::branch("main"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = RecipeTable::new();
        table.insert(recipe("geant4")).unwrap();
        table.insert(recipe("boost")).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.contains("boost"));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["boost", "geant4"]);
        assert_eq!(table.get("geant4").unwrap().name(), "geant4");
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = RecipeTable::new();
        table.insert(recipe("boost")).unwrap();
        let err = table.insert(recipe("boost")).unwrap_err();
        assert!(matches!(err, RecipeError::DuplicateRecipe { .. }));
    }

    #[test]
    fn test_require_suggests() {
        let mut table = RecipeTable::new();
        table.insert(recipe("dd4hep")).unwrap();

        match table.require("DD4hep").unwrap_err() {
            RecipeError::UnknownRecipe { suggestions, .. } => {
                assert_eq!(suggestions, vec!["dd4hep".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
