//! Built-in recipes.

pub mod dd4hep;

use url::Url;

use crate::core::{RecipeError, RecipeTable};

/// Build the table of every built-in recipe.
pub fn builtin_table() -> Result<RecipeTable, RecipeError> {
    let mut table = RecipeTable::new();
    table.insert(dd4hep::recipe()?)?;
    Ok(table)
}

pub(crate) fn parse_url(s: &str) -> Result<Url, RecipeError> {
    Url::parse(s).map_err(|source| RecipeError::InvalidUrl {
        url: s.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = builtin_table().unwrap();
        assert!(table.contains("dd4hep"));
        for recipe in table.iter() {
            recipe.validate().unwrap();
        }
    }
}
