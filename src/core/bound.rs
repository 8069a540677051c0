//! A recipe bound to the resolved spec it is being built for.

use crate::core::condition::Subject;
use crate::core::errors::RecipeError;
use crate::core::recipe::Recipe;
use crate::core::spec::{ResolvedSpec, SpecNode};
use crate::core::variant::VariantValue;
use crate::core::version::RecipeVersion;

/// The view a recipe hook gets of the spec: the root node plus lookups into
/// its dependencies. Variants the resolver left unset fall back to the
/// recipe's declared defaults.
#[derive(Debug, Clone, Copy)]
pub struct BoundSpec<'a> {
    recipe: &'a Recipe,
    spec: &'a ResolvedSpec,
    node: &'a SpecNode,
}

impl<'a> BoundSpec<'a> {
    /// Bind `recipe` to `spec`. The spec must be rooted at the recipe.
    pub fn new(recipe: &'a Recipe, spec: &'a ResolvedSpec) -> Result<Self, RecipeError> {
        if spec.root_name() != recipe.name() {
            return Err(RecipeError::SpecMismatch {
                recipe: recipe.name().to_string(),
                root: spec.root_name().to_string(),
            });
        }

        Ok(BoundSpec {
            recipe,
            spec,
            node: spec.root(),
        })
    }

    pub fn recipe(&self) -> &'a Recipe {
        self.recipe
    }

    pub fn spec(&self) -> &'a ResolvedSpec {
        self.spec
    }

    pub fn node(&self) -> &'a SpecNode {
        self.node
    }

    /// Effective value of one of the recipe's variants.
    pub fn variant_value(&self, name: &str) -> Option<VariantValue> {
        self.node
            .variant_value(name)
            .cloned()
            .or_else(|| self.recipe.variant(name).map(|v| v.default.clone()))
    }

    /// Whether a boolean variant is enabled (`+name`).
    pub fn enabled(&self, name: &str) -> bool {
        self.variant_value(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// The resolved node of a dependency.
    pub fn dependency(&self, name: &str) -> Result<&'a SpecNode, RecipeError> {
        self.spec
            .node(name)
            .ok_or_else(|| RecipeError::MissingDependency {
                recipe: self.recipe.name().to_string(),
                dependency: name.to_string(),
            })
    }

    /// A variant value recorded on a dependency's node.
    pub fn dependency_variant(&self, dep: &str, variant: &str) -> Result<&'a VariantValue, RecipeError> {
        self.dependency(dep)?
            .variant_value(variant)
            .ok_or_else(|| RecipeError::MissingVariant {
                package: dep.to_string(),
                variant: variant.to_string(),
            })
    }
}

impl Subject for BoundSpec<'_> {
    fn version(&self) -> &RecipeVersion {
        &self.node.version
    }

    fn variant(&self, name: &str) -> Option<VariantValue> {
        self.variant_value(name)
    }
}
