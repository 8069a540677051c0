//! Recipe descriptors.
//!
//! A `Recipe` is an immutable record describing one external package: its
//! identity, fetchable versions, patches, variants and dependencies, plus
//! the build hooks the orchestrator calls during fetch and configure.
//! Recipes are assembled once through [`RecipeBuilder`], which validates
//! them, and are shared behind `Arc` afterwards.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use semver::Version;
use url::Url;

use crate::builder::cmake::CMakeDefine;
use crate::core::bound::BoundSpec;
use crate::core::condition::{Condition, Subject};
use crate::core::cxxstd::CxxFloor;
use crate::core::dependency::DependencyDecl;
use crate::core::errors::RecipeError;
use crate::core::patch::Patch;
use crate::core::source::{FetchSource, FetchStrategy, VersionEntry};
use crate::core::spec::ResolvedSpec;
use crate::core::variant::Variant;
use crate::core::version::RecipeVersion;

/// Placeholder substituted by the default URL hook.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Per-recipe build logic.
///
/// Both hooks must be pure: the same inputs always produce the same output,
/// and nothing outside the arguments is read.
pub trait BuildHooks: Send + Sync {
    /// Archive URL for a release.
    ///
    /// The default substitutes the release into the recipe's URL template.
    fn url_for_version(&self, recipe: &Recipe, version: &Version) -> Result<String, RecipeError> {
        if recipe.url().contains(VERSION_PLACEHOLDER) {
            Ok(recipe.url().replace(VERSION_PLACEHOLDER, &version.to_string()))
        } else {
            Err(RecipeError::UnsupportedVersion {
                recipe: recipe.name().to_string(),
                version: version.to_string(),
                reason: "url has no version placeholder".to_string(),
            })
        }
    }

    /// CMake cache entries for the bound spec, in emission order.
    fn cmake_args(&self, _spec: &BoundSpec<'_>) -> Result<Vec<CMakeDefine>, RecipeError> {
        Ok(Vec::new())
    }
}

/// Hooks for recipes that need no custom logic.
pub struct DefaultHooks;

impl BuildHooks for DefaultHooks {}

/// An immutable package recipe.
pub struct Recipe {
    name: String,
    description: String,
    homepage: Option<Url>,
    url: String,
    git: Option<Url>,
    maintainers: Vec<String>,
    versions: Vec<VersionEntry>,
    patches: Vec<Patch>,
    variants: Vec<Variant>,
    dependencies: Vec<DependencyDecl>,
    cxx_floor: Option<CxxFloor>,
    hooks: Arc<dyn BuildHooks>,
}

impl Recipe {
    /// Start declaring a recipe.
    pub fn builder(name: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// First line of the description.
    pub fn summary(&self) -> &str {
        self.description.lines().next().unwrap_or_default()
    }

    pub fn homepage(&self) -> Option<&Url> {
        self.homepage.as_ref()
    }

    /// The archive URL (or URL template) as declared.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn git(&self) -> Option<&Url> {
        self.git.as_ref()
    }

    pub fn maintainers(&self) -> &[String] {
        &self.maintainers
    }

    /// Declared versions, in declaration order.
    pub fn versions(&self) -> &[VersionEntry] {
        &self.versions
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn dependencies(&self) -> &[DependencyDecl] {
        &self.dependencies
    }

    pub fn cxx_floor(&self) -> Option<&CxxFloor> {
        self.cxx_floor.as_ref()
    }

    /// Look up a declared version.
    pub fn version_entry(&self, version: &RecipeVersion) -> Result<&VersionEntry, RecipeError> {
        self.versions
            .iter()
            .find(|e| &e.version == version)
            .ok_or_else(|| RecipeError::UnknownVersion {
                recipe: self.name.clone(),
                version: version.to_string(),
                available: self.versions.iter().map(|e| e.version.to_string()).collect(),
            })
    }

    /// The newest declared release; branches are never preferred.
    pub fn preferred_version(&self) -> Option<&RecipeVersion> {
        self.versions
            .iter()
            .map(|e| &e.version)
            .filter(|v| !v.is_branch())
            .max()
    }

    /// Archive URL for a release version.
    pub fn url_for_version(&self, version: &RecipeVersion) -> Result<String, RecipeError> {
        match version {
            RecipeVersion::Release(v) => self.hooks.url_for_version(self, v),
            RecipeVersion::Branch(_) => Err(RecipeError::UnsupportedVersion {
                recipe: self.name.clone(),
                version: version.to_string(),
                reason: "branch versions are fetched from git, not from an archive".to_string(),
            }),
        }
    }

    /// Where the fetch layer should get a declared version from.
    pub fn fetch_source(&self, version: &RecipeVersion) -> Result<FetchSource, RecipeError> {
        let entry = self.version_entry(version)?;

        match &entry.fetch {
            FetchStrategy::Archive { sha256 } => Ok(FetchSource::Archive {
                url: self.url_for_version(version)?,
                sha256: sha256.clone(),
            }),
            FetchStrategy::Git { reference } => {
                let git = self.git.as_ref().ok_or_else(|| RecipeError::InvalidRecipe {
                    recipe: self.name.clone(),
                    reason: "git version declared without a git url".to_string(),
                })?;
                Ok(FetchSource::Git {
                    url: git.to_string(),
                    reference: reference.clone(),
                })
            }
        }
    }

    /// Patches that apply to `subject`, in declaration order.
    pub fn patches_for(&self, subject: &dyn Subject) -> Vec<&Patch> {
        self.patches
            .iter()
            .filter(|p| p.applies_to(subject))
            .collect()
    }

    /// Dependency declarations active for `subject`.
    pub fn dependencies_for<'a>(
        &'a self,
        subject: &'a dyn Subject,
    ) -> impl Iterator<Item = &'a DependencyDecl> + 'a {
        self.dependencies
            .iter()
            .filter(move |d| d.condition().holds(subject))
    }

    /// Bind this recipe to a spec rooted at it.
    pub fn bind<'a>(&'a self, spec: &'a ResolvedSpec) -> Result<BoundSpec<'a>, RecipeError> {
        BoundSpec::new(self, spec)
    }

    /// CMake cache entries for `spec`.
    pub fn cmake_args(&self, spec: &ResolvedSpec) -> Result<Vec<CMakeDefine>, RecipeError> {
        let bound = self.bind(spec)?;
        let args = self.hooks.cmake_args(&bound)?;

        tracing::debug!(
            "Synthesized {} cmake args for {}@{}",
            args.len(),
            self.name,
            bound.node().version
        );

        Ok(args)
    }

    /// Check the recipe's declarations for internal consistency.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let invalid = |reason: String| RecipeError::InvalidRecipe {
            recipe: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("recipe name is empty".to_string()));
        }
        if self.versions.is_empty() {
            return Err(invalid("no versions declared".to_string()));
        }

        let mut seen = HashSet::new();
        for entry in &self.versions {
            if !seen.insert(&entry.version) {
                return Err(invalid(format!("version `{}` declared twice", entry.version)));
            }

            match (&entry.version, &entry.fetch) {
                (RecipeVersion::Branch(_), FetchStrategy::Archive { .. }) => {
                    return Err(invalid(format!(
                        "branch `{}` cannot be pinned to an archive",
                        entry.version
                    )));
                }
                (RecipeVersion::Release(_), FetchStrategy::Archive { .. }) => {
                    self.url_for_version(&entry.version)?;
                }
                (_, FetchStrategy::Git { reference }) => {
                    if self.git.is_none() {
                        return Err(invalid(format!(
                            "version `{}` tracks git but no git url is declared",
                            entry.version
                        )));
                    }
                    if !entry.version.is_branch() && reference.is_mutable() {
                        return Err(invalid(format!(
                            "release `{}` must not track a moving branch",
                            entry.version
                        )));
                    }
                }
            }
        }

        let mut names = HashSet::new();
        for variant in &self.variants {
            if !names.insert(variant.name.as_str()) {
                return Err(invalid(format!("variant `{}` declared twice", variant.name)));
            }
            if !variant.accepts(&variant.default) {
                return Err(invalid(format!(
                    "default of variant `{}` is not an allowed value",
                    variant.name
                )));
            }
        }

        for patch in &self.patches {
            self.check_condition(&patch.when, &format!("patch `{}`", patch.file))?;
        }

        let mut decls = HashSet::new();
        for dep in &self.dependencies {
            self.check_condition(dep.condition(), &format!("dependency `{}`", dep.name()))?;
            if !decls.insert((dep.name(), dep.condition().to_string())) {
                return Err(invalid(format!(
                    "dependency `{}` declared twice for `{}`",
                    dep.name(),
                    dep.condition()
                )));
            }
        }

        Ok(())
    }

    /// Conditions may only mention declared variants and versions.
    fn check_condition(&self, cond: &Condition, owner: &str) -> Result<(), RecipeError> {
        let invalid = |reason: String| RecipeError::InvalidRecipe {
            recipe: self.name.clone(),
            reason,
        };

        match cond {
            Condition::Always | Condition::Version(_) => Ok(()),
            Condition::VersionEq(v) => {
                if self.versions.iter().any(|e| &e.version == v) {
                    Ok(())
                } else {
                    Err(invalid(format!("{} targets undeclared version `{}`", owner, v)))
                }
            }
            Condition::Variant { name, value } => match self.variant(name) {
                Some(variant) if variant.accepts(value) => Ok(()),
                Some(_) => Err(invalid(format!(
                    "{} compares variant `{}` with invalid value `{}`",
                    owner, name, value
                ))),
                None => Err(invalid(format!("{} uses undeclared variant `{}`", owner, name))),
            },
            Condition::All(conds) | Condition::Any(conds) => conds
                .iter()
                .try_for_each(|c| self.check_condition(c, owner)),
            Condition::Not(inner) => self.check_condition(inner, owner),
        }
    }
}

impl fmt::Debug for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("name", &self.name)
            .field("versions", &self.versions.len())
            .field("variants", &self.variants.len())
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Assembles a [`Recipe`].
pub struct RecipeBuilder {
    recipe: Recipe,
}

impl RecipeBuilder {
    fn new(name: impl Into<String>) -> Self {
        RecipeBuilder {
            recipe: Recipe {
                name: name.into(),
                description: String::new(),
                homepage: None,
                url: String::new(),
                git: None,
                maintainers: Vec::new(),
                versions: Vec::new(),
                patches: Vec::new(),
                variants: Vec::new(),
                dependencies: Vec::new(),
                cxx_floor: None,
                hooks: Arc::new(DefaultHooks),
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.recipe.description = description.into();
        self
    }

    pub fn homepage(mut self, homepage: Url) -> Self {
        self.recipe.homepage = Some(homepage);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.recipe.url = url.into();
        self
    }

    pub fn git(mut self, git: Url) -> Self {
        self.recipe.git = Some(git);
        self
    }

    pub fn maintainers(mut self, maintainers: &[&str]) -> Self {
        self.recipe.maintainers = maintainers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn version(mut self, entry: VersionEntry) -> Self {
        self.recipe.versions.push(entry);
        self
    }

    pub fn patch(mut self, patch: Patch) -> Self {
        self.recipe.patches.push(patch);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.recipe.variants.push(variant);
        self
    }

    pub fn depends_on(mut self, dep: DependencyDecl) -> Self {
        self.recipe.dependencies.push(dep);
        self
    }

    pub fn cxx_floor(mut self, floor: CxxFloor) -> Self {
        self.recipe.cxx_floor = Some(floor);
        self
    }

    pub fn hooks(mut self, hooks: impl BuildHooks + 'static) -> Self {
        self.recipe.hooks = Arc::new(hooks);
        self
    }

    /// Validate and finish the recipe.
    pub fn build(self) -> Result<Recipe, RecipeError> {
        self.recipe.validate()?;
        Ok(self.recipe)
    }
}
