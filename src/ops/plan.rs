//! Build plan generation.
//!
//! A BuildPlan lays out the lifecycle stages an orchestrator runs to install
//! the root package of a resolved spec: fetch, patch, configure, build and
//! install. Nothing is executed here.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

use crate::builder::cmake::CMakeInvocation;
use crate::core::{FetchSource, RecipeTable, ResolvedSpec, SelectedPatch};
use crate::util::config::Config;
use crate::util::hash::{sha256_str, Fingerprint};

/// Stage root used when the configuration does not name one.
pub const DEFAULT_STAGE_DIR: &str = "/tmp/quay-stage";

/// Build type used when the configuration does not name one.
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Inputs to planning that come from configuration rather than the spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// Archive mirror; archives are fetched from `<mirror>/<recipe>/<file>`.
    pub mirror: Option<Url>,
    pub build_type: String,
    pub stage_dir: PathBuf,
}

impl Default for PlanOptions {
    fn default() -> Self {
        PlanOptions {
            mirror: None,
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            stage_dir: PathBuf::from(DEFAULT_STAGE_DIR),
        }
    }
}

impl PlanOptions {
    pub fn from_config(config: &Config) -> Self {
        let defaults = PlanOptions::default();
        PlanOptions {
            mirror: config.fetch.mirror.clone(),
            build_type: config
                .build
                .build_type
                .clone()
                .unwrap_or(defaults.build_type),
            stage_dir: config.build.stage_dir.clone().unwrap_or(defaults.stage_dir),
        }
    }
}

/// A lifecycle stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Download or check out the sources into `dest`.
    Fetch { source: FetchSource, dest: PathBuf },
    /// Apply patches in order inside `source_dir`.
    Patch {
        source_dir: PathBuf,
        patches: Vec<SelectedPatch>,
    },
    Configure { command: Vec<String> },
    Build { command: Vec<String> },
    Install { command: Vec<String> },
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Fetch { .. } => "fetch",
            Stage::Patch { .. } => "patch",
            Stage::Configure { .. } => "configure",
            Stage::Build { .. } => "build",
            Stage::Install { .. } => "install",
        }
    }
}

/// A complete build plan for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub package: String,
    pub version: String,
    pub prefix: PathBuf,

    /// Stages in execution order
    pub stages: Vec<Stage>,

    /// Hash of the resolved spec the plan was made from
    pub spec_hash: String,

    fingerprint: String,
}

impl BuildPlan {
    /// Plan the build of `spec`'s root package.
    pub fn for_spec(table: &RecipeTable, spec: &ResolvedSpec, options: &PlanOptions) -> Result<Self> {
        let root = spec.root();
        let recipe = table.require(&root.name)?;

        let mut source = recipe
            .fetch_source(&root.version)
            .with_context(|| format!("cannot fetch {}@{}", root.name, root.version))?;
        let upstream = source.clone();
        if let Some(mirror) = &options.mirror {
            source = apply_mirror(source, mirror, recipe.name())?;
        }

        // Patch conditions see the same variant defaults as the hooks do.
        let bound = recipe.bind(spec)?;
        let patches: Vec<SelectedPatch> = recipe
            .patches_for(&bound)
            .into_iter()
            .map(SelectedPatch::from)
            .collect();
        let defines = recipe.cmake_args(spec)?;

        let work = work_dir(&options.stage_dir, &root.name, &root.version.to_string());
        let source_dir = work.join("src");
        let invocation = CMakeInvocation::new(
            source_dir.clone(),
            work.join("build"),
            root.prefix.clone(),
        )
        .build_type(options.build_type.clone())
        .defines(defines);

        let spec_json = serde_json::to_string(spec).context("failed to serialize spec")?;
        let spec_hash = sha256_str(&spec_json);

        let fingerprint = fingerprint_inputs(&upstream, &patches, &invocation, &spec_hash);

        let stages = vec![
            Stage::Fetch {
                source,
                dest: source_dir.clone(),
            },
            Stage::Patch {
                source_dir,
                patches,
            },
            Stage::Configure {
                command: invocation.configure_command(),
            },
            Stage::Build {
                command: invocation.build_command(),
            },
            Stage::Install {
                command: invocation.install_command(),
            },
        ];

        tracing::info!(
            "Planned {}@{} ({} stages, fingerprint {})",
            root.name,
            root.version,
            stages.len(),
            &fingerprint[..16]
        );

        Ok(BuildPlan {
            package: root.name.clone(),
            version: root.version.to_string(),
            prefix: root.prefix.clone(),
            stages,
            spec_hash,
            fingerprint,
        })
    }

    /// Build-cache key: equal plan inputs give equal fingerprints.
    ///
    /// The fetch location is not part of the key, so a mirrored plan shares
    /// its key with the upstream one.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name() == name)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize build plan")
    }

    /// Human-readable rendering.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}@{} -> {}\nfingerprint: {}\n",
            self.package,
            self.version,
            self.prefix.display(),
            self.fingerprint
        );
        for (i, stage) in self.stages.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n", i + 1, stage.name()));
            match stage {
                Stage::Fetch { source, dest } => {
                    out.push_str(&format!("   {}\n   into {}\n", source, dest.display()));
                }
                Stage::Patch { patches, .. } if patches.is_empty() => {
                    out.push_str("   (no patches)\n");
                }
                Stage::Patch { patches, .. } => {
                    for patch in patches {
                        out.push_str(&format!("   {} (-p{})\n", patch.file, patch.level));
                    }
                }
                Stage::Configure { command }
                | Stage::Build { command }
                | Stage::Install { command } => {
                    out.push_str(&format!("   {}\n", command.join(" ")));
                }
            }
        }
        out
    }
}

fn fingerprint_inputs(
    source: &FetchSource,
    patches: &[SelectedPatch],
    invocation: &CMakeInvocation,
    spec_hash: &str,
) -> String {
    let mut fp = Fingerprint::new();
    match source {
        FetchSource::Archive { sha256, .. } => {
            fp.update_str("archive").update_str(sha256.as_str());
        }
        FetchSource::Git { url, reference } => {
            fp.update_str("git").update_str(url).update_str(&reference.to_string());
        }
    }
    for patch in patches {
        fp.update_str(&patch.file).update_str(&patch.level.to_string());
    }
    fp.update_str(&invocation.build_type)
        .update_str(&invocation.install_prefix.display().to_string());
    fp.update_strs(invocation.defines.iter().map(|d| d.key.as_str()));
    fp.update_strs(invocation.defines.iter().map(|d| d.value.as_str()));
    fp.update_str(spec_hash);
    fp.finish()
}

/// Relocate an archive download to `<mirror>/<recipe>/<file name>`.
///
/// Git sources are left alone.
pub fn apply_mirror(source: FetchSource, mirror: &Url, recipe: &str) -> Result<FetchSource> {
    let FetchSource::Archive { url, sha256 } = source else {
        return Ok(source);
    };

    let upstream = Url::parse(&url).with_context(|| format!("invalid archive url: {}", url))?;
    let file = upstream
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .with_context(|| format!("archive url has no file name: {}", url))?;

    let mut base = mirror.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let relocated = base
        .join(&format!("{}/{}", recipe, file))
        .with_context(|| format!("cannot place {} under mirror {}", file, mirror))?;

    tracing::debug!("Mirrored {} -> {}", url, relocated);

    Ok(FetchSource::Archive {
        url: relocated.to_string(),
        sha256,
    })
}

/// Per-package work tree under the stage root.
pub fn work_dir(stage_dir: &Path, package: &str, version: &str) -> PathBuf {
    stage_dir.join(format!("{}-{}", package, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RecipeVersion, SpecNode};
    use crate::recipes::builtin_table;

    fn spec(version: RecipeVersion) -> ResolvedSpec {
        let mut root = SpecNode::new("dd4hep", version, "/opt/dd4hep").with_variant("geant4", true);
        for dep in ["cmake", "boost", "root", "python", "geant4"] {
            root = root.with_dependency(dep);
        }
        ResolvedSpec::new(
            "dd4hep",
            vec![
                root,
                SpecNode::new("cmake", RecipeVersion::release(3, 17, 3), "/opt/cmake"),
                SpecNode::new("boost", RecipeVersion::release(1, 72, 0), "/opt/boost"),
                SpecNode::new("root", RecipeVersion::release(6, 20, 4), "/opt/root")
                    .with_variant("cxxstd", "11"),
                SpecNode::new("python", RecipeVersion::release(3, 8, 5), "/opt/python"),
                SpecNode::new("geant4", RecipeVersion::release(10, 6, 2), "/opt/geant4"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_plan_stages_in_order() {
        let table = builtin_table().unwrap();
        let plan = BuildPlan::for_spec(
            &table,
            &spec(RecipeVersion::release(1, 12, 1)),
            &PlanOptions::default(),
        )
        .unwrap();

        let names: Vec<&str> = plan.stages.iter().map(Stage::name).collect();
        assert_eq!(names, ["fetch", "patch", "configure", "build", "install"]);

        match plan.stage("fetch").unwrap() {
            Stage::Fetch { source, dest } => {
                assert_eq!(
                    source.url(),
                    "https://github.com/AIDASoft/DD4hep/archive/v01-12-01.tar.gz"
                );
                assert_eq!(dest, &PathBuf::from("/tmp/quay-stage/dd4hep-1.12.1/src"));
            }
            other => panic!("unexpected stage: {:?}", other),
        }

        match plan.stage("patch").unwrap() {
            Stage::Patch { patches, .. } => {
                assert_eq!(patches.len(), 1);
                assert_eq!(patches[0].file, "tbb2.patch");
            }
            other => panic!("unexpected stage: {:?}", other),
        }

        match plan.stage("configure").unwrap() {
            Stage::Configure { command } => {
                assert!(command.contains(&"-DCMAKE_INSTALL_PREFIX=/opt/dd4hep".to_string()));
                assert!(command.contains(&"-DCMAKE_CXX_STANDARD=14".to_string()));
                assert!(command.contains(&"-DDD4HEP_USE_GEANT4=True".to_string()));
            }
            other => panic!("unexpected stage: {:?}", other),
        }
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let table = builtin_table().unwrap();
        let options = PlanOptions::default();
        let a = BuildPlan::for_spec(&table, &spec(RecipeVersion::release(1, 12, 1)), &options).unwrap();
        let b = BuildPlan::for_spec(&table, &spec(RecipeVersion::release(1, 12, 1)), &options).unwrap();
        let c = BuildPlan::for_spec(&table, &spec(RecipeVersion::release(1, 12, 0)), &options).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_ne!(a.fingerprint(), c.fingerprint());

        let debug = PlanOptions {
            build_type: "Debug".to_string(),
            ..PlanOptions::default()
        };
        let d = BuildPlan::for_spec(&table, &spec(RecipeVersion::release(1, 12, 1)), &debug).unwrap();
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    #[test]
    fn test_mirror_rewrites_archive_only() {
        let table = builtin_table().unwrap();
        let mirrored = PlanOptions {
            mirror: Some(Url::parse("https://mirror.example.org/sources").unwrap()),
            ..PlanOptions::default()
        };
        let upstream = BuildPlan::for_spec(
            &table,
            &spec(RecipeVersion::release(1, 10, 0)),
            &PlanOptions::default(),
        )
        .unwrap();
        let plan = BuildPlan::for_spec(&table, &spec(RecipeVersion::release(1, 10, 0)), &mirrored).unwrap();

        match plan.stage("fetch").unwrap() {
            Stage::Fetch { source, .. } => assert_eq!(
                source.url(),
                "https://mirror.example.org/sources/dd4hep/v01-10.tar.gz"
            ),
            other => panic!("unexpected stage: {:?}", other),
        }
        assert_eq!(plan.fingerprint(), upstream.fingerprint());

        let branch = BuildPlan::for_spec(&table, &spec(RecipeVersion::branch("master")), &mirrored).unwrap();
        match branch.stage("fetch").unwrap() {
            Stage::Fetch { source, .. } => {
                assert_eq!(source.url(), "https://github.com/AIDASoft/DD4hep.git")
            }
            other => panic!("unexpected stage: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_version_fails() {
        let table = builtin_table().unwrap();
        let err = BuildPlan::for_spec(
            &table,
            &spec(RecipeVersion::release(0, 9, 0)),
            &PlanOptions::default(),
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("cannot fetch dd4hep@0.9.0"));
    }

    #[test]
    fn test_json_and_text_output() {
        let table = builtin_table().unwrap();
        let plan = BuildPlan::for_spec(
            &table,
            &spec(RecipeVersion::release(1, 11, 0)),
            &PlanOptions::default(),
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(json["package"], "dd4hep");
        assert_eq!(json["stages"][0]["stage"], "fetch");
        assert_eq!(json["stages"][1]["patches"][0]["file"], "tbb-workarounds.patch");
        assert_eq!(json["fingerprint"], plan.fingerprint());

        let text = plan.render();
        assert!(text.starts_with("dd4hep@1.11.0 -> /opt/dd4hep"));
        assert!(text.contains("tbb-workarounds.patch (-p1)"));
    }

    #[test]
    fn test_patches_use_variant_defaults() {
        use crate::core::{Condition, DependencyDecl, Patch, Recipe, Variant, VariantValue, VersionEntry};

        let static_build = Condition::Variant {
            name: "shared".to_string(),
            value: VariantValue::Bool(false),
        };
        let recipe = Recipe::builder("app")
            .git(Url::parse("https://example.org/app.git").unwrap())
            .version(VersionEntry::branch("main"))
            .variant(Variant::toggle("shared", false, "Build shared libraries"))
            .patch(Patch::new("static-link.patch", static_build.clone()))
            .depends_on(DependencyDecl::new("static-helper").when(static_build))
            .build()
            .unwrap();
        let mut table = RecipeTable::new();
        table.insert(recipe).unwrap();

        let spec = ResolvedSpec::new(
            "app",
            vec![SpecNode::new("app", RecipeVersion::branch("main"), "/opt/app")],
        )
        .unwrap();

        let recipe = table.require("app").unwrap();
        let bound = recipe.bind(&spec).unwrap();
        let deps: Vec<&str> = recipe.dependencies_for(&bound).map(|d| d.name()).collect();
        assert_eq!(deps, ["static-helper"]);

        let plan = BuildPlan::for_spec(&table, &spec, &PlanOptions::default()).unwrap();
        match plan.stage("patch").unwrap() {
            Stage::Patch { patches, .. } => {
                assert_eq!(patches.len(), 1);
                assert_eq!(patches[0].file, "static-link.patch");
            }
            other => panic!("unexpected stage: {:?}", other),
        }
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.build.build_type = Some("RelWithDebInfo".to_string());
        let options = PlanOptions::from_config(&config);
        assert_eq!(options.build_type, "RelWithDebInfo");
        assert_eq!(options.stage_dir, PathBuf::from(DEFAULT_STAGE_DIR));
        assert!(options.mirror.is_none());
    }
}
