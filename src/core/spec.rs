//! Resolved specs - the resolver's concrete answer.
//!
//! A `ResolvedSpec` assigns a version, variant values and an install prefix
//! to a root package and everything it depends on. Recipes only read it.
//!
//! On disk a spec is TOML (or JSON with the same shape):
//!
//! ```toml
//! root = "dd4hep"
//!
//! [nodes.dd4hep]
//! version = "1.12.1"
//! prefix = "/opt/dd4hep"
//! dependencies = ["boost", "root", "python"]
//! variants = { geant4 = true }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::core::condition::Subject;
use crate::core::errors::SpecError;
use crate::core::variant::VariantValue;
use crate::core::version::RecipeVersion;

/// Packages whose command carries the major version, e.g. `bin/python3`.
const MAJOR_SUFFIXED_COMMANDS: &[&str] = &["python"];

/// One concrete package in a resolved spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecNode {
    /// Filled from the node's key when loaded from a file.
    #[serde(default)]
    pub name: String,

    pub version: RecipeVersion,

    #[serde(default)]
    pub variants: BTreeMap<String, VariantValue>,

    /// Absolute install prefix.
    pub prefix: PathBuf,

    /// Executables that do not live at `<prefix>/bin/<name>`.
    #[serde(default)]
    pub executables: BTreeMap<String, PathBuf>,

    /// Names of direct dependencies.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl SpecNode {
    pub fn new(name: impl Into<String>, version: RecipeVersion, prefix: impl Into<PathBuf>) -> Self {
        SpecNode {
            name: name.into(),
            version,
            variants: BTreeMap::new(),
            prefix: prefix.into(),
            executables: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, value: impl Into<VariantValue>) -> Self {
        self.variants.insert(name.into(), value.into());
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn with_executable(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.executables.insert(name.into(), path.into());
        self
    }

    /// The variant value recorded on this node.
    pub fn variant_value(&self, name: &str) -> Option<&VariantValue> {
        self.variants.get(name)
    }

    /// Locate an executable installed by this package.
    pub fn executable(&self, exe: &str) -> PathBuf {
        self.executables
            .get(exe)
            .cloned()
            .unwrap_or_else(|| self.prefix.join("bin").join(exe))
    }

    /// The package's primary command, named after the package.
    ///
    /// Interpreters that install their command with the major version
    /// appended (`python3`) resolve to that name unless `executables`
    /// overrides it.
    pub fn command(&self) -> PathBuf {
        if let Some(path) = self.executables.get(&self.name) {
            return path.clone();
        }
        match self.version.as_release() {
            Some(v) if MAJOR_SUFFIXED_COMMANDS.contains(&self.name.as_str()) => {
                self.executable(&format!("{}{}", self.name, v.major))
            }
            _ => self.executable(&self.name),
        }
    }
}

impl Subject for SpecNode {
    fn version(&self) -> &RecipeVersion {
        &self.version
    }

    fn variant(&self, name: &str) -> Option<VariantValue> {
        self.variants.get(name).cloned()
    }
}

/// A validated, read-only resolved dependency graph.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSpec {
    root: String,
    nodes: BTreeMap<String, SpecNode>,
    /// Node names with dependencies before dependents.
    #[serde(skip)]
    order: Vec<String>,
}

#[derive(Deserialize)]
struct SpecFile {
    root: String,
    nodes: BTreeMap<String, SpecNode>,
}

impl ResolvedSpec {
    /// Build a spec from its nodes, checking that it is a well-formed DAG.
    pub fn new(
        root: impl Into<String>,
        nodes: impl IntoIterator<Item = SpecNode>,
    ) -> Result<Self, SpecError> {
        let mut map = BTreeMap::new();
        for node in nodes {
            if map.contains_key(&node.name) {
                return Err(SpecError::DuplicateNode { name: node.name });
            }
            map.insert(node.name.clone(), node);
        }

        Self::from_map(root.into(), map)
    }

    fn from_map(root: String, nodes: BTreeMap<String, SpecNode>) -> Result<Self, SpecError> {
        if !nodes.contains_key(&root) {
            return Err(SpecError::MissingRoot { root });
        }

        for node in nodes.values() {
            if !node.prefix.is_absolute() {
                return Err(SpecError::RelativePrefix {
                    package: node.name.clone(),
                    prefix: node.prefix.display().to_string(),
                });
            }
            for dep in &node.dependencies {
                if !nodes.contains_key(dep) {
                    return Err(SpecError::DanglingEdge {
                        from: node.name.clone(),
                        to: dep.clone(),
                    });
                }
            }
        }

        let order = build_order(&nodes)?;

        Ok(ResolvedSpec { root, nodes, order })
    }

    /// Parse a spec from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: SpecFile = toml::from_str(s).context("failed to parse resolved spec")?;
        Self::from_file(file)
    }

    /// Parse a spec from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: SpecFile = serde_json::from_str(s).context("failed to parse resolved spec")?;
        Self::from_file(file)
    }

    fn from_file(file: SpecFile) -> Result<Self> {
        let mut nodes = BTreeMap::new();
        for (key, mut node) in file.nodes {
            if node.name.is_empty() {
                node.name = key.clone();
            } else if node.name != key {
                return Err(SpecError::NameMismatch {
                    key,
                    name: node.name,
                }
                .into());
            }
            nodes.insert(key, node);
        }

        Ok(Self::from_map(file.root, nodes)?)
    }

    /// Load a spec file. Files ending in `.json` are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read resolved spec: {}", path.display()))?;

        let spec = if path.extension().is_some_and(|e| e == "json") {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
        .with_context(|| format!("invalid resolved spec: {}", path.display()))?;

        tracing::debug!(
            "Loaded spec for `{}` with {} nodes from {}",
            spec.root,
            spec.nodes.len(),
            path.display()
        );

        Ok(spec)
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn root(&self) -> &SpecNode {
        // Presence of the root is checked on construction.
        &self.nodes[&self.root]
    }

    pub fn node(&self, name: &str) -> Option<&SpecNode> {
        self.nodes.get(name)
    }

    /// Look up a node, failing if it is absent.
    pub fn get(&self, name: &str) -> Result<&SpecNode, SpecError> {
        self.nodes.get(name).ok_or_else(|| SpecError::UnknownNode {
            name: name.to_string(),
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SpecNode> {
        self.nodes.values()
    }

    /// Nodes ordered so that every node follows its dependencies.
    pub fn build_order(&self) -> impl Iterator<Item = &SpecNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }
}

fn build_order(nodes: &BTreeMap<String, SpecNode>) -> Result<Vec<String>, SpecError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let index: BTreeMap<&str, NodeIndex> = nodes
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    // Edges point from a dependency to its dependent.
    for node in nodes.values() {
        let to = index[node.name.as_str()];
        for dep in &node.dependencies {
            graph.update_edge(index[dep.as_str()], to, ());
        }
    }

    match toposort(&graph, None) {
        Ok(sorted) => Ok(sorted.into_iter().map(|i| graph[i].to_string()).collect()),
        Err(_) => {
            let packages = tarjan_scc(&graph)
                .into_iter()
                .find(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
                .map(|scc| {
                    let mut names: Vec<String> =
                        scc.iter().rev().map(|i| graph[*i].to_string()).collect();
                    names.push(names[0].clone());
                    names
                })
                .unwrap_or_default();
            Err(SpecError::Cycle { packages })
        }
    }
}
