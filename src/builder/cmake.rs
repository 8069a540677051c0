//! CMake configure arguments.
//!
//! Recipes emit `CMakeDefine`s; `CMakeInvocation` lays out the full
//! configure, build and install command lines an orchestrator would run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single `-DKEY=VALUE` cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CMakeDefine {
    pub key: String,
    pub value: String,
}

impl CMakeDefine {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        CMakeDefine {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A boolean rendered as the literal `True` or `False`.
    pub fn boolean(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, if value { "True" } else { "False" })
    }

    /// A switch rendered as `ON` or `OFF`.
    pub fn switch(key: impl Into<String>, on: bool) -> Self {
        Self::new(key, if on { "ON" } else { "OFF" })
    }

    /// A filesystem path.
    pub fn path(key: impl Into<String>, path: &Path) -> Self {
        Self::new(key, path.display().to_string())
    }

    /// Render as a command-line flag.
    pub fn to_flag(&self) -> String {
        format!("-D{}={}", self.key, self.value)
    }
}

impl fmt::Display for CMakeDefine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Find the value of `key` in a list of defines.
pub fn lookup<'a>(defines: &'a [CMakeDefine], key: &str) -> Option<&'a str> {
    defines
        .iter()
        .find(|d| d.key == key)
        .map(|d| d.value.as_str())
}

/// CMake command lines for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CMakeInvocation {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub install_prefix: PathBuf,
    pub build_type: String,
    pub defines: Vec<CMakeDefine>,
}

impl CMakeInvocation {
    pub fn new(source_dir: PathBuf, build_dir: PathBuf, install_prefix: PathBuf) -> Self {
        CMakeInvocation {
            source_dir,
            build_dir,
            install_prefix,
            build_type: "Release".to_string(),
            defines: Vec::new(),
        }
    }

    pub fn build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = build_type.into();
        self
    }

    pub fn defines(mut self, defines: impl IntoIterator<Item = CMakeDefine>) -> Self {
        self.defines.extend(defines);
        self
    }

    /// `cmake -S <src> -B <build> -D...`
    ///
    /// Standard entries come first; recipe defines follow in recipe order.
    pub fn configure_command(&self) -> Vec<String> {
        let mut cmd = vec![
            "cmake".to_string(),
            "-S".to_string(),
            self.source_dir.display().to_string(),
            "-B".to_string(),
            self.build_dir.display().to_string(),
            format!("-DCMAKE_BUILD_TYPE={}", self.build_type),
            format!("-DCMAKE_INSTALL_PREFIX={}", self.install_prefix.display()),
        ];
        cmd.extend(self.defines.iter().map(CMakeDefine::to_flag));
        cmd
    }

    /// `cmake --build <build> --parallel --config <type>`
    pub fn build_command(&self) -> Vec<String> {
        vec![
            "cmake".to_string(),
            "--build".to_string(),
            self.build_dir.display().to_string(),
            "--parallel".to_string(),
            "--config".to_string(),
            self.build_type.clone(),
        ]
    }

    /// `cmake --install <build> --config <type>`
    pub fn install_command(&self) -> Vec<String> {
        vec![
            "cmake".to_string(),
            "--install".to_string(),
            self.build_dir.display().to_string(),
            "--config".to_string(),
            self.build_type.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_rendering() {
        assert_eq!(CMakeDefine::boolean("BUILD_TESTING", false).to_flag(), "-DBUILD_TESTING=False");
        assert_eq!(CMakeDefine::boolean("X", true).value, "True");
        assert_eq!(CMakeDefine::switch("Boost_NO_BOOST_CMAKE", true).to_string(), "Boost_NO_BOOST_CMAKE=ON");
        assert_eq!(
            CMakeDefine::path("BOOST_ROOT", Path::new("/opt/boost")).to_flag(),
            "-DBOOST_ROOT=/opt/boost"
        );
    }

    #[test]
    fn test_lookup() {
        let defines = vec![CMakeDefine::new("A", "1"), CMakeDefine::new("B", "2")];
        assert_eq!(lookup(&defines, "B"), Some("2"));
        assert_eq!(lookup(&defines, "C"), None);
    }

    #[test]
    fn test_configure_command_order() {
        let inv = CMakeInvocation::new("/src".into(), "/build".into(), "/opt/pkg".into())
            .defines([CMakeDefine::new("FOO", "1"), CMakeDefine::new("BAR", "2")]);

        let cmd = inv.configure_command();
        assert_eq!(&cmd[..5], &["cmake", "-S", "/src", "-B", "/build"]);
        assert_eq!(cmd[5], "-DCMAKE_BUILD_TYPE=Release");
        assert_eq!(cmd[6], "-DCMAKE_INSTALL_PREFIX=/opt/pkg");
        assert_eq!(&cmd[7..], &["-DFOO=1", "-DBAR=2"]);
    }

    #[test]
    fn test_build_and_install_commands() {
        let inv = CMakeInvocation::new("/src".into(), "/build".into(), "/opt/pkg".into())
            .build_type("Debug");

        assert_eq!(inv.build_command().join(" "), "cmake --build /build --parallel --config Debug");
        assert_eq!(inv.install_command().join(" "), "cmake --install /build --config Debug");
    }
}
