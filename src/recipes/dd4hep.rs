//! DD4hep detector description toolkit.

use semver::Version;

use crate::builder::cmake::CMakeDefine;
use crate::core::{
    BoundSpec, BuildHooks, Condition, CxxFloor, DepType, DependencyDecl, Patch, Recipe,
    RecipeError, RecipeVersion, Variant, VersionEntry,
};
use crate::recipes::parse_url;

pub const NAME: &str = "dd4hep";

const ARCHIVE_BASE: &str = "https://github.com/AIDASoft/DD4hep/archive";

const DESCRIPTION: &str = "\
DD4hep is a software framework for providing a complete solution for full
detector description (geometry, materials, visualization, readout, alignment,
calibration, etc.) for the full experiment life cycle (detector concept
development, detector optimization, construction, operation). It offers a
consistent description through a single source of detector information for
simulation, reconstruction, analysis, etc. It is distributed under the LGPLv3
License.";

/// `(major, minor, patch, sha256)`, newest first.
const RELEASES: &[(u64, u64, u64, &str)] = &[
    (1, 12, 1, "85e8c775ec03c499ce10911e228342e757c81ce9ef2a9195cb253b85175a2e93"),
    (1, 12, 0, "133a1fb8ce0466d2482f3ebb03e60b3bebb9b2d3e33d14ba15c8fbb91706b398"),
    (1, 11, 2, "96a53dd26cb8df11c6dae54669fbc9cc3c90dd47c67e07b24be9a1341c95abc4"),
    (1, 11, 1, "d7902dd7f6744bbda92f6e303ad5a3410eec4a0d2195cdc86f6c1167e72893f0"),
    (1, 11, 0, "25643296f15f9d11ad4ad550b7c3b92e8974fc56f1ee8e4455501010789ae7b6"),
    (1, 10, 0, "1d6b5d1c368dc8bcedd9c61b7c7e1a44bad427f8bd34932516aff47c88a31d95"),
];

/// Build the DD4hep recipe.
pub fn recipe() -> Result<Recipe, RecipeError> {
    let mut builder = Recipe::builder(NAME)
        .description(DESCRIPTION)
        .homepage(parse_url("https://dd4hep.web.cern.ch/dd4hep/")?)
        .url(format!("{}/v01-12-01.tar.gz", ARCHIVE_BASE))
        .git(parse_url("https://github.com/AIDASoft/DD4hep.git")?)
        .maintainers(&["vvolkl", "drbenmorgan"])
        .version(VersionEntry::branch("master"));

    for &(major, minor, patch, sha256) in RELEASES {
        builder = builder.version(VersionEntry::archive(
            RecipeVersion::release(major, minor, patch),
            sha256,
        )?);
    }

    builder
        // Workarounds for TBB issues in the v1.11 and v1.12 series.
        .patch(Patch::new(
            "tbb-workarounds.patch",
            Condition::at(RecipeVersion::release(1, 11, 0)),
        ))
        .patch(Patch::new(
            "tbb2.patch",
            Condition::at(RecipeVersion::release(1, 12, 1)),
        ))
        .variant(Variant::toggle(
            "xercesc",
            false,
            "Enable 'Detector Builders' based on XercesC",
        ))
        .variant(Variant::toggle(
            "geant4",
            false,
            "Enable the simulation part based on Geant4",
        ))
        .variant(Variant::toggle("testing", false, "Enable and build tests"))
        .depends_on(
            DependencyDecl::new("cmake")
                .with_version_req(req(">=3.12")?)
                .with_types(&[DepType::Build]),
        )
        .depends_on(DependencyDecl::new("boost").with_version_req(req(">=1.49")?))
        .depends_on(
            DependencyDecl::new("root")
                .with_version_req(req(">=6.8")?)
                .with_variant("gdml", true)
                .with_variant("math", true)
                .with_variant("opengl", true)
                .with_variant("python", true)
                .with_variant("x", true),
        )
        .depends_on(DependencyDecl::extension_of("python"))
        .depends_on(DependencyDecl::new("xerces-c").when(Condition::enabled("xercesc")))
        .depends_on(
            DependencyDecl::new("geant4")
                .with_version_req(req(">=10.2.2")?)
                .when(Condition::enabled("geant4")),
        )
        // ROOT may be built with C++11, DD4hep itself needs C++14.
        .cxx_floor(CxxFloor::new("11", "14"))
        .hooks(Dd4hepHooks)
        .build()
}

fn req(s: &str) -> Result<semver::VersionReq, RecipeError> {
    s.parse().map_err(|_| RecipeError::InvalidVersion {
        token: s.to_string(),
    })
}

/// Release archives are tagged `vMM-mm-pp`, zero padded, with the patch
/// component dropped when it is zero: `v01-12-01`, `v01-10`.
pub fn archive_url(version: &Version) -> String {
    if version.patch == 0 {
        format!("{}/v{:02}-{:02}.tar.gz", ARCHIVE_BASE, version.major, version.minor)
    } else {
        format!(
            "{}/v{:02}-{:02}-{:02}.tar.gz",
            ARCHIVE_BASE, version.major, version.minor, version.patch
        )
    }
}

struct Dd4hepHooks;

impl BuildHooks for Dd4hepHooks {
    fn url_for_version(&self, _recipe: &Recipe, version: &Version) -> Result<String, RecipeError> {
        Ok(archive_url(version))
    }

    fn cmake_args(&self, spec: &BoundSpec<'_>) -> Result<Vec<CMakeDefine>, RecipeError> {
        let inherited = spec.dependency_variant("root", "cxxstd")?.as_text();
        let cxxstd = match spec.recipe().cxx_floor() {
            Some(floor) => floor.apply(&inherited).to_string(),
            None => inherited,
        };

        let boost = spec.dependency("boost")?;
        let python = spec.dependency("python")?;

        Ok(vec![
            CMakeDefine::new("CMAKE_CXX_STANDARD", cxxstd),
            CMakeDefine::boolean("DD4HEP_USE_XERCESC", spec.enabled("xercesc")),
            CMakeDefine::boolean("DD4HEP_USE_GEANT4", spec.enabled("geant4")),
            CMakeDefine::boolean("BUILD_TESTING", spec.enabled("testing")),
            CMakeDefine::path("BOOST_ROOT", &boost.prefix),
            CMakeDefine::switch("Boost_NO_BOOST_CMAKE", true),
            CMakeDefine::path("PYTHON_EXECUTABLE", &python.command()),
        ])
    }
}
