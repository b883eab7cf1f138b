//! The `Berth.toml` recipe.
//!
//! A recipe declares everything a run needs up front: settings,
//! requirements, generators, CMake definitions, test report arguments and
//! artifact import rules.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml_edit::{DocumentMut, Value};

use crate::builder::definitions::{Definitions, BUILD_TESTING};
use crate::builder::errors::RecipeError;
use crate::builder::generator::Generator;
use crate::core::requirement::{validate_requirements, Requirement};
use crate::core::settings::SettingsSpec;
use crate::ops::imports::{default_import_rules, ImportRule};

/// Recipe file name.
pub const RECIPE_FILE: &str = "Berth.toml";

/// Test report arguments used when a recipe names none.
pub fn default_test_args() -> Vec<String> {
    vec!["--".to_string(), "ARGS=-T Test".to_string()]
}

/// Metadata from the `[recipe]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeMetadata {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// The `[build]` table.
#[derive(Debug, Clone, Default)]
pub struct BuildSection {
    /// CMake generator (`-G`)
    pub generator: Option<String>,
    /// Whether test targets are built
    pub testing: bool,
    /// Parallel build jobs
    pub jobs: Option<usize>,
    /// Definitions in document order, `BUILD_TESTING` excluded
    pub definitions: Definitions,
}

/// A parsed recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub metadata: RecipeMetadata,
    pub settings: SettingsSpec,
    pub requires: Vec<Requirement>,
    pub generators: Vec<Generator>,
    pub build: BuildSection,
    /// Arguments forwarded verbatim to the test step
    pub test_args: Vec<String>,
    pub imports: Vec<ImportRule>,
    /// Directory containing the recipe; the CMake source directory
    pub recipe_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    recipe: RecipeMetadata,

    #[serde(default)]
    settings: SettingsSpec,

    #[serde(default)]
    requires: Vec<Requirement>,

    #[serde(default)]
    generators: Vec<String>,

    #[serde(default)]
    build: RawBuild,

    #[serde(default)]
    test: RawTest,

    #[serde(default)]
    imports: Option<Vec<ImportRule>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuild {
    #[serde(default)]
    generator: Option<String>,

    #[serde(default)]
    testing: Option<bool>,

    #[serde(default)]
    jobs: Option<usize>,

    // Read again with toml_edit to keep document order.
    #[serde(default)]
    #[allow(dead_code)]
    definitions: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTest {
    #[serde(default)]
    args: Option<Vec<String>>,
}

impl Recipe {
    /// Load a recipe from a file path.
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecipeError::configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, path)
    }

    /// Parse recipe content. `path` locates the source directory and is
    /// used in messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, RecipeError> {
        let raw: RawRecipe = toml::from_str(content).map_err(|e| {
            RecipeError::configuration(format!("failed to parse {}: {}", path.display(), e))
        })?;

        validate_requirements(&raw.requires)?;

        let generators = raw
            .generators
            .iter()
            .map(|g| g.parse::<Generator>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut definitions = ordered_definitions(content)?;
        let defined_testing = definitions
            .remove(BUILD_TESTING)
            .map(|v| cmake_truthy(&v));
        let testing = raw.build.testing.or(defined_testing).unwrap_or(true);

        if raw.build.jobs == Some(0) {
            return Err(RecipeError::configuration("build.jobs must be at least 1"));
        }

        let recipe_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        Ok(Recipe {
            metadata: raw.recipe,
            settings: raw.settings,
            requires: raw.requires,
            generators,
            build: BuildSection {
                generator: raw.build.generator,
                testing,
                jobs: raw.build.jobs,
                definitions,
            },
            test_args: raw.test.args.unwrap_or_else(default_test_args),
            imports: raw.imports.unwrap_or_else(default_import_rules),
            recipe_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Read `[build.definitions]` in document order.
fn ordered_definitions(content: &str) -> Result<Definitions, RecipeError> {
    let doc: DocumentMut = content
        .parse()
        .map_err(|e| RecipeError::configuration(format!("failed to parse recipe: {}", e)))?;

    let mut defs = Definitions::new();
    let Some(table) = doc
        .get("build")
        .and_then(|b| b.get("definitions"))
        .and_then(|d| d.as_table_like())
    else {
        return Ok(defs);
    };

    for (key, item) in table.iter() {
        let value = match item.as_value() {
            Some(Value::String(s)) => s.value().clone(),
            Some(Value::Boolean(b)) => (if *b.value() { "ON" } else { "OFF" }).to_string(),
            Some(Value::Integer(i)) => i.value().to_string(),
            _ => {
                return Err(RecipeError::configuration(format!(
                    "definition `{}` must be a string, boolean or integer",
                    key
                )))
            }
        };
        defs.insert(key, value);
    }

    Ok(defs)
}

/// CMake's notion of a true constant.
pub fn cmake_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_uppercase().as_str(),
        "1" | "ON" | "YES" | "TRUE" | "Y"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPPMCTS: &str = r#"
requires = ["catch2/2.12.2", "qt/5.12.9@bincrafters/stable"]
generators = ["cmake"]

[recipe]
name = "cppmcts"
version = "0.1.0"

[settings]
os = "Linux"
compiler = "gcc"
build_type = "Release"
arch = "x86_64"

[build.definitions]
CMAKE_EXPORT_COMPILE_COMMANDS = "TRUE"
BUILD_TESTING = "TRUE"
"#;

    fn parse(content: &str) -> Result<Recipe, RecipeError> {
        Recipe::parse(content, Path::new("/work/cppmcts/Berth.toml"))
    }

    #[test]
    fn test_parse_full_recipe() {
        let recipe = parse(CPPMCTS).unwrap();

        assert_eq!(recipe.name(), "cppmcts");
        assert_eq!(recipe.requires.len(), 2);
        assert_eq!(recipe.generators, vec![Generator::CMake]);
        assert_eq!(recipe.settings.validate().unwrap().build_type(), "Release");
        assert_eq!(recipe.recipe_dir, PathBuf::from("/work/cppmcts"));

        // BUILD_TESTING folds into the testing toggle.
        assert!(recipe.build.testing);
        assert_eq!(recipe.build.definitions.get(BUILD_TESTING), None);
        assert_eq!(
            recipe.build.definitions.get("CMAKE_EXPORT_COMPILE_COMMANDS"),
            Some("TRUE")
        );

        assert_eq!(recipe.test_args, default_test_args());
        assert_eq!(recipe.imports, default_import_rules());
    }

    #[test]
    fn test_definitions_keep_document_order() {
        let recipe = parse(
            r#"
[recipe]
name = "ordered"

[build.definitions]
ZETA = "1"
ALPHA = true
MID = 3
"#,
        )
        .unwrap();

        assert_eq!(
            recipe.build.definitions.to_args(),
            vec!["-DZETA=1", "-DALPHA=ON", "-DMID=3"]
        );
    }

    #[test]
    fn test_testing_key_wins_over_definition() {
        let recipe = parse(
            r#"
[recipe]
name = "x"

[build]
testing = false

[build.definitions]
BUILD_TESTING = "ON"
"#,
        )
        .unwrap();
        assert!(!recipe.build.testing);
    }

    #[test]
    fn test_testing_from_definition() {
        let recipe = parse(
            r#"
[recipe]
name = "x"

[build.definitions]
BUILD_TESTING = "OFF"
"#,
        )
        .unwrap();
        assert!(!recipe.build.testing);
    }

    #[test]
    fn test_custom_test_args_and_imports() {
        let recipe = parse(
            r#"
[recipe]
name = "x"

[test]
args = ["--", "ARGS=--output-junit report.xml"]

[[imports]]
pattern = "*.so"
dst = "lib"
src = "lib"
"#,
        )
        .unwrap();

        assert_eq!(recipe.test_args[1], "ARGS=--output-junit report.xml");
        assert_eq!(recipe.imports.len(), 1);
        assert_eq!(recipe.imports[0].pattern, "*.so");
    }

    #[test]
    fn test_rejects_unknown_generator() {
        let err = parse("generators = [\"premake\"]\n[recipe]\nname = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("premake"));
    }

    #[test]
    fn test_rejects_duplicate_requirement() {
        let err = parse("requires = [\"a/1.0\", \"a/2.0\"]\n[recipe]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, RecipeError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_bad_definition_value() {
        let err =
            parse("[recipe]\nname = \"x\"\n[build.definitions]\nLIST = [1, 2]\n").unwrap_err();
        assert!(err.to_string().contains("LIST"));
    }

    #[test]
    fn test_rejects_zero_jobs() {
        assert!(parse("[recipe]\nname = \"x\"\n[build]\njobs = 0\n").is_err());
    }

    #[test]
    fn test_missing_recipe_table() {
        assert!(parse("requires = []\n").is_err());
    }

    #[test]
    fn test_cmake_truthy() {
        for t in ["1", "ON", "on", "TRUE", "yes", "Y"] {
            assert!(cmake_truthy(t), "{}", t);
        }
        for f in ["0", "OFF", "FALSE", "no", "", "NOTFOUND"] {
            assert!(!cmake_truthy(f), "{}", f);
        }
    }
}
