//! Input discovery for solutions, projects and source files
//!
//! Expands the paths given on the command line into the C# source files to
//! migrate, without running a build:
//!
//! - `*.cs` is taken as is
//! - `*.sln` lists its `.csproj` projects, each expanded in turn
//! - `*.csproj` contributes its `<Compile>` items and, for SDK-style
//!   projects, the implicit `**/*.cs` glob

use glob::{MatchOptions, Pattern, glob_with};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::NullinateError;
use crate::result::{Result, ResultExt};

/// `Project("{type-guid}") = "Name", "relative\path.csproj", "{guid}"`
const SOLUTION_PROJECT: &str = r#"(?m)^\s*Project\("[^"]*"\)\s*=\s*"[^"]*"\s*,\s*"([^"]+)""#;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What a command-line input names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Solution,
    Project,
    Source,
}

impl InputKind {
    /// Classify by extension, ignoring case
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "sln" => Some(Self::Solution),
            "csproj" => Some(Self::Project),
            "cs" => Some(Self::Source),
            _ => None,
        }
    }
}

/// Expands inputs into source files, applying exclude globs
#[derive(Debug, Clone, Default)]
pub struct ProjectDiscovery {
    exclude: Vec<Pattern>,
    base_dir: Option<PathBuf>,
}

impl ProjectDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude files matching any of `patterns`
    ///
    /// Patterns are tried against the full path and, when `base_dir` is
    /// given, against the path relative to it.
    pub fn with_excludes(patterns: &[String], base_dir: Option<PathBuf>) -> Result<Self> {
        let exclude = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    NullinateError::config_error(format!("Invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { exclude, base_dir })
    }

    /// Source files named by `inputs`, de-duplicated in first-seen order
    pub fn discover(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in inputs {
            match InputKind::of(input) {
                Some(InputKind::Source) => files.push(input.clone()),
                Some(InputKind::Project) => files.extend(Self::project_sources(input)?),
                Some(InputKind::Solution) => {
                    for project in Self::solution_projects(input)? {
                        if !project.is_file() {
                            warn!(
                                "Skipping missing project {} listed in {}",
                                project.display(),
                                input.display()
                            );
                            continue;
                        }
                        if let Some(sources) = Self::project_sources(&project).log_and_continue() {
                            files.extend(sources);
                        }
                    }
                }
                None => {
                    return Err(NullinateError::usage_error(format!(
                        "unsupported input '{}': expected a .sln, .csproj or .cs file",
                        input.display()
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(identity(path)));
        let before = files.len();
        files.retain(|path| !self.is_excluded(path));
        if files.len() < before {
            debug!("Excluded {} file(s) by pattern", before - files.len());
        }

        info!("Discovered {} source file(s)", files.len());
        Ok(files)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let full = slashed(path);
        let relative = self
            .base_dir
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .map(slashed);

        self.exclude.iter().any(|pattern| {
            pattern.matches_with(&full, GLOB_OPTIONS)
                || relative
                    .as_deref()
                    .is_some_and(|rel| pattern.matches_with(rel, GLOB_OPTIONS))
        })
    }

    /// Project files listed in a solution, resolved against its directory
    pub fn solution_projects(solution: &Path) -> Result<Vec<PathBuf>> {
        let content =
            fs::read_to_string(solution).map_err(|e| NullinateError::io_error(solution, e))?;
        let dir = parent_dir(solution);
        let regex = Regex::new(SOLUTION_PROJECT)
            .map_err(|e| NullinateError::internal_error(format!("solution pattern: {e}")))?;

        let projects: Vec<PathBuf> = regex
            .captures_iter(&content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().replace('\\', "/"))
            .filter(|path| path.to_ascii_lowercase().ends_with(".csproj"))
            .map(|path| dir.join(path))
            .collect();

        debug!(
            "Solution {} lists {} C# project(s)",
            solution.display(),
            projects.len()
        );
        Ok(projects)
    }

    /// Source files compiled by a project
    pub fn project_sources(project: &Path) -> Result<Vec<PathBuf>> {
        let content =
            fs::read_to_string(project).map_err(|e| NullinateError::io_error(project, e))?;
        let xml: ProjectXml = quick_xml::de::from_str(content.trim_start_matches('\u{feff}'))
            .map_err(|e| NullinateError::project_error(project, e.to_string()))?;
        let dir = parent_dir(project);

        let mut files = Vec::new();
        if xml.uses_default_compile_items() {
            files.extend(default_compile_items(&dir));
        }

        let mut removes = Vec::new();
        for item in xml.item_groups.iter().flat_map(|group| &group.compile) {
            if let Some(include) = &item.include {
                for spec in item_specs(include) {
                    files.extend(expand_item(&dir, &spec)?);
                }
            }
            if let Some(remove) = &item.remove {
                for spec in item_specs(remove) {
                    let pattern = Pattern::new(&spec).map_err(|e| {
                        NullinateError::project_error(
                            project,
                            format!("invalid Compile Remove pattern '{spec}': {e}"),
                        )
                    })?;
                    removes.push(pattern);
                }
            }
        }

        files.retain(|file| {
            let relative = file.strip_prefix(&dir).map(slashed).unwrap_or_default();
            !removes
                .iter()
                .any(|pattern| pattern.matches_with(&relative, GLOB_OPTIONS))
        });

        debug!(
            "Project {} compiles {} file(s)",
            project.display(),
            files.len()
        );
        Ok(files)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectXml {
    #[serde(rename = "@Sdk")]
    sdk: Option<String>,
    #[serde(rename = "PropertyGroup", default)]
    property_groups: Vec<PropertyGroup>,
    #[serde(rename = "ItemGroup", default)]
    item_groups: Vec<ItemGroup>,
}

#[derive(Debug, Deserialize)]
struct PropertyGroup {
    #[serde(rename = "EnableDefaultCompileItems")]
    enable_default_compile_items: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemGroup {
    #[serde(rename = "Compile", default)]
    compile: Vec<CompileItem>,
}

#[derive(Debug, Deserialize)]
struct CompileItem {
    #[serde(rename = "@Include")]
    include: Option<String>,
    #[serde(rename = "@Remove")]
    remove: Option<String>,
}

impl ProjectXml {
    fn uses_default_compile_items(&self) -> bool {
        let disabled = self.property_groups.iter().any(|group| {
            group
                .enable_default_compile_items
                .as_deref()
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("false"))
        });
        self.sdk.is_some() && !disabled
    }
}

/// Split a `;`-separated item list, dropping entries that need MSBuild
/// property evaluation
fn item_specs(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .filter(|spec| {
            let evaluated = spec.contains("$(") || spec.contains("@(") || spec.contains("%(");
            if evaluated {
                debug!("Skipping item that needs MSBuild evaluation: {spec}");
            }
            !evaluated
        })
        .map(|spec| spec.replace('\\', "/"))
        .collect()
}

fn expand_item(dir: &Path, spec: &str) -> Result<Vec<PathBuf>> {
    if !spec.contains(['*', '?']) {
        let path = dir.join(spec);
        if !path.is_file() {
            warn!("Compile item {} does not exist", path.display());
            return Ok(Vec::new());
        }
        return Ok(vec![path]);
    }

    let pattern = dir.join(spec);
    let entries = glob_with(&pattern.to_string_lossy(), GLOB_OPTIONS).map_err(|e| {
        NullinateError::project_error(dir, format!("invalid Compile pattern '{spec}': {e}"))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Glob entry error: {}", e),
        }
    }
    Ok(files)
}

/// `**/*.cs` below the project, minus `bin/`, `obj/` and hidden directories
fn default_compile_items(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            let build_output = entry.depth() == 1 && matches!(&*name, "bin" | "obj");
            !build_output && !name.starts_with('.')
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| InputKind::of(path) == Some(InputKind::Source))
        .collect()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Key used to spot the same file reached through different paths
fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| slashed(f.strip_prefix(root).unwrap()))
            .collect()
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::of(Path::new("a/App.sln")), Some(InputKind::Solution));
        assert_eq!(InputKind::of(Path::new("Lib.CSPROJ")), Some(InputKind::Project));
        assert_eq!(InputKind::of(Path::new("Foo.cs")), Some(InputKind::Source));
        assert_eq!(InputKind::of(Path::new("Foo.vb")), None);
        assert_eq!(InputKind::of(Path::new("README")), None);
    }

    #[test]
    fn test_sdk_project_default_items() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let project = write(root, "Lib.csproj", r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><TargetFramework>net8.0</TargetFramework></PropertyGroup></Project>"#);
        write(root, "A.cs", "");
        write(root, "Sub/B.cs", "");
        write(root, "bin/Debug/C.cs", "");
        write(root, "obj/D.cs", "");
        write(root, "notes.txt", "");

        let files = ProjectDiscovery::project_sources(&project).unwrap();
        assert_eq!(names(&files, root), vec!["A.cs", "Sub/B.cs"]);
    }

    #[test]
    fn test_explicit_compile_items_and_remove() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let project = write(
            root,
            "Old.csproj",
            r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <Reference Include="System" />
    <Compile Include="Program.cs" />
    <Reference Include="System.Xml" />
    <Compile Include="Models\*.cs;$(Generated)\X.cs" />
    <Compile Remove="Models\Skip.cs" />
  </ItemGroup>
</Project>"#,
        );
        write(root, "Program.cs", "");
        write(root, "Models/User.cs", "");
        write(root, "Models/Skip.cs", "");
        write(root, "Unlisted.cs", "");

        let files = ProjectDiscovery::project_sources(&project).unwrap();
        assert_eq!(names(&files, root), vec!["Program.cs", "Models/User.cs"]);
    }

    #[test]
    fn test_default_items_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let project = write(
            root,
            "Lib.csproj",
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup><EnableDefaultCompileItems>false</EnableDefaultCompileItems></PropertyGroup>
  <ItemGroup><Compile Include="Only.cs" /></ItemGroup>
</Project>"#,
        );
        write(root, "Only.cs", "");
        write(root, "Other.cs", "");

        let files = ProjectDiscovery::project_sources(&project).unwrap();
        assert_eq!(names(&files, root), vec!["Only.cs"]);
    }

    #[test]
    fn test_solution_expansion_skips_missing_and_dedups() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let solution = write(
            root,
            "App.sln",
            r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Lib", "src\Lib\Lib.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Solution Items", "Solution Items", "{22222222-2222-2222-2222-222222222222}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Gone", "src\Gone\Gone.csproj", "{33333333-3333-3333-3333-333333333333}"
EndProject
"#,
        );
        write(root, "src/Lib/Lib.csproj", r#"<Project Sdk="Microsoft.NET.Sdk" />"#);
        let source = write(root, "src/Lib/Foo.cs", "");

        let projects = ProjectDiscovery::solution_projects(&solution).unwrap();
        assert_eq!(projects.len(), 2);

        let files = ProjectDiscovery::new()
            .discover(&[solution, source])
            .unwrap();
        assert_eq!(names(&files, root), vec!["src/Lib/Foo.cs"]);
    }

    #[test]
    fn test_exclude_patterns_relative_to_base() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let keep = write(root, "Keep.cs", "");
        let skip = write(root, "Migrations/Init.cs", "");

        let discovery = ProjectDiscovery::with_excludes(
            &["Migrations/**".to_string()],
            Some(root.to_path_buf()),
        )
        .unwrap();
        let files = discovery.discover(&[keep, skip]).unwrap();
        assert_eq!(names(&files, root), vec!["Keep.cs"]);
    }

    #[test]
    fn test_unsupported_input_is_usage_error() {
        let result = ProjectDiscovery::new().discover(&[PathBuf::from("Module.vb")]);
        assert!(matches!(result, Err(NullinateError::Usage { .. })));
    }
}
