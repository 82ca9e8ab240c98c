//! Per-file migration driver
//!
//! Reads each source file, rewrites it and, depending on the mode, writes it
//! back, reports that it would change, or renders a diff. Files are
//! independent of each other and are processed on the rayon pool.

use rayon::prelude::*;
use serde::Serialize;
use similar::TextDiff;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cst::{CsSyntaxKind, lex_with_trivia};
use crate::error::{ErrorKind, NullinateError};
use crate::rewrite::rewrite_source;

const UTF8_BOM: &str = "\u{feff}";

/// File name suffixes the C# tooling treats as generated code
const GENERATED_SUFFIXES: [&str; 4] = [".g.cs", ".g.i.cs", ".designer.cs", ".generated.cs"];

/// What to do with files that would change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationMode {
    /// Overwrite changed files in place
    #[default]
    Write,
    /// Only report which files would change
    Check,
    /// Report a unified diff for each file that would change
    Diff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    pub mode: MigrationMode,
    pub skip_generated: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            mode: MigrationMode::Write,
            skip_generated: true,
        }
    }
}

/// Result for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FileOutcome {
    Unchanged,
    Rewritten,
    WouldRewrite {
        #[serde(skip_serializing_if = "Option::is_none")]
        diff: Option<String>,
    },
    Skipped {
        reason: String,
    },
    Failed {
        kind: ErrorKind,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Outcomes for every input file, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub files: Vec<FileReport>,
}

impl MigrationReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Unchanged))
    }

    pub fn rewritten(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Rewritten))
    }

    pub fn would_rewrite(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::WouldRewrite { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Runs the rewriter over a set of files
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    options: MigrationOptions,
}

impl Migrator {
    pub fn new(options: MigrationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Migrate every file; one file failing does not stop the others
    pub fn run(&self, files: &[PathBuf]) -> MigrationReport {
        let start = Instant::now();

        let files: Vec<FileReport> = files
            .par_iter()
            .map(|path| FileReport {
                path: path.clone(),
                outcome: self.migrate_file(path),
            })
            .collect();

        let report = MigrationReport { files };
        info!(
            "Processed {} file(s) in {:?}: {} rewritten, {} would change, {} failed",
            report.files.len(),
            start.elapsed(),
            report.rewritten(),
            report.would_rewrite(),
            report.failed()
        );
        report
    }

    /// Migrate one file
    pub fn migrate_file(&self, path: &Path) -> FileOutcome {
        debug!("Migrating {}", path.display());
        match self.try_migrate_file(path) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!("{}: {}", path.display(), error);
                FileOutcome::Failed {
                    kind: error.kind(),
                    error: error.to_string(),
                }
            }
        }
    }

    fn try_migrate_file(&self, path: &Path) -> crate::Result<FileOutcome> {
        let bytes = fs::read(path).map_err(|e| NullinateError::io_error(path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            NullinateError::io_error(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.utf8_error()),
            )
        })?;
        let (bom, source) = match content.strip_prefix(UTF8_BOM) {
            Some(rest) => (UTF8_BOM, rest),
            None => ("", content.as_str()),
        };

        if self.options.skip_generated && is_generated(path, source) {
            return Ok(FileOutcome::Skipped {
                reason: "generated code".to_string(),
            });
        }

        let result = rewrite_source(source)?;
        if !result.changed {
            return Ok(FileOutcome::Unchanged);
        }

        match self.options.mode {
            MigrationMode::Write => {
                let mut output = String::with_capacity(bom.len() + result.text.len());
                output.push_str(bom);
                output.push_str(&result.text);
                fs::write(path, output).map_err(|e| NullinateError::io_error(path, e))?;
                debug!("Rewrote {}", path.display());
                Ok(FileOutcome::Rewritten)
            }
            MigrationMode::Check => Ok(FileOutcome::WouldRewrite { diff: None }),
            MigrationMode::Diff => Ok(FileOutcome::WouldRewrite {
                diff: Some(render_diff(path, source, &result.text)),
            }),
        }
    }
}

/// Generated by tooling: a known file suffix, or `<auto-generated` in the
/// comments before the first token
pub fn is_generated(path: &Path, source: &str) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        return true;
    }

    let (tokens, _) = lex_with_trivia(source);
    tokens
        .iter()
        .take_while(|t| t.kind.is_trivia())
        .filter(|t| {
            matches!(
                t.kind,
                CsSyntaxKind::LineComment | CsSyntaxKind::DocComment | CsSyntaxKind::BlockComment
            )
        })
        .any(|t| t.text.contains("<auto-generated"))
}

/// Unified diff between the original and rewritten text
pub fn render_diff(path: &Path, before: &str, after: &str) -> String {
    let name = path.display().to_string();
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn migrator(mode: MigrationMode) -> Migrator {
        Migrator::new(MigrationOptions {
            mode,
            skip_generated: true,
        })
    }

    #[test]
    fn test_write_mode_rewrites_in_place() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "Foo.cs",
            "class C {\r\n    [CanBeNull]\r\n    string Foo();\r\n}\r\n",
        );

        let outcome = migrator(MigrationMode::Write).migrate_file(&path);
        assert_eq!(outcome, FileOutcome::Rewritten);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "class C {\r\n    string? Foo();\r\n}\r\n"
        );
    }

    #[test]
    fn test_bom_is_preserved() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "Foo.cs", "\u{feff}void Foo(string s = null);");

        migrator(MigrationMode::Write).migrate_file(&path);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\u{feff}void Foo(string? s = null);"
        );
    }

    #[test]
    fn test_unchanged_file_is_not_written() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "Foo.cs", "public void Foo([NotNull] string s);");
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let outcome = migrator(MigrationMode::Write).migrate_file(&path);
        assert_eq!(outcome, FileOutcome::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_check_and_diff_modes_leave_file_alone() {
        let temp = TempDir::new().unwrap();
        let source = "void Foo([NotNull] string s);\n";
        let path = write(temp.path(), "Foo.cs", source);

        let outcome = migrator(MigrationMode::Check).migrate_file(&path);
        assert_eq!(outcome, FileOutcome::WouldRewrite { diff: None });

        let outcome = migrator(MigrationMode::Diff).migrate_file(&path);
        let FileOutcome::WouldRewrite { diff: Some(diff) } = outcome else {
            panic!("expected a diff");
        };
        assert!(diff.contains("-void Foo([NotNull] string s);"));
        assert!(diff.contains("+void Foo(string s);"));
        assert_eq!(fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn test_generated_code_is_skipped() {
        let temp = TempDir::new().unwrap();
        let header = "// <auto-generated>\n//     This code was generated by a tool.\n// </auto-generated>\nvoid Foo(string s = null);\n";
        let path = write(temp.path(), "Api.cs", header);
        let designer = write(temp.path(), "Form1.Designer.cs", "void Foo(string s = null);");

        let m = migrator(MigrationMode::Write);
        assert!(matches!(m.migrate_file(&path), FileOutcome::Skipped { .. }));
        assert!(matches!(m.migrate_file(&designer), FileOutcome::Skipped { .. }));

        let all = Migrator::new(MigrationOptions {
            mode: MigrationMode::Check,
            skip_generated: false,
        });
        assert!(matches!(all.migrate_file(&path), FileOutcome::WouldRewrite { .. }));
    }

    #[test]
    fn test_failures_are_reported_per_file() {
        let temp = TempDir::new().unwrap();
        let good = write(temp.path(), "Good.cs", "void Foo(string s = null);");
        let bad = write(temp.path(), "Bad.cs", "class C { void Foo( }");
        let missing = temp.path().join("Missing.cs");

        let report = migrator(MigrationMode::Write).run(&[bad.clone(), good.clone(), missing]);
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.files[0].path, bad);
        assert!(matches!(
            report.files[0].outcome,
            FileOutcome::Failed {
                kind: ErrorKind::Parse,
                ..
            }
        ));
        assert_eq!(report.files[1].outcome, FileOutcome::Rewritten);
        assert!(matches!(
            report.files[2].outcome,
            FileOutcome::Failed {
                kind: ErrorKind::Io,
                ..
            }
        ));
        assert_eq!(report.failed(), 2);
        assert_eq!(report.rewritten(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let report = MigrationReport {
            files: vec![FileReport {
                path: PathBuf::from("Foo.cs"),
                outcome: FileOutcome::Skipped {
                    reason: "generated code".to_string(),
                },
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["status"], "skipped");
        assert_eq!(json["files"][0]["reason"], "generated code");
        assert_eq!(json["files"][0]["path"], "Foo.cs");
    }

    #[test]
    fn test_failed_outcome_serializes_its_kind() {
        let temp = TempDir::new().unwrap();
        let bad = write(temp.path(), "Bad.cs", "class C { void Foo( }");

        let report = migrator(MigrationMode::Check).run(&[bad]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["status"], "failed");
        assert_eq!(json["files"][0]["kind"], "parse");
    }
}
