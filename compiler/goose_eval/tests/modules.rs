//! Import and export between files on disk.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::run_file;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const LIB: &str = "print(\"loaded \")\n\
                   export let answer = 42\n\
                   export fn double(x) -> x * 2\n\
                   let hidden = 1\n\
                   const shown = 3\n\
                   export { shown as three }\n";

/// Write `files` into a fresh directory; returns it with the path of the
/// first file.
fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    let main = dir.path().join(files[0].0);
    (dir, main)
}

fn output(main: &Path) -> String {
    let (outcome, output) = run_file(main);
    if let Some(error) = outcome.error {
        panic!("unexpected error: {}", error.message);
    }
    output
}

fn error(main: &Path) -> String {
    let (outcome, _) = run_file(main);
    assert_eq!(outcome.exit_code, goose_eval::PANIC_EXIT_CODE);
    outcome.error.unwrap().message
}

#[test]
fn show_fields_binds_exports() {
    let (_dir, main) = project(&[
        (
            "main.goose",
            "import \"./lib\" show { answer, double, three }\nprint(double(answer), three)",
        ),
        ("lib.goose", LIB),
    ]);
    assert_eq!(output(&main), "loaded 84 3");
}

#[test]
fn alias_binds_frozen_namespace() {
    let (_dir, main) = project(&[
        (
            "main.goose",
            "import \"./lib\" as lib\nprint(lib.answer)\nlib.answer = 1",
        ),
        ("lib.goose", LIB),
    ]);
    assert_eq!(error(&main), "cannot modify frozen value");
}

#[test]
fn module_name_derived_from_specifier() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./lib.goose\"\nprint(lib.three)"),
        ("lib.goose", LIB),
    ]);
    assert_eq!(output(&main), "loaded 3");
}

#[test]
fn module_body_runs_once() {
    let (_dir, main) = project(&[
        (
            "main.goose",
            "import \"./lib\" as a\nimport \"./lib.goose\" as b\nimport \"./sub/../lib\" as c\n\
             print(a.answer + b.answer + c.answer)",
        ),
        ("lib.goose", LIB),
        ("sub/keep.goose", ""),
    ]);
    assert_eq!(output(&main), "loaded 126");
}

#[test]
fn show_all_binds_every_export() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./lib\" show ...\nprint(answer, three)"),
        ("lib.goose", LIB),
    ]);
    assert_eq!(output(&main), "loaded 42 3");
}

#[test]
fn show_rest_collects_remaining_exports() {
    let (_dir, main) = project(&[
        (
            "main.goose",
            "import \"./lib\" show { answer, ...others }\nprint(answer, len(others), others.three)",
        ),
        ("lib.goose", LIB),
    ]);
    assert_eq!(output(&main), "loaded 42 2 3");
}

#[test]
fn undefined_export_is_reported() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./lib\" show { missing }"),
        ("lib.goose", LIB),
    ]);
    let message = error(&main);
    assert!(message.starts_with("undefined export missing"), "{message}");
}

#[test]
fn local_but_unexported_name_is_reported() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./lib\" show { hidden }"),
        ("lib.goose", LIB),
    ]);
    let message = error(&main);
    assert!(message.starts_with("value hidden is defined locally"), "{message}");
}

#[test]
fn import_cannot_shadow_existing_name() {
    let (_dir, main) = project(&[
        ("main.goose", "let answer = 0\nimport \"./lib\" show { answer }"),
        ("lib.goose", LIB),
    ]);
    assert_eq!(error(&main), "name answer is already defined");
}

#[test]
fn directory_module_uses_module_file() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./shapes\"\nprint(shapes.sides)"),
        ("shapes/_module.goose", "export const sides = 4"),
    ]);
    assert_eq!(output(&main), "4");
}

#[test]
fn directory_without_module_file_fails() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./empty\" as e"),
        ("empty/other.goose", ""),
    ]);
    let message = error(&main);
    assert!(message.contains("_module.goose not found"), "{message}");
}

#[test]
fn reexport_from_other_module() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./mid\" show { answer }\nprint(answer)"),
        ("mid.goose", "export \"./lib\" show { answer }"),
        ("lib.goose", LIB),
    ]);
    assert_eq!(output(&main), "loaded 42");
}

#[test]
fn error_in_imported_module_fails_import() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./bad\" as bad"),
        ("bad.goose", "let x = 1 / 0"),
    ]);
    assert_eq!(error(&main), "division by zero");
}

#[test]
fn exports_are_read_when_imported() {
    let (_dir, main) = project(&[
        (
            "main.goose",
            "import \"./cfg\"\nimport \"./cfg\" show { level }\nprint(cfg.level, level)",
        ),
        ("cfg.goose", "export let level = 1\nlevel = 2"),
    ]);
    assert_eq!(output(&main), "2 2");
}

#[test]
fn show_imports_follow_the_module_variable() {
    let (_dir, main) = project(&[
        (
            "main.goose",
            "import \"./counter\" as snap\nimport \"./counter\" show { count, bump }\n\
             bump()\nbump()\nprint(snap.count, count)",
        ),
        (
            "counter.goose",
            "let count = 0\nfn bump()\n  count += 1\nend\nexport { count, bump }",
        ),
    ]);
    assert_eq!(output(&main), "0 2");
}

#[test]
fn show_imports_are_read_only() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./cfg\" show { level }\nlevel = 3"),
        ("cfg.goose", "export let level = 1"),
    ]);
    assert_eq!(error(&main), "cannot assign to constant level");
}

#[test]
fn reexports_stay_live() {
    let (_dir, main) = project(&[
        ("main.goose", "import \"./mid\" show { count, bump }\nbump()\nprint(count)"),
        ("mid.goose", "export \"./counter\" show { count, bump }"),
        (
            "counter.goose",
            "let count = 0\nfn bump()\n  count += 1\nend\nexport { count, bump }",
        ),
    ]);
    assert_eq!(output(&main), "1");
}
