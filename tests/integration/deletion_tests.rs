//! Deletion integration tests
//!
//! Full-declaration, related, and partial-line deletions applied to real
//! files, plus the empty-file and dry-run policies.

use deadsweep::graph::{Declaration, DeclarationKind, LineSpan, Location};
use deadsweep::refactor::{DeletionOptions, DeletionPlanner, DeletionRequest, RelatedCodeFinder, SafeDeleter};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn decl(name: &str, kind: DeclarationKind, file: &Path, line: usize) -> Declaration {
    Declaration::new(name, kind, Location::new(file, line))
}

/// Crude stand-in for the extractor: declared function names and every identifier
fn reextract(contents: &str) -> (Vec<String>, HashSet<String>) {
    let func = Regex::new(r"\bfunc\s+(\w+)").unwrap();
    let ident = Regex::new(r"[A-Za-z_]\w*").unwrap();

    let declared = func.captures_iter(contents).map(|c| c[1].to_string()).collect();
    let identifiers = ident.find_iter(contents).map(|m| m.as_str().to_string()).collect();
    (declared, identifiers)
}

const CART: &str = "import Foundation

struct Cart {
    var items: [Int] = []
}

func total(cart: Cart) -> Int {
    cart.items.count
}

func legacyTotal() -> Int {
    0
}

func describe(cart: Cart) -> String {
    \"\\(total(cart: cart))\"
}
";

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_full_deletion_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Cart.swift", CART);

    let summary = DeletionPlanner::new(DeletionOptions::default()).execute(&[DeletionRequest::full(decl(
        "legacyTotal",
        DeclarationKind::Function,
        &path,
        11,
    ))]);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.lines_removed(), 4);

    let edited = read(&path);
    let (declared, identifiers) = reextract(&edited);
    assert_eq!(declared, vec!["total", "describe"]);
    assert!(!identifiers.contains("legacyTotal"));

    // Siblings are untouched byte for byte
    let expected = CART.replace("func legacyTotal() -> Int {\n    0\n}\n\n", "");
    assert_eq!(edited, expected);
}

#[test]
fn test_extractor_span_wins_over_brace_matching() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "Flags.swift",
        "// Flags\nlet a = 1\n\n/// Old flag\nlet b = 2\nlet c = 3\n",
    );

    let request = DeletionRequest::full(decl("b", DeclarationKind::Variable, &path, 5).with_span(LineSpan::new(3, 5)));
    DeletionPlanner::new(DeletionOptions::default()).execute(&[request]);

    assert_eq!(read(&path), "// Flags\nlet a = 1\nlet c = 3\n");
}

// ============================================================================
// Related and partial-line deletions
// ============================================================================

const MODEL: &str = "struct Model {
    let a: Int
    let b: Int
    let c: Int

    init(a: Int, b: Int, c: Int) {
        self.a = a
        self.b = b
        self.c = c
    }
}
";

fn delete_property(name: &str, line: usize) -> String {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Model.swift", MODEL);

    let property = decl(name, DeclarationKind::Variable, &path, line).with_parent("Model");
    let summary = SafeDeleter::new(DeletionOptions::default())
        .with_related(RelatedCodeFinder::new("CodingKeys"))
        .delete(&[property])
        .unwrap();
    assert_eq!(summary.failed(), 0);

    read(&path)
}

#[test]
fn test_middle_parameter_removed_with_property() {
    assert_eq!(
        delete_property("b", 3),
        "struct Model {
    let a: Int
    let c: Int

    init(a: Int, c: Int) {
        self.a = a
        self.c = c
    }
}
"
    );
}

#[test]
fn test_first_and_last_parameters() {
    let first = delete_property("a", 2);
    assert!(first.contains("    init(b: Int, c: Int) {\n"));
    assert!(!first.contains("self.a"));

    let last = delete_property("c", 4);
    assert!(last.contains("    init(a: Int, b: Int) {\n"));
    assert!(!last.contains("let c"));
    assert!(!last.contains("  ,"));
}

#[test]
fn test_whole_line_edit_beats_partial_on_same_line() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Model.swift", MODEL);
    let owner = decl("b", DeclarationKind::Variable, &path, 3);

    let requests = vec![
        DeletionRequest::partial(
            owner.clone(),
            deadsweep::refactor::ColumnRange {
                line: 6,
                start_column: 18,
                end_column: 26,
            },
        ),
        DeletionRequest::lines(owner, [6]),
    ];
    DeletionPlanner::new(DeletionOptions::default()).execute(&requests);

    assert!(!read(&path).contains("init("));
}

// ============================================================================
// Parameters and enum cases
// ============================================================================

const GREETER: &str = "func greet(name: String, unused: Int) {
    print(name)
}

func other() {}
";

#[test]
fn test_parameter_deletion_keeps_owning_function() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Greeter.swift", GREETER);

    let summary = DeletionPlanner::new(DeletionOptions::default()).execute(&[DeletionRequest::full(decl(
        "unused",
        DeclarationKind::Parameter,
        &path,
        1,
    ))]);

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.lines_removed(), 0);
    assert_eq!(
        read(&path),
        "func greet(name: String) {\n    print(name)\n}\n\nfunc other() {}\n"
    );
}

#[test]
fn test_multi_line_parameter_list() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "Loader.swift",
        "func load(\n    url: URL,\n    retries: Int,\n    label: String = \"a  b\"\n) {\n    fetch(url, label)\n}\n",
    );

    DeletionPlanner::new(DeletionOptions::default()).execute(&[DeletionRequest::full(decl(
        "retries",
        DeclarationKind::Parameter,
        &path,
        3,
    ))]);

    assert_eq!(
        read(&path),
        "func load(\n    url: URL,\n    label: String = \"a  b\"\n) {\n    fetch(url, label)\n}\n"
    );
}

#[test]
fn test_enum_case_keeps_siblings_on_its_line() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "Theme.swift",
        "enum Theme {\n    case light, dark, system\n}\n",
    );

    let request = DeletionRequest::full(
        decl("dark", DeclarationKind::EnumCase, &path, 2).with_span(LineSpan::single(2)),
    );
    DeletionPlanner::new(DeletionOptions::default()).execute(&[request]);

    assert_eq!(read(&path), "enum Theme {\n    case light, system\n}\n");
}

#[test]
fn test_stale_span_past_end_of_file_deletes_nothing() {
    let temp = TempDir::new().unwrap();
    let contents = "func a() {}\nfunc b() {}\nfunc keep() {}\n";
    let path = write(&temp, "Stale.swift", contents);

    let summary = DeletionPlanner::new(DeletionOptions::default()).execute(&[DeletionRequest::full(
        decl("gone", DeclarationKind::Function, &path, 10).with_span(LineSpan::new(10, 12)),
    )]);

    assert_eq!(summary.lines_removed(), 0);
    assert_eq!(summary.unresolved(), 1);
    assert_eq!(read(&path), contents);
}

// ============================================================================
// Empty-file policy
// ============================================================================

const HELPER: &str = "// Helper.swift
// Copyright Example

import Foundation

func helper() {
    work()
}
";

fn helper_requests(path: &Path) -> Vec<DeletionRequest> {
    vec![
        DeletionRequest::full(decl("Foundation", DeclarationKind::Import, path, 4)),
        DeletionRequest::full(decl("helper", DeclarationKind::Function, path, 6)),
    ]
}

#[test]
fn test_emptied_file_deleted_when_enabled() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Helper.swift", HELPER);

    let summary = DeletionPlanner::new(DeletionOptions {
        dry_run: false,
        delete_empty_files: true,
    })
    .execute(&helper_requests(&path));

    assert_eq!(summary.files_deleted(), 1);
    assert!(!path.exists());
}

#[test]
fn test_emptied_file_kept_when_disabled() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Helper.swift", HELPER);

    let summary = DeletionPlanner::new(DeletionOptions::default()).execute(&helper_requests(&path));

    assert_eq!(summary.files_deleted(), 0);
    let remaining = read(&path);
    assert!(remaining.starts_with("// Helper.swift\n// Copyright Example\n"));
    assert!(!remaining.contains("import"));
    assert!(!remaining.contains("helper()"));
}

#[test]
fn test_file_with_declarations_never_deleted() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "Kept.swift", "import Foundation\n\nstruct Kept {}\n");

    let summary = DeletionPlanner::new(DeletionOptions {
        dry_run: false,
        delete_empty_files: true,
    })
    .execute(&[DeletionRequest::full(decl("Foundation", DeclarationKind::Import, &path, 1))]);

    assert_eq!(summary.files_deleted(), 0);
    assert_eq!(read(&path), "struct Kept {}\n");
}

// ============================================================================
// Dry run and failures
// ============================================================================

#[test]
fn test_dry_run_matches_real_run_without_writing() {
    let temp = TempDir::new().unwrap();
    let dry_path = write(&temp, "Dry.swift", CART);
    let real_path = write(&temp, "Real.swift", CART);
    let script = temp.path().join("undo.sh");

    let dry = DeletionPlanner::new(DeletionOptions {
        dry_run: true,
        delete_empty_files: true,
    })
    .with_undo_script(&script)
    .execute(&[DeletionRequest::full(decl("legacyTotal", DeclarationKind::Function, &dry_path, 11))]);

    let real = DeletionPlanner::new(DeletionOptions {
        dry_run: false,
        delete_empty_files: true,
    })
    .execute(&[DeletionRequest::full(decl("legacyTotal", DeclarationKind::Function, &real_path, 11))]);

    assert!(dry.dry_run);
    assert_eq!(dry.lines_removed(), real.lines_removed());
    assert_eq!(dry.files_deleted(), real.files_deleted());
    assert_eq!(read(&dry_path), CART);
    assert_ne!(read(&real_path), CART);
    assert!(!script.exists());
}

#[test]
fn test_failures_reported_per_file() {
    let temp = TempDir::new().unwrap();
    let present = write(&temp, "Present.swift", CART);
    let missing = temp.path().join("Gone.swift");

    let summary = DeletionPlanner::new(DeletionOptions::default()).execute(&[
        DeletionRequest::full(decl("ghost", DeclarationKind::Function, &missing, 1)),
        DeletionRequest::full(decl("legacyTotal", DeclarationKind::Function, &present, 11)),
    ]);

    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.succeeded(), 1);
    assert!(!read(&present).contains("legacyTotal"));
}
