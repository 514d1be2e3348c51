//! Classification integration tests
//!
//! Whole-program classification through `analyze`, covering usage, every
//! exclusion reason and their priority, parameters, imports, and test files.

use deadsweep::analysis::Classification;
use deadsweep::config::Config;
use deadsweep::discovery::ProjectFacts;
use deadsweep::graph::{
    DeclarationKind, ExclusionReason, FactSet, FileFacts, ImportStatement, ParameterBinding, SourceDeclaration,
};
use deadsweep::oracle::{CatalogOracle, InterfaceRequirements, ModuleIndex, NullOracle};
use deadsweep::report::AnalysisReport;
use deadsweep::{analyze, AnalysisOptions};
use std::collections::HashSet;

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn member(name: &str, kind: DeclarationKind, line: usize, parent: &str) -> SourceDeclaration {
    let mut decl = SourceDeclaration::new(name, kind, line);
    decl.parent_type = Some(parent.to_string());
    decl
}

fn classify(files: Vec<FileFacts>) -> Classification {
    classify_with(files, &Config::default(), &ModuleIndex::new())
}

fn classify_with(files: Vec<FileFacts>, config: &Config, modules: &ModuleIndex) -> Classification {
    let project = ProjectFacts::from_files(files, config);
    analyze(&project, config, &NullOracle, modules).0
}

fn reason_of(result: &Classification, name: &str) -> Option<ExclusionReason> {
    result.find(name).map(|d| d.reason)
}

// ============================================================================
// Usage
// ============================================================================

#[test]
fn test_reference_in_any_file_marks_used() {
    let declaring = FileFacts::new("Sources/Formatter.swift")
        .with_declaration(SourceDeclaration::new("format", DeclarationKind::Function, 3))
        .with_declaration(SourceDeclaration::new("legacyFormat", DeclarationKind::Function, 9));

    let mut facts = FactSet::new();
    facts.used_identifiers.insert("format".into());
    let caller = FileFacts::new("Sources/Screen.swift").with_facts(facts);

    let result = classify(vec![declaring, caller]);
    assert!(result.find("format").is_none());
    assert_eq!(reason_of(&result, "legacyFormat"), Some(ExclusionReason::None));
    assert_eq!(result.used_count, 1);
}

#[test]
fn test_textual_match_in_unrelated_type_counts_as_use() {
    let card = FileFacts::new("Card.swift").with_declaration(member("title", DeclarationKind::Variable, 2, "Card"));

    // `title` here is a local of some other type, still treated as a read
    let mut facts = FactSet::new();
    facts.used_identifiers.insert("title".into());
    let other = FileFacts::new("Toolbar.swift").with_facts(facts);

    let result = classify(vec![card, other]);
    assert!(result.find("title").is_none());
}

#[test]
fn test_backtick_identifiers_are_normalized() {
    let theme = FileFacts::new("Theme.swift").with_declaration(member("`default`", DeclarationKind::EnumCase, 2, "Theme"));
    let mut facts = FactSet::new();
    facts.used_identifiers.insert("default".into());
    let user = FileFacts::new("App.swift").with_facts(facts);

    let result = classify(vec![theme, user]);
    assert!(result.find("default").is_none());
}

#[test]
fn test_retain_patterns_keep_declarations() {
    let file = FileFacts::new("Home.swift")
        .with_declaration(SourceDeclaration::new("HomeViewModel", DeclarationKind::Type, 1))
        .with_declaration(member("refresh", DeclarationKind::Function, 4, "HomeViewModel"))
        .with_declaration(SourceDeclaration::new("helper", DeclarationKind::Function, 9));

    let config = Config {
        retain_patterns: vec!["*ViewModel".to_string(), "HomeViewModel.refresh".to_string()],
        ..Config::default()
    };
    let result = classify_with(vec![file], &config, &ModuleIndex::new());

    let names: Vec<&str> = result.unused.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["helper"]);
}

// ============================================================================
// Exclusion reasons
// ============================================================================

#[test]
fn test_enumerable_case_decided_across_files() {
    let declaring = FileFacts::new("Sources/Direction.swift")
        .with_declaration(SourceDeclaration::new("Direction", DeclarationKind::Type, 1))
        .with_declaration(member("north", DeclarationKind::EnumCase, 2, "Direction"));

    // The conformance lives in an extension in a different file
    let mut facts = FactSet::new();
    facts
        .type_inheritance
        .insert("Direction".into(), set(&["CaseIterable"]));
    facts.used_identifiers.insert("Direction".into());
    let extension = FileFacts::new("Sources/Direction+All.swift").with_facts(facts);

    let result = classify(vec![declaring, extension]);
    assert_eq!(reason_of(&result, "north"), Some(ExclusionReason::EnumerableCase));
}

#[test]
fn test_write_only_property() {
    let uploader = FileFacts::new("Uploader.swift")
        .with_declaration(member("lastAttempt", DeclarationKind::Variable, 2, "Uploader"))
        .with_declaration(member("neverTouched", DeclarationKind::Variable, 3, "Uploader"))
        .with_facts({
            let mut facts = FactSet::new();
            facts.assigned_identifiers.insert("lastAttempt".into());
            facts
        });

    let result = classify(vec![uploader]);
    assert_eq!(reason_of(&result, "lastAttempt"), Some(ExclusionReason::WriteOnly));
    assert_eq!(reason_of(&result, "neverTouched"), Some(ExclusionReason::None));
}

#[test]
fn test_interface_member_via_external_catalog() {
    let mut facts = FactSet::new();
    facts.conformed_interfaces.insert("UITableViewDataSource".into());
    facts
        .type_inheritance
        .insert("ListController".into(), set(&["UITableViewDataSource"]));
    facts.used_identifiers.insert("ListController".into());
    let file = FileFacts::new("ListController.swift")
        .with_declaration(SourceDeclaration::new("ListController", DeclarationKind::Type, 1))
        .with_declaration(member("numberOfSections", DeclarationKind::Function, 5, "ListController"))
        .with_facts(facts);

    let oracle = CatalogOracle::new().with_interface(
        "UITableViewDataSource",
        InterfaceRequirements::new(["numberOfSections"], Vec::<String>::new()),
    );
    let config = Config::default();
    let project = ProjectFacts::from_files(vec![file], &config);
    let (result, resolution) = analyze(&project, &config, &oracle, &ModuleIndex::new());

    assert!(resolution.interfaces.contains("UITableViewDataSource"));
    assert_eq!(
        reason_of(&result, "numberOfSections"),
        Some(ExclusionReason::InterfaceImplementation)
    );
}

#[test]
fn test_override_outranks_interface_and_platform() {
    let mut facts = FactSet::new();
    facts.defined_interfaces.insert("Lifecycle".into());
    facts
        .interface_requirements
        .insert("Lifecycle".into(), set(&["viewDidLoad", "didTap"]));
    facts.conformed_interfaces.insert("Lifecycle".into());
    facts
        .type_inheritance
        .insert("Screen".into(), set(&["Lifecycle"]));

    let mut did_load = member("viewDidLoad", DeclarationKind::Function, 3, "Screen");
    did_load.modifiers.push("override".into());
    did_load.attributes.push("objc".into());

    let mut did_tap = member("didTap", DeclarationKind::Function, 7, "Screen");
    did_tap.attributes.push("IBAction".into());

    let file = FileFacts::new("Screen.swift")
        .with_declaration(did_load)
        .with_declaration(did_tap)
        .with_facts(facts);

    let result = classify(vec![file]);
    assert_eq!(reason_of(&result, "viewDidLoad"), Some(ExclusionReason::Override));
    assert_eq!(reason_of(&result, "didTap"), Some(ExclusionReason::PlatformMarker));
}

// ============================================================================
// Parameters
// ============================================================================

fn parameter(binding: &str, function: &str, line: usize, body: &[&str]) -> SourceDeclaration {
    let mut decl = member(binding, DeclarationKind::Parameter, line, "Renderer");
    decl.parameter = Some(ParameterBinding {
        label: None,
        binding: binding.to_string(),
        function: function.to_string(),
        body_identifiers: set(body),
    });
    decl
}

#[test]
fn test_parameters_judged_by_function_body() {
    let mut discarded = parameter("_", "draw", 4, &["context"]);
    discarded.name = "animated".into();

    let mut draw = member("draw", DeclarationKind::Function, 4, "Renderer");
    draw.modifiers.push("override".into());

    let file = FileFacts::new("Renderer.swift")
        .with_declaration(draw)
        .with_declaration(parameter("context", "draw", 4, &["context"]))
        .with_declaration(parameter("scale", "draw", 4, &["context"]))
        .with_declaration(discarded);

    let result = classify(vec![file]);
    assert!(result.find("context").is_none());
    assert!(result.find("animated").is_none());
    // Exclusion markers come from the owning function
    assert_eq!(reason_of(&result, "scale"), Some(ExclusionReason::Override));
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_import_classification() {
    let modules = ModuleIndex::new()
        .with_module("Charts", ["LineChart"])
        .with_module("Maps", ["MapView"])
        .with_module("Networking", ["Client"]);

    let mut dashboard = FactSet::new();
    dashboard.imports = vec![
        ImportStatement::new("Swift", 1),
        ImportStatement::new("Charts", 2),
        ImportStatement::new("Maps", 3),
        ImportStatement::new("Mystery", 4),
        ImportStatement::new("Networking", 5),
    ];
    let dashboard = FileFacts::new("Dashboard.swift").with_facts(dashboard);

    // Uses a Charts export without importing Charts itself
    let mut summary = FactSet::new();
    summary.used_identifiers.insert("LineChart".into());
    summary
        .type_inheritance
        .insert("Gateway".into(), set(&["Client"]));
    let summary = FileFacts::new("Summary.swift").with_facts(summary);

    let result = classify_with(vec![dashboard, summary], &Config::default(), &modules);

    let unused: Vec<&str> = result
        .unused
        .iter()
        .filter(|d| d.kind == DeclarationKind::Import)
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(unused, vec!["Maps", "Networking"]);
}

#[test]
fn test_import_kept_when_file_type_inherits_export() {
    let modules = ModuleIndex::new().with_module("UIKit", ["UIViewController"]);

    let mut facts = FactSet::new();
    facts.imports.push(ImportStatement::new("UIKit", 1));
    facts
        .type_inheritance
        .insert("BaseScreen".into(), set(&["UIViewController"]));
    facts
        .type_inheritance
        .insert("HomeScreen".into(), set(&["BaseScreen"]));
    let file = FileFacts::new("HomeScreen.swift")
        .with_declaration(SourceDeclaration::new("HomeScreen", DeclarationKind::Type, 3))
        .with_facts(facts);

    let result = classify_with(vec![file], &Config::default(), &modules);
    assert!(result.find("UIKit").is_none());
}

// ============================================================================
// Test files and reports
// ============================================================================

#[test]
fn test_test_files_are_counted_not_reported() {
    let source = FileFacts::new("Sources/Cache.swift")
        .with_declaration(SourceDeclaration::new("evict", DeclarationKind::Function, 4))
        .with_declaration(SourceDeclaration::new("purge", DeclarationKind::Function, 8));

    let mut facts = FactSet::new();
    facts.used_identifiers.insert("evict".into());
    let test = FileFacts::new("Tests/CacheTests.swift")
        .with_declaration(SourceDeclaration::new("testEvict", DeclarationKind::Function, 3))
        .with_facts(facts);

    let result = classify(vec![source, test]);
    assert_eq!(result.excluded_test_files, 1);
    assert!(result.find("evict").is_none());
    assert!(result.find("testEvict").is_none());
    assert!(result.find("purge").is_some());
}

#[test]
fn test_report_ids_follow_classification_order() {
    let mut dynamic = member("progress", DeclarationKind::Variable, 2, "Job");
    dynamic.modifiers.push("dynamic".into());
    let file = FileFacts::new("Job.swift")
        .with_declaration(dynamic)
        .with_declaration(SourceDeclaration::new("run", DeclarationKind::Function, 5))
        .with_declaration(SourceDeclaration::new("stop", DeclarationKind::Function, 9));

    let report = AnalysisReport::from_classification(
        classify(vec![file]),
        AnalysisOptions {
            include_platform_marked: true,
            ..AnalysisOptions::default()
        },
    );

    let listed: Vec<(usize, &str)> = report
        .declarations
        .iter()
        .map(|d| (d.id.unwrap().0, d.name.as_str()))
        .collect();
    assert_eq!(listed, vec![(1, "run"), (2, "stop"), (3, "progress")]);
    assert_eq!(report.actionable().count(), 3);
}
