use super::detectors::{
    default_detectors, default_rules, AnalysisContext, Detector, ExclusionRule, UnusedParamDetector, Verdict,
};
use super::{Classification, InterfaceGraph};
use crate::config::Config;
use crate::discovery::ProjectFacts;
use crate::graph::{Declaration, DeclarationKind, FileFacts, GlobalGraphs, LineSpan, SourceDeclaration};
use crate::oracle::ModuleIndex;
use rayon::prelude::*;
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::{debug, info};

/// Classifies every declaration against the frozen whole-program graphs
pub struct ClassificationEngine<'a> {
    ctx: AnalysisContext<'a>,
    detectors: Vec<Box<dyn Detector>>,
    rules: Vec<Box<dyn ExclusionRule>>,
}

#[derive(Default)]
struct FileOutcome {
    unused: Vec<Declaration>,
    excluded: Vec<Declaration>,
    used: usize,
}

impl FileOutcome {
    fn merge(mut self, other: FileOutcome) -> Self {
        self.unused.extend(other.unused);
        self.excluded.extend(other.excluded);
        self.used += other.used;
        self
    }
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(
        config: &'a Config,
        graphs: &'a GlobalGraphs,
        interfaces: &'a InterfaceGraph,
        modules: &'a ModuleIndex,
        cross_file_modules: &'a HashSet<String>,
    ) -> Self {
        Self {
            ctx: AnalysisContext::new(config, graphs, interfaces, modules, cross_file_modules),
            detectors: default_detectors(),
            rules: default_rules(),
        }
    }

    pub fn classify(&self, project: &ProjectFacts) -> Classification {
        let outcome = project
            .files
            .par_iter()
            .filter(|file| !project.is_test_file(&file.path))
            .map(|file| self.classify_file(file))
            .reduce(FileOutcome::default, FileOutcome::merge);

        let mut classification = Classification {
            unused: outcome.unused,
            excluded: outcome.excluded,
            used_count: outcome.used,
            excluded_test_files: project.excluded_test_files(),
        };
        sort_by_location(&mut classification.unused);
        sort_by_location(&mut classification.excluded);

        info!(
            "Classified {} declarations: {} unused, {} excluded",
            classification.used_count + classification.total_unused(),
            classification.unused.len(),
            classification.excluded.len()
        );
        classification
    }

    fn classify_file(&self, file: &FileFacts) -> FileOutcome {
        let mut outcome = FileOutcome::default();

        for decl in declarations_with_imports(file).iter() {
            let decl: &SourceDeclaration = decl.as_ref();
            match self.verdict(decl, file) {
                Verdict::Skip => {}
                Verdict::Used => outcome.used += 1,
                Verdict::Unused => {
                    let classified = self.explain(decl, file);
                    debug!("{} unused ({})", classified.display(), classified.reason);
                    if classified.reason.is_excluded() {
                        outcome.excluded.push(classified);
                    } else {
                        outcome.unused.push(classified);
                    }
                }
            }
        }

        outcome
    }

    fn verdict(&self, decl: &SourceDeclaration, file: &FileFacts) -> Verdict {
        let qualified = decl
            .parent_type
            .as_deref()
            .map(|parent| format!("{}.{}", parent, decl.bare_name()));
        let retained = self.ctx.config.should_retain(decl.bare_name())
            || qualified.map(|q| self.ctx.config.should_retain(&q)).unwrap_or(false);
        if retained {
            return Verdict::Used;
        }

        self.detectors
            .iter()
            .find(|d| d.applies_to(decl))
            .map(|d| d.classify(decl, file, &self.ctx))
            .unwrap_or(Verdict::Used)
    }

    /// Attach the highest-priority exclusion reason any rule finds
    fn explain(&self, decl: &SourceDeclaration, file: &FileFacts) -> Declaration {
        let subject = if decl.kind == DeclarationKind::Parameter {
            UnusedParamDetector::owner(decl, file).unwrap_or(decl)
        } else {
            decl
        };

        let mut classified = decl.to_declaration(&file.path);
        if classified.span.is_none() && decl.kind == DeclarationKind::Import {
            classified.span = Some(LineSpan::single(decl.line));
        }
        for rule in &self.rules {
            if let Some(reason) = rule.reason(decl, subject, &self.ctx) {
                classified.exclude(reason);
            }
        }
        classified
    }
}

/// The file's declarations plus any import statements the extractor did not
/// also list as declarations
fn declarations_with_imports(file: &FileFacts) -> Vec<Cow<'_, SourceDeclaration>> {
    let listed: HashSet<usize> = file
        .declarations
        .iter()
        .filter(|d| d.kind == DeclarationKind::Import)
        .map(|d| d.line)
        .collect();

    let mut all: Vec<Cow<'_, SourceDeclaration>> = file.declarations.iter().map(Cow::Borrowed).collect();
    all.extend(
        file.facts
            .imports
            .iter()
            .filter(|i| !listed.contains(&i.line))
            .map(|i| {
                let mut decl = SourceDeclaration::new(i.module.clone(), DeclarationKind::Import, i.line);
                decl.span = Some(LineSpan::single(i.line));
                Cow::Owned(decl)
            }),
    );
    all
}

fn sort_by_location(decls: &mut [Declaration]) {
    decls.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.name.cmp(&b.name))
    });
}
