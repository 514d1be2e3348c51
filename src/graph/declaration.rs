use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report-assigned identifier, 1-based and monotonic across unused + excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclarationId(pub usize);

impl std::fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Function,
    Variable,
    Type,
    Interface,
    EnumCase,
    TypeAlias,
    Parameter,
    Import,
}

impl DeclarationKind {
    pub const ALL: [DeclarationKind; 8] = [
        DeclarationKind::Function,
        DeclarationKind::Variable,
        DeclarationKind::Type,
        DeclarationKind::Interface,
        DeclarationKind::EnumCase,
        DeclarationKind::TypeAlias,
        DeclarationKind::Parameter,
        DeclarationKind::Import,
    ];

    /// Type-level declarations own extensions elsewhere in their file
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Type | DeclarationKind::Interface | DeclarationKind::TypeAlias
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeclarationKind::Function => "function",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Type => "type",
            DeclarationKind::Interface => "interface",
            DeclarationKind::EnumCase => "enum case",
            DeclarationKind::TypeAlias => "type alias",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::Import => "import",
        }
    }

    /// Inverse of [`DeclarationKind::display_name`]
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.display_name() == name)
    }
}

/// Why an unused declaration is held back from deletion.
///
/// Variants are ordered by priority: a declaration carries the strongest
/// reason any pass found for it and never loses it to a weaker one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Truly unused
    #[default]
    None,
    WriteOnly,
    EnumerableCase,
    InterfaceImplementation,
    PlatformMarker,
    Override,
}

impl ExclusionReason {
    pub const ALL: [ExclusionReason; 6] = [
        ExclusionReason::None,
        ExclusionReason::WriteOnly,
        ExclusionReason::EnumerableCase,
        ExclusionReason::InterfaceImplementation,
        ExclusionReason::PlatformMarker,
        ExclusionReason::Override,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::None => "none",
            ExclusionReason::WriteOnly => "write_only",
            ExclusionReason::EnumerableCase => "enumerable_case",
            ExclusionReason::InterfaceImplementation => "interface_implementation",
            ExclusionReason::PlatformMarker => "platform_marker",
            ExclusionReason::Override => "override",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == value)
    }

    pub fn is_excluded(&self) -> bool {
        *self != ExclusionReason::None
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExclusionReason::None => "never referenced",
            ExclusionReason::WriteOnly => "assigned but never read",
            ExclusionReason::EnumerableCase => "case of an enumerate-all-cases type",
            ExclusionReason::InterfaceImplementation => "implements an interface requirement",
            ExclusionReason::PlatformMarker => "exposed through a platform marker",
            ExclusionReason::Override => "overrides an inherited member",
        }
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive 1-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-indexed, blank and comment lines included)
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// A classified declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Assigned when the report is built
    pub id: Option<DeclarationId>,

    /// Bare name, backticks stripped
    pub name: String,

    pub kind: DeclarationKind,

    pub location: Location,

    /// Enclosing type, for members
    pub parent_type: Option<String>,

    pub reason: ExclusionReason,

    /// Syntactic span from the extractor, when it supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<LineSpan>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclarationKind, location: Location) -> Self {
        Self {
            id: None,
            name: normalize_identifier(&name.into()).to_string(),
            kind,
            location,
            parent_type: None,
            reason: ExclusionReason::None,
            span: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_type = Some(parent.into());
        self
    }

    pub fn with_span(mut self, span: LineSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Record an exclusion reason; a weaker reason never replaces a stronger one
    pub fn exclude(&mut self, reason: ExclusionReason) {
        if reason > self.reason {
            self.reason = reason;
        }
    }

    /// Check if this declaration matches a wildcard pattern (`*Suffix`, `Prefix*`, exact),
    /// bare or qualified by its parent type (`Parent.name`, `Parent.*`)
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        crate::config::glob_match(pattern, &self.name)
            || self
                .parent_type
                .as_ref()
                .map(|parent| crate::config::glob_match(pattern, &format!("{}.{}", parent, self.name)))
                .unwrap_or(false)
    }

    /// Get a display string for this declaration
    pub fn display(&self) -> String {
        match &self.parent_type {
            Some(parent) => format!(
                "{} {}.{} ({})",
                self.kind.display_name(),
                parent,
                self.name,
                self.location
            ),
            None => format!(
                "{} {} ({})",
                self.kind.display_name(),
                self.name,
                self.location
            ),
        }
    }
}

/// Strip backtick escaping: `` `default` `` compares equal to `default`
pub fn normalize_identifier(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
        .unwrap_or(trimmed)
}
