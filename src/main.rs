use clap::{Parser, Subcommand};
use colored::Colorize;
use deadsweep::config::Config;
use deadsweep::discovery::FactFinder;
use deadsweep::graph::{DeclarationKind, ExclusionReason};
use deadsweep::oracle::{CachedOracle, CatalogOracle, ModuleIndex};
use deadsweep::refactor::{attach_spans, DeletionOptions, RelatedCodeFinder, SafeDeleter};
use deadsweep::report::{self, AnalysisReport, ReportFilter, ReportFormat, Reporter, TerminalReporter};
use deadsweep::{analyze, EditorLauncher};
use miette::{miette, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

const DEFAULT_REPORT: &str = ".deadsweep/report.csv";

/// deadsweep - Find and safely delete unused declarations from extracted source facts
#[derive(Parser, Debug)]
#[command(name = "deadsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify every declaration and write the report
    Analyze(AnalyzeArgs),

    /// List declarations from a saved report
    List {
        /// Report written by `analyze`
        #[arg(long, default_value = DEFAULT_REPORT)]
        report: PathBuf,

        /// Name pattern (`helper`, `*ViewModel`, `Parent.name`)
        #[arg(long)]
        pattern: Option<String>,

        /// Exclusion reason (none, write_only, enumerable_case, interface_implementation, platform_marker, override)
        #[arg(long)]
        reason: Option<String>,

        /// Declaration kind (function, variable, type, interface, enum case, type alias, parameter, import)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Open a reported declaration in your editor
    Open {
        #[arg(long, default_value = DEFAULT_REPORT)]
        report: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Declaration id from the report
        id: usize,
    },

    /// Delete reported declarations from source files
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Facts bundle file or directory of per-file fact files
    #[arg(long)]
    facts: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog of framework interfaces (JSON, YAML, or TOML)
    #[arg(long, value_name = "FILE")]
    interfaces: Option<PathBuf>,

    /// Catalog of module exports (JSON, YAML, or TOML)
    #[arg(long, value_name = "FILE")]
    modules: Option<PathBuf>,

    /// Where to write the persisted report
    #[arg(short, long, default_value = DEFAULT_REPORT)]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Source path patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Name patterns to retain - never report as unused (can be specified multiple times)
    #[arg(short, long)]
    retain: Vec<String>,

    /// List unused overrides as deletion candidates
    #[arg(long)]
    include_overrides: bool,

    /// List unused interface implementations as deletion candidates
    #[arg(long)]
    include_interface_members: bool,

    /// List unused platform-marked declarations as deletion candidates
    #[arg(long)]
    include_platform_marked: bool,
}

#[derive(clap::Args, Debug)]
struct DeleteArgs {
    #[arg(long, default_value = DEFAULT_REPORT)]
    report: PathBuf,

    /// Facts used for exact declaration spans
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Declaration ids from the report
    #[arg(required_unless_present = "pattern", conflicts_with = "pattern")]
    ids: Vec<usize>,

    /// Delete every actionable declaration matching a name pattern
    #[arg(long)]
    pattern: Option<String>,

    /// Dry run - show what would be deleted without making changes
    #[arg(long)]
    dry_run: bool,

    /// Delete files left with only comments and imports
    #[arg(long)]
    delete_empty_files: bool,

    /// Also delete code coupled to each declaration
    #[arg(long)]
    related: bool,

    /// Interactive mode for deletions (select and confirm)
    #[arg(long)]
    interactive: bool,

    /// Generate undo script
    #[arg(long)]
    undo_script: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Csv,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Csv => ReportFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("deadsweep v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args, cli.quiet),
        Commands::List {
            report,
            pattern,
            reason,
            kind,
        } => run_list(&report, pattern, reason.as_deref(), kind.as_deref()),
        Commands::Open { report, config, id } => run_open(&report, config.as_deref(), id),
        Commands::Delete(args) => run_delete(&args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Reports go to stdout; keep logs off it
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_default_locations(Path::new(".")),
    }
}

fn run_analyze(args: &AnalyzeArgs, quiet: bool) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let start_time = Instant::now();

    let mut config = load_config(args.config.as_deref())?;
    config.exclude.extend(args.exclude.iter().cloned());
    config.retain_patterns.extend(args.retain.iter().cloned());
    config.analysis.include_overrides |= args.include_overrides;
    config.analysis.include_interface_members |= args.include_interface_members;
    config.analysis.include_platform_marked |= args.include_platform_marked;

    let interfaces_catalog = args.interfaces.as_ref().or(config.interfaces.catalog.as_ref());
    let oracle = CachedOracle::new(match interfaces_catalog {
        Some(path) => CatalogOracle::from_file(path)?,
        None => CatalogOracle::new(),
    });
    let modules_catalog = args.modules.as_ref().or(config.modules.exports_catalog.as_ref());
    let modules = match modules_catalog {
        Some(path) => ModuleIndex::from_file(path)?,
        None => ModuleIndex::new(),
    };

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Loading facts from {}", args.facts.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let project = FactFinder::new(&config).load(&args.facts);
    spinner.finish_and_clear();
    let project = project?;

    info!(
        "Loaded facts for {} files ({} test files, {} excluded)",
        project.files.len(),
        project.excluded_test_files(),
        project.excluded_files
    );

    let (classification, _) = analyze(&project, &config, &oracle, &modules);
    let report = AnalysisReport::from_classification(classification, config.analysis);

    report::write_report(&report, &args.output)?;
    info!("Analysis complete in {:.2}s", start_time.elapsed().as_secs_f64());

    Reporter::new(args.format.clone().into(), None).report(&report)?;

    if matches!(args.format, OutputFormat::Terminal) {
        println!("{} Report saved to: {}", "→".dimmed(), args.output.display());
    }

    Ok(())
}

fn parse_filter(pattern: Option<String>, reason: Option<&str>, kind: Option<&str>) -> Result<ReportFilter> {
    let reason = reason
        .map(|r| ExclusionReason::parse(r).ok_or_else(|| miette!("unknown exclusion reason `{}`", r)))
        .transpose()?;
    let kind = kind
        .map(|k| DeclarationKind::from_display_name(k).ok_or_else(|| miette!("unknown declaration kind `{}`", k)))
        .transpose()?;

    Ok(ReportFilter { pattern, reason, kind })
}

fn run_list(path: &Path, pattern: Option<String>, reason: Option<&str>, kind: Option<&str>) -> Result<()> {
    let report = report::read_report(path)?;
    let filter = parse_filter(pattern, reason, kind)?;

    TerminalReporter::new().print_declarations(&report, &report.select(&filter));
    Ok(())
}

fn run_open(path: &Path, config: Option<&Path>, id: usize) -> Result<()> {
    let config = load_config(config)?;
    let report = report::read_report(path)?;
    let decl = report.find(id)?;

    let launcher = EditorLauncher::from_env(config.editor.as_deref())?;
    info!("Opening {} with {}", decl.location, launcher.command());
    launcher.open(&decl.location.file, decl.location.line)?;
    Ok(())
}

fn run_delete(args: &DeleteArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let report = report::read_report(&args.report)?;

    let mut selected = Vec::new();
    if let Some(pattern) = &args.pattern {
        let filter = ReportFilter {
            pattern: Some(pattern.clone()),
            ..ReportFilter::default()
        };
        selected.extend(
            report
                .select(&filter)
                .into_iter()
                .filter(|d| report.is_actionable(d))
                .cloned(),
        );
    } else {
        for id in &args.ids {
            let decl = report.find(*id)?;
            if report.is_actionable(decl) {
                selected.push(decl.clone());
            } else {
                println!(
                    "{} #{} {} is excluded ({}); skipping",
                    "!".yellow(),
                    id,
                    decl.display(),
                    decl.reason.description()
                );
            }
        }
    }

    if let Some(facts) = &args.facts {
        let project = FactFinder::new(&config).load(facts)?;
        let attached = attach_spans(&mut selected, &project);
        info!("Attached extractor spans to {} of {} declarations", attached, selected.len());
    }

    let options = DeletionOptions {
        dry_run: args.dry_run,
        delete_empty_files: args.delete_empty_files || config.deletion.delete_empty_files,
    };
    let mut deleter = SafeDeleter::new(options)
        .interactive(args.interactive)
        .with_undo_script(args.undo_script.clone());
    if args.related || config.deletion.include_related {
        deleter = deleter.with_related(RelatedCodeFinder::new(&config.markers.serialization_keys_type));
    }

    let summary = deleter.delete(&selected)?;
    if summary.failed() > 0 {
        return Err(miette!("{} files could not be edited", summary.failed()));
    }
    if !args.dry_run && summary.succeeded() > 0 {
        println!(
            "{}",
            "Line numbers in the report may have shifted; run `deadsweep analyze` again before further deletes."
                .dimmed()
        );
    }

    Ok(())
}
