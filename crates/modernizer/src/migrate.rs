use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Args;
use log::debug;
use modernizer_core::strategy::TARGETS;
use modernizer_core::{
    BuildVerifier, ExhaustedCause, LlmSettings, MigrationStrategy, Promotion, PromotionGate,
    RepairOrchestrator, RepairStatus, RewriteOracle, Settings, SkipReason,
    SourceEditor, Workspace, strategy_for,
};
use modernizer_llm::LlmClient;
use modernizer_ui::icons;
use modernizer_ui::prelude::*;

use crate::reporter::TerminalReporter;
use crate::{file_walker, project, tty};

/// Arguments for the `migrate` command
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// A .java file or a directory to search for .java files
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub path: PathBuf,

    /// Framework to migrate to
    #[arg(long, default_value = "webflux")]
    pub target: String,

    /// Show diffs without writing anything to the project
    #[arg(long)]
    pub dry_run: bool,

    /// Apply every change without asking
    #[arg(long, short = 'y')]
    pub auto_approve: bool,
}

/// What happened to one file.
enum FileResult {
    Done {
        status: RepairStatus,
        promotion: Promotion,
    },
    Failed,
}

#[derive(Default)]
struct Summary {
    promoted: usize,
    skipped: usize,
    unchanged: usize,
    failed: usize,
    unverified: usize,
}

impl Summary {
    fn record(&mut self, result: &FileResult) {
        match result {
            FileResult::Failed => self.failed += 1,
            FileResult::Done { status, promotion } => {
                if status.is_unverified() {
                    self.unverified += 1;
                }
                match promotion {
                    Promotion::Promoted => self.promoted += 1,
                    Promotion::Declined | Promotion::DryRun => self.skipped += 1,
                    Promotion::Unchanged => self.unchanged += 1,
                }
            }
        }
    }

    fn needs_inspection(&self) -> bool {
        self.failed > 0 || self.unverified > 0
    }
}

/// Execute the `migrate` command
pub fn execute(args: MigrateArgs) -> Result<()> {
    let path = args
        .path
        .canonicalize()
        .with_context(|| format!("Path not found: {}", args.path.display()))?;

    let strategy = strategy_for(&args.target).with_context(|| {
        format!(
            "Unknown target '{}' (available: {})",
            args.target,
            TARGETS.join(", ")
        )
    })?;

    let project_root = project::find_project_root(&path);
    debug!("Project root: {}", project_root.display());

    let settings = Settings::load(&project_root).context("Failed to load settings")?;
    let oracle = build_oracle(&settings.llm)?;

    let files = file_walker::collect_source_files(&path)?;
    if files.is_empty() {
        eprintln!("{} No .java files found in {}", icons::info(), path.display());
        return Ok(());
    }

    let interactive = tty::is_interactive();
    let workspace = Workspace::new(&project_root)?;
    let spinner = Spinner::builder("Creating workspace...")
        .hidden(!interactive)
        .start();
    if let Err(e) = workspace.create() {
        spinner.error("Failed to create workspace");
        let _ = workspace.cleanup();
        return Err(e).context("Failed to create workspace");
    }
    spinner.success(format!(
        "Workspace ready at {}",
        workspace.root().display()
    ));
    eprintln!(
        "Found {} file(s) to process for {}",
        files.len(),
        strategy.name().with_style(Style::Cyan)
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to set Ctrl+C handler")?;
    }

    let progress = ProgressBar::builder(files.len() as u64)
        .message("Migrating")
        .hidden(!interactive)
        .start();
    let reporter = TerminalReporter::new(Some(&progress), interactive);

    let verifier = BuildVerifier::new(workspace.root());
    debug!("Verifying with {}", verifier.system());
    let gate = PromotionGate::new(args.dry_run, args.auto_approve);
    let orchestrator = RepairOrchestrator::new(
        strategy.as_ref(),
        oracle.as_ref().map(|client| client as &dyn RewriteOracle),
        &verifier,
        &reporter,
    );

    let mut summary = Summary::default();
    let mut interrupted = false;
    for file in &files {
        if !running.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }

        let result = match migrate_file(&workspace, file, &orchestrator, &gate, &reporter) {
            Ok(result) => result,
            Err(e) => {
                reporter.line(format!(
                    "{} {}: {e:#}",
                    icons::error(),
                    display_name(file).with_style(Style::Red)
                ));
                FileResult::Failed
            }
        };
        summary.record(&result);
        progress.inc();
    }
    if interrupted {
        reporter.line(format!(
            "{} Interrupted after {} of {} file(s)",
            icons::warning(),
            progress.position(),
            files.len()
        ));
    }
    progress.finish();

    if args.dry_run && summary.needs_inspection() {
        eprintln!(
            "{} Workspace kept for inspection at {}",
            icons::info(),
            workspace.root().display()
        );
    } else {
        workspace
            .cleanup()
            .context("Failed to remove workspace")?;
    }

    print_summary(&summary, args.dry_run);
    Ok(())
}

/// Construct the rewrite oracle from settings.
///
/// No keys at all means rules-only mode. A key for some provider but not the
/// selected one is a configuration mistake and stops the run.
fn build_oracle(settings: &LlmSettings) -> Result<Option<LlmClient>> {
    if !settings.has_any_api_key() {
        eprintln!(
            "{} No API key configured, only deterministic rules will run",
            icons::warning()
        );
        return Ok(None);
    }
    let client = LlmClient::new(settings).context("Failed to initialize rewrite oracle")?;
    eprintln!(
        "{} Using {} ({})",
        icons::info(),
        client.provider(),
        client.model()
    );
    Ok(Some(client))
}

fn migrate_file(
    workspace: &Workspace,
    file: &Path,
    orchestrator: &RepairOrchestrator<'_>,
    gate: &PromotionGate,
    reporter: &TerminalReporter<'_>,
) -> Result<FileResult> {
    let sandbox_file = workspace.map_path(file)?;
    let mut editor = SourceEditor::open(&sandbox_file)?;

    let outcome = orchestrator.run(&mut editor)?;
    debug!(
        "{}: {} ({} proposals)",
        file.display(),
        outcome.trace.join(" -> "),
        outcome.proposals_requested
    );

    let name = display_name(file);
    reporter.line(status_line(&name, &outcome.status));
    if outcome.status == RepairStatus::NotNeeded {
        return Ok(FileResult::Done {
            status: outcome.status,
            promotion: Promotion::Unchanged,
        });
    }

    let promotion = gate.promote(&editor, file, reporter)?;
    if promotion == Promotion::DryRun {
        reporter.line(format!("{} {name}: dry run, not saved", icons::info()));
    }

    Ok(FileResult::Done {
        status: outcome.status,
        promotion,
    })
}

fn status_line(name: &str, status: &RepairStatus) -> String {
    match status {
        RepairStatus::NotNeeded => format!(
            "{} {}",
            icons::info(),
            format!("{name}: no migration needed").with_style(Style::Dim)
        ),
        RepairStatus::DeterministicOnly(SkipReason::NoOracle) => format!(
            "{} {name}: rules applied, no oracle configured",
            icons::info()
        ),
        RepairStatus::DeterministicOnly(SkipReason::UnitNotFound) => format!(
            "{} {name}: rules applied, no rewritable unit found",
            icons::info()
        ),
        RepairStatus::Verified { attempt } => format!(
            "{} {}",
            icons::success(),
            format!("{name}: build verified on attempt {}", attempt + 1).with_style(Style::Green)
        ),
        RepairStatus::Unverified(ExhaustedCause::NoProposal { .. }) => format!(
            "{} {}",
            icons::warning(),
            format!("{name}: build not verified, no rewrite proposal").with_style(Style::Yellow)
        ),
        RepairStatus::Unverified(ExhaustedCause::BudgetSpent { diagnostic }) => format!(
            "{} {}\n{}",
            icons::warning(),
            format!("{name}: build still failing after every attempt").with_style(Style::Yellow),
            diagnostic.with_style(Style::Dim)
        ),
    }
}

fn print_summary(summary: &Summary, dry_run: bool) {
    let skipped_label = if dry_run { "not saved" } else { "skipped" };
    eprintln!();
    eprintln!(
        "{} {} promoted, {} {skipped_label}, {} unchanged, {} failed",
        "Summary:".bold(),
        summary.promoted.to_string().with_style(Style::Green),
        summary.skipped,
        summary.unchanged,
        summary.failed.to_string().with_style(if summary.failed > 0 {
            Style::Red
        } else {
            Style::Dim
        })
    );
    if summary.unverified > 0 {
        eprintln!(
            "  {} file(s) were changed without a passing build",
            summary.unverified.to_string().with_style(Style::Yellow)
        );
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
