use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use modernizer_core::{
    BuildCheck, BuildOutcome, ExhaustedCause, MAX_REPAIR_ATTEMPTS, Promotion, PromotionGate,
    RecordingReporter, RepairOrchestrator, RepairStatus, RewriteOracle, SourceEditor,
    WebFluxStrategy, Workspace,
};

const LEGACY_SERVICE: &str = r#"
package com.example;
import io.vertx.core.AbstractVerticle;
import io.vertx.core.Promise;

public class LegacyService extends AbstractVerticle {
    public void start(Promise<Void> startFuture) {
        System.out.println("Start");
        startFuture.complete();
    }
}
"#;

const REACTIVE_INIT: &str = r#"@PostConstruct
    public Mono<Void> init() {
        return Mono.fromRunnable(() -> System.out.println("Start"));
    }"#;

/// Oracle that always answers with the same text (or nothing).
struct FixedOracle {
    reply: Option<&'static str>,
    calls: Cell<usize>,
}

impl FixedOracle {
    fn new(reply: Option<&'static str>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
        }
    }
}

impl RewriteOracle for FixedOracle {
    fn propose(&self, _code: &str, _instructions: &str) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        self.reply.map(str::to_string)
    }
}

struct FixedBuild {
    passes: bool,
    calls: Cell<usize>,
}

impl FixedBuild {
    fn new(passes: bool) -> Self {
        Self {
            passes,
            calls: Cell::new(0),
        }
    }
}

impl BuildCheck for FixedBuild {
    fn check_build(&self) -> BuildOutcome {
        self.calls.set(self.calls.get() + 1);
        if self.passes {
            BuildOutcome::Success
        } else {
            BuildOutcome::Failed {
                diagnostic: "LegacyService.java:7: error: cannot find symbol".to_string(),
            }
        }
    }
}

struct Project {
    _temp: tempfile::TempDir,
    workspace: Workspace,
    original: PathBuf,
}

fn project() -> Project {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("pom.xml"), "<project></project>").unwrap();
    let src = root.join("src/main/java/com/example");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("LegacyService.java"), LEGACY_SERVICE).unwrap();

    let workspace = Workspace::new(root).unwrap();
    workspace.create().unwrap();
    let original = workspace
        .project_root()
        .join("src/main/java/com/example/LegacyService.java");
    Project {
        _temp: temp,
        workspace,
        original,
    }
}

fn open_in_workspace(project: &Project) -> SourceEditor {
    let mapped = project.workspace.map_path(&project.original).unwrap();
    SourceEditor::open(&mapped).unwrap()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn attempt_budget_is_never_exceeded() {
    let project = project();
    let mut editor = open_in_workspace(&project);
    let oracle = FixedOracle::new(Some(REACTIVE_INIT));
    let build = FixedBuild::new(false);
    let reporter = RecordingReporter::default();

    let outcome = RepairOrchestrator::new(&WebFluxStrategy, Some(&oracle), &build, &reporter)
        .run(&mut editor)
        .unwrap();

    assert_eq!(oracle.calls.get(), MAX_REPAIR_ATTEMPTS);
    assert_eq!(outcome.proposals_requested, 3);
    assert_eq!(build.calls.get(), 3);
    assert!(matches!(
        outcome.status,
        RepairStatus::Unverified(ExhaustedCause::BudgetSpent { ref diagnostic })
            if diagnostic.contains("cannot find symbol")
    ));
    assert_eq!(
        outcome.trace.iter().filter(|s| **s == "verifying").count(),
        3
    );
}

#[test]
fn null_proposal_stops_after_one_request() {
    let project = project();
    let mut editor = open_in_workspace(&project);
    let oracle = FixedOracle::new(None);
    let build = FixedBuild::new(true);
    let reporter = RecordingReporter::default();

    let outcome = RepairOrchestrator::new(&WebFluxStrategy, Some(&oracle), &build, &reporter)
        .run(&mut editor)
        .unwrap();

    assert_eq!(oracle.calls.get(), 1);
    assert_eq!(build.calls.get(), 0);
    assert_eq!(
        outcome.status,
        RepairStatus::Unverified(ExhaustedCause::NoProposal { attempt: 0 })
    );

    // deterministic changes survive and are still offered for promotion
    let gate = PromotionGate::new(false, true);
    let promotion = gate.promote(&editor, &project.original, &reporter).unwrap();
    assert_eq!(promotion, Promotion::Promoted);
    let promoted = read(&project.original);
    assert!(!promoted.contains("extends AbstractVerticle"));
    assert!(promoted.contains("public void start(Promise<Void> startFuture)"));
}

#[test]
fn verticle_is_migrated_end_to_end() {
    let project = project();
    let mut editor = open_in_workspace(&project);
    let oracle = FixedOracle::new(Some(REACTIVE_INIT));
    let build = FixedBuild::new(true);
    let reporter = RecordingReporter::answering(false);

    let outcome = RepairOrchestrator::new(&WebFluxStrategy, Some(&oracle), &build, &reporter)
        .run(&mut editor)
        .unwrap();
    assert_eq!(outcome.status, RepairStatus::Verified { attempt: 0 });
    assert_eq!(oracle.calls.get(), 1);

    let promotion = PromotionGate::new(false, true)
        .promote(&editor, &project.original, &reporter)
        .unwrap();
    assert_eq!(promotion, Promotion::Promoted);
    assert_eq!(reporter.diffs().len(), 1);
    assert!(!reporter.diffs()[0].is_empty());

    let migrated = read(&project.original);
    assert!(!migrated.contains("AbstractVerticle"));
    assert!(!migrated.contains("Promise"));
    assert!(migrated.contains("Mono"));
    assert!(migrated.contains("@PostConstruct"));
    assert!(migrated.contains("import org.springframework.stereotype.Service;"));
}

#[test]
fn workspace_edits_do_not_touch_project_until_promoted() {
    let project = project();
    let mut editor = open_in_workspace(&project);
    let oracle = FixedOracle::new(Some(REACTIVE_INIT));
    let build = FixedBuild::new(true);
    let reporter = RecordingReporter::answering(false);

    RepairOrchestrator::new(&WebFluxStrategy, Some(&oracle), &build, &reporter)
        .run(&mut editor)
        .unwrap();

    let mapped = project.workspace.map_path(&project.original).unwrap();
    assert_ne!(read(&mapped), LEGACY_SERVICE);
    assert_eq!(read(&project.original), LEGACY_SERVICE);

    // an interactive "no" keeps the original as it was
    let promotion = PromotionGate::new(false, false)
        .promote(&editor, &project.original, &reporter)
        .unwrap();
    assert_eq!(promotion, Promotion::Declined);
    assert_eq!(read(&project.original), LEGACY_SERVICE);

    project.workspace.cleanup().unwrap();
    assert!(!project.workspace.exists());
    assert_eq!(read(&project.original), LEGACY_SERVICE);
}

#[test]
fn promoting_identical_file_is_a_no_op() {
    let project = project();
    let editor = open_in_workspace(&project);
    let reporter = RecordingReporter::answering(true);

    let promotion = PromotionGate::new(false, true)
        .promote(&editor, &project.original, &reporter)
        .unwrap();

    assert_eq!(promotion, Promotion::Unchanged);
    assert!(reporter.diffs().is_empty());
    assert!(reporter.messages().is_empty());
}
