//! Per-file repair loop.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Idle -> Screening -> DeterministicRewrite -> AwaitingProposal
//!      -> Verifying -> { Verified | Retrying | Exhausted } -> Done
//! ```
//!
//! `Retrying` goes back to `Verifying` with a fix request until the attempt
//! budget is spent. Every state is reachable from [`RepairOrchestrator::step`]
//! so terminal states can be tested in isolation.

use std::ops::Range;

use log::debug;

use crate::editor::SourceEditor;
use crate::error::Result;
use crate::oracle::RewriteOracle;
use crate::report::{Level, Reporter};
use crate::strategy::MigrationStrategy;
use crate::verifier::{BuildCheck, BuildOutcome};

/// Number of rewrite/verify cycles allowed per file.
pub const MAX_REPAIR_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairState {
    Idle,
    Screening,
    DeterministicRewrite,
    AwaitingProposal,
    /// Request a proposal for `candidate`, substitute it and build.
    Verifying {
        attempt: usize,
        candidate: String,
        instructions: String,
    },
    /// Attempt `attempt` produced `candidate` but the build failed.
    Retrying {
        attempt: usize,
        candidate: String,
        diagnostic: String,
    },
    Verified {
        attempt: usize,
    },
    Exhausted(ExhaustedCause),
    Done(RepairStatus),
}

impl RepairState {
    pub fn name(&self) -> &'static str {
        match self {
            RepairState::Idle => "idle",
            RepairState::Screening => "screening",
            RepairState::DeterministicRewrite => "deterministic-rewrite",
            RepairState::AwaitingProposal => "awaiting-proposal",
            RepairState::Verifying { .. } => "verifying",
            RepairState::Retrying { .. } => "retrying",
            RepairState::Verified { .. } => "verified",
            RepairState::Exhausted(_) => "exhausted",
            RepairState::Done(_) => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExhaustedCause {
    /// The oracle returned nothing on this attempt.
    NoProposal { attempt: usize },
    /// Every attempt was used and the last build still failed.
    BudgetSpent { diagnostic: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoOracle,
    UnitNotFound,
}

/// How a file's repair run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairStatus {
    /// The screen said the file has nothing to migrate.
    NotNeeded,
    /// Only the literal rules ran.
    DeterministicOnly(SkipReason),
    /// The workspace build passed after a rewrite.
    Verified { attempt: usize },
    /// Changes are present but the build was never seen to pass.
    Unverified(ExhaustedCause),
}

impl RepairStatus {
    pub fn is_unverified(&self) -> bool {
        matches!(self, RepairStatus::Unverified(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    pub status: RepairStatus,
    /// Number of times the oracle was asked for a proposal.
    pub proposals_requested: usize,
    /// Names of the states visited, in order.
    pub trace: Vec<&'static str>,
}

/// Mutable state carried across steps for one file.
struct Session<'e> {
    editor: &'e mut SourceEditor,
    proposals_requested: usize,
    /// Byte range of the last placed proposal in the working buffer.
    placed: Option<Range<usize>>,
}

pub struct RepairOrchestrator<'a> {
    strategy: &'a dyn MigrationStrategy,
    oracle: Option<&'a dyn RewriteOracle>,
    build: &'a dyn BuildCheck,
    reporter: &'a dyn Reporter,
}

impl<'a> RepairOrchestrator<'a> {
    pub fn new(
        strategy: &'a dyn MigrationStrategy,
        oracle: Option<&'a dyn RewriteOracle>,
        build: &'a dyn BuildCheck,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            strategy,
            oracle,
            build,
            reporter,
        }
    }

    /// Drive `editor` from `Idle` to `Done`.
    ///
    /// Only I/O errors while persisting the workspace file are returned as
    /// errors; every other negative result ends up in the outcome.
    pub fn run(&self, editor: &mut SourceEditor) -> Result<RepairOutcome> {
        let mut session = Session {
            editor,
            proposals_requested: 0,
            placed: None,
        };
        let mut state = RepairState::Idle;
        let mut trace = vec![state.name()];

        let status = loop {
            state = self.step(&mut session, state)?;
            trace.push(state.name());
            if let RepairState::Done(status) = state {
                break status;
            }
        };

        Ok(RepairOutcome {
            status,
            proposals_requested: session.proposals_requested,
            trace,
        })
    }

    fn step(&self, session: &mut Session<'_>, state: RepairState) -> Result<RepairState> {
        let next = match state {
            RepairState::Idle => RepairState::Screening,

            RepairState::Screening => {
                if self.strategy.needs_migration(session.editor.content()) {
                    RepairState::DeterministicRewrite
                } else {
                    RepairState::Done(RepairStatus::NotNeeded)
                }
            }

            RepairState::DeterministicRewrite => {
                session
                    .editor
                    .apply_rules(&self.strategy.deterministic_rules());
                RepairState::AwaitingProposal
            }

            RepairState::AwaitingProposal => {
                let anchor = self.strategy.anchor();
                match (session.editor.extract_unit(anchor), self.oracle) {
                    (None, _) => RepairState::Done(RepairStatus::DeterministicOnly(
                        SkipReason::UnitNotFound,
                    )),
                    (Some(_), None) => {
                        RepairState::Done(RepairStatus::DeterministicOnly(SkipReason::NoOracle))
                    }
                    (Some(unit), Some(_)) => RepairState::Verifying {
                        attempt: 0,
                        instructions: self.strategy.initial_instructions(unit),
                        candidate: unit.to_string(),
                    },
                }
            }

            RepairState::Verifying {
                attempt,
                candidate,
                instructions,
            } => self.verify(session, attempt, &candidate, &instructions)?,

            RepairState::Retrying {
                attempt,
                candidate,
                diagnostic,
            } => {
                if attempt + 1 >= MAX_REPAIR_ATTEMPTS {
                    self.reporter.status(
                        Level::Error,
                        &format!(
                            "{}: attempt {} failed, no attempts left",
                            file_label(session.editor),
                            attempt + 1
                        ),
                    );
                    RepairState::Exhausted(ExhaustedCause::BudgetSpent { diagnostic })
                } else {
                    self.reporter.status(
                        Level::Warning,
                        &format!(
                            "{}: attempt {} failed, requesting a fix",
                            file_label(session.editor),
                            attempt + 1
                        ),
                    );
                    RepairState::Verifying {
                        attempt: attempt + 1,
                        instructions: self.strategy.fix_instructions(&candidate, &diagnostic),
                        candidate,
                    }
                }
            }

            RepairState::Verified { attempt } => {
                RepairState::Done(RepairStatus::Verified { attempt })
            }

            RepairState::Exhausted(cause) => RepairState::Done(RepairStatus::Unverified(cause)),

            done @ RepairState::Done(_) => done,
        };
        Ok(next)
    }

    fn verify(
        &self,
        session: &mut Session<'_>,
        attempt: usize,
        candidate: &str,
        instructions: &str,
    ) -> Result<RepairState> {
        let Some(oracle) = self.oracle else {
            return Ok(RepairState::Exhausted(ExhaustedCause::NoProposal { attempt }));
        };

        if attempt == 0 {
            self.reporter.status(
                Level::Info,
                &format!("{}: requesting a rewrite", file_label(session.editor)),
            );
        }
        session.proposals_requested += 1;
        let Some(proposal) = oracle.propose(candidate, instructions) else {
            self.reporter.status(
                Level::Warning,
                &format!("{}: no rewrite proposal available", file_label(session.editor)),
            );
            return Ok(RepairState::Exhausted(ExhaustedCause::NoProposal { attempt }));
        };

        // First attempt replaces the unit; later ones replace the previous proposal.
        let target = match session.placed.take() {
            Some(range) => Some(range),
            None => session.editor.locate_unit(self.strategy.anchor()),
        };
        session.placed = target.and_then(|range| session.editor.replace_range(range, &proposal));
        if session.placed.is_none() {
            debug!(
                "{}: proposal for attempt {attempt} could not be substituted",
                session.editor.path().display()
            );
        }
        session.editor.persist()?;

        match self.build.check_build() {
            BuildOutcome::Success => {
                self.reporter.status(
                    Level::Success,
                    &format!("{}: build passed", file_label(session.editor)),
                );
                Ok(RepairState::Verified { attempt })
            }
            BuildOutcome::Failed { diagnostic } => Ok(RepairState::Retrying {
                attempt,
                candidate: proposal,
                diagnostic,
            }),
        }
    }
}

fn file_label(editor: &SourceEditor) -> String {
    editor
        .path()
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| editor.path().display().to_string())
}
