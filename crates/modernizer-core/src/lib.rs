//! Sandboxed, build-verified migration of legacy source files.
//!
//! A run copies the project into a [`Workspace`], edits each file there with
//! a [`SourceEditor`], lets the [`RepairOrchestrator`] alternate between a
//! [`RewriteOracle`] and a [`BuildCheck`], and finally asks the
//! [`PromotionGate`] whether the result may replace the original file.

pub mod config;
pub mod editor;
pub mod error;
pub mod oracle;
pub mod orchestrator;
pub mod promotion;
pub mod report;
pub mod strategy;
pub mod verifier;
pub mod workspace;

pub use config::{LlmSettings, Provider, Settings};
pub use editor::{Rule, SourceEditor};
pub use error::{Error, Result};
pub use oracle::RewriteOracle;
pub use orchestrator::{
    ExhaustedCause, MAX_REPAIR_ATTEMPTS, RepairOrchestrator, RepairOutcome, RepairState,
    RepairStatus, SkipReason,
};
pub use promotion::{Promotion, PromotionGate};
pub use report::{Level, RecordingReporter, Reporter};
pub use strategy::{MigrationStrategy, WebFluxStrategy, strategy_for};
pub use verifier::{BuildCheck, BuildOutcome, BuildSystem, BuildVerifier};
pub use workspace::Workspace;
