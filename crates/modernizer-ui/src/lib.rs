//! # modernizer-ui
//!
//! Spinners, progress bars and styled status output shared by the
//! modernizer command line.
//!
//! ## Example
//!
//! ```rust,no_run
//! use modernizer_ui::{Spinner, Style};
//!
//! let spinner = Spinner::builder("Creating workspace...").start();
//! // ... do work ...
//! spinner.success("Workspace ready");
//! ```

mod progress;
mod spinner;
mod style;

pub use progress::{ProgressBar, ProgressBarBuilder};
pub use spinner::{Spinner, SpinnerBuilder};
pub use style::{Style, StyledText, icons};

// Re-export commonly used items from dependencies
pub use colored::Colorize;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Colorize,
        progress::{ProgressBar, ProgressBarBuilder},
        spinner::{Spinner, SpinnerBuilder},
        style::{Style, StyledText},
    };
}
