use std::io::{self, IsTerminal};

/// Whether prompts and the progress bar can be shown.
///
/// Both are drawn on stderr and read from stdin. A set `CI` variable forces
/// non-interactive mode even when a pseudo terminal is attached.
pub fn is_interactive() -> bool {
    std::env::var_os("CI").is_none() && io::stdin().is_terminal() && io::stderr().is_terminal()
}
