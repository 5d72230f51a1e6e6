//! # Shell Completion Module
//!
//! Completion scripts for the `emotion-dj` CLI, generated by clap_complete.
//!
//! ## Usage
//!
//! ```bash
//! emotion-dj completion bash > ~/.local/share/bash-completion/completions/emotion-dj
//! emotion-dj completion zsh > ~/.config/zsh/completions/_emotion-dj
//! emotion-dj completion fish > ~/.config/fish/completions/emotion-dj.fish
//! ```

use crate::cli::Shell;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Writes the completion script for `cmd` to stdout.
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    write_completions(gen, cmd, &mut io::stdout());
}

/// Writes the completion script for `cmd` to `out`.
pub fn write_completions<G: Generator, W: Write>(gen: G, cmd: &mut Command, out: &mut W) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}
