//! # Shell Completion Module
//!
//! Generates completion scripts through clap_complete and lists catalog
//! song labels for dynamic completion of `rate` and `playlist add`. The fish
//! script calls back into the hidden `musicrec complete-songs` command for
//! those arguments.
//!
//! ```bash
//! musicrec completion bash > ~/.local/share/bash-completion/completions/musicrec
//! musicrec completion zsh > ~/.config/zsh/completions/_musicrec
//! ```

use crate::catalog::Catalog;
use crate::cli::Shell;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Song and genre completion for fish, appended to the clap-generated script.
const FISH_SONG_COMPLETION: &str = r#"
# Catalog songs and genres, listed by musicrec itself
function __musicrec_complete_songs
    musicrec complete-songs 2>/dev/null
end

complete -c musicrec -f -n '__fish_seen_subcommand_from rate' -a '(__musicrec_complete_songs)' -d 'Genre or song'
complete -c musicrec -f -n '__fish_seen_subcommand_from playlist; and __fish_seen_subcommand_from add' -a '(__musicrec_complete_songs)' -d 'Song'
"#;

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Full completion script for `shell`: clap's static script, plus dynamic
/// song completion where the shell supports it.
///
/// # Errors
///
/// Fails only if `out` cannot be written.
pub fn write_completion_script(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> io::Result<()> {
    generate_completions(shell_to_completion_shell(shell), cmd, out);
    if shell == Shell::Fish {
        out.write_all(FISH_SONG_COMPLETION.as_bytes())?;
    }
    Ok(())
}

/// Song labels and genre names, sorted and de-duplicated.
#[must_use]
pub fn song_completions(catalog: &Catalog) -> Vec<String> {
    let mut completions: Vec<String> = catalog
        .iter()
        .map(|(_, song)| song.label())
        .chain(catalog.genres().iter().cloned())
        .collect();
    completions.sort();
    completions.dedup();
    completions
}

/// Print completions one per line, the form fish command substitution
/// splits on.
///
/// # Errors
///
/// Fails only if `out` cannot be written.
pub fn print_song_completions(catalog: &Catalog, out: &mut dyn Write) -> io::Result<()> {
    for completion in song_completions(catalog) {
        writeln!(out, "{completion}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_shell_conversion() {
        assert_eq!(shell_to_completion_shell(Shell::Bash), CompletionShell::Bash);
        assert_eq!(shell_to_completion_shell(Shell::Zsh), CompletionShell::Zsh);
    }

    #[test]
    fn test_song_completions_cover_catalog() {
        let catalog = Catalog::builtin();
        let completions = song_completions(&catalog);
        assert_eq!(completions.len(), 30);
        assert!(completions.contains(&"Ditto - NewJeans".to_string()));
        assert!(completions.contains(&"Hip-Hop".to_string()));
        assert!(completions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_print_one_completion_per_line() {
        let catalog = Catalog::builtin();
        let mut out = Vec::new();
        print_song_completions(&catalog, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 30);
        assert!(text.lines().any(|l| l == "Ditto - NewJeans"));
        assert!(text.lines().any(|l| l == "POP"));
    }

    #[test]
    fn test_fish_script_calls_song_helper() {
        let mut cmd = crate::cli::Args::command();
        let mut out = Vec::new();
        write_completion_script(Shell::Fish, &mut cmd, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("musicrec complete-songs"));
        assert!(script.contains("__fish_seen_subcommand_from rate"));
        assert!(script.contains("__fish_seen_subcommand_from add"));
    }

    #[test]
    fn test_bash_script_has_no_fish_helper() {
        let mut cmd = crate::cli::Args::command();
        let mut out = Vec::new();
        write_completion_script(Shell::Bash, &mut cmd, &mut out).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("__musicrec_complete_songs"));
    }

    #[test]
    fn test_bash_script_generation() {
        let mut cmd = crate::cli::Args::command();
        let mut out = Vec::new();
        generate_completions(CompletionShell::Bash, &mut cmd, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("_musicrec"));
        assert!(script.contains("complete"));
    }
}
