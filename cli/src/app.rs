use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use dreamweaver_core::GenerationBackend;
use dreamweaver_journal::Journal;

use crate::cli::JournalCommand;
use crate::output::*;
use crate::session::{export_image, DreamSession, SaveOutcome};

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Weaving your dream...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Generates once with a spinner and reports the outcome.
/// Returns whether a dream was produced.
async fn weave<B: GenerationBackend>(session: &mut DreamSession<B>) -> bool {
    let spinner = spinner();
    let outcome = session.generate().await;
    spinner.finish_and_clear();

    match outcome {
        Ok(()) => {
            if let Some((image, narrative)) = session.current() {
                print_dream(narrative, image, session.is_current_saved());
            }
            true
        }
        Err(_) => {
            if let Some(message) = session.error() {
                print_nightmare(message);
            }
            false
        }
    }
}

fn report_save(outcome: SaveOutcome) {
    match outcome {
        SaveOutcome::Saved => println!("{}", "Saved to your dream journal.".green()),
        SaveOutcome::AlreadySaved => println!("{}", "This dream is already in your journal.".yellow()),
        SaveOutcome::NothingToSave => println!("{}", "There is no dream to save yet.".yellow()),
    }
}

/// Runs one generation, optionally saving it and writing the image out
pub async fn run_single_dream<B: GenerationBackend>(
    session: &mut DreamSession<B>,
    save: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    info!("Running single dream: {}", session.themes().join(", "));

    if !weave(session).await {
        // The user already saw the message
        return Ok(());
    }

    if save {
        report_save(session.save_current());
    }

    if let Some(out) = out {
        let written = session
            .export_current(&out)
            .context("Failed to write dream image")?;
        println!("Image written to {}", written.display().to_string().cyan());
    }

    Ok(())
}

fn resolve_position<'a>(journal: &'a Journal, position: usize) -> Result<&'a dreamweaver_journal::Dream> {
    journal.at_position(position).with_context(|| {
        format!(
            "No dream at position {} (the journal holds {})",
            position,
            journal.len()
        )
    })
}

/// Journal subcommands; these never touch the generation services
pub fn run_journal_command(journal: &mut Journal, command: JournalCommand) -> Result<()> {
    match command {
        JournalCommand::List => print_journal(journal.dreams()),
        JournalCommand::Show { position } => {
            let dream = resolve_position(journal, position)?;
            print_journal_entry(position, dream);
        }
        JournalCommand::Delete { position } => {
            let id = resolve_position(journal, position)?.id.clone();
            journal.delete(&id);
            println!("Deleted dream #{}.", position);
        }
        JournalCommand::Export { position, path } => {
            let dream = resolve_position(journal, position)?;
            let written = export_image(&dream.image, &path, &format!("dream-{}", position))
                .context("Failed to export dream image")?;
            println!("Image written to {}", written.display().to_string().cyan());
        }
    }
    Ok(())
}

/// A line typed in interactive mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Add(String),
    Remove(String),
    Themes,
    Dream,
    Save,
    Again,
    Journal,
    Show(usize),
    Delete(usize),
    Export(usize, PathBuf),
    Out(PathBuf),
    Help,
    Quit,
}

fn parse_position(arg: &str) -> Result<usize, String> {
    arg.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| format!("'{}' is not a journal position", arg.trim()))
}

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let needs_arg = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("'{}' needs {}", word, what))
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_lowercase().as_str() {
        "add" | "+" => needs_arg("a theme").map(ReplCommand::Add),
        "remove" | "rm" | "-" => needs_arg("a theme").map(ReplCommand::Remove),
        "themes" | "ls" => Ok(ReplCommand::Themes),
        "dream" | "generate" | "go" => Ok(ReplCommand::Dream),
        "save" => Ok(ReplCommand::Save),
        "again" | "reset" => Ok(ReplCommand::Again),
        "journal" => Ok(ReplCommand::Journal),
        "show" => parse_position(&needs_arg("a position")?).map(ReplCommand::Show),
        "delete" | "del" => parse_position(&needs_arg("a position")?).map(ReplCommand::Delete),
        "export" => {
            let arg = needs_arg("a position and a path")?;
            let (position, path) = arg
                .split_once(char::is_whitespace)
                .ok_or_else(|| "'export' needs a position and a path".to_string())?;
            Ok(ReplCommand::Export(
                parse_position(position)?,
                PathBuf::from(path.trim()),
            ))
        }
        "out" => needs_arg("a path").map(|p| ReplCommand::Out(PathBuf::from(p))),
        "help" | "?" => Ok(ReplCommand::Help),
        "exit" | "quit" | "q" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    }
}

fn print_written(result: Result<PathBuf, dreamweaver_core::DreamError>) {
    match result {
        Ok(path) => println!("Image written to {}", path.display().to_string().cyan()),
        Err(e) => eprintln!("{}", e.to_string().red()),
    }
}

/// Interactive session: edit themes, weave, save and browse the journal
pub async fn run_interactive<B: GenerationBackend>(session: &mut DreamSession<B>) -> Result<()> {
    println!("{}", "Dreamweaver".bright_cyan().bold());
    println!("Combine themes to build your dreamscape. Type 'help' for commands, 'quit' to leave.");
    println!();
    print_themes(session.themes());

    loop {
        print!("{}> ", "dream".magenta().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if read == 0 {
            // EOF
            println!();
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&input) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message.yellow());
                continue;
            }
        };
        debug!("Interactive command: {:?}", command);

        match command {
            ReplCommand::Add(theme) => {
                if !session.add_theme(&theme) {
                    println!("{}", "That theme is empty or already added.".yellow());
                }
                print_themes(session.themes());
            }
            ReplCommand::Remove(theme) => {
                if !session.remove_theme(&theme) {
                    println!("{}", format!("No theme named '{}'.", theme).yellow());
                }
                print_themes(session.themes());
            }
            ReplCommand::Themes => print_themes(session.themes()),
            ReplCommand::Dream => {
                weave(session).await;
            }
            ReplCommand::Save => report_save(session.save_current()),
            ReplCommand::Again => {
                session.reset_current();
                print_themes(session.themes());
            }
            ReplCommand::Journal => print_journal(session.journal().dreams()),
            ReplCommand::Show(position) => match session.journal().at_position(position) {
                Some(dream) => print_journal_entry(position, dream),
                None => println!("{}", format!("No dream at position {}.", position).yellow()),
            },
            ReplCommand::Delete(position) => match session.delete_at(position) {
                Some(_) => println!("Deleted dream #{}.", position),
                None => println!("{}", format!("No dream at position {}.", position).yellow()),
            },
            ReplCommand::Export(position, path) => match session.journal().at_position(position) {
                Some(dream) => print_written(export_image(
                    &dream.image,
                    &path,
                    &format!("dream-{}", position),
                )),
                None => println!("{}", format!("No dream at position {}.", position).yellow()),
            },
            ReplCommand::Out(path) => print_written(session.export_current(Path::new(&path))),
            ReplCommand::Help => print_interactive_help(),
            ReplCommand::Quit => {
                println!("Sweet dreams.");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamweaver_journal::{Dream, InMemoryJournalStore};
    use tempfile::tempdir;

    #[test]
    fn test_parse_theme_commands_keep_spaces() {
        assert_eq!(
            parse_command("add  City made of glass "),
            Ok(ReplCommand::Add("City made of glass".to_string()))
        );
        assert_eq!(
            parse_command("rm Neon desert"),
            Ok(ReplCommand::Remove("Neon desert".to_string()))
        );
        assert!(parse_command("add").is_err());
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse_command("delete 3"), Ok(ReplCommand::Delete(3)));
        assert_eq!(parse_command("show 1"), Ok(ReplCommand::Show(1)));
        assert!(parse_command("delete 0").is_err());
        assert!(parse_command("delete two").is_err());
        assert_eq!(
            parse_command("export 2 out/dream.jpg"),
            Ok(ReplCommand::Export(2, PathBuf::from("out/dream.jpg")))
        );
        assert!(parse_command("export 2").is_err());
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("DREAM"), Ok(ReplCommand::Dream));
        assert_eq!(parse_command("again"), Ok(ReplCommand::Again));
        assert_eq!(parse_command("quit"), Ok(ReplCommand::Quit));
        assert!(parse_command("fly").is_err());
    }

    fn journal_with_one() -> Journal {
        let mut journal = Journal::open(InMemoryJournalStore::new());
        journal.save(Dream::new(
            vec!["Crystal caves".to_string()],
            "data:image/jpeg;base64,aGkh".to_string(),
            "You wander glittering halls.".to_string(),
        ));
        journal
    }

    #[test]
    fn test_journal_delete_by_position() {
        let mut journal = journal_with_one();
        assert!(run_journal_command(&mut journal, JournalCommand::Delete { position: 2 }).is_err());
        assert_eq!(journal.len(), 1);
        run_journal_command(&mut journal, JournalCommand::Delete { position: 1 }).unwrap();
        assert!(journal.is_empty());
    }

    #[test]
    fn test_journal_export_into_directory() {
        let dir = tempdir().unwrap();
        let mut journal = journal_with_one();
        run_journal_command(
            &mut journal,
            JournalCommand::Export {
                position: 1,
                path: dir.path().to_path_buf(),
            },
        )
        .unwrap();
        assert_eq!(std::fs::read(dir.path().join("dream-1.jpg")).unwrap(), b"hi!");
    }
}
