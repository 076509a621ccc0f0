use colored::*;
use dreamweaver_journal::Dream;

/// Short human description of an inline image reference
pub fn describe_image(image: &str) -> String {
    match dreamweaver_journal::decode_image(image) {
        Ok(decoded) => format!("{} image, {} KiB", decoded.mime_type, decoded.bytes.len().div_ceil(1024)),
        Err(_) => "unreadable image".to_string(),
    }
}

pub fn print_themes(themes: &[String]) {
    if themes.is_empty() {
        println!("{}", "Add some elements to begin...".dimmed().italic());
        return;
    }
    println!("{}", "Your dream elements:".cyan());
    for theme in themes {
        println!("  {} {}", "•".yellow(), theme.magenta());
    }
}

/// Print a freshly generated dream
pub fn print_dream(narrative: &str, image: &str, saved: bool) {
    println!();
    println!("  {}", format!("\"{}\"", narrative).italic());
    println!();
    println!("  {} {}", "Dreamscape:".blue().bold(), describe_image(image).dimmed());
    if saved {
        println!("  {}", "Saved".green());
    }
    println!();
}

/// Print the user-facing failure box
pub fn print_nightmare(message: &str) {
    eprintln!("{}", "Oh no, a nightmare!".red().bold());
    eprintln!("{}", message.red());
}

pub fn print_journal(dreams: &[Dream]) {
    if dreams.is_empty() {
        println!("{}", "Your dream journal is empty. Save a dream to see it here.".dimmed());
        return;
    }
    println!("{}", "Dream Journal".bright_cyan().bold());
    for (i, dream) in dreams.iter().enumerate() {
        let saved_at = dream
            .saved_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>3}. {} {}",
            i + 1,
            dream.themes.join(", ").magenta(),
            saved_at.dimmed()
        );
        println!("     {}", preview(&dream.narrative, 72).italic());
    }
}

pub fn print_journal_entry(position: usize, dream: &Dream) {
    println!("{} {}", format!("#{}", position).bright_cyan().bold(), dream.themes.join(", ").magenta());
    if let Some(saved_at) = dream.saved_at {
        println!("{}", saved_at.format("Saved %Y-%m-%d %H:%M UTC").to_string().dimmed());
    }
    print_dream(&dream.narrative, &dream.image, false);
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Show usage instructions when no command is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "dreamweaver dream \"Floating island\" \"Neon desert\"".green().bold());
    println!("    Weave a dream from themes");
    println!();
    println!("  {}", "dreamweaver -i".green().bold());
    println!("    Start an interactive dreaming session");
    println!();
    println!("  {}", "dreamweaver journal list".green().bold());
    println!("    Browse your saved dreams");
    println!();
    println!("{}", "Options:".cyan());
    println!("  --journal <PATH>  Use a different journal file");
    println!("  --help            Show this help message");
    println!();
}

pub fn print_interactive_help() {
    println!("{}", "Commands:".cyan());
    println!("  add <theme>        Add a theme");
    println!("  remove <theme>     Remove a theme");
    println!("  themes             Show the current themes");
    println!("  dream              Weave a dream from the current themes");
    println!("  save               Save the current dream to the journal");
    println!("  again              Clear the current dream and start over");
    println!("  journal            List saved dreams");
    println!("  show <n>           Show saved dream n");
    println!("  delete <n>         Delete saved dream n");
    println!("  export <n> <path>  Write the image of saved dream n");
    println!("  out <path>         Write the image of the current dream");
    println!("  help               Show this list");
    println!("  quit               Leave");
}
