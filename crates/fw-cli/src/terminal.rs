//! Plain terminal rendering of scenes, choices, and notifications.

use std::io::{self, Write};

use colored::Colorize;
use fw_core::NotificationKind;
use fw_engine::{ChoiceView, EndingView, SceneView, UiPort};

/// Prints to stdout and reads confirmations from stdin.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }
}

impl UiPort for TerminalUi {
    fn render_scene(&mut self, scene: &SceneView) {
        println!();
        println!("{}", format!("[{}]", scene.id).dimmed());
        println!("{}", scene.text);
        println!();
    }

    fn display_choices(&mut self, choices: &[ChoiceView]) {
        if choices.is_empty() {
            println!("  {}", "(no choices available)".dimmed());
            return;
        }
        for (i, choice) in choices.iter().enumerate() {
            if choice.enabled {
                println!("  {}. {}", (i + 1).to_string().bold(), choice.text);
            } else {
                println!(
                    "  {}. {} {}",
                    (i + 1).to_string().dimmed(),
                    choice.text.dimmed(),
                    "(locked)".dimmed()
                );
            }
        }
    }

    fn show_notification(&mut self, message: &str, kind: NotificationKind) {
        let line = match kind {
            NotificationKind::Info => message.normal(),
            NotificationKind::Success => message.green(),
            NotificationKind::Warning => message.yellow(),
            NotificationKind::Error => message.red(),
            NotificationKind::Achievement => message.magenta().bold(),
        };
        println!("  {} {line}", "*".dimmed());
    }

    fn show_ending(&mut self, ending: &EndingView) {
        println!();
        println!("  {} {}", "THE END:".bold(), ending.title.bold().cyan());
        if !ending.text.is_empty() {
            println!("  {}", ending.text);
        }
        println!();
    }

    fn request_confirmation(&mut self, prompt: &str) -> bool {
        print!("  {prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}
