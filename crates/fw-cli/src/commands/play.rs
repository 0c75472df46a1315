use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fw_engine::{EngineConfig, Narrator};
use tracing::debug;

use crate::terminal::TerminalUi;

/// Everything `fw play` needs to start a session.
pub struct PlayOptions {
    pub story: PathBuf,
    pub saves: PathBuf,
    pub seed: Option<u64>,
    pub load: Option<String>,
    pub autosave: bool,
    pub player: String,
}

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// 1-based index into the displayed choices.
    Choose(usize),
    Save(String),
    Load(String),
    Saves,
    Delete(String),
    Status,
    Achievements,
    Restart,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Input::Unknown(String::new());
        };
        let arg = words.next().map(str::to_string);

        if let Ok(n) = command.parse::<usize>() {
            return Input::Choose(n);
        }

        match command.to_ascii_lowercase().as_str() {
            "save" => Input::Save(arg.unwrap_or_else(|| "slot_1".to_string())),
            "load" => Input::Load(arg.unwrap_or_else(|| "autosave".to_string())),
            "saves" => Input::Saves,
            "delete" => match arg {
                Some(slot) => Input::Delete(slot),
                None => Input::Unknown(line.to_string()),
            },
            "status" | "s" => Input::Status,
            "achievements" | "a" => Input::Achievements,
            "restart" => Input::Restart,
            "help" | "h" | "?" => Input::Help,
            "quit" | "q" | "exit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "\
  <number>          pick a choice
  save [slot]       save the game (default: slot_1)
  load [slot]       load a game (default: autosave)
  saves             list save slots
  delete <slot>     delete a save slot
  status            show stats and inventory
  achievements      show achievements
  restart           start over
  quit              leave";

pub fn run(opts: &PlayOptions) -> Result<(), String> {
    let story = super::load_story(&opts.story)?;
    let saves = super::open_saves(&opts.saves)?;

    let mut config = EngineConfig::default()
        .with_autosave(opts.autosave)
        .with_player_name(opts.player.clone());
    if let Some(seed) = opts.seed {
        config = config.with_seed(seed);
    }

    let mut narrator = Narrator::from_story(
        story,
        config,
        Box::new(TerminalUi::new()),
        Box::new(saves),
    )
    .map_err(|e| format!("failed to start story: {e}"))?;

    println!("  {} {}", "Playing".bold(), narrator.title().bold());
    println!("  Type 'help' for commands, 'quit' to exit.");

    match &opts.load {
        Some(slot) => narrator.load_game(slot).map_err(|e| e.to_string())?,
        None => narrator.new_game().map_err(|e| e.to_string())?,
    }

    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        // No lock is held across iterations; confirmations read stdin too.
        match io::stdin().read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match Input::parse(input) {
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Choose(n) => choose(&mut narrator, n),
            Input::Save(slot) => report(narrator.save_game(&slot)),
            Input::Load(slot) => report(narrator.load_game(&slot)),
            Input::Delete(slot) => match narrator.delete_save(&slot) {
                Ok(true) => {}
                Ok(false) => println!("  Nothing deleted."),
                Err(e) => println!("  {}", e.to_string().yellow()),
            },
            Input::Saves => print_saves(&narrator),
            Input::Status => print_status(&narrator),
            Input::Achievements => print_achievements(&narrator),
            Input::Restart => report(narrator.new_game()),
            Input::Unknown(text) => {
                println!("  {}", format!("Unknown command '{text}'. Type 'help'.").yellow());
            }
        }
    }

    Ok(())
}

fn choose(narrator: &mut Narrator, n: usize) {
    if narrator.is_finished() {
        println!("  {}", "The story has ended. Type 'restart' or 'quit'.".yellow());
        return;
    }
    let Some(choice) = n
        .checked_sub(1)
        .and_then(|i| narrator.visible_choices().get(i))
        .map(|c| c.id.clone())
    else {
        println!("  {}", format!("There is no choice {n}.").yellow());
        return;
    };
    report(narrator.select_choice(&choice).map(|outcome| {
        debug!(?outcome, "choice resolved");
    }));
}

/// The narrator reports failures to the player itself; only log them here.
fn report(result: fw_engine::EngineResult<()>) {
    if let Err(e) = result {
        debug!(error = %e, "command failed");
    }
}

fn print_saves(narrator: &Narrator) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "Summary"]);
    for slot in narrator.list_saves() {
        let summary = match (slot.error, slot.summary) {
            (Some(error), _) => format!("unreadable: {error}"),
            (None, Some(summary)) => summary,
            (None, None) => "empty".to_string(),
        };
        table.add_row(vec![slot.slot, summary]);
    }
    println!("{table}");
}

fn print_status(narrator: &Narrator) {
    let state = narrator.state();
    let catalog = narrator.catalog();

    if !catalog.stats().is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Stat", "Value"]);
        for def in catalog.stats() {
            let value = state
                .stat(&def.id)
                .map(ToString::to_string)
                .unwrap_or_else(|| "—".to_string());
            table.add_row(vec![def.name.clone(), value]);
        }
        println!("{table}");
    }

    if state.inventory.is_empty() {
        println!("  Inventory: {}", "empty".dimmed());
    } else {
        let items: Vec<String> = state
            .inventory
            .iter()
            .map(|(id, qty)| {
                let name = catalog.item(id).map_or(id, |def| def.name.as_str());
                if qty > 1 {
                    format!("{name} x{qty}")
                } else {
                    name.to_string()
                }
            })
            .collect();
        println!(
            "  Inventory ({}/{}): {}",
            state.inventory.len(),
            state.inventory.capacity(),
            items.join(", ")
        );
    }
    println!("  {}", state.summary().dimmed());
}

fn print_achievements(narrator: &Narrator) {
    let state = narrator.state();
    let (unlocked, total) = narrator.achievements().unlocked_count(state);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Achievement", "Progress", "Description"]);
    for def in narrator.achievements().visible(state) {
        let progress = state.achievement(&def.id);
        let status = match progress {
            Some(p) if p.unlocked => "unlocked".to_string(),
            Some(p) => format!("{}/{}", p.progress, def.kind.target()),
            None => "—".to_string(),
        };
        table.add_row(vec![narrator.localize(&def.name), status, def.description.clone()]);
    }
    println!("{table}");
    println!("  {unlocked} of {total} unlocked");
}
