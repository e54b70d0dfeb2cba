//! city-tracker: terminal front end for the capacity/population tracker.
//!
//! Usage:
//!   city-tracker --db city.db --key my-city --debug
//!   city-tracker --config tracker.json --ipc-mode

use anyhow::Result;
use city_tracker_core::{
    command::CityCommand,
    config::TrackerConfig,
    engine::CityEngine,
    types::{CityState, Field, FlashSignal},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Instant;

#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum Control {
    GetState,
    Quit,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum IpcRequest {
    Control(Control),
    Command(CityCommand),
}

#[derive(serde::Serialize)]
struct UiState {
    capacity:   u64,
    population: u64,
    flash:      FlashSignal,
    can_undo:   bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    undo_depth: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = match find_arg(&args, "--config") {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(db) = find_arg(&args, "--db") {
        config.db_path = db.to_string();
    }
    if let Some(key) = find_arg(&args, "--key") {
        config.snapshot_key = key.to_string();
    }
    if args.iter().any(|a| a == "--debug") {
        config.debug = true;
    }

    let mut engine = CityEngine::build(config)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        println!("City Tracker");
        println!("  db:   {}", engine.config().db_path);
        println!("  key:  {}", engine.config().snapshot_key);
        println!();
        run_interactive(&mut engine)?;
    }

    engine.close()?;
    Ok(())
}

fn run_ipc_loop(engine: &mut CityEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match request {
            IpcRequest::Control(Control::Quit) => break,
            IpcRequest::Control(Control::GetState) => {}
            IpcRequest::Command(cmd) => {
                engine.apply(cmd)?;
            }
        }

        let now = Instant::now();
        engine.poll_flash(now);
        let state = build_ui_state(engine, now);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn run_interactive(engine: &mut CityEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    print_help();
    loop {
        let now = Instant::now();
        engine.poll_flash(now);
        render(engine, now);

        print!("> ");
        io::stdout().flush()?;
        buffer.clear();
        if handle.read_line(&mut buffer)? == 0 {
            break;
        }

        match buffer.trim() {
            "" => continue,
            "q" | "quit" => break,
            "h" | "help" | "?" => print_help(),
            "r" | "reset" => {
                let mut confirm = |state: &CityState| {
                    print!(
                        "Reset capacity {} / population {} to zero? [y/N] ",
                        format_count(state.capacity),
                        format_count(state.population)
                    );
                    let _ = io::stdout().flush();
                    let mut answer = String::new();
                    handle.read_line(&mut answer).is_ok()
                        && matches!(answer.trim(), "y" | "Y" | "yes")
                };
                if !engine.reset(&mut confirm)? {
                    println!("Reset cancelled.");
                }
            }
            code => match CityCommand::from_shortcut(code) {
                Some(CityCommand::Undo) if !engine.can_undo() => println!("Nothing to undo."),
                Some(cmd) => {
                    engine.apply(cmd)?;
                }
                None => {
                    log::warn!("Unknown command: {code}");
                    println!("Unknown command '{code}' (h for help)");
                }
            },
        }
    }
    Ok(())
}

fn build_ui_state(engine: &CityEngine, now: Instant) -> UiState {
    let state = engine.state();
    UiState {
        capacity:   state.capacity,
        population: state.population,
        flash:      engine.flash(now),
        can_undo:   engine.can_undo(),
        undo_depth: engine.config().debug.then(|| engine.undo_depth()),
    }
}

fn render(engine: &CityEngine, now: Instant) {
    let state = engine.state();
    let flash = engine.flash(now);
    println!();
    println!("  Capacity:   {}{}", format_count(state.capacity), marker(flash, Field::Capacity));
    println!("  Population: {}{}", format_count(state.population), marker(flash, Field::Population));
    if !engine.can_undo() {
        println!("  (nothing to undo)");
    }
    if engine.config().debug {
        println!("  Undo steps left: {}", engine.undo_depth());
    }
}

fn marker(flash: FlashSignal, field: Field) -> &'static str {
    if flash.is_set(field) { "  (!)" } else { "" }
}

fn print_help() {
    println!("Commands:");
    println!("  c+ / c-   capacity   ±100,000");
    println!("  C+ / C-   capacity   ±1,000,000");
    println!("  p+ / p-   population ±100,000");
    println!("  P+ / P-   population ±1,000,000");
    println!("  u         undo");
    println!("  r         reset (asks first)");
    println!("  q         quit");
}

/// Group digits in threes: 1234567 -> "1,234,567".
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
