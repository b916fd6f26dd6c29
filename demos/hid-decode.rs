//! Decode a recording file: print the descriptor listing, then one line per
//! event. `--json` switches the event output to JSON records.
//!
//! ```text
//! cargo run --example hid-decode -- recording.hid [--json]
//! ```

use std::env;
use std::fs;
use std::process::ExitCode;

use hidwire::recording::{Recording, ReplaySession};
use hidwire::UsageTables;

fn main() -> ExitCode {
    use simple_logger::SimpleLogger;
    SimpleLogger::new().init().unwrap();

    let mut json = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => path = Some(arg),
        }
    }
    let Some(path) = path else {
        eprintln!("usage: hid-decode <recording> [--json]");
        return ExitCode::from(1);
    };

    match run(&path, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hid-decode: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(path: &str, json: bool) -> hidwire::Result<()> {
    let tables = UsageTables::global();

    if json {
        let recording = Recording::load(path)?;
        let Some(model) = &recording.model else {
            return Ok(());
        };
        for event in &recording.events {
            if let Some(decoded) = model.decode(&event.bytes, tables) {
                println!("{}", serde_json::to_string(&decoded).unwrap());
            }
        }
        return Ok(());
    }

    let text = fs::read_to_string(path)?;
    let mut session = ReplaySession::new();
    for line in text.lines() {
        for out in session.feed(line, tables)? {
            println!("{out}");
        }
    }
    Ok(())
}
