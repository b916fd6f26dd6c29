//! Pretty-print a report descriptor given as hex bytes in a file.
//!
//! The file may contain whitespace- or comma-separated bytes, with or
//! without `0x` prefixes, so both raw dumps and C initializer snippets
//! paste straight in.

use std::process::ExitCode;
use std::{env, fs};

use hidwire::{ReportModel, UsageTables};

fn main() -> ExitCode {
    use simple_logger::SimpleLogger;
    SimpleLogger::new().init().unwrap();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: hid-rdesc <file-with-hex-bytes>");
        return ExitCode::from(1);
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hid-rdesc: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(path: &str) -> hidwire::Result<()> {
    let text = fs::read_to_string(path)?;
    let bytes: Vec<u8> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| {
            let t = t.strip_prefix("0x").unwrap_or(t);
            u8::from_str_radix(t, 16).map_err(|_| hidwire::Error::Recording {
                line: 0,
                reason: format!("bad hex byte {t:?}"),
            })
        })
        .collect::<hidwire::Result<_>>()?;

    let model = ReportModel::parse(&bytes)?;
    print!("{}", hidwire::render::dump_rdesc(&model, UsageTables::global()));

    for report in model.reports() {
        match report.id {
            Some(id) => println!("# report {id}: {} bytes", report.byte_len),
            None => println!("# unnumbered report: {} bytes", report.byte_len),
        }
    }
    Ok(())
}
