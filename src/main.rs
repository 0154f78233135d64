use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::Parser as ClapParser;

use tinj::session::Session;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Script to interpret. Without one, an interactive prompt starts.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,

        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),

            _ => {
                println!("Usage: tinj [script]");
                process::exit(64);
            }
        },
    };

    match args.script {
        Some(script) => run_file(&script),
        None => run_prompt(),
    }
}

/// Interpret a whole script. Exit code 65 flags a syntax or resolution
/// error, 70 a runtime error.
fn run_file(path: &Path) -> anyhow::Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    let mut reader: BufReader<File> = BufReader::new(File::open(path)?);
    reader.read_to_end(&mut buf)?;

    let source = String::from_utf8(buf)?;

    let mut session = Session::new();
    let outcome = session.run(&source);

    if outcome.had_syntax_error {
        process::exit(65);
    }
    if outcome.had_runtime_error {
        process::exit(70);
    }

    Ok(())
}

/// Read-eval-print loop over one persistent session: definitions carry over
/// from line to line, error flags do not.
fn run_prompt() -> anyhow::Result<()> {
    let mut session = Session::new();

    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        buffer.clear();
        if stdin.lock().read_line(&mut buffer)? == 0 {
            // EOF ends the prompt normally.
            break;
        }

        let line = buffer.trim_end_matches(['\n', '\r']);
        if line == "quit" {
            process::exit(0);
        }

        session.run(line);
    }

    Ok(())
}
