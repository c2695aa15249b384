//! Interactive shell for the hbnb object store.
//!
//! # Responsibility
//! - Reload persisted records, then feed stdin lines to `hbnb_core::Console`.
//! - Print the prompt only when stdin is a terminal.

use hbnb_core::{init_logging, Console, ConsoleConfig, FileStorage, Flow, RecordStore};
use log::{error, info};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = ConsoleConfig::default();

    match std::env::current_dir() {
        Ok(cwd) => {
            let log_dir = config.resolve_log_dir(&cwd);
            if let Err(err) = init_logging(&config.log_level, &log_dir) {
                eprintln!("hbnb: logging disabled: {err}");
            }
        }
        Err(err) => eprintln!("hbnb: logging disabled: {err}"),
    }

    let storage = match FileStorage::open_and_reload(&config.storage_path) {
        Ok(storage) => storage,
        Err(err) => {
            error!("event=console_start module=cli status=error error_code=reload_failed");
            eprintln!("hbnb: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut console = Console::new(storage);
    match run_shell(&mut console, &config.prompt) {
        Ok(()) => {
            info!("event=console_exit module=cli status=ok");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=console_exit module=cli status=error");
            eprintln!("hbnb: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_shell<S: RecordStore>(console: &mut Console<S>, prompt: &str) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        if interactive {
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            console.end_of_input(&mut stdout)?;
            return Ok(());
        }
        if console.onecmd(&line, &mut stdout)? == Flow::Exit {
            return Ok(());
        }
        stdout.flush()?;
    }
}
