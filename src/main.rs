use std::{io::BufRead, path::PathBuf};

use clap::Parser;
use tracing::error;

mod console;

#[derive(clap::Parser)]
struct Opts {
    /// Skeleton file to load before reading commands.
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt().init();

    let opts = Opts::parse();

    let mut console = console::Console::default();
    if let Some(path) = &opts.load {
        if let Err(err) = console.load(path) {
            error!("Could not load {}: {err}", path.display());
            std::process::exit(1);
        }
    }

    println!("skeltool console; type \"help\" for commands");

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!("Failed to read console input: {err}");
                break;
            }
        };

        if !console.handle_line(&line) {
            break;
        }
    }
}
