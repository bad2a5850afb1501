//! apkg command line binary

use apkg::apk::cli;
use apkg::exit_codes::{EXIT_PANIC, EXIT_SUCCESS};
use apkg::logger::JsonLogger;
use apkg::version;
use clap::{Parser, Subcommand};
use std::{env, panic, path::PathBuf, process};

const VERSION: &str = version::VERSION;

#[derive(Parser, Debug)]
#[command(name = "apkg", version = VERSION, about = "Application package helper")]
struct Args {
    /// Log level (trace, debug, info, warn, error; json: prefix for JSON logs)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a package from a layout folder
    Create {
        /// Package layout folder to pack
        folder: PathBuf,

        /// Create the apk in this folder instead of the working directory
        #[arg(long)]
        destination: Option<PathBuf>,
    },
}

fn main() {
    // Set up panic handler to return a specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {panic_info}");
        process::exit(EXIT_PANIC);
    }));

    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: unhandled panic");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    // Handle --version before clap
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("apkg {}", version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();

    if let Some(ref level) = args.log_level {
        JsonLogger::init_with_level(level);
    } else {
        JsonLogger::init();
    }

    match args.command {
        Commands::Create {
            folder,
            destination,
        } => cli::run_create(&folder, destination.as_deref()),
    }
}
