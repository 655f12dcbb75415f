//! gitnotes - Git-backed notebooks
//!
//! This is the main entry point for the gitnotes command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use gitnotes::notebook::{normalize_notebook_path, Notebook, NotebookOptions};
use tracing_subscriber::EnvFilter;

enum Command {
    Create { dir: PathBuf, name: String },
    CreateZip { file: PathBuf, name: String },
    List { path: PathBuf },
    Name { archive: PathBuf },
    Save { path: PathBuf },
    Log { path: PathBuf, limit: Option<usize> },
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut verbose = false;
    let mut limit: Option<usize> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-n" | "--limit" => {
                i += 1;
                match args.get(i).map(|s| s.parse::<usize>()) {
                    Some(Ok(n)) => limit = Some(n),
                    _ => {
                        eprintln!("--limit expects a number");
                        return ExitCode::FAILURE;
                    }
                }
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("gitnotes v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                if arg.starts_with('-') {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
                positional.push(arg.to_string());
            }
        }
        i += 1;
    }

    init_logging(verbose);

    let command = match parse_command(&positional, limit) {
        Some(command) => command,
        None => {
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match run(command, &NotebookOptions::from_env()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("gitnotes=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitnotes=warn"))
    };

    // ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_command(positional: &[String], limit: Option<usize>) -> Option<Command> {
    let (name, rest) = positional.split_first()?;
    let command = match (name.as_str(), rest) {
        ("create", [dir, name]) => Command::Create {
            dir: PathBuf::from(dir),
            name: name.clone(),
        },
        ("create-zip", [file, name]) => Command::CreateZip {
            file: PathBuf::from(file),
            name: name.clone(),
        },
        ("list", [path]) => Command::List {
            path: PathBuf::from(path),
        },
        ("name", [archive]) => Command::Name {
            archive: PathBuf::from(archive),
        },
        ("save", [path]) => Command::Save {
            path: PathBuf::from(path),
        },
        ("log", [path]) => Command::Log {
            path: PathBuf::from(path),
            limit,
        },
        _ => return None,
    };
    Some(command)
}

fn run(command: Command, options: &NotebookOptions) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Create { dir, name } => {
            let notebook = Notebook::create(&dir, &name, options)?;
            println!("{}", notebook.path().display());
            notebook.close()?;
        }
        Command::CreateZip { file, name } => {
            let file = normalize_notebook_path(&file);
            let notebook = Notebook::create_compressed(&file, &name, options)?;
            println!("{}", file.display());
            notebook.close()?;
        }
        Command::List { path } => {
            let notebook = Notebook::open(&path, options)?;
            println!("{} ({})", notebook.config().display_name(), notebook.config().stable_id());
            for note in notebook.notes() {
                println!("  {}", note.path().display());
            }
            notebook.close()?;
        }
        Command::Name { archive } => {
            println!("{}", Notebook::archive_notebook_name(&archive)?);
        }
        Command::Save { path } => {
            let notebook = Notebook::open(&path, options)?;
            let summary = notebook.save()?;
            if summary.is_empty() {
                println!("nothing to save");
            }
            if let Some(id) = summary.config_commit {
                println!("config  {}", id.short());
            }
            if let Some(id) = summary.content_commit {
                println!("content {}", id.short());
            }
            notebook.close()?;
        }
        Command::Log { path, limit } => {
            let notebook = Notebook::open(&path, options)?;
            for commit in notebook.history(limit)? {
                println!(
                    "{} {} {}",
                    commit.id.short(),
                    commit.timestamp.format("%Y-%m-%d %H:%M"),
                    commit.summary()
                );
            }
            notebook.close()?;
        }
    }
    Ok(())
}

fn print_help() {
    println!("gitnotes - Git-backed notebooks");
    println!();
    println!("Usage: gitnotes [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  create DIR NAME        Create a notebook directory NAME inside DIR");
    println!("  create-zip FILE NAME   Create a compressed notebook at FILE");
    println!("  list PATH              List the notes of a notebook or archive");
    println!("  name ARCHIVE           Print the name stored in a compressed notebook");
    println!("  save PATH              Commit pending changes of a notebook or archive");
    println!("  log PATH               Show the history of a notebook or archive");
    println!();
    println!("Options:");
    println!("  -n, --limit N          Show at most N commits (log)");
    println!("  -v, --verbose          Enable debug logging");
    println!("  -h, --help             Show this help message");
    println!("  --version              Show version");
    println!();
    println!("Environment:");
    println!("  GITNOTES_AUTHOR_NAME, GITNOTES_AUTHOR_EMAIL, GITNOTES_SCRATCH_DIR,");
    println!("  GITNOTES_INIT_TIMEOUT_SECS, RUST_LOG");
}
