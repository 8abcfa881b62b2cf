//! daisy-nav - Navigate DAISY talking books from the command line

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use daisy_nav::{Direction, NavOption, Navigator, OpenOptions, TargetLookup};

#[derive(Parser)]
#[command(name = "daisy-nav")]
#[command(version, about = "Navigate DAISY 2.02 and DAISY 3 talking books", long_about = None)]
#[command(after_help = "EXAMPLES:
    daisy-nav book/ info                                       Show book metadata
    daisy-nav book/ next --unit heading --audio 823_r.mp3 --time 453
    daisy-nav book/ prev --unit page --audio 825_t.mp3 --time 5 --json")]
struct Cli {
    /// Book directory (containing ncc.html, or an OPF package and NCX)
    #[arg(value_name = "BOOK_DIR")]
    book: String,

    /// How DAISY 2.02 anchor targets are found in SMIL documents
    #[arg(long, value_enum, default_value_t = Lookup::Substring)]
    lookup: Lookup,

    /// Number of parsed SMIL documents to keep in memory
    #[arg(long, value_name = "N")]
    cache: Option<usize>,

    /// Log debug messages (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show layout, metadata and audio fragments
    Info,
    /// Move forward from a playback position
    Next(Position),
    /// Move backward from a playback position
    Prev(Position),
}

#[derive(clap::Args)]
struct Position {
    /// Navigation unit
    #[arg(short, long, value_enum, default_value_t = Unit::Phrase)]
    unit: Unit,

    /// Audio fragment currently playing
    #[arg(short, long)]
    audio: String,

    /// Playback time in seconds
    #[arg(short, long)]
    time: f64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Unit {
    Phrase,
    Heading,
    Page,
}

impl From<Unit> for NavOption {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Phrase => NavOption::Phrase,
            Unit::Heading => NavOption::Heading,
            Unit::Page => NavOption::Page,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Lookup {
    Substring,
    Id,
}

impl From<Lookup> for TargetLookup {
    fn from(lookup: Lookup) -> Self {
        match lookup {
            Lookup::Substring => TargetLookup::Substring,
            Lookup::Id => TargetLookup::IdAttribute,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "daisy_nav=debug".to_string()
        } else {
            "warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut options = OpenOptions::new().with_target_lookup(cli.lookup.into());
    if let Some(capacity) = cli.cache {
        options = options.with_cache_capacity(capacity);
    }
    let mut nav = Navigator::open_with(&cli.book, options).map_err(|e| e.to_string())?;

    match &cli.command {
        Command::Info => {
            show_info(&cli.book, &nav);
            Ok(())
        }
        Command::Next(position) => step(&mut nav, Direction::Forward, position),
        Command::Prev(position) => step(&mut nav, Direction::Backward, position),
    }
}

fn show_info(path: &str, nav: &Navigator) {
    let meta = nav.metadata();
    println!("Book: {path}");
    println!("Layout: {}", nav.layout());
    println!("Title: {}", meta.title);
    if !meta.authors.is_empty() {
        println!("Authors: {}", meta.authors.join(", "));
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    if !meta.identifier.is_empty() {
        println!("Identifier: {}", meta.identifier);
    }
    if let Some(total) = meta.total_time {
        println!("Total time: {}", format_time(total));
    }

    let fragments = nav.list_audio_fragments();
    println!("Audio fragments: {}", fragments.len());
    for (i, audio) in fragments.iter().enumerate() {
        println!("  {:>4}  {audio}", i + 1);
    }
}

fn step(nav: &mut Navigator, direction: Direction, position: &Position) -> Result<(), String> {
    let item = nav
        .navigate(position.unit.into(), direction, &position.audio, position.time)
        .map_err(|e| e.to_string())?;

    if position.json {
        let json = serde_json::to_string_pretty(&item).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    match item {
        Some(item) => println!("{item}"),
        None => println!("end of book"),
    }
    Ok(())
}

fn format_time(seconds: f64) -> String {
    let total = seconds.round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}
