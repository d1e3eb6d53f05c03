// structrace: container trace interpreter with a replay viewer

use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use structrace::interpreter::{self, TraceConfig};
use structrace::runtime::CommandLog;
use structrace::snapshot::{PlaybackSpeed, Timeline};
use structrace::ui::App;

/// Program traced when no file is given
const DEFAULT_PROGRAM: &str = include_str!("../demos/default.cpp");

#[derive(Parser, Debug)]
#[command(
    name = "structrace",
    version,
    about = "Trace stack, queue, array and linked list programs and replay them step by step"
)]
struct Args {
    /// Source file to trace (a built-in demo is used when omitted)
    file: Option<PathBuf>,

    /// Print the command log as JSON and exit
    #[arg(long, conflicts_with_all = ["lowered", "replay"])]
    dump: bool,

    /// Print the lowered program and exit
    #[arg(long, conflicts_with = "replay")]
    lowered: bool,

    /// Open a previously dumped command log instead of tracing a source file
    #[arg(long, value_name = "LOG.json", conflicts_with = "file")]
    replay: Option<PathBuf>,

    /// Guarded loop-condition evaluations allowed per run
    #[arg(long, value_name = "N", default_value_t = interpreter::constants::ITERATION_CEILING)]
    ceiling: usize,

    /// Record nothing for pops and removals on empty containers
    #[arg(long, default_value_t = false)]
    suppress_empty_removals: bool,

    /// Auto-play interval in milliseconds
    #[arg(long, value_name = "MS")]
    speed_ms: Option<u64>,

    /// Write diagnostics to this file (the viewer owns the terminal otherwise)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // Logging to stderr would tear through the alternate screen
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), !(args.dump || args.lowered))?;

    let config = TraceConfig {
        iteration_ceiling: args.ceiling,
        suppress_empty_removals: args.suppress_empty_removals,
        ..TraceConfig::default()
    };

    let (source, log, fault) = match &args.replay {
        Some(path) => {
            let log = CommandLog::from_json(&fs::read_to_string(path)?)?;
            (String::new(), log, None)
        }
        None => {
            let source = match &args.file {
                Some(path) => fs::read_to_string(path).map_err(|e| {
                    format!("cannot read '{}': {}", path.display(), e)
                })?,
                None => DEFAULT_PROGRAM.to_string(),
            };

            let program = structrace::parser::rewrite(&source);
            if args.lowered {
                print!("{}", program);
                return Ok(());
            }

            let execution = interpreter::execute(&program, &config);
            (source, execution.log, execution.fault)
        }
    };

    if args.dump {
        println!("{}", log.to_json()?);
        if let Some(fault) = &fault {
            eprintln!("Execution stopped early: {}", fault);
        }
        return Ok(());
    }

    let interval = args
        .speed_ms
        .map_or_else(|| PlaybackSpeed::default().interval(), Duration::from_millis);
    let timeline = Timeline::new(log).with_interval(interval);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(timeline, source, fault);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
