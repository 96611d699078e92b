//! extreload - main entry point.
//!
//! Usage: extreload [OPTIONS]
//!
//! Options:
//!   --version, -v          Show version
//!   --help, -h             Show usage
//!   --host-file <PATH>     Host snapshot to serve (.json or .toml)
//!   --config <PATH>        Config file instead of ~/.extreloadrc

use std::env;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use extreload::VERSION;
use extreload::app::App;
use extreload::config::Config;
use extreload::host::{HostSnapshot, LocalHost};
use extreload::logging;

/// Maximum iterations for main loop (safety bound).
const MAX_MAIN_ITERATIONS: usize = 10_000_000;

const USAGE: &str = "Usage: extreload [OPTIONS]

Options:
  -v, --version            Show version
  -h, --help               Show this help
      --host-file <PATH>   Host snapshot to serve (.json or .toml)
      --config <PATH>      Config file instead of ~/.extreloadrc";

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    version: bool,
    help: bool,
    host_file: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--version" | "-v" => parsed.version = true,
                "--help" | "-h" => parsed.help = true,
                "--host-file" => {
                    let path = args.next().ok_or("--host-file needs a path")?;
                    parsed.host_file = Some(PathBuf::from(path));
                }
                "--config" => {
                    let path = args.next().ok_or("--config needs a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                other => return Err(format!("unknown argument '{}'", other)),
            }
        }
        Ok(parsed)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("extreload: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if args.version {
        println!("extreload v{}", VERSION);
        return Ok(());
    }
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    logging::init(&config.log_config)?;

    // An explicit snapshot must exist; the default one is created on first run
    let (snapshot_path, snapshot) = match args.host_file {
        Some(path) => {
            let snapshot = HostSnapshot::load(&path)?;
            (path, snapshot)
        }
        None => {
            let path = HostSnapshot::default_path();
            let snapshot = HostSnapshot::load_or_create(&path)?;
            (path, snapshot)
        }
    };
    tracing::info!("[MAIN] serving host snapshot {}", snapshot_path.display());

    let host = Arc::new(LocalHost::new(snapshot).with_latency(config.host_latency()));

    // Restore the terminal before the default hook prints
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config, host);

    restore_terminal()?;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    host: Arc<LocalHost>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config, host)?;

    let mut iterations = 0;
    while app.is_running() && iterations < MAX_MAIN_ITERATIONS {
        terminal.draw(|frame| app.render(frame))?;
        app.update()?;
        iterations += 1;
    }

    app.shutdown();
    Ok(())
}

/// Restores the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}
