//! C-- IDE
//!
//! A terminal editor for C-- scripts with an embedded interpreter, an
//! interactive console, and a headless `--run` mode.

mod app;
mod cli;
mod console;
mod document;
mod headless;
mod highlight;
mod input;
mod logging;
mod screen;
mod script;
mod session;
mod state;
mod terminal;
mod ui;

use app::App;
use clap::Parser;
use cli::Cli;
use document::SourceDocument;
use std::io;
use std::process::ExitCode;
use terminal::Terminal;

/// Buffer shown when no file is given
const SAMPLE_PROGRAM: &str = "// Press F5 to run, Tab to switch to the console
name = input(\"What is your name?\")
print(\"Hello,\", name)

total = 0
for (i = 1; i <= 10; i++) {
    total += i
}
print(\"Sum of 1..10 is\", total)
";

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Flushes buffered log lines on exit
    let _log_guard = match &cli.log_file {
        Some(path) => match logging::init(path, cli.log_level) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("cmm-ide: cannot open log file {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let result = if cli.run { run_headless(&cli) } else { run_editor(&cli) };
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("cmm-ide: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_headless(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(path) = cli.file.as_deref() else {
        return Err("--run needs a file".into());
    };
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;

    let stdin = io::stdin();
    let summary = headless::run(&source, path, stdin.lock(), io::stdout().lock())?;
    Ok(ExitCode::from(summary.exit_status()))
}

fn run_editor(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let document = match &cli.file {
        Some(path) if path.exists() => SourceDocument::load(path)
            .map_err(|e| format!("cannot open {}: {}", path.display(), e))?,
        Some(path) => {
            // New file: saved under this name on first Ctrl+S
            let mut doc = SourceDocument::new();
            doc.set_path(path.clone());
            doc
        }
        None => SourceDocument::from_text(SAMPLE_PROGRAM),
    };
    tracing::info!("opening editor on {}", document.display_name());

    let mut terminal = Terminal::new()?;
    let mut app = App::new(document, cli.theme, terminal.size()).with_clipboard(arboard::Clipboard::new().ok());
    app.run(&mut terminal)?;
    Ok(ExitCode::SUCCESS)
}
