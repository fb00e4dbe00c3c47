use argh::FromArgs;
use command_console::{ConsoleSettings, Interpreter, Logger, repl};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(FromArgs)]
/// Command console over a demo ship and calculator.
struct Cli {
    #[argh(switch)]
    /// expose every declared method, not only those marked as commands.
    all_methods: bool,

    #[argh(switch, short = 'q')]
    /// print only errors and results.
    quiet: bool,

    #[argh(option, short = 'c')]
    /// evaluate this line and exit instead of starting the prompt; may be repeated.
    command: Vec<String>,
}

/// Prints console output to the terminal: info plain, errors amber, results green.
struct TerminalLogger {
    quiet: bool,
}

impl Logger for TerminalLogger {
    fn info(&self, message: &str) {
        if !self.quiet {
            println!(">{message}");
        }
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[33m{message}\x1b[0m");
    }

    fn result(&self, message: &str) {
        println!("\x1b[32m{message}\x1b[0m");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli: Cli = argh::from_env();
    let settings = ConsoleSettings {
        require_marking: !cli.all_methods,
    };
    let logger = Rc::new(TerminalLogger { quiet: cli.quiet });

    let mut console = Interpreter::new(settings, logger);
    demo::install(&mut console);

    if !cli.command.is_empty() {
        for line in &cli.command {
            console.evaluate(line);
        }
        return Ok(());
    }

    println!("Console: {}", console.target_names().join(", "));
    println!("Type 'help' to list commands, 'exit' to leave.");
    repl::repl(&mut console, "🐒> ")?;
    Ok(())
}
