use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use jsone::cli::{self, CliError};

#[derive(ClapParser)]
#[command(name = "jsone")]
#[command(about = "Render JSON-e templates against a context")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template (read from stdin, or --template) against a context
    Render {
        /// Template JSON (reads from stdin if not provided)
        #[arg(short, long)]
        template: Option<String>,

        /// Context JSON
        #[arg(short, long, default_value = "{}")]
        context: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Evaluate a single expression against a context
    Eval {
        /// The expression to evaluate
        expression: String,

        /// Context JSON
        #[arg(short, long, default_value = "{}")]
        context: String,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Validate that a template is well-formed JSON, without rendering it
    Check {
        /// Template JSON (reads from stdin if not provided)
        #[arg(short, long)]
        template: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Render { template, context, pretty } => {
            let template_json = read_arg_or_stdin(template)?;
            let rendered = cli::render_json(&template_json, &context)?;
            println!("{}", cli::to_json_string(&rendered, pretty));
            Ok(())
        }
        Commands::Eval { expression, context, pretty } => {
            let value = cli::eval_expression(&expression, &context)?;
            println!("{}", cli::to_json_string(&value, pretty));
            Ok(())
        }
        Commands::Check { template } => {
            let template_json = read_arg_or_stdin(template)?;
            cli::check_syntax(&template_json)?;
            let mut stdout = io::stdout();
            writeln!(stdout, "ok").ok();
            Ok(())
        }
    }
}

fn read_arg_or_stdin(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(s) => Ok(s),
        None => {
            if atty::is(atty::Stream::Stdin) {
                eprintln!("reading template from stdin (pass --template to avoid waiting on a terminal)...");
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            if buf.trim().is_empty() {
                return Err(CliError::NoInput);
            }
            Ok(buf)
        }
    }
}
