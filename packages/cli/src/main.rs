mod commands;
mod config;
mod theme;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    edit, preview, properties, templates, Context, EditArgs, PreviewArgs, PropertiesArgs,
    TemplatesArgs, ThemeArgs,
};
use tracing_subscriber::EnvFilter;

/// Guestmail - guest journey email templates for hotel properties
#[derive(Parser, Debug)]
#[command(name = "guestmail")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List properties, optionally by brand or search term
    Properties(PropertiesArgs),

    /// List a property's templates grouped by journey stage
    Templates(TemplatesArgs),

    /// Render one template to html
    Preview(PreviewArgs),

    /// Start an editing session driven from stdin
    Edit(EditArgs),

    /// Show or change the colour theme
    Theme(ThemeArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let ctx = Context::load(&cwd)?;

    match cli.command {
        Command::Properties(args) => properties(args, &ctx),
        Command::Templates(args) => templates(args, &ctx),
        Command::Preview(args) => preview(args, &ctx).await,
        Command::Edit(args) => edit(args, ctx).await,
        Command::Theme(args) => commands::theme(args, &ctx),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
