use super::{find_template, Context};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use colored::Colorize;
use guestmail_common::{CompileResult, Diagnostic};
use guestmail_compiler::TokenContext;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Property id or name
    pub property: String,

    /// Template id or name (defaults to the property's default template)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Render this file instead of the stored source
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Write the html here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn preview(args: PreviewArgs, ctx: &Context) -> Result<()> {
    let property = ctx.property(&args.property)?;

    let source = match (&args.file, &args.template) {
        (Some(file), _) => fs::read_to_string(file)
            .with_context(|| format!("Cannot read {}", file.display()))?,
        (None, Some(key)) => find_template(&ctx.workspace, &property, key)?.source,
        (None, None) => {
            ctx.workspace
                .default_template(&property.id)
                .ok_or_else(|| anyhow!("{} has no templates", property.name))?
                .source
        }
    };

    let adapter = ctx.config.adapter();
    match adapter
        .render(&source, &TokenContext::for_property(&property))
        .await
    {
        CompileResult::Html(html) => {
            match &args.out {
                Some(out) => {
                    fs::write(out, &html)
                        .with_context(|| format!("Cannot write {}", out.display()))?;
                    println!("{} {}", "✓".green(), out.display());
                }
                None => println!("{}", html),
            }
            Ok(())
        }
        CompileResult::Diagnostics(diagnostics) => {
            print_diagnostics(&diagnostics);
            Err(anyhow!("Template has {} problem(s)", diagnostics.len()))
        }
    }
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("  {} {}", "✗".red(), diagnostic);
    }
}
