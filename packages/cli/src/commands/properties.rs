use super::Context;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct PropertiesArgs {
    /// Only show one brand (e.g. "Adina")
    #[arg(short, long)]
    pub brand: Option<String>,

    /// Case-insensitive search over name and location
    #[arg(short, long, default_value = "")]
    pub search: String,
}

pub fn properties(args: PropertiesArgs, ctx: &Context) -> Result<()> {
    let brand = match &args.brand {
        Some(label) => Some(
            ctx.config
                .brands
                .iter()
                .find(|b| b.label.eq_ignore_ascii_case(label.trim()))
                .ok_or_else(|| {
                    let known: Vec<&str> =
                        ctx.config.brands.iter().map(|b| b.label.as_str()).collect();
                    anyhow!("Unknown brand: {}. Use one of: {}", label, known.join(", "))
                })?,
        ),
        None => None,
    };

    let found = ctx.workspace.catalog().filter(brand, &args.search);
    if found.is_empty() {
        println!("{}", "No properties match".yellow());
        return Ok(());
    }

    println!(
        "{}",
        ctx.theme
            .accent(brand.map_or("All properties", |b| b.label.as_str()))
    );
    for property in found {
        println!(
            "  {}  {}  {}",
            property.name,
            ctx.theme.muted(&property.location),
            ctx.theme.muted(property.id.as_str())
        );
    }

    Ok(())
}
