use super::Context;
use crate::theme::Theme;
use anyhow::Result;
use clap::Args;
use guestmail_common::Property;
use guestmail_store::{group_by_stage, Workspace};

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    /// Property id or name
    pub property: String,
}

pub fn templates(args: TemplatesArgs, ctx: &Context) -> Result<()> {
    let property = ctx.property(&args.property)?;
    print_templates(&ctx.workspace, &property, ctx.theme);
    Ok(())
}

/// Templates grouped by journey stage; the default one is starred
pub fn print_templates(workspace: &Workspace, property: &Property, theme: Theme) {
    let templates = workspace.templates_for(&property.id);
    let default_id = workspace.default_template(&property.id).map(|t| t.id);

    println!("{}", theme.accent(&property.name));
    if templates.is_empty() {
        println!("  {}", theme.muted("No templates"));
        return;
    }

    for (stage, group) in group_by_stage(&templates) {
        println!("  {}", theme.accent(stage.label()));
        for template in group {
            let marker = if Some(&template.id) == default_id.as_ref() {
                "*"
            } else {
                " "
            };
            println!(
                "   {} {}  {}",
                marker,
                template.name,
                theme.muted(template.id.as_str())
            );
        }
    }
}
