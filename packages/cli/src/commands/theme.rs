use super::Context;
use crate::theme::{Theme, UiState};
use anyhow::Result;
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Toggle,
    Light,
    Dark,
}

#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Change the theme; shows the current one when omitted
    pub action: Option<ThemeAction>,
}

pub fn theme(args: ThemeArgs, ctx: &Context) -> Result<()> {
    let Some(action) = args.action else {
        println!("{}", ctx.theme.accent(&ctx.theme.to_string()));
        return Ok(());
    };

    let next = match action {
        ThemeAction::Toggle => ctx.theme.toggled(),
        ThemeAction::Light => Theme::Light,
        ThemeAction::Dark => Theme::Dark,
    };

    let path = ctx.config.state_path(&ctx.cwd);
    UiState { theme: next }.save(&path)?;
    println!("Theme set to {}", next.accent(&next.to_string()));
    Ok(())
}
