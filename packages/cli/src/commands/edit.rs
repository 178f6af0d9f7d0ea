//! Line-driven editing session.
//!
//! Reads commands from stdin so a session can be scripted:
//!
//! ```text
//! open Welcome Email
//! set ./welcome.mjml
//! wait
//! save
//! status
//! ```

use super::templates::print_templates;
use super::preview::print_diagnostics;
use super::{find_property, find_template, Context};
use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use colored::Colorize;
use guestmail_common::{NewProperty, Property, Stage};
use guestmail_editor::{spawn_session, PointerId, PreviewViewport, SessionHandle, SplitPane};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  open <template>               open a template by id or name
  set <file>                    replace the draft with a file's contents
  type <text>                   replace the draft with inline text (\\n for newlines)
  save                          save the draft
  wait                          wait for the preview to settle
  status                        show session state
  preview                       print the preview html
  diagnostics                   list compiler problems
  dismiss                       hide the problem list
  close                         close the draft without saving
  templates                     list this property's templates
  new <stage> <name>            create a template (stage by label or 1-6) and open it
  property <property>           switch property
  add-property <name> | <location> | <image url>
  drag <x>                      drag the split boundary to x pixels
  viewport desktop|mobile       switch the preview frame
  quit";

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Property id or name
    pub property: String,

    /// Width of the editor window in pixels
    #[arg(long, default_value_t = 1200.0)]
    pub width: f64,
}

enum Flow {
    Continue,
    Quit,
}

struct Repl {
    ctx: Context,
    session: SessionHandle,
    property: Property,
    pane: SplitPane,
    viewport: PreviewViewport,
}

pub async fn edit(args: EditArgs, ctx: Context) -> Result<()> {
    let property = ctx.property(&args.property)?;
    let session = spawn_session(
        property.clone(),
        ctx.workspace.store(),
        ctx.config.adapter(),
        ctx.config.timings(),
    );

    let mut repl = Repl {
        ctx,
        session,
        property,
        pane: SplitPane::new(0.0, args.width),
        viewport: PreviewViewport::default(),
    };
    repl.open_default().await?;
    println!("{}", repl.ctx.theme.muted("Type 'help' for commands"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match repl.run(line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => eprintln!("{} {}", "Error:".red().bold(), err),
        }
    }

    repl.session.shutdown().await;
    Ok(())
}

impl Repl {
    async fn run(&mut self, line: &str) -> Result<Flow> {
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        match command {
            "open" => {
                let template = find_template(&self.ctx.workspace, &self.property, rest)?;
                self.session.open(template.id).await?;
                self.print_status();
            }
            "set" => {
                let text = std::fs::read_to_string(rest)
                    .with_context(|| format!("Cannot read {}", rest))?;
                self.session.edit(text).await?;
            }
            "type" => self.session.edit(rest.replace("\\n", "\n")).await?,
            "save" => {
                let saved = self.session.save().await?;
                println!("{} Saved {}", "✓".green(), saved.name);
            }
            "wait" => self.wait_for_preview().await?,
            "status" => self.print_status(),
            "preview" => println!("{}", self.session.snapshot().preview_html()),
            "diagnostics" => {
                let snapshot = self.session.snapshot();
                if snapshot.diagnostics().is_empty() {
                    println!("{}", "No problems".green());
                } else {
                    print_diagnostics(snapshot.diagnostics());
                }
            }
            "dismiss" => self.session.dismiss_diagnostics().await?,
            "close" => self.session.close().await?,
            "templates" => print_templates(&self.ctx.workspace, &self.property, self.ctx.theme),
            "new" => {
                let (stage, name) = split_stage(rest)?;
                let template = self
                    .ctx
                    .workspace
                    .create_template(&self.property.id, name, stage)?;
                println!("{} Created {} in {}", "✓".green(), template.name, stage);
                self.session.open(template.id).await?;
            }
            "property" => {
                let property = find_property(&self.ctx.workspace, rest)?;
                self.session.switch_property(property.clone()).await?;
                self.property = property;
                self.open_default().await?;
            }
            "add-property" => {
                let mut fields = rest.split('|').map(str::trim);
                let data = NewProperty {
                    name: fields.next().unwrap_or_default().to_string(),
                    location: fields.next().unwrap_or_default().to_string(),
                    image_url: fields.next().unwrap_or_default().to_string(),
                };
                let (property, templates) = self.ctx.workspace.add_property(data)?;
                println!(
                    "{} Added {} ({}) with {} templates",
                    "✓".green(),
                    property.name,
                    property.id,
                    templates.len()
                );
            }
            "drag" => {
                let x: f64 = rest.parse().map_err(|_| anyhow!("Usage: drag <x>"))?;
                self.pane.begin_drag(PointerId(1));
                self.pane.on_pointer_move(x);
                self.pane.end_drag();
                self.print_layout();
            }
            "viewport" => {
                self.viewport = match rest.to_ascii_lowercase().as_str() {
                    "desktop" => PreviewViewport::Desktop,
                    "mobile" => PreviewViewport::Mobile,
                    _ => return Err(anyhow!("Usage: viewport desktop|mobile")),
                };
                self.print_layout();
            }
            "help" => println!("{}", HELP),
            "quit" | "exit" => return Ok(Flow::Quit),
            other => return Err(anyhow!("Unknown command: {}. Type 'help'", other)),
        }

        Ok(Flow::Continue)
    }

    /// Selecting a property opens its default template, if it has any
    async fn open_default(&mut self) -> Result<()> {
        if let Some(template) = self.ctx.workspace.default_template(&self.property.id) {
            self.session.open(template.id).await?;
        }
        self.print_status();
        Ok(())
    }

    async fn wait_for_preview(&self) -> Result<()> {
        let config = &self.ctx.config;
        let limit = Duration::from_millis(config.debounce_ms + config.busy_linger_ms)
            + Duration::from_secs(30);

        let mut updates = self.session.subscribe();
        tokio::time::timeout(limit, async {
            updates
                .wait_for(|s| !s.render_pending && !s.busy)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|_| anyhow!("Timed out waiting for the preview"))??;

        let snapshot = self.session.snapshot();
        if snapshot.diagnostics().is_empty() {
            println!("{} Preview updated", "✓".green());
        } else {
            print_diagnostics(snapshot.diagnostics());
        }
        Ok(())
    }

    fn print_status(&self) {
        let theme = self.ctx.theme;
        let snapshot = self.session.snapshot();

        println!(
            "{} {}",
            theme.accent(&self.property.name),
            theme.muted(&format!("[{:?}]", snapshot.state))
        );
        if let Some(draft) = &snapshot.draft {
            println!(
                "  {} {}  {}",
                draft.template().stage,
                draft.template().name,
                theme.muted(draft.template().id.as_str())
            );
            println!(
                "  dirty: {}  save: {:?}  busy: {}  problems: {}",
                snapshot.is_dirty(),
                snapshot.save_status(),
                snapshot.busy,
                snapshot.diagnostics().len()
            );
        }
        if let Some(error) = &snapshot.error {
            println!("  {} {}", "✗".red(), error);
        }
    }

    fn print_layout(&self) {
        let preview = self.pane.preview_width();
        println!(
            "  editor {:.0}px | preview {:.0}px ({:?} frame {:.0}px)",
            self.pane.editor_width(),
            preview,
            self.viewport,
            self.viewport.frame_width(preview)
        );
    }
}

/// `Add ons Late Checkout` or `3 Late Checkout`
fn split_stage(rest: &str) -> Result<(Stage, &str)> {
    let lower = rest.to_ascii_lowercase();
    for stage in Stage::ALL {
        let label = stage.label().to_ascii_lowercase();
        if let Some(tail) = lower.strip_prefix(&label) {
            if tail.starts_with(char::is_whitespace) {
                return Ok((stage, rest[label.len()..].trim()));
            }
        }
    }

    let (first, name) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("Usage: new <stage> <name>"))?;
    Ok((first.parse::<Stage>()?, name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_stage_by_label_with_space() {
        let (stage, name) = split_stage("add ons  Late Checkout").unwrap();
        assert_eq!(stage, Stage::AddOns);
        assert_eq!(name, "Late Checkout");
    }

    #[test]
    fn test_split_stage_by_index() {
        let (stage, name) = split_stage("5 Thank You").unwrap();
        assert_eq!(stage, Stage::PostStay);
        assert_eq!(name, "Thank You");
    }

    #[test]
    fn test_split_stage_rejects_unknown() {
        assert!(split_stage("Lobby Welcome").is_err());
        assert!(split_stage("Pre-Arrival").is_err());
    }
}
