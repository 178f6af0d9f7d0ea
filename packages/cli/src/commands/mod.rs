pub mod edit;
pub mod preview;
pub mod properties;
pub mod templates;
pub mod theme;

pub use edit::{edit, EditArgs};
pub use preview::{preview, PreviewArgs};
pub use properties::{properties, PropertiesArgs};
pub use templates::{templates, TemplatesArgs};
pub use theme::{theme, ThemeArgs};

use crate::config::Config;
use crate::theme::{Theme, UiState};
use anyhow::{anyhow, Result};
use guestmail_common::{Property, PropertyId, Template, TemplateId};
use guestmail_store::Workspace;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Everything a command needs, built once per run
pub struct Context {
    pub cwd: PathBuf,
    pub config: Config,
    pub workspace: Workspace,
    pub theme: Theme,
}

impl Context {
    pub fn load(cwd: &Path) -> Result<Self> {
        let config = Config::load(cwd)?;
        let workspace = config.seed_workspace()?;

        let theme = match UiState::load(&config.state_path(cwd)) {
            Ok(state) => state.theme,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable state file");
                Theme::default()
            }
        };

        Ok(Self {
            cwd: cwd.to_path_buf(),
            config,
            workspace,
            theme,
        })
    }

    /// Look a property up by id, or by name ignoring case
    pub fn property(&self, key: &str) -> Result<Property> {
        find_property(&self.workspace, key)
    }
}

pub fn find_property(workspace: &Workspace, key: &str) -> Result<Property> {
    let key = key.trim();
    let catalog = workspace.catalog();

    catalog
        .find_by_id(&PropertyId::from(key))
        .or_else(|| {
            catalog
                .list()
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(key))
        })
        .cloned()
        .ok_or_else(|| anyhow!("Unknown property: {}", key))
}

/// Look a property's template up by id, or by name ignoring case
pub fn find_template(workspace: &Workspace, owner: &Property, key: &str) -> Result<Template> {
    let key = key.trim();

    if let Some(template) = workspace.template(&TemplateId::from(key)) {
        if template.owner_id == owner.id {
            return Ok(template);
        }
    }

    workspace
        .templates_for(&owner.id)
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(key))
        .ok_or_else(|| anyhow!("{} has no template named {}", owner.name, key))
}
