use guestmail_common::NewProperty;
use guestmail_compiler::{CompileOptions, ProcessCompiler, RenderAdapter, DEFAULT_COMPILE_TIMEOUT};
use guestmail_editor::EditorTimings;
use guestmail_store::{default_brands, BrandFilter, Workspace};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "guestmail.config.json";

/// Guestmail configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Quiet period after the last edit before the preview recompiles
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_busy_linger_ms")]
    pub busy_linger_ms: u64,

    /// How long "Saved" stays up after a save
    #[serde(default = "default_saved_revert_ms")]
    pub saved_revert_ms: u64,

    /// External markup compiler; `mjml` on the PATH when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerConfig>,

    #[serde(default)]
    pub compile_options: CompileOptions,

    /// Properties onboarded at start-up
    #[serde(default = "default_properties")]
    pub properties: Vec<NewProperty>,

    /// Brand tabs for the property list
    #[serde(default = "default_brands")]
    pub brands: Vec<BrandFilter>,

    /// Where UI state such as the theme is kept between runs
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_busy_linger_ms() -> u64 {
    300
}

fn default_saved_revert_ms() -> u64 {
    1500
}

fn default_state_file() -> String {
    ".guestmail-state.json".to_string()
}

fn default_properties() -> Vec<NewProperty> {
    [
        ("A by Adina, Sydney", "Sydney, Australia", "a-by-adina-sydney"),
        ("Adina Brisbane", "Brisbane, Australia", "adina-brisbane"),
        ("Adina Town Hall", "Sydney, Australia", "adina-town-hall"),
        ("The EVE Hotel", "Sydney, Australia", "eve-hotel"),
        ("A by Adina, Vienna", "Vienna, Austria", "a-by-adina-vienna"),
        ("Adina Southbank", "Melbourne, Australia", "adina-southbank"),
    ]
    .into_iter()
    .map(|(name, location, slug)| NewProperty {
        name: name.to_string(),
        location: location.to_string(),
        image_url: format!("https://images.guestmail.dev/properties/{}.jpg", slug),
    })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Executable reading markup on stdin and writing html to stdout
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Append `--config.*` flags understood by the mjml cli
    #[serde(default, rename = "passOptions")]
    pub pass_options: bool,

    /// Kill the compiler if it runs longer than this
    #[serde(default = "default_compile_timeout_ms", rename = "timeoutMs")]
    pub timeout_ms: u64,
}

fn default_compile_timeout_ms() -> u64 {
    DEFAULT_COMPILE_TIMEOUT.as_millis() as u64
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn timings(&self) -> EditorTimings {
        EditorTimings {
            debounce: Duration::from_millis(self.debounce_ms),
            busy_linger: Duration::from_millis(self.busy_linger_ms),
            saved_revert: Duration::from_millis(self.saved_revert_ms),
        }
    }

    pub fn adapter(&self) -> RenderAdapter {
        let compiler = match &self.compiler {
            Some(c) => ProcessCompiler::new(&c.command, c.args.clone())
                .pass_options(c.pass_options)
                .with_timeout(Duration::from_millis(c.timeout_ms)),
            None => ProcessCompiler::mjml(),
        };
        RenderAdapter::new(Arc::new(compiler)).with_options(self.compile_options.clone())
    }

    /// Fresh workspace with every configured property onboarded
    pub fn seed_workspace(&self) -> anyhow::Result<Workspace> {
        let mut workspace = Workspace::new();
        for property in &self.properties {
            workspace.add_property(property.clone())?;
        }
        Ok(workspace)
    }

    /// Get absolute path to the state file
    pub fn state_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.state_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            busy_linger_ms: default_busy_linger_ms(),
            saved_revert_ms: default_saved_revert_ms(),
            compiler: None,
            compile_options: CompileOptions::default(),
            properties: default_properties(),
            brands: default_brands(),
            state_file: default_state_file(),
        }
    }
}
