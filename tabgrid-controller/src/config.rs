//! Runtime configuration (`:set`) and the session descriptor the shell
//! persists between runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tabgrid_core::{EditorError, Result};

pub const MAX_RECENT_FOLDERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    Light,
    Dark,
}

/// In-memory configuration the `:set` command mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub max_column_width: u32,
    pub vim_mode: bool,
    pub color_theme: ColorTheme,
    pub case_sensitive_search: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            max_column_width: 400,
            vim_mode: true,
            color_theme: ColorTheme::Light,
            case_sensitive_search: false,
        }
    }
}

fn parse_on_off(value: &str) -> Result<bool> {
    match value {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(EditorError::InvalidCommand(format!(
            "expected on|off, got {other}"
        ))),
    }
}

impl EditorConfig {
    /// Apply one `:set key=value` assignment.
    pub fn apply_set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "max_column_width" => {
                self.max_column_width = value.parse().map_err(|_| {
                    EditorError::InvalidCommand(format!("expected pixels, got {value}"))
                })?;
            }
            "vim_mode" => self.vim_mode = parse_on_off(value)?,
            "case_sensitive_search" => self.case_sensitive_search = parse_on_off(value)?,
            "color_theme" => {
                self.color_theme = match value {
                    "light" => ColorTheme::Light,
                    "dark" => ColorTheme::Dark,
                    other => {
                        return Err(EditorError::InvalidCommand(format!(
                            "expected light|dark, got {other}"
                        )));
                    }
                };
            }
            other => {
                return Err(EditorError::UnknownCommand(format!("set {other}")));
            }
        }
        Ok(())
    }
}

/// What the shell saves between runs. The core only reads it as startup
/// configuration; writing it back is the view's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    #[serde(default)]
    pub open_files: Vec<PathBuf>,
    #[serde(default)]
    pub selected_tab_index: usize,
    #[serde(default)]
    pub selected_folder_path: Option<PathBuf>,
    #[serde(default)]
    pub recent_folders: Vec<PathBuf>,
    #[serde(default = "default_vim_mode")]
    pub vim_mode_enabled: bool,
    #[serde(default = "default_theme")]
    pub color_theme: ColorTheme,
}

fn default_vim_mode() -> bool {
    true
}

fn default_theme() -> ColorTheme {
    ColorTheme::Light
}

impl Default for SessionDescriptor {
    fn default() -> Self {
        SessionDescriptor {
            open_files: Vec::new(),
            selected_tab_index: 0,
            selected_folder_path: None,
            recent_folders: Vec::new(),
            vim_mode_enabled: default_vim_mode(),
            color_theme: default_theme(),
        }
    }
}

impl SessionDescriptor {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| EditorError::InvalidCommand(format!("bad session descriptor: {e}")))
    }

    /// Move `folder` to the front of the MRU list, keeping it deduped and
    /// capped at [`MAX_RECENT_FOLDERS`].
    pub fn remember_folder(&mut self, folder: PathBuf) {
        self.recent_folders.retain(|f| *f != folder);
        self.recent_folders.insert(0, folder);
        self.recent_folders.truncate(MAX_RECENT_FOLDERS);
    }

    pub fn startup_config(&self) -> EditorConfig {
        EditorConfig {
            vim_mode: self.vim_mode_enabled,
            color_theme: self.color_theme,
            ..EditorConfig::default()
        }
    }
}

/// The one CLI flag the shell forwards: `--folder <path>` opens the given
/// directory as the workspace root.
pub fn parse_folder_arg<I, S>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg.as_ref() == "--folder" {
            return args.next().map(|p| PathBuf::from(p.as_ref()));
        }
    }
    None
}
