use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::{debug, warn};
use thiserror::Error;

/// Key under which the selected theme id is persisted.
pub const STORAGE_KEY: &str = "preferred-theme";
pub const DEFAULT_THEME_ID: &str = "light";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub primary: &'static str,
    pub primary_hover: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub output_background: &'static str,
    pub output_text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub colors: ThemePalette,
}

macro_rules! theme {
    (@palette $id:literal, $name:literal,
        $primary:literal, $primary_hover:literal, $background:literal, $surface:literal,
        $card:literal, $text:literal, $text_secondary:literal, $border:literal,
        $output_background:literal, $output_text:literal) => {
        Theme {
            id: $id,
            name: $name,
            colors: ThemePalette {
                primary: $primary,
                primary_hover: $primary_hover,
                background: $background,
                surface: $surface,
                card: $card,
                text: $text,
                text_secondary: $text_secondary,
                border: $border,
                output_background: $output_background,
                output_text: $output_text,
            },
        }
    };
    ($id:literal, $name:literal, [$($color:literal),* $(,)?]) => {
        theme!(@palette $id, $name, $($color),*)
    };
}

pub static THEMES: [Theme; 15] = [
    theme!("light", "Light", [
        "#3b82f6", "#2563eb", "#ffffff", "#f8fafc", "#ffffff",
        "#1e293b", "#64748b", "#e2e8f0", "#0f172a", "#e2e8f0",
    ]),
    theme!("dark", "Dark", [
        "#3b82f6", "#2563eb", "#0f172a", "#1e293b", "#1e293b",
        "#f1f5f9", "#94a3b8", "#334155", "#020617", "#cbd5e1",
    ]),
    theme!("monokai", "Monokai", [
        "#f92672", "#e91e63", "#2f3129", "#49483e", "#49483e",
        "#f8f8f2", "#a59f85", "#75715e", "#272822", "#f8f8f2",
    ]),
    theme!("github-dark", "GitHub Dark", [
        "#58a6ff", "#388bfd", "#0d1117", "#161b22", "#161b22",
        "#f0f6fc", "#c9d1d9", "#30363d", "#010409", "#f0f6fc",
    ]),
    theme!("dracula", "Dracula", [
        "#bd93f9", "#a855f7", "#282a36", "#44475a", "#44475a",
        "#f8f8f2", "#6272a4", "#6272a4", "#21222c", "#f8f8f2",
    ]),
    theme!("vscode-dark", "VS Code Dark", [
        "#007acc", "#005a9e", "#1e1e1e", "#252526", "#252526",
        "#cccccc", "#858585", "#3e3e42", "#0e0e0e", "#cccccc",
    ]),
    theme!("solarized-dark", "Solarized Dark", [
        "#268bd2", "#2aa198", "#002b36", "#073642", "#073642",
        "#839496", "#586e75", "#586e75", "#001b26", "#93a1a1",
    ]),
    theme!("nord", "Nord", [
        "#88c0d0", "#81a1c1", "#2e3440", "#3b4252", "#3b4252",
        "#eceff4", "#d8dee9", "#4c566a", "#242933", "#e5e9f0",
    ]),
    theme!("gruvbox-dark", "Gruvbox Dark", [
        "#fe8019", "#d65d0e", "#282828", "#3c3836", "#3c3836",
        "#ebdbb2", "#bdae93", "#504945", "#1d2021", "#d5c4a1",
    ]),
    theme!("tokyo-night", "Tokyo Night", [
        "#7dcfff", "#65bcff", "#1a1b26", "#16161e", "#16161e",
        "#a9b1d6", "#565f89", "#565f89", "#0f0f23", "#9aa5ce",
    ]),
    theme!("oceanic-next", "Oceanic Next", [
        "#99c794", "#6699cc", "#1b2b34", "#343d46", "#343d46",
        "#d8dee9", "#65737e", "#4f5b66", "#0f1419", "#c0c5ce",
    ]),
    theme!("palenight", "Palenight", [
        "#c792ea", "#ab47bc", "#292d3e", "#3e4b59", "#3e4b59",
        "#a6accd", "#697098", "#697098", "#212337", "#959dcb",
    ]),
    theme!("synthwave", "Synthwave", [
        "#ff007c", "#ff4081", "#2a2139", "#34294f", "#34294f",
        "#f92aad", "#848bbd", "#495495", "#1a1625", "#e2e9e9",
    ]),
    theme!("cyberpunk", "Cyberpunk", [
        "#00ff9f", "#00e676", "#0d001a", "#1a0033", "#1a0033",
        "#00ff9f", "#b794f6", "#7c3aed", "#000011", "#00ffff",
    ]),
    theme!("material-dark", "Material Dark", [
        "#6200ea", "#3700b3", "#121212", "#1e1e1e", "#1e1e1e",
        "#ffffff", "#b3b3b3", "#333333", "#000000", "#e0e0e0",
    ]),
];

lazy_static! {
    static ref THEME_INDEX: HashMap<&'static str, &'static Theme> =
        THEMES.iter().map(|theme| (theme.id, theme)).collect();
}

pub fn theme_by_id(id: &str) -> Option<&'static Theme> {
    THEME_INDEX.get(id).copied()
}

pub fn default_theme() -> &'static Theme {
    &THEMES[0]
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        self.id != DEFAULT_THEME_ID
    }

    /// CSS custom properties for this theme, in palette order.
    pub fn css_variables(&self) -> Vec<(String, &'static str)> {
        let c = &self.colors;
        [
            ("primary", c.primary),
            ("primaryHover", c.primary_hover),
            ("background", c.background),
            ("surface", c.surface),
            ("card", c.card),
            ("text", c.text),
            ("textSecondary", c.text_secondary),
            ("border", c.border),
            ("outputBackground", c.output_background),
            ("outputText", c.output_text),
        ]
        .into_iter()
        .map(|(key, value)| (format!("--theme-{}", key), value))
        .collect()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ThemeError {
    #[error("unknown theme: {0}")]
    Unknown(String),
}

/// Where the selected theme id lives between runs.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, theme_id: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    value: Mutex<Option<String>>,
}

impl MemoryThemeStore {
    pub fn with_value(theme_id: &str) -> Self {
        MemoryThemeStore {
            value: Mutex::new(Some(theme_id.to_string())),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Result<Option<String>> {
        let value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("theme store lock poisoned"))?;
        Ok(value.clone())
    }

    fn save(&self, theme_id: &str) -> Result<()> {
        let mut value = self
            .value
            .lock()
            .map_err(|_| anyhow::anyhow!("theme store lock poisoned"))?;
        *value = Some(theme_id.to_string());
        Ok(())
    }
}

/// Keeps the theme id in a one-line file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn with_path(path: PathBuf) -> Self {
        FileThemeStore { path }
    }

    /// `<config dir>/codeforge/preferred-theme`, falling back to the
    /// working directory when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("codeforge"))
            .unwrap_or_default()
            .join(STORAGE_KEY)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileThemeStore {
    fn default() -> Self {
        FileThemeStore::with_path(FileThemeStore::default_path())
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let id = content.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }

    fn save(&self, theme_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, format!("{}\n", theme_id))
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// The applied theme plus the store it is persisted to.
///
/// Rendering code reads colors from here instead of from global state.
pub struct ThemeContext<S: ThemeStore> {
    store: S,
    current: &'static Theme,
}

impl<S: ThemeStore> ThemeContext<S> {
    /// Restores the stored theme. Absent, unreadable or unknown ids fall
    /// back to the default theme.
    pub fn load(store: S) -> Self {
        let current = match store.load() {
            Ok(Some(id)) => theme_by_id(&id).unwrap_or_else(|| {
                debug!("stored theme {} is unknown, using default", id);
                default_theme()
            }),
            Ok(None) => default_theme(),
            Err(e) => {
                warn!("cannot read stored theme: {:#}", e);
                default_theme()
            }
        };
        ThemeContext { store, current }
    }

    pub fn current(&self) -> &'static Theme {
        self.current
    }

    /// Applies a theme and persists its id.
    ///
    /// Unknown ids are rejected and leave the current theme in place.
    /// A failed write keeps the theme applied for this session only.
    pub fn select(&mut self, theme_id: &str) -> Result<&'static Theme, ThemeError> {
        let theme = theme_by_id(theme_id).ok_or_else(|| ThemeError::Unknown(theme_id.to_string()))?;
        if theme.id == self.current.id {
            return Ok(theme);
        }

        self.current = theme;
        if let Err(e) = self.store.save(theme.id) {
            warn!("cannot persist theme {}: {:#}", theme.id, e);
        }
        Ok(theme)
    }

    /// Value of the `data-theme` attribute on the document root.
    pub fn data_theme(&self) -> &'static str {
        self.current.id
    }

    pub fn css_variables(&self) -> Vec<(String, &'static str)> {
        self.current.css_variables()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert_eq!(THEMES.len(), 15);
        assert_eq!(theme_by_id("nord").unwrap().name, "Nord");
        assert!(theme_by_id("solarized-light").is_none());
        assert_eq!(default_theme().id, DEFAULT_THEME_ID);
    }

    #[test]
    fn test_theme_ids_unique() {
        assert_eq!(THEME_INDEX.len(), THEMES.len());
    }

    #[test]
    fn test_only_light_is_light() {
        let light: Vec<_> = THEMES.iter().filter(|t| !t.is_dark()).map(|t| t.id).collect();
        assert_eq!(light, vec!["light"]);
    }

    #[test]
    fn test_css_variables() {
        let vars = theme_by_id("dracula").unwrap().css_variables();
        assert_eq!(vars.len(), 10);
        assert_eq!(vars[0], ("--theme-primary".to_string(), "#bd93f9"));
        assert_eq!(vars[9], ("--theme-outputText".to_string(), "#f8f8f2"));
    }

    #[test]
    fn test_load_defaults_to_light() {
        let context = ThemeContext::load(MemoryThemeStore::default());
        assert_eq!(context.current().id, "light");
        assert_eq!(context.data_theme(), "light");
    }

    #[test]
    fn test_load_unknown_stored_id() {
        let context = ThemeContext::load(MemoryThemeStore::with_value("sepia"));
        assert_eq!(context.current().id, "light");
    }

    #[test]
    fn test_load_store_failure() {
        let mut store = MockThemeStore::new();
        store
            .expect_load()
            .returning(|| Err(anyhow::anyhow!("disk on fire")));
        let context = ThemeContext::load(store);
        assert_eq!(context.current(), default_theme());
    }

    #[test]
    fn test_select_persists() {
        let mut context = ThemeContext::load(MemoryThemeStore::default());
        let theme = context.select("monokai").unwrap();
        assert_eq!(theme.name, "Monokai");
        assert_eq!(context.current().id, "monokai");
        assert_eq!(context.store().load().unwrap().as_deref(), Some("monokai"));
    }

    #[test]
    fn test_select_unknown_keeps_current() {
        let mut store = MockThemeStore::new();
        store
            .expect_load()
            .returning(|| Ok(Some("nord".to_string())));
        store.expect_save().never();

        let mut context = ThemeContext::load(store);
        let before = context.css_variables();
        assert_eq!(
            context.select("sepia"),
            Err(ThemeError::Unknown("sepia".to_string()))
        );
        assert_eq!(context.current().id, "nord");
        assert_eq!(context.css_variables(), before);
    }

    #[test]
    fn test_select_current_does_not_write() {
        let mut store = MockThemeStore::new();
        store.expect_load().returning(|| Ok(None));
        store.expect_save().never();

        let mut context = ThemeContext::load(store);
        assert!(context.select("light").is_ok());
    }

    #[test]
    fn test_select_survives_write_failure() {
        let mut store = MockThemeStore::new();
        store.expect_load().returning(|| Ok(None));
        store
            .expect_save()
            .withf(|id| id == "dark")
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("read-only")));

        let mut context = ThemeContext::load(store);
        assert!(context.select("dark").is_ok());
        assert_eq!(context.current().id, "dark");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileThemeStore::with_path(dir.path().join("nested").join(STORAGE_KEY));
        assert_eq!(store.load().unwrap(), None);

        store.save("tokyo-night").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tokyo-night"));

        let context = ThemeContext::load(store);
        assert_eq!(context.current().name, "Tokyo Night");
    }
}
