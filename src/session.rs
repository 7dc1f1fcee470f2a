use log::{debug, info, warn};

use crate::client::{ClientError, CompileReply, Compiler};
use crate::code::CompilationRequest;
use crate::lang::{Lang, SyntaxMode};
use crate::terminal::{OutputPanel, Panel, TerminalStatus, TextStats, PROGRESS_MESSAGE};
use crate::theme::{Theme, ThemeContext, ThemeError, ThemeStore};

/// Keyboard shortcuts understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl+Enter
    RunCode,
    /// Ctrl+Shift+T
    OpenThemes,
    /// Ctrl+L
    ClearOutput,
}

impl Shortcut {
    /// `modifier` is Ctrl, or Cmd on macOS. `key` is the key value as
    /// reported by the keyboard event, so shifted letters are uppercase.
    pub fn from_key(modifier: bool, shift: bool, key: &str) -> Option<Shortcut> {
        if !modifier {
            return None;
        }
        match key {
            "Enter" => Some(Shortcut::RunCode),
            "T" if shift => Some(Shortcut::OpenThemes),
            "l" => Some(Shortcut::ClearOutput),
            _ => None,
        }
    }
}

/// How the editor widget should be configured for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    pub syntax: SyntaxMode,
    pub dark: bool,
}

/// State behind the compiler page: the selected language, the editor
/// buffer, both panels and the applied theme.
pub struct Session<C: Compiler, S: ThemeStore> {
    compiler: C,
    themes: ThemeContext<S>,
    language: Lang,
    code: String,
    input: Panel,
    output: OutputPanel,
    running: bool,
    theme_picker_open: bool,
}

impl<C: Compiler, S: ThemeStore> Session<C, S> {
    pub fn new(compiler: C, store: S) -> Self {
        let language = Lang::default();
        Session {
            compiler,
            themes: ThemeContext::load(store),
            language,
            code: language.sample_code().to_string(),
            input: Panel::default(),
            output: OutputPanel::default(),
            running: false,
            theme_picker_open: false,
        }
    }

    pub fn language(&self) -> Lang {
        self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn code_stats(&self) -> TextStats {
        TextStats::of(&self.code)
    }

    pub fn input(&self) -> &Panel {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Panel {
        &mut self.input
    }

    pub fn output(&self) -> &OutputPanel {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputPanel {
        &mut self.output
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> TerminalStatus {
        self.output.status(self.running)
    }

    pub fn theme(&self) -> &'static Theme {
        self.themes.current()
    }

    pub fn themes(&self) -> &ThemeContext<S> {
        &self.themes
    }

    pub fn theme_picker_open(&self) -> bool {
        self.theme_picker_open
    }

    pub fn open_theme_picker(&mut self) {
        self.theme_picker_open = true;
    }

    pub fn close_theme_picker(&mut self) {
        self.theme_picker_open = false;
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            syntax: self.language.syntax(),
            dark: self.themes.current().is_dark(),
        }
    }

    /// Switches language, loading its sample code and clearing the output.
    /// Unknown ids are ignored.
    pub fn change_language(&mut self, id: &str) -> bool {
        match Lang::from_id(id) {
            Some(language) => {
                debug!("switching language to {}", language.id());
                self.language = language;
                self.code = language.sample_code().to_string();
                self.output.panel.clear();
                true
            }
            None => {
                debug!("ignoring unknown language {}", id);
                false
            }
        }
    }

    pub fn select_theme(&mut self, id: &str) -> Result<&'static Theme, ThemeError> {
        self.themes.select(id)
    }

    /// Marks a run as pending and builds its request.
    ///
    /// Returns `None` while a previous run is still in flight.
    pub fn begin_run(&mut self) -> Option<CompilationRequest> {
        if self.running {
            debug!("run already in flight");
            return None;
        }
        self.running = true;
        self.output.panel.set(PROGRESS_MESSAGE);
        Some(CompilationRequest::new(
            self.language.id(),
            &self.code,
            self.input.text(),
        ))
    }

    /// Renders the outcome of a run into the output panel.
    pub fn finish_run(&mut self, outcome: Result<CompileReply, ClientError>) {
        let text = match outcome {
            Ok(reply) if reply.ok && reply.result.success => {
                if reply.result.output.is_empty() {
                    "Program executed successfully".to_string()
                } else {
                    reply.result.output
                }
            }
            Ok(reply) => format!(
                "Error: {}",
                reply
                    .result
                    .error
                    .unwrap_or_else(|| "Compilation failed".to_string())
            ),
            Err(e) => {
                warn!("compile request failed: {}", e);
                format!("Network error: {}", e)
            }
        };
        self.output.panel.set(text);
        self.running = false;
    }

    /// Sends the current buffer to the compiler and waits for the result.
    pub async fn run(&mut self) -> bool {
        let request = match self.begin_run() {
            Some(request) => request,
            None => return false,
        };
        info!("running {} program", request.language.as_deref().unwrap_or_default());
        let outcome = self.compiler.compile(&request).await;
        self.finish_run(outcome);
        true
    }

    pub async fn handle_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::RunCode => {
                if !self.running {
                    self.run().await;
                }
            }
            Shortcut::OpenThemes => self.open_theme_picker(),
            Shortcut::ClearOutput => self.output.panel.clear(),
        }
    }
}
