use anyhow::Result;
use log::debug;

pub const PROGRESS_MESSAGE: &str = "Compiling and running...";

/// Line and character counters shown in the panel headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub lines: usize,
    pub chars: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        TextStats {
            lines: text.split('\n').count(),
            chars: text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Ready,
    Executing,
    Success,
    Error,
}

impl TerminalStatus {
    pub fn of(output: &str, running: bool) -> Self {
        if running {
            TerminalStatus::Executing
        } else if output.contains("Error")
            || output.contains("error")
            || output.contains("Compilation failed")
        {
            TerminalStatus::Error
        } else if !output.is_empty() {
            TerminalStatus::Success
        } else {
            TerminalStatus::Ready
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TerminalStatus::Ready => "Ready",
            TerminalStatus::Executing => "Executing...",
            TerminalStatus::Success => "Success",
            TerminalStatus::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Plain,
    Error,
    Warning,
    Success,
    Progress,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        let lower = line.to_lowercase();
        if lower.contains("error")
            || lower.contains("exception")
            || lower.contains("compilation failed")
        {
            LineKind::Error
        } else if lower.contains("warning") {
            LineKind::Warning
        } else if line.contains("Program executed successfully")
            || line.contains("exit code 0")
            || line.contains("Hello, World!")
        {
            LineKind::Success
        } else if line.contains(PROGRESS_MESSAGE) {
            LineKind::Progress
        } else {
            LineKind::Plain
        }
    }

    /// ANSI SGR sequence used when printing to a real terminal.
    pub fn ansi(&self) -> &'static str {
        match self {
            LineKind::Plain => "\x1b[0m",
            LineKind::Error => "\x1b[1;31m",
            LineKind::Warning => "\x1b[33m",
            LineKind::Success => "\x1b[1;32m",
            LineKind::Progress => "\x1b[3;34m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine<'a> {
    pub text: &'a str,
    pub kind: LineKind,
}

/// Splits output into classified lines. Empty output renders nothing.
pub fn render_lines(output: &str) -> Vec<TerminalLine<'_>> {
    if output.is_empty() {
        return Vec::new();
    }
    output
        .split('\n')
        .map(|text| TerminalLine {
            text,
            kind: LineKind::classify(text),
        })
        .collect()
}

#[cfg_attr(test, mockall::automock)]
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// A text panel with copy and clear actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    text: String,
    copied: bool,
}

impl Panel {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.copied = false;
    }

    pub fn clear(&mut self) {
        self.set(String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn stats(&self) -> TextStats {
        TextStats::of(&self.text)
    }

    pub fn copied(&self) -> bool {
        self.copied
    }

    /// Copies the panel text. Returns false, without touching the
    /// clipboard, when there is nothing to copy.
    pub fn copy(&mut self, clipboard: &dyn Clipboard) -> Result<bool> {
        if self.text.is_empty() {
            return Ok(false);
        }
        clipboard.write_text(&self.text)?;
        debug!("copied {} chars to clipboard", self.text.len());
        self.copied = true;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPanel {
    pub panel: Panel,
    pub auto_scroll: bool,
}

impl Default for OutputPanel {
    fn default() -> Self {
        OutputPanel {
            panel: Panel::default(),
            auto_scroll: true,
        }
    }
}

impl OutputPanel {
    pub fn toggle_auto_scroll(&mut self) -> bool {
        self.auto_scroll = !self.auto_scroll;
        self.auto_scroll
    }

    pub fn status(&self, running: bool) -> TerminalStatus {
        TerminalStatus::of(self.panel.text(), running)
    }

    pub fn lines(&self) -> Vec<TerminalLine<'_>> {
        render_lines(self.panel.text())
    }
}
