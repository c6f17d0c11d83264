//! Terminal input and output
//!
//! Every interactive component receives a `Console` instead of touching
//! stdin/stdout directly, so sessions can be replayed from a script in tests.

use crate::downloader::DownloadProgress;
use crate::utils::error::YtgrabError;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// How a message should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Warning,
    Error,
}

pub trait Console: Send {
    fn print(&mut self, tone: Tone, message: &str);

    /// Show `prompt` and read one line. `Ok(None)` means the input is closed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn progress(&mut self, progress: &DownloadProgress);

    fn finish_progress(&mut self);

    fn plain(&mut self, message: &str) {
        self.print(Tone::Plain, message);
    }

    fn info(&mut self, message: &str) {
        self.print(Tone::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.print(Tone::Success, message);
    }

    fn warn(&mut self, message: &str) {
        self.print(Tone::Warning, message);
    }

    fn error(&mut self, message: &str) {
        self.print(Tone::Error, message);
    }

    /// Like `read_line`, but a closed input is an error.
    fn prompt(&mut self, prompt: &str) -> Result<String, YtgrabError> {
        self.read_line(prompt)?.ok_or(YtgrabError::InputClosed)
    }
}

/// Console bound to the process's stdin and stdout
pub struct TerminalConsole {
    bar: Option<ProgressBar>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(1000);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            pb.set_style(style);
            pb
        })
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn print(&mut self, tone: Tone, message: &str) {
        let styled = match tone {
            Tone::Plain => message.normal(),
            Tone::Info => message.cyan(),
            Tone::Success => message.green().bold(),
            Tone::Warning => message.yellow().bold(),
            Tone::Error => message.red().bold(),
        };
        match &self.bar {
            Some(bar) => bar.println(styled.to_string()),
            None => println!("{}", styled),
        }
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{}", prompt.blue().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn progress(&mut self, progress: &DownloadProgress) {
        let mut message = format!("{:5.1}%", progress.percentage);
        if progress.total_bytes > 0 {
            message.push_str(&format!(
                " of {:.2} MiB",
                progress.total_bytes as f64 / 1024.0 / 1024.0
            ));
        }
        if progress.speed > 0.0 {
            message.push_str(&format!(" at {:.2} MiB/s", progress.speed / 1024.0 / 1024.0));
        }
        if let Some(eta) = progress.eta {
            message.push_str(&format!(" ETA {}s", eta.as_secs()));
        }

        let bar = self.bar();
        bar.set_position((progress.percentage * 10.0) as u64);
        bar.set_message(message);
    }

    fn finish_progress(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Console fed from a fixed script that records everything it is shown
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    pub output: Vec<(Tone, String)>,
    pub prompts: Vec<String>,
    pub progress_updates: Vec<DownloadProgress>,
}

impl ScriptedConsole {
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Every message with the given tone
    pub fn messages(&self, tone: Tone) -> Vec<&str> {
        self.output
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// Whether any printed message contains `needle`
    pub fn saw(&self, needle: &str) -> bool {
        self.output.iter().any(|(_, m)| m.contains(needle))
    }

    /// Lines of input not consumed yet
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for ScriptedConsole {
    fn print(&mut self, tone: Tone, message: &str) {
        self.output.push((tone, message.to_string()));
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.input.pop_front())
    }

    fn progress(&mut self, progress: &DownloadProgress) {
        self.progress_updates.push(progress.clone());
    }

    fn finish_progress(&mut self) {}
}
