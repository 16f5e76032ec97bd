//! User-facing status output.
//!
//! Every line the user is expected to read goes through [`Shell`]: a
//! right-aligned, colored label followed by a message, all on stderr.
//! Multi-file compilation gets an `indicatif` bar in normal mode. Diagnostic
//! chatter goes through `tracing` instead.

use std::fmt::Display;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// How much the shell prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    #[default]
    Normal,
    /// Every per-file line, no progress bar
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!("unknown color mode `{}` (auto, always, never)", other)),
        }
    }
}

/// Label printed in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Created,
    Finished,
    Compiling,
    Emitting,
    Running,
    Info,
    Warning,
    Error,
}

impl Status {
    /// Label text and ANSI style.
    fn style(self) -> (&'static str, &'static str) {
        const GREEN: &str = "\x1b[1;32m";
        const CYAN: &str = "\x1b[1;36m";
        const BLUE: &str = "\x1b[1;34m";
        const YELLOW: &str = "\x1b[1;33m";
        const RED: &str = "\x1b[1;31m";

        match self {
            Status::Created => ("Created", GREEN),
            Status::Finished => ("Finished", GREEN),
            Status::Compiling => ("Compiling", CYAN),
            Status::Emitting => ("Emitting", CYAN),
            Status::Running => ("Running", CYAN),
            Status::Info => ("Info", BLUE),
            Status::Warning => ("Warning", YELLOW),
            Status::Error => ("error", RED),
        }
    }

    /// Per-file labels, folded into the progress bar unless verbose.
    fn per_file(self) -> bool {
        matches!(self, Status::Compiling | Status::Emitting)
    }
}

const LABEL_WIDTH: usize = 12;

#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let color = match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal(),
        };
        Shell { verbosity, color }
    }

    /// `--quiet` beats `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        Shell::new(verbosity, color)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print `{label:>12} {message}`. Quiet mode keeps only errors.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }
        eprintln!("{} {}", self.label(status), msg);
    }

    /// Like [`Shell::status`], but per-file labels only show when verbose.
    pub fn detail(&self, status: Status, msg: impl Display) {
        if status.per_file() && !self.is_verbose() {
            return;
        }
        self.status(status, msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    fn label(&self, status: Status) -> String {
        let (text, style) = status.style();
        if self.color {
            format!("{style}{text:>LABEL_WIDTH$}\x1b[0m")
        } else {
            format!("{text:>LABEL_WIDTH$}")
        }
    }

    /// Start timing `what`; [`Span::finish`] prints the `Finished` line.
    pub fn span(self: &Arc<Self>, what: impl Display) -> Span {
        Span {
            shell: Arc::clone(self),
            what: what.to_string(),
            started: Instant::now(),
        }
    }

    /// A progress bar over `total` items. Hidden when quiet, verbose or
    /// there is at most one item.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        let bar = (self.verbosity == Verbosity::Normal && total > 1).then(|| {
            let bar = ProgressBar::new(total);
            let template = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}";
            if let Ok(style) = ProgressStyle::with_template(template) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.set_message(msg.to_string());
            bar
        });

        Progress {
            bar,
            done: AtomicU64::new(0),
            total,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// A timed section of work.
pub struct Span {
    shell: Arc<Shell>,
    what: String,
    started: Instant,
}

impl Span {
    pub fn finish(self) {
        let took = human_duration(self.started.elapsed());
        self.shell
            .status(Status::Finished, format!("{} in {}", self.what, took));
    }
}

/// Completion counter shared by compile workers.
pub struct Progress {
    bar: Option<ProgressBar>,
    done: AtomicU64,
    total: u64,
}

impl Progress {
    pub fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn position(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

fn human_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.2}s", secs)
    }
}
