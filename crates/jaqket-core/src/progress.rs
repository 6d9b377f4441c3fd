//! Terminal progress: byte bars for resource downloads, spinners for split
//! generation. Without a TTY every bar is hidden and logs carry progress.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Width of the name column shared by every line
const LABEL_WIDTH: usize = 24;

const SPINNER_TICK: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// Download before the response reports a length
    Pending,
    /// Download with known total
    Bytes,
    /// Split generation spinner
    Stage,
}

impl LineKind {
    fn template(self) -> &'static str {
        match self {
            Self::Pending => "{prefix:<24.dim} {binary_bytes:>7} {wide_msg:.dim}",
            Self::Bytes => {
                "{prefix:<24.dim} {bar:30.green/dim} {binary_bytes:>7}/{binary_total_bytes:7} {eta:>4} {wide_msg:.dim}"
            }
            Self::Stage => "{spinner:.green} {prefix:<24.cyan.bold} {wide_msg}",
        }
    }

    fn style(self) -> ProgressStyle {
        let style = ProgressStyle::with_template(self.template()).expect("invalid template");
        match self {
            Self::Bytes => style.progress_chars("--"),
            _ => style,
        }
    }
}

/// Switch a pending download line to a byte bar once the total is known
pub fn upgrade_to_bar(pb: &ProgressBar, total: u64) {
    pb.set_length(total);
    pb.set_style(LineKind::Bytes.style());
}

/// Row counter text shown on stage lines
pub fn rows_message(rows: usize) -> String {
    format!("{} rows", fmt_num(rows))
}

/// Owns the `MultiProgress` every bar of a run is drawn on.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Draw bars only when stderr is a terminal
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    /// Never draws (tests, library callers)
    pub fn hidden() -> Self {
        Self::with_tty(false)
    }

    fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    fn add_line(&self, kind: LineKind, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(0));
        pb.set_style(kind.style());
        pb.set_prefix(truncate_label(name, LABEL_WIDTH));
        pb
    }

    /// Line for one resource download; see [`upgrade_to_bar`]
    pub fn download_bar(&self, name: &str) -> ProgressBar {
        self.add_line(LineKind::Pending, name)
    }

    /// Spinner for one split. Finish with `pb.finish_and_clear()`.
    pub fn stage_line(&self, name: &str) -> ProgressBar {
        let pb = self.add_line(LineKind::Stage, name);
        if self.is_tty {
            pb.enable_steady_tick(SPINNER_TICK);
        }
        pb
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// For the log bridge
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedProgress = Arc<ProgressContext>;

/// Cut on a char boundary; resource and split names may be Japanese.
fn truncate_label(name: &str, max_chars: usize) -> String {
    name.chars().take(max_chars).collect()
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
