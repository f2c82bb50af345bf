//! Leveled console output and step progress display
//!
//! All user-facing output goes through this module so the postinstall run
//! has a consistent info/warn/error prefix format. Warnings and errors go
//! to stderr; npm shows stderr even in quiet mode.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

pub fn info(msg: &str) {
    println!("{} {}", Style::new().green().bold().apply_to("info:"), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", Style::new().yellow().bold().apply_to("warn:"), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", Style::new().red().bold().apply_to("error:"), msg);
}

pub fn detail(msg: &str) {
    println!("  {}", Style::new().dim().apply_to(msg));
}

/// Progress display for the installation pipeline
pub struct StepProgress {
    bar: ProgressBar,
}

impl StepProgress {
    /// Create a progress bar sized to the total step count
    pub fn new(total_steps: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total_steps);
        bar.set_style(style);

        Self { bar }
    }

    /// Update to show the step currently executing
    pub fn begin_step(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    /// Mark the current step finished
    pub fn finish_step(&self) {
        self.bar.inc(1);
    }

    /// Finish the whole pipeline display
    pub fn finish(&self, msg: &str) {
        self.bar.finish_with_message(msg.to_string());
    }

    /// Abandon on critical failure, leaving the bar visible
    pub fn abandon(&self, msg: &str) {
        self.bar.abandon_with_message(msg.to_string());
    }
}
