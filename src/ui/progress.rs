use crate::pipeline::{PipelineObserver, Stage};
use crate::ui::output::phase;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}

/// Prints each stage and shows a bar over the object traversal.
pub struct CliObserver {
    interactive: bool,
    bar: Option<ProgressBar>,
    spinner: Option<Spinner>,
}

impl CliObserver {
    pub fn new() -> Self {
        Self {
            interactive: console::Term::stdout().is_term(),
            bar: None,
            spinner: None,
        }
    }

    fn finish_current(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Clear anything still drawn, e.g. after a failure
    pub fn finish(&mut self) {
        self.finish_current();
    }
}

impl Default for CliObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineObserver for CliObserver {
    fn stage(&mut self, stage: Stage) {
        self.finish_current();
        phase(stage.as_str());
        if self.interactive && stage == Stage::Write {
            self.spinner = Some(Spinner::new("Writing"));
        }
    }

    fn objects(&mut self, done: usize, total: usize) {
        if !self.interactive {
            return;
        }
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::with_template("  {bar:40} {pos}/{len} objects") {
                bar.set_style(style);
            }
            bar
        });
        bar.set_position(done as u64);
    }
}
