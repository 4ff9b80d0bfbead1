use frostrisk::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(80);

/// Engine progress on stderr: a spinner per phase, a bar while dams are scored.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    /// Draws on stderr, or nowhere under `-q`.
    pub fn new(quiet: bool) -> Self {
        let target = if quiet {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        Self {
            bar: ProgressBar::with_draw_target(None, target).with_style(spinner_style()),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |progress| on_progress(&bar, progress))
    }
}

fn on_progress(bar: &ProgressBar, progress: Progress) {
    match progress {
        Progress::PhaseStart { name } => {
            bar.reset();
            bar.set_style(spinner_style());
            bar.set_message(name);
            bar.enable_steady_tick(SPINNER_TICK);
        }
        Progress::TaskStart { total_steps } => {
            bar.disable_steady_tick();
            bar.set_length(total_steps);
            bar.set_position(0);
            bar.set_style(bar_style());
        }
        Progress::TaskIncrement => bar.inc(1),
        // A cancelled batch stops short; leave the bar where it stopped.
        Progress::TaskFinish => {
            if bar.position() < bar.length().unwrap_or(0) {
                bar.abandon_with_message("interrupted");
            }
        }
        Progress::PhaseFinish => {
            bar.disable_steady_tick();
            if !bar.is_finished() {
                bar.finish_with_message(format!("{} done", bar.message()));
            }
        }
        Progress::Message(text) => bar.println(format!("  {text}")),
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<8} [{bar:40.cyan/blue}] {pos}/{len} dams ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn scoring_phase(callback: &ProgressCallback<'static>, dams: u64, scored: u64) {
        callback(Progress::PhaseStart { name: "Scoring" });
        callback(Progress::TaskStart { total_steps: dams });
        for _ in 0..scored {
            callback(Progress::TaskIncrement);
        }
        callback(Progress::TaskFinish);
    }

    #[test]
    fn completed_scoring_phase_finishes_with_the_phase_name() {
        let handler = CliProgressHandler::new(true);
        let callback = handler.get_callback();

        scoring_phase(&callback, 3, 3);
        assert_eq!(handler.bar.position(), 3);
        assert!(!handler.bar.is_finished());

        callback(Progress::PhaseFinish);
        assert!(handler.bar.is_finished());
        assert_eq!(handler.bar.message(), "Scoring done");
    }

    #[test]
    fn cancelled_scoring_phase_is_left_short() {
        let handler = CliProgressHandler::new(true);
        let callback = handler.get_callback();

        scoring_phase(&callback, 5, 2);
        callback(Progress::PhaseFinish);
        assert!(handler.bar.is_finished());
        assert_eq!(handler.bar.position(), 2);
        assert_eq!(handler.bar.length(), Some(5));
        assert_eq!(handler.bar.message(), "interrupted");
    }

    #[test]
    fn next_phase_restarts_the_spinner() {
        let handler = CliProgressHandler::new(true);
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Registry" });
        callback(Progress::Message("3 Arctic dam(s), 1 row(s) skipped".to_string()));
        callback(Progress::PhaseFinish);
        callback(Progress::PhaseStart { name: "Weather" });
        assert!(!handler.bar.is_finished());
        assert_eq!(handler.bar.message(), "Weather");
    }

    #[test]
    fn increments_from_worker_threads_are_counted() {
        let handler = CliProgressHandler::new(true);
        let callback = handler.get_callback();
        callback(Progress::TaskStart { total_steps: 8 });

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    callback(Progress::TaskIncrement);
                    callback(Progress::TaskIncrement);
                });
            }
        });
        assert_eq!(handler.bar.position(), 8);
    }
}
