use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{heading, toned, Tone};

/// Progress tracking for the fetch, assemble and write phases of a run
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1(window_hours: u32) -> Self {
        eprintln!("⚙️  {}", heading("Phases"));
        let pb = create_spinner(running(format!(
            "Phase 1/3: Fetching builds (last {window_hours}h)"
        )));
        Self { pb }
    }

    pub fn finish_phase_1_start_phase_2(self, build_count: usize) -> Self {
        self.pb
            .finish_with_message(done(format!("Phase 1/3: Fetched {build_count} builds ✓")));
        let pb = create_spinner(running("Phase 2/3: Assembling report"));
        Self { pb }
    }

    pub fn finish_phase_2_start_phase_3(self, section_count: usize) -> Self {
        self.pb.finish_with_message(done(format!(
            "Phase 2/3: Assembled {section_count} sections ✓"
        )));
        let pb = create_spinner(running("Phase 3/3: Writing report"));
        Self { pb }
    }

    pub fn finish_phase_3(self) {
        self.pb.finish_with_message(done("Phase 3/3: Report written ✓"));
        eprintln!();
    }

    /// Stops the spinner without marking the phase done.
    pub fn abandon(self) {
        self.pb.abandon();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn running(text: impl std::fmt::Display) -> String {
    toned(text, Tone::Warning).to_string()
}

fn done(text: impl std::fmt::Display) -> String {
    toned(text, Tone::Good).to_string()
}
