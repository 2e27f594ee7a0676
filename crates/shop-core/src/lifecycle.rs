//! Where a streamed response is, and when it got there.

use std::time::{Duration, Instant};

/// How far a page response has progressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Nothing written yet; status and headers can still change.
    Start,
    ShellSent,
    /// Last section written.
    SectionSent(String),
    Completion,
}

impl LifecyclePhase {
    pub fn name(&self) -> &str {
        match self {
            LifecyclePhase::Start => "start",
            LifecyclePhase::ShellSent => "shell_sent",
            LifecyclePhase::SectionSent(_) => "section_sent",
            LifecyclePhase::Completion => "completion",
        }
    }
}

/// Named instants relative to the start of a request, in the order they
/// were recorded.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: Vec<(String, Instant)>,
}

impl TimingContext {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: Vec::new(),
        }
    }

    /// Record `name`; a repeated name keeps the latest instant.
    pub fn mark(&mut self, name: &str) {
        let now = Instant::now();
        match self.marks.iter_mut().find(|(n, _)| n == name) {
            Some((_, at)) => *at = now,
            None => self.marks.push((name.to_string(), now)),
        }
    }

    pub fn mark_section_start(&mut self, section: &str) {
        self.mark(&format!("section:{}:start", section));
    }

    pub fn mark_section_sent(&mut self, section: &str) {
        self.mark(&format!("section:{}:sent", section));
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn since_start(&self, mark: &str) -> Option<Duration> {
        self.instant(mark).map(|t| t.duration_since(self.start))
    }

    pub fn time_to_shell(&self) -> Option<Duration> {
        self.since_start("shell_sent")
    }

    pub fn time_to_first_section(&self) -> Option<Duration> {
        self.marks
            .iter()
            .find(|(n, _)| n.starts_with("section:") && n.ends_with(":sent"))
            .map(|(_, t)| t.duration_since(self.start))
    }

    /// Time spent writing a section, once it has both marks.
    pub fn section_write_time(&self, section: &str) -> Option<Duration> {
        let start = self.instant(&format!("section:{}:start", section))?;
        let sent = self.instant(&format!("section:{}:sent", section))?;
        Some(sent.duration_since(start))
    }

    fn instant(&self, mark: &str) -> Option<Instant> {
        self.marks
            .iter()
            .find(|(n, _)| n == mark)
            .map(|(_, t)| *t)
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}
