//! Optional profiling ring buffer (spec §4.1 "Profiling").

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct ProfileEntry {
  pub at: Instant,
  pub name: &'static str,
  /// `true` for a start event, `false` for a stop event.
  pub start: bool,
}

/// Side-effect-free event log, compiled out entirely when the
/// `profiling` feature is disabled (SPEC_FULL §4.1).
#[derive(Debug, Default)]
pub struct ProfileLog {
  entries: Vec<ProfileEntry>,
}
impl ProfileLog {
  pub fn start(&mut self, name: &'static str) {
    self.entries.push(ProfileEntry { at: Instant::now(), name, start: true });
  }

  pub fn stop(&mut self, name: &'static str) {
    self.entries.push(ProfileEntry { at: Instant::now(), name, start: false });
  }

  pub fn entries(&self) -> &[ProfileEntry] {
    &self.entries
  }
}
