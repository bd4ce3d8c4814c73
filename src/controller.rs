//! When to submit: debouncing, realtime triggers and in-flight coalescing.
//!
//! [`SubmissionController`] is a pure state machine.
//! Callers feed it events and carry out the [`Command`] it answers with,
//! which keeps timers and `fetch` out of it and makes it testable anywhere.
//!
//! At most one submission is in flight at any time. Requests that arrive meanwhile are never cancelled
//! and never queued individually: they collapse into a single successor,
//! which is captured from the form as it is when the in-flight submission completes.

use core::time::Duration;
use tracing::{debug, trace, warn};

/// Where a change notification came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeSource {
	/// Free-text entry. Debounced.
	Text,
	/// A discrete control, like a checkbox, radio button, date picker or slider release. Immediate.
	Control,
	/// A composite widget that writes its own hidden field: selects, uploads, expanders. Immediate.
	Widget,
	/// Programmatic writes to plain hidden inputs. Ignored.
	Hidden,
}

/// Identifies one arming of the debounce timer. Only the most recent token is honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Command {
	/// Nothing to do.
	None,
	/// Capture the form as it is now and send it.
	Submit,
	/// (Re)arm the debounce timer. Any earlier token is stale from now on.
	ArmDebounce { token: TimerToken, delay: Duration },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Idle,
	InFlight { successor: bool },
	/// After a failure or navigation. Nothing is submitted anymore.
	Halted,
}

#[derive(Debug)]
pub struct SubmissionController {
	phase: Phase,
	debounce: Duration,
	armed: Option<TimerToken>,
	next_token: u64,
}

impl SubmissionController {
	#[must_use]
	pub fn new(debounce: Duration) -> Self {
		Self {
			phase: Phase::Idle,
			debounce,
			armed: None,
			next_token: 0,
		}
	}

	#[must_use]
	pub fn debounce(&self) -> Duration {
		self.debounce
	}

	#[must_use]
	pub fn is_in_flight(&self) -> bool {
		matches!(self.phase, Phase::InFlight { .. })
	}

	/// Whether a successor submission will be sent once the in-flight one completes.
	#[must_use]
	pub fn has_successor(&self) -> bool {
		self.phase == (Phase::InFlight { successor: true })
	}

	#[must_use]
	pub fn is_halted(&self) -> bool {
		self.phase == Phase::Halted
	}

	pub fn on_change(&mut self, source: ChangeSource) -> Command {
		match source {
			ChangeSource::Hidden => {
				trace!("Ignoring hidden input change.");
				Command::None
			}
			ChangeSource::Text if self.phase != Phase::Halted => {
				let token = TimerToken(self.next_token);
				self.next_token += 1;
				self.armed = Some(token);
				Command::ArmDebounce {
					token,
					delay: self.debounce,
				}
			}
			ChangeSource::Text | ChangeSource::Control | ChangeSource::Widget => self.request(),
		}
	}

	/// The debounce timer armed with `token` fired.
	pub fn on_debounce_elapsed(&mut self, token: TimerToken) -> Command {
		if self.armed == Some(token) {
			self.request()
		} else {
			trace!(?token, "Stale debounce timer.");
			Command::None
		}
	}

	/// A message arrived on a subscribed realtime channel.
	pub fn on_realtime_event(&mut self) -> Command {
		self.request()
	}

	/// An explicit submission, like a form submit or a button press.
	pub fn on_submit_requested(&mut self) -> Command {
		self.request()
	}

	/// The in-flight submission's response was applied.
	pub fn on_completed(&mut self) -> Command {
		match self.phase {
			Phase::InFlight { successor: true } => {
				debug!("Sending successor submission.");
				self.phase = Phase::InFlight { successor: false };
				Command::Submit
			}
			Phase::InFlight { successor: false } => {
				self.phase = Phase::Idle;
				Command::None
			}
			Phase::Idle | Phase::Halted => {
				warn!(phase = ?self.phase, "Completion without a submission in flight.");
				Command::None
			}
		}
	}

	/// Stops all further submissions, dropping any pending successor and debounce.
	///
	/// Used after a failed submission and before navigating away.
	pub fn halt(&mut self) {
		self.phase = Phase::Halted;
		self.armed = None;
	}

	fn request(&mut self) -> Command {
		self.armed = None;
		match self.phase {
			Phase::Idle => {
				self.phase = Phase::InFlight { successor: false };
				Command::Submit
			}
			Phase::InFlight { .. } => {
				trace!("Submission in flight. Deferring.");
				self.phase = Phase::InFlight { successor: true };
				Command::None
			}
			Phase::Halted => Command::None,
		}
	}
}
