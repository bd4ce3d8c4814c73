use core::time::Duration;
use gooey_dom::controller::{ChangeSource, Command, SubmissionController, TimerToken};

fn controller() -> SubmissionController {
	SubmissionController::new(Duration::from_millis(500))
}

fn armed_token(command: Command) -> TimerToken {
	match command {
		Command::ArmDebounce { token, delay } => {
			assert_eq!(delay, Duration::from_millis(500));
			token
		}
		other => panic!("expected a debounce, got {:?}", other),
	}
}

#[test]
fn immediate_sources_submit() {
	for source in [ChangeSource::Control, ChangeSource::Widget] {
		let mut controller = controller();
		assert_eq!(controller.on_change(source), Command::Submit);
		assert!(controller.is_in_flight());
	}
}

#[test]
fn hidden_changes_are_ignored() {
	let mut controller = controller();
	assert_eq!(controller.on_change(ChangeSource::Hidden), Command::None);
	assert!(!controller.is_in_flight());
}

#[test]
fn typing_is_debounced() {
	let mut controller = controller();
	let first = armed_token(controller.on_change(ChangeSource::Text));
	let second = armed_token(controller.on_change(ChangeSource::Text));
	assert_ne!(first, second);
	assert!(!controller.is_in_flight());

	assert_eq!(controller.on_debounce_elapsed(first), Command::None);
	assert_eq!(controller.on_debounce_elapsed(second), Command::Submit);
	assert!(controller.is_in_flight());
	// Each arming fires at most once.
	assert_eq!(controller.on_debounce_elapsed(second), Command::None);
}

#[test]
fn immediate_submission_disarms_debounce() {
	let mut controller = controller();
	let token = armed_token(controller.on_change(ChangeSource::Text));
	assert_eq!(controller.on_change(ChangeSource::Control), Command::Submit);
	assert_eq!(controller.on_debounce_elapsed(token), Command::None);
	assert!(!controller.has_successor());
}

#[test]
fn requests_in_flight_collapse_into_one_successor() {
	let mut controller = controller();
	assert_eq!(controller.on_submit_requested(), Command::Submit);

	assert_eq!(controller.on_change(ChangeSource::Control), Command::None);
	assert_eq!(controller.on_realtime_event(), Command::None);
	assert_eq!(controller.on_submit_requested(), Command::None);
	assert!(controller.has_successor());

	assert_eq!(controller.on_completed(), Command::Submit);
	assert!(controller.is_in_flight());
	assert!(!controller.has_successor());

	assert_eq!(controller.on_completed(), Command::None);
	assert!(!controller.is_in_flight());
}

#[test]
fn debounce_during_flight_becomes_successor() {
	let mut controller = controller();
	assert_eq!(controller.on_change(ChangeSource::Widget), Command::Submit);
	let token = armed_token(controller.on_change(ChangeSource::Text));
	assert!(!controller.has_successor());
	assert_eq!(controller.on_debounce_elapsed(token), Command::None);
	assert!(controller.has_successor());
	assert_eq!(controller.on_completed(), Command::Submit);
}

#[test]
fn realtime_events_submit() {
	let mut controller = controller();
	assert_eq!(controller.on_realtime_event(), Command::Submit);
}

#[test]
fn halted_controllers_stay_quiet() {
	let mut controller = controller();
	let token = armed_token(controller.on_change(ChangeSource::Text));
	assert_eq!(controller.on_submit_requested(), Command::Submit);
	assert_eq!(controller.on_realtime_event(), Command::None);
	controller.halt();

	assert!(controller.is_halted());
	assert!(!controller.is_in_flight());
	assert_eq!(controller.on_completed(), Command::None);
	assert_eq!(controller.on_debounce_elapsed(token), Command::None);
	assert_eq!(controller.on_change(ChangeSource::Text), Command::None);
	assert_eq!(controller.on_change(ChangeSource::Control), Command::None);
	assert_eq!(controller.on_realtime_event(), Command::None);
	assert_eq!(controller.on_submit_requested(), Command::None);
}

#[test]
fn stray_completion_is_harmless() {
	let mut controller = controller();
	assert_eq!(controller.on_completed(), Command::None);
	assert_eq!(controller.on_submit_requested(), Command::Submit);
	assert_eq!(controller.debounce(), Duration::from_millis(500));
}
