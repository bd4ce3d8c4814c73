use gooey_dom::script::ScriptLifecycle;

#[test]
fn lifecycle() {
	let state = ScriptLifecycle::NotYetMounted;
	assert!(!state.should_execute());
	assert_eq!(state.executed(), ScriptLifecycle::NotYetMounted);

	let state = state.mount();
	assert_eq!(state, ScriptLifecycle::MountedPendingExecution);
	assert!(state.should_execute());

	let state = state.executed();
	assert_eq!(state, ScriptLifecycle::Executed);
	assert!(!state.should_execute());
	assert_eq!(state.mount(), ScriptLifecycle::Executed);
}

#[test]
fn adopted_scripts_never_run_again() {
	assert!(!ScriptLifecycle::adopted().should_execute());
	assert!(!ScriptLifecycle::adopted().mount().should_execute());
}
