//! Inline scripts in trusted markup.
//!
//! Browsers run `<script>`s the HTML parser encounters, but not those inserted through `innerHTML`.
//! Markup that arrives after hydration therefore has its scripts re-created once,
//! while scripts in server-rendered markup were already run by the parser and must not run again.
//!
//! Which scripts exist is read back from the parsed DOM, so foreign content (`<svg><script/>`) counts the same way the browser sees it.

/// Where one script instance is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptLifecycle {
	NotYetMounted,
	MountedPendingExecution,
	Executed,
}

impl ScriptLifecycle {
	/// Server-rendered and adopted. The parser already ran it.
	#[must_use]
	pub fn adopted() -> Self {
		Self::Executed
	}

	#[must_use]
	pub fn mount(self) -> Self {
		match self {
			Self::NotYetMounted => Self::MountedPendingExecution,
			other => other,
		}
	}

	#[must_use]
	pub fn should_execute(self) -> bool {
		self == Self::MountedPendingExecution
	}

	/// Marks the script as run. Only a mounted script can run, so other states stay as they are.
	#[must_use]
	pub fn executed(self) -> Self {
		match self {
			Self::MountedPendingExecution => Self::Executed,
			other => other,
		}
	}
}
