#![doc(html_root_url = "https://docs.rs/gooey-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A web client for server-driven UIs: the backend sends a tree of UI nodes, this crate renders it into a form,
//! and submits that form back whenever the user changes something.
//!
//! The tree model, value transforms, payload assembly, response handling, submission scheduling
//! and both renderers (virtual DOM and HTML) don't touch the browser.
//! [`dom`] and [`client`] do.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod client;
pub mod config;
pub mod controller;
pub mod dom;
mod error;
pub mod extract;
pub mod html;
pub mod node;
pub mod payload;
pub mod realtime;
pub mod render;
pub mod response;
pub mod script;
pub mod transform;
pub mod upload;
pub mod vdom;

pub use client::App;
pub use config::Config;
pub use error::{Error, Result};
pub use node::TreeNode;
