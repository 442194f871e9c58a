//! HTTP access to the service under test
//!
//! The runner only sees the [`HttpClient`] trait. [`ServiceClient`] talks to
//! a real server through reqwest; [`ScriptedClient`] replays canned replies.

pub mod client;
pub mod protocol;
pub mod scripted;

pub use client::{HttpClient, ServiceClient};
pub use protocol::{HttpRequest, HttpResponse, Method};
pub use scripted::ScriptedClient;
