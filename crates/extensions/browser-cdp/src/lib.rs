//! Shared Chrome browser for AutoWeb, driven over the Chrome DevTools
//! Protocol (CDP). Pure Rust, no Node.js.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    WebSocket     ┌──────────────────┐
//! │  BrowserManager  │ ◄──────────────► │   Chrome/Edge    │
//! │  └─ CdpPage      │       CDP        │  (shared page)   │
//! └──────────────────┘                  └──────────────────┘
//! ```
//!
//! ## Setup
//!
//! Either start Chrome yourself with remote debugging enabled:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! or let [`BrowserManager`] launch one with a persistent profile under
//! `~/.autoweb/browser-profile`.
//!
//! ## Lazy Initialization
//!
//! Nothing connects until the engine first asks for the page. The connection
//! is created once under a mutex and shared by every run afterwards.
//!
//! ## Frames
//!
//! Scripts targeting a child frame run in an isolated world created for that
//! frame (`Page.createIsolatedWorld`). The world shares the frame's DOM but not
//! its JavaScript globals.

pub mod cdp;
pub mod manager;
mod page;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
pub use page::CdpPage;
