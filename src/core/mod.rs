//! # Core Application Logic
//!
//! This module contains Handdown's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │    API     │
//!     │  Adapter   │ ── spawns backend work ─►│  (reqwest) │
//!     │ (ratatui)  │ ◄──── Action results ─── │            │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`feed`]: The swipe feed and its image preload gate
//! - [`detail`]: Listing and profile overlays
//! - [`search`], [`saved`], [`inbox`]: The other screens
//! - [`config`], [`identity`]: Settings and the stored user id (file I/O, used by `main`)

pub mod action;
pub mod config;
pub mod detail;
pub mod feed;
pub mod identity;
pub mod inbox;
pub mod saved;
pub mod search;
pub mod state;
