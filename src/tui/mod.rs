//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values and runs the
//! effects `update()` asks for.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (feed loading, image preload, any request in flight):
//!   draws every ~80ms so spinners move.
//! - **Idle**: sleeps up to 250ms, only redraws on events, background
//!   results or terminal resize.
//!
//! While a conversation is open, a `PollTick` is dispatched every poll
//! interval so new messages show up without user input.

mod component;
mod components;
mod effects;
mod event;
mod keymap;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, info};

use crate::api::MarketplaceApi;
use crate::core::action::{Action, Effect, update};
use crate::core::feed::FeedView;
use crate::core::state::{App, Screen};
use crate::tui::components::InputBox;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(250);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub search_input: InputBox,
    pub message_input: InputBox,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            search_input: InputBox::new(" Search ", "Type a keyword and press Enter"),
            message_input: InputBox::new(" Message ", "Say something"),
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // Non-blinking: draw() resets the blink timer
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, Hide);
    }
}

/// Anything with a spinner on screen.
fn is_animating(app: &App) -> bool {
    let feed_busy = matches!(app.feed.view(), FeedView::Loading | FeedView::Preloading)
        || app.feed.superlike_pending();
    let overlay_busy = app.overlays.iter().any(|overlay| match overlay {
        crate::core::detail::Overlay::Listing(detail) => {
            detail.offerer.as_ref().is_some_and(|o| o.is_loading())
        }
        crate::core::detail::Overlay::Profile(detail) => detail.content.is_loading(),
    });
    let conversation_busy = app
        .conversation
        .as_ref()
        .is_some_and(|c| c.loading || c.sending);
    feed_busy || overlay_busy || conversation_busy || app.search.loading || app.inbox.loading
}

/// Runs `update` and spawns whatever it returns. True means quit.
fn dispatch(app: &mut App, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    let effect = update(app, action);
    if effect == Effect::Quit {
        return true;
    }
    effects::spawn_effect(app, effect, tx);
    false
}

pub fn run(
    api: Arc<dyn MarketplaceApi>,
    user_id: String,
    poll_interval: Duration,
) -> std::io::Result<()> {
    info!("Starting TUI for user {}", user_id);
    let mut app = App::new(api, user_id);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    dispatch(&mut app, Action::Start, &tx);

    let start_time = Instant::now();
    let mut last_poll = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'main: loop {
        let animating = is_animating(&app);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let mut timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        if app.screen == Screen::Conversation {
            timeout = timeout.min(poll_interval);
        }
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue;
            }
            if let Some(action) = keymap::translate(&app, &mut tui, &event) {
                debug!("Key {:?} -> {:?}", event, action);
                if dispatch(&mut app, action, &tx) {
                    break 'main;
                }
            }
        }

        if app.screen == Screen::Conversation && last_poll.elapsed() >= poll_interval {
            last_poll = Instant::now();
            dispatch(&mut app, Action::PollTick, &tx);
        }

        // Handle background task results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, action, &tx) {
                break 'main;
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}
