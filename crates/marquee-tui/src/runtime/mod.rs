//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Handlers send `UiEvent`s to `inbox_tx`; the runtime drains `inbox_rx`
//! each frame. Toast snapshots arrive the same way, forwarded from the
//! notification center's watch channel.

mod handlers;
mod inbox;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use marquee_core::recall::CredentialRecall;
use marquee_core::services::{AuthClient, Services};
use marquee_core::store::FileStore;
use marquee_core::toast::{Toast, ToastCenter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, TuiState};
use crate::terminal::TerminalGuard;
use crate::{render, terminal, update};

/// Remembered-login front end used by the TUI.
pub type Recall = CredentialRecall<AuthClient, FileStore>;

/// Target frame rate while something is moving (60fps = ~16ms per frame).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
/// Longer timeout reduces CPU usage when nothing is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
pub struct TuiRuntime {
    terminal: TerminalGuard,
    /// Application state (split: tui + overlay).
    pub state: AppState,
    services: Arc<Services>,
    recall: Arc<Recall>,
    toasts: ToastCenter,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    /// Stops the toast forwarder on exit.
    shutdown: CancellationToken,
    last_tick: Instant,
    /// Last terminal event (fast tick during interaction).
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(
        services: Services,
        store: FileStore,
        toasts: ToastCenter,
        min_password_len: usize,
    ) -> Result<Self> {
        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let recall = Arc::new(CredentialRecall::new(services.auth.clone(), store));
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        Ok(Self {
            terminal,
            state: AppState::new(min_password_len),
            services: Arc::new(services),
            recall,
            toasts,
            inbox_tx,
            inbox_rx,
            shutdown: CancellationToken::new(),
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal input fails.
    pub fn run(&mut self) -> Result<()> {
        self.spawn_toast_forwarder();
        let effects = update::init(&mut self.state);
        self.execute_effects(effects);

        let result = self.event_loop();

        self.shutdown.cancel();
        self.toasts.shutdown();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;

            // Frame goes first so layout-dependent handlers see the current size.
            let size = self.terminal.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Only Tick triggers render; other events batch into the next one.
                let marks_dirty = matches!(&event, UiEvent::Tick);

                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                let state = &self.state;
                self.terminal.terminal.draw(|frame| {
                    render::render(state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let fast = needs_fast_poll(&self.state.tui, self.last_terminal_event.elapsed());
        let tick_interval = if fast {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Don't delay pending results; otherwise block until the next tick.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    /// Forwards every notification-center change to the inbox.
    fn spawn_toast_forwarder(&self) {
        let mut changes = self.toasts.subscribe();
        let tx = self.inbox_tx.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = changes.borrow_and_update().clone();
                        if tx.send(UiEvent::ToastsChanged(snapshot)).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    ///
    /// Cancelable tasks that get cancelled never report completion.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = kind.is_latest_only().then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = match cancel {
                Some(cancel) => tokio::select! {
                    () = cancel.cancelled() => {
                        debug!(?kind, ?id, "task cancelled");
                        return;
                    }
                    inner = f() => inner,
                },
                None => f().await,
            };
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::ShowToast { message, options } => {
                self.toasts.show(message, options);
            }
            UiEffect::DismissToast { id } => self.toasts.dismiss(id),

            // Auth effects
            UiEffect::Recall { task } => {
                let Some(task) = task else {
                    return;
                };
                let recall = Arc::clone(&self.recall);
                self.spawn_task(TaskKind::Recall, task, move || handlers::recall(recall));
            }
            UiEffect::SignIn {
                task,
                email,
                password,
                remember,
            } => {
                let Some(task) = task else {
                    return;
                };
                let recall = Arc::clone(&self.recall);
                self.spawn_task(TaskKind::SignIn, task, move || {
                    handlers::sign_in(recall, email, password, remember)
                });
            }
            UiEffect::SignUp {
                task,
                email,
                password,
            } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::SignUp, task, move || {
                    handlers::sign_up(services, email, password)
                });
            }
            UiEffect::SignOut { task, session } => {
                let Some(task) = task else {
                    return;
                };
                let recall = Arc::clone(&self.recall);
                self.spawn_task(TaskKind::SignOut, task, move || {
                    handlers::sign_out(recall, session)
                });
            }

            // Watchlist effects
            UiEffect::LoadWatchlist { task, session } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::Watchlist, task, move || {
                    handlers::load_watchlist(services, session)
                });
            }
            UiEffect::AddToWatchlist {
                task,
                session,
                movie,
            } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::WatchlistEdit, task, move || {
                    handlers::add_to_watchlist(services, session, movie)
                });
            }
            UiEffect::RemoveFromWatchlist {
                task,
                session,
                movie_id,
                title,
            } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::WatchlistEdit, task, move || {
                    handlers::remove_from_watchlist(services, session, movie_id, title)
                });
            }

            // Catalog effects
            UiEffect::LoadCatalog { task, query } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::Catalog, task, move || {
                    handlers::load_catalog(services, query)
                });
            }
            UiEffect::LoadDetails {
                task,
                movie_id,
                session,
            } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::Details, task, move || {
                    handlers::load_details(services, movie_id, session)
                });
            }
            UiEffect::SaveRating {
                task,
                session,
                movie_id,
                title,
                score,
                review,
            } => {
                let Some(task) = task else {
                    return;
                };
                let services = Arc::clone(&self.services);
                self.spawn_task(TaskKind::Rate, task, move || {
                    handlers::save_rating(services, session, movie_id, title, score, review)
                });
            }
        }
    }
}

/// Fast ticks while tasks run (spinner), a toast is fading out, or the user
/// is typing. Toasts that are merely visible, sticky ones included, change
/// nothing on screen until their next snapshot arrives.
fn needs_fast_poll(state: &TuiState, since_input: Duration) -> bool {
    state.tasks.is_any_running()
        || state.toasts.iter().any(Toast::is_exiting)
        || since_input < IDLE_POLL_DURATION
}
