use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backend::ContentBackend;
use crate::content::ContentClient;
use crate::error::{ContentError, StaleResult};
use crate::models::{DailyContext, DailyReadings, LoadState, Selection};

/// Interface state that refers to the currently loaded content. Collapsed on every
/// selection change because the content it pointed at is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentUi {
    pub readings_expanded: bool,
    pub audio_player_visible: bool,
    /// Index into `DailyContext::news` of the article open in the reader.
    pub open_news: Option<usize>,
}

/// Everything the presentation layer may read. Published whole on every change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub selection: Option<Selection>,
    pub readings_status: LoadState,
    pub readings: Option<DailyReadings>,
    pub readings_error: Option<String>,
    pub context_status: LoadState,
    pub context: Option<DailyContext>,
    pub ui: ContentUi,
}

impl Snapshot {
    pub fn is_settled(&self) -> bool {
        self.readings_status.is_settled() && self.context_status.is_settled()
    }
}

struct State {
    snapshot: Snapshot,
    updates: watch::Sender<Snapshot>,
}

impl State {
    fn publish(&self) {
        self.updates.send_replace(self.snapshot.clone());
    }

    /// Only the latest selection may mutate state.
    fn current(&mut self, generation: u64) -> Result<&mut Snapshot, StaleResult> {
        if self.snapshot.generation == generation {
            Ok(&mut self.snapshot)
        } else {
            Err(StaleResult {
                issued: generation,
                current: self.snapshot.generation,
            })
        }
    }
}

/// Tasks spawned for one fetch. Dropping this detaches them; they still apply
/// their results if their generation is current.
pub struct Fetch {
    pub generation: u64,
    tasks: Vec<JoinHandle<()>>,
}

impl Fetch {
    pub async fn finished(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(generation = self.generation, error = %e, "fetch task did not complete");
            }
        }
    }
}

/// Owns the selection and both bundle states; runs the two requests independently.
pub struct Orchestrator<B> {
    client: ContentClient<B>,
    state: Arc<Mutex<State>>,
}

impl<B> Clone for Orchestrator<B> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: self.state.clone(),
        }
    }
}

impl<B: ContentBackend + 'static> Orchestrator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let snapshot = Snapshot::default();
        let (updates, _) = watch::channel(snapshot.clone());
        Self {
            client: ContentClient::new(backend),
            state: Arc::new(Mutex::new(State { snapshot, updates })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.lock().updates.subscribe()
    }

    /// Waits until both bundles have left `loading` for the current generation.
    pub async fn settled(&self) -> Snapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(Snapshot::is_settled).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Replaces the selection and reloads both bundles. An identical selection
    /// still goes through the full reset and refetch.
    pub fn set_selection(&self, selection: Selection) -> Fetch {
        let generation = {
            let mut state = self.lock();
            let generation = state.snapshot.generation + 1;
            state.snapshot = Snapshot {
                generation,
                selection: Some(selection),
                readings_status: LoadState::Loading,
                context_status: LoadState::Loading,
                ..Snapshot::default()
            };
            state.publish();
            generation
        };

        info!(
            generation,
            date = %selection.date,
            language = %selection.language,
            "selection changed, reloading content"
        );

        Fetch {
            generation,
            tasks: vec![
                self.spawn_readings(selection, generation),
                self.spawn_context(selection, generation),
            ],
        }
    }

    /// Re-issues only the readings request for the current selection. No-op unless
    /// readings are in `error`.
    pub fn retry_readings(&self) -> Option<Fetch> {
        let (selection, generation) = {
            let mut state = self.lock();
            let snapshot = &mut state.snapshot;
            let selection = match snapshot.selection {
                Some(s) if snapshot.readings_status == LoadState::Error => s,
                _ => {
                    debug!(status = ?snapshot.readings_status, "retry ignored, readings not in error");
                    return None;
                }
            };
            snapshot.readings_status = LoadState::Loading;
            snapshot.readings_error = None;
            let generation = snapshot.generation;
            state.publish();
            (selection, generation)
        };

        info!(generation, date = %selection.date, language = %selection.language, "retrying readings");
        Some(Fetch {
            generation,
            tasks: vec![self.spawn_readings(selection, generation)],
        })
    }

    fn spawn_readings(&self, selection: Selection, generation: u64) -> JoinHandle<()> {
        let client = self.client.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = client.request_readings(selection.date, selection.language).await;
            if let Err(stale) = apply_readings(&state, generation, result) {
                debug!(%stale, "discarding readings result");
            }
        })
    }

    fn spawn_context(&self, selection: Selection, generation: u64) -> JoinHandle<()> {
        let client = self.client.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let context = client.request_context(selection.date, selection.language).await;
            if let Err(stale) = apply_context(&state, generation, context) {
                debug!(%stale, "discarding context result");
            }
        })
    }

    /// Expands or collapses the readings. Returns the new state; always false
    /// while readings are not loaded.
    pub fn toggle_readings(&self) -> bool {
        let mut state = self.lock();
        if state.snapshot.readings.is_none() {
            return false;
        }
        state.snapshot.ui.readings_expanded = !state.snapshot.ui.readings_expanded;
        let expanded = state.snapshot.ui.readings_expanded;
        state.publish();
        expanded
    }

    pub fn set_audio_player(&self, visible: bool) -> bool {
        let mut state = self.lock();
        if state.snapshot.context.is_none() {
            return false;
        }
        state.snapshot.ui.audio_player_visible = visible;
        state.publish();
        true
    }

    /// Opens a loaded news item in the reader. Unknown indexes are rejected.
    pub fn open_news(&self, index: usize) -> bool {
        let mut state = self.lock();
        let exists = state.snapshot.context.as_ref().is_some_and(|c| index < c.news.len());
        if !exists {
            return false;
        }
        state.snapshot.ui.open_news = Some(index);
        state.publish();
        true
    }

    pub fn close_news(&self) {
        let mut state = self.lock();
        if state.snapshot.ui.open_news.take().is_some() {
            state.publish();
        }
    }
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    // Critical sections never leave the snapshot half-written.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn apply_readings(
    state: &Mutex<State>,
    generation: u64,
    result: Result<DailyReadings, ContentError>,
) -> Result<(), StaleResult> {
    let mut state = lock_state(state);
    let snapshot = state.current(generation)?;
    match result {
        Ok(readings) => {
            snapshot.readings = Some(readings);
            snapshot.readings_error = None;
            snapshot.readings_status = LoadState::Success;
        }
        Err(e) => {
            error!(generation, error = %e, "failed to load readings");
            snapshot.readings = None;
            snapshot.readings_error = Some(e.to_string());
            snapshot.readings_status = LoadState::Error;
        }
    }
    state.publish();
    Ok(())
}

fn apply_context(state: &Mutex<State>, generation: u64, context: DailyContext) -> Result<(), StaleResult> {
    let mut state = lock_state(state);
    let snapshot = state.current(generation)?;
    snapshot.context = Some(context);
    snapshot.context_status = LoadState::Success;
    state.publish();
    Ok(())
}
