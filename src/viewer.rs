use std::sync::{
    Arc, Mutex, PoisonError, Weak,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle, time::sleep};

use crate::api::{FetchError, FetchReadings};
use crate::reading::{SensorReading, sort_readings};
use crate::session::Session;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Observable state of one viewer. On success `history` and `latest`
/// come from the same batch; on failure both are cleared, so stale data
/// is never shown next to an error.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    pub history: Vec<SensorReading>,
    pub latest: Option<SensorReading>,
    pub error: Option<String>,
    pub loading: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,

    // sequence number of the refresh that produced this state
    applied_seq: u64,
}

impl ViewerState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.last_fetched_at.is_some() {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }
}

/// Polls the readings endpoint and publishes batches on a watch
/// channel. A fetch is expected right after construction, so the
/// initial state already reports loading.
pub struct Viewer<F> {
    fetcher: F,
    session: Session,
    interval: Duration,
    state: watch::Sender<ViewerState>,
    issued: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<F: FetchReadings + 'static> Viewer<F> {
    pub fn new(fetcher: F, session: Session, interval: Duration) -> Arc<Self> {
        let initial = ViewerState {
            loading: true,
            ..ViewerState::default()
        };

        Arc::new(Self {
            fetcher,
            session,
            interval,
            state: watch::Sender::new(initial),
            issued: AtomicU64::new(0),
            timer: Mutex::new(None),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewerState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// One full fetch cycle: require a token, hit the backend, sort,
    /// publish. Every failure path clears the displayed data and
    /// records an error string instead.
    pub async fn refresh(&self, is_initial_load: bool) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        // Background ticks refresh silently; only the initial load and
        // manual refreshes surface the loading indicator.
        if is_initial_load || !self.auto_refresh_enabled() {
            self.state.send_modify(|state| {
                state.loading = true;
                state.error = None;
            });
        }

        let result = match self.session.token() {
            Some(token) => self.fetcher.fetch_batch(&token).await,
            None => Err(FetchError::MissingToken),
        };

        // 401 means the token is dead; signing out is the caller's cue
        // to send the user back to the login screen.
        if matches!(result, Err(FetchError::Unauthorized)) {
            self.session.clear();
        }

        self.apply(seq, result);
    }

    pub async fn manual_refresh(&self) {
        self.refresh(false).await;
    }

    /// Toggles the single recurring refresh task. Enabling twice keeps
    /// one timer; disabling aborts it before its next tick can fire.
    pub fn set_auto_refresh(self: &Arc<Self>, enabled: bool) {
        let mut timer = self.lock_timer();

        if !enabled {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
            return;
        }

        if timer.is_some() {
            return;
        }

        // The task only holds a Weak, so dropping the viewer tears the
        // timer down rather than keeping the viewer alive.
        let viewer = Arc::downgrade(self);
        let interval = self.interval;
        *timer = Some(tokio::spawn(async move {
            loop {
                sleep(interval).await;
                let Some(viewer) = Weak::upgrade(&viewer) else {
                    break;
                };
                viewer.refresh(false).await;
            }
        }));
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.lock_timer().is_some()
    }

    fn apply(&self, seq: u64, result: Result<Vec<SensorReading>, FetchError>) {
        self.state.send_if_modified(|state| {
            // An overlapping refresh issued after this one has already
            // published; its batch is newer, keep it.
            if seq <= state.applied_seq {
                return false;
            }
            state.applied_seq = seq;
            state.loading = false;

            match result {
                Ok(mut batch) => {
                    sort_readings(&mut batch);
                    state.latest = batch.first().cloned();
                    state.history = batch;
                    state.error = None;
                    state.last_fetched_at = Some(Utc::now());
                }
                Err(err) => {
                    state.history = Vec::new();
                    state.latest = None;
                    state.error = Some(err.to_string());
                }
            }

            true
        });
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F> Drop for Viewer<F> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
