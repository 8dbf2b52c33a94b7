//! BeatScheduler: timer-driven tick generation with accent tracking.
//!
//! The scheduler owns the [`SchedulerState`] behind a single lock and at most
//! one repeating timer task. Every change that affects timing goes through
//! [`BeatScheduler::reconfigure`], which cancels the current timer and arms a
//! new one while the lock is held.
//!
//! Cancellation is enforced with a generation counter: each timer task
//! carries the generation it was armed with and re-checks it under the lock
//! before every tick, so a timer that was aborted mid-flight can never tick
//! again.
//!
//! Cue playback is decoupled from the timer through a bounded queue drained
//! by a separate dispatch task. A tick never awaits its cue; if the queue is
//! full the cue is dropped with a warning.
//!
//! ```text
//! toggle_play / set_tempo / set_grouping
//!   └─> reconfigure() [lock held]
//!       ├─> abort old timer, bump generation
//!       └─> spawn run_timer(generation)
//!               └─> fire_tick(generation) [every 60000/bpm ms]
//!                   ├─> SchedulerState::advance()
//!                   ├─> cue queue ──> dispatch_cues() ──> AudioCues::play()
//!                   └─> beat broadcast ──> UI observers
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant as StdInstant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::AppConfig;
use crate::engine::backend::{AudioCues, TimeSource};
use crate::engine::events::{
    BeatEvent, SchedulerEvent, SchedulerEventKind, SchedulerSnapshot, SettingsPatch,
};
use crate::engine::state::{BeatKind, Grouping, PlayState, SchedulerState, Tempo};
use crate::error::{log_scheduler_error, SchedulerError};

/// Construction parameters for [`BeatScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub initial: SchedulerState,
    pub cue_queue_depth: usize,
    pub beat_capacity: usize,
    pub event_capacity: usize,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SchedulerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            initial: config.metronome.initial_state(),
            cue_queue_depth: config.cues.dispatch_queue_depth,
            beat_capacity: config.events.beat_capacity,
            event_capacity: config.events.scheduler_capacity,
        }
    }
}

struct Shared {
    state: SchedulerState,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    /// Last tick, or the start of playback before the first tick
    anchor: Option<Instant>,
    ticks: u64,
}

struct Inner {
    shared: Mutex<Shared>,
    cue_tx: mpsc::Sender<BeatKind>,
    beat_tx: broadcast::Sender<BeatEvent>,
    event_tx: broadcast::Sender<SchedulerEvent>,
    time_source: Arc<dyn TimeSource>,
    start_instant: StdInstant,
    active_timers: AtomicUsize,
}

/// Beat scheduler owning tempo, grouping, play state and beat index.
pub struct BeatScheduler {
    inner: Arc<Inner>,
    runtime: Handle,
}

impl BeatScheduler {
    /// Create a stopped scheduler whose timers run on `runtime`.
    ///
    /// The cue dispatch task is spawned immediately and holds `cues` until
    /// the scheduler is dropped.
    pub fn new(
        cues: Arc<dyn AudioCues>,
        runtime: Handle,
        options: SchedulerOptions,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let (cue_tx, cue_rx) = mpsc::channel(options.cue_queue_depth.max(1));
        let (beat_tx, _) = broadcast::channel(options.beat_capacity.max(1));
        let (event_tx, _) = broadcast::channel(options.event_capacity.max(1));

        let mut state = options.initial;
        state.play_state = PlayState::Stopped;

        let inner = Arc::new(Inner {
            shared: Mutex::new(Shared {
                state,
                generation: 0,
                timer: None,
                anchor: None,
                ticks: 0,
            }),
            cue_tx,
            beat_tx,
            event_tx,
            time_source,
            start_instant: StdInstant::now(),
            active_timers: AtomicUsize::new(0),
        });

        runtime.spawn(dispatch_cues(cue_rx, cues));

        tracing::info!(
            "[Scheduler] Created: tempo={} grouping={}",
            state.tempo.bpm(),
            state.grouping.beats()
        );

        Self { inner, runtime }
    }

    /// Create a scheduler on the runtime of the calling context.
    pub fn with_current_runtime(
        cues: Arc<dyn AudioCues>,
        options: SchedulerOptions,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, SchedulerError> {
        let runtime = Handle::try_current().map_err(|err| {
            let err = SchedulerError::RuntimeUnavailable {
                reason: err.to_string(),
            };
            log_scheduler_error(&err, "with_current_runtime");
            err
        })?;
        Ok(Self::new(cues, runtime, options, time_source))
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    /// Set the tempo, clamped to 40-240 BPM.
    ///
    /// Re-arms the timer if playing. The beat index is kept.
    pub fn set_tempo(&self, bpm: u32) -> Result<Tempo, SchedulerError> {
        let tempo = Tempo::new(bpm);
        if tempo.bpm() != bpm {
            log::debug!("[Scheduler] Tempo {} clamped to {}", bpm, tempo.bpm());
        }

        {
            let mut shared = self.lock_shared("set_tempo")?;
            if shared.state.tempo == tempo {
                return Ok(tempo);
            }
            shared.state.tempo = tempo;
            self.rearm(&mut shared);
        }

        tracing::info!("[Scheduler] Tempo set to {}", tempo);
        self.inner
            .emit(SchedulerEventKind::TempoChanged { bpm: tempo.bpm() }, None);
        Ok(tempo)
    }

    /// Set the grouping; must be one of 2, 3, 4, 6, 8.
    ///
    /// The beat index is not clamped: if it is beyond the new grouping, the
    /// next tick brings it back into range by modulo.
    pub fn set_grouping(&self, beats: u32) -> Result<Grouping, SchedulerError> {
        let grouping = Grouping::try_from(beats).map_err(|err| {
            log_scheduler_error(&err, "set_grouping");
            err
        })?;

        {
            let mut shared = self.lock_shared("set_grouping")?;
            if shared.state.grouping == grouping {
                return Ok(grouping);
            }
            shared.state.grouping = grouping;
            self.rearm(&mut shared);
        }

        tracing::info!("[Scheduler] Grouping set to {}", beats);
        self.inner
            .emit(SchedulerEventKind::GroupingChanged { beats }, None);
        Ok(grouping)
    }

    /// Apply tempo and grouping together with a single re-arm.
    ///
    /// The grouping is validated first, so an invalid patch changes nothing.
    pub fn apply_patch(&self, patch: &SettingsPatch) -> Result<SchedulerSnapshot, SchedulerError> {
        let grouping = patch
            .grouping
            .map(Grouping::try_from)
            .transpose()
            .map_err(|err| {
                log_scheduler_error(&err, "apply_patch");
                err
            })?;
        let tempo = patch.tempo.map(Tempo::new);

        let mut changes = Vec::new();
        let snapshot = {
            let mut shared = self.lock_shared("apply_patch")?;
            let current = shared.state;
            if let Some(tempo) = tempo.filter(|t| *t != current.tempo) {
                shared.state.tempo = tempo;
                changes.push(SchedulerEventKind::TempoChanged { bpm: tempo.bpm() });
            }
            if let Some(grouping) = grouping.filter(|g| *g != current.grouping) {
                shared.state.grouping = grouping;
                changes.push(SchedulerEventKind::GroupingChanged {
                    beats: grouping.beats(),
                });
            }
            if !changes.is_empty() {
                self.rearm(&mut shared);
            }
            SchedulerSnapshot::new(&shared.state, shared.ticks)
        };

        for kind in changes {
            self.inner.emit(kind, None);
        }
        Ok(snapshot)
    }

    /// Flip between stopped and playing.
    ///
    /// Starting arms a timer whose first tick lands one interval from now;
    /// stopping cancels it. The beat index is never reset.
    pub fn toggle_play(&self) -> Result<PlayState, SchedulerError> {
        let (play_state, state) = {
            let mut shared = self.lock_shared("toggle_play")?;
            let play_state = shared.state.toggle();
            self.rearm(&mut shared);
            (play_state, shared.state)
        };

        let kind = match play_state {
            PlayState::Playing => {
                tracing::info!(
                    "[Scheduler] Started at {} (grouping {})",
                    state.tempo,
                    state.grouping.beats()
                );
                SchedulerEventKind::Started {
                    tempo: state.tempo.bpm(),
                    grouping: state.grouping.beats(),
                }
            }
            PlayState::Stopped => {
                tracing::info!("[Scheduler] Stopped at beat {}", state.beat_index);
                SchedulerEventKind::Stopped {
                    beat_index: state.beat_index,
                }
            }
        };
        self.inner.emit(kind, None);
        Ok(play_state)
    }

    /// Cancel the current timer and arm a new one from the current state.
    ///
    /// Setters call this implicitly; it is public so bindings can force a
    /// resync (e.g. after the app returns from the background).
    pub fn reconfigure(&self) -> Result<(), SchedulerError> {
        let mut shared = self.lock_shared("reconfigure")?;
        self.rearm(&mut shared);
        Ok(())
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    pub fn snapshot(&self) -> Result<SchedulerSnapshot, SchedulerError> {
        let shared = self.lock_shared("snapshot")?;
        Ok(SchedulerSnapshot::new(&shared.state, shared.ticks))
    }

    pub fn subscribe_beats(&self) -> broadcast::Receiver<BeatEvent> {
        self.inner.beat_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Whether a timer handle is currently held (true exactly while playing).
    pub fn is_timer_armed(&self) -> Result<bool, SchedulerError> {
        let shared = self.lock_shared("is_timer_armed")?;
        Ok(shared.timer.is_some())
    }

    /// Number of timer tasks currently alive on the runtime.
    ///
    /// Aborted timers are only counted down once the runtime drops them.
    pub fn active_timer_count(&self) -> usize {
        self.inner.active_timers.load(Ordering::SeqCst)
    }

    // ========================================================================
    // PRIVATE HELPERS
    // ========================================================================

    fn lock_shared(&self, context: &str) -> Result<MutexGuard<'_, Shared>, SchedulerError> {
        self.inner.shared.lock().map_err(|_| {
            let err = SchedulerError::LockPoisoned {
                component: "scheduler_state".to_string(),
            };
            log_scheduler_error(&err, context);
            err
        })
    }

    /// Cancel and (if playing) re-arm the timer. Caller holds the lock.
    ///
    /// After a settings change the next tick lands one new interval after
    /// the anchor (previous tick, or start of playback), or immediately if
    /// that moment already passed.
    fn rearm(&self, shared: &mut Shared) {
        shared.generation = shared.generation.wrapping_add(1);
        if let Some(timer) = shared.timer.take() {
            timer.abort();
        }

        if !shared.state.play_state.is_playing() {
            shared.anchor = None;
            return;
        }

        let period = shared.state.tempo.interval();
        let now = Instant::now();
        let anchor = *shared.anchor.get_or_insert(now);
        let first = (anchor + period).max(now);

        log::debug!(
            "[Scheduler] Arming timer generation={} period={:?}",
            shared.generation,
            period
        );
        shared.timer = Some(self.runtime.spawn(run_timer(
            Arc::clone(&self.inner),
            shared.generation,
            first,
            period,
        )));
    }
}

impl Drop for BeatScheduler {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.inner.shared.lock() {
            shared.generation = shared.generation.wrapping_add(1);
            if let Some(timer) = shared.timer.take() {
                timer.abort();
            }
        }
    }
}

impl Inner {
    /// Advance one beat if `generation` is still current.
    ///
    /// Returns false when the timer has been superseded and must exit.
    fn fire_tick(&self, generation: u64) -> bool {
        let (event, kind) = {
            let mut shared = match self.shared.lock() {
                Ok(guard) => guard,
                Err(_) => {
                    log_scheduler_error(
                        &SchedulerError::LockPoisoned {
                            component: "scheduler_state".to_string(),
                        },
                        "fire_tick",
                    );
                    return false;
                }
            };

            if shared.generation != generation || !shared.state.play_state.is_playing() {
                return false;
            }

            let tick = shared.state.advance();
            shared.anchor = Some(Instant::now());
            shared.ticks += 1;

            let event = BeatEvent {
                sequence: shared.ticks,
                beat_index: tick.beat_index,
                kind: tick.kind,
                tempo: shared.state.tempo.bpm(),
                grouping: shared.state.grouping.beats(),
                timestamp_ms: self.timestamp_ms(),
            };
            (event, tick.kind)
        };

        self.dispatch_cue(kind);
        let _ = self.beat_tx.send(event);
        true
    }

    fn dispatch_cue(&self, kind: BeatKind) {
        match self.cue_tx.try_send(kind) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("[CueDispatch] Cue queue full, dropping {:?} cue", kind);
                self.emit(
                    SchedulerEventKind::Warning,
                    Some(format!("cue queue full, dropped {:?} cue", kind)),
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("[CueDispatch] Cue dispatcher gone, {:?} cue not played", kind);
            }
        }
    }

    fn timestamp_ms(&self) -> u64 {
        self.time_source
            .now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64
    }

    fn emit(&self, kind: SchedulerEventKind, detail: Option<String>) {
        let _ = self.event_tx.send(SchedulerEvent {
            timestamp_ms: self.timestamp_ms(),
            kind,
            detail,
        });
    }
}

/// Counts a timer task as alive for as long as its future exists.
struct ActiveTimer(Arc<Inner>);

impl ActiveTimer {
    fn new(inner: Arc<Inner>) -> Self {
        inner.active_timers.fetch_add(1, Ordering::SeqCst);
        Self(inner)
    }
}

impl Drop for ActiveTimer {
    fn drop(&mut self) {
        self.0.active_timers.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_timer(inner: Arc<Inner>, generation: u64, first: Instant, period: Duration) {
    let timer = ActiveTimer::new(inner);
    let mut ticker = time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !timer.0.fire_tick(generation) {
            break;
        }
    }
}

async fn dispatch_cues(mut cue_rx: mpsc::Receiver<BeatKind>, cues: Arc<dyn AudioCues>) {
    while let Some(kind) = cue_rx.recv().await {
        cues.play(kind);
    }
    log::debug!("[CueDispatch] Cue channel closed, releasing cues");
}
