//! Player orchestration
//!
//! [`PlayerOrchestrator`] composes the navigator, both backends, volume
//! persistence and the swipe recognizer into the single object the UI talks
//! to. It is driven entirely from outside:
//!
//! - UI commands (`toggle_play_pause`, `next`, `set_volume`, ...)
//! - platform notifications via [`PlayerOrchestrator::handle_backend_event`]
//! - the clock via [`PlayerOrchestrator::advance`]
//!
//! After each call the host drains [`PlayerEvent`]s and re-renders.
//!
//! Delayed work (widget initialization checks, resume-after-change, autoplay,
//! time sync) is queued on an internal [`Scheduler`]. Every per-track task
//! carries the epoch of the track it was scheduled for; a track change bumps
//! the epoch and drops the previous track's tasks, and any task that still
//! fires with an old epoch is ignored.

use crate::backend::{
    BackendEvent, Backends, Binding, Bound, EmbeddedVideoBackend, NativeAudioBackend,
    PlaybackBackend,
};
use crate::error::Result;
use crate::events::PlayerEvent;
use crate::gesture::{GestureEnd, GestureRecognizer, MoveResponse, SwipeVisual, TouchRegion};
use crate::navigator::{TrackNavigator, Transition};
use crate::platform::Platform;
use crate::poll::{BoundedPoll, PollOutcome, Probe};
use crate::scheduler::Scheduler;
use crate::types::{PlaybackState, PlayerConfig, PlayerState, ResourceId};
use crate::volume::{Volume, VolumePersistence};
use encore_core::{DurationCache, MediaKind, Playlist, Track};
use std::time::Duration;
use url::Url;

const TIME_EPSILON: f64 = 1e-3;

#[derive(Debug)]
enum Task {
    BackendInit { epoch: u64 },
    ResumeAfterChange { epoch: u64, poll: BoundedPoll },
    Autoplay { epoch: u64 },
    TimeSync,
}

impl Task {
    fn epoch(&self) -> Option<u64> {
        match self {
            Self::BackendInit { epoch }
            | Self::ResumeAfterChange { epoch, .. }
            | Self::Autoplay { epoch } => Some(*epoch),
            Self::TimeSync => None,
        }
    }
}

/// The UI-facing player
pub struct PlayerOrchestrator {
    config: PlayerConfig,
    playlist: Playlist,
    origin: Option<Url>,
    navigator: TrackNavigator,
    backends: Backends,
    volume: VolumePersistence,
    gesture: GestureRecognizer,
    scheduler: Scheduler<Task>,
    durations: DurationCache,

    state: PlaybackState,
    current_time: f64,
    duration: Option<f64>,
    user_paused: bool,
    autoplay: bool,
    autoplay_triggered: bool,
    visible: bool,
    mounted: bool,

    epoch: u64,
    resource: Option<ResourceId>,
    next_resource: u64,

    pending_events: Vec<PlayerEvent>,
}

impl PlayerOrchestrator {
    /// Create a player for a playlist
    ///
    /// Nothing touches the platform until [`mount`](Self::mount).
    pub fn new(playlist: Playlist, platform: Platform, config: PlayerConfig) -> Self {
        let Platform {
            audio,
            embed,
            scripts,
            store,
            origin,
        } = platform;

        let mut widget = config.widget.clone();
        if widget.origin.is_none() {
            widget.origin = origin.as_ref().map(|o| o.origin().ascii_serialization());
        }

        let backends = Backends::new(
            NativeAudioBackend::new(audio, origin.clone()),
            EmbeddedVideoBackend::new(embed, scripts, widget, &config),
        );
        let volume =
            VolumePersistence::new(store, config.volume_key.clone(), config.volume_max_age());

        Self {
            navigator: TrackNavigator::new(playlist.len()),
            gesture: GestureRecognizer::new(config.gesture.clone()),
            autoplay: config.autoplay,
            config,
            playlist,
            origin,
            backends,
            volume,
            scheduler: Scheduler::new(),
            durations: DurationCache::new(),
            state: PlaybackState::Idle,
            current_time: 0.0,
            duration: None,
            user_paused: false,
            autoplay_triggered: false,
            visible: false,
            mounted: false,
            epoch: 0,
            resource: None,
            next_resource: 0,
            pending_events: Vec::new(),
        }
    }

    // ===== Lifecycle =====

    /// Start the player: load the persisted volume and bind the first track
    pub fn mount(&mut self, now: Duration) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.scheduler.set_now(now);

        let volume = self.volume.load();
        self.pending_events.push(PlayerEvent::VolumeChanged { volume });

        let Some(track) = self.current_track().cloned() else {
            tracing::info!("Playlist is empty, player stays hidden");
            return;
        };
        tracing::info!("Mounting player with {} tracks", self.playlist.len());

        if let Err(e) = self.bind_track(&track, false) {
            tracing::warn!("Could not prepare track {}: {}", track.id, e);
        }
        self.emit_track_changed(None);
        self.scheduler
            .schedule_in(self.config.time_sync_interval(), Task::TimeSync);
        self.maybe_schedule_autoplay();
    }

    /// Tear everything down: cancel tasks and release every platform resource
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        tracing::info!("Unmounting player");
        self.mounted = false;
        self.epoch += 1;
        self.scheduler.clear();
        self.backends.release_all();
        self.navigator.clear_resume();
        self.gesture.cancel();
        self.resource = None;
        self.set_state(PlaybackState::Idle);
    }

    /// Whether [`mount`](Self::mount) has run without a matching unmount
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // ===== Playback Control =====

    /// Play if paused, pause if playing
    pub fn toggle_play_pause(&mut self) {
        if !self.controls_enabled() || !self.mounted {
            return;
        }
        if self.state.wants_playing() {
            self.pause_internal(true);
        } else {
            self.user_paused = false;
            self.request_play();
        }
    }

    /// Jump to a fraction of the current track's duration
    ///
    /// Ignored while the duration is unknown.
    pub fn seek_fraction(&mut self, fraction: f64) {
        if !self.controls_enabled() || !fraction.is_finite() {
            return;
        }
        let Some(duration) = self.duration else {
            tracing::debug!("Ignoring seek, duration unknown");
            return;
        };
        let target = fraction.clamp(0.0, 1.0) * duration;
        if let Some(backend) = self.backends.active_mut() {
            backend.seek(target);
        }
        self.current_time = target;
        self.emit_position();
    }

    /// Set and persist the volume
    ///
    /// Applied immediately if the active backend is ready, otherwise once it
    /// becomes ready.
    pub fn set_volume(&mut self, fraction: f64) {
        let volume = self.volume.set(Volume::new(fraction));
        if let Some(backend) = self.backends.active_mut() {
            backend.set_volume(volume);
        }
        self.pending_events.push(PlayerEvent::VolumeChanged { volume });
    }

    /// Go to the next track, wrapping around
    pub fn next(&mut self) {
        if let Some(transition) = self.navigator.next(self.state.wants_playing()) {
            self.change_track(transition);
        }
    }

    /// Go to the previous track, wrapping around
    pub fn previous(&mut self) {
        if let Some(transition) = self.navigator.previous(self.state.wants_playing()) {
            self.change_track(transition);
        }
    }

    /// Jump to a track by index; out-of-range indices are ignored
    pub fn select_track(&mut self, index: usize) {
        if let Some(transition) = self.navigator.select(index, self.state.wants_playing()) {
            self.change_track(transition);
        }
    }

    /// Follow an externally supplied current-track pointer
    ///
    /// The track is located by id, then by URL. Unknown tracks and the
    /// track already current are ignored.
    pub fn sync_external_track(&mut self, track: &Track) {
        let Some(index) = self.playlist.position_of(track, self.origin.as_ref()) else {
            tracing::debug!("External track {} is not in the playlist", track.id);
            return;
        };
        if Some(index) == self.navigator.current() {
            return;
        }
        self.select_track(index);
    }

    /// Enable or disable autoplay
    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
        if enabled {
            self.maybe_schedule_autoplay();
        } else {
            self.scheduler
                .retain(|task| !matches!(task, Task::Autoplay { .. }));
        }
    }

    // ===== Visibility =====

    /// Show or hide the panel without affecting playback
    pub fn toggle_close(&mut self) {
        self.set_visible(!self.visible);
    }

    /// Show or hide the panel without affecting playback
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.gesture.cancel();
        self.pending_events
            .push(PlayerEvent::VisibilityChanged { visible });
    }

    /// Whether the panel is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // ===== Gestures =====

    /// Touch started
    pub fn touch_start(&mut self, region: TouchRegion, x: f64, y: f64) -> bool {
        self.visible && self.gesture.begin(region, x, y)
    }

    /// Touch moved; the response says whether to suppress scrolling
    pub fn touch_move(&mut self, x: f64, y: f64, now: Duration) -> MoveResponse {
        let response = self.gesture.update(x, y, now);
        if response.offset_changed {
            self.pending_events.push(PlayerEvent::SwipeChanged {
                offset: self.gesture.offset(),
            });
        }
        response
    }

    /// Touch released; closes the panel when dragged far enough
    pub fn touch_end(&mut self) -> GestureEnd {
        let end = self.gesture.end();
        match end {
            GestureEnd::Close => {
                self.pending_events
                    .push(PlayerEvent::SwipeChanged { offset: 0.0 });
                self.set_visible(false);
            }
            GestureEnd::SnapBack => self
                .pending_events
                .push(PlayerEvent::SwipeChanged { offset: 0.0 }),
            GestureEnd::Inactive => {}
        }
        end
    }

    /// How the panel should be drawn for the current drag
    pub fn swipe_visual(&self) -> SwipeVisual {
        self.gesture.visual()
    }

    /// Viewport width changed; gestures are enabled on narrow viewports only
    pub fn set_viewport_width(&mut self, width: f64) {
        self.gesture.set_viewport_width(width);
    }

    // ===== Host Drivers =====

    /// Advance the clock and run every task that became due
    pub fn advance(&mut self, now: Duration) {
        self.scheduler.set_now(now);
        while let Some(task) = self.scheduler.pop_due() {
            self.run_task(task);
        }
    }

    /// When the next task is due, for hosts that sleep between ticks
    pub fn next_wakeup(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Handle a notification from a platform resource
    ///
    /// Notifications from resources that are no longer bound are dropped.
    pub fn handle_backend_event(&mut self, resource: ResourceId, event: BackendEvent) {
        if self.resource != Some(resource) {
            tracing::debug!("Dropping {:?} from stale resource {}", event, resource);
            return;
        }

        match event {
            BackendEvent::Ready { duration } => {
                tracing::debug!("Resource {} ready", resource);
                if let Some(duration) = duration {
                    self.update_duration(duration);
                }
                let intent = self
                    .backends
                    .active_mut()
                    .and_then(|backend| backend.on_ready());
                if self.navigator.should_resume() {
                    self.finish_resume();
                } else {
                    match intent {
                        Some(true) => self.request_play(),
                        Some(false) => {
                            if let Some(backend) = self.backends.active_mut() {
                                backend.pause();
                            }
                        }
                        None => {}
                    }
                }
                self.maybe_schedule_autoplay();
            }
            BackendEvent::DurationChanged(duration) => self.update_duration(duration),
            BackendEvent::PlayingChanged(true) => self.set_state(PlaybackState::Playing),
            BackendEvent::PlayingChanged(false) => {
                if self.state == PlaybackState::Playing {
                    self.set_state(PlaybackState::Paused);
                }
            }
            BackendEvent::Ended => self.on_track_ended(),
            BackendEvent::Error(message) => {
                tracing::error!("Playback resource {} failed: {}", resource, message);
                if self.state == PlaybackState::Loading {
                    self.navigator.clear_resume();
                    self.set_state(PlaybackState::Paused);
                }
                self.pending_events.push(PlayerEvent::Error { message });
            }
        }
    }

    // ===== State Queries =====

    /// Snapshot of everything the UI renders
    pub fn state(&self) -> PlayerState {
        PlayerState {
            current_index: self.navigator.current(),
            is_playing: self.is_playing(),
            playback: self.state,
            current_time: self.current_time,
            duration: self.duration,
            volume: self.volume.current(),
            backend_kind: self.backends.active_kind(),
            should_resume_after_change: self.navigator.should_resume(),
            user_paused: self.user_paused,
            visible: self.visible,
        }
    }

    /// Fine-grained playback state
    pub fn playback_state(&self) -> PlaybackState {
        self.state
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// The playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Index of the current track
    pub fn current_index(&self) -> Option<usize> {
        self.navigator.current()
    }

    /// The current track
    pub fn current_track(&self) -> Option<&Track> {
        self.navigator.current().and_then(|i| self.playlist.get(i))
    }

    /// Duration to display for a playlist entry
    pub fn track_duration(&self, index: usize) -> Option<f64> {
        self.playlist
            .get(index)
            .and_then(|track| self.durations.display_duration(track))
    }

    /// Kind of the backend bound to the current track
    pub fn backend_kind(&self) -> Option<MediaKind> {
        self.backends.active_kind()
    }

    /// Number of platform resources currently alive
    pub fn live_resources(&self) -> usize {
        self.backends.live_resources()
    }

    /// Whether transport controls do anything
    pub fn controls_enabled(&self) -> bool {
        !self.playlist.is_empty()
    }

    /// Whether next/previous do anything
    pub fn can_navigate(&self) -> bool {
        self.navigator.can_navigate()
    }

    /// The widget renders nothing for an empty playlist
    pub fn is_hidden(&self) -> bool {
        self.playlist.is_empty()
    }

    /// Get all pending events and clear the queue
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    fn allocate_resource(&mut self) -> ResourceId {
        self.next_resource += 1;
        ResourceId::new(self.next_resource)
    }

    fn bind_track(&mut self, track: &Track, continue_playing: bool) -> Result<Bound> {
        let candidate = self.allocate_resource();
        let bound = match self.backends.bind(candidate, track, continue_playing) {
            Ok(bound) => bound,
            Err(e) => {
                self.resource = None;
                return Err(e);
            }
        };
        self.resource = Some(bound.resource);

        if let Binding::Pending { retry_in } = bound.binding {
            self.scheduler
                .schedule_in(retry_in, Task::BackendInit { epoch: self.epoch });
        }

        let volume = self.volume.current();
        if let Some(backend) = self.backends.active_mut() {
            backend.set_volume(volume);
        }
        Ok(bound)
    }

    fn change_track(&mut self, transition: Transition) {
        self.epoch += 1;
        self.scheduler.retain(|task| task.epoch().is_none());

        self.current_time = 0.0;
        self.duration = None;
        self.user_paused = false;
        self.autoplay_triggered = false;

        let previous_id = self.playlist.get(transition.from).map(|t| t.id);
        let Some(track) = self.playlist.get(transition.to).cloned() else {
            return;
        };
        tracing::debug!(
            "Track {} -> {} (resume: {})",
            transition.from,
            transition.to,
            transition.resume
        );
        self.emit_track_changed(previous_id);

        if !self.mounted {
            self.emit_position();
            return;
        }

        match self.bind_track(&track, transition.resume) {
            Ok(bound) if bound.binding == Binding::Reused && self.active_ready() => {
                self.navigator.clear_resume();
                if let Some(backend) = self.backends.active_mut() {
                    backend.seek(0.0);
                }
                if let Some(duration) = self.backends.active().and_then(|b| b.duration()) {
                    self.set_duration(duration);
                }
                if transition.resume && !self.is_playing() {
                    self.request_play();
                }
            }
            Ok(_) => {
                if transition.resume {
                    self.set_state(PlaybackState::Loading);
                    let poll = BoundedPoll::new(
                        self.config.resume_retry_interval(),
                        self.config.resume_max_attempts,
                    );
                    self.scheduler.schedule_in(
                        self.config.resume_retry_interval(),
                        Task::ResumeAfterChange {
                            epoch: self.epoch,
                            poll,
                        },
                    );
                } else {
                    self.set_state(PlaybackState::Idle);
                }
            }
            Err(e) => {
                tracing::warn!("Could not prepare track {}: {}", track.id, e);
                self.navigator.clear_resume();
                self.set_state(PlaybackState::Idle);
            }
        }

        self.emit_position();
        self.maybe_schedule_autoplay();
    }

    fn run_task(&mut self, task: Task) {
        if let Some(epoch) = task.epoch() {
            if epoch != self.epoch {
                tracing::debug!("Skipping stale task {:?}", task);
                return;
            }
        }

        match task {
            Task::TimeSync => {
                self.sync_time();
                if self.mounted {
                    self.scheduler
                        .schedule_in(self.config.time_sync_interval(), Task::TimeSync);
                }
            }
            Task::BackendInit { epoch } => {
                let retry = self
                    .backends
                    .active_mut()
                    .and_then(|backend| backend.poll_init());
                if let Some(delay) = retry {
                    self.scheduler
                        .schedule_in(delay, Task::BackendInit { epoch });
                }
            }
            Task::ResumeAfterChange { epoch, mut poll } => {
                if !self.navigator.should_resume() {
                    return;
                }
                let probe = if self.active_ready() {
                    Probe::Ready
                } else {
                    Probe::NotYet
                };
                match poll.attempt(probe) {
                    PollOutcome::Ready => self.finish_resume(),
                    PollOutcome::RetryIn(delay) => {
                        self.scheduler
                            .schedule_in(delay, Task::ResumeAfterChange { epoch, poll });
                    }
                    PollOutcome::Exhausted | PollOutcome::Abandoned => {
                        tracing::warn!(
                            "Backend not ready after {} checks, not resuming",
                            poll.attempts()
                        );
                        self.navigator.clear_resume();
                        self.set_state(PlaybackState::Paused);
                    }
                }
            }
            Task::Autoplay { .. } => {
                if self.autoplay
                    && !self.user_paused
                    && !self.autoplay_triggered
                    && !self.state.wants_playing()
                {
                    tracing::info!("Autoplay starting");
                    self.autoplay_triggered = true;
                    self.request_play();
                }
            }
        }
    }

    fn active_ready(&self) -> bool {
        self.backends.active().is_some_and(|b| b.is_ready())
    }

    fn request_play(&mut self) {
        let Some(backend) = self.backends.active_mut() else {
            return;
        };
        if !backend.is_ready() {
            // Deferred until the backend reports ready
            if let Err(e) = backend.play() {
                tracing::warn!("{}", e);
            }
            self.set_state(PlaybackState::Loading);
            return;
        }
        match backend.play() {
            Ok(()) => self.set_state(PlaybackState::Playing),
            Err(e) => {
                tracing::warn!("{}", e);
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    fn pause_internal(&mut self, by_user: bool) {
        if let Some(backend) = self.backends.active_mut() {
            backend.pause();
        }
        self.navigator.clear_resume();
        self.scheduler
            .retain(|task| !matches!(task, Task::ResumeAfterChange { .. }));
        if by_user {
            self.user_paused = true;
        }
        self.set_state(PlaybackState::Paused);
    }

    fn finish_resume(&mut self) {
        self.navigator.clear_resume();
        self.scheduler
            .retain(|task| !matches!(task, Task::ResumeAfterChange { .. }));
        self.request_play();
    }

    fn on_track_ended(&mut self) {
        tracing::debug!("Track ended");
        self.set_state(PlaybackState::Ended);
        if let Some(transition) = self.navigator.next(true) {
            self.change_track(transition);
            return;
        }

        // Single track: start over
        if let Some(backend) = self.backends.active_mut() {
            backend.seek(0.0);
        }
        self.current_time = 0.0;
        self.emit_position();
        self.request_play();
    }

    fn maybe_schedule_autoplay(&mut self) {
        let eligible = self.mounted
            && self.autoplay
            && self.controls_enabled()
            && !self.user_paused
            && !self.autoplay_triggered
            && !self.state.wants_playing();
        if !eligible || self.scheduler.contains(|t| matches!(t, Task::Autoplay { .. })) {
            return;
        }
        self.scheduler.schedule_in(
            self.config.autoplay_settle(),
            Task::Autoplay { epoch: self.epoch },
        );
    }

    fn sync_time(&mut self) {
        let Some(backend) = self.backends.active() else {
            return;
        };
        if !backend.is_ready() {
            return;
        }
        let time = backend.current_time();
        let duration = backend.duration();

        let mut changed = false;
        if let Some(duration) = duration {
            changed |= self.set_duration(duration);
        }
        if (time - self.current_time).abs() > TIME_EPSILON {
            self.current_time = time;
            changed = true;
        }
        if changed {
            self.emit_position();
        }
    }

    fn update_duration(&mut self, duration: f64) {
        if self.set_duration(duration) {
            self.emit_position();
        }
    }

    fn set_duration(&mut self, duration: f64) -> bool {
        if !duration.is_finite() || duration <= 0.0 {
            return false;
        }
        if let Some(track) = self.current_track() {
            let id = track.id;
            self.durations.record(id, duration);
        }
        let changed = self
            .duration
            .map_or(true, |d| (d - duration).abs() > TIME_EPSILON);
        self.duration = Some(duration);
        changed
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            tracing::trace!("Playback state {:?} -> {:?}", self.state, state);
            self.state = state;
            self.pending_events.push(PlayerEvent::StateChanged { state });
        }
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlayerEvent::PositionUpdate {
            current_time: self.current_time,
            duration: self.duration,
        });
    }

    fn emit_track_changed(&mut self, previous_track_id: Option<encore_core::TrackId>) {
        if let (Some(index), Some(track)) = (self.navigator.current(), self.current_track()) {
            let track_id = track.id;
            self.pending_events.push(PlayerEvent::TrackChanged {
                index,
                track_id,
                previous_track_id,
            });
        }
    }
}

impl std::fmt::Debug for PlayerOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerOrchestrator")
            .field("current_index", &self.navigator.current())
            .field("state", &self.state)
            .field("resource", &self.resource)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptRegistry;
    use crate::fakes::{FakeAudio, FakeEmbed};
    use crate::platform::ReadyState;
    use crate::volume::MemoryVolumeStore;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn player(tracks: Vec<Track>, store: MemoryVolumeStore) -> (PlayerOrchestrator, FakeAudio) {
        let audio = FakeAudio::default();
        let embed = FakeEmbed::default();
        let platform = Platform::new(
            Box::new(audio.host()),
            Box::new(embed.host()),
            Box::new(store),
        )
        .with_scripts(Rc::new(ScriptRegistry::new("api.js")));
        let player = PlayerOrchestrator::new(Playlist::new(tracks), platform, PlayerConfig::default());
        (player, audio)
    }

    fn three() -> Vec<Track> {
        vec![
            Track::new(1, "A", "/a.mp3"),
            Track::new(2, "B", "/b.mp3"),
            Track::new(3, "C", "/c.mp3"),
        ]
    }

    #[test]
    fn mount_loads_persisted_volume() {
        let store = MemoryVolumeStore::new().with_value("musicPlayerVolume", "0.3");
        let (mut player, audio) = player(three(), store);
        player.mount(ms(0));

        assert_eq!(player.state().volume, Volume::new(0.3));
        assert_eq!(player.backend_kind(), Some(MediaKind::Native));
        assert_eq!(audio.created(), 1);

        let events = player.drain_events();
        assert!(events.contains(&PlayerEvent::VolumeChanged {
            volume: Volume::new(0.3)
        }));
        assert!(!player.has_pending_events());
    }

    #[test]
    fn empty_playlist_is_inert() {
        let (mut player, audio) = player(Vec::new(), MemoryVolumeStore::new());
        player.mount(ms(0));
        player.toggle_play_pause();
        player.next();

        assert!(player.is_hidden());
        assert!(!player.controls_enabled());
        assert_eq!(player.state().current_index, None);
        assert_eq!(audio.created(), 0);
    }

    #[test]
    fn stale_resource_events_are_dropped() {
        let (mut player, audio) = player(three(), MemoryVolumeStore::new());
        player.mount(ms(0));
        let first = audio.last().borrow().resource;

        player.next();
        player.handle_backend_event(first, BackendEvent::Ended);
        player.handle_backend_event(first, BackendEvent::PlayingChanged(true));

        assert_eq!(player.current_index(), Some(1));
        assert!(!player.is_playing());
    }

    #[test]
    fn visibility_does_not_touch_playback() {
        let (mut player, audio) = player(three(), MemoryVolumeStore::new());
        player.mount(ms(0));
        let resource = audio.last().borrow().resource;
        audio.last().borrow_mut().ready = ReadyState::EnoughData;
        player.handle_backend_event(resource, BackendEvent::Ready { duration: Some(60.0) });
        player.toggle_play_pause();
        assert!(player.is_playing());

        player.toggle_close();
        assert!(player.is_visible());
        player.toggle_close();
        assert!(!player.is_visible());

        assert!(player.is_playing());
        assert!(!audio.last().borrow().released);
        assert_eq!(player.live_resources(), 1);
    }

    #[test]
    fn time_sync_republishes_position() {
        let (mut player, audio) = player(three(), MemoryVolumeStore::new());
        player.mount(ms(0));
        let resource = audio.last().borrow().resource;
        player.handle_backend_event(resource, BackendEvent::Ready { duration: None });
        {
            let element = audio.last();
            let mut element = element.borrow_mut();
            element.time = 12.5;
            element.duration = 200.0;
        }

        player.advance(ms(100));
        let state = player.state();
        assert_eq!(state.current_time, 12.5);
        assert_eq!(state.duration, Some(200.0));
        assert_eq!(player.track_duration(0), Some(200.0));
        assert_eq!(player.next_wakeup(), Some(ms(200)));
    }

    #[test]
    fn seek_needs_known_duration() {
        let (mut player, audio) = player(three(), MemoryVolumeStore::new());
        player.mount(ms(0));
        player.seek_fraction(0.5);
        assert_eq!(player.state().current_time, 0.0);

        let resource = audio.last().borrow().resource;
        player.handle_backend_event(resource, BackendEvent::Ready { duration: Some(100.0) });
        player.seek_fraction(0.25);
        assert_eq!(player.state().current_time, 25.0);
        assert_eq!(audio.last().borrow().time, 25.0);

        player.seek_fraction(4.0);
        assert_eq!(player.state().current_time, 100.0);
    }

    #[test]
    fn unmount_releases_everything() {
        let (mut player, audio) = player(three(), MemoryVolumeStore::new());
        player.mount(ms(0));
        player.unmount();

        assert_eq!(audio.live(), 0);
        assert_eq!(player.live_resources(), 0);
        assert!(!player.is_mounted());
        assert_eq!(player.next_wakeup(), None);
    }
}
