//! Embedded video backend
//!
//! Plays hosted videos through the third-party widget, kept hidden so only
//! the audio is heard. Creating the widget needs two things that arrive
//! asynchronously: the widget API script and the attachment point. Both are
//! awaited with bounded polls driven by [`PlaybackBackend::poll_init`].
//!
//! Once a widget exists it is retargeted for later tracks instead of being
//! recreated.

use super::script::{ScriptRegistry, ScriptStatus};
use super::{Binding, Bound, DeferredCommands, PlaybackBackend};
use crate::error::{PlaybackError, Result};
use crate::platform::{EmbedHost, EmbedWidget};
use crate::poll::{BoundedPoll, PollOutcome, Probe};
use crate::types::{PlayerConfig, ResourceId, WidgetOptions};
use crate::volume::Volume;
use encore_core::{embedded_video_id, MediaKind, Track};
use std::rc::Rc;
use std::time::Duration;

/// Id of the hidden attachment point
pub const CONTAINER_ID: &str = "music-player-youtube";

#[derive(Debug)]
enum InitPhase {
    AwaitScript(BoundedPoll),
    AwaitContainer(BoundedPoll),
}

#[derive(Debug, Clone)]
struct InitTimings {
    delay: Duration,
    interval: Duration,
    script_attempts: u32,
    container_attempts: u32,
}

/// Backend for videos on the hosting platform
pub struct EmbeddedVideoBackend {
    host: Box<dyn EmbedHost>,
    scripts: Rc<ScriptRegistry>,
    options: WidgetOptions,
    timings: InitTimings,
    container_id: String,
    container_requested: bool,
    container_seen: bool,
    widget: Option<Box<dyn EmbedWidget>>,
    resource: Option<ResourceId>,
    video_id: Option<String>,
    pending_video: Option<(String, bool)>,
    init: Option<InitPhase>,
    ready: bool,
    deferred: DeferredCommands,
}

impl EmbeddedVideoBackend {
    /// Backend creating widgets through `host`
    pub fn new(
        host: Box<dyn EmbedHost>,
        scripts: Rc<ScriptRegistry>,
        options: WidgetOptions,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            host,
            scripts,
            options,
            timings: InitTimings {
                delay: config.init_delay(),
                interval: config.embed_retry_interval(),
                script_attempts: config.script_max_attempts,
                container_attempts: config.embed_max_attempts,
            },
            container_id: CONTAINER_ID.to_string(),
            container_requested: false,
            container_seen: false,
            widget: None,
            resource: None,
            video_id: None,
            pending_video: None,
            init: None,
            ready: false,
            deferred: DeferredCommands::default(),
        }
    }

    /// Video id of the bound track
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Whether a widget is being initialized
    pub fn is_initializing(&self) -> bool {
        self.init.is_some()
    }

    fn container_probe(&mut self) -> Probe {
        if self.host.container_attached(&self.container_id) {
            self.container_seen = true;
            Probe::Ready
        } else if self.container_seen {
            Probe::Gone
        } else {
            Probe::NotYet
        }
    }

    fn create_widget(&mut self) {
        let (Some(resource), Some(video_id)) = (self.resource, self.video_id.clone()) else {
            return;
        };
        match self
            .host
            .create_widget(resource, &self.container_id, &video_id, &self.options)
        {
            Ok(widget) => {
                tracing::info!("Embedded player created for video {}", video_id);
                self.widget = Some(widget);
            }
            Err(e) => tracing::error!("Failed to create embedded player: {}", e),
        }
    }

    fn retarget(widget: &mut dyn EmbedWidget, video_id: &str, continue_playing: bool) {
        let result = if continue_playing {
            widget.load_video_by_id(video_id)
        } else {
            widget.cue_video_by_id(video_id)
        };
        if let Err(e) = result {
            tracing::warn!("Failed to switch embedded video to {}: {}", video_id, e);
        }
    }

    fn ready_widget(&mut self) -> Option<&mut Box<dyn EmbedWidget>> {
        if self.ready {
            self.widget.as_mut()
        } else {
            None
        }
    }

    fn log_widget_error(action: &str, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!("Embedded player {} failed: {}", action, e);
        }
    }
}

impl PlaybackBackend for EmbeddedVideoBackend {
    fn kind(&self) -> MediaKind {
        MediaKind::Embedded
    }

    fn prepare(
        &mut self,
        resource: ResourceId,
        track: &Track,
        continue_playing: bool,
    ) -> Result<Bound> {
        let video_id = embedded_video_id(&track.url)
            .ok_or_else(|| PlaybackError::UnsupportedUrl(track.url.clone()))?;

        if let (Some(widget), Some(current)) = (self.widget.as_mut(), self.resource) {
            if self.video_id.as_deref() == Some(video_id.as_str()) {
                return Ok(Bound {
                    resource: current,
                    binding: Binding::Reused,
                });
            }
            if self.ready {
                tracing::debug!("Retargeting embedded player to {}", video_id);
                Self::retarget(widget.as_mut(), &video_id, continue_playing);
            } else {
                // The widget exposes no methods until it reports ready
                tracing::debug!("Embedded player not ready, deferring switch to {}", video_id);
                self.pending_video = Some((video_id.clone(), continue_playing));
            }
            self.video_id = Some(video_id);
            self.deferred.retarget();
            return Ok(Bound {
                resource: current,
                binding: Binding::Retargeted,
            });
        }

        // No widget yet: (re)start initialization for the latest track
        if let Err(e) = self.host.ensure_container(&self.container_id) {
            tracing::warn!("Embedded player attachment point unavailable: {}", e);
            return Err(PlaybackError::ResourceUnavailable(e.to_string()));
        }
        self.container_requested = true;
        self.scripts.ensure_loaded(self.host.as_mut());

        self.resource = Some(resource);
        self.video_id = Some(video_id);
        self.pending_video = None;
        self.ready = false;
        self.deferred.retarget();
        self.init = Some(InitPhase::AwaitScript(BoundedPoll::new(
            self.timings.interval,
            self.timings.script_attempts,
        )));

        Ok(Bound {
            resource,
            binding: Binding::Pending {
                retry_in: self.timings.delay,
            },
        })
    }

    fn poll_init(&mut self) -> Option<Duration> {
        loop {
            match self.init.take()? {
                InitPhase::AwaitScript(mut poll) => {
                    if self.host.container_attached(&self.container_id) {
                        self.container_seen = true;
                    } else if self.container_seen {
                        tracing::debug!("Attachment point removed while waiting for script");
                        return None;
                    }
                    let probe = match self.scripts.status() {
                        ScriptStatus::Ready => Probe::Ready,
                        ScriptStatus::Failed => Probe::Gone,
                        ScriptStatus::Absent | ScriptStatus::Loading => {
                            if self.host.script_present() {
                                self.scripts.mark_ready();
                                Probe::Ready
                            } else {
                                Probe::NotYet
                            }
                        }
                    };
                    match poll.attempt(probe) {
                        PollOutcome::Ready => {
                            self.init = Some(InitPhase::AwaitContainer(BoundedPoll::new(
                                self.timings.interval,
                                self.timings.container_attempts,
                            )));
                        }
                        PollOutcome::RetryIn(delay) => {
                            self.init = Some(InitPhase::AwaitScript(poll));
                            return Some(delay);
                        }
                        PollOutcome::Exhausted => {
                            tracing::warn!(
                                "Embedded player script not ready after {} checks",
                                poll.attempts()
                            );
                            return None;
                        }
                        PollOutcome::Abandoned => {
                            tracing::warn!("Embedded player script failed to load");
                            return None;
                        }
                    }
                }
                InitPhase::AwaitContainer(mut poll) => {
                    let probe = self.container_probe();
                    return match poll.attempt(probe) {
                        PollOutcome::Ready => {
                            self.create_widget();
                            None
                        }
                        PollOutcome::RetryIn(delay) => {
                            self.init = Some(InitPhase::AwaitContainer(poll));
                            Some(delay)
                        }
                        PollOutcome::Exhausted => {
                            tracing::warn!(
                                "Embedded player attachment point missing after {} checks",
                                poll.attempts()
                            );
                            None
                        }
                        PollOutcome::Abandoned => {
                            tracing::debug!("Attachment point removed, stopping initialization");
                            None
                        }
                    };
                }
            }
        }
    }

    fn on_ready(&mut self) -> Option<bool> {
        let widget = self.widget.as_mut()?;
        self.ready = true;

        if let Some((video_id, continue_playing)) = self.pending_video.take() {
            Self::retarget(widget.as_mut(), &video_id, continue_playing);
        }
        let deferred = self.deferred.take();
        if let Some(volume) = deferred.volume() {
            Self::log_widget_error("volume", widget.set_volume(volume.as_percent()));
        }
        if let Some(seconds) = deferred.seek() {
            Self::log_widget_error("seek", widget.seek_to(seconds));
        }
        deferred.playing()
    }

    fn is_ready(&self) -> bool {
        self.ready && self.widget.is_some()
    }

    fn resource(&self) -> Option<ResourceId> {
        self.resource
    }

    fn play(&mut self) -> Result<()> {
        match self.ready_widget() {
            Some(widget) => widget.play_video(),
            None => {
                self.deferred.set_playing(true);
                Ok(())
            }
        }
    }

    fn pause(&mut self) {
        match self.ready_widget() {
            Some(widget) => Self::log_widget_error("pause", widget.pause_video()),
            None => self.deferred.set_playing(false),
        }
    }

    fn seek(&mut self, seconds: f64) {
        match self.ready_widget() {
            Some(widget) => Self::log_widget_error("seek", widget.seek_to(seconds)),
            None => self.deferred.set_seek(seconds),
        }
    }

    fn set_volume(&mut self, volume: Volume) {
        match self.ready_widget() {
            Some(widget) => Self::log_widget_error("volume", widget.set_volume(volume.as_percent())),
            None => self.deferred.set_volume(volume),
        }
    }

    fn current_time(&self) -> f64 {
        if !self.is_ready() {
            return 0.0;
        }
        self.widget
            .as_ref()
            .and_then(|w| w.current_time())
            .filter(|t| t.is_finite())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        self.widget
            .as_ref()
            .and_then(|w| w.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn release(&mut self) {
        self.init = None;
        if let Some(mut widget) = self.widget.take() {
            tracing::debug!("Destroying embedded player {:?}", self.resource);
            widget.destroy();
        }
        if self.container_requested {
            self.host.remove_container(&self.container_id);
        }
        self.container_requested = false;
        self.container_seen = false;
        self.resource = None;
        self.video_id = None;
        self.pending_video = None;
        self.ready = false;
        self.deferred = DeferredCommands::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeEmbed;

    fn backend(embed: &FakeEmbed, scripts: Rc<ScriptRegistry>) -> EmbeddedVideoBackend {
        EmbeddedVideoBackend::new(
            Box::new(embed.host()),
            scripts,
            WidgetOptions::default(),
            &PlayerConfig::default(),
        )
    }

    fn video(id: i64, video: &str) -> Track {
        Track::new(id, "V", format!("https://www.youtube.com/watch?v={}", video))
    }

    #[test]
    fn initializes_after_script_ready() {
        let embed = FakeEmbed::default();
        let scripts = Rc::new(ScriptRegistry::new("api.js"));
        let mut backend = backend(&embed, scripts.clone());

        let bound = backend.prepare(ResourceId::new(1), &video(1, "aaa"), false).unwrap();
        assert_eq!(
            bound.binding,
            Binding::Pending {
                retry_in: Duration::from_millis(100)
            }
        );
        assert_eq!(embed.injected(), vec!["api.js".to_string()]);

        assert_eq!(backend.poll_init(), Some(Duration::from_millis(200)));
        scripts.mark_ready();
        assert_eq!(backend.poll_init(), None);
        assert_eq!(embed.widgets().len(), 1);
        assert_eq!(embed.widgets()[0].borrow().video_id, "aaa");
        assert!(!backend.is_ready());

        backend.set_volume(Volume::new(0.4));
        assert_eq!(backend.on_ready(), None);
        assert_eq!(embed.widgets()[0].borrow().volume, Some(40.0));
    }

    #[test]
    fn script_wait_is_bounded() {
        let embed = FakeEmbed::default();
        let scripts = Rc::new(ScriptRegistry::new("api.js"));
        let mut backend = backend(&embed, scripts);
        backend.prepare(ResourceId::new(1), &video(1, "aaa"), false).unwrap();

        let mut checks = 0;
        while backend.poll_init().is_some() {
            checks += 1;
        }
        assert_eq!(checks, PlayerConfig::default().script_max_attempts - 1);
        assert!(embed.widgets().is_empty());
        assert!(!backend.is_initializing());
    }

    #[test]
    fn container_removed_mid_poll_stops() {
        let embed = FakeEmbed::default();
        let scripts = Rc::new(ScriptRegistry::new("api.js"));
        let mut backend = backend(&embed, scripts);
        backend.prepare(ResourceId::new(1), &video(1, "aaa"), false).unwrap();

        assert!(backend.poll_init().is_some());
        embed.detach_container();
        assert_eq!(backend.poll_init(), None);
        assert!(embed.widgets().is_empty());
    }

    #[test]
    fn retargets_existing_widget() {
        let embed = FakeEmbed::default();
        let scripts = Rc::new(ScriptRegistry::new("api.js"));
        scripts.mark_ready();
        let mut backend = backend(&embed, scripts);

        backend.prepare(ResourceId::new(1), &video(1, "aaa"), false).unwrap();
        assert_eq!(backend.poll_init(), None);
        embed.widgets()[0].borrow_mut().api_ready = true;
        backend.on_ready();

        let bound = backend.prepare(ResourceId::new(2), &video(2, "bbb"), true).unwrap();
        assert_eq!(bound.binding, Binding::Retargeted);
        assert_eq!(bound.resource, ResourceId::new(1));
        let bound = backend.prepare(ResourceId::new(3), &video(3, "ccc"), false).unwrap();
        assert_eq!(bound.binding, Binding::Retargeted);

        let widget = embed.widgets()[0].clone();
        assert_eq!(widget.borrow().calls, vec!["load:bbb", "cue:ccc"]);
        assert_eq!(embed.widgets().len(), 1);
        assert!(backend.is_ready());

        let bound = backend.prepare(ResourceId::new(4), &video(3, "ccc"), false).unwrap();
        assert_eq!(bound.binding, Binding::Reused);
    }

    #[test]
    fn switch_before_ready_waits_for_widget() {
        let embed = FakeEmbed::default();
        let scripts = Rc::new(ScriptRegistry::new("api.js"));
        scripts.mark_ready();
        let mut backend = backend(&embed, scripts);

        backend.prepare(ResourceId::new(1), &video(1, "aaa"), false).unwrap();
        assert_eq!(backend.poll_init(), None);
        let bound = backend.prepare(ResourceId::new(2), &video(2, "bbb"), true).unwrap();
        assert_eq!(bound.binding, Binding::Retargeted);
        assert_eq!(backend.video_id(), Some("bbb"));

        let widget = embed.widgets()[0].clone();
        assert!(widget.borrow().calls.is_empty());
        assert_eq!(widget.borrow().video_id, "aaa");

        backend.play().unwrap();
        widget.borrow_mut().api_ready = true;
        assert_eq!(backend.on_ready(), Some(true));
        assert_eq!(widget.borrow().video_id, "bbb");
        assert_eq!(widget.borrow().calls, vec!["load:bbb"]);

        // Switched exactly once
        backend.on_ready();
        assert_eq!(widget.borrow().calls, vec!["load:bbb"]);
    }

    #[test]
    fn rejects_non_video_url() {
        let embed = FakeEmbed::default();
        let mut backend = backend(&embed, Rc::new(ScriptRegistry::new("api.js")));
        let track = Track::new(1, "bad", "https://www.youtube.com/channel/x");
        assert!(matches!(
            backend.prepare(ResourceId::new(1), &track, false),
            Err(PlaybackError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn release_destroys_widget_and_container() {
        let embed = FakeEmbed::default();
        let scripts = Rc::new(ScriptRegistry::new("api.js"));
        scripts.mark_ready();
        let mut backend = backend(&embed, scripts);
        backend.prepare(ResourceId::new(1), &video(1, "aaa"), false).unwrap();
        backend.poll_init();

        backend.release();
        assert!(embed.widgets()[0].borrow().destroyed);
        assert!(!embed.container_attached());
        assert_eq!(backend.resource(), None);
        assert_eq!(backend.current_time(), 0.0);
    }
}
