//! Native audio backend
//!
//! Plays direct media URLs through the platform audio primitive. One element
//! is kept per page: an existing element is adopted on first use and reused
//! while its source matches the requested track.

use super::{Binding, Bound, DeferredCommands, PlaybackBackend};
use crate::error::Result;
use crate::platform::{AudioHost, MediaElement};
use crate::types::ResourceId;
use crate::volume::Volume;
use encore_core::{same_media, MediaKind, Track};
use url::Url;

/// Backend for directly streamable media files
pub struct NativeAudioBackend {
    host: Box<dyn AudioHost>,
    origin: Option<Url>,
    element: Option<Box<dyn MediaElement>>,
    resource: Option<ResourceId>,
    ready: bool,
    deferred: DeferredCommands,
}

impl NativeAudioBackend {
    /// Backend creating elements through `host`
    ///
    /// `origin` resolves relative track URLs when comparing sources.
    pub fn new(host: Box<dyn AudioHost>, origin: Option<Url>) -> Self {
        Self {
            host,
            origin,
            element: None,
            resource: None,
            ready: false,
            deferred: DeferredCommands::default(),
        }
    }

    fn release_element(&mut self) {
        if let Some(mut element) = self.element.take() {
            tracing::debug!("Releasing audio element {:?}", self.resource);
            element.release();
        }
        self.resource = None;
        self.ready = false;
    }

    fn apply_volume(element: &mut dyn MediaElement, volume: Volume) {
        element.set_volume(volume.fraction());
    }
}

impl PlaybackBackend for NativeAudioBackend {
    fn kind(&self) -> MediaKind {
        MediaKind::Native
    }

    fn prepare(
        &mut self,
        resource: ResourceId,
        track: &Track,
        _continue_playing: bool,
    ) -> Result<Bound> {
        if self.element.is_none() {
            if let Some(adopted) = self.host.adopt(resource) {
                tracing::debug!("Adopted existing audio element ({})", adopted.src());
                self.ready = adopted.ready_state().can_play();
                self.element = Some(adopted);
                self.resource = Some(resource);
            }
        }

        if let (Some(element), Some(current)) = (self.element.as_ref(), self.resource) {
            if same_media(&element.src(), &track.url, self.origin.as_ref()) {
                tracing::debug!("Audio element already plays {}", track.url);
                self.ready = self.ready || element.ready_state().can_play();
                return Ok(Bound {
                    resource: current,
                    binding: Binding::Reused,
                });
            }
        }

        self.release_element();
        let element = self.host.create(resource, &track.url)?;
        tracing::debug!("Created audio element {} for {}", resource, track.url);
        self.element = Some(element);
        self.resource = Some(resource);
        self.ready = false;
        self.deferred.retarget();

        Ok(Bound {
            resource,
            binding: Binding::Created,
        })
    }

    fn on_ready(&mut self) -> Option<bool> {
        let element = self.element.as_mut()?;
        self.ready = true;

        let deferred = self.deferred.take();
        if let Some(volume) = deferred.volume() {
            Self::apply_volume(element.as_mut(), volume);
        }
        if let Some(seconds) = deferred.seek() {
            element.set_current_time(seconds);
        }
        deferred.playing()
    }

    fn is_ready(&self) -> bool {
        self.ready && self.element.is_some()
    }

    fn resource(&self) -> Option<ResourceId> {
        self.resource
    }

    fn play(&mut self) -> Result<()> {
        match self.element.as_mut() {
            Some(element) if self.ready => element.play(),
            _ => {
                self.deferred.set_playing(true);
                Ok(())
            }
        }
    }

    fn pause(&mut self) {
        match self.element.as_mut() {
            Some(element) if self.ready => element.pause(),
            _ => self.deferred.set_playing(false),
        }
    }

    fn seek(&mut self, seconds: f64) {
        match self.element.as_mut() {
            Some(element) if self.ready => element.set_current_time(seconds),
            _ => self.deferred.set_seek(seconds),
        }
    }

    fn set_volume(&mut self, volume: Volume) {
        match self.element.as_mut() {
            Some(element) if self.ready => Self::apply_volume(element.as_mut(), volume),
            _ => self.deferred.set_volume(volume),
        }
    }

    fn current_time(&self) -> f64 {
        self.element
            .as_ref()
            .map(|e| e.current_time())
            .filter(|t| t.is_finite())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.element
            .as_ref()
            .map(|e| e.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn release(&mut self) {
        self.release_element();
        self.deferred = DeferredCommands::default();
    }
}
