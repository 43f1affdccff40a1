//! Browser implementations of the platform traits

use super::Inbox;
use crate::backend::{BackendEvent, ScriptRegistry};
use crate::error::{PlaybackError, Result};
use crate::platform::{
    AudioHost, EmbedHost, EmbedWidget, MediaElement, ReadyState, VolumeStore, WidgetState,
};
use crate::types::{ResourceId, WidgetOptions};
use crate::volume::{cookie_value, format_cookie};
use js_sys::{Array, Function, Object, Reflect};
use std::rc::Rc;
use std::time::Duration;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlAudioElement, HtmlDocument, Window};

const AUDIO_MARKER: &str = "data-music-player-audio";
const CONTAINER_MARKER: &str = "data-music-player-youtube";
const CONTAINER_CLASS: &str = "absolute w-px h-px overflow-hidden opacity-0 pointer-events-none";

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| PlaybackError::ResourceUnavailable("no window".to_string()))
}

fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| PlaybackError::ResourceUnavailable("no document".to_string()))
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn finite(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Origin of the current page
pub fn page_origin() -> Option<Url> {
    let origin = window().ok()?.location().origin().ok()?;
    Url::parse(&origin).ok()
}

/// Layout width of the viewport in CSS pixels
pub fn viewport_width() -> Option<f64> {
    window().ok()?.inner_width().ok()?.as_f64()
}

// ===== Native audio =====

/// Creates `<audio>` elements attached to the document body
pub struct WebAudioHost {
    inbox: Inbox,
}

impl WebAudioHost {
    /// Host delivering element notifications into `inbox`
    pub fn new(inbox: Inbox) -> Self {
        Self { inbox }
    }
}

impl AudioHost for WebAudioHost {
    fn adopt(&mut self, resource: ResourceId) -> Option<Box<dyn MediaElement>> {
        let selector = format!("audio[{}]", AUDIO_MARKER);
        let element = document()
            .ok()?
            .query_selector(&selector)
            .ok()??
            .dyn_into::<HtmlAudioElement>()
            .ok()?;
        Some(Box::new(WebMediaElement::attach(
            element,
            resource,
            self.inbox.clone(),
        )))
    }

    fn create(&mut self, resource: ResourceId, url: &str) -> Result<Box<dyn MediaElement>> {
        let element = HtmlAudioElement::new_with_src(url)
            .map_err(|e| PlaybackError::ResourceUnavailable(js_error(&e)))?;
        element.set_preload("metadata");
        element
            .set_attribute(AUDIO_MARKER, "true")
            .map_err(|e| PlaybackError::ResourceUnavailable(js_error(&e)))?;

        let body = document()?
            .body()
            .ok_or_else(|| PlaybackError::ResourceUnavailable("no body".to_string()))?;
        body.append_child(&element)
            .map_err(|e| PlaybackError::ResourceUnavailable(js_error(&e)))?;

        Ok(Box::new(WebMediaElement::attach(
            element,
            resource,
            self.inbox.clone(),
        )))
    }
}

const MEDIA_EVENTS: [&str; 6] = ["canplay", "play", "pause", "ended", "durationchange", "error"];

struct WebMediaElement {
    element: HtmlAudioElement,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
    resource: ResourceId,
    inbox: Inbox,
}

impl WebMediaElement {
    fn attach(element: HtmlAudioElement, resource: ResourceId, inbox: Inbox) -> Self {
        let mut listeners = Vec::with_capacity(MEDIA_EVENTS.len());
        for name in MEDIA_EVENTS {
            let inbox = inbox.clone();
            let source = element.clone();
            let callback = Closure::<dyn FnMut()>::new(move || {
                let event = match name {
                    "canplay" => BackendEvent::Ready {
                        duration: finite(source.duration()),
                    },
                    "play" => BackendEvent::PlayingChanged(true),
                    "pause" => BackendEvent::PlayingChanged(false),
                    "ended" => BackendEvent::Ended,
                    "durationchange" => match finite(source.duration()) {
                        Some(duration) => BackendEvent::DurationChanged(duration),
                        None => return,
                    },
                    _ => BackendEvent::Error(format!("audio element error ({})", source.src())),
                };
                inbox.borrow_mut().push_back((resource, event));
            });
            if let Err(e) =
                element.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            {
                tracing::warn!("Failed to listen for {}: {}", name, js_error(&e));
            }
            listeners.push((name, callback));
        }

        Self {
            element,
            listeners,
            resource,
            inbox,
        }
    }
}

impl Drop for WebMediaElement {
    fn drop(&mut self) {
        for (name, callback) in &self.listeners {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
    }
}

impl MediaElement for WebMediaElement {
    fn src(&self) -> String {
        self.element.src()
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_code(self.element.ready_state())
    }

    fn play(&mut self) -> Result<()> {
        match self.element.play() {
            Ok(promise) => {
                let inbox = self.inbox.clone();
                let resource = self.resource;
                let on_rejected: Closure<dyn FnMut(JsValue)> =
                    Closure::once(move |reason: JsValue| {
                        tracing::debug!("Play request rejected: {}", js_error(&reason));
                        inbox
                            .borrow_mut()
                            .push_back((resource, BackendEvent::PlayingChanged(false)));
                    });
                let _ = promise.catch(&on_rejected);
                // Releasing the element rejects a pending play, so the handler
                // must outlive it. Late rejections carry a stale resource id.
                on_rejected.forget();
                Ok(())
            }
            Err(e) => Err(PlaybackError::PlaybackRejected(js_error(&e))),
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            tracing::debug!("Pause failed: {}", js_error(&e));
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn set_volume(&mut self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn release(&mut self) {
        self.pause();
        self.element.set_src("");
        self.element.load();
        self.element.remove();
    }
}

// ===== Embedded video =====

fn widget_api() -> Option<Function> {
    let yt = Reflect::get(&web_sys::window()?, &JsValue::from_str("YT")).ok()?;
    if yt.is_undefined() || yt.is_null() {
        return None;
    }
    Reflect::get(&yt, &JsValue::from_str("Player"))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn widget_error(e: &JsValue) -> PlaybackError {
    PlaybackError::Widget(js_error(e))
}

/// Creates hidden widgets inside a hidden attachment point
pub struct YouTubeHost {
    inbox: Inbox,
    scripts: Rc<ScriptRegistry>,
}

impl YouTubeHost {
    /// Host delivering widget notifications into `inbox`
    ///
    /// `scripts` is marked ready from the API's global ready callback.
    pub fn new(inbox: Inbox, scripts: Rc<ScriptRegistry>) -> Self {
        Self { inbox, scripts }
    }

    fn chain_ready_callback(&self, window: &Window) -> Result<()> {
        let key = JsValue::from_str("onYouTubeIframeAPIReady");
        let previous = Reflect::get(window, &key)
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        let scripts = self.scripts.clone();

        let ready = Closure::<dyn FnMut()>::new(move || {
            if let Some(previous) = &previous {
                if let Err(e) = previous.call0(&JsValue::NULL) {
                    tracing::warn!("Previous widget API callback failed: {}", js_error(&e));
                }
            }
            tracing::info!("Widget API ready");
            scripts.mark_ready();
        });
        Reflect::set(window, &key, ready.as_ref()).map_err(|e| PlaybackError::ScriptLoad(js_error(&e)))?;
        // Lives as long as the page
        ready.forget();
        Ok(())
    }
}

impl EmbedHost for YouTubeHost {
    fn script_present(&self) -> bool {
        widget_api().is_some()
    }

    fn inject_script(&mut self, src: &str) -> Result<()> {
        let window = window()?;
        let document = document()?;
        self.chain_ready_callback(&window)?;

        let script = document
            .create_element("script")
            .map_err(|e| PlaybackError::ScriptLoad(js_error(&e)))?;
        script
            .set_attribute("src", src)
            .map_err(|e| PlaybackError::ScriptLoad(js_error(&e)))?;

        let scripts = self.scripts.clone();
        let on_error = Closure::<dyn FnMut()>::new(move || {
            tracing::warn!("Widget API script failed to load");
            scripts.mark_failed();
        });
        script
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(|e| PlaybackError::ScriptLoad(js_error(&e)))?;
        on_error.forget();

        let inserted = match document.get_elements_by_tag_name("script").item(0) {
            Some(first) => match first.parent_node() {
                Some(parent) => parent.insert_before(&script, Some(&*first)),
                None => Err(JsValue::from_str("script has no parent")),
            },
            None => match document.head() {
                Some(head) => head.append_child(&script),
                None => Err(JsValue::from_str("no head")),
            },
        };
        inserted.map_err(|e| PlaybackError::ScriptLoad(js_error(&e)))?;
        Ok(())
    }

    fn ensure_container(&mut self, id: &str) -> Result<()> {
        let document = document()?;
        if document.get_element_by_id(id).is_some() {
            return Ok(());
        }
        let container = document
            .create_element("div")
            .map_err(|e| PlaybackError::ResourceUnavailable(js_error(&e)))?;
        container.set_id(id);
        container.set_class_name(CONTAINER_CLASS);
        container
            .set_attribute(CONTAINER_MARKER, "true")
            .map_err(|e| PlaybackError::ResourceUnavailable(js_error(&e)))?;

        // Without a body the poll waits for one
        if let Some(body) = document.body() {
            body.append_child(&container)
                .map_err(|e| PlaybackError::ResourceUnavailable(js_error(&e)))?;
        }
        Ok(())
    }

    fn container_attached(&self, id: &str) -> bool {
        document()
            .ok()
            .and_then(|d| d.get_element_by_id(id))
            .is_some_and(|element| element.is_connected())
    }

    fn remove_container(&mut self, id: &str) {
        if let Some(element) = document().ok().and_then(|d| d.get_element_by_id(id)) {
            element.remove();
        }
    }

    fn create_widget(
        &mut self,
        resource: ResourceId,
        container_id: &str,
        video_id: &str,
        options: &WidgetOptions,
    ) -> Result<Box<dyn EmbedWidget>> {
        let constructor = widget_api()
            .ok_or_else(|| PlaybackError::ScriptLoad("widget API not loaded".to_string()))?;

        let player_vars = Object::new();
        for (key, value) in options.player_vars() {
            let value = value
                .parse::<f64>()
                .map(JsValue::from_f64)
                .unwrap_or_else(|_| JsValue::from_str(&value));
            Reflect::set(&player_vars, &JsValue::from_str(key), &value).map_err(|e| widget_error(&e))?;
        }

        let inbox = self.inbox.clone();
        let on_ready = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            inbox
                .borrow_mut()
                .push_back((resource, BackendEvent::Ready { duration: None }));
        });

        let inbox = self.inbox.clone();
        let on_state_change = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let code = Reflect::get(&event, &JsValue::from_str("data"))
                .ok()
                .and_then(|data| data.as_f64());
            let Some(state) = code.and_then(|c| WidgetState::from_code(c as i32)) else {
                return;
            };
            let event = match state {
                WidgetState::Playing => BackendEvent::PlayingChanged(true),
                WidgetState::Paused => BackendEvent::PlayingChanged(false),
                WidgetState::Ended => BackendEvent::Ended,
                WidgetState::Unstarted | WidgetState::Buffering | WidgetState::Cued => return,
            };
            inbox.borrow_mut().push_back((resource, event));
        });

        let inbox = self.inbox.clone();
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let code = Reflect::get(&event, &JsValue::from_str("data"))
                .ok()
                .and_then(|data| data.as_f64())
                .unwrap_or(-1.0);
            inbox.borrow_mut().push_back((
                resource,
                BackendEvent::Error(format!("embedded player error {}", code)),
            ));
        });

        let events = Object::new();
        for (name, callback) in [
            ("onReady", &on_ready),
            ("onStateChange", &on_state_change),
            ("onError", &on_error),
        ] {
            Reflect::set(&events, &JsValue::from_str(name), callback.as_ref())
                .map_err(|e| widget_error(&e))?;
        }

        let config = Object::new();
        let fields: [(&str, JsValue); 5] = [
            ("width", JsValue::from_f64(f64::from(options.width))),
            ("height", JsValue::from_f64(f64::from(options.height))),
            ("videoId", JsValue::from_str(video_id)),
            ("playerVars", player_vars.into()),
            ("events", events.into()),
        ];
        for (key, value) in fields {
            Reflect::set(&config, &JsValue::from_str(key), &value).map_err(|e| widget_error(&e))?;
        }

        let args = Array::of2(&JsValue::from_str(container_id), &config);
        let player = Reflect::construct(&constructor, &args).map_err(|e| widget_error(&e))?;

        Ok(Box::new(YouTubeWidget {
            player,
            _callbacks: [on_ready, on_state_change, on_error],
        }))
    }
}

struct YouTubeWidget {
    player: JsValue,
    _callbacks: [Closure<dyn FnMut(JsValue)>; 3],
}

impl YouTubeWidget {
    fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue> {
        let function = Reflect::get(&self.player, &JsValue::from_str(method))
            .map_err(|e| widget_error(&e))?
            .dyn_into::<Function>()
            .map_err(|_| PlaybackError::Widget(format!("{} is not available", method)))?;
        let args: Array = args.iter().collect();
        function
            .apply(&self.player, &args)
            .map_err(|e| widget_error(&e))
    }

    fn call_number(&self, method: &str) -> Option<f64> {
        self.call(method, &[]).ok()?.as_f64()
    }
}

impl EmbedWidget for YouTubeWidget {
    fn load_video_by_id(&mut self, video_id: &str) -> Result<()> {
        self.call("loadVideoById", &[JsValue::from_str(video_id)])
            .map(drop)
    }

    fn cue_video_by_id(&mut self, video_id: &str) -> Result<()> {
        self.call("cueVideoById", &[JsValue::from_str(video_id)])
            .map(drop)
    }

    fn play_video(&mut self) -> Result<()> {
        self.call("playVideo", &[]).map(drop)
    }

    fn pause_video(&mut self) -> Result<()> {
        self.call("pauseVideo", &[]).map(drop)
    }

    fn seek_to(&mut self, seconds: f64) -> Result<()> {
        self.call("seekTo", &[JsValue::from_f64(seconds), JsValue::TRUE])
            .map(drop)
    }

    fn set_volume(&mut self, percent: f64) -> Result<()> {
        self.call("setVolume", &[JsValue::from_f64(percent)])
            .map(drop)
    }

    fn current_time(&self) -> Option<f64> {
        self.call_number("getCurrentTime")
    }

    fn duration(&self) -> Option<f64> {
        self.call_number("getDuration")
    }

    fn player_state(&self) -> Option<WidgetState> {
        self.call_number("getPlayerState")
            .and_then(|code| WidgetState::from_code(code as i32))
    }

    fn destroy(&mut self) {
        if let Err(e) = self.call("destroy", &[]) {
            tracing::debug!("Destroying embedded player failed: {}", e);
        }
    }
}

// ===== Persistence =====

/// Volume persisted in a site-wide cookie
#[derive(Debug, Default, Clone, Copy)]
pub struct CookieVolumeStore;

impl CookieVolumeStore {
    fn html_document() -> Result<HtmlDocument> {
        document()?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| PlaybackError::Persistence("not an HTML document".to_string()))
    }
}

impl VolumeStore for CookieVolumeStore {
    fn read(&self, key: &str) -> Option<String> {
        let header = Self::html_document().ok()?.cookie().ok()?;
        cookie_value(&header, key).map(str::to_string)
    }

    fn write(&mut self, key: &str, value: &str, max_age: Duration) -> Result<()> {
        Self::html_document()?
            .set_cookie(&format_cookie(key, value, max_age))
            .map_err(|e| PlaybackError::Persistence(js_error(&e)))
    }
}
