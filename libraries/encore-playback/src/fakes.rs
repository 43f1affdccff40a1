//! In-memory platform doubles for unit tests

use crate::error::{PlaybackError, Result};
use crate::platform::{AudioHost, EmbedHost, EmbedWidget, MediaElement, ReadyState, WidgetState};
use crate::types::{ResourceId, WidgetOptions};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
pub(crate) struct ElementState {
    pub resource: ResourceId,
    pub src: String,
    pub ready: ReadyState,
    pub paused: bool,
    pub time: f64,
    pub duration: f64,
    pub volume: f64,
    pub released: bool,
    pub play_calls: u32,
    pub reject_play: bool,
}

impl ElementState {
    fn new(resource: ResourceId, src: &str, ready: ReadyState) -> Self {
        Self {
            resource,
            src: src.to_string(),
            ready,
            paused: true,
            time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            released: false,
            play_calls: 0,
            reject_play: false,
        }
    }
}

#[derive(Default)]
struct AudioPage {
    elements: Vec<Rc<RefCell<ElementState>>>,
    on_page: Option<Rc<RefCell<ElementState>>>,
    created: usize,
}

/// Fake page holding audio elements
#[derive(Default, Clone)]
pub(crate) struct FakeAudio {
    page: Rc<RefCell<AudioPage>>,
}

impl FakeAudio {
    pub fn host(&self) -> FakeAudioHost {
        FakeAudioHost { page: self.clone() }
    }

    pub fn place_on_page(&self, src: &str, ready: ReadyState) {
        let element = Rc::new(RefCell::new(ElementState::new(ResourceId::new(0), src, ready)));
        let mut page = self.page.borrow_mut();
        page.elements.push(element.clone());
        page.on_page = Some(element);
    }

    pub fn created(&self) -> usize {
        self.page.borrow().created
    }

    pub fn live(&self) -> usize {
        self.page
            .borrow()
            .elements
            .iter()
            .filter(|e| !e.borrow().released)
            .count()
    }

    pub fn last(&self) -> Rc<RefCell<ElementState>> {
        self.page.borrow().elements.last().cloned().expect("no element")
    }
}

pub(crate) struct FakeAudioHost {
    page: FakeAudio,
}

impl AudioHost for FakeAudioHost {
    fn adopt(&mut self, resource: ResourceId) -> Option<Box<dyn MediaElement>> {
        let element = self.page.page.borrow().on_page.clone()?;
        if element.borrow().released {
            return None;
        }
        element.borrow_mut().resource = resource;
        Some(Box::new(FakeElement(element)))
    }

    fn create(&mut self, resource: ResourceId, url: &str) -> Result<Box<dyn MediaElement>> {
        let element = Rc::new(RefCell::new(ElementState::new(resource, url, ReadyState::Nothing)));
        let mut page = self.page.page.borrow_mut();
        page.elements.push(element.clone());
        page.on_page = Some(element.clone());
        page.created += 1;
        Ok(Box::new(FakeElement(element)))
    }
}

struct FakeElement(Rc<RefCell<ElementState>>);

impl MediaElement for FakeElement {
    fn src(&self) -> String {
        self.0.borrow().src.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.0.borrow().ready
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.play_calls += 1;
        if state.reject_play {
            return Err(PlaybackError::PlaybackRejected("NotAllowedError".to_string()));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.0.borrow_mut().time = seconds;
    }

    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn release(&mut self) {
        let mut state = self.0.borrow_mut();
        state.paused = true;
        state.src.clear();
        state.released = true;
    }
}

#[derive(Debug)]
pub(crate) struct WidgetRecord {
    pub resource: ResourceId,
    pub video_id: String,
    pub calls: Vec<String>,
    pub volume: Option<f64>,
    pub time: f64,
    pub duration: Option<f64>,
    pub destroyed: bool,
    pub api_ready: bool,
}

struct EmbedPage {
    script_present: bool,
    injected: Vec<String>,
    attach_containers: bool,
    container: bool,
    widgets: Vec<Rc<RefCell<WidgetRecord>>>,
}

impl Default for EmbedPage {
    fn default() -> Self {
        Self {
            script_present: false,
            injected: Vec::new(),
            attach_containers: true,
            container: false,
            widgets: Vec::new(),
        }
    }
}

/// Fake page hosting embedded widgets
#[derive(Default, Clone)]
pub(crate) struct FakeEmbed {
    page: Rc<RefCell<EmbedPage>>,
}

impl FakeEmbed {
    pub fn host(&self) -> FakeEmbedHost {
        FakeEmbedHost { page: self.clone() }
    }

    pub fn injected(&self) -> Vec<String> {
        self.page.borrow().injected.clone()
    }

    pub fn widgets(&self) -> Vec<Rc<RefCell<WidgetRecord>>> {
        self.page.borrow().widgets.clone()
    }

    pub fn detach_container(&self) {
        let mut page = self.page.borrow_mut();
        page.container = false;
        page.attach_containers = false;
    }

    pub fn container_attached(&self) -> bool {
        self.page.borrow().container
    }
}

pub(crate) struct FakeEmbedHost {
    page: FakeEmbed,
}

impl EmbedHost for FakeEmbedHost {
    fn script_present(&self) -> bool {
        self.page.page.borrow().script_present
    }

    fn inject_script(&mut self, src: &str) -> Result<()> {
        self.page.page.borrow_mut().injected.push(src.to_string());
        Ok(())
    }

    fn ensure_container(&mut self, _id: &str) -> Result<()> {
        let mut page = self.page.page.borrow_mut();
        if page.attach_containers {
            page.container = true;
        }
        Ok(())
    }

    fn container_attached(&self, _id: &str) -> bool {
        self.page.page.borrow().container
    }

    fn remove_container(&mut self, _id: &str) {
        self.page.page.borrow_mut().container = false;
    }

    fn create_widget(
        &mut self,
        resource: ResourceId,
        _container_id: &str,
        video_id: &str,
        _options: &WidgetOptions,
    ) -> Result<Box<dyn EmbedWidget>> {
        let record = Rc::new(RefCell::new(WidgetRecord {
            resource,
            video_id: video_id.to_string(),
            calls: Vec::new(),
            volume: None,
            time: 0.0,
            duration: None,
            destroyed: false,
            api_ready: false,
        }));
        self.page.page.borrow_mut().widgets.push(record.clone());
        Ok(Box::new(FakeWidget(record)))
    }
}

struct FakeWidget(Rc<RefCell<WidgetRecord>>);

impl FakeWidget {
    fn record(&self, call: String) -> Result<()> {
        self.0.borrow_mut().calls.push(call);
        Ok(())
    }

    fn switch(&self, call: &str, video_id: &str) -> Result<()> {
        if !self.0.borrow().api_ready {
            return Err(PlaybackError::Widget(format!("{} is not available", call)));
        }
        self.0.borrow_mut().video_id = video_id.to_string();
        self.record(format!("{}:{}", call, video_id))
    }
}

impl EmbedWidget for FakeWidget {
    fn load_video_by_id(&mut self, video_id: &str) -> Result<()> {
        self.switch("load", video_id)
    }

    fn cue_video_by_id(&mut self, video_id: &str) -> Result<()> {
        self.switch("cue", video_id)
    }

    fn play_video(&mut self) -> Result<()> {
        self.record("play".to_string())
    }

    fn pause_video(&mut self) -> Result<()> {
        self.record("pause".to_string())
    }

    fn seek_to(&mut self, seconds: f64) -> Result<()> {
        self.0.borrow_mut().time = seconds;
        self.record(format!("seek:{}", seconds))
    }

    fn set_volume(&mut self, percent: f64) -> Result<()> {
        self.0.borrow_mut().volume = Some(percent);
        Ok(())
    }

    fn current_time(&self) -> Option<f64> {
        Some(self.0.borrow().time)
    }

    fn duration(&self) -> Option<f64> {
        self.0.borrow().duration
    }

    fn player_state(&self) -> Option<WidgetState> {
        None
    }

    fn destroy(&mut self) {
        self.0.borrow_mut().destroyed = true;
    }
}
