//! Widget API script loading
//!
//! The widget script is a page-wide singleton: it is injected at most once
//! no matter how many players mount, and its readiness is shared.

use crate::platform::EmbedHost;
use std::cell::Cell;
use std::rc::Rc;

/// URL of the widget API script
pub const IFRAME_API_SRC: &str = "https://www.youtube.com/iframe_api";

/// Load state of the widget script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Not requested yet
    Absent,
    /// Injected, waiting for the ready callback
    Loading,
    /// API usable
    Ready,
    /// Injection failed
    Failed,
}

/// Shared widget-script state
#[derive(Debug)]
pub struct ScriptRegistry {
    src: String,
    status: Cell<ScriptStatus>,
}

thread_local! {
    static PAGE_REGISTRY: Rc<ScriptRegistry> = Rc::new(ScriptRegistry::new(IFRAME_API_SRC));
}

impl ScriptRegistry {
    /// Registry for a script URL
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            status: Cell::new(ScriptStatus::Absent),
        }
    }

    /// The registry shared by every player on the page
    pub fn page() -> Rc<Self> {
        PAGE_REGISTRY.with(Rc::clone)
    }

    /// Current status
    pub fn status(&self) -> ScriptStatus {
        self.status.get()
    }

    /// Whether the API is usable
    pub fn is_ready(&self) -> bool {
        self.status() == ScriptStatus::Ready
    }

    /// Inject the script unless it is loaded or loading
    ///
    /// A previous failure is retried.
    pub fn ensure_loaded(&self, host: &mut dyn EmbedHost) -> ScriptStatus {
        match self.status() {
            ScriptStatus::Ready | ScriptStatus::Loading => {}
            ScriptStatus::Absent | ScriptStatus::Failed => {
                if host.script_present() {
                    self.mark_ready();
                } else {
                    match host.inject_script(&self.src) {
                        Ok(()) => {
                            tracing::debug!("Injected widget script {}", self.src);
                            self.status.set(ScriptStatus::Loading);
                        }
                        Err(e) => {
                            tracing::warn!("Failed to inject widget script: {}", e);
                            self.status.set(ScriptStatus::Failed);
                        }
                    }
                }
            }
        }
        self.status()
    }

    /// The script's ready callback fired
    pub fn mark_ready(&self) {
        self.status.set(ScriptStatus::Ready);
    }

    /// The script failed to load
    pub fn mark_failed(&self) {
        self.status.set(ScriptStatus::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeEmbed;

    #[test]
    fn injects_once() {
        let embed = FakeEmbed::default();
        let mut host = embed.host();
        let registry = ScriptRegistry::new("api.js");

        assert_eq!(registry.ensure_loaded(&mut host), ScriptStatus::Loading);
        assert_eq!(registry.ensure_loaded(&mut host), ScriptStatus::Loading);
        assert_eq!(embed.injected().len(), 1);

        registry.mark_ready();
        assert_eq!(registry.ensure_loaded(&mut host), ScriptStatus::Ready);
        assert_eq!(embed.injected().len(), 1);
    }

    #[test]
    fn failure_is_retried() {
        let embed = FakeEmbed::default();
        let mut host = embed.host();
        let registry = ScriptRegistry::new("api.js");
        registry.mark_failed();

        assert_eq!(registry.ensure_loaded(&mut host), ScriptStatus::Loading);
        assert_eq!(embed.injected().len(), 1);
    }

    #[test]
    fn page_registry_is_shared() {
        let a = ScriptRegistry::page();
        let b = ScriptRegistry::page();
        assert!(Rc::ptr_eq(&a, &b));
    }
}
