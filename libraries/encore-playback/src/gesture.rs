//! Swipe-to-dismiss
//!
//! Tracks a single downward drag that starts on the panel's handle. The
//! panel follows the finger and fades; releasing past the close threshold
//! dismisses it, anything less snaps back. Touches elsewhere on the panel
//! are left to the platform so normal scrolling keeps working.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Swipe tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Downward distance in pixels past which release closes the panel
    pub close_threshold: f64,

    /// Distance over which opacity fades from 1 to the minimum
    pub opacity_distance: f64,

    /// Opacity floor while dragging
    pub min_opacity: f64,

    /// Minimum time between processed move samples in milliseconds
    pub throttle_ms: u32,

    /// Snap-back animation length in milliseconds
    pub settle_ms: u32,

    /// Gestures are enabled only below this viewport width
    pub mobile_breakpoint: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            close_threshold: 100.0,
            opacity_distance: 200.0,
            min_opacity: 0.5,
            throttle_ms: 16,
            settle_ms: 200,
            mobile_breakpoint: 768.0,
        }
    }
}

/// Where a touch started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchRegion {
    /// The drag handle
    Handle,
    /// Anywhere else on the panel
    Panel,
}

/// Answer to a move sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResponse {
    /// Suppress the platform's default scrolling for this sample
    pub prevent_default: bool,
    /// The drag offset changed and the panel should re-render
    pub offset_changed: bool,
}

/// What releasing the touch means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureEnd {
    /// Dragged far enough: dismiss the panel
    Close,
    /// Not far enough: animate back to rest
    SnapBack,
    /// No gesture was in progress
    Inactive,
}

/// How the panel should be drawn for the current drag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeVisual {
    /// Downward translation in pixels, `None` at rest
    pub translate_y: Option<f64>,
    /// Panel opacity
    pub opacity: f64,
    /// Animate towards this state over the given time, `None` to follow the finger
    pub transition: Option<Duration>,
}

impl SwipeVisual {
    /// CSS `transform` value
    pub fn css_transform(&self) -> Option<String> {
        self.translate_y.map(|y| format!("translateY({}px)", y))
    }

    /// CSS `transition` value
    pub fn css_transition(&self) -> String {
        match self.transition {
            Some(d) => format!("transform {}s ease-out", d.as_secs_f64()),
            None => "none".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveSwipe {
    start_x: f64,
    start_y: f64,
    offset: f64,
    last_sample: Option<Duration>,
}

/// Swipe-to-dismiss recognizer
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    enabled: bool,
    active: Option<ActiveSwipe>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    /// Create a recognizer
    ///
    /// Touches are ignored until a viewport narrower than the mobile
    /// breakpoint is reported through [`Self::set_viewport_width`].
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            enabled: false,
            active: None,
        }
    }

    /// Enable gestures on narrow viewports only
    pub fn set_viewport_width(&mut self, width: f64) {
        self.enabled = width < self.config.mobile_breakpoint;
        if !self.enabled {
            self.cancel();
        }
    }

    /// Whether touches are being recognized
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a drag is in progress
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Current downward offset in pixels
    pub fn offset(&self) -> f64 {
        self.active.map_or(0.0, |swipe| swipe.offset)
    }

    /// Touch down
    ///
    /// Returns true when a drag starts. Only touches on the handle count; a
    /// second touch while one is active is ignored.
    pub fn begin(&mut self, region: TouchRegion, x: f64, y: f64) -> bool {
        if !self.enabled || self.active.is_some() || region != TouchRegion::Handle {
            return false;
        }
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        tracing::trace!("Swipe started at ({}, {})", x, y);
        self.active = Some(ActiveSwipe {
            start_x: x,
            start_y: y,
            offset: 0.0,
            last_sample: None,
        });
        true
    }

    /// Touch moved
    ///
    /// Only predominantly downward movement updates the offset; other
    /// samples are ignored. Samples closer together than the throttle
    /// interval are dropped. Every sample of an active drag suppresses
    /// scrolling.
    pub fn update(&mut self, x: f64, y: f64, now: Duration) -> MoveResponse {
        let throttle = Duration::from_millis(u64::from(self.config.throttle_ms));
        let Some(swipe) = self.active.as_mut() else {
            return MoveResponse::default();
        };

        if let Some(last) = swipe.last_sample {
            if now.saturating_sub(last) < throttle {
                return MoveResponse {
                    prevent_default: true,
                    offset_changed: false,
                };
            }
        }
        swipe.last_sample = Some(now);

        let dy = y - swipe.start_y;
        let dx = (x - swipe.start_x).abs();
        let downward = dy > 0.0 && dy > dx;
        let offset_changed = downward && dy != swipe.offset;
        if downward {
            swipe.offset = dy;
        }

        MoveResponse {
            prevent_default: true,
            offset_changed,
        }
    }

    /// Touch released
    ///
    /// Resolves the gesture exactly once; later calls return
    /// [`GestureEnd::Inactive`] until the next [`begin`](Self::begin).
    pub fn end(&mut self) -> GestureEnd {
        match self.active.take() {
            Some(swipe) if swipe.offset > self.config.close_threshold => GestureEnd::Close,
            Some(_) => GestureEnd::SnapBack,
            None => GestureEnd::Inactive,
        }
    }

    /// Abandon the drag without resolving it
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// How the panel should look right now
    pub fn visual(&self) -> SwipeVisual {
        let offset = self.offset();
        if offset > 0.0 {
            let fade = 1.0 - offset / self.config.opacity_distance;
            SwipeVisual {
                translate_y: Some(offset),
                opacity: fade.max(self.config.min_opacity),
                transition: None,
            }
        } else {
            SwipeVisual {
                translate_y: None,
                opacity: 1.0,
                transition: Some(Duration::from_millis(u64::from(self.config.settle_ms))),
            }
        }
    }
}
