//! Pointer state machine: turns per-frame hand landmarks into cursor
//! motion, left click/drag, right click, and window gestures.
//!
//! Processing order per frame (first match short-circuits):
//! 1. Window toggle (fist = minimize, open palm = restore), debounced.
//! 2. Cursor target: index knuckle -> mapper -> adaptive filter.
//! 3. Lock/drag: a fresh pinch freezes the cursor, a held pinch drags.
//! 4. Left click with hysteresis, right click once per crossing.
//!
//! The controller is pure: it returns `PointerAction`s and never talks to
//! the OS.  The caller supplies the current OS cursor position for the
//! deadzone check.

use tracing::{debug, info};

use super::action::{PointerAction, WindowCommand};
use crate::tracking::classifier::{self, HandPosture};
use crate::tracking::{CoordinateMapper, CursorFilter, HandJoint, HandLandmarks, SmoothingMode};

// ── Thresholds ─────────────────────────────────────────────

/// Pinch distance below which the left button goes down.
pub const CLICK_START_THRESH: f32 = 0.05;
/// Pinch distance above which the left button comes back up.
pub const CLICK_STOP_THRESH: f32 = 0.06;
/// Pinch distance below which the cursor locks / drags.
pub const LOCK_THRESH: f32 = 0.1;
/// Minimum cursor travel (pixels, either axis) outside a pinch.
pub const DEADZONE_PX: f64 = 3.0;
/// Pinch hold time after which a lock turns into a drag (seconds).
pub const DRAG_HOLD_S: f64 = 0.5;
/// Minimum time between two window toggles (seconds).
pub const WINDOW_TOGGLE_COOLDOWN_S: f64 = 1.0;

// ── Config ─────────────────────────────────────────────────

/// Configuration for the pointer state machine.
#[derive(Debug, Clone)]
pub struct PointerConfig {
    pub click_start_thresh: f32,
    pub click_stop_thresh: f32,
    pub lock_thresh: f32,
    pub deadzone_px: f64,
    pub drag_hold_s: f64,
    pub window_toggle_cooldown_s: f64,
    /// Which smoother drives the cursor.
    pub smoothing: SmoothingMode,
    /// Frame-edge margin for the coordinate mapper (camera pixels).
    pub margin_px: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            click_start_thresh: CLICK_START_THRESH,
            click_stop_thresh: CLICK_STOP_THRESH,
            lock_thresh: LOCK_THRESH,
            deadzone_px: DEADZONE_PX,
            drag_hold_s: DRAG_HOLD_S,
            window_toggle_cooldown_s: WINDOW_TOGGLE_COOLDOWN_S,
            smoothing: SmoothingMode::OneEuro,
            margin_px: crate::tracking::mapper::DEFAULT_MARGIN_PX,
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Cursor control mode derived from the pinch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Cursor follows the hand (with deadzone).
    Free,
    /// Pinch just started; cursor frozen at the lock position.
    Locked,
    /// Pinch held past the drag threshold; cursor follows the hand again.
    Drag,
}

impl CursorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Locked => "locked",
            Self::Drag => "drag",
        }
    }
}

/// Mutable pointer state, owned by one `PointerController`.
///
/// `left_clicked` means a mouse-down went out with no mouse-up since.
/// `cursor_locked` means `locked_x/y` overrides the live position.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pub cursor_locked: bool,
    pub locked_x: f64,
    pub locked_y: f64,
    pub is_pinching: bool,
    pub pinch_start_time: f64,
    pub left_clicked: bool,
    pub right_clicked: bool,
    pub window_minimized: bool,
    /// Time of the last window toggle; `None` until the first one.
    pub last_window_toggle: Option<f64>,
}

impl PointerState {
    pub fn cursor_mode(&self) -> CursorMode {
        match (self.is_pinching, self.cursor_locked) {
            (true, true) => CursorMode::Locked,
            (true, false) => CursorMode::Drag,
            _ => CursorMode::Free,
        }
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub left_clicked: bool,
    pub right_clicked: bool,
    /// Index fingertip in frame pixels (feedback overlay).
    pub marker: (i32, i32),
    pub cursor_mode: CursorMode,
    /// Actions for the sink, in execution order.
    pub actions: Vec<PointerAction>,
}

// ── Controller ─────────────────────────────────────────────

/// The pointer state machine plus its per-axis filters.
pub struct PointerController {
    pub config: PointerConfig,
    state: PointerState,
    filter: CursorFilter,
    mapper: CoordinateMapper,
    /// Screen size in pixels.
    screen: (i32, i32),
}

impl PointerController {
    pub fn new(config: PointerConfig, screen: (i32, i32)) -> Self {
        info!(
            "Pointer controller: screen {}x{}, smoothing {}",
            screen.0,
            screen.1,
            config.smoothing.as_str(),
        );
        Self {
            filter: CursorFilter::new(config.smoothing),
            mapper: CoordinateMapper::new(config.margin_px),
            state: PointerState::default(),
            screen,
            config,
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Process one frame with a detected hand.
    ///
    /// - `frame_size`: camera frame (width, height) in pixels.
    /// - `now`: frame timestamp in seconds (strictly increasing).
    /// - `cursor`: current OS cursor position, for the deadzone.
    pub fn process_frame(
        &mut self,
        hand: &HandLandmarks,
        frame_size: (u32, u32),
        now: f64,
        cursor: (i32, i32),
    ) -> FrameOutcome {
        // 1. Window gestures stop all mouse processing for this frame.
        if let Some(command) = self.window_toggle(hand, now) {
            return FrameOutcome {
                left_clicked: false,
                right_clicked: false,
                marker: (0, 0),
                cursor_mode: self.state.cursor_mode(),
                actions: vec![PointerAction::Hotkey(command)],
            };
        }

        let mut actions = Vec::with_capacity(3);

        // 2. Knuckle, not tip: the MCP joint trembles less.
        let mcp = hand.joint(HandJoint::IndexMcp);
        let (target_x, target_y) = self.mapper.map(
            mcp.x,
            mcp.y,
            frame_size.0,
            frame_size.1,
            self.screen.0,
            self.screen.1,
        );
        let smooth = self.filter.update(now, (target_x as f64, target_y as f64));

        // 3-5. Lock / drag / deadzone, then always move.
        let pinch = classifier::index_pinch_distance(hand);
        let (x, y) = self.resolve_cursor(pinch, smooth, now, cursor);
        actions.push(PointerAction::Move {
            x: x.round() as i32,
            y: y.round() as i32,
        });

        // 6-7. Buttons.
        self.update_left_click(pinch, &mut actions);
        self.update_right_click(classifier::middle_pinch_distance(hand), &mut actions);

        FrameOutcome {
            left_clicked: self.state.left_clicked,
            right_clicked: self.state.right_clicked,
            marker: hand.joint(HandJoint::IndexTip).to_pixel(frame_size.0, frame_size.1),
            cursor_mode: self.state.cursor_mode(),
            actions,
        }
    }

    /// The hand left the frame: treat it as a pinch release.
    ///
    /// Releases a held left button so it cannot get stuck, clears the
    /// pinch state, and resets the filters so the cursor does not glide
    /// from the old position when the hand comes back.
    pub fn hand_lost(&mut self) -> Vec<PointerAction> {
        let mut actions = Vec::new();
        if self.state.left_clicked {
            info!("Hand lost with left button held, releasing");
            self.state.left_clicked = false;
            actions.push(PointerAction::MouseUp);
        }
        self.state.right_clicked = false;
        self.state.is_pinching = false;
        self.state.cursor_locked = false;
        self.filter.reset();
        actions
    }

    /// Shutdown: release anything still held.
    pub fn release_all(&mut self) -> Vec<PointerAction> {
        if self.state.left_clicked {
            self.state.left_clicked = false;
            info!("Releasing held left button on shutdown");
            vec![PointerAction::MouseUp]
        } else {
            Vec::new()
        }
    }

    /// Debounced fist / open-palm window toggle.
    fn window_toggle(&mut self, hand: &HandLandmarks, now: f64) -> Option<WindowCommand> {
        let ready = match self.state.last_window_toggle {
            Some(last) => now - last > self.config.window_toggle_cooldown_s,
            None => true,
        };
        if !ready {
            return None;
        }

        let posture = classifier::posture(hand);
        let command = match (posture, self.state.window_minimized) {
            (HandPosture::Fist, false) => WindowCommand::Minimize,
            (HandPosture::OpenPalm, true) => WindowCommand::Restore,
            _ => return None,
        };

        self.state.window_minimized = command == WindowCommand::Minimize;
        self.state.last_window_toggle = Some(now);
        info!("Window {} ({})", command.as_str(), posture.as_str());
        Some(command)
    }

    /// Cursor position for this frame given the pinch distance.
    fn resolve_cursor(
        &mut self,
        pinch: f32,
        smooth: (f64, f64),
        now: f64,
        cursor: (i32, i32),
    ) -> (f64, f64) {
        let st = &mut self.state;

        if pinch < self.config.lock_thresh {
            if !st.is_pinching {
                st.is_pinching = true;
                st.pinch_start_time = now;
                if !st.cursor_locked {
                    st.cursor_locked = true;
                    st.locked_x = smooth.0;
                    st.locked_y = smooth.1;
                    debug!("Cursor locked at ({:.0}, {:.0})", smooth.0, smooth.1);
                }
            }

            if st.cursor_locked && now - st.pinch_start_time > self.config.drag_hold_s {
                st.cursor_locked = false;
                debug!("Pinch held {:.2}s, entering drag", now - st.pinch_start_time);
            }

            if st.cursor_locked {
                (st.locked_x, st.locked_y)
            } else {
                smooth
            }
        } else {
            st.is_pinching = false;
            st.cursor_locked = false;

            let (cx, cy) = (cursor.0 as f64, cursor.1 as f64);
            let dz = self.config.deadzone_px;
            if (smooth.0 - cx).abs() > dz || (smooth.1 - cy).abs() > dz {
                smooth
            } else {
                (cx, cy)
            }
        }
    }

    /// Index-thumb pinch: press below start, release above stop.
    fn update_left_click(&mut self, pinch: f32, actions: &mut Vec<PointerAction>) {
        if pinch < self.config.click_start_thresh {
            if !self.state.left_clicked {
                self.state.left_clicked = true;
                debug!("Left down (pinch {:.3})", pinch);
                actions.push(PointerAction::MouseDown);
            }
        } else if pinch > self.config.click_stop_thresh && self.state.left_clicked {
            self.state.left_clicked = false;
            debug!("Left up (pinch {:.3})", pinch);
            actions.push(PointerAction::MouseUp);
        }
    }

    /// Middle-thumb pinch: one right click per crossing.
    fn update_right_click(&mut self, pinch: f32, actions: &mut Vec<PointerAction>) {
        if pinch < self.config.click_start_thresh {
            if !self.state.right_clicked {
                self.state.right_clicked = true;
                debug!("Right click (pinch {:.3})", pinch);
                actions.push(PointerAction::RightClick);
            }
        } else if pinch > self.config.click_stop_thresh {
            self.state.right_clicked = false;
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
