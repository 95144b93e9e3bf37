/// Platform-agnostic input handling system
use std::collections::HashSet;
use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::controller::gamepad::{GamepadSource, NoGamepad};
use crate::controller::physics::MotionIntent;
use crate::error::CursorWarpError;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(KeyCode),
    KeyUp(KeyCode),

    // Mouse events
    /// Raw device motion, independent of the cursor
    MouseMove { dx: f32, dy: f32 },
    /// Cursor position inside the window, in physical pixels
    CursorMoved { x: f64, y: f64 },
    MouseClick,

    // Window events
    FocusLost,
    FocusGained,
    Resized { width: u32, height: u32 },
}

/// Everything the simulation needs from the devices for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Camera-relative, unit length or zero. +Z forward, +X left.
    pub movement: Vec3,
    /// +1 grow, -1 shrink, 0 hold
    pub scale_delta: f32,
    pub jump: bool,
    /// Mouse delta in pixels
    pub look_delta: (f32, f32),
    pub exit_requested: bool,
}

impl InputSnapshot {
    pub fn motion_intent(&self) -> MotionIntent {
        MotionIntent {
            movement: self.movement,
            scale_delta: self.scale_delta,
            jump: self.jump,
        }
    }
}

/// Anything that can produce one input snapshot per tick
pub trait InputSampler {
    fn sample(&mut self) -> InputSnapshot;
}

/// Moves the OS pointer, implemented by the window
pub trait CursorWarp {
    fn warp_to(&self, x: f64, y: f64) -> Result<(), CursorWarpError>;
}

impl CursorWarp for winit::window::Window {
    fn warp_to(&self, x: f64, y: f64) -> Result<(), CursorWarpError> {
        self.set_cursor_position(winit::dpi::PhysicalPosition::new(x, y))
            .map_err(|e| CursorWarpError(e.to_string()))
    }
}

impl<T: CursorWarp + ?Sized> CursorWarp for std::sync::Arc<T> {
    fn warp_to(&self, x: f64, y: f64) -> Result<(), CursorWarpError> {
        (**self).warp_to(x, y)
    }
}

/// Unified input state, fed by events between ticks
pub struct InputState {
    pub pressed_keys: HashSet<KeyCode>,
    /// Accumulated raw device motion since the last sample
    pub look_delta: (f32, f32),
    pub cursor_pos: Option<(f64, f64)>,
    pub pointer_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            look_delta: (0.0, 0.0),
            cursor_pos: None,
            pointer_captured: false,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(*key);
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key);
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_captured {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::CursorMoved { x, y } => {
                self.cursor_pos = Some((*x, *y));
            }
            InputEvent::MouseClick | InputEvent::FocusGained => {
                self.pointer_captured = true;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
                self.look_delta = (0.0, 0.0);
                self.pointer_captured = false;
            }
            InputEvent::Resized { .. } => {}
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub grow: KeyCode,
    pub shrink: KeyCode,
    pub jump: KeyCode,
    pub exit: KeyCode,
    pub toggle_overlay: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            grow: KeyCode::KeyE,
            shrink: KeyCode::KeyQ,
            jump: KeyCode::Space,
            exit: KeyCode::Escape,
            toggle_overlay: KeyCode::F3,
        }
    }
}

/// High-level input processor
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.forward) || input.is_key_pressed(KeyCode::ArrowUp)
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.backward) || input.is_key_pressed(KeyCode::ArrowDown)
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.left) || input.is_key_pressed(KeyCode::ArrowLeft)
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.right) || input.is_key_pressed(KeyCode::ArrowRight)
    }

    pub fn is_jumping(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.jump)
    }

    pub fn wants_exit(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.exit)
    }

    pub fn wants_to_toggle_overlay(&self, key: KeyCode) -> bool {
        key == self.bindings.toggle_overlay
    }

    /// Camera-relative movement direction, normalized
    pub fn movement(&self, input: &InputState) -> Vec3 {
        let mut movement = Vec3::ZERO;
        if self.is_moving_forward(input) {
            movement += Vec3::Z;
        }
        if self.is_moving_backward(input) {
            movement -= Vec3::Z;
        }
        if self.is_moving_left(input) {
            movement += Vec3::X;
        }
        if self.is_moving_right(input) {
            movement -= Vec3::X;
        }
        movement.normalize_or_zero()
    }

    /// Holding both scale keys cancels out
    pub fn scale_delta(&self, input: &InputState) -> f32 {
        let mut delta = 0.0;
        if input.is_key_pressed(self.bindings.grow) {
            delta += 1.0;
        }
        if input.is_key_pressed(self.bindings.shrink) {
            delta -= 1.0;
        }
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookMode {
    /// Delta from the viewport center, pointer re-centered after every sample
    CenterWarp,
    /// Platform can't warp the pointer, use raw device motion instead
    RawMotion,
}

/// Keyboard + mouse (+ optional gamepad) sampler backed by real window events
pub struct DeviceSampler<W: CursorWarp> {
    state: InputState,
    processor: InputProcessor,
    cursor: W,
    gamepad: Box<dyn GamepadSource>,
    viewport: (u32, u32),
    look_mode: LookMode,
    skip_next_look: bool,
}

impl<W: CursorWarp> DeviceSampler<W> {
    pub fn new(cursor: W, width: u32, height: u32) -> Self {
        Self {
            state: InputState::new(),
            processor: InputProcessor::default(),
            cursor,
            gamepad: Box::new(NoGamepad),
            viewport: (width, height),
            look_mode: LookMode::CenterWarp,
            skip_next_look: true,
        }
    }

    pub fn with_gamepad(mut self, gamepad: Box<dyn GamepadSource>) -> Self {
        self.gamepad = gamepad;
        self
    }

    pub fn with_processor(mut self, processor: InputProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn processor(&self) -> &InputProcessor {
        &self.processor
    }

    pub fn pointer_captured(&self) -> bool {
        self.state.pointer_captured
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        let was_captured = self.state.pointer_captured;
        self.state.process_event(event);

        match event {
            InputEvent::Resized { width, height } => {
                self.viewport = (*width, *height);
                self.skip_next_look = true;
            }
            _ if !was_captured && self.state.pointer_captured => {
                // wherever the pointer was before capture is not a look gesture
                self.skip_next_look = true;
            }
            _ => {}
        }
    }

    /// Whole-pixel center; the OS reports the pointer on integer pixels
    pub fn viewport_center(&self) -> (f64, f64) {
        ((self.viewport.0 / 2) as f64, (self.viewport.1 / 2) as f64)
    }

    fn take_look_delta(&mut self) -> (f32, f32) {
        let raw = self.state.consume_look();
        if !self.state.pointer_captured {
            return (0.0, 0.0);
        }
        if std::mem::take(&mut self.skip_next_look) {
            return (0.0, 0.0);
        }

        match self.look_mode {
            LookMode::RawMotion => raw,
            LookMode::CenterWarp => match self.state.cursor_pos {
                Some((x, y)) => {
                    let (cx, cy) = self.viewport_center();
                    ((x - cx) as f32, (y - cy) as f32)
                }
                None => (0.0, 0.0),
            },
        }
    }

    fn recenter(&mut self) {
        if !self.state.pointer_captured || self.look_mode != LookMode::CenterWarp {
            return;
        }

        let (cx, cy) = self.viewport_center();
        match self.cursor.warp_to(cx, cy) {
            Ok(()) => self.state.cursor_pos = Some((cx, cy)),
            Err(e) => {
                tracing::warn!("{e}, falling back to raw mouse motion");
                self.look_mode = LookMode::RawMotion;
            }
        }
    }
}

impl<W: CursorWarp> InputSampler for DeviceSampler<W> {
    fn sample(&mut self) -> InputSnapshot {
        let gamepad_exit = self.gamepad.poll().is_some_and(|pad| pad.back);
        let look_delta = self.take_look_delta();

        let snapshot = InputSnapshot {
            movement: self.processor.movement(&self.state),
            scale_delta: self.processor.scale_delta(&self.state),
            jump: self.processor.is_jumping(&self.state),
            look_delta,
            exit_requested: gamepad_exit || self.processor.wants_exit(&self.state),
        };

        self.recenter();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::gamepad::GamepadState;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingCursor {
        warps: Rc<RefCell<Vec<(f64, f64)>>>,
        broken: bool,
    }

    impl CursorWarp for RecordingCursor {
        fn warp_to(&self, x: f64, y: f64) -> Result<(), CursorWarpError> {
            if self.broken {
                return Err(CursorWarpError("not supported".into()));
            }
            self.warps.borrow_mut().push((x, y));
            Ok(())
        }
    }

    struct BackPressed;

    impl GamepadSource for BackPressed {
        fn poll(&mut self) -> Option<GamepadState> {
            Some(GamepadState { back: true })
        }
    }

    fn captured_sampler(cursor: RecordingCursor) -> DeviceSampler<RecordingCursor> {
        let mut sampler = DeviceSampler::new(cursor, 800, 600);
        sampler.process_event(&InputEvent::FocusGained);
        // first sample after capture only re-centers
        sampler.sample();
        sampler
    }

    #[test]
    fn no_keys_gives_idle_snapshot() {
        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600);
        assert_eq!(sampler.sample(), InputSnapshot::default());
    }

    #[test]
    fn diagonal_movement_is_unit_length() {
        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600);
        sampler.process_event(&InputEvent::KeyDown(KeyCode::KeyW));
        sampler.process_event(&InputEvent::KeyDown(KeyCode::KeyA));

        let snap = sampler.sample();
        assert!((snap.movement.length() - 1.0).abs() < 1e-6);
        assert!(snap.movement.x > 0.0 && snap.movement.z > 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600);
        for key in [KeyCode::KeyW, KeyCode::KeyS, KeyCode::KeyE, KeyCode::KeyQ] {
            sampler.process_event(&InputEvent::KeyDown(key));
        }

        let snap = sampler.sample();
        assert_eq!(snap.movement, Vec3::ZERO);
        assert_eq!(snap.scale_delta, 0.0);
    }

    #[test]
    fn scale_and_jump_keys() {
        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600);
        sampler.process_event(&InputEvent::KeyDown(KeyCode::KeyQ));
        sampler.process_event(&InputEvent::KeyDown(KeyCode::Space));

        let snap = sampler.sample();
        assert_eq!(snap.scale_delta, -1.0);
        assert!(snap.jump);

        sampler.process_event(&InputEvent::KeyUp(KeyCode::Space));
        assert!(!sampler.sample().jump);
    }

    #[test]
    fn look_delta_is_relative_to_center_and_recenters() {
        let cursor = RecordingCursor::default();
        let warps = cursor.warps.clone();
        let mut sampler = captured_sampler(cursor);

        sampler.process_event(&InputEvent::CursorMoved { x: 410.0, y: 295.0 });
        let snap = sampler.sample();

        assert_eq!(snap.look_delta, (10.0, -5.0));
        assert_eq!(warps.borrow().last(), Some(&(400.0, 300.0)));

        // nothing moved since the warp
        assert_eq!(sampler.sample().look_delta, (0.0, 0.0));
    }

    #[test]
    fn no_look_without_capture() {
        let cursor = RecordingCursor::default();
        let warps = cursor.warps.clone();
        let mut sampler = DeviceSampler::new(cursor, 800, 600);

        sampler.process_event(&InputEvent::CursorMoved { x: 10.0, y: 10.0 });
        sampler.process_event(&InputEvent::MouseMove { dx: 5.0, dy: 5.0 });

        assert_eq!(sampler.sample().look_delta, (0.0, 0.0));
        assert!(warps.borrow().is_empty());
    }

    #[test]
    fn broken_warp_falls_back_to_raw_motion() {
        let cursor = RecordingCursor { broken: true, ..Default::default() };
        let mut sampler = captured_sampler(cursor);

        sampler.process_event(&InputEvent::MouseMove { dx: 3.0, dy: 4.0 });
        sampler.process_event(&InputEvent::MouseMove { dx: 1.0, dy: -1.0 });
        assert_eq!(sampler.sample().look_delta, (4.0, 3.0));
    }

    #[test]
    fn focus_loss_clears_keys_and_capture() {
        let mut sampler = captured_sampler(RecordingCursor::default());
        sampler.process_event(&InputEvent::KeyDown(KeyCode::KeyD));
        sampler.process_event(&InputEvent::FocusLost);

        let snap = sampler.sample();
        assert_eq!(snap.movement, Vec3::ZERO);
        assert!(!sampler.pointer_captured());
    }

    #[test]
    fn resize_moves_the_center() {
        let cursor = RecordingCursor::default();
        let warps = cursor.warps.clone();
        let mut sampler = captured_sampler(cursor);

        sampler.process_event(&InputEvent::Resized { width: 1000, height: 400 });
        sampler.sample();
        assert_eq!(warps.borrow().last(), Some(&(500.0, 200.0)));
    }

    #[test]
    fn odd_viewport_stays_still_when_idle() {
        let cursor = RecordingCursor::default();
        let warps = cursor.warps.clone();
        let mut sampler = DeviceSampler::new(cursor, 801, 601);
        sampler.process_event(&InputEvent::FocusGained);
        sampler.sample();
        assert_eq!(warps.borrow().last(), Some(&(400.0, 300.0)));

        let mut yaw_px = 0.0;
        for _ in 0..60 {
            // pointer lands where the warp put it
            let (x, y) = *warps.borrow().last().unwrap();
            sampler.process_event(&InputEvent::CursorMoved { x: x.round(), y: y.round() });
            yaw_px += sampler.sample().look_delta.0;
        }
        assert_eq!(yaw_px, 0.0);
    }

    #[test]
    fn exit_from_keyboard_or_gamepad() {
        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600);
        sampler.process_event(&InputEvent::KeyDown(KeyCode::Escape));
        assert!(sampler.sample().exit_requested);

        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600)
            .with_gamepad(Box::new(BackPressed));
        assert!(sampler.sample().exit_requested);
    }

    #[test]
    fn custom_bindings() {
        let bindings = KeyBindings { jump: KeyCode::KeyJ, ..KeyBindings::default() };
        let mut sampler = DeviceSampler::new(RecordingCursor::default(), 800, 600)
            .with_processor(InputProcessor::new(bindings));

        sampler.process_event(&InputEvent::KeyDown(KeyCode::Space));
        assert!(!sampler.sample().jump);
        sampler.process_event(&InputEvent::KeyDown(KeyCode::KeyJ));
        assert!(sampler.sample().jump);
    }
}
