//! Optional gamepad polling. Only the "back" button is mapped (exit).
//!
//! Any failure to find or read a controller reads as "no gamepad" and is never fatal.

/// Buttons the demo cares about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadState {
    pub back: bool,
}

pub trait GamepadSource {
    /// Current state, `None` when no controller is attached
    fn poll(&mut self) -> Option<GamepadState>;
}

/// Used when built without gamepad support or when the backend failed to start
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepad;

impl GamepadSource for NoGamepad {
    fn poll(&mut self) -> Option<GamepadState> {
        None
    }
}

/// Best available source for this build
pub fn default_source() -> Box<dyn GamepadSource> {
    #[cfg(feature = "gamepad")]
    {
        match sdl::SdlGamepad::new() {
            Ok(pad) => return Box::new(pad),
            Err(e) => tracing::warn!("gamepad support unavailable: {e}"),
        }
    }
    Box::new(NoGamepad)
}

#[cfg(feature = "gamepad")]
pub mod sdl {
    use super::{GamepadSource, GamepadState};
    use sdl2::controller::{Button, GameController};
    use sdl2::GameControllerSubsystem;

    /// First attached SDL game controller, reconnected on hot-plug
    pub struct SdlGamepad {
        _sdl: sdl2::Sdl,
        subsystem: GameControllerSubsystem,
        controller: Option<GameController>,
    }

    impl SdlGamepad {
        pub fn new() -> Result<Self, String> {
            let sdl = sdl2::init()?;
            let subsystem = sdl.game_controller()?;
            let controller = find_controller(&subsystem);

            match &controller {
                Some(c) => tracing::info!("gamepad connected: {}", c.name()),
                None => tracing::info!("no gamepad connected"),
            }

            Ok(Self { _sdl: sdl, subsystem, controller })
        }
    }

    fn find_controller(subsystem: &GameControllerSubsystem) -> Option<GameController> {
        let count = subsystem.num_joysticks().ok()?;
        (0..count)
            .filter(|&i| subsystem.is_game_controller(i))
            .find_map(|i| subsystem.open(i).ok())
    }

    impl GamepadSource for SdlGamepad {
        fn poll(&mut self) -> Option<GamepadState> {
            self.subsystem.update();

            if self.controller.as_ref().is_some_and(|c| !c.attached()) {
                tracing::info!("gamepad disconnected");
                self.controller = None;
            }
            if self.controller.is_none() {
                self.controller = find_controller(&self.subsystem);
                if let Some(c) = &self.controller {
                    tracing::info!("gamepad connected: {}", c.name());
                }
            }

            self.controller.as_ref().map(|c| GamepadState {
                back: c.button(Button::Back),
            })
        }
    }
}
