//! Input abstraction
//!
//! Turns raw device snapshots into a uniform per-player intent plus
//! edge-triggered actions. Knows nothing about the simulation beyond the
//! bindings and menu stage it is handed each frame.
//!
//! Keyboard layout by slot:
//!   Slot 0  →  WASD, boost Left Shift (Space in single-player)
//!   Slot 1  →  Arrows, boost Right Shift
//!   Shared  →  Escape pause, Enter/Space confirm, Q quit to menu
//!
//! Gamepad (standard mapping):
//!   Left stick  →  Movement
//!   West  (2)   →  Boost
//!   East  (1)   →  Pause / resume
//!   South (0)   →  Confirm / restart
//!   Back  (8)   →  Quit to menu

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_to_unit;
use crate::consts::MAX_PLAYERS;
use crate::sim::MenuStage;

/// Radial stick deadzone
pub const STICK_DEADZONE: f32 = 0.15;
/// Stick deflection that counts as "activity" when picking devices
pub const STICK_ACTIVITY_THRESHOLD: f32 = 0.5;

pub const BUTTON_SOUTH: usize = 0;
pub const BUTTON_EAST: usize = 1;
pub const BUTTON_WEST: usize = 2;
pub const BUTTON_BACK: usize = 8;
pub const GAMEPAD_BUTTONS: usize = 17;
pub const GAMEPAD_AXES: usize = 4;

/// Which device drives a player slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputBinding {
    #[default]
    None,
    Keyboard,
    Gamepad(usize),
}

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Space,
    Enter,
    Escape,
    Q,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` string
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "KeyW" => Some(Key::W),
            "KeyA" => Some(Key::A),
            "KeyS" => Some(Key::S),
            "KeyD" => Some(Key::D),
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ShiftLeft" => Some(Key::ShiftLeft),
            "ShiftRight" => Some(Key::ShiftRight),
            "Space" => Some(Key::Space),
            "Enter" => Some(Key::Enter),
            "Escape" => Some(Key::Escape),
            "KeyQ" => Some(Key::Q),
            _ => None,
        }
    }
}

/// Held keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pub w: bool,
    pub a: bool,
    pub s: bool,
    pub d: bool,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shift_left: bool,
    pub shift_right: bool,
    pub space: bool,
    pub enter: bool,
    pub escape: bool,
    pub q: bool,
}

impl KeyboardState {
    pub fn set(&mut self, key: Key, pressed: bool) {
        let slot = match key {
            Key::W => &mut self.w,
            Key::A => &mut self.a,
            Key::S => &mut self.s,
            Key::D => &mut self.d,
            Key::Up => &mut self.up,
            Key::Down => &mut self.down,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::ShiftLeft => &mut self.shift_left,
            Key::ShiftRight => &mut self.shift_right,
            Key::Space => &mut self.space,
            Key::Enter => &mut self.enter,
            Key::Escape => &mut self.escape,
            Key::Q => &mut self.q,
        };
        *slot = pressed;
    }

    pub fn is_down(&self, key: Key) -> bool {
        match key {
            Key::W => self.w,
            Key::A => self.a,
            Key::S => self.s,
            Key::D => self.d,
            Key::Up => self.up,
            Key::Down => self.down,
            Key::Left => self.left,
            Key::Right => self.right,
            Key::ShiftLeft => self.shift_left,
            Key::ShiftRight => self.shift_right,
            Key::Space => self.space,
            Key::Enter => self.enter,
            Key::Escape => self.escape,
            Key::Q => self.q,
        }
    }

    /// Movement keys for a slot as (left, right, up, down)
    fn movement_keys(slot: usize) -> [Key; 4] {
        if slot == 0 {
            [Key::A, Key::D, Key::W, Key::S]
        } else {
            [Key::Left, Key::Right, Key::Up, Key::Down]
        }
    }

    /// Unit-clamped movement vector for a slot's layout (y grows downward)
    pub fn movement(&self, slot: usize) -> Vec2 {
        let [left, right, up, down] = Self::movement_keys(slot);
        let axis = |neg: Key, pos: Key| -> f32 {
            (self.is_down(pos) as i8 - self.is_down(neg) as i8) as f32
        };
        clamp_to_unit(Vec2::new(axis(left, right), axis(up, down)))
    }

    pub fn boost(&self, slot: usize, single_player: bool) -> bool {
        match slot {
            0 if single_player => self.space,
            0 => self.shift_left,
            _ => self.shift_right,
        }
    }
}

/// One gamepad's raw state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadState {
    pub axes: [f32; GAMEPAD_AXES],
    pub buttons: [bool; GAMEPAD_BUTTONS],
}

impl Default for GamepadState {
    fn default() -> Self {
        Self {
            axes: [0.0; GAMEPAD_AXES],
            buttons: [false; GAMEPAD_BUTTONS],
        }
    }
}

impl GamepadState {
    pub fn pressed(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    pub fn stick(&self) -> Vec2 {
        Vec2::new(self.axes[0], self.axes[1])
    }

    /// Left stick with the radial deadzone applied
    pub fn movement(&self) -> Vec2 {
        radial_deadzone(self.stick(), STICK_DEADZONE)
    }

    /// Any button held or the stick pushed well past the deadzone
    pub fn has_activity(&self) -> bool {
        self.buttons.iter().any(|&b| b)
            || self.axes[0].abs() > STICK_ACTIVITY_THRESHOLD
            || self.axes[1].abs() > STICK_ACTIVITY_THRESHOLD
    }
}

/// Radial deadzone with the live range rescaled to [0, 1], so output ramps
/// up from zero at the deadzone edge instead of jumping.
pub fn radial_deadzone(raw: Vec2, deadzone: f32) -> Vec2 {
    let magnitude = raw.length();
    if magnitude < deadzone || magnitude <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let scaled = ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0);
    raw / magnitude * scaled
}

/// Everything the devices report for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub keyboard: KeyboardState,
    /// Indexed by gamepad slot; `None` for an empty/disconnected slot
    pub gamepads: Vec<Option<GamepadState>>,
}

impl DeviceSnapshot {
    pub fn gamepad(&self, index: usize) -> Option<&GamepadState> {
        self.gamepads.get(index).and_then(|g| g.as_ref())
    }
}

/// Continuous per-player intent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Movement direction, length <= 1
    pub move_dir: Vec2,
    pub boost: bool,
}

/// Edge-triggered actions (true only on the press frame)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub pause_toggle: bool,
    pub quit_to_menu: bool,
    pub confirm: bool,
}

impl Actions {
    fn merge(self, other: Actions) -> Actions {
        Actions {
            pause_toggle: self.pause_toggle || other.pause_toggle,
            quit_to_menu: self.quit_to_menu || other.quit_to_menu,
            confirm: self.confirm || other.confirm,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub intent: PlayerIntent,
    pub actions: Actions,
    /// The bound gamepad is missing from the snapshot (held every frame
    /// until it returns)
    pub disconnected: bool,
}

/// Device choice made on the select-input menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuClaim {
    Bind(InputBinding),
    /// Player 2 opts out (single-player)
    Skip,
}

/// Resolved input for one simulation step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub players: [PlayerInput; MAX_PLAYERS],
    /// Shared keyboard actions plus confirms from unbound gamepads;
    /// a universal pause toggle may resume anyone's pause
    pub universal: Actions,
    pub menu_claim: Option<MenuClaim>,
}

impl FrameInput {
    /// Any player or the universal trigger confirmed
    pub fn any_confirm(&self) -> bool {
        self.universal.confirm || self.players.iter().any(|p| p.actions.confirm)
    }

    pub fn any_quit(&self) -> bool {
        self.universal.quit_to_menu || self.players.iter().any(|p| p.actions.quit_to_menu)
    }
}

/// What the resolver needs from the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputContext {
    pub bindings: [InputBinding; MAX_PLAYERS],
    pub single_player: bool,
    /// Some while on the select-input menu
    pub menu_stage: Option<MenuStage>,
}

/// Keeps last frame's device state for edge detection.
///
/// Call `resolve` exactly once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    prev_keyboard: KeyboardState,
    prev_gamepads: Vec<Option<GamepadState>>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_pressed(&self, now: &KeyboardState, key: Key) -> bool {
        now.is_down(key) && !self.prev_keyboard.is_down(key)
    }

    fn prev_pad(&self, index: usize) -> Option<&GamepadState> {
        self.prev_gamepads.get(index).and_then(|g| g.as_ref())
    }

    fn button_pressed(&self, snap: &DeviceSnapshot, index: usize, button: usize) -> bool {
        let now = snap.gamepad(index).is_some_and(|g| g.pressed(button));
        let before = self.prev_pad(index).is_some_and(|g| g.pressed(button));
        now && !before
    }

    /// Activity that started this frame on a gamepad
    fn pad_activity_started(&self, snap: &DeviceSnapshot, index: usize) -> bool {
        let now = snap.gamepad(index).is_some_and(|g| g.has_activity());
        let before = self.prev_pad(index).is_some_and(|g| g.has_activity());
        now && !before
    }

    fn pad_actions(&self, snap: &DeviceSnapshot, index: usize) -> Actions {
        Actions {
            pause_toggle: self.button_pressed(snap, index, BUTTON_EAST),
            quit_to_menu: self.button_pressed(snap, index, BUTTON_BACK),
            confirm: self.button_pressed(snap, index, BUTTON_SOUTH),
        }
    }

    fn menu_claim(&self, snap: &DeviceSnapshot, ctx: &InputContext) -> Option<MenuClaim> {
        let stage = ctx.menu_stage?;
        let kb = &snap.keyboard;
        match stage {
            MenuStage::AwaitingFirst => {
                let wasd = [Key::W, Key::A, Key::S, Key::D];
                if wasd.iter().any(|&k| self.key_pressed(kb, k)) {
                    return Some(MenuClaim::Bind(InputBinding::Keyboard));
                }
                (0..snap.gamepads.len())
                    .find(|&i| self.pad_activity_started(snap, i))
                    .map(|i| MenuClaim::Bind(InputBinding::Gamepad(i)))
            }
            MenuStage::AwaitingSecond => {
                let arrows = [Key::Up, Key::Down, Key::Left, Key::Right];
                if arrows.iter().any(|&k| self.key_pressed(kb, k)) {
                    return Some(MenuClaim::Bind(InputBinding::Keyboard));
                }
                let taken = ctx.bindings[0];
                if let Some(i) = (0..snap.gamepads.len()).find(|&i| {
                    taken != InputBinding::Gamepad(i) && self.pad_activity_started(snap, i)
                }) {
                    return Some(MenuClaim::Bind(InputBinding::Gamepad(i)));
                }
                if self.key_pressed(kb, Key::Enter) || self.key_pressed(kb, Key::Space) {
                    return Some(MenuClaim::Skip);
                }
                None
            }
            MenuStage::Ready => None,
        }
    }

    /// Resolve this frame's devices into intents and actions
    pub fn resolve(&mut self, snap: &DeviceSnapshot, ctx: &InputContext) -> FrameInput {
        let kb = &snap.keyboard;
        let mut frame = FrameInput {
            universal: Actions {
                pause_toggle: self.key_pressed(kb, Key::Escape),
                quit_to_menu: self.key_pressed(kb, Key::Q),
                confirm: self.key_pressed(kb, Key::Enter) || self.key_pressed(kb, Key::Space),
            },
            menu_claim: self.menu_claim(snap, ctx),
            ..Default::default()
        };

        for (slot, binding) in ctx.bindings.iter().enumerate() {
            let input = &mut frame.players[slot];
            match *binding {
                InputBinding::None => {}
                InputBinding::Keyboard => {
                    input.intent = PlayerIntent {
                        move_dir: kb.movement(slot),
                        boost: kb.boost(slot, ctx.single_player),
                    };
                }
                InputBinding::Gamepad(index) => match snap.gamepad(index) {
                    Some(pad) => {
                        input.intent = PlayerIntent {
                            move_dir: pad.movement(),
                            boost: pad.pressed(BUTTON_WEST),
                        };
                        input.actions = self.pad_actions(snap, index);
                    }
                    None => input.disconnected = true,
                },
            }
        }

        // Gamepads nobody is bound to may still confirm (restart on game over)
        for index in 0..snap.gamepads.len() {
            let bound = ctx.bindings.contains(&InputBinding::Gamepad(index));
            if !bound {
                let confirm = self.button_pressed(snap, index, BUTTON_SOUTH);
                frame.universal = frame.universal.merge(Actions {
                    confirm,
                    ..Default::default()
                });
            }
        }

        self.prev_keyboard = snap.keyboard;
        self.prev_gamepads.clone_from(&snap.gamepads);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(bindings: [InputBinding; 2], single_player: bool) -> InputContext {
        InputContext {
            bindings,
            single_player,
            menu_stage: None,
        }
    }

    fn menu_ctx(stage: MenuStage, first: InputBinding) -> InputContext {
        InputContext {
            bindings: [first, InputBinding::None],
            single_player: false,
            menu_stage: Some(stage),
        }
    }

    fn pad_with_stick(x: f32, y: f32) -> GamepadState {
        let mut pad = GamepadState::default();
        pad.axes[0] = x;
        pad.axes[1] = y;
        pad
    }

    #[test]
    fn test_key_from_code() {
        assert_eq!(Key::from_code("KeyW"), Some(Key::W));
        assert_eq!(Key::from_code("ShiftRight"), Some(Key::ShiftRight));
        assert_eq!(Key::from_code("KeyZ"), None);
    }

    #[test]
    fn test_keyboard_diagonal_normalized() {
        let mut kb = KeyboardState::default();
        kb.set(Key::W, true);
        kb.set(Key::D, true);
        let v = kb.movement(0);
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!(v.x > 0.0 && v.y < 0.0);
        // Slot 1 ignores WASD
        assert_eq!(kb.movement(1), Vec2::ZERO);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut kb = KeyboardState::default();
        kb.set(Key::Left, true);
        kb.set(Key::Right, true);
        assert_eq!(kb.movement(1), Vec2::ZERO);
    }

    #[test]
    fn test_boost_key_depends_on_mode() {
        let mut kb = KeyboardState::default();
        kb.set(Key::Space, true);
        assert!(kb.boost(0, true));
        assert!(!kb.boost(0, false));
        kb.set(Key::ShiftLeft, true);
        assert!(kb.boost(0, false));
        assert!(!kb.boost(1, false));
    }

    #[test]
    fn test_deadzone_zeroes_small_input() {
        assert_eq!(radial_deadzone(Vec2::new(0.1, 0.05), STICK_DEADZONE), Vec2::ZERO);
        assert_eq!(radial_deadzone(Vec2::ZERO, STICK_DEADZONE), Vec2::ZERO);
    }

    #[test]
    fn test_deadzone_ramps_smoothly() {
        let just_past = radial_deadzone(Vec2::new(0.16, 0.0), STICK_DEADZONE);
        assert!(just_past.x > 0.0 && just_past.x < 0.02);

        let full = radial_deadzone(Vec2::new(1.0, 0.0), STICK_DEADZONE);
        assert!((full.x - 1.0).abs() < 1e-6);

        // Corners of a square stick range stay at unit length
        let corner = radial_deadzone(Vec2::new(1.0, 1.0), STICK_DEADZONE);
        assert!((corner.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pause_is_edge_triggered() {
        let mut tracker = InputTracker::new();
        let mut snap = DeviceSnapshot::default();
        let c = ctx([InputBinding::Keyboard, InputBinding::None], true);

        snap.keyboard.escape = true;
        assert!(tracker.resolve(&snap, &c).universal.pause_toggle);
        assert!(!tracker.resolve(&snap, &c).universal.pause_toggle);
        snap.keyboard.escape = false;
        assert!(!tracker.resolve(&snap, &c).universal.pause_toggle);
        snap.keyboard.escape = true;
        assert!(tracker.resolve(&snap, &c).universal.pause_toggle);
    }

    #[test]
    fn test_gamepad_intent_and_actions() {
        let mut tracker = InputTracker::new();
        let mut pad = pad_with_stick(0.0, 1.0);
        pad.buttons[BUTTON_WEST] = true;
        pad.buttons[BUTTON_EAST] = true;
        let snap = DeviceSnapshot {
            gamepads: vec![None, Some(pad)],
            ..Default::default()
        };
        let c = ctx([InputBinding::Gamepad(1), InputBinding::None], true);
        let frame = tracker.resolve(&snap, &c);
        let p = frame.players[0];
        assert!(p.intent.boost);
        assert!((p.intent.move_dir.y - 1.0).abs() < 1e-6);
        assert!(p.actions.pause_toggle);
        assert!(!p.disconnected);

        // Still held: no new edge
        let frame = tracker.resolve(&snap, &c);
        assert!(!frame.players[0].actions.pause_toggle);
    }

    #[test]
    fn test_gamepad_disconnect_is_level_signal() {
        let mut tracker = InputTracker::new();
        let c = ctx([InputBinding::Keyboard, InputBinding::Gamepad(0)], false);
        let connected = DeviceSnapshot {
            gamepads: vec![Some(GamepadState::default())],
            ..Default::default()
        };
        let gone = DeviceSnapshot {
            gamepads: vec![None],
            ..Default::default()
        };
        assert!(!tracker.resolve(&connected, &c).players[1].disconnected);
        assert!(tracker.resolve(&gone, &c).players[1].disconnected);
        // Stays reported while the pad is away
        assert!(tracker.resolve(&gone, &c).players[1].disconnected);
        // A pad that was never present counts too
        let mut fresh = InputTracker::new();
        let empty = DeviceSnapshot::default();
        assert!(fresh.resolve(&empty, &c).players[1].disconnected);
        assert!(!fresh.resolve(&empty, &c).players[0].disconnected);
        assert!(!tracker.resolve(&connected, &c).players[1].disconnected);
    }

    #[test]
    fn test_menu_first_claim_keyboard_or_gamepad() {
        let mut tracker = InputTracker::new();
        let c = menu_ctx(MenuStage::AwaitingFirst, InputBinding::None);
        let mut snap = DeviceSnapshot::default();
        snap.keyboard.a = true;
        assert_eq!(
            tracker.resolve(&snap, &c).menu_claim,
            Some(MenuClaim::Bind(InputBinding::Keyboard))
        );

        let mut tracker = InputTracker::new();
        let snap = DeviceSnapshot {
            gamepads: vec![None, Some(pad_with_stick(0.8, 0.0))],
            ..Default::default()
        };
        assert_eq!(
            tracker.resolve(&snap, &c).menu_claim,
            Some(MenuClaim::Bind(InputBinding::Gamepad(1)))
        );
    }

    #[test]
    fn test_menu_first_stage_ignores_arrows_and_skip() {
        let mut tracker = InputTracker::new();
        let c = menu_ctx(MenuStage::AwaitingFirst, InputBinding::None);
        let mut snap = DeviceSnapshot::default();
        snap.keyboard.up = true;
        snap.keyboard.enter = true;
        assert_eq!(tracker.resolve(&snap, &c).menu_claim, None);
    }

    #[test]
    fn test_menu_second_claim_excludes_first_gamepad() {
        let mut tracker = InputTracker::new();
        let c = menu_ctx(MenuStage::AwaitingSecond, InputBinding::Gamepad(0));
        let mut pad = GamepadState::default();
        pad.buttons[BUTTON_SOUTH] = true;
        let snap = DeviceSnapshot {
            gamepads: vec![Some(pad), None],
            ..Default::default()
        };
        assert_eq!(tracker.resolve(&snap, &c).menu_claim, None);

        let mut tracker = InputTracker::new();
        let snap = DeviceSnapshot {
            gamepads: vec![Some(pad), Some(pad)],
            ..Default::default()
        };
        assert_eq!(
            tracker.resolve(&snap, &c).menu_claim,
            Some(MenuClaim::Bind(InputBinding::Gamepad(1)))
        );
    }

    #[test]
    fn test_menu_second_skip() {
        let mut tracker = InputTracker::new();
        let c = menu_ctx(MenuStage::AwaitingSecond, InputBinding::Keyboard);
        let mut snap = DeviceSnapshot::default();
        snap.keyboard.space = true;
        assert_eq!(tracker.resolve(&snap, &c).menu_claim, Some(MenuClaim::Skip));
    }

    #[test]
    fn test_unbound_gamepad_confirms_universally() {
        let mut tracker = InputTracker::new();
        let c = ctx([InputBinding::Keyboard, InputBinding::None], true);
        let mut pad = GamepadState::default();
        pad.buttons[BUTTON_SOUTH] = true;
        let snap = DeviceSnapshot {
            gamepads: vec![Some(pad)],
            ..Default::default()
        };
        let frame = tracker.resolve(&snap, &c);
        assert!(frame.universal.confirm);
        assert!(frame.any_confirm());
    }

    proptest! {
        #[test]
        fn prop_gamepad_vector_within_unit(x in -1.0f32..=1.0, y in -1.0f32..=1.0) {
            let v = pad_with_stick(x, y).movement();
            prop_assert!(v.length() <= 1.0 + 1e-5);
        }

        #[test]
        fn prop_keyboard_vector_within_unit(bits in 0u8..16) {
            let mut kb = KeyboardState::default();
            kb.w = bits & 1 != 0;
            kb.a = bits & 2 != 0;
            kb.s = bits & 4 != 0;
            kb.d = bits & 8 != 0;
            prop_assert!(kb.movement(0).length() <= 1.0 + 1e-6);
        }
    }
}
