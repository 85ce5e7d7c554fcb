//! Session lifecycle
//!
//! Menu (device select) -> Playing <-> Paused -> GameOver, plus the resets
//! each transition performs. `SessionStats::phase` is the only record of
//! the current state; the pause owner lives inside it.

use super::event::{DeathCause, GameEvent};
use super::state::{MenuStage, SessionPhase, SessionStats, SimulationState};
use crate::consts::MAX_PLAYERS;
use crate::input::{FrameInput, InputBinding, MenuClaim};

impl SimulationState {
    /// Apply this frame's session-level input. Runs before any entity update.
    ///
    /// Missing gamepads are handled before any transition and again once a
    /// round is live, so a restart cannot revive a player with no device.
    pub(crate) fn handle_session_input(&mut self, input: &FrameInput, now_ms: f64) {
        if self.stats.is_playing() || self.stats.pause_owner().is_some() {
            self.handle_disconnects(input);
        }

        match self.stats.phase {
            SessionPhase::MenuSelectInput(_) => {
                if let Some(claim) = input.menu_claim {
                    self.apply_menu_claim(claim, now_ms);
                }
            }
            SessionPhase::Playing => {
                let requester = (0..MAX_PLAYERS).find(|&slot| {
                    self.players[slot].binding != InputBinding::None
                        && input.players[slot].actions.pause_toggle
                });
                if let Some(owner) = requester {
                    self.pause(owner);
                } else if input.universal.pause_toggle {
                    self.pause(self.keyboard_owner());
                }
            }
            SessionPhase::Paused { owner } => {
                if input.players[owner].actions.pause_toggle || input.universal.pause_toggle {
                    self.resume(now_ms);
                } else if input.any_quit() {
                    self.quit_to_menu();
                }
            }
            SessionPhase::GameOver => {
                if input.any_confirm() {
                    self.restart(now_ms);
                } else if input.any_quit() {
                    self.main_menu();
                }
            }
        }

        if self.stats.is_playing() {
            self.handle_disconnects(input);
        }
    }

    /// A vanished gamepad kills its player
    fn handle_disconnects(&mut self, input: &FrameInput) {
        for slot in 0..MAX_PLAYERS {
            if input.players[slot].disconnected {
                self.kill_player(slot, DeathCause::Disconnected);
            }
        }
    }

    /// Slot credited with a keyboard Escape pause
    fn keyboard_owner(&self) -> usize {
        self.players
            .iter()
            .position(|p| p.binding == InputBinding::Keyboard)
            .unwrap_or(0)
    }

    /// Bind a device (or skip player 2) on the select-input menu.
    ///
    /// Resolving the second slot starts the round immediately.
    pub fn apply_menu_claim(&mut self, claim: MenuClaim, now_ms: f64) {
        let Some(stage) = self.stats.menu_stage() else {
            return;
        };
        match (stage, claim) {
            (MenuStage::AwaitingFirst, MenuClaim::Bind(binding)) if binding != InputBinding::None => {
                self.players[0].binding = binding;
                self.emit(GameEvent::DeviceBound { player: 0, binding });
                log::info!("Player 1 bound to {:?}", binding);
                self.stats.phase = SessionPhase::MenuSelectInput(MenuStage::AwaitingSecond);
            }
            (MenuStage::AwaitingSecond, MenuClaim::Bind(binding)) if binding != InputBinding::None => {
                // One gamepad cannot drive both slots; the keyboard can
                if matches!(binding, InputBinding::Gamepad(_)) && self.players[0].binding == binding {
                    return;
                }
                self.players[1].binding = binding;
                self.stats.single_player = false;
                self.emit(GameEvent::DeviceBound { player: 1, binding });
                log::info!("Player 2 bound to {:?}", binding);
                self.stats.phase = SessionPhase::MenuSelectInput(MenuStage::Ready);
                self.start_round(now_ms);
            }
            (MenuStage::AwaitingSecond, MenuClaim::Skip) => {
                self.players[1].binding = InputBinding::None;
                self.stats.single_player = true;
                self.stats.phase = SessionPhase::MenuSelectInput(MenuStage::Ready);
                self.start_round(now_ms);
            }
            _ => {}
        }
    }

    /// Reset every entity collection and timer and begin play.
    /// Bindings are kept.
    pub fn start_round(&mut self, now_ms: f64) {
        self.obstacles.clear();
        self.collectibles.clear();
        self.popups.clear();
        self.scroll_speed = self.config.obstacles.initial_speed;
        self.gap_size = self.config.obstacles.initial_gap_size;
        self.spawn_accumulator = 0.0;

        for player in self.players.iter_mut() {
            player.reset(&self.config);
        }
        let active = self.players.iter().filter(|p| p.active).count();

        let stats = &mut self.stats;
        stats.active_players = active;
        stats.start_ms = now_ms;
        stats.elapsed_ms = 0.0;
        stats.time = 0;
        stats.last_difficulty_mark = 0;
        stats.final_time = None;
        stats.phase = SessionPhase::Playing;

        self.emit(GameEvent::RoundStarted { players: active });
        log::info!(
            "Round started: {} player(s), {}",
            active,
            if self.stats.single_player { "single-player" } else { "versus" }
        );
    }

    /// Freeze the round on behalf of `owner`
    pub fn pause(&mut self, owner: usize) {
        if !self.stats.is_playing() || owner >= MAX_PLAYERS {
            return;
        }
        self.stats.phase = SessionPhase::Paused { owner };
        self.emit(GameEvent::Paused { owner });
        log::info!("Paused by player {} at {}s", owner + 1, self.stats.time);
    }

    /// Continue from the accumulated elapsed time, not the wall clock
    pub fn resume(&mut self, now_ms: f64) {
        if self.stats.pause_owner().is_none() {
            return;
        }
        self.stats.start_ms = now_ms - self.stats.elapsed_ms;
        self.stats.phase = SessionPhase::Playing;
        // The pause interval must not count as a frame
        self.last_frame_ms = Some(now_ms);
        self.emit(GameEvent::Resumed);
        log::info!("Resumed at {}s", self.stats.time);
    }

    /// Abandon a paused round and go back to device selection
    pub fn quit_to_menu(&mut self) {
        if self.stats.pause_owner().is_some() {
            self.return_to_menu();
        }
    }

    /// Replay with the same bindings
    pub fn restart(&mut self, now_ms: f64) {
        if self.stats.is_game_over() {
            self.start_round(now_ms);
        }
    }

    /// Leave the game-over screen for device selection
    pub fn main_menu(&mut self) {
        if self.stats.is_game_over() {
            self.return_to_menu();
        }
    }

    /// Fresh menu state: no entities, no bindings. The high score survives.
    fn return_to_menu(&mut self) {
        self.obstacles.clear();
        self.collectibles.clear();
        self.popups.clear();
        self.scroll_speed = self.config.obstacles.initial_speed;
        self.gap_size = self.config.obstacles.initial_gap_size;
        self.spawn_accumulator = 0.0;
        for player in self.players.iter_mut() {
            player.binding = InputBinding::None;
            player.reset(&self.config);
        }
        self.stats = SessionStats {
            high_score: self.stats.high_score,
            ..SessionStats::default()
        };
        self.emit(GameEvent::ReturnedToMenu);
        log::info!("Returned to menu");
    }

    /// Deactivate a player. Killing an inactive player does nothing.
    pub fn kill_player(&mut self, slot: usize, cause: DeathCause) {
        let Some(player) = self.players.get_mut(slot) else {
            return;
        };
        if !player.active {
            return;
        }
        player.active = false;
        player.boosting = false;
        let score = player.score;
        self.stats.active_players = self.stats.active_players.saturating_sub(1);
        self.emit(GameEvent::PlayerDied { player: slot, cause });
        log::info!("Player {} died ({:?}) with score {}", slot + 1, cause, score);

        if self.stats.active_players == 0 {
            self.game_over();
        }
    }

    /// Enter game over once, capturing the final time and scores
    fn game_over(&mut self) {
        if self.stats.is_game_over() {
            return;
        }
        let final_time = self.stats.time;
        self.stats.phase = SessionPhase::GameOver;
        self.stats.final_time = Some(final_time);
        self.stats.high_score.observe(&self.players);
        let scores = self.scores();
        self.emit(GameEvent::GameOver { final_time, scores });
        log::info!("Game over at {}s, scores {:?}", final_time, scores);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Actions, PlayerInput};
    use crate::tuning::GameConfig;

    fn state() -> SimulationState {
        SimulationState::new(GameConfig::default(), 42).unwrap()
    }

    /// Keyboard for player 1, skip player 2
    fn single_player(now: f64) -> SimulationState {
        let mut s = state();
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Keyboard), now);
        s.apply_menu_claim(MenuClaim::Skip, now);
        s
    }

    fn versus(now: f64) -> SimulationState {
        let mut s = state();
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Keyboard), now);
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Gamepad(0)), now);
        s
    }

    fn pause_from(slot: usize) -> FrameInput {
        let mut input = FrameInput::default();
        input.players[slot].actions.pause_toggle = true;
        input
    }

    #[test]
    fn test_menu_binds_then_skips() {
        let mut s = state();
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Gamepad(2)), 0.0);
        assert_eq!(
            s.stats.phase,
            SessionPhase::MenuSelectInput(MenuStage::AwaitingSecond)
        );
        assert_eq!(s.players[0].binding, InputBinding::Gamepad(2));

        s.apply_menu_claim(MenuClaim::Skip, 500.0);
        assert!(s.stats.is_playing());
        assert!(s.stats.single_player);
        assert_eq!(s.stats.active_players, 1);
        assert!(s.players[0].active);
        assert!(!s.players[1].active);
        assert_eq!(s.stats.start_ms, 500.0);
    }

    #[test]
    fn test_skip_ignored_for_first_slot() {
        let mut s = state();
        s.apply_menu_claim(MenuClaim::Skip, 0.0);
        assert_eq!(
            s.stats.phase,
            SessionPhase::MenuSelectInput(MenuStage::AwaitingFirst)
        );
    }

    #[test]
    fn test_second_slot_rejects_same_gamepad() {
        let mut s = state();
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Gamepad(0)), 0.0);
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Gamepad(0)), 0.0);
        assert_eq!(
            s.stats.phase,
            SessionPhase::MenuSelectInput(MenuStage::AwaitingSecond)
        );
    }

    #[test]
    fn test_versus_round_resets_entities() {
        let mut s = versus(0.0);
        assert_eq!(s.stats.active_players, 2);
        assert!(!s.stats.single_player);
        assert!(s
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundStarted { players: 2 })));

        s.spawn_obstacle();
        s.players[0].score = 9;
        s.players[1].boost_meter = 3.0;
        s.kill_player(0, DeathCause::Collision);
        s.kill_player(1, DeathCause::Collision);
        s.restart(1000.0);

        assert!(s.obstacles.is_empty());
        assert_eq!(s.scores(), [0, 0]);
        assert_eq!(s.players[1].boost_meter, 100.0);
        assert_eq!(s.bindings(), [InputBinding::Keyboard, InputBinding::Gamepad(0)]);
        assert_eq!(s.stats.high_score.best, 9);
    }

    #[test]
    fn test_pause_owner_only_resumes() {
        let mut s = versus(0.0);
        s.handle_session_input(&pause_from(1), 100.0);
        assert_eq!(s.stats.pause_owner(), Some(1));

        // Player 0 cannot resume player 1's pause
        s.handle_session_input(&pause_from(0), 200.0);
        assert_eq!(s.stats.pause_owner(), Some(1));

        s.handle_session_input(&pause_from(1), 300.0);
        assert!(s.stats.is_playing());
        assert_eq!(s.stats.pause_owner(), None);
    }

    #[test]
    fn test_universal_trigger_resumes_any_pause() {
        let mut s = versus(0.0);
        s.handle_session_input(&pause_from(1), 100.0);
        let mut input = FrameInput::default();
        input.universal.pause_toggle = true;
        s.handle_session_input(&input, 200.0);
        assert!(s.stats.is_playing());
    }

    #[test]
    fn test_escape_pause_credited_to_keyboard_player() {
        let mut s = state();
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Gamepad(0)), 0.0);
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Keyboard), 0.0);
        let mut input = FrameInput::default();
        input.universal.pause_toggle = true;
        s.handle_session_input(&input, 10.0);
        assert_eq!(s.stats.pause_owner(), Some(1));
    }

    #[test]
    fn test_resume_rebases_start() {
        let mut s = single_player(1000.0);
        s.stats.elapsed_ms = 4000.0;
        s.pause(0);
        s.resume(60_000.0);
        assert_eq!(s.stats.start_ms, 56_000.0);
        assert_eq!(s.last_frame_ms, Some(60_000.0));
    }

    #[test]
    fn test_quit_from_pause_clears_bindings_keeps_record() {
        let mut s = versus(0.0);
        s.players[0].score = 4;
        s.stats.high_score.observe(&s.players);
        s.pause(0);

        let mut input = FrameInput::default();
        input.universal.quit_to_menu = true;
        s.handle_session_input(&input, 10.0);

        assert_eq!(
            s.stats.phase,
            SessionPhase::MenuSelectInput(MenuStage::AwaitingFirst)
        );
        assert_eq!(s.bindings(), [InputBinding::None; 2]);
        assert!(s.players.iter().all(|p| !p.active && p.score == 0));
        assert_eq!(s.stats.high_score.best, 4);
    }

    #[test]
    fn test_quit_ignored_while_playing() {
        let mut s = single_player(0.0);
        s.quit_to_menu();
        assert!(s.stats.is_playing());
    }

    #[test]
    fn test_game_over_exactly_once() {
        let mut s = versus(0.0);
        s.stats.time = 17;
        s.kill_player(0, DeathCause::Collision);
        assert!(s.stats.is_playing());
        s.kill_player(1, DeathCause::Collision);
        assert!(s.stats.is_game_over());
        assert_eq!(s.stats.final_time, Some(17));

        // Further deaths are no-ops
        s.kill_player(1, DeathCause::Collision);
        s.kill_player(0, DeathCause::Disconnected);
        let game_overs = s
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(s.stats.active_players, 0);
    }

    #[test]
    fn test_disconnect_while_paused_ends_game() {
        let mut s = single_player(0.0);
        s.pause(0);
        let input = FrameInput {
            players: [
                PlayerInput {
                    disconnected: true,
                    ..Default::default()
                },
                PlayerInput::default(),
            ],
            ..Default::default()
        };
        s.handle_session_input(&input, 50.0);
        assert!(s.stats.is_game_over());
        assert!(s.events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerDied {
                player: 0,
                cause: DeathCause::Disconnected
            }
        )));
    }

    #[test]
    fn test_restart_without_gamepad_kills_player() {
        use crate::input::{BUTTON_SOUTH, DeviceSnapshot, GamepadState, InputTracker};
        use crate::sim::tick;

        let mut s = state();
        s.apply_menu_claim(MenuClaim::Bind(InputBinding::Gamepad(0)), 0.0);
        s.apply_menu_claim(MenuClaim::Skip, 0.0);
        let mut tracker = InputTracker::new();
        let present = DeviceSnapshot {
            gamepads: vec![Some(GamepadState::default())],
            ..Default::default()
        };
        let input = tracker.resolve(&present, &s.input_context());
        tick(&mut s, &input, 16.0);
        s.kill_player(0, DeathCause::Collision);
        assert!(s.stats.is_game_over());

        // Pad unplugged on the game-over screen, then Enter
        let mut gone = DeviceSnapshot {
            gamepads: vec![None],
            ..Default::default()
        };
        let input = tracker.resolve(&gone, &s.input_context());
        tick(&mut s, &input, 32.0);
        gone.keyboard.enter = true;
        let input = tracker.resolve(&gone, &s.input_context());
        tick(&mut s, &input, 48.0);

        assert!(!s.players[0].active);
        assert!(s.stats.is_game_over());
        assert!(s.events.iter().any(|e| matches!(
            e,
            GameEvent::PlayerDied {
                player: 0,
                cause: DeathCause::Disconnected
            }
        )));

        // Plugging it back in and confirming plays normally
        let mut pad = GamepadState::default();
        pad.buttons[BUTTON_SOUTH] = true;
        let back = DeviceSnapshot {
            gamepads: vec![Some(pad)],
            ..Default::default()
        };
        let input = tracker.resolve(&back, &s.input_context());
        tick(&mut s, &input, 64.0);
        assert!(s.stats.is_playing());
        assert!(s.players[0].active);
    }

    #[test]
    fn test_disconnect_not_lost_when_resuming_same_frame() {
        let mut s = versus(0.0);
        s.pause(0);
        let mut input = pause_from(0);
        input.players[1].disconnected = true;
        s.handle_session_input(&input, 100.0);
        assert!(s.stats.is_playing());
        assert!(!s.players[1].active);
        assert_eq!(s.stats.active_players, 1);
    }

    #[test]
    fn test_game_over_confirm_restarts_and_quit_goes_to_menu() {
        let mut s = single_player(0.0);
        s.kill_player(0, DeathCause::Collision);
        let confirm = FrameInput {
            universal: Actions {
                confirm: true,
                ..Default::default()
            },
            ..Default::default()
        };
        s.handle_session_input(&confirm, 5000.0);
        assert!(s.stats.is_playing());
        assert_eq!(s.stats.time, 0);
        assert_eq!(s.stats.final_time, None);
        assert_eq!(s.players[0].binding, InputBinding::Keyboard);

        s.kill_player(0, DeathCause::Collision);
        let quit = FrameInput {
            universal: Actions {
                quit_to_menu: true,
                ..Default::default()
            },
            ..Default::default()
        };
        s.handle_session_input(&quit, 6000.0);
        assert_eq!(s.stats.menu_stage(), Some(MenuStage::AwaitingFirst));
        assert_eq!(s.players[0].binding, InputBinding::None);
    }
}
