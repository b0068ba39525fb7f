//! Shared run state: player health, kill count and the coarse run/player status.
//!
//! `GameState` is created once by [`StatePlugin`] and handed to systems as
//! `Res`/`ResMut`. Every change goes through the methods below.

use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use thiserror::Error;

/// Rounding tolerance for player health. Accumulated f32 drain drifts about 1e-3
/// away from the exact value, so anything at or below this counts as zero.
pub const HEALTH_EPSILON: f32 = 0.01;

pub struct StatePlugin;

impl Plugin for StatePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameState>();
    }
}

/// Coarse status of the run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Playing,
    Paused,
    GameOver,
    #[default]
    Menu,
}

impl RunStatus {
    pub fn name(&self) -> &'static str {
        match self {
            RunStatus::Playing => "playing",
            RunStatus::Paused => "paused",
            RunStatus::GameOver => "game_over",
            RunStatus::Menu => "menu",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RunStatus {
    type Err = GameStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "playing" => Ok(RunStatus::Playing),
            "paused" => Ok(RunStatus::Paused),
            "game_over" | "gameover" => Ok(RunStatus::GameOver),
            "menu" => Ok(RunStatus::Menu),
            _ => Err(GameStateError::InvalidRunStatus(s.to_string())),
        }
    }
}

/// Status of the player body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerStatus {
    #[default]
    Idle,
    Alive,
    Dead,
}

impl FromStr for PlayerStatus {
    type Err = GameStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(PlayerStatus::Idle),
            "alive" => Ok(PlayerStatus::Alive),
            "dead" => Ok(PlayerStatus::Dead),
            _ => Err(GameStateError::InvalidPlayerStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameStateError {
    #[error("invalid run status: {0:?}")]
    InvalidRunStatus(String),

    #[error("invalid player status: {0:?}")]
    InvalidPlayerStatus(String),
}

#[derive(Resource, Debug, Clone)]
pub struct GameState {
    run_status: RunStatus,
    player_status: PlayerStatus,
    health: f32,
    max_health: f32,
    kills: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl GameState {
    pub fn new(max_health: f32) -> Self {
        Self {
            run_status: RunStatus::Menu,
            player_status: PlayerStatus::Idle,
            health: max_health,
            max_health,
            kills: 0,
        }
    }

    pub fn run_status(&self) -> RunStatus {
        self.run_status
    }

    pub fn player_status(&self) -> PlayerStatus {
        self.player_status
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn is_playing(&self) -> bool {
        self.run_status == RunStatus::Playing
    }

    pub fn is_dead(&self) -> bool {
        self.player_status == PlayerStatus::Dead
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    /// Subtract health. Reaching zero kills the player and ends the run.
    ///
    /// Health is rounded to zero once it is within [`HEALTH_EPSILON`], so a hit that
    /// leaves at most 0.01 is lethal while anything above that survives.
    pub fn take_damage(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }

        self.health -= amount;
        if self.health <= HEALTH_EPSILON {
            self.health = 0.0;
            self.player_status = PlayerStatus::Dead;
            self.run_status = RunStatus::GameOver;
            info!("Player died with {} kills", self.kills);
        }
    }

    /// Add health up to the maximum. A negative amount drains through the damage path.
    pub fn heal(&mut self, amount: f32) {
        if self.is_dead() {
            return;
        }

        if amount < 0.0 {
            self.take_damage(-amount);
            return;
        }

        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn add_kill(&mut self) {
        self.kills += 1;
        debug!("Kills: {}", self.kills);
    }

    /// Flip between Playing and Paused. GameOver and Menu are left alone.
    pub fn pause_toggle(&mut self) {
        match self.run_status {
            RunStatus::Playing => self.run_status = RunStatus::Paused,
            RunStatus::Paused => self.run_status = RunStatus::Playing,
            other => {
                debug!("Pause ignored while {}", other);
                return;
            }
        }
        info!("Run {}", self.run_status);
    }

    pub fn reset(&mut self) {
        self.player_status = PlayerStatus::Alive;
        self.health = self.max_health;
        self.kills = 0;
        self.run_status = RunStatus::Playing;
        info!("Run reset");
    }

    pub fn set_run_status(&mut self, status: RunStatus) {
        if self.run_status != status {
            info!("Run {} -> {}", self.run_status, status);
        }
        self.run_status = status;
    }

    /// Parse and apply a run status. Unknown values leave the state untouched.
    #[cfg(test)]
    pub fn try_set_run_status(&mut self, raw: &str) -> Result<RunStatus, GameStateError> {
        let status = raw
            .parse::<RunStatus>()
            .inspect_err(|err| warn!("Rejected: {err}"))?;
        self.set_run_status(status);
        Ok(status)
    }

    /// Parse and apply a player status. `Dead` can only be reached by losing all health.
    #[cfg(test)]
    pub fn try_set_player_status(&mut self, raw: &str) -> Result<PlayerStatus, GameStateError> {
        let status = raw
            .parse::<PlayerStatus>()
            .inspect_err(|err| warn!("Rejected: {err}"))?;
        if status == PlayerStatus::Dead && self.health > 0.0 {
            warn!("Rejected: player cannot be set dead with {} health", self.health);
            return Err(GameStateError::InvalidPlayerStatus(raw.to_string()));
        }
        self.player_status = status;
        Ok(status)
    }
}

/// Run condition: the run is live
pub fn game_playing(state: Res<GameState>) -> bool {
    state.is_playing()
}

/// Run condition: anything except a pause
pub fn not_paused(state: Res<GameState>) -> bool {
    state.run_status() != RunStatus::Paused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::default();
        state.reset();
        state
    }

    #[test]
    fn test_defaults_start_in_menu() {
        let state = GameState::default();

        assert_eq!(state.run_status(), RunStatus::Menu);
        assert_eq!(state.player_status(), PlayerStatus::Idle);
        assert_eq!(state.health(), 100.0);
        assert_eq!(state.kills(), 0);
    }

    #[test]
    fn test_take_damage_never_goes_negative() {
        for amount in [0.5, 10.0, 99.0, 100.0, 250.0] {
            let mut state = playing();
            state.take_damage(amount);
            state.take_damage(amount);
            assert!(state.health() >= 0.0, "amount {amount}");
        }
    }

    #[test]
    fn test_lethal_damage_zeroes_health_then_kills() {
        let mut state = playing();

        state.take_damage(60.0);
        assert_eq!(state.player_status(), PlayerStatus::Alive);
        assert_eq!(state.run_status(), RunStatus::Playing);

        state.take_damage(60.0);
        assert_eq!(state.health(), 0.0);
        assert_eq!(state.player_status(), PlayerStatus::Dead);
        assert_eq!(state.run_status(), RunStatus::GameOver);
    }

    #[test]
    fn test_damage_after_death_is_ignored() {
        let mut state = playing();
        state.take_damage(100.0);
        state.set_run_status(RunStatus::Playing);

        state.take_damage(10.0);

        assert_eq!(state.health(), 0.0);
        assert_eq!(state.run_status(), RunStatus::Playing);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut state = playing();
        state.take_damage(30.0);

        for _ in 0..50 {
            state.heal(7.0);
        }

        assert_eq!(state.health(), state.max_health());
    }

    #[test]
    fn test_heal_is_noop_when_dead() {
        let mut state = playing();
        state.take_damage(150.0);

        state.heal(50.0);

        assert_eq!(state.health(), 0.0);
        assert!(state.is_dead());
    }

    #[test]
    fn test_drain_kills_on_the_thousandth_frame() {
        let mut state = playing();
        let mut died_on = None;

        for frame in 1..=1000 {
            state.heal(-0.1);
            if state.is_dead() && died_on.is_none() {
                died_on = Some(frame);
            }
        }

        assert_eq!(died_on, Some(1000));
        assert_eq!(state.health(), 0.0);
        assert_eq!(state.run_status(), RunStatus::GameOver);
    }

    #[test]
    fn test_only_rounding_slivers_count_as_zero() {
        let mut state = playing();
        state.take_damage(99.98);
        assert_eq!(state.player_status(), PlayerStatus::Alive);
        assert!(state.health() > HEALTH_EPSILON);

        let mut state = playing();
        state.take_damage(99.995);
        assert_eq!(state.health(), 0.0);
        assert_eq!(state.player_status(), PlayerStatus::Dead);
    }

    #[test]
    fn test_pause_toggle_only_between_playing_and_paused() {
        let mut state = playing();

        state.pause_toggle();
        assert_eq!(state.run_status(), RunStatus::Paused);
        state.pause_toggle();
        assert_eq!(state.run_status(), RunStatus::Playing);

        state.set_run_status(RunStatus::GameOver);
        state.pause_toggle();
        assert_eq!(state.run_status(), RunStatus::GameOver);

        state.set_run_status(RunStatus::Menu);
        state.pause_toggle();
        assert_eq!(state.run_status(), RunStatus::Menu);
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut state = playing();
        state.add_kill();
        state.add_kill();
        state.take_damage(100.0);

        state.reset();

        assert_eq!(state.health(), 100.0);
        assert_eq!(state.kills(), 0);
        assert_eq!(state.player_status(), PlayerStatus::Alive);
        assert_eq!(state.run_status(), RunStatus::Playing);
    }

    #[test]
    fn test_invalid_run_status_is_rejected() {
        let mut state = playing();

        let result = state.try_set_run_status("sleeping");

        assert_eq!(
            result,
            Err(GameStateError::InvalidRunStatus("sleeping".to_string()))
        );
        assert_eq!(state.run_status(), RunStatus::Playing);
    }

    #[test]
    fn test_valid_run_status_is_applied() {
        let mut state = playing();

        assert_eq!(state.try_set_run_status("Paused"), Ok(RunStatus::Paused));
        assert_eq!(state.run_status(), RunStatus::Paused);
    }

    #[test]
    fn test_player_status_cannot_be_forced_dead() {
        let mut state = playing();

        assert!(state.try_set_player_status("dead").is_err());
        assert!(state.try_set_player_status("zombie").is_err());
        assert_eq!(state.player_status(), PlayerStatus::Alive);
    }
}
