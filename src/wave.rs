//! Wave director: spawns waves, reacts to enemy and player deaths, restarts runs

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::combat::{EnemyBullet, PlayerBullet};
use crate::enemies::{enemy_bundle, Enemy, EnemyConfig, EnemyDeathEvent};
use crate::hud::Hud;
use crate::player::movement::MovementConfig;
use crate::player::{check_player_death, player_bundle, Player, PlayerDeathEvent};
use crate::sim::SimSet;
use crate::state::{GameState, RunStatus};

pub struct WavePlugin;

impl Plugin for WavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaveConfig>()
            .init_resource::<WaveRng>()
            .init_resource::<WaveDirector>()
            .add_event::<RestartRequest>()
            .add_systems(
                Update,
                (handle_player_death, handle_enemy_deaths, handle_restart)
                    .chain()
                    .in_set(SimSet::Director)
                    .after(check_player_death),
            );
    }
}

#[derive(Resource, Clone, Debug)]
pub struct WaveConfig {
    pub spawn_radius: f32, // Horizontal distance from the player to the spawn ring
    pub player_spawn: Vec3,
    pub seed: u64, // Enemy stat rolls restart from this on every run
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            spawn_radius: 20.0,
            player_spawn: Vec3::new(0.0, 1.5, 0.0),
            seed: 0x5EED,
        }
    }
}

#[derive(Resource)]
pub struct WaveRng(pub StdRng);

impl FromWorld for WaveRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<WaveConfig>()
            .map_or(WaveConfig::default().seed, |config| config.seed);
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Start a new run from the menu or the end screen
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct RestartRequest;

#[derive(Resource, Debug)]
pub struct WaveDirector {
    pub current_wave: u32,
    pub enemies_remaining: u32,
    pub enemies: Vec<Entity>,
    pub player: Option<Entity>,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self {
            current_wave: 1,
            enemies_remaining: 0,
            enemies: Vec::new(),
            player: None,
        }
    }
}

impl WaveDirector {
    /// Count one finished enemy. Returns the next wave number once the current one is cleared.
    pub fn record_death(&mut self, enemy: Entity) -> Option<u32> {
        self.enemies.retain(|tracked| *tracked != enemy);
        if self.enemies_remaining == 0 {
            return None;
        }

        self.enemies_remaining -= 1;
        if self.enemies_remaining > 0 {
            return None;
        }
        self.current_wave += 1;
        Some(self.current_wave)
    }

    fn clear_enemies(&mut self) {
        self.enemies.clear();
        self.enemies_remaining = 0;
    }
}

/// Spawn point `index` of `count` on the ring around the player, rotated per wave
pub fn spawn_position(center: Vec3, wave: u32, index: u32, count: u32, radius: f32) -> Vec3 {
    let angle = TAU * index as f32 / count.max(1) as f32 + wave as f32 * 0.5;
    Vec3::new(
        center.x + angle.cos() * radius,
        center.y,
        center.z + angle.sin() * radius,
    )
}

#[allow(clippy::too_many_arguments)]
fn start_wave(
    commands: &mut Commands,
    director: &mut WaveDirector,
    wave: u32,
    player: Entity,
    player_position: Vec3,
    enemy_config: &EnemyConfig,
    wave_config: &WaveConfig,
    rng: &mut WaveRng,
) {
    director.current_wave = wave;
    director.enemies_remaining = wave;
    director.enemies.clear();

    for index in 0..wave {
        let stats = enemy_config.roll_stats(&mut rng.0);
        let position = spawn_position(player_position, wave, index, wave, wave_config.spawn_radius);
        let enemy = commands
            .spawn(enemy_bundle(position, stats, enemy_config, player))
            .id();
        director.enemies.push(enemy);
    }

    info!("Wave {wave}: {wave} enemies");
}

fn handle_enemy_deaths(
    mut commands: Commands,
    mut deaths: EventReader<EnemyDeathEvent>,
    mut director: ResMut<WaveDirector>,
    mut rng: ResMut<WaveRng>,
    player_query: Query<&Transform, With<Player>>,
    enemy_config: Res<EnemyConfig>,
    wave_config: Res<WaveConfig>,
) {
    for event in deaths.read() {
        let Some(next_wave) = director.record_death(event.enemy) else {
            continue;
        };
        let Some((player, transform)) = director
            .player
            .and_then(|player| player_query.get(player).ok().map(|t| (player, t)))
        else {
            warn!("Wave {next_wave} cleared without a player to spawn around");
            continue;
        };

        start_wave(
            &mut commands,
            &mut director,
            next_wave,
            player,
            transform.translation,
            &enemy_config,
            &wave_config,
            &mut rng,
        );
    }
}

fn handle_player_death(
    mut commands: Commands,
    mut deaths: EventReader<PlayerDeathEvent>,
    mut state: ResMut<GameState>,
    mut director: ResMut<WaveDirector>,
    mut hud: ResMut<Hud>,
    enemy_query: Query<Entity, With<Enemy>>,
) {
    if deaths.is_empty() {
        return;
    }
    deaths.clear();

    state.set_run_status(RunStatus::GameOver);
    for enemy in &enemy_query {
        commands.entity(enemy).despawn();
    }
    director.clear_enemies();
    hud.show_end_screen(state.kills());

    info!(
        "Run over on wave {} with {} kills",
        director.current_wave,
        state.kills()
    );
}

#[allow(clippy::too_many_arguments)]
fn handle_restart(
    mut commands: Commands,
    mut requests: EventReader<RestartRequest>,
    mut state: ResMut<GameState>,
    mut director: ResMut<WaveDirector>,
    mut hud: ResMut<Hud>,
    mut rng: ResMut<WaveRng>,
    leftover_query: Query<
        Entity,
        Or<(With<Enemy>, With<Player>, With<PlayerBullet>, With<EnemyBullet>)>,
    >,
    movement: Res<MovementConfig>,
    enemy_config: Res<EnemyConfig>,
    wave_config: Res<WaveConfig>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    for entity in &leftover_query {
        commands.entity(entity).despawn();
    }

    state.reset();
    rng.0 = StdRng::seed_from_u64(wave_config.seed);
    director.clear_enemies();

    let spawn = wave_config.player_spawn;
    let player = commands.spawn(player_bundle(spawn, &movement)).id();
    director.player = Some(player);

    start_wave(
        &mut commands,
        &mut director,
        1,
        player,
        spawn,
        &enemy_config,
        &wave_config,
        &mut rng,
    );
    hud.hide_end_screen();
    info!("Run started");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{count, enemies, player_entity, run_frames, start_run, test_app};

    fn director_with(remaining: u32) -> WaveDirector {
        WaveDirector {
            current_wave: remaining,
            enemies_remaining: remaining,
            ..default()
        }
    }

    fn kill_all(app: &mut App) {
        for enemy in enemies(app) {
            app.world_mut().despawn(enemy);
            app.world_mut().send_event(EnemyDeathEvent { enemy });
        }
    }

    // ==================== Director Tests ====================

    #[test]
    fn test_last_death_advances_wave() {
        let mut director = director_with(2);

        assert_eq!(director.record_death(Entity::PLACEHOLDER), None);
        assert_eq!(director.record_death(Entity::PLACEHOLDER), Some(3));
        assert_eq!(director.current_wave, 3);
    }

    #[test]
    fn test_stale_death_does_not_underflow() {
        let mut director = director_with(0);

        assert_eq!(director.record_death(Entity::PLACEHOLDER), None);
        assert_eq!(director.enemies_remaining, 0);
        assert_eq!(director.current_wave, 0);
    }

    #[test]
    fn test_spawn_ring_keeps_distance() {
        let center = Vec3::new(3.0, 1.5, -2.0);

        for index in 0..5 {
            let position = spawn_position(center, 5, index, 5, 20.0);
            let flat = Vec2::new(position.x - center.x, position.z - center.z);
            assert!((flat.length() - 20.0).abs() < 0.001);
        }
    }

    // ==================== Run Tests ====================

    #[test]
    fn test_restart_starts_wave_one() {
        let mut app = test_app();

        start_run(&mut app);

        let director = app.world().resource::<WaveDirector>();
        assert_eq!(director.current_wave, 1);
        assert_eq!(director.enemies_remaining, 1);
        assert_eq!(director.enemies.len(), 1);
        assert!(app.world().resource::<GameState>().is_playing());
        assert_eq!(count::<Enemy>(&mut app), 1);
    }

    #[test]
    fn test_waves_grow_by_one() {
        let mut app = test_app();
        start_run(&mut app);

        for wave in 2..=4 {
            kill_all(&mut app);
            app.update();

            let director = app.world().resource::<WaveDirector>();
            assert_eq!(director.current_wave, wave);
            assert_eq!(director.enemies_remaining, wave);
            assert_eq!(count::<Enemy>(&mut app), wave as usize);
        }
    }

    #[test]
    fn test_player_death_ends_run() {
        let mut app = test_app();
        start_run(&mut app);
        app.world_mut().resource_mut::<GameState>().add_kill();
        app.world_mut().resource_mut::<GameState>().take_damage(500.0);

        app.update();

        let state = app.world().resource::<GameState>();
        assert_eq!(state.run_status(), RunStatus::GameOver);
        assert_eq!(app.world().resource::<Hud>().end_screen, Some(1));
        assert_eq!(count::<Enemy>(&mut app), 0);
        assert_eq!(app.world().resource::<WaveDirector>().enemies_remaining, 0);
    }

    #[test]
    fn test_game_over_freezes_simulation() {
        let mut app = test_app();
        start_run(&mut app);
        app.world_mut().resource_mut::<GameState>().take_damage(500.0);
        app.update();
        let kills = app.world().resource::<GameState>().kills();

        run_frames(&mut app, 30);

        assert_eq!(count::<Enemy>(&mut app), 0);
        assert_eq!(app.world().resource::<GameState>().kills(), kills);
        assert_eq!(app.world().resource::<WaveDirector>().current_wave, 1);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut app = test_app();
        start_run(&mut app);
        let first_player = player_entity(&app);
        kill_all(&mut app);
        app.update();
        app.world_mut().resource_mut::<GameState>().take_damage(500.0);
        app.update();

        start_run(&mut app);

        let state = app.world().resource::<GameState>();
        assert!(state.is_playing());
        assert_eq!(state.kills(), 0);
        assert_eq!(state.health(), state.max_health());
        assert_eq!(app.world().resource::<WaveDirector>().current_wave, 1);
        assert_eq!(app.world().resource::<Hud>().end_screen, None);
        assert!(app.world().get_entity(first_player).is_err());
        assert_eq!(count::<Player>(&mut app), 1);
        assert_eq!(count::<Enemy>(&mut app), 1);
    }
}
