//! Per-frame simulation tick
//!
//! Advances the avatar and obstacles by one clamped, frame-rate normalized
//! delta, then checks for scoring and collisions. Runs only while `Running`.

use super::collision::{CollisionKind, check_collision};
use super::state::{GameMode, GameState};
use crate::clamp_f32;
use crate::consts::*;

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// An obstacle was cleared; carries the new score
    Scored { score: u32 },
    /// The best score was raised (and persisted)
    NewBest { best: u32 },
    /// A new obstacle entered on the right
    Spawned { id: u32 },
    /// The run must end
    Collision(CollisionKind),
}

/// Advance the game state by `dt_ms`
///
/// Does nothing outside `Running`. A collision is reported but the mode is
/// left alone; the caller routes it through the state machine.
pub fn tick(state: &mut GameState, dt_ms: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.mode != GameMode::Running {
        return events;
    }

    let k = dt_ms / REFERENCE_FRAME_MS;
    let tuning = &state.tuning;

    // Avatar
    let avatar = &mut state.avatar;
    avatar.vel_y += tuning.gravity * k;
    avatar.vel_y = avatar.vel_y.min(tuning.max_fall_speed);
    avatar.pos.y += avatar.vel_y * k;
    avatar.angle = clamp_f32(
        avatar.vel_y / tuning.max_fall_speed * TILT_GAIN,
        TILT_MIN,
        TILT_MAX,
    );

    // Obstacles, oldest first
    let avatar_x = avatar.pos.x;
    let shift = tuning.obstacle_speed * k;
    let mut cleared = 0u32;
    state.obstacles.retain_mut(|o| {
        o.x -= shift;
        if !o.passed && o.trailing_edge() < avatar_x {
            o.passed = true;
            cleared += 1;
        }
        o.trailing_edge() >= DESPAWN_X
    });
    for _ in 0..cleared {
        let new_best = state.scoreboard.increment();
        events.push(GameEvent::Scored {
            score: state.scoreboard.score(),
        });
        if let Some(best) = new_best {
            events.push(GameEvent::NewBest { best });
        }
    }

    // Spawn: at most one per tick, leftover time is dropped
    state.spawn_timer += dt_ms;
    if state.spawn_timer >= state.tuning.spawn_interval_ms {
        state.spawn_timer = 0.0;
        let id = state.spawn_obstacle().id;
        events.push(GameEvent::Spawned { id });
    }

    if let Some(kind) = check_collision(&state.avatar, &state.obstacles, &state.tuning) {
        events.push(GameEvent::Collision(kind));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::state::Obstacle;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn running_state() -> GameState {
        let mut state = GameState::new(Tuning::default(), 7, Box::new(MemoryStore::default()));
        state.mode = GameMode::Running;
        state
    }

    #[test]
    fn test_no_tick_outside_running() {
        for mode in [GameMode::Menu, GameMode::Paused, GameMode::GameOver] {
            let mut state = running_state();
            state.mode = mode;
            let before = state.avatar.clone();
            assert!(tick(&mut state, REFERENCE_FRAME_MS).is_empty());
            assert_eq!(state.avatar, before);
            assert_eq!(state.spawn_timer, 0.0);
        }
    }

    #[test]
    fn test_gravity_one_reference_frame() {
        let mut state = running_state();
        tick(&mut state, REFERENCE_FRAME_MS);
        assert!((state.avatar.vel_y - 0.5).abs() < 1e-5);
        assert!((state.avatar.pos.y - 320.5).abs() < 1e-4);
    }

    #[test]
    fn test_motion_is_frame_rate_independent() {
        // Velocity gain depends only on elapsed time
        let mut fast = running_state();
        let mut slow = running_state();
        for _ in 0..4 {
            tick(&mut fast, REFERENCE_FRAME_MS / 2.0);
        }
        for _ in 0..2 {
            tick(&mut slow, REFERENCE_FRAME_MS);
        }
        assert!((fast.avatar.vel_y - slow.avatar.vel_y).abs() < 1e-4);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let mut state = running_state();
        state.avatar.vel_y = 14.0;
        tick(&mut state, REFERENCE_FRAME_MS);
        assert_eq!(state.avatar.angle, 0.8);

        let mut state = running_state();
        state.avatar.flap(-8.8);
        tick(&mut state, REFERENCE_FRAME_MS);
        assert_eq!(state.avatar.angle, TILT_MIN);
    }

    #[test]
    fn test_obstacle_scrolls_and_scores_once() {
        let mut state = running_state();
        // Trailing edge at 121, avatar x at 120; gap wide open around the avatar
        state.obstacles.push(Obstacle::new(1, 51.0, 100.0, 400.0, 70.0));

        let events = tick(&mut state, REFERENCE_FRAME_MS);
        assert!((state.obstacles[0].x - 48.4).abs() < 1e-4);
        assert!(state.obstacles[0].passed);
        assert_eq!(state.score(), 1);
        assert!(events.contains(&GameEvent::Scored { score: 1 }));
        assert!(events.contains(&GameEvent::NewBest { best: 1 }));

        let events = tick(&mut state, REFERENCE_FRAME_MS);
        assert_eq!(state.score(), 1);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Scored { .. })));
    }

    #[test]
    fn test_obstacle_removed_past_threshold() {
        let mut state = running_state();
        state.obstacles.push(Obstacle::new(1, -78.0, 100.0, 160.0, 70.0));
        state.obstacles.push(Obstacle::new(2, 300.0, 100.0, 160.0, 70.0));
        state.obstacles[0].passed = true;

        tick(&mut state, REFERENCE_FRAME_MS);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].id, 2);
    }

    #[test]
    fn test_spawn_after_interval() {
        let mut state = running_state();
        let mut spawned = 0;
        for _ in 0..89 {
            spawned += tick(&mut state, REFERENCE_FRAME_MS)
                .iter()
                .filter(|e| matches!(e, GameEvent::Spawned { .. }))
                .count();
            state.avatar.pos.y = 320.0;
            state.avatar.vel_y = 0.0;
        }
        assert_eq!(spawned, 0);
        let events = tick(&mut state, REFERENCE_FRAME_MS);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })));
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.spawn_timer, 0.0);
    }

    #[test]
    fn test_time_debt_is_dropped() {
        let mut state = running_state();
        state.spawn_timer = 2990.0;
        tick(&mut state, MAX_FRAME_DELTA_MS);
        // Two intervals' worth of time, still one obstacle and a zeroed timer
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.spawn_timer, 0.0);
    }

    #[test]
    fn test_ground_collision_reported() {
        let mut state = running_state();
        state.avatar.pos.y = 595.0;
        state.avatar.vel_y = 14.0;
        let events = tick(&mut state, REFERENCE_FRAME_MS);
        assert!(events.contains(&GameEvent::Collision(CollisionKind::Ground)));
        // The tick reports; the state machine decides
        assert_eq!(state.mode, GameMode::Running);
    }

    #[test]
    fn test_ceiling_collision_reported() {
        let mut state = running_state();
        state.avatar.pos.y = 25.0;
        state.avatar.flap(-8.8);
        let events = tick(&mut state, REFERENCE_FRAME_MS);
        assert!(events.contains(&GameEvent::Collision(CollisionKind::Ceiling)));
    }

    #[test]
    fn test_obstacle_collision_reported() {
        let mut state = running_state();
        // Gap far below the avatar
        state.obstacles.push(Obstacle::new(5, 110.0, 400.0, 160.0, 70.0));
        let events = tick(&mut state, REFERENCE_FRAME_MS);
        assert!(events.contains(&GameEvent::Collision(CollisionKind::ObstacleTop { id: 5 })));
    }

    proptest! {
        #[test]
        fn prop_velocity_never_exceeds_max_fall(
            deltas in proptest::collection::vec(0.0f32..=MAX_FRAME_DELTA_MS, 1..200),
            start_vel in -20.0f32..40.0,
        ) {
            let mut state = running_state();
            state.avatar.vel_y = start_vel;
            let max = state.tuning.max_fall_speed;
            for dt in deltas {
                tick(&mut state, dt);
                // Keep it in the air so the run is not cut short
                state.mode = GameMode::Running;
                prop_assert!(state.avatar.vel_y <= max);
            }
        }

        #[test]
        fn prop_gap_is_constant_for_lifetime(seed in any::<u64>(), frames in 1usize..400) {
            let mut state = running_state();
            state.reseed(seed);
            state.spawn_timer = state.tuning.spawn_interval_ms;
            let gap = state.tuning.gap;
            for _ in 0..frames {
                tick(&mut state, REFERENCE_FRAME_MS);
                state.mode = GameMode::Running;
                for o in &state.obstacles {
                    prop_assert_eq!(o.bottom - o.top, gap);
                }
            }
        }

        #[test]
        fn prop_score_monotonic_within_run(seed in any::<u64>(), frames in 1usize..600) {
            let mut state = running_state();
            state.reseed(seed);
            let mut last = state.score();
            for _ in 0..frames {
                tick(&mut state, REFERENCE_FRAME_MS);
                state.mode = GameMode::Running;
                state.avatar.pos.y = 320.0;
                prop_assert!(state.score() >= last);
                last = state.score();
            }
        }
    }
}
