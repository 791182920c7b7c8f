use std::time::Duration;

use refinement_core::{BarIndex, Command, Event, ScreenIndex, TerminalConfig, BAR_COUNT};
use refinement_world::{self as world, query, World};

fn compact_world(files_per_day: u32) -> World {
    let config = TerminalConfig {
        global_width: 60,
        global_height: 60,
        scroll_origin_x: 10,
        scroll_origin_y: 10,
        files_per_day,
        ..TerminalConfig::default()
    };
    World::with_config(config, 0x0bad_cafe).expect("valid config")
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn whole_viewport() -> Vec<ScreenIndex> {
    (0..100).map(ScreenIndex::new).collect()
}

#[test]
fn welcome_banner_is_exposed() {
    let world = World::new();
    assert_eq!(
        query::welcome_banner(&world),
        "Welcome to Macrodata Refinement."
    );
}

#[test]
fn a_day_runs_from_start_to_completion_through_drops() {
    let mut world = compact_world(1);
    let started = run(&mut world, Command::StartDay);
    assert!(started.contains(&Event::DayStarted));

    let mut completed = None;
    for attempt in 0..200 {
        let Some(bar) = BarIndex::all().find(|bar| query::is_bar_available(&world, *bar)) else {
            break;
        };
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
        );
        let events = run(
            &mut world,
            Command::DropSelection {
                tiles: whole_viewport(),
                bar,
            },
        );
        if let Some(duration) = events.iter().find_map(|event| match event {
            Event::DayComplete { duration } => Some(*duration),
            _ => None,
        }) {
            completed = Some((attempt, duration));
            break;
        }
    }

    let (attempt, duration) = completed.expect("day completes once every bar is full");
    assert_eq!(duration, Duration::from_millis(250) * (attempt + 1));
    let status = query::day_status(&world);
    assert!(!status.active);
    assert_eq!(status.files_refined, 1);
    assert_eq!(query::progress_bars(&world), [1.0; BAR_COUNT]);
    assert_eq!(query::master_progress(&world), 1.0);
}

#[test]
fn drops_after_the_day_ends_are_rejected() {
    let mut world = compact_world(2);
    let _ = run(&mut world, Command::StartDay);
    let ended = run(&mut world, Command::EndDay);
    assert_eq!(ended, vec![Event::DayCompleted]);

    let events = run(
        &mut world,
        Command::DropSelection {
            tiles: vec![ScreenIndex::new(0)],
            bar: BarIndex::new(0),
        },
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::ChunkRejected {
            reason: refinement_core::ChunkRejection::DayInactive,
            ..
        }
    )));
    assert!(query::has_pending_chunk(&world));
    assert_eq!(query::progress_bars(&world), [0.0; BAR_COUNT]);
}

#[test]
fn bar_cooldown_round_trip() {
    let mut world = compact_world(2);
    let bar = BarIndex::new(2);
    let started = run(&mut world, Command::StartBarCooldown { bar });
    assert_eq!(
        started,
        vec![Event::BarCooldownStarted {
            bar,
            duration: Duration::from_millis(2_500)
        }]
    );
    assert!(!query::is_bar_available(&world, bar));

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(3),
        },
    );
    assert!(events.contains(&Event::BarCooldownEnded { bar }));
    assert!(query::is_bar_available(&world, bar));
    assert_eq!(query::bar_cooldown_ratio(&world, bar), 0.0);
    assert_eq!(query::clock(&world), Duration::from_secs(3));
}

#[test]
fn scrolling_changes_which_tiles_are_visible() {
    let mut world = compact_world(2);
    let before = query::visible_tiles(&world);
    let _ = run(
        &mut world,
        Command::ApplyTrackballInput {
            axis_x: -2.0,
            axis_y: 0.0,
        },
    );
    let after = query::visible_tiles(&world);

    assert_eq!(query::viewport(&world).scroll_x, 11);
    for (old, new) in before.iter().zip(after.iter()) {
        let column = old.screen.get() % 10;
        if column > 0 {
            let shifted = ScreenIndex::new(old.screen.get() - 1);
            assert_eq!(
                query::global_index_from_screen_index(&world, shifted),
                Some(old.global)
            );
        }
        assert_eq!(new.value, query::tile_value(&world, new.global));
    }
}

#[test]
fn regenerating_seeds_one_scary_tile_per_sector() {
    let mut world = compact_world(2);
    let events = run(&mut world, Command::GenerateGrid);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::GridGenerated { scary_tiles: 4, .. }
    )));
    assert_eq!(query::scary_field(&world).active_count(), 4);
    assert_eq!(query::dimensions(&world).cell_count(), 3_600);
}
