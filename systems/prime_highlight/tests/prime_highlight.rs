use std::time::Duration;

use refinement_core::{Command, Event, TerminalConfig};
use refinement_system_prime_highlight::{Config, PrimeHighlighting};
use refinement_world::{self as world, query, World};

#[test]
fn emits_one_highlight_per_elapsed_interval() {
    let mut highlighting = PrimeHighlighting::new(Config::new(Duration::from_millis(500)));
    let mut commands = Vec::new();
    highlighting.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(2),
        }],
        true,
        &mut commands,
    );
    assert_eq!(commands, vec![Command::HighlightRandomPrime; 4]);
}

#[test]
fn inactive_day_resets_the_accumulator() {
    let mut highlighting = PrimeHighlighting::new(Config::new(Duration::from_secs(1)));
    let mut commands = Vec::new();
    let half_second = [Event::TimeAdvanced {
        dt: Duration::from_millis(500),
    }];

    highlighting.handle(&half_second, true, &mut commands);
    assert!(commands.is_empty(), "no highlight before a full interval");

    highlighting.handle(&[Event::DayCompleted], false, &mut commands);
    highlighting.handle(&half_second, true, &mut commands);
    assert!(commands.is_empty(), "accumulated time was discarded");

    highlighting.handle(&half_second, true, &mut commands);
    assert_eq!(commands, vec![Command::HighlightRandomPrime]);
}

#[test]
fn highlights_turn_prime_tiles_scary_in_the_world() {
    let config = TerminalConfig {
        global_width: 50,
        global_height: 50,
        scroll_origin_x: 0,
        scroll_origin_y: 0,
        ..TerminalConfig::default()
    };
    let mut world = World::with_config(config, 0x1234_5678).expect("valid config");
    let mut highlighting = PrimeHighlighting::default();

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartDay, &mut events);
    let scary_before = query::scary_field(&world).active_count();

    let mut activated = Vec::new();
    for _ in 0..6 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        highlighting.handle(&events, query::day_status(&world).active, &mut commands);
        for command in commands {
            let mut generated = Vec::new();
            world::apply(&mut world, command, &mut generated);
            activated.extend(generated.into_iter().filter_map(|event| match event {
                Event::ScaryActivated { index } => Some(index),
                _ => None,
            }));
        }
    }

    assert_eq!(activated.len(), 6);
    assert_eq!(
        query::scary_field(&world).active_count(),
        scary_before + activated.len()
    );
    for index in activated {
        assert!(refinement_core::is_prime_value(query::tile_value(&world, index)));
    }
}
