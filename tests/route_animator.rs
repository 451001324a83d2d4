use ambutrack_core::geo::Coordinate;
use ambutrack_core::route::Route;
use ambutrack_core::route_animator::{Phase, RouteAnimator, TickOutcome};

fn route(points: &[(f64, f64)]) -> Route {
    Route::new(
        points
            .iter()
            .map(|(lat, lng)| Coordinate::new(*lat, *lng))
            .collect(),
    )
    .unwrap()
}

fn eastbound(n: usize) -> Route {
    let points: Vec<(f64, f64)> = (0..n).map(|i| (0.0, i as f64)).collect();
    route(&points)
}

#[test]
fn completes_in_len_minus_one_ticks() {
    let mut animator = RouteAnimator::new();
    animator.start(eastbound(5));
    assert_eq!(animator.phase(), Phase::Running);

    let mut visited = Vec::new();
    loop {
        match animator.tick() {
            TickOutcome::Advanced(update) => visited.push(update.index),
            TickOutcome::Completed(update) => {
                visited.push(update.index);
                break;
            }
            TickOutcome::Idle => panic!("animator went idle mid-run"),
        }
    }
    // every index visited in order exactly once, in length - 1 ticks
    assert_eq!(visited, vec![1, 2, 3, 4]);
    assert_eq!(animator.phase(), Phase::Completed);

    // completed animators do not keep emitting
    assert_eq!(animator.tick(), TickOutcome::Idle);
}

#[test]
fn shortest_route_completes_in_one_tick() {
    let mut animator = RouteAnimator::new();
    animator.start(eastbound(2));
    match animator.tick() {
        TickOutcome::Completed(update) => {
            assert_eq!(update.index, 1);
            assert_eq!(update.position, Coordinate::new(0.0, 1.0));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn tick_without_start_is_idle() {
    let mut animator = RouteAnimator::new();
    assert_eq!(animator.tick(), TickOutcome::Idle);
}

#[test]
fn restart_replaces_the_running_animation() {
    let mut animator = RouteAnimator::new();
    let first_generation = animator.start(eastbound(5));
    animator.tick();
    animator.tick();

    // a second start cancels the first run outright
    let second_generation = animator.start(route(&[(10.0, 10.0), (10.0, 11.0)]));
    assert_ne!(first_generation, second_generation);
    match animator.tick() {
        TickOutcome::Completed(update) => {
            assert_eq!(update.position, Coordinate::new(10.0, 11.0));
        }
        other => panic!("expected the new route, got {other:?}"),
    }
}

#[test]
fn cancel_is_synchronous_and_idempotent() {
    let mut animator = RouteAnimator::new();
    animator.cancel(); // cancel while idle is a no-op
    assert_eq!(animator.phase(), Phase::Idle);

    let generation = animator.start(eastbound(4));
    animator.tick();
    animator.cancel();
    assert_eq!(animator.phase(), Phase::Idle);
    assert_ne!(animator.generation(), generation);
    assert_eq!(animator.tick(), TickOutcome::Idle);

    animator.cancel();
    assert_eq!(animator.phase(), Phase::Idle);
}

#[test]
fn pickup_waypoint_fires_exactly_once() {
    let mut animator = RouteAnimator::new();
    let route = eastbound(5);
    let pickup_index = route.pickup_index();
    animator.start(route);

    let mut pickup_hits = Vec::new();
    loop {
        let (update, done) = match animator.tick() {
            TickOutcome::Advanced(update) => (update, false),
            TickOutcome::Completed(update) => (update, true),
            TickOutcome::Idle => panic!("animator went idle mid-run"),
        };
        if update.at_pickup {
            pickup_hits.push(update.index);
        }
        if done {
            break;
        }
    }
    assert_eq!(pickup_hits, vec![pickup_index]);
}

#[test]
fn heading_is_smoothed_toward_the_raw_bearing() {
    let mut animator = RouteAnimator::new();
    animator.start(eastbound(4));

    // due east is 90°; the first tick only blends 30% of the way there
    let first = match animator.tick() {
        TickOutcome::Advanced(update) => update.heading,
        other => panic!("unexpected {other:?}"),
    };
    assert!((first - 27.0).abs() < 1e-6, "got {first}");

    // each further tick closes 30% of the remaining gap
    let second = match animator.tick() {
        TickOutcome::Advanced(update) => update.heading,
        other => panic!("unexpected {other:?}"),
    };
    assert!(second > first && second < 90.0);
}

#[test]
fn heading_stays_normalized_across_westward_turns() {
    // full blend makes the heading track the raw bearing directly
    let mut animator = RouteAnimator::with_heading_blend(1.0);
    animator.start(route(&[(0.0, 2.0), (0.0, 1.0), (0.0, 0.0)]));

    // due west is 270°, reached via a negative turn from 0°
    match animator.tick() {
        TickOutcome::Advanced(update) => {
            assert!((update.heading - 270.0).abs() < 1e-6, "got {}", update.heading);
        }
        other => panic!("unexpected {other:?}"),
    }
}
