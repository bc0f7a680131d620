//! End-to-end engine scenarios driven through the public facade

use std::time::Duration;

use usher_animation::{Easing, ScrollOptions, ScrollTarget, SectionTracks, TriggerConfig};
use usher_app::{Engine, NavOptions};
use usher_core::{EngineConfig, GovernorConfig};

const STEP: Duration = Duration::from_millis(10);

fn advance(engine: &mut Engine, total: Duration) {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        engine.tick(STEP);
        elapsed += STEP;
    }
}

fn fade_rise(config: &mut TriggerConfig) -> SectionTracks {
    config.start = 200.0;
    config.end = 600.0;
    SectionTracks {
        opacity: config.track(0.0, 1.0, Easing::CubicOut),
        translate_y: config.track(32.0, 0.0, Easing::CubicOut),
    }
}

#[test]
fn loading_clears_at_min_display_when_hero_is_early() {
    let mut engine = Engine::new(EngineConfig::default());

    // Hero decodes fast, at 200ms
    advance(&mut engine, Duration::from_millis(200));
    engine.report_hero_image_loaded();
    engine.report_page_mounted();

    advance(&mut engine, Duration::from_millis(800));
    assert!(engine.is_loading(), "min display must hold until 1.2s");

    advance(&mut engine, Duration::from_millis(210));
    assert!(!engine.is_loading());
}

#[test]
fn fallback_bounds_loading_with_no_reports_at_all() {
    let mut engine = Engine::new(EngineConfig::default());

    advance(&mut engine, Duration::from_millis(4990));
    assert!(engine.is_loading());

    advance(&mut engine, Duration::from_millis(30));
    assert!(!engine.is_loading());
}

#[test]
fn loading_is_monotonic_across_later_activity() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.report_hero_image_loaded();
    advance(&mut engine, Duration::from_millis(1210));
    assert!(!engine.is_loading());

    engine.report_page_mounted();
    engine.navigate("/about", NavOptions::default());
    advance(&mut engine, Duration::from_secs(5));
    assert!(!engine.is_loading());
}

#[test]
fn transition_swaps_under_cover_and_corrects_scroll() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_scroll_bounds(900.0, 4000.0);
    engine
        .scroll_to(
            ScrollTarget::Offset(1500.0),
            ScrollOptions {
                immediate: true,
                ..Default::default()
            },
        )
        .unwrap();

    engine.navigate("/about", NavOptions::default());
    assert_eq!(engine.committed_location(), "/");

    // Mid-cover: overlay rising, still on the old page
    advance(&mut engine, Duration::from_millis(100));
    assert!(engine.overlay_opacity() > 0.0);
    assert_eq!(engine.committed_location(), "/");

    // After the cover duration, content has swapped
    advance(&mut engine, Duration::from_millis(600));
    assert_eq!(engine.committed_location(), "/about");

    engine.report_page_ready();
    advance(&mut engine, Duration::from_secs(2));
    assert!(engine.overlay_opacity() < 0.05);
    assert_eq!(engine.scroll_offset(), 0.0);
}

#[test]
fn skip_transition_never_shows_the_overlay() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_scroll_bounds(900.0, 4000.0);

    engine.navigate(
        "/about",
        NavOptions {
            skip_transition: true,
            ..Default::default()
        },
    );
    assert_eq!(engine.committed_location(), "/about");

    engine.report_page_ready();
    for _ in 0..50 {
        engine.tick(STEP);
        assert_eq!(engine.overlay_opacity(), 0.0);
    }
}

#[test]
fn renavigation_abandons_the_first_cycles_ready() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_scroll_bounds(900.0, 4000.0);
    engine
        .scroll_to(
            ScrollTarget::Offset(1500.0),
            ScrollOptions {
                immediate: true,
                ..Default::default()
            },
        )
        .unwrap();

    engine.navigate("/a", NavOptions::default());
    engine.report_page_ready();
    // Before the first cycle completes, the visitor navigates again
    engine.navigate("/b", NavOptions::default());

    // Run the second cycle to full reveal without its own ready signal
    advance(&mut engine, Duration::from_secs(3));
    assert_eq!(engine.committed_location(), "/b");
    // The abandoned cycle's ready must not have corrected the scroll
    assert_eq!(engine.scroll_offset(), 1500.0);

    engine.report_page_ready();
    advance(&mut engine, Duration::from_millis(50));
    assert_eq!(engine.scroll_offset(), 0.0);
}

#[test]
fn governor_ceiling_rejects_then_recovers_through_bindings() {
    let config = EngineConfig {
        governor: GovernorConfig {
            ceiling: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = Engine::new(config);

    // Open the gate
    engine.report_hero_image_loaded();
    engine.report_page_mounted();
    advance(&mut engine, Duration::from_millis(1600));
    assert!(engine.can_animate());

    let mut first = engine.bind_section("hero-copy", fade_rise, 0);
    let mut second = engine.bind_section("cards", fade_rise, 0);
    let mut third = engine.bind_section("footer", fade_rise, 0);
    for binding in [&mut first, &mut second, &mut third] {
        binding.update(engine.can_animate(), STEP);
    }

    assert!(first.is_bound());
    assert!(second.is_bound());
    // Over the ceiling: the section renders its final state, no error
    assert!(!third.is_bound());

    // Freeing a slot lets a fresh binding in
    drop(first);
    let mut fourth = engine.bind_section("gallery", fade_rise, 0);
    fourth.update(engine.can_animate(), STEP);
    assert!(fourth.is_bound());
}

#[test]
fn sustained_low_fps_degrades_live_bindings() {
    let config = EngineConfig {
        governor: GovernorConfig {
            sample_window: 10,
            low_fps_debounce_ms: 300,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut engine = Engine::new(config);

    engine.report_hero_image_loaded();
    engine.report_page_mounted();
    advance(&mut engine, Duration::from_millis(1600));
    assert!(engine.can_animate());

    let mut bindings: Vec<_> = (0..6)
        .map(|i| engine.bind_section(format!("section-{i}"), fade_rise, 0))
        .collect();
    for binding in &mut bindings {
        binding.update(true, STEP);
    }
    assert!(bindings.iter().all(|b| b.is_bound()));

    // 100ms frames: 10 fps, far under the 30 fps threshold
    for _ in 0..20 {
        engine.tick(Duration::from_millis(100));
    }
    for binding in &mut bindings {
        binding.update(true, Duration::from_millis(100));
    }

    let survivors = bindings.iter().filter(|b| b.is_bound()).count();
    assert_eq!(survivors, 3, "degradation evicts the oldest half");
}

#[test]
fn bindings_stay_hidden_until_the_gate_opens() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut binding = engine.bind_section("cards", fade_rise, 0);

    // Gate still closed well into the load
    for _ in 0..50 {
        engine.tick(STEP);
        binding.update(engine.can_animate(), STEP);
    }
    assert!(!binding.is_bound());
    assert_eq!(binding.applied().opacity, 0.0);

    engine.report_hero_image_loaded();
    advance(&mut engine, Duration::from_millis(1600));
    binding.update(engine.can_animate(), STEP);
    assert!(binding.is_bound());
}
