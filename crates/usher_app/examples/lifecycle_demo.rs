//! Engine Lifecycle Demo
//!
//! Drives the engine through a full visitor session on a simulated 60 fps
//! loop: initial load behind the readiness gate, a section reveal on
//! scroll, a covered navigation, and the post-transition scroll
//! correction.
//!
//! Run with: cargo run -p usher_app --example lifecycle_demo

use std::time::Duration;

use usher_animation::{Easing, ScrollOptions, ScrollTarget, SectionTracks, TriggerConfig};
use usher_app::{Engine, NavOptions};
use usher_core::EngineConfig;

const FRAME: Duration = Duration::from_millis(16);

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut engine = Engine::new(EngineConfig::default());
    engine.set_scroll_bounds(900.0, 5200.0);
    engine.set_anchor("gallery-grid", 2400.0);

    // The hero image decodes a few frames in; the page mounts right away
    engine.report_page_mounted();
    let mut elapsed = Duration::ZERO;
    while engine.is_loading() {
        engine.tick(FRAME);
        elapsed += FRAME;
        if elapsed == Duration::from_millis(320) {
            engine.report_hero_image_loaded();
        }
    }
    println!("loading finished after {elapsed:?}");

    // Wait out the settle so sections may bind
    while !engine.can_animate() {
        engine.tick(FRAME);
    }

    let mut cards = engine.bind_section(
        "cards",
        |config: &mut TriggerConfig| -> SectionTracks {
            config.start = 600.0;
            config.end = 1100.0;
            SectionTracks {
                opacity: config.track(0.0, 1.0, Easing::CubicOut),
                translate_y: config.track(32.0, 0.0, Easing::CubicOut),
            }
        },
        0,
    );
    cards.update(engine.can_animate(), FRAME);

    // Glide down into the card band and watch the reveal progress
    engine
        .scroll_to(ScrollTarget::Offset(1100.0), ScrollOptions::default())
        .unwrap();
    for frame in 0..90 {
        engine.tick(FRAME);
        cards.update(engine.can_animate(), FRAME);
        if frame % 15 == 0 {
            let applied = cards.applied();
            println!(
                "frame {frame:3}: offset {:7.1} opacity {:.2} rise {:5.1}",
                engine.scroll_offset(),
                applied.opacity,
                applied.translate_y
            );
        }
    }

    // A covered navigation; the new page reports ready mid-reveal
    engine.navigate("/about", NavOptions::default());
    for frame in 0..120 {
        engine.tick(FRAME);
        if frame == 50 {
            engine.report_page_ready();
        }
    }
    println!(
        "landed on {} at offset {}",
        engine.committed_location(),
        engine.scroll_offset()
    );
}
