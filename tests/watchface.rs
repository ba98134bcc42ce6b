mod common;

use common::{at, FixedClock, Kind, Op, Recorder};
use pinetime_daynight::{
    clock::{BucketRule, TimeBucket, TimeUnits},
    ui::{palette, Error, Event, ResourceId, TextAlignment},
    DayNightWatchface, SpriteMode, WatchfaceConfig,
};

type Face<'a> = DayNightWatchface<Recorder, &'a FixedClock>;

fn watchface(clock: &FixedClock, config: WatchfaceConfig) -> Face<'_> {
    DayNightWatchface::new(Recorder::new(), clock, config)
}

#[test]
fn startup_at_seven_shows_sunset() {
    let clock = FixedClock::new(at(7, 3), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();

    let tk = face.toolkit();
    assert_eq!(tk.only_text(), Some("07:03"));
    assert_eq!(tk.only_text_color(), Some(palette::PASTEL_YELLOW));
    assert_eq!(tk.visible_backgrounds(), vec![ResourceId::SunsetBackground]);
    assert_eq!(face.bucket(), Some(TimeBucket::Sunset));
}

#[test]
fn evening_is_night_in_both_clock_styles() {
    let clock = FixedClock::new(at(21, 45), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    assert_eq!(face.toolkit().only_text(), Some("21:45"));
    assert_eq!(face.toolkit().only_text_color(), Some(palette::WHITE));
    assert_eq!(face.toolkit().visible_backgrounds(), vec![ResourceId::NightBackground]);

    let clock = FixedClock::new(at(21, 45), false);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    assert_eq!(face.toolkit().only_text(), Some("9:45"));
    assert_eq!(face.toolkit().visible_backgrounds(), vec![ResourceId::NightBackground]);
}

#[test]
fn exactly_one_background_visible_every_hour() {
    let clock = FixedClock::new(at(0, 0), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();

    for hour in 0..24 {
        clock.set(at(hour, 15));
        face.update_time().unwrap();
        let visible = face.toolkit().visible_backgrounds();
        assert_eq!(visible.len(), 1, "hour {}", hour);

        let expected = match BucketRule::Literal.classify(&at(hour, 15)) {
            TimeBucket::Night => ResourceId::NightBackground,
            TimeBucket::Sunset => ResourceId::SunsetBackground,
            TimeBucket::Day => ResourceId::DayBackground,
        };
        assert_eq!(visible[0], expected, "hour {}", hour);
    }
}

#[test]
fn midday_is_day_with_white_text() {
    let clock = FixedClock::new(at(12, 0), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    assert_eq!(face.toolkit().visible_backgrounds(), vec![ResourceId::DayBackground]);
    assert_eq!(face.toolkit().only_text_color(), Some(palette::WHITE));
}

#[test]
fn numeric_rule_is_opt_in() {
    let clock = FixedClock::new(at(20, 10), true);
    let mut literal = watchface(&clock, WatchfaceConfig::default());
    literal.initialize().unwrap();
    assert_eq!(literal.bucket(), Some(TimeBucket::Night));

    let config = WatchfaceConfig {
        bucket_rule: BucketRule::Numeric,
        ..WatchfaceConfig::default()
    };
    let mut numeric = watchface(&clock, config);
    numeric.initialize().unwrap();
    assert_eq!(numeric.bucket(), Some(TimeBucket::Sunset));
}

#[test]
fn initialize_sequence() {
    let clock = FixedClock::new(at(10, 0), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    let tk = face.toolkit();

    assert_eq!(tk.subscription, Some(TimeUnits::MINUTE));
    assert!(tk.ops.iter().any(|op| matches!(op, Op::Push { animated: true, .. })));
    assert_eq!(tk.window_background, Some(palette::BLACK));

    // Subscription happens before the push, loading after it
    let subscribe = tk.ops.iter().position(|op| matches!(op, Op::Subscribe(_))).unwrap();
    let push = tk.ops.iter().position(|op| matches!(op, Op::Push { .. })).unwrap();
    let text_create = Op::Create(Kind::TextLayer, tk.created(Kind::TextLayer)[0]);
    let text = tk.ops.iter().position(|op| *op == text_create).unwrap();
    assert!(subscribe < push && push < text);

    let text_id = tk.created(Kind::TextLayer)[0];
    assert_eq!(tk.text_backgrounds[&text_id], None);
    assert_eq!(tk.alignments[&text_id], TextAlignment::Center);
    let font = tk.created(Kind::Font)[0];
    assert_eq!(tk.fonts_used[&text_id], font);
    assert_eq!(tk.resources[&font], ResourceId::TimeFont);
}

#[test]
fn layers_stack_night_sunset_day_then_clock() {
    let clock = FixedClock::new(at(10, 0), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    let tk = face.toolkit();

    let root = tk.roots.values().next().copied().unwrap();
    let stack: Vec<_> = tk.children[&root]
        .iter()
        .map(|id| tk.resources.get(id).copied())
        .collect();
    assert_eq!(
        stack,
        vec![
            Some(ResourceId::NightBackground),
            Some(ResourceId::SunsetBackground),
            Some(ResourceId::DayBackground),
            None,
        ]
    );
    assert_eq!(*tk.children[&root].last().unwrap(), tk.created(Kind::TextLayer)[0]);
}

#[test]
fn tick_updates_regardless_of_unit() {
    let clock = FixedClock::new(at(9, 59), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    assert_eq!(face.bucket(), Some(TimeBucket::Sunset));

    clock.set(at(10, 0));
    face.handle_event(Event::Tick {
        time: at(10, 0),
        units_changed: TimeUnits::SECOND,
    })
    .unwrap();
    assert_eq!(face.toolkit().only_text(), Some("10:00"));
    assert_eq!(face.bucket(), Some(TimeBucket::Day));
}

#[test]
fn unload_releases_everything_once() {
    let clock = FixedClock::new(at(3, 0), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    assert_eq!(face.toolkit().live_count(Kind::Bitmap), 3);
    assert_eq!(face.toolkit().live_count(Kind::BitmapLayer), 3);
    assert_eq!(face.toolkit().live_count(Kind::TextLayer), 1);
    assert_eq!(face.toolkit().live_count(Kind::Font), 1);

    face.deinitialize();
    let tk = face.toolkit();
    assert!(tk.live.is_empty(), "leaked: {:?}", tk.live);
    assert_eq!(tk.bad_releases, 0);
    assert!(!face.is_loaded());
    assert_eq!(tk.subscription, None);

    // A second teardown has nothing left to release
    face.deinitialize();
    assert_eq!(face.toolkit().bad_releases, 0);
}

#[test]
fn disabled_sprite_is_never_created() {
    let clock = FixedClock::new(at(3, 0), true);
    let mut face = watchface(&clock, WatchfaceConfig::default());
    face.initialize().unwrap();
    assert!(face.sprite().is_none());
    assert_eq!(face.toolkit().live_count(Kind::Sequence), 0);
    assert!(face.toolkit().pending_timers.is_empty());

    // Stray timers are ignored
    face.handle_event(Event::Timer).unwrap();
    face.deinitialize();
    assert_eq!(face.toolkit().bad_releases, 0);
}

#[test]
fn failed_load_releases_partial_scene() {
    let clock = FixedClock::new(at(3, 0), true);
    let mut face = DayNightWatchface::new(
        Recorder {
            fail: Some(Kind::BitmapLayer),
            ..Recorder::new()
        },
        &clock,
        WatchfaceConfig::default(),
    );
    assert_eq!(face.initialize(), Err(Error::OutOfMemory));
    assert!(!face.is_loaded());

    // Only the window is left, and teardown removes it
    assert_eq!(face.toolkit().live.len(), 1);
    face.deinitialize();
    assert!(face.toolkit().live.is_empty());
    assert_eq!(face.toolkit().bad_releases, 0);
}

#[test]
fn sprite_plays_every_frame_then_rewinds_without_rearming() {
    let clock = FixedClock::new(at(3, 0), true);
    let config = WatchfaceConfig {
        sprite: SpriteMode::Once,
        ..WatchfaceConfig::default()
    };
    let mut face = watchface(&clock, config);
    face.initialize().unwrap();
    assert_eq!(face.toolkit().pending_delays(), vec![1]);

    let frames = face.toolkit().frame_count as usize;
    for _ in 0..frames {
        face.handle_event(Event::Timer).unwrap();
        assert_eq!(face.toolkit().pending_delays(), vec![40]);
    }
    assert_eq!(face.sprite().unwrap().frames_shown(), frames as u32);

    // Exhausted: rewound but not re-armed
    face.handle_event(Event::Timer).unwrap();
    assert!(face.toolkit().pending_timers.is_empty());
    assert!(face.toolkit().ops.iter().any(|op| matches!(op, Op::Restart(_))));
    assert_eq!(
        face.sprite().unwrap().state(),
        pinetime_daynight::ui::sprite::SpriteState::Idle
    );

    let set_bitmaps = face
        .toolkit()
        .ops
        .iter()
        .filter(|op| matches!(op, Op::SetBitmap { .. }))
        .count();
    // Three backgrounds plus one per frame
    assert_eq!(set_bitmaps, 3 + frames);

    face.deinitialize();
    assert!(face.toolkit().live.is_empty());
    assert_eq!(face.toolkit().bad_releases, 0);
}

#[test]
fn looping_sprite_rearms_after_rewind() {
    let clock = FixedClock::new(at(3, 0), true);
    let config = WatchfaceConfig {
        sprite: SpriteMode::Loop,
        ..WatchfaceConfig::default()
    };
    let mut face = watchface(&clock, config);
    face.initialize().unwrap();

    let frames = face.toolkit().frame_count as usize;
    for _ in 0..frames {
        face.handle_event(Event::Timer).unwrap();
    }
    face.handle_event(Event::Timer).unwrap();
    assert_eq!(face.toolkit().pending_delays(), vec![1]);

    face.handle_event(Event::Timer).unwrap();
    assert_eq!(face.sprite().unwrap().frames_shown(), frames as u32 + 1);
}

#[test]
fn sprite_sits_below_the_clock() {
    let clock = FixedClock::new(at(3, 0), true);
    let config = WatchfaceConfig {
        sprite: SpriteMode::Once,
        ..WatchfaceConfig::default()
    };
    let mut face = watchface(&clock, config);
    face.initialize().unwrap();
    let tk = face.toolkit();

    let root = tk.roots.values().next().copied().unwrap();
    let children = &tk.children[&root];
    assert_eq!(children.len(), 5);
    assert_eq!(*children.last().unwrap(), tk.created(Kind::TextLayer)[0]);
    assert_eq!(children[3], tk.created(Kind::BitmapLayer)[3]);
}

#[test]
fn deinitialize_cancels_pending_sprite_timer() {
    let clock = FixedClock::new(at(3, 0), true);
    let config = WatchfaceConfig {
        sprite: SpriteMode::Loop,
        ..WatchfaceConfig::default()
    };
    let mut face = watchface(&clock, config);
    face.initialize().unwrap();
    face.handle_event(Event::Timer).unwrap();
    assert_eq!(face.toolkit().pending_delays(), vec![40]);

    face.deinitialize();
    assert!(face.toolkit().pending_timers.is_empty());

    // A new session starts a single playback chain
    face.initialize().unwrap();
    assert_eq!(face.toolkit().pending_delays(), vec![1]);
}
