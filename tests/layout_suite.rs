use std::path::{Path, PathBuf};

use timeline_label_renderer::text_metrics::ApproxMeasurer;
use timeline_label_renderer::{
    Command, Config, EventSource, FetchOutcome, FrameLayout, MemorySource, StackingPolicy, Surface,
    Theme, TimelineConfig, TimelineController, ZoomDirection, render_svg,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn controller_with(config: TimelineConfig) -> TimelineController {
    TimelineController::new(
        config,
        &Theme::classic(),
        Surface::new(1200.0, 800.0),
        Box::new(ApproxMeasurer),
    )
}

/// Runs every command the way a host would, synchronously.
fn drive(controller: &mut TimelineController, source: &MemorySource, commands: Vec<Command>) {
    for command in commands {
        if let Command::Fetch(request) = command {
            let result = source.events(request.start_year, request.end_year, request.max_count);
            controller.apply_fetch(request.seq, result);
        }
    }
}

fn assert_no_collisions(frame: &FrameLayout, context: &str) {
    for (i, a) in frame.labels.iter().enumerate() {
        for b in &frame.labels[i + 1..] {
            if a.bounds.overlaps_x(&b.bounds) {
                assert!(
                    a.bounds.bottom() <= b.bounds.y || b.bounds.bottom() <= a.bounds.y,
                    "{context}: label {} overlaps label {}",
                    a.label,
                    b.label
                );
            }
        }
    }
}

#[test]
fn render_all_fixtures() {
    for name in ["novels.csv", "inventions.csv", "events.json"] {
        let source = MemorySource::from_path(&fixture(name)).expect("fixture load failed");
        assert!(!source.is_empty(), "{name}: no events loaded");
        let mut controller = controller_with(TimelineConfig::default());
        let commands = controller.start();
        drive(&mut controller, &source, commands);
        let frame = controller.frame().clone();
        assert_no_collisions(&frame, name);
        let svg = render_svg(&frame, controller.labels(), &Theme::classic());
        assert_valid_svg(&svg, name);
    }
}

#[test]
fn fixture_rows_are_repaired_or_skipped() {
    let novels = MemorySource::from_path(&fixture("novels.csv")).unwrap();
    assert_eq!(novels.len(), 19);
    let jane_eyre = novels
        .all()
        .iter()
        .find(|event| event.display_title() == "Jane Eyre")
        .unwrap();
    assert_eq!(jane_eyre.year, 1847);
    assert_eq!(jane_eyre.day_in_year, 183.0);

    let inventions = MemorySource::from_path(&fixture("inventions.csv")).unwrap();
    assert_eq!(inventions.len(), 5);
    assert_eq!(inventions.all()[2].year, 1876);

    let json = MemorySource::from_path(&fixture("events.json")).unwrap();
    assert_eq!(json.len(), 4);
    assert!(json.all().iter().any(|event| event.year == 1856));
}

#[test]
fn no_collisions_through_pan_and_zoom() {
    let source = MemorySource::from_path(&fixture("novels.csv")).unwrap();
    for stacking in [StackingPolicy::Strict, StackingPolicy::Fill] {
        let mut controller = controller_with(TimelineConfig {
            stacking,
            ..TimelineConfig::default()
        });
        let commands = controller.start();
        drive(&mut controller, &source, commands);

        let steps: [fn(&mut TimelineController) -> Vec<Command>; 5] = [
            |c| c.pan(-240.0, 0.0),
            |c| c.zoom(600.0, ZoomDirection::In),
            |c| c.zoom(300.0, ZoomDirection::In),
            |c| c.pan(400.0, -30.0),
            |c| c.zoom(900.0, ZoomDirection::Out),
        ];
        for (idx, step) in steps.iter().enumerate() {
            let span_before = controller.view().span();
            let commands = step(&mut controller);
            drive(&mut controller, &source, commands);
            let frame = controller.frame().clone();
            assert_no_collisions(&frame, &format!("{stacking:?} step {idx}"));
            if idx == 0 || idx == 3 {
                assert!((controller.view().span() - span_before).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn visible_labels_are_in_range_and_importance_ordered() {
    let source = MemorySource::from_path(&fixture("novels.csv")).unwrap();
    let mut controller = controller_with(TimelineConfig {
        initial_min_year: 1810.0,
        initial_max_year: 1850.0,
        ..TimelineConfig::default()
    });
    let commands = controller.start();
    drive(&mut controller, &source, commands);
    let frame = controller.frame().clone();
    let labels = controller.labels();

    assert!(!frame.labels.is_empty());
    let mut previous = f64::INFINITY;
    for placed in &frame.labels {
        let label = &labels[placed.label];
        assert!((1810..=1850).contains(&label.year()));
        assert!(label.importance() <= previous);
        previous = label.importance();
    }
    // The fetch window is padded, so some fetched labels are off screen.
    assert!(labels.len() > frame.labels.len());
}

#[test]
fn stale_responses_never_replace_newer_ones() {
    let source = MemorySource::from_path(&fixture("novels.csv")).unwrap();
    let mut controller = controller_with(TimelineConfig::default());
    let first = controller.start();
    let second = controller.zoom(600.0, ZoomDirection::In);
    let request = |commands: &[Command]| {
        commands
            .iter()
            .find_map(|command| match command {
                Command::Fetch(request) => Some(*request),
                _ => None,
            })
            .unwrap()
    };
    let (first, second) = (request(&first[..]), request(&second[..]));

    let newer = source.events(second.start_year, second.end_year, 2).unwrap();
    assert!(matches!(
        controller.apply_fetch(second.seq, Ok(newer)),
        FetchOutcome::Applied { labels: 2, .. }
    ));
    let older = source.events(first.start_year, first.end_year, 1000).unwrap();
    assert_eq!(controller.apply_fetch(first.seq, Ok(older)), FetchOutcome::Stale);
    assert_eq!(controller.labels().len(), 2);
}

#[test]
fn config_file_drives_the_frame() {
    let config = timeline_label_renderer::config::parse_config(
        r#"{
            // narrow window around the 1840s
            theme: "modern",
            timeline: { minYear: 1840, maxYear: 1860, stacking: "fill" },
        }"#,
    )
    .unwrap();
    let Config { theme, timeline, .. } = config;
    assert_eq!(timeline.stacking, StackingPolicy::Fill);

    let source = MemorySource::from_path(&fixture("novels.csv")).unwrap();
    let mut controller =
        TimelineController::new(timeline, &theme, Surface::new(900.0, 600.0), Box::new(ApproxMeasurer));
    let commands = controller.start();
    drive(&mut controller, &source, commands);
    let frame = controller.frame().clone();
    assert_eq!(frame.band_width, 2.0);
    assert_eq!(frame.timeline_y, 485.0);
    let svg = render_svg(&frame, controller.labels(), &theme);
    assert!(svg.contains(&theme.band_color));
    assert!(svg.contains("Moby-Dick"));
}
