use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use timeline_label_renderer::config::TimelineConfig;
use timeline_label_renderer::event::Event;
use timeline_label_renderer::label::{Label, LabelSizing, StackingPolicy};
use timeline_label_renderer::layout::{Surface, compute_frame};
use timeline_label_renderer::render::render_svg;
use timeline_label_renderer::text_metrics::ApproxMeasurer;
use timeline_label_renderer::theme::Theme;

/// `count` events spread over the nineteenth century with a skewed
/// importance distribution, so most labels are small and a few are large.
fn synthetic_events(count: usize) -> Vec<Event> {
    (0..count)
        .map(|i| {
            let year = 1800 + (i * 37 % 100) as i32;
            let importance = ((i * 7919) % 20_000) as f64 / (1.0 + (i % 5) as f64);
            Event::work(format!("Work number {i}"), format!("Author {}", i % 53), year)
                .with_day(((i * 13) % 365) as f64)
                .with_importance(importance)
        })
        .collect()
}

fn build_labels(events: Vec<Event>, config: &TimelineConfig) -> Vec<Label> {
    let sizing = LabelSizing::new(config, &Theme::classic());
    events
        .into_iter()
        .map(|event| Label::build(Arc::new(event), &sizing, &ApproxMeasurer).expect("measure failed"))
        .collect()
}

fn bench_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("labels");
    let config = TimelineConfig::default();
    for count in [100usize, 1000] {
        let events = synthetic_events(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &events, |b, data| {
            b.iter(|| black_box(build_labels(data.clone(), &config).len()));
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let surface = Surface::new(1200.0, 800.0);
    for (name, stacking) in [("strict", StackingPolicy::Strict), ("fill", StackingPolicy::Fill)] {
        let config = TimelineConfig {
            stacking,
            ..TimelineConfig::default()
        };
        let view = surface.initial_view(&config);
        for count in [100usize, 1000] {
            let labels = build_labels(synthetic_events(count), &config);
            group.bench_with_input(BenchmarkId::new(name, count), &labels, |b, data| {
                b.iter(|| {
                    let frame = compute_frame(black_box(data), &view, surface, None, &config);
                    black_box(frame.labels.len());
                });
            });
        }
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let config = TimelineConfig::default();
    let theme = Theme::classic();
    let surface = Surface::new(1200.0, 800.0);
    let labels = build_labels(synthetic_events(1000), &config);
    let frame = compute_frame(&labels, &surface.initial_view(&config), surface, None, &config);
    c.bench_function("render_svg/1000", |b| {
        b.iter(|| black_box(render_svg(black_box(&frame), &labels, &theme).len()));
    });
}

criterion_group!(benches, bench_labels, bench_layout, bench_render);
criterion_main!(benches);
