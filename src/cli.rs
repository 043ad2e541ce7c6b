use crate::config::{Config, load_config};
use crate::controller::{Command, TimelineController};
use crate::layout::{Surface, ZoomDirection};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::source::{EventSource, MemorySource};
use crate::text_metrics::measurer;
use crate::theme::Theme;
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "tlr", version, about = "Timeline label layout and rendering")]
pub struct Args {
    /// Event table (.csv or .json) or '-' for JSON on stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme preset (classic, modern)
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// First visible year
    #[arg(long = "from")]
    pub from: Option<f64>,

    /// Last visible year
    #[arg(long = "to")]
    pub to: Option<f64>,

    /// Gesture to replay before rendering, e.g. `pan:-120,0`, `zoom-in:600`,
    /// `hover:400,620` or `click:400,620`. Repeatable; applied in order.
    #[arg(short = 'g', long = "gesture")]
    pub gestures: Vec<Gesture>,

    /// Write the final frame layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Use approximate glyph widths instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// A scripted pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Pan { dx: f64, dy: f64 },
    Zoom { x: f64, direction: ZoomDirection },
    Hover { x: f64, y: f64 },
    Click { x: f64, y: f64 },
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("gesture `{s}` needs a `kind:args` form"))?;
        let numbers = rest
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("gesture `{s}`: `{}` is not a number", part.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        match (kind.trim(), numbers.as_slice()) {
            ("pan", [dx]) => Ok(Gesture::Pan { dx: *dx, dy: 0.0 }),
            ("pan", [dx, dy]) => Ok(Gesture::Pan { dx: *dx, dy: *dy }),
            ("zoom-in", [x]) => Ok(Gesture::Zoom {
                x: *x,
                direction: ZoomDirection::In,
            }),
            ("zoom-out", [x]) => Ok(Gesture::Zoom {
                x: *x,
                direction: ZoomDirection::Out,
            }),
            ("hover", [x, y]) => Ok(Gesture::Hover { x: *x, y: *y }),
            ("click", [x, y]) => Ok(Gesture::Click { x: *x, y: *y }),
            _ => Err(format!("unrecognised gesture `{s}`")),
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args)?;

    let source = read_source(&args.input)?;
    let surface = Surface::new(f64::from(config.render.width), f64::from(config.render.height));
    let mut controller = TimelineController::new(
        config.timeline.clone(),
        &config.theme,
        surface,
        measurer(config.timeline.fast_text_metrics),
    );

    let commands = controller.start();
    execute(&mut controller, &source, commands);
    for gesture in &args.gestures {
        controller.frame();
        let commands = replay(&mut controller, *gesture);
        execute(&mut controller, &source, commands);
    }

    let frame = controller.frame().clone();
    log::info!(
        "frame {:.1}..{:.1}: {} labels placed",
        frame.view.min_year,
        frame.view.max_year,
        frame.labels.len()
    );
    let svg = render_svg(&frame, controller.labels(), &config.theme);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &frame, controller.labels())?;
    }
    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.format_timestamp_secs();
    if quiet {
        builder.filter_level(LevelFilter::Error);
    } else if verbose > 0 {
        builder.filter_level(match verbose {
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }
    let _ = builder.try_init();
}

fn apply_args(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(name) = args.theme.as_deref() {
        config.theme =
            Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme `{name}`"))?;
        config.render.background = config.theme.background.clone();
    }
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(from) = args.from {
        config.timeline.initial_min_year = from;
    }
    if let Some(to) = args.to {
        config.timeline.initial_max_year = to;
    }
    if config.timeline.initial_max_year <= config.timeline.initial_min_year {
        anyhow::bail!(
            "--to ({}) must be later than --from ({})",
            config.timeline.initial_max_year,
            config.timeline.initial_min_year
        );
    }
    if args.fast_text {
        config.timeline.fast_text_metrics = true;
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<MemorySource> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(MemorySource::load_json(&buf)?);
    }
    Ok(MemorySource::from_path(path)?)
}

fn replay(controller: &mut TimelineController, gesture: Gesture) -> Vec<Command> {
    log::debug!("replaying {gesture:?}");
    match gesture {
        Gesture::Pan { dx, dy } => controller.pan(dx, dy),
        Gesture::Zoom { x, direction } => controller.zoom(x, direction),
        Gesture::Hover { x, y } => controller.pointer_move(x, y),
        Gesture::Click { x, y } => {
            let mut commands = controller.pointer_down(x, y);
            commands.extend(controller.pointer_up(x, y));
            commands
        }
    }
}

/// Carries out controller commands synchronously against the source.
fn execute(controller: &mut TimelineController, source: &dyn EventSource, commands: Vec<Command>) {
    for command in commands {
        match command {
            Command::Redraw => {}
            Command::Fetch(request) => {
                let result = source.events(request.start_year, request.end_year, request.max_count);
                controller.apply_fetch(request.seq, result);
            }
            Command::OpenLink(url) => match source.article_content(&url) {
                Ok(Some(content)) => println!("{content}"),
                Ok(None) => eprintln!("{url}"),
                Err(err) => log::warn!("article for {url} unavailable: {err}"),
            },
            Command::DismissOverlay => log::debug!("overlay dismissed"),
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
