use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use cedros_core::carousel::CarouselView;
use cedros_core::motion::signal_for;
use cedros_core::proximity::MagneticOffset;
use cedros_core::scroll::ScrollSnapshot;
use cedros_core::AppConfig;
use cedros_tui::input::{Action, WHEEL_STEP};
use cedros_tui::App;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of animation frames to run
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Viewport width in columns
    #[arg(long, default_value_t = 80)]
    pub width: u16,

    /// Viewport height in rows
    #[arg(long, default_value_t = 24)]
    pub height: u16,

    /// Scripted input as FRAME:INPUT, repeatable. Inputs: wheel[:DELTA],
    /// page-down, page-up, top, bottom, select:N, next, prev, reduce,
    /// down:COL,ROW, drag:COL,ROW, move:COL,ROW, up
    #[arg(long = "at", value_name = "FRAME:INPUT")]
    pub steps: Vec<ScriptStep>,

    /// Only print frames whose visible state changed
    #[arg(long)]
    pub changes_only: bool,
}

/// One scripted input, applied right before its frame runs
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub frame: u32,
    pub action: Action,
}

impl FromStr for ScriptStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (frame, input) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FRAME:INPUT, got '{s}'"))?;
        let frame = frame
            .trim()
            .parse()
            .map_err(|_| format!("invalid frame number '{frame}'"))?;
        Ok(Self {
            frame,
            action: parse_input(input.trim())?,
        })
    }
}

fn parse_input(input: &str) -> Result<Action, String> {
    let (name, arg) = match input.split_once(':') {
        Some((name, arg)) => (name, Some(arg)),
        None => (input, None),
    };
    let action = match (name, arg) {
        ("wheel", None) => Action::ScrollBy(WHEEL_STEP),
        ("wheel", Some(delta)) => Action::ScrollBy(
            delta
                .parse()
                .map_err(|_| format!("invalid wheel delta '{delta}'"))?,
        ),
        ("page-down", None) => Action::PageDown,
        ("page-up", None) => Action::PageUp,
        ("top", None) => Action::JumpToTop,
        ("bottom", None) => Action::JumpToBottom,
        ("select", Some(index)) => Action::SelectItem(
            index
                .parse()
                .map_err(|_| format!("invalid item index '{index}'"))?,
        ),
        ("next", None) => Action::NextItem,
        ("prev", None) => Action::PrevItem,
        ("reduce", None) => Action::ToggleReducedMotion,
        ("up", None) => Action::PointerUp,
        ("down", Some(cell)) => {
            let (col, row) = parse_cell(cell)?;
            Action::PointerDown { col, row }
        }
        ("drag", Some(cell)) => {
            let (col, row) = parse_cell(cell)?;
            Action::PointerDrag { col, row }
        }
        ("move", Some(cell)) => {
            let (col, row) = parse_cell(cell)?;
            Action::PointerMove { col, row }
        }
        _ => return Err(format!("unknown input '{input}'")),
    };
    Ok(action)
}

fn parse_cell(cell: &str) -> Result<(u16, u16), String> {
    let (col, row) = cell
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW, got '{cell}'"))?;
    let col = col.trim().parse().map_err(|_| format!("invalid column '{col}'"))?;
    let row = row.trim().parse().map_err(|_| format!("invalid row '{row}'"))?;
    Ok((col, row))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayerReport {
    id: String,
    visible: bool,
    offset: f64,
}

/// Observable page state after one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageState {
    scroll: ScrollSnapshot,
    nav_scrolled: bool,
    active_feature: Option<String>,
    parallax: Vec<LayerReport>,
    carousel: Option<CarouselView>,
    /// Per amenity card
    magnetic: Vec<MagneticOffset>,
    reduced_motion: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameReport<'a> {
    frame: u32,
    time_ms: u128,
    callbacks: usize,
    /// Snapshots published by the scroll engine since the previous frame
    published: u64,
    #[serde(flatten)]
    state: &'a PageState,
}

fn page_state(app: &App) -> PageState {
    PageState {
        scroll: app.snapshot(),
        nav_scrolled: app.nav.is_scrolled(),
        active_feature: app.sticky.active(),
        parallax: app
            .parallax
            .layers()
            .into_iter()
            .map(|layer| LayerReport {
                id: layer.spec.id,
                visible: layer.visible,
                offset: layer.offset,
            })
            .collect(),
        carousel: app.carousel.as_ref().map(|c| c.view()),
        magnetic: (0..app.attractors.len())
            .map(|i| app.magnetic_offset(i))
            .collect(),
        reduced_motion: app.is_reduced_motion(),
    }
}

pub fn run(config: AppConfig, args: SimulateArgs) -> Result<()> {
    let signal = signal_for(config.motion.reduced_motion);
    let fps = config.scroll.animation_fps.max(1);
    let mut app = App::new(config, signal.as_ref(), args.width, args.height);

    let published = Rc::new(Cell::new(0u64));
    let _counter = {
        let published = Rc::clone(&published);
        app.engine.subscribe(move |_| published.set(published.get() + 1))
    };

    info!(frames = args.frames, steps = args.steps.len(), "simulation started");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut previous: Option<PageState> = None;

    for frame in 0..args.frames {
        let now = Duration::from_secs_f64(f64::from(frame) / f64::from(fps));
        for step in args.steps.iter().filter(|s| s.frame == frame) {
            debug!(frame, action = ?step.action, "scripted input");
            app.handle_action(step.action, now);
        }

        let callbacks = app.frame(now);
        let state = page_state(&app);
        if args.changes_only && previous.as_ref() == Some(&state) {
            published.set(0);
            continue;
        }

        let report = FrameReport {
            frame,
            time_ms: now.as_millis(),
            callbacks,
            published: published.replace(0),
            state: &state,
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
        previous = Some(state);
    }

    info!(scroll_y = app.scroll_y(), "simulation finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_steps() {
        let step: ScriptStep = "3:wheel:120".parse().unwrap();
        assert_eq!(step.frame, 3);
        assert_eq!(step.action, Action::ScrollBy(120.0));

        let step: ScriptStep = "0:wheel".parse().unwrap();
        assert_eq!(step.action, Action::ScrollBy(WHEEL_STEP));

        let step: ScriptStep = "12:drag:40,18".parse().unwrap();
        assert_eq!(step.action, Action::PointerDrag { col: 40, row: 18 });

        let step: ScriptStep = "7:select:2".parse().unwrap();
        assert_eq!(step.action, Action::SelectItem(2));

        let step: ScriptStep = "1:reduce".parse().unwrap();
        assert_eq!(step.action, Action::ToggleReducedMotion);
    }

    #[test]
    fn test_parse_script_errors() {
        assert!("wheel".parse::<ScriptStep>().is_err());
        assert!("x:wheel".parse::<ScriptStep>().is_err());
        assert!("1:fly".parse::<ScriptStep>().is_err());
        assert!("1:down:40".parse::<ScriptStep>().is_err());
        assert!("1:select".parse::<ScriptStep>().is_err());
    }

    #[test]
    fn test_page_state_tracks_scroll() {
        let mut config = AppConfig::default();
        config.scroll.smooth_enabled = false;
        let signal = cedros_core::motion::StaticMotionSignal(false);
        let mut app = App::new(config, &signal, 80, 24);

        let before = page_state(&app);
        app.handle_action(Action::ScrollBy(96.0), Duration::ZERO);
        app.frame(Duration::from_millis(16));
        let after = page_state(&app);

        assert_ne!(before, after);
        assert_eq!(after.scroll.scroll_y, 96.0);
        assert!(!after.reduced_motion);
    }
}
