use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use cedros_core::frame::FrameTime;

/// How often the blocking reader checks whether the loop has gone away
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Application events
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse wheel, button or movement
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Animation frame with the time since the loop started
    Frame(FrameTime),
}

/// Terminal input merged with a fixed-rate frame clock
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    frames: Interval,
    started: Instant,
    input_closed: bool,
    reader: Option<JoinHandle<()>>,
}

impl EventHandler {
    /// Read terminal events on a blocking thread and tick at `fps`
    pub fn new(fps: u32) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::task::spawn_blocking(move || read_terminal(tx));
        let mut handler = Self::from_channel(rx, fps);
        handler.reader = Some(reader);
        handler
    }

    /// Frame clock over an externally fed event channel
    pub fn from_channel(rx: mpsc::UnboundedReceiver<AppEvent>, fps: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
        let mut frames = tokio::time::interval(period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            rx,
            frames,
            started: Instant::now(),
            input_closed: false,
            reader: None,
        }
    }

    /// Time since the handler was created, on the same clock as frames
    pub fn elapsed(&self) -> FrameTime {
        self.started.elapsed()
    }

    /// Wait for the next input event or frame
    ///
    /// Frames win ties so a burst of input cannot starve animation.
    pub async fn next(&mut self) -> AppEvent {
        loop {
            tokio::select! {
                biased;
                _ = self.frames.tick() => return AppEvent::Frame(self.started.elapsed()),
                event = self.rx.recv(), if !self.input_closed => match event {
                    Some(event) => return event,
                    None => {
                        debug!("input channel closed");
                        self.input_closed = true;
                    }
                },
            }
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        // The reader exits on its next poll once the receiver is gone.
        self.rx.close();
        self.reader.take();
    }
}

fn read_terminal(tx: mpsc::UnboundedSender<AppEvent>) {
    loop {
        if tx.is_closed() {
            return;
        }
        let ready = match event::poll(INPUT_POLL) {
            Ok(ready) => ready,
            Err(e) => {
                warn!("Terminal poll failed: {}", e);
                return;
            }
        };
        if !ready {
            continue;
        }
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => {
                warn!("Terminal read failed: {}", e);
                return;
            }
        };
        let app_event = match event {
            // Only handle key press events, ignore release events
            // (crossterm 0.27+ sends release events on some systems)
            Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Event::Mouse(mouse) => AppEvent::Mouse(mouse),
            Event::Resize(w, h) => AppEvent::Resize(w, h),
            _ => continue,
        };
        if tx.send(app_event).is_err() {
            return;
        }
    }
}
