use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use tracing::info;

use cedros_core::motion::{signal_for, MotionSignal};
use cedros_core::AppConfig;
use cedros_tui::{
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event},
    widgets::render_page,
    App,
};

pub async fn run(config: AppConfig) -> Result<()> {
    let signal = signal_for(config.motion.reduced_motion);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Los Cedros"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, config, signal.as_ref()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    config: AppConfig,
    signal: &dyn MotionSignal,
) -> Result<()> {
    let size = terminal.size()?;
    let fps = config.scroll.animation_fps;
    // Last row belongs to the status bar
    let mut app = App::new(config, signal, size.width, size.height.saturating_sub(1));
    let mut events = EventHandler::new(fps);

    loop {
        match events.next().await {
            AppEvent::Frame(now) => {
                app.frame(now);
                terminal.draw(|frame| render_page(frame, &app))?;
            }
            AppEvent::Key(key) => {
                app.handle_action(handle_key_event(key), events.elapsed());
            }
            AppEvent::Mouse(mouse) => {
                app.handle_action(handle_mouse_event(mouse), events.elapsed());
            }
            AppEvent::Resize(width, height) => {
                app.on_resize(width, height.saturating_sub(1));
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!(scroll_y = app.scroll_y(), "page closed");
    Ok(())
}
