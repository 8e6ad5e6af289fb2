//! Runtime: terminal lifecycle and the single event loop.
//!
//! Responsibilities
//! - Own the terminal lifecycle (alternate screen, raw mode, mouse capture).
//! - Drive one `tokio::select!` loop over terminal input, parameter feed
//!   snapshots, finished background tasks, an animation ticker and Ctrl+C.
//! - Route input to `MainView`, hand returned `Effect`s to `cmd`, and keep
//!   every spawned task in one `FuturesUnordered` so results come back as
//!   `Msg`s on this loop.
//!
//! Ticking is fast only while tasks are outstanding so the throbber moves;
//! otherwise it drops to a slow interval.

use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use paramdeck_api::ModelService;
use paramdeck_engine::ParameterFeed;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    time::{self, Interval, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::app::{App, Effect, Msg, PanelConfig};
use crate::cmd::{self, ExecContext};
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;

type PanelTerminal = Terminal<CrosstermBackend<Stdout>>;

const FAST_TICK: Duration = Duration::from_millis(100);
const IDLE_TICK: Duration = Duration::from_secs(1);

fn setup_terminal() -> Result<PanelTerminal> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("create terminal")
}

fn cleanup_terminal(terminal: &mut PanelTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn is_ctrl_c(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Route raw terminal input to the view.
fn handle_input_event(app: &mut App, main_view: &mut MainView, event: Event) -> Vec<Effect> {
    match event {
        // Release and repeat events would double every keystroke on Windows.
        Event::Key(key) if key.kind == KeyEventKind::Press => main_view.handle_key_events(app, key),
        Event::Mouse(mouse) => main_view.handle_mouse_events(app, mouse),
        Event::Resize(width, height) => app.update(Msg::Resize(width, height)),
        _ => Vec::new(),
    }
}

/// Sets up the terminal, runs the loop until quit, and restores the
/// terminal even when the loop fails.
pub async fn run_app(config: PanelConfig, service: Arc<dyn ModelService>) -> Result<()> {
    info!(entity = %config.entity, editable = config.editable, "starting parameter panel");
    let (feed, feed_updates) = ParameterFeed::spawn(Arc::clone(&service), config.entity.clone(), config.refresh_interval);
    let ctx = ExecContext::new(service, feed.refresher());
    let mut app = App::new(config);
    let mut main_view = MainView::default();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app, &mut main_view, &ctx, feed_updates).await;
    drop(feed);
    if let Err(error) = cleanup_terminal(&mut terminal) {
        warn!(%error, "failed to restore terminal");
    }
    info!("parameter panel closed");
    result
}

async fn event_loop(
    terminal: &mut PanelTerminal,
    app: &mut App,
    main_view: &mut MainView,
    ctx: &ExecContext,
    mut feed_updates: tokio::sync::mpsc::Receiver<paramdeck_engine::FeedUpdate>,
) -> Result<()> {
    let mut input = EventStream::new();
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();
    let mut current_tick = IDLE_TICK;
    let mut tick = ticker(current_tick);

    terminal.draw(|frame| {
        let area = frame.area();
        main_view.render(frame, area, app);
    })?;

    loop {
        let wanted_tick = if pending.is_empty() { IDLE_TICK } else { FAST_TICK };
        if wanted_tick != current_tick {
            current_tick = wanted_tick;
            tick = ticker(current_tick);
        }

        let effects = tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(event)) if is_ctrl_c(&event) => break,
                Some(Ok(event)) => handle_input_event(app, main_view, event),
                Some(Err(error)) => {
                    warn!(%error, "failed to read terminal input");
                    break;
                }
                None => break,
            },
            Some(update) = feed_updates.recv() => app.update(Msg::Feed(update)),
            Some(joined) = pending.next(), if !pending.is_empty() => {
                let msg = joined.unwrap_or_else(|error| Msg::TaskFailed(error.to_string()));
                app.update(msg)
            }
            _ = tick.tick() => app.update(Msg::Tick),
            _ = signal::ctrl_c() => break,
        };

        if effects.contains(&Effect::Quit) {
            break;
        }
        pending.extend(cmd::run_from_effects(app, ctx, effects));
        app.executing = !pending.is_empty();
        if !app.executing {
            app.throbber_idx = 0;
        }

        terminal.draw(|frame| {
            let area = frame.area();
            main_view.render(frame, area, app);
        })?;
    }

    for handle in pending.iter() {
        handle.abort();
    }
    Ok(())
}
