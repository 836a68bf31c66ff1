//! Terminal lifecycle and the main event loop
//!
//! The loop waits on three sources at once: terminal input, the reply of
//! the in-flight request and the typing timer. All chat state is mutated
//! from here only.

use std::io::{self, IsTerminal, Stdout};
use std::panic;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use crate::config::Config;
use crate::events::AppEvent;
use crate::llm::GeminiClient;
use crate::ui::conversation::{ConversationAction, ConversationManager};

/// Run the interactive chat until the user quits
pub async fn run(config: Config) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("gemchat needs an interactive terminal; use `gemchat ask <PROMPT>` instead");
    }
    if !config.has_api_key() {
        tracing::warn!("no API key found; requests will fail until one is configured");
    }

    let client = GeminiClient::new(&config).context("Failed to create HTTP client")?;
    let model_name = client.model().to_string();
    let mut manager = ConversationManager::new(Arc::new(client), model_name, &config.ui);

    let mut terminal = setup_terminal()?;
    tracing::info!("chat started");
    let result = event_loop(&mut terminal, &mut manager).await;
    restore_terminal(&mut terminal)?;
    tracing::info!("chat ended");

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    // Restore the terminal before printing a panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    manager: &mut ConversationManager,
) -> Result<()> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| manager.render(frame.size(), frame.buffer_mut()))?;

        let event = tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => AppEvent::Terminal(event),
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "terminal event error");
                    AppEvent::InputClosed
                }
                None => AppEvent::InputClosed,
            },
            update = manager.next_update() => AppEvent::Chat(update),
        };

        match event {
            AppEvent::Terminal(Event::Key(key)) => {
                if manager.handle_key(key) == ConversationAction::Exit {
                    break;
                }
            }
            // resize and friends only need a redraw
            AppEvent::Terminal(_) => {}
            AppEvent::Chat(update) => manager.apply(update),
            AppEvent::InputClosed => break,
        }
    }

    manager.stop();
    Ok(())
}
