//! Full-screen error display for fatal startup problems.
//!
//! Used for errors the player TUI cannot recover from, such as a broken
//! config file. The message is shown on a red screen until any key is pressed.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use std::io::{self, Stdout};

pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Shows the message on a red screen and blocks until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();

                let background = ratatui::widgets::Block::default()
                    .style(Style::default().bg(Color::Rgb(200, 30, 30)));
                frame.render_widget(background, area);

                // Message in the middle band, hint on the bottom line
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Fill(1),
                        Constraint::Length(area.height / 3),
                        Constraint::Fill(1),
                        Constraint::Length(1),
                    ])
                    .split(area);

                let body = Paragraph::new(error_message)
                    .style(Style::default().fg(Color::White).bg(Color::Rgb(200, 30, 30)))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(body, rows[1]);

                let hint = Paragraph::new("Press any key to exit")
                    .style(
                        Style::default()
                            .fg(Color::Rgb(255, 200, 200))
                            .bg(Color::Rgb(200, 30, 30)),
                    )
                    .alignment(Alignment::Center);
                frame.render_widget(hint, rows[3]);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
