//! Terminal user interface for voice message playback.
//!
//! Renders the message waveform as bars with the played portion highlighted,
//! a footer with play state and timing, and handles the playback key bindings.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::{Gauge, Sparkline},
};
use std::error::Error;
use std::io::{stdout, Stdout};

use crate::waveform;

/// User input command during playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    /// Keep playing (no key pressed)
    Continue,
    /// Pause/resume playback (Space key)
    TogglePause,
    /// Scrub forward by 5% (Right arrow or 'l')
    SeekForward,
    /// Scrub backward by 5% (Left arrow or 'h')
    SeekBackward,
    /// Jump to a fraction of the duration (digit keys)
    JumpTo(f64),
    /// Skip to the next message ('n')
    Next,
    /// Skip to the previous message ('p')
    Prev,
    /// Confirm/retry (Enter key, used on the load-failure screen)
    Confirm,
    /// Exit the player (Escape or 'q')
    Quit,
}

/// Everything the footer needs to describe the current message.
#[derive(Debug, Clone)]
pub struct PlayerStatus {
    /// Message title (sender or filename)
    pub title: String,
    /// Current playback position in seconds
    pub position_secs: f64,
    /// Total duration in seconds
    pub duration_secs: f64,
    /// Whether playback is paused
    pub is_paused: bool,
    /// Whether this message is still unread
    pub unread: bool,
    /// 1-based cursor position in the queue
    pub queue_position: (usize, usize),
}

/// Terminal UI for voice message playback with waveform visualization.
pub struct PlayerTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Decoded waveform samples of the current message (0-31)
    samples: Vec<u8>,
    /// Expanded per-column heights, margins included
    column_data: Vec<u64>,
    /// Number of bars currently displayed
    bar_count: usize,
    terminal_width: usize,
    bar_width: usize,
    bar_margin: usize,
    height_min: u64,
    height_max: u64,
}

impl PlayerTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(
        bar_width: usize,
        bar_margin: usize,
        height_min: u64,
        height_max: u64,
    ) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let terminal_width = size.width as usize;

        Ok(PlayerTui {
            terminal,
            samples: Vec::new(),
            column_data: Vec::new(),
            bar_count: 0,
            terminal_width,
            bar_width: bar_width.max(1),
            bar_margin,
            height_min,
            height_max,
        })
    }

    /// Sets the waveform samples for the current message and rebuilds bars.
    pub fn set_waveform(&mut self, samples: Vec<u8>) {
        self.samples = samples;
        self.rebuild_bars();
    }

    /// Recomputes bar heights for the current samples and terminal width.
    fn rebuild_bars(&mut self) {
        self.bar_count = waveform::bar_count(
            self.terminal_width,
            self.bar_width,
            self.bar_margin,
            self.samples.len(),
        );
        let heights = waveform::bar_heights(
            &self.samples,
            self.bar_count,
            self.height_min,
            self.height_max,
        );

        // One entry per terminal column: bar_width columns of the bar's
        // height followed by bar_margin empty columns
        self.column_data.clear();
        for &height in &heights {
            for _ in 0..self.bar_width {
                self.column_data.push(height);
            }
            for _ in 0..self.bar_margin {
                self.column_data.push(0);
            }
        }
    }

    /// Renders the playback view: waveform bars, played highlight, footer.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_player(&mut self, status: &PlayerStatus) -> Result<(), Box<dyn Error>> {
        let size = self.terminal.size()?;
        let current_width = size.width as usize;
        if current_width != self.terminal_width {
            self.terminal_width = current_width;
            self.rebuild_bars();
        }

        let progress = if status.duration_secs > 0.0 {
            (status.position_secs / status.duration_secs).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let played_bars = (progress * self.bar_count as f64).round() as usize;
        let pitch = self.bar_width + self.bar_margin;
        let played_columns = (played_bars * pitch).min(self.column_data.len());

        let column_data = &self.column_data;
        let height_max = self.height_max;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let footer_height = 1;
            let content_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            // Keep the waveform strip vertically centered and no taller than
            // the tallest bar
            let wave_height = (content_area.height).min(height_max.max(1) as u16).max(1);
            let wave_y = content_area.y + (content_area.height.saturating_sub(wave_height)) / 2;

            let played_width = (played_columns as u16).min(content_area.width);

            let played_area = Rect {
                x: content_area.x,
                y: wave_y,
                width: played_width,
                height: wave_height,
            };
            let remaining_area = Rect {
                x: content_area.x + played_width,
                y: wave_y,
                width: content_area.width.saturating_sub(played_width),
                height: wave_height,
            };

            // Played bars take the accent style, the rest stay muted; this is
            // the scrub/progress display, so both halves share one data array
            if played_area.width > 0 {
                let played = Sparkline::default()
                    .data(&column_data[..played_columns])
                    .max(height_max)
                    .style(Style::default().fg(Color::Rgb(91, 178, 255)));
                frame.render_widget(played, played_area);
            }
            if remaining_area.width > 0 && played_columns < column_data.len() {
                let remaining = Sparkline::default()
                    .data(&column_data[played_columns..])
                    .max(height_max)
                    .style(Style::default().fg(Color::Rgb(110, 118, 129)));
                frame.render_widget(remaining, remaining_area);
            }

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let indicator = if status.is_paused {
                Span::styled("⏸ ", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("▶ ", Style::default().fg(Color::Green))
            };

            let time_span = Span::raw(format!(
                "{} / {}",
                format_time(status.position_secs),
                format_time(status.duration_secs)
            ));

            let (queue_index, queue_len) = status.queue_position;
            let queue_span = if queue_len > 1 {
                Span::raw(format!(" [{queue_index}/{queue_len}]"))
            } else {
                Span::raw(String::new())
            };

            let unread_span = if status.unread {
                Span::styled(" ●", Style::default().fg(Color::Rgb(91, 178, 255)))
            } else {
                Span::raw(String::new())
            };

            let footer_line = Line::from(vec![
                indicator,
                time_span,
                Span::raw("  "),
                Span::raw(status.title.clone()),
                unread_span,
                queue_span,
            ]);

            let footer = ratatui::widgets::Paragraph::new(footer_line).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Renders the loading gauge shown while a message downloads/decodes.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_loading(&mut self, title: &str, fraction: f64) -> Result<(), Box<dyn Error>> {
        self.terminal.draw(|frame| {
            let area = frame.area();

            let gauge_area = Rect {
                x: area.x + area.width / 10,
                y: area.y + area.height / 2,
                width: (area.width * 8) / 10,
                height: 1,
            };

            let gauge = Gauge::default()
                .ratio(fraction.clamp(0.0, 1.0))
                .label(format!("Loading {title}..."))
                .gauge_style(Style::default().fg(Color::Rgb(91, 178, 255)));
            frame.render_widget(gauge, gauge_area);
        })?;

        Ok(())
    }

    /// Renders the load-failure view.
    ///
    /// Shown in place of the waveform when a message fails to load; Enter
    /// retries the load, 'n' skips ahead, Esc/q leaves the player.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_load_error(&mut self, title: &str, error: &str) -> Result<(), Box<dyn Error>> {
        self.terminal.draw(|frame| {
            let area = frame.area();

            let text_area = Rect {
                x: area.x + area.width / 10,
                y: area.y + area.height / 2,
                width: (area.width * 8) / 10,
                height: area.height.saturating_sub(area.height / 2),
            };

            let lines = vec![
                Line::from(Span::styled(
                    format!("Failed to load {title}"),
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::raw(error.to_string())),
                Line::from(Span::raw("")),
                Line::from(Span::raw("Enter: retry    n: skip    q: quit")),
            ];

            let paragraph = ratatui::widgets::Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true });
            frame.render_widget(paragraph, text_area);
        })?;

        Ok(())
    }

    /// Processes user input and returns the appropriate playback command.
    ///
    /// # Returns
    /// - `Continue` if no key or an unrecognized key was pressed
    /// - The matching [`PlayerCommand`] otherwise
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<PlayerCommand, Box<dyn Error>> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char(' ') => {
                        tracing::debug!("Space pressed: toggling pause");
                        PlayerCommand::TogglePause
                    }
                    KeyCode::Right | KeyCode::Char('l') => PlayerCommand::SeekForward,
                    KeyCode::Left | KeyCode::Char('h') => PlayerCommand::SeekBackward,
                    KeyCode::Char(c @ '0'..='9') => {
                        // Scrub by position: digit n jumps to n/10 of the
                        // duration, the keyboard analog of click-at-offset
                        let fraction = (c as u8 - b'0') as f64 / 10.0;
                        tracing::debug!("Digit pressed: jumping to {:.0}%", fraction * 100.0);
                        PlayerCommand::JumpTo(fraction)
                    }
                    KeyCode::Char('n') => PlayerCommand::Next,
                    KeyCode::Char('p') => PlayerCommand::Prev,
                    KeyCode::Enter => PlayerCommand::Confirm,
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: exiting player");
                        PlayerCommand::Quit
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: exiting player");
                        PlayerCommand::Quit
                    }
                    _ => PlayerCommand::Continue,
                });
            }
        }
        Ok(PlayerCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Formats seconds as `m:ss`, shared by the footer and the CLI listings.
pub fn format_time(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.4), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-1.0), "0:00");
    }
}
