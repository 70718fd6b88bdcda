// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based live preview
//!
//! Renders the presented surface to the terminal using Unicode half-block
//! characters for improved vertical resolution. Each input poll doubles as a
//! display refresh for the pipeline driver.

use crate::constants::timing::TERMINAL_POLL_INTERVAL;
use crate::errors::AppResult;
use crate::media::RasterSurface;
use crate::pipelines::driver::{PipelineDriver, TickOutcome};
use crate::pipelines::photo::CaptureExporter;
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Run the terminal preview until the user quits or the source ends
///
/// The driver must already have a source attached. It is torn down before
/// returning.
pub fn run(
    driver: &mut PipelineDriver,
    exporter: &CaptureExporter,
    capture_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, driver, exporter, capture_dir);
    driver.teardown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    driver: &mut PipelineDriver,
    exporter: &CaptureExporter,
    capture_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(source = ?driver.source_name(), "Starting terminal preview");

    let mut show_help = false;
    let mut status_message = build_status_message(driver);
    let mut ended = false;

    loop {
        if !ended && driver.tick() == TickOutcome::Ended {
            ended = true;
            status_message = "Stream ended | 'p' picture | 'q' quit".to_string();
        }

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let frame_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            f.render_widget(
                FrameWidget {
                    surface: driver.presented_surface(),
                },
                frame_area,
            );

            // Render status bar
            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            let status = StatusBar {
                message: &status_message,
            };
            f.render_widget(status, status_area);
        })?;

        // Handle input; the poll timeout paces the refresh
        if event::poll(TERMINAL_POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            // 'f' to toggle the filter
            if key.code == KeyCode::Char('f') && !ended {
                show_help = false;
                driver.toggle_mode();
                status_message = build_status_message(driver);
            }

            // 'p' to take a picture
            if key.code == KeyCode::Char('p') {
                show_help = false;
                match save_snapshot(driver, exporter, capture_dir) {
                    Ok(path) => {
                        status_message = format!("Saved: {}", path.display());
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to save snapshot");
                        status_message = format!("Error: {}", e);
                    }
                }
            }

            // 'h' to toggle help
            if key.code == KeyCode::Char('h') {
                show_help = !show_help;
                status_message = if show_help {
                    build_help_message()
                } else {
                    build_status_message(driver)
                };
            }

            // 'q' also quits
            if key.code == KeyCode::Char('q') {
                break;
            }
        }
    }

    Ok(())
}

fn build_status_message(driver: &PipelineDriver) -> String {
    format!(
        "{} | 'f' filter | 'p' picture | 'h' help | 'q' quit",
        driver.mode().display_name()
    )
}

fn build_help_message() -> String {
    String::from("f: Toggle filter | p: Save picture | h: Toggle help | q/Ctrl+C: Quit")
}

/// Capture the presented surface and save it
fn save_snapshot(
    driver: &PipelineDriver,
    exporter: &CaptureExporter,
    capture_dir: &Path,
) -> AppResult<PathBuf> {
    let image = driver.capture_current_frame(exporter)?;
    storage::save_capture(&image, capture_dir)
}

/// Widget that renders a surface using half-block characters
struct FrameWidget<'a> {
    surface: Option<&'a RasterSurface>,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(surface) = self.surface else {
            // No frame yet - show placeholder
            let msg = "Waiting for frames...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let (width, height) = surface.dimensions();
        if width == 0 || height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let frame_aspect = width as f64 / height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64; // *2 because half-blocks

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        // Scale factors
        let x_scale = width as f64 / display_width as f64;
        let y_scale = height as f64 / (display_height * 2) as f64;

        // Render using half-block characters
        // Each terminal cell represents 2 vertical pixels:
        // - Upper half (▀) colored with fg
        // - Lower half colored with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let top_color = sample_pixel(surface, src_x, src_y_top);
                let bottom_color = sample_pixel(surface, src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

fn sample_pixel(surface: &RasterSurface, x: u32, y: u32) -> Color {
    let x = x.min(surface.width() - 1);
    let y = y.min(surface.height() - 1);
    let p = surface.get_pixel(x, y);
    Color::Rgb(p[0], p[1], p[2])
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Render text
        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}
