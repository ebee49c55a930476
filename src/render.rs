use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

use crate::display::{Display, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Renderer paints the framebuffer somewhere. The interpreter knows nothing
/// about it; the driver hands it the display whenever it is dirty.
pub trait Renderer {
    fn render(&mut self, display: &Display) -> Result<(), io::Error>;
}

// framebuffer size and how many terminal cells each pixel covers per axis
struct Resolution(usize, usize, usize);

impl Resolution {
    fn cell_width(&self) -> usize {
        self.0 * self.2
    }

    fn cell_height(&self) -> usize {
        self.1 * self.2
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.cell_width() - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.cell_height() - 1) as f64, 0.0]
    }

    /// canvas coordinates of every cell covered by a lit pixel; y grows
    /// downwards on screen, so it is negated for the canvas
    fn lit_cells<'a>(&self, display: &'a Display) -> impl Iterator<Item = (f64, f64)> + 'a {
        let scale = self.2;
        display.lit().flat_map(move |(x, y)| {
            (0..scale * scale).map(move |n| {
                let cx = x * scale + n % scale;
                let cy = y * scale + n / scale;
                (cx as f64, -1.0 * cy as f64)
            })
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm on the
/// alternate screen
pub struct MonoTermRenderer {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermRenderer {
    pub fn new(scale: usize) -> Result<MonoTermRenderer, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermRenderer {
            terminal,
            resolution: Resolution(SCREEN_WIDTH, SCREEN_HEIGHT, scale.max(1)),
        })
    }
}

impl Drop for MonoTermRenderer {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Renderer for MonoTermRenderer {
    fn render(&mut self, display: &Display) -> Result<(), io::Error> {
        let coords: Vec<(f64, f64)> = self.resolution.lit_cells(display).collect();
        let wanted = Rect::new(
            0,
            0,
            2 + self.resolution.cell_width() as u16,
            2 + self.resolution.cell_height() as u16,
        );
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();

        self.terminal.draw(|f| {
            // never draw outside a terminal smaller than the canvas
            let size = f.size().intersection(wanted);
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers what it was asked to draw
#[derive(Default)]
pub struct DummyRenderer {
    pub frames: usize,
    pub last_lit: usize,
}

impl DummyRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DummyRenderer {
    fn render(&mut self, display: &Display) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_lit = display.lit().count();
        Ok(())
    }
}
