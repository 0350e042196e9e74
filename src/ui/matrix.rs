//! Decorative matrix-rain animation drawn behind the panels.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ123456789@#$%^&*()*&^%+-/~{[|`]}";

/// Chance per tick that a column past the bottom edge restarts at the top.
const RESET_CHANCE: f64 = 0.025;

/// Rows of fading trail drawn above each drop head.
const TRAIL: u16 = 6;

/// Backdrop animation behind the panels. Purely cosmetic: the event loop
/// ticks it on a fixed interval and hands it the frame buffer before any
/// panel is drawn, and nothing else depends on it.
pub trait Backdrop {
    fn tick(&mut self);
    fn resize(&mut self, width: u16, height: u16);
    fn draw(&self, buf: &mut Buffer);
}

/// One falling glyph column per terminal column.
pub struct MatrixRain {
    width: u16,
    height: u16,
    drops: Vec<u16>,
    rng: StdRng,
}

impl MatrixRain {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            drops: vec![0; width as usize],
            rng: StdRng::from_entropy(),
        }
    }

    /// Glyph for a cell, varied across the grid but stable between frames
    /// so the trail does not flicker.
    fn glyph(column: usize, row: u16) -> char {
        let index = column
            .wrapping_mul(31)
            .wrapping_add(row as usize * 17);
        GLYPHS[index % GLYPHS.len()] as char
    }

    fn shade(distance: u16) -> Color {
        if distance == 0 {
            return Color::Rgb(200, 255, 200);
        }
        let green = 255u16.saturating_sub(distance * 30) as u8;
        Color::Rgb(0, green, 65)
    }
}

impl Backdrop for MatrixRain {
    fn tick(&mut self) {
        for drop in self.drops.iter_mut() {
            *drop = drop.saturating_add(1);
            if *drop >= self.height + TRAIL && self.rng.gen_bool(RESET_CHANCE) {
                *drop = 0;
            }
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.drops = vec![0; width as usize];
    }

    fn draw(&self, buf: &mut Buffer) {
        let width = self.width.min(buf.area.width);
        let height = self.height.min(buf.area.height);
        for (column, &drop) in self.drops.iter().enumerate() {
            if column as u16 >= width {
                break;
            }
            for distance in 0..=TRAIL {
                if drop < distance {
                    continue;
                }
                let row = drop - distance;
                if row >= height {
                    continue;
                }
                if let Some(cell) = buf.cell_mut((column as u16, row)) {
                    cell.set_char(Self::glyph(column, row))
                        .set_style(Style::default().fg(Self::shade(distance)));
                }
            }
        }
    }
}
