use std::fmt::Write as _;

use rayon::iter::ParallelIterator;
use rayon::slice::ParallelSliceMut;

use crate::core::Color;

/// Something the pipeline can draw into. Depth is view space distance, smaller is
/// closer.
pub trait Buffer: Send {
    fn new(width: usize, height: usize) -> Self
    where
        Self: Sized;
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn clear(&mut self, background: Color);
    fn set_pixel(&mut self, pos: (usize, usize), depth: f32, color: Color);
    fn color_at(&self, pos: (usize, usize)) -> Option<Color>;
}

/// 0x00RRGGBB pixels, ready for `minifb::Window::update_with_buffer`.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
    pub depth: Vec<f32>,
}

impl Buffer for FrameBuffer {
    fn new(width: usize, height: usize) -> Self {
        let buf_size = width * height;
        FrameBuffer {
            width,
            height,
            data: vec![0; buf_size],
            depth: vec![f32::INFINITY; buf_size],
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self, background: Color) {
        let bg = background.to_u32();
        self.data.par_chunks_mut(1024).for_each(|chunk| {
            for point in chunk {
                *point = bg;
            }
        });
        self.depth.par_chunks_mut(1024).for_each(|chunk| {
            for d in chunk {
                *d = f32::INFINITY;
            }
        });
    }

    fn set_pixel(&mut self, pos: (usize, usize), depth: f32, color: Color) {
        if pos.0 < self.width && pos.1 < self.height {
            let index = pos.0 + pos.1 * self.width;
            if depth < self.depth[index] {
                self.data[index] = color.to_u32();
                self.depth[index] = depth;
            }
        }
    }

    fn color_at(&self, pos: (usize, usize)) -> Option<Color> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return None;
        }
        let v = self.data[pos.0 + pos.1 * self.width];
        Some(Color::new(
            ((v >> 16) & 0xFF) as f32 / 255.0,
            ((v >> 8) & 0xFF) as f32 / 255.0,
            (v & 0xFF) as f32 / 255.0,
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
}

impl Cell {
    pub const BLOCK: char = '█';
}

/// One character cell per pixel, drawn with 24-bit ANSI colour.
pub struct TermBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<Cell>,
    pub depth: Vec<f32>,
}

impl Buffer for TermBuffer {
    fn new(width: usize, height: usize) -> Self {
        TermBuffer {
            width,
            height,
            data: vec![
                Cell {
                    ch: ' ',
                    color: Color::BLACK
                };
                width * height
            ],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self, background: Color) {
        self.data.par_chunks_mut(1024).for_each(|chunk| {
            for cell in chunk {
                *cell = Cell {
                    ch: Cell::BLOCK,
                    color: background,
                };
            }
        });
        self.depth.par_chunks_mut(1024).for_each(|chunk| {
            for depth in chunk {
                *depth = f32::INFINITY;
            }
        });
    }

    fn set_pixel(&mut self, pos: (usize, usize), depth: f32, color: Color) {
        if pos.0 < self.width && pos.1 < self.height {
            let index = pos.0 + pos.1 * self.width;
            if depth < self.depth[index] {
                self.data[index] = Cell {
                    ch: Cell::BLOCK,
                    color,
                };
                self.depth[index] = depth;
            }
        }
    }

    fn color_at(&self, pos: (usize, usize)) -> Option<Color> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return None;
        }
        Some(self.data[pos.0 + pos.1 * self.width].color)
    }
}

impl TermBuffer {
    /// The whole frame as one string of cursor moves, colour changes and cells.
    /// Runs of equal colour share a single escape sequence.
    pub fn to_ansi(&self) -> String {
        let mut output = String::with_capacity(self.width * self.height * 4);
        let mut last_color: Option<u32> = None;

        output.push_str("\x1B[H"); // Move cursor to home position
        for y in 0..self.height {
            let _ = write!(output, "\x1B[{};1H", y + 1);
            for x in 0..self.width {
                let cell = &self.data[x + y * self.width];
                let packed = cell.color.to_u32();
                if last_color != Some(packed) {
                    let _ = write!(
                        output,
                        "\x1b[38;2;{};{};{}m",
                        (packed >> 16) & 0xFF,
                        (packed >> 8) & 0xFF,
                        packed & 0xFF
                    );
                    last_color = Some(packed);
                }
                output.push(cell.ch);
            }
        }
        output.push_str("\x1b[0m");
        output
    }
}
