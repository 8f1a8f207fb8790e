//! Retro CRT Terminal
//!
//! A minimal interactive terminal rendered through the phosphor effect
//! pipeline: type at the prompt, Enter commits the line to scrollback,
//! Tab cycles the phosphor color theme.

use phosphor::{App, AppHandler, Chime, FrameSource, FrameState, Renderer, SourceImage};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

const PROMPT: &str = "> ";
const MAX_SCROLLBACK: usize = 200;
const CURSOR_BLINK_HZ: f32 = 1.6;

/// 5x7 block glyph bitmaps, one byte per row, low 5 bits used.
struct Glyph([u8; 7]);

fn glyph(c: char) -> Glyph {
    let rows: [u8; 7] = match c.to_ascii_uppercase() {
        ' ' => [0; 7],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x13, 0x15, 0x15, 0x15, 0x19, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        ';' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '*' => [0x00, 0x15, 0x0E, 0x1F, 0x0E, 0x15, 0x00],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '\\' => [0x10, 0x10, 0x08, 0x04, 0x02, 0x01, 0x01],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '[' => [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E],
        ']' => [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '"' => [0x0A, 0x0A, 0x14, 0x00, 0x00, 0x00, 0x00],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '$' => [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '@' => [0x0E, 0x11, 0x17, 0x15, 0x17, 0x10, 0x0E],
        // Unknown glyphs render as a dim block rather than vanishing.
        _ => [0x1F; 7],
    };
    Glyph(rows)
}

/// Scrollback, prompt editor and the block-glyph rasterizer.
struct TerminalSource {
    scrollback: Vec<String>,
    prompt_line: String,
    pixels: Vec<u8>,
    cell_width: f32,
    line_height: f32,
}

impl TerminalSource {
    fn new(line_height: f32) -> Self {
        Self {
            scrollback: vec![
                "PHOSPHOR TERMINAL V0.1".to_string(),
                "TYPE AND PRESS ENTER. TAB CYCLES THEMES.".to_string(),
                String::new(),
            ],
            prompt_line: String::new(),
            pixels: Vec::new(),
            cell_width: line_height * 0.55,
            line_height,
        }
    }

    fn commit_line(&mut self) {
        let line = format!("{PROMPT}{}", self.prompt_line);
        self.scrollback.push(line);
        self.prompt_line.clear();
        if self.scrollback.len() > MAX_SCROLLBACK {
            let excess = self.scrollback.len() - MAX_SCROLLBACK;
            self.scrollback.drain(..excess);
        }
    }

    fn draw_glyph(&mut self, c: char, origin_x: f32, origin_y: f32, width: u32, height: u32) {
        let glyph = glyph(c);
        let px_w = (self.cell_width / 6.0).max(1.0) as u32;
        let px_h = (self.line_height / 9.0).max(1.0) as u32;
        for (row, bits) in glyph.0.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let x0 = origin_x as u32 + col * px_w;
                let y0 = origin_y as u32 + row as u32 * px_h;
                for y in y0..(y0 + px_h).min(height) {
                    for x in x0..(x0 + px_w).min(width) {
                        let i = ((y * width + x) * 4) as usize;
                        self.pixels[i..i + 3].fill(0xFF);
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, text: &str, row: usize, width: u32, height: u32) {
        let y = row as f32 * self.line_height + self.line_height * 0.15;
        if y >= height as f32 {
            return;
        }
        for (col, c) in text.chars().enumerate() {
            let x = col as f32 * self.cell_width + self.cell_width;
            if x + self.cell_width > width as f32 {
                break;
            }
            self.draw_glyph(c, x, y, width, height);
        }
    }
}

impl FrameSource for TerminalSource {
    fn rasterize(&mut self, width: u32, height: u32, frame: &FrameState) -> SourceImage<'_> {
        let len = (width * height * 4) as usize;
        self.pixels.clear();
        self.pixels.resize(len, 0);
        // Opaque black background
        for px in self.pixels.chunks_exact_mut(4) {
            px[3] = 0xFF;
        }

        let visible_rows = (height as f32 / self.line_height).floor() as usize;
        let prompt_rows = 1;
        let history_rows = visible_rows.saturating_sub(prompt_rows);
        let start = self.scrollback.len().saturating_sub(history_rows);

        let lines: Vec<String> = self.scrollback[start..].to_vec();
        for (row, line) in lines.iter().enumerate() {
            self.draw_line(line, row, width, height);
        }

        let cursor_on = (frame.time * CURSOR_BLINK_HZ).fract() < 0.5;
        let cursor = if cursor_on { "_" } else { "" };
        let prompt = format!("{PROMPT}{}{cursor}", self.prompt_line);
        self.draw_line(&prompt, lines.len(), width, height);

        SourceImage::new(width, height, &self.pixels)
    }
}

/// Logs a boot line once the renderer is up. A real build would play a
/// startup sound here.
struct BootChime;

impl Chime for BootChime {
    fn play(&mut self) {
        log::info!("*ding* terminal ready");
    }
}

struct TerminalApp {
    source: TerminalSource,
}

impl AppHandler for TerminalApp {
    fn init(renderer: &mut Renderer, window: &Window) -> Self {
        let line_height = 24.0 * window.scale_factor() as f32;
        renderer.params.line_height = line_height;
        Self {
            source: TerminalSource::new(line_height),
        }
    }

    fn on_event(&mut self, renderer: &mut Renderer, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return false;
        };
        if event.state != ElementState::Pressed {
            return false;
        }

        match &event.logical_key {
            Key::Named(NamedKey::Enter) => {
                self.source.commit_line();
                true
            }
            Key::Named(NamedKey::Backspace) => {
                self.source.prompt_line.pop();
                true
            }
            Key::Named(NamedKey::Tab) => {
                renderer.params.next_theme();
                true
            }
            Key::Named(NamedKey::Space) => {
                self.source.prompt_line.push(' ');
                true
            }
            Key::Character(text) => {
                self.source
                    .prompt_line
                    .extend(text.chars().filter(|c| !c.is_control()));
                true
            }
            _ => false,
        }
    }

    fn frame_source(&mut self) -> &mut dyn FrameSource {
        &mut self.source
    }
}

fn main() -> phosphor::Result<()> {
    env_logger::init();
    App::new()
        .with_title("phosphor terminal")
        .with_chime(Box::new(BootChime))
        .run::<TerminalApp>()
}
