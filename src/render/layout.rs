//! Flow layout: paragraphs, tables and images stacked top to bottom,
//! breaking onto a new page whenever the next block does not fit.

use image::RgbImage;

use crate::media::encode_jpeg;
use crate::print::PageSpec;
use crate::render::fonts::{self, Face};
use crate::render::RenderError;

/// Narrowest column a table may have.
pub const MIN_COLUMN_PT: f32 = 24.0;

const CELL_PAD_X: f32 = 6.0;
const CELL_PAD_Y: f32 = 3.0;
const CELL_SIZE: f32 = 10.0;
const CELL_LEADING: f32 = 12.0;
const BOX_WIDTH: f32 = 0.6;
const GRID_WIDTH: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub face: Face,
    pub size: f32,
    pub leading: f32,
    pub align: Align,
    pub space_before: f32,
    pub space_after: f32,
}

pub const TITLE: TextStyle = TextStyle {
    face: Face::Bold,
    size: 18.0,
    leading: 22.0,
    align: Align::Center,
    space_before: 0.0,
    space_after: 6.0,
};

pub const HEADING: TextStyle = TextStyle {
    face: Face::Bold,
    size: 12.0,
    leading: 14.4,
    align: Align::Left,
    space_before: 10.0,
    space_after: 6.0,
};

pub const SUBHEADING: TextStyle = TextStyle {
    face: Face::Bold,
    size: 10.0,
    leading: 12.0,
    align: Align::Left,
    space_before: 8.0,
    space_after: 4.0,
};

pub const BODY: TextStyle = TextStyle {
    face: Face::Regular,
    size: 10.0,
    leading: 12.0,
    align: Align::Left,
    space_before: 0.0,
    space_after: 0.0,
};

pub const BODY_BOLD: TextStyle = TextStyle { face: Face::Bold, ..BODY };

/// Grid table with a 0.6 pt outer box and 0.3 pt inner rules.
#[derive(Debug, Clone)]
pub struct Table {
    pub col_widths: Vec<f32>,
    pub rows: Vec<Vec<String>>,
    /// Leading rows that get the header shading.
    pub header_rows: usize,
    /// Grey level for the header rows' background, if shaded.
    pub header_fill: Option<f32>,
    /// Repeat the header rows at the top of every continuation page.
    pub repeat_header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text { x: f32, y: f32, face: Face, size: f32, text: String },
    Fill { x: f32, y: f32, w: f32, h: f32, gray: f32 },
    Stroke { x: f32, y: f32, w: f32, h: f32, line_width: f32 },
    Image { x: f32, y: f32, w: f32, h: f32, index: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

/// JPEG bytes plus pixel size, ready for a DCTDecode XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
    pub images: Vec<EmbeddedImage>,
}

pub struct Composer {
    spec: PageSpec,
    pages: Vec<Page>,
    images: Vec<EmbeddedImage>,
    cursor: f32,
}

impl Composer {
    pub fn new(spec: PageSpec) -> Self {
        Self {
            spec,
            pages: vec![Page::default()],
            images: vec![],
            cursor: spec.frame_top(),
        }
    }

    fn available(&self) -> f32 {
        self.cursor - self.spec.frame_bottom()
    }

    fn at_page_top(&self) -> bool {
        self.cursor >= self.spec.frame_top()
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.spec.frame_top();
    }

    /// Break the page unless `height` still fits (or we are already at the top).
    fn ensure(&mut self, height: f32) {
        if height > self.available() && !self.at_page_top() {
            self.new_page();
        }
    }

    pub fn spacer(&mut self, height: f32) {
        self.cursor -= height;
        if self.cursor <= self.spec.frame_bottom() {
            self.new_page();
        }
    }

    pub fn paragraph(&mut self, text: &str, style: &TextStyle) {
        if !self.at_page_top() {
            self.spacer(style.space_before);
        }
        let width = self.spec.frame_width();
        for line in fonts::wrap(text, style.face, style.size, width) {
            self.ensure(style.leading);
            let x = match style.align {
                Align::Left => self.spec.frame_left(),
                Align::Center => {
                    let w = fonts::text_width(&line, style.face, style.size);
                    self.spec.frame_left() + (width - w).max(0.0) / 2.0
                }
            };
            let y = self.cursor - style.size;
            self.push(DrawOp::Text { x, y, face: style.face, size: style.size, text: line });
            self.cursor -= style.leading;
        }
        self.spacer(style.space_after);
    }

    pub fn table(&mut self, table: &Table) -> Result<(), RenderError> {
        let frame_width = self.spec.frame_width();
        let total: f32 = table.col_widths.iter().sum();
        if table.col_widths.is_empty()
            || table.col_widths.iter().any(|w| !w.is_finite() || *w < MIN_COLUMN_PT)
            || total > frame_width + 0.01
        {
            return Err(RenderError::DegenerateColumns {
                widths: table.col_widths.clone(),
                frame: frame_width,
            });
        }

        let laid_out: Vec<(Vec<Vec<String>>, f32)> = table
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<Vec<String>> = table
                    .col_widths
                    .iter()
                    .enumerate()
                    .map(|(i, w)| {
                        let text = row.get(i).map(String::as_str).unwrap_or("");
                        fonts::wrap(text, Face::Regular, CELL_SIZE, w - 2.0 * CELL_PAD_X)
                    })
                    .collect();
                let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
                (cells, lines as f32 * CELL_LEADING + 2.0 * CELL_PAD_Y)
            })
            .collect();

        if let Some((_, height)) = laid_out
            .iter()
            .find(|(_, h)| *h > self.spec.frame_height())
        {
            return Err(RenderError::BlockTooTall { height: *height, frame: self.spec.frame_height() });
        }

        let left = self.spec.frame_left();
        let header_rows = table.header_rows.min(laid_out.len());
        self.ensure(laid_out.first().map(|(_, h)| *h).unwrap_or(0.0));
        let mut segment_top = self.cursor;

        for (i, (cells, height)) in laid_out.iter().enumerate() {
            if *height > self.available() && !self.at_page_top() {
                self.push(DrawOp::Stroke { x: left, y: self.cursor, w: total, h: segment_top - self.cursor, line_width: BOX_WIDTH });
                self.new_page();
                segment_top = self.cursor;
                if table.repeat_header && i >= header_rows {
                    for (header_cells, header_height) in &laid_out[..header_rows] {
                        self.draw_row(table, header_cells, *header_height, true);
                    }
                }
            }
            self.draw_row(table, cells, *height, i < header_rows);
        }
        self.push(DrawOp::Stroke { x: left, y: self.cursor, w: total, h: segment_top - self.cursor, line_width: BOX_WIDTH });
        Ok(())
    }

    fn draw_row(&mut self, table: &Table, cells: &[Vec<String>], height: f32, header: bool) {
        let top = self.cursor;
        let mut x = self.spec.frame_left();
        for (lines, width) in cells.iter().zip(&table.col_widths) {
            if let (true, Some(gray)) = (header, table.header_fill) {
                self.push(DrawOp::Fill { x, y: top - height, w: *width, h: height, gray });
            }
            self.push(DrawOp::Stroke { x, y: top - height, w: *width, h: height, line_width: GRID_WIDTH });
            let block = lines.len() as f32 * CELL_LEADING;
            let mut line_top = top - (height - block) / 2.0;
            for line in lines {
                if !line.is_empty() {
                    self.push(DrawOp::Text {
                        x: x + CELL_PAD_X,
                        y: line_top - CELL_SIZE,
                        face: Face::Regular,
                        size: CELL_SIZE,
                        text: line.clone(),
                    });
                }
                line_top -= CELL_LEADING;
            }
            x += width;
        }
        self.cursor -= height;
    }

    /// Place an image at 1 px = 1 pt, centered in the frame.
    pub fn image(&mut self, pixels: &RgbImage) -> Result<(), RenderError> {
        let (w, h) = (pixels.width() as f32, pixels.height() as f32);
        if w > self.spec.frame_width() + 0.01 {
            return Err(RenderError::BlockTooWide { width: w, frame: self.spec.frame_width() });
        }
        if h > self.spec.frame_height() {
            return Err(RenderError::BlockTooTall { height: h, frame: self.spec.frame_height() });
        }
        let index = self.embed(pixels)?;
        self.image_block(index, w, h);
        Ok(())
    }

    /// Place an already-embedded image at an explicit size in points.
    pub fn image_block(&mut self, index: usize, w: f32, h: f32) {
        self.ensure(h);
        let x = self.spec.frame_left() + (self.spec.frame_width() - w).max(0.0) / 2.0;
        self.push(DrawOp::Image { x, y: self.cursor - h, w, h, index });
        self.cursor -= h;
    }

    /// Embed an image without placing it; returns its index.
    pub fn embed(&mut self, pixels: &RgbImage) -> Result<usize, RenderError> {
        let jpeg = encode_jpeg(pixels)?;
        self.images.push(EmbeddedImage { width: pixels.width(), height: pixels.height(), jpeg });
        Ok(self.images.len() - 1)
    }

    pub fn finish(self) -> Layout {
        Layout { pages: self.pages, images: self.images }
    }
}
