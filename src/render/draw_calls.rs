//! Draw-call backend
//!
//! Lowers a [`PrintableDocument`] into a flat sequence of primitive draw
//! instructions placed by explicit position, for engines that expose a
//! font/graphics drawing surface instead of a content tree.

use crate::document::{Block, ImageRef, PrintableDocument, TableRow};

use super::{DocumentBackend, EngineError, RenderError};

/// A4 page width in document points.
const PAGE_WIDTH: f32 = 595.0;

/// Left page margin in document points.
const MARGIN: f32 = 40.0;

/// Column x offsets of the order table: variant, quantity, price, total.
const TABLE_COLUMNS: [f32; 4] = [MARGIN, 320.0, 390.0, 480.0];

/// One primitive draw instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// Place a line of text.
    Text {
        /// Left edge.
        x: f32,

        /// Baseline position from the page top.
        y: f32,

        /// Font size in points.
        size: f32,

        /// Bold face.
        bold: bool,

        /// Text content.
        text: String,
    },

    /// Place an image.
    Image {
        /// Left edge.
        x: f32,

        /// Top edge.
        y: f32,

        /// Display width.
        width: f32,

        /// Image MIME type.
        mime: String,

        /// Raw image bytes.
        bytes: Vec<u8>,
    },

    /// Fill a rectangle with a vertical gradient.
    GradientRect {
        /// Left edge.
        x: f32,

        /// Top edge.
        y: f32,

        /// Rectangle width.
        width: f32,

        /// Rectangle height.
        height: f32,

        /// Gradient stop colours, top to bottom.
        colors: Vec<String>,
    },

    /// Draw a horizontal rule.
    Line {
        /// Left edge.
        x: f32,

        /// Vertical position.
        y: f32,

        /// Rule width.
        width: f32,
    },
}

/// External engine that replays draw instructions onto a PDF surface.
pub trait DrawEngine {
    /// Draws the instruction sequence and returns the finished bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the surface fails.
    async fn draw(&self, calls: &[DrawCall]) -> Result<Vec<u8>, EngineError>;
}

/// Backend lowering documents to draw instructions for an optional engine
/// handle.
#[derive(Debug)]
pub struct DrawCallBackend<E: DrawEngine> {
    engine: Option<E>,
}

impl<E: DrawEngine> DrawCallBackend<E> {
    /// Creates a backend bound to a loaded engine.
    #[must_use]
    pub fn new(engine: E) -> Self {
        DrawCallBackend {
            engine: Some(engine),
        }
    }

    /// Creates a backend whose engine never loaded.
    #[must_use]
    pub fn disconnected() -> Self {
        DrawCallBackend { engine: None }
    }
}

impl<E: DrawEngine> DocumentBackend for DrawCallBackend<E> {
    async fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>, RenderError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(RenderError::BackendUnavailable)?;

        let calls = lower(document);

        Ok(engine.draw(&calls).await?)
    }
}

/// Lowers a document into draw instructions with a top-down cursor.
#[must_use]
pub fn lower(document: &PrintableDocument) -> Vec<DrawCall> {
    let mut calls = Vec::new();
    let mut cursor = Cursor::new();

    for block in &document.blocks {
        lower_block(block, &mut cursor, &mut calls);
    }

    calls
}

struct Cursor {
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Cursor { y: MARGIN }
    }

    fn advance(&mut self, by: f32) -> f32 {
        let at = self.y;
        self.y += by;

        at
    }
}

fn lower_block(block: &Block, cursor: &mut Cursor, calls: &mut Vec<DrawCall>) {
    match block {
        Block::Background { gradient, height } => {
            #[expect(clippy::cast_precision_loss, reason = "band heights are small")]
            let band_height = *height as f32;

            // Absolute placement behind the flowed content; the cursor is
            // untouched.
            calls.push(DrawCall::GradientRect {
                x: 0.0,
                y: 0.0,
                width: PAGE_WIDTH,
                height: band_height,
                colors: gradient.iter().map(|stop| stop.color.clone()).collect(),
            });
        }
        Block::Branding {
            logo,
            contact_lines,
        } => {
            let top = cursor.advance(70.0);

            if let ImageRef::Embedded { mime, bytes } = logo {
                calls.push(DrawCall::Image {
                    x: MARGIN,
                    y: top,
                    width: 150.0,
                    mime: mime.clone(),
                    bytes: bytes.clone(),
                });
            }

            for (idx, line) in contact_lines.iter().enumerate() {
                #[expect(clippy::cast_precision_loss, reason = "contact lines are few")]
                let offset = idx as f32;

                calls.push(DrawCall::Text {
                    x: PAGE_WIDTH - MARGIN - 200.0,
                    y: top + offset * 14.0,
                    size: 10.0,
                    bold: false,
                    text: line.clone(),
                });
            }
        }
        Block::Heading { text } => {
            let at = cursor.advance(28.0);

            calls.push(DrawCall::Text {
                x: MARGIN,
                y: at,
                size: 18.0,
                bold: true,
                text: text.clone(),
            });
        }
        Block::CustomerInfo { name, email, date } => {
            for line in [name, email, date] {
                let at = cursor.advance(16.0);

                calls.push(DrawCall::Text {
                    x: MARGIN,
                    y: at,
                    size: 12.0,
                    bold: false,
                    text: line.clone(),
                });
            }
        }
        Block::Table { header, rows } => {
            lower_table_header(header, cursor, calls);

            for row in rows {
                lower_table_row(row, cursor, calls);
            }
        }
    }
}

fn lower_table_header(
    header: &crate::document::TableHeader,
    cursor: &mut Cursor,
    calls: &mut Vec<DrawCall>,
) {
    let at = cursor.advance(18.0);

    let cells = [
        &header.variant,
        &header.qty,
        &header.price,
        &header.total,
    ];

    for (text, x) in cells.into_iter().zip(TABLE_COLUMNS) {
        calls.push(DrawCall::Text {
            x,
            y: at,
            size: 12.0,
            bold: true,
            text: text.clone(),
        });
    }

    calls.push(DrawCall::Line {
        x: MARGIN,
        y: at + 4.0,
        width: PAGE_WIDTH - 2.0 * MARGIN,
    });
}

fn lower_table_row(row: &TableRow, cursor: &mut Cursor, calls: &mut Vec<DrawCall>) {
    match row {
        TableRow::ServiceHeader { name } => {
            let at = cursor.advance(18.0);

            calls.push(DrawCall::Text {
                x: MARGIN,
                y: at,
                size: 12.0,
                bold: true,
                text: name.clone(),
            });
        }
        TableRow::VariantLine {
            name,
            quantity,
            price,
            total,
        } => {
            let at = cursor.advance(16.0);

            let cells = [name, quantity, price, total];

            for (text, x) in cells.into_iter().zip(TABLE_COLUMNS) {
                calls.push(DrawCall::Text {
                    x,
                    y: at,
                    size: 11.0,
                    bold: false,
                    text: text.clone(),
                });
            }
        }
        TableRow::Total { label, amount } => {
            let at = cursor.advance(20.0);

            calls.push(DrawCall::Line {
                x: MARGIN,
                y: at - 4.0,
                width: PAGE_WIDTH - 2.0 * MARGIN,
            });

            calls.push(DrawCall::Text {
                x: TABLE_COLUMNS.get(2).copied().unwrap_or(MARGIN),
                y: at,
                size: 12.0,
                bold: true,
                text: label.clone(),
            });

            calls.push(DrawCall::Text {
                x: TABLE_COLUMNS.get(3).copied().unwrap_or(MARGIN),
                y: at,
                size: 12.0,
                bold: true,
                text: amount.clone(),
            });
        }
    }
}
