//! Content-tree backend
//!
//! Lowers a [`PrintableDocument`] into the document-composition engine's
//! JSON content tree (content array, styles, table body with spanning
//! rows) and hands it to an injected engine for PDF generation. The shape
//! mirrors the docDefinition the original widget fed its CDN-loaded engine.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Value, json};

use crate::document::{Block, ImageRef, PrintableDocument, TableRow};

use super::{DocumentBackend, EngineError, RenderError};

/// A4 page width in document points.
const PAGE_WIDTH: u32 = 595;

/// External engine that accepts a JSON content tree and returns PDF bytes.
pub trait ContentTreeEngine {
    /// Builds a PDF from the given document definition.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the engine cannot produce bytes.
    async fn create_pdf(&self, definition: &Value) -> Result<Vec<u8>, EngineError>;
}

/// Backend handing the lowered content tree to an optional engine handle.
/// The engine is loaded out-of-band; an absent handle surfaces as
/// [`RenderError::BackendUnavailable`].
#[derive(Debug)]
pub struct ContentTreeBackend<E: ContentTreeEngine> {
    engine: Option<E>,
}

impl<E: ContentTreeEngine> ContentTreeBackend<E> {
    /// Creates a backend bound to a loaded engine.
    #[must_use]
    pub fn new(engine: E) -> Self {
        ContentTreeBackend {
            engine: Some(engine),
        }
    }

    /// Creates a backend whose engine never loaded.
    #[must_use]
    pub fn disconnected() -> Self {
        ContentTreeBackend { engine: None }
    }
}

impl<E: ContentTreeEngine> DocumentBackend for ContentTreeBackend<E> {
    async fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>, RenderError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(RenderError::BackendUnavailable)?;

        let definition = lower(document);

        Ok(engine.create_pdf(&definition).await?)
    }
}

/// Lowers a document into the engine's content tree.
#[must_use]
pub fn lower(document: &PrintableDocument) -> Value {
    let content: Vec<Value> = document.blocks.iter().map(lower_block).collect();

    json!({
        "content": content,
        "defaultStyle": {},
        "styles": {
            "header": { "fontSize": 18, "bold": true, "margin": [0, 0, 0, 10] },
            "subheader": { "fontSize": 12, "margin": [0, 5, 0, 5] },
            "tableHeader": { "bold": true, "fillColor": "#eeeeee" },
        },
    })
}

fn lower_block(block: &Block) -> Value {
    match block {
        Block::Background { gradient, height } => json!({
            "canvas": [{
                "type": "rect",
                "x": 0,
                "y": 0,
                "w": PAGE_WIDTH,
                "h": height,
                "linearGradient": gradient.iter().map(|stop| stop.color.clone()).collect::<Vec<_>>(),
            }],
            "absolutePosition": { "x": 0, "y": 0 },
        }),
        Block::Branding {
            logo,
            contact_lines,
        } => json!({
            "columns": [
                { "image": image_value(logo), "width": 150, "margin": [0, 0, 0, 10] },
                {
                    "text": contact_lines.iter().map(|line| format!("{line}\n")).collect::<Vec<_>>(),
                    "style": "subheader",
                    "alignment": "right",
                    "margin": [0, 0, 0, 10],
                    "color": "#fff",
                },
            ],
            "margin": [0, 0, 0, 10],
        }),
        Block::Heading { text } => json!({ "text": text, "style": "header" }),
        Block::CustomerInfo { name, email, date } => json!([
            { "text": name, "style": "subheader" },
            { "text": email, "style": "subheader" },
            { "text": date, "style": "subheader" },
        ]),
        Block::Table { header, rows } => {
            let mut body: Vec<Value> = vec![json!([
                header.variant,
                header.qty,
                header.price,
                header.total,
            ])];

            body.extend(rows.iter().map(lower_row));

            json!({
                "table": {
                    "headerRows": 1,
                    "widths": ["*", "auto", "auto", "auto"],
                    "body": body,
                },
            })
        }
    }
}

fn lower_row(row: &TableRow) -> Value {
    match row {
        TableRow::ServiceHeader { name } => json!([
            { "text": name, "colSpan": 4, "style": "tableHeader" },
            {},
            {},
            {},
        ]),
        TableRow::VariantLine {
            name,
            quantity,
            price,
            total,
        } => json!([name, quantity, price, total]),
        TableRow::Total { label, amount } => json!([
            { "text": label, "colSpan": 3, "alignment": "right" },
            {},
            {},
            amount,
        ]),
    }
}

fn image_value(image: &ImageRef) -> Value {
    match image {
        ImageRef::Remote { url } => Value::String(url.clone()),
        ImageRef::Embedded { mime, bytes } => {
            Value::String(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use testresult::TestResult;

    use crate::document::TableHeader;

    use super::*;

    /// Engine double that records nothing and returns fixed bytes.
    #[derive(Debug)]
    struct FixedEngine;

    impl ContentTreeEngine for FixedEngine {
        async fn create_pdf(&self, _definition: &Value) -> Result<Vec<u8>, EngineError> {
            Ok(b"%PDF-stub".to_vec())
        }
    }

    fn document() -> PrintableDocument {
        PrintableDocument {
            blocks: vec![
                Block::Heading {
                    text: "Заказ".to_string(),
                },
                Block::Table {
                    header: TableHeader {
                        variant: "Вариант".to_string(),
                        qty: "Кол-во".to_string(),
                        price: "Цена".to_string(),
                        total: "Стоимость".to_string(),
                    },
                    rows: vec![
                        TableRow::ServiceHeader {
                            name: "Print".to_string(),
                        },
                        TableRow::VariantLine {
                            name: "A4".to_string(),
                            quantity: "2".to_string(),
                            price: "100 ₽".to_string(),
                            total: "200 ₽".to_string(),
                        },
                        TableRow::Total {
                            label: "Итого:".to_string(),
                            amount: "200 ₽".to_string(),
                        },
                    ],
                },
            ],
        }
    }

    #[test]
    fn disconnected_backend_is_unavailable() {
        let backend = ContentTreeBackend::<FixedEngine>::disconnected();

        let result = block_on(backend.render(&document()));

        assert!(matches!(result, Err(RenderError::BackendUnavailable)));
    }

    #[test]
    fn connected_backend_returns_engine_bytes() -> TestResult {
        let backend = ContentTreeBackend::new(FixedEngine);

        let bytes = block_on(backend.render(&document()))?;

        assert_eq!(bytes, b"%PDF-stub");

        Ok(())
    }

    #[test]
    fn table_lowering_keeps_header_span_and_total_span() {
        let definition = lower(&document());

        let body = definition
            .pointer("/content/1/table/body")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        // Column header row plus the three document rows.
        assert_eq!(body.len(), 4);
        assert_eq!(
            body.get(1).and_then(|row| row.pointer("/0/colSpan")),
            Some(&json!(4))
        );
        assert_eq!(
            body.get(3).and_then(|row| row.pointer("/0/colSpan")),
            Some(&json!(3))
        );
        assert_eq!(
            body.get(3).and_then(|row| row.get(3)),
            Some(&json!("200 ₽"))
        );
    }

    #[test]
    fn embedded_images_become_data_urls() {
        let value = image_value(&ImageRef::Embedded {
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });

        assert_eq!(value, json!("data:image/png;base64,AQID"));
    }
}
