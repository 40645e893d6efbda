//! Plain-text backend
//!
//! Renders the order document as a plain-text page with the itemised table
//! built by `tabled`. Needs no external engine, so it is always available;
//! used by tests and as a customer-facing order snapshot.

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::document::{Block, PrintableDocument, TableRow};

use super::{DocumentBackend, RenderError};

/// Backend rendering documents as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextBackend;

impl TextBackend {
    /// Creates a text backend.
    #[must_use]
    pub fn new() -> Self {
        TextBackend
    }

    /// Renders the document to a string.
    #[must_use]
    pub fn render_string(document: &PrintableDocument) -> String {
        let mut out = String::new();

        for block in &document.blocks {
            render_block(block, &mut out);
        }

        out
    }
}

impl DocumentBackend for TextBackend {
    async fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>, RenderError> {
        Ok(Self::render_string(document).into_bytes())
    }
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        // Purely visual in the PDF output; nothing to show as text.
        Block::Background { .. } => {}
        Block::Branding { contact_lines, .. } => {
            for line in contact_lines {
                push_line(out, line);
            }

            push_line(out, "");
        }
        Block::Heading { text } => {
            push_line(out, text);
            push_line(out, "");
        }
        Block::CustomerInfo { name, email, date } => {
            push_line(out, name);
            push_line(out, email);
            push_line(out, date);
            push_line(out, "");
        }
        Block::Table { header, rows } => {
            let mut builder = Builder::default();

            builder.push_record([
                header.variant.as_str(),
                header.qty.as_str(),
                header.price.as_str(),
                header.total.as_str(),
            ]);

            for row in rows {
                push_table_row(&mut builder, row);
            }

            let mut table = builder.build();
            table.with(Style::modern_rounded());
            table.modify(Columns::new(1..4), Alignment::right());

            push_line(out, &table.to_string());
        }
    }
}

fn push_table_row(builder: &mut Builder, row: &TableRow) {
    match row {
        TableRow::ServiceHeader { name } => {
            builder.push_record([name.as_str(), "", "", ""]);
        }
        TableRow::VariantLine {
            name,
            quantity,
            price,
            total,
        } => {
            builder.push_record([
                name.as_str(),
                quantity.as_str(),
                price.as_str(),
                total.as_str(),
            ]);
        }
        TableRow::Total { label, amount } => {
            builder.push_record(["", "", label.as_str(), amount.as_str()]);
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
