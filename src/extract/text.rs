use scraper::{Html, Selector};

use crate::error::{Error, Result};

pub fn pdf_to_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| Error::PdfText(e.to_string()))
}

/// Flatten an eFD report page to text. The transactions table is preferred,
/// one line per row with cells joined by ` | `; otherwise all visible text.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table.table").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td, th").unwrap();

    if let Some(table) = document.select(&table_selector).next() {
        let mut text = String::new();
        for row in table.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| squash_whitespace(&cell.text().collect::<String>()))
                .collect();
            text.push_str(&cells.join(" | "));
            text.push('\n');
        }
        return text;
    }

    let body_selector = Selector::parse("body").unwrap();
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());
    squash_whitespace(&root.text().collect::<Vec<_>>().join(" "))
}

fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
