//! GFM pipe-table rendering (rule 9), using the same scoped-selection
//! pattern as `riptide-html::table_extraction`: `element.select(&selector)`
//! confined to a single `<table>` subtree rather than the whole document.

use scraper::{ElementRef, Selector};

/// Renders a `<table>` subtree as a GitHub-flavored Markdown pipe table.
/// `render_cell` turns one `<th>`/`<td>` subtree into its inline Markdown text.
pub fn render_table(table: ElementRef, render_cell: &mut dyn FnMut(ElementRef) -> anyhow::Result<String>) -> anyhow::Result<String> {
    let row_selector = Selector::parse("tr").map_err(|e| anyhow::anyhow!("bad selector: {e:?}"))?;
    let cell_selector = Selector::parse("th,td").map_err(|e| anyhow::anyhow!("bad selector: {e:?}"))?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in table.select(&row_selector) {
        let mut cells = Vec::new();
        for cell in row.select(&cell_selector) {
            let text = render_cell(cell)?;
            cells.push(sanitize_cell(&text));
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if rows.is_empty() {
        return Ok(String::new());
    }

    let col_count = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in &mut rows {
        while row.len() < col_count {
            row.push(String::new());
        }
    }

    let mut out = String::new();
    let mut rows_iter = rows.into_iter();
    let header = rows_iter.next().unwrap();
    out.push_str(&format_row(&header));
    out.push('\n');
    out.push_str(&format_separator(col_count));
    out.push('\n');
    for row in rows_iter {
        out.push_str(&format_row(&row));
        out.push('\n');
    }
    out.push('\n');
    Ok(out)
}

fn sanitize_cell(text: &str) -> String {
    text.trim().replace('|', "\\|").replace('\n', " ")
}

fn format_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn format_separator(col_count: usize) -> String {
    let cols: Vec<&str> = std::iter::repeat("---").take(col_count).collect();
    format!("| {} |", cols.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_table(html: &str) -> Html {
        Html::parse_fragment(html)
    }

    #[test]
    fn renders_header_and_body_rows() {
        let doc = first_table(
            "<table><thead><tr><th>Name</th><th>Score</th></tr></thead>\
             <tbody><tr><td>a</td><td>1</td></tr><tr><td>b</td><td>2</td></tr></tbody></table>",
        );
        let table_selector = Selector::parse("table").unwrap();
        let table = doc.select(&table_selector).next().unwrap();
        let mut render_cell = |el: ElementRef| Ok(el.text().collect::<String>());
        let md = render_table(table, &mut render_cell).unwrap();
        assert_eq!(md, "| Name | Score |\n| --- | --- |\n| a | 1 |\n| b | 2 |\n\n");
    }

    #[test]
    fn pads_ragged_rows_to_widest() {
        let doc = first_table("<table><tr><th>A</th><th>B</th></tr><tr><td>x</td></tr></table>");
        let table_selector = Selector::parse("table").unwrap();
        let table = doc.select(&table_selector).next().unwrap();
        let mut render_cell = |el: ElementRef| Ok(el.text().collect::<String>());
        let md = render_table(table, &mut render_cell).unwrap();
        assert_eq!(md, "| A | B |\n| --- | --- |\n| x |  |\n\n");
    }

    #[test]
    fn escapes_pipes_in_cell_text() {
        let doc = first_table("<table><tr><th>a|b</th></tr></table>");
        let table_selector = Selector::parse("table").unwrap();
        let table = doc.select(&table_selector).next().unwrap();
        let mut render_cell = |el: ElementRef| Ok(el.text().collect::<String>());
        let md = render_table(table, &mut render_cell).unwrap();
        assert_eq!(md, "| a\\|b |\n| --- |\n\n");
    }
}
