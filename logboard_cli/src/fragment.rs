//! Extraction of selectable rows from the server-rendered table fragment
//!
//! The filter response carries the table as pre-rendered markup. The
//! fragment itself is opaque (the server owns its shape), but row
//! selection needs the entry identifier each row is tagged with, so
//! after every swap the rows are re-scanned and the row-to-entry
//! bindings rebuilt.

/// One selectable table row recovered from the fragment
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub entry_id: String,
    pub cells: Vec<String>,
}

const ENTRY_ID_ATTR: &str = "data-entry-id=\"";

/// Scan the fragment for `log-entry` rows and their cell text.
///
/// Rows without an entry identifier are skipped; an empty result is
/// a legitimate "no entries matched" fragment, not an error.
pub fn parse_rows(html: &str) -> Vec<TableRow> {
    let mut rows = Vec::new();
    let mut rest = html;

    while let Some(tr_start) = rest.find("<tr") {
        let after_tr = &rest[tr_start..];
        let Some(tr_end) = after_tr.find("</tr>") else {
            break;
        };
        let row_markup = &after_tr[..tr_end];

        if let Some(entry_id) = extract_entry_id(row_markup) {
            rows.push(TableRow {
                entry_id,
                cells: extract_cells(row_markup),
            });
        }

        rest = &after_tr[tr_end + "</tr>".len()..];
    }

    rows
}

fn extract_entry_id(row_markup: &str) -> Option<String> {
    let attr_start = row_markup.find(ENTRY_ID_ATTR)? + ENTRY_ID_ATTR.len();
    let attr_rest = &row_markup[attr_start..];
    let attr_end = attr_rest.find('"')?;
    let id = attr_rest[..attr_end].trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn extract_cells(row_markup: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut rest = row_markup;

    while let Some(td_start) = rest.find("<td") {
        let after_td = &rest[td_start..];
        let Some(open_end) = after_td.find('>') else {
            break;
        };
        let Some(td_end) = after_td.find("</td>") else {
            break;
        };
        if td_end > open_end {
            cells.push(text_content(&after_td[open_end + 1..td_end]));
        }
        rest = &after_td[td_end + "</td>".len()..];
    }

    cells
}

/// Strip tags and decode the few entities Django's escaping emits
fn text_content(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;

    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"
        <table class="table table-hover">
          <thead><tr><th>IP</th><th>Method</th><th>Path</th></tr></thead>
          <tbody>
            <tr class="log-entry" data-entry-id="17">
              <td>10.0.0.1</td>
              <td><span class="badge bg-success">GET</span></td>
              <td>/index.html</td>
            </tr>
            <tr class="log-entry" data-entry-id="42">
              <td>10.0.0.2</td>
              <td><span class="badge bg-primary">POST</span></td>
              <td>/search?q=a&amp;b</td>
            </tr>
          </tbody>
        </table>
    "#;

    #[test]
    fn test_parse_rows_with_entry_ids() {
        let rows = parse_rows(FRAGMENT);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry_id, "17");
        assert_eq!(rows[0].cells, vec!["10.0.0.1", "GET", "/index.html"]);
        assert_eq!(rows[1].entry_id, "42");
        assert_eq!(rows[1].cells[2], "/search?q=a&b");
    }

    #[test]
    fn test_header_row_is_skipped() {
        let rows = parse_rows("<tr><th>IP</th></tr>");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_fragment() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("<div>No log entries found.</div>").is_empty());
    }

    #[test]
    fn test_truncated_row_does_not_panic() {
        let rows = parse_rows(r#"<tr class="log-entry" data-entry-id="9"><td>x"#);
        assert!(rows.is_empty());
    }
}
