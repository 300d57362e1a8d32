use crate::table::types::FlatRow;
use serde_json::Value;

/// Render rows and schema as a complete standalone HTML document.
///
/// Cell content is entity-escaped; `null` renders as an italicized marker.
/// Empty rows or schema produce a document with a "no data" message.
pub fn to_html(rows: &[FlatRow], schema: &[String]) -> String {
    let body = if rows.is_empty() || schema.is_empty() {
        String::from("<p class=\"empty\">No data to display</p>")
    } else {
        render_table(rows, schema)
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>JSON Table</title>\n\
         <style>\n\
         body {{ font-family: -apple-system, \"Segoe UI\", sans-serif; margin: 2rem; color: #1f2933; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #cbd2d9; padding: 6px 10px; text-align: left; }}\n\
         th {{ background: #e4ebf5; font-weight: 600; }}\n\
         tr:nth-child(even) td {{ background: #f5f7fa; }}\n\
         em.null {{ color: #9aa5b1; font-style: italic; }}\n\
         button {{ margin-bottom: 1rem; padding: 6px 12px; cursor: pointer; }}\n\
         p.empty {{ color: #9aa5b1; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         {body}\n\
         </body>\n\
         </html>\n"
    )
}

fn render_table(rows: &[FlatRow], schema: &[String]) -> String {
    let mut out = String::new();
    out.push_str("<button onclick=\"copyTable()\">Copy table</button>\n");
    out.push_str("<table id=\"data\">\n<thead>\n<tr>");

    for key in schema {
        out.push_str("<th>");
        out.push_str(&escape_html(key));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        out.push_str("<tr>");
        for key in schema {
            out.push_str("<td>");
            out.push_str(&render_cell(row.get(key)));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
    // Clipboard affordance only; not part of the data contract.
    out.push_str(
        "<script>\n\
         function copyTable() {\n\
           navigator.clipboard.writeText(document.getElementById('data').innerText);\n\
         }\n\
         </script>",
    );
    out
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::from("<em class=\"null\">null</em>"),
        Some(Value::String(s)) => escape_html(s),
        Some(other) => escape_html(&other.to_string()),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::flatten::flatten;
    use serde_json::json;

    #[test]
    fn test_markup_is_escaped() {
        let result = flatten(&json!({"payload": "<script>alert(\"xss\")</script>"}));
        let html = to_html(&result.rows, &result.schema);

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"));
    }

    #[test]
    fn test_null_renders_as_marker() {
        let result = flatten(&json!([{"a": 1, "b": 2}, {"a": 3}]));
        let html = to_html(&result.rows, &result.schema);

        assert!(html.contains("<em class=\"null\">null</em>"));
    }

    #[test]
    fn test_empty_input_renders_no_data_document() {
        let html = to_html(&[], &[]);

        assert!(html.contains("No data to display"));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_document_is_complete() {
        let result = flatten(&json!({"a": 1}));
        let html = to_html(&result.rows, &result.schema);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<thead>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("</html>"));
    }
}
