mod images;
mod rtf;

pub use images::DirectoryImages;
pub use rtf::emit_rtf;

const PAGE_CSS: &str = include_str!("../assets/helpmark.css");

/// Wraps an HTML fragment into a standalone page with the help page styling
/// inlined. The `<title>` element is left out for untitled documents.
pub fn wrap_page(body: &str, title: Option<&str>) -> String {
    let mut out = String::with_capacity(body.len() + PAGE_CSS.len() + 160);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\" />\n");
    out.push_str("<style>\n");
    out.push_str(PAGE_CSS);
    out.push_str("</style>\n");
    if let Some(title) = title.filter(|title| !title.is_empty()) {
        out.push_str("<title>");
        out.push_str(&escape_title(title));
        out.push_str("</title>\n");
    }
    out.push_str("</head>\n<body>\n");
    out.push_str(body);
    out.push_str("\n</body>\n</html>\n");
    out
}

fn escape_title(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
