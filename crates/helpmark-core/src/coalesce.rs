use crate::ast::DocPart;

/// Merges every run of adjacent plain-text parts into one part.
pub fn coalesce_text(parts: &mut Vec<DocPart>) {
    let mut out: Vec<DocPart> = Vec::with_capacity(parts.len());
    for part in parts.drain(..) {
        if let DocPart::PlainText(text) = &part {
            if let Some(DocPart::PlainText(prev)) = out.last_mut() {
                prev.push_str(text);
                continue;
            }
        }
        out.push(part);
    }
    *parts = out;
}
