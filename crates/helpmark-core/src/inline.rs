use crate::ast::{DocPart, PendingReference};
use crate::image::has_image_extension;
use crate::variables::VariableTable;

/// Single characters that `[c]` turns back into literal text.
const RESERVED_CHARS: &str = "[*/=-.";

/// Scans one ordinary line and appends its parts to `out`.
///
/// Styles and references that do not match are kept as literal text.
pub(crate) fn scan_line(text: &str, line: usize, vars: &VariableTable, out: &mut Vec<DocPart>) {
    let mut scanner = InlineScanner {
        source: text,
        line,
        vars,
        out,
    };
    scanner.run();
}

struct InlineScanner<'a> {
    source: &'a str,
    line: usize,
    vars: &'a VariableTable,
    out: &'a mut Vec<DocPart>,
}

/// A delimited span `*…*` or `/…/` starting at the delimiter.
struct StyleSpan<'a> {
    interior: &'a str,
    // Bytes from the opening delimiter through the closing one.
    len: usize,
}

enum RefSyntax<'a> {
    /// `[[]`
    Escaped,
    /// `[target]`
    Single(&'a str),
    /// `[text[target]]`
    WithText { text: &'a str, target: &'a str },
}

struct RefMatch<'a> {
    syntax: RefSyntax<'a>,
    // Bytes after the opening `[` that belong to the reference.
    len: usize,
}

impl InlineScanner<'_> {
    fn run(&mut self) {
        // `start` marks the beginning of the pending plain text, `pos` the
        // byte being looked at. Both always sit on char boundaries because
        // only ASCII delimiters move them.
        let bytes = self.source.as_bytes();
        let mut start = 0;
        let mut pos = 0;
        while pos < bytes.len() {
            match bytes[pos] {
                delim @ (b'*' | b'/') => {
                    if let Some(span) = match_style_span(&self.source[pos..], delim) {
                        self.flush(start, pos);
                        self.emit_style(delim, span.interior);
                        pos += span.len;
                        start = pos;
                        continue;
                    }
                }
                b'[' => {
                    if let Some(found) = match_reference(&self.source[pos + 1..]) {
                        self.flush(start, pos);
                        self.emit_reference(found.syntax, pos);
                        pos += 1 + found.len;
                        start = pos;
                        continue;
                    }
                }
                _ => {}
            }
            pos += 1;
        }
        self.flush(start, bytes.len());
    }

    fn flush(&mut self, start: usize, end: usize) {
        if start < end {
            self.out.push(DocPart::text(&self.source[start..end]));
        }
    }

    fn emit_style(&mut self, delim: u8, interior: &str) {
        let mut bold = delim == b'*';
        let mut italic = delim == b'/';
        let other = if bold { '/' } else { '*' };
        let mut text = interior;
        if text.len() >= 2 && text.starts_with(other) && text.ends_with(other) {
            bold = true;
            italic = true;
            text = &text[1..text.len() - 1];
        }
        self.out.push(DocPart::StyledText {
            text: self.vars.substitute(text),
            bold,
            italic,
        });
    }

    fn emit_reference(&mut self, syntax: RefSyntax<'_>, offset: usize) {
        let part = match syntax {
            RefSyntax::Escaped => DocPart::text("["),
            RefSyntax::WithText { text, target } if !target.is_empty() => {
                DocPart::PendingReference(PendingReference {
                    target: target.to_string(),
                    text: text.to_string(),
                    line: self.line,
                    column: self.column(offset),
                })
            }
            RefSyntax::WithText { text: token, .. } | RefSyntax::Single(token) => {
                self.classify_token(token, offset)
            }
        };
        self.out.push(part);
    }

    fn classify_token(&self, token: &str, offset: usize) -> DocPart {
        if token.len() == 1 && RESERVED_CHARS.contains(token) {
            return DocPart::text(token);
        }
        if let Some(var) = self.vars.get(token) {
            return DocPart::text(var.value.as_str());
        }
        if has_image_extension(token) {
            return DocPart::Image {
                name: token.to_string(),
            };
        }
        DocPart::PendingReference(PendingReference {
            target: token.to_string(),
            text: String::new(),
            line: self.line,
            column: self.column(offset),
        })
    }

    fn column(&self, offset: usize) -> usize {
        self.source[..offset].chars().count() + 1
    }
}

fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// `text` starts at the opening delimiter. The span opens only if a
/// non-blank character follows and closes at the first delimiter that is
/// itself preceded by a non-blank character.
fn match_style_span(text: &str, delim: u8) -> Option<StyleSpan<'_>> {
    let bytes = text.as_bytes();
    let first = *bytes.get(1)?;
    if is_space(first) {
        return None;
    }
    let after = &bytes[1..];
    let close = (1..after.len()).find(|&idx| after[idx] == delim && !is_space(after[idx - 1]))?;
    Some(StyleSpan {
        interior: &text[1..1 + close],
        len: close + 2,
    })
}

/// `text` starts right after an opening `[`.
fn match_reference(text: &str) -> Option<RefMatch<'_>> {
    let bytes = text.as_bytes();
    match bytes.first() {
        None | Some(b']') => return None,
        Some(&first) if is_space(first) => return None,
        _ => {}
    }
    if bytes.starts_with(b"[]") {
        return Some(RefMatch {
            syntax: RefSyntax::Escaped,
            len: 2,
        });
    }

    // At most one inner `[...]`, which must be closed by `]]`.
    let mut inner_start: Option<usize> = None;
    for (idx, &byte) in bytes.iter().enumerate() {
        match byte {
            b']' => {
                return match inner_start {
                    Some(open) if bytes.get(idx + 1) == Some(&b']') => Some(RefMatch {
                        syntax: RefSyntax::WithText {
                            text: &text[..open],
                            target: &text[open + 1..idx],
                        },
                        len: idx + 2,
                    }),
                    Some(_) => None,
                    None => Some(RefMatch {
                        syntax: RefSyntax::Single(&text[..idx]),
                        len: idx + 1,
                    }),
                };
            }
            b'[' => {
                if inner_start.is_some() {
                    return None;
                }
                inner_start = Some(idx);
            }
            _ => {}
        }
    }
    None
}
