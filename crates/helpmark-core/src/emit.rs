use crate::ast::{AnchorId, DocPart, Document, HeadingLevel};
use crate::error::RenderError;
use crate::image::ImageSource;
use ammonia::Builder;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug)]
pub struct HtmlEmitOptions {
    /// Embed images as data URIs. When off, `src` is the logical image name
    /// and the image source is never consulted.
    pub inline_images: bool,
}

impl Default for HtmlEmitOptions {
    fn default() -> Self {
        Self {
            inline_images: true,
        }
    }
}

/// Emits the HTML body fragment for a resolved document.
pub fn emit_html(document: &Document, images: &mut dyn ImageSource) -> Result<String, RenderError> {
    emit_html_with_options(document, &HtmlEmitOptions::default(), images)
}

pub fn emit_html_with_options(
    document: &Document,
    options: &HtmlEmitOptions,
    images: &mut dyn ImageSource,
) -> Result<String, RenderError> {
    let mut writer = HtmlWriter::new();
    for part in &document.parts {
        emit_part(&mut writer, part, options, images)?;
    }
    Ok(writer.finish())
}

/// Emits HTML and runs it through a fixed allow-list.
pub fn emit_html_sanitized(
    document: &Document,
    images: &mut dyn ImageSource,
) -> Result<String, RenderError> {
    emit_html_sanitized_with_options(document, &HtmlEmitOptions::default(), images)
}

pub fn emit_html_sanitized_with_options(
    document: &Document,
    options: &HtmlEmitOptions,
    images: &mut dyn ImageSource,
) -> Result<String, RenderError> {
    let raw_html = emit_html_with_options(document, options, images)?;

    let tags: HashSet<&'static str> = ["a", "b", "br", "h1", "h2", "h3", "h4", "i", "img", "sup"]
        .iter()
        .copied()
        .collect();

    let mut generic_attributes: HashSet<&'static str> = HashSet::new();
    generic_attributes.insert("id");

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href"].iter().copied().collect());
    tag_attributes.insert("img", ["alt", "src"].iter().copied().collect());

    Ok(Builder::new()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .add_url_schemes(&["data"])
        .link_rel(None)
        .clean(&raw_html)
        .to_string())
}

struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn push(&mut self, html: &str) {
        self.out.push_str(html);
    }

    fn finish(self) -> String {
        self.out
    }
}

fn emit_part(
    writer: &mut HtmlWriter,
    part: &DocPart,
    options: &HtmlEmitOptions,
    images: &mut dyn ImageSource,
) -> Result<(), RenderError> {
    match part {
        DocPart::PlainText(text) => {
            let lines: Vec<String> = text.split('\n').map(escape_text).collect();
            writer.push(&lines.join("<br/>"));
        }
        DocPart::StyledText { text, bold, italic } => {
            if *bold {
                writer.push("<b>");
            }
            if *italic {
                writer.push("<i>");
            }
            writer.push(&escape_text(text));
            if *italic {
                writer.push("</i>");
            }
            if *bold {
                writer.push("</b>");
            }
        }
        DocPart::Heading { level, text } => {
            let tag = heading_tag(*level);
            writer.push(&format!("<{}>{}</{}>", tag, escape_text(text), tag));
        }
        DocPart::Image { name } => {
            let src = if options.inline_images {
                let data = images.load(name).map_err(|source| RenderError::Image {
                    name: name.clone(),
                    source,
                })?;
                data_uri(data.mime, &data.bytes)
            } else {
                escape_url(name)
            };
            writer.push(&format!(
                "<img src=\"{}\" alt=\"{}\"/>",
                escape_attr(&src),
                escape_attr(name)
            ));
        }
        DocPart::LinkTarget(AnchorId(id)) => {
            writer.push(&format!("<a id=\"{}\"></a>", id));
        }
        DocPart::Link {
            target: AnchorId(id),
            text,
        } => {
            writer.push(&format!("<a href=\"#{}\">{}</a>", id, escape_text(text)));
        }
        DocPart::ExternalLink { url, text } => {
            writer.push(&format!(
                "<a href=\"{}\">{}</a>",
                escape_attr(&escape_url(url)),
                escape_text(text)
            ));
        }
        DocPart::PendingReference(_) => {
            return Err(RenderError::UnresolvedPart {
                kind: part.kind_name(),
            });
        }
    }
    Ok(())
}

fn heading_tag(level: HeadingLevel) -> String {
    format!("h{}", level.rank())
}

/// Escapes text content. Tabs count as four spaces, runs of two or more
/// spaces are kept as non-breaking spaces and `®` is raised.
fn escape_text(text: &str) -> String {
    let text = text.replace('\t', "    ");
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            ' ' => {
                let mut run = 1;
                while chars.peek() == Some(&' ') {
                    chars.next();
                    run += 1;
                }
                if run == 1 {
                    out.push(' ');
                } else {
                    for _ in 0..run {
                        out.push_str("&#160;");
                    }
                }
            }
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '®' => out.push_str("<sup>®</sup>"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_url(text: &str) -> String {
    let mut encoded = String::new();
    for &byte in text.as_bytes() {
        match byte {
            b' ' => encoded.push_str("%20"),
            b'\\' => encoded.push_str("%5C"),
            0x00..=0x1F | 0x7F..=0xFF => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
            _ => encoded.push(byte as char),
        }
    }
    encoded
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
