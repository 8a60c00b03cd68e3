use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{AnchorId, DocPart, Document, PendingReference};
use crate::error::CompileError;

/// Prefixes that mark a reference as a web link, longest first.
static WEB_PREFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut prefixes = vec!["www.", "http://www.", "https://www."];
    prefixes.sort_by_key(|prefix| Reverse(prefix.len()));
    prefixes
});

/// `local@domain`, where the local part is a dot-atom or a quoted string.
/// Atoms take any non-ASCII character besides the printable ASCII `atext`.
static MAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    let atext = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~\-\x{80}-\x{10FFFF}]";
    let label = r"[A-Za-z0-9\x{80}-\x{10FFFF}](?:[A-Za-z0-9\-\x{80}-\x{10FFFF}]*[A-Za-z0-9\x{80}-\x{10FFFF}])?";
    Regex::new(&format!(
        r#"^(?:(?P<atom>{atext}+(?:\.{atext}+)*)|"(?P<quoted>(?:[^"\\\r\n]|\\[^\r\n])+)")@(?P<domain>{label}(?:\.{label})*)$"#,
    ))
    .expect("address pattern is valid")
});

static QUOTED_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(.)").expect("quoted-pair pattern is valid"));

static NAME_ADDR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^<>]*<([^<>]+)>$").expect("name-addr pattern is valid"));

/// Second pass: anchors referenced headings and replaces every pending
/// reference with a link, or fails on the first one that cannot be resolved.
pub fn resolve(document: Document) -> Result<Document, CompileError> {
    let Document { title, parts } = document;

    let referenced: HashSet<String> = parts
        .iter()
        .filter_map(|part| match part {
            DocPart::PendingReference(pending) => Some(pending.target.clone()),
            _ => None,
        })
        .collect();
    if referenced.is_empty() {
        return Ok(Document { title, parts });
    }

    let (parts, anchors) = insert_anchors(parts, &referenced);
    log::debug!(
        "{} referenced targets, {} anchors created",
        referenced.len(),
        anchors.len()
    );

    let parts = parts
        .into_iter()
        .map(|part| rewrite_part(part, &anchors))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Document { title, parts })
}

/// Rebuilds `parts` with a `LinkTarget` in front of every referenced heading.
/// A later heading with the same text takes over the links.
fn insert_anchors(
    parts: Vec<DocPart>,
    referenced: &HashSet<String>,
) -> (Vec<DocPart>, HashMap<String, AnchorId>) {
    let mut out = Vec::with_capacity(parts.len() + referenced.len());
    let mut anchors: HashMap<String, AnchorId> = HashMap::new();
    let mut next_id = 1;
    for part in parts {
        match &part {
            DocPart::Heading { text, .. } if referenced.contains(text) => {
                let id = AnchorId(next_id);
                next_id += 1;
                if anchors.insert(text.clone(), id).is_some() {
                    log::warn!(
                        "heading '{}' appears more than once; links go to the last one",
                        text
                    );
                }
                out.push(DocPart::LinkTarget(id));
            }
            DocPart::Heading { .. }
            | DocPart::PlainText(_)
            | DocPart::StyledText { .. }
            | DocPart::Image { .. }
            | DocPart::LinkTarget(_)
            | DocPart::Link { .. }
            | DocPart::ExternalLink { .. }
            | DocPart::PendingReference(_) => {}
        }
        out.push(part);
    }
    (out, anchors)
}

fn rewrite_part(
    part: DocPart,
    anchors: &HashMap<String, AnchorId>,
) -> Result<DocPart, CompileError> {
    match part {
        DocPart::PendingReference(pending) => resolve_reference(pending, anchors),
        DocPart::PlainText(_)
        | DocPart::StyledText { .. }
        | DocPart::Heading { .. }
        | DocPart::Image { .. }
        | DocPart::LinkTarget(_)
        | DocPart::Link { .. }
        | DocPart::ExternalLink { .. } => Ok(part),
    }
}

fn resolve_reference(
    pending: PendingReference,
    anchors: &HashMap<String, AnchorId>,
) -> Result<DocPart, CompileError> {
    if let Some(&target) = anchors.get(&pending.target) {
        return Ok(DocPart::Link {
            target,
            text: pending.display_text().to_string(),
        });
    }

    if is_web_address(&pending.target) {
        return Ok(DocPart::ExternalLink {
            url: normalize_to_http(&pending.target),
            text: pending.display_text().to_string(),
        });
    }

    let candidate = pending
        .target
        .strip_prefix("mailto:")
        .unwrap_or(pending.target.as_str());
    if let Some(address) = parse_mail_address(candidate) {
        let url = format!("mailto:{}", address);
        let text = if pending.text.is_empty() {
            address
        } else {
            pending.text
        };
        return Ok(DocPart::ExternalLink { url, text });
    }

    Err(CompileError::UnresolvedReference {
        target: pending.target,
        line: pending.line,
        column: pending.column,
    })
}

fn is_web_address(target: &str) -> bool {
    WEB_PREFIXES.iter().any(|prefix| target.starts_with(*prefix))
}

fn normalize_to_http(target: &str) -> String {
    if target.starts_with("www.") {
        format!("http://{}", target)
    } else {
        target.to_string()
    }
}

/// Accepts `local@domain` or `Display Name <local@domain>` and returns the
/// bare address. Quoted local parts come back unquoted.
fn parse_mail_address(text: &str) -> Option<String> {
    let text = text.trim();
    let address = match NAME_ADDR.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    };
    let caps = MAIL_ADDRESS.captures(address)?;
    let local = match (caps.name("atom"), caps.name("quoted")) {
        (Some(atom), _) => atom.as_str().to_string(),
        (None, Some(quoted)) => QUOTED_PAIR.replace_all(quoted.as_str(), "$1").into_owned(),
        (None, None) => return None,
    };
    Some(format!("{}@{}", local, &caps["domain"]))
}
