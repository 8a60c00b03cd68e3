#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LineKind {
    Text,
    EqualsRule,
    MinusRule,
    DottedRule,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Line {
    pub(crate) text: String,
    pub(crate) kind: LineKind,
    // 1-based, counted before definition lines are removed.
    pub(crate) number: usize,
}

impl Line {
    pub(crate) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Rewrites CRLF and lone CR line endings to LF.
pub(crate) fn normalize_line_breaks(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits normalized source into classified lines. An empty source is a single
/// empty line.
pub(crate) fn split_lines(source: &str) -> Vec<Line> {
    source
        .split('\n')
        .enumerate()
        .map(|(idx, text)| Line {
            text: text.to_string(),
            kind: classify(text),
            number: idx + 1,
        })
        .collect()
}

fn classify(text: &str) -> LineKind {
    let mut chars = text.chars();
    let first = match chars.next() {
        Some(ch) => ch,
        None => return LineKind::Text,
    };
    if text.len() < 3 || !chars.all(|ch| ch == first) {
        return LineKind::Text;
    }
    match first {
        '=' => LineKind::EqualsRule,
        '-' => LineKind::MinusRule,
        '.' => LineKind::DottedRule,
        _ => LineKind::Text,
    }
}
