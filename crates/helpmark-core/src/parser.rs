use crate::ast::{DocPart, Document, HeadingLevel};
use crate::coalesce::coalesce_text;
use crate::error::CompileError;
use crate::inline::scan_line;
use crate::lines::{Line, LineKind, normalize_line_breaks, split_lines};
use crate::variables::VariableTable;

/// First pass: builds the part sequence with references still pending.
///
/// Variables are fully collected before any line is parsed, so a variable
/// may be used above its definition.
pub fn parse(source: &str) -> Result<Document, CompileError> {
    let lines = split_lines(&normalize_line_breaks(source));
    let (lines, vars) = VariableTable::extract(lines)?;
    log::debug!(
        "parsing {} lines with {} variables",
        lines.len(),
        vars.len()
    );

    let mut parser = Parser::new(&vars);
    parser.parse_lines(&lines)?;
    let mut document = parser.document;
    coalesce_text(&mut document.parts);
    Ok(document)
}

struct Parser<'a> {
    vars: &'a VariableTable,
    document: Document,
    title_line: Option<usize>,
}

impl<'a> Parser<'a> {
    fn new(vars: &'a VariableTable) -> Self {
        Self {
            vars,
            document: Document::new(),
            title_line: None,
        }
    }

    fn emit(&mut self, part: DocPart) {
        self.document.parts.push(part);
    }

    fn parse_lines(&mut self, lines: &[Line]) -> Result<(), CompileError> {
        // Index of the rule line that underlines the previous heading. It
        // cannot also serve as the overline of a title.
        let mut claimed_rule: Option<usize> = None;
        for (idx, line) in lines.iter().enumerate() {
            if line.kind != LineKind::Text {
                continue;
            }
            match heading_level(lines, idx, claimed_rule) {
                Some(level) => {
                    self.heading(level, line)?;
                    claimed_rule = Some(idx + 1);
                }
                None => {
                    scan_line(&line.text, line.number, self.vars, &mut self.document.parts);
                    if idx + 1 != lines.len() {
                        self.emit(DocPart::text("\n"));
                    }
                }
            }
        }
        Ok(())
    }

    fn heading(&mut self, level: HeadingLevel, line: &Line) -> Result<(), CompileError> {
        // Headings only get variable substitution, never inline markup.
        let text = self.vars.substitute(&line.text);
        if level == HeadingLevel::Title {
            if let Some(first_line) = self.title_line {
                return Err(CompileError::DuplicateTitle {
                    first_line,
                    second_line: line.number,
                });
            }
            self.title_line = Some(line.number);
            self.document.title = Some(text.clone());
        }
        self.emit(DocPart::Heading { level, text });
        Ok(())
    }
}

fn heading_level(lines: &[Line], idx: usize, claimed_rule: Option<usize>) -> Option<HeadingLevel> {
    if lines[idx].is_blank() {
        return None;
    }
    let next = lines.get(idx + 1).map(|line| line.kind)?;
    let overlined = idx > 0
        && lines[idx - 1].kind == LineKind::EqualsRule
        && claimed_rule != Some(idx - 1);
    match next {
        LineKind::EqualsRule if overlined => Some(HeadingLevel::Title),
        LineKind::EqualsRule => Some(HeadingLevel::Caption),
        LineKind::MinusRule => Some(HeadingLevel::SubCaption),
        LineKind::DottedRule => Some(HeadingLevel::SubSubCaption),
        LineKind::Text => None,
    }
}
