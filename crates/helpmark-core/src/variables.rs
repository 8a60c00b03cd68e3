use std::collections::HashMap;

use crate::error::CompileError;
use crate::lines::Line;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variable {
    pub value: String,
    pub line: usize,
}

/// Name to value table. Built once from all definition lines, then only queried.
#[derive(Clone, Debug, Default)]
pub(crate) struct VariableTable {
    vars: HashMap<String, Variable>,
}

impl VariableTable {
    /// Removes every `[\name=value]` line from `lines` and records it.
    pub(crate) fn extract(lines: Vec<Line>) -> Result<(Vec<Line>, Self), CompileError> {
        let mut table = VariableTable::default();
        let mut kept = Vec::with_capacity(lines.len());
        for line in lines {
            let (name, value) = match parse_definition(&line.text) {
                Some(def) => def,
                None => {
                    kept.push(line);
                    continue;
                }
            };
            if let Some(existing) = table.vars.get(name) {
                return Err(CompileError::VariableRedefined {
                    name: name.to_string(),
                    first_line: existing.line,
                    second_line: line.number,
                });
            }
            log::debug!("variable '{}' defined in line {}", name, line.number);
            table.vars.insert(
                name.to_string(),
                Variable {
                    value: value.to_string(),
                    line: line.number,
                },
            );
        }
        Ok((kept, table))
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.vars.len()
    }

    /// Replaces every `[name]` naming a known variable with its value.
    /// Inserted values are not scanned again.
    pub(crate) fn substitute(&self, text: &str) -> String {
        if self.vars.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('[') {
            let after = &rest[open + 1..];
            let var = after
                .find(']')
                .and_then(|close| self.vars.get(&after[..close]).map(|var| (close, var)));
            match var {
                Some((close, var)) => {
                    out.push_str(&rest[..open]);
                    out.push_str(&var.value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[..=open]);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn parse_definition(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix("[\\")?.strip_suffix(']')?;
    let eq = body.find('=')?;
    let name = &body[..eq];
    if !is_valid_name(name) {
        return None;
    }
    Some((name, &body[eq + 1..]))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch == ' ' || ch.is_alphanumeric())
}
