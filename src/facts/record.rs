// Wed Jan 21 2026 - Alex

use std::fmt;

/// One ground fact: a predicate over ordered constant arguments,
/// rendered one per line in datalog syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRecord {
    pub predicate: String,
    pub args: Vec<String>,
}

impl FactRecord {
    pub fn new(predicate: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// `predicate(a1, a2).`, or `predicate.` for a nullary fact.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            format!("{}.", self.predicate)
        } else {
            format!("{}({}).", self.predicate, self.args.join(", "))
        }
    }

    /// Parses a line of the same shape `render` produces. Arguments are
    /// split on top-level commas only; parenthesised and quoted
    /// arguments pass through whole. Returns `None` for anything that
    /// is not a well-formed fact line.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim().strip_suffix('.')?;
        match body.find('(') {
            None => is_atom(body).then(|| Self::new(body, Vec::new())),
            Some(open) => {
                let predicate = &body[..open];
                if !is_atom(predicate) {
                    return None;
                }
                let inner = body[open + 1..].strip_suffix(')')?;
                let args = split_top_level(inner)?;
                Some(Self::new(predicate, args))
            }
        }
    }
}

impl fmt::Display for FactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn is_atom(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

// Top-level comma split: commas inside (), [] or quotes belong to the
// argument. Unbalanced input or an empty argument rejects the line.
fn split_top_level(input: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match quote {
            Some(closing) => {
                if ch == '\\' {
                    escaped = true;
                } else if ch == closing {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' | '[' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' | ']' => {
                    depth = depth.checked_sub(1)?;
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    let arg = current.trim().to_string();
                    if arg.is_empty() {
                        return None;
                    }
                    args.push(arg);
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }

    if depth != 0 || quote.is_some() || escaped {
        return None;
    }
    let arg = current.trim().to_string();
    if arg.is_empty() {
        return None;
    }
    args.push(arg);
    Some(args)
}
