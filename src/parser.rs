use thiserror::Error;

/// One call expression: a command name and its argument list.
///
/// Nested calls are parsed once, up front, into [`Arg::Call`] so the
/// evaluator can walk the tree without re-scanning any text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub name: String,
    pub args: Vec<Arg>,
}

/// A single top-level argument of an [`Expr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Raw text, trimmed. Resolved later as a variable reference or coerced
    /// to the parameter type.
    Literal(String),
    /// A nested call whose result becomes the argument.
    Call(Expr),
}

/// Errors that can occur while splitting a line into an [`Expr`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    /// Nothing in front of the argument list, or an empty line.
    #[error("missing command name")]
    MissingName,
    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis")]
    UnclosedParen,
    /// Text follows the closing parenthesis of the argument list.
    #[error("unexpected input after closing parenthesis: '{0}'")]
    TrailingInput(String),
}

/// Parse a raw console line into a call expression.
///
/// Accepted forms:
/// - `Name` — zero arguments
/// - `Name arg` — shorthand for `Name(arg)`
/// - `Name(a, Other(b, c), d)` — comma separated, nested calls allowed
///
/// `Name()` yields zero arguments, not one empty argument.
pub fn parse_line(raw: &str) -> Result<Expr, ParsingError> {
    let line = raw.trim();
    let Some(open) = line.find('(') else {
        return parse_bare(line);
    };

    let name = line[..open].trim();
    if name.is_empty() {
        return Err(ParsingError::MissingName);
    }

    let close = matching_paren(line, open)?;
    let trailing = line[close + 1..].trim();
    if !trailing.is_empty() {
        return Err(ParsingError::TrailingInput(trailing.to_string()));
    }

    let args = split_arguments(&line[open + 1..close])
        .into_iter()
        .map(parse_argument)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Expr {
        name: name.to_string(),
        args,
    })
}

/// `Name` or the `Name arg` shorthand.
fn parse_bare(line: &str) -> Result<Expr, ParsingError> {
    if line.is_empty() {
        return Err(ParsingError::MissingName);
    }
    let expr = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => Expr {
            name: name.to_string(),
            args: vec![Arg::Literal(arg.trim().to_string())],
        },
        None => Expr {
            name: line.to_string(),
            args: Vec::new(),
        },
    };
    Ok(expr)
}

/// Byte index of the `)` closing the `(` at `open`.
fn matching_paren(line: &str, open: usize) -> Result<usize, ParsingError> {
    let mut depth = 0usize;
    for (i, c) in line[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + i);
                }
            }
            _ => {}
        }
    }
    Err(ParsingError::UnclosedParen)
}

/// Split an argument body on commas that are not nested inside parentheses.
///
/// The body comes from between a matched pair of parentheses, so the depth
/// counter never goes below zero.
fn split_arguments(body: &str) -> Vec<&str> {
    if body.trim().is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                segments.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(body[start..].trim());
    segments
}

fn parse_argument(segment: &str) -> Result<Arg, ParsingError> {
    if segment.contains('(') {
        parse_line(segment).map(Arg::Call)
    } else {
        Ok(Arg::Literal(segment.to_string()))
    }
}
