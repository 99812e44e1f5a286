//! Scalar text to values: line folding, escapes, block scalars and the core schema.

use rowan::{TextRange, TextSize};

use crate::model::ScalarValue;

/// Resolves plain scalar text under the core schema.
pub(crate) fn resolve_plain(text: &str) -> ScalarValue {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return ScalarValue::Null,
        "true" | "True" | "TRUE" => return ScalarValue::Bool(true),
        "false" | "False" | "FALSE" => return ScalarValue::Bool(false),
        ".nan" | ".NaN" | ".NAN" => return ScalarValue::Float(f64::NAN),
        _ => {}
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return ScalarValue::Float(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    // Octal and hexadecimal forms are unsigned in the core schema.
    if text.len() == unsigned.len() {
        let radix_int = |digits: &str, radix: u32| {
            (!digits.is_empty())
                .then(|| i64::from_str_radix(digits, radix).ok())
                .flatten()
        };
        if let Some(digits) = unsigned.strip_prefix("0o")
            && let Some(value) = radix_int(digits, 8)
        {
            return ScalarValue::Int(value);
        }
        if let Some(digits) = unsigned.strip_prefix("0x")
            && let Some(value) = radix_int(digits, 16)
        {
            return ScalarValue::Int(value);
        }
    }

    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return match text.parse::<i64>() {
            Ok(value) => ScalarValue::Int(value),
            Err(_) => text
                .parse::<f64>()
                .map_or_else(|_| ScalarValue::from(text), ScalarValue::Float),
        };
    }

    if is_float(unsigned)
        && let Ok(value) = text.parse::<f64>()
    {
        return ScalarValue::Float(value);
    }

    ScalarValue::from(text)
}

/// `( \.[0-9]+ | [0-9]+ ( \.[0-9]* )? ) ( [eE] [-+]? [0-9]+ )?`
fn is_float(text: &str) -> bool {
    let bytes = text.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut i = digits(0);
    let int_digits = i;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = digits(i + 1);
        i += 1 + frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'-' | b'+')) {
            i += 1;
        }
        let exp_digits = digits(i);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }
    i == bytes.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlowScalar {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

/// Folded value of flow scalar text, with the ranges of invalid escapes.
///
/// `text` excludes the quotes. `offset` is where it starts in the source, used to
/// place escape diagnostics.
pub(crate) fn fold_flow(text: &str, style: FlowScalar, offset: TextSize) -> (String, Vec<TextRange>) {
    let mut out = String::with_capacity(text.len());
    let mut invalid = Vec::new();
    // Escaped characters before this byte of `out` survive line folding.
    let mut floor = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' if style == FlowScalar::SingleQuoted => {
                if chars.next_if(|(_, c)| *c == '\'').is_some() {
                    out.push('\'');
                    floor = out.len();
                } else {
                    out.push('\'');
                }
            }
            '\\' if style == FlowScalar::DoubleQuoted => {
                let Some((_, next)) = chars.next() else {
                    out.push('\\');
                    break;
                };
                match next {
                    '\r' | '\n' => {
                        if next == '\r' {
                            chars.next_if(|(_, c)| *c == '\n');
                        }
                        while chars.next_if(|(_, c)| matches!(c, ' ' | '\t')).is_some() {}
                    }
                    _ => match unescape(next, &mut chars) {
                        Some(ch) => out.push(ch),
                        None => {
                            let end = chars.peek().map_or(text.len(), |(j, _)| *j);
                            invalid.push(TextRange::new(
                                offset + TextSize::from(i as u32),
                                offset + TextSize::from(end as u32),
                            ));
                            out.push_str(&text[i..end]);
                        }
                    },
                }
                floor = out.len();
            }
            '\r' | '\n' => {
                if c == '\r' {
                    chars.next_if(|(_, c)| *c == '\n');
                }
                let trimmed = out[floor..].trim_end_matches([' ', '\t']).len();
                out.truncate(floor + trimmed);

                let mut breaks = 1;
                loop {
                    while chars.next_if(|(_, c)| matches!(c, ' ' | '\t')).is_some() {}
                    match chars.next_if(|(_, c)| matches!(c, '\r' | '\n')) {
                        Some((_, '\r')) => {
                            chars.next_if(|(_, c)| *c == '\n');
                            breaks += 1;
                        }
                        Some(_) => breaks += 1,
                        None => break,
                    }
                }
                if breaks == 1 {
                    out.push(' ');
                } else {
                    out.extend(std::iter::repeat_n('\n', breaks - 1));
                }
            }
            _ => out.push(c),
        }
    }

    (out, invalid)
}

/// Decodes the escape that starts with `first` (the character after `\`).
fn unescape(
    first: char,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Option<char> {
    let hex_len = match first {
        '0' => return Some('\0'),
        'a' => return Some('\x07'),
        'b' => return Some('\x08'),
        't' | '\t' => return Some('\t'),
        'n' => return Some('\n'),
        'v' => return Some('\x0b'),
        'f' => return Some('\x0c'),
        'r' => return Some('\r'),
        'e' => return Some('\x1b'),
        ' ' => return Some(' '),
        '"' => return Some('"'),
        '/' => return Some('/'),
        '\\' => return Some('\\'),
        'N' => return Some('\u{85}'),
        '_' => return Some('\u{a0}'),
        'L' => return Some('\u{2028}'),
        'P' => return Some('\u{2029}'),
        'x' => 2,
        'u' => 4,
        'U' => 8,
        _ => return None,
    };

    let mut code = 0u32;
    for _ in 0..hex_len {
        let (_, c) = chars.next_if(|(_, c)| c.is_ascii_hexdigit())?;
        code = code * 16 + c.to_digit(16)?;
    }
    char::from_u32(code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

/// Content of a block scalar.
///
/// `header` is the `|` or `>` token, `body` the captured lines including their
/// breaks, and `base_indent` the indentation of the line holding the header.
pub(crate) fn block_scalar(header: &str, body: &str, base_indent: usize) -> String {
    let literal = header.starts_with('|');
    let mut chomp = Chomp::Clip;
    let mut explicit_indent = None;
    for c in header.chars().skip(1) {
        match c {
            '-' => chomp = Chomp::Strip,
            '+' => chomp = Chomp::Keep,
            d => explicit_indent = d.to_digit(10).map(|d| d as usize),
        }
    }

    let lines: Vec<(&str, bool)> = body
        .split_inclusive('\n')
        .map(|line| {
            let has_break = line.ends_with('\n');
            (line.trim_end_matches(['\n', '\r']), has_break)
        })
        .collect();

    let indent = explicit_indent
        .map(|d| base_indent + d)
        .or_else(|| {
            lines
                .iter()
                .find(|(text, _)| !text.trim_start_matches([' ', '\t']).is_empty())
                .map(|(text, _)| text.bytes().take_while(|b| *b == b' ').count())
        })
        .unwrap_or(0);

    let content: Vec<&str> = lines
        .iter()
        .map(|(text, _)| {
            let strip = text.bytes().take(indent).take_while(|b| *b == b' ').count();
            if text.len() <= indent && text.trim_start_matches(' ').is_empty() {
                ""
            } else {
                &text[strip..]
            }
        })
        .collect();

    let Some(last) = content.iter().rposition(|line| !line.is_empty()) else {
        return match chomp {
            Chomp::Keep => "\n".repeat(lines.iter().filter(|(_, b)| *b).count()),
            Chomp::Strip | Chomp::Clip => String::new(),
        };
    };

    let mut out = if literal {
        content[..=last].join("\n")
    } else {
        fold_block(&content[..=last])
    };

    match chomp {
        Chomp::Strip => {}
        Chomp::Clip => {
            if lines[last].1 {
                out.push('\n');
            }
        }
        Chomp::Keep => {
            let breaks = lines[last..].iter().filter(|(_, b)| *b).count();
            out.extend(std::iter::repeat_n('\n', breaks));
        }
    }
    out
}

/// Folded block content: single breaks between plain lines become spaces.
/// Breaks next to more-indented lines are kept.
fn fold_block(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut previous_more_indented: Option<bool> = None;
    let mut empty = 0;

    for line in lines {
        if line.is_empty() {
            empty += 1;
            continue;
        }
        let more_indented = line.starts_with([' ', '\t']);
        match previous_more_indented {
            None => out.extend(std::iter::repeat_n('\n', empty)),
            Some(false) if !more_indented => {
                if empty == 0 {
                    out.push(' ');
                } else {
                    out.extend(std::iter::repeat_n('\n', empty));
                }
            }
            Some(_) => out.extend(std::iter::repeat_n('\n', empty + 1)),
        }
        out.push_str(line);
        previous_more_indented = Some(more_indented);
        empty = 0;
    }
    out
}
