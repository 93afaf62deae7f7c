//! `{name}` placeholder substitution for task and agent text.

use std::collections::HashMap;

use crate::core::error::TemplateError;

/// Pipeline-level inputs keyed by placeholder name.
pub type Inputs = HashMap<String, String>;

/// Replaces every `{name}` in `template` with `inputs[name]`.
///
/// Only identifier-shaped names (letters, digits, `_` and `-`, not starting
/// with a digit) are placeholders. Any other brace run, such as a JSON
/// example in a prompt, is copied through unchanged. `{{` and `}}` produce
/// literal braces.
pub fn interpolate(template: &str, inputs: &Inputs) -> Result<String, TemplateError> {
    if !template.contains(['{', '}']) {
        return Ok(template.to_string());
    }

    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let rest = &template[offset + 1..];
                match rest.find(['{', '}']) {
                    Some(end) if rest[end..].starts_with('}') && is_placeholder(&rest[..end]) => {
                        let key = rest[..end].trim();
                        match inputs.get(key) {
                            Some(value) => out.push_str(value),
                            None => return Err(TemplateError::MissingInput(key.to_string())),
                        }
                        let close = offset + 1 + end;
                        for (i, _) in chars.by_ref() {
                            if i == close {
                                break;
                            }
                        }
                    }
                    None if is_placeholder(rest) => {
                        return Err(TemplateError::Unterminated(offset));
                    }
                    _ => out.push('{'),
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn is_placeholder(name: &str) -> bool {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}
