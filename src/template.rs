//! Helpers for the `{variable}` template syntax used by prompt-style nodes.

/// Escapes every brace so that downstream template filling treats the text literally.
///
/// `"{x}"` becomes `"\{x\}"`.
pub fn escape_braces(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '{' || c == '}' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lists the variable names referenced by a template, in order of first appearance.
///
/// Escaped braces (`\{`, `\}`) are skipped, as are metavariable references (`{#name}`),
/// which are filled from the metavars of an already bound value rather than from an
/// inbound edge.
pub fn template_vars(template: &str) -> Vec<String> {
    let mut vars: Vec<String> = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if matches!(chars.peek(), Some('{') | Some('}')) {
                    chars.next();
                }
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if closed
                    && !name.is_empty()
                    && !name.starts_with('#')
                    && !name.contains('{')
                    && !vars.contains(&name)
                {
                    vars.push(name);
                }
            }
            _ => {}
        }
    }

    vars
}
