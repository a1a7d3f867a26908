//! Scanning helpers that respect quotes and parentheses.

/// Byte offsets of every top-level, case-insensitive occurrence of `sep`.
pub(super) fn find_top_level(s: &str, sep: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {
                if depth == 0
                    && s.get(i..i + sep.len())
                        .is_some_and(|w| w.eq_ignore_ascii_case(sep))
                {
                    out.push(i);
                }
            }
        }
    }
    out
}

/// Split on top-level occurrences of `sep`, trimming each part.
pub(super) fn split_top_level<'a>(s: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for i in find_top_level(s, sep) {
        if i < start {
            continue;
        }
        parts.push(s[start..i].trim());
        start = i + sep.len();
    }
    parts.push(s[start..].trim());
    parts
}

/// Strip one layer of matching quotes, unescaping the quote character.
pub(super) fn unquote(s: &str) -> String {
    let s = s.trim();
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            let inner = &s[1..s.len() - 1];
            return inner.replace(&format!("\\{}", q), &q.to_string());
        }
    }
    s.to_string()
}
