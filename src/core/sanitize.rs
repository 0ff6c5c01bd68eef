// src/core/sanitize.rs

/// Collapse whitespace runs (including newlines and NBSP) to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// First line of `s`, trimmed. Whole string when there is no newline.
pub fn first_line(s: &str) -> &str {
    s.split(['\n', '\r']).next().unwrap_or("").trim()
}

/// Last `n` characters (not bytes) of `s`, after trimming trailing whitespace.
pub fn last_chars(s: &str, n: usize) -> &str {
    let t = s.trim_end();
    let count = t.chars().count();
    if count <= n {
        return t;
    }
    let (start, _) = t.char_indices().nth(count - n).unwrap_or((0, ' '));
    &t[start..]
}
