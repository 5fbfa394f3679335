const MAX_NAME_CHARS: usize = 120;

/// Makes a download name safe to create on any desktop filesystem while
/// keeping its extension: forbidden characters become `_`, runs of `_`
/// collapse, and reserved Windows device names get a trailing `_`.
pub fn sanitize_filename(name: &str) -> String {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };

    let mut stem = clean(stem);
    if stem.is_empty() {
        stem = "output".to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    let ext = ext.map(clean).filter(|ext| !ext.is_empty());

    let ext_chars = ext.as_ref().map_or(0, |e| e.chars().count() + 1);
    let budget = MAX_NAME_CHARS.saturating_sub(ext_chars);
    if stem.chars().count() > budget {
        stem = stem.chars().take(budget).collect();
    }
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn clean(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut compacted = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.trim_matches(&['_', ' ', '.'][..]).chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
