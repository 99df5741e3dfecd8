/// Characters allowed by XML 1.0: tab/newline/carriage-return plus the
/// non-surrogate, non-control planes. Annotation text is user-typed, so
/// anything else is dropped before it reaches the SVG.
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

fn entity_for(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&apos;"),
        _ => None,
    }
}

/// Strip characters XML cannot represent at all.
pub fn sanitize_xml_text(text: &str) -> String {
    text.chars().filter(|&c| is_valid_xml_char(c)).collect()
}

/// Sanitize and escape text for use inside an SVG element or attribute.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match entity_for(c) {
            Some(entity) => escaped.push_str(entity),
            None => escaped.push(c),
        }
    }
    escaped
}
