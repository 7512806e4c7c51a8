//! Text escaping for SpreadsheetML.
//!
//! Excel writes characters XML 1.0 cannot carry (most C0 controls) as
//! `_xHHHH_`. A literal `_xHHHH_` in user text is protected by escaping its
//! leading underscore as `_x005F_`.

/// Length of a `_xHHHH_` sequence in bytes
const ESCAPE_LEN: usize = 7;

/// Parse the `_xHHHH_` sequence at the start of `s`, if there is one
fn escape_at(s: &str) -> Option<char> {
    let b = s.as_bytes();
    if b.len() < ESCAPE_LEN || b[0] != b'_' || b[1] != b'x' || b[6] != b'_' {
        return None;
    }
    let hex = s.get(2..6)?;
    if !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Decode Excel's `_xHHHH_` escape sequences
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if let Some(c) = escape_at(&s[i..]) {
            out.push(c);
            i += ESCAPE_LEN;
            continue;
        }
        // Advance one whole character
        let ch = s[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(ch);
        i += ch.len_utf8().max(1);
    }
    out
}

/// Encode text so that it survives an XML round trip through Excel
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, ch) in s.char_indices() {
        match ch {
            '_' if escape_at(&s[i..]).is_some() => out.push_str("_x005F_"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 => out.push_str(&format!("_x{:04X}_", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Escape the five predefined XML entities
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line_breaks() {
        assert_eq!(decode_excel_escapes("Jl. Merdeka_x000d__x000a_No. 5"), "Jl. Merdeka\r\nNo. 5");
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
    }

    #[test]
    fn test_decode_leaves_partial_sequences() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("nama_xyz_"), "nama_xyz_");
        assert_eq!(decode_excel_escapes("Tōkyō_x0009_"), "Tōkyō\t");
    }

    #[test]
    fn test_encode_roundtrip() {
        for text in ["plain", "bell\u{7}", "literal _x000D_ text", "tab\tline\n", "kanji 漢字"] {
            assert_eq!(decode_excel_escapes(&encode_excel_escapes(text)), text);
        }
    }

    #[test]
    fn test_escape_xml_entities() {
        assert_eq!(escape_xml(r#"PT "Maju" & <Co>"#), "PT &quot;Maju&quot; &amp; &lt;Co&gt;");
    }
}
