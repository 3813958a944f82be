//! Text clean-up before rendering.
//!
//! The PDF base-14 fonts only cover WinAnsi, and model output regularly carries
//! UTF-8 that was decoded as Latin-1 somewhere upstream. Both are folded to
//! printable ASCII here.

/// Mojibake sequences, longest first so `â€œ` is not eaten by `â€`.
const MOJIBAKE: [(&str, &str); 6] = [
    ("â€™", "'"),
    ("â€“", "-"),
    ("â€œ", "\""),
    ("â€˜", "'"),
    ("â€¦", "..."),
    ("â€", "\""),
];

/// Returns `s` as printable ASCII.
///
/// Mojibake and typographic punctuation are mapped to ASCII equivalents;
/// anything else outside printable ASCII is dropped.
pub fn sanitize_text(s: &str) -> String {
    let mut fixed = s.to_string();
    for (from, to) in MOJIBAKE {
        fixed = fixed.replace(from, to);
    }

    let mut out = String::with_capacity(fixed.len());
    for c in fixed.chars() {
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{00B7}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\t' => out.push(' '),
            c if c.is_ascii_graphic() || c == ' ' || c == '\n' => out.push(c),
            _ => {}
        }
    }
    out
}
