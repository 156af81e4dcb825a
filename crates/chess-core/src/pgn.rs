//! PGN export and a lightweight regex-based SAN extractor.

use regex::Regex;

use crate::game_data::GameMetadata;

/// Format SAN moves as numbered movetext.
/// e.g. ["e4", "e5", "Nf3"] → "1. e4 e5 2. Nf3"
pub fn format_movetext<S: AsRef<str>>(san_moves: &[S]) -> String {
    let mut formatted = String::new();

    for (i, san) in san_moves.iter().enumerate() {
        let san = san.as_ref();
        if i % 2 == 0 {
            if !formatted.is_empty() {
                formatted.push(' ');
            }
            formatted.push_str(&format!("{}. {}", (i / 2) + 1, san));
        } else {
            formatted.push_str(&format!(" {}", san));
        }
    }

    formatted
}

/// Render a complete PGN: header tags, blank line, movetext, result token.
pub fn write_pgn<S: AsRef<str>>(metadata: &GameMetadata, san_moves: &[S]) -> String {
    let tags = [
        ("Event", &metadata.event),
        ("Site", &metadata.site),
        ("Date", &metadata.date),
        ("White", &metadata.white),
        ("Black", &metadata.black),
        ("Result", &metadata.result),
    ];

    let mut pgn = String::new();
    for (key, value) in tags {
        pgn.push_str(&format!("[{} \"{}\"]\n", key, value.replace('"', "'")));
    }
    pgn.push('\n');

    let movetext = format_movetext(san_moves);
    if movetext.is_empty() {
        pgn.push_str(&metadata.result);
    } else {
        pgn.push_str(&format!("{} {}", movetext, metadata.result));
    }
    pgn.push('\n');

    pgn
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
pub fn extract_moves(pgn: &str) -> Vec<String> {
    // Remove headers
    let header_re = Regex::new(r"\[[^\]]*\]").unwrap();
    let no_headers = header_re.replace_all(pgn, "");

    // Remove comments
    let comment_re = Regex::new(r"\{[^}]*\}").unwrap();
    let no_comments = comment_re.replace_all(&no_headers, "");

    // Remove variations
    let variation_re = Regex::new(r"\([^)]*\)").unwrap();
    let no_variations = variation_re.replace_all(&no_comments, "");

    let move_re =
        Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O[+#]?|O-O[+#]?")
            .unwrap();

    move_re
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract a string value from a PGN header (e.g. White, Result).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().to_string();
    if value.is_empty() { None } else { Some(value) }
}
