use once_cell::sync::Lazy;
use regex::Regex;
use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

static WORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").ok());

// Convert LSP UTF-16 position to Rope char index (scalar values), clamped to the end of the line.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            return line_start_char + target_utf16.min(s.len());
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
        if seen_utf16 == target_utf16 {
            break;
        }
    }
    line_start_char + chars_in_line
}

/// LSP position to the index's (line, char column) pair.
pub(crate) fn position_to_line_column(text: &Rope, pos: Position) -> (u32, u32) {
    let idx = position_to_char_idx(text, pos);
    let line = text.char_to_line(idx);
    let column = idx - text.line_to_char(line);
    (line as u32, column as u32)
}

/// Index position (line, char column) to an LSP UTF-16 position.
pub(crate) fn line_column_to_position(text: &Rope, line: u32, column: u32) -> Position {
    let line_idx = line as usize;
    if line_idx >= text.len_lines() {
        let last = text.len_lines().saturating_sub(1);
        let utf16 = text.char_to_utf16_cu(text.len_chars()) - text.char_to_utf16_cu(text.line_to_char(last));
        return Position::new(last as u32, utf16 as u32);
    }
    let line_start = text.line_to_char(line_idx);
    let line_len = text.line(line_idx).len_chars();
    let idx = line_start + (column as usize).min(line_len);
    let utf16 = text.char_to_utf16_cu(idx) - text.char_to_utf16_cu(line_start);
    Position::new(line, utf16 as u32)
}

// Apply incremental LSP changes to a rope buffer.
pub(crate) fn apply_incremental_change_rope(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    if let Some(range) = &change.range {
        let start_char = position_to_char_idx(text, range.start);
        let end_char = position_to_char_idx(text, range.end);
        let (s, e) = if start_char <= end_char {
            (start_char, end_char)
        } else {
            (end_char, start_char)
        };
        if s != e {
            text.remove(s..e);
        }
        if !change.text.is_empty() {
            text.insert(s, &change.text);
        }
    } else {
        *text = Rope::from_str(&change.text);
    }
}

/// Identifier under (or just before) the cursor, from the raw text. Used when
/// the index has no reference there yet, e.g. while an edit is debouncing.
pub(crate) fn word_at(text: &Rope, pos: Position) -> Option<String> {
    let re = (*WORD).as_ref()?;
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return None;
    }
    let line = text.line(line_idx).to_string();
    let (_, column) = position_to_line_column(text, pos);
    let column = column as usize;
    re.find_iter(&line)
        .find(|m| {
            let start = line[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            start <= column && column <= end
        })
        .map(|m| m.as_str().to_string())
}
