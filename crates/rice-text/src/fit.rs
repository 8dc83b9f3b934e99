use rice_core::Font;
use unicode_segmentation::UnicodeSegmentation;

/// Marker appended to ellipsized text.
pub const ELLIPSIS: &str = "...";

/// Splits `text` into lines no wider than `area_width`, or cuts it to a
/// single ellipsized line.
pub fn fit(text: &str, font: &dyn Font, area_width: i32, ellipsize: bool) -> Vec<String> {
    if ellipsize {
        vec![self::ellipsize(text, font, area_width)]
    } else {
        wrap(text, font, area_width)
    }
}

/// Greedy word wrap.
///
/// Breaks at spaces, CR and LF (a CR LF pair is one break). Spaces at the
/// start of a line are dropped. A run with no break opportunity is split at
/// the character that overflows, and a character wider than the whole area
/// becomes a line of its own.
pub fn wrap(text: &str, font: &dyn Font, area_width: i32) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(text.len(), |&(b, _)| b);
    let slice = |from: usize, to: usize| text[byte_at(from)..byte_at(to)].to_string();

    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut xpos = 0i32;
    // Last break opportunity on the current line: index and x after it.
    let mut brk: Option<(usize, i32)> = None;
    let mut after_cr = false;

    for (i, &(_, c)) in chars.iter().enumerate() {
        if xpos == 0 && c == ' ' {
            start = i + 1;
            continue;
        }
        if after_cr && c == '\n' {
            after_cr = false;
            start = i + 1;
            continue;
        }
        after_cr = c == '\r';

        let cw = font.char_width(c);
        xpos += cw;
        let is_break = matches!(c, ' ' | '\r' | '\n');
        if is_break {
            brk = Some((i, xpos));
        }

        if (is_break && c != ' ') || xpos > area_width {
            match brk.take() {
                Some((at, x_after)) => {
                    lines.push(slice(start, at));
                    start = at + 1;
                    xpos -= x_after;
                }
                None if start == i => {
                    lines.push(slice(i, i + 1));
                    start = i + 1;
                    xpos = 0;
                }
                None => {
                    lines.push(slice(start, i));
                    start = i;
                    xpos = cw;
                }
            }
        }
    }
    if start < chars.len() {
        lines.push(slice(start, chars.len()));
    }
    lines
}

/// Cuts `text` at its first CR or LF and, if it is still wider than
/// `area_width`, keeps the longest grapheme-aligned prefix that fits
/// together with [`ELLIPSIS`].
pub fn ellipsize(text: &str, font: &dyn Font, area_width: i32) -> String {
    let line = text.split(['\r', '\n']).next().unwrap_or_default();
    if font.string_width(line) <= area_width {
        return line.to_string();
    }

    let budget = area_width - font.string_width(ELLIPSIS);
    let mut end = 0;
    let mut width = 0;
    for (at, g) in line.grapheme_indices(true) {
        let gw = font.string_width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        end = at + g.len();
    }
    format!("{}{ELLIPSIS}", &line[..end])
}
