/// Prefix of `content` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values, so the cut always lands on a char boundary.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &content[..byte_idx],
        None => content,
    }
}

/// How many content characters a lone oversized item may keep.
///
/// The item is cut to the remaining budget minus `reserve`, and never past
/// the point where its wrapper plus the closing instruction would overflow
/// the budget. `wrapper_chars` excludes the truncation marker. `None` when
/// even the empty wrapper does not fit.
pub fn truncated_content_len(
    max_chars: usize,
    used_chars: usize,
    closing_chars: usize,
    title_chars: usize,
    wrapper_chars: usize,
    reserve: usize,
) -> Option<usize> {
    let fit = max_chars.checked_sub(used_chars + closing_chars + wrapper_chars)?;
    let reserved = max_chars.saturating_sub(used_chars + title_chars + reserve);
    Some(reserved.min(fit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_truncation_when_under_limit() {
        assert_eq!(truncate_chars("hello world", 100), "hello world");
    }

    #[test]
    fn truncates_at_limit() {
        assert_eq!(truncate_chars("abcdefghij", 5), "abcde");
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let s = "ñandú día";
        assert_eq!(truncate_chars(s, 5), "ñandú");
        assert_eq!(truncate_chars(s, 0), "");
    }

    #[test]
    fn reserve_shrinks_kept_content() {
        // 300 budget, 80 used, no closing, 7-char title, 90-char wrapper, 200 reserve.
        assert_eq!(truncated_content_len(300, 80, 0, 7, 90, 200), Some(13));
    }

    #[test]
    fn wrapper_bound_wins_when_reserve_is_small() {
        assert_eq!(truncated_content_len(300, 80, 0, 7, 90, 0), Some(130));
    }

    #[test]
    fn closing_shrinks_the_fit() {
        // 71-char preamble, 162-char closing, 63-char wrapper: 4 chars left.
        assert_eq!(truncated_content_len(300, 71, 162, 3, 63, 200), Some(4));
    }

    #[test]
    fn none_when_wrapper_alone_overflows() {
        assert_eq!(truncated_content_len(100, 80, 0, 7, 90, 200), None);
        assert_eq!(truncated_content_len(300, 71, 162, 3, 80, 0), None);
    }
}
