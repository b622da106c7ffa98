//! Bounded "nearest number after an anchor word" search.

use regex::Regex;

/// Slice of at most `chars` characters of `text` starting at byte `from`.
pub fn char_window(text: &str, from: usize, chars: usize) -> &str {
    let tail = &text[from..];
    let end = tail
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}

/// A target found after an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearMatch {
    /// Capture group 1 of the target (or the whole match when absent).
    pub value: String,
    /// Distance in chars from the end of the anchor to the captured value.
    pub distance: usize,
}

/// For every match of `anchor` in `text`, look at the next `window` chars and
/// take the first `target` match there. The candidate closest to its anchor
/// wins; on equal distance the earlier anchor wins.
pub fn nearest_after(text: &str, anchor: &Regex, target: &Regex, window: usize) -> Option<NearMatch> {
    let mut best: Option<NearMatch> = None;

    for a in anchor.find_iter(text) {
        let slice = char_window(text, a.end(), window);
        let Some(caps) = target.captures(slice) else {
            continue;
        };
        let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
            continue;
        };
        let candidate = NearMatch {
            value: m.as_str().to_string(),
            distance: slice[..m.start()].chars().count(),
        };
        match &best {
            Some(current) if current.distance <= candidate.distance => {}
            _ => best = Some(candidate),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(p: &str) -> Regex {
        Regex::new(p).unwrap()
    }

    #[test]
    fn test_char_window_respects_multibyte() {
        assert_eq!(char_window("áéíóú", 0, 2), "áé");
        assert_eq!(char_window("abc", 1, 10), "bc");
        assert_eq!(char_window("abc", 3, 2), "");
    }

    #[test]
    fn test_nearest_picks_closest_across_anchors() {
        let text = "PLAN de estudios vigente desde 2005\n... PLAN\n2182";
        let found = nearest_after(text, &re(r"\bPLAN\b"), &re(r"\b(\d{4})(?:\D|$)"), 120).unwrap();
        assert_eq!(found.value, "2182");
        assert_eq!(found.distance, 1);
    }

    #[test]
    fn test_nearest_respects_window() {
        let text = format!("PLAN{}2182", " ".repeat(200));
        assert!(nearest_after(&text, &re(r"PLAN"), &re(r"(\d{4})"), 120).is_none());
    }

    #[test]
    fn test_nearest_tie_prefers_earlier_anchor() {
        let text = "X 1111 X 2222";
        let found = nearest_after(text, &re("X"), &re(r"(\d{4})"), 5).unwrap();
        assert_eq!(found.value, "1111");
    }

    #[test]
    fn test_nearest_distance_counts_chars() {
        // 3 accented chars (6 bytes) before 1111, 4 ASCII chars before 2222.
        let text = "Xééé1111 Xabcd2222";
        let found = nearest_after(text, &re("X"), &re(r"(\d{4})"), 10).unwrap();
        assert_eq!(found.value, "1111");
        assert_eq!(found.distance, 3);
    }

    #[test]
    fn test_nearest_without_anchor() {
        assert!(nearest_after("2182", &re("PLAN"), &re(r"(\d{4})"), 10).is_none());
    }

    #[test]
    fn test_nearest_without_capture_group_uses_whole_match() {
        let found = nearest_after("A: 42", &re("A:"), &re(r"\d+"), 10).unwrap();
        assert_eq!(found.value, "42");
    }
}
