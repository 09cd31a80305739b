//! Redis glob-style pattern matching
//!
//! Supported syntax:
//! * `*` matches any sequence of bytes, including the empty one
//! * `?` matches exactly one byte
//! * `[abc]`, `[a-z]` match one byte of the set, `[^abc]` negates the set
//! * `\x` matches `x` literally
//!
//! A `]` directly after `[` or `[^` and a `-` at the edge of a set are literals.
//! An unterminated set extends to the end of the pattern.

/// Returns true if the whole `subject` matches the glob `pattern`
///
/// Iterative with single-star backtracking, so deeply nested patterns can not exhaust the stack.
pub fn glob_match(pattern: &[u8], subject: &[u8]) -> bool {
    let mut p_idx = 0;
    let mut s_idx = 0;

    // Pattern index after the last '*' and subject index to resume from on mismatch
    let mut backtrack: Option<(usize, usize)> = None;

    while s_idx < subject.len() {
        let step = match pattern.get(p_idx) {
            Some(b'*') => {
                backtrack = Some((p_idx + 1, s_idx));
                p_idx += 1;
                continue;
            }
            Some(b'?') => Some(1),
            Some(b'[') => match_class(&pattern[p_idx..], subject[s_idx]),
            Some(b'\\') if p_idx + 1 < pattern.len() => (pattern[p_idx + 1] == subject[s_idx]).then_some(2),
            Some(byte) => (*byte == subject[s_idx]).then_some(1),
            None => None,
        };

        match (step, backtrack) {
            (Some(length), _) => {
                p_idx += length;
                s_idx += 1;
            }
            (None, Some((star_p_idx, star_s_idx))) => {
                p_idx = star_p_idx;
                s_idx = star_s_idx + 1;
                backtrack = Some((star_p_idx, s_idx));
            }
            (None, None) => return false,
        }
    }

    pattern[p_idx..].iter().all(|byte| *byte == b'*')
}

/// Matches a single byte against the set starting at `segment[0] == b'['`
///
/// Returns the length of the set expression (including brackets) on match.
pub(crate) fn match_class(segment: &[u8], byte: u8) -> Option<usize> {
    let mut idx = 1;
    let negated = segment.get(idx) == Some(&b'^');
    if negated {
        idx += 1;
    }

    let first = idx;
    let mut matched = false;

    while idx < segment.len() {
        let current = segment[idx];

        if current == b']' && idx > first {
            idx += 1;
            break;
        }

        if current == b'\\' && idx + 1 < segment.len() {
            matched |= segment[idx + 1] == byte;
            idx += 2;
            continue;
        }

        if idx + 2 < segment.len() && segment[idx + 1] == b'-' && segment[idx + 2] != b']' {
            let (low, high) = if current <= segment[idx + 2] {
                (current, segment[idx + 2])
            } else {
                (segment[idx + 2], current)
            };

            matched |= (low..=high).contains(&byte);
            idx += 3;
            continue;
        }

        matched |= current == byte;
        idx += 1;
    }

    (matched != negated).then_some(idx)
}
