//! Word-boundary repair for translated runs.
//!
//! Runs are translated one at a time, and translation services drop the
//! leading and trailing spaces that separated a run from its neighbours.
//! Concatenating the results would then glue words together, so each run
//! gets a single space added on a side where its neighbour does not
//! already provide one.
//!
//! A paragraph is processed in one left-to-right pass. For run `i`, the
//! previous neighbour is run `i - 1` as already emitted by this pass, and
//! the next neighbour is run `i + 1` as it appeared in the source. With
//! that policy a boundary is padded at most once: if the left run appends
//! a space, the right run sees it and does not prepend another.

/// Pad `current` with a space on each side where a neighbour exists and
/// neither side of the boundary has one.
///
/// An empty `current` is padded by the same rules.
pub fn normalize_run(current: &str, previous: Option<&str>, next: Option<&str>) -> String {
    let mut text = String::with_capacity(current.len() + 2);

    let pad_before = previous.is_some_and(|p| !p.ends_with(' ')) && !current.starts_with(' ');
    if pad_before {
        text.push(' ');
    }
    text.push_str(current);

    let pad_after = next.is_some_and(|n| !n.starts_with(' ')) && !text.ends_with(' ');
    if pad_after {
        text.push(' ');
    }

    text
}

/// Normalize the translated texts of one paragraph.
///
/// `originals` are the run texts before translation and decide the "next"
/// side of each boundary; `translated` holds the service output in the same
/// order. The returned list has the same length as `translated`.
pub fn normalize_paragraph<S: AsRef<str>>(originals: &[S], translated: Vec<String>) -> Vec<String> {
    debug_assert_eq!(originals.len(), translated.len());

    let mut output: Vec<String> = Vec::with_capacity(translated.len());
    for (i, text) in translated.into_iter().enumerate() {
        let previous = output.last().map(String::as_str);
        let next = originals.get(i + 1).map(AsRef::as_ref);
        let normalized = normalize_run(&text, previous, next);
        output.push(normalized);
    }

    output
}
