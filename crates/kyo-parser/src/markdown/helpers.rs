use std::ops::Range;

/// Byte offset to 1-based line number lookup.
pub(super) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(super) fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub(super) fn line_of(&self, offset: usize) -> u32 {
        let line = self.starts.partition_point(|&start| start <= offset);
        u32::try_from(line.max(1)).unwrap_or(u32::MAX)
    }

    /// First and last line touched by `range` (end exclusive).
    pub(super) fn span(&self, range: &Range<usize>) -> (u32, u32) {
        let start = self.line_of(range.start);
        let end = if range.end > range.start {
            self.line_of(range.end - 1)
        } else {
            start
        };
        (start, end)
    }
}

/// Whether a fenced block's source text ends with a matching closing fence.
///
/// The closing fence must use the opening character and be at least as long.
pub(super) fn fence_is_terminated(source: &str) -> bool {
    let mut lines = source.lines();
    let Some(open) = lines.next().map(str::trim_start) else {
        return false;
    };
    let Some(marker) = open.chars().next().filter(|c| matches!(c, '`' | '~')) else {
        return false;
    };
    let width = open.chars().take_while(|c| *c == marker).count();
    lines.last().map(str::trim).is_some_and(|close| {
        close.chars().count() >= width && close.chars().all(|c| c == marker)
    })
}
