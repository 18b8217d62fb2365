use kyo_core::entities::DocumentStats;
use kyo_core::structure::StructuralTree;

use crate::languages::LanguageTable;

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Content statistics for a parsed document.
///
/// Words are whitespace-separated tokens of the raw text. Fences count as
/// untagged when their language is absent, plain, or unrecognized.
#[must_use]
pub fn document_stats(
    content: &str,
    tree: &StructuralTree,
    languages: &LanguageTable,
) -> DocumentStats {
    let word_count = count(content.split_whitespace().count());
    let (tagged, untagged) = tree.code_fences().fold((0, 0), |(t, u), fence| {
        if languages.classify(fence.language.as_deref()).is_task() {
            (t + 1, u)
        } else {
            (t, u + 1)
        }
    });
    DocumentStats {
        word_count,
        reading_time_minutes: DocumentStats::reading_time(word_count),
        heading_count: count(tree.headings().count()),
        code_block_count: count(tagged + untagged),
        untagged_block_count: count(untagged),
        link_count: count(tree.links.len()),
    }
}
