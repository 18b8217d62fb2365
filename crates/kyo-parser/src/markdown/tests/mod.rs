
use kyo_core::structure::{Block, CodeFence, StructuralTree};

use super::MarkdownParser;

pub(super) fn parse(src: &str) -> StructuralTree {
    MarkdownParser::default()
        .parse(src)
        .expect("markdown should parse")
}

pub(super) fn fences(tree: &StructuralTree) -> Vec<&CodeFence> {
    tree.code_fences().collect()
}

pub(super) fn kinds(tree: &StructuralTree) -> Vec<String> {
    tree.blocks
        .iter()
        .map(|block| match block {
            Block::Heading(h) => format!("h{}", h.level),
            Block::Paragraph(_) => "p".to_string(),
            Block::CodeFence(_) => "fence".to_string(),
            Block::Other(o) => format!("{:?}", o.kind),
        })
        .collect()
}
