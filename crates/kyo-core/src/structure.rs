//! Structural markdown tree.
//!
//! Produced by `kyo-parser` and owned by a [`Document`](crate::entities::Document).
//! Only block-level structure is modelled. Lists, blockquotes, tables and the
//! like are kept as opaque [`OtherBlock`]s. Line numbers are 1-based and
//! inclusive.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ATX or setext heading.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// A fenced code block exactly as it appears in the source.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CodeFence {
    /// Full info string after the opening fence (`python name=setup`).
    pub info: String,
    /// First word of the info string, lowercased. `None` when absent.
    pub language: Option<String>,
    /// Code between the fences, newline-terminated lines preserved.
    pub code: String,
    /// Line of the opening fence.
    pub start_line: u32,
    /// Line of the closing fence, or the last line of the document when
    /// the fence is unterminated.
    pub end_line: u32,
    /// `false` when the document ended before a closing fence.
    pub terminated: bool,
}

/// Kinds of blocks retained for structure but not decomposed further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OtherKind {
    List,
    BlockQuote,
    Table,
    ThematicBreak,
    Html,
    IndentedCode,
    Frontmatter,
    FootnoteDefinition,
    DefinitionList,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OtherBlock {
    pub kind: OtherKind,
    pub start_line: u32,
    pub end_line: u32,
}

/// One block-level node, in document order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading(Heading),
    Paragraph(Paragraph),
    CodeFence(CodeFence),
    Other(OtherBlock),
}

impl Block {
    #[must_use]
    pub const fn start_line(&self) -> u32 {
        match self {
            Self::Heading(h) => h.start_line,
            Self::Paragraph(p) => p.start_line,
            Self::CodeFence(c) => c.start_line,
            Self::Other(o) => o.start_line,
        }
    }

    #[must_use]
    pub const fn end_line(&self) -> u32 {
        match self {
            Self::Heading(h) => h.end_line,
            Self::Paragraph(p) => p.end_line,
            Self::CodeFence(c) => c.end_line,
            Self::Other(o) => o.end_line,
        }
    }
}

/// A link destination found anywhere in the document. Never resolved.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LinkRef {
    pub destination: String,
    pub line: u32,
}

/// Parsed structure of one markdown document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StructuralTree {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub links: Vec<LinkRef>,
    /// Raw YAML frontmatter body (without the `---` delimiters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontmatter: Option<String>,
}

impl StructuralTree {
    /// Fenced code blocks in document order.
    pub fn code_fences(&self) -> impl Iterator<Item = &CodeFence> {
        self.blocks.iter().filter_map(|block| match block {
            Block::CodeFence(fence) => Some(fence),
            _ => None,
        })
    }

    /// Headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading(heading) => Some(heading),
            _ => None,
        })
    }

    /// Text of the first level-1 heading.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.headings()
            .find(|h| h.level == 1)
            .map(|h| h.text.as_str())
    }
}
