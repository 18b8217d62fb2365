//! Block-level markdown parsing.
//!
//! `pulldown-cmark` does the CommonMark work; this module folds its event
//! stream into the flat [`StructuralTree`] the loader stores. Only top-level
//! blocks become nodes, so a fence inside a list item stays part of the list.

mod helpers;

#[cfg(test)]
mod tests;

use std::ops::Range;

use kyo_config::ParserConfig;
use kyo_core::structure::{
    Block, CodeFence, Heading, LinkRef, OtherBlock, OtherKind, Paragraph, StructuralTree,
};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::error::ParseError;
use crate::info::FenceInfo;
use helpers::{LineIndex, fence_is_terminated};

const BOM: char = '\u{feff}';

/// A top-level block whose end event has not arrived yet.
enum Open {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    Fence { info: String, code: String },
    Frontmatter { text: String },
    Other(OtherKind),
    Skip,
}

impl Open {
    fn from_tag(tag: &Tag<'_>) -> Self {
        match tag {
            Tag::Heading { level, .. } => Self::Heading {
                level: *level as u8,
                text: String::new(),
            },
            Tag::Paragraph => Self::Paragraph {
                text: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => Self::Fence {
                info: info.to_string(),
                code: String::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => Self::Other(OtherKind::IndentedCode),
            Tag::MetadataBlock(_) => Self::Frontmatter {
                text: String::new(),
            },
            Tag::List(_) => Self::Other(OtherKind::List),
            Tag::BlockQuote(_) => Self::Other(OtherKind::BlockQuote),
            Tag::Table(_) => Self::Other(OtherKind::Table),
            Tag::HtmlBlock => Self::Other(OtherKind::Html),
            Tag::FootnoteDefinition(_) => Self::Other(OtherKind::FootnoteDefinition),
            Tag::DefinitionList => Self::Other(OtherKind::DefinitionList),
            _ => Self::Skip,
        }
    }

    fn push_text(&mut self, fragment: &str) {
        match self {
            Self::Heading { text, .. }
            | Self::Paragraph { text }
            | Self::Frontmatter { text } => text.push_str(fragment),
            Self::Fence { code, .. } => code.push_str(fragment),
            Self::Other(_) | Self::Skip => {}
        }
    }
}

/// Structural parser for one markdown document.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    max_nesting_depth: u32,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl MarkdownParser {
    #[must_use]
    pub const fn new(config: &ParserConfig) -> Self {
        Self {
            max_nesting_depth: config.max_nesting_depth,
        }
    }

    /// Decode raw file bytes as UTF-8, dropping a leading byte-order mark.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Encoding`] for invalid byte sequences.
    pub fn decode(bytes: Vec<u8>) -> Result<String, ParseError> {
        let mut text = String::from_utf8(bytes).map_err(|e| ParseError::Encoding {
            valid_up_to: e.utf8_error().valid_up_to(),
        })?;
        if text.starts_with(BOM) {
            text.replace_range(..BOM.len_utf8(), "");
        }
        Ok(text)
    }

    /// Parse `text` into its block structure.
    ///
    /// Unterminated fences are not errors: the fence runs to the end of the
    /// document and is marked `terminated: false`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NestingTooDeep`] when container nesting exceeds
    /// the configured limit.
    pub fn parse(&self, text: &str) -> Result<StructuralTree, ParseError> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let lines = LineIndex::new(text);
        let mut tree = StructuralTree::default();

        let mut depth: u32 = 0;
        let mut open: Option<(Open, Range<usize>)> = None;

        for (event, range) in Parser::new_ext(text, options()).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if let Tag::Link { dest_url, .. } = &tag {
                        tree.links.push(LinkRef {
                            destination: dest_url.to_string(),
                            line: lines.line_of(range.start),
                        });
                    }
                    if depth == 0 {
                        open = Some((Open::from_tag(&tag), range.clone()));
                    }
                    depth += 1;
                    if depth > self.max_nesting_depth {
                        return Err(ParseError::NestingTooDeep {
                            depth,
                            limit: self.max_nesting_depth,
                            line: lines.line_of(range.start),
                        });
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0
                        && let Some((block, span)) = open.take()
                    {
                        close_block(&mut tree, block, text, &span, &lines);
                    }
                }
                Event::Text(fragment) | Event::Code(fragment) => {
                    if let Some((block, _)) = open.as_mut() {
                        block.push_text(&fragment);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some((block, _)) = open.as_mut() {
                        block.push_text("\n");
                    }
                }
                Event::Rule if depth == 0 => {
                    let (start_line, end_line) = lines.span(&range);
                    tree.blocks.push(Block::Other(OtherBlock {
                        kind: OtherKind::ThematicBreak,
                        start_line,
                        end_line,
                    }));
                }
                _ => {}
            }
        }

        Ok(tree)
    }
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
        | Options::ENABLE_DEFINITION_LIST
}

fn close_block(
    tree: &mut StructuralTree,
    block: Open,
    document: &str,
    span: &Range<usize>,
    lines: &LineIndex,
) {
    let (start_line, end_line) = lines.span(span);
    let node = match block {
        Open::Heading { level, text } => Block::Heading(Heading {
            level,
            text: text.trim().to_string(),
            start_line,
            end_line,
        }),
        Open::Paragraph { text } => Block::Paragraph(Paragraph {
            text: text.trim().to_string(),
            start_line,
            end_line,
        }),
        Open::Fence { info, code } => {
            let source = document.get(span.clone()).unwrap_or_default();
            let terminated = fence_is_terminated(source);
            if !terminated {
                tracing::debug!(line = start_line, "unterminated code fence");
            }
            let info = info.trim().to_string();
            Block::CodeFence(CodeFence {
                language: FenceInfo::parse(&info).language,
                info,
                code,
                start_line,
                end_line,
                terminated,
            })
        }
        Open::Frontmatter { text } => {
            tree.frontmatter = Some(text.trim_end().to_string());
            Block::Other(OtherBlock {
                kind: OtherKind::Frontmatter,
                start_line,
                end_line,
            })
        }
        Open::Other(kind) => Block::Other(OtherBlock {
            kind,
            start_line,
            end_line,
        }),
        Open::Skip => return,
    };
    tree.blocks.push(node);
}
