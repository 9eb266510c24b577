//! Whitespace tokenizer for pre-tokenized dialog transcripts.
//!
//! Raw text is laid out as one group per line and one block per tab-separated
//! cell; blocks may be wrapped in double quotes. Tokens are whitespace
//! delimited, with clitics split off after apostrophes (`don't` -> `don'`, `t`).

use crate::span::{partition, Slice};

/// Tokens of one tab-separated cell.
pub type Block = Vec<String>;

/// Blocks of one line.
pub type Group = Vec<Block>;

/// Split raw text into group -> block -> token layers.
///
/// Never fails. Empty input yields a single group holding one empty block.
pub fn tokenize(text: &str) -> Vec<Group> {
    text.trim()
        .split('\n')
        .map(|group| {
            group
                .trim()
                .split('\t')
                .map(|block| {
                    block
                        .trim_matches('"')
                        .split_whitespace()
                        .flat_map(split_clitics)
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Separate apostrophe-marked clitics: a break is inserted after every `'`.
pub fn split_clitics(token: &str) -> Vec<String> {
    token
        .replace('\'', "' ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Flattened view of a tokenized text with its structural partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub tokens: Vec<String>,
    /// One slice per tab-separated cell.
    pub blocks: Vec<Slice>,
    /// One slice per line.
    pub groups: Vec<Slice>,
}

impl Segmentation {
    pub fn from_text(text: &str) -> Self {
        Self::from_groups(tokenize(text))
    }

    pub fn from_groups(groups: Vec<Group>) -> Self {
        let merged: Vec<Vec<&String>> = groups
            .iter()
            .map(|group| group.iter().flatten().collect())
            .collect();
        let group_slices = partition(&merged);

        let blocks: Vec<Block> = groups.into_iter().flatten().collect();
        let block_slices = partition(&blocks);

        Self {
            tokens: blocks.into_iter().flatten().collect(),
            blocks: block_slices,
            groups: group_slices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_layers() {
        let groups = tokenize("\"I don't know\"\tok\nfine then\n");
        assert_eq!(
            groups,
            vec![
                vec![
                    vec!["I", "don'", "t", "know"],
                    vec!["ok"],
                ],
                vec![vec!["fine", "then"]],
            ]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        let groups = tokenize("");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_split_clitics() {
        assert_eq!(split_clitics("l'altro"), vec!["l'", "altro"]);
        assert_eq!(split_clitics("don't"), vec!["don'", "t"]);
        assert_eq!(split_clitics("plain"), vec!["plain"]);
        assert_eq!(split_clitics("'"), vec!["'"]);
    }

    #[test]
    fn test_segmentation() {
        let seg = Segmentation::from_text("a b\tc\nd e f");
        assert_eq!(seg.tokens, vec!["a", "b", "c", "d", "e", "f"]);
        assert_eq!(
            seg.blocks,
            vec![Slice::new(0, 2), Slice::new(2, 3), Slice::new(3, 6)]
        );
        assert_eq!(seg.groups, vec![Slice::new(0, 3), Slice::new(3, 6)]);
    }
}
