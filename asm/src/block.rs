use crate::token::Pos;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Begin,
    If,
    Else,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Begin => write!(f, "BEGIN"),
            BlockKind::If => write!(f, "IF"),
            BlockKind::Else => write!(f, "ELSE"),
        }
    }
}

/// An open control structure. `pos` is where its keyword was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub id: usize,
    pub pos: Pos,
}

pub fn start_label(id: usize) -> String {
    format!("block_start_{id}")
}

pub fn end_label(id: usize) -> String {
    format!("block_end_{id}")
}

impl Block {
    pub fn start_label(&self) -> String {
        start_label(self.id)
    }

    pub fn end_label(&self) -> String {
        end_label(self.id)
    }
}

/// Open blocks, innermost last. Ids are handed out in opening order from 0.
#[derive(Debug, Default)]
pub struct Blocks {
    stack: Vec<Block>,
    next_id: usize,
}

impl Blocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, kind: BlockKind, pos: Pos) -> &Block {
        let id = self.next_id;
        self.next_id += 1;
        self.stack.push(Block { kind, id, pos });
        &self.stack[self.stack.len() - 1]
    }

    pub fn close(&mut self) -> Option<Block> {
        self.stack.pop()
    }

    pub fn current(&self) -> Option<&Block> {
        self.stack.last()
    }

    pub fn current_kind(&self) -> Option<BlockKind> {
        self.current().map(|b| b.kind)
    }

    /// End label of the block the next `open` will create.
    pub fn next_end_label(&self) -> String {
        end_label(self.next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(col: usize) -> Pos {
        Pos::new("script", 1, col)
    }

    #[test]
    fn ids_follow_opening_order() {
        let mut blocks = Blocks::new();
        assert_eq!(blocks.open(BlockKind::Begin, pos(1)).id, 0);
        assert_eq!(blocks.open(BlockKind::If, pos(7)).id, 1);
        assert_eq!(blocks.close().map(|b| b.id), Some(1));
        assert_eq!(blocks.open(BlockKind::If, pos(13)).id, 2);
        assert_eq!(blocks.current_kind(), Some(BlockKind::If));
    }

    #[test]
    fn next_end_label_is_what_open_will_use() {
        let mut blocks = Blocks::new();
        blocks.open(BlockKind::If, pos(1));
        let peeked = blocks.next_end_label();
        blocks.close();
        let opened = blocks.open(BlockKind::Else, pos(5)).end_label();
        assert_eq!(peeked, opened);
        assert_eq!(opened, "block_end_1");
    }

    #[test]
    fn empty() {
        let mut blocks = Blocks::new();
        assert!(blocks.current().is_none());
        assert_eq!(blocks.current_kind(), None);
        assert_eq!(blocks.close(), None);
    }
}
