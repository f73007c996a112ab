//! Program points
//!
//! A location is a basic block plus an index into its statement list. The
//! index is either a valid statement index or exactly one-past-end, meaning
//! "fall through to the successor block(s)".

use crate::features::ir::domain::{BlockId, Cfg, Statement};
use crate::shared::models::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub block: BlockId,
    pub idx: usize,
}

impl Location {
    pub fn new(block: BlockId, idx: usize) -> Self {
        Self { block, idx }
    }

    pub fn block_start(block: BlockId) -> Self {
        Self::new(block, 0)
    }

    /// Statement at this location, None when past the end of the block
    pub fn stmt<'a>(&self, cfg: &'a Cfg) -> Option<&'a Statement> {
        cfg.block(self.block).stmts.get(self.idx)
    }

    pub fn span(&self, cfg: &Cfg) -> Option<Span> {
        self.stmt(cfg).and_then(|s| s.span())
    }

    /// Locations reachable in one step: the next statement within the block,
    /// or the start of each successor block at block end
    pub fn next_locs(&self, cfg: &Cfg) -> Vec<Location> {
        let block = cfg.block(self.block);
        if self.idx + 1 < block.stmts.len() {
            vec![Location::new(self.block, self.idx + 1)]
        } else {
            block
                .succs
                .iter()
                .map(|e| Location::block_start(e.target))
                .collect()
        }
    }

    /// The next location, for when it is unique
    ///
    /// # Panics
    /// Calling this at a multi-successor location is a caller error.
    pub fn next_loc(&self, cfg: &Cfg) -> Location {
        let block = cfg.block(self.block);
        if self.idx + 1 < block.stmts.len() {
            return Location::new(self.block, self.idx + 1);
        }
        assert!(
            block.succs.len() == 1,
            "next_loc at {} requires a unique successor, found {}",
            self,
            block.succs.len()
        );
        Location::block_start(block.succs[0].target)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ir::domain::{BasicBlock, CfgEdge, EdgeKind, Expr, Ty};

    fn two_block_cfg() -> Cfg {
        Cfg {
            entry: BlockId(0),
            blocks: vec![
                BasicBlock {
                    id: BlockId(0),
                    stmts: vec![
                        Statement::Return {
                            value: None,
                            span: None,
                        },
                        Statement::Return {
                            value: Some(Expr::int_const(0, Ty::int())),
                            span: None,
                        },
                    ],
                    succs: vec![CfgEdge {
                        target: BlockId(1),
                        kind: EdgeKind::Fallthrough,
                    }],
                },
                BasicBlock {
                    id: BlockId(1),
                    stmts: vec![],
                    succs: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_next_within_block() {
        let cfg = two_block_cfg();
        let loc = Location::block_start(BlockId(0));
        assert_eq!(loc.next_locs(&cfg), vec![Location::new(BlockId(0), 1)]);
        assert_eq!(loc.next_loc(&cfg), Location::new(BlockId(0), 1));
    }

    #[test]
    fn test_next_at_block_end() {
        let cfg = two_block_cfg();
        let loc = Location::new(BlockId(0), 1);
        assert_eq!(loc.next_locs(&cfg), vec![Location::block_start(BlockId(1))]);
        assert_eq!(loc.next_loc(&cfg), Location::block_start(BlockId(1)));
    }

    #[test]
    fn test_empty_block_is_past_end() {
        let cfg = two_block_cfg();
        let loc = Location::block_start(BlockId(1));
        assert!(loc.stmt(&cfg).is_none());
        assert!(loc.next_locs(&cfg).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(BlockId(2), 5).to_string(), "B2:5");
    }
}
