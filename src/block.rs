//! The block chain backing a [`Deque`](crate::Deque).
//!
//! Blocks live in an arena and refer to their neighbours by [`BlockId`]
//! instead of by pointer, so the left/right links never form an ownership
//! cycle. Vacated arena entries are recycled through a free list.

use core::mem::MaybeUninit;

use tracing::trace;

/// Number of element slots in every block.
pub const BLOCK_LEN: usize = 64;

/// Slot index the cursors are recentered around when a deque runs empty.
pub const BLOCK_CENTER: usize = (BLOCK_LEN - 1) / 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BlockId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

pub(crate) struct Block<T> {
    left: Option<BlockId>,
    right: Option<BlockId>,
    /// Only the range the owning deque's cursors mark as occupied is initialized.
    pub(crate) slots: Box<[MaybeUninit<T>; BLOCK_LEN]>,
}

impl<T> Block<T> {
    fn new(left: Option<BlockId>, right: Option<BlockId>) -> Self {
        // SAFETY: an array of `MaybeUninit` is valid without any initialization.
        let slots = unsafe { Box::<[MaybeUninit<T>; BLOCK_LEN]>::new_uninit().assume_init() };
        Self { left, right, slots }
    }
}

/// Arena of linked blocks. It never reads or drops slot contents; that is
/// entirely the owning deque's job.
pub(crate) struct BlockChain<T> {
    blocks: Vec<Option<Block<T>>>,
    vacant: Vec<BlockId>,
    live: usize,
}

impl<T> BlockChain<T> {
    /// Creates a chain holding a single unlinked block.
    pub(crate) fn new() -> (Self, BlockId) {
        let mut chain = Self { blocks: Vec::new(), vacant: Vec::new(), live: 0 };
        let id = chain.insert(Block::new(None, None));
        (chain, id)
    }

    /// Number of blocks currently in the chain.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub(crate) fn block(&self, id: BlockId) -> &Block<T> {
        match self.blocks.get(id.0) {
            Some(Some(block)) => block,
            _ => unreachable!("block {} is not part of the chain", id.0),
        }
    }

    #[inline]
    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block<T> {
        match self.blocks.get_mut(id.0) {
            Some(Some(block)) => block,
            _ => unreachable!("block {} is not part of the chain", id.0),
        }
    }

    /// Returns the block linked on `side` of `id`. Callers only ask for
    /// neighbours that the deque's cursor bookkeeping guarantees exist.
    #[inline]
    pub(crate) fn neighbor(&self, id: BlockId, side: Side) -> BlockId {
        let block = self.block(id);
        let next = match side {
            Side::Left => block.left,
            Side::Right => block.right,
        };
        match next {
            Some(next) => next,
            None => unreachable!("block {} has no {:?} neighbour", id.0, side),
        }
    }

    /// Same as [`neighbor`](Self::neighbor), but tolerates the chain edge.
    #[inline]
    pub(crate) fn try_neighbor(&self, id: BlockId, side: Side) -> Option<BlockId> {
        let block = self.block(id);
        match side {
            Side::Left => block.left,
            Side::Right => block.right,
        }
    }

    /// Allocates a fresh block and links it on `side` of `edge`, which must
    /// be the block currently at that end of the chain.
    #[cold]
    pub(crate) fn link(&mut self, edge: BlockId, side: Side) -> BlockId {
        debug_assert!(self.try_neighbor(edge, side).is_none());
        let block = match side {
            Side::Left => Block::new(None, Some(edge)),
            Side::Right => Block::new(Some(edge), None),
        };
        let id = self.insert(block);
        let edge_block = self.block_mut(edge);
        match side {
            Side::Left => edge_block.left = Some(id),
            Side::Right => edge_block.right = Some(id),
        }
        trace!(?side, block = id.0, blocks = self.live, "linked block");
        id
    }

    /// Detaches the block at the `side` end of the chain and returns its
    /// neighbour, which becomes the new end. The detached block must hold no
    /// initialized slots and must not be the last block.
    #[cold]
    pub(crate) fn unlink(&mut self, edge: BlockId, side: Side) -> BlockId {
        let inward = match side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        let next = self.neighbor(edge, inward);
        let next_block = self.block_mut(next);
        match side {
            Side::Left => next_block.left = None,
            Side::Right => next_block.right = None,
        }
        self.blocks[edge.0] = None;
        self.vacant.push(edge);
        self.live -= 1;
        trace!(?side, block = edge.0, blocks = self.live, "unlinked block");
        next
    }

    fn insert(&mut self, block: Block<T>) -> BlockId {
        self.live += 1;
        match self.vacant.pop() {
            Some(id) => {
                self.blocks[id.0] = Some(block);
                id
            }
            None => {
                self.blocks.push(Some(block));
                BlockId(self.blocks.len() - 1)
            }
        }
    }
}
