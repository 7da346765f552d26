//! Live pallet contents of each stack. The grid ([`wh_grid::Grid`]) owns
//! stacks' fixed *locations*; this module owns their *contents*, which
//! change every time a pallet is placed or removed.

use wh_core::{PalletId, StackId};

/// Each stack is an ordered sequence of pallets, bottom first. The last
/// element is the top of the stack — the only pallet a `Grabbing` agent may
/// remove.
#[derive(Default)]
pub struct StackYard {
    contents: Vec<Vec<PalletId>>,
}

impl StackYard {
    pub fn new(num_stacks: usize) -> Self {
        Self {
            contents: vec![Vec::new(); num_stacks],
        }
    }

    pub fn num_stacks(&self) -> usize {
        self.contents.len()
    }

    pub fn depth(&self, stack: StackId) -> usize {
        self.contents[stack.index()].len()
    }

    pub fn is_empty_stack(&self, stack: StackId) -> bool {
        self.contents[stack.index()].is_empty()
    }

    pub fn top(&self, stack: StackId) -> Option<PalletId> {
        self.contents[stack.index()].last().copied()
    }

    /// `true` iff `pallet` is currently the top of `stack` — the precondition
    /// for `Grabbing`.
    pub fn is_top(&self, stack: StackId, pallet: PalletId) -> bool {
        self.top(stack) == Some(pallet)
    }

    pub fn push(&mut self, stack: StackId, pallet: PalletId) {
        self.contents[stack.index()].push(pallet);
    }

    /// Remove and return the top pallet of `stack`, if any.
    pub fn pop(&mut self, stack: StackId) -> Option<PalletId> {
        self.contents[stack.index()].pop()
    }

    /// Locate `pallet`, returning its stack and depth from the top (`0` =
    /// the top pallet itself). Linear in the total pallet count; fine at
    /// this scale (property S6's own bound is `O(N_agents)` not pallets, and
    /// warehouses here top out in the low thousands of pallets).
    pub fn locate(&self, pallet: PalletId) -> Option<(StackId, usize)> {
        for (i, stack) in self.contents.iter().enumerate() {
            if let Some(pos_from_bottom) = stack.iter().rposition(|&p| p == pallet) {
                let depth_from_top = stack.len() - 1 - pos_from_bottom;
                return Some((StackId(i as u32), depth_from_top));
            }
        }
        None
    }

    /// The pallets stacked above `pallet` in its own stack, ordered
    /// top-first — the order they must be freed in.
    pub fn pallets_above(&self, stack: StackId, depth_from_top: usize) -> Vec<PalletId> {
        let contents = &self.contents[stack.index()];
        let len = contents.len();
        if depth_from_top == 0 || depth_from_top >= len {
            return Vec::new();
        }
        contents[len - depth_from_top..].iter().rev().copied().collect()
    }

    /// Every pallet currently resting on a stack, paired with its stack and
    /// depth from the top. Used by the order generator to pick a pallet
    /// uniformly at random from the union of non-empty stacks.
    pub fn all_pallets_with_depth(&self) -> Vec<(PalletId, StackId, usize)> {
        let mut out = Vec::new();
        for (i, stack) in self.contents.iter().enumerate() {
            let len = stack.len();
            for (pos_from_bottom, &pallet) in stack.iter().enumerate() {
                out.push((pallet, StackId(i as u32), len - 1 - pos_from_bottom));
            }
        }
        out
    }

    /// The stack with the fewest pallets, excluding `exclude`. Ties broken
    /// by ascending `StackId` for reproducibility.
    pub fn least_loaded_excluding(&self, exclude: StackId) -> StackId {
        self.contents
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != exclude.index())
            .min_by_key(|&(i, stack)| (stack.len(), i))
            .map(|(i, _)| StackId(i as u32))
            .unwrap_or(exclude)
    }
}
