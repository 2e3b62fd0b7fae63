//! Auction Index - a price-ordered red-black tree with order statistics.
//!
//! Items are keyed by `(price, item_id)`, so equal prices are still totally
//! ordered. Nodes live in an [`Arena`] with explicit parent/left/right
//! indices; rotations only reassign indices.
//!
//! Every node caches the size of its subtree, which gives O(log n)
//! [`AuctionIndex::rank`] and [`AuctionIndex::select`].
//!
//! ## Red-black rules
//!
//! 1. Every node is red or black
//! 2. The root is black
//! 3. A red node never has a red child
//! 4. Every path from a node to an absent leaf crosses the same number of
//!    black nodes
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert | O(log n) |
//! | Delete by id | O(log n) |
//! | Rank / select | O(log n) |
//! | Price lookup | O(1) |

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::{Arena, ArenaIndex, NULL_INDEX};
use crate::error::InvariantViolation;

pub type ItemId = i64;
pub type Price = i64;

/// An item listed in the auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuctionItem {
    pub item_id: ItemId,
    pub price: Price,
}

impl AuctionItem {
    /// Sort key: price first, id breaks ties.
    #[inline]
    pub fn key(&self) -> (Price, ItemId) {
        (self.price, self.item_id)
    }
}

/// Node color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Black = 1,
}

struct TreeNode {
    item: AuctionItem,
    color: Color,
    parent: ArenaIndex,
    left: ArenaIndex,
    right: ArenaIndex,
    /// Number of nodes in the subtree rooted here
    size: u32,
}

/// Price-ordered red-black tree keyed by item id for removal.
pub struct AuctionIndex {
    nodes: Arena<TreeNode>,
    root: ArenaIndex,
    /// item_id -> node, the tree itself is ordered by price
    index: FxHashMap<ItemId, ArenaIndex>,
}

impl AuctionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: NULL_INDEX,
            index: FxHashMap::default(),
        }
    }

    /// Create an empty index with pre-allocated room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: NULL_INDEX,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// List an item at `price`.
    ///
    /// If the id is already listed its old entry is removed first, so the
    /// item ends up at the new price (replace semantics).
    pub fn insert_item(&mut self, item_id: ItemId, price: Price) {
        if self.index.contains_key(&item_id) {
            self.delete_item(item_id);
        }

        let item = AuctionItem { item_id, price };
        let key = item.key();

        // Walk down, growing the size of every subtree we pass through
        let mut parent = NULL_INDEX;
        let mut cursor = self.root;
        while cursor != NULL_INDEX {
            parent = cursor;
            let node = self.nodes.get_mut(cursor);
            node.size += 1;
            cursor = if key < node.item.key() { node.left } else { node.right };
        }

        let node = self.nodes.alloc(TreeNode {
            item,
            color: Color::Red,
            parent,
            left: NULL_INDEX,
            right: NULL_INDEX,
            size: 1,
        });

        if parent == NULL_INDEX {
            self.root = node;
        } else if key < self.nodes.get(parent).item.key() {
            self.nodes.get_mut(parent).left = node;
        } else {
            self.nodes.get_mut(parent).right = node;
        }

        self.index.insert(item_id, node);
        self.insert_fixup(node);
    }

    /// Remove an item by id.
    ///
    /// Returns the removed item, or `None` (and does nothing) if the id is
    /// not listed.
    pub fn delete_item(&mut self, item_id: ItemId) -> Option<AuctionItem> {
        let z = self.index.remove(&item_id)?;

        // `y` is the node that physically leaves its position: `z` itself,
        // or `z`'s in-order successor when `z` has two children.
        let y = if self.left(z) == NULL_INDEX || self.right(z) == NULL_INDEX {
            z
        } else {
            self.minimum(self.right(z))
        };

        // Every ancestor of y's old position loses one descendant
        let mut cursor = self.parent(y);
        while cursor != NULL_INDEX {
            self.nodes.get_mut(cursor).size -= 1;
            cursor = self.parent(cursor);
        }

        let removed_color = self.color(y);
        let x;
        let x_parent;

        if self.left(z) == NULL_INDEX {
            x = self.right(z);
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else if self.right(z) == NULL_INDEX {
            x = self.left(z);
            x_parent = self.parent(z);
            self.transplant(z, x);
        } else {
            x = self.right(y);
            if self.parent(y) == z {
                x_parent = y;
            } else {
                x_parent = self.parent(y);
                self.transplant(y, x);
                let z_right = self.right(z);
                self.nodes.get_mut(y).right = z_right;
                self.nodes.get_mut(z_right).parent = y;
            }

            self.transplant(z, y);
            let (z_left, z_color, z_size) = {
                let node = self.nodes.get(z);
                (node.left, node.color, node.size)
            };
            let node = self.nodes.get_mut(y);
            node.left = z_left;
            node.color = z_color;
            node.size = z_size;
            self.nodes.get_mut(z_left).parent = y;
        }

        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        Some(self.nodes.free(z).item)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NULL_INDEX;
        self.index.clear();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of listed items.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.index.contains_key(&item_id)
    }

    /// Current price of an item.
    #[inline]
    pub fn price(&self, item_id: ItemId) -> Option<Price> {
        self.index
            .get(&item_id)
            .map(|&node| self.nodes.get(node).item.price)
    }

    /// Cheapest item (lowest id among equal prices).
    pub fn min(&self) -> Option<AuctionItem> {
        (self.root != NULL_INDEX).then(|| self.nodes.get(self.minimum(self.root)).item)
    }

    /// Most expensive item (highest id among equal prices).
    pub fn max(&self) -> Option<AuctionItem> {
        (self.root != NULL_INDEX).then(|| self.nodes.get(self.maximum(self.root)).item)
    }

    /// Zero-based position of an item in `(price, id)` order.
    pub fn rank(&self, item_id: ItemId) -> Option<usize> {
        let node = *self.index.get(&item_id)?;

        let mut rank = self.size(self.left(node));
        let mut cursor = node;
        while cursor != self.root {
            let parent = self.parent(cursor);
            if cursor == self.right(parent) {
                rank += self.size(self.left(parent)) + 1;
            }
            cursor = parent;
        }

        Some(rank)
    }

    /// The item at zero-based position `k` in `(price, id)` order.
    pub fn select(&self, k: usize) -> Option<AuctionItem> {
        if k >= self.len() {
            return None;
        }

        let mut k = k;
        let mut cursor = self.root;
        loop {
            let left_size = self.size(self.left(cursor));
            if k < left_size {
                cursor = self.left(cursor);
            } else if k == left_size {
                return Some(self.nodes.get(cursor).item);
            } else {
                k -= left_size + 1;
                cursor = self.right(cursor);
            }
        }
    }

    /// Iterate over items in `(price, id)` order.
    pub fn iter(&self) -> Iter<'_> {
        let cursor = if self.root == NULL_INDEX {
            NULL_INDEX
        } else {
            self.minimum(self.root)
        };
        Iter {
            tree: self,
            cursor,
            remaining: self.len(),
        }
    }

    /// Item ids in `(price, id)` order.
    pub fn in_order_ids(&self) -> Vec<ItemId> {
        self.iter().map(|item| item.item_id).collect()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack = Vec::new();
        if self.root != NULL_INDEX {
            stack.push((self.root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in [self.left(node), self.right(node)] {
                if child != NULL_INDEX {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Hash of every `(item, color)` in order.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.len().hash(&mut hasher);
        let mut cursor = if self.root == NULL_INDEX {
            NULL_INDEX
        } else {
            self.minimum(self.root)
        };
        while cursor != NULL_INDEX {
            let node = self.nodes.get(cursor);
            node.item.hash(&mut hasher);
            node.color.hash(&mut hasher);
            cursor = self.successor(cursor);
        }
        hasher.finish()
    }

    /// Check ordering, coloring, links, cached sizes and the id index.
    ///
    /// Returns the black height of the tree (absent leaves count as one).
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        if self.root != NULL_INDEX {
            let root = self.nodes.get(self.root);
            if root.color == Color::Red {
                return Err(InvariantViolation::RedRoot { id: root.item.item_id });
            }
            if root.parent != NULL_INDEX {
                return Err(InvariantViolation::ParentLink { id: root.item.item_id });
            }
        }

        let black_height = self.check_subtree(self.root)?;

        let linked = self.size(self.root);
        if linked != self.index.len() {
            return Err(InvariantViolation::IndexMismatch {
                indexed: self.index.len(),
                linked,
            });
        }
        for (&item_id, &node) in &self.index {
            if self.nodes.get(node).item.item_id != item_id {
                return Err(InvariantViolation::IndexMismatch {
                    indexed: self.index.len(),
                    linked,
                });
            }
        }

        let items: Vec<AuctionItem> = self.iter().collect();
        if let Some(pair) = items.windows(2).find(|pair| pair[0].key() >= pair[1].key()) {
            return Err(InvariantViolation::Misordered {
                first: pair[0].item_id,
                second: pair[1].item_id,
            });
        }

        Ok(black_height)
    }

    // ========================================================================
    // Node Access
    // ========================================================================

    #[inline]
    fn parent(&self, node: ArenaIndex) -> ArenaIndex {
        self.nodes.get(node).parent
    }

    #[inline]
    fn left(&self, node: ArenaIndex) -> ArenaIndex {
        self.nodes.get(node).left
    }

    #[inline]
    fn right(&self, node: ArenaIndex) -> ArenaIndex {
        self.nodes.get(node).right
    }

    /// Absent leaves are black.
    #[inline]
    fn color(&self, node: ArenaIndex) -> Color {
        if node == NULL_INDEX {
            Color::Black
        } else {
            self.nodes.get(node).color
        }
    }

    #[inline]
    fn set_color(&mut self, node: ArenaIndex, color: Color) {
        if node != NULL_INDEX {
            self.nodes.get_mut(node).color = color;
        }
    }

    #[inline]
    fn size(&self, node: ArenaIndex) -> usize {
        if node == NULL_INDEX {
            0
        } else {
            self.nodes.get(node).size as usize
        }
    }

    fn refresh_size(&mut self, node: ArenaIndex) {
        let size = 1 + self.size(self.left(node)) + self.size(self.right(node));
        self.nodes.get_mut(node).size = size as u32;
    }

    fn minimum(&self, mut node: ArenaIndex) -> ArenaIndex {
        while self.left(node) != NULL_INDEX {
            node = self.left(node);
        }
        node
    }

    fn maximum(&self, mut node: ArenaIndex) -> ArenaIndex {
        while self.right(node) != NULL_INDEX {
            node = self.right(node);
        }
        node
    }

    fn successor(&self, node: ArenaIndex) -> ArenaIndex {
        if self.right(node) != NULL_INDEX {
            return self.minimum(self.right(node));
        }
        let mut child = node;
        let mut parent = self.parent(node);
        while parent != NULL_INDEX && child == self.right(parent) {
            child = parent;
            parent = self.parent(parent);
        }
        parent
    }

    // ========================================================================
    // Restructuring
    // ========================================================================

    /// Point `old`'s parent (or the root) at `new`.
    fn replace_child(&mut self, parent: ArenaIndex, old: ArenaIndex, new: ArenaIndex) {
        if parent == NULL_INDEX {
            self.root = new;
        } else if self.left(parent) == old {
            self.nodes.get_mut(parent).left = new;
        } else {
            self.nodes.get_mut(parent).right = new;
        }
    }

    /// Put subtree `v` where subtree `u` was. `v` may be absent.
    fn transplant(&mut self, u: ArenaIndex, v: ArenaIndex) {
        let parent = self.parent(u);
        self.replace_child(parent, u, v);
        if v != NULL_INDEX {
            self.nodes.get_mut(v).parent = parent;
        }
    }

    /// ```text
    ///   x              y
    ///  / \            / \
    /// a   y    =>    x   c
    ///    / \        / \
    ///   b   c      a   b
    /// ```
    fn rotate_left(&mut self, x: ArenaIndex) {
        let y = self.right(x);
        let b = self.left(y);

        self.nodes.get_mut(x).right = b;
        if b != NULL_INDEX {
            self.nodes.get_mut(b).parent = x;
        }

        let parent = self.parent(x);
        self.nodes.get_mut(y).parent = parent;
        self.replace_child(parent, x, y);

        self.nodes.get_mut(y).left = x;
        self.nodes.get_mut(x).parent = y;

        self.refresh_size(x);
        self.refresh_size(y);
    }

    /// ```text
    ///     y          x
    ///    / \        / \
    ///   x   c  =>  a   y
    ///  / \            / \
    /// a   b          b   c
    /// ```
    fn rotate_right(&mut self, y: ArenaIndex) {
        let x = self.left(y);
        let b = self.right(x);

        self.nodes.get_mut(y).left = b;
        if b != NULL_INDEX {
            self.nodes.get_mut(b).parent = y;
        }

        let parent = self.parent(y);
        self.nodes.get_mut(x).parent = parent;
        self.replace_child(parent, y, x);

        self.nodes.get_mut(x).right = y;
        self.nodes.get_mut(y).parent = x;

        self.refresh_size(y);
        self.refresh_size(x);
    }

    /// Restore the red-black rules after inserting the red node `z`.
    fn insert_fixup(&mut self, mut z: ArenaIndex) {
        // An absent parent reads as black, so this stops at the root
        while self.color(self.parent(z)) == Color::Red {
            // A red parent is never the root, so the grandparent exists
            let parent = self.parent(z);
            let grandparent = self.parent(parent);

            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.right(parent) {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.parent(z);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.left(grandparent);
                if self.color(uncle) == Color::Red {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    z = grandparent;
                } else {
                    if z == self.left(parent) {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.parent(z);
                    let grandparent = self.parent(parent);
                    self.set_color(parent, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    self.rotate_left(grandparent);
                }
            }
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Resolve the extra black carried by `x` after a black node was
    /// removed. `x` may be absent, so its parent is tracked separately.
    fn delete_fixup(&mut self, mut x: ArenaIndex, mut parent: ArenaIndex) {
        while x != self.root && self.color(x) == Color::Black {
            if x == self.left(parent) {
                let mut sibling = self.right(parent);

                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sibling = self.right(parent);
                }

                if self.color(self.left(sibling)) == Color::Black
                    && self.color(self.right(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                    parent = self.parent(x);
                } else {
                    if self.color(self.right(sibling)) == Color::Black {
                        let nephew = self.left(sibling);
                        self.set_color(nephew, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(parent);
                    }
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let nephew = self.right(sibling);
                    self.set_color(nephew, Color::Black);
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.left(parent);

                if self.color(sibling) == Color::Red {
                    self.set_color(sibling, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sibling = self.left(parent);
                }

                if self.color(self.right(sibling)) == Color::Black
                    && self.color(self.left(sibling)) == Color::Black
                {
                    self.set_color(sibling, Color::Red);
                    x = parent;
                    parent = self.parent(x);
                } else {
                    if self.color(self.left(sibling)) == Color::Black {
                        let nephew = self.right(sibling);
                        self.set_color(nephew, Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(parent);
                    }
                    let parent_color = self.color(parent);
                    self.set_color(sibling, parent_color);
                    self.set_color(parent, Color::Black);
                    let nephew = self.left(sibling);
                    self.set_color(nephew, Color::Black);
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }

        self.set_color(x, Color::Black);
    }

    /// Recursive structural check; returns the subtree's black height.
    fn check_subtree(&self, node: ArenaIndex) -> Result<usize, InvariantViolation> {
        if node == NULL_INDEX {
            return Ok(1);
        }

        let TreeNode { item, color, left, right, size, .. } = *self.nodes.get(node);
        let id = item.item_id;

        for child in [left, right] {
            if child != NULL_INDEX && self.parent(child) != node {
                return Err(InvariantViolation::ParentLink {
                    id: self.nodes.get(child).item.item_id,
                });
            }
        }

        if color == Color::Red && (self.color(left) == Color::Red || self.color(right) == Color::Red) {
            return Err(InvariantViolation::RedRed { id });
        }

        let actual = 1 + self.size(left) + self.size(right);
        if size as usize != actual {
            return Err(InvariantViolation::SubtreeSize {
                id,
                cached: size as usize,
                actual,
            });
        }

        let left_height = self.check_subtree(left)?;
        let right_height = self.check_subtree(right)?;
        if left_height != right_height {
            return Err(InvariantViolation::BlackHeight {
                id,
                left: left_height,
                right: right_height,
            });
        }

        Ok(left_height + usize::from(color == Color::Black))
    }
}

impl Default for AuctionIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// In-order iterator over auction items.
pub struct Iter<'a> {
    tree: &'a AuctionIndex,
    cursor: ArenaIndex,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = AuctionItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NULL_INDEX {
            return None;
        }
        let item = self.tree.nodes.get(self.cursor).item;
        self.cursor = self.tree.successor(self.cursor);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a AuctionIndex {
    type Item = AuctionItem;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
