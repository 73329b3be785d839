use std::{cell::Cell, cmp::Ordering, mem, rc::Rc};

use rand::Rng;

use crate::depth::Depth;
use crate::error::LlrbError;

/// Total order over K supplied by the application at construction time.
type Cmp<K> = Rc<dyn Fn(&K, &K) -> Ordering>;

/// Llrb manages a single instance of an in-memory ordered map using a
/// [left-leaning-red-black][llrb] tree.
///
/// Nodes live in an arena of generation-tagged slots, with child links
/// owning their slot and every node carrying a back-reference to its
/// parent. Parent links make successor/predecessor stepping O(1)
/// amortized, which is what lets a [`Cursor`] keep walking the tree
/// while the application deletes the entry the cursor is parked on.
///
/// [llrb]: https://en.wikipedia.org/wiki/Left-leaning_red-black_tree
///
/// ```
/// use llrb_map::Llrb;
///
/// let mut index: Llrb<i64, &str> = Llrb::new_ord();
/// index.set(20, "b");
/// index.set(10, "a");
///
/// assert_eq!(index.get(&10), Some("a"));
/// assert_eq!(index.min(), Some((10, "a")));
///
/// let mut scan = index.all();
/// assert_eq!(scan.next(&index), Some((10, "a")));
/// index.remove(&10); // cursor recovers from this
/// assert_eq!(scan.next(&index), Some((20, "b")));
/// ```
#[derive(Clone)]
pub struct Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    cmp: Cmp<K>,
    arena: Arena<K, V>,
    root: Option<NodeId>,
    min_hint: Cell<Option<NodeId>>,
    max_hint: Cell<Option<NodeId>>,
    n_count: usize, // number of entries in the tree.
}

/// Different ways to construct a new Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Create an empty instance of Llrb ordered by `cmp`. The comparator
    /// must implement a strict total order over K; behaviour under an
    /// inconsistent comparator is undefined.
    pub fn new<F>(cmp: F) -> Llrb<K, V>
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        Llrb {
            cmp: Rc::new(cmp),
            arena: Arena::new(),
            root: None,
            min_hint: Cell::new(None),
            max_hint: Cell::new(None),
            n_count: 0,
        }
    }

    /// Create a new instance of Llrb and load it with entries from
    /// `iter`. Duplicate keys overwrite in iteration order.
    pub fn load_from<F, I>(cmp: F, iter: I) -> Llrb<K, V>
    where
        F: Fn(&K, &K) -> Ordering + 'static,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut llrb = Llrb::new(cmp);
        llrb.extend(iter);
        llrb
    }
}

impl<K, V> Llrb<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    /// Create an empty instance of Llrb using K's natural ordering.
    pub fn new_ord() -> Llrb<K, V> {
        Llrb::new(|a: &K, b: &K| a.cmp(b))
    }
}

/// Maintenance API.
impl<K, V> Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return quickly with basic statistics, only entries() method is
    /// valid with this statistics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K, V>>())
    }
}

/// Write operations on Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Create a new {key, value} entry in the index. If key is already
    /// present return error.
    pub fn create(&mut self, key: K, value: V) -> Result<(), LlrbError<K>> {
        if self.find_location(&key).1.is_some() {
            return Err(LlrbError::OverwriteKey);
        }
        self.set(key, value);
        Ok(())
    }

    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(m) = self.min_hint.get() {
            if self.compare(&key, &self.node(m).key) == Ordering::Less {
                self.min_hint.set(None);
            }
        }
        if let Some(m) = self.max_hint.get() {
            if self.compare(&key, &self.node(m).key) == Ordering::Greater {
                self.max_hint.set(None);
            }
        }

        if self.root.is_none() {
            let id = self.arena.alloc(Node::new(key, value));
            self.root = Some(id);
            self.fixup(Some(id));
            self.n_count += 1;
            return None;
        }

        let (pos, found) = self.find_location(&key);
        match found {
            Some(id) => {
                let old_value = mem::replace(&mut self.node_mut(id).value, value);
                self.fixup(Some(id));
                Some(old_value)
            }
            None => {
                let id = self.arena.alloc(Node::new(key, value));
                self.write(pos, Some(id));
                self.fixup(Some(id));
                self.n_count += 1;
                None
            }
        }
    }

    /// Delete key from this instance and return its value. If key is
    /// not present, then delete is effectively a no-op.
    ///
    /// The removed node's arena slot is retired, so any [`Cursor`]
    /// parked on it re-locates itself from the retained key on its
    /// next step.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.remove_node(key)?;
        if self.min_hint.get() == Some(removed) {
            self.min_hint.set(None);
        }
        if self.max_hint.get() == Some(removed) {
            self.max_hint.set(None);
        }
        let node = self.arena.retire(removed);
        self.n_count -= 1;
        Some(node.value)
    }

    /// Validate LLRB tree with following rules:
    ///
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * No red link may hang as a right child.
    /// * Number of blacks should be same under left child and right child.
    /// * Keys are in sort order and parent back-references are consistent.
    ///
    /// Additionally return full statistics on the tree. Refer to
    /// [`Stats`] for more information.
    pub fn validate(&self) -> Result<Stats, LlrbError<K>> {
        if let Some(root) = self.root {
            if self.node(root).parent.is_some() {
                return Err(LlrbError::BrokenParentLink);
            }
        }
        // a red root shows up as a "consecutive red" against itself.
        let fromred = self.is_red(self.root);
        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<K, V>>());
        stats.depths = Some(Depth::new());
        let blacks = self.validate_tree(self.root, fromred, 0, 0, &mut stats)?;
        stats.blacks = Some(blacks);
        Ok(stats)
    }
}

impl<K, V> Extend<(K, V)> for Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Read operations on Llrb instance.
impl<K, V> Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Get the value for key.
    pub fn get(&self, key: &K) -> Option<V> {
        let (_, found) = self.find_location(key);
        Some(self.node(found?).value.clone())
    }

    /// Return the entry with the least key. Served from a cached
    /// reference when one is available, otherwise one leftmost walk
    /// re-populates the cache.
    pub fn min(&self) -> Option<(K, V)> {
        let id = match self.min_hint.get() {
            Some(id) => id,
            None => {
                let id = self.leftmost(self.root?);
                self.min_hint.set(Some(id));
                id
            }
        };
        let node = self.node(id);
        Some((node.key.clone(), node.value.clone()))
    }

    /// Return the entry with the greatest key. Cached like [`Llrb::min`].
    pub fn max(&self) -> Option<(K, V)> {
        let id = match self.max_hint.get() {
            Some(id) => id,
            None => {
                let id = self.rightmost(self.root?);
                self.max_hint.set(Some(id));
                id
            }
        };
        let node = self.node(id);
        Some((node.key.clone(), node.value.clone()))
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<(K, V)> {
        let mut id = self.root?;
        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let next = match rng.gen::<u8>() % 2 {
                0 => self.node(id).left,
                _ => self.node(id).right,
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    id = next;
                }
                _ => {
                    let node = self.node(id);
                    break Some((node.key.clone(), node.value.clone()));
                }
            }
        }
    }

    /// Return an ascending cursor over the whole tree.
    pub fn all(&self) -> Cursor<K> {
        Cursor::new(Direction::Forward, Start::Extreme, None)
    }

    /// Return a descending cursor over the whole tree.
    pub fn backward(&self) -> Cursor<K> {
        Cursor::new(Direction::Reverse, Start::Extreme, None)
    }

    /// Return a cursor over keys between `lo` and `hi`, both inclusive.
    /// When `lo` orders at or before `hi` the cursor ascends from the
    /// first key >= `lo`; otherwise it descends from the last key <=
    /// `lo` toward `hi`.
    pub fn scan(&self, lo: K, hi: K) -> Cursor<K> {
        match self.compare(&lo, &hi) {
            Ordering::Less | Ordering::Equal => {
                Cursor::new(Direction::Forward, Start::From(lo), Some(hi))
            }
            Ordering::Greater => Cursor::new(Direction::Reverse, Start::From(lo), Some(hi)),
        }
    }

    /// Return an iterator over all entries in this instance, in
    /// ascending key order. For iteration interleaved with mutation
    /// use [`Llrb::all`] instead.
    pub fn iter(&self) -> Iter<K, V> {
        Iter {
            tree: self,
            cursor: self.all(),
        }
    }
}

// Structural plumbing. All link updates go through set_left/set_right/
// write so that parent back-references can never drift from the owning
// child link.
impl<K, V> Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (*self.cmp)(a, b)
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        match self.arena.get(id) {
            Some(node) => node,
            None => panic!("corrupt llrb: stale node reference"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.arena.get_mut(id) {
            Some(node) => node,
            None => panic!("corrupt llrb: stale node reference"),
        }
    }

    #[inline]
    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.map_or(false, |id| self.node(id).red)
    }

    fn set_left(&mut self, id: NodeId, child: Option<NodeId>) {
        self.node_mut(id).left = child;
        if let Some(child) = child {
            self.node_mut(child).parent = Some(id);
        }
    }

    fn set_right(&mut self, id: NodeId, child: Option<NodeId>) {
        self.node_mut(id).right = child;
        if let Some(child) = child {
            self.node_mut(child).parent = Some(id);
        }
    }

    fn read(&self, pos: Pos) -> Option<NodeId> {
        match pos {
            Pos::Root => self.root,
            Pos::Left(p) => self.node(p).left,
            Pos::Right(p) => self.node(p).right,
        }
    }

    fn write(&mut self, pos: Pos, x: Option<NodeId>) {
        match pos {
            Pos::Root => {
                self.root = x;
                if let Some(x) = x {
                    self.node_mut(x).parent = None;
                }
            }
            Pos::Left(p) => self.set_left(p, x),
            Pos::Right(p) => self.set_right(p, x),
        }
    }

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => {
                if self.root != Some(old) {
                    panic!("corrupt llrb: root link mismatch");
                }
                self.write(Pos::Root, new);
            }
            Some(p) if self.node(p).left == Some(old) => self.set_left(p, new),
            Some(p) if self.node(p).right == Some(old) => self.set_right(p, new),
            Some(_) => panic!("corrupt llrb: parent does not own child"),
        }
    }

    /// Binary search for `key`. Returns the link where the key lives
    /// (or would live) together with its occupant, if any. The link
    /// identity is what the cursor recovery path branches on.
    fn find_location(&self, key: &K) -> (Pos, Option<NodeId>) {
        let mut pos = Pos::Root;
        let mut walk = self.root;
        while let Some(id) = walk {
            match self.compare(key, &self.node(id).key) {
                Ordering::Equal => return (pos, Some(id)),
                Ordering::Less => {
                    pos = Pos::Left(id);
                    walk = self.node(id).left;
                }
                Ordering::Greater => {
                    pos = Pos::Right(id);
                    walk = self.node(id).right;
                }
            }
        }
        (pos, None)
    }

    //              node                       x
    //              /  \                      / \
    //             /    (r)                 (r)  \
    //            /       \                 /     \
    //          left       x             node      xr
    //                    / \            /  \
    //                  xl   xr       left   xl
    //
    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let parent = self.node(node).parent;
        let x = match self.node(node).right {
            Some(x) => x,
            None => panic!("corrupt llrb: rotate_left without right child"),
        };
        let xl = self.node(x).left;

        self.set_left(x, Some(node));
        self.set_right(node, xl);
        self.replace_child(parent, node, Some(x));

        let red = self.node(node).red;
        self.node_mut(x).red = red;
        self.node_mut(node).red = true;
        x
    }

    //              node                       x
    //              /  \                      / \
    //            (r)   \                   (r)  \
    //           /       \                 /      \
    //          x       right             xl      node
    //         / \                                / \
    //       xl   xr                             xr  right
    //
    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let parent = self.node(node).parent;
        let x = match self.node(node).left {
            Some(x) => x,
            None => panic!("corrupt llrb: rotate_right without left child"),
        };
        let xr = self.node(x).right;

        self.set_right(x, Some(node));
        self.set_left(node, xr);
        self.replace_child(parent, node, Some(x));

        let red = self.node(node).red;
        self.node_mut(x).red = red;
        self.node_mut(node).red = true;
        x
    }

    /// Toggle the color of node and both its children.
    fn flip_color(&mut self, id: NodeId) {
        let (left, right) = {
            let node = self.node_mut(id);
            node.red = !node.red;
            (node.left, node.right)
        };
        if let Some(left) = left {
            let node = self.node_mut(left);
            node.red = !node.red;
        }
        if let Some(right) = right {
            let node = self.node_mut(right);
            node.red = !node.red;
        }
    }

    /// Restore the LLRB invariants walking from `from` up to the root:
    /// rotate left on a right-leaning red, rotate right on two reds in
    /// a row down the left spine, flip on a node with two red children.
    /// The root is forced black at the end.
    fn fixup(&mut self, from: Option<NodeId>) {
        let mut walk = from;
        while let Some(mut id) = walk {
            if self.is_red(self.node(id).right) && !self.is_red(self.node(id).left) {
                id = self.rotate_left(id);
            }
            let left = self.node(id).left;
            if self.is_red(left) && self.is_red(left.and_then(|l| self.node(l).left)) {
                id = self.rotate_right(id);
            }
            if self.is_red(self.node(id).left) && self.is_red(self.node(id).right) {
                self.flip_color(id);
            }
            walk = self.node(id).parent;
        }
        if let Some(root) = self.root {
            self.node_mut(root).red = false;
        }
    }

    fn move_red_left(&mut self, node: NodeId) -> NodeId {
        self.flip_color(node);
        if let Some(right) = self.node(node).right {
            if self.is_red(self.node(right).left) {
                self.rotate_right(right);
                let node = self.rotate_left(node);
                self.flip_color(node);
                return node;
            }
        }
        node
    }

    fn move_red_right(&mut self, node: NodeId) -> NodeId {
        self.flip_color(node);
        let ll = self.node(node).left.and_then(|l| self.node(l).left);
        if self.is_red(ll) {
            let node = self.rotate_right(node);
            self.flip_color(node);
            return node;
        }
        node
    }

    /// Detach the minimum of the subtree hanging off `zpos`, applying
    /// move_red_left on the way down. Returns the detached node and its
    /// former parent, which is where the caller resumes fixup.
    fn delete_min(&mut self, mut zpos: Pos) -> (NodeId, Option<NodeId>) {
        let mut z = match self.read(zpos) {
            Some(z) => z,
            None => panic!("corrupt llrb: delete_min on empty subtree"),
        };
        loop {
            match self.node(z).left {
                None => {
                    let zparent = self.node(z).parent;
                    if self.node(z).right.is_some() {
                        panic!("corrupt llrb: minimum node with a right child");
                    }
                    self.write(zpos, None);
                    return (z, zparent);
                }
                Some(left) => {
                    if !self.node(left).red && !self.is_red(self.node(left).left) {
                        z = self.move_red_left(z);
                    }
                    zpos = Pos::Left(z);
                    z = match self.node(z).left {
                        Some(left) => left,
                        None => panic!("corrupt llrb: lost left child in delete_min"),
                    };
                }
            }
        }
    }

    /// Top-down deletion. Pushes a red link into whichever child the
    /// search descends into, so the node finally unlinked is red and
    /// black-height balance survives the detach. When the matched node
    /// has a right subtree, the subtree minimum is detached instead and
    /// spliced into the matched node's place (successor promotion).
    ///
    /// Returns the node taken out of the tree, still in the arena; the
    /// caller retires its slot.
    fn remove_node(&mut self, key: &K) -> Option<NodeId> {
        self.root?;
        let mut pos = Pos::Root;
        let mut parent = self.root;
        let mut walk = self.root;
        loop {
            let mut n = match walk {
                Some(n) => n,
                None => {
                    // key absent; move_red_* may have run on the way down.
                    self.fixup(parent);
                    return None;
                }
            };
            if self.compare(key, &self.node(n).key) == Ordering::Less {
                if let Some(left) = self.node(n).left {
                    if !self.node(left).red && !self.is_red(self.node(left).left) {
                        n = self.move_red_left(n);
                    }
                }
                parent = Some(n);
                pos = Pos::Left(n);
                walk = self.node(n).left;
            } else {
                if self.is_red(self.node(n).left) {
                    n = self.rotate_right(n);
                }
                if self.compare(key, &self.node(n).key) == Ordering::Equal
                    && self.node(n).right.is_none()
                {
                    self.write(pos, None);
                    self.fixup(parent);
                    return Some(n);
                }
                if let Some(right) = self.node(n).right {
                    if !self.node(right).red && !self.is_red(self.node(right).left) {
                        n = self.move_red_right(n);
                    }
                }
                if self.compare(key, &self.node(n).key) == Ordering::Equal {
                    let (z, mut zparent) = self.delete_min(Pos::Right(n));
                    if zparent == Some(n) {
                        zparent = Some(z);
                    }
                    let (left, right, red, nparent) = {
                        let node = self.node(n);
                        (node.left, node.right, node.red, node.parent)
                    };
                    self.set_left(z, left);
                    self.set_right(z, right);
                    self.node_mut(z).red = red;
                    self.replace_child(nparent, n, Some(z));
                    self.fixup(zparent);
                    return Some(n);
                }
                parent = Some(n);
                pos = Pos::Right(n);
                walk = self.node(n).right;
            }
        }
    }
}

// Ordered stepping. successor/predecessor run from live parent links,
// so they stay correct no matter what rebalancing happened since the
// node was first reached.
impl<K, V> Llrb<K, V>
where
    K: Clone,
    V: Clone,
{
    fn leftmost(&self, id: NodeId) -> NodeId {
        let mut id = id;
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn rightmost(&self, id: NodeId) -> NodeId {
        let mut id = id;
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.leftmost(right));
        }
        self.ascend_from_right(id)
    }

    fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.node(id).left {
            return Some(self.rightmost(left));
        }
        self.ascend_from_left(id)
    }

    /// Climb parent links until the walk crosses a left edge; that
    /// parent is the next greater key.
    fn ascend_from_right(&self, id: NodeId) -> Option<NodeId> {
        let mut id = id;
        while let Some(parent) = self.node(id).parent {
            if self.node(parent).left == Some(id) {
                return Some(parent);
            }
            id = parent;
        }
        None
    }

    /// Climb parent links until the walk crosses a right edge; that
    /// parent is the next lesser key.
    fn ascend_from_left(&self, id: NodeId) -> Option<NodeId> {
        let mut id = id;
        while let Some(parent) = self.node(id).parent {
            if self.node(parent).right == Some(id) {
                return Some(parent);
            }
            id = parent;
        }
        None
    }

    /// First node with key >= `key`, whether or not `key` is present.
    /// When the search lands on an empty link, the link's identity
    /// says which neighbour comes next: an empty left link means the
    /// terminal parent itself, an empty right link means the first
    /// ancestor reached across a left edge.
    fn at_or_after(&self, key: &K) -> Option<NodeId> {
        match self.find_location(key) {
            (_, Some(id)) => Some(id),
            (Pos::Left(p), None) => Some(p),
            (Pos::Right(p), None) => self.ascend_from_right(p),
            (Pos::Root, None) => None,
        }
    }

    /// Last node with key <= `key`; mirror of [`Llrb::at_or_after`].
    fn at_or_before(&self, key: &K) -> Option<NodeId> {
        match self.find_location(key) {
            (_, Some(id)) => Some(id),
            (Pos::Right(p), None) => Some(p),
            (Pos::Left(p), None) => self.ascend_from_left(p),
            (Pos::Root, None) => None,
        }
    }

    /// First node strictly after `key`. Used by cursors resuming from
    /// a retired node: an exact match means the key was re-inserted
    /// since, and stepping continues past it.
    fn next_after(&self, key: &K) -> Option<NodeId> {
        match self.find_location(key) {
            (_, Some(id)) => self.successor(id),
            (Pos::Left(p), None) => Some(p),
            (Pos::Right(p), None) => self.ascend_from_right(p),
            (Pos::Root, None) => None,
        }
    }

    /// Last node strictly before `key`; mirror of [`Llrb::next_after`].
    fn prev_before(&self, key: &K) -> Option<NodeId> {
        match self.find_location(key) {
            (_, Some(id)) => self.predecessor(id),
            (Pos::Right(p), None) => Some(p),
            (Pos::Left(p), None) => self.ascend_from_left(p),
            (Pos::Root, None) => None,
        }
    }

    fn validate_tree(
        &self,
        node: Option<NodeId>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        stats: &mut Stats,
    ) -> Result<usize, LlrbError<K>> {
        let id = match node {
            Some(id) => id,
            None => {
                if let Some(depths) = stats.depths.as_mut() {
                    depths.sample(depth);
                }
                return Ok(nb);
            }
        };

        let (red, left, right) = {
            let node = self.node(id);
            (node.red, node.left, node.right)
        };
        if fromred && red {
            return Err(LlrbError::ConsecutiveReds);
        }
        if self.is_red(right) {
            return Err(LlrbError::RightLeaningRed);
        }
        if !red {
            nb += 1;
        }
        for child in left.iter().chain(right.iter()) {
            if self.node(*child).parent != Some(id) {
                return Err(LlrbError::BrokenParentLink);
            }
        }

        let lblacks = self.validate_tree(left, red, nb, depth + 1, stats)?;
        let rblacks = self.validate_tree(right, red, nb, depth + 1, stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(LlrbError::UnbalancedBlacks(err));
        }
        if let Some(left) = left {
            if self.compare(&self.node(left).key, &self.node(id).key) != Ordering::Less {
                let (lkey, pkey) = (self.node(left).key.clone(), self.node(id).key.clone());
                return Err(LlrbError::SortError(lkey, pkey));
            }
        }
        if let Some(right) = right {
            if self.compare(&self.node(right).key, &self.node(id).key) != Ordering::Greater {
                let (rkey, pkey) = (self.node(right).key.clone(), self.node(id).key.clone());
                return Err(LlrbError::SortError(rkey, pkey));
            }
        }
        Ok(lblacks)
    }
}

/// A link in the tree: either the root link or a child link of a named
/// parent. find_location hands these out, and deletion/recovery write
/// through them.
#[derive(Clone, Copy)]
enum Pos {
    Root,
    Left(NodeId),
    Right(NodeId),
}

/// Stable handle to an arena slot. The generation is bumped every time
/// the slot is vacated, so a handle held across a delete turns stale
/// instead of aliasing whatever node reuses the slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct NodeId {
    idx: u32,
    gen: u32,
}

/// Node corresponds to a single entry in Llrb instance.
#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    red: bool,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Node<K, V> {
        Node {
            key,
            value,
            red: true,
            parent: None,
            left: None,
            right: None,
        }
    }
}

#[derive(Clone)]
struct Slot<K, V> {
    gen: u32,
    node: Option<Node<K, V>>,
}

/// Slab of generation-tagged slots. Vacated slots go on a free list
/// and come back with a bumped generation.
#[derive(Clone)]
struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<u32>,
}

impl<K, V> Arena<K, V> {
    fn new() -> Arena<K, V> {
        Arena {
            slots: vec![],
            free: vec![],
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.node = Some(node);
                NodeId {
                    idx,
                    gen: slot.gen,
                }
            }
            None => {
                self.slots.push(Slot {
                    gen: 0,
                    node: Some(node),
                });
                NodeId {
                    idx: (self.slots.len() - 1) as u32,
                    gen: 0,
                }
            }
        }
    }

    fn retire(&mut self, id: NodeId) -> Node<K, V> {
        let slot = match self.slots.get_mut(id.idx as usize) {
            Some(slot) if slot.gen == id.gen => slot,
            _ => panic!("corrupt llrb: retiring a stale node"),
        };
        let node = match slot.node.take() {
            Some(node) => node,
            None => panic!("corrupt llrb: retiring a vacant slot"),
        };
        slot.gen = slot.gen.wrapping_add(1);
        self.free.push(id.idx);
        node
    }

    fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.gen != id.gen {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.gen != id.gen {
            return None;
        }
        slot.node.as_mut()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Reverse,
}

enum Start<K> {
    Extreme,
    From(K),
}

/// One-pass pull cursor over (key, value) pairs, created by
/// [`Llrb::all`], [`Llrb::backward`] or [`Llrb::scan`].
///
/// The cursor does not borrow the tree; each step takes the tree by
/// reference, so the application is free to call [`Llrb::remove`]
/// between steps. Deleting the entry the cursor just yielded is fully
/// supported: the cursor notices its node handle went stale, re-locates
/// the retained key and resumes from the correct neighbour, never
/// skipping or repeating an entry. A cursor must only be stepped with
/// the tree that created it.
pub struct Cursor<K> {
    dir: Direction,
    start: Option<Start<K>>,
    limit: Option<K>,
    cur: Option<(NodeId, K)>,
    done: bool,
}

impl<K> Cursor<K>
where
    K: Clone,
{
    fn new(dir: Direction, start: Start<K>, limit: Option<K>) -> Cursor<K> {
        Cursor {
            dir,
            start: Some(start),
            limit,
            cur: None,
            done: false,
        }
    }

    /// Step the cursor, returning the next entry in cursor order, or
    /// None once the sequence is exhausted. Exhaustion is final; a
    /// fresh cursor is needed to iterate again.
    pub fn next<V>(&mut self, tree: &Llrb<K, V>) -> Option<(K, V)>
    where
        V: Clone,
    {
        if self.done {
            return None;
        }
        let next = match self.cur.take() {
            None => match self.start.take() {
                Some(Start::Extreme) => match self.dir {
                    Direction::Forward => tree.root.map(|root| tree.leftmost(root)),
                    Direction::Reverse => tree.root.map(|root| tree.rightmost(root)),
                },
                Some(Start::From(bound)) => match self.dir {
                    Direction::Forward => tree.at_or_after(&bound),
                    Direction::Reverse => tree.at_or_before(&bound),
                },
                None => None,
            },
            Some((id, last_key)) => {
                if tree.arena.get(id).is_some() {
                    match self.dir {
                        Direction::Forward => tree.successor(id),
                        Direction::Reverse => tree.predecessor(id),
                    }
                } else {
                    // parked node was deleted; resume from its key.
                    match self.dir {
                        Direction::Forward => tree.next_after(&last_key),
                        Direction::Reverse => tree.prev_before(&last_key),
                    }
                }
            }
        };

        let id = match next {
            Some(id) => id,
            None => {
                self.done = true;
                return None;
            }
        };
        let node = tree.node(id);
        if let Some(limit) = &self.limit {
            let past = match self.dir {
                Direction::Forward => tree.compare(&node.key, limit) == Ordering::Greater,
                Direction::Reverse => tree.compare(&node.key, limit) == Ordering::Less,
            };
            if past {
                self.done = true;
                return None;
            }
        }
        self.cur = Some((id, node.key.clone()));
        Some((node.key.clone(), node.value.clone()))
    }
}

/// Borrowing iterator over all entries in ascending key order,
/// created by [`Llrb::iter`].
pub struct Iter<'a, K, V>
where
    K: Clone,
    V: Clone,
{
    tree: &'a Llrb<K, V>,
    cursor: Cursor<K>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.tree)
    }
}

/// Statistics on [`Llrb`] tree. Serves two purposes:
///
/// * To get partial but quick statistics via [`Llrb::stats`] method.
/// * To get full statistics via [`Llrb::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: None,
            depths: None,
        }
    }

    /// Return number of entries in the [`Llrb`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return in-arena node size, including overhead for `Llrb<K, V>`.
    /// Although the overhead is constant, the node size varies based
    /// on key and value types.
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black links from root to leaf, same on both
    /// left and right child in a valid tree.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics, populated by [`Llrb::validate`].
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
