//! Self-resizing quadtree over keyed points.
//!
//! Nodes live in an arena and refer to each other by index. Every node
//! is either a leaf holding items directly or a divided node with exactly
//! four children. Each node tracks the number of items beneath it (its
//! weight) and a subdivide threshold.
//!
//! The tree starts with a unit bound and grows outward by doubling whenever
//! an item lands outside the root. Leaves split once their weight exceeds
//! their threshold, and divided nodes collapse back into leaves once their
//! weight drops below it. After every [`COMPRESSION_INTERVAL`] removals the
//! root is replaced by its only populated child, if it has one, so the tree
//! shrinks again after being stretched by far-away items.

use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::error::SpatialError;
use crate::geometry::{Point, Rect};

/// Items a fresh leaf holds before it splits.
pub const INITIAL_SUBDIVIDE_THRESHOLD: usize = 100;

/// Factor applied to a child's threshold when it holds all of its parent's
/// items at split time (coincident points).
const THRESHOLD_GROWTH_FACTOR: usize = 2;

/// Removals between lazy root compressions.
pub const COMPRESSION_INTERVAL: u32 = 100;

/// Growth applied to the search rectangle of [`DynamicQuadtree::items_near`]
/// while it comes back empty.
const NEAR_SEARCH_GROWTH: f64 = 1.1;

// ---------------------------------------------------------------------------
// Arena plumbing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    LowLow,
    HighLow,
    LowHigh,
    HighHigh,
}

impl Quadrant {
    /// Which side of `split` the point falls on. Ties go high, matching the
    /// half-open child bounds.
    fn of(split: Point, point: Point) -> Self {
        match (point.x < split.x, point.y < split.y) {
            (true, true) => Self::LowLow,
            (false, true) => Self::HighLow,
            (true, false) => Self::LowHigh,
            (false, false) => Self::HighHigh,
        }
    }

    /// Bounds of this quadrant of `parent` when divided at `split`.
    const fn bounds_within(self, parent: &Rect, split: Point) -> Rect {
        let (min_x, max_x) = match self {
            Self::LowLow | Self::LowHigh => (parent.min.x, split.x),
            Self::HighLow | Self::HighHigh => (split.x, parent.max.x),
        };
        let (min_y, max_y) = match self {
            Self::LowLow | Self::HighLow => (parent.min.y, split.y),
            Self::LowHigh | Self::HighHigh => (split.y, parent.max.y),
        };
        Rect::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }
}

#[derive(Debug, Clone, Copy)]
struct Children {
    low_low: NodeId,
    high_low: NodeId,
    low_high: NodeId,
    high_high: NodeId,
}

impl Children {
    fn build(mut make: impl FnMut(Quadrant) -> NodeId) -> Self {
        Self {
            low_low: make(Quadrant::LowLow),
            high_low: make(Quadrant::HighLow),
            low_high: make(Quadrant::LowHigh),
            high_high: make(Quadrant::HighHigh),
        }
    }

    const fn get(&self, quadrant: Quadrant) -> NodeId {
        match quadrant {
            Quadrant::LowLow => self.low_low,
            Quadrant::HighLow => self.high_low,
            Quadrant::LowHigh => self.low_high,
            Quadrant::HighHigh => self.high_high,
        }
    }

    const fn ids(&self) -> [NodeId; 4] {
        [self.low_low, self.high_low, self.low_high, self.high_high]
    }
}

#[derive(Debug, Clone)]
enum Contents<K> {
    Leaf(BTreeMap<K, Point>),
    Divided(Children),
}

#[derive(Debug, Clone)]
struct Node<K> {
    bounds: Rect,
    /// Dividing point for children. Usually the center, but pinned to the
    /// old root's corner when the tree grows so child bounds stay exact.
    split: Point,
    parent: Option<NodeId>,
    threshold: usize,
    weight: usize,
    contents: Contents<K>,
}

impl<K> Node<K> {
    fn leaf(bounds: Rect, parent: Option<NodeId>, threshold: usize) -> Self {
        Self {
            bounds,
            split: bounds.center(),
            parent,
            threshold,
            weight: 0,
            contents: Contents::Leaf(BTreeMap::new()),
        }
    }

    const fn is_divided(&self) -> bool {
        matches!(self.contents, Contents::Divided(_))
    }
}

#[derive(Debug, Clone)]
struct Arena<K> {
    slots: Vec<Node<K>>,
    free: Vec<NodeId>,
}

impl<K> Arena<K> {
    const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, node: Node<K>) -> NodeId {
        if let Some(id) = self.free.pop() {
            *self.get_mut(id) = node;
            id
        } else {
            self.slots.push(node);
            NodeId(self.slots.len().saturating_sub(1))
        }
    }

    // Ids only come from `alloc`, so they are always in range.
    #[allow(clippy::indexing_slicing)]
    fn get(&self, id: NodeId) -> &Node<K> {
        &self.slots[id.0]
    }

    #[allow(clippy::indexing_slicing)]
    fn get_mut(&mut self, id: NodeId) -> &mut Node<K> {
        &mut self.slots[id.0]
    }

    fn release(&mut self, id: NodeId) {
        let node = self.get_mut(id);
        node.contents = Contents::Leaf(BTreeMap::new());
        node.parent = None;
        node.weight = 0;
        self.free.push(id);
    }

    fn live(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }
}

/// Outcome of one descent step during insertion.
enum Step {
    Descend(NodeId),
    Stored { split: bool },
}

// ---------------------------------------------------------------------------
// DynamicQuadtree
// ---------------------------------------------------------------------------

/// A self-resizing point quadtree keyed by `K`.
///
/// Each key is stored at most once. A side table maps keys to their
/// coordinates so removal and [`location_of`](Self::location_of) never scan
/// the tree.
#[derive(Debug, Clone)]
pub struct DynamicQuadtree<K> {
    arena: Arena<K>,
    root: NodeId,
    locations: BTreeMap<K, Point>,
    removals_since_compression: u32,
}

impl<K: Ord + Clone> Default for DynamicQuadtree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> DynamicQuadtree<K> {
    /// Create an empty tree with the unit bound `[0, 1) x [0, 1)`.
    pub fn new() -> Self {
        Self::from_valid_bounds(Rect::from_origin_size(0.0, 0.0, 1.0, 1.0))
    }

    /// Create an empty tree with a caller-chosen initial bound.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidBounds`] if the bound has zero or
    /// negative extent or is not finite.
    pub fn with_bounds(bounds: Rect) -> Result<Self, SpatialError> {
        if !bounds.is_valid() {
            return Err(SpatialError::InvalidBounds {
                reason: format!(
                    "({}, {})..({}, {}) must be finite with positive width and height",
                    bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y
                ),
            });
        }
        Ok(Self::from_valid_bounds(bounds))
    }

    fn from_valid_bounds(bounds: Rect) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(Node::leaf(bounds, None, INITIAL_SUBDIVIDE_THRESHOLD));
        Self {
            arena,
            root,
            locations: BTreeMap::new(),
            removals_since_compression: 0,
        }
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.arena.get(self.root).weight
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current bound of the root node.
    pub fn bounds(&self) -> Rect {
        self.arena.get(self.root).bounds
    }

    /// Number of live nodes, leaves included.
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    /// Whether `key` is indexed.
    pub fn contains_key(&self, key: &K) -> bool {
        self.locations.contains_key(key)
    }

    /// The coordinate stored for `key`.
    pub fn location_of(&self, key: &K) -> Option<Point> {
        self.locations.get(key).copied()
    }

    /// Add `key` at `point`, growing the tree outward if needed.
    ///
    /// Returns `Ok(false)` without touching the tree if the key is already
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::NonFiniteCoordinate`] if either coordinate is
    /// NaN or infinite.
    pub fn insert(&mut self, key: K, point: Point) -> Result<bool, SpatialError> {
        if !point.is_finite() {
            return Err(SpatialError::NonFiniteCoordinate {
                x: point.x,
                y: point.y,
            });
        }
        if self.locations.contains_key(&key) {
            trace!(x = point.x, y = point.y, "key already indexed, insert ignored");
            return Ok(false);
        }

        self.expand_to(point);
        self.locations.insert(key.clone(), point);
        self.add_below(self.root, key, point);
        Ok(true)
    }

    /// Remove `key`, returning the coordinate it was stored at.
    pub fn remove(&mut self, key: &K) -> Option<Point> {
        let point = self.locations.remove(key)?;
        let leaf = self.leaf_containing(point);

        let removed = match &mut self.arena.get_mut(leaf).contents {
            Contents::Leaf(items) => items.remove(key).is_some(),
            Contents::Divided(_) => false,
        };
        if !removed {
            warn!(x = point.x, y = point.y, "indexed key missing from its leaf");
            return Some(point);
        }

        self.propagate_removal(leaf);
        self.note_removal();
        Some(point)
    }

    /// Every item in the tree, in no particular order.
    pub fn items(&self) -> Vec<(K, Point)> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_subtree(self.root, &mut out);
        out
    }

    /// Every item whose point lies inside `rect` (half-open).
    pub fn items_in_rect(&self, rect: &Rect) -> Vec<(K, Point)> {
        let start = self.smallest_node_enclosing(rect);
        let mut candidates = Vec::new();
        self.collect_subtree(start, &mut candidates);
        candidates.retain(|(_, point)| rect.contains(*point));
        candidates
    }

    /// A non-empty set of items somewhere around `point`, if the tree has
    /// any items at all.
    ///
    /// The result is a candidate set, not a nearest-neighbour answer:
    /// callers are expected to rank it by their own distance measure. The
    /// search starts with a square sized to the leaf under `point` and widens
    /// by ten percent per round until something turns up.
    pub fn items_near(&self, point: Point) -> Vec<(K, Point)> {
        if self.is_empty() || !point.is_finite() {
            return Vec::new();
        }

        let root_bounds = self.bounds();
        let anchor = root_bounds.clamp_inside(point);
        let leaf_bounds = self.arena.get(self.leaf_containing(point)).bounds;
        let mut half_width = leaf_bounds.width();
        let mut half_height = leaf_bounds.height();

        loop {
            let search = Rect::new(
                Point::new(anchor.x - half_width, anchor.y - half_height),
                Point::new(anchor.x + half_width, anchor.y + half_height),
            );
            let found = self.items_in_rect(&search);
            if !found.is_empty() || search.contains_rect(&root_bounds) {
                return found;
            }
            half_width *= NEAR_SEARCH_GROWTH;
            half_height *= NEAR_SEARCH_GROWTH;
        }
    }

    /// Items of the smallest node around `point` that holds any, each with
    /// its distance to `point`, nearest first.
    ///
    /// The search starts at the leaf under `point` (clamped into the tree)
    /// and climbs toward the root until a node has items. Like
    /// [`items_near`](Self::items_near) this is a local answer, not a
    /// guaranteed global nearest neighbour.
    pub fn items_near_sorted(&self, point: Point) -> Vec<(f64, K, Point)> {
        self.climb_for_items(point, f64::INFINITY)
    }

    /// Like [`items_near_sorted`](Self::items_near_sorted), but only items
    /// within `max_distance` of `point` count. Empty when no item in the
    /// whole tree is that close.
    pub fn items_near_within(&self, point: Point, max_distance: f64) -> Vec<(f64, K, Point)> {
        self.climb_for_items(point, max_distance)
    }

    /// Repeatedly replace the root by its only populated child.
    ///
    /// Returns the number of levels removed. This runs one level at a time
    /// on its own every [`COMPRESSION_INTERVAL`] removals; calling it
    /// directly shrinks the tree as far as it will go.
    pub fn compress(&mut self) -> usize {
        let mut levels = 0_usize;
        while self.compress_once() {
            levels = levels.saturating_add(1);
        }
        levels
    }

    // -----------------------------------------------------------------------
    // Growth
    // -----------------------------------------------------------------------

    /// Double the root outward until it encloses `point`.
    fn expand_to(&mut self, point: Point) {
        while !self.arena.get(self.root).bounds.contains(point) {
            let old_root = self.root;
            let (bounds, weight) = {
                let node = self.arena.get(old_root);
                (node.bounds, node.weight)
            };
            let width = bounds.width();
            let height = bounds.height();
            let beyond_x = point.x >= bounds.max.x;
            let beyond_y = point.y >= bounds.max.y;

            // Grow toward the point on each axis. The old root keeps its
            // exact bounds and becomes the quadrant on the opposite side.
            let (min_x, max_x, split_x) = if beyond_x {
                (bounds.min.x, bounds.max.x + width, bounds.max.x)
            } else {
                (bounds.min.x - width, bounds.max.x, bounds.min.x)
            };
            let (min_y, max_y, split_y) = if beyond_y {
                (bounds.min.y, bounds.max.y + height, bounds.max.y)
            } else {
                (bounds.min.y - height, bounds.max.y, bounds.min.y)
            };
            let old_root_quadrant = match (beyond_x, beyond_y) {
                (false, false) => Quadrant::HighHigh,
                (false, true) => Quadrant::HighLow,
                (true, false) => Quadrant::LowHigh,
                (true, true) => Quadrant::LowLow,
            };

            let new_bounds = Rect::new(Point::new(min_x, min_y), Point::new(max_x, max_y));
            let split = Point::new(split_x, split_y);
            let new_root = self.arena.alloc(Node {
                bounds: new_bounds,
                split,
                parent: None,
                threshold: INITIAL_SUBDIVIDE_THRESHOLD,
                weight,
                contents: Contents::Leaf(BTreeMap::new()),
            });

            let children = Children::build(|quadrant| {
                if quadrant == old_root_quadrant {
                    old_root
                } else {
                    self.arena.alloc(Node::leaf(
                        quadrant.bounds_within(&new_bounds, split),
                        Some(new_root),
                        INITIAL_SUBDIVIDE_THRESHOLD,
                    ))
                }
            });
            self.arena.get_mut(new_root).contents = Contents::Divided(children);
            self.arena.get_mut(old_root).parent = Some(new_root);
            self.root = new_root;

            debug!(
                min_x,
                min_y,
                max_x,
                max_y,
                "quadtree root expanded"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Insertion and subdivision
    // -----------------------------------------------------------------------

    /// Route an item from `start` down to its leaf, bumping weights on the
    /// way, and split the leaf if it overflows.
    fn add_below(&mut self, start: NodeId, key: K, point: Point) {
        let mut current = start;
        loop {
            let step = {
                let node = self.arena.get_mut(current);
                node.weight = node.weight.saturating_add(1);
                let overflowing = node.weight > node.threshold;
                let split_at = node.split;
                match &mut node.contents {
                    Contents::Leaf(items) => {
                        items.insert(key.clone(), point);
                        Step::Stored { split: overflowing }
                    }
                    Contents::Divided(children) => {
                        Step::Descend(children.get(Quadrant::of(split_at, point)))
                    }
                }
            };
            match step {
                Step::Descend(next) => current = next,
                Step::Stored { split } => {
                    if split {
                        self.subdivide(current);
                    }
                    return;
                }
            }
        }
    }

    fn subdivide(&mut self, id: NodeId) {
        let (bounds, split, parent, weight) = {
            let node = self.arena.get(id);
            (node.bounds, node.split, node.parent, node.weight)
        };

        // A node holding everything its parent holds is full of coincident
        // points; raise its bar so the split cannot recurse forever.
        if let Some(parent) = parent {
            let parent_node = self.arena.get(parent);
            if parent_node.weight == weight {
                let raised = parent_node
                    .threshold
                    .saturating_mul(THRESHOLD_GROWTH_FACTOR);
                self.arena.get_mut(id).threshold = raised;
            }
        }

        let threshold = self.arena.get(id).threshold;
        let children = Children::build(|quadrant| {
            self.arena.alloc(Node::leaf(
                quadrant.bounds_within(&bounds, split),
                Some(id),
                threshold,
            ))
        });

        let previous = std::mem::replace(
            &mut self.arena.get_mut(id).contents,
            Contents::Divided(children),
        );
        if let Contents::Leaf(items) = previous {
            trace!(items = items.len(), threshold, "quadtree leaf subdivided");
            for (key, point) in items {
                self.add_below(children.get(Quadrant::of(split, point)), key, point);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Removal, coalescing and compression
    // -----------------------------------------------------------------------

    fn propagate_removal(&mut self, leaf: NodeId) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let (coalesce, parent) = {
                let node = self.arena.get_mut(id);
                node.weight = node.weight.saturating_sub(1);
                (node.is_divided() && node.weight < node.threshold, node.parent)
            };
            if coalesce {
                self.coalesce(id);
            }
            current = parent;
        }
    }

    /// Pull every item below `id` up into it and free the subtree.
    fn coalesce(&mut self, id: NodeId) {
        let Contents::Divided(children) = &self.arena.get(id).contents else {
            return;
        };
        let children = *children;

        let mut items = BTreeMap::new();
        for child in children.ids() {
            self.drain_subtree(child, &mut items);
        }
        trace!(items = items.len(), "quadtree node coalesced");
        self.arena.get_mut(id).contents = Contents::Leaf(items);
    }

    fn drain_subtree(&mut self, id: NodeId, into: &mut BTreeMap<K, Point>) {
        let contents = std::mem::replace(
            &mut self.arena.get_mut(id).contents,
            Contents::Leaf(BTreeMap::new()),
        );
        match contents {
            Contents::Leaf(items) => into.extend(items),
            Contents::Divided(children) => {
                for child in children.ids() {
                    self.drain_subtree(child, into);
                }
            }
        }
        self.arena.release(id);
    }

    fn note_removal(&mut self) {
        if !self.arena.get(self.root).is_divided() {
            return;
        }
        self.removals_since_compression = self.removals_since_compression.saturating_add(1);
        if self.removals_since_compression >= COMPRESSION_INTERVAL {
            self.removals_since_compression = 0;
            self.compress_once();
        }
    }

    /// Replace the root by a child that holds every item, if one exists.
    fn compress_once(&mut self) -> bool {
        let root = self.arena.get(self.root);
        let Contents::Divided(children) = &root.contents else {
            return false;
        };
        let children = *children;
        let total = root.weight;

        let Some(heir) = children
            .ids()
            .into_iter()
            .find(|&child| self.arena.get(child).weight == total)
        else {
            return false;
        };

        for child in children.ids() {
            if child != heir {
                let mut discarded = BTreeMap::new();
                self.drain_subtree(child, &mut discarded);
            }
        }
        self.arena.release(self.root);
        self.arena.get_mut(heir).parent = None;
        self.root = heir;

        let bounds = self.bounds();
        debug!(
            min_x = bounds.min.x,
            min_y = bounds.min.y,
            max_x = bounds.max.x,
            max_y = bounds.max.y,
            "quadtree root compressed"
        );
        true
    }

    // -----------------------------------------------------------------------
    // Lookup helpers
    // -----------------------------------------------------------------------

    /// The leaf whose bounds contain `point`, or the root if the point lies
    /// outside the tree.
    fn leaf_containing(&self, point: Point) -> NodeId {
        if !self.bounds().contains(point) {
            return self.root;
        }
        let mut current = self.root;
        loop {
            let node = self.arena.get(current);
            match &node.contents {
                Contents::Leaf(_) => return current,
                Contents::Divided(children) => {
                    current = children.get(Quadrant::of(node.split, point));
                }
            }
        }
    }

    /// The deepest node whose bounds enclose `rect`, or the root.
    fn smallest_node_enclosing(&self, rect: &Rect) -> NodeId {
        let mut current = self.root;
        loop {
            let node = self.arena.get(current);
            let Contents::Divided(children) = &node.contents else {
                return current;
            };
            let Some(child) = children
                .ids()
                .into_iter()
                .find(|&child| self.arena.get(child).bounds.contains_rect(rect))
            else {
                return current;
            };
            current = child;
        }
    }

    fn climb_for_items(&self, point: Point, max_distance: f64) -> Vec<(f64, K, Point)> {
        if self.is_empty() || !point.is_finite() {
            return Vec::new();
        }
        let mut current = Some(self.leaf_containing(self.bounds().clamp_inside(point)));
        let mut found = Vec::new();
        while let Some(id) = current {
            let mut items = Vec::new();
            self.collect_subtree(id, &mut items);
            found = items
                .into_iter()
                .map(|(key, location)| (location.distance_to(point), key, location))
                .filter(|(distance, _, _)| *distance <= max_distance)
                .collect();
            if !found.is_empty() {
                break;
            }
            current = self.arena.get(id).parent;
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<(K, Point)>) {
        match &self.arena.get(id).contents {
            Contents::Leaf(items) => {
                out.extend(items.iter().map(|(key, point)| (key.clone(), *point)));
            }
            Contents::Divided(children) => {
                for child in children.ids() {
                    self.collect_subtree(child, out);
                }
            }
        }
    }
}
