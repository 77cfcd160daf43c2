use geo_types::Rect;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

type IndexEntry = GeomWithData<Rectangle<[f64; 2]>, String>;

/// R-tree of feature bounding rectangles.
///
/// Removal must be given the same rectangle the id was inserted with;
/// otherwise the entry is not found and stays behind.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<IndexEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index in one pass from `(rectangle, id)` pairs. Used when
    /// rebuilding from a loaded snapshot.
    pub fn bulk_load(entries: Vec<(Rect<f64>, String)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(rect, id)| Self::entry(rect, id))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, rect: Rect<f64>, id: String) {
        self.tree.insert(Self::entry(rect, id));
    }

    /// Remove the entry for `id`. Removal of an absent entry is a no-op.
    pub fn remove(&mut self, rect: Rect<f64>, id: &str) {
        self.tree.remove(&Self::entry(rect, id.to_string()));
    }

    /// Ids whose rectangle intersects `query`. Inclusive on all four bounds,
    /// so a point query (`min == max`) matches rectangles containing it.
    pub fn search(&self, query: Rect<f64>) -> Vec<String> {
        let envelope = AABB::from_corners(
            [query.min().x, query.min().y],
            [query.max().x, query.max().y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    fn entry(rect: Rect<f64>, id: String) -> IndexEntry {
        let rectangle = Rectangle::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );
        GeomWithData::new(rectangle, id)
    }
}
