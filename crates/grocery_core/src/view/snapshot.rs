//! Post-mutation list snapshot.

use crate::model::grocery_item::{Category, GroceryItem};
use crate::view::grouping::{filter_by_category, group_by_category, CategoryGroup};

/// Everything the list screen needs to render after a read or mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Full collection, oldest first.
    pub items: Vec<GroceryItem>,
    /// Active category filter.
    pub filter: Option<Category>,
    /// `items` narrowed by `filter`, order preserved.
    pub visible: Vec<GroceryItem>,
    /// `visible` grouped by category.
    pub groups: Vec<CategoryGroup>,
}

impl ListSnapshot {
    /// Builds a snapshot from the full collection and an optional filter.
    pub fn build(items: Vec<GroceryItem>, filter: Option<Category>) -> Self {
        let visible = filter_by_category(&items, filter);
        let groups = group_by_category(&visible);
        Self {
            items,
            filter,
            visible,
            groups,
        }
    }

    /// True when nothing is visible under the active filter.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.visible.iter().filter(|item| item.is_completed).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.visible.len() - self.completed_count()
    }
}
