//! Category filtering and grouping.
//!
//! # Invariants
//! - Input order is preserved wherever no explicit ordering applies.
//! - Groups follow `Category::ALL` order and empty groups are omitted.
//! - Inside a group, incomplete items come before completed ones (stable).

use crate::model::grocery_item::{Category, GroceryItem};

/// Items of one category, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub items: Vec<GroceryItem>,
}

/// Returns every item when `category` is `None`, otherwise only matching ones.
pub fn filter_by_category(items: &[GroceryItem], category: Option<Category>) -> Vec<GroceryItem> {
    match category {
        None => items.to_vec(),
        Some(category) => items
            .iter()
            .filter(|item| item.category == category)
            .cloned()
            .collect(),
    }
}

/// Partitions items by category in fixed category order.
pub fn group_by_category(items: &[GroceryItem]) -> Vec<CategoryGroup> {
    let mut buckets: Vec<Vec<GroceryItem>> = vec![Vec::new(); Category::ALL.len()];
    for item in items {
        buckets[item.category.ordinal()].push(item.clone());
    }

    Category::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, bucket)| !bucket.is_empty())
        .map(|(category, mut bucket)| {
            // `sort_by_key` is stable, so equal completion states keep input order.
            bucket.sort_by_key(|item| item.is_completed);
            CategoryGroup {
                category,
                items: bucket,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_by_category, group_by_category};
    use crate::model::grocery_item::{Category, GroceryItem};

    fn item(name: &str, category: Category, completed: bool) -> GroceryItem {
        let mut item = GroceryItem::new(name, category).expect("valid item");
        item.is_completed = completed;
        item
    }

    #[test]
    fn filter_none_returns_input_unchanged() {
        let items = vec![
            item("a", Category::Meats, false),
            item("b", Category::Milk, false),
        ];
        assert_eq!(filter_by_category(&items, None), items);
    }

    #[test]
    fn groups_keep_completion_ties_in_input_order() {
        let items = vec![
            item("done-1", Category::Fruits, true),
            item("open-1", Category::Fruits, false),
            item("done-2", Category::Fruits, true),
            item("open-2", Category::Fruits, false),
        ];

        let groups = group_by_category(&items);
        assert_eq!(groups.len(), 1);
        let names: Vec<_> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["open-1", "open-2", "done-1", "done-2"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }
}
