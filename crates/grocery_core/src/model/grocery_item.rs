//! Grocery item domain model.
//!
//! # Responsibility
//! - Define the single persisted entity and its category classification.
//! - Provide constructors that enforce the trimmed, non-empty name rule.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `name` is trimmed and non-empty for every valid item.
//! - `id` and `created_at` never change after creation.
//! - Unknown persisted category labels resolve to `Category::Milk`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a grocery item.
pub type ItemId = Uuid;

/// Fixed classification label for an item.
///
/// Variant order is the display order used by grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Category {
    #[default]
    Milk,
    Vegetables,
    Fruits,
    Breads,
    Meats,
}

impl Category {
    /// All categories in their fixed order.
    pub const ALL: [Category; 5] = [
        Category::Milk,
        Category::Vegetables,
        Category::Fruits,
        Category::Breads,
        Category::Meats,
    ];

    /// Stable label used for display and persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Milk => "Milk",
            Self::Vegetables => "Vegetables",
            Self::Fruits => "Fruits",
            Self::Breads => "Breads",
            Self::Meats => "Meats",
        }
    }

    /// Strict label lookup. Returns `None` for unknown labels.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }

    /// Lenient lookup for stored values.
    ///
    /// Falls back to `Category::Milk` so rows written by a build with more
    /// categories (or corrupted rows) stay readable.
    pub fn from_persisted(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Position of this category inside `Category::ALL`.
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ItemValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value.trim())
            .ok_or_else(|| ItemValidationError::UnknownCategory(value.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_persisted(&raw))
    }
}

/// Validation failures for grocery item state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// `id` must not be the nil UUID.
    NilId,
    /// Name is empty after trimming whitespace.
    EmptyName,
    /// Name carries leading or trailing whitespace.
    UntrimmedName,
    /// Category label outside the closed set (strict parsing only).
    UnknownCategory(String),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be nil"),
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::UntrimmedName => {
                write!(f, "item name must not have leading or trailing whitespace")
            }
            Self::UnknownCategory(value) => write!(
                f,
                "unknown category `{value}`; expected Milk|Vegetables|Fruits|Breads|Meats"
            ),
        }
    }
}

impl Error for ItemValidationError {}

/// Trims surrounding whitespace and rejects names that end up empty.
pub fn normalize_name(raw: &str) -> Result<String, ItemValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// The single persisted grocery entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GroceryItemWire")]
pub struct GroceryItem {
    /// Generated at creation, immutable.
    pub id: ItemId,
    /// Trimmed, non-empty display name.
    pub name: String,
    pub category: Category,
    pub is_completed: bool,
    /// Unix epoch milliseconds, captured at creation. Default ordering key.
    pub created_at: i64,
}

/// Unchecked wire shape used to validate decoded items.
#[derive(Deserialize)]
struct GroceryItemWire {
    id: ItemId,
    name: String,
    category: Category,
    is_completed: bool,
    created_at: i64,
}

impl TryFrom<GroceryItemWire> for GroceryItem {
    type Error = ItemValidationError;

    fn try_from(wire: GroceryItemWire) -> Result<Self, Self::Error> {
        let item = Self {
            id: wire.id,
            name: wire.name,
            category: wire.category,
            is_completed: wire.is_completed,
            created_at: wire.created_at,
        };
        item.validate()?;
        Ok(item)
    }
}

impl GroceryItem {
    /// Creates a new, incomplete item with a generated id stamped at now.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trimming.
    pub fn new(name: &str, category: Category) -> Result<Self, ItemValidationError> {
        Self::with_id(Uuid::new_v4(), name, category, now_epoch_ms())
    }

    /// Creates an item with a caller-provided id and creation time.
    ///
    /// Used by restore/import paths where identity already exists.
    pub fn with_id(
        id: ItemId,
        name: &str,
        category: Category,
        created_at: i64,
    ) -> Result<Self, ItemValidationError> {
        if id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        Ok(Self {
            id,
            name: normalize_name(name)?,
            category,
            is_completed: false,
            created_at,
        })
    }

    /// Checks the invariants every persisted item must satisfy.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if trimmed.len() != self.name.len() {
            return Err(ItemValidationError::UntrimmedName);
        }
        Ok(())
    }

    /// Flips the completion flag.
    pub fn toggle_completion(&mut self) {
        self.is_completed = !self.is_completed;
    }
}
