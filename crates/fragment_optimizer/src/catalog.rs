//! # Item Catalog
//!
//! The static table of salvageable items: market id, display name and the
//! number of fragments one unit yields.
//!
//! The catalog is immutable once built and is the only state shared between
//! optimizer runs. Declaration order matters: the pool builder visits items in
//! this order, which fixes candidate discovery order and therefore tie-breaking.
//!
//! ## Format
//!
//! ```toml
//! [[item]]
//! id = 175977920
//! name = "Desert Digital - Kar98k"
//! fragment_yield = 28
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{OptimizerError, OptimizerResult};

/// Market identifier of an item (the market's numeric item name id).
pub type ItemId = u64;

/// The catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// One salvageable item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Market identifier.
    pub id: ItemId,
    /// Human-readable name.
    pub name: String,
    /// Fragments produced per unit purchased.
    pub fragment_yield: u32,
}

impl ItemDescriptor {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, fragment_yield: u32) -> Self {
        Self {
            id,
            name: name.into(),
            fragment_yield,
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    item: Vec<ItemDescriptor>,
}

/// Ordered, validated table of item descriptors.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDescriptor>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    /// Builds a catalog, validating every descriptor.
    ///
    /// # Errors
    ///
    /// - `InvalidFragmentYield` if any yield is zero
    /// - `DuplicateItem` if an id appears twice
    /// - `InvalidConfig` if a name is blank
    pub fn new(items: Vec<ItemDescriptor>) -> OptimizerResult<Self> {
        let mut index = HashMap::with_capacity(items.len());

        for (position, item) in items.iter().enumerate() {
            if item.fragment_yield == 0 {
                return Err(OptimizerError::InvalidFragmentYield { item_id: item.id });
            }
            if item.name.trim().is_empty() {
                return Err(OptimizerError::InvalidConfig(format!(
                    "item {} has an empty name",
                    item.id
                )));
            }
            if index.insert(item.id, position).is_some() {
                return Err(OptimizerError::DuplicateItem(item.id));
            }
        }

        Ok(Self { items, index })
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML, plus any error from [`ItemCatalog::new`].
    pub fn from_toml_str(text: &str) -> OptimizerResult<Self> {
        let file: CatalogFile =
            toml::from_str(text).map_err(|e| OptimizerError::InvalidConfig(e.to_string()))?;
        Self::new(file.item)
    }

    /// Loads a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as [`ItemCatalog::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> OptimizerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| OptimizerError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled data file is corrupt.
    pub fn builtin() -> OptimizerResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemDescriptor> {
        self.index.get(&id).map(|&i| &self.items[i])
    }

    /// Returns true if the id is in the catalog.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Items in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemDescriptor> {
        self.items.iter()
    }

    /// Item ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
