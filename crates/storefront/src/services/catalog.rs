//! Cached read access to the menu and the coffee-shop list.
//!
//! Both lists are small and read on nearly every page, so they are kept in a
//! `moka` cache (5-minute TTL). Admin writes go through this service so the
//! cache is invalidated the moment the menu changes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use sinocoffee_core::{MenuItemId, NewCartLine};

use crate::db::{CoffeeShopRepository, MenuItemRepository, RepositoryError};
use crate::models::{CoffeeShop, MenuItem, MenuItemDraft, OrderLine};

/// Cache key for the catalog lists.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Menu,
    Shops,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Menu(Arc<Vec<MenuItem>>),
    Shops(Arc<Vec<CoffeeShop>>),
}

/// Menu and location reads with caching.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self {
            inner: Arc::new(CatalogInner { pool, cache }),
        }
    }

    // =========================================================================
    // Menu
    // =========================================================================

    /// Every menu item, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose query fails.
    pub async fn menu(&self) -> Result<Arc<Vec<MenuItem>>, RepositoryError> {
        if let Some(CacheValue::Menu(items)) = self.inner.cache.get(&CacheKey::Menu).await {
            debug!("Cache hit for menu");
            return Ok(items);
        }

        let items = Arc::new(MenuItemRepository::new(&self.inner.pool).list().await?);
        self.inner
            .cache
            .insert(CacheKey::Menu, CacheValue::Menu(Arc::clone(&items)))
            .await;
        Ok(items)
    }

    /// One menu item, from the cached list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if loading the menu fails.
    pub async fn menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        Ok(self.menu().await?.iter().find(|item| item.id == id).cloned())
    }

    /// Create an item and drop the cached menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    pub async fn create_item(&self, draft: &MenuItemDraft) -> Result<MenuItem, RepositoryError> {
        let item = MenuItemRepository::new(&self.inner.pool)
            .create(draft)
            .await?;
        self.invalidate_menu().await;
        Ok(item)
    }

    /// Update an item and drop the cached menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn update_item(
        &self,
        id: MenuItemId,
        draft: &MenuItemDraft,
    ) -> Result<MenuItem, RepositoryError> {
        let item = MenuItemRepository::new(&self.inner.pool)
            .update(id, draft)
            .await?;
        self.invalidate_menu().await;
        Ok(item)
    }

    /// Delete an item and drop the cached menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn delete_item(&self, id: MenuItemId) -> Result<(), RepositoryError> {
        MenuItemRepository::new(&self.inner.pool).delete(id).await?;
        self.invalidate_menu().await;
        Ok(())
    }

    pub async fn invalidate_menu(&self) {
        self.inner.cache.invalidate(&CacheKey::Menu).await;
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// Every coffee shop, best rated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on a cache miss whose query fails.
    pub async fn shops(&self) -> Result<Arc<Vec<CoffeeShop>>, RepositoryError> {
        if let Some(CacheValue::Shops(shops)) = self.inner.cache.get(&CacheKey::Shops).await {
            debug!("Cache hit for coffee shops");
            return Ok(shops);
        }

        let shops = Arc::new(CoffeeShopRepository::new(&self.inner.pool).list().await?);
        self.inner
            .cache
            .insert(CacheKey::Shops, CacheValue::Shops(Arc::clone(&shops)))
            .await;
        Ok(shops)
    }
}

// =============================================================================
// Reorder
// =============================================================================

/// Cart additions for re-ordering a past order.
#[derive(Debug, Default)]
pub struct ReorderPlan {
    /// Lines to add with their quantities.
    pub additions: Vec<(NewCartLine, u32)>,
    /// Names of lines no longer on the menu.
    pub skipped: Vec<String>,
}

impl ReorderPlan {
    /// Notice shown after re-ordering.
    #[must_use]
    pub fn notice(&self) -> String {
        match self.skipped.len() {
            0 => "All items from this order were added to your cart.".to_string(),
            1 => "1 item is no longer on the menu and was skipped.".to_string(),
            n => format!("{n} items are no longer on the menu and were skipped."),
        }
    }
}

/// Match a past order's lines against the current menu.
///
/// A line is matched by `item_id` first, then by case-insensitive name.
/// Matched lines use the current menu price.
#[must_use]
pub fn plan_reorder(lines: &[OrderLine], menu: &[MenuItem]) -> ReorderPlan {
    let mut plan = ReorderPlan::default();

    for line in lines {
        if line.quantity == 0 {
            continue;
        }
        let matched = line
            .item_id
            .and_then(|id| menu.iter().find(|item| item.id == id))
            .or_else(|| {
                menu.iter()
                    .find(|item| item.name.eq_ignore_ascii_case(line.name.trim()))
            });
        match matched {
            Some(item) => plan.additions.push((item.to_cart_line(), line.quantity)),
            None => plan.skipped.push(line.name.clone()),
        }
    }

    plan
}
