//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and are read with runtime queries; form
//! types carry their own validation.

pub mod coffee_shop;
pub mod favorite;
pub mod form;
pub mod menu_item;
pub mod order;
pub mod profile;
pub mod session;
pub mod toast;

pub use coffee_shop::{CoffeeShop, ShopFilter};
pub use favorite::Favorite;
pub use form::{FieldError, FormErrors};
pub use menu_item::{MenuItem, MenuItemDraft, MenuItemInput};
pub use order::{OrderLine, OrderRecord};
pub use profile::{Profile, ProfileView};
pub use session::{CurrentUser, keys as session_keys};
pub use toast::{FLASH_KEY, Toast, ToastVariant};
