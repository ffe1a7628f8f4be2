// src/models/mod.rs

//! Plain data records shared by the stores, workflows and services.

pub mod cart;
pub mod catalog;
pub mod favorite;
pub mod order;
pub mod user;

pub use cart::{CartLine, CartLineView};
pub use catalog::{Brand, BrandInput, BrandPatch, BrandWithCategory, Category, CategoryPatch, CategoryUpsert, CategoryWithBrands};
pub use favorite::Favorite;
pub use order::{NewOrderItem, Order, OrderHistoryRow, OrderItem};
pub use user::{NewUser, ProfilePatch, User};
