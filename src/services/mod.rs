//Function-level API surface over an explicit store handle. Every function
//takes `&impl ConnectionTrait` so callers decide the transaction scope and
//tests can run against an in-memory database.
pub mod cart;
pub mod catalog;
pub mod images;
pub mod orders;
pub mod ratings;
pub mod stores;
pub mod wishlist;
