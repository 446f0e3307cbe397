//! Data models for Quartermaster

pub mod access;
pub mod enums;
pub mod event;
pub mod item;
pub mod request;
pub mod responsibility;
pub mod user;

// Re-export commonly used types
pub use access::{Capability, Principal};
pub use enums::{EventStatus, ItemStatus, RequestKind, Role};
pub use event::Event;
pub use item::Item;
pub use request::{Request, RequestDetails};
pub use responsibility::Responsibility;
pub use user::{User, UserSummary};
