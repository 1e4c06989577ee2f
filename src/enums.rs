//! Small closed-set enums shared across the crate.

mod update_type;

pub use update_type::UpdateType;
