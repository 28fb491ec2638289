//! Role entity.

mod model;

pub use model::{CreateRole, Role, UpdateRole};
