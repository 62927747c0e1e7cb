pub mod pagination;
pub mod record;
pub mod summary;
pub mod value;
