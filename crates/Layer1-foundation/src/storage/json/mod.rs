mod store;

pub use store::{load_file, JsonStore};
