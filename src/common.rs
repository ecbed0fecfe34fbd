pub mod error;
pub mod filenames;
pub mod lenient;
