pub mod popularity;

pub use popularity::merge_popular_recipes;
