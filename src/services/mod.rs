pub mod catalog;
pub mod classifier;
pub mod emotion_genres;
pub mod providers;
pub mod recommendations;

pub use catalog::{MovieCatalog, Selection};
pub use classifier::EmotionClassifier;
pub use emotion_genres::EmotionGenreMap;
pub use providers::{MovieStore, PosterProvider};
pub use recommendations::RecommendLimits;
