pub mod article;
pub mod episode;

pub use article::Article;
pub use episode::Episode;
