pub mod criteria;
pub mod engine;
pub mod tools;

pub use criteria::{DateWindow, FilterCriteria};
pub use engine::{categories, query};
pub use tools::{
    ArticleContentResponse, ArticleListResponse, CategoriesResponse, FiltersApplied, NewsTools,
};

pub mod prelude {
    pub use super::criteria::{DateWindow, FilterCriteria};
    pub use super::tools::NewsTools;
    pub use awsnews_core::{Error, PostTypeFilter, Result};
}
