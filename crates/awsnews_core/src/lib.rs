pub mod config;
pub mod error;
pub mod logging;
pub mod source;
pub mod types;

pub use config::{HumanDuration, ServiceConfig};
pub use error::Error;
pub use source::{ArticleSource, Clock, ManualClock, PageFetcher, SystemClock};
pub use types::{ArticleRecord, ArticleSummary, ExtractedArticle, PostType, PostTypeFilter};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::source::{ArticleSource, Clock, PageFetcher};
    pub use super::types::{ArticleRecord, ExtractedArticle, PostType, PostTypeFilter};
    pub use super::{Error, Result};
}
