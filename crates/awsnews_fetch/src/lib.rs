pub mod extractor;
pub mod http;
pub mod jsonld;
pub mod upstream;

pub use extractor::{parse_article, ContentExtractor};
pub use http::{build_client, HttpPageFetcher};
pub use upstream::{parse_articles, AwsNewsClient};

pub mod prelude {
    pub use super::extractor::ContentExtractor;
    pub use super::upstream::AwsNewsClient;
    pub use awsnews_core::{ArticleRecord, Error, ExtractedArticle, Result};
}
