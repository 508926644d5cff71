use std::sync::Arc;

use awsnews_query::NewsTools;

pub struct AppState {
    pub tools: Arc<NewsTools>,
}

impl AppState {
    pub fn new(tools: NewsTools) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }
}
