use awsnews_core::config::{HumanDuration, ServiceConfig, DEFAULT_ALLOWED_DOMAIN, DEFAULT_API_URL};
use awsnews_core::logging::init_logging;
use awsnews_core::Result;
use awsnews_query::tools::defaults;
use awsnews_query::NewsTools;
use awsnews_web::{create_app, AppState};
use clap::Parser;
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Query AWS news and blog posts", long_about = None)]
pub struct Cli {
    /// Article index endpoint
    #[arg(long, global = true, env = "AWSNEWS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Only pages on this domain (or its subdomains) are fetched for content
    #[arg(long, global = true, env = "AWSNEWS_ALLOWED_DOMAIN", default_value = DEFAULT_ALLOWED_DOMAIN)]
    allowed_domain: String,
    /// How long an index snapshot is reused (e.g. 300, 5m, 1h)
    #[arg(long, global = true, env = "AWSNEWS_CACHE_TTL", default_value = "5m")]
    cache_ttl: HumanDuration,
    /// Per-request HTTP timeout
    #[arg(long, global = true, env = "AWSNEWS_TIMEOUT", default_value = "30s")]
    timeout: HumanDuration,
    #[arg(long, global = true, env = "AWSNEWS_LOG_LEVEL", default_value = "info")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the tools over HTTP
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 8807)]
        port: u16,
    },
    /// Posts published today
    Today {
        #[arg(long = "type", default_value = defaults::POST_TYPE)]
        post_type: String,
        #[arg(long, default_value_t = defaults::TODAY_LIMIT)]
        limit: i64,
    },
    /// Posts in a date range, or the last week when no range is given
    ByDate {
        #[arg(long)]
        from_date: Option<String>,
        #[arg(long)]
        to_date: Option<String>,
        #[arg(long)]
        days_back: Option<i64>,
        #[arg(long = "type", default_value = defaults::POST_TYPE)]
        post_type: String,
        #[arg(long, default_value_t = defaults::BY_DATE_LIMIT)]
        limit: i64,
    },
    /// Posts in one category (exact, case-sensitive name)
    Category {
        category: String,
        #[arg(long = "type", default_value = defaults::POST_TYPE)]
        post_type: String,
        #[arg(long, default_value_t = defaults::CATEGORY_DAYS_BACK)]
        days_back: i64,
        #[arg(long, default_value_t = defaults::CATEGORY_LIMIT)]
        limit: i64,
    },
    /// Case-insensitive search over titles, urls and slugs
    Search {
        query: String,
        #[arg(long = "type", default_value = defaults::POST_TYPE)]
        post_type: String,
        #[arg(long, default_value_t = defaults::SEARCH_DAYS_BACK)]
        days_back: i64,
        #[arg(long, default_value_t = defaults::SEARCH_LIMIT)]
        limit: i64,
    },
    /// Every category in the index
    Categories,
    Latest {
        #[arg(long = "type", default_value = defaults::POST_TYPE)]
        post_type: String,
        #[arg(long, default_value_t = defaults::LATEST_LIMIT)]
        limit: i64,
        #[arg(long, default_value_t = defaults::LATEST_DAYS_BACK)]
        days_back: i64,
    },
    Popular {
        #[arg(long = "type", default_value = defaults::POST_TYPE)]
        post_type: String,
        #[arg(long, default_value_t = defaults::POPULAR_DAYS_BACK)]
        days_back: i64,
        #[arg(long, default_value_t = defaults::POPULAR_LIMIT)]
        limit: i64,
    },
    /// Readable text of one article page
    Content { url: String },
}

impl Cli {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default()
            .with_api_url(self.api_url.clone())
            .with_allowed_domain(self.allowed_domain.clone())
            .with_cache_ttl(self.cache_ttl.into())
            .with_request_timeout(self.timeout.into())
    }
}

fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let logger = init_logging(cli.log_level).with_prefix("awsnews");

    let config = cli.service_config();
    let tools = NewsTools::from_config(&config)?;
    logger.debug(&format!(
        "Using {} (cache ttl {}s)",
        config.api_url,
        config.cache_ttl.as_secs()
    ));

    match cli.command {
        Commands::Serve { host, port } => {
            let app = create_app(AppState::new(tools)).await;
            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            info!("🌐 Listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Commands::Today { post_type, limit } => {
            print_json(&tools.get_todays_posts(&post_type, limit).await?)?;
        }
        Commands::ByDate {
            from_date,
            to_date,
            days_back,
            post_type,
            limit,
        } => {
            let response = tools
                .get_posts_by_date(
                    from_date.as_deref(),
                    to_date.as_deref(),
                    days_back,
                    &post_type,
                    limit,
                )
                .await?;
            print_json(&response)?;
        }
        Commands::Category {
            category,
            post_type,
            days_back,
            limit,
        } => {
            let response = tools
                .get_posts_by_category(&category, &post_type, days_back, limit)
                .await?;
            print_json(&response)?;
        }
        Commands::Search {
            query,
            post_type,
            days_back,
            limit,
        } => {
            print_json(&tools.search_posts(&query, &post_type, days_back, limit).await?)?;
        }
        Commands::Categories => {
            print_json(&tools.get_categories().await?)?;
        }
        Commands::Latest {
            post_type,
            limit,
            days_back,
        } => {
            print_json(&tools.get_latest_posts(&post_type, limit, days_back).await?)?;
        }
        Commands::Popular {
            post_type,
            days_back,
            limit,
        } => {
            print_json(&tools.get_popular_posts(&post_type, days_back, limit).await?)?;
        }
        Commands::Content { url } => {
            print_json(&tools.get_article_content(&url).await?)?;
        }
    }

    Ok(())
}
