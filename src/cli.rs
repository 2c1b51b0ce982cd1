use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "linkwatch", about = "Crawl a website and report on link health")]
pub struct Cli {
    /// Path to a TOML config file; CLI flags take precedence over its values
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl a site starting from a URL and report link health
    Crawl {
        /// Starting URL (prompted interactively if omitted)
        url: Option<String>,

        /// Follow links to other origins as well
        #[arg(long)]
        include_external: bool,

        /// Skip the post-crawl sitemap/orphan cross-reference
        #[arg(long)]
        no_orphans: bool,

        /// Absolute cap on completed fetches
        #[arg(long)]
        max_requests: Option<usize>,

        /// Absolute cap on HTML pages whose links are expanded
        #[arg(long)]
        max_pages: Option<usize>,

        /// Maximum link-following depth from the start URL
        #[arg(long)]
        max_depth: Option<u32>,

        /// Concurrent in-flight fetches
        #[arg(long)]
        max_workers: Option<usize>,

        /// Per-request timeout, in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Age in days after which Last-Modified is flagged stale
        #[arg(long)]
        outdated_days: Option<i64>,

        /// Maximum requests per second across all workers
        #[arg(long)]
        rate_limit: Option<f64>,

        /// Retries per request after a transport error or retryable status
        #[arg(long)]
        max_retries: Option<u32>,

        /// Exponential backoff base, in seconds
        #[arg(long)]
        backoff_factor: Option<f64>,

        /// User-Agent header sent with every request
        #[arg(long)]
        user_agent: Option<String>,

        /// Print the full CrawlResult as JSON instead of the human summary
        #[arg(long)]
        json: bool,

        /// Render the result directly in this format instead of printing a
        /// human summary (overrides --json)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Write the rendered result to this path (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert a previously saved crawl result into another format
    Export {
        /// Path to a JSON file containing a CrawlResult
        #[arg(short, long)]
        input: String,

        /// Output format
        #[arg(short, long, value_enum)]
        format: ExportFormat,

        /// Destination path
        #[arg(short, long)]
        output: String,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Sarif,
}
