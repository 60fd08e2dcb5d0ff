//! A3S SERP CLI - Google result links from the command line.

use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use a3s_serp::{
    proxy::ProxyConfig,
    user_agent::{FixedUserAgent, RandomUserAgent},
    HttpFetcher, ResultPaginator, SafeSearch, SearchRequest, SearchType,
};

/// A3S SERP - Paginated Google result links
#[derive(Parser)]
#[command(name = "a3s-serp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print result links for a query
    Search(SearchArgs),

    /// Print only the first result link
    Lucky(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Search query
    query: String,

    /// Top level domain of the Google host
    #[arg(long, default_value = "com")]
    tld: String,

    /// Interface language
    #[arg(long, default_value = "en")]
    lang: String,

    /// Raw time filter (e.g. qdr:d for the last day)
    #[arg(long, default_value = "0")]
    tbs: String,

    /// Safe search level
    #[arg(long, default_value = "off")]
    safe: SafeArg,

    /// Result vertical
    #[arg(long = "type", default_value = "web")]
    search_type: TypeArg,

    /// Only keep main organic results
    #[arg(long)]
    only_standard: bool,

    /// Extra GET parameter as name=value (repeatable, value URL-encoded)
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Proxy URL (e.g., http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
    #[arg(short, long)]
    proxy: Option<String>,

    /// User-Agent header to send
    #[arg(long, conflicts_with = "random_user_agent")]
    user_agent: Option<String>,

    /// Pick a random browser User-Agent for every request
    #[arg(long)]
    random_user_agent: bool,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Results per page
    #[arg(short, long, default_value = "10")]
    num: u32,

    /// Offset of the first result
    #[arg(long, default_value = "0")]
    start: u32,

    /// Offset at which to stop
    #[arg(long, default_value = "10")]
    stop: u32,

    /// Seconds to wait between page requests
    #[arg(long, default_value = "2.0")]
    pause: f64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum SafeArg {
    Off,
    Active,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Web,
    Images,
    News,
    Videos,
    Shopping,
    Books,
    Apps,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One numbered link per line
    Text,
    /// JSON array of links
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Lucky(args) => run_lucky(args).await,
    }
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let paginator = build_paginator(&args.query)?;
    let request = build_request(&args.query)
        .with_num(args.num)
        .with_start(args.start)
        .with_stop(args.stop)
        .with_pause(Duration::try_from_secs_f64(args.pause)?);

    let mut links = paginator.search(request)?;

    match args.format {
        OutputFormat::Text => {
            let mut count = 0;
            while let Some(link) = links.try_next().await? {
                count += 1;
                println!("{}. {}", count, link);
            }
            if count == 0 {
                eprintln!("No results for \"{}\"", args.query.query);
            }
        }
        OutputFormat::Json => {
            let all: Vec<String> = links.try_collect().await?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }

    Ok(())
}

async fn run_lucky(args: QueryArgs) -> Result<()> {
    let paginator = build_paginator(&args)?;
    let link = paginator.lucky(build_request(&args)).await?;
    println!("{}", link);
    Ok(())
}

fn build_paginator(args: &QueryArgs) -> Result<ResultPaginator> {
    let mut builder = HttpFetcher::builder();

    if args.random_user_agent {
        builder = builder.user_agent(RandomUserAgent::builtin());
    } else if let Some(agent) = &args.user_agent {
        builder = builder.user_agent(FixedUserAgent::new(agent));
    }

    if let Some(proxy_url) = &args.proxy {
        let proxy: ProxyConfig = proxy_url.parse()?;
        eprintln!("Using proxy: {}", proxy);
        builder = builder.proxy(proxy);
    }

    Ok(ResultPaginator::new(builder.build()?))
}

fn build_request(args: &QueryArgs) -> SearchRequest {
    let safe = match args.safe {
        SafeArg::Off => SafeSearch::Off,
        SafeArg::Active => SafeSearch::Active,
    };
    let search_type = match args.search_type {
        TypeArg::Web => SearchType::Web,
        TypeArg::Images => SearchType::Images,
        TypeArg::News => SearchType::News,
        TypeArg::Videos => SearchType::Videos,
        TypeArg::Shopping => SearchType::Shopping,
        TypeArg::Books => SearchType::Books,
        TypeArg::Apps => SearchType::Apps,
    };

    let mut request = SearchRequest::new(&args.query)
        .with_tld(&args.tld)
        .with_language(&args.lang)
        .with_tbs(&args.tbs)
        .with_safesearch(safe)
        .with_type(search_type)
        .with_only_standard(args.only_standard);
    for (name, value) in &args.params {
        request = request.with_extra_param(name, value);
    }
    request
}

fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("empty parameter name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}
