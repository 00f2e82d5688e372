//! `blogstore` command-line entry point.
//!
//! # Responsibility
//! - Open the configured store and drive `BlogService` one call per run.
//! - Print results as JSON on stdout so output can be piped to `jq`.
//!
//! Configuration comes from the environment, with `.env` loaded first:
//! `BLOGSTORE_DATABASE_URL`, `BLOGSTORE_LOG_LEVEL`, `BLOGSTORE_LOG_DIR`.

use anyhow::{anyhow, Context, Result};
use blogstore_core::{
    init_logging_with, parse_id, parse_tag_names, BlogService, LogConfig, Paging,
    PostCreateInput, PostFilter, PostListQuery, PostUpdateInput, Store, StoreConfig,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::json;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blogstore", version, about = "Blog post and tag store")]
struct Cli {
    /// Overrides BLOGSTORE_DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core linkage and store connectivity
    Ping,
    /// Tag operations
    #[command(subcommand)]
    Tags(TagCommand),
    /// Post operations
    #[command(subcommand)]
    Posts(PostCommand),
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    /// Count tags whose name contains SEARCH
    Count(SearchArgs),
    /// List one page of tags
    List(TagListArgs),
    /// Create a tag
    Create { name: String },
    /// Rename a tag
    Rename { id: String, name: String },
    /// Remove a tag and detach it from posts
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum PostCommand {
    /// Count posts matching the filter
    Count(PostFilterArgs),
    /// List one page of posts
    List(PostListArgs),
    /// Fetch one post by id or slug
    Get(PostGetArgs),
    /// Create a post from a JSON document (file or stdin)
    Create(JsonInputArgs),
    /// Replace a post from a JSON document (file or stdin)
    Update(JsonInputArgs),
    /// Remove a post and its tag associations
    Remove { id: String },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Case-insensitive substring
    #[arg(long, short, default_value = "")]
    search: String,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Page size, clamped to 10..=50
    #[arg(long, short, default_value = "10", allow_hyphen_values = true)]
    limit: String,

    /// 1-based page number; values below 1 mean 1
    #[arg(long, short, default_value = "1", allow_hyphen_values = true)]
    page: String,
}

#[derive(Args, Debug)]
struct TagListArgs {
    #[command(flatten)]
    search: SearchArgs,

    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct PostFilterArgs {
    /// Case-insensitive title substring
    #[arg(long, short, default_value = "")]
    search: String,

    /// `;`-separated tag names; posts must carry all of them
    #[arg(long, short, default_value = "")]
    tags: String,
}

#[derive(Args, Debug)]
struct PostListArgs {
    #[command(flatten)]
    filter: PostFilterArgs,

    #[command(flatten)]
    page: PageArgs,

    /// Include post content
    #[arg(long)]
    content: bool,
}

#[derive(Args, Debug)]
struct PostGetArgs {
    /// Post id
    #[arg(long, conflicts_with = "slug", required_unless_present = "slug")]
    id: Option<String>,

    /// Post slug
    #[arg(long)]
    slug: Option<String>,
}

#[derive(Args, Debug)]
struct JsonInputArgs {
    /// JSON file; reads stdin when omitted
    #[arg(long, short)]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging_with(&LogConfig::from_env()).map_err(|err| anyhow!(err))?;

    let config = match &cli.database_url {
        Some(url) => StoreConfig::new(url.as_str()),
        None => StoreConfig::from_env(),
    };
    let store = Store::open(&config).context("failed to open blog store")?;
    info!(
        "event=cli_start module=cli status=ok location={}",
        store.location()
    );

    let output = run(&store, cli.command)?;
    print_json(&output, cli.pretty)?;

    store.close().context("failed to close blog store")?;
    Ok(())
}

fn run(store: &Store, command: Command) -> Result<serde_json::Value> {
    let service = BlogService::new(store);
    let value = match command {
        Command::Ping => json!({
            "ping": blogstore_core::ping(),
            "version": blogstore_core::core_version(),
            "location": store.location(),
        }),
        Command::Tags(command) => run_tags(&service, command)?,
        Command::Posts(command) => run_posts(&service, command)?,
    };
    Ok(value)
}

fn run_tags(service: &BlogService<'_>, command: TagCommand) -> Result<serde_json::Value> {
    let value = match command {
        TagCommand::Count(args) => json!({ "count": service.tag_count(&args.search)? }),
        TagCommand::List(args) => {
            let paging = Paging::parse(&args.page.limit, &args.page.page)?;
            serde_json::to_value(service.tag_list(&args.search.search, paging)?)?
        }
        TagCommand::Create { name } => serde_json::to_value(service.tag_create(&name)?)?,
        TagCommand::Rename { id, name } => {
            serde_json::to_value(service.tag_update(parse_id(&id)?, &name)?)?
        }
        TagCommand::Remove { id } => json!({ "id": service.tag_remove(parse_id(&id)?)? }),
    };
    Ok(value)
}

fn run_posts(service: &BlogService<'_>, command: PostCommand) -> Result<serde_json::Value> {
    let value = match command {
        PostCommand::Count(args) => {
            let filter = PostFilter::new(args.search, parse_tag_names(&args.tags));
            json!({ "count": service.post_count(&filter)? })
        }
        PostCommand::List(args) => {
            let query = PostListQuery::parse(
                &args.filter.search,
                &args.filter.tags,
                &args.page.limit,
                &args.page.page,
            )?;
            if args.content {
                serde_json::to_value(service.post_list_with_content(&query)?)?
            } else {
                serde_json::to_value(service.post_list(&query)?)?
            }
        }
        PostCommand::Get(args) => {
            let post = match (args.id, args.slug) {
                (Some(id), _) => service.post_get(parse_id(&id)?)?,
                (None, Some(slug)) => service.post_get_by_slug(&slug)?,
                (None, None) => return Err(anyhow!("either --id or --slug is required")),
            };
            serde_json::to_value(post)?
        }
        PostCommand::Create(args) => {
            let input: PostCreateInput = read_json_input(&args)?;
            serde_json::to_value(service.post_create(&input)?)?
        }
        PostCommand::Update(args) => {
            let input: PostUpdateInput = read_json_input(&args)?;
            serde_json::to_value(service.post_update(&input)?)?
        }
        PostCommand::Remove { id } => json!({ "id": service.post_remove(parse_id(&id)?)? }),
    };
    Ok(value)
}

fn read_json_input<T: serde::de::DeserializeOwned>(args: &JsonInputArgs) -> Result<T> {
    let raw = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("invalid post JSON")
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
