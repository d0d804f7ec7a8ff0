//! postsync - fetch, publish and react to posts from the command line

use std::io::{self, IsTerminal, Read};

use clap::{Parser, Subcommand};
use libpostsync::logging::LoggingConfig;
use libpostsync::{AuthToken, Config, PostData, PostId, PostSync, PostSyncError, PostsState, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "postsync")]
#[command(version, about = "Fetch, publish and react to posts from the command line")]
#[command(long_about = r#"Fetch, publish and react to posts from the command line.

Every command settles one request against the posts API and prints the
resulting post store. Commands that change a post first fetch the list so
the change is reconciled against current data.

EXAMPLES:
    # Show all posts
    postsync list

    # Show a single post
    postsync show 6d1e3c2a

    # Publish (content from argument or stdin)
    postsync --token "$JWT" publish "Hello world"
    echo "Hello from stdin" | postsync --token "$JWT" publish

    # Edit, delete, react
    postsync --token "$JWT" edit 6d1e3c2a "Fixed a typo"
    postsync --token "$JWT" delete 6d1e3c2a
    postsync --token "$JWT" like 6d1e3c2a

    # JSON output for scripting
    postsync list --format json | jq '.posts[].content'

EXIT CODES:
    0 - Success
    1 - Network failure, unexpected server response, or configuration error
    2 - Authorization rejected (HTTP 401/403)
    3 - Invalid input (empty content, missing token)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH", env = "POSTSYNC_CONFIG")]
    config: Option<String>,

    /// API base URL, overrides the configuration file
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Authorization value for commands that change posts
    #[arg(long, global = true, value_name = "TOKEN", env = "POSTSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all posts
    List,

    /// Fetch a single post
    Show {
        post_id: String,
    },

    /// Publish a new post (reads stdin if no content given)
    Publish {
        content: Option<String>,
    },

    /// Replace the content of a post
    Edit {
        post_id: String,
        content: String,
    },

    /// Delete a post
    Delete {
        post_id: String,
    },

    /// Like a post
    Like {
        post_id: String,
    },

    /// Dislike a post
    Dislike {
        post_id: String,
    },
}

impl Command {
    fn changes_posts(&self) -> bool {
        !matches!(self, Command::List | Command::Show { .. })
    }
}

/// Store snapshot as printed
#[derive(Serialize)]
struct SnapshotView<'a> {
    posts: &'a [libpostsync::Post],
    single_post: Option<&'a libpostsync::Post>,
    is_list_loading: bool,
    is_content_loading: bool,
    last_error: Option<String>,
}

impl<'a> From<&'a PostsState> for SnapshotView<'a> {
    fn from(state: &'a PostsState) -> Self {
        Self {
            posts: &state.posts,
            single_post: state.single_post.as_ref(),
            is_list_loading: state.is_list_loading,
            is_content_loading: state.is_content_loading,
            last_error: state.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    logging.verbose = cli.verbose;
    logging.init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let token = resolve_token(&cli)?;
    let content = resolve_content(&cli.command)?;
    let config = load_config(&cli)?;
    debug!(base_url = %config.api.base_url, "Loaded configuration");

    let sync = PostSync::from_config(&config)?;

    let synced = if cli.command.changes_posts() {
        sync.fetch_all().await.map(|_| ())
    } else {
        Ok(())
    };

    let outcome = match synced {
        Ok(()) => execute(&sync, &cli.command, token.as_ref(), content).await,
        Err(e) => Err(e.into()),
    };

    // The store is printed even when the command was rejected
    print_state(&sync.state(), &cli.format)?;
    outcome
}

async fn execute(
    sync: &PostSync,
    command: &Command,
    token: Option<&AuthToken>,
    content: Option<String>,
) -> Result<()> {
    let token = || {
        token.ok_or_else(|| {
            PostSyncError::InvalidInput(
                "this command requires --token or POSTSYNC_TOKEN".to_string(),
            )
        })
    };
    let content = || {
        content.clone().ok_or_else(|| {
            PostSyncError::InvalidInput("content cannot be empty".to_string())
        })
    };

    match command {
        Command::List => {
            sync.fetch_all().await?;
        }
        Command::Show { post_id } => {
            sync.fetch_one(&PostId::from(post_id.as_str())).await?;
        }
        Command::Publish { .. } => {
            sync.publish(content()?, token()?).await?;
        }
        Command::Edit { post_id, .. } => {
            sync.edit(&PostId::from(post_id.as_str()), PostData::new(content()?), token()?)
                .await?;
        }
        Command::Delete { post_id } => {
            sync.delete(&PostId::from(post_id.as_str()), token()?).await?;
        }
        Command::Like { post_id } => {
            sync.like(&PostId::from(post_id.as_str()), token()?).await?;
        }
        Command::Dislike { post_id } => {
            sync.dislike(&PostId::from(post_id.as_str()), token()?).await?;
        }
    }

    Ok(())
}

/// Require a token up front for commands that change posts
fn resolve_token(cli: &Cli) -> Result<Option<AuthToken>> {
    let token = cli
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(AuthToken::new);

    if cli.command.changes_posts() && token.is_none() {
        return Err(PostSyncError::InvalidInput(
            "this command requires --token or POSTSYNC_TOKEN".to_string(),
        ));
    }
    Ok(token)
}

/// Content for publish/edit, from the argument or stdin
///
/// Blank content is refused; anything else is sent as given.
fn resolve_content(command: &Command) -> Result<Option<String>> {
    let content = match command {
        Command::Publish { content: Some(content) } => content.clone(),
        Command::Publish { content: None } => read_stdin()?,
        Command::Edit { content, .. } => content.clone(),
        _ => return Ok(None),
    };

    if content.trim().is_empty() {
        return Err(PostSyncError::InvalidInput("content cannot be empty".to_string()));
    }
    Ok(Some(content))
}

fn read_stdin() -> Result<String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(PostSyncError::InvalidInput(
            "no content given and stdin is a terminal".to_string(),
        ));
    }

    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(|e| PostSyncError::InvalidInput(format!("failed to read stdin: {}", e)))?;
    Ok(buffer)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::resolve(cli.config.as_deref())?;

    // Flags override the file and environment before anything is validated
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_state(state: &PostsState, format: &str) -> Result<()> {
    let view = SnapshotView::from(state);

    if format == "json" {
        let json = serde_json::to_string_pretty(&view)
            .map_err(|e| PostSyncError::Output(format!("failed to serialize store: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if let Some(post) = view.single_post {
        println!("{}", format_post(post));
        if !view.posts.is_empty() {
            println!();
        }
    }
    for post in view.posts {
        println!("{}", format_post(post));
    }
    if let Some(error) = view.last_error {
        println!("last error: {}", error);
    }
    Ok(())
}

fn format_post(post: &libpostsync::Post) -> String {
    let author = post.username.as_deref().unwrap_or("-");
    format!(
        "{}\t{}\t+{} -{}\t{}",
        post.id,
        author,
        post.likes.like_count,
        post.likes.disliked_by.len(),
        post.content.replace('\n', " ")
    )
}
