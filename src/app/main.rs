/**
 * Epilink Command-Line Entry Point
 *
 * Drives the client library from the terminal. Every protected command goes
 * through the navigation layer first, so a missing or expired session ends
 * with a login prompt instead of a request.
 */
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use epilink::app::guard::Screen;
use epilink::app::messaging::MessageThread;
use epilink::app::session::FileTokenVault;
use epilink::app::{auth, social, ApiClient, AppState, Config, SessionStore};

#[derive(Parser)]
#[command(name = "epilink")]
#[command(about = "Feed, messages and notifications from the terminal", long_about = None)]
struct Cli {
    /// TOML configuration file (environment variables fill the gaps)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the provider consent URL to open in a browser
    Login { provider: String },
    /// Finish login with the redirect URL or the bare token
    Callback { url: String },
    /// Forget the stored session
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Show the feed
    Feed,
    /// List conversations
    Conversations,
    /// Show a conversation's messages
    Thread { conversation_id: String },
    /// Send a message to a conversation
    Send {
        conversation_id: String,
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// List notifications
    Notifications,
    /// Mark a notification as read
    Read { id: String },
    /// Publish a post
    Post { title: String, content: String },
    /// Show a post with its comments
    ShowPost { id: String },
    /// Comment on a post
    Comment { post_id: String, content: String },
    Follow { user_id: String },
    Unfollow { user_id: String },
    SearchUsers { query: String },
    SearchPosts { query: String },
}

impl Commands {
    /// Screen the command stands in for
    fn screen(&self) -> Screen {
        match self {
            Commands::Login { .. } | Commands::Logout => Screen::Login,
            Commands::Callback { .. } => Screen::LoginCallback,
            Commands::Whoami | Commands::Follow { .. } | Commands::Unfollow { .. } => Screen::Profile,
            Commands::Feed => Screen::Feed,
            Commands::Conversations | Commands::Thread { .. } | Commands::Send { .. } => {
                Screen::Messages
            }
            Commands::Notifications | Commands::Read { .. } => Screen::Notifications,
            Commands::Post { .. } => Screen::MakePost,
            Commands::ShowPost { id } | Commands::Comment { post_id: id, .. } => {
                Screen::Post(id.clone())
            }
            Commands::SearchUsers { .. } | Commands::SearchPosts { .. } => Screen::Explore,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    tracing::debug!(server = %config.server_url(), "[STARTUP] Configuration resolved");

    let session = SessionStore::open(FileTokenVault::new(config.token_path()));
    let mut state = AppState::new(ApiClient::new(config, session)?);

    let screen = cli.command.screen();
    if screen.requires_session() && state.navigate(screen) == &Screen::Login {
        login_required();
    }

    if let Err(e) = run(cli.command, &mut state).await {
        tracing::error!("[STARTUP] Command failed: {}", e);
        state.poll_session_events();
        if state.current_screen() == &Screen::Login && state.pending_screen().is_some() {
            login_required();
        }
        return Err(e);
    }
    Ok(())
}

fn login_required() -> ! {
    eprintln!("Not signed in. Please log in: epilink login <provider>");
    std::process::exit(1);
}

async fn run(command: Commands, state: &mut AppState) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Login { provider } => {
            let url = auth::begin_login(&state.client, &provider).await?;
            println!("Open this URL to sign in:\n{}", url);
        }
        Commands::Callback { url } => {
            state.complete_login(&url)?;
            let me = state.resolve_identity().await?;
            println!("Signed in as {}", me.display_name);
        }
        Commands::Logout => {
            state.logout();
            println!("Signed out");
        }
        Commands::Whoami => {
            let me = state.resolve_identity().await?;
            println!("{} ({})", me.display_name, me.id);
            if let Some(email) = &me.email {
                println!("  {}", email);
            }
            println!(
                "  {} followers, {} following",
                me.follower_count(),
                me.following_count()
            );
        }
        Commands::Feed => {
            for post in social::load_feed(&state.client).await? {
                println!("[{}] {}\n    {}", post.id, post.title, post.content);
            }
        }
        Commands::Conversations => {
            state.open_messages().await?;
            for conversation in state.messaging.directory.conversations() {
                println!(
                    "[{}] {}: {}",
                    conversation.id,
                    conversation.participant.username,
                    conversation.last_message_preview()
                );
            }
        }
        Commands::Thread { conversation_id } => {
            let me = state.resolve_identity().await?;
            state.open_messages().await?;
            state.messaging.select(&conversation_id).await?;
            for message in state.messaging.thread.messages() {
                let who = if MessageThread::is_own(&message, &me) {
                    "me"
                } else {
                    message.sender_id.as_str()
                };
                println!("{} {}: {}", message.timestamp, who, message.content);
            }
        }
        Commands::Send {
            conversation_id,
            content,
        } => {
            state.open_messages().await?;
            state.messaging.select(&conversation_id).await?;
            state.messaging.thread.set_draft(content.join(" "));
            let message = state.messaging.send_draft().await?;
            println!("Sent {}", message.id);
        }
        Commands::Notifications => {
            for notification in state.notifications.load().await? {
                let marker = if notification.read { " " } else { "*" };
                println!(
                    "{} [{}] {:?}: {}",
                    marker, notification.id, notification.kind, notification.message
                );
            }
        }
        Commands::Read { id } => {
            state.notifications.load().await?;
            state.notifications.mark_read(&id).await?;
            println!("{} unread", state.notifications.unread_count());
        }
        Commands::Post { title, content } => {
            let post = social::create_post(&state.client, &title, &content).await?;
            println!("Posted {}", post.id);
        }
        Commands::ShowPost { id } => {
            let (post, comments) = social::load_post_with_comments(&state.client, &id).await?;
            println!("{}\n\n{}\n", post.title, post.content);
            for comment in comments {
                println!("  {}: {}", comment.author_id, comment.content);
            }
        }
        Commands::Comment { post_id, content } => {
            let comment = social::create_comment(&state.client, &post_id, &content).await?;
            println!("Commented {}", comment.id);
        }
        Commands::Follow { user_id } => {
            social::follow(&state.client, &user_id).await?;
            println!("Following {}", user_id);
        }
        Commands::Unfollow { user_id } => {
            social::unfollow(&state.client, &user_id).await?;
            println!("Unfollowed {}", user_id);
        }
        Commands::SearchUsers { query } => {
            for user in social::search_users(&state.client, &query).await? {
                println!("[{}] {}", user.id, user.display_name);
            }
        }
        Commands::SearchPosts { query } => {
            for post in social::search_posts(&state.client, &query).await? {
                println!("[{}] {}", post.id, post.title);
            }
        }
    }
    Ok(())
}
