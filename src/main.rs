use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nexora::{
    AppState, Config, FeedError,
    models::{
        account::SignInRequest, comment::CommentId, feed::FeedPage, post::PostId,
        session::Session,
    },
    services::{
        auth,
        feed::FeedSource,
        mutations::{AlwaysConfirm, Confirmation},
        session::SessionGate,
        view::FeedView,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Answer yes to every confirmation prompt.
    #[arg(long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in; the password is read from NEXORA_PASSWORD.
    Login { email: String },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Show the global feed (latest page unless --page is given).
    Feed {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show your own posts.
    Mine,
    /// Show one post with its comments.
    Post { id: String },
    /// Comment on a post.
    Comment { post: String, body: String },
    /// Delete one of your comments.
    DeleteComment { post: String, comment: String },
    /// Delete one of your posts.
    DeletePost { post: String },
}

/// Asks on the terminal.
struct PromptConfirm;

impl Confirmation for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

fn print_page(page: &FeedPage, session: Option<&Session>) {
    println!("Page {}/{}", page.current_page, page.total_pages);
    for post in &page.posts {
        let mine = nexora::services::session::is_owner(post, session);
        println!(
            "\n[{}]{} {} ({})",
            post.id,
            if mine { " (you)" } else { "" },
            post.user.name,
            post.created_at.format("%b %d %H:%M")
        );
        println!("  {}", post.body);
        if let Some(image) = &post.image {
            println!("  image: {}", image);
        }
        for comment in post.comments_newest_first() {
            println!("    - [{}] {}: {}", comment.id, comment.creator.name, comment.content);
        }
    }
}

async fn show(state: &AppState, source: FeedSource) -> anyhow::Result<()> {
    let view = FeedView::new(state, source, Arc::new(AlwaysConfirm));
    view.activate().await?;
    let session = SessionGate::new(state.sessions.clone()).get_session().await;
    print_page(&view.page().await, session.as_ref());
    Ok(())
}

async fn run(state: &AppState, args: Args) -> anyhow::Result<()> {
    let confirmation: Arc<dyn Confirmation> = if args.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(PromptConfirm)
    };

    match args.command {
        Command::Login { email } => {
            let password = std::env::var("NEXORA_PASSWORD")
                .map_err(|_| anyhow::anyhow!("NEXORA_PASSWORD must be set"))?;
            let session = auth::sign_in(state, SignInRequest { email, password }).await?;
            println!("Signed in as {}", session.subject());
        }
        Command::Logout => auth::sign_out(state).await?,
        Command::Whoami => {
            let session = SessionGate::new(state.sessions.clone())
                .require_session()
                .await?;
            let profile = auth::profile(state, &session).await?;
            println!("{} <{}> ({})", profile.name, profile.email, profile.id);
        }
        Command::Feed { page: None } => show(state, FeedSource::Latest).await?,
        Command::Feed { page: Some(page) } => {
            let view = FeedView::new(state, FeedSource::Latest, confirmation);
            view.activate().await?;
            if page != view.page().await.current_page {
                view.go_to_page(page).await?;
            }
            let session = SessionGate::new(state.sessions.clone()).get_session().await;
            print_page(&view.page().await, session.as_ref());
        }
        Command::Mine => show(state, FeedSource::Own).await?,
        Command::Post { id } => show(state, FeedSource::Single(PostId::new(id))).await?,
        Command::Comment { post, body } => {
            let post = PostId::new(post);
            let view = FeedView::new(state, FeedSource::Single(post.clone()), confirmation);
            view.activate().await?;
            let outcome = view.create_comment(&post, &body).await?;
            println!("{:?}", outcome);
        }
        Command::DeleteComment { post, comment } => {
            let post = PostId::new(post);
            let view = FeedView::new(state, FeedSource::Single(post.clone()), confirmation);
            view.activate().await?;
            let outcome = view
                .delete_comment(&CommentId::confirmed(comment), &post)
                .await?;
            println!("{:?}", outcome);
        }
        Command::DeletePost { post } => {
            let post = PostId::new(post);
            let view = FeedView::new(state, FeedSource::Single(post.clone()), confirmation);
            view.activate().await?;
            println!("{:?}", view.delete_post(&post).await?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config);
    let args = Args::parse();

    match run(&state, args).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<FeedError>() {
            Some(err) if err.redirect().is_some() => {
                eprintln!("Not signed in. Run `nexora login <email>` first.");
                std::process::exit(2);
            }
            Some(err) => {
                eprintln!("{}", err.user_message().unwrap_or_else(|| err.to_string()));
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}
