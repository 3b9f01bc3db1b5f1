use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use soundwave::config::{default_session_path, DEFAULT_TOP_K, DEFAULT_TOP_N};
use soundwave::source::demo_catalog;
use soundwave::{
    AuthContext, ClientConfig, DashboardPage, DashboardSection, LikedPage, LoginMode, MemorySource,
    MusicApi, PageContext, PageOutcome, RecommendationSource, RouteStyle, Screen, SearchPage,
    SessionStore, TrackSource,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soundwave-cli")]
#[command(about = "CLI for Soundwave - music discovery", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "SOUNDWAVE_API_URL", default_value = soundwave::config::DEFAULT_BASE_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "SOUNDWAVE_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,

    /// File holding the persisted session
    #[arg(long, env = "SOUNDWAVE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Backend path layout
    #[arg(long, env = "SOUNDWAVE_ROUTES", value_enum, default_value_t = Routes::UserScoped)]
    routes: Routes,

    /// How login establishes a session
    #[arg(long, env = "SOUNDWAVE_LOGIN_MODE", value_enum, default_value_t = Login::Remote)]
    login_mode: Login,

    /// Use model-based recommendations instead of collaborative ones
    #[arg(long)]
    model_recommendations: bool,

    /// Number of recommendations to ask for
    #[arg(long)]
    top: Option<u32>,

    /// Serve a built-in demo catalog instead of calling the backend
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Routes {
    Legacy,
    UserScoped,
}

impl From<Routes> for RouteStyle {
    fn from(r: Routes) -> Self {
        match r {
            Routes::Legacy => RouteStyle::Legacy,
            Routes::UserScoped => RouteStyle::UserScoped,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Login {
    Local,
    Remote,
}

impl From<Login> for LoginMode {
    fn from(l: Login) -> Self {
        match l {
            Login::Local => LoginMode::Local,
            Login::Remote => LoginMode::Remote,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a username
    Login { username: String },
    /// Log out and forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show recommendations and the catalog sample
    Dashboard,
    /// Show the catalog sample
    Songs,
    /// Show recommendations
    Recommended,
    /// Search by title or artist
    Search { query: String },
    /// Show liked songs
    Liked,
    /// Like a track
    Like { id: String },
    /// Remove a like
    Unlike { id: String },
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let recommendations = if self.model_recommendations {
            RecommendationSource::Model {
                top_k: self.top.unwrap_or(DEFAULT_TOP_K),
            }
        } else {
            RecommendationSource::Collaborative {
                top_n: self.top.unwrap_or(DEFAULT_TOP_N),
            }
        };

        ClientConfig::new(&self.api_url)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_routes(self.routes.into())
            .with_login_mode(if self.mock {
                LoginMode::Local
            } else {
                self.login_mode.into()
            })
            .with_recommendations(recommendations)
            .with_session_path(
                self.session_file
                    .clone()
                    .unwrap_or_else(default_session_path),
            )
    }
}

/// Print a page outcome that is not `Ready`. Returns whether to render.
fn report(outcome: PageOutcome) -> bool {
    match outcome {
        PageOutcome::Ready => true,
        PageOutcome::Redirect(Screen::Login) => {
            eprintln!("Please log in first: soundwave-cli login <username>");
            false
        }
        PageOutcome::Redirect(_) => false,
        PageOutcome::Failed(message) => {
            eprintln!("{}", message);
            false
        }
        PageOutcome::Cancelled => false,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soundwave=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let mut auth = AuthContext::restore(SessionStore::new(&config.session_path), config.login_mode)?;

    let source: Arc<dyn TrackSource> = if cli.mock {
        let memory = MemorySource::new(demo_catalog());
        if let Some(session) = auth.session() {
            memory.add_user(session.username(), ["s1", "s5"]).await;
        }
        Arc::new(memory)
    } else {
        Arc::new(MusicApi::new(config.clone())?)
    };
    let ctx = PageContext::new(source.clone());

    match &cli.command {
        Commands::Login { username } => match auth.login(source.as_ref(), username).await {
            Ok(reply) => {
                if reply.message.is_empty() {
                    println!("Logged in as {}", username.trim());
                } else {
                    println!("{}", reply.message);
                }
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                eprintln!("{}", e.user_message());
            }
        },
        Commands::Logout => {
            auth.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => match auth.session() {
            Some(session) => println!("{}", session.username()),
            None => println!("Not logged in"),
        },
        Commands::Dashboard | Commands::Songs | Commands::Recommended => {
            let mut page = DashboardPage::new(ctx);
            if report(page.load(&auth).await) {
                match &cli.command {
                    Commands::Songs => print!(
                        "{}",
                        soundwave::view::render_list(
                            "All Songs",
                            page.section(DashboardSection::All),
                            soundwave::view::EMPTY_MESSAGE,
                        )
                    ),
                    Commands::Recommended => print!(
                        "{}",
                        soundwave::view::render_list(
                            "Recommended for You",
                            page.section(DashboardSection::Recommended),
                            "No recommendations yet.",
                        )
                    ),
                    _ => print!("{}", page.render()),
                }
            }
        }
        Commands::Search { query } => {
            let mut page = SearchPage::new(ctx);
            if report(page.search(&auth, query).await) {
                print!("{}", page.render());
            }
        }
        Commands::Liked => {
            let mut page = LikedPage::new(ctx);
            if report(page.load(&auth).await) {
                print!("{}", page.render());
            }
        }
        Commands::Like { id } | Commands::Unlike { id } => {
            let Some(session) = auth.session() else {
                report(PageOutcome::Redirect(Screen::Login));
                return Ok(());
            };
            let like = matches!(cli.command, Commands::Like { .. });
            let result = if like {
                source.like(id, session).await
            } else {
                source.unlike(id, session).await
            };
            match result {
                Ok(()) => println!("{} {}", if like { "Liked" } else { "Unliked" }, id),
                Err(e) => {
                    tracing::error!("Like update failed: {}", e);
                    eprintln!("{}", e.user_message());
                }
            }
        }
    }

    Ok(())
}
