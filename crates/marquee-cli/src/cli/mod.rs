//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use marquee_core::config::Config;
use marquee_core::logging;
use marquee_core::types::MovieId;

mod commands;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(version)]
#[command(about = "Track the movies you want to watch, from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in (password from MARQUEE_PASSWORD or stdin)
    Login {
        #[arg(long)]
        email: String,
        /// Keep this login for later sessions
        #[arg(long)]
        remember: bool,
    },
    /// Sign out and forget the remembered login
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Create an account (password from MARQUEE_PASSWORD or stdin)
    Signup {
        #[arg(long)]
        email: String,
    },
    /// Browse the movie catalog
    Movies {
        #[command(subcommand)]
        command: MoviesCommands,
    },
    /// Manage your watchlist
    Watchlist {
        #[command(subcommand)]
        command: WatchlistCommands,
    },
    /// Rate a movie from 1 to 10
    Rate {
        #[arg(value_name = "MOVIE_ID")]
        movie_id: MovieId,
        #[arg(value_name = "SCORE")]
        score: u8,
        /// Optional review text
        #[arg(long)]
        review: Option<String>,
    },
    /// List the ratings for a movie
    Ratings {
        #[arg(value_name = "MOVIE_ID")]
        movie_id: MovieId,
    },
    /// Manage your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum MoviesCommands {
    /// Popular movies right now
    Popular,
    /// Search the catalog by title
    Search {
        #[arg(value_name = "QUERY", num_args = 1.., required = true)]
        query: Vec<String>,
    },
    /// Show details, cast, trailer, and ratings for a movie
    Show {
        #[arg(value_name = "MOVIE_ID")]
        id: MovieId,
    },
}

#[derive(clap::Subcommand)]
enum WatchlistCommands {
    /// List saved movies, newest first
    List,
    /// Add a movie by catalog id
    Add {
        #[arg(value_name = "MOVIE_ID")]
        movie_id: MovieId,
    },
    /// Remove a movie by catalog id
    Remove {
        #[arg(value_name = "MOVIE_ID")]
        movie_id: MovieId,
    },
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Show a profile and its ratings (yours when no id is given)
    Show {
        #[arg(value_name = "USER_ID")]
        user_id: Option<String>,
    },
    /// Update username and/or avatar
    Set {
        #[arg(long)]
        username: Option<String>,
        #[arg(long = "avatar-url")]
        avatar_url: Option<String>,
    },
    /// Change your password (new password from MARQUEE_PASSWORD or stdin)
    Password,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the existing file is broken.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let config = Config::load().context("load config")?;
    let _log_guard = logging::init(&config).context("init logging")?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(dispatch(cli, config))
}

async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    // default to the interactive app
    let Some(command) = cli.command else {
        return run_interactive(&config);
    };

    match command {
        Commands::Login { email, remember } => commands::auth::login(&config, &email, remember).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Whoami => commands::auth::whoami(&config).await,
        Commands::Signup { email } => commands::auth::signup(&config, &email).await,

        Commands::Movies { command } => match command {
            MoviesCommands::Popular => commands::movies::popular(&config).await,
            MoviesCommands::Search { query } => {
                commands::movies::search(&config, &query.join(" ")).await
            }
            MoviesCommands::Show { id } => commands::movies::show(&config, id).await,
        },

        Commands::Watchlist { command } => match command {
            WatchlistCommands::List => commands::watchlist::list(&config).await,
            WatchlistCommands::Add { movie_id } => commands::watchlist::add(&config, movie_id).await,
            WatchlistCommands::Remove { movie_id } => {
                commands::watchlist::remove(&config, movie_id).await
            }
        },

        Commands::Rate {
            movie_id,
            score,
            review,
        } => commands::ratings::rate(&config, movie_id, score, review.as_deref()).await,
        Commands::Ratings { movie_id } => commands::ratings::list(&config, movie_id).await,

        Commands::Profile { command } => match command {
            ProfileCommands::Show { user_id } => {
                commands::profile::show(&config, user_id.as_deref()).await
            }
            ProfileCommands::Set {
                username,
                avatar_url,
            } => commands::profile::set(&config, username.as_deref(), avatar_url.as_deref()).await,
            ProfileCommands::Password => commands::profile::password(&config).await,
        },

        // Handled in `run` before config is loaded.
        Commands::Config { .. } => Ok(()),
    }
}

#[cfg(feature = "tui")]
fn run_interactive(config: &Config) -> Result<()> {
    marquee_tui::run_tui(config).context("interactive app failed")
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_config: &Config) -> Result<()> {
    anyhow::bail!("This build has no interactive app. Run `marquee --help` for commands.")
}
