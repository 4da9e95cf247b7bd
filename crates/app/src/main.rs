use std::fmt;

use clap::Parser;

use portal_core::model::{ItemId, LearningPath, ProfilePatch, UserProgress};
use services::{AppServices, Clock, DashboardStats, FeedbackDraft, LoginForm, Notifier, SignUpForm};

mod cli;
mod logging;

use cli::{AdminCommand, BookmarkCommand, Cli, Command, ProgressCommand};

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
    NotSignedIn,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::NotSignedIn => write!(f, "not signed in; run `portal login` first"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn print_path(path: &LearningPath) {
    println!("articles completed: {}", path.articles_completed);
    println!("books completed:    {}", path.books_completed);
    println!("videos completed:   {}", path.videos_completed);
    println!("total progress:     {}%", path.total_progress);
    println!("average rating:     {:.1}", path.average_rating);
    if !path.recent_items.is_empty() {
        println!("recent items:");
        for b in &path.recent_items {
            println!("  {}-{}  {}", b.kind, b.id, b.title);
        }
    }
}

fn print_progress_row(p: &UserProgress) {
    println!(
        "{}  {} <{}> [{}]  a:{} b:{} v:{}  {}%  rating {:.1}  last active {}",
        p.user_id,
        p.user_name,
        p.user_email,
        p.user_role,
        p.articles_completed,
        p.books_completed,
        p.videos_completed,
        p.total_progress,
        p.average_rating,
        p.last_active.format("%Y-%m-%d %H:%M"),
    );
}

fn print_stats(stats: &DashboardStats) {
    println!("users:            {}", stats.total_users);
    println!("students:         {}", stats.student_count);
    println!("citizens:         {}", stats.citizen_count);
    println!("average progress: {}%", stats.average_progress);
    println!("average rating:   {:.1}", stats.average_rating);
    println!(
        "average completed: articles {}, books {}, videos {}",
        stats.average_articles, stats.average_books, stats.average_videos
    );
    if !stats.activity.is_empty() {
        println!("activity:");
        for row in &stats.activity {
            println!("  {:<12} {:>3}%  rating {:.1}", row.name, row.progress, row.rating);
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Open + migrate SQLite here so services stay storage-agnostic.
    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_file(&db_url)?;
    let mut app = AppServices::new_sqlite(&db_url, Clock::system(), Notifier::from_env()).await?;
    tracing::debug!(db = %db_url, "session loaded");

    match cli.command {
        Command::Signup {
            name,
            email,
            phone,
            role,
        } => {
            let form = SignUpForm {
                name,
                email,
                phone,
                role,
            };
            let user = app.auth().sign_up(app.store_mut(), &form).await?;
            println!("Account created for {} ({})", user.name, user.role);
        }
        Command::Login { phone } => {
            let user = app
                .auth()
                .log_in(app.store_mut(), &LoginForm { phone })
                .await?;
            println!("Welcome back, {}", user.phone);
        }
        Command::Logout => {
            app.store_mut().sign_out().await?;
            println!("Signed out");
        }
        Command::Whoami => match app.store().user() {
            Some(user) => {
                println!("{} <{}> {} [{}]", user.name, user.email, user.phone, user.role);
                if let Some(mode) = user.mode {
                    println!("mode: {mode}");
                }
            }
            None => println!("not signed in"),
        },
        Command::Profile(args) => {
            if !app.store().is_authenticated() {
                return Err(ArgsError::NotSignedIn.into());
            }
            let patch = ProfilePatch {
                name: args.name,
                email: args.email,
                phone: args.phone,
                role: args.role,
                avatar: args.avatar,
                mode: None,
            };
            if patch.is_empty() {
                println!("nothing to update");
            } else {
                app.store_mut().update_profile(patch).await?;
                println!("Profile updated");
            }
        }
        Command::Mode { mode } => {
            if !app.store().is_authenticated() {
                return Err(ArgsError::NotSignedIn.into());
            }
            app.store_mut().set_mode(mode).await?;
            println!("Mode set to {mode}");
        }
        Command::Bookmark(cmd) => match cmd {
            BookmarkCommand::Add { kind, id, title } => {
                let library = app.library();
                library
                    .bookmark_item(app.store_mut(), ItemId::new(id), kind, title)
                    .await?;
                println!("Bookmarked {kind}-{id}");
            }
            BookmarkCommand::Remove { kind, id } => {
                app.store_mut()
                    .remove_bookmark(ItemId::new(id), kind)
                    .await?;
                println!("Removed {kind}-{id}");
            }
            BookmarkCommand::List => {
                for b in app.store().bookmarks() {
                    println!(
                        "{}-{}  {}  ({})",
                        b.kind,
                        b.id,
                        b.title,
                        b.timestamp.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        },
        Command::View { kind, id } => {
            let library = app.library();
            let fresh = library
                .open_item(app.store_mut(), ItemId::new(id), kind)
                .await?;
            if !app.store().is_authenticated() {
                println!("not signed in; view not tracked");
            } else if fresh {
                println!("Marked {kind}-{id} as viewed");
            } else {
                println!("{kind}-{id} already viewed");
            }
        }
        Command::Feedback {
            kind,
            id,
            title,
            rating,
            comment,
        } => {
            let draft =
                FeedbackDraft::new(ItemId::new(id), kind, title, rating).with_comment(comment);
            let feedback = app.feedback().submit(app.store_mut(), draft).await?;
            println!("Thank you! Feedback {} recorded", feedback.id);
        }
        Command::Path => print_path(&app.store().learning_path()),
        Command::Progress(cmd) => match cmd {
            ProgressCommand::Sync => match app.store_mut().sync_current_progress().await? {
                Some(snapshot) => print_progress_row(&snapshot),
                None => return Err(ArgsError::NotSignedIn.into()),
            },
            ProgressCommand::List => {
                for row in app.store().all_user_progress() {
                    print_progress_row(row);
                }
            }
        },
        Command::Admin(AdminCommand::Stats) => {
            let stats = DashboardStats::for_admin(app.store())?;
            print_stats(&stats);
        }
        Command::Otp { email, phone, name } => {
            let (challenge, target) = match (email, phone) {
                (_, Some(phone)) => (app.auth().request_otp_sms(&phone, &name).await?, phone),
                (Some(email), None) => (app.auth().request_otp(&email, &name).await, email),
                (None, None) => return Err("either --email or --phone is required".into()),
            };
            if challenge.delivered() {
                println!("Code sent to {target}");
            } else {
                println!("Delivery unavailable; code: {}", challenge.code());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url_is_left_alone() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn relative_path_becomes_absolute_url() {
        let url = normalize_sqlite_url("sqlite:data/portal.sqlite3");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/portal.sqlite3"));
    }

    #[test]
    fn prepare_rejects_non_sqlite_url() {
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
    }
}
