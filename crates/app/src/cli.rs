use clap::{Args, Parser, Subcommand};

use portal_core::model::{ContentKind, Mode, Role};

/// Constitution learning portal: local session, bookmarks and progress.
#[derive(Debug, Parser)]
#[command(name = "portal", version, about)]
pub struct Cli {
    /// SQLite database holding the session.
    #[arg(long, global = true, env = "PORTAL_DB_URL", default_value = "sqlite:portal.sqlite3")]
    pub db: String,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        role: String,
    },
    /// Sign in with a 10-digit phone number.
    Login {
        #[arg(long)]
        phone: String,
    },
    /// Sign out and clear session data.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Edit profile fields of the signed-in user.
    Profile(ProfileArgs),
    /// Choose the learning mode.
    Mode { mode: Mode },
    /// Manage bookmarks.
    #[command(subcommand)]
    Bookmark(BookmarkCommand),
    /// Record that an item was opened.
    View { kind: ContentKind, id: u64 },
    /// Rate an item.
    Feedback {
        kind: ContentKind,
        id: u64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Show the learning path of the signed-in user.
    Path,
    /// Work with the user-progress ledger.
    #[command(subcommand)]
    Progress(ProgressCommand),
    /// Admin-only views.
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Send a one-time code by email, or by SMS with `--phone`.
    Otp {
        #[arg(long, required_unless_present = "phone", conflicts_with = "phone")]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, default_value = "User")]
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub role: Option<Role>,
    #[arg(long)]
    pub avatar: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum BookmarkCommand {
    Add {
        kind: ContentKind,
        id: u64,
        #[arg(long)]
        title: String,
    },
    Remove {
        kind: ContentKind,
        id: u64,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum ProgressCommand {
    /// Snapshot the signed-in user into the ledger.
    Sync,
    /// Print every ledger row.
    List,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Dashboard aggregates over the ledger.
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_feedback_command() {
        let cli = Cli::try_parse_from([
            "portal", "feedback", "article", "14", "--title", "Article 14", "--rating", "4",
        ])
        .unwrap();
        match cli.command {
            Command::Feedback {
                kind, id, rating, comment, ..
            } => {
                assert_eq!(kind, ContentKind::Article);
                assert_eq!(id, 14);
                assert_eq!(rating, 4);
                assert!(comment.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["portal", "view", "podcast", "1"]).is_err());
    }

    #[test]
    fn otp_takes_email_or_phone() {
        let cli = Cli::try_parse_from(["portal", "otp", "--phone", "9876543210"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Otp { email: None, phone: Some(_), .. }
        ));
        assert!(Cli::try_parse_from(["portal", "otp"]).is_err());
        assert!(
            Cli::try_parse_from(["portal", "otp", "--email", "a@b.c", "--phone", "9876543210"])
                .is_err()
        );
    }

    #[test]
    fn counts_verbose_flags() {
        let cli = Cli::try_parse_from(["portal", "-vv", "path"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
