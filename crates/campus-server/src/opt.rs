use campus_entity::user::Role;
use campus_utils::args::VoiceConfig;
use campus_utils::tracing::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "campus", about = "Run the campus learning platform")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Run(Run),
    /// Create an account of any role and print its access token
    CreateUser(CreateUser),
    /// Print a fresh access token for an existing account
    IssueToken(IssueToken),
}

#[derive(Debug, Clone, Args)]
#[group(multiple = true, required = false)]
pub(crate) struct Db {
    #[arg(long, help = "Min connections")]
    pub(crate) db_min_connections: Option<u32>,

    #[arg(long, help = "Max connections")]
    pub(crate) db_max_connections: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Database {
    #[arg(long, env = "DATABASE_URL", help = "sqlite://... or postgresql://...")]
    pub(crate) database_url: Url,

    #[command(flatten)]
    pub(crate) db: Db,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Run {
    #[arg(long)]
    pub(crate) host: Option<IpAddr>,

    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    #[command(flatten)]
    pub(crate) database: Database,

    #[arg(long, value_delimiter = ',')]
    pub(crate) origins: Vec<String>,

    #[arg(long, default_value = "media", help = "Directory uploaded files are stored in")]
    pub(crate) media_root: PathBuf,

    #[command(flatten)]
    pub(crate) voice: VoiceConfig,

    #[arg(long = "sentry-dsn", help = "Sentry url")]
    pub(crate) sentry_dsn: Option<String>,

    #[arg(
        long,
        default_value = "dev",
        help = "Set the environment used by sentry and prometheus"
    )]
    pub(crate) env: String,

    #[arg(long)]
    pub(crate) otlp_endpoint: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub(crate) log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum RoleArg {
    Student,
    Teacher,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Student => Self::Student,
            RoleArg::Teacher => Self::Teacher,
            RoleArg::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct CreateUser {
    #[command(flatten)]
    pub(crate) database: Database,

    #[arg(long)]
    pub(crate) username: String,

    #[arg(long)]
    pub(crate) email: String,

    #[arg(long, value_enum)]
    pub(crate) role: RoleArg,

    #[arg(long, default_value = "")]
    pub(crate) first_name: String,

    #[arg(long, default_value = "")]
    pub(crate) last_name: String,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct IssueToken {
    #[command(flatten)]
    pub(crate) database: Database,

    #[arg(long)]
    pub(crate) username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["campus", "run", "--database-url", "sqlite://campus.db?mode=rwc"]).unwrap();
        let Commands::Run(run) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(run.database.database_url.scheme(), "sqlite");
        assert_eq!(run.env, "dev");
        assert_eq!(run.log_format, LogFormat::Plain);
        assert_eq!(run.media_root, PathBuf::from("media"));
        assert!(run.voice.voice_api_key.is_none());
    }

    #[test]
    fn test_create_user() {
        let cli = Cli::try_parse_from([
            "campus",
            "create-user",
            "--database-url",
            "sqlite://campus.db",
            "--username",
            "root",
            "--email",
            "root@example.org",
            "--role",
            "admin",
        ])
        .unwrap();
        let Commands::CreateUser(create) = cli.command else {
            panic!("expected create-user command");
        };
        assert_eq!(Role::from(create.role), Role::Admin);
        assert!(create.first_name.is_empty());
    }
}
