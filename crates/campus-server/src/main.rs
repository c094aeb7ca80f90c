#[macro_use]
extern crate diesel_migrations;

use crate::db::migration;
use crate::opt::{Commands, CreateUser, Database as DatabaseArgs, Db, IssueToken, Run};
use anyhow::{Result, anyhow};
use axum::serve;
use campus_core::assistant::WebhookUrls;
use campus_db::access_tokens;
use campus_db::sea_orm::{ConnectOptions, Database, DatabaseConnection};
use campus_db::user::NewUser;
use campus_model::user::validate_username;
use campus_model::validation::FieldErrors;
use campus_utils::media::MediaStorage;
use campus_utils::net::create_listener;
use campus_voice::{AgentApi, RetellClient};
use clap::Parser;
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use url::Url;

mod app;
mod db;
mod opt;
mod permissions;
mod routes;
mod user;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3030;

pub(crate) struct InnerAppConfig {
    media: MediaStorage,
    voice: Option<Arc<dyn AgentApi>>,
    webhook_urls: WebhookUrls,
    voice_public_key: Option<String>,
}

#[derive(Clone)]
pub(crate) struct AppConfig(Arc<InnerAppConfig>);

impl AppConfig {
    fn new(
        media: MediaStorage,
        voice: Option<Arc<dyn AgentApi>>,
        webhook_urls: WebhookUrls,
        voice_public_key: Option<String>,
    ) -> Self {
        Self(Arc::new(InnerAppConfig {
            media,
            voice,
            webhook_urls,
            voice_public_key,
        }))
    }

    pub fn media(&self) -> &MediaStorage {
        &self.0.media
    }

    /// `None` when no vendor key is configured.
    pub fn voice(&self) -> Option<&dyn AgentApi> {
        self.0.voice.as_deref()
    }

    pub fn webhook_urls(&self) -> &WebhookUrls {
        &self.0.webhook_urls
    }

    pub fn voice_public_key(&self) -> Option<&str> {
        self.0.voice_public_key.as_deref()
    }
}

async fn connect(database: &DatabaseArgs) -> Result<DatabaseConnection> {
    migration(&database.database_url)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn std::error::Error, "failed to run migrations"))?;

    let seaorm_pool_options = build_connect_options(&database.db, database.database_url.clone());
    Ok(Database::connect(seaorm_pool_options).await?)
}

async fn run(opt: Run) -> Result<()> {
    let _guard = campus_utils::tracing::setup(
        campus_utils::tracing::TracingConfig::builder()
            .package(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .otlp_endpoint(opt.otlp_endpoint.clone())
            .sentry_dsn(opt.sentry_dsn.clone())
            .env(opt.env.clone())
            .log_format(opt.log_format)
            .build(),
    )?;

    let seaorm_pool = connect(&opt.database).await?;

    let voice: Option<Arc<dyn AgentApi>> = match &opt.voice.voice_api_key {
        Some(api_key) => Some(Arc::new(RetellClient::new(&opt.voice.voice_api_url, api_key.clone())?)),
        None => {
            tracing::warn!("no voice api key configured, assistant management is disabled");
            None
        }
    };
    let webhook_urls = WebhookUrls::new(&opt.voice.public_base_url)?;
    tracing::info!(llm = %webhook_urls.llm, register = %webhook_urls.register, "using webhook urls");

    let Run {
        host,
        port,
        origins,
        media_root,
        voice: voice_config,
        ..
    } = opt;

    let app_config = AppConfig::new(
        MediaStorage::new(media_root),
        voice,
        webhook_urls,
        voice_config.voice_public_key,
    );

    let app = app::create_app(app_config, &origins, seaorm_pool)?;

    let listener = create_listener((host, port), (DEFAULT_HOST, DEFAULT_PORT)).await?;

    let service = app.into_make_service();
    tracing::info!(local_addr = %listener.local_addr()?, "starting app");
    serve::serve(listener, service).await?;
    Ok(())
}

async fn create_user(opt: CreateUser) -> Result<()> {
    let mut errors = FieldErrors::new();
    validate_username(&mut errors, &opt.username);
    errors
        .into_result()
        .map_err(|errors| anyhow!("invalid username {}: {errors:?}", opt.username))?;
    let conn = connect(&opt.database).await?;
    let (user, _) = campus_db::user::Mutation::create_user(
        &conn,
        NewUser {
            username: opt.username,
            email: opt.email,
            first_name: opt.first_name,
            last_name: opt.last_name,
            role: opt.role.into(),
            accept_terms: true,
            accept_privacy: true,
        },
    )
    .await?;
    let token = access_tokens::Mutation::create_access_token(&conn, user.id).await?;
    println!("{}", token.access_token);
    Ok(())
}

async fn issue_token(opt: IssueToken) -> Result<()> {
    let conn = connect(&opt.database).await?;
    let user = campus_db::user::Query::find_by_username(&conn, &opt.username)
        .await?
        .ok_or_else(|| anyhow!("unknown user {}", opt.username))?;
    access_tokens::Mutation::delete_access_token(&conn, user.id).await?;
    let token = access_tokens::Mutation::create_access_token(&conn, user.id).await?;
    println!("{}", token.access_token);
    Ok(())
}

fn build_connect_options(db_options: &Db, db_url: Url) -> ConnectOptions {
    let mut seaorm_pool_options = ConnectOptions::new(db_url);
    if let Some(min_connections) = db_options.db_min_connections {
        seaorm_pool_options.min_connections(min_connections);
    }
    if let Some(max_connections) = db_options.db_max_connections {
        seaorm_pool_options.max_connections(max_connections);
    }
    seaorm_pool_options.sqlx_logging_level(log::LevelFilter::Debug);
    seaorm_pool_options
}

fn main() -> Result<()> {
    unsafe { env::set_var("RUST_BACKTRACE", "1") };

    let main = async {
        let opt = opt::Cli::parse();

        match opt.command {
            Commands::Run(o) => run(o).await?,
            Commands::CreateUser(o) => create_user(o).await?,
            Commands::IssueToken(o) => issue_token(o).await?,
        }
        Ok(())
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(main)
}
