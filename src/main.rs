use actix_web::{App, HttpServer, middleware::{DefaultHeaders, Logger}, web};
use clap::{Parser, Subcommand};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Subscriber, info};
use tracing_subscriber::{
    Layer, filter::LevelFilter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};
mod api;
use crate::api::{
    auth::Actor,
    health::health_config,
    state::AppState,
    user::models::{CreateUserRequest, Role},
};
mod config;
mod db;
mod mailer;
mod shutdown;
use crate::db::Repositories;
use crate::mailer::{HttpMailer, LogMailer, Mailer};
use crate::shutdown::ShutdownCoordinator;

#[derive(Parser)]
#[command(name = "hiring-desk")]
#[command(about = "Applicant tracking service: job postings, candidate pipeline and user administration")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Create the first super-admin account
    CreateSuperAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,

        #[arg(long, default_value = "")]
        department: String,
    },
}

/// Daily-rotating file that only receives events at `level` and above
fn level_file<S>(log_dir: &str, file_name: &str, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, file_name))
        .with_ansi(false)
        .with_filter(level)
}

/// Coloured stdout plus error.log, warn.log, info.log and debug.log under `log_dir`
fn init_logging(log_dir: &str) -> io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stdout).with_ansi(true))
        .with(level_file(log_dir, "error.log", LevelFilter::ERROR))
        .with(level_file(log_dir, "warn.log", LevelFilter::WARN))
        .with(level_file(log_dir, "info.log", LevelFilter::INFO))
        .with(level_file(log_dir, "debug.log", LevelFilter::DEBUG))
        .init();
    Ok(())
}

fn build_mailer(config: &config::Config) -> io::Result<Arc<dyn Mailer>> {
    match &config.mail_relay_url {
        Some(url) => {
            let mailer = HttpMailer::new(
                url.clone(),
                config.mail_relay_api_key.clone(),
                Duration::from_secs(config.mail_timeout_secs),
            )
            .map_err(io::Error::other)?;
            info!("Mail relay configured at {}", url);
            Ok(Arc::new(mailer))
        }
        None => {
            info!("No MAIL_RELAY_URL set; outgoing email will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let config = config::Config::from_env().map_err(io::Error::other)?;
    init_logging(&config.log_dir)?;

    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections)
        .await
        .map_err(io::Error::other)?;
    info!("Database connection pool established");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            db::migrations::run_migrations(&pool).await.map_err(io::Error::other)?;
            pool.close().await;
            Ok(())
        }
        Command::CreateSuperAdmin {
            email,
            password,
            first_name,
            last_name,
            department,
        } => {
            db::migrations::run_migrations(&pool).await.map_err(io::Error::other)?;
            let state = AppState::new(Repositories::postgres(pool.clone()), Arc::new(LogMailer), &config);
            let system = Actor {
                name: "System".to_string(),
                role: Role::SuperAdmin,
                ..Actor::guest()
            };
            let request = CreateUserRequest {
                email: Some(email),
                password: Some(password),
                first_name: Some(first_name),
                last_name: Some(last_name),
                role: Some(Role::SuperAdmin),
                department: Some(department),
            };
            let uid = state
                .users
                .create_user(&system, request)
                .await
                .map_err(|e| io::Error::other(e.to_string()))?;
            info!("Super-admin created with uid={}", uid);
            pool.close().await;
            Ok(())
        }
        Command::Serve => serve(config, pool).await,
    }
}

async fn serve(config: config::Config, pool: sqlx::Pool<sqlx::Postgres>) -> io::Result<()> {
    info!(
        bind = %config.bind_addr,
        max_payload = config.max_payload_size,
        db_connections = config.max_db_connections,
        uploads = %config.upload_dir,
        "Starting hiring-desk"
    );

    // Schema is brought up to date before accepting traffic
    db::migrations::run_migrations(&pool).await.map_err(io::Error::other)?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let mailer = build_mailer(&config)?;
    let state = AppState::new(Repositories::postgres(pool.clone()), mailer, &config);
    let server_pool = pool.clone();

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "Authorization, Content-Type"))
                    .add(("Access-Control-Allow-Methods", "GET, POST, PUT, PATCH, DELETE, OPTIONS")),
            )
            .app_data(web::Data::new(server_pool.clone()))
            .configure(|cfg| state.configure(cfg))
            .configure(health_config)
            .configure(api::routes)
    });

    info!("Listening on http://{}", config.bind_addr);

    let server = server.bind(&config.bind_addr)?.run();
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, pool)
        .wait_for_shutdown()
        .await
}
