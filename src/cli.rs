use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing::info;

use crate::app::{app, AppState};
use crate::attendance::{AttendanceRecorder, LocalCalendar, SystemClock};
use crate::auth::password::hash_password;
use crate::auth::{Role, TokenCodec};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore};
use crate::store::{AccountStore, ArrivalStore};

#[derive(Parser)]
#[command(name = "guard-api")]
#[command(about = "School attendance API - logins, role gates and daily arrival confirmations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides GUARD_API_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Use the in-process store instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Print an argon2 hash for seeding an account row")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
    },

    #[command(about = "Mint a token signed with the configured secret")]
    IssueToken {
        #[arg(long, help = "Role claim: staff, parent or student")]
        role: String,
        #[arg(long, help = "Subject id claim")]
        id: String,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port, memory } => serve(config, port, memory).await,
        Commands::HashPassword { password } => {
            let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
            println!("{hash}");
            Ok(())
        }
        Commands::IssueToken { role, id } => {
            let role = Role::parse(&role).with_context(|| format!("unknown role {role:?}"))?;
            let codec = TokenCodec::new(config.security.jwt_secret.as_bytes());
            println!("{}", codec.issue(role.as_str(), &id, None)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    let calendar = LocalCalendar::new(config.attendance.utc_offset()?);

    let (arrivals, accounts, pool): (Arc<dyn ArrivalStore>, Arc<dyn AccountStore>, Option<PgPool>) = if memory {
        info!("Using in-memory store; data is lost on exit");
        let store = Arc::new(MemoryStore::new());
        (store.clone() as Arc<dyn ArrivalStore>, store as Arc<dyn AccountStore>, None)
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::ensure_schema(&pool).await?;
        let store = Arc::new(PgStore::new(pool.clone()));
        (store.clone() as Arc<dyn ArrivalStore>, store as Arc<dyn AccountStore>, Some(pool))
    };

    let state = AppState {
        codec: Arc::new(TokenCodec::new(config.security.jwt_secret.as_bytes())),
        recorder: Arc::new(AttendanceRecorder::new(arrivals, Arc::new(SystemClock), calendar)),
        accounts,
        pool,
    };

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("Guard API listening on http://{} ({:?})", bind_addr, config.environment);
    axum::serve(listener, app(state, &config)).await?;
    Ok(())
}
