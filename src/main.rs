use anyhow::Result;
use clap::Parser;
use pawtrail::api::PetStoreClient;
use pawtrail::cli::{
    AdCommand, AvatarCommand, Cli, Command, PetCommand, PhotoCommand, ProfileCommand,
};
use pawtrail::commands::{self, AppContext};
use pawtrail::config::AppConfig;
use pawtrail::services::{
    materializer::PhotoMaterializer, mirror_store::MirrorStore, session_store::SessionStore,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, path::Path, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env_and_args(&cli.config)?;
    tracing::debug!("running with config: {:?}", cfg);

    // --- Ensure photo cache directory exists ---
    if !Path::new(&cfg.photo_dir).exists() {
        fs::create_dir_all(&cfg.photo_dir)?;
        tracing::info!("Created photo cache directory at {}", cfg.photo_dir);
    }

    // --- Initialize SQLite connection ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }
    // SQLx will not create the database file itself.
    match fs::OpenOptions::new().create(true).write(true).open(db_path) {
        Ok(_) => tracing::debug!("database file ready at {}", db_path),
        Err(e) => tracing::warn!("failed to prepare database file {}: {}", db_path, e),
    }

    let db: Arc<sqlx::Pool<sqlx::Sqlite>> = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&cfg.database_url)
            .await?,
    );
    run_migrations(&db).await?;

    // --- Wire services ---
    let api = PetStoreClient::builder(&cfg.api_base_url, &cfg.auth_base_url)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()?;
    let store = MirrorStore::new(db.clone());
    let sessions = SessionStore::new(db.clone());
    let materializer = PhotoMaterializer::new(api.clone(), store.clone(), &cfg.photo_dir);

    // Ctrl-C cancels in-flight photo loops instead of leaving half-done
    // writes behind.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let ctx = AppContext {
        api,
        store,
        sessions,
        materializer,
        cancel,
    };
    dispatch(&ctx, cli.command).await
}

async fn dispatch(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => commands::auth::login(ctx, email, password).await,
        Command::Register {
            email,
            first_name,
            last_name,
            password,
            city,
        } => commands::auth::register(ctx, email, first_name, last_name, password, city).await,
        Command::Logout => commands::auth::logout(ctx).await,
        Command::Home => commands::pets::home(ctx).await,
        Command::Refresh => commands::pets::refresh(ctx).await,
        Command::Pet { command } => match command {
            PetCommand::Add {
                name,
                age,
                breed,
                species,
                gender,
                description,
                city,
                photos,
            } => {
                commands::pets::add(
                    ctx,
                    name,
                    age,
                    breed,
                    species,
                    gender,
                    description,
                    city,
                    photos,
                )
                .await
            }
            PetCommand::Show { pet_id } => commands::pets::show(ctx, pet_id).await,
            PetCommand::Edit {
                pet_id,
                name,
                age,
                breed,
                species,
                gender,
                description,
                city,
            } => {
                commands::pets::edit(
                    ctx,
                    pet_id,
                    name,
                    age,
                    breed,
                    species,
                    gender,
                    description,
                    city,
                )
                .await
            }
            PetCommand::ToggleLost { pet_id } => commands::pets::toggle_lost(ctx, pet_id).await,
            PetCommand::Delete { pet_id } => commands::pets::delete(ctx, pet_id).await,
            PetCommand::Roots { pet_id } => commands::pets::roots(ctx, pet_id).await,
        },
        Command::Photo { command } => match command {
            PhotoCommand::Add { pet_id, files } => commands::photos::add(ctx, pet_id, files).await,
            PhotoCommand::Rm { pet_id, photo_id } => {
                commands::photos::rm(ctx, pet_id, photo_id).await
            }
        },
        Command::FindLost {
            photo,
            latitude,
            longitude,
        } => commands::matching::find_lost(ctx, photo, latitude, longitude).await,
        Command::Ad { command } => match command {
            AdCommand::Generate { pet_id } => commands::ads::generate(ctx, pet_id).await,
            AdCommand::Last { pet_id } => commands::ads::last(ctx, pet_id).await,
            AdCommand::Save { pet_id, text } => commands::ads::save(ctx, pet_id, text).await,
        },
        Command::Profile { command } => match command {
            ProfileCommand::Show => commands::profile::show(ctx).await,
            ProfileCommand::Update {
                first_name,
                last_name,
                phone,
                city,
            } => commands::profile::update(ctx, first_name, last_name, phone, city).await,
            ProfileCommand::Password { new_password } => {
                commands::profile::password(ctx, new_password).await
            }
        },
        Command::Avatar { command } => match command {
            AvatarCommand::Show => commands::profile::avatar_show(ctx).await,
            AvatarCommand::Set { id } => commands::profile::avatar_set(ctx, id).await,
        },
    }
}

/// Run the embedded schema statements. The DDL is idempotent, so this runs
/// unconditionally at startup.
async fn run_migrations(db: &Arc<sqlx::Pool<sqlx::Sqlite>>) -> Result<()> {
    let sql = include_str!("../migrations/0001_init.sql");
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    for stmt in statements {
        sqlx::query(stmt).execute(&**db).await?;
    }
    Ok(())
}
