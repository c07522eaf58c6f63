use std::{process, sync::Arc};

use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use yatube::{
    application::{
        authors::AuthorService,
        error::AppError,
        feed::FeedService,
        follow::FollowService,
        groups::{CreateGroupCommand, GroupService},
        posts::PostService,
        repos::{
            AuthorsRepo, CommentsRepo, FollowsRepo, GroupsRepo, GroupsWriteRepo, HealthRepo,
            PostsRepo, PostsWriteRepo,
        },
    },
    cache::PageCache,
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Groups(args) => run_groups(settings, args.command).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::Migration(err.to_string()))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_http_state(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> HttpState {
    let posts: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write: Arc<dyn PostsWriteRepo> = repositories.clone();
    let authors: Arc<dyn AuthorsRepo> = repositories.clone();
    let groups: Arc<dyn GroupsRepo> = repositories.clone();
    let comments: Arc<dyn CommentsRepo> = repositories.clone();
    let follows: Arc<dyn FollowsRepo> = repositories.clone();
    let health: Arc<dyn HealthRepo> = repositories;

    let feed = FeedService::new(
        posts.clone(),
        authors.clone(),
        groups.clone(),
        comments.clone(),
        follows.clone(),
        settings.feed.page_size,
    );
    let post_service = PostService::new(posts, posts_write, groups, comments);
    let follow_service = FollowService::new(authors.clone(), follows);
    let author_service = AuthorService::new(authors);

    let cache = settings
        .cache
        .enabled
        .then(|| Arc::new(PageCache::from_settings(&settings.cache)));

    HttpState {
        feed: Arc::new(feed),
        posts: Arc::new(post_service),
        follows: Arc::new(follow_service),
        authors: Arc::new(author_service),
        health,
        auth: settings.auth.clone(),
        cache,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings);
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "yatube::server",
        addr = %settings.server.public_addr,
        page_size = settings.feed.page_size.get(),
        cache_enabled = settings.cache.enabled,
        cache_ttl_secs = settings.cache.ttl.as_secs(),
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|err| InfraError::Server(err.to_string()))?;

    info!(target = "yatube::server", "server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(err) => {
                warn!(target = "yatube::server", error = %err, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!(target = "yatube::server", "shutdown signal received");
}

async fn run_groups(
    settings: config::Settings,
    command: config::GroupsCommand,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let reader: Arc<dyn GroupsRepo> = repositories.clone();
    let writer: Arc<dyn GroupsWriteRepo> = repositories;
    let service = GroupService::new(reader, writer);

    match command {
        config::GroupsCommand::List => {
            let groups = service.list().await?;
            print_json(&groups)
        }
        config::GroupsCommand::Create(args) => {
            let group = service
                .create(CreateGroupCommand {
                    title: args.title,
                    slug: args.slug,
                    description: args.description,
                })
                .await?;
            print_json(&group)
        }
        config::GroupsCommand::Delete(args) => {
            let group = service.delete(&args.slug).await?;
            print_json(&group)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
    println!("{rendered}");
    Ok(())
}
