use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use dinero::{AppState, build_router, graceful_shutdown, logging_middleware};

/// The REST API server for Dinero.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone used for calendar days, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How many days back the charts look when the client does not ask for a window.
    #[arg(long, default_value_t = 30)]
    window_days: u32,

    /// The origin of the web client allowed to call the API. Any origin is allowed if omitted.
    #[arg(long)]
    client_url: Option<String>,

    /// A directory with the built web client to serve alongside the API.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let state = match AppState::new(conn, &args.timezone, args.window_days) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = match &args.static_dir {
        Some(static_dir) => add_static_files(router, static_dir),
        None => router,
    };
    let router = add_tracing_layer(router).layer(build_cors_layer(args.client_url.as_deref()));

    tracing::info!(
        "HTTP server listening on {} with timezone {}",
        addr,
        args.timezone
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}

/// Serve the single page web client, falling back to its index page for client side routes.
fn add_static_files(router: Router, static_dir: &Path) -> Router {
    let index = static_dir.join("index.html");

    router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
}

fn build_cors_layer(client_url: Option<&str>) -> CorsLayer {
    let origin = client_url.and_then(|url| match url.parse::<HeaderValue>() {
        Ok(origin) => Some(origin),
        Err(error) => {
            tracing::warn!("Ignoring invalid client URL {url}: {error}");
            None
        }
    });

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(Any),
    }
}
