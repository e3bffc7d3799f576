use crate::{
    dispatcher::Dispatcher,
    handlers,
    router::RouteTable,
    runtime_config::RuntimeConfig,
    security::TokenAuthority,
    server::{AppService, HttpServer},
    static_files::{StaticMount, StaticRegistry},
    store::Store,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use http::Method;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface: serve HTTP, or execute one route in-process.
#[derive(Debug, Parser)]
#[command(name = "spur", version)]
#[command(about = "Todo API service", long_about = None)]
pub struct Cli {
    /// Host to serve HTTP on
    #[arg(short = 'H', long, default_value = "localhost:5000")]
    pub host: String,

    /// Number of server worker threads
    #[arg(short = 'n', long = "max-sock", default_value_t = 4)]
    pub max_sock: usize,

    /// Verbose logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Execute one HTTP route in-process instead of serving
    #[arg(short, long)]
    pub route: Option<String>,

    /// HTTP method for --route (default: GET, or POST when a body is given)
    #[arg(short, long)]
    pub method: Option<String>,

    /// Extra HTTP headers for --route, as a JSON object
    #[arg(short = 'a', long, default_value = "{}")]
    pub headers: String,

    /// HTTP body for --route
    #[arg(short = 'd', long)]
    pub body: Option<String>,

    /// Access token for --route (sent as `Authentication: Bearer <token>`)
    #[arg(short = 'T', long)]
    pub token: Option<String>,

    /// Set the body content type to application/json
    #[arg(short = 'j', long = "is-json", default_value_t = false)]
    pub is_json: bool,

    /// Set the body content type to text/plain
    #[arg(short = 'x', long = "is-text", default_value_t = false)]
    pub is_text: bool,

    /// Set the body content type to application/x-www-form-urlencoded
    #[arg(short = 'f', long = "is-form", default_value_t = false)]
    pub is_form: bool,

    /// Directory whose `static/` and `assets/` subdirectories are served
    #[arg(long, default_value = ".")]
    pub home: PathBuf,
}

impl Cli {
    fn synthetic_headers(&self) -> Result<HashMap<String, String>> {
        let mut headers: HashMap<String, String> =
            serde_json::from_str(&self.headers).context("parsing --headers as a JSON object")?;
        if self.is_json {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        } else if self.is_text {
            headers.insert("Content-Type".to_string(), "text/plain".to_string());
        } else if self.is_form {
            headers.insert(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
        }
        if let Some(token) = &self.token {
            headers.insert("Authentication".to_string(), format!("Bearer {token}"));
        }
        Ok(headers)
    }

    fn synthetic_method(&self) -> Result<Method> {
        match &self.method {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method `{m}`")),
            None => Ok(if self.body.is_some() {
                Method::POST
            } else {
                Method::GET
            }),
        }
    }
}

/// Build the full application and run the selected mode.
pub fn run(cli: Cli) -> Result<()> {
    let config = RuntimeConfig::from_env();
    may::config()
        .set_workers(cli.max_sock)
        .set_stack_size(config.stack_size);

    let table = Arc::new(RouteTable::default());
    let store = Arc::new(Store::default());
    let authority = Arc::new(TokenAuthority::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_ttl_secs,
    ));

    handlers::register_all(&table, &store, &authority);

    let registry = Arc::new(StaticRegistry::new(
        vec![
            StaticMount::new(cli.home.join("static"), "/static"),
            StaticMount::new(cli.home.join("assets"), "/assets"),
        ],
        vec![
            cli.home.join("static").join("index.html"),
            cli.home.join("assets").join("index.html"),
        ],
    ));
    registry
        .refresh(&table)
        .context("scanning static directories")?;
    registry.install_refresh_route(&table);

    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&table)));

    if let Some(route) = &cli.route {
        let outcome = dispatcher.dispatch_synthetic(
            cli.synthetic_method()?,
            route,
            HashMap::new(),
            cli.synthetic_headers()?,
            cli.body.clone(),
        );
        println!("{}", String::from_utf8_lossy(&outcome.body));
        if outcome.status >= 300 {
            bail!("route returned status {}", outcome.status);
        }
        return Ok(());
    }

    let service = AppService::new(dispatcher);
    let handle = HttpServer(service)
        .start(&cli.host)
        .with_context(|| format!("binding {}", cli.host))?;
    info!(host = %cli.host, workers = cli.max_sock, "server is running");

    wait_for_shutdown()?;
    handle.stop();
    info!("server stopped");
    Ok(())
}

#[cfg(unix)]
fn wait_for_shutdown() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "shutdown signal received");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> Result<()> {
    loop {
        std::thread::park();
    }
}
