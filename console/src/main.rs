use std::io;
use std::sync::Arc;

use clap::Parser;
use todo_console::{App, Config, ConfiguredSession, Transport};
use todo_query::{QueryClient, Store, User};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let user = User {
        id: config.user_id.clone(),
        email: config.email.clone(),
    };
    let provider = Arc::new(ConfiguredSession::new(user, config.token_source()));
    let store = Store::new(QueryClient::new(&config.base_url));
    tracing::info!(base_url = %config.base_url, "starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut app = App::new(store, provider, Transport::new(), io::stdout(), io::stderr());
        app.run(BufReader::new(tokio::io::stdin())).await
    })
}
