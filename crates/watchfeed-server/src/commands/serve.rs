use crate::output::Output;
use crate::server::{run_server, ServerState};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::{info, warn};
use watchfeed_config::Config;

pub async fn run_serve(mut config: Config, host: Option<String>, port: Option<u16>, output: &Output) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    if config.letterboxd.username.is_empty() {
        warn!("letterboxd.username is not set; GET /api/letterboxd will require ?username=");
    }
    if config.tmdb_api_key().is_none() {
        info!("Poster enrichment disabled");
    }

    let service = super::build_service(&config, true)?;
    let state = ServerState::new(service, config.letterboxd.username.clone());

    output.info(format!(
        "Serving on http://{}:{} (Ctrl-C to stop)",
        config.server.host, config.server.port
    ));
    run_server(state, &config.server.host, config.server.port)
        .await
        .map_err(|e| eyre!("Server error: {}", e))?;
    output.success("Server stopped");
    Ok(())
}
