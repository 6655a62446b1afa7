mod address;
mod config;
mod facility;
mod frontend;
mod generation;
mod map;
mod page;
mod resolver;
mod session;

use std::sync::Arc;

use is_terminal::IsTerminal;
use jagai_geo::geocoding::nominatim;
use jagai_geo::locate;
use macro_rules_attribute::apply;
use smol_macros::main;

#[apply(main!)]
async fn main(executor: Arc<async_executor::Executor<'static>>) {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,isahc=error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let geocoder = match nominatim::Backend::new(config.geocoder.options()) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("cannot start geocoder: {e}");
            std::process::exit(1);
        }
    };

    if config.location.position.is_none() {
        tracing::info!("no device position configured, set JAGAI_POSITION=lat,lon to provide one");
    }

    let services = session::Services {
        geocoder: Arc::new(geocoder),
        locator: Arc::from(locate::resolve(config.location.position)),
        locate_timeout: config.locate_timeout(),
    };
    let page = page::Page::new(&config);
    let map_output = config.map_output.as_deref();

    tracing::info!(geocoder = %config.geocoder.base_url, "started");

    let page = if std::io::stdout().is_terminal() {
        session::run(&executor, &services, page, &frontend::terminal(), map_output).await
    } else {
        session::run(&executor, &services, page, &frontend::headless(), map_output).await
    };

    if let Some(path) = map_output {
        tracing::info!(path = %path.display(), summary = %map::summary(&page.map_view()), "map ready");
    }
}
