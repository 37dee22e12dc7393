use std::sync::Arc;

mod api;
mod config;
mod logger;
mod routing;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    match cfg.server.workers {
        Some(0) => return Err("server.workers must be greater than 0".into()),
        Some(workers) => {
            runtime_builder.worker_threads(workers);
        }
        None => {}
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let store = Arc::new(store::EmployeeStore::new());
    let state = Arc::new(config::AppState::new(&cfg, Arc::clone(&store)));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    logger::log_server_start(&addr, &cfg);
    server::start_server_loop(listener, state, signals).await;

    if !store.is_empty().await {
        logger::log_info(&format!(
            "Discarding {} in-memory employee record(s)",
            store.len().await
        ));
    }

    Ok(())
}
