//! Process entry point: logging, configuration, persistence, and the
//! hourly garbage-collection sweep over abandoned rooms (spec 4.F). The
//! transport itself — accepting connections and decoding/encoding frames
//! onto `events::Inbound`/`events::Outbound` — is out of scope; `main`
//! only wires the pieces that are.

use shogi_room::config::Config;
use shogi_room::persistence::{PersistenceStore, SledStore};
use shogi_room::transport::{LoggingTransport, Transport};
use shogi_room::SessionRouter;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env();
    log::info!("starting shogi-room on port {}", config.port);

    let store: Arc<dyn PersistenceStore> = match SledStore::open("shogi-room.sled") {
        Ok(store) => Arc::new(store),
        Err(err) => {
            log::error!("failed to open persistence store, falling back to in-memory: {err}");
            Arc::new(shogi_room::persistence::MemoryStore::default())
        }
    };
    let transport: Arc<dyn Transport> = Arc::new(LoggingTransport);

    let router = SessionRouter::new(store, transport, config);
    router.restore_from_store();

    spawn_gc_task(router.clone(), config);

    // The actual accept loop lives in whatever transport is wired in front
    // of `router.dispatch`; nothing left to do here but keep the process
    // alive for the background tasks above.
    let _ = router;
    std::future::pending::<()>().await;
}

fn spawn_gc_task(router: SessionRouter, config: Config) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.gc_interval);
        loop {
            ticker.tick().await;
            let cutoff = chrono::Utc::now().timestamp_millis() - config.inactivity_threshold.as_millis() as i64;
            router.gc_sweep(cutoff);
        }
    });
}
