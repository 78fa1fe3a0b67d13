//! Background sweeps: evict rooms whose players are all gone, drop dead
//! lobby entries, and report server status.
//!
//! Each sweep idles on its base interval and tightens to a fast retry
//! right after doing work, to drain backlogs quickly. Both sweeps go
//! through the room actor / lobby lock, so they serialize with in-flight
//! attaches and submissions instead of racing them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use codeduel_judge::Judge;
use tokio::time::sleep;

use crate::server::ServerState;

/// Cadence right after a sweep that evicted something.
const FAST_RETRY: Duration = Duration::from_millis(500);

/// Cadence of the status summary.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

pub(crate) fn spawn_sweepers<J: Judge>(state: Arc<ServerState<J>>) {
    tokio::spawn(room_sweep(Arc::clone(&state)));
    tokio::spawn(lobby_sweep(Arc::clone(&state)));
    tokio::spawn(status_report(state));
}

/// Kills any room whose seats all report a dead connection.
async fn room_sweep<J: Judge>(state: Arc<ServerState<J>>) {
    let mut fast = false;
    loop {
        sleep(if fast { FAST_RETRY } else { state.config.sweep_interval }).await;

        let mut killed = 0usize;
        for room in state.registry.rooms() {
            let Ok(info) = room.info().await else {
                continue; // already closing
            };
            let abandoned =
                !info.seats.is_empty() && info.seats.iter().all(|s| !s.alive);
            if abandoned {
                state.registry.kill(&info.room_id).await;
                killed += 1;
            }
        }

        if killed > 0 {
            tracing::info!(killed, "room sweep evicted abandoned rooms");
        }
        fast = killed > 0;
    }
}

/// Drops lobby entries whose connection died mid-matchmaking.
async fn lobby_sweep<J: Judge>(state: Arc<ServerState<J>>) {
    let mut fast = false;
    loop {
        sleep(if fast { FAST_RETRY } else { state.config.sweep_interval }).await;

        let swept = state.lobby.sweep_dead();
        if !swept.is_empty() {
            tracing::info!(count = swept.len(), "lobby sweep dropped dead waiters");
        }
        fast = !swept.is_empty();
    }
}

/// Periodic one-line summary of what the server is doing.
async fn status_report<J: Judge>(state: Arc<ServerState<J>>) {
    let started = Instant::now();
    loop {
        sleep(STATUS_INTERVAL).await;

        let rooms = state.registry.rooms();
        let mut seated = 0usize;
        for room in &rooms {
            if let Ok(info) = room.info().await {
                seated += info.seats.len();
            }
        }

        tracing::info!(
            rooms = rooms.len(),
            seated,
            waiting = state.lobby.len(),
            uptime_secs = started.elapsed().as_secs(),
            "server status"
        );
    }
}
