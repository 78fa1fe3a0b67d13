//! `BattleServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → session → room,
//! with the judge and the problem catalogue as injected collaborators.
//! The registry and lobby are constructed once here and passed down
//! explicitly — nothing in the core reaches for a global.

use std::sync::Arc;

use codeduel_judge::Judge;
use codeduel_problems::Problem;
use codeduel_room::Registry;
use codeduel_session::Lobby;
use codeduel_transport::WsListener;

use crate::handler::handle_connection;
use crate::sweeper::spawn_sweepers;
use crate::{ServerConfig, ServerError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<J: Judge> {
    pub(crate) registry: Registry,
    pub(crate) lobby: Lobby,
    pub(crate) judge: J,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a battle server.
///
/// # Example
///
/// ```rust,ignore
/// let server = BattleServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(SandboxJudge::new(...))
///     .await?;
/// server.run().await
/// ```
pub struct BattleServerBuilder {
    config: ServerConfig,
    problems: Option<Vec<Problem>>,
}

impl BattleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            problems: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_owned();
        self
    }

    /// Supplies the problem catalogue directly instead of loading it
    /// from `config.problems_path`. Tests use this; production loads
    /// the file.
    pub fn problems(mut self, problems: Vec<Problem>) -> Self {
        self.problems = Some(problems);
        self
    }

    /// Binds the listener and assembles the server around `judge`.
    pub async fn build<J: Judge>(
        self,
        judge: J,
    ) -> Result<BattleServer<J>, ServerError> {
        let listener = WsListener::bind(&self.config.bind_addr).await?;

        let problems: Arc<[Problem]> = match self.problems {
            Some(problems) => problems.into(),
            None => codeduel_problems::load(&self.config.problems_path).into(),
        };

        let registry = Registry::new(self.config.room_config(), problems);
        let state = Arc::new(ServerState {
            registry,
            lobby: Lobby::new(),
            judge,
            config: self.config,
        });

        Ok(BattleServer { listener, state })
    }
}

impl Default for BattleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running battle server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BattleServer<J: Judge> {
    listener: WsListener,
    state: Arc<ServerState<J>>,
}

impl<J: Judge> BattleServer<J> {
    /// Creates a new builder.
    pub fn builder() -> BattleServerBuilder {
        BattleServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop: one handler task per connection, plus the
    /// background sweeps. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        spawn_sweepers(Arc::clone(&self.state));
        tracing::info!("codeduel server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
