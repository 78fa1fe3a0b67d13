//! # codeduel
//!
//! Head-to-head code battle server: two players share a room, race to
//! solve the same problem, and chip away at each other's health with
//! correct submissions. Last one standing wins.
//!
//! This crate is the assembly point — the accept loop, the matchmaking
//! supervisor, and the garbage collectors — over the layer crates:
//! `codeduel-transport` (WebSocket), `codeduel-protocol` (wire format),
//! `codeduel-session` (per-connection state and delivery),
//! `codeduel-room` (match state machine and registry),
//! `codeduel-judge` (sandboxed execution), and `codeduel-problems`
//! (the catalogue).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use codeduel::{BattleServer, ServerConfig};
//! use codeduel_judge::SandboxJudge;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let judge = SandboxJudge::new(
//!     config.judge_program.clone(),
//!     config.judge_args.clone(),
//!     config.judge_timeout,
//! );
//! let server = BattleServer::<SandboxJudge>::builder().config(config).build(judge).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod sweeper;

pub use config::{ConfigError, ServerConfig};
pub use error::ServerError;
pub use server::{BattleServer, BattleServerBuilder};
