//! Hosting layer for the skirmish engine.
//!
//! `skirmish-session` wraps the pure `skirmish-core` rules in everything a
//! running game needs: the authoritative [`GameSession`] writer, production
//! oracle implementations (rule tables, equipment catalog, seeded dice),
//! asynchronous decision providers for bot-driven seats, a peer transport for
//! two-player sync, and snapshot save/verify for persistence and resync.
pub mod error;
pub mod oracle;
pub mod provider;
pub mod session;
pub mod snapshot;
pub mod transport;

pub use error::{Result, SessionError};
pub use oracle::{ChaChaDice, EquipmentCatalog, StandardRules};
pub use provider::{BotProvider, PassingBot, ScheduledDecision};
pub use session::GameSession;
pub use snapshot::{fingerprint, SavedGame};
pub use transport::{loopback_pair, Frame, Loopback, PeerTransport};
