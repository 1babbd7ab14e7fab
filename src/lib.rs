//! Carrom tournament round engine: library with models, business logic and server configuration.

pub mod config;
pub mod logic;
pub mod models;

pub use config::ServerConfig;
pub use logic::{
    available_actions, AvailableActions, EditOverride, FirstRoundOrder, Pairing, PairingContext,
    PairingGenerator, RequestContext, ScoreValidator, StandardPairing, TournamentRoundEngine,
};
pub use models::{
    BoardResult, Competitor, CompetitorId, ErrorResponse, MatchId, MatchInput, MatchRecord,
    MatchStore, RoundState, ScoringMode, ScoringRules, Side, Standing, Tournament, TournamentError,
    TournamentId, TournamentSettings, TournamentSystem, TrainingBoard, TransitionOutcome,
    TransitionResponse,
};
