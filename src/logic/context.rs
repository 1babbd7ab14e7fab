//! Request context: who is acting, and whether they confirmed editing earlier rounds.

use crate::models::{Tournament, TournamentId};
use serde::{Deserialize, Serialize};

/// One-time permission to edit results of rounds before the current one.
///
/// Stamped with the tournament's transition epoch, so any later open/delete transition voids it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOverride {
    pub tournament_id: TournamentId,
    pub epoch: u64,
}

/// Caller identity and session-scoped flags, passed explicitly into every engine operation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestContext {
    pub actor: Option<String>,
    pub is_admin: bool,
    pub edit_override: Option<EditOverride>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            actor: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            actor: Some(name.into()),
            is_admin: true,
            edit_override: None,
        }
    }

    pub fn with_override(mut self, edit_override: EditOverride) -> Self {
        self.edit_override = Some(edit_override);
        self
    }

    /// Owner or admin.
    pub fn may_mutate(&self, tournament: &Tournament) -> bool {
        match &self.actor {
            Some(actor) => self.is_admin || *actor == tournament.owner,
            None => false,
        }
    }

    pub fn may_edit_previous_turns(&self, tournament: &Tournament) -> bool {
        self.edit_override.map_or(false, |o| {
            o.tournament_id == tournament.id && o.epoch == tournament.transition_epoch
        })
    }
}
