// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::db::META_TOKEN;
use ol_core::{JobId, Store};
use serde::{Deserialize, Serialize};

use super::{JobContext, LocalStep, RemoteStep};
use crate::error::Result;
use crate::events::Event;

/// Checks a candidate API token and persists it when the service accepts it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyTokenJob {
    pub token: String,
}

impl std::fmt::Debug for VerifyTokenJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyTokenJob").finish_non_exhaustive()
    }
}

impl LocalStep for VerifyTokenJob {
    fn validate(&self, _store: &Store<'_>) -> ol_core::Result<()> {
        if self.token.trim().is_empty() {
            return Err(ol_core::Error::InvalidInput("token cannot be empty".to_string()));
        }
        Ok(())
    }

    fn apply_local(
        &mut self,
        _store: &Store<'_>,
        _job: &JobId,
        _now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        Ok(())
    }
}

impl RemoteStep for VerifyTokenJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        let token = self.token.trim();
        ctx.call_as(token, |r, t| r.list_files(t))?;
        ctx.db.set_meta(META_TOKEN, token)?;
        tracing::info!("api token verified");
        ctx.events.emit(Event::Authenticated { success: true });
        Ok(())
    }
}
