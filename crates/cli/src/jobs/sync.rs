// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use ol_core::{JobId, Store};
use serde::{Deserialize, Serialize};

use super::{JobContext, LocalStep, RemoteStep};
use crate::error::Result;
use crate::sync::SyncEngine;

/// Full reconciliation with the remote service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncJob {
    /// Requested by the user rather than forced by a stuck job.
    #[serde(default)]
    pub manual: bool,
}

impl LocalStep for SyncJob {
    fn apply_local(
        &mut self,
        _store: &Store<'_>,
        _job: &JobId,
        _now: DateTime<Utc>,
    ) -> ol_core::Result<()> {
        Ok(())
    }
}

impl RemoteStep for SyncJob {
    fn run_remote(&self, ctx: &JobContext<'_>) -> Result<()> {
        SyncEngine::from_context(ctx).sync()?;
        Ok(())
    }
}
