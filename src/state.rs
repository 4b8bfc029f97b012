// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::ChannelAuthenticator;
use crate::orchestrator::RequestOrchestrator;
use crate::storage::ResourceStore;

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub channel: ChannelAuthenticator,
    pub orchestrator: Arc<RequestOrchestrator>,
}

impl AppState {
    pub fn new(channel: ChannelAuthenticator, orchestrator: RequestOrchestrator) -> Self {
        Self {
            channel,
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn store(&self) -> &Arc<dyn ResourceStore> {
        self.orchestrator.store()
    }
}
