//! The `RequestReplayer` implementation that closes the loop described in
//! spec §4.5: replaying a macro re-drives the exact same per-request
//! dispatch logic `dispatch_bound` uses for live requests, so there is only
//! one place that knows how to turn a request into backend calls.
//!
//! `rib_macro::RequestReplayer::replay` takes no context/reporter
//! parameters, so `Replayer` owns the render context by mutable borrow and
//! collects its own diagnostics rather than borrowing the caller's reporter
//! for the whole replay (which would alias it against the reporter
//! `Macro::replay_object`/`replay_archive` also take directly). Callers
//! drain `into_diagnostics` into their own reporter once replay finishes.

use crate::context::Context;
use crate::dispatch::dispatch_bound;
use rib_backend::{Backend, BackendResult};
use rib_errors::{CollectingReporter, Diagnostic};
use rib_macro::{RecordedRequest, RequestReplayer};

pub struct Replayer<'a> {
    ctx: &'a mut Context,
    diagnostics: CollectingReporter,
}

impl<'a> Replayer<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        Self {
            ctx,
            diagnostics: CollectingReporter::default(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.diagnostics
    }
}

impl RequestReplayer for Replayer<'_> {
    fn replay(&mut self, backend: &mut dyn Backend, request: &RecordedRequest) -> BackendResult<()> {
        dispatch_bound(
            self.ctx,
            backend,
            &request.name,
            &request.args,
            &request.params,
            &mut self.diagnostics,
            request.line,
        )
    }
}
