//! C5: the recorded-request store. A macro captures every request issued
//! between its opening and closing request (`ObjectBegin`/`ObjectEnd`,
//! `ArchiveBegin`/`ArchiveEnd`) and can replay them later against the live
//! backend (spec §4.5).

use crate::{RecordedRequest, RequestReplayer};
use rib_backend::{Backend, BackendResult};
use rib_errors::{Diagnostic, ErrorCode, ErrorReporter, Severity};

/// A captured request sequence. Construction begins on `ObjectBegin` /
/// `ArchiveBegin`; the dispatcher appends to it instead of emitting to the
/// backend until the matching `End` closes it (`is_defining` becomes
/// false). The macro owns its recorded requests exclusively.
#[derive(Debug, Clone)]
pub struct Macro {
    pub name: String,
    pub is_object: bool,
    pub is_defining: bool,
    pub valid: bool,
    requests: Vec<RecordedRequest>,
}

impl Macro {
    pub fn new(name: impl Into<String>, is_object: bool) -> Self {
        Self {
            name: name.into(),
            is_object,
            is_defining: true,
            valid: true,
            requests: Vec::new(),
        }
    }

    /// Append a captured request. Only legal while `is_defining`.
    pub fn record(&mut self, request: RecordedRequest) {
        debug_assert!(self.is_defining, "recording into a closed macro");
        self.requests.push(request);
    }

    /// A capture error occurred; the macro stays around (so replay can
    /// still surface the diagnostic) but is flagged invalid.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Close the macro on the matching `End` request.
    pub fn close(&mut self) {
        self.is_defining = false;
    }

    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    fn report_if_invalid(&self, reporter: &mut dyn ErrorReporter, source_name: &str) {
        if !self.valid {
            reporter.report(Diagnostic::new(
                ErrorCode::ProtocolBotch,
                Severity::Warning,
                0,
                source_name,
                format!("replaying macro \"{}\" which captured at least one error", self.name),
            ));
        }
    }

    /// Object replay (spec §4.5.1): replay every request, used by
    /// `ObjectInstance`.
    pub fn replay_object(
        &self,
        replayer: &mut dyn RequestReplayer,
        backend: &mut dyn Backend,
        reporter: &mut dyn ErrorReporter,
    ) -> BackendResult<()> {
        self.report_if_invalid(reporter, &self.name);
        for request in &self.requests {
            backend.set_context(&self.name, request.line)?;
            replayer.replay(backend, request)?;
        }
        Ok(())
    }

    /// Archive replay (spec §4.5.2): replay every request, additionally
    /// invoking `on_chain_record` for every `ArchiveRecord`/`ReadArchive` so
    /// chained archives propagate their comment stream.
    pub fn replay_archive(
        &self,
        replayer: &mut dyn RequestReplayer,
        backend: &mut dyn Backend,
        reporter: &mut dyn ErrorReporter,
        mut on_chain_record: impl FnMut(&RecordedRequest),
    ) -> BackendResult<()> {
        self.report_if_invalid(reporter, &self.name);
        for request in &self.requests {
            backend.set_context(&self.name, request.line)?;
            if request.name == "ArchiveRecord" || request.name == "ReadArchive" {
                on_chain_record(request);
            }
            replayer.replay(backend, request)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rib_backend::RecordingBackend;
    use rib_errors::CollectingReporter;
    use rib_model::{ParameterList, Value};

    struct EchoReplayer;
    impl RequestReplayer for EchoReplayer {
        fn replay(&mut self, backend: &mut dyn Backend, request: &RecordedRequest) -> BackendResult<()> {
            match request.name.as_str() {
                "Translate" => {
                    let f = |i: usize| request.args[i].get_floats().unwrap()[0];
                    backend.translate(f(0), f(1), f(2))
                }
                other => panic!("unhandled request in test replayer: {other}"),
            }
        }
    }

    #[test]
    fn replays_captured_requests_in_order() {
        let mut m = Macro::new("ball", true);
        m.record(RecordedRequest::new(
            "Translate",
            1,
            vec![
                Value::scalar_float(1.0, 1),
                Value::scalar_float(0.0, 1),
                Value::scalar_float(0.0, 1),
            ],
            ParameterList::new(),
        ));
        m.close();

        let mut backend = RecordingBackend::new();
        let mut replayer = EchoReplayer;
        let mut reporter = CollectingReporter::default();
        m.replay_object(&mut replayer, &mut backend, &mut reporter)
            .unwrap();
        assert_eq!(backend.calls.len(), 1);
        assert_eq!(backend.calls[0].name, "Translate");
        assert!(reporter.diagnostics.is_empty());
    }

    #[test]
    fn invalid_macro_reports_diagnostic_on_replay() {
        let mut m = Macro::new("broken", true);
        m.invalidate();
        m.close();
        let mut backend = RecordingBackend::new();
        let mut replayer = EchoReplayer;
        let mut reporter = CollectingReporter::default();
        m.replay_object(&mut replayer, &mut backend, &mut reporter)
            .unwrap();
        assert_eq!(reporter.diagnostics.len(), 1);
    }

    #[test]
    fn archive_replay_invokes_chain_callback_on_archive_record() {
        let mut m = Macro::new("chunk.rib", false);
        m.record(RecordedRequest::new(
            "ArchiveRecord",
            1,
            vec![
                Value::scalar_string("comment".into(), 1),
                Value::scalar_string("hello".into(), 1),
            ],
            ParameterList::new(),
        ));
        m.close();

        struct NoOpReplayer;
        impl RequestReplayer for NoOpReplayer {
            fn replay(&mut self, _backend: &mut dyn Backend, _request: &RecordedRequest) -> BackendResult<()> {
                Ok(())
            }
        }

        let mut backend = RecordingBackend::new();
        let mut replayer = NoOpReplayer;
        let mut reporter = CollectingReporter::default();
        let mut seen = 0;
        m.replay_archive(&mut replayer, &mut backend, &mut reporter, |_req| {
            seen += 1;
        })
        .unwrap();
        assert_eq!(seen, 1);
    }
}
