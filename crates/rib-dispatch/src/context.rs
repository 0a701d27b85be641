//! Per-render-context mutable state (spec §5 "shared-resource policy":
//! everything mutable lives per context, never shared across them).

use rib_backend::{Backend, BackendResult, HandleId};
use rib_config::RenderConfig;
use rib_errors::ErrorReporter;
use rib_handles::HandleMaps;
use rib_macro::{Macro, RecordedRequest};
use rib_model::ParameterList;
use rib_state::{ConditionalStack, ModeStack};
use std::collections::HashMap;

/// Hook the host implements to resolve a `ReadArchive` name that isn't a
/// previously-defined in-memory archive (spec §4.5.2) — i.e. an external
/// RIB file. `rib-dispatch` only depends on `rib-lexer`/`rib-parser` in its
/// tests, so the byte-stream parsing loop for an external archive lives on
/// the host side; this trait is the seam back into it.
pub trait ArchiveLoader {
    fn read_archive(
        &mut self,
        ctx: &mut Context,
        backend: &mut dyn Backend,
        reporter: &mut dyn ErrorReporter,
        name: &str,
        params: &ParameterList,
    ) -> BackendResult<()>;
}

/// A loader that treats every unresolved `ReadArchive` as missing. Used by
/// tests and by hosts that only ever replay in-memory archives.
#[derive(Default)]
pub struct NullArchiveLoader;

impl ArchiveLoader for NullArchiveLoader {
    fn read_archive(
        &mut self,
        _ctx: &mut Context,
        _backend: &mut dyn Backend,
        reporter: &mut dyn ErrorReporter,
        name: &str,
        _params: &ParameterList,
    ) -> BackendResult<()> {
        reporter.report(rib_errors::Diagnostic::new(
            rib_errors::ErrorCode::MissingFile,
            rib_errors::Severity::Error,
            0,
            "",
            format!("archive \"{name}\" is neither defined in-memory nor resolvable by this host"),
        ));
        Ok(())
    }
}

/// One in-flight capture (spec §4.5: construction begins on
/// `ObjectBegin`/`ArchiveBegin`, appending replaces emission until the
/// matching `End`).
struct Capture {
    macro_: Macro,
    handle: HandleId,
}

/// Everything C4 needs across requests: render-wide config, the mode/motion/
/// conditional state machine, handle dictionaries, in-memory macros, and the
/// stack of captures currently in progress.
pub struct Context {
    pub config: RenderConfig,
    pub modes: ModeStack,
    pub conditionals: ConditionalStack,
    pub handles: HandleMaps,
    pub archive_loader: Box<dyn ArchiveLoader>,

    objects: HashMap<HandleId, Macro>,
    archives: HashMap<HandleId, Macro>,
    capture_stack: Vec<Capture>,
    motion: Option<rib_state::MotionBlock>,
    source_name: String,
}

impl Context {
    pub fn new(config: RenderConfig, source_name: impl Into<String>) -> Self {
        Self {
            config,
            modes: ModeStack::new(),
            conditionals: ConditionalStack::new(),
            handles: HandleMaps::new(),
            archive_loader: Box::new(NullArchiveLoader),
            objects: HashMap::new(),
            archives: HashMap::new(),
            capture_stack: Vec::new(),
            motion: None,
            source_name: source_name.into(),
        }
    }

    pub fn with_archive_loader(mut self, loader: Box<dyn ArchiveLoader>) -> Self {
        self.archive_loader = loader;
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether a request encountered right now should be captured into the
    /// innermost open macro instead of dispatched to the backend (spec
    /// §4.5).
    pub fn is_capturing(&self) -> bool {
        !self.capture_stack.is_empty()
    }

    pub fn begin_capture(&mut self, name: impl Into<String>, is_object: bool, handle: HandleId) {
        self.handles_push_scope();
        self.capture_stack.push(Capture {
            macro_: Macro::new(name, is_object),
            handle,
        });
    }

    /// Close the innermost capture and file it under its handle for later
    /// replay. Returns `false` if no capture was open.
    pub fn end_capture(&mut self, is_object: bool) -> bool {
        let Some(mut capture) = self.capture_stack.pop() else {
            return false;
        };
        self.handles_pop_scope();
        capture.macro_.close();
        if is_object {
            self.objects.insert(capture.handle, capture.macro_);
        } else {
            self.archives.insert(capture.handle, capture.macro_);
        }
        true
    }

    /// Invalidate (but do not discard) the innermost open capture on a
    /// capture-time error (spec §3 "valid flag becomes false on any capture
    /// error").
    pub fn invalidate_capture(&mut self) {
        if let Some(capture) = self.capture_stack.last_mut() {
            capture.macro_.invalidate();
        }
    }

    pub fn record(&mut self, request: RecordedRequest) {
        if let Some(capture) = self.capture_stack.last_mut() {
            capture.macro_.record(request);
        }
    }

    pub fn object(&self, handle: HandleId) -> Option<&Macro> {
        self.objects.get(&handle)
    }

    pub fn archive(&self, handle: HandleId) -> Option<&Macro> {
        self.archives.get(&handle)
    }

    pub fn begin_motion(&mut self, times: &[f32]) {
        self.motion = Some(rib_state::MotionBlock::new(times));
    }

    pub fn record_motion_sample(
        &mut self,
        name: &str,
        args: &[rib_model::Value],
        line: u32,
    ) -> Result<(), rib_errors::Diagnostic> {
        match &mut self.motion {
            Some(block) => block.record(name, args, line, &self.source_name),
            None => Ok(()),
        }
    }

    pub fn end_motion(&mut self, line: u32) -> Result<(), rib_errors::Diagnostic> {
        let block = self.motion.take();
        match block {
            Some(block) => block.finish(line, &self.source_name),
            None => Ok(()),
        }
    }

    pub fn in_motion(&self) -> bool {
        self.motion.is_some()
    }

    fn handles_push_scope(&mut self) {
        self.handles.push_scope();
    }

    fn handles_pop_scope(&mut self) {
        self.handles.pop_scope();
    }
}
