//! The mode stack (spec §3, §4.7): legal-nesting validation for the
//! begin/end block kinds.

use rib_errors::{Diagnostic, ErrorCode, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Outer,
    Begin,
    Frame,
    World,
    Attribute,
    Transform,
    Solid,
    Object,
    Motion,
    If,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Outer => "outer",
            ModeKind::Begin => "begin",
            ModeKind::Frame => "frame",
            ModeKind::World => "world",
            ModeKind::Attribute => "attribute",
            ModeKind::Transform => "transform",
            ModeKind::Solid => "solid",
            ModeKind::Object => "object",
            ModeKind::Motion => "motion",
            ModeKind::If => "if",
        }
    }

    /// The block kinds this mode may legally contain (spec §3 "each frame
    /// records its kind and the allowed child requests").
    fn allowed_children(&self) -> &'static [ModeKind] {
        use ModeKind::*;
        match self {
            Outer => &[Begin],
            Begin => &[Frame, World, If],
            Frame => &[World, If],
            World => &[Attribute, Transform, Solid, Object, Motion, If],
            Attribute => &[Attribute, Transform, Solid, Motion, If],
            Transform => &[Attribute, Transform, Solid, Motion, If],
            Solid => &[Attribute, Transform, Solid, If],
            Object => &[Attribute, Transform, Solid, Motion, If],
            // Motion blocks contain only requests, never nested blocks
            // (spec §4.7 "matching signatures across time samples").
            Motion => &[],
            If => &[Attribute, Transform, Solid, Object, Motion, If],
        }
    }
}

struct Frame {
    kind: ModeKind,
}

/// A stack of open mode frames, validating every push/pop against the
/// legal-nesting table and exposing the queries a dispatcher needs before
/// calling the backend (is geometry legal here? is a light legal here?).
pub struct ModeStack {
    frames: Vec<Frame>,
}

impl ModeStack {
    /// A context is constructed already inside the `begin` frame: `RiBegin`
    /// is the host's C-API call that creates a context (spec §5 "a context
    /// holds its own parser, state stack..."), not a request that appears
    /// in the RIB stream itself, so a RIB file opens directly with
    /// `FrameBegin`/`WorldBegin` with no literal `Begin` request to push
    /// one. A literal `Begin`/`End` pair (spec's nested-context form) can
    /// still legally appear as a `Frame`/`World` sibling since `begin`
    /// permits `Frame`/`World` either way.
    pub fn new() -> Self {
        Self {
            frames: vec![
                Frame {
                    kind: ModeKind::Outer,
                },
                Frame {
                    kind: ModeKind::Begin,
                },
            ],
        }
    }

    pub fn current(&self) -> ModeKind {
        self.frames.last().expect("outer frame never popped").kind
    }

    /// Attempt to open a new `kind` block nested under the current one.
    pub fn push(&mut self, kind: ModeKind, line: u32, source_name: &str) -> Result<(), Diagnostic> {
        let top = self.current();
        if !top.allowed_children().contains(&kind) {
            return Err(Diagnostic::new(
                ErrorCode::InvalidNesting,
                Severity::Error,
                line,
                source_name,
                format!("{} block is not legal inside a {} block", kind.as_str(), top.as_str()),
            ));
        }
        self.frames.push(Frame { kind });
        Ok(())
    }

    /// Close the innermost block, asserting it matches `kind` (begin/end
    /// pairing, spec §3 "every begin matched by exactly one end").
    pub fn pop(&mut self, kind: ModeKind, line: u32, source_name: &str) -> Result<(), Diagnostic> {
        if self.current() != kind || self.frames.len() <= 1 {
            return Err(Diagnostic::new(
                ErrorCode::InvalidNesting,
                Severity::Error,
                line,
                source_name,
                format!("{}End does not match the innermost open block ({})", kind.as_str(), self.current().as_str()),
            ));
        }
        self.frames.pop();
        Ok(())
    }

    /// True if any open frame is `World` (geometry and lights require this;
    /// spec §3 "no geometric primitives outside a world block").
    pub fn in_world(&self) -> bool {
        self.frames.iter().any(|f| f.kind == ModeKind::World)
    }

    pub fn allow_geometry(&self) -> bool {
        self.in_world()
    }

    /// Lights may be created in `World` and its attribute/transform/if
    /// descendants, but not while capturing an `Object` or inside `Motion`
    /// (spec §4.7 "light creation only where the spec allows").
    pub fn allow_light(&self) -> bool {
        self.in_world()
            && !self
                .frames
                .iter()
                .any(|f| matches!(f.kind, ModeKind::Object | ModeKind::Motion))
    }

    /// Count of currently open frames of `kind` (supplemented feature: the
    /// original implementation keeps per-mode save-stack depth counters).
    pub fn depth_of(&self, kind: ModeKind) -> usize {
        self.frames.iter().filter(|f| f.kind == kind).count()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_context_is_already_inside_the_begin_frame() {
        let m = ModeStack::new();
        assert_eq!(m.current(), ModeKind::Begin);
        assert_eq!(m.depth(), 2);
    }

    #[test]
    fn world_nests_legally_under_begin_frame() {
        let mut m = ModeStack::new();
        m.push(ModeKind::Frame, 1, "a.rib").unwrap();
        m.push(ModeKind::World, 1, "a.rib").unwrap();
        assert!(m.in_world());
        assert!(m.allow_geometry());
    }

    #[test]
    fn world_direct_under_begin_without_frame_is_legal() {
        let mut m = ModeStack::new();
        assert!(m.push(ModeKind::World, 1, "a.rib").is_ok());
    }

    #[test]
    fn geometry_outside_world_is_disallowed() {
        let m = ModeStack::new();
        assert!(!m.allow_geometry());
    }

    #[test]
    fn mismatched_end_is_rejected() {
        let mut m = ModeStack::new();
        m.push(ModeKind::World, 1, "a.rib").unwrap();
        assert!(m.pop(ModeKind::Begin, 2, "a.rib").is_err());
    }

    #[test]
    fn motion_forbids_nested_blocks() {
        let mut m = ModeStack::new();
        m.push(ModeKind::World, 1, "a.rib").unwrap();
        m.push(ModeKind::Motion, 1, "a.rib").unwrap();
        assert!(m.push(ModeKind::Attribute, 2, "a.rib").is_err());
    }

    #[test]
    fn light_forbidden_inside_object_capture() {
        let mut m = ModeStack::new();
        m.push(ModeKind::World, 1, "a.rib").unwrap();
        m.push(ModeKind::Object, 1, "a.rib").unwrap();
        assert!(!m.allow_light());
    }

    #[test]
    fn depth_of_counts_nested_attribute_blocks() {
        let mut m = ModeStack::new();
        m.push(ModeKind::World, 1, "a.rib").unwrap();
        m.push(ModeKind::Attribute, 1, "a.rib").unwrap();
        m.push(ModeKind::Attribute, 1, "a.rib").unwrap();
        assert_eq!(m.depth_of(ModeKind::Attribute), 2);
    }
}
