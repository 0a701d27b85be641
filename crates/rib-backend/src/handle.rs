/// An opaque token returned by a [`Backend`](crate::Backend) for
/// handle-emitting requests (`ObjectBegin`, `LightSource`,
/// `AreaLightSource`, `ArchiveBegin`). The core never inspects its value —
/// only C6 (`rib-handles`) stores and later looks it back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
