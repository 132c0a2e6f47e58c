use attachkit_core::TargetId;

/// Where a set of attachment collections lives: keyed by a known target id,
/// or in the draft buffers of an entity still being composed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Target(TargetId),
    Draft,
}

impl Scope {
    pub fn from_target(target: Option<TargetId>) -> Self {
        match target {
            Some(target) => Scope::Target(target),
            None => Scope::Draft,
        }
    }

    pub fn target(&self) -> Option<&TargetId> {
        match self {
            Scope::Target(target) => Some(target),
            Scope::Draft => None,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Scope::Draft)
    }
}

impl From<TargetId> for Scope {
    fn from(target: TargetId) -> Self {
        Scope::Target(target)
    }
}
