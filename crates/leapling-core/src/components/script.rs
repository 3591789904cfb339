//! Level-specific behaviour hooks.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;

/// Signature of a script hook.
pub type ScriptFn = fn(&mut ObjectState, &mut UpdateContext<'_>) -> SimResult<()>;

/// Runs a plain function in a chosen phase.
///
/// Scripts declare their phase and required capabilities like any built-in
/// component, so they are ordered and validated the same way.
#[derive(Clone, Copy)]
pub struct ScriptComponent {
    /// Name used in errors and traces.
    pub name: &'static str,
    /// Phase to run in.
    pub phase: Phase,
    /// Capabilities the hook needs.
    pub requires: Capabilities,
    /// The hook.
    pub hook: ScriptFn,
}

impl ScriptComponent {
    /// A hook needing only a position.
    #[must_use]
    pub fn new(name: &'static str, phase: Phase, hook: ScriptFn) -> Self {
        Self {
            name,
            phase,
            requires: Capabilities::POSITION,
            hook,
        }
    }
}

impl std::fmt::Debug for ScriptComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptComponent")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

impl Behavior for ScriptComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: self.name,
            phase: self.phase,
            requires: self.requires,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        (self.hook)(state, ctx)
    }
}
