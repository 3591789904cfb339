//! Clip selection from the current action.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::object::{ActionType, Capabilities, ObjectState};
use crate::phase::Phase;
use crate::render::ClipIndex;

/// Clip to play for each [`ActionType`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationMap {
    clips: [Option<ClipIndex>; ActionType::COUNT],
}

impl AnimationMap {
    /// Assigns `clip` to `action`.
    #[must_use]
    pub fn with(mut self, action: ActionType, clip: ClipIndex) -> Self {
        self.clips[action.index()] = Some(clip);
        self
    }

    /// Clip for `action`. `None` means no animation.
    #[must_use]
    pub fn clip_for(&self, action: ActionType) -> Option<ClipIndex> {
        self.clips[action.index()]
    }
}

/// Picks the clip for the object's action and advances clip time, restarting
/// it whenever the clip changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationComponent {
    /// Action to clip table.
    pub map: AnimationMap,
}

impl AnimationComponent {
    /// Animates with `map`.
    #[must_use]
    pub fn new(map: AnimationMap) -> Self {
        Self { map }
    }
}

impl Behavior for AnimationComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "animation",
            phase: Phase::Animation,
            requires: Capabilities::ACTION,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        let clip = self.map.clip_for(state.action);
        if clip == state.clip {
            state.clip_time += ctx.dt;
        } else {
            state.clip = clip;
            state.clip_time = 0.0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::run_once;
    use crate::config::SimConfig;
    use crate::systems::Systems;

    #[test]
    fn clip_restarts_when_action_changes() {
        let mut systems = Systems::new(SimConfig::default(), 0);
        systems.time.update(0.1);
        let map = AnimationMap::default()
            .with(ActionType::Idle, ClipIndex(1))
            .with(ActionType::Move, ClipIndex(2));
        let mut animation = AnimationComponent::new(map);
        let mut state = ObjectState::default();

        run_once(&mut animation, &mut state, &mut systems).unwrap();
        assert_eq!((state.clip, state.clip_time), (Some(ClipIndex(1)), 0.0));
        run_once(&mut animation, &mut state, &mut systems).unwrap();
        assert_eq!(state.clip_time, 0.1);

        state.action = ActionType::Move;
        run_once(&mut animation, &mut state, &mut systems).unwrap();
        assert_eq!((state.clip, state.clip_time), (Some(ClipIndex(2)), 0.0));

        state.action = ActionType::Attack;
        run_once(&mut animation, &mut state, &mut systems).unwrap();
        assert_eq!((state.clip, state.clip_time), (None, 0.0));
    }

    #[test]
    fn unmapped_and_invalid_actions_have_no_clip() {
        let map = AnimationMap::default().with(ActionType::Idle, ClipIndex(1));
        assert_eq!(map.clip_for(ActionType::Idle), Some(ClipIndex(1)));
        assert_eq!(map.clip_for(ActionType::Invalid), None);
        assert_eq!(map.clip_for(ActionType::Hide), None);
        assert_eq!(map.clip_for(ActionType::Attack), None);
    }
}
