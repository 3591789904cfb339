//! How objects respond to dynamic-collision hits.
//!
//! The collision registry only detects overlaps. Whether a hit counts and what
//! it does is decided here:
//!
//! - [`HitReaction::accept_hit`] is the attacker-side veto. Dead attackers,
//!   dead victims and harmful hits on invulnerable victims are rejected.
//! - [`apply_hit`] is the victim-side effect of an accepted hit.
//! - [`ObjectArbiter`] wires both to the object pool and the systems that
//!   give feedback (sound, hit-stop, channels, telemetry).

use glam::Vec2;
use stash::ObjectPool;

use super::{ActionType, GameObject, ObjectFlags, ObjectHandle, ObjectState, Pickup};
use crate::channel::{ChannelId, ChannelSystem, ChannelValue};
use crate::collision::{HitArbiter, HitType};
use crate::sound::{SoundHandle, SoundSystem, PRIORITY_NORMAL};
use crate::telemetry::{EventRecorder, GameEvent};
use crate::time::TimeSystem;

/// Per-object hit settings and history.
#[derive(Debug, Clone, PartialEq)]
pub struct HitReaction {
    /// Seconds of invulnerability after taking a harmful hit.
    pub invulnerability_time: f32,
    /// Velocity given to victims of this object's launch hits.
    pub launch_impulse: Vec2,
    /// Real seconds of hit-stop when this object lands a harmful hit.
    pub freeze_on_hit: f32,
    /// Played when this object lands a hit.
    pub deal_hit_sound: Option<SoundHandle>,
    /// Played when this object takes a hit.
    pub take_hit_sound: Option<SoundHandle>,
    /// Set to `true` when this object is depressed.
    pub depress_channel: Option<ChannelId>,
    invulnerable_until: f32,
    last_hit: Option<(HitType, f32)>,
}

impl Default for HitReaction {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl HitReaction {
    /// Creates a reaction with `invulnerability_time` seconds of grace after
    /// harmful hits.
    #[must_use]
    pub fn new(invulnerability_time: f32) -> Self {
        Self {
            invulnerability_time,
            launch_impulse: Vec2::ZERO,
            freeze_on_hit: 0.0,
            deal_hit_sound: None,
            take_hit_sound: None,
            depress_channel: None,
            invulnerable_until: f32::NEG_INFINITY,
            last_hit: None,
        }
    }

    /// Sets the launch impulse.
    #[must_use]
    pub fn with_launch_impulse(mut self, impulse: Vec2) -> Self {
        self.launch_impulse = impulse;
        self
    }

    /// Sets the hit-stop duration.
    #[must_use]
    pub fn with_freeze_on_hit(mut self, seconds: f32) -> Self {
        self.freeze_on_hit = seconds;
        self
    }

    /// Sets the channel written when depressed.
    #[must_use]
    pub fn with_depress_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.depress_channel = channel;
        self
    }

    /// Returns `true` while inside the post-hit grace window.
    #[must_use]
    pub fn is_invulnerable(&self, now: f32) -> bool {
        now < self.invulnerable_until
    }

    /// Attacker-side decision for a detected hit.
    #[must_use]
    pub fn accept_hit(
        &self,
        attacker_alive: bool,
        victim_alive: bool,
        hit: HitType,
        victim_invulnerable: bool,
    ) -> bool {
        hit != HitType::Invalid
            && attacker_alive
            && victim_alive
            && !(hit.is_harmful() && victim_invulnerable)
    }

    /// Records a received hit at game time `now`.
    pub fn record_hit(&mut self, hit: HitType, now: f32) {
        self.last_hit = Some((hit, now));
        if hit.is_harmful() {
            self.invulnerable_until = now + self.invulnerability_time;
        }
    }

    /// Type and time of the last accepted hit received.
    #[must_use]
    pub fn last_hit(&self) -> Option<(HitType, f32)> {
        self.last_hit
    }
}

/// Effect of an accepted hit on its victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Nothing changed (e.g. collecting a non-collectible).
    Ignored,
    /// Life lost, still alive.
    Damaged,
    /// Life reached zero.
    Killed,
    /// The victim was picked up.
    Collected(Pickup),
    /// The attacker took control of the victim.
    Possessed,
    /// The victim was pressed.
    Depressed,
    /// The victim was thrown.
    Launched,
}

/// Applies an accepted hit to `victim` at game time `now`.
pub fn apply_hit(
    attacker_handle: ObjectHandle,
    attacker: &mut ObjectState,
    victim: &mut ObjectState,
    hit: HitType,
    now: f32,
) -> HitOutcome {
    let outcome = match hit {
        HitType::Invalid => HitOutcome::Ignored,
        HitType::Hit => {
            victim.life -= 1;
            if victim.is_alive() {
                victim.action = ActionType::HitReact;
                HitOutcome::Damaged
            } else {
                victim.action = ActionType::Death;
                HitOutcome::Killed
            }
        }
        HitType::Death => {
            victim.life = 0;
            victim.action = ActionType::Death;
            HitOutcome::Killed
        }
        HitType::Collect => match victim.pickup.take() {
            Some(pickup) => {
                attacker.inventory.add(pickup);
                victim.life = 0;
                HitOutcome::Collected(pickup)
            }
            None => HitOutcome::Ignored,
        },
        HitType::Possess => {
            victim.flags.insert(ObjectFlags::POSSESSED);
            victim.possessed_by = Some(attacker_handle);
            HitOutcome::Possessed
        }
        HitType::Depress => HitOutcome::Depressed,
        HitType::Launch => {
            let impulse = attacker
                .hit_reaction
                .as_ref()
                .map_or(Vec2::ZERO, |reaction| reaction.launch_impulse);
            victim.velocity = impulse;
            HitOutcome::Launched
        }
    };

    if outcome != HitOutcome::Ignored {
        if let Some(reaction) = victim.hit_reaction.as_mut() {
            reaction.record_hit(hit, now);
        }
    }
    outcome
}

/// [`HitArbiter`] backed by the object pool.
pub struct ObjectArbiter<'a> {
    /// Objects hits are applied to.
    pub objects: &'a mut ObjectPool<GameObject>,
    /// Clock for invulnerability windows and hit-stop.
    pub time: &'a mut TimeSystem,
    /// Channels written by depressed objects.
    pub channels: &'a mut ChannelSystem,
    /// Optional hit sounds.
    pub sound: Option<&'a mut Box<dyn SoundSystem>>,
    /// Hit and pickup counters.
    pub recorder: &'a EventRecorder,
}

impl ObjectArbiter<'_> {
    fn play(&mut self, sound: Option<SoundHandle>) {
        if let (Some(system), Some(sound)) = (self.sound.as_mut(), sound) {
            system.play(sound, false, PRIORITY_NORMAL);
        }
    }
}

impl HitArbiter for ObjectArbiter<'_> {
    fn accept_hit(&mut self, attacker: ObjectHandle, victim: ObjectHandle, hit: HitType) -> bool {
        let now = self.time.game_time();
        let Some((attacker_object, victim_object)) = self.objects.get_pair_mut(attacker, victim)
        else {
            return false;
        };
        let Some(reaction) = attacker_object.state.hit_reaction.as_ref() else {
            return false;
        };
        let victim_invulnerable = victim_object
            .state
            .hit_reaction
            .as_ref()
            .is_some_and(|victim_reaction| victim_reaction.is_invulnerable(now));
        reaction.accept_hit(
            attacker_object.state.is_alive(),
            victim_object.state.is_alive(),
            hit,
            victim_invulnerable,
        )
    }

    fn hit_victim(
        &mut self,
        attacker: ObjectHandle,
        victim: ObjectHandle,
        hit: HitType,
        accepted: bool,
    ) {
        let now = self.time.game_time();
        let Some((attacker_object, victim_object)) = self.objects.get_pair_mut(attacker, victim)
        else {
            return;
        };
        if victim_object.state.hit_reaction.is_none() {
            return;
        }
        if !accepted {
            self.recorder.record(GameEvent::HitRejected { hit_type: hit });
            return;
        }

        let outcome = apply_hit(
            attacker,
            &mut attacker_object.state,
            &mut victim_object.state,
            hit,
            now,
        );
        if outcome == HitOutcome::Ignored {
            return;
        }

        let attacker_kind = attacker_object.state.kind;
        let victim_kind = victim_object.state.kind;
        let (deal_sound, freeze) = attacker_object
            .state
            .hit_reaction
            .as_ref()
            .map_or((None, 0.0), |reaction| {
                (reaction.deal_hit_sound, reaction.freeze_on_hit)
            });
        let (take_sound, depress_channel) = victim_object
            .state
            .hit_reaction
            .as_ref()
            .map_or((None, None), |reaction| {
                (reaction.take_hit_sound, reaction.depress_channel)
            });

        if outcome == HitOutcome::Depressed {
            if let Some(channel) = depress_channel {
                self.channels.set(channel, ChannelValue::Bool(true));
            }
        }
        if hit.is_harmful() && freeze > 0.0 {
            self.time.freeze(freeze);
        }
        self.play(deal_sound);
        self.play(take_sound);

        self.recorder.record(GameEvent::HitLanded {
            attacker: attacker_kind,
            victim: victim_kind,
            hit_type: hit,
        });
        if let HitOutcome::Collected(pickup) = outcome {
            self.recorder.record(GameEvent::PickupCollected { pickup });
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
