//! Publishes inventory changes.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::channel::{ChannelId, ChannelValue};
use crate::error::SimResult;
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;

/// Writes the coin count to a channel when the inventory changed this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryComponent {
    /// Channel receiving the coin count.
    pub coin_channel: Option<ChannelId>,
}

impl InventoryComponent {
    /// Publishes to `coin_channel`.
    #[must_use]
    pub fn new(coin_channel: Option<ChannelId>) -> Self {
        Self { coin_channel }
    }
}

impl Behavior for InventoryComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "inventory",
            phase: Phase::FrameEnd,
            requires: Capabilities::INVENTORY,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        if !state.inventory.take_dirty() {
            return Ok(());
        }
        if let Some(channel) = self.coin_channel {
            ctx.systems
                .channels
                .set(channel, ChannelValue::Float(state.inventory.coins as f32));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::run_once;
    use crate::config::SimConfig;
    use crate::object::Pickup;
    use crate::systems::Systems;

    #[test]
    fn publishes_only_when_dirty() {
        let mut systems = Systems::new(SimConfig::default(), 0);
        let coins = systems.channels.register("coins").unwrap();
        let mut inventory = InventoryComponent::new(Some(coins));
        let mut state = ObjectState::default();

        run_once(&mut inventory, &mut state, &mut systems).unwrap();
        assert_eq!(systems.channels.get(coins), ChannelValue::None);

        state.inventory.add(Pickup::Coin);
        state.inventory.add(Pickup::Coin);
        run_once(&mut inventory, &mut state, &mut systems).unwrap();
        assert_eq!(systems.channels.get(coins), ChannelValue::Float(2.0));

        // Clean frame: an outside write survives.
        systems.channels.set(coins, ChannelValue::Float(-1.0));
        run_once(&mut inventory, &mut state, &mut systems).unwrap();
        assert_eq!(systems.channels.get(coins), ChannelValue::Float(-1.0));
    }

    #[test]
    fn missing_channel_still_clears_dirty() {
        let mut systems = Systems::new(SimConfig::default(), 0);
        let mut inventory = InventoryComponent::new(None);
        let mut state = ObjectState::default();
        state.inventory.add(Pickup::Gem);

        run_once(&mut inventory, &mut state, &mut systems).unwrap();
        assert!(!state.inventory.take_dirty());
        assert_eq!(state.inventory.gems, 1);
    }
}
