//! Notable things that happened during a tick, for the host to react to
//! (sounds, HUD popups, screen effects).

use glam::Vec3;

use crate::world::forest::QuadrantKey;

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Battery pickup collected; `battery` is the level after recharge
    PickupCollected { id: u32, battery: f32 },
    PursuerSpawned { position: Vec3 },
    /// Ghost left the player's view and reappeared elsewhere
    PursuerTeleported { position: Vec3 },
    PursuerCaptured,
    /// Ghost came close; the lantern is flickering
    LanternFlicker,
    DayNightToggled { is_day: bool, manual: bool },
    /// Low-battery flicker episode began
    FlickerStarted { duration_ms: u64 },
    BatteryDepleted,
    /// Quadrants streamed in or out this frame
    QuadrantsStreamed {
        activated: Vec<QuadrantKey>,
        deactivated: Vec<QuadrantKey>,
    },
}
