use crate::ellipse::EllipseRegion;
use crate::entity::SpawnPoint;
use crate::VehicleId;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[allow(unused)]
pub(crate) fn debug_region(region: &EllipseRegion) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "region",
            "centre": [region.outer.centre.x, region.outer.centre.y],
            "heading": region.outer.heading,
            "outer": [region.outer.smja, region.outer.smna],
            "mid": [region.mid.smja, region.mid.smna],
            "inner": [region.inner.smja, region.inner.smna],
        }))
    })
}

#[allow(unused)]
pub(crate) fn debug_spawn(id: VehicleId, spawn: &SpawnPoint) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "spawn",
            "vehicle": format!("{:?}", id),
            "model": spawn.model,
            "pos": [spawn.pos.x, spawn.pos.y],
            "road": spawn.road.0,
            "lane": spawn.lane,
            "s": spawn.s,
        }))
    })
}

#[allow(unused)]
pub(crate) fn debug_despawn(id: VehicleId) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "despawn",
            "vehicle": format!("{:?}", id),
        }))
    })
}

#[cfg(feature = "debug")]
pub(crate) fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
