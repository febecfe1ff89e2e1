//! Firmware-specific flight-mode resolution tables (SPEC_FULL.md §5.7's
//! addition: `spec.md` requires "autopilot-specific tables" without
//! enumerating them).

use msp_proto::commands::{BoxIds, ModeRanges};

/// ArduCopter's `custom_mode` index table (a subset: the indices this core
/// recognizes, matching the upstream `ArduCopter::Mode::Number` enum).
pub fn arducopter_mode_name(custom_mode: u32) -> &'static str {
    match custom_mode {
        0 => "STABILIZE",
        1 => "ACRO",
        2 => "ALT_HOLD",
        3 => "AUTO",
        4 => "GUIDED",
        5 => "LOITER",
        6 => "RTL",
        7 => "CIRCLE",
        9 => "LAND",
        11 => "DRIFT",
        13 => "SPORT",
        14 => "FLIP",
        15 => "AUTOTUNE",
        16 => "POSHOLD",
        17 => "BRAKE",
        18 => "THROW",
        19 => "AVOID_ADSB",
        20 => "GUIDED_NOGPS",
        21 => "SMART_RTL",
        22 => "FLOWHOLD",
        23 => "FOLLOW",
        24 => "ZIGZAG",
        25 => "SYSTEMID",
        26 => "AUTOROTATE",
        _ => "UNKNOWN",
    }
}

/// PX4 packs `custom_mode` as `main_mode` in bits 16..23 and `sub_mode` in
/// bits 24..31 (`px4_custom_mode` union upstream).
pub fn px4_mode_name(custom_mode: u32) -> &'static str {
    let main_mode = (custom_mode >> 16) & 0xFF;
    let sub_mode = (custom_mode >> 24) & 0xFF;
    match main_mode {
        1 => "MANUAL",
        2 => "ALTCTL",
        3 => "POSCTL",
        4 => match sub_mode {
            1 => "AUTO_READY",
            2 => "AUTO_TAKEOFF",
            3 => "AUTO_LOITER",
            4 => "AUTO_MISSION",
            5 => "AUTO_RTL",
            6 => "AUTO_LAND",
            8 => "AUTO_FOLLOW_TARGET",
            _ => "AUTO",
        },
        5 => "ACRO",
        6 => "OFFBOARD",
        7 => "STABILIZED",
        8 => "RATTITUDE",
        _ => "UNKNOWN",
    }
}

/// Resolve the MSP active-mode name from `MSP_BOXIDS` + `MSP_MODE_RANGES`:
/// a box is active when the aux channel it's bound to sits inside
/// `[start_step, end_step)` (channel value mapped to a step via the
/// firmware's 25us-per-step convention, `(value - 900) / 25`).
pub fn msp_active_box_name(box_ids: &BoxIds, ranges: &ModeRanges, aux_channels: &[u16]) -> Option<&'static str> {
    for range in &ranges.ranges {
        let Some(&channel_value) = aux_channels.get(range.aux_channel_index as usize) else {
            continue;
        };
        let step = ((channel_value.saturating_sub(900)) / 25) as u8;
        if step >= range.start_step && step < range.end_step {
            if let Some(name) = box_name(box_ids, range.box_id) {
                return Some(name);
            }
        }
    }
    None
}

fn box_name(box_ids: &BoxIds, box_id: u8) -> Option<&'static str> {
    if !box_ids.ids.contains(&box_id) {
        return None;
    }
    Some(match box_id {
        0 => "ARM",
        1 => "ANGLE",
        2 => "HORIZON",
        26 => "AIR",
        27 => "NAV_RTH",
        28 => "NAV_POSHOLD",
        _ => "BOX",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arducopter_known_and_unknown_indices() {
        assert_eq!(arducopter_mode_name(4), "GUIDED");
        assert_eq!(arducopter_mode_name(250), "UNKNOWN");
    }

    #[test]
    fn px4_auto_submode_resolves_to_mission() {
        let custom_mode = (4u32 << 16) | (4u32 << 24);
        assert_eq!(px4_mode_name(custom_mode), "AUTO_MISSION");
    }

    #[test]
    fn msp_box_resolves_when_aux_channel_in_range() {
        let ids = BoxIds { ids: vec![0, 1] };
        let ranges = ModeRanges {
            ranges: vec![msp_proto::commands::ModeRange {
                box_id: 1,
                aux_channel_index: 0,
                start_step: 20,
                end_step: 36,
            }],
        };
        let aux = [1800u16];
        assert_eq!(msp_active_box_name(&ids, &ranges, &aux), Some("ANGLE"));
    }
}
