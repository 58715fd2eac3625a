//! Fixed mapping from input keys to EventServer button descriptors.

use super::PartialEvent;

/// Translates one changed input into its outbound descriptors.
///
/// Digital buttons yield one descriptor, triggers one with a 256x scaled
/// magnitude, and stick axes an active/release pair so the receiver never
/// holds a stale directional press. Keys outside the table yield nothing;
/// that is intentional, not an error.
pub fn translate(key: &str, value: i32) -> Vec<PartialEvent> {
    let amount = value as i64;
    match key {
        "a" => vec![PartialEvent::digital("A")],
        "b" => vec![PartialEvent::digital("B")],
        "x" => vec![PartialEvent::digital("X")],
        "y" => vec![PartialEvent::digital("Y")],

        "up" => vec![PartialEvent::digital("dpadup")],
        "down" => vec![PartialEvent::digital("dpaddown")],
        "left" => vec![PartialEvent::digital("dpadleft")],
        "right" => vec![PartialEvent::digital("dpadright")],

        "white" => vec![PartialEvent::digital("white")],
        "black" => vec![PartialEvent::digital("black")],

        "start" => vec![PartialEvent::digital("start")],
        "back" => vec![PartialEvent::digital("back")],

        "las" => vec![PartialEvent::digital("leftthumbbutton")],
        "ras" => vec![PartialEvent::digital("rightthumbbutton")],

        "rtrigger" => vec![PartialEvent::trigger("rightanalogtrigger", amount * 256)],
        "ltrigger" => vec![PartialEvent::trigger("leftanalogtrigger", amount * 256)],

        "rasX" => axis_pair(value, "rightthumbstickright", "rightthumbstickleft"),
        "rasY" => axis_pair(value, "rightthumbstickdown", "rightthumbstickup"),
        "lasX" => axis_pair(value, "leftthumbstickright", "leftthumbstickleft"),
        "lasY" => axis_pair(value, "leftthumbstickdown", "leftthumbstickup"),

        _ => Vec::new(),
    }
}

/// Active press toward the direction of travel plus an explicit release of
/// the opposite direction. `value > 0` selects the positive-direction name;
/// zero ties to the negative branch.
fn axis_pair(value: i32, positive: &'static str, negative: &'static str) -> Vec<PartialEvent> {
    let amount = (value as i64).abs() * 2;
    let (active, release) = if value > 0 {
        (positive, negative)
    } else {
        (negative, positive)
    };
    vec![
        PartialEvent::axis_active(active, amount),
        PartialEvent::axis_release(release),
    ]
}
