//! Finalizes partial descriptors: template defaults plus magnitude clamping.

use super::{ButtonEvent, PartialEvent, BUTTON_MAP};

/// Largest magnitude the BUTTON packet's amount field can carry.
pub const MAX_AMOUNT: i64 = 65535;

/// Merges the event template into a partial descriptor.
///
/// The template supplies `map` and `down` (the truthiness of the triggering
/// key's new value); it fills only fields the translator left unset, so an
/// explicit `down` always wins. A present nonzero amount is clamped into
/// `0..=65535`; a present 0 is passed through untouched.
pub fn finalize(partial: PartialEvent, pressed: bool) -> ButtonEvent {
    let amount = partial.amount.map(|amount| match amount {
        0 => 0,
        amount => amount.clamp(0, MAX_AMOUNT) as u16,
    });
    ButtonEvent {
        map: BUTTON_MAP,
        button: partial.button,
        down: partial.down.unwrap_or(pressed),
        amount,
        axis: partial.axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_fills_map_and_down() {
        let event = finalize(PartialEvent::digital("A"), true);
        assert_eq!(event.map, "XG");
        assert!(event.down);
        assert_eq!(event.amount, None);

        let event = finalize(PartialEvent::digital("A"), false);
        assert!(!event.down);
    }

    #[test]
    fn explicit_down_wins_over_the_template() {
        // an axis release stays a release even while its key reads nonzero
        let event = finalize(PartialEvent::axis_release("rightthumbstickleft"), true);
        assert!(!event.down);
        assert_eq!(event.amount, Some(0));
        assert!(event.axis);
    }

    #[test]
    fn nonzero_amounts_are_clamped() {
        let event = finalize(PartialEvent::axis_active("leftthumbstickup", 65536), true);
        assert_eq!(event.amount, Some(65535));

        let event = finalize(PartialEvent::trigger("rightanalogtrigger", 65280), true);
        assert_eq!(event.amount, Some(65280));
    }

    #[test]
    fn zero_amount_is_passed_through() {
        let event = finalize(PartialEvent::axis_active("rightthumbstickleft", 0), false);
        assert_eq!(event.amount, Some(0));
    }
}
