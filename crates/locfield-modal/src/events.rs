//! Cancelable field-lifecycle events.
//!
//! Host applications plug in via [`EventHooks`]: before the modal runs any
//! built-in behavior it offers the event to the hooks, and an
//! [`Decision::Intercepted`] answer skips the built-in handling. An
//! intercepted event leaves the modal waiting for the consumer to call the
//! matching `trigger_*` method on [`crate::LocationModal`] — the modal never
//! resumes on its own, and never silently hangs beyond that contract.

/// Named hook points in the location field lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEvent {
    GetCurrentLocation,
    SetCurrentLocation,
    ShowLocationModal,
    HideLocationModal,
    ClickEditButton,
    ClickConfirmLocation,
    Error,
    ErrorEnd,
}

impl FieldEvent {
    /// The wire name of the event, as consumers key their listeners.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetCurrentLocation => "get-current-location",
            Self::SetCurrentLocation => "set-current-location",
            Self::ShowLocationModal => "show-location-modal",
            Self::HideLocationModal => "hide-location-modal",
            Self::ClickEditButton => "click-edit-button",
            Self::ClickConfirmLocation => "click-confirm-location",
            Self::Error => "error",
            Self::ErrorEnd => "error-end",
        }
    }
}

/// Answer from a hook: let the modal's built-in handling run, or take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Intercepted,
}

/// Interception seam offered to the host application, keyed by field id and
/// event name.
pub trait EventHooks {
    /// Called before the built-in handling of `event`. The default lets
    /// everything through.
    fn on_event(
        &mut self,
        field_id: &str,
        event: FieldEvent,
        payload: &serde_json::Value,
    ) -> Decision {
        let _ = (field_id, event, payload);
        Decision::Continue
    }
}

/// Hooks that never intercept.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl EventHooks for NoHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_the_wire_contract() {
        assert_eq!(FieldEvent::GetCurrentLocation.name(), "get-current-location");
        assert_eq!(FieldEvent::SetCurrentLocation.name(), "set-current-location");
        assert_eq!(FieldEvent::ShowLocationModal.name(), "show-location-modal");
        assert_eq!(FieldEvent::HideLocationModal.name(), "hide-location-modal");
        assert_eq!(FieldEvent::ClickEditButton.name(), "click-edit-button");
        assert_eq!(FieldEvent::ClickConfirmLocation.name(), "click-confirm-location");
        assert_eq!(FieldEvent::Error.name(), "error");
        assert_eq!(FieldEvent::ErrorEnd.name(), "error-end");
    }

    #[test]
    fn default_hooks_continue() {
        let mut hooks = NoHooks;
        let decision = hooks.on_event("field-1", FieldEvent::Error, &serde_json::Value::Null);
        assert_eq!(decision, Decision::Continue);
    }
}
