//! Runtime state of the device form. Everything the draft owns lives in the
//! controller; the fields here are view-only concerns.

use common::form::FormController;
use common::requests::AuthStatus;
use yew::NodeRef;

use super::storage::LocalStorageStore;

pub struct DeviceFormComponent {
    pub form: FormController<LocalStorageStore>,

    /// `None` until `/auth/check` has answered.
    pub auth: Option<AuthStatus>,

    /// True while a submission request is in flight.
    pub submitting: bool,

    /// Text typed in the tag box; not part of the draft.
    pub tag_input: String,

    pub description_preview: bool,

    /// Set when the validate button accepted the current YAML text.
    pub yaml_confirmed: bool,

    /// Highlight state of the two drop zones.
    pub image_drag_over: bool,
    pub yaml_drag_over: bool,

    pub image_input_ref: NodeRef,
    pub yaml_input_ref: NodeRef,
    pub reset_sheet_ref: NodeRef,

    /// Guards the one-time auth check on first render.
    pub loaded: bool,
}

impl DeviceFormComponent {
    pub fn new() -> Self {
        Self {
            form: FormController::new(LocalStorageStore),
            auth: None,
            submitting: false,
            tag_input: String::new(),
            description_preview: false,
            yaml_confirmed: false,
            image_drag_over: false,
            yaml_drag_over: false,
            image_input_ref: NodeRef::default(),
            yaml_input_ref: NodeRef::default(),
            reset_sheet_ref: NodeRef::default(),
            loaded: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.as_ref().is_some_and(|a| a.authenticated)
    }
}
