use common::form::submission::SubmitOutcome;
use common::form::{Field, SlugCheckTicket};
use common::model::image::ImageCandidate;
use common::requests::AuthStatus;

/// Messages handled by `update::update`.
pub enum Msg {
    // session
    AuthChecked(Result<AuthStatus, String>),
    Login,
    Logout,
    LoggedOut(bool),

    // text fields
    SetBoardName(String),
    SetDescription(String),
    SetProductLink(String),
    SetSlug(String),
    SetDifficultyRating(String),
    SetMadeForEsphome(String),
    FieldBlur(Field),
    ToggleDescriptionPreview,

    // slug availability
    SlugDebounceElapsed(SlugCheckTicket),
    SlugChecked {
        ticket: SlugCheckTicket,
        slug: String,
        available: Option<bool>,
    },

    // tags and standards
    SetTagInput(String),
    CommitTagInput,
    AddTag(String),
    RemoveTag(String),
    ToggleStandard {
        code: &'static str,
        name: &'static str,
        checked: bool,
    },

    // chip and pins
    SelectChip(String),
    SetPinFunction { pin: String, function: String },

    // images
    OpenImagePicker,
    ImageFilesChosen(Vec<web_sys::File>),
    ImageUrlOffered(String),
    ImageLoaded(ImageCandidate),
    ImageFailed(String),
    RemoveImage(usize),
    ImageDragOver(bool),

    // yaml
    SetYamlText(String),
    ValidateYaml,
    YamlPasted,
    OpenYamlPicker,
    YamlFileChosen(web_sys::File),
    YamlFileLoaded(String),
    YamlDragOver(bool),

    // submission and reset
    Submit,
    Submitted(SubmitOutcome),
    AskReset,
    ConfirmReset,
    CancelReset,
}
