//! The form controller: sole owner of the draft.
//!
//! Every mutating method follows the same shape: change the draft, refresh
//! whatever validity the change affects, then write the whole draft to the
//! store. Remote work (slug checks, image fetches, the submission itself)
//! happens outside and reports back through `apply_*`/`finish_*` methods,
//! which is where late or superseded results get dropped.

use chrono::Utc;
use log::{debug, warn};

use super::slug::{generate_slug, sanitize_slug};
use super::store::DraftStore;
use super::submission::{SubmissionPayload, SubmitError, SubmitOutcome};
use super::validation::{check_field, Field, FieldErrors, ValidationPhase};
use crate::model::chip::ChipType;
use crate::model::draft::Draft;
use crate::model::image::{
    check_image_metadata, DraftImage, ImageCandidate, ImageRejection, MAX_IMAGES,
};
use crate::model::standard::{is_known_standard, join_codes, ElectricalStandard};
use crate::model::tag::{is_known_tag, tag_suggestions};

/// Identifies one debounced slug check. Only the most recently issued
/// ticket may start a check or apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugCheckTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlugStatus {
    #[default]
    Unchecked,
    Pending,
    Available,
    Taken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Empty,
    Restored,
    /// The stored document was unreadable and has been removed.
    Corrupt(String),
}

/// What the UI should do once a submission attempt has been classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitEffect {
    Notify {
        message: String,
        review_url: Option<String>,
    },
    /// The draft is saved; send the browser through the login flow.
    RedirectToLogin,
}

pub struct FormController<S: DraftStore> {
    draft: Draft,
    store: S,
    phase: ValidationPhase,
    errors: FieldErrors,
    slug_generation: u64,
    slug_status: SlugStatus,
}

impl<S: DraftStore> FormController<S> {
    pub fn new(store: S) -> Self {
        Self {
            draft: Draft::default(),
            store,
            phase: ValidationPhase::Untouched,
            errors: FieldErrors::default(),
            slug_generation: 0,
            slug_status: SlugStatus::Unchecked,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn phase(&self) -> ValidationPhase {
        self.phase
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    /// Whether the "show every error" styling is active.
    pub fn show_all_errors(&self) -> bool {
        self.phase == ValidationPhase::Validated
    }

    pub fn slug_status(&self) -> SlugStatus {
        self.slug_status
    }

    // ---- persistence ---------------------------------------------------

    /// Writes the whole draft to the store. Failures are logged and leave
    /// the in-memory draft untouched.
    pub fn persist(&mut self) {
        self.draft.timestamp = Some(Utc::now());
        let json = match serde_json::to_string(&self.draft) {
            Ok(json) => json,
            Err(e) => {
                warn!("draft could not be serialized: {e}");
                return;
            }
        };
        if let Err(e) = self.store.save(&json) {
            warn!("draft could not be persisted: {e}");
        }
    }

    /// Replaces the draft with the stored one, if any. An unreadable entry
    /// is removed and the form starts empty.
    pub fn restore(&mut self) -> RestoreOutcome {
        let json = match self.store.load() {
            Ok(Some(json)) => json,
            Ok(None) => return RestoreOutcome::Empty,
            Err(e) => {
                warn!("draft storage unavailable: {e}");
                return RestoreOutcome::Empty;
            }
        };

        match serde_json::from_str::<Draft>(&json) {
            Ok(mut draft) => {
                retain_consistent(&mut draft);
                self.draft = draft;
                self.validate_form(false);
                RestoreOutcome::Restored
            }
            Err(e) => {
                warn!("discarding corrupt stored draft: {e}");
                if let Err(e) = self.store.clear() {
                    warn!("corrupt draft could not be removed: {e}");
                }
                self.draft = Draft::default();
                RestoreOutcome::Corrupt(e.to_string())
            }
        }
    }

    /// Clears the draft in memory and in storage and hides all errors.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
        self.errors.clear();
        self.phase = ValidationPhase::Untouched;
        self.slug_generation += 1;
        self.slug_status = SlugStatus::Unchecked;
        if let Err(e) = self.store.clear() {
            warn!("stored draft could not be removed: {e}");
        }
    }

    /// Drops the stored draft after a logout; the page reloads afterwards.
    pub fn forget_persisted(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!("stored draft could not be removed: {e}");
        }
    }

    // ---- text fields ---------------------------------------------------

    /// Updates the board name and, when it is non-empty, regenerates the
    /// slug. Returns a ticket when a slug check should be scheduled.
    pub fn set_board_name(&mut self, name: &str) -> Option<SlugCheckTicket> {
        self.draft.board_name = name.to_string();
        self.check_field(Field::BoardName);
        let ticket = if name.is_empty() {
            None
        } else {
            self.draft.slug = generate_slug(name);
            self.errors.set(Field::Slug, None);
            self.request_slug_check()
        };
        self.persist();
        ticket
    }

    pub fn set_description(&mut self, description: &str) {
        self.draft.description = description.to_string();
        self.check_field(Field::Description);
        self.persist();
    }

    pub fn set_product_link(&mut self, link: &str) {
        self.draft.product_link = link.to_string();
        self.check_field(Field::ProductLink);
        self.persist();
    }

    pub fn set_difficulty_rating(&mut self, rating: &str) {
        self.draft.difficulty_rating = rating.to_string();
        self.persist();
    }

    pub fn set_made_for_esphome(&mut self, value: &str) {
        self.draft.made_for_esphome = value.to_string();
        self.persist();
    }

    /// Records the YAML verbatim. Validation is left to an explicit
    /// request so large documents are not re-parsed on every keystroke.
    pub fn set_yaml_text(&mut self, text: &str) {
        self.draft.yaml_text = text.to_string();
        self.persist();
    }

    // ---- slug ----------------------------------------------------------

    /// Stores a hand-edited slug after sanitizing it.
    pub fn set_slug(&mut self, value: &str) -> Option<SlugCheckTicket> {
        self.draft.slug = sanitize_slug(value);
        self.errors.set(Field::Slug, None);
        let ticket = self.request_slug_check();
        self.persist();
        ticket
    }

    /// Supersedes any pending check. Returns `None` when there is no slug.
    pub fn request_slug_check(&mut self) -> Option<SlugCheckTicket> {
        self.slug_generation += 1;
        if self.draft.slug.is_empty() {
            self.slug_status = SlugStatus::Unchecked;
            return None;
        }
        self.slug_status = SlugStatus::Pending;
        Some(SlugCheckTicket(self.slug_generation))
    }

    /// Called when the debounce delay for `ticket` has elapsed. Returns the
    /// slug to check as it is now, or `None` if a newer edit superseded it.
    pub fn begin_slug_check(&self, ticket: SlugCheckTicket) -> Option<String> {
        if ticket.0 != self.slug_generation {
            return None;
        }
        let slug = self.draft.slug.trim();
        (!slug.is_empty()).then(|| slug.to_string())
    }

    /// Applies a finished check. `available` is `None` when the check
    /// failed, which counts as available. Returns false for stale results.
    pub fn apply_slug_check(
        &mut self,
        ticket: SlugCheckTicket,
        slug: &str,
        available: Option<bool>,
    ) -> bool {
        if ticket.0 != self.slug_generation || self.draft.slug.trim() != slug {
            debug!("dropping stale slug check for {slug}");
            return false;
        }
        if available == Some(false) {
            self.slug_status = SlugStatus::Taken;
            self.errors
                .set(Field::Slug, Some("This slug is already taken".into()));
        } else {
            self.slug_status = SlugStatus::Available;
            self.errors.set(Field::Slug, None);
        }
        true
    }

    // ---- tags and standards ------------------------------------------

    pub fn add_tag(&mut self, tag: &str) -> bool {
        if !is_known_tag(tag) {
            debug!("ignoring tag outside the vocabulary: {tag}");
            return false;
        }
        if !self.draft.tags.insert(tag.to_string()) {
            return false;
        }
        self.after_collection_change();
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        if !self.draft.tags.remove(tag) {
            return false;
        }
        self.after_collection_change();
        true
    }

    pub fn tag_suggestions(&self, input: &str) -> Vec<&'static str> {
        tag_suggestions(input, |tag| self.draft.tags.contains(tag))
    }

    pub fn add_electrical_standard(&mut self, code: &str, name: &str) -> bool {
        if !is_known_standard(code, name) {
            debug!("ignoring unknown electrical standard: {code}");
            return false;
        }
        if !self
            .draft
            .electrical_standards
            .insert(ElectricalStandard::new(code, name))
        {
            return false;
        }
        self.after_collection_change();
        true
    }

    pub fn remove_electrical_standard(&mut self, code: &str, name: &str) -> bool {
        if !self
            .draft
            .electrical_standards
            .remove(&ElectricalStandard::new(code, name))
        {
            return false;
        }
        self.after_collection_change();
        true
    }

    /// Comma-joined standard codes as sent with the submission.
    pub fn electrical_standards_value(&self) -> String {
        join_codes(&self.draft.electrical_standards)
    }

    fn after_collection_change(&mut self) {
        self.persist();
        self.validate_form(false);
    }

    // ---- chip and pins -------------------------------------------------

    /// Switches chip. Functions entered for pins the new chip lacks are
    /// discarded; with no chip selected every entry is discarded.
    pub fn select_chip(&mut self, chip: Option<ChipType>) {
        self.draft.chip_type = chip;
        match chip {
            Some(chip) => self.draft.gpio_pins.retain(|pin, _| chip.has_pin(pin)),
            None => self.draft.gpio_pins.clear(),
        }
        self.persist();
        self.validate_form(false);
    }

    /// Pins the editor should show for the current chip.
    pub fn pin_list(&self) -> &'static [&'static str] {
        self.draft.chip_type.map(ChipType::pins).unwrap_or(&[])
    }

    /// Records or clears one pin's function. Pins outside the selected
    /// chip's table are refused.
    pub fn set_pin_function(&mut self, pin: &str, text: &str) -> bool {
        let Some(chip) = self.draft.chip_type else {
            return false;
        };
        if !chip.has_pin(pin) {
            return false;
        }
        if text.trim().is_empty() {
            self.draft.gpio_pins.remove(pin);
        } else {
            self.draft.gpio_pins.insert(pin.to_string(), text.to_string());
        }
        self.check_field(Field::GpioPins);
        self.persist();
        true
    }

    // ---- images --------------------------------------------------------

    pub fn can_add_image(&self) -> bool {
        self.draft.images.len() < MAX_IMAGES
    }

    /// Pre-flight check run before a candidate's bytes are read.
    pub fn check_image(&self, mime: &str, size: usize) -> Result<(), ImageRejection> {
        if !self.can_add_image() {
            return Err(ImageRejection::LimitReached);
        }
        check_image_metadata(mime, size)
    }

    /// Appends an image as a data URI. Any violated constraint leaves the
    /// draft unchanged. Returns the new image count.
    pub fn ingest_image(&mut self, candidate: ImageCandidate) -> Result<usize, ImageRejection> {
        self.check_image(&candidate.mime, candidate.bytes.len())?;
        self.draft
            .images
            .push(DraftImage::from_bytes(&candidate.mime, &candidate.bytes));
        self.errors.set(Field::Images, None);
        self.persist();
        Ok(self.draft.images.len())
    }

    pub fn remove_image(&mut self, index: usize) -> bool {
        if index >= self.draft.images.len() {
            return false;
        }
        self.draft.images.remove(index);
        if self.show_all_errors() {
            self.check_field(Field::Images);
        }
        self.persist();
        true
    }

    // ---- validation ----------------------------------------------------

    /// Runs one field's rule and shows or hides its error. Used for blur,
    /// paste and drop events regardless of the validation phase.
    pub fn check_field(&mut self, field: Field) -> bool {
        let result = check_field(&self.draft, field);
        let ok = result.is_ok();
        self.errors.set(field, result.err());
        ok
    }

    /// Explicit YAML validation (paste, drop, or the validate button).
    pub fn validate_yaml(&mut self) -> bool {
        self.check_field(Field::Yaml)
    }

    /// Evaluates every field rule and returns their conjunction.
    ///
    /// Until the first forced call this is a no-op returning `None`;
    /// afterwards every call evaluates.
    pub fn validate_form(&mut self, force: bool) -> Option<bool> {
        if self.phase == ValidationPhase::Untouched && !force {
            return None;
        }
        self.phase = ValidationPhase::Validated;
        let mut all_ok = true;
        for field in Field::VALIDATED {
            all_ok &= self.check_field(field);
        }
        Some(all_ok)
    }

    // ---- submission ----------------------------------------------------

    /// Validates and serializes the draft for the submission endpoint.
    pub fn prepare_submission(&mut self) -> Result<SubmissionPayload, SubmitError> {
        let fields_ok = self.validate_form(true) == Some(true);
        // Availability is advisory, but an empty slug has no folder to go to.
        let slug_ok = match check_field(&self.draft, Field::Slug) {
            Ok(()) => true,
            Err(message) => {
                self.errors.set(Field::Slug, Some(message));
                false
            }
        };
        if !(fields_ok && slug_ok) {
            return Err(SubmitError::Invalid);
        }
        SubmissionPayload::from_draft(&self.draft)
    }

    /// Applies the result of a submission attempt.
    ///
    /// Success clears the draft everywhere. An authentication failure
    /// persists the draft first so it can be restored after login. Any other
    /// failure keeps the draft for a retry.
    pub fn finish_submission(&mut self, outcome: SubmitOutcome) -> SubmitEffect {
        match outcome {
            SubmitOutcome::Success { review_url } => {
                self.reset();
                SubmitEffect::Notify {
                    message: "Device configuration submitted successfully!".into(),
                    review_url,
                }
            }
            SubmitOutcome::AuthenticationRequired => {
                self.persist();
                SubmitEffect::RedirectToLogin
            }
            SubmitOutcome::Failed(message) => SubmitEffect::Notify {
                message: format!("Error: {message}"),
                review_url: None,
            },
        }
    }
}

/// Re-establishes draft invariants on data read back from storage.
fn retain_consistent(draft: &mut Draft) {
    match draft.chip_type {
        Some(chip) => draft.gpio_pins.retain(|pin, _| chip.has_pin(pin)),
        None => draft.gpio_pins.clear(),
    }
    draft.tags.retain(|tag| is_known_tag(tag));
    draft
        .electrical_standards
        .retain(|s| is_known_standard(&s.code, &s.name));
    draft.images.truncate(MAX_IMAGES);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::store::MemoryStore;

    fn controller() -> FormController<MemoryStore> {
        FormController::new(MemoryStore::new())
    }

    #[test]
    fn stale_ticket_never_starts_a_check() {
        let mut form = controller();
        let first = form.set_slug("board-a").unwrap();
        let second = form.set_slug("board-ab").unwrap();
        assert_eq!(form.begin_slug_check(first), None);
        assert_eq!(form.begin_slug_check(second), Some("board-ab".to_string()));
    }

    #[test]
    fn check_uses_slug_current_when_delay_elapses() {
        let mut form = controller();
        let ticket = form.set_board_name("Board").unwrap();
        assert_eq!(form.begin_slug_check(ticket), Some("board".to_string()));
    }

    #[test]
    fn late_result_for_an_edited_slug_is_dropped() {
        let mut form = controller();
        let ticket = form.set_slug("taken").unwrap();
        let slug = form.begin_slug_check(ticket).unwrap();
        let newer = form.set_slug("fresh").unwrap();
        assert!(!form.apply_slug_check(ticket, &slug, Some(false)));
        assert_eq!(form.error(Field::Slug), None);
        assert_eq!(form.slug_status(), SlugStatus::Pending);
        assert!(form.apply_slug_check(newer, "fresh", Some(true)));
        assert_eq!(form.slug_status(), SlugStatus::Available);
    }

    #[test]
    fn failed_check_fails_open() {
        let mut form = controller();
        let ticket = form.set_slug("anything").unwrap();
        assert!(form.apply_slug_check(ticket, "anything", None));
        assert_eq!(form.error(Field::Slug), None);
        assert_eq!(form.slug_status(), SlugStatus::Available);
    }

    #[test]
    fn taken_slug_shows_error_without_blocking_validation() {
        let mut form = controller();
        let ticket = form.set_slug("taken").unwrap();
        form.apply_slug_check(ticket, "taken", Some(false));
        assert_eq!(form.error(Field::Slug), Some("This slug is already taken"));
        assert!(!Field::VALIDATED.contains(&Field::Slug));
    }

    #[test]
    fn empty_board_name_keeps_existing_slug() {
        let mut form = controller();
        form.set_board_name("Test Board");
        assert!(form.set_board_name("").is_none());
        assert_eq!(form.draft().slug, "test-board");
    }

    #[test]
    fn unknown_tags_are_refused() {
        let mut form = controller();
        assert!(!form.add_tag("zigbee"));
        assert!(form.draft().tags.is_empty());
    }

    #[test]
    fn pins_are_refused_without_a_matching_chip() {
        let mut form = controller();
        assert!(!form.set_pin_function("GPIO04", "relay"));
        form.select_chip(Some(ChipType::Bk7231));
        assert!(!form.set_pin_function("GPIO00", "relay"));
        assert!(form.set_pin_function("GPIO06", "relay"));
    }

    #[test]
    fn blank_pin_text_removes_the_entry() {
        let mut form = controller();
        form.select_chip(Some(ChipType::Esp32));
        form.set_pin_function("GPIO04", "relay");
        form.set_pin_function("GPIO04", "   ");
        assert!(form.draft().gpio_pins.is_empty());
        assert!(form.error(Field::GpioPins).is_some());
    }

    #[test]
    fn electrical_standards_join_codes() {
        let mut form = controller();
        assert!(form.add_electrical_standard("US", "United States"));
        assert!(form.add_electrical_standard("EU", "Europe"));
        assert!(!form.add_electrical_standard("EU", "Europe"));
        assert_eq!(form.electrical_standards_value(), "EU,US");
        assert!(form.remove_electrical_standard("EU", "Europe"));
        assert!(!form.remove_electrical_standard("EU", "Europe"));
        assert_eq!(form.electrical_standards_value(), "US");
    }

    #[test]
    fn restore_re_establishes_invariants() {
        let store = MemoryStore::with_contents(
            r#"{"chipType":"ESP32-C3","gpioPins":{"GPIO04":"relay","GPIO39":"adc"},"tags":["relay","zigbee"]}"#,
        );
        let mut form = FormController::new(store);
        assert_eq!(form.restore(), RestoreOutcome::Restored);
        assert_eq!(form.draft().gpio_pins.len(), 1);
        assert!(form.draft().gpio_pins.contains_key("GPIO04"));
        assert_eq!(form.draft().tags.len(), 1);
    }
}
