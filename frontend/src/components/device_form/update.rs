//! Update function for the device form.
//!
//! Every draft mutation goes through the shared `FormController`; this module
//! only adds the browser side effects around it: timers for the slug
//! debounce, file reads, requests and navigation. The returned `bool` tells
//! Yew whether to re-render.

use gloo_file::futures::{read_as_bytes, read_as_text};
use gloo_file::File;
use gloo_timers::future::TimeoutFuture;
use web_sys::HtmlInputElement;
use yew::html::Scope;
use yew::platform::spawn_local;
use yew::prelude::*;

use common::form::auth::{login_url, return_to_with_saved_state};
use common::form::validation::is_absolute_url;
use common::form::{SlugCheckTicket, SubmitEffect, SLUG_CHECK_DEBOUNCE_MS};
use common::model::chip::ChipType;
use common::model::image::ImageCandidate;
use common::yaml::is_yaml_file_name;

use crate::config::SERVER;
use crate::tops_sheet::yw_material_top_sheet::{close_top_sheet, open_top_sheet};

use super::api;
use super::helpers::{current_location, navigate, open_in_new_tab, reload, show_toast};
use super::messages::Msg;
use super::state::DeviceFormComponent;

pub fn update(
    component: &mut DeviceFormComponent,
    ctx: &Context<DeviceFormComponent>,
    msg: Msg,
) -> bool {
    let link = ctx.link();
    match msg {
        Msg::AuthChecked(Ok(status)) => {
            component.auth = Some(status);
            true
        }
        Msg::AuthChecked(Err(e)) => {
            gloo_console::error!(format!("Auth check failed: {e}"));
            component.auth = Some(Default::default());
            show_toast("Failed to check authentication status");
            true
        }
        Msg::Login => {
            component.form.persist();
            redirect_to_login();
            false
        }
        Msg::Logout => {
            let link = link.clone();
            spawn_local(async move {
                link.send_message(Msg::LoggedOut(api::logout().await));
            });
            false
        }
        Msg::LoggedOut(true) => {
            component.form.forget_persisted();
            reload();
            false
        }
        Msg::LoggedOut(false) => {
            show_toast("Failed to logout");
            false
        }

        Msg::SetBoardName(name) => {
            if let Some(ticket) = component.form.set_board_name(&name) {
                schedule_slug_check(link, ticket);
            }
            true
        }
        Msg::SetSlug(slug) => {
            if let Some(ticket) = component.form.set_slug(&slug) {
                schedule_slug_check(link, ticket);
            }
            true
        }
        Msg::SetDescription(text) => {
            component.form.set_description(&text);
            true
        }
        Msg::SetProductLink(link_text) => {
            component.form.set_product_link(&link_text);
            true
        }
        Msg::SetDifficultyRating(rating) => {
            component.form.set_difficulty_rating(&rating);
            true
        }
        Msg::SetMadeForEsphome(value) => {
            component.form.set_made_for_esphome(&value);
            true
        }
        Msg::FieldBlur(field) => {
            component.form.check_field(field);
            true
        }
        Msg::ToggleDescriptionPreview => {
            component.description_preview = !component.description_preview;
            true
        }

        Msg::SlugDebounceElapsed(ticket) => {
            // A newer edit has superseded this ticket when this yields None.
            if let Some(slug) = component.form.begin_slug_check(ticket) {
                let link = link.clone();
                spawn_local(async move {
                    let available = api::check_slug(&slug).await;
                    link.send_message(Msg::SlugChecked {
                        ticket,
                        slug,
                        available,
                    });
                });
            }
            false
        }
        Msg::SlugChecked {
            ticket,
            slug,
            available,
        } => component.form.apply_slug_check(ticket, &slug, available),

        Msg::SetTagInput(text) => {
            component.tag_input = text;
            true
        }
        Msg::CommitTagInput => {
            let suggestions = component.form.tag_suggestions(&component.tag_input);
            if let [only] = suggestions.as_slice() {
                component.form.add_tag(only);
                component.tag_input.clear();
            }
            true
        }
        Msg::AddTag(tag) => {
            component.form.add_tag(&tag);
            component.tag_input.clear();
            true
        }
        Msg::RemoveTag(tag) => component.form.remove_tag(&tag),
        Msg::ToggleStandard {
            code,
            name,
            checked,
        } => {
            if checked {
                component.form.add_electrical_standard(code, name)
            } else {
                component.form.remove_electrical_standard(code, name)
            }
        }

        Msg::SelectChip(value) => {
            component.form.select_chip(value.parse::<ChipType>().ok());
            true
        }
        Msg::SetPinFunction { pin, function } => component.form.set_pin_function(&pin, &function),

        Msg::OpenImagePicker => {
            click_input(&component.image_input_ref);
            false
        }
        Msg::ImageFilesChosen(files) => {
            component.image_drag_over = false;
            for file in files.into_iter().map(File::from) {
                let mime = file.raw_mime_type();
                if let Err(rejection) = component.form.check_image(&mime, file.size() as usize) {
                    show_toast(&rejection.to_string());
                    continue;
                }
                let link = link.clone();
                spawn_local(async move {
                    match read_as_bytes(&file).await {
                        Ok(bytes) => {
                            link.send_message(Msg::ImageLoaded(ImageCandidate::new(mime, bytes)))
                        }
                        Err(e) => link.send_message(Msg::ImageFailed(format!(
                            "Failed to read {}: {e}",
                            file.name()
                        ))),
                    }
                });
            }
            true
        }
        Msg::ImageUrlOffered(text) => {
            component.image_drag_over = false;
            let url = text.trim().to_string();
            if !is_absolute_url(&url) {
                show_toast("Please paste a valid image URL");
                return true;
            }
            if !component.form.can_add_image() {
                show_toast(&common::model::image::ImageRejection::LimitReached.to_string());
                return true;
            }
            let link = link.clone();
            spawn_local(async move {
                match api::fetch_image(&url).await {
                    Ok(candidate) => link.send_message(Msg::ImageLoaded(candidate)),
                    Err(e) => link.send_message(Msg::ImageFailed(format!(
                        "Failed to load image from URL: {e}"
                    ))),
                }
            });
            true
        }
        Msg::ImageLoaded(candidate) => {
            if let Err(rejection) = component.form.ingest_image(candidate) {
                show_toast(&rejection.to_string());
            }
            true
        }
        Msg::ImageFailed(message) => {
            show_toast(&message);
            false
        }
        Msg::RemoveImage(index) => component.form.remove_image(index),
        Msg::ImageDragOver(over) => {
            let changed = component.image_drag_over != over;
            component.image_drag_over = over;
            changed
        }

        Msg::SetYamlText(text) => {
            component.form.set_yaml_text(&text);
            component.yaml_confirmed = false;
            true
        }
        Msg::ValidateYaml => {
            component.yaml_confirmed = component.form.validate_yaml();
            true
        }
        Msg::YamlPasted => {
            // The textarea only holds the pasted text after this event.
            let link = link.clone();
            spawn_local(async move {
                TimeoutFuture::new(0).await;
                link.send_message(Msg::ValidateYaml);
            });
            false
        }
        Msg::OpenYamlPicker => {
            click_input(&component.yaml_input_ref);
            false
        }
        Msg::YamlFileChosen(file) => {
            component.yaml_drag_over = false;
            let file = File::from(file);
            if !is_yaml_file_name(&file.name()) {
                show_toast("Please drop a valid YAML file (.yaml or .yml)");
                return true;
            }
            let link = link.clone();
            spawn_local(async move {
                match read_as_text(&file).await {
                    Ok(text) => link.send_message(Msg::YamlFileLoaded(text)),
                    Err(e) => show_toast(&format!("Failed to read {}: {e}", file.name())),
                }
            });
            true
        }
        Msg::YamlFileLoaded(text) => {
            component.form.set_yaml_text(&text);
            component.yaml_confirmed = component.form.validate_yaml();
            true
        }
        Msg::YamlDragOver(over) => {
            let changed = component.yaml_drag_over != over;
            component.yaml_drag_over = over;
            changed
        }

        Msg::Submit => {
            if component.submitting {
                return false;
            }
            match component.form.prepare_submission() {
                Ok(payload) => {
                    component.submitting = true;
                    let link = link.clone();
                    spawn_local(async move {
                        let outcome = api::submit(&payload).await;
                        link.send_message(Msg::Submitted(outcome));
                    });
                }
                Err(e) => show_toast(&e.to_string()),
            }
            true
        }
        Msg::Submitted(outcome) => {
            component.submitting = false;
            match component.form.finish_submission(outcome) {
                SubmitEffect::Notify {
                    message,
                    review_url,
                } => {
                    show_toast(&message);
                    if let Some(url) = review_url {
                        open_in_new_tab(&url);
                    }
                    if component.form.draft().is_blank() {
                        component.tag_input.clear();
                        component.yaml_confirmed = false;
                    }
                }
                SubmitEffect::RedirectToLogin => redirect_to_login(),
            }
            true
        }

        Msg::AskReset => {
            open_top_sheet(&component.reset_sheet_ref);
            false
        }
        Msg::ConfirmReset => {
            close_top_sheet(&component.reset_sheet_ref);
            component.form.reset();
            component.tag_input.clear();
            component.yaml_confirmed = false;
            component.description_preview = false;
            show_toast("Form cleared");
            true
        }
        Msg::CancelReset => {
            close_top_sheet(&component.reset_sheet_ref);
            false
        }
    }
}

/// Waits out the debounce window, then asks the form whether the ticket is
/// still the latest one.
fn schedule_slug_check(link: &Scope<DeviceFormComponent>, ticket: SlugCheckTicket) {
    let link = link.clone();
    spawn_local(async move {
        TimeoutFuture::new(SLUG_CHECK_DEBOUNCE_MS).await;
        link.send_message(Msg::SlugDebounceElapsed(ticket));
    });
}

/// Leaves for the GitHub login, coming back to this page with the saved
/// draft marker.
fn redirect_to_login() {
    let here = current_location();
    let return_to = return_to_with_saved_state(&here.path, &here.query, &here.hash);
    navigate(&login_url(SERVER.auth_url, &return_to));
}

fn click_input(input_ref: &NodeRef) {
    if let Some(input) = input_ref.cast::<HtmlInputElement>() {
        // Allows choosing the same file twice in a row.
        input.set_value("");
        input.click();
    }
}
