//! View for the device form. Pure rendering of `DeviceFormComponent`; every
//! event is turned into a `Msg`.

use wasm_bindgen::JsCast;
use web_sys::{DataTransfer, DragEvent, File, FileList, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use common::form::preview::markdown_preview;
use common::form::{Field, SlugStatus};
use common::model::chip::ChipType;
use common::model::image::MAX_IMAGES;
use common::model::standard::AVAILABLE_STANDARDS;

use crate::tops_sheet::yw_material_top_sheet::YwMaterialTopSheet;

use super::messages::Msg;
use super::state::DeviceFormComponent;

const DIFFICULTY_RATINGS: [&str; 5] = ["1", "2", "3", "4", "5"];
const DEFAULT_AVATAR: &str = "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";

pub fn view(component: &DeviceFormComponent, ctx: &Context<DeviceFormComponent>) -> Html {
    let link = ctx.link();
    let form_class = classes!(
        "device-form",
        component.form.show_all_errors().then_some("was-validated")
    );

    html! {
        <div class="device-editor">
            { build_header(component, link) }
            <form class={form_class} novalidate=true onsubmit={link.callback(|e: SubmitEvent| {
                e.prevent_default();
                Msg::Submit
            })}>
                { build_identity_section(component, link) }
                { build_hardware_section(component, link) }
                { build_tags_section(component, link) }
                { build_pins_section(component, link) }
                { build_images_section(component, link) }
                { build_yaml_section(component, link) }
                { build_actions(component, link) }
            </form>
            { build_reset_sheet(component, link) }
        </div>
    }
}

fn build_header(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let session = match &component.auth {
        None => html! {},
        Some(status) if status.authenticated => {
            let avatar = status
                .avatar_url
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
            html! {
                <div class="user-info">
                    <img class="user-avatar" src={avatar} alt="" />
                    <span class="user-name">{ status.username.clone().unwrap_or_default() }</span>
                    <button type="button" class="icon-btn" onclick={link.callback(|_| Msg::Logout)}>
                        <i class="material-icons">{"logout"}</i>
                        <span class="icon-label">{"Logout"}</span>
                    </button>
                </div>
            }
        }
        Some(_) => html! {
            <button type="button" class="login-btn" onclick={link.callback(|_| Msg::Login)}>
                {"Login with GitHub"}
            </button>
        },
    };

    html! {
        <header class="editor-header">
            <h1>{"Submit a device"}</h1>
            { session }
        </header>
    }
}

fn build_identity_section(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let draft = component.form.draft();
    let slug_hint = match component.form.slug_status() {
        SlugStatus::Pending => html! { <span class="slug-status pending">{"Checking availability..."}</span> },
        SlugStatus::Available => html! { <span class="slug-status available">{"Available"}</span> },
        SlugStatus::Taken | SlugStatus::Unchecked => html! {},
    };

    html! {
        <section class="form-section">
            <label for="boardName">{"Board name"}</label>
            <input
                id="boardName"
                type="text"
                value={draft.board_name.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetBoardName(input_value(&e)))}
                onblur={link.callback(|_: FocusEvent| Msg::FieldBlur(Field::BoardName))}
            />
            { field_error(component, Field::BoardName) }

            <label for="slug">{"Slug"}</label>
            <input
                id="slug"
                type="text"
                value={draft.slug.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetSlug(input_value(&e)))}
                onblur={link.callback(|_: FocusEvent| Msg::FieldBlur(Field::Slug))}
            />
            { slug_hint }
            { field_error(component, Field::Slug) }

            <div class="label-row">
                <label for="description">{"Description"}</label>
                <button type="button" class="tab-btn" onclick={link.callback(|_| Msg::ToggleDescriptionPreview)}>
                    { if component.description_preview { "Edit" } else { "Preview" } }
                </button>
            </div>
            {
                if component.description_preview {
                    html! {
                        <div class="markdown-preview">
                            { Html::from_html_unchecked(AttrValue::from(markdown_preview(&draft.description))) }
                        </div>
                    }
                } else {
                    html! {
                        <textarea
                            id="description"
                            rows="6"
                            value={draft.description.clone()}
                            oninput={link.callback(|e: InputEvent| Msg::SetDescription(textarea_value(&e)))}
                            onblur={link.callback(|_: FocusEvent| Msg::FieldBlur(Field::Description))}
                        />
                    }
                }
            }
            { field_error(component, Field::Description) }

            <label for="productLink">{"Product link"}</label>
            <input
                id="productLink"
                type="url"
                placeholder="https://"
                value={draft.product_link.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetProductLink(input_value(&e)))}
                onblur={link.callback(|_: FocusEvent| Msg::FieldBlur(Field::ProductLink))}
            />
            { field_error(component, Field::ProductLink) }
        </section>
    }
}

fn build_hardware_section(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let draft = component.form.draft();
    let chip_options = ChipType::ALL.iter().map(|chip| {
        html! {
            <option value={chip.name()} selected={draft.chip_type == Some(*chip)}>{ chip.name() }</option>
        }
    });
    let difficulty_options = DIFFICULTY_RATINGS.iter().map(|rating| {
        html! {
            <option value={*rating} selected={draft.difficulty_rating == *rating}>{ *rating }</option>
        }
    });
    let standards = AVAILABLE_STANDARDS.iter().map(|&(code, name)| {
        let checked = draft
            .electrical_standards
            .iter()
            .any(|s| s.code == code && s.name == name);
        html! {
            <label class="checkbox">
                <input
                    type="checkbox"
                    checked={checked}
                    onchange={link.callback(move |e: Event| Msg::ToggleStandard {
                        code,
                        name,
                        checked: e.target_unchecked_into::<HtmlInputElement>().checked(),
                    })}
                />
                { format!("{code} ({name})") }
            </label>
        }
    });

    html! {
        <section class="form-section">
            <label for="chipType">{"Chip"}</label>
            <select id="chipType" onchange={link.callback(|e: Event| Msg::SelectChip(select_value(&e)))}>
                <option value="" selected={draft.chip_type.is_none()}>{"Select a chip"}</option>
                { for chip_options }
            </select>

            <label for="difficultyRating">{"Difficulty"}</label>
            <select id="difficultyRating" onchange={link.callback(|e: Event| Msg::SetDifficultyRating(select_value(&e)))}>
                <option value="" selected={draft.difficulty_rating.is_empty()}>{"-"}</option>
                { for difficulty_options }
            </select>

            <label for="madeForESPHome">{"Made for ESPHome"}</label>
            <select id="madeForESPHome" onchange={link.callback(|e: Event| Msg::SetMadeForEsphome(select_value(&e)))}>
                <option value="" selected={draft.made_for_esphome.is_empty()}>{"-"}</option>
                <option value="yes" selected={draft.made_for_esphome == "yes"}>{"Yes"}</option>
                <option value="no" selected={draft.made_for_esphome == "no"}>{"No"}</option>
            </select>

            <fieldset class="standards">
                <legend>{"Electrical standards"}</legend>
                { for standards }
            </fieldset>
        </section>
    }
}

fn build_tags_section(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let selected = component.form.draft().tags.iter().map(|tag| {
        let value = tag.clone();
        html! {
            <span class="tag-chip">
                { tag }
                <button type="button" class="tag-remove" onclick={link.callback(move |_| Msg::RemoveTag(value.clone()))}>
                    {"×"}
                </button>
            </span>
        }
    });
    let suggestions = if component.tag_input.trim().is_empty() {
        html! {}
    } else {
        let items = component
            .form
            .tag_suggestions(&component.tag_input)
            .into_iter()
            .map(|tag| {
                html! {
                    <li onclick={link.callback(move |_| Msg::AddTag(tag.to_string()))}>{ tag }</li>
                }
            });
        html! { <ul class="tag-suggestions">{ for items }</ul> }
    };

    html! {
        <section class="form-section">
            <label for="tagInput">{"Tags"}</label>
            <div class="tag-list">{ for selected }</div>
            <input
                id="tagInput"
                type="text"
                autocomplete="off"
                value={component.tag_input.clone()}
                oninput={link.callback(|e: InputEvent| Msg::SetTagInput(input_value(&e)))}
                onkeydown={link.batch_callback(|e: KeyboardEvent| {
                    if e.key() == "Enter" {
                        e.prevent_default();
                        vec![Msg::CommitTagInput]
                    } else {
                        vec![]
                    }
                })}
                onblur={link.callback(|_: FocusEvent| Msg::FieldBlur(Field::Tags))}
            />
            { suggestions }
            { field_error(component, Field::Tags) }
        </section>
    }
}

fn build_pins_section(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let pins = component.form.pin_list();
    if pins.is_empty() {
        return html! {
            <section class="form-section">
                <label>{"GPIO pins"}</label>
                <p class="hint">{"Select a chip to describe its pins."}</p>
                { field_error(component, Field::GpioPins) }
            </section>
        };
    }

    let rows = pins.iter().map(|&pin| {
        let value = component
            .form
            .draft()
            .gpio_pins
            .get(pin)
            .cloned()
            .unwrap_or_default();
        html! {
            <tr>
                <td class="pin-name">{ pin }</td>
                <td>
                    <input
                        type="text"
                        placeholder="Function"
                        value={value}
                        oninput={link.callback(move |e: InputEvent| Msg::SetPinFunction {
                            pin: pin.to_string(),
                            function: input_value(&e),
                        })}
                    />
                </td>
            </tr>
        }
    });

    html! {
        <section class="form-section">
            <label>{"GPIO pins"}</label>
            <table class="pin-table">
                <tbody>{ for rows }</tbody>
            </table>
            { field_error(component, Field::GpioPins) }
        </section>
    }
}

fn build_images_section(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let previews = component.form.draft().images.iter().enumerate().map(|(index, image)| {
        html! {
            <div class="image-preview">
                <img src={image.data_uri.clone()} alt={format!("Image {}", index + 1)} />
                <button type="button" class="image-remove" onclick={link.callback(move |_| Msg::RemoveImage(index))}>
                    <i class="material-icons">{"delete"}</i>
                </button>
            </div>
        }
    });
    let zone_class = classes!(
        "drop-zone",
        component.image_drag_over.then_some("drag-over"),
        (!component.form.can_add_image()).then_some("full")
    );

    html! {
        <section class="form-section">
            <label>{ format!("Images (up to {MAX_IMAGES})") }</label>
            <div
                class={zone_class}
                tabindex="0"
                onclick={link.callback(|_| Msg::OpenImagePicker)}
                ondragover={link.callback(|e: DragEvent| {
                    e.prevent_default();
                    Msg::ImageDragOver(true)
                })}
                ondragleave={link.callback(|_: DragEvent| Msg::ImageDragOver(false))}
                ondrop={link.callback(|e: DragEvent| {
                    e.prevent_default();
                    match e.data_transfer() {
                        Some(transfer) => dropped_image(&transfer),
                        None => Msg::ImageDragOver(false),
                    }
                })}
                onpaste={link.batch_callback(|e: Event| {
                    let Some(transfer) = e
                        .dyn_ref::<web_sys::ClipboardEvent>()
                        .and_then(|e| e.clipboard_data())
                    else {
                        return vec![];
                    };
                    e.prevent_default();
                    vec![dropped_image(&transfer)]
                })}
            >
                {"Drop images or an image link here, paste one, or click to choose"}
            </div>
            <input
                ref={component.image_input_ref.clone()}
                type="file"
                accept="image/*"
                multiple=true
                style="display: none;"
                onchange={link.callback(|e: Event| {
                    Msg::ImageFilesChosen(file_vec(e.target_unchecked_into::<HtmlInputElement>().files()))
                })}
            />
            <div class="image-previews">{ for previews }</div>
            { field_error(component, Field::Images) }
        </section>
    }
}

fn build_yaml_section(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let zone_class = classes!(
        "yaml-drop-zone",
        component.yaml_drag_over.then_some("drag-over")
    );

    html! {
        <section class="form-section">
            <div class="label-row">
                <label for="yamlConfig">{"ESPHome configuration"}</label>
                <button type="button" class="tab-btn" onclick={link.callback(|_| Msg::OpenYamlPicker)}>
                    {"Load file"}
                </button>
                <button type="button" class="tab-btn" onclick={link.callback(|_| Msg::ValidateYaml)}>
                    {"Validate"}
                </button>
            </div>
            <div
                class={zone_class}
                ondragover={link.callback(|e: DragEvent| {
                    e.prevent_default();
                    Msg::YamlDragOver(true)
                })}
                ondragleave={link.callback(|_: DragEvent| Msg::YamlDragOver(false))}
                ondrop={link.callback(|e: DragEvent| {
                    e.prevent_default();
                    let first = e
                        .data_transfer()
                        .and_then(|t| t.files())
                        .and_then(|files| files.get(0));
                    match first {
                        Some(file) => Msg::YamlFileChosen(file),
                        None => Msg::YamlDragOver(false),
                    }
                })}
            >
                <textarea
                    id="yamlConfig"
                    rows="14"
                    spellcheck="false"
                    value={component.form.draft().yaml_text.clone()}
                    oninput={link.callback(|e: InputEvent| Msg::SetYamlText(textarea_value(&e)))}
                    onpaste={link.callback(|_: Event| Msg::YamlPasted)}
                />
            </div>
            <input
                ref={component.yaml_input_ref.clone()}
                type="file"
                accept=".yaml,.yml"
                style="display: none;"
                onchange={link.batch_callback(|e: Event| {
                    file_vec(e.target_unchecked_into::<HtmlInputElement>().files())
                        .into_iter()
                        .next()
                        .map(Msg::YamlFileChosen)
                })}
            />
            {
                if component.yaml_confirmed {
                    html! { <span class="yaml-status valid">{"Configuration looks good"}</span> }
                } else {
                    html! {}
                }
            }
            { field_error(component, Field::Yaml) }
        </section>
    }
}

fn build_actions(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    let can_submit = component.is_authenticated() && !component.submitting;
    html! {
        <div class="form-actions">
            <button type="button" class="secondary-btn" onclick={link.callback(|_| Msg::AskReset)}>
                {"Reset form"}
            </button>
            <button type="submit" class="primary-btn" disabled={!can_submit}>
                { if component.submitting { "Submitting..." } else { "Submit device" } }
            </button>
        </div>
    }
}

fn build_reset_sheet(component: &DeviceFormComponent, link: &Scope<DeviceFormComponent>) -> Html {
    html! {
        <YwMaterialTopSheet node_ref={component.reset_sheet_ref.clone()}>
            <p>{"Clear every field and the saved draft?"}</p>
            <div class="form-actions">
                <button type="button" class="secondary-btn" onclick={link.callback(|_| Msg::CancelReset)}>
                    {"Cancel"}
                </button>
                <button type="button" class="danger-btn" onclick={link.callback(|_| Msg::ConfirmReset)}>
                    {"Clear"}
                </button>
            </div>
        </YwMaterialTopSheet>
    }
}

fn field_error(component: &DeviceFormComponent, field: Field) -> Html {
    match component.form.error(field) {
        Some(message) => html! { <div class="field-error">{ message.to_string() }</div> },
        None => html! {},
    }
}

/// Files win over text: a dragged image from another page carries both.
fn dropped_image(transfer: &DataTransfer) -> Msg {
    let files = file_vec(transfer.files());
    if !files.is_empty() {
        return Msg::ImageFilesChosen(files);
    }
    match transfer.get_data("text") {
        Ok(text) if !text.trim().is_empty() => Msg::ImageUrlOffered(text),
        _ => Msg::ImageDragOver(false),
    }
}

fn file_vec(list: Option<FileList>) -> Vec<File> {
    list.map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
        .unwrap_or_default()
}

fn input_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

fn textarea_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlTextAreaElement>().value()
}

fn select_value(e: &Event) -> String {
    e.target_unchecked_into::<HtmlSelectElement>().value()
}
