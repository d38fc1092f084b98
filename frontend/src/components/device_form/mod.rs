//! Device submission form: root module wiring the Yew `Component`
//! implementation to its state, update and view submodules.
//!
//! The draft saved in `localStorage` is restored when the component is
//! created and the session is checked after the first render. Coming back
//! from a forced login (`formState=saved` in the query) is announced with a
//! toast and the marker is removed from the address bar.

use common::form::auth::{came_back_from_login, without_saved_state};
use common::form::RestoreOutcome;
use yew::platform::spawn_local;
use yew::prelude::*;

mod api;
mod helpers;
mod messages;
mod state;
mod storage;
mod update;
mod view;

use helpers::{current_location, replace_url, show_toast};
pub use messages::Msg;
pub use state::DeviceFormComponent;

impl Component for DeviceFormComponent {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let mut component = DeviceFormComponent::new();
        let here = current_location();
        let returning = came_back_from_login(&here.query);

        match component.form.restore() {
            RestoreOutcome::Restored if returning => show_toast("Your form data has been restored"),
            RestoreOutcome::Corrupt(e) => {
                gloo_console::warn!(format!("discarded unreadable draft: {e}"));
            }
            RestoreOutcome::Restored | RestoreOutcome::Empty => {}
        }
        if returning {
            replace_url(&without_saved_state(&here.path, &here.query, &here.hash));
        }
        component
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;
            let link = ctx.link().clone();
            spawn_local(async move {
                link.send_message(Msg::AuthChecked(api::check_auth().await));
            });
        }
    }
}
