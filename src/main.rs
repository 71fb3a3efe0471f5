mod app;
mod auth;
mod conversation;
mod loading;
mod login;
mod message;
mod nav;
mod state;
mod typing;

use app::*;
use leptos::*;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Debug) {
        leptos::logging::warn!("Logger already installed: {err}");
    }
    mount_to_body(|| {
        view! { <App /> }
    })
}
