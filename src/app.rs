use crate::auth;
use crate::conversation::Conversation as Conv;
use crate::loading::Loading;
use crate::login::Login;
use crate::nav::Nav;
use crate::state::{Manager, SessionSignal};
use leptos::logging::{error, log};
use leptos::*;
use nomos_session::config::ANSWER_URL_VAR;
use nomos_session::{AuthUser, Config, FirestoreStore, HttpAnswerService, SessionCell, SessionManager};
use std::rc::Rc;

const CONFIG: &str = include_str!("../Nomos.toml");

/// Reads the embedded configuration. The answer endpoint can be replaced at
/// build time with `NOMOS_ANSWER_URL`.
pub fn load_config() -> Config {
    let answer_url = option_env!("NOMOS_ANSWER_URL");
    match Config::load(CONFIG, |key| {
        (key == ANSWER_URL_VAR).then(|| answer_url.map(str::to_owned)).flatten()
    }) {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid Nomos.toml, using defaults: {err}");
            Config::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Waiting for the first auth state.
    Loading,
    Login,
    Chat,
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let answers = match HttpAnswerService::new(&config.answer.base_url) {
        Ok(answers) => answers,
        Err(err) => {
            error!("Answer service unusable: {err}");
            return view! {
                <div class="flex items-center justify-center w-full h-screen text-red-600">
                    "Nomos is misconfigured: " {err.to_string()}
                </div>
            }
            .into_view();
        }
    };
    log!("Answer service at {}", answers.endpoint());

    let remote = config.firebase.as_ref().and_then(|firebase| {
        FirestoreStore::new(&firebase.project_id)
            .map_err(|err| error!("Firestore unusable, continuing as guest only: {err}"))
            .ok()
    });
    let google = remote.is_some();
    let manager: Manager = Rc::new(SessionManager::new(remote, answers));
    let session = SessionSignal::new();
    provide_context(manager.clone());
    provide_context(session);

    let (gate, set_gate) = create_signal(if google { Gate::Loading } else { Gate::Login });

    if let Some(firebase) = config.firebase.as_ref().filter(|_| google) {
        let manager = manager.clone();
        auth::watch(firebase, move |auth: Option<AuthUser>| {
            let signed_in = auth.is_some();
            let was_signed_in = session.read(|s| s.user().is_some()).unwrap_or(false);
            if signed_in {
                set_gate.set(Gate::Chat);
            } else if was_signed_in || gate.get_untracked() == Gate::Loading {
                set_gate.set(Gate::Login);
            }
            let manager = manager.clone();
            spawn_local(async move {
                if let Err(err) = manager.auth_changed(&session, auth).await {
                    error!("Loading conversations failed: {err}");
                }
            });
        });
    }

    let on_guest = {
        let manager = manager.clone();
        move |_: ()| {
            set_gate.set(Gate::Chat);
            let manager = manager.clone();
            spawn_local(async move {
                if let Err(err) = manager.refresh(&session).await {
                    error!("Starting guest session failed: {err}");
                }
            });
        }
    };

    let ui = config.ui;
    view! {
        <div class="flex flex-row">
            {move || match gate.get() {
                Gate::Loading => view! { <Loading /> }.into_view(),
                Gate::Login => {
                    view! { <Login brand=ui.brand.clone() google on_guest=on_guest.clone() /> }
                        .into_view()
                }
                Gate::Chat => {
                    view! {
                        <Nav brand=ui.brand.clone() google />
                        <Conv ui=ui.clone() />
                    }
                        .into_view()
                }
            }}
        </div>
    }
    .into_view()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_is_valid() {
        let config = Config::load(CONFIG, |_| None).unwrap();
        assert_eq!(config.ui.brand, "Nomos");
        assert!(config.firebase.is_none());
    }
}
