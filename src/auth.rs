//! Bindings to the Firebase Auth bridge defined in `index.html`.

use leptos::logging::{log, warn};
use nomos_session::config::FirebaseConfig;
use nomos_session::AuthUser;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "nomosAuth"], js_name = init)]
    fn init(config: JsValue);

    #[wasm_bindgen(catch, js_namespace = ["window", "nomosAuth"], js_name = signIn)]
    async fn sign_in_js() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["window", "nomosAuth"], js_name = signOut)]
    async fn sign_out_js() -> Result<JsValue, JsValue>;

    /// Called with `null` or `{uid, displayName, email, idToken}` on every
    /// sign in, sign out and token refresh.
    #[wasm_bindgen(js_namespace = ["window", "nomosAuth"], js_name = onChange)]
    fn on_change(callback: &Closure<dyn FnMut(JsValue)>);
}

/// Starts Firebase and reports every auth state to `on_auth`.
pub fn watch(config: &FirebaseConfig, mut on_auth: impl FnMut(Option<AuthUser>) + 'static) {
    match serde_wasm_bindgen::to_value(config) {
        Ok(value) => init(value),
        Err(err) => {
            warn!("Could not pass Firebase config: {err}");
            return;
        }
    }
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        match serde_wasm_bindgen::from_value::<Option<AuthUser>>(value) {
            Ok(auth) => on_auth(auth),
            Err(err) => warn!("Unreadable auth state: {err}"),
        }
    });
    on_change(&callback);
    // The bridge holds on to the callback for the lifetime of the page.
    callback.forget();
}

pub async fn sign_in() -> Result<(), JsValue> {
    sign_in_js().await?;
    log!("Signed in");
    Ok(())
}

pub async fn sign_out() -> Result<(), JsValue> {
    sign_out_js().await?;
    log!("Signed out");
    Ok(())
}
