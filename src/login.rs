use crate::auth;
use crate::loading::Spinner;
use leptos::logging::error;
use leptos::*;

#[component]
pub fn Login(
    brand: String,
    /// Whether Google sign in is configured at all.
    google: bool,
    #[prop(into)] on_guest: Callback<()>,
) -> impl IntoView {
    let (clicked, set_clicked) = create_signal(false);
    let click = move |_| {
        set_clicked.set(true);
        spawn_local(async move {
            if let Err(err) = auth::sign_in().await {
                error!("Sign in failed: {err:?}");
                set_clicked.set(false);
            }
        });
    };
    view! {
        <div class="flex flex-col gap-4 items-center justify-center border border-gray-200 bg-gray-50 dark:bg-gray-800 dark:border-gray-700 w-full h-screen">
            <h1 class="text-3xl font-semibold text-gray-900 dark:text-white">{brand}</h1>
            <p class="text-sm text-gray-500 dark:text-gray-400">
                Sign in to keep your conversations, or continue as a guest.
            </p>
            {move || {
                if !google {
                    view! { <span /> }.into_view()
                } else if clicked.get() {
                    view! {
                        <button
                            disabled
                            type="button"
                            class="text-white bg-blue-700 font-medium rounded-lg text-sm px-5 py-2.5 text-center dark:bg-blue-600 inline-flex items-center cursor-not-allowed"
                        >
                            <Spinner />
                            Signing in...
                        </button>
                    }
                        .into_view()
                } else {
                    view! {
                        <button
                            type="button"
                            class="text-white bg-blue-700 hover:bg-blue-800 focus:ring-4 focus:ring-blue-300 font-medium rounded-lg text-sm px-5 py-2.5 dark:bg-blue-600 dark:hover:bg-blue-700 focus:outline-none dark:focus:ring-blue-800"
                            on:click=click
                        >
                            Continue with Google
                        </button>
                    }
                        .into_view()
                }
            }}
            <button
                type="button"
                class="text-gray-900 bg-white border border-gray-300 hover:bg-gray-100 focus:ring-4 focus:ring-gray-100 font-medium rounded-lg text-sm px-5 py-2.5 dark:bg-gray-800 dark:text-white dark:border-gray-600 dark:hover:bg-gray-700 focus:outline-none"
                prop:disabled=move || clicked.get()
                on:click=move |_| on_guest.call(())
            >
                Continue as guest
            </button>
        </div>
    }
}
