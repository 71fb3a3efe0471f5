use crate::message::Message;
use crate::state::{use_manager, use_session};
use crate::typing::Typing;
use leptos::ev::{KeyboardEvent, MouseEvent, SubmitEvent};
use leptos::logging::error;
use leptos::*;
use nomos_session::config::UiConfig;
use nomos_session::Landing;

const GUEST_NOTICE: &str = "You are chatting as a guest. Conversations are lost when you leave.";
const TEMPORARY_NOTICE: &str = "Temporary chat. This conversation will not be saved.";

#[component]
fn Notice() -> impl IntoView {
    let session = use_session();
    move || {
        session
            .with(|s| {
                if s.is_temporary() {
                    Some(TEMPORARY_NOTICE)
                } else if s.is_guest() {
                    Some(GUEST_NOTICE)
                } else {
                    None
                }
            })
            .map(|notice| {
                view! {
                    <p class="text-xs text-amber-700 dark:text-amber-400 text-center px-4 py-2">
                        {notice}
                    </p>
                }
            })
    }
}

#[component]
fn Welcome(brand: String) -> impl IntoView {
    view! {
        <div class="grow flex flex-col items-center justify-center gap-3 text-center px-6">
            <h1 class="text-3xl font-semibold text-gray-900 dark:text-white">{brand}</h1>
            <p class="text-gray-500 dark:text-gray-400">
                Your legal assistant. Ask a question about the law to get started.
            </p>
            <Notice />
        </div>
    }
}

#[component]
pub fn Conversation(ui: UiConfig) -> impl IntoView {
    let manager = use_manager();
    let session = use_session();
    let (message, set_message) = create_signal(String::new());
    let UiConfig {
        brand,
        typing_interval_ms,
        typing_phrases,
    } = ui;

    let blocked = move || session.with(|s| s.is_sending() || s.active_id().is_none());
    let typing = move || {
        session.with(|s| s.active_id().map_or(false, |id| s.sending_into(id)))
    };

    let send = {
        let manager = manager.clone();
        move || {
            if blocked() {
                return;
            }
            let content = message.get_untracked();
            if content.trim().is_empty() {
                return;
            }
            set_message.set(String::new());
            let manager = manager.clone();
            spawn_local(async move {
                if let Err(err) = manager.send(&session, &content).await {
                    error!("Send failed: {err}");
                }
            });
        }
    };
    let send_message = {
        let send = send.clone();
        move |ev: SubmitEvent| {
            ev.prevent_default();
            send();
        }
    };
    let on_key = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send();
        }
    };
    let stop = move |_: MouseEvent| {
        manager.cancel();
    };

    let thread = {
        let brand = brand.clone();
        move || match session.with(|s| s.landing()) {
            Landing::Welcome => view! { <Welcome brand=brand.clone() /> }.into_view(),
            Landing::SelectConversation => view! {
                <div class="grow flex items-center justify-center text-gray-500 dark:text-gray-400">
                    Select a conversation or start a new one
                </div>
            }
                .into_view(),
            Landing::EmptyConversation => view! {
                <div class="grow flex flex-col items-center justify-center text-gray-500 dark:text-gray-400">
                    <p>Start a new conversation by typing a message below.</p>
                    <Notice />
                </div>
            }
                .into_view(),
            Landing::Thread => {
                let brand = brand.clone();
                let phrases = typing_phrases.clone();
                view! {
                    <main class="grow flex flex-col-reverse overflow-auto max-h-screen">
                        <Show when=typing>
                            <Typing
                                phrases=phrases.clone()
                                interval_ms=typing_interval_ms
                            />
                        </Show>
                        {session
                            .with(|s| s.messages().to_vec())
                            .into_iter()
                            .rev()
                            .map(|message| view! { <Message message brand=brand.clone() /> })
                            .collect_view()}
                    </main>
                }
                    .into_view()
            }
        }
    };

    view! {
        <div class="h-dvh max-h-dvh grow flex flex-col scrollbar lg:w-4/5 w-screen max-w-screen">
            {move || {
                session
                    .with(|s| s.is_temporary())
                    .then(|| {
                        view! {
                            <div class="bg-amber-50 dark:bg-gray-800 border-b dark:border-gray-700">
                                <p class="text-xs text-amber-700 dark:text-amber-400 text-center py-1">
                                    {TEMPORARY_NOTICE}
                                </p>
                            </div>
                        }
                    })
            }}
            {thread}
            <form class="w-full" on:submit=send_message>
                <label for="chat" class="sr-only">
                    Your message
                </label>
                <div class="flex items-center px-3 py-2 bg-gray-50 dark:bg-gray-700">
                    <textarea
                        id="chat"
                        rows="1"
                        class="block mx-4 p-2.5 w-full text-sm text-gray-900 bg-white rounded-lg border border-gray-300 focus:ring-blue-500 focus:border-blue-500 dark:bg-gray-800 dark:border-gray-600 dark:placeholder-gray-400 dark:text-white dark:focus:ring-blue-500 dark:focus:border-blue-500 resize-none"
                        placeholder="Ask a legal question..."
                        prop:disabled=blocked
                        on:input=move |ev| set_message.set(event_target_value(&ev))
                        on:keydown=on_key
                        prop:value=message
                    />
                    {move || {
                        if session.with(|s| s.is_sending()) {
                            view! {
                                <button
                                    type="button"
                                    class="inline-flex justify-center p-2 text-red-600 rounded-full cursor-pointer hover:bg-red-100 dark:text-red-500 dark:hover:bg-gray-600"
                                    on:click=stop.clone()
                                >
                                    <svg
                                        class="w-5 h-5"
                                        aria-hidden="true"
                                        xmlns="http://www.w3.org/2000/svg"
                                        fill="currentColor"
                                        viewBox="0 0 20 20"
                                    >
                                        <rect x="4" y="4" width="12" height="12" rx="2" />
                                    </svg>
                                    <span class="sr-only">Stop</span>
                                </button>
                            }
                        } else {
                            view! {
                                <button
                                    type="submit"
                                    class="inline-flex justify-center p-2 text-blue-600 rounded-full cursor-pointer hover:bg-blue-100 dark:text-blue-500 dark:hover:bg-gray-600 disabled:cursor-not-allowed disabled:opacity-50"
                                    prop:disabled=blocked
                                >
                                    <svg
                                        class="w-5 h-5 rotate-90 rtl:-rotate-90"
                                        aria-hidden="true"
                                        xmlns="http://www.w3.org/2000/svg"
                                        fill="currentColor"
                                        viewBox="0 0 18 20"
                                    >
                                        <path d="m17.914 18.594-8-18a1 1 0 0 0-1.828 0l-8 18a1 1 0 0 0 1.157 1.376L8 18.281V9a1 1 0 0 1 2 0v9.281l6.758 1.689a1 1 0 0 0 1.156-1.376Z" />
                                    </svg>
                                    <span class="sr-only">Send message</span>
                                </button>
                            }
                        }
                    }}
                </div>
            </form>
        </div>
    }
}
