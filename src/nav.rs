use crate::auth;
use crate::state::{use_manager, use_session};
use ev::{FocusEvent, KeyboardEvent, MouseEvent};
use leptos::logging::error;
use leptos::*;
use nomos_session::{Conversation, ConversationId, Error, Session, SessionCell};

fn saved(session: &Session, id: &ConversationId) -> Option<Conversation> {
    session.conversations().iter().find(|c| &c.id == id).cloned()
}

fn report(action: &str, result: Result<(), Error>) {
    if let Err(err) = result {
        error!("{action} failed: {err}");
    }
}

#[component]
pub fn Nav(brand: String, google: bool) -> impl IntoView {
    let manager = use_manager();
    let session = use_session();
    let (show, set_show) = create_signal(true);
    let editing = create_rw_signal(None::<ConversationId>);
    let draft = create_rw_signal(String::new());
    let menu = create_rw_signal(None::<ConversationId>);
    let deleting = create_rw_signal(None::<Conversation>);

    let new_conversation = {
        let manager = manager.clone();
        move |_: MouseEvent| {
            let manager = manager.clone();
            spawn_local(async move {
                if let Err(err) = manager.new_conversation(&session).await {
                    error!("New chat failed: {err}");
                }
            });
        }
    };
    let temporary = {
        let manager = manager.clone();
        move |_: MouseEvent| {
            let manager = manager.clone();
            spawn_local(async move {
                if let Err(err) = manager.start_temporary(&session).await {
                    error!("Temporary chat failed: {err}");
                }
            });
        }
    };
    let select = {
        let manager = manager.clone();
        move |id: ConversationId| {
            let manager = manager.clone();
            set_show.set(false);
            spawn_local(async move { report("Open", manager.open(&session, &id).await) });
        }
    };
    let commit_rename = {
        let manager = manager.clone();
        move || {
            let Some(id) = editing.get_untracked() else {
                return;
            };
            editing.set(None);
            let title = draft.get_untracked();
            let manager = manager.clone();
            spawn_local(async move { report("Rename", manager.rename(&session, &id, &title).await) });
        }
    };
    let confirm_delete = {
        let manager = manager.clone();
        move |_: MouseEvent| {
            let Some(conversation) = deleting.get_untracked() else {
                return;
            };
            deleting.set(None);
            let manager = manager.clone();
            spawn_local(async move {
                report("Delete", manager.delete(&session, &conversation.id).await)
            });
        }
    };
    let sign_in = move |_: MouseEvent| {
        spawn_local(async move {
            if let Err(err) = auth::sign_in().await {
                error!("Sign in failed: {err:?}");
            }
        });
    };
    let sign_out = move |_: MouseEvent| {
        spawn_local(async move {
            if let Err(err) = auth::sign_out().await {
                error!("Sign out failed: {err:?}");
            }
        });
    };

    // Rows are keyed by id so an open rename input survives list updates.
    let item = move |id: ConversationId| {
        let title = {
            let id = id.clone();
            move || {
                session
                    .with(|s| saved(s, &id).map(|c| c.title))
                    .unwrap_or_default()
            }
        };
        let active = {
            let id = id.clone();
            move || session.with(|s| s.active_id() == Some(&id))
        };
        let is_editing = {
            let id = id.clone();
            move || editing.with(|e| e.as_ref() == Some(&id))
        };
        let menu_open = {
            let id = id.clone();
            move || menu.with(|m| m.as_ref() == Some(&id))
        };
        let onclick = {
            let id = id.clone();
            let select = select.clone();
            move |ev: MouseEvent| {
                ev.prevent_default();
                select(id.clone());
            }
        };
        let toggle_menu = {
            let id = id.clone();
            move |ev: MouseEvent| {
                ev.stop_propagation();
                menu.update(|m| {
                    *m = if m.as_ref() == Some(&id) {
                        None
                    } else {
                        Some(id.clone())
                    }
                });
            }
        };
        let start_rename = {
            let id = id.clone();
            move |ev: MouseEvent| {
                ev.stop_propagation();
                menu.set(None);
                let Some(conversation) = session.read(|s| saved(s, &id)).flatten() else {
                    return;
                };
                draft.set(conversation.title);
                editing.set(Some(id.clone()));
            }
        };
        let ask_delete = {
            let id = id.clone();
            move |ev: MouseEvent| {
                ev.stop_propagation();
                menu.set(None);
                deleting.set(session.read(|s| saved(s, &id)).flatten());
            }
        };
        let on_key = {
            let commit = commit_rename.clone();
            move |ev: KeyboardEvent| match ev.key().as_str() {
                "Enter" => {
                    ev.prevent_default();
                    commit();
                }
                "Escape" => editing.set(None),
                _ => {}
            }
        };
        let on_blur = {
            let commit = commit_rename.clone();
            move |_: FocusEvent| commit()
        };

        view! {
            <li class="relative">
                {move || {
                    if is_editing() {
                        view! {
                            <input
                                class="block w-full p-2 text-sm text-gray-900 bg-white rounded-lg border border-gray-300 dark:bg-gray-800 dark:border-gray-600 dark:text-white"
                                prop:value=move || draft.get()
                                on:input=move |ev| draft.set(event_target_value(&ev))
                                on:keydown=on_key.clone()
                                on:blur=on_blur.clone()
                                autofocus
                            />
                        }
                            .into_view()
                    } else {
                        view! {
                            <a
                                href="#"
                                class="flex items-center p-2 text-gray-900 rounded-lg dark:text-white hover:bg-gray-100 dark:hover:bg-gray-700 group"
                                class=("bg-gray-200", active.clone())
                                class=("dark:bg-gray-700", active.clone())
                                on:click=onclick.clone()
                            >
                                <span class="ms-3 grow truncate text-left">{title.clone()}</span>
                                <button
                                    type="button"
                                    class="p-1 text-gray-500 rounded hover:bg-gray-200 dark:hover:bg-gray-600"
                                    on:click=toggle_menu.clone()
                                >
                                    <svg
                                        class="w-4 h-4"
                                        aria-hidden="true"
                                        xmlns="http://www.w3.org/2000/svg"
                                        fill="currentColor"
                                        viewBox="0 0 4 15"
                                    >
                                        <path d="M3.5 1.5a1.5 1.5 0 1 1-3 0 1.5 1.5 0 0 1 3 0Zm0 6.041a1.5 1.5 0 1 1-3 0 1.5 1.5 0 0 1 3 0Zm0 5.959a1.5 1.5 0 1 1-3 0 1.5 1.5 0 0 1 3 0Z" />
                                    </svg>
                                    <span class="sr-only">Options</span>
                                </button>
                            </a>
                        }
                            .into_view()
                    }
                }}
                <div
                    class="absolute right-0 z-10 bg-white divide-y divide-gray-100 rounded-lg shadow w-40 dark:bg-gray-700 dark:divide-gray-600"
                    class:hidden=move || !menu_open()
                >
                    <ul class="py-2 text-sm text-gray-700 dark:text-gray-200">
                        <li>
                            <a
                                href="#"
                                class="block px-4 py-2 hover:bg-gray-100 dark:hover:bg-gray-600 dark:hover:text-white"
                                on:click=start_rename
                            >
                                Rename
                            </a>
                        </li>
                        <li>
                            <a
                                href="#"
                                class="block px-4 py-2 text-red-600 hover:bg-gray-100 dark:hover:bg-gray-600"
                                on:click=ask_delete
                            >
                                Delete
                            </a>
                        </li>
                    </ul>
                </div>
            </li>
        }
    };

    view! {
        {move || {
            if show.get() {
                view! { <div /> }
            } else {
                view! {
                    <div
                        class="lg:hidden text-gray-500 dark:text-gray-400 p-5 absolute top-0 left-0"
                        on:click=move |_| set_show.update(|s| *s = !*s)
                    >
                        <svg viewBox="0 0 10 8" width="20">
                            <path
                                d="M1 1h8M1 4h 8M1 7h8"
                                stroke="currentColor"
                                fill="currentColor"
                                stroke-width="2"
                                stroke-linecap="round"
                            />
                        </svg>
                    </div>
                }
            }
        }}
        <div
            class="lg:w-1/5 w-full lg:flex border-e-2 dark:border-gray-800 min-h-dvh max-h-dvh overflow-y-auto dark:text-white"
            class:hidden=move || !show.get()
        >
            <div class="text-center w-full flex flex-col vertical-align">
                <div
                    class="lg:hidden text-gray-500 dark:text-gray-400 p-5"
                    on:click=move |_| set_show.update(|s| *s = !*s)
                >
                    <svg viewBox="0 0 10 10" width="20">
                        <path
                            d="M1 1L9 9M1 9L9 1"
                            stroke="currentColor"
                            fill="currentColor"
                            stroke-width="2"
                            stroke-linecap="round"
                        />
                    </svg>
                </div>
                <div class="flex flex-row m-4">
                    <h5 class="text-base py-2.5 font-semibold text-gray-500 uppercase dark:text-gray-400 w-full">
                        {brand}
                    </h5>
                </div>
                <div class="flex flex-col gap-2 mx-4">
                    <button
                        type="button"
                        class="text-white bg-blue-700 hover:bg-blue-800 focus:ring-4 focus:ring-blue-300 font-medium rounded-lg text-sm px-5 py-2.5 dark:bg-blue-600 dark:hover:bg-blue-700 focus:outline-none disabled:cursor-not-allowed"
                        prop:disabled=move || session.with(|s| s.is_temporary() && s.is_sending())
                        on:click=new_conversation
                    >
                        New chat
                    </button>
                    <Show when=move || session.with(|s| !s.is_guest())>
                        <button
                            type="button"
                            class="text-gray-900 bg-white border border-gray-300 hover:bg-gray-100 font-medium rounded-lg text-sm px-5 py-2.5 dark:bg-gray-800 dark:text-white dark:border-gray-600 dark:hover:bg-gray-700 focus:outline-none disabled:cursor-not-allowed"
                            prop:disabled=move || session.with(|s| s.is_sending())
                            on:click=temporary.clone()
                        >
                            Temporary chat
                        </button>
                    </Show>
                </div>
                <div class="py-4 overflow-y-auto grow">
                    <ul class="space-y-2 font-medium mx-2">
                        <For
                            each=move || {
                                session
                                    .with(|s| {
                                        s.conversations().iter().map(|c| c.id.clone()).collect::<Vec<_>>()
                                    })
                            }
                            key=|id| id.clone()
                            children=item
                        />
                    </ul>
                </div>
                <div class="border-t-2 dark:border-gray-800 p-4 flex flex-row items-center gap-2">
                    <span class="grow truncate text-sm text-gray-500 dark:text-gray-400 text-left">
                        {move || {
                            session
                                .with(|s| s.user().map(|u| u.label().to_owned()))
                                .unwrap_or_else(|| "Guest".to_owned())
                        }}
                    </span>
                    {move || {
                        if !google {
                            view! { <span /> }.into_view()
                        } else if session.with(|s| s.is_guest()) {
                            view! {
                                <button
                                    type="button"
                                    class="text-sm text-blue-700 dark:text-blue-400 hover:underline"
                                    on:click=sign_in
                                >
                                    Sign in
                                </button>
                            }
                                .into_view()
                        } else {
                            view! {
                                <button
                                    type="button"
                                    class="text-sm text-gray-700 dark:text-gray-300 hover:underline"
                                    on:click=sign_out
                                >
                                    Sign out
                                </button>
                            }
                                .into_view()
                        }
                    }}
                </div>
            </div>
        </div>
        <Show when=move || deleting.with(Option::is_some)>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-gray-900/50">
                <div class="bg-white rounded-lg shadow p-6 w-80 dark:bg-gray-700 dark:text-white">
                    <h3 class="mb-2 text-lg font-semibold">Delete conversation?</h3>
                    <p class="mb-5 text-sm text-gray-500 dark:text-gray-300">
                        {move || {
                            deleting
                                .with(|d| d.as_ref().map(|c| c.title.clone()))
                                .unwrap_or_default()
                        }}
                        " will be removed permanently."
                    </p>
                    <div class="flex justify-end gap-2">
                        <button
                            type="button"
                            class="text-gray-900 bg-white border border-gray-300 hover:bg-gray-100 font-medium rounded-lg text-sm px-4 py-2 dark:bg-gray-800 dark:text-white dark:border-gray-600"
                            on:click=move |_| deleting.set(None)
                        >
                            Cancel
                        </button>
                        <button
                            type="button"
                            class="text-white bg-red-600 hover:bg-red-700 font-medium rounded-lg text-sm px-4 py-2"
                            on:click=confirm_delete.clone()
                        >
                            Delete
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}

