use chrono::{DateTime, Local};
use leptos::IntoView;
use leptos::*;
use nomos_session::Message as Msg;
use pulldown_cmark::{CowStr, Event, Parser, Tag};

/// Bot replies are Markdown; everything else is shown as typed.
///
/// Raw HTML in the reply is rendered as text and script links are dropped,
/// since the result goes straight into `inner_html`.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        event => event,
    });
    let mut parsed = String::new();
    pulldown_cmark::html::push_html(&mut parsed, parser);
    parsed
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|unsafe_scheme| scheme.starts_with(unsafe_scheme))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

#[component]
pub fn Message(message: Msg, brand: String) -> impl IntoView {
    let is_me = message.is_user();
    let bubble = if message.error {
        "bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-200"
    } else if is_me {
        "bg-blue-100 text-gray-900 dark:bg-blue-900 dark:text-white"
    } else {
        "bg-gray-100 text-gray-900 dark:bg-gray-700 dark:text-white"
    };
    let datemsg = format!(
        "{}",
        DateTime::<Local>::from(message.timestamp).format("%H:%M")
    );
    let author = if is_me { "You".to_owned() } else { brand };
    let body = if is_me {
        view! { <p class="text-sm font-normal whitespace-pre-wrap">{message.text}</p> }.into_view()
    } else {
        let parsed = render_markdown(&message.text);
        view! { <div class="text-sm font-normal prose dark:prose-invert" inner_html=parsed /> }
            .into_view()
    };
    view! {
        <div class="flex items-start m-5 gap-2.5" class:flex-row-reverse=is_me>
            <div class="flex flex-col gap-1 max-w-[90%]">
                <div
                    class="flex items-center space-x-2 rtl:space-x-reverse"
                    class:justify-end=is_me
                >
                    <span class="text-sm font-semibold text-gray-900 dark:text-white">
                        {author}
                    </span>
                    <span class="text-sm font-normal text-gray-500 dark:text-gray-400">
                        {datemsg}
                    </span>
                </div>
                <div class=format!(
                    "flex flex-col leading-1.5 p-4 rounded-e-xl rounded-es-xl {bubble}"
                )>
                    {body}
                </div>
            </div>
        </div>
    }
}
