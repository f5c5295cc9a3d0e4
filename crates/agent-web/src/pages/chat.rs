//! Chat Page

use leptos::prelude::*;
use crate::api::{self, Author, ChatMessage};
use crate::components::{MessageBubble, Suggestion};

const SUGGESTIONS: [&str; 3] = [
    "What payment methods do you support?",
    "What's new in your products?",
    "What changed on the website?",
];

fn push(set_messages: WriteSignal<Vec<ChatMessage>>, author: Author, content: String) {
    set_messages.update(|msgs| {
        let id = msgs.len();
        msgs.push(ChatMessage::new(id, author, content));
    });
}

#[component]
pub fn ChatPage() -> impl IntoView {
    let (messages, set_messages) = signal(Vec::<ChatMessage>::new());
    let (input, set_input) = signal(String::new());
    let (loading, set_loading) = signal(false);

    // Greeting first
    leptos::task::spawn_local(async move {
        match api::fetch_welcome().await {
            Ok(welcome) => push(set_messages, Author::Assistant, welcome),
            Err(e) => push(set_messages, Author::Error, format!("Could not reach the assistant: {}", e)),
        }
    });

    let send = move || {
        let msg = input.get();
        if msg.trim().is_empty() || loading.get() {
            return;
        }

        push(set_messages, Author::User, msg.clone());
        set_input.set(String::new());
        set_loading.set(true);

        leptos::task::spawn_local(async move {
            match api::send_chat(&msg).await {
                Ok(response) => push(set_messages, Author::Assistant, response),
                Err(e) => push(set_messages, Author::Error, e),
            }
            set_loading.set(false);
        });
    };

    view! {
        <div class="chat">
            <aside class="sidebar">
                <h2>"Try asking"</h2>
                {SUGGESTIONS
                    .into_iter()
                    .map(|text| view! { <Suggestion text=text on_pick=set_input /> })
                    .collect_view()}
            </aside>

            <main class="chat-main">
                <div class="messages">
                    <For
                        each=move || messages.get()
                        key=|msg| msg.id
                        children=move |msg| view! { <MessageBubble message=msg /> }
                    />
                    <Show when=move || loading.get()>
                        <div class="message loading">"..."</div>
                    </Show>
                </div>

                <div class="input-area">
                    <textarea
                        placeholder="Ask about products, the website or payments..."
                        prop:value=move || input.get()
                        on:input=move |ev| set_input.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                send();
                            }
                        }
                    />
                    <button on:click=move |_| send() disabled=move || loading.get()>
                        {move || if loading.get() { "..." } else { "Send" }}
                    </button>
                </div>
            </main>
        </div>
    }
}
