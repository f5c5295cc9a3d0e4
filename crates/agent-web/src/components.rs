//! UI Components

use leptos::prelude::*;
use crate::api::ChatMessage;

/// Message bubble component
#[component]
pub fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let class = format!("message message-{}", message.author.as_str());
    let time = message.at.format("%H:%M").to_string();

    view! {
        <div class=class>
            <span class="role">{message.author.as_str()}</span>
            <span class="time">{time}</span>
            <p class="content">{message.content}</p>
        </div>
    }
}

/// Clickable example question
#[component]
pub fn Suggestion(text: &'static str, on_pick: WriteSignal<String>) -> impl IntoView {
    view! {
        <button class="suggestion" on:click=move |_| on_pick.set(text.to_string())>
            {text}
        </button>
    }
}
