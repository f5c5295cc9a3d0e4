//! Home Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"AI Chatbot"</h1>
                <p class="tagline">"Ask about our products, our website or payments"</p>
                <div class="cta">
                    <a href="/chat" class="btn btn-primary">"Start Chatting"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"📦 Products"</h3>
                    <p>"Features, prices and specifications of everything we sell."</p>
                </div>
                <div class="feature">
                    <h3>"🌐 Website"</h3>
                    <p>"What changed on the site and where to find things."</p>
                </div>
                <div class="feature">
                    <h3>"💳 Payments"</h3>
                    <p>"Payment methods, payment status and billing questions."</p>
                </div>
            </section>
        </div>
    }
}
