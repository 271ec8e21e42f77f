//! Public hacker profiles.

use dioxus::prelude::*;
use identity::PublicProfile;

#[component]
pub fn Profile(username: String) -> Element {
    // Track the route param in a signal so use_resource re-runs when it changes
    let mut username_signal = use_signal(|| username.clone());
    if *username_signal.peek() != username {
        username_signal.set(username.clone());
    }

    let profile = use_resource(move || {
        let username = username_signal();
        async move { api::get_public_profile(username).await }
    });

    let view = match &*profile.read() {
        None => rsx! {
            div { class: "page__loading", "Loading profile..." }
        },
        Some(Ok(Some(profile))) => rsx! {
            ProfileCard { profile: profile.clone() }
        },
        Some(Ok(None)) => rsx! {
            div { class: "page__empty", "No hacker goes by @{username}." }
        },
        Some(Err(e)) => rsx! {
            div { class: "page__error", "Could not load profile: {e}" }
        },
    };
    view
}

#[component]
pub(crate) fn ProfileCard(profile: PublicProfile) -> Element {
    let name = profile.display_name().to_string();
    let username = profile.username.clone();
    let joined = profile
        .joined_at
        .as_deref()
        .and_then(|t| t.get(..10))
        .map(str::to_string);
    let events = profile.stats.events_attended;
    let wins = profile.stats.hackathons_won;
    let projects = profile.stats.projects_submitted;

    rsx! {
        article {
            class: "profile-card",
            header {
                class: "profile-card__header",
                if let Some(avatar) = profile.avatar_url.clone() {
                    img { class: "profile-card__avatar", src: "{avatar}", alt: "" }
                }
                div {
                    h1 { "{name}" }
                    p { class: "profile-card__handle", "@{username}" }
                }
            }
            if let Some(bio) = profile.bio.clone() {
                p { class: "profile-card__bio", "{bio}" }
            }
            ul {
                class: "profile-card__meta",
                if let Some(location) = profile.location.clone() {
                    li { "{location}" }
                }
                if let Some(website) = profile.website.clone() {
                    li { a { href: "{website}", rel: "nofollow noopener", target: "_blank", "{website}" } }
                }
                if let Some(github) = profile.github_username.clone() {
                    li { a { href: "https://github.com/{github}", target: "_blank", "github.com/{github}" } }
                }
                if let Some(joined) = joined {
                    li { "Joined {joined}" }
                }
            }
            dl {
                class: "profile-card__stats",
                div { dt { "Events" } dd { "{events}" } }
                div { dt { "Wins" } dd { "{wins}" } }
                div { dt { "Projects" } dd { "{projects}" } }
            }
        }
    }
}
