use dioxus::prelude::*;
use ui::use_auth;

use super::profile::ProfileCard;
use super::Protected;
use crate::Route;

/// Home for signed-in users: account summary and their own public profile.
#[component]
pub fn Dashboard() -> Element {
    rsx! {
        Protected {
            DashboardContent {}
        }
    }
}

#[component]
fn DashboardContent() -> Element {
    let auth = use_auth();

    let profile = use_resource(move || async move {
        let Some(user) = auth().user else {
            return Ok(None);
        };
        api::get_profile_by_id(user.id).await
    });

    let state = auth();
    let Some(user) = state.user else {
        return rsx! {};
    };
    let name = user.display_name().to_string();
    let email = user.email.clone();
    let roles = user.roles.iter().cloned().collect::<Vec<_>>().join(", ");
    let tier = user.tier;
    let status = user.status;
    let subscription_note = if user.has_active_subscription() {
        "active"
    } else {
        "not active"
    };

    rsx! {
        section {
            class: "dashboard",
            h1 { "Welcome, {name}" }
            dl {
                class: "dashboard__account",
                div { dt { "Email" } dd { "{email}" } }
                div { dt { "Roles" } dd { "{roles}" } }
                div { dt { "Plan" } dd { "{tier} ({status}, {subscription_note})" } }
            }

            {match &*profile.read() {
                Some(Ok(Some(profile))) => rsx! {
                    ProfileCard { profile: profile.clone() }
                    Link {
                        to: Route::Profile { username: profile.username.clone() },
                        "View public profile"
                    }
                },
                Some(Ok(None)) => rsx! {
                    p { class: "page__empty", "You have no public profile yet." }
                },
                Some(Err(e)) => rsx! {
                    p { class: "page__error", "Could not load your profile: {e}" }
                },
                None => rsx! {},
            }}
        }
    }
}
