//! Member administration: role assignment. Admins only.

use dioxus::prelude::*;
use identity::{AuthEvent, UserInfo, ADMIN_ROLE};
use ui::{use_auth, use_identity};

use super::Protected;

#[component]
pub fn Admin() -> Element {
    rsx! {
        Protected {
            role: ADMIN_ROLE.to_string(),
            MemberAdmin {}
        }
    }
}

#[component]
fn MemberAdmin() -> Element {
    let mut users = use_resource(|| async move { api::admin_list_users().await });
    let mut notice = use_signal(|| Option::<String>::None);

    let content = match &*users.read() {
        None => rsx! {
            p { class: "page__loading", "Loading members..." }
        },
        Some(Err(e)) => rsx! {
            div { class: "page__error", "Could not load members: {e}" }
        },
        Some(Ok(list)) => rsx! {
            table {
                class: "admin-table",
                thead {
                    tr {
                        th { "Member" }
                        th { "Email" }
                        th { "Plan" }
                        th { "Roles" }
                        th {}
                    }
                }
                tbody {
                    for user in list.iter().cloned() {
                        RoleRow {
                            key: "{user.id}",
                            user,
                            on_saved: move |message: String| {
                                notice.set(Some(message));
                                users.restart();
                            },
                        }
                    }
                }
            }
        },
    };

    rsx! {
        section {
            class: "admin",
            h1 { "Members" }
            p {
                class: "admin__hint",
                "Roles are comma-separated tags, e.g. \"member, organizer\"."
            }
            if let Some(message) = notice() {
                div { class: "notice", "{message}" }
            }
            {content}
        }
    }
}

#[component]
fn RoleRow(user: UserInfo, on_saved: EventHandler<String>) -> Element {
    let auth = use_auth();
    let identity = use_identity();
    let mut roles_text = use_signal(|| user.roles.iter().cloned().collect::<Vec<_>>().join(", "));
    let mut saving = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);

    let name = user.display_name().to_string();
    let email = user.email.clone();
    let tier = user.tier;
    let user_id = user.id.clone();

    let save = move |_| {
        let user_id = user_id.clone();
        let identity = identity.clone();
        async move {
            saving.set(true);
            error.set(None);
            let roles: Vec<String> = roles_text()
                .split(',')
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect();
            match api::admin_set_roles(user_id, roles).await {
                Ok(updated) => {
                    // Editing your own roles changes what this client may show.
                    let is_self = auth
                        .peek()
                        .user
                        .as_ref()
                        .is_some_and(|me| me.id == updated.id);
                    if is_self {
                        identity.notify(AuthEvent::UserUpdated);
                    }
                    on_saved.call(format!("Saved roles for {}", updated.display_name()));
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            saving.set(false);
        }
    };

    rsx! {
        tr {
            td { "{name}" }
            td { "{email}" }
            td { "{tier}" }
            td {
                input {
                    value: roles_text(),
                    oninput: move |evt: FormEvent| roles_text.set(evt.value()),
                }
                if let Some(err) = error() {
                    div { class: "admin-table__error", "{err}" }
                }
            }
            td {
                button {
                    disabled: saving(),
                    onclick: save,
                    if saving() { "Saving..." } else { "Save" }
                }
            }
        }
    }
}
