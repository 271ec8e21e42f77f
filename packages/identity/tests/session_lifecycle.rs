use std::collections::VecDeque;
use std::future::Future;
use std::pin::{pin, Pin};
use std::sync::Mutex;
use std::task::Poll;

use identity::{
    evaluate, AccessRule, AuthError, AuthEvent, AuthListener, AuthPhase, AuthState, AuthSubscription,
    Credentials, EventHub, FetchOutcome, GuardDecision, IdentityProvider, ListenerError,
    MemoryProvider, SessionStore, UserInfo,
};
use proptest::prelude::*;
use tokio::sync::oneshot;

/// Provider whose `current_user` calls complete only when the test says so.
#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<oneshot::Receiver<Option<UserInfo>>>>,
    hub: EventHub,
}

impl ScriptedProvider {
    /// Queue the reply channel for the next `current_user` call.
    fn expect_call(&self) -> oneshot::Sender<Option<UserInfo>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }
}

impl IdentityProvider for ScriptedProvider {
    async fn current_user(&self) -> Result<Option<UserInfo>, AuthError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected current_user call");
        reply
            .await
            .map_err(|_| AuthError::ProviderUnavailable("reply dropped".to_string()))
    }

    async fn sign_in(&self, _credentials: Credentials) -> Result<UserInfo, AuthError> {
        Err(AuthError::InvalidCredentials)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        self.hub.subscribe()
    }
}

async fn poll_once<F: Future + ?Sized>(mut fut: Pin<&mut F>) -> Poll<F::Output> {
    std::future::poll_fn(|cx| Poll::Ready(fut.as_mut().poll(cx))).await
}

fn current_id(store: &SessionStore) -> Option<String> {
    store.state().user.map(|u| u.id)
}

#[tokio::test]
async fn test_overlapping_fetches_last_completion_wins() {
    let store = SessionStore::new();
    let provider = ScriptedProvider::default();
    let first_reply = provider.expect_call();
    let second_reply = provider.expect_call();

    let mut first = pin!(store.fetch_user(&provider));
    assert!(poll_once(first.as_mut()).await.is_pending());
    let mut second = pin!(store.fetch_user(&provider));
    assert!(poll_once(second.as_mut()).await.is_pending());

    // Dispatched second, completes first.
    second_reply.send(Some(UserInfo::new("u2", ["member"]))).unwrap();
    assert_eq!(
        poll_once(second.as_mut()).await,
        Poll::Ready(FetchOutcome::Authenticated)
    );
    assert_eq!(current_id(&store), Some("u2".to_string()));

    first_reply.send(Some(UserInfo::new("u1", ["member"]))).unwrap();
    assert_eq!(
        poll_once(first.as_mut()).await,
        Poll::Ready(FetchOutcome::Authenticated)
    );
    assert_eq!(current_id(&store), Some("u1".to_string()));
}

#[tokio::test]
async fn test_overlapping_fetches_in_dispatch_order() {
    let store = SessionStore::new();
    let provider = ScriptedProvider::default();
    let first_reply = provider.expect_call();
    let second_reply = provider.expect_call();

    let mut first = pin!(store.fetch_user(&provider));
    assert!(poll_once(first.as_mut()).await.is_pending());
    let mut second = pin!(store.fetch_user(&provider));
    assert!(poll_once(second.as_mut()).await.is_pending());

    first_reply.send(Some(UserInfo::new("u1", ["member"]))).unwrap();
    assert!(poll_once(first.as_mut()).await.is_ready());
    second_reply.send(None).unwrap();
    assert_eq!(
        poll_once(second.as_mut()).await,
        Poll::Ready(FetchOutcome::Anonymous)
    );

    assert_eq!(store.state().phase(), AuthPhase::Anonymous);
}

#[tokio::test]
async fn test_stale_fetch_does_not_resurrect_after_logout() {
    let store = SessionStore::new();
    let provider = ScriptedProvider::default();
    let reply = provider.expect_call();

    let mut fetch = pin!(store.fetch_user(&provider));
    assert!(poll_once(fetch.as_mut()).await.is_pending());

    store.logout();
    reply.send(Some(UserInfo::new("u1", ["member"]))).unwrap();
    assert_eq!(
        poll_once(fetch.as_mut()).await,
        Poll::Ready(FetchOutcome::Superseded)
    );

    let state = store.state();
    assert!(state.user.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_fetch_after_logout_applies() {
    let store = SessionStore::new();
    let provider = ScriptedProvider::default();

    store.logout();
    provider.expect_call().send(Some(UserInfo::new("u1", ["member"]))).unwrap();
    assert_eq!(store.fetch_user(&provider).await, FetchOutcome::Authenticated);
    assert_eq!(current_id(&store), Some("u1".to_string()));
}

#[tokio::test]
async fn test_member_is_redirected_from_admin_view() {
    let store = SessionStore::new();
    let provider = ScriptedProvider::default();
    let admin_only = AccessRule::role("admin");

    assert_eq!(evaluate(&store.state(), &admin_only), GuardDecision::Waiting);

    provider.expect_call().send(Some(UserInfo::new("u1", ["member"]))).unwrap();
    store.fetch_user(&provider).await;

    assert_eq!(
        evaluate(&store.state(), &admin_only),
        GuardDecision::Redirect("/dashboard".to_string())
    );
    assert_eq!(
        evaluate(&store.state(), &AccessRule::signed_in()),
        GuardDecision::Render
    );
}

#[tokio::test]
async fn test_signed_out_event_revokes_view() {
    let store = SessionStore::new();
    let provider = MemoryProvider::new();
    provider.force_session(UserInfo::new("u1", ["member"]));
    store.fetch_user(&provider).await;

    let mut changes = store.subscribe();
    changes.borrow_and_update();
    let mut listener = AuthListener::register(&store, provider.clone()).unwrap();
    assert_eq!(
        evaluate(&store.state(), &AccessRule::signed_in()),
        GuardDecision::Render
    );

    provider.sign_out().await.unwrap();
    assert_eq!(listener.next().await, Some(AuthEvent::SignedOut));

    assert!(changes.has_changed().unwrap());
    assert!(store.state().user.is_none());
    assert_eq!(
        evaluate(&store.state(), &AccessRule::signed_in()),
        GuardDecision::Redirect("/login".to_string())
    );
}

#[tokio::test]
async fn test_signed_in_event_refetches_user() {
    let mut ann = UserInfo::new("u1", ["member"]);
    ann.email = "ann@example.com".to_string();
    let provider = MemoryProvider::new().with_account(ann, "password123");
    let store = SessionStore::new();
    let mut listener = AuthListener::register(&store, provider.clone()).unwrap();

    provider
        .sign_in(Credentials::Password {
            email: "ann@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(listener.next().await, Some(AuthEvent::SignedIn));
    assert_eq!(current_id(&store), Some("u1".to_string()));

    let mut promoted = UserInfo::new("u1", ["member", "admin"]);
    promoted.email = "ann@example.com".to_string();
    provider.update_user(promoted);
    assert_eq!(listener.next().await, Some(AuthEvent::UserUpdated));
    assert!(store.state().has_role("admin"));
}

#[tokio::test]
async fn test_token_refresh_after_expiry_clears_user() {
    let store = SessionStore::new();
    let provider = MemoryProvider::new();
    provider.force_session(UserInfo::new("u1", ["member"]));
    let mut listener = AuthListener::register(&store, provider.clone()).unwrap();

    provider.emit(AuthEvent::InitialSession);
    listener.next().await;
    assert!(store.state().is_authenticated());

    provider.expire_session();
    provider.refresh_token();
    assert_eq!(listener.next().await, Some(AuthEvent::TokenRefreshed));
    assert_eq!(store.state().phase(), AuthPhase::Anonymous);
}

#[tokio::test]
async fn test_password_recovery_is_ignored() {
    let store = SessionStore::new();
    let provider = MemoryProvider::new();
    let mut listener = AuthListener::register(&store, provider.clone()).unwrap();

    provider.emit(AuthEvent::PasswordRecovery);
    assert_eq!(listener.next().await, Some(AuthEvent::PasswordRecovery));
    assert_eq!(store.state().phase(), AuthPhase::Uninitialized);
}

#[test]
fn test_listener_registers_once() {
    let store = SessionStore::new();
    let provider = MemoryProvider::new();

    let listener = AuthListener::register(&store, provider.clone()).unwrap();
    assert_eq!(provider.subscriber_count(), 1);
    assert!(matches!(
        AuthListener::register(&store, provider.clone()),
        Err(ListenerError::AlreadyRegistered)
    ));
    assert_eq!(provider.subscriber_count(), 1);

    listener.teardown();
    assert_eq!(provider.subscriber_count(), 0);
    assert!(!store.has_listener());

    let again = AuthListener::register(&store, provider.clone());
    assert!(again.is_ok());
}

#[test]
fn test_separate_stores_get_separate_listeners() {
    let provider = MemoryProvider::new();
    let a = AuthListener::register(&SessionStore::new(), provider.clone());
    let b = AuthListener::register(&SessionStore::new(), provider.clone());
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(provider.subscriber_count(), 2);
}

#[derive(Debug, Clone)]
enum Step {
    /// Start a fetch whose reply will be `u{n}`, or no session.
    Dispatch(Option<u8>),
    /// Let one in-flight fetch complete, picked by index modulo the count.
    Complete(usize),
    Logout,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => proptest::option::of(0u8..4).prop_map(Step::Dispatch),
        3 => any::<usize>().prop_map(Step::Complete),
        1 => Just(Step::Logout),
    ]
}

struct InFlight<'a> {
    fetch: Pin<Box<dyn Future<Output = FetchOutcome> + 'a>>,
    reply: oneshot::Sender<Option<UserInfo>>,
    user: Option<UserInfo>,
    dispatched_at: u32,
}

/// Complete `flight` and fold the expected effect into `expected`: a fetch applies
/// its result unless a logout happened after it was dispatched.
async fn complete(mut flight: InFlight<'_>, logouts: u32, expected: &mut AuthState) {
    assert!(flight.reply.send(flight.user.clone()).is_ok());

    let want = if flight.dispatched_at != logouts {
        FetchOutcome::Superseded
    } else {
        *expected = AuthState {
            user: flight.user.clone(),
            loading: false,
        };
        if flight.user.is_some() {
            FetchOutcome::Authenticated
        } else {
            FetchOutcome::Anonymous
        }
    };
    assert_eq!(poll_once(flight.fetch.as_mut()).await, Poll::Ready(want));
}

async fn run_schedule(steps: Vec<Step>) {
    let store = SessionStore::new();
    let provider = ScriptedProvider::default();
    let mut expected = AuthState::default();
    let mut logouts = 0u32;
    let mut in_flight: Vec<InFlight<'_>> = Vec::new();

    for step in steps {
        match step {
            Step::Dispatch(tag) => {
                let reply = provider.expect_call();
                let mut fetch: Pin<Box<dyn Future<Output = FetchOutcome> + '_>> =
                    Box::pin(store.fetch_user(&provider));
                assert!(poll_once(fetch.as_mut()).await.is_pending());
                in_flight.push(InFlight {
                    fetch,
                    reply,
                    user: tag.map(|n| UserInfo::new(format!("u{n}"), ["member"])),
                    dispatched_at: logouts,
                });
            }
            Step::Complete(pick) => {
                if in_flight.is_empty() {
                    continue;
                }
                let flight = in_flight.remove(pick % in_flight.len());
                complete(flight, logouts, &mut expected).await;
            }
            Step::Logout => {
                store.logout();
                logouts += 1;
                expected = AuthState {
                    user: None,
                    loading: false,
                };
            }
        }
        assert_eq!(store.state(), expected);
    }

    while !in_flight.is_empty() {
        let flight = in_flight.remove(0);
        complete(flight, logouts, &mut expected).await;
        assert_eq!(store.state(), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// For any interleaving of fetch completions and logouts, the store holds the
    /// result of the last fetch to complete, unless a logout came after that fetch
    /// was dispatched.
    #[test]
    fn prop_store_follows_last_applicable_completion(
        steps in prop::collection::vec(step(), 0..32),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(run_schedule(steps));
    }
}
