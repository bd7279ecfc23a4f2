//! In-process backends for unit tests.
#![allow(clippy::unwrap_used)]

use super::{
    session::{AuthSubscription, SessionContext},
    types::{test_session, NewProfile, OtpOptions, OtpType, Profile, ProfileAuth, Session},
    AuthProvider, ProfileStore,
};
use crate::{
    error::ApiError,
    otp::OtpCode,
    routing::{Navigator, Route},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

pub(crate) struct FakeAuthProvider {
    pub context: Arc<SessionContext>,
    pub verify_result: Mutex<Result<(), ApiError>>,
    pub send_result: Mutex<Result<(), ApiError>>,
    /// `get_session` starts returning a session on this call (1-based).
    pub session_on_call: Mutex<Option<usize>>,
    /// After a subscription is opened, a session is published after this delay.
    pub publish_after_subscribe: Mutex<Option<Duration>>,
    pub get_session_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    pub last_redirect: Mutex<Option<String>>,
}

impl FakeAuthProvider {
    pub fn new() -> Self {
        Self {
            context: Arc::new(SessionContext::new()),
            verify_result: Mutex::new(Ok(())),
            send_result: Mutex::new(Ok(())),
            session_on_call: Mutex::new(None),
            publish_after_subscribe: Mutex::new(None),
            get_session_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            last_redirect: Mutex::new(None),
        }
    }

    pub fn with_session_on_call(self, call: usize) -> Self {
        *self.session_on_call.lock().unwrap() = Some(call);
        self
    }

    pub fn with_publish_after_subscribe(self, delay: Duration) -> Self {
        *self.publish_after_subscribe.lock().unwrap() = Some(delay);
        self
    }

    pub fn with_verify_result(self, result: Result<(), ApiError>) -> Self {
        *self.verify_result.lock().unwrap() = result;
        self
    }

    pub fn with_send_result(self, result: Result<(), ApiError>) -> Self {
        *self.send_result.lock().unwrap() = result;
        self
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn reset_password_for_email(
        &self,
        _email: &str,
        redirect_to: &str,
    ) -> Result<(), ApiError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_redirect.lock().unwrap() = Some(redirect_to.to_string());
        self.send_result.lock().unwrap().clone()
    }

    async fn verify_otp(
        &self,
        _email: &str,
        _token: &OtpCode,
        _otp_type: OtpType,
    ) -> Result<(), ApiError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_result.lock().unwrap().clone()
    }

    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        let call = self.get_session_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let threshold = *self.session_on_call.lock().unwrap();
        if threshold.is_some_and(|threshold| call >= threshold) {
            return Ok(Some(test_session("fake@camedu.dev")));
        }
        Ok(self.context.current().await)
    }

    async fn sign_in_with_otp(&self, _email: &str, options: &OtpOptions) -> Result<(), ApiError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_redirect.lock().unwrap() = options.email_redirect_to.clone();
        self.send_result.lock().unwrap().clone()
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        let subscription = self.context.subscribe();
        let delay = *self.publish_after_subscribe.lock().unwrap();
        if let Some(delay) = delay {
            let context = Arc::clone(&self.context);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                context.set_session(test_session("fake@camedu.dev")).await;
            });
        }
        subscription
    }
}

pub(crate) struct FakeProfileStore {
    pub login_result: Mutex<Result<(), ApiError>>,
    pub register_result: Mutex<Result<(), ApiError>>,
    pub stored_token: Mutex<Option<String>>,
    pub registered: Mutex<Vec<NewProfile>>,
    pub login_calls: AtomicUsize,
}

impl FakeProfileStore {
    pub fn new() -> Self {
        Self {
            login_result: Mutex::new(Ok(())),
            register_result: Mutex::new(Ok(())),
            stored_token: Mutex::new(None),
            registered: Mutex::new(Vec::new()),
            login_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_login_result(self, result: Result<(), ApiError>) -> Self {
        *self.login_result.lock().unwrap() = result;
        self
    }

    pub fn with_register_result(self, result: Result<(), ApiError>) -> Self {
        *self.register_result.lock().unwrap() = result;
        self
    }

    fn auth_for(email: &str, username: &str) -> ProfileAuth {
        ProfileAuth {
            jwt: SecretString::from("fake-jwt"),
            user: Profile {
                id: 1,
                username: username.to_string(),
                email: email.to_string(),
                confirmed: true,
            },
        }
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn login(&self, email: &str, _password: &SecretString) -> Result<ProfileAuth, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.login_result
            .lock()
            .unwrap()
            .clone()
            .map(|()| Self::auth_for(email, "fake"))
    }

    async fn register(&self, profile: &NewProfile) -> Result<ProfileAuth, ApiError> {
        self.register_result.lock().unwrap().clone()?;
        self.registered.lock().unwrap().push(profile.clone());
        Ok(Self::auth_for(&profile.email, &profile.username))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<Profile>, ApiError> {
        let registered = self.registered.lock().unwrap();
        Ok(registered
            .iter()
            .find(|profile| profile.email == email)
            .map(|profile| Self::auth_for(&profile.email, &profile.username).user))
    }

    async fn store_access_token(&self, jwt: SecretString) {
        *self.stored_token.lock().unwrap() = Some(jwt.expose_secret().to_string());
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    pub routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        self.routes.lock().unwrap().push(route.clone());
    }
}
