use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use camedu::{
    auth::{
        AuthProvider, AuthSubscription, GoTrueClient, OtpOptions, OtpType, ProfileStore, Session,
        SessionContext, StrapiClient,
    },
    error::{ApiError, FlowError},
    otp::{OtpCode, OtpVerificationPage, VerifyStatus},
    routing::{email_query, Navigator, Route},
    signup::{Role, SignupStep, SignupWizard},
};
use mockito::{Matcher, Server, ServerGuard};
use secrecy::SecretString;
use serde_json::json;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

const SITE_URL: &str = "https://camedu.dev";
const EMAIL: &str = "jane.doe@camedu.dev";

#[derive(Default)]
struct Recorder {
    routes: Mutex<Vec<Route>>,
}

impl Recorder {
    fn routes(&self) -> Vec<Route> {
        self.routes.lock().map(|routes| routes.clone()).unwrap_or_default()
    }
}

impl Navigator for Recorder {
    fn navigate(&self, route: &Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.clone());
        }
    }
}

/// Accepts `123456` and stores a session, but hides it for the first
/// `hidden_reads` reads, like a provider whose session store lags behind
/// verification.
struct LaggingProvider {
    context: Arc<SessionContext>,
    hidden_reads: usize,
    reads: AtomicUsize,
}

#[async_trait]
impl AuthProvider for LaggingProvider {
    async fn reset_password_for_email(
        &self,
        _email: &str,
        _redirect_to: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn verify_otp(
        &self,
        email: &str,
        token: &OtpCode,
        _otp_type: OtpType,
    ) -> Result<(), ApiError> {
        if token.expose() != "123456" {
            return Err(ApiError::Http {
                status: 403,
                message: "Token has expired or is invalid".to_string(),
            });
        }
        let session: Session = serde_json::from_value(json!({
            "access_token": "access",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {"id": "7b0c4f1e-8a44-4d8e-9a43-2f7f0f9d5c11", "email": email}
        }))
        .map_err(|err| ApiError::Parse(err.to_string()))?;
        self.context.set_session(session).await;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) < self.hidden_reads {
            return Ok(None);
        }
        Ok(self.context.current().await)
    }

    async fn sign_in_with_otp(&self, _email: &str, _options: &OtpOptions) -> Result<(), ApiError> {
        Ok(())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        self.context.subscribe()
    }
}

async fn mock_otp_request(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/auth/v1/otp")
        .match_query(Matcher::UrlEncoded(
            "redirect_to".into(),
            format!("{SITE_URL}/auth/otp"),
        ))
        .match_body(Matcher::PartialJson(json!({"email": EMAIL, "create_user": true})))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await
}

async fn mock_verify(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/auth/v1/verify")
        .match_body(Matcher::Json(
            json!({"email": EMAIL, "token": "123456", "type": "email"}),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "access",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {"id": "7b0c4f1e-8a44-4d8e-9a43-2f7f0f9d5c11", "email": EMAIL}
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn signup_runs_end_to_end_against_http_backends() -> Result<()> {
    let mut auth = Server::new_async().await;
    let mut cms = Server::new_async().await;
    let otp_mock = mock_otp_request(&mut auth).await;
    let verify_mock = mock_verify(&mut auth).await;
    let register_mock = cms
        .mock("POST", "/api/auth/local/register")
        .match_body(Matcher::Json(json!({
            "username": "janed",
            "email": EMAIL,
            "password": "Correct42horse",
            "role_type": "instructor"
        })))
        .with_status(200)
        .with_body(
            json!({"jwt": "jwt-9", "user": {"id": 9, "username": "janed", "email": EMAIL, "confirmed": true}})
                .to_string(),
        )
        .create_async()
        .await;
    let users_mock = cms
        .mock("GET", "/api/users")
        .match_query(Matcher::UrlEncoded("filters[email][$eq]".into(), EMAIL.into()))
        .match_header("authorization", "Bearer jwt-9")
        .with_status(200)
        .with_body(json!([{"id": 9, "username": "janed", "email": EMAIL}]).to_string())
        .create_async()
        .await;

    let context = Arc::new(SessionContext::new());
    let provider = Arc::new(GoTrueClient::new(
        &auth.url(),
        SecretString::from("anon"),
        Arc::clone(&context),
    )?);
    let store = StrapiClient::new(&cms.url())?;
    let navigator = Arc::new(Recorder::default());

    let mut wizard = SignupWizard::new();
    let route = wizard
        .submit_email(" Jane.Doe@CamEdu.dev", provider.as_ref(), SITE_URL)
        .await?;
    ensure!(route == Route::Otp { email: EMAIL.to_string() });

    let mut page = OtpVerificationPage::mount(
        &email_query(EMAIL),
        SITE_URL,
        provider,
        Arc::clone(&context),
        navigator.clone(),
    );
    ensure!(!page.cooldown().is_ready());
    page.verify("123456").await?;
    ensure!(page.status() == VerifyStatus::Verified);
    ensure!(
        navigator.routes()
            == vec![Route::SignupComplete {
                email: EMAIL.to_string()
            }]
    );
    ensure!(context.remembered_email().await.as_deref() == Some(EMAIL));

    wizard.mark_otp_verified()?;
    wizard.set_username("janed")?;
    wizard.set_password("Correct42horse")?;
    wizard.set_confirm_password("Correct42horse")?;
    wizard.submit_credentials()?;
    wizard.select_role(Role::Instructor)?;
    ensure!(wizard.complete(&store).await? == Route::Dashboard);
    ensure!(wizard.step() == SignupStep::Completed);
    ensure!(wizard.draft().is_none());

    let profile = store
        .get_user_by_email(EMAIL)
        .await?
        .context("registered profile not found")?;
    ensure!(profile.id == 9);

    otp_mock.assert_async().await;
    verify_mock.assert_async().await;
    register_mock.assert_async().await;
    users_mock.assert_async().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn lagging_session_is_found_by_polling() -> Result<()> {
    let context = Arc::new(SessionContext::new());
    let provider = Arc::new(LaggingProvider {
        context: Arc::clone(&context),
        hidden_reads: 3,
        reads: AtomicUsize::new(0),
    });
    let navigator = Arc::new(Recorder::default());

    let mut page = OtpVerificationPage::mount(
        &email_query(EMAIL),
        SITE_URL,
        provider.clone(),
        context,
        navigator.clone(),
    );
    let started = tokio::time::Instant::now();
    page.verify(" 123456 ").await?;

    // Immediate check plus three polls; the third poll sees the session.
    ensure!(provider.reads.load(Ordering::SeqCst) == 4);
    ensure!(started.elapsed() == std::time::Duration::from_secs(3));
    ensure!(navigator.routes().len() == 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn session_hidden_from_polls_arrives_through_subscription() -> Result<()> {
    let context = Arc::new(SessionContext::new());
    let provider = Arc::new(LaggingProvider {
        context: Arc::clone(&context),
        hidden_reads: usize::MAX,
        reads: AtomicUsize::new(0),
    });
    let navigator = Arc::new(Recorder::default());

    let mut page = OtpVerificationPage::mount(
        &email_query(EMAIL),
        SITE_URL,
        provider.clone(),
        Arc::clone(&context),
        navigator.clone(),
    );

    // Verification stores the session before discovery starts, so the
    // subscription never sees an event and discovery times out.
    let err = page
        .verify("123456")
        .await
        .err()
        .context("discovery should time out")?;
    ensure!(err == FlowError::SessionNotFound);
    ensure!(page.status() == VerifyStatus::Idle);
    ensure!(navigator.routes().is_empty());

    // A later sign-in is still delivered to fresh subscribers.
    let mut subscription = provider.on_auth_state_change();
    let session = context.current().await.context("session stored")?;
    context.set_session(session).await;
    ensure!(subscription.next().await.and_then(|event| event.session().cloned()).is_some());
    subscription.unsubscribe();
    Ok(())
}

#[tokio::test]
async fn rejected_code_surfaces_provider_message() -> Result<()> {
    let mut auth = Server::new_async().await;
    auth.mock("POST", "/auth/v1/verify")
        .with_status(403)
        .with_body(json!({"code": 403, "msg": "Token has expired or is invalid"}).to_string())
        .create_async()
        .await;

    let context = Arc::new(SessionContext::new());
    let provider = Arc::new(GoTrueClient::new(
        &auth.url(),
        SecretString::from("anon"),
        Arc::clone(&context),
    )?);
    let navigator = Arc::new(Recorder::default());
    let mut page =
        OtpVerificationPage::mount(&email_query(EMAIL), SITE_URL, provider, context, navigator.clone());

    let err = page
        .verify("654321")
        .await
        .err()
        .context("verification should fail")?;

    ensure!(matches!(err, FlowError::Remote { .. }));
    let notice = page.notice().context("expected a notice")?;
    ensure!(notice.title == "Verification failed");
    ensure!(notice.message == "Token has expired or is invalid");
    ensure!(page.status() == VerifyStatus::Idle);
    ensure!(navigator.routes().is_empty());
    Ok(())
}
