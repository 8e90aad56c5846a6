//! The credential/verification flow.
//!
//! Registration puts an email into a verification session; the session exists
//! exactly while the user is on the "enter the code we sent you" step. The
//! step state is a tagged union, the resend cooldown is deadline-based, and
//! every attempt holds an in-flight guard that resets on all exit paths.
//!
//! The registry mirrors the shape of short-lived login state elsewhere in the
//! stack: a mutex-guarded map swept by TTL on insert.

use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

use super::codes::CodeApi;
use super::provider::{AuthApi, SignedInUser};
use super::redirect::{RedirectPolicy, ROOT_PATH};
use crate::i18n::{text, Lang, Text};

pub const CODE_LENGTH: usize = 6;

/// How long the success message stays on screen before navigation.
pub const COMPLETION_PAUSE: Duration = Duration::from_millis(1500);

pub const DEFAULT_RESEND_COOLDOWN: Duration = Duration::from_secs(60);
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// Strip non-digits and clamp to the code length. Invalid characters are
/// dropped silently, never rejected with an error.
#[must_use]
pub fn sanitize_code(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CODE_LENGTH)
        .collect()
}

/// Deadline-based resend cooldown. Cannot go negative, and re-arming moves a
/// single deadline instead of stacking timers.
#[derive(Clone, Copy, Debug)]
pub struct Cooldown {
    ready_at: Instant,
}

impl Cooldown {
    #[must_use]
    pub fn ready() -> Self {
        Self {
            ready_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn armed(duration: Duration) -> Self {
        Self {
            ready_at: Instant::now() + duration,
        }
    }

    pub fn arm(&mut self, duration: Duration) {
        self.ready_at = Instant::now() + duration;
    }

    /// Whole seconds until the cooldown expires, rounded up so the gate stays
    /// closed exactly while any time remains.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        let remaining = self.ready_at.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            0
        } else if remaining.subsec_nanos() > 0 {
            remaining.as_secs() + 1
        } else {
            remaining.as_secs()
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining_seconds() == 0
    }
}

#[derive(Clone, Debug)]
pub struct FlowConfig {
    resend_cooldown: Duration,
    session_ttl: Duration,
    expose_debug_codes: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resend_cooldown: DEFAULT_RESEND_COOLDOWN,
            session_ttl: DEFAULT_SESSION_TTL,
            expose_debug_codes: false,
        }
    }

    #[must_use]
    pub fn with_resend_cooldown_seconds(mut self, seconds: u64) -> Self {
        self.resend_cooldown = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl = Duration::from_secs(seconds);
        self
    }

    /// Surface development-mode debug codes from the functions endpoint.
    /// Off by default; never enable in production deployments.
    #[must_use]
    pub fn with_expose_debug_codes(mut self, expose: bool) -> Self {
        self.expose_debug_codes = expose;
        self
    }

    #[must_use]
    pub fn resend_cooldown(&self) -> Duration {
        self.resend_cooldown
    }

    #[must_use]
    pub fn expose_debug_codes(&self) -> bool {
        self.expose_debug_codes
    }
}

/// Where a given email currently is in the flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowStep {
    /// No session: the credential form.
    Credentials,
    /// Awaiting the emailed code.
    Verifying { cooldown_seconds: u64 },
    /// Verified; the success screen before navigation.
    Done,
}

#[derive(Debug)]
enum EntryState {
    AwaitingCode { cooldown: Cooldown, in_flight: bool },
    Done,
}

#[derive(Debug)]
struct SessionEntry {
    created_at: Instant,
    state: EntryState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptError {
    /// No verification session for this email.
    NoSession,
    /// Another request for this email is still running.
    Busy,
}

/// Clears the in-flight flag when dropped, whatever the outcome of the
/// attempt was.
#[derive(Debug)]
pub struct InFlightGuard {
    email: String,
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut map) = self.inner.lock() {
            if let Some(SessionEntry {
                state: EntryState::AwaitingCode { in_flight, .. },
                ..
            }) = map.get_mut(&self.email)
            {
                *in_flight = false;
            }
        }
    }
}

/// Verification sessions keyed by normalized email.
pub struct VerificationSessions {
    config: FlowConfig,
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl VerificationSessions {
    #[must_use]
    pub fn new(config: FlowConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionEntry>> {
        // Lock poisoning only happens if a holder panicked; the map stays usable.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn key(email: &str) -> String {
        super::redirect::normalize_email(email)
    }

    /// Enter the verification step for an email. The cooldown starts ready:
    /// the registration submit already sent a code, and the first resend is
    /// allowed immediately.
    pub fn begin(&self, email: &str) {
        let ttl = self.config.session_ttl;
        let mut map = self.lock();
        map.retain(|_, entry| entry.created_at.elapsed() < ttl);
        map.insert(
            Self::key(email),
            SessionEntry {
                created_at: Instant::now(),
                state: EntryState::AwaitingCode {
                    cooldown: Cooldown::ready(),
                    in_flight: false,
                },
            },
        );
    }

    #[must_use]
    pub fn step(&self, email: &str) -> FlowStep {
        let map = self.lock();
        match map.get(&Self::key(email)) {
            None => FlowStep::Credentials,
            Some(SessionEntry {
                state: EntryState::AwaitingCode { cooldown, .. },
                ..
            }) => FlowStep::Verifying {
                cooldown_seconds: cooldown.remaining_seconds(),
            },
            Some(SessionEntry {
                state: EntryState::Done,
                ..
            }) => FlowStep::Done,
        }
    }

    /// The user backed out; the session state is discarded.
    pub fn cancel(&self, email: &str) -> bool {
        self.lock().remove(&Self::key(email)).is_some()
    }

    /// Seconds left on the resend cooldown, if a session is awaiting a code.
    #[must_use]
    pub fn cooldown_remaining(&self, email: &str) -> Option<u64> {
        let map = self.lock();
        match map.get(&Self::key(email)) {
            Some(SessionEntry {
                state: EntryState::AwaitingCode { cooldown, .. },
                ..
            }) => Some(cooldown.remaining_seconds()),
            _ => None,
        }
    }

    /// Re-arm the resend cooldown after a successful send.
    pub fn rearm_cooldown(&self, email: &str) {
        let duration = self.config.resend_cooldown;
        let mut map = self.lock();
        if let Some(SessionEntry {
            state: EntryState::AwaitingCode { cooldown, .. },
            ..
        }) = map.get_mut(&Self::key(email))
        {
            cooldown.arm(duration);
        }
    }

    /// Mark the session verified, keeping a `Done` marker for the success
    /// screen until the TTL sweep drops it.
    pub fn complete(&self, email: &str) -> bool {
        let mut map = self.lock();
        match map.get_mut(&Self::key(email)) {
            Some(entry) => {
                entry.state = EntryState::Done;
                true
            }
            None => false,
        }
    }

    /// Claim the in-flight slot for an email, preventing duplicate concurrent
    /// submissions from the same control.
    pub fn try_begin_attempt(&self, email: &str) -> Result<InFlightGuard, AttemptError> {
        let key = Self::key(email);
        let mut map = self.lock();
        match map.get_mut(&key) {
            Some(SessionEntry {
                state: EntryState::AwaitingCode { in_flight, .. },
                ..
            }) => {
                if *in_flight {
                    return Err(AttemptError::Busy);
                }
                *in_flight = true;
                Ok(InFlightGuard {
                    email: key,
                    inner: Arc::clone(&self.inner),
                })
            }
            _ => Err(AttemptError::NoSession),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The verification step begins; the user is not signed in yet.
    VerificationStarted { message: String },
    Rejected { message: String },
}

#[derive(Clone, Debug)]
pub enum LoginOutcome {
    /// Navigate to `destination`, replacing history so back does not return
    /// to the form.
    SignedIn {
        user: SignedInUser,
        destination: String,
    },
    /// The account exists but the email was never confirmed; offer a resend.
    EmailNotConfirmed { message: String },
    Rejected { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Show `message`, wait `pause`, then navigate to `destination`.
    Verified {
        message: String,
        destination: String,
        pause: Duration,
    },
    /// Rejected before any network call (incomplete code).
    RejectedLocally { message: String },
    NoSession { message: String },
    Busy { message: String },
    /// Provider rejected the code; the step stays on the code form and the
    /// entered code is not cleared.
    Failed { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent { message: String },
    /// Suppressed client-side; no request was issued.
    CoolingDown { seconds_remaining: u64 },
    NoSession { message: String },
    Busy { message: String },
    Failed { message: String },
}

fn or_generic(message: &str, lang: Lang, fallback: Text) -> String {
    if message.is_empty() {
        text(lang, fallback).to_string()
    } else {
        message.to_string()
    }
}

/// Submit the registration half of the credential form.
///
/// With a configured functions endpoint the flow issues a 6-digit code;
/// otherwise it falls back to the provider's confirmation-link sign-up. Both
/// enter the verification step without signing the user in.
pub async fn submit_register<P: AuthApi, C: CodeApi>(
    provider: &P,
    codes: Option<&C>,
    sessions: &VerificationSessions,
    signup_redirect: Option<&str>,
    email: &str,
    password: &SecretString,
    lang: Lang,
) -> RegisterOutcome {
    use secrecy::ExposeSecret;

    if email.trim().is_empty() || password.expose_secret().is_empty() {
        return RegisterOutcome::Rejected {
            message: text(lang, Text::RequiredField).to_string(),
        };
    }

    if let Some(codes) = codes {
        return match codes.send_code(email).await {
            Ok(response) => {
                let exposed_debug = sessions
                    .config()
                    .expose_debug_codes()
                    .then_some(response.debug_code.as_deref())
                    .flatten();
                if response.email_sent || exposed_debug.is_some() {
                    sessions.begin(email);
                    RegisterOutcome::VerificationStarted {
                        message: send_message(response.email_sent, exposed_debug, lang),
                    }
                } else {
                    RegisterOutcome::Rejected {
                        message: text(lang, Text::EmailSendFailed).to_string(),
                    }
                }
            }
            Err(err) => {
                warn!("Verification code send failed: {err}");
                RegisterOutcome::Rejected {
                    message: or_generic(err.message(), lang, Text::GenericError),
                }
            }
        };
    }

    match provider.sign_up(email, password, signup_redirect).await {
        Ok(()) => {
            sessions.begin(email);
            RegisterOutcome::VerificationStarted {
                message: text(lang, Text::ConfirmationSent).to_string(),
            }
        }
        Err(err) => {
            warn!("Sign-up failed: {err}");
            RegisterOutcome::Rejected {
                message: or_generic(err.message(), lang, Text::GenericError),
            }
        }
    }
}

/// Submit the login half of the credential form and resolve the destination.
pub async fn submit_login<P: AuthApi>(
    provider: &P,
    policy: &RedirectPolicy,
    email: &str,
    password: &SecretString,
    query_return_to: Option<&str>,
    state_return_to: Option<&str>,
    lang: Lang,
) -> LoginOutcome {
    use secrecy::ExposeSecret;

    if email.trim().is_empty() || password.expose_secret().is_empty() {
        return LoginOutcome::Rejected {
            message: text(lang, Text::RequiredField).to_string(),
        };
    }

    match provider.sign_in_with_password(email, password).await {
        Ok(user) => {
            let destination = policy.resolve(email, query_return_to, state_return_to);
            LoginOutcome::SignedIn { user, destination }
        }
        Err(err) if err.is_unconfirmed_email() => LoginOutcome::EmailNotConfirmed {
            message: text(lang, Text::EmailNotConfirmed).to_string(),
        },
        Err(err) => {
            warn!("Sign-in failed: {err}");
            LoginOutcome::Rejected {
                message: or_generic(err.message(), lang, Text::GenericError),
            }
        }
    }
}

/// Verify the emailed code. Short codes are rejected locally; the network is
/// only reached with a full 6-digit code and a live session.
pub async fn verify_code<C: CodeApi>(
    codes: &C,
    sessions: &VerificationSessions,
    policy: &RedirectPolicy,
    email: &str,
    code_input: &str,
    password: &SecretString,
    query_return_to: Option<&str>,
    state_return_to: Option<&str>,
    lang: Lang,
) -> VerifyOutcome {
    let code = sanitize_code(code_input);
    if code.len() != CODE_LENGTH {
        return VerifyOutcome::RejectedLocally {
            message: text(lang, Text::CodeIncomplete).to_string(),
        };
    }

    let guard = match sessions.try_begin_attempt(email) {
        Ok(guard) => guard,
        Err(AttemptError::NoSession) => {
            return VerifyOutcome::NoSession {
                message: text(lang, Text::NoPendingVerification).to_string(),
            }
        }
        Err(AttemptError::Busy) => {
            return VerifyOutcome::Busy {
                message: text(lang, Text::Processing).to_string(),
            }
        }
    };

    match codes.verify_code(email, &code, password).await {
        Ok(()) => {
            drop(guard);
            sessions.complete(email);
            VerifyOutcome::Verified {
                message: text(lang, Text::VerificationSuccess).to_string(),
                destination: policy.resolve(email, query_return_to, state_return_to),
                pause: COMPLETION_PAUSE,
            }
        }
        Err(err) => {
            warn!("Code verification failed: {err}");
            VerifyOutcome::Failed {
                message: or_generic(err.message(), lang, Text::VerificationFailed),
            }
        }
    }
}

/// Re-send the verification code, gated by the cooldown. A successful send
/// re-arms the cooldown; a failed one does not.
pub async fn resend_code<C: CodeApi>(
    codes: &C,
    sessions: &VerificationSessions,
    email: &str,
    lang: Lang,
) -> ResendOutcome {
    let guard = match sessions.try_begin_attempt(email) {
        Ok(guard) => guard,
        Err(AttemptError::NoSession) => {
            return ResendOutcome::NoSession {
                message: text(lang, Text::NoPendingVerification).to_string(),
            }
        }
        Err(AttemptError::Busy) => {
            return ResendOutcome::Busy {
                message: text(lang, Text::Processing).to_string(),
            }
        }
    };

    match sessions.cooldown_remaining(email) {
        Some(seconds_remaining) if seconds_remaining > 0 => {
            return ResendOutcome::CoolingDown { seconds_remaining };
        }
        _ => {}
    }

    let outcome = match codes.send_code(email).await {
        Ok(response) => {
            let exposed_debug = sessions
                .config()
                .expose_debug_codes()
                .then_some(response.debug_code.as_deref())
                .flatten();
            if response.email_sent || exposed_debug.is_some() {
                sessions.rearm_cooldown(email);
                ResendOutcome::Sent {
                    message: send_message(response.email_sent, exposed_debug, lang),
                }
            } else {
                ResendOutcome::Failed {
                    message: text(lang, Text::EmailSendFailed).to_string(),
                }
            }
        }
        Err(err) => {
            warn!("Verification code resend failed: {err}");
            ResendOutcome::Failed {
                message: or_generic(err.message(), lang, Text::ResendFailed),
            }
        }
    };

    drop(guard);
    outcome
}

/// Re-send the provider's confirmation email (link mode).
pub async fn resend_confirmation<P: AuthApi>(
    provider: &P,
    email: &str,
    lang: Lang,
) -> ResendOutcome {
    if email.trim().is_empty() {
        return ResendOutcome::Failed {
            message: text(lang, Text::RequiredField).to_string(),
        };
    }

    match provider.resend_signup(email).await {
        Ok(()) => ResendOutcome::Sent {
            message: text(lang, Text::ConfirmationSent).to_string(),
        },
        Err(err) => {
            warn!("Confirmation resend failed: {err}");
            ResendOutcome::Failed {
                message: or_generic(err.message(), lang, Text::GenericError),
            }
        }
    }
}

/// Compose the OAuth redirect target from the site origin and return path.
pub fn oauth_redirect_target(site_origin: &str, return_to: Option<&str>) -> String {
    let path = return_to
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .unwrap_or(ROOT_PATH);
    format!("{}{path}", site_origin.trim_end_matches('/'))
}

fn send_message(email_sent: bool, exposed_debug: Option<&str>, lang: Lang) -> String {
    let base = if email_sent {
        text(lang, Text::CodeSent)
    } else {
        text(lang, Text::EmailServiceUnavailable)
    };
    match exposed_debug {
        Some(code) => format!("{base} (debug code: {code})"),
        None => base.to_string(),
    }
}
