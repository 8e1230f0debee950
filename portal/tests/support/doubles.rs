//! Hand-written port doubles for behaviour tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use portal::domain::ports::{AuthGateway, BackendError, RegistrationGateway};
use portal::domain::{AuthToken, LoginCredentials, RegistrationReceipt, ValidRegistration};
use serde_json::json;

/// Registration gateway that records every call and answers from a script.
#[derive(Debug)]
pub struct RecordingRegistrationGateway {
    reply: Mutex<Result<RegistrationReceipt, BackendError>>,
    calls: Mutex<Vec<ValidRegistration>>,
}

impl Default for RecordingRegistrationGateway {
    fn default() -> Self {
        Self {
            reply: Mutex::new(Ok(RegistrationReceipt {
                body: json!({ "id": "member-1" }),
            })),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingRegistrationGateway {
    pub fn reply_with(&self, reply: Result<RegistrationReceipt, BackendError>) {
        *self.reply.lock().expect("reply lock") = reply;
    }

    pub fn calls(&self) -> Vec<ValidRegistration> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RegistrationGateway for RecordingRegistrationGateway {
    async fn register(
        &self,
        registration: &ValidRegistration,
    ) -> Result<RegistrationReceipt, BackendError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(registration.clone());
        self.reply.lock().expect("reply lock").clone()
    }
}

/// How the scripted auth gateway answers verification.
#[derive(Debug, Clone)]
pub enum VerifyScript {
    Accept,
    Reject(BackendError),
    Stall(Duration),
}

/// Auth gateway answering from a script and counting calls.
#[derive(Debug)]
pub struct ScriptedAuthGateway {
    verify: Mutex<VerifyScript>,
    login: Mutex<Result<String, BackendError>>,
    verify_calls: AtomicUsize,
    login_calls: AtomicUsize,
}

impl Default for ScriptedAuthGateway {
    fn default() -> Self {
        Self {
            verify: Mutex::new(VerifyScript::Accept),
            login: Mutex::new(Ok("issued-token".to_owned())),
            verify_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedAuthGateway {
    pub fn verify_with(&self, script: VerifyScript) {
        *self.verify.lock().expect("verify lock") = script;
    }

    pub fn login_with(&self, reply: Result<String, BackendError>) {
        *self.login.lock().expect("login lock") = reply;
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for ScriptedAuthGateway {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<AuthToken, BackendError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.login.lock().expect("login lock").clone();
        reply.and_then(|raw| AuthToken::new(raw).map_err(|err| BackendError::decode(err.to_string())))
    }

    async fn verify(&self, _token: &AuthToken) -> Result<(), BackendError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.verify.lock().expect("verify lock").clone();
        match script {
            VerifyScript::Accept => Ok(()),
            VerifyScript::Reject(error) => Err(error),
            VerifyScript::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
