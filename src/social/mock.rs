use super::facebook::{CallbackSdk, SdkCallback};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// One recorded SDK invocation
#[derive(Debug, Clone, PartialEq)]
pub struct SdkCall {
    pub entry: &'static str,
    pub path: Option<String>,
    pub params: Value,
}

#[derive(Debug, Default)]
struct Script {
    status: Option<(String, String)>,
    login_grant: Option<(String, String)>,
    responses: HashMap<String, Value>,
    calls: Vec<SdkCall>,
}

/// Answers every call synchronously from a script.
///
/// Paths without a scripted response never invoke their callback, which
/// simulates an SDK that silently drops the request.
#[derive(Debug, Default)]
pub struct ScriptedSdk {
    script: Mutex<Script>,
}

impl ScriptedSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the user as connected with the given credentials
    pub fn connected(self, user_id: &str, access_token: &str) -> Self {
        self.with_script(|s| s.status = Some((user_id.to_string(), access_token.to_string())));
        self
    }

    /// What the login dialog grants; without this the dialog is cancelled
    pub fn granting(self, user_id: &str, access_token: &str) -> Self {
        self.with_script(|s| {
            s.login_grant = Some((user_id.to_string(), access_token.to_string()))
        });
        self
    }

    pub fn respond(self, path: &str, response: Value) -> Self {
        self.set_response(path, response);
        self
    }

    pub fn set_response(&self, path: &str, response: Value) {
        self.with_script(|s| {
            s.responses.insert(path.to_string(), response);
        });
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.with_script(|s| s.calls.clone())
    }

    pub fn calls_to(&self, path: &str) -> Vec<SdkCall> {
        self.with_script(|s| {
            s.calls
                .iter()
                .filter(|c| c.path.as_deref() == Some(path))
                .cloned()
                .collect()
        })
    }

    fn with_script<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut guard = self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    fn record(&self, entry: &'static str, path: Option<&str>, params: Value) {
        self.with_script(|s| {
            s.calls.push(SdkCall {
                entry,
                path: path.map(str::to_string),
                params,
            })
        });
    }
}

fn auth_response(user_id: &str, access_token: &str) -> Value {
    json!({ "userID": user_id, "accessToken": access_token })
}

impl CallbackSdk for ScriptedSdk {
    fn get_login_status(&self, force: bool, callback: SdkCallback) {
        self.record("getLoginStatus", None, json!({ "force": force }));

        let response = match self.with_script(|s| s.status.clone()) {
            Some((user_id, token)) => json!({
                "status": "connected",
                "authResponse": auth_response(&user_id, &token),
            }),
            None => json!({ "status": "unknown", "authResponse": null }),
        };
        callback(response);
    }

    fn login(&self, scope: &str, callback: SdkCallback) {
        self.record("login", None, json!({ "scope": scope }));

        let grant = self.with_script(|s| {
            let grant = s.login_grant.clone();
            if grant.is_some() {
                s.status = grant.clone();
            }
            grant
        });

        let response = match grant {
            Some((user_id, token)) => json!({
                "status": "connected",
                "authResponse": auth_response(&user_id, &token),
            }),
            None => json!({ "status": "not_authorized" }),
        };
        callback(response);
    }

    fn logout(&self, callback: SdkCallback) {
        self.record("logout", None, Value::Null);
        self.with_script(|s| s.status = None);
        callback(json!({ "status": "unknown" }));
    }

    fn api(&self, path: &str, method: &str, params: Value, callback: SdkCallback) {
        self.record("api", Some(path), json!({ "method": method, "query": params }));

        if let Some(response) = self.with_script(|s| s.responses.get(path).cloned()) {
            callback(response);
        }
    }
}
