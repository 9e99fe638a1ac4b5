//! Provider subprocess protocol.
//!
//! A provider is any executable named `calassist-provider-<name>` on `PATH`
//! that speaks the JSON protocol in [`super::protocol`]. Each call spawns
//! the binary, writes one request line and reads one response. Providers
//! manage their own credentials; calassist only forwards the `[remote]`
//! parameters from the config file.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{CalAssistError, CalAssistResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const BINARY_PREFIX: &str = "calassist-provider-";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("{BINARY_PREFIX}{}", self.0)
    }

    fn binary_path(&self) -> CalAssistResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            CalAssistError::RemoteUnavailable(format!(
                "Provider '{}' not found: no '{}' on PATH",
                self.0, binary_name
            ))
        })
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type comes from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> CalAssistResult<C::Response> {
        tracing::debug!(provider = %self.0, command = ?C::command(), "calling provider");
        timeout(PROVIDER_TIMEOUT, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| {
                CalAssistError::RemoteUnavailable(format!(
                    "Provider '{}' timed out after {}s",
                    self.0,
                    PROVIDER_TIMEOUT.as_secs()
                ))
            })?
    }

    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalAssistResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| CalAssistError::Serialization(e.to_string()))?;
        let request_json = serde_json::to_string(&Request { command, params })
            .map_err(|e| CalAssistError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        let unavailable = |what: &str, e: std::io::Error| {
            CalAssistError::RemoteUnavailable(format!(
                "{what} {}: {e}",
                binary_path.display()
            ))
        };

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| unavailable("Failed to spawn", e))?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            CalAssistError::RemoteUnavailable("Provider stdin was not captured".into())
        })?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await
            .map_err(|e| unavailable("Failed to write to", e))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| unavailable("Failed waiting for", e))?;

        if !output.status.success() {
            return Err(CalAssistError::RemoteUnavailable(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_response<R: DeserializeOwned>(body: &str) -> CalAssistResult<R> {
    if body.trim().is_empty() {
        return Err(CalAssistError::Provider("Provider returned no response".into()));
    }

    let response: Response<R> = serde_json::from_str(body)
        .map_err(|e| CalAssistError::Provider(format!("Failed to parse response: {e}")))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(CalAssistError::Provider(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::protocol::DeleteEvent;

    #[test]
    fn test_binary_name() {
        assert_eq!(
            Provider::from_name("google").binary_name(),
            "calassist-provider-google"
        );
    }

    #[test]
    fn test_parse_response_outcomes() {
        let ok: bool = parse_response(r#"{"status":"success","data":false}"#).unwrap();
        assert!(!ok);

        let err = parse_response::<bool>(r#"{"status":"error","error":"denied"}"#).unwrap_err();
        assert!(matches!(err, CalAssistError::Provider(msg) if msg == "denied"));

        assert!(matches!(
            parse_response::<bool>("\n"),
            Err(CalAssistError::Provider(_))
        ));
        assert!(matches!(
            parse_response::<bool>("not json"),
            Err(CalAssistError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let provider = Provider::from_name("no-such-provider-7f3a");
        let err = provider
            .call(DeleteEvent {
                remote_config: serde_json::Map::new(),
                remote_id: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CalAssistError::RemoteUnavailable(_)));
        assert_eq!(err.kind(), "remote_unavailable");
    }
}
