//! Typed HTTP client for the records API.
//!
//! One method per REST action. No business rules live here: a typed payload
//! goes in, the server's JSON body comes back unchanged, and failures are
//! surfaced to the caller as-is, with no retries and no client-enforced timeout.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::models::payload::{
    BuscaProntuarioParams, ExameArquivo, NovaAnotacao, NovaMedicacao, NovoExame, NovoHistorico,
    ProntuarioPayload, ProntuarioUpdate,
};
use crate::models::record::{Prontuario, ResultadoBusca};
use crate::status::StatusChange;

/// Records API client. Holds the base URL and, optionally, the bearer token
/// the auth collaborator persisted.
#[derive(Debug, Clone)]
pub struct ProntuarioClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ProntuarioClient {
    /// Creates a client for the records API at `base_url`.
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http,
        }
    }

    /// Same, with a bearer token attached to every request.
    pub fn with_token(base_url: &str, token: &str) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.to_string());
        client
    }

    /// Client against the configured base URL (env override or default).
    pub fn from_env() -> Self {
        Self::new(&crate::config::api_base_url())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connection(self.base_url.clone())
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ServerMessage::decode(&body);
            tracing::debug!(status = status.as_u16(), "records API returned an error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))
    }

    /// Paged list/search.
    pub async fn search(
        &self,
        params: &BuscaProntuarioParams,
    ) -> Result<ResultadoBusca, ClientError> {
        self.execute(self.http.get(self.url("/prontuarios")).query(params))
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Prontuario, ClientError> {
        self.execute(self.http.get(self.url(&format!("/prontuarios/{id}"))))
            .await
    }

    pub async fn create(&self, payload: &ProntuarioPayload) -> Result<Prontuario, ClientError> {
        self.execute(self.http.post(self.url("/prontuarios")).json(payload))
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &ProntuarioUpdate,
    ) -> Result<Prontuario, ClientError> {
        self.execute(
            self.http
                .put(self.url(&format!("/prontuarios/{id}")))
                .json(payload),
        )
        .await
    }

    pub async fn append_medical_history(
        &self,
        id: i64,
        entry: &NovoHistorico,
    ) -> Result<serde_json::Value, ClientError> {
        self.execute(
            self.http
                .post(self.url(&format!("/prontuarios/{id}/historico-medico")))
                .json(entry),
        )
        .await
    }

    pub async fn append_medication(
        &self,
        id: i64,
        entry: &NovaMedicacao,
    ) -> Result<serde_json::Value, ClientError> {
        self.execute(
            self.http
                .post(self.url(&format!("/prontuarios/{id}/medicacoes")))
                .json(entry),
        )
        .await
    }

    /// The one operation whose body shape branches: a plain JSON body without
    /// an attachment, a multipart form with one. Field names are identical in
    /// both encodings.
    pub async fn append_exam(
        &self,
        id: i64,
        entry: &NovoExame,
        arquivo: Option<&ExameArquivo>,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.url(&format!("/prontuarios/{id}/exames"));

        let request = match arquivo {
            Some(arquivo) => {
                let mut form = reqwest::multipart::Form::new()
                    .text("nome", entry.nome.clone())
                    .text("data", entry.data.clone())
                    .text("resultado", entry.resultado.clone());
                if let Some(observacoes) = &entry.observacoes {
                    form = form.text("observacoes", observacoes.clone());
                }
                let part = reqwest::multipart::Part::bytes(arquivo.bytes.clone())
                    .file_name(arquivo.file_name.clone())
                    .mime_str(&arquivo.content_type)
                    .map_err(|e| ClientError::InvalidAttachment(e.to_string()))?;
                self.http.post(url).multipart(form.part("arquivo", part))
            }
            None => self.http.post(url).json(entry),
        };

        self.execute(request).await
    }

    pub async fn append_note(
        &self,
        id: i64,
        entry: &NovaAnotacao,
    ) -> Result<serde_json::Value, ClientError> {
        self.execute(
            self.http
                .post(self.url(&format!("/prontuarios/{id}/anotacoes")))
                .json(entry),
        )
        .await
    }

    /// Submits a guarded status transition. This is the only endpoint that
    /// mutates the treatment status; callers must re-fetch the record after
    /// success rather than trust the response body.
    pub async fn update_treatment_status(
        &self,
        id: i64,
        change: &StatusChange,
    ) -> Result<serde_json::Value, ClientError> {
        self.execute(
            self.http
                .patch(self.url(&format!("/prontuarios/{id}/status-tratamento")))
                .json(change),
        )
        .await
    }
}

/// Failures surfaced by the records API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not connect to {0}")]
    Connection(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid attachment: {0}")]
    InvalidAttachment(String),
    #[error("records API returned {status}: {message}")]
    Api { status: u16, message: ServerMessage },
    #[error("failed to decode response: {0}")]
    ResponseParsing(String),
}

impl ClientError {
    /// 401: the routing collaborator redirects to the login screen.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// 403: the routing collaborator redirects to the forbidden screen.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Api { status: 403, .. })
    }

    /// The server-supplied message, when this error carries a non-empty one.
    /// Callers fall back to their own generic text otherwise.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Api { message, .. } => message.user_text(),
            _ => None,
        }
    }
}

/// Error body the backend returns. Bean-validation failures arrive as a map
/// of field → message; everything else is a plain string, sometimes wrapped
/// in a `{"message": …}` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Plain(String),
    FieldErrors(BTreeMap<String, String>),
}

impl ServerMessage {
    /// Decodes a raw error body into the tagged union. An object carrying a
    /// string `message` is the plain-message shape; any other object becomes
    /// a field-error map; anything undecodable is kept verbatim.
    pub fn decode(body: &str) -> Self {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
            match value {
                serde_json::Value::String(s) => return Self::Plain(s),
                serde_json::Value::Object(map) => {
                    if let Some(serde_json::Value::String(message)) = map.get("message") {
                        return Self::Plain(message.clone());
                    }
                    let fields: BTreeMap<String, String> = map
                        .into_iter()
                        .filter_map(|(field, v)| match v {
                            serde_json::Value::String(s) => Some((field, s)),
                            _ => None,
                        })
                        .collect();
                    if !fields.is_empty() {
                        return Self::FieldErrors(fields);
                    }
                }
                _ => {}
            }
        }
        Self::Plain(body.trim().to_string())
    }

    /// Text to show the user; `None` when the body was empty. Field errors
    /// are joined in key order so the output is deterministic.
    pub fn user_text(&self) -> Option<String> {
        match self {
            Self::Plain(s) if s.trim().is_empty() => None,
            Self::Plain(s) => Some(s.clone()),
            Self::FieldErrors(fields) => Some(
                fields
                    .iter()
                    .map(|(field, message)| format!("{field}: {message}"))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_text().unwrap_or_default())
    }
}
