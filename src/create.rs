//! Record creation flow: stepper gating, record-number generation and submit.

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::client::{ClientError, ProntuarioClient};
use crate::forms::{self, FormStep, ProntuarioFormData};
use crate::validation::ValidationErrors;

const CREATE_FALLBACK: &str = "Ocorreu um erro desconhecido.";

/// Failure of a create/edit submission: either inline field errors (nothing
/// was sent) or a request that the backend refused.
#[derive(Debug, Error)]
pub enum FormFlowError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("{user_message}")]
    Request {
        user_message: String,
        #[source]
        source: ClientError,
    },
}

impl FormFlowError {
    fn request(err: ClientError, fallback: &str) -> Self {
        let user_message = err.server_message().unwrap_or_else(|| fallback.to_string());
        Self::Request {
            user_message,
            source: err,
        }
    }
}

/// Client-generated record number: `PRONT-` plus the millisecond timestamp
/// and a short random suffix that shrinks the same-instant collision window.
/// The backend treats the value as opaque; it only has to be unique enough.
pub fn generate_record_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("PRONT-{millis}{suffix:03}")
}

/// Drives the two-step creation form through to the POST.
pub struct CreateController {
    client: ProntuarioClient,
    form: ProntuarioFormData,
    step: FormStep,
}

impl CreateController {
    pub fn new(client: ProntuarioClient) -> Self {
        Self {
            client,
            form: ProntuarioFormData::default(),
            step: FormStep::DadosPaciente,
        }
    }

    pub fn form(&self) -> &ProntuarioFormData {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProntuarioFormData {
        &mut self.form
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    /// Moves to the next step only when the current step's schema passes;
    /// on failure the field errors are returned for inline rendering.
    pub fn advance(&mut self) -> Result<(), ValidationErrors> {
        forms::validate_step(&self.form, self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(())
    }

    pub fn back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
    }

    /// Validates every step, generates the record number and POSTs the
    /// flattened payload. Returns the created record's id, which the caller
    /// uses for the success redirect.
    pub async fn submit(&mut self) -> Result<i64, FormFlowError> {
        for step in FormStep::ALL {
            forms::validate_step(&self.form, step).map_err(FormFlowError::Validation)?;
        }

        let numero_prontuario = generate_record_number();
        let payload = forms::to_wire(&self.form, numero_prontuario);

        match self.client.create(&payload).await {
            Ok(created) => {
                tracing::info!(
                    id = created.id,
                    numero = %created.numero_prontuario,
                    "prontuário created"
                );
                Ok(created.id)
            }
            Err(err) => Err(FormFlowError::request(err, CREATE_FALLBACK)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::LazyLock;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::routing::post;
    use axum::{Json, Router};
    use regex::Regex;

    use crate::forms::{EnderecoForm, HistoricoMedicoForm, PacienteForm};
    use crate::models::enums::{Genero, TipoTratamento};
    use crate::validation::random_cpf;

    static RECORD_NUMBER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^PRONT-\d+$").unwrap());

    fn filled_form() -> ProntuarioFormData {
        ProntuarioFormData {
            paciente: PacienteForm {
                nome: "Maria Silva".into(),
                data_nascimento: "1990-05-20".into(),
                cpf: random_cpf(),
                genero: Genero::Feminino,
                telefone: "11987654321".into(),
                email: "maria@exemplo.com".into(),
                endereco: EnderecoForm {
                    logradouro: "Rua das Flores".into(),
                    numero: "120".into(),
                    complemento: String::new(),
                    bairro: "Centro".into(),
                    cidade: "São Paulo".into(),
                    estado: "SP".into(),
                    cep: "01001000".into(),
                },
            },
            tipo_tratamento: TipoTratamento::TerapiaIndividual,
            historico_medico: HistoricoMedicoForm {
                // 12 characters of initial history.
                descricao: "Ansiedade ge".into(),
            },
        }
    }

    async fn spawn_backend(
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
    ) -> String {
        let app = Router::new()
            .route(
                "/api/prontuarios",
                post(
                    |State(bodies): State<Arc<Mutex<Vec<serde_json::Value>>>>,
                     Json(body): Json<serde_json::Value>| async move {
                        let numero = body["numeroProntuario"].clone();
                        bodies.lock().unwrap().push(body);
                        Json(serde_json::json!({
                            "id": 42,
                            "numeroProntuario": numero,
                            "nomePaciente": "Maria Silva",
                            "tipoTratamento": "TERAPIA_INDIVIDUAL",
                            "dataCriacao": "2024-03-01T09:30:00"
                        }))
                    },
                ),
            )
            .with_state(bodies);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    #[test]
    fn record_number_matches_the_expected_shape() {
        for _ in 0..20 {
            let numero = generate_record_number();
            assert!(
                RECORD_NUMBER_RE.is_match(&numero),
                "unexpected record number: {numero}"
            );
        }
    }

    #[test]
    fn advance_refuses_an_invalid_patient_step() {
        let mut controller = CreateController::new(ProntuarioClient::new("http://localhost:0"));

        let errors = controller.advance().unwrap_err();
        assert!(errors.get("paciente.nome").is_some());
        assert_eq!(controller.step(), FormStep::DadosPaciente);

        *controller.form_mut() = filled_form();
        controller.advance().unwrap();
        assert_eq!(controller.step(), FormStep::InformacoesTratamento);

        controller.back();
        assert_eq!(controller.step(), FormStep::DadosPaciente);
    }

    #[tokio::test]
    async fn submit_posts_the_flattened_payload_and_returns_the_id() {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_backend(bodies.clone()).await;

        let mut controller = CreateController::new(ProntuarioClient::new(&base));
        *controller.form_mut() = filled_form();

        let id = controller.submit().await.unwrap();
        assert_eq!(id, 42);

        let bodies = bodies.lock().unwrap();
        let body = &bodies[0];
        assert!(RECORD_NUMBER_RE.is_match(body["numeroProntuario"].as_str().unwrap()));
        assert_eq!(body["paciente"]["nome"], "Maria Silva");
        assert_eq!(body["paciente"]["logradouro"], "Rua das Flores");
        assert_eq!(body["nome_paciente"], "Maria Silva");
        assert_eq!(body["tipoTratamento"], "TERAPIA_INDIVIDUAL");
        assert_eq!(body["historicoMedico"], "Ansiedade ge");
        assert_eq!(body["medicamentos"], "");
    }

    #[tokio::test]
    async fn submit_refuses_an_invalid_form_without_a_network_call() {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let base = spawn_backend(bodies.clone()).await;

        let mut controller = CreateController::new(ProntuarioClient::new(&base));
        *controller.form_mut() = filled_form();
        controller.form_mut().historico_medico.descricao = "curto".into();

        match controller.submit().await.unwrap_err() {
            FormFlowError::Validation(errors) => {
                assert_eq!(
                    errors.get("historicoMedico.descricao"),
                    Some("Descrição deve ter pelo menos 10 caracteres")
                );
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert!(bodies.lock().unwrap().is_empty());
    }
}
