//! Record edit flow: load-and-prefill, then a flat partial update that never
//! touches the record number or the append-target strings.

use crate::client::ProntuarioClient;
use crate::create::FormFlowError;
use crate::forms::{self, FormStep, ProntuarioFormData};
use crate::models::payload::ProntuarioUpdate;
use crate::models::record::Prontuario;
use crate::validation::ValidationErrors;

const LOAD_FALLBACK: &str =
    "Erro ao buscar dados do prontuário. Tente novamente mais tarde.";
const UPDATE_FALLBACK: &str = "Erro ao atualizar prontuário. Tente novamente mais tarde.";

/// Drives the edit form for an existing record.
pub struct EditController {
    client: ProntuarioClient,
    original: Prontuario,
    form: ProntuarioFormData,
    step: FormStep,
}

impl EditController {
    /// Fetches the record and prefills the nested form from its flat shape.
    pub async fn load(client: ProntuarioClient, id: i64) -> Result<Self, FormFlowError> {
        let original = client.get_by_id(id).await.map_err(|err| {
            let user_message = err
                .server_message()
                .unwrap_or_else(|| LOAD_FALLBACK.to_string());
            FormFlowError::Request {
                user_message,
                source: err,
            }
        })?;

        let form = forms::from_record(&original);
        Ok(Self {
            client,
            original,
            form,
            step: FormStep::DadosPaciente,
        })
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

    pub fn original(&self) -> &Prontuario {
        &self.original
    }

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

    /// PUTs the flat update. The record number is always the original one,
    /// assigned at creation and never rewritten, and the clinical
    /// append-target strings pass through untouched.
    pub async fn submit(&mut self) -> Result<(), FormFlowError> {
        for step in FormStep::ALL {
            forms::validate_step(&self.form, step).map_err(FormFlowError::Validation)?;
        }

        let update = ProntuarioUpdate {
            nome_paciente: self.form.paciente.nome.clone(),
            historico_medico: self.form.historico_medico.descricao.clone(),
            medicamentos: self.original.medicamentos.clone(),
            exames: self.original.exames.clone(),
            condicoes_clinicas: self.original.condicoes_clinicas.clone(),
            tipo_tratamento: self.form.tipo_tratamento,
            numero_prontuario: self.original.numero_prontuario.clone(),
        };

        match self.client.update(self.original.id, &update).await {
            Ok(updated) => {
                tracing::info!(id = updated.id, "prontuário updated");
                self.original = updated;
                Ok(())
            }
            Err(err) => {
                let user_message = err
                    .server_message()
                    .unwrap_or_else(|| UPDATE_FALLBACK.to_string());
                Err(FormFlowError::Request {
                    user_message,
                    source: err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::routing::get;
    use axum::{Json, Router};

    use crate::models::enums::TipoTratamento;
    use crate::validation::random_cpf;

    #[derive(Clone)]
    struct Backend {
        record: Arc<Mutex<serde_json::Value>>,
        updates: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    fn stored_record() -> serde_json::Value {
        serde_json::json!({
            "id": 9,
            "numeroProntuario": "PRONT-1700000000000421",
            "nomePaciente": "Carla Mendes",
            "historicoMedico": "Acompanhamento desde 2023.",
            "medicamentos": "Sertralina 50mg - 1x ao dia",
            "exames": "Hemograma (2024-01-12): sem alterações",
            "condicoesClinicas": "Transtorno de ansiedade generalizada",
            "tipoTratamento": "TERAPIA_INDIVIDUAL",
            "statusTratamento": "EM_TRATAMENTO",
            "dataCriacao": "2023-11-20T10:00:00"
        })
    }

    async fn spawn_backend(backend: Backend) -> String {
        let app = Router::new()
            .route(
                "/api/prontuarios/:id",
                get(|State(b): State<Backend>, Path(_id): Path<i64>| async move {
                    Json(b.record.lock().unwrap().clone())
                })
                .put(
                    |State(b): State<Backend>,
                     Path(_id): Path<i64>,
                     Json(body): Json<serde_json::Value>| async move {
                        {
                            let mut record = b.record.lock().unwrap();
                            record["nomePaciente"] = body["nomePaciente"].clone();
                            record["historicoMedico"] = body["historicoMedico"].clone();
                            record["tipoTratamento"] = body["tipoTratamento"].clone();
                        }
                        b.updates.lock().unwrap().push(body);
                        Json(b.record.lock().unwrap().clone())
                    },
                ),
            )
            .with_state(backend);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    #[tokio::test]
    async fn load_prefills_the_nested_form() {
        let backend = Backend {
            record: Arc::new(Mutex::new(stored_record())),
            updates: Arc::new(Mutex::new(Vec::new())),
        };
        let base = spawn_backend(backend).await;

        let controller = EditController::load(ProntuarioClient::new(&base), 9)
            .await
            .unwrap();

        assert_eq!(controller.form().paciente.nome, "Carla Mendes");
        assert_eq!(
            controller.form().historico_medico.descricao,
            "Acompanhamento desde 2023."
        );
        // No patient snapshot on the wire: document fields prefill empty.
        assert_eq!(controller.form().paciente.cpf, "");
    }

    #[tokio::test]
    async fn submit_preserves_number_and_append_targets() {
        let backend = Backend {
            record: Arc::new(Mutex::new(stored_record())),
            updates: Arc::new(Mutex::new(Vec::new())),
        };
        let base = spawn_backend(backend.clone()).await;

        let mut controller = EditController::load(ProntuarioClient::new(&base), 9)
            .await
            .unwrap();

        // The edit form cannot pass the patient step with the empty document
        // fields the backend omitted; fill them as the user would.
        {
            let form = controller.form_mut();
            form.paciente.data_nascimento = "1985-02-10".into();
            form.paciente.cpf = random_cpf();
            form.paciente.telefone = "11912345678".into();
            form.paciente.email = "carla@exemplo.com".into();
            form.paciente.endereco.logradouro = "Avenida Central".into();
            form.paciente.endereco.numero = "55".into();
            form.paciente.endereco.bairro = "Jardins".into();
            form.paciente.endereco.cidade = "Campinas".into();
            form.paciente.endereco.estado = "SP".into();
            form.paciente.endereco.cep = "13010000".into();
            form.tipo_tratamento = TipoTratamento::TerapiaFamiliar;
            form.historico_medico.descricao = "Acompanhamento revisado em 2024.".into();
        }

        controller.submit().await.unwrap();

        let updates = backend.updates.lock().unwrap();
        let body = &updates[0];
        assert_eq!(body["numeroProntuario"], "PRONT-1700000000000421");
        assert_eq!(body["medicamentos"], "Sertralina 50mg - 1x ao dia");
        assert_eq!(body["exames"], "Hemograma (2024-01-12): sem alterações");
        assert_eq!(
            body["condicoesClinicas"],
            "Transtorno de ansiedade generalizada"
        );
        assert_eq!(body["tipoTratamento"], "TERAPIA_FAMILIAR");
        assert_eq!(body["historicoMedico"], "Acompanhamento revisado em 2024.");
    }
}
