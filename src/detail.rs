//! Record detail screen logic: the tabbed sub-record views, one modal per
//! sub-record kind, and the append/refresh protocol.
//!
//! Every successful mutation is followed by a full re-fetch; the append
//! response itself is never taken as the new record state. Failures keep the
//! modal open with the server's message when it sent one, and never roll back
//! the record already on screen.

use std::time::Duration;

use thiserror::Error;

use crate::client::{ClientError, ProntuarioClient};
use crate::models::enums::StatusTratamento;
use crate::models::payload::{ExameArquivo, NovaAnotacao, NovaMedicacao, NovoExame, NovoHistorico};
use crate::models::record::Prontuario;
use crate::status::{self, StatusChange};
use crate::validation::{self, ValidationErrors};

/// How long the transient success message stays up before the modal closes.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(2);

const LOAD_FALLBACK: &str =
    "Erro ao buscar dados do prontuário. Tente novamente mais tarde.";

/// The four sub-record tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTab {
    Historico,
    Medicacoes,
    Exames,
    Anotacoes,
}

/// Addresses one of the five independent modals: the four append forms plus
/// the status-transition form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalSlot {
    Historico,
    Medicacao,
    Exame,
    Anotacao,
    StatusTratamento,
}

impl ModalSlot {
    /// The append modal that belongs to a tab.
    pub fn for_tab(tab: RecordTab) -> Self {
        match tab {
            RecordTab::Historico => ModalSlot::Historico,
            RecordTab::Medicacoes => ModalSlot::Medicacao,
            RecordTab::Exames => ModalSlot::Exame,
            RecordTab::Anotacoes => ModalSlot::Anotacao,
        }
    }
}

/// Lifecycle of one modal. A failed submission lands back in `Open` with the
/// error to display; a successful one shows its message until dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        error: Option<String>,
    },
    Submitting,
    Success {
        message: &'static str,
    },
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }
}

/// Failures from a detail-screen submission.
#[derive(Debug, Error)]
pub enum DetailError {
    /// Inline field errors; nothing was sent.
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("{user_message}")]
    Request {
        user_message: String,
        #[source]
        source: ClientError,
    },
}

#[derive(Debug, Default)]
struct Modals {
    historico: ModalState,
    medicacao: ModalState,
    exame: ModalState,
    anotacao: ModalState,
    status_tratamento: ModalState,
}

/// Holds the single in-memory record of a detail view and drives every
/// mutation against it. All methods take `&mut self`: the screen is a
/// single-threaded dispatch model and the record is replaced wholesale on
/// every successful re-fetch.
pub struct DetailController {
    client: ProntuarioClient,
    prontuario_id: i64,
    prontuario: Option<Prontuario>,
    load_error: Option<String>,
    active_tab: RecordTab,
    modals: Modals,
}

impl DetailController {
    pub fn new(client: ProntuarioClient, prontuario_id: i64) -> Self {
        Self {
            client,
            prontuario_id,
            prontuario: None,
            load_error: None,
            active_tab: RecordTab::Historico,
            modals: Modals::default(),
        }
    }

    pub fn prontuario(&self) -> Option<&Prontuario> {
        self.prontuario.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn active_tab(&self) -> RecordTab {
        self.active_tab
    }

    /// Switching tabs never touches any modal's state; an in-flight
    /// submission on another tab keeps running untouched.
    pub fn set_active_tab(&mut self, tab: RecordTab) {
        self.active_tab = tab;
    }

    pub fn modal(&self, slot: ModalSlot) -> &ModalState {
        match slot {
            ModalSlot::Historico => &self.modals.historico,
            ModalSlot::Medicacao => &self.modals.medicacao,
            ModalSlot::Exame => &self.modals.exame,
            ModalSlot::Anotacao => &self.modals.anotacao,
            ModalSlot::StatusTratamento => &self.modals.status_tratamento,
        }
    }

    fn modal_mut(&mut self, slot: ModalSlot) -> &mut ModalState {
        match slot {
            ModalSlot::Historico => &mut self.modals.historico,
            ModalSlot::Medicacao => &mut self.modals.medicacao,
            ModalSlot::Exame => &mut self.modals.exame,
            ModalSlot::Anotacao => &mut self.modals.anotacao,
            ModalSlot::StatusTratamento => &mut self.modals.status_tratamento,
        }
    }

    /// Opens the append modal of the active tab. Only one modal per tab: a
    /// modal that is already open (or mid-submission) is left alone.
    pub fn open_modal(&mut self) {
        let slot = ModalSlot::for_tab(self.active_tab);
        self.open(slot);
    }

    pub fn open_status_modal(&mut self) {
        self.open(ModalSlot::StatusTratamento);
    }

    fn open(&mut self, slot: ModalSlot) {
        let modal = self.modal_mut(slot);
        if matches!(modal, ModalState::Closed) {
            *modal = ModalState::Open { error: None };
        }
    }

    /// Closes a modal and clears its transient messages. An in-flight request
    /// is not cancelled; its eventual response still lands on the record.
    pub fn close_modal(&mut self, slot: ModalSlot) {
        *self.modal_mut(slot) = ModalState::Closed;
    }

    /// After the success display window, closes the modal. A no-op unless the
    /// modal is showing a success message.
    pub async fn auto_dismiss(&mut self, slot: ModalSlot) {
        if matches!(self.modal(slot), ModalState::Success { .. }) {
            tokio::time::sleep(SUCCESS_DISPLAY).await;
            *self.modal_mut(slot) = ModalState::Closed;
        }
    }

    /// Fetches the record this controller points at.
    pub async fn load(&mut self) -> Result<(), DetailError> {
        match self.client.get_by_id(self.prontuario_id).await {
            Ok(prontuario) => {
                self.prontuario = Some(prontuario);
                self.load_error = None;
                Ok(())
            }
            Err(err) => {
                let user_message = err
                    .server_message()
                    .unwrap_or_else(|| LOAD_FALLBACK.to_string());
                self.load_error = Some(user_message.clone());
                Err(DetailError::Request {
                    user_message,
                    source: err,
                })
            }
        }
    }

    /// The string the given tab displays, or `None` when there is nothing
    /// recorded yet. The notes tab reads the clinical-conditions column.
    pub fn tab_content(&self, tab: RecordTab) -> Option<&str> {
        let prontuario = self.prontuario.as_ref()?;
        let content = match tab {
            RecordTab::Historico => prontuario.historico_medico.as_deref(),
            RecordTab::Medicacoes => prontuario.medicamentos.as_deref(),
            RecordTab::Exames => prontuario.exames.as_deref(),
            RecordTab::Anotacoes => prontuario.condicoes_clinicas.as_deref(),
        };
        content.filter(|c| !c.trim().is_empty())
    }

    pub fn effective_status(&self) -> Option<StatusTratamento> {
        self.prontuario.as_ref().map(status::effective_status)
    }

    pub async fn submit_historico(&mut self, entry: &NovoHistorico) -> Result<(), DetailError> {
        validation::validate_historico(entry).map_err(DetailError::Validation)?;
        *self.modal_mut(ModalSlot::Historico) = ModalState::Submitting;

        let result = self
            .client
            .append_medical_history(self.prontuario_id, entry)
            .await;
        self.finish_append(ModalSlot::Historico, result).await
    }

    pub async fn submit_medicacao(&mut self, entry: &NovaMedicacao) -> Result<(), DetailError> {
        validation::validate_medicacao(entry).map_err(DetailError::Validation)?;
        *self.modal_mut(ModalSlot::Medicacao) = ModalState::Submitting;

        let result = self.client.append_medication(self.prontuario_id, entry).await;
        self.finish_append(ModalSlot::Medicacao, result).await
    }

    pub async fn submit_exame(
        &mut self,
        entry: &NovoExame,
        arquivo: Option<&ExameArquivo>,
    ) -> Result<(), DetailError> {
        validation::validate_exame(entry).map_err(DetailError::Validation)?;
        *self.modal_mut(ModalSlot::Exame) = ModalState::Submitting;

        let result = self
            .client
            .append_exam(self.prontuario_id, entry, arquivo)
            .await;
        self.finish_append(ModalSlot::Exame, result).await
    }

    pub async fn submit_anotacao(&mut self, entry: &NovaAnotacao) -> Result<(), DetailError> {
        validation::validate_anotacao(entry).map_err(DetailError::Validation)?;
        *self.modal_mut(ModalSlot::Anotacao) = ModalState::Submitting;

        let result = self.client.append_note(self.prontuario_id, entry).await;
        self.finish_append(ModalSlot::Anotacao, result).await
    }

    /// Submits a status transition. The engine guard runs first, so a
    /// discharge without a sufficient reason never produces a network call.
    pub async fn submit_status(
        &mut self,
        status_tratamento: StatusTratamento,
        motivo_alta: Option<&str>,
    ) -> Result<(), DetailError> {
        validation::validate_status_change(status_tratamento, motivo_alta)
            .map_err(DetailError::Validation)?;
        // The guard cannot fail past validation, but it owns the payload rule.
        let change = StatusChange::new(status_tratamento, motivo_alta).map_err(|err| {
            let mut errors = ValidationErrors::default();
            errors.add("motivoAlta", err.to_string());
            DetailError::Validation(errors)
        })?;

        *self.modal_mut(ModalSlot::StatusTratamento) = ModalState::Submitting;
        let result = self
            .client
            .update_treatment_status(self.prontuario_id, &change)
            .await;
        self.finish_append(ModalSlot::StatusTratamento, result).await
    }

    /// Shared tail of every mutation: mandatory re-fetch, then success or
    /// failure signalling on the slot's modal.
    async fn finish_append(
        &mut self,
        slot: ModalSlot,
        result: Result<serde_json::Value, ClientError>,
    ) -> Result<(), DetailError> {
        if let Err(err) = result {
            return Err(self.fail(slot, err));
        }

        // The mutation response is never the new record state: re-fetch and
        // replace wholesale. The last completed re-fetch wins.
        match self.client.get_by_id(self.prontuario_id).await {
            Ok(updated) => {
                self.prontuario = Some(updated);
                *self.modal_mut(slot) = ModalState::Success {
                    message: success_message(slot),
                };
                tracing::info!(
                    prontuario_id = self.prontuario_id,
                    slot = ?slot,
                    "prontuário mutation applied"
                );
                Ok(())
            }
            Err(err) => Err(self.fail(slot, err)),
        }
    }

    fn fail(&mut self, slot: ModalSlot, err: ClientError) -> DetailError {
        let user_message = err
            .server_message()
            .unwrap_or_else(|| fallback_message(slot).to_string());
        *self.modal_mut(slot) = ModalState::Open {
            error: Some(user_message.clone()),
        };
        tracing::error!(
            prontuario_id = self.prontuario_id,
            slot = ?slot,
            error = %err,
            "prontuário mutation failed"
        );
        DetailError::Request {
            user_message,
            source: err,
        }
    }
}

fn success_message(slot: ModalSlot) -> &'static str {
    match slot {
        ModalSlot::Historico => "Histórico médico adicionado com sucesso!",
        ModalSlot::Medicacao => "Medicação adicionada com sucesso!",
        ModalSlot::Exame => "Exame adicionado com sucesso!",
        ModalSlot::Anotacao => "Anotação adicionada com sucesso!",
        ModalSlot::StatusTratamento => "Status do tratamento atualizado com sucesso!",
    }
}

fn fallback_message(slot: ModalSlot) -> &'static str {
    match slot {
        ModalSlot::Historico => "Erro ao adicionar histórico médico. Tente novamente.",
        ModalSlot::Medicacao => "Erro ao adicionar medicação. Tente novamente.",
        ModalSlot::Exame => "Erro ao adicionar exame. Tente novamente.",
        ModalSlot::Anotacao => "Erro ao adicionar anotação. Tente novamente.",
        ModalSlot::StatusTratamento => {
            "Erro ao atualizar status do tratamento. Tente novamente."
        }
    }
}
