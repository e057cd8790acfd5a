//! Treatment-status workflow: the four-state machine and its transition guard.
//!
//! Every status can transition to every other, including back to itself; there
//! is no forbidden-transition matrix. The single conditional rule lives here:
//! a transition into medical discharge must carry a reason, and no other
//! transition may put the reason field on the wire.

use serde::Serialize;
use thiserror::Error;

use crate::models::enums::StatusTratamento;
use crate::models::record::Prontuario;

/// Minimum length of the discharge reason, in characters.
pub const MIN_MOTIVO_ALTA_LEN: usize = 10;

/// Records written before the status workflow existed carry no status; they
/// read as still in treatment.
pub fn effective_status(prontuario: &Prontuario) -> StatusTratamento {
    prontuario
        .status_tratamento
        .unwrap_or(StatusTratamento::EmTratamento)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusChangeError {
    /// Shown verbatim in the status form.
    #[error("O motivo da alta é obrigatório e deve ter pelo menos 10 caracteres")]
    MotivoAltaObrigatorio,
}

/// A validated status transition, ready to submit.
///
/// Construction is the client-side guard: a discharge without a sufficient
/// reason is refused here, before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    status: StatusTratamento,
    #[serde(rename = "motivoAlta", skip_serializing_if = "Option::is_none")]
    motivo_alta: Option<String>,
}

impl StatusChange {
    /// Builds the transition payload.
    ///
    /// The reason is carried only for [`StatusTratamento::AltaMedica`]; for
    /// any other target it is dropped so the field never reaches the wire,
    /// not even as an empty string.
    pub fn new(
        status: StatusTratamento,
        motivo_alta: Option<&str>,
    ) -> Result<Self, StatusChangeError> {
        match status {
            StatusTratamento::AltaMedica => {
                let motivo = motivo_alta.unwrap_or("");
                if motivo.chars().count() < MIN_MOTIVO_ALTA_LEN {
                    return Err(StatusChangeError::MotivoAltaObrigatorio);
                }
                Ok(Self {
                    status,
                    motivo_alta: Some(motivo.to_string()),
                })
            }
            _ => Ok(Self {
                status,
                motivo_alta: None,
            }),
        }
    }

    pub fn status(&self) -> StatusTratamento {
        self.status
    }

    pub fn motivo_alta(&self) -> Option<&str> {
        self.motivo_alta.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_record(status: Option<StatusTratamento>) -> Prontuario {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "numeroProntuario": "PRONT-1700000000000",
            "nomePaciente": "João Souza",
            "tipoTratamento": "OUTRO",
            "statusTratamento": status.map(|s| s.as_str()),
        }))
        .unwrap()
    }

    #[test]
    fn absent_status_reads_as_in_treatment() {
        let record = minimal_record(None);
        assert_eq!(effective_status(&record), StatusTratamento::EmTratamento);

        let record = minimal_record(Some(StatusTratamento::Transferido));
        assert_eq!(effective_status(&record), StatusTratamento::Transferido);
    }

    #[test]
    fn discharge_without_reason_is_refused() {
        assert_eq!(
            StatusChange::new(StatusTratamento::AltaMedica, None),
            Err(StatusChangeError::MotivoAltaObrigatorio)
        );
        assert_eq!(
            StatusChange::new(StatusTratamento::AltaMedica, Some("curta")),
            Err(StatusChangeError::MotivoAltaObrigatorio)
        );
    }

    #[test]
    fn discharge_with_reason_carries_both_fields() {
        let change =
            StatusChange::new(StatusTratamento::AltaMedica, Some("Paciente concluiu o plano"))
                .unwrap();

        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["status"], "ALTA_MEDICA");
        assert_eq!(value["motivoAlta"], "Paciente concluiu o plano");
    }

    #[test]
    fn other_targets_omit_the_reason_entirely() {
        for status in [
            StatusTratamento::EmTratamento,
            StatusTratamento::AbandonouTratamento,
            StatusTratamento::Transferido,
        ] {
            // Even a supplied reason is dropped rather than sent.
            let change = StatusChange::new(status, Some("irrelevante")).unwrap();
            assert_eq!(change.motivo_alta(), None);

            let value = serde_json::to_value(&change).unwrap();
            assert_eq!(value["status"], status.as_str());
            assert!(value.get("motivoAlta").is_none());

            let change = StatusChange::new(status, None).unwrap();
            assert_eq!(change.motivo_alta(), None);
        }
    }

    #[test]
    fn reason_length_counts_characters_not_bytes() {
        // 10 accented characters, more than 10 bytes.
        let motivo = "açãíóúêôàé";
        assert_eq!(motivo.chars().count(), 10);
        assert!(StatusChange::new(StatusTratamento::AltaMedica, Some(motivo)).is_ok());
    }
}
