use serde::{Deserialize, Serialize};

use super::enums::{Genero, StatusTratamento, TipoTratamento};

/// Create payload, aligned with the backend's record DTO: the patient block is
/// nested but its address is already flattened into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProntuarioPayload {
    pub paciente: PacientePayload,
    /// Duplicated flat name column the persistence layer still requires.
    #[serde(rename = "nome_paciente")]
    pub nome_paciente: String,
    pub tipo_tratamento: TipoTratamento,
    pub historico_medico: String,
    pub numero_prontuario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicamentos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exames: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condicoes_clinicas: Option<String>,
}

/// Patient block of the create payload. Dates stay in the `%Y-%m-%d` form the
/// date widget produced; validation checks them before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacientePayload {
    pub nome: String,
    pub data_nascimento: String,
    pub cpf: String,
    pub genero: Genero,
    pub telefone: String,
    pub email: String,
    pub logradouro: String,
    pub numero: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub cep: String,
}

/// Flat update payload for the edit flow. `numero_prontuario` must carry the
/// record's original number; the backend rejects a missing one and the number
/// is immutable anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProntuarioUpdate {
    pub nome_paciente: String,
    pub historico_medico: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicamentos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exames: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condicoes_clinicas: Option<String>,
    pub tipo_tratamento: TipoTratamento,
    pub numero_prontuario: String,
}

/// Query parameters for list/search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuscaProntuarioParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_prontuario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_paciente: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_tratamento: Option<TipoTratamento>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusTratamento>,
    pub pagina: u32,
    pub tamanho: u32,
}

impl Default for BuscaProntuarioParams {
    fn default() -> Self {
        Self {
            termo: None,
            numero_prontuario: None,
            nome_paciente: None,
            tipo_tratamento: None,
            status: None,
            pagina: 0,
            tamanho: 10,
        }
    }
}

/// New medical-history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovoHistorico {
    pub descricao: String,
}

/// New medication entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaMedicacao {
    pub nome: String,
    pub dosagem: String,
    pub frequencia: String,
    pub data_inicio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

/// New exam entry. The optional binary attachment travels separately (it
/// switches the request body to multipart).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovoExame {
    pub nome: String,
    pub data: String,
    pub resultado: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

/// Binary exam attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExameArquivo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// New clinical note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NovaAnotacao {
    pub texto: String,
}
