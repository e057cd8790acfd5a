use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{Genero, StatusTratamento, TipoTratamento};

/// One patient's clinical dossier, as the backend returns it.
///
/// The clinical fields are flat append-target strings: the backend merges new
/// entries into them server-side, the client only ever re-reads the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prontuario {
    pub id: i64,
    /// Assigned once at creation, never mutated afterwards.
    pub numero_prontuario: String,
    pub nome_paciente: String,
    #[serde(default)]
    pub historico_medico: Option<String>,
    #[serde(default)]
    pub medicamentos: Option<String>,
    #[serde(default)]
    pub exames: Option<String>,
    #[serde(default)]
    pub condicoes_clinicas: Option<String>,
    pub tipo_tratamento: TipoTratamento,
    /// Absent on records written before the status workflow existed; read it
    /// through `status::effective_status`.
    #[serde(default)]
    pub status_tratamento: Option<StatusTratamento>,
    #[serde(default)]
    pub motivo_alta: Option<String>,
    #[serde(default)]
    pub data_alta: Option<NaiveDateTime>,
    #[serde(default)]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(default)]
    pub data_ultima_atualizacao: Option<NaiveDateTime>,
    #[serde(default)]
    pub ultima_alteracao_por: Option<String>,
    #[serde(default)]
    pub data_ultima_alteracao: Option<NaiveDateTime>,
    /// Embedded patient snapshot; entirely absent on some backend revisions,
    /// so every field inside is independently nullable too.
    #[serde(default)]
    pub paciente: Option<PacienteResumo>,
}

/// Flattened patient snapshot embedded in a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PacienteResumo {
    pub nome: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub cpf: Option<String>,
    pub genero: Option<Genero>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub logradouro: Option<String>,
    pub numero: Option<String>,
    pub complemento: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
}

/// Paged search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoBusca {
    pub content: Vec<Prontuario>,
    pub pageable: Pageable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}
