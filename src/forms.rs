//! Nested form representation for the record create/edit screens, and the
//! pure mapping pair between it and the flat persistence payload.

use crate::models::enums::{Genero, TipoTratamento};
use crate::models::payload::{PacientePayload, ProntuarioPayload};
use crate::models::record::Prontuario;
use crate::validation::{self, ValidationErrors};

/// Prefill for an edit form when the backend did not echo a stored history.
const HISTORICO_PLACEHOLDER: &str = "Sem histórico médico registrado";

/// Address block of the patient step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnderecoForm {
    pub logradouro: String,
    pub numero: String,
    pub complemento: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub cep: String,
}

/// Patient identity and contact step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacienteForm {
    pub nome: String,
    pub data_nascimento: String,
    pub cpf: String,
    pub genero: Genero,
    pub telefone: String,
    pub email: String,
    pub endereco: EnderecoForm,
}

impl Default for PacienteForm {
    fn default() -> Self {
        Self {
            nome: String::new(),
            data_nascimento: String::new(),
            cpf: String::new(),
            genero: Genero::NaoInformado,
            telefone: String::new(),
            email: String::new(),
            endereco: EnderecoForm::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricoMedicoForm {
    pub descricao: String,
}

/// The whole multi-step record form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProntuarioFormData {
    pub paciente: PacienteForm,
    pub tipo_tratamento: TipoTratamento,
    pub historico_medico: HistoricoMedicoForm,
}

impl Default for ProntuarioFormData {
    fn default() -> Self {
        Self {
            paciente: PacienteForm::default(),
            tipo_tratamento: TipoTratamento::TerapiaIndividual,
            historico_medico: HistoricoMedicoForm::default(),
        }
    }
}

/// The form's two steps, validated independently so the stepper can gate
/// navigation on the current step only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    DadosPaciente,
    InformacoesTratamento,
}

impl FormStep {
    pub const ALL: [FormStep; 2] = [FormStep::DadosPaciente, FormStep::InformacoesTratamento];

    pub fn next(self) -> Option<FormStep> {
        match self {
            FormStep::DadosPaciente => Some(FormStep::InformacoesTratamento),
            FormStep::InformacoesTratamento => None,
        }
    }

    pub fn previous(self) -> Option<FormStep> {
        match self {
            FormStep::DadosPaciente => None,
            FormStep::InformacoesTratamento => Some(FormStep::DadosPaciente),
        }
    }
}

/// Runs the schema that owns `step`.
pub fn validate_step(form: &ProntuarioFormData, step: FormStep) -> Result<(), ValidationErrors> {
    match step {
        FormStep::DadosPaciente => validation::validate_patient_step(&form.paciente),
        FormStep::InformacoesTratamento => validation::validate_treatment_step(form),
    }
}

/// Flattens the nested form into the persistence payload: the address merges
/// into the patient block and the patient name is duplicated into the flat
/// `nome_paciente` column the backend still requires.
pub fn to_wire(form: &ProntuarioFormData, numero_prontuario: String) -> ProntuarioPayload {
    let paciente = &form.paciente;
    let endereco = &paciente.endereco;

    ProntuarioPayload {
        paciente: PacientePayload {
            nome: paciente.nome.clone(),
            data_nascimento: paciente.data_nascimento.clone(),
            cpf: paciente.cpf.clone(),
            genero: paciente.genero,
            telefone: paciente.telefone.clone(),
            email: paciente.email.clone(),
            logradouro: endereco.logradouro.clone(),
            numero: endereco.numero.clone(),
            complemento: if endereco.complemento.is_empty() {
                None
            } else {
                Some(endereco.complemento.clone())
            },
            bairro: endereco.bairro.clone(),
            cidade: endereco.cidade.clone(),
            estado: endereco.estado.clone(),
            cep: endereco.cep.clone(),
        },
        nome_paciente: paciente.nome.clone(),
        tipo_tratamento: form.tipo_tratamento,
        historico_medico: form.historico_medico.descricao.clone(),
        numero_prontuario,
        medicamentos: Some(String::new()),
        exames: Some(String::new()),
        condicoes_clinicas: Some(String::new()),
    }
}

/// Inverse of [`to_wire`]: rebuilds the nested form from a create payload.
pub fn from_wire(payload: &ProntuarioPayload) -> ProntuarioFormData {
    let paciente = &payload.paciente;

    ProntuarioFormData {
        paciente: PacienteForm {
            nome: paciente.nome.clone(),
            data_nascimento: paciente.data_nascimento.clone(),
            cpf: paciente.cpf.clone(),
            genero: paciente.genero,
            telefone: paciente.telefone.clone(),
            email: paciente.email.clone(),
            endereco: EnderecoForm {
                logradouro: paciente.logradouro.clone(),
                numero: paciente.numero.clone(),
                complemento: paciente.complemento.clone().unwrap_or_default(),
                bairro: paciente.bairro.clone(),
                cidade: paciente.cidade.clone(),
                estado: paciente.estado.clone(),
                cep: paciente.cep.clone(),
            },
        },
        tipo_tratamento: payload.tipo_tratamento,
        historico_medico: HistoricoMedicoForm {
            descricao: payload.historico_medico.clone(),
        },
    }
}

/// Maps a stored record into the nested form for the edit screen. The backend
/// does not always echo the patient document fields, so absent ones prefill
/// empty rather than failing the screen.
pub fn from_record(prontuario: &Prontuario) -> ProntuarioFormData {
    let paciente = prontuario.paciente.clone().unwrap_or_default();

    ProntuarioFormData {
        paciente: PacienteForm {
            nome: prontuario.nome_paciente.clone(),
            data_nascimento: paciente
                .data_nascimento
                .map(|d| d.to_string())
                .unwrap_or_default(),
            cpf: paciente.cpf.unwrap_or_default(),
            genero: paciente.genero.unwrap_or(Genero::NaoInformado),
            telefone: paciente.telefone.unwrap_or_default(),
            email: paciente.email.unwrap_or_default(),
            endereco: EnderecoForm {
                logradouro: paciente.logradouro.unwrap_or_default(),
                numero: paciente.numero.unwrap_or_default(),
                complemento: paciente.complemento.unwrap_or_default(),
                bairro: paciente.bairro.unwrap_or_default(),
                cidade: paciente.cidade.unwrap_or_default(),
                estado: paciente.estado.unwrap_or_default(),
                cep: paciente.cep.unwrap_or_default(),
            },
        },
        tipo_tratamento: prontuario.tipo_tratamento,
        historico_medico: HistoricoMedicoForm {
            descricao: prontuario
                .historico_medico
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| HISTORICO_PLACEHOLDER.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ProntuarioFormData {
        ProntuarioFormData {
            paciente: PacienteForm {
                nome: "Maria Silva".into(),
                data_nascimento: "1990-05-20".into(),
                cpf: "52998224725".into(),
                genero: Genero::Feminino,
                telefone: "11987654321".into(),
                email: "maria@exemplo.com".into(),
                endereco: EnderecoForm {
                    logradouro: "Rua das Flores".into(),
                    numero: "120".into(),
                    complemento: "Apto 41".into(),
                    bairro: "Centro".into(),
                    cidade: "São Paulo".into(),
                    estado: "SP".into(),
                    cep: "01001000".into(),
                },
            },
            tipo_tratamento: TipoTratamento::TerapiaIndividual,
            historico_medico: HistoricoMedicoForm {
                descricao: "Paciente encaminhada pela unidade básica.".into(),
            },
        }
    }

    #[test]
    fn wire_round_trip_is_lossless() {
        let form = filled_form();
        let payload = to_wire(&form, "PRONT-1722000000000123".into());
        assert_eq!(from_wire(&payload), form);

        // Also without a complemento, which maps through Option.
        let mut form = filled_form();
        form.paciente.endereco.complemento = String::new();
        let payload = to_wire(&form, "PRONT-1722000000000123".into());
        assert!(payload.paciente.complemento.is_none());
        assert_eq!(from_wire(&payload), form);
    }

    #[test]
    fn to_wire_duplicates_the_flat_name_column() {
        let payload = to_wire(&filled_form(), "PRONT-1".into());
        assert_eq!(payload.nome_paciente, payload.paciente.nome);
        assert_eq!(payload.historico_medico, "Paciente encaminhada pela unidade básica.");
        // Create sends the append-target columns as empty strings.
        assert_eq!(payload.medicamentos.as_deref(), Some(""));
    }

    #[test]
    fn from_record_prefills_missing_patient_fields_empty() {
        let record: Prontuario = serde_json::from_value(serde_json::json!({
            "id": 3,
            "numeroProntuario": "PRONT-1700000000000",
            "nomePaciente": "João Souza",
            "tipoTratamento": "TERAPIA_GRUPO"
        }))
        .unwrap();

        let form = from_record(&record);
        assert_eq!(form.paciente.nome, "João Souza");
        assert_eq!(form.paciente.cpf, "");
        assert_eq!(form.paciente.genero, Genero::NaoInformado);
        assert_eq!(form.tipo_tratamento, TipoTratamento::TerapiaGrupo);
        assert_eq!(form.historico_medico.descricao, HISTORICO_PLACEHOLDER);
    }

    #[test]
    fn step_gating_validates_only_the_current_step() {
        // Patient step empty, treatment step valid.
        let mut form = ProntuarioFormData::default();
        form.historico_medico.descricao = "Histórico inicial completo.".into();

        assert!(validate_step(&form, FormStep::DadosPaciente).is_err());
        assert!(validate_step(&form, FormStep::InformacoesTratamento).is_ok());

        assert_eq!(
            FormStep::DadosPaciente.next(),
            Some(FormStep::InformacoesTratamento)
        );
        assert_eq!(FormStep::InformacoesTratamento.next(), None);
        assert_eq!(
            FormStep::InformacoesTratamento.previous(),
            Some(FormStep::DadosPaciente)
        );
    }
}
