//! Form validation schemas: document checks and per-step field rules.
//!
//! Every schema function collects the full set of failing fields so a form can
//! render all inline errors at once. Messages are the pt-BR strings the forms
//! display verbatim.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;

use crate::forms::{PacienteForm, ProntuarioFormData};
use crate::models::enums::StatusTratamento;
use crate::models::payload::{NovaAnotacao, NovaMedicacao, NovoExame, NovoHistorico};
use crate::status::MIN_MOTIVO_ALTA_LEN;

/// Field-path → message map. `BTreeMap` keeps iteration order deterministic
/// for rendering and for joining into a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn len_chars(s: &str) -> usize {
    s.chars().count()
}

/// Validates the CPF check digits: strip formatting, reject repeated-digit
/// sequences, then verify the modulo-11 double checksum.
pub fn validate_cpf(cpf: &str) -> bool {
    let cpf = digits(cpf);
    if cpf.len() != 11 {
        return false;
    }
    let d: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if d.iter().all(|&x| x == d[0]) {
        return false;
    }

    // Check digit over the first `take` digits, weights (take+1)..2.
    let check = |take: usize| -> u32 {
        let start = (take + 1) as u32;
        let soma: u32 = d[..take]
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (start - i as u32))
            .sum();
        let resto = (soma * 10) % 11;
        if resto == 10 || resto == 11 {
            0
        } else {
            resto
        }
    };

    check(9) == d[9] && check(10) == d[10]
}

/// Generates a checksum-valid CPF. Seed and test data only.
pub fn random_cpf() -> String {
    let mut rng = rand::thread_rng();
    let mut d: Vec<u32> = (0..9).map(|_| rng.gen_range(0..10)).collect();

    let dv = |d: &[u32]| -> u32 {
        let start = (d.len() + 1) as u32;
        let soma: u32 = d
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (start - i as u32))
            .sum();
        let resto = 11 - (soma % 11);
        if resto == 10 || resto == 11 {
            0
        } else {
            resto
        }
    };

    let first = dv(&d);
    d.push(first);
    let second = dv(&d);
    d.push(second);

    d.into_iter()
        .map(|x| char::from_digit(x, 10).unwrap())
        .collect()
}

/// Brazilian landline or mobile number: 10 or 11 digits after stripping.
pub fn validate_telefone(telefone: &str) -> bool {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10,11}$").unwrap());
    RE.is_match(&digits(telefone))
}

/// Postal code: exactly 8 digits after stripping.
pub fn validate_cep(cep: &str) -> bool {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{8}$").unwrap());
    RE.is_match(&digits(cep))
}

pub fn validate_email(email: &str) -> bool {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    RE.is_match(email)
}

fn parseable_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Step 1 of the record form: patient identity and address.
pub fn validate_patient_step(paciente: &PacienteForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if len_chars(&paciente.nome) < 3 {
        errors.add("paciente.nome", "Nome deve ter pelo menos 3 caracteres");
    }
    if !parseable_date(&paciente.data_nascimento) {
        errors.add("paciente.dataNascimento", "Data de nascimento inválida");
    }
    if !validate_cpf(&paciente.cpf) {
        errors.add("paciente.cpf", "CPF inválido");
    }
    if !validate_telefone(&paciente.telefone) {
        errors.add("paciente.telefone", "Telefone inválido (10 ou 11 dígitos)");
    }
    if !validate_email(&paciente.email) {
        errors.add("paciente.email", "Email inválido");
    }

    let endereco = &paciente.endereco;
    if len_chars(&endereco.logradouro) < 3 {
        errors.add("paciente.endereco.logradouro", "Logradouro inválido");
    }
    if endereco.numero.is_empty() {
        errors.add("paciente.endereco.numero", "Número é obrigatório");
    }
    if len_chars(&endereco.bairro) < 2 {
        errors.add("paciente.endereco.bairro", "Bairro inválido");
    }
    if len_chars(&endereco.cidade) < 2 {
        errors.add("paciente.endereco.cidade", "Cidade inválida");
    }
    if len_chars(&endereco.estado) != 2 {
        errors.add("paciente.endereco.estado", "Use a sigla do estado (ex: SP)");
    }
    if !validate_cep(&endereco.cep) {
        errors.add("paciente.endereco.cep", "CEP inválido (8 dígitos)");
    }

    errors.into_result()
}

/// Step 2 of the record form: treatment classification and initial history.
pub fn validate_treatment_step(form: &ProntuarioFormData) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if len_chars(&form.historico_medico.descricao) < 10 {
        errors.add(
            "historicoMedico.descricao",
            "Descrição deve ter pelo menos 10 caracteres",
        );
    }

    errors.into_result()
}

/// New medical-history entry.
pub fn validate_historico(entry: &NovoHistorico) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if len_chars(&entry.descricao) < 10 {
        errors.add("descricao", "A descrição deve ter pelo menos 10 caracteres");
    }

    errors.into_result()
}

/// New medication entry.
pub fn validate_medicacao(entry: &NovaMedicacao) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if len_chars(&entry.nome) < 3 {
        errors.add("nome", "O nome deve ter pelo menos 3 caracteres");
    }
    if len_chars(&entry.dosagem) < 2 {
        errors.add("dosagem", "A dosagem deve ser informada");
    }
    if len_chars(&entry.frequencia) < 2 {
        errors.add("frequencia", "A frequência deve ser informada");
    }
    if !parseable_date(&entry.data_inicio) {
        errors.add("dataInicio", "A data de início deve ser informada");
    }

    errors.into_result()
}

/// New exam entry.
pub fn validate_exame(entry: &NovoExame) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if len_chars(&entry.nome) < 3 {
        errors.add("nome", "O nome deve ter pelo menos 3 caracteres");
    }
    if !parseable_date(&entry.data) {
        errors.add("data", "A data deve ser informada");
    }
    if len_chars(&entry.resultado) < 2 {
        errors.add("resultado", "O resultado deve ser informado");
    }

    errors.into_result()
}

/// New clinical note.
pub fn validate_anotacao(entry: &NovaAnotacao) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if len_chars(&entry.texto) < 10 {
        errors.add("texto", "O texto deve ter pelo menos 10 caracteres");
    }

    errors.into_result()
}

/// Status-transition form. The reason is conditionally required, so this must
/// run again on every status selection change, not only at submit time.
pub fn validate_status_change(
    status: StatusTratamento,
    motivo_alta: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if status == StatusTratamento::AltaMedica
        && motivo_alta.map_or(0, len_chars) < MIN_MOTIVO_ALTA_LEN
    {
        errors.add(
            "motivoAlta",
            "O motivo da alta é obrigatório e deve ter pelo menos 10 caracteres",
        );
    }

    errors.into_result()
}
