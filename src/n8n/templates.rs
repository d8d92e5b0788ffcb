//! Business category templates
//!
//! Every category maps to one shared n8n workflow, found by a fuzzy name
//! match against the remote workflow list.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::client::WorkflowApi;
use super::types::{Variables, Workflow};

/// Industry of an onboarded company
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessCategory {
    Restaurant,
    Medical,
    Beauty,
    Legal,
    Retail,
    #[default]
    Other,
}

/// Default content of a category template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateProfile {
    pub display_name: &'static str,
    pub description: &'static str,
    pub default_variables: Variables,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 6] = [
        Self::Restaurant,
        Self::Medical,
        Self::Beauty,
        Self::Legal,
        Self::Retail,
        Self::Other,
    ];

    /// Wire code, e.g. `RESTAURANT`
    pub fn code(self) -> &'static str {
        match self {
            Self::Restaurant => "RESTAURANT",
            Self::Medical => "MEDICAL",
            Self::Beauty => "BEAUTY",
            Self::Legal => "LEGAL",
            Self::Retail => "RETAIL",
            Self::Other => "OTHER",
        }
    }

    /// Parse a wire code; unknown codes fall back to `Other`
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
            .unwrap_or_default()
    }

    /// Name searched for among remote workflows
    pub fn template_name(self) -> &'static str {
        match self {
            Self::Restaurant => "pizzaria",
            Self::Medical => "consultorio",
            Self::Beauty => "salao de beleza",
            Self::Legal => "escritorio advocacia",
            Self::Retail => "loja varejo",
            Self::Other => "generico",
        }
    }

    /// Label shown to users
    pub fn label(self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurante/Pizzaria",
            Self::Medical => "Consultório Médico",
            Self::Beauty => "Salão de Beleza",
            Self::Legal => "Escritório de Advocacia",
            Self::Retail => "Loja de Varejo",
            Self::Other => "Outros",
        }
    }

    pub fn profile(self) -> TemplateProfile {
        let (display_name, description, defaults) = match self {
            Self::Restaurant => (
                "Pizzaria",
                "Template para restaurantes, pizzarias e hamburguerias",
                json!({
                    "cardapio_link": "https://example.com/cardapio",
                    "horario_funcionamento": "18:00 às 23:00",
                    "delivery_disponivel": true,
                    "taxa_entrega": "R$ 5,00",
                    "tempo_entrega": "30-45 minutos"
                }),
            ),
            Self::Medical => (
                "Clinica Medica",
                "Template para consultórios médicos e clínicas",
                json!({
                    "especialidade": "Clínica Geral",
                    "horario_funcionamento": "08:00 às 18:00",
                    "agendamento_online": true,
                    "planos_aceitos": ["Unimed", "Bradesco Saúde"],
                    "telefone_emergencia": "(11) 99999-9999"
                }),
            ),
            Self::Beauty => (
                "Salao de Beleza",
                "Template para salões de beleza, cabeleireiros e estética",
                json!({
                    "servicos": ["Corte", "Escova", "Coloração", "Manicure"],
                    "horario_funcionamento": "09:00 às 19:00",
                    "agendamento_online": true,
                    "promocoes": "Desconto de 10% para novos clientes"
                }),
            ),
            Self::Legal => (
                "Escritorio Advocacia",
                "Template para escritórios de advocacia",
                json!({
                    "areas_atuacao": ["Direito Civil", "Trabalhista", "Penal"],
                    "horario_funcionamento": "08:00 às 18:00",
                    "consulta_gratuita": true,
                    "oab_numero": "OAB/SP 123456"
                }),
            ),
            Self::Retail => (
                "Loja Varejo",
                "Template para lojas de varejo e e-commerce",
                json!({
                    "categoria_produtos": "Roupas e Acessórios",
                    "horario_funcionamento": "09:00 às 21:00",
                    "entrega_disponivel": true,
                    "formas_pagamento": ["Dinheiro", "Cartão", "PIX"],
                    "trocas_devolucoes": "30 dias para trocas"
                }),
            ),
            Self::Other => (
                "Generico",
                "Template genérico para outros tipos de negócio",
                json!({
                    "horario_funcionamento": "08:00 às 18:00",
                    "servicos_principais": "Consulte nossos serviços",
                    "contato_adicional": "Entre em contato para mais informações"
                }),
            ),
        };

        TemplateProfile {
            display_name,
            description,
            default_variables: match defaults {
                Value::Object(map) => map,
                _ => Variables::new(),
            },
        }
    }
}

/// Comparison key for workflow names.
///
/// Drops diacritics (NFD then combining marks removed), keeps only ASCII
/// letters and digits, and lowercases.
pub fn normalize(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Find the first workflow whose normalized name contains the query or is
/// contained by it.
///
/// Listing failures are logged and reported as `None`.
pub async fn find_workflow_by_name(api: &dyn WorkflowApi, query: &str) -> Option<Workflow> {
    let workflows = match api.list_workflows().await {
        Ok(workflows) => workflows,
        Err(e) => {
            warn!(query, error = %e, "Workflow lookup failed, treating as not found");
            return None;
        }
    };

    let wanted = normalize(query);
    debug!(query, normalized = %wanted, candidates = workflows.len(), "Searching workflows");

    let found = workflows.into_iter().find(|w| {
        let candidate = normalize(&w.name);
        candidate.contains(&wanted) || wanted.contains(&candidate)
    });

    match &found {
        Some(w) => debug!(id = %w.id, name = %w.name, "Matched workflow"),
        None => debug!(query, "No workflow matched"),
    }
    found
}
