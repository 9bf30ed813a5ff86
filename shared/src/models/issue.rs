//! Issue Model
//!
//! Community issue reports pinned to a map coordinate.

use super::geo::Coordinate;
use super::interaction::Interaction;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Iluminacao,
    Buraco,
    Lixo,
    PodaArvore,
    Vazamento,
    Pichacao,
    CalcadaDanificada,
    Sinalizacao,
    Outro,
}

/// Presentation attributes of an [`IssueType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDisplay {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl IssueType {
    /// All types, in the order the report form offers them
    pub const ALL: [IssueType; 9] = [
        IssueType::Iluminacao,
        IssueType::Buraco,
        IssueType::Lixo,
        IssueType::PodaArvore,
        IssueType::Vazamento,
        IssueType::Pichacao,
        IssueType::CalcadaDanificada,
        IssueType::Sinalizacao,
        IssueType::Outro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Iluminacao => "ILUMINACAO",
            IssueType::Buraco => "BURACO",
            IssueType::Lixo => "LIXO",
            IssueType::PodaArvore => "PODA_ARVORE",
            IssueType::Vazamento => "VAZAMENTO",
            IssueType::Pichacao => "PICHACAO",
            IssueType::CalcadaDanificada => "CALCADA_DANIFICADA",
            IssueType::Sinalizacao => "SINALIZACAO",
            IssueType::Outro => "OUTRO",
        }
    }

    pub fn display(&self) -> TypeDisplay {
        let (label, icon, color) = match self {
            IssueType::Iluminacao => ("Iluminação", "💡", "#f1c40f"),
            IssueType::Buraco => ("Buraco", "🕳️", "#8e44ad"),
            IssueType::Lixo => ("Lixo", "🗑️", "#27ae60"),
            IssueType::PodaArvore => ("Poda de árvore", "🌳", "#16a085"),
            IssueType::Vazamento => ("Vazamento", "💧", "#2980b9"),
            IssueType::Pichacao => ("Pichação", "🎨", "#d35400"),
            IssueType::CalcadaDanificada => ("Calçada danificada", "🚧", "#e67e22"),
            IssueType::Sinalizacao => ("Sinalização", "🚦", "#c0392b"),
            IssueType::Outro => ("Outro", "📍", "#7f8c8d"),
        };
        TypeDisplay { label, icon, color }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown issue type: {s}"))
    }
}

/// Issue lifecycle status (mutated by the backend or administrators only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Aberta,
    EmAnalise,
    EmAndamento,
    Resolvida,
    Rejeitada,
}

/// Presentation attributes of an [`IssueStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub color: &'static str,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Aberta,
        IssueStatus::EmAnalise,
        IssueStatus::EmAndamento,
        IssueStatus::Resolvida,
        IssueStatus::Rejeitada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Aberta => "ABERTA",
            IssueStatus::EmAnalise => "EM_ANALISE",
            IssueStatus::EmAndamento => "EM_ANDAMENTO",
            IssueStatus::Resolvida => "RESOLVIDA",
            IssueStatus::Rejeitada => "REJEITADA",
        }
    }

    pub fn display(&self) -> StatusDisplay {
        let (label, color) = match self {
            IssueStatus::Aberta => ("Aberta", "#e74c3c"),
            IssueStatus::EmAnalise => ("Em análise", "#f39c12"),
            IssueStatus::EmAndamento => ("Em andamento", "#3498db"),
            IssueStatus::Resolvida => ("Resolvida", "#2ecc71"),
            IssueStatus::Rejeitada => ("Rejeitada", "#95a5a6"),
        };
        StatusDisplay { label, color }
    }

    /// Resolved and rejected issues no longer change
    pub fn is_closed(&self) -> bool {
        matches!(self, IssueStatus::Resolvida | IssueStatus::Rejeitada)
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown issue status: {s}"))
    }
}

/// Issue record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub titulo: String,
    pub descricao: String,
    pub tipo: IssueType,
    pub status: IssueStatus,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(default)]
    pub autor_nome: Option<String>,
    #[serde(default)]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_apoios: u32,
    #[serde(default)]
    pub total_interacoes: u32,
}

impl Issue {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Issue with its interaction list (`/detalhes`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(default)]
    pub interacoes: Vec<Interaction>,
}

impl IssueDetail {
    /// Detail view built from a list entry when the detail fetch failed
    pub fn partial(issue: Issue) -> Self {
        Self {
            issue,
            interacoes: Vec::new(),
        }
    }
}

/// Create issue payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub titulo: String,
    pub descricao: String,
    pub tipo: IssueType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
}

/// Update status payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: IssueStatus,
}
