//! Interaction Model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kind of user interaction attached to an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    /// Support tally ("eu também")
    Apoio,
    /// Text comment, requires content
    Comentario,
    /// Like
    Curtida,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Apoio => "APOIO",
            InteractionType::Comentario => "COMENTARIO",
            InteractionType::Curtida => "CURTIDA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionType::Apoio => "Apoio",
            InteractionType::Comentario => "Comentário",
            InteractionType::Curtida => "Curtida",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            InteractionType::Apoio => "👍",
            InteractionType::Comentario => "💬",
            InteractionType::Curtida => "❤️",
        }
    }

    pub fn requires_content(&self) -> bool {
        matches!(self, InteractionType::Comentario)
    }
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: i64,
    pub tipo: InteractionType,
    #[serde(default)]
    pub conteudo: Option<String>,
    #[serde(default)]
    pub usuario_nome: Option<String>,
    #[serde(default)]
    pub data_criacao: Option<NaiveDateTime>,
}

/// Create interaction payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInteraction {
    pub tipo: InteractionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conteudo: Option<String>,
}

impl NewInteraction {
    pub fn support() -> Self {
        Self {
            tipo: InteractionType::Apoio,
            conteudo: None,
        }
    }

    pub fn comment(conteudo: impl Into<String>) -> Self {
        Self {
            tipo: InteractionType::Comentario,
            conteudo: Some(conteudo.into()),
        }
    }
}
