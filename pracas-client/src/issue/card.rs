//! Issue cards: the compact map popup and the full detail view

use crate::controller::{InteractionOutcome, IssuesMapController};
use shared::{Coordinate, Interaction, InteractionType, Issue, IssueDetail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVariant {
    Compact,
    Detailed,
}

#[derive(Debug, Clone)]
pub struct IssueCard {
    issue: Issue,
    interactions: Vec<Interaction>,
    variant: CardVariant,
    distance_meters: Option<f64>,
    feedback: Option<String>,
}

impl IssueCard {
    /// Popup shown when a marker is tapped
    pub fn compact(issue: Issue) -> Self {
        Self {
            issue,
            interactions: Vec::new(),
            variant: CardVariant::Compact,
            distance_meters: None,
            feedback: None,
        }
    }

    pub fn detailed(detail: IssueDetail) -> Self {
        Self {
            issue: detail.issue,
            interactions: detail.interacoes,
            variant: CardVariant::Detailed,
            distance_meters: None,
            feedback: None,
        }
    }

    pub fn with_distance_from(mut self, origin: Coordinate) -> Self {
        self.distance_meters = Some(origin.distance_to(&self.issue.position()));
        self
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn variant(&self) -> CardVariant {
        self.variant
    }

    /// Result message of the last action taken from this card
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn detail_link(&self) -> String {
        detail_link(self.issue.id)
    }

    /// Replace the shown data after a refetch, keeping variant and feedback
    pub fn refresh(&mut self, issue: Issue, interactions: Option<Vec<Interaction>>) {
        self.issue = issue;
        if let Some(interactions) = interactions {
            self.interactions = interactions;
        }
    }

    pub async fn support(&mut self, controller: &IssuesMapController) -> InteractionOutcome {
        self.interact(controller, InteractionType::Apoio, None).await
    }

    pub async fn like(&mut self, controller: &IssuesMapController) -> InteractionOutcome {
        self.interact(controller, InteractionType::Curtida, None).await
    }

    pub async fn comment(
        &mut self,
        controller: &IssuesMapController,
        text: impl Into<String>,
    ) -> InteractionOutcome {
        self.interact(controller, InteractionType::Comentario, Some(text.into()))
            .await
    }

    async fn interact(
        &mut self,
        controller: &IssuesMapController,
        tipo: InteractionType,
        conteudo: Option<String>,
    ) -> InteractionOutcome {
        let outcome = controller
            .add_interaction(self.issue.id, tipo, conteudo)
            .await;
        self.feedback = match &outcome.error {
            Some(message) => Some(message.clone()),
            None => Some(format!("{} registrado", tipo.label())),
        };

        let state = controller.state().await;
        if let Some(selected) = state.selected_issue.filter(|d| d.issue.id == self.issue.id) {
            self.refresh(selected.issue, Some(selected.interacoes));
        } else if let Some(listed) = state.issues.into_iter().find(|i| i.id == self.issue.id) {
            self.refresh(listed, None);
        }
        outcome
    }

    /// Plain-text rendering for terminal front-ends
    pub fn render(&self) -> Vec<String> {
        let issue = &self.issue;
        let tipo = issue.tipo.display();
        let status = issue.status.display();

        let mut lines = vec![
            format!("{} {} (#{})", tipo.icon, issue.titulo, issue.id),
            format!("{} · {}", tipo.label, status.label),
            format!(
                "👍 {} apoio(s) · 💬 {} interação(ões)",
                issue.total_apoios, issue.total_interacoes
            ),
        ];
        if let Some(d) = self.distance_meters {
            lines.push(format_distance(d));
        }

        if self.variant == CardVariant::Detailed {
            lines.push(String::new());
            lines.push(issue.descricao.clone());
            let author = issue.autor_nome.as_deref().unwrap_or("Anônimo");
            match issue.data_criacao {
                Some(date) => lines.push(format!(
                    "Reportado por {} em {}",
                    author,
                    date.format("%d/%m/%Y %H:%M")
                )),
                None => lines.push(format!("Reportado por {}", author)),
            }
            if let Some(url) = &issue.foto_url {
                lines.push(format!("Foto: {}", url));
            }
            if !self.interactions.is_empty() {
                lines.push(String::new());
                for interaction in &self.interactions {
                    let who = interaction.usuario_nome.as_deref().unwrap_or("Anônimo");
                    match &interaction.conteudo {
                        Some(text) => lines.push(format!(
                            "{} {}: {}",
                            interaction.tipo.icon(),
                            who,
                            text
                        )),
                        None => lines.push(format!(
                            "{} {} ({})",
                            interaction.tipo.icon(),
                            who,
                            interaction.tipo.label()
                        )),
                    }
                }
            }
        } else {
            lines.push(format!("Ver detalhes: {}", self.detail_link()));
        }

        if let Some(feedback) = &self.feedback {
            lines.push(format!("» {}", feedback));
        }
        lines
    }
}

/// Route of the full detail page of an issue
pub fn detail_link(issue_id: i64) -> String {
    format!("/issues/{}", issue_id)
}

fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("a {:.0} m", meters)
    } else {
        format!("a {:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{IssueStatus, IssueType};

    fn sample() -> Issue {
        Issue {
            id: 3,
            titulo: "Lâmpada queimada".into(),
            descricao: "Poste da praça sem luz".into(),
            tipo: IssueType::Iluminacao,
            status: IssueStatus::EmAndamento,
            latitude: -26.3045,
            longitude: -48.8487,
            foto_url: None,
            autor_nome: Some("Carla".into()),
            data_criacao: NaiveDate::from_ymd_opt(2024, 5, 2)
                .and_then(|d| d.and_hms_opt(9, 30, 0)),
            total_apoios: 4,
            total_interacoes: 6,
        }
    }

    #[test]
    fn test_compact_render() {
        let card = IssueCard::compact(sample());
        let lines = card.render();
        assert_eq!(lines[0], "💡 Lâmpada queimada (#3)");
        assert_eq!(lines[1], "Iluminação · Em andamento");
        assert!(lines.iter().any(|l| l == "Ver detalhes: /issues/3"));
    }

    #[test]
    fn test_detailed_render() {
        let card = IssueCard::detailed(IssueDetail {
            issue: sample(),
            interacoes: vec![Interaction {
                id: 1,
                tipo: InteractionType::Comentario,
                conteudo: Some("Passei lá ontem".into()),
                usuario_nome: Some("Rui".into()),
                data_criacao: None,
            }],
        });
        let lines = card.render();
        assert!(lines.contains(&"Reportado por Carla em 02/05/2024 09:30".to_string()));
        assert!(lines.contains(&"💬 Rui: Passei lá ontem".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Ver detalhes")));
    }

    #[test]
    fn test_distance_formatting() {
        let card =
            IssueCard::compact(sample()).with_distance_from(Coordinate::new(-26.3045, -48.8487));
        assert!(card.render().contains(&"a 0 m".to_string()));
        assert_eq!(format_distance(1530.0), "a 1.5 km");
    }
}
