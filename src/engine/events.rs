// ==========================================
// Agenda Escolar - publicação de notificações
// ==========================================
// O engine define o trait e publica; a entrega (e-mail, mensageria)
// fica fora do motor. Inversão de dependência: quem integra
// implementa o adaptador.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// Tipos de notificação
// ==========================================

/// Tipo de notificação de agendamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingNotificationKind {
    /// Evento cancelado
    EventCanceled,
    /// Evento reagendado
    EventRescheduled,
    /// Reposição transferida
    MakeupTransferred,
}

impl SchedulingNotificationKind {
    /// Identificador em string
    pub fn as_str(&self) -> &str {
        match self {
            SchedulingNotificationKind::EventCanceled => "EventCanceled",
            SchedulingNotificationKind::EventRescheduled => "EventRescheduled",
            SchedulingNotificationKind::MakeupTransferred => "MakeupTransferred",
        }
    }
}

/// Notificação publicada pelo motor de agendamento
///
/// Carrega o evento afetado e os alunos a avisar; o canal de entrega
/// decide como formatar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingNotification {
    /// Tipo da notificação
    pub kind: SchedulingNotificationKind,
    /// Evento afetado
    pub event_id: i64,
    /// Turma do evento, quando houver
    pub class_group_id: Option<i64>,
    /// Data e hora do evento afetado
    pub scheduled_at: NaiveDateTime,
    /// Alunos a notificar
    pub student_ids: Vec<i64>,
    /// Texto livre (motivo do cancelamento, nota da reposição)
    pub detail: Option<String>,
}

impl SchedulingNotification {
    /// Notificação de cancelamento
    pub fn canceled(
        event_id: i64,
        class_group_id: Option<i64>,
        scheduled_at: NaiveDateTime,
        student_ids: Vec<i64>,
        reason: Option<String>,
    ) -> Self {
        Self {
            kind: SchedulingNotificationKind::EventCanceled,
            event_id,
            class_group_id,
            scheduled_at,
            student_ids,
            detail: reason,
        }
    }

    /// Notificação de reagendamento (aponta para o evento substituto)
    pub fn rescheduled(
        replacement_event_id: i64,
        class_group_id: Option<i64>,
        new_scheduled_at: NaiveDateTime,
        student_ids: Vec<i64>,
    ) -> Self {
        Self {
            kind: SchedulingNotificationKind::EventRescheduled,
            event_id: replacement_event_id,
            class_group_id,
            scheduled_at: new_scheduled_at,
            student_ids,
            detail: None,
        }
    }

    /// Notificação de reposição transferida (aponta para o destino)
    pub fn makeup_transferred(
        destination_event_id: i64,
        class_group_id: Option<i64>,
        scheduled_at: NaiveDateTime,
        student_id: i64,
        note: Option<String>,
    ) -> Self {
        Self {
            kind: SchedulingNotificationKind::MakeupTransferred,
            event_id: destination_event_id,
            class_group_id,
            scheduled_at,
            student_ids: vec![student_id],
            detail: note,
        }
    }
}

// ==========================================
// Trait de publicação
// ==========================================

/// Publicador de notificações de agendamento
///
/// O motor publica de forma best-effort: falha de publicação nunca
/// desfaz a operação que a originou.
pub trait NotificationPublisher: Send + Sync {
    /// Publica uma notificação
    fn publish(&self, notification: SchedulingNotification)
        -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Publicador nulo
///
/// Para cenários sem canal de notificação (testes, seeds).
#[derive(Debug, Clone, Default)]
pub struct NoOpNotificationPublisher;

impl NotificationPublisher for NoOpNotificationPublisher {
    fn publish(
        &self,
        notification: SchedulingNotification,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpNotificationPublisher: notificação descartada - event_id={}, kind={}",
            notification.event_id,
            notification.kind.as_str()
        );
        Ok(())
    }
}

/// Publicador opcional
///
/// Simplifica o uso de Option<Arc<dyn NotificationPublisher>>.
pub struct OptionalNotificationPublisher {
    inner: Option<Arc<dyn NotificationPublisher>>,
}

impl OptionalNotificationPublisher {
    /// Cria com um publicador configurado
    pub fn with_publisher(publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    /// Cria sem publicador (nada é publicado)
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Publica, se houver publicador configurado
    pub fn publish(
        &self,
        notification: SchedulingNotification,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(notification),
            None => {
                tracing::debug!(
                    "OptionalNotificationPublisher: sem publicador, notificação descartada - event_id={}, kind={}",
                    notification.event_id,
                    notification.kind.as_str()
                );
                Ok(())
            }
        }
    }

    /// Há publicador configurado?
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalNotificationPublisher {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_notificacao_de_cancelamento() {
        let n = SchedulingNotification::canceled(
            42,
            Some(3),
            sample_at(),
            vec![1, 2],
            Some("chuva forte".to_string()),
        );

        assert_eq!(n.kind, SchedulingNotificationKind::EventCanceled);
        assert_eq!(n.event_id, 42);
        assert_eq!(n.student_ids, vec![1, 2]);
        assert_eq!(n.detail.as_deref(), Some("chuva forte"));
    }

    #[test]
    fn test_noop_publisher() {
        let publisher = NoOpNotificationPublisher;
        let n = SchedulingNotification::rescheduled(43, None, sample_at(), vec![]);

        assert!(publisher.publish(n).is_ok());
    }

    #[test]
    fn test_optional_publisher_sem_configuracao() {
        let publisher = OptionalNotificationPublisher::none();
        assert!(!publisher.is_configured());

        let n = SchedulingNotification::makeup_transferred(44, Some(5), sample_at(), 7, None);
        assert!(publisher.publish(n).is_ok());
    }

    #[test]
    fn test_optional_publisher_com_noop() {
        let noop = Arc::new(NoOpNotificationPublisher) as Arc<dyn NotificationPublisher>;
        let publisher = OptionalNotificationPublisher::with_publisher(noop);
        assert!(publisher.is_configured());

        let n = SchedulingNotification::canceled(45, None, sample_at(), vec![9], None);
        assert!(publisher.publish(n).is_ok());
    }
}
