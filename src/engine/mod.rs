// ==========================================
// Agenda Escolar - camada de engine
// ==========================================
// Regras de leitura e verificação do motor de agendamento:
// disponibilidade, materialização de calendário, matriz anual e
// feed de feriados. As operações de escrita moram na camada de API;
// o engine fornece os testes que elas chamam dentro da transação.
// ==========================================

pub mod availability;
pub mod calendar;
pub mod events;
pub mod holiday_feed;
pub mod monitoring;
pub mod repositories;

// Reexporta os tipos do motor
pub use availability::{intervals_overlap, RoomAvailability, TeacherAvailability};
pub use calendar::{CalendarEntry, CalendarFilters, CalendarMaterializer, CalendarStudent};
pub use events::{
    NoOpNotificationPublisher, NotificationPublisher, OptionalNotificationPublisher,
    SchedulingNotification, SchedulingNotificationKind,
};
pub use holiday_feed::{HolidayFeed, HttpHolidayFeed, StaticHolidayFeed};
pub use monitoring::{
    MakeupLink, MonitoringAggregator, MonitoringCell, MonitoringFilters, StudentRow, WeekColumn,
    YearMatrix,
};
pub use repositories::SchedulingRepositories;
