// ==========================================
// EventApi - ciclo de vida de eventos
// ==========================================
// Fachada de agendamento: criação com checagem de disponibilidade,
// atualização, cancelamento, reagendamento com linhagem, fechamento
// de presenças e reabertura. Toda operação mutadora roda em uma
// única transação e registra trilha de auditoria antes do commit.

mod lifecycle;
mod participations;
mod queries;
mod types;

pub use lifecycle::EventApi;
pub use types::{
    CreateEventRequest, EventDetail, FinalizeEventRequest, FinalizeStudentResult,
    FinalizeTeacherResult, RescheduleEventRequest, UpdateEventRequest,
};
