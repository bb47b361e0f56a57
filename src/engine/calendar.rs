// ==========================================
// Agenda Escolar - materialização de calendário
// ==========================================
// Regra da camada: a materialização é somente leitura; pseudo-eventos
// nunca são gravados.
// Regra da camada: evento persistido na mesma (turma, data) suprime o
// pseudo-evento correspondente, inclusive quando cancelado.
// ==========================================
// Responsabilidade: compor a visão de calendário de um intervalo:
// eventos persistidos anotados com status + síntese das ocorrências
// recorrentes ainda sem linha própria (aulas de turma, oficina da
// semana e reuniões fixas).
// Entrada: intervalo de datas + filtros opcionais
// Saída: lista de CalendarEntry ordenada por horário
// ==========================================

mod indexes;
mod materializer;
mod synthesis;
mod types;


pub use materializer::CalendarMaterializer;
pub use types::{CalendarEntry, CalendarFilters, CalendarStudent};
