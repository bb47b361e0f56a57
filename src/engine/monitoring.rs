// ==========================================
// Agenda Escolar - monitoramento anual
// ==========================================
// Regra da camada: somente leitura; a matriz nunca grava nada.
// Regra da camada: falha do feed de feriados degrada para conjunto
// vazio com aviso, nunca derruba a consulta.
// ==========================================
// Responsabilidade: matriz ano inteiro aluno x semana de roteiro:
// cada célula resolve a ocorrência concreta da semana (evento real ou
// projeção), com presença, cursores de apostila e cadeia de reposição.
// Entrada: ano + filtros opcionais
// Saída: YearMatrix (colunas de semana + linhas de aluno)
// ==========================================
// Concorrência: busca de feriados roda em paralelo com a carga do
// banco (tokio::join! + spawn_blocking); é o único ponto assíncrono.
// ==========================================

mod aggregator;
mod resolve;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::MonitoringAggregator;
pub use types::{MakeupLink, MonitoringCell, MonitoringFilters, StudentRow, WeekColumn, YearMatrix};
