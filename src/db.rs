// ==========================================
// Agenda Escolar - inicialização de conexão SQLite
// ==========================================
// Objetivo:
// - Unificar o comportamento de PRAGMA em todos os Connection::open,
//   evitando "módulo A com foreign_keys ligado, módulo B sem"
// - Unificar busy_timeout, reduzindo erros busy esporádicos em escrita
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// busy_timeout padrão (milissegundos)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version esperado pelo código atual (alinhado a `scripts/dev_db/schema.sql`)
///
/// Observação:
/// - O número é usado para alerta (sem migração automática), evitando rodar
///   silenciosamente sobre um banco antigo.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Aplica os PRAGMA unificados em uma conexão SQLite
///
/// Observação:
/// - foreign_keys precisa ser ligado por conexão
/// - busy_timeout precisa ser configurado por conexão
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Abre uma conexão SQLite com a configuração unificada
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// Lê o schema_version (retorna None se a tabela não existir)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Caminho padrão do banco de dados
///
/// Ordem de resolução:
/// 1. Variável de ambiente `AGENDA_ESCOLAR_DB_PATH`
/// 2. Diretório de dados do usuário (`agenda-escolar-dev` em debug)
/// 3. Fallback: `./agenda_escolar.db`
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("AGENDA_ESCOLAR_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./agenda_escolar.db");

    if let Some(data_dir) = dirs::data_dir() {
        // Ambiente de desenvolvimento usa diretório separado para não poluir dados reais
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("agenda-escolar-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("agenda-escolar");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("agenda_escolar.db");
    }

    path.to_string_lossy().to_string()
}
