// ==========================================
// Auxiliar de testes de integração da API
// ==========================================
// Responsabilidade: montar o ambiente completo das fachadas sobre um
// banco temporário, com a conexão única compartilhada e o feed de
// feriados estático (sem rede).
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tempfile::NamedTempFile;

use agenda_escolar::api::{AuditApi, CalendarApi, ConfigApi, EventApi, MakeupApi, MonitoringApi};
use agenda_escolar::config::ConfigManager;
use agenda_escolar::domain::Holiday;
use agenda_escolar::engine::{OptionalNotificationPublisher, StaticHolidayFeed};

pub use test_helpers::*;

// ==========================================
// Ambiente de teste da API
// ==========================================

/// Ambiente de teste com todas as fachadas sobre a mesma conexão
pub struct ApiTestEnv {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub event_api: Arc<EventApi>,
    pub makeup_api: Arc<MakeupApi>,
    pub calendar_api: Arc<CalendarApi>,
    pub monitoring_api: Arc<MonitoringApi>,
    pub audit_api: Arc<AuditApi>,
    pub config_api: Arc<ConfigApi>,

    // Mantém o arquivo temporário vivo durante o teste
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// Cria o ambiente sem feriados cadastrados
    pub fn new() -> Result<Self, String> {
        Self::with_holidays(Vec::new())
    }

    /// Cria o ambiente com a lista de feriados do feed estático
    pub fn with_holidays(holidays: Vec<Holiday>) -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("falha ao criar o banco de teste: {}", e))?;

        let conn = agenda_escolar::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("falha ao abrir o banco: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = Arc::new(
            ConfigManager::from_connection(Arc::clone(&conn))
                .map_err(|e| format!("falha ao iniciar a configuração: {}", e))?,
        );

        let event_api = Arc::new(EventApi::new(
            Arc::clone(&conn),
            Arc::clone(&config),
            OptionalNotificationPublisher::none(),
        ));
        let makeup_api = Arc::new(MakeupApi::new(
            Arc::clone(&conn),
            Arc::clone(&config),
            OptionalNotificationPublisher::none(),
        ));
        let calendar_api = Arc::new(CalendarApi::new(Arc::clone(&conn), Arc::clone(&config)));
        let monitoring_api = Arc::new(MonitoringApi::with_feed(
            Arc::clone(&conn),
            Arc::clone(&config),
            Arc::new(StaticHolidayFeed::new(holidays)),
        ));
        let audit_api = Arc::new(AuditApi::new(Arc::clone(&conn)));
        let config_api = Arc::new(ConfigApi::new(Arc::clone(&conn), Arc::clone(&config)));

        Ok(Self {
            db_path,
            conn,
            event_api,
            makeup_api,
            calendar_api,
            monitoring_api,
            audit_api,
            config_api,
            _temp_file: temp_file,
        })
    }

    /// Executa preparação de dados com a conexão compartilhada
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let guard = self.conn.lock().expect("lock da conexão de teste");
        f(&guard)
    }
}

// ==========================================
// Cenário base de escola
// ==========================================

/// Semeia o cadastro mínimo usado pela maioria dos testes:
/// - salas 1 e 2 (físicas) e 9001 (virtual, isenta de ocupação)
/// - professores 1 (Ana) e 2 (Bruno)
/// - turma 1: segunda 14:00, sala 1, professora Ana, 8 vagas
/// - turma 2: quarta 16:00, sala 2, professor Bruno, 6 vagas
/// - alunos 1 (Alice) e 2 (Bia) na turma 1; aluno 3 (Caio) na turma 2
/// - vigências abertas desde 2026-01-01
pub fn seed_basic_school(env: &ApiTestEnv) {
    env.with_conn(|conn| {
        seed_room(conn, 1, "Sala Azul", 8).expect("sala 1");
        seed_room(conn, 2, "Sala Verde", 6).expect("sala 2");
        seed_room(conn, 9001, "Sala Remota", 99).expect("sala virtual");

        seed_teacher(conn, 1, "Ana").expect("professora Ana");
        seed_teacher(conn, 2, "Bruno").expect("professor Bruno");

        seed_class_group(conn, 1, "Turma Seg 14h", 0, "14:00", 60, 1, 1, 8, "")
            .expect("turma 1");
        seed_class_group(conn, 2, "Turma Qua 16h", 2, "16:00", 60, 2, 2, 6, "")
            .expect("turma 2");

        seed_student(conn, 1, "Alice", "").expect("aluna Alice");
        seed_student(conn, 2, "Bia", "").expect("aluna Bia");
        seed_student(conn, 3, "Caio", "").expect("aluno Caio");

        let since = date(2026, 1, 1);
        seed_enrollment(conn, 1, 1, 1, since, None).expect("vigência da Alice");
        seed_enrollment(conn, 2, 2, 1, since, None).expect("vigência da Bia");
        seed_enrollment(conn, 3, 3, 2, since, None).expect("vigência do Caio");
    });
}
