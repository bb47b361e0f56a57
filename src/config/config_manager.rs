// ==========================================
// Agenda Escolar - gerenciador de configuração
// ==========================================
// Armazenamento: tabela config_kv (chave-valor + escopo)
// Valor ausente ou malformado cai no padrão embutido, com aviso.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::MeetingKind;
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - gerenciador de configuração
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Cria um ConfigManager abrindo o banco no caminho dado
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Cria um ConfigManager a partir de uma conexão existente
    ///
    /// Reaplica os PRAGMA padronizados na conexão recebida (idempotente)
    /// para garantir comportamento uniforme.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("falha ao adquirir o lock: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// Lê um valor da tabela config_kv (scope_id='global')
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("falha ao adquirir o lock: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Lê um valor do escopo global (público, para reuso por outros módulos)
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// Lê um valor com padrão quando ausente
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Grava um valor no escopo global (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("falha ao adquirir o lock: {}", e))?;

        let now = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )?;

        Ok(())
    }

    /// Lista as entradas do escopo global ordenadas por chave
    ///
    /// Retorna tuplas (chave, valor, atualizado_em).
    pub fn list_global_config_values(
        &self,
    ) -> Result<Vec<(String, String, String)>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("falha ao adquirir o lock: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value, updated_at FROM config_kv
             WHERE scope_id = 'global'
             ORDER BY key",
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    // ===== Salas virtuais =====

    /// Ids de salas virtuais (nunca entram no teste de ocupação)
    ///
    /// Formato: lista separada por vírgula, ex.: "9001,9002".
    /// Tokens inválidos são ignorados com aviso.
    pub fn get_virtual_room_ids(&self) -> Result<Vec<i64>, Box<dyn Error>> {
        let raw = self.get_config_or_default(config_keys::VIRTUAL_ROOM_IDS, "9001,9002")?;

        let mut ids = Vec::new();
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => {
                    tracing::warn!(
                        config_key = config_keys::VIRTUAL_ROOM_IDS,
                        token = %token,
                        "id de sala virtual inválido, ignorado"
                    );
                }
            }
        }

        Ok(ids)
    }

    // ===== Oficina semanal =====

    /// Dia da semana da oficina (0=segunda .. 6=domingo; padrão sábado)
    pub fn get_workshop_weekday(&self) -> Result<i32, Box<dyn Error>> {
        self.get_weekday(config_keys::WORKSHOP_WEEKDAY, 5)
    }

    /// Horário da oficina (padrão 10:00)
    pub fn get_workshop_time(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time(config_keys::WORKSHOP_TIME, "10:00")
    }

    /// Duração da oficina em minutos (padrão 120)
    pub fn get_workshop_duration_minutes(&self) -> Result<i32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::WORKSHOP_DURATION_MINUTES, "120")?;
        Ok(value.parse::<i32>().unwrap_or(120))
    }

    // ===== Reuniões fixas =====

    /// Dia da semana de cada tipo de reunião fixa
    ///
    /// Padrões: geral=sexta(4), monitoria=quarta(2), pedagógica=quinta(3).
    pub fn get_meeting_weekday(&self, kind: MeetingKind) -> Result<i32, Box<dyn Error>> {
        match kind {
            MeetingKind::General => self.get_weekday(config_keys::MEETING_GENERAL_WEEKDAY, 4),
            MeetingKind::Monitoring => self.get_weekday(config_keys::MEETING_MONITORING_WEEKDAY, 2),
            MeetingKind::Pedagogical => {
                self.get_weekday(config_keys::MEETING_PEDAGOGICAL_WEEKDAY, 3)
            }
        }
    }

    /// Horário das reuniões fixas (padrão 12:30)
    pub fn get_meeting_time(&self) -> Result<NaiveTime, Box<dyn Error>> {
        self.get_time(config_keys::MEETING_TIME, "12:30")
    }

    /// Duração das reuniões fixas em minutos (padrão 60)
    pub fn get_meeting_duration_minutes(&self) -> Result<i32, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MEETING_DURATION_MINUTES, "60")?;
        Ok(value.parse::<i32>().unwrap_or(60))
    }

    // ===== Reposição =====

    /// Janela máxima entre aula perdida e reposição, em dias (padrão 30)
    pub fn get_makeup_window_days(&self) -> Result<i64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MAKEUP_WINDOW_DAYS, "30")?;
        Ok(value.parse::<i64>().unwrap_or(30))
    }

    // ===== Feed de feriados =====

    /// URL base do feed de feriados nacionais
    pub fn get_holiday_feed_base_url(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(
            config_keys::HOLIDAY_FEED_BASE_URL,
            "https://brasilapi.com.br/api/feriados/v1",
        )
    }

    // ===== Auxiliares de parse =====

    /// Lê um dia da semana validando a faixa 0..=6
    fn get_weekday(&self, key: &str, default: i32) -> Result<i32, Box<dyn Error>> {
        let raw = self.get_config_or_default(key, &default.to_string())?;

        match raw.parse::<i32>() {
            Ok(day) if (0..=6).contains(&day) => Ok(day),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    fallback = default,
                    "dia da semana inválido na configuração, usando padrão"
                );
                Ok(default)
            }
        }
    }

    /// Lê um horário "HH:MM" (aceita também "HH:MM:SS")
    fn get_time(&self, key: &str, default: &str) -> Result<NaiveTime, Box<dyn Error>> {
        let raw = self.get_config_or_default(key, default)?;

        let parsed = NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"));

        match parsed {
            Ok(time) => Ok(time),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    fallback = default,
                    "horário inválido na configuração, usando padrão"
                );
                Ok(NaiveTime::parse_from_str(default, "%H:%M")?)
            }
        }
    }
}

// ==========================================
// Chaves de configuração
// ==========================================
pub mod config_keys {
    // ===== Salas virtuais =====
    pub const VIRTUAL_ROOM_IDS: &str = "virtual_room_ids";

    // ===== Oficina semanal =====
    pub const WORKSHOP_WEEKDAY: &str = "workshop_weekday";
    pub const WORKSHOP_TIME: &str = "workshop_time";
    pub const WORKSHOP_DURATION_MINUTES: &str = "workshop_duration_minutes";

    // ===== Reuniões fixas =====
    pub const MEETING_GENERAL_WEEKDAY: &str = "meeting_general_weekday";
    pub const MEETING_MONITORING_WEEKDAY: &str = "meeting_monitoring_weekday";
    pub const MEETING_PEDAGOGICAL_WEEKDAY: &str = "meeting_pedagogical_weekday";
    pub const MEETING_TIME: &str = "meeting_time";
    pub const MEETING_DURATION_MINUTES: &str = "meeting_duration_minutes";

    // ===== Reposição =====
    pub const MAKEUP_WINDOW_DAYS: &str = "makeup_window_days";

    // ===== Feed de feriados =====
    pub const HOLIDAY_FEED_BASE_URL: &str = "holiday_feed_base_url";
}
