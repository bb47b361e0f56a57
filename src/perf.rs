use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static SQL_COUNT: Cell<u64> = Cell::new(0);
    static SLOW_SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    if s.len() <= max_len {
        return s;
    }
    format!("{}…", &s[..max_len])
}

/// Instala trace/profile de SQL no SQLite (contagem de SQL + log de SQL lento)
///
/// Chaves:
/// - Debug liga por padrão; Release desliga por padrão (pode ligar via ambiente)
/// - `AGENDA_ESCOLAR_PERF_SQL=1` força ligado
/// - `AGENDA_ESCOLAR_SLOW_SQL_MS=50` configura o limiar de SQL lento (ms)
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var("AGENDA_ESCOLAR_PERF_SQL") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        // Limpa explicitamente para não deixar callback residual em conexão reutilizada
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var("AGENDA_ESCOLAR_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
}

fn sql_trace_callback(_sql: &str) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if !active {
        return;
    }
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        let sql_short = truncate_sql(sql, 420);
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %sql_short,
            "slow sql"
        );
        let active = PERF_DEPTH.with(|d| d.get() > 0);
        if active {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// Guard de estatística de performance: registra elapsed_ms + nº de SQL + nº de SQL lento
///
/// Uso:
/// ```ignore
/// let _perf = agenda_escolar::perf::PerfGuard::new("get_calendar");
/// // trabalho...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let sql_start = SQL_COUNT.with(|c| c.get());
        let slow_sql_start = SLOW_SQL_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            sql_start,
            slow_sql_start,
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_end = SQL_COUNT.with(|c| c.get());
        let slow_sql_end = SLOW_SQL_COUNT.with(|c| c.get());
        let sql_count = sql_end.saturating_sub(self.sql_start);
        let slow_sql_count = slow_sql_end.saturating_sub(self.slow_sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
