// ==========================================
// Agenda Escolar - reset e carga de demonstração
// ==========================================
// Recria o banco a partir de scripts/dev_db/schema.sql e semeia um
// cenário de demonstração: salas (incluindo as virtuais), turmas,
// alunos com vigência de matrícula, roteiro anual e algumas aulas.
// O banco anterior, se existir, é copiado para .bak.<timestamp>.
//
// Uso: reset_and_seed_demo_db [caminho_do_banco]

use chrono::{Duration, Local, NaiveDate};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fs;
use std::path::Path;

use agenda_escolar::db::{get_default_db_path, open_sqlite_connection};

const DEMO_YEAR: i32 = 2026;
const TOTAL_WEEKS: u32 = 48;

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;

    let schema_sql = include_str!("../../scripts/dev_db/schema.sql");
    conn.execute_batch(schema_sql)?;

    seed_rooms_and_teachers(&conn)?;
    seed_class_groups(&conn)?;
    seed_students_and_enrollments(&conn)?;
    seed_curriculum_weeks(&conn)?;
    seed_config(&conn)?;
    seed_sample_events(&conn)?;

    print_quick_counts(&conn)?;

    println!("Banco de demonstração pronto em {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backup: {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_rooms_and_teachers(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let rooms: &[(i64, &str, i64)] = &[
        (1, "Sala 1", 8),
        (2, "Sala 2", 8),
        (3, "Sala 3", 6),
        // Salas virtuais: aulas online não disputam ocupação
        (9001, "Sala Virtual 1", 99),
        (9002, "Sala Virtual 2", 99),
    ];
    for (id, name, capacity) in rooms {
        conn.execute(
            "INSERT INTO rooms (id, name, capacity, active) VALUES (?, ?, ?, 1)",
            params![id, name, capacity],
        )?;
    }

    let teachers: &[(i64, &str)] = &[(1, "Ana"), (2, "Bruno"), (3, "Carla")];
    for (id, name) in teachers {
        conn.execute(
            "INSERT INTO teachers (id, name, active) VALUES (?, ?, 1)",
            params![id, name],
        )?;
    }

    Ok(())
}

fn seed_class_groups(conn: &Connection) -> Result<(), Box<dyn Error>> {
    // (id, nome, dia 0=segunda, hora, duração, sala, professor, vagas, perfis, ativa)
    let groups: &[(i64, &str, i64, &str, i64, i64, i64, i64, &str, i64)] = &[
        (1, "Turma Segunda 18h", 0, "18:00", 60, 1, 1, 8, "", 1),
        (2, "Turma Quarta 19h", 2, "19:00", 60, 2, 2, 8, "", 1),
        (3, "Turma Quinta 18h", 3, "18:00", 60, 1, 1, 6, "INFANTIL,JUVENIL", 1),
        (4, "Turma Online Terça 20h", 1, "20:00", 60, 9001, 3, 12, "", 1),
        (5, "Turma Sábado 9h (encerrada)", 5, "09:00", 60, 3, 2, 6, "", 0),
    ];
    for group in groups {
        conn.execute(
            r#"INSERT INTO class_groups (
                id, name, day_of_week, time_of_day, duration_minutes,
                room_id, teacher_id, max_capacity, eligible_profiles, active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                group.0, group.1, group.2, group.3, group.4, group.5, group.6, group.7,
                group.8, group.9
            ],
        )?;
    }

    Ok(())
}

fn seed_students_and_enrollments(conn: &Connection) -> Result<(), Box<dyn Error>> {
    // (id, nome, ativo, perfil, caderno/página ábaco, caderno/página desafio)
    let students: &[(i64, &str, i64, &str, i64, i64, i64, i64)] = &[
        (1, "Alice Martins", 1, "INFANTIL", 2, 14, 1, 8),
        (2, "Bernardo Lima", 1, "JUVENIL", 3, 2, 2, 11),
        (3, "Cecília Rocha", 1, "INFANTIL", 1, 30, 1, 19),
        (4, "Davi Souza", 1, "ADULTO", 4, 7, 3, 4),
        (5, "Elisa Nogueira", 1, "JUVENIL", 2, 22, 2, 3),
        (6, "Felipe Castro", 1, "ADULTO", 1, 9, 1, 5),
        (7, "Gabriela Pinto", 1, "INFANTIL", 2, 1, 1, 27),
        (8, "Heitor Alves", 1, "JUVENIL", 3, 16, 2, 20),
        (9, "Isabela Freitas", 1, "ADULTO", 5, 3, 4, 9),
        (10, "João Pedro Dias", 1, "INFANTIL", 1, 18, 1, 12),
        (11, "Karina Mota (desligada)", 0, "ADULTO", 2, 5, 1, 30),
    ];
    for s in students {
        conn.execute(
            r#"INSERT INTO students (
                id, name, active, cognitive_profile,
                abacus_book, abacus_page, challenge_book, challenge_page,
                first_class_event_id, zero_class_event_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL)"#,
            params![s.0, s.1, s.2, s.3, s.4, s.5, s.6, s.7],
        )?;
    }

    let year_start = format!("{}-01-05", DEMO_YEAR);

    // Vigências abertas desde o início do ano letivo
    let simple_enrollments: &[(i64, i64)] = &[
        (1, 1),
        (3, 1),
        (7, 3),
        (10, 3),
        (4, 2),
        (6, 2),
        (9, 4),
        (5, 4),
        (8, 2),
    ];
    for (student_id, class_group_id) in simple_enrollments {
        conn.execute(
            r#"INSERT INTO enrollment_windows (student_id, class_group_id, valid_from, valid_to)
               VALUES (?, ?, ?, NULL)"#,
            params![student_id, class_group_id, year_start],
        )?;
    }

    // Aluno 2 trocou de turma no fim de março: vigência fechada + aberta
    conn.execute(
        r#"INSERT INTO enrollment_windows (student_id, class_group_id, valid_from, valid_to)
           VALUES (2, 1, ?, ?)"#,
        params![year_start, format!("{}-03-31", DEMO_YEAR)],
    )?;
    conn.execute(
        r#"INSERT INTO enrollment_windows (student_id, class_group_id, valid_from, valid_to)
           VALUES (2, 2, ?, NULL)"#,
        params![format!("{}-04-01", DEMO_YEAR)],
    )?;

    Ok(())
}

fn seed_curriculum_weeks(conn: &Connection) -> Result<(), Box<dyn Error>> {
    // Primeira segunda-feira do ano letivo
    let first_monday = NaiveDate::from_ymd_opt(DEMO_YEAR, 1, 5)
        .ok_or("data inicial do roteiro inválida")?;
    let palette = ["#4F8EF7", "#34C77B", "#F5A623", "#E0566E"];

    for number in 1..=TOTAL_WEEKS {
        let start = first_monday + Duration::weeks(i64::from(number) - 1);
        let end = start + Duration::days(6);

        // Recesso: férias de julho (26-27) e encerramento do ano (48)
        let is_recess = matches!(number, 26 | 27 | TOTAL_WEEKS);
        let theme = if is_recess {
            "Recesso".to_string()
        } else {
            format!("Tema {}", number)
        };
        let color_tag: Option<&str> = if is_recess {
            None
        } else {
            Some(palette[(number as usize - 1) % palette.len()])
        };

        conn.execute(
            r#"INSERT INTO curriculum_weeks (
                week_number, start_date, end_date, theme, color_tag, is_recess
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                number,
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string(),
                theme,
                color_tag,
                is_recess,
            ],
        )?;
    }

    Ok(())
}

fn seed_config(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let now = Local::now()
        .naive_local()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let entries: &[(&str, &str)] = &[
        ("virtual_room_ids", "9001,9002"),
        ("workshop_weekday", "5"),
        ("workshop_time", "10:00"),
        ("workshop_duration_minutes", "120"),
        ("meeting_general_weekday", "4"),
        ("meeting_monitoring_weekday", "2"),
        ("meeting_pedagogical_weekday", "3"),
        ("meeting_time", "12:30"),
        ("meeting_duration_minutes", "60"),
        ("makeup_window_days", "30"),
        (
            "holiday_feed_base_url",
            "https://brasilapi.com.br/api/feriados/v1",
        ),
    ];
    for (key, value) in entries {
        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?, ?, ?)"#,
            params![key, value, now],
        )?;
    }

    Ok(())
}

fn seed_sample_events(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let now = Local::now()
        .naive_local()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    // Aulas das turmas 1 e 2 nas três primeiras semanas do roteiro
    let groups: &[(i64, i64, &str, i64, i64)] = &[
        // (turma, dia da semana, hora, sala, professor)
        (1, 0, "18:00", 1, 1),
        (2, 2, "19:00", 2, 2),
    ];

    for week_number in 1..=3i64 {
        for (group_id, day_of_week, time, room_id, teacher_id) in groups {
            let (week_id, week_start): (i64, String) = conn.query_row(
                "SELECT id, start_date FROM curriculum_weeks WHERE week_number = ?",
                params![week_number],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let start = NaiveDate::parse_from_str(&week_start, "%Y-%m-%d")?
                + Duration::days(*day_of_week);
            let scheduled_at = format!("{} {}:00", start.format("%Y-%m-%d"), time);

            conn.execute(
                r#"INSERT INTO events (
                    event_type, scheduled_at, duration_minutes, room_id, max_capacity,
                    finalized, canceled_at, cancel_reason, rescheduled_from_id,
                    class_group_id, curriculum_week_id, created_by, created_at, updated_at
                ) VALUES ('REGULAR_CLASS', ?, 60, ?, 8, 0, NULL, NULL, NULL, ?, ?, 'seed', ?, ?)"#,
                params![scheduled_at, room_id, group_id, week_id, now, now],
            )?;
            let event_id = conn.last_insert_rowid();

            conn.execute(
                r#"INSERT INTO teacher_participations (
                    event_id, teacher_id, attendance, observation,
                    deactivated_at, created_at, updated_at
                ) VALUES (?, ?, NULL, NULL, NULL, ?, ?)"#,
                params![event_id, teacher_id, now, now],
            )?;

            // Alunos com vigência na data da aula
            let mut stmt = conn.prepare(
                r#"SELECT s.id, s.abacus_book, s.abacus_page, s.challenge_book, s.challenge_page
                   FROM enrollment_windows w
                   JOIN students s ON s.id = w.student_id
                   WHERE w.class_group_id = ?
                     AND w.valid_from <= ?
                     AND (w.valid_to IS NULL OR w.valid_to >= ?)
                   ORDER BY s.id"#,
            )?;
            let day = start.format("%Y-%m-%d").to_string();
            let rows = stmt.query_map(params![group_id, day, day], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?;
            for row in rows {
                let (student_id, abacus_book, abacus_page, challenge_book, challenge_page) = row?;
                conn.execute(
                    r#"INSERT INTO student_participations (
                        event_id, student_id, attendance, deactivated_at,
                        made_up_from_event_id, contact_status,
                        abacus_book, abacus_page, challenge_book, challenge_page,
                        created_at, updated_at
                    ) VALUES (?, ?, NULL, NULL, NULL, 'NOT_CONTACTED', ?, ?, ?, ?, ?, ?)"#,
                    params![
                        event_id,
                        student_id,
                        abacus_book,
                        abacus_page,
                        challenge_book,
                        challenge_page,
                        now,
                        now
                    ],
                )?;
            }
        }
    }

    Ok(())
}

fn print_quick_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let tables = [
        "rooms",
        "teachers",
        "class_groups",
        "students",
        "enrollment_windows",
        "curriculum_weeks",
        "events",
        "student_participations",
        "teacher_participations",
        "config_kv",
    ];
    for table in tables {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        println!("{:<24} {}", table, count);
    }
    Ok(())
}
