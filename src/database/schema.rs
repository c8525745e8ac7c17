//! DDL applied at startup. Every statement is idempotent.

pub const STATEMENTS: [&str; 8] = [
    r#"
    CREATE TABLE IF NOT EXISTS staff (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name    TEXT NOT NULL DEFAULT '',
        last_name     TEXT NOT NULL DEFAULT '',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS parents (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name    TEXT NOT NULL DEFAULT '',
        last_name     TEXT NOT NULL DEFAULT '',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS home_arrivals (
        id          UUID PRIMARY KEY,
        actor_id    TEXT NOT NULL,
        student_id  TEXT NOT NULL,
        confirmed   BOOLEAN NOT NULL DEFAULT FALSE,
        arrival_day DATE NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS home_arrivals_once_per_day
        ON home_arrivals (actor_id, student_id, arrival_day)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS home_arrivals_by_day ON home_arrivals (arrival_day)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS school_arrivals (
        id          UUID PRIMARY KEY,
        actor_id    TEXT NOT NULL,
        student_id  TEXT NOT NULL,
        confirmed   BOOLEAN NOT NULL DEFAULT FALSE,
        arrival_day DATE NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS school_arrivals_once_per_day
        ON school_arrivals (actor_id, student_id, arrival_day)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS school_arrivals_by_day ON school_arrivals (arrival_day)
    "#,
];
