use rusqlite_migration::{M, Migrations};
use std::sync::LazyLock;

pub static MIGRATIONS: LazyLock<Migrations<'static>> = LazyLock::new(|| {
    Migrations::new(vec![
        M::up(
            "
CREATE TABLE users (
    id          TEXT PRIMARY KEY,
    created_at  INTEGER NOT NULL DEFAULT (unixepoch('now'))
);

CREATE TABLE records (
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    instability INTEGER NOT NULL CHECK (instability BETWEEN 0 AND 10),
    pain        INTEGER NOT NULL CHECK (pain BETWEEN 0 AND 10),
    activity    INTEGER NOT NULL CHECK (activity BETWEEN 0 AND 10),
    sprain      TEXT NOT NULL,
    balance     TEXT NOT NULL,
    management  TEXT NOT NULL DEFAULT '',
    footwear    TEXT NOT NULL,
    surface     TEXT NOT NULL,
    PRIMARY KEY (user_id, date)
);
",
        ),
        M::up("ALTER TABLE records ADD COLUMN updated_at INTEGER;"),
    ])
});
