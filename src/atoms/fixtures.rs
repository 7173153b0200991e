//! # Fixture Database
//!
//! - `(db-reset)`: empties every non-ignored table, returns how many
//! - `(db-connect)`: opens the configured database, returns true

use crate::atoms::helpers::check_arity;
use crate::atoms::{Atom, AtomRegistry, StatefulAtomFn};
use crate::database::DatabaseError;
use crate::errors::{ErrorKind, Failure};
use crate::runtime::{Interpreter, Value};

fn database_failure(interp: &Interpreter, err: DatabaseError) -> Failure {
    let kind = match err {
        DatabaseError::NotConfigured => ErrorKind::RuntimeError,
        DatabaseError::UnsupportedScheme(_) => ErrorKind::ArgumentError,
        DatabaseError::Sqlite(_) => ErrorKind::IOError,
    };
    interp.raise(kind, err.to_string())
}

pub const ATOM_DB_RESET: StatefulAtomFn = |args, interp| {
    check_arity("db-reset", args, 0).map_err(|raise| interp.raise_from(raise))?;
    match interp.database.reset() {
        Ok(tables) => Ok(Value::Int(tables as i64)),
        Err(err) => Err(database_failure(interp, err)),
    }
};

pub const ATOM_DB_CONNECT: StatefulAtomFn = |args, interp| {
    check_arity("db-connect", args, 0).map_err(|raise| interp.raise_from(raise))?;
    let connected = interp.database.connect().map(|_| ());
    match connected {
        Ok(()) => Ok(Value::Bool(true)),
        Err(err) => Err(database_failure(interp, err)),
    }
};

pub fn register_fixture_atoms(registry: &mut AtomRegistry) {
    registry.register("db-reset", Atom::Stateful(ATOM_DB_RESET));
    registry.register("db-connect", Atom::Stateful(ATOM_DB_CONNECT));
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::{DatabaseConfig, RunConfig};
    use crate::report::Reporter;

    #[test]
    fn test_db_reset_without_url_is_runtime_error() {
        let (reporter, _) = Reporter::captured();
        let mut interp = Interpreter::new(&RunConfig::default(), reporter);
        let failure = interp
            .eval_source(Path::new("t.ist"), "(db-reset)", "<main>")
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::RuntimeError);
    }

    #[test]
    fn test_db_reset_from_a_prepare_action() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.db");
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE users (id INTEGER); INSERT INTO users VALUES (1);")
            .unwrap();

        let config = RunConfig {
            database: DatabaseConfig {
                url: Some(format!("sqlite://{}", path.display())),
                ignore_tables: vec![],
            },
            ..RunConfig::default()
        };
        let (reporter, _) = Reporter::captured();
        let mut interp = Interpreter::new(&config, reporter);
        interp
            .eval_source(
                Path::new("t.ist"),
                "(define resets 0)\n(prepare (set! resets (db-reset)))\n(test \"t\" (assert-equal 1 resets))",
                "<main>",
            )
            .unwrap();
    }
}
