//! Registry of the tables the backend persists.
//!
//! Dynamic SQL only ever interpolates names taken from this registry; values
//! always travel as bind parameters. Column names outside a table's registered
//! set are rejected before any SQL is built.

/// Static description of one tracked table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub id_column: &'static str,
    /// Every column the table carries, id included. Rows served by a store
    /// always hold this full set, absent values as `Null`.
    pub columns: &'static [&'static str],
    /// Columns carrying a UNIQUE constraint.
    pub unique_columns: &'static [&'static str],
}

impl TableSpec {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| *column == name)
    }
}

/// User accounts; the only table the credential subsystem touches.
pub const USUARIO: &str = "usuario";

pub const TABLES: &[TableSpec] = &[
    TableSpec {
        name: "punto_ruta",
        id_column: "id_punto",
        columns: &["id_punto", "id_ruta", "lat", "lng", "orden"],
        unique_columns: &[],
    },
    TableSpec {
        name: "rastreo",
        id_column: "id_rastreo",
        columns: &["id_rastreo", "id_vehiculo", "lat", "lng", "registrado_en"],
        unique_columns: &[],
    },
    TableSpec {
        name: "ruta",
        id_column: "id_ruta",
        columns: &["id_ruta", "nombre", "activa"],
        unique_columns: &[],
    },
    TableSpec {
        name: "u_tipo",
        id_column: "id_tipo",
        columns: &["id_tipo", "descripcion"],
        unique_columns: &[],
    },
    TableSpec {
        name: USUARIO,
        id_column: "id_u",
        columns: &[
            "id_u",
            "nombre",
            "ap_pat",
            "ap_mat",
            "email",
            "password",
            "n_tel",
            "id_tipo",
            "id_vehiculo",
            "password_changed_at",
        ],
        unique_columns: &["email"],
    },
    TableSpec {
        name: "vehiculo",
        id_column: "id_vehiculo",
        columns: &["id_vehiculo", "placa", "modelo", "capacidad"],
        unique_columns: &[],
    },
];

pub fn spec(table: &str) -> Option<&'static TableSpec> {
    TABLES.iter().find(|t| t.name == table)
}

/// Names woven into SQL must be plain identifiers; the registry test below
/// holds every registered column to it.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
