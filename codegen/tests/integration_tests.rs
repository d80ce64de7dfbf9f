//! Integration tests for the datatier-codegen crate.

use datatier_codegen::{
    CodegenError, GENERATED_MARKER, GeneratedUnit, Generator, GeneratorConfig,
};
use quote::ToTokens;
use rusqlite::Connection;
use tempfile::TempDir;

const PARENT_CHILD: &str = r#"
CREATE TABLE Parent (
    Id INTEGER PRIMARY KEY NOT NULL,
    Name TEXT NOT NULL
);
CREATE TABLE Child (
    Id INTEGER PRIMARY KEY NOT NULL,
    ParentId INTEGER REFERENCES Parent(Id),
    Label NVARCHAR(40),
    Weight NUMERIC,
    CreatedAt DATETIME NOT NULL
);
"#;

fn database(sql: &str) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(sql).unwrap();
    conn
}

fn unformatted() -> GeneratorConfig {
    GeneratorConfig {
        format: false,
        ..GeneratorConfig::default()
    }
}

fn unit<'a>(units: &'a [GeneratedUnit], table: &str) -> &'a GeneratedUnit {
    units
        .iter()
        .find(|u| u.table == table)
        .unwrap_or_else(|| panic!("no unit for {table}"))
}

/// `(method name, return type)` for every inherent method of `type_name`.
fn inherent_methods(source: &str, type_name: &str) -> Vec<(String, String)> {
    let file = syn::parse_file(source).unwrap();
    let mut methods = Vec::new();
    for item in file.items {
        let syn::Item::Impl(imp) = item else { continue };
        if imp.trait_.is_some() || imp.self_ty.to_token_stream().to_string() != type_name {
            continue;
        }
        for item in imp.items {
            if let syn::ImplItem::Fn(f) = item {
                let output: String = f
                    .sig
                    .output
                    .to_token_stream()
                    .to_string()
                    .split_whitespace()
                    .collect();
                methods.push((f.sig.ident.to_string(), output));
            }
        }
    }
    methods
}

/// `(field name, type)` of the struct `type_name`.
fn struct_fields(source: &str, type_name: &str) -> Vec<(String, String)> {
    let file = syn::parse_file(source).unwrap();
    for item in file.items {
        if let syn::Item::Struct(s) = item {
            if s.ident == type_name {
                return s
                    .fields
                    .iter()
                    .map(|f| {
                        let ty: String = f.ty.to_token_stream().to_string().split_whitespace().collect();
                        (f.ident.as_ref().unwrap().to_string(), ty)
                    })
                    .collect();
            }
        }
    }
    panic!("struct {type_name} not found");
}

#[test]
fn test_parent_child_end_to_end() {
    let generation = Generator::new(unformatted())
        .generate(&database(PARENT_CHILD))
        .unwrap();

    let parent = unit(&generation.units, "Parent");
    let child = unit(&generation.units, "Child");
    assert_eq!(parent.file_name, "parent.rs");
    assert_eq!(child.file_name, "child.rs");

    let parent_methods = inherent_methods(&parent.source, "Parent");
    let (name, output) = &parent_methods[0];
    assert_eq!(name, "fk_child");
    assert_eq!(
        output,
        "->datatier_sqlite::Result<datatier_sqlite::Selection<'c,super::child::Child>>"
    );

    let child_methods = inherent_methods(&child.source, "Child");
    let (name, output) = &child_methods[0];
    assert_eq!(name, "fk_parent");
    assert_eq!(
        output,
        "->datatier_sqlite::Result<::std::option::Option<super::parent::Parent>>"
    );

    let names: Vec<_> = child_methods.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["fk_parent", "add_update", "insert", "update", "delete"]);
}

#[test]
fn test_field_types_follow_declared_types() {
    let generation = Generator::new(unformatted())
        .generate(&database(PARENT_CHILD))
        .unwrap();
    let child = unit(&generation.units, "Child");

    let fields = struct_fields(&child.source, "Child");
    assert_eq!(
        fields,
        vec![
            ("id".to_string(), "i64".to_string()),
            ("parent_id".to_string(), "::std::option::Option<i64>".to_string()),
            ("label".to_string(), "::std::option::Option<::std::string::String>".to_string()),
            ("weight".to_string(), "::std::option::Option<f64>".to_string()),
            ("created_at".to_string(), "datatier_sqlite::chrono::NaiveDateTime".to_string()),
        ]
    );
}

#[test]
fn test_required_parent_uses_strict_lookup() {
    let generation = Generator::new(unformatted())
        .generate(&database(
            "CREATE TABLE Genres (GenreId INTEGER PRIMARY KEY NOT NULL, Name TEXT);
             CREATE TABLE Tracks (
                 TrackId INTEGER PRIMARY KEY NOT NULL,
                 GenreId INTEGER NOT NULL REFERENCES Genres
             );",
        ))
        .unwrap();

    let tracks = unit(&generation.units, "Tracks");
    let methods = inherent_methods(&tracks.source, "Tracks");
    assert_eq!(methods[0].0, "fk_genres");
    assert_eq!(methods[0].1, "->datatier_sqlite::Result<super::genres::Genres>");

    let compact: String = tracks.source.split_whitespace().collect();
    assert!(compact.contains("scalar_strict(ctx,&[(\"GenreId\",datatier_sqlite::Value::from(self.genre_id))])"));
}

#[test]
fn test_reference_spelling_does_not_leak_into_accessors() {
    let generation = Generator::new(unformatted())
        .generate(&database(
            "CREATE TABLE MediaTypes (Id INTEGER PRIMARY KEY NOT NULL, Name TEXT);
             CREATE TABLE Tracks (
                 TrackId INTEGER PRIMARY KEY NOT NULL,
                 MediaTypeId INTEGER NOT NULL REFERENCES MEDIATYPES(Id)
             );",
        ))
        .unwrap();

    let media_types = unit(&generation.units, "MediaTypes");
    assert_eq!(media_types.file_name, "media_types.rs");
    assert_eq!(media_types.type_name, "MediaTypes");
    assert_eq!(generation.schema.foreign_keys[0].target_table, "MediaTypes");

    let tracks = unit(&generation.units, "Tracks");
    let methods = inherent_methods(&tracks.source, "Tracks");
    assert_eq!(methods[0].0, "fk_media_types");
    assert_eq!(
        methods[0].1,
        "->datatier_sqlite::Result<super::media_types::MediaTypes>"
    );

    let methods = inherent_methods(&media_types.source, "MediaTypes");
    assert_eq!(methods[0].0, "fk_tracks");
}

#[test]
fn test_composite_foreign_key_passes_every_predicate() {
    let generation = Generator::new(unformatted())
        .generate(&database(
            "CREATE TABLE Orders (Region TEXT NOT NULL, Number INTEGER NOT NULL, PRIMARY KEY (Region, Number));
             CREATE TABLE Lines (
                 Id INTEGER PRIMARY KEY NOT NULL,
                 OrderRegion TEXT NOT NULL,
                 OrderNumber INTEGER NOT NULL,
                 FOREIGN KEY (OrderRegion, OrderNumber) REFERENCES Orders(Region, Number)
             );",
        ))
        .unwrap();

    let orders: String = unit(&generation.units, "Orders").source.split_whitespace().collect();
    assert!(orders.contains(
        "collection(ctx,&[(\"OrderRegion\",datatier_sqlite::Value::from(self.region.clone())),(\"OrderNumber\",datatier_sqlite::Value::from(self.number))])"
    ));
    assert!(orders.contains("constKEY_FIELDS:&'static[&'staticstr]=&[\"Region\",\"Number\"]"));
}

#[test]
fn test_reserved_and_excluded_tables_are_not_emitted() {
    let conn = database(
        "CREATE TABLE Counters (Id INTEGER PRIMARY KEY AUTOINCREMENT, Label TEXT);
         INSERT INTO Counters (Label) VALUES ('x');
         CREATE TABLE Scratch (Id INTEGER PRIMARY KEY);",
    );
    let config = GeneratorConfig {
        exclude: vec!["scratch".to_string()],
        ..unformatted()
    };

    let generation = Generator::new(config).generate(&conn).unwrap();
    let tables: Vec<_> = generation.units.iter().map(|u| u.table.as_str()).collect();
    assert_eq!(tables, vec!["Counters"]);
    assert!(generation.schema.table("Sqlite_sequence").is_none());
}

#[test]
fn test_unsupported_type_is_reported() {
    let err = Generator::new(unformatted())
        .generate(&database("CREATE TABLE Files (Id INTEGER PRIMARY KEY, Data BLOB);"))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unsupported type 'BLOB' for column 'Files.Data'"
    );
}

#[test]
fn test_written_files_parse_and_carry_marker() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("data");
    let written = Generator::new(unformatted())
        .run(&database(PARENT_CHILD), &out, false)
        .unwrap();

    assert_eq!(written.len(), 3);
    for path in &written {
        let source = std::fs::read_to_string(path).unwrap();
        assert!(source.starts_with(GENERATED_MARKER), "{}", path.display());
        syn::parse_file(&source).unwrap();
    }

    let index = std::fs::read_to_string(out.join("mod.rs")).unwrap();
    let compact: String = index.split_whitespace().collect();
    assert!(compact.contains("pubmodchild;pubmodparent;"));
    assert!(compact.contains("pubfnregistry()->datatier_sqlite::Registry"));
}

#[test]
fn test_clean_replaces_stale_units() {
    let temp = TempDir::new().unwrap();
    let stale = temp.path().join("dropped_table.rs");
    std::fs::write(&stale, format!("{GENERATED_MARKER} from table \"Dropped\".\n")).unwrap();
    let manual = temp.path().join("extensions.rs");
    std::fs::write(&manual, "pub fn helper() {}\n").unwrap();

    Generator::new(unformatted())
        .run(&database(PARENT_CHILD), temp.path(), true)
        .unwrap();

    assert!(!stale.exists());
    assert!(manual.exists());
    assert!(temp.path().join("parent.rs").exists());
}

#[test]
fn test_custom_runtime_path() {
    let config = GeneratorConfig {
        runtime_crate: "crate::db".to_string(),
        emit_module_index: false,
        ..unformatted()
    };
    let generation = Generator::new(config)
        .generate(&database(PARENT_CHILD))
        .unwrap();

    let parent = unit(&generation.units, "Parent");
    let compact: String = parent.source.split_whitespace().collect();
    assert!(compact.contains("implcrate::db::EntityforParent"));
    assert!(!compact.contains("datatier_sqlite"));
}

#[test]
fn test_not_ready_connection_is_introspection_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("not-a-db.sqlite");
    std::fs::write(&path, b"this is not a sqlite file, just some bytes padded out to look big enough")
        .unwrap();
    let conn = Connection::open(&path).unwrap();

    let err = Generator::new(unformatted()).generate(&conn).unwrap_err();
    assert!(matches!(err, CodegenError::Introspection(_)));
}
