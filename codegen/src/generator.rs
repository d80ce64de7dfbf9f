//! End-to-end generation: introspect, emit, write.

use std::path::PathBuf;

use datatier_core::Schema;
use datatier_sqlite::Introspector;
use rusqlite::Connection;
use tracing::info;

use crate::config::GeneratorConfig;
use crate::emitter::{GeneratedUnit, ModuleIndex, emit_all, emit_module_index};
use crate::error::Result;
use crate::sink::OutputSink;

/// Everything one run produces, held in memory until written.
#[derive(Debug, Clone)]
pub struct Generation {
    pub schema: Schema,
    pub units: Vec<GeneratedUnit>,
    pub index: Option<ModuleIndex>,
}

/// Drives a generation run from a configuration.
///
/// # Examples
///
/// ```no_run
/// use datatier_codegen::{Generator, GeneratorConfig};
/// use rusqlite::Connection;
///
/// let conn = Connection::open("chinook.db").unwrap();
/// let written = Generator::new(GeneratorConfig::default())
///     .run(&conn, "src/data", true)
///     .unwrap();
/// println!("wrote {} files", written.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Introspects `conn` and drops the configured exclusions.
    ///
    /// Foreign keys touching an excluded table stay in the schema; the
    /// emitter skips them because their other side is not generated.
    ///
    /// # Errors
    ///
    /// Returns [`Introspection`](crate::CodegenError::Introspection) if the
    /// connection is not ready or a metadata query fails.
    pub fn introspect(&self, conn: &Connection) -> Result<Schema> {
        let mut schema = Introspector::new(conn)
            .reserved_prefix(self.config.reserved_prefix.clone())
            .run()?;
        schema.tables.retain(|table| {
            let excluded = self.config.is_excluded(&table.name);
            if excluded {
                info!(table = %table.name, "table excluded by configuration");
            }
            !excluded
        });
        Ok(schema)
    }

    /// Introspects and emits every unit without touching the file system.
    ///
    /// # Errors
    ///
    /// Any introspection or emission error; see
    /// [`emit_all`](crate::emit_all).
    pub fn generate(&self, conn: &Connection) -> Result<Generation> {
        let schema = self.introspect(conn)?;
        let options = self.config.emit_options();
        let units = emit_all(&schema, &options)?;
        let index = if self.config.emit_module_index {
            Some(emit_module_index(&units, &options)?)
        } else {
            None
        };
        Ok(Generation {
            schema,
            units,
            index,
        })
    }

    /// Writes a finished generation into `sink`, returning the written paths
    /// in emission order (module index last).
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CodegenError::IoError) on any file-system
    /// failure.
    pub fn write(&self, generation: &Generation, sink: &OutputSink, clean: bool) -> Result<Vec<PathBuf>> {
        sink.prepare(clean)?;
        let mut written = Vec::with_capacity(generation.units.len() + 1);
        for unit in &generation.units {
            written.push(sink.write(&unit.file_name, &unit.source)?);
        }
        if let Some(index) = &generation.index {
            written.push(sink.write(&index.file_name, &index.source)?);
        }
        info!(
            files = written.len(),
            dir = %sink.dir().display(),
            "wrote generated sources"
        );
        Ok(written)
    }

    /// [`generate`](Self::generate) followed by [`write`](Self::write).
    pub fn run(&self, conn: &Connection, output: impl Into<PathBuf>, clean: bool) -> Result<Vec<PathBuf>> {
        let generation = self.generate(conn)?;
        self.write(&generation, &OutputSink::new(output), clean)
    }
}
