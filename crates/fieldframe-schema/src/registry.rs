use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::config::RegistryConfig;
use crate::def::SchemaDef;
use crate::error::{Result, SchemaError};
use crate::schema::Schema;

const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Stream-id keyed collection of compiled schemas.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<u32, Schema>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            config,
        }
    }

    /// Register a compiled schema under its stream id.
    pub fn register(&mut self, schema: Schema) -> Result<()> {
        let stream_id = schema.stream_id();
        if self.schemas.contains_key(&stream_id) {
            return Err(SchemaError::DuplicateStreamId(stream_id));
        }
        self.schemas.insert(stream_id, schema);
        Ok(())
    }

    /// Compile and register a schema definition from a JSON string.
    pub fn register_json(&mut self, definition_json: &str) -> Result<()> {
        let schema = SchemaDef::from_json(definition_json)?.compile()?;
        self.register(schema)
    }

    /// Load schema definitions from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load schema definitions from a directory with explicit config.
    ///
    /// Only regular `*.schema.json` files are read; other entries are skipped.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        let mut loaded_schema_count = 0usize;

        let entries = std::fs::read_dir(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

        for entry in entries {
            let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let is_schema_file = file_name
                .to_ascii_lowercase()
                .ends_with(SCHEMA_FILE_SUFFIX);
            let entry_path = entry.path();
            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();

            if file_type.is_symlink() {
                if is_schema_file {
                    return Err(SchemaError::LoadFailed(format!(
                        "refusing to load schema symlink: {file_name}"
                    )));
                }
                continue;
            }
            if !file_type.is_file() || !is_schema_file {
                continue;
            }

            loaded_schema_count = loaded_schema_count.saturating_add(1);
            if loaded_schema_count > registry.config.max_schemas_from_directory {
                return Err(SchemaError::LoadFailed(format!(
                    "schema count exceeds configured max ({}): {}",
                    registry.config.max_schemas_from_directory, loaded_schema_count
                )));
            }

            let content = read_limited(&entry_path, &path_metadata, &registry.config)?;
            let schema = compile_definition(&entry_path, &content)?;

            tracing::debug!(
                file = %file_name,
                stream_id = schema.stream_id(),
                "loaded schema definition"
            );
            registry.register(schema)?;
        }

        Ok(registry)
    }

    /// Load from embedded definition strings.
    pub fn from_embedded(definitions: &[&str]) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register_json(definition)?;
        }
        Ok(registry)
    }

    /// Schema registered for a stream id, if any.
    pub fn get(&self, stream_id: u32) -> Option<&Schema> {
        self.schemas.get(&stream_id)
    }

    /// Schema registered for a stream id, or `UnknownStreamId`.
    pub fn require(&self, stream_id: u32) -> Result<&Schema> {
        self.get(stream_id)
            .ok_or(SchemaError::UnknownStreamId(stream_id))
    }

    /// Check if a stream id has a registered schema.
    pub fn has_schema(&self, stream_id: u32) -> bool {
        self.schemas.contains_key(&stream_id)
    }

    /// Get stream ids that have registered schemas.
    pub fn stream_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.schemas.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and compile a single schema definition file.
///
/// The file is read under the same `max_schema_file_size` limit that
/// directory loading applies. Unlike directory loading, a symlinked path is
/// followed since the caller named it explicitly.
pub fn load_schema_file(path: &Path, config: &RegistryConfig) -> Result<Schema> {
    let metadata = std::fs::metadata(path)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
    if !metadata.is_file() {
        return Err(SchemaError::LoadFailed(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    let content = read_limited(path, &metadata, config)?;
    compile_definition(path, &content)
}

fn compile_definition(path: &Path, content: &str) -> Result<Schema> {
    SchemaDef::from_json(content)
        .and_then(|def| def.compile())
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))
}

fn read_limited(
    entry_path: &Path,
    path_metadata: &std::fs::Metadata,
    config: &RegistryConfig,
) -> Result<String> {
    let file = std::fs::File::open(entry_path).map_err(|err| {
        SchemaError::LoadFailed(format!(
            "failed opening schema {}: {err}",
            entry_path.display()
        ))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(path_metadata, &opened_metadata) {
            return Err(SchemaError::LoadFailed(format!(
                "schema file changed during load: {}",
                entry_path.display()
            )));
        }
    }
    #[cfg(not(unix))]
    let _ = path_metadata;

    if opened_metadata.len() > config.max_schema_file_size as u64 {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large ({} bytes): {}",
            opened_metadata.len(),
            entry_path.display()
        )));
    }

    let max_bytes = config.max_schema_file_size;
    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!(
                "failed reading schema {}: {err}",
                entry_path.display()
            ))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large while reading: {}",
            entry_path.display()
        )));
    }

    Ok(content)
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
