// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Marshaller: shared context and public entry points.

use crate::config::{PortableConfig, TypeConfiguration};
use crate::descriptor::FieldDescriptor;
use crate::error::Result;
use crate::ids::{IdMapper, LowerCaseFnvMapper};
use crate::object::BinaryObject;
use crate::portable::Portable;
use crate::record::Record;
use crate::registry::{MetadataHandler, MetadataRegistry, NoopMetadataHandler};
use crate::schema::SchemaCache;
use crate::writer::ObjectWriter;
use std::sync::Arc;

/// State shared by a marshaller and every object and writer it creates.
pub(crate) struct PortableContext {
    config: PortableConfig,
    mapper: Arc<dyn IdMapper>,
    registry: MetadataRegistry,
    schemas: SchemaCache,
}

impl PortableContext {
    pub(crate) fn config(&self) -> &PortableConfig {
        &self.config
    }

    pub(crate) fn mapper(&self) -> &dyn IdMapper {
        self.mapper.as_ref()
    }

    pub(crate) fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub(crate) fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }
}

/// Entry point for writing and reading portable objects.
///
/// Cheap to clone; clones share metadata and caches.
///
/// # Example
///
/// ```rust
/// use portable::PortableMarshaller;
///
/// # fn main() -> portable::Result<()> {
/// let marshaller = PortableMarshaller::new();
///
/// let mut writer = marshaller.writer("Point");
/// writer.write("x", 1i32)?.write("y", 2i32)?;
/// let point = writer.finish()?;
///
/// let restored = marshaller.to_binary(point.bytes().to_vec())?;
/// assert_eq!(restored.value_as::<i32>("y")?, Some(2));
/// assert!(!restored.exists("z")?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PortableMarshaller {
    ctx: Arc<PortableContext>,
}

impl PortableMarshaller {
    /// Marshaller with default configuration and no metadata handler.
    pub fn new() -> Self {
        Self::from_parts(
            PortableConfig::default(),
            Arc::new(LowerCaseFnvMapper),
            Arc::new(NoopMetadataHandler),
        )
    }

    pub fn builder() -> PortableMarshallerBuilder {
        PortableMarshallerBuilder::default()
    }

    fn from_parts(
        config: PortableConfig,
        mapper: Arc<dyn IdMapper>,
        handler: Arc<dyn MetadataHandler>,
    ) -> Self {
        let schemas = SchemaCache::new(config.schema_cache_capacity);
        Self {
            ctx: Arc::new(PortableContext {
                config,
                mapper,
                registry: MetadataRegistry::new(handler),
                schemas,
            }),
        }
    }

    /// Writer for a new object of `type_name`.
    pub fn writer(&self, type_name: &str) -> ObjectWriter {
        ObjectWriter::new(Arc::clone(&self.ctx), type_name)
    }

    /// Serialize a typed value.
    pub fn marshal<T: Portable>(&self, value: &T) -> Result<BinaryObject> {
        let mut writer = self.writer(T::TYPE_NAME);
        value.write_portable(&mut writer)?;
        writer.finish()
    }

    /// Serialize a dynamic record, fields in record order.
    pub fn marshal_record(&self, record: &Record) -> Result<BinaryObject> {
        let mut writer = self.writer(record.type_name());
        for (name, value) in record.fields() {
            writer.write(name, value.clone())?;
        }
        writer.finish()
    }

    /// Validate `bytes` and read a typed value from them.
    pub fn unmarshal<T: Portable>(&self, bytes: impl Into<Arc<[u8]>>) -> Result<T> {
        self.to_binary(bytes)?.deserialize_as::<T>()
    }

    /// Validate `bytes` and wrap them in a lazy object handle.
    pub fn to_binary(&self, bytes: impl Into<Arc<[u8]>>) -> Result<BinaryObject> {
        BinaryObject::from_bytes(Arc::clone(&self.ctx), bytes.into())
    }

    /// Reusable accessor for `field_name` of `type_name`.
    pub fn field_descriptor(&self, type_name: &str, field_name: &str) -> FieldDescriptor {
        let type_id = self.ctx.mapper().type_id(type_name);
        let field_id = self.ctx.mapper().field_id(type_id, field_name);
        FieldDescriptor::new(type_id, field_id, field_name)
    }

    /// Id of `type_name` under the configured mapper.
    pub fn type_id(&self, type_name: &str) -> u32 {
        self.ctx.mapper().type_id(type_name)
    }

    /// Id of `field_name` in `type_name` under the configured mapper.
    pub fn field_id(&self, type_name: &str, field_name: &str) -> u32 {
        let type_id = self.type_id(type_name);
        self.ctx.mapper().field_id(type_id, field_name)
    }

    pub fn registry(&self) -> &MetadataRegistry {
        self.ctx.registry()
    }

    pub fn schema_cache(&self) -> &SchemaCache {
        self.ctx.schemas()
    }

    pub fn config(&self) -> &PortableConfig {
        self.ctx.config()
    }
}

impl Default for PortableMarshaller {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PortableMarshaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortableMarshaller")
            .field("config", &self.ctx.config)
            .field("registry", &self.ctx.registry)
            .field("schemas", &self.ctx.schemas)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PortableMarshaller`].
#[derive(Default)]
pub struct PortableMarshallerBuilder {
    config: Option<PortableConfig>,
    type_configs: Vec<TypeConfiguration>,
    mapper: Option<Arc<dyn IdMapper>>,
    handler: Option<Arc<dyn MetadataHandler>>,
}

impl PortableMarshallerBuilder {
    /// Replace the whole configuration.
    pub fn with_config(mut self, config: PortableConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a YAML file.
    #[cfg(feature = "config-loaders")]
    pub fn with_config_file<P: AsRef<std::path::Path>>(self, path: P) -> Result<Self> {
        let config = crate::config::TypeConfigLoader::load_from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Add one type configuration on top of the base configuration.
    pub fn with_type_configuration(mut self, config: TypeConfiguration) -> Self {
        self.type_configs.push(config);
        self
    }

    pub fn with_id_mapper(mut self, mapper: Arc<dyn IdMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Metadata sink/source, e.g. an `Arc<InMemoryMetadataHandler>` shared
    /// between marshallers.
    pub fn with_metadata_handler(mut self, handler: Arc<dyn MetadataHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<PortableMarshaller> {
        let mut config = self.config.unwrap_or_default();
        for type_config in self.type_configs {
            config.types.add(type_config)?;
        }
        config.validate()?;

        Ok(PortableMarshaller::from_parts(
            config,
            self.mapper.unwrap_or_else(|| Arc::new(LowerCaseFnvMapper)),
            self.handler.unwrap_or_else(|| Arc::new(NoopMetadataHandler)),
        ))
    }
}
