//! Model Graph UseCase

use datamigrator_source::SourceStore;
use std::sync::Arc;

use crate::config::ModelGraphConfig;
use crate::errors::Result;
use crate::features::metamodel::{Metamodel, MetamodelDefinition};
use crate::features::model_graph::domain::ModelGraph;
use crate::features::model_graph::infrastructure::{ModelGraphBuilder, SnapshotEntityImporter};
use crate::features::model_graph::ports::EntityImporter;

/// Model Graph UseCase Trait
pub trait ModelGraphUseCase: Send + Sync {
    /// Build the graph of `source` for an already validated metamodel
    fn build_model_graph(
        &self,
        metamodel: Arc<Metamodel>,
        source: &dyn SourceStore,
    ) -> Result<ModelGraph>;

    /// Build from a declarative metamodel definition
    fn build_from_definition(
        &self,
        definition: MetamodelDefinition,
        source: &dyn SourceStore,
    ) -> Result<ModelGraph> {
        let metamodel = definition.into_metamodel()?;
        self.build_model_graph(Arc::new(metamodel), source)
    }
}

/// Model Graph UseCase Implementation
#[derive(Debug)]
pub struct ModelGraphUseCaseImpl {
    builder: ModelGraphBuilder,
}

impl ModelGraphUseCaseImpl {
    /// Snapshot importer with the given configuration
    pub fn new(config: ModelGraphConfig) -> Self {
        Self::with_importer(config, SnapshotEntityImporter::new())
    }

    pub fn with_importer(config: ModelGraphConfig, importer: impl EntityImporter + 'static) -> Self {
        Self {
            builder: ModelGraphBuilder::new(importer).with_config(config),
        }
    }

    pub fn config(&self) -> &ModelGraphConfig {
        self.builder.config()
    }
}

impl Default for ModelGraphUseCaseImpl {
    fn default() -> Self {
        Self::new(ModelGraphConfig::default())
    }
}

impl ModelGraphUseCase for ModelGraphUseCaseImpl {
    fn build_model_graph(
        &self,
        metamodel: Arc<Metamodel>,
        source: &dyn SourceStore,
    ) -> Result<ModelGraph> {
        self.builder.build(metamodel, source)
    }
}
