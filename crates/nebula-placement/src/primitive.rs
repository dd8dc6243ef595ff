use std::sync::Arc;

use crate::feature::{ConfiguredFeature, Feature};
use crate::key::ContentKey;
use crate::overrides::OverrideEntry;
use crate::structure::{ConfiguredStructure, Structure};

/// A resolved unit of generatable content.
#[derive(Clone)]
pub enum GenerationPrimitive {
    /// Hand-authored entry from the override catalog.
    CustomOverride(Arc<OverrideEntry>),
    /// Bare structure type, not yet bound to a configuration.
    Structure(Arc<dyn Structure>),
    ConfiguredStructure(Arc<ConfiguredStructure>),
    /// Bare feature type, not yet bound to a configuration.
    Feature(Arc<dyn Feature>),
    ConfiguredFeature(Arc<ConfiguredFeature>),
}

impl GenerationPrimitive {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CustomOverride(_) => "override",
            Self::Structure(_) => "structure",
            Self::ConfiguredStructure(_) => "configured_structure",
            Self::Feature(_) => "feature",
            Self::ConfiguredFeature(_) => "configured_feature",
        }
    }

    /// Key of the underlying type (or of the override entry).
    pub fn type_key(&self) -> &ContentKey {
        match self {
            Self::CustomOverride(entry) => entry.key(),
            Self::Structure(ty) => ty.key(),
            Self::ConfiguredStructure(c) => c.structure.key(),
            Self::Feature(ty) => ty.key(),
            Self::ConfiguredFeature(c) => c.feature.key(),
        }
    }
}

impl std::fmt::Debug for GenerationPrimitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind(), self.type_key())
    }
}
