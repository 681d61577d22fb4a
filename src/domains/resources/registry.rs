//! Resource Registry - central registration of all resources.
//!
//! This module provides dynamic resource registration without modifying service.rs.
//! When adding a new resource:
//! 1. Create the resource file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_resources()`

use rmcp::model::{AnnotateAble, RawResource};

use super::definitions::{
    MaizeLayersResource, RegionBoundsResource, ResourceDefinition, ServerInfoResource,
    WheatLayersResource,
};
use super::service::ResourceEntry;

/// Helper function to create an annotated resource from a definition.
fn build_resource<R: ResourceDefinition>() -> ResourceEntry {
    let mut raw = RawResource::new(R::URI, R::NAME);
    raw.description = Some(R::DESCRIPTION.to_string());
    raw.mime_type = Some(R::MIME_TYPE.to_string());

    ResourceEntry {
        resource: raw.no_annotation(),
        content: R::content(),
    }
}

/// Get all registered resources as ResourceEntries.
///
/// When adding a new resource, add it here.
pub fn get_all_resources() -> Vec<ResourceEntry> {
    vec![
        build_resource::<RegionBoundsResource>(),
        build_resource::<ServerInfoResource>(),
        build_resource::<WheatLayersResource>(),
        build_resource::<MaizeLayersResource>(),
    ]
}

/// Get the list of all resource URIs.
pub fn resource_uris() -> Vec<&'static str> {
    vec![
        RegionBoundsResource::URI,
        ServerInfoResource::URI,
        WheatLayersResource::URI,
        MaizeLayersResource::URI,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_resources() {
        let resources = get_all_resources();
        assert_eq!(resources.len(), 4);

        let uris: Vec<_> = resources
            .iter()
            .map(|r| r.resource.raw.uri.as_str())
            .collect();
        assert!(uris.contains(&"advisory://region/bounds"));
        assert!(uris.contains(&"advisory://server/info"));
        assert!(uris.contains(&"advisory://layers/wheat"));
        assert!(uris.contains(&"advisory://layers/maize"));
    }

    #[test]
    fn test_resource_uris_match_entries() {
        let uris = resource_uris();
        let entries = get_all_resources();
        assert_eq!(uris.len(), entries.len());
        for entry in &entries {
            assert!(uris.contains(&entry.resource.raw.uri.as_str()));
        }
    }
}
