use crate::document::PolicyDocument;
use crate::error::{PolicyStoreError, Result};
use crate::store::MemoryPolicyStore;
use std::path::Path;
use tracing::{debug, info};

/// Load policy documents from YAML files
pub struct PolicyLoader;

impl PolicyLoader {
    /// Load a single policy document from a YAML file
    pub fn load_document_from_file(path: &Path) -> Result<PolicyDocument> {
        debug!("Loading policy document from: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        PolicyDocument::from_yaml(&content)
    }

    /// Load and merge every `.yaml`/`.yml` file in `dir`, in file name order.
    ///
    /// The merged document is validated before it is returned.
    pub fn load_document_from_directory(dir: &Path) -> Result<PolicyDocument> {
        info!("Loading policies from directory: {:?}", dir);

        if !dir.is_dir() {
            return Err(PolicyStoreError::MissingDirectory(
                dir.display().to_string(),
            ));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(extension) = path.extension() {
                if extension == "yaml" || extension == "yml" {
                    paths.push(path);
                }
            }
        }
        paths.sort();

        let mut document = PolicyDocument::default();
        for path in &paths {
            document.merge(Self::load_document_from_file(path)?)?;
        }
        document.validate()?;

        info!("Loaded {} policy files", paths.len());
        Ok(document)
    }

    /// Build a store from a policy directory
    pub fn load_store_from_directory(dir: &Path) -> Result<MemoryPolicyStore> {
        MemoryPolicyStore::from_document(Self::load_document_from_directory(dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authz::storage::PolicyStorage;
    use std::fs;
    use tempfile::TempDir;

    fn write_policies(dir: &Path) {
        fs::write(
            dir.join("roles.yaml"),
            r#"
roles:
  - id: editor
    permission_rules: [bookEditing]
"#,
        )
        .unwrap();
        fs::write(
            dir.join("rules.yml"),
            r#"
permission_rules:
  - id: bookEditing
    rule_parts:
      - type: action
        values: [system.update]
"#,
        )
        .unwrap();
        fs::write(dir.join("README.md"), "not a policy").unwrap();
    }

    #[test]
    fn test_load_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_policies(temp_dir.path());

        let document = PolicyLoader::load_document_from_directory(temp_dir.path()).unwrap();
        assert_eq!(document.roles.len(), 1);
        assert_eq!(document.permission_rules.len(), 1);
    }

    #[test]
    fn test_load_store() {
        let temp_dir = TempDir::new().unwrap();
        write_policies(temp_dir.path());

        let store = PolicyLoader::load_store_from_directory(temp_dir.path()).unwrap();
        assert!(store.read_role("editor").is_ok());
        assert!(store.read_permission_rule("bookEditing").is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let result = PolicyLoader::load_document_from_directory(Path::new("/nonexistent/policies"));
        assert!(matches!(result, Err(PolicyStoreError::MissingDirectory(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.yaml"), "roles: [ {id: ").unwrap();

        let result = PolicyLoader::load_document_from_directory(temp_dir.path());
        assert!(matches!(result, Err(PolicyStoreError::YamlParsing(_))));
    }

    #[test]
    fn test_dangling_link_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("roles.yaml"),
            "roles:\n  - id: editor\n    permission_rules: [ghost]\n",
        )
        .unwrap();

        let result = PolicyLoader::load_document_from_directory(temp_dir.path());
        assert!(matches!(result, Err(PolicyStoreError::Validation(_))));
    }

    #[test]
    fn test_duplicate_across_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.yaml"), "roles:\n  - id: editor\n").unwrap();
        fs::write(temp_dir.path().join("b.yaml"), "roles:\n  - id: editor\n").unwrap();

        let result = PolicyLoader::load_document_from_directory(temp_dir.path());
        assert!(matches!(result, Err(PolicyStoreError::DuplicateId { .. })));
    }
}
