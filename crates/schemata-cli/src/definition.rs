//! Type definition files.
//!
//! ```toml
//! [[types]]
//! name = "person"
//! addFields = [
//!   { name = "title", type = "string", required = true },
//!   { name = "born", type = "date" },
//! ]
//!
//! [[types]]
//! name = "author"
//! extends = "person"
//! addFields = [{ name = "_books", type = "joinByArray", withType = "book", idsField = "bookIds" }]
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use schemata_schema::{ComposeSpec, Schema, Schemas};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

/// One content type: composition options, optionally refining another type's schema.
#[derive(Debug, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(flatten)]
    pub compose: ComposeSpec,
}

impl Definition {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read definition file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid definition file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let definition: Definition = toml::from_str(content)?;
        let mut seen: Vec<&str> = Vec::new();
        for ty in &definition.types {
            if seen.contains(&ty.name.as_str()) {
                bail!("Type \"{}\" is defined more than once", ty.name);
            }
            seen.push(ty.name.as_str());
        }
        Ok(definition)
    }

    /// Composes every type, parents before the types extending them. The result keeps
    /// definition order.
    pub fn compose_all(&self, schemas: &Schemas) -> Result<IndexMap<String, Schema>> {
        let by_name: HashMap<&str, &TypeDefinition> =
            self.types.iter().map(|ty| (ty.name.as_str(), ty)).collect();
        let mut composed: HashMap<String, Schema> = HashMap::new();
        for ty in &self.types {
            compose_type(ty, &by_name, schemas, &mut composed, &mut Vec::new())?;
        }
        Ok(self
            .types
            .iter()
            .filter_map(|ty| composed.remove_entry(&ty.name))
            .collect())
    }
}

fn compose_type<'d>(
    ty: &'d TypeDefinition,
    by_name: &HashMap<&str, &'d TypeDefinition>,
    schemas: &Schemas,
    composed: &mut HashMap<String, Schema>,
    visiting: &mut Vec<&'d str>,
) -> Result<()> {
    if composed.contains_key(&ty.name) {
        return Ok(());
    }
    if visiting.contains(&ty.name.as_str()) {
        bail!("Type \"{}\" extends itself through {}", ty.name, visiting.join(" -> "));
    }
    visiting.push(ty.name.as_str());

    let schema = match ty.extends.as_deref() {
        Some(parent) => {
            let parent_def = by_name
                .get(parent)
                .with_context(|| format!("Type \"{}\" extends unknown type \"{parent}\"", ty.name))?;
            compose_type(parent_def, by_name, schemas, composed, visiting)?;
            let parent_schema = composed
                .get(parent)
                .with_context(|| format!("Type \"{parent}\" was not composed"))?;
            schemas.refine(parent_schema, &ty.compose)
        }
        None => schemas.compose(&ty.compose),
    }
    .with_context(|| format!("Failed to compose type \"{}\"", ty.name))?;

    visiting.pop();
    composed.insert(ty.name.clone(), schema);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use schemata_db_memory::MemoryManagers;

    use super::*;

    const LIBRARY: &str = r#"
[[types]]
name = "author"
extends = "person"
addFields = [{ name = "_books", type = "joinByArray", withType = "book", idsField = "bookIds" }]
removeFields = ["born"]

[[types]]
name = "person"
addFields = [
  { name = "title", type = "string", required = true },
  { name = "born", type = "date" },
  { name = "rating", type = "integer", min = 1, max = 5 },
]
groupFields = [{ name = "basics", label = "Basics", fields = ["title", "rating"] }]
"#;

    fn schemas() -> Schemas {
        let managers: Arc<MemoryManagers> = MemoryManagers::new();
        Schemas::builder(managers).build()
    }

    fn names(schema: &Schema) -> Vec<&str> {
        schema.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_compose_with_extends() {
        let definition = Definition::parse(LIBRARY).unwrap();
        let types = definition.compose_all(&schemas()).unwrap();

        assert_eq!(types.keys().collect::<Vec<_>>(), ["author", "person"]);
        assert_eq!(names(&types["person"]), ["basics", "born", "title", "rating"]);
        let author = &types["author"];
        assert!(names(author).contains(&"_books"));
        assert!(!names(author).contains(&"born"));
        let rating = author.iter().find(|f| f.name == "rating").unwrap();
        assert_eq!(rating.max, Some(5.0));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = Definition::parse("[[types]]\nname = \"a\"\n[[types]]\nname = \"a\"\n").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_extends_cycle_and_unknown_parent() {
        let cyclic = Definition::parse(
            "[[types]]\nname = \"a\"\nextends = \"b\"\n[[types]]\nname = \"b\"\nextends = \"a\"\n",
        )
        .unwrap();
        let err = cyclic.compose_all(&schemas()).unwrap_err();
        assert!(err.to_string().contains("extends itself"));

        let orphan = Definition::parse("[[types]]\nname = \"a\"\nextends = \"zzz\"\n").unwrap();
        assert!(orphan.compose_all(&schemas()).is_err());
    }
}
