//! Static tool catalog: descriptors for `tools/list` and the name -> handler
//! lookup used by `tools/call`.

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use super::protocol::ToolDefinition;
use crate::core::error::{Result, SearchError};
use crate::core::search;

pub const SEARCH_IN_FILE: &str = "search_in_file";

/// Returns the serialized payload text
pub type ToolHandler = fn(&Map<String, Value>) -> Result<String>;

pub struct ToolEntry {
    pub definition: ToolDefinition,
    pub handler: ToolHandler,
}

static CATALOG: Lazy<Vec<ToolEntry>> = Lazy::new(|| {
    vec![ToolEntry {
        definition: ToolDefinition {
            name: SEARCH_IN_FILE.to_string(),
            description:
                "Searches for a keyword within a file and returns matching lines with line numbers."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filePath": {
                        "type": "string",
                        "description": "Path to the file to search"
                    },
                    "keyword": {
                        "type": "string",
                        "description": "Keyword to search for"
                    },
                    "caseSensitive": {
                        "type": "boolean",
                        "description": "Case-sensitive search (default: false)",
                        "default": false
                    }
                },
                "required": ["filePath", "keyword"]
            }),
        },
        handler: search::search_in_file,
    }]
});

pub fn definitions() -> impl Iterator<Item = &'static ToolDefinition> {
    CATALOG.iter().map(|entry| &entry.definition)
}

pub fn lookup(name: &str) -> Option<&'static ToolEntry> {
    CATALOG.iter().find(|entry| entry.definition.name == name)
}

/// Run the named tool. Unknown names never touch the filesystem.
pub fn invoke(name: &str, args: &Map<String, Value>) -> Result<String> {
    let entry = lookup(name).ok_or_else(|| SearchError::UnknownTool(name.to_string()))?;
    (entry.handler)(args)
}

/// Catalog as printed by `file-search-server tools`
pub fn inventory_json() -> Value {
    json!({ "tools": definitions().collect::<Vec<_>>() })
}
