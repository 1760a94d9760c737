//! Reading and rewriting the mod load order of a `modsettings.lsx` file.
//!
//! ```text
//! save/region/node/children
//!   node id="ModOrder"/children/node id="Module"/attribute id="UUID" value=.. type=..
//!   node id="Mods"/children/node id="ModuleShortDesc"/attribute id="Name" | id="UUID"
//! ```
//!
//! Only the `ModOrder` children are rewritten, the rest of the document is written back as read.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use xmltree::{Element, EmitterConfig, XMLNode};

#[derive(Debug, Error)]
pub enum ModSettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid XML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: xmltree::ParseError,
    },
    #[error("{path} has no {section} section")]
    MissingSection {
        path: PathBuf,
        section: &'static str,
    },
    #[error("Module {index} of the load order in {path} has no UUID attribute")]
    MalformedModule { path: PathBuf, index: usize },
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: xmltree::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One entry of the load order: the mod's UUID and the attribute type it is stored with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModEntry {
    pub uuid: String,
    pub kind: String,
}

/// A child element matched by name and, if given, by its `id` attribute.
struct Step {
    name: &'static str,
    id: Option<&'static str>,
}

impl Step {
    const fn named(name: &'static str) -> Self {
        Self { name, id: None }
    }

    const fn node(id: &'static str) -> Self {
        Self {
            name: "node",
            id: Some(id),
        }
    }

    fn matches(&self, element: &Element) -> bool {
        element.name == self.name
            && self
                .id
                .map_or(true, |id| element.attributes.get("id").map(String::as_str) == Some(id))
    }
}

const SETTINGS_ROOT: [Step; 3] = [
    Step::named("region"),
    Step::named("node"),
    Step::named("children"),
];

fn elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(|node| match node {
        XMLNode::Element(element) => Some(element),
        _ => None,
    })
}

fn child<'a>(parent: &'a Element, step: &Step) -> Option<&'a Element> {
    elements(parent).find(|element| step.matches(element))
}

fn child_mut<'a>(parent: &'a mut Element, step: &Step) -> Option<&'a mut Element> {
    parent.children.iter_mut().find_map(|node| match node {
        XMLNode::Element(element) => step.matches(element).then_some(element),
        _ => None,
    })
}

fn descend<'a>(root: &'a Element, steps: &[Step]) -> Option<&'a Element> {
    steps.iter().try_fold(root, |element, step| child(element, step))
}

fn descend_mut<'a>(root: &'a mut Element, steps: &[Step]) -> Option<&'a mut Element> {
    let mut current = root;
    for step in steps {
        current = child_mut(current, step)?;
    }
    Some(current)
}

/// The `attribute` child whose id is `id`.
fn attribute_node<'a>(node: &'a Element, id: &str) -> Option<&'a Element> {
    elements(node).find(|element| {
        element.name == "attribute" && element.attributes.get("id").map(String::as_str) == Some(id)
    })
}

/// A parsed `modsettings.lsx`.
#[derive(Debug, Clone)]
pub struct ModSettings {
    path: PathBuf,
    document: Element,
    order: Vec<ModEntry>,
    names: HashMap<String, String>,
}

impl ModSettings {
    pub fn load(path: &Path) -> Result<Self, ModSettingsError> {
        let file = std::fs::File::open(path).map_err(|source| ModSettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(path.to_path_buf(), std::io::BufReader::new(file))?;
        info!(
            "Loaded {} mods from {}",
            settings.order.len(),
            path.display()
        );
        Ok(settings)
    }

    /// Parses a document read from `reader`; `path` is where [`ModSettings::save`] writes to.
    pub fn parse(path: PathBuf, reader: impl Read) -> Result<Self, ModSettingsError> {
        let document = Element::parse(reader).map_err(|source| ModSettingsError::Parse {
            path: path.clone(),
            source,
        })?;

        let root = descend(&document, &SETTINGS_ROOT).ok_or(ModSettingsError::MissingSection {
            path: path.clone(),
            section: "region/node/children",
        })?;
        let mod_order = child(root, &Step::node("ModOrder")).ok_or(
            ModSettingsError::MissingSection {
                path: path.clone(),
                section: "ModOrder",
            },
        )?;

        let mut order = Vec::new();
        if let Some(modules) = child(mod_order, &Step::named("children")) {
            for (index, module) in elements(modules).enumerate() {
                let entry = attribute_node(module, "UUID")
                    .and_then(|attribute| {
                        let uuid = attribute.attributes.get("value")?;
                        let kind = attribute.attributes.get("type")?;
                        Some(ModEntry {
                            uuid: uuid.clone(),
                            kind: kind.clone(),
                        })
                    })
                    .ok_or(ModSettingsError::MalformedModule {
                        path: path.clone(),
                        index,
                    })?;
                order.push(entry);
            }
        }

        let mut names = HashMap::new();
        let descriptions = child(root, &Step::node("Mods"))
            .and_then(|mods| child(mods, &Step::named("children")));
        for description in descriptions.into_iter().flat_map(elements) {
            let value = |id: &str| {
                attribute_node(description, id).and_then(|a| a.attributes.get("value").cloned())
            };
            match (value("UUID"), value("Name")) {
                (Some(uuid), Some(name)) => {
                    names.insert(uuid, name);
                }
                _ => warn!("Skipping mod description without UUID or Name"),
            }
        }

        Ok(Self {
            path,
            document,
            order,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The load order, first loaded first.
    pub fn order(&self) -> &[ModEntry] {
        &self.order
    }

    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// Adds or replaces display names, e.g. from the installed packages.
    pub fn extend_names(&mut self, names: impl IntoIterator<Item = (String, String)>) {
        self.names.extend(names);
    }

    /// Display name of `uuid`, falling back to the UUID itself.
    pub fn display_name<'a>(&'a self, uuid: &'a str) -> &'a str {
        self.names.get(uuid).map_or(uuid, String::as_str)
    }

    /// Replaces the `ModOrder` children with `order`.
    pub fn apply_order(&mut self, order: Vec<ModEntry>) -> Result<(), ModSettingsError> {
        let mut steps: Vec<Step> = SETTINGS_ROOT.into_iter().collect();
        steps.push(Step::node("ModOrder"));
        let mod_order = descend_mut(&mut self.document, &steps).ok_or(
            ModSettingsError::MissingSection {
                path: self.path.clone(),
                section: "ModOrder",
            },
        )?;

        if child(mod_order, &Step::named("children")).is_none() {
            mod_order
                .children
                .push(XMLNode::Element(Element::new("children")));
        }
        let modules = child_mut(mod_order, &Step::named("children")).ok_or(
            ModSettingsError::MissingSection {
                path: self.path.clone(),
                section: "ModOrder/children",
            },
        )?;

        modules.children = order.iter().map(module_node).collect();
        self.order = order;
        Ok(())
    }

    pub fn write_to(&self, writer: impl Write) -> Result<(), ModSettingsError> {
        let config = EmitterConfig::new().perform_indent(true);
        self.document
            .write_with_config(writer, config)
            .map_err(|source| ModSettingsError::Serialize {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes the document back to the file it was loaded from.
    pub fn save(&self) -> Result<(), ModSettingsError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        std::fs::write(&self.path, buffer).map_err(|source| ModSettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("Saved {} mods to {}", self.order.len(), self.path.display());
        Ok(())
    }
}

/// `<node id="Module"><attribute id="UUID" value=".." type=".."/></node>`
fn module_node(entry: &ModEntry) -> XMLNode {
    let mut attribute = Element::new("attribute");
    attribute
        .attributes
        .insert("id".to_owned(), "UUID".to_owned());
    attribute
        .attributes
        .insert("value".to_owned(), entry.uuid.clone());
    attribute
        .attributes
        .insert("type".to_owned(), entry.kind.clone());

    let mut node = Element::new("node");
    node.attributes.insert("id".to_owned(), "Module".to_owned());
    node.children.push(XMLNode::Element(attribute));
    XMLNode::Element(node)
}
