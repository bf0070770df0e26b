//! Type naming and per-tag type assignment.
//!
//! Names are minted in a fixed order so that named schemas always keep their
//! declared names: named schemas first, then function names, then params
//! bags, then every other hoisted type in arena order.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::group::{Operation, TagGroup};
use crate::model::{TypeArena, TypeId, TypeOrigin};
use crate::naming::NameTable;
use crate::naming::ident::type_name;

/// Names and ownership decided for one run.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub names: NameTable,
    type_names: HashMap<TypeId, String>,
    function_names: Vec<String>,
    /// type -> index of the declaring tag group
    owners: HashMap<TypeId, usize>,
}

impl Synthesis {
    /// Name of a hoisted type.
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.type_names.get(&id).map(String::as_str)
    }

    /// Final function name of the operation at `index`.
    pub fn function_name(&self, index: usize) -> &str {
        self.function_names.get(index).map_or("", String::as_str)
    }

    /// Tag group that declares `id`.
    pub fn owner(&self, id: TypeId) -> Option<usize> {
        self.owners.get(&id).copied()
    }
}

/// Order declarations by name ignoring case, ties broken by exact name.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Mint every name and assign each named type to the tag group of its first
/// consumer. Fills `TagGroup::types` sorted by name.
pub fn synthesize(
    arena: &TypeArena,
    operations: &[Operation],
    groups: &mut [TagGroup],
    config: &GeneratorConfig,
) -> Result<Synthesis> {
    let mut names = NameTable::default();
    let mut type_names = HashMap::new();

    for id in arena.ids() {
        let origin = &arena.slot(id).origin;
        if let TypeOrigin::Component { name, .. } = origin {
            let minted = names.types.mint(&type_name(name), &origin.owner_key())?;
            type_names.insert(id, minted);
        }
    }

    let mut function_names = Vec::with_capacity(operations.len());
    for op in operations {
        let minted = names
            .functions
            .mint(&op.name_candidate, &format!("operation:{}", op.key))?;
        function_names.push(minted);
    }

    for (op, function) in operations.iter().zip(&function_names) {
        if let Some(bag) = op.params_bag {
            let candidate = format!("{function}{}", config.params_suffix);
            let minted = names
                .types
                .mint(&candidate, &arena.slot(bag).origin.owner_key())?;
            type_names.insert(bag, minted);
        }
    }

    for id in arena.ids() {
        let origin = &arena.slot(id).origin;
        if let TypeOrigin::Inline { hint, .. } = origin {
            if arena.is_hoisted(id) {
                let minted = names.types.mint(&type_name(hint), &origin.owner_key())?;
                trace!(%minted, %id, "hoisted inline type");
                type_names.insert(id, minted);
            }
        }
    }

    let group_of_tag: HashMap<&str, usize> = groups
        .iter()
        .enumerate()
        .map(|(index, group)| (group.tag.as_str(), index))
        .collect();

    let mut owners = HashMap::new();
    for op in operations {
        let Some(&group) = op.tags.first().and_then(|tag| group_of_tag.get(tag.as_str())) else {
            continue;
        };
        for id in arena.named_closure(&op.roots()) {
            owners.entry(id).or_insert(group);
        }
    }

    for (index, group) in groups.iter_mut().enumerate() {
        let mut types: Vec<TypeId> = owners
            .iter()
            .filter(|(_, owner)| **owner == index)
            .map(|(id, _)| *id)
            .collect();
        types.sort_by(|a, b| {
            compare_names(
                type_names.get(a).map_or("", String::as_str),
                type_names.get(b).map_or("", String::as_str),
            )
        });
        group.types = types;
    }

    debug!(
        types = names.types.len(),
        functions = names.functions.len(),
        declared = owners.len(),
        "synthesized names"
    );

    Ok(Synthesis {
        names,
        type_names,
        function_names,
        owners,
    })
}
